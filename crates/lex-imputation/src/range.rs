//! Attribute range specifications.
//!
//! A range is written over the 1-based column space as a comma-separated list
//! of single indices and inclusive spans, with `first` and `last` as symbolic
//! endpoints: `first-last`, `1,3,5-7`, `first-3,5-last`. Resolution against a
//! concrete schema width yields ascending, deduplicated 0-based indices,
//! complemented when the range is inverted.

use crate::error::{ImputationError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One endpoint of a range element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    First,
    Last,
    /// 1-based index as written
    Index(usize),
}

impl Bound {
    fn parse(token: &str, spec: &str) -> Result<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(Bound::First),
            "last" => Ok(Bound::Last),
            other => match other.parse::<usize>() {
                Ok(0) => Err(invalid(spec, "indices are 1-based, 0 is not allowed")),
                Ok(n) => Ok(Bound::Index(n)),
                Err(_) => Err(invalid(spec, &format!("'{}' is not an index", token.trim()))),
            },
        }
    }

    /// 0-based position for a schema of `width` attributes (`width > 0`).
    fn resolve(self, width: usize, spec: &str) -> Result<usize> {
        match self {
            Bound::First => Ok(0),
            Bound::Last => Ok(width - 1),
            Bound::Index(n) if n <= width => Ok(n - 1),
            Bound::Index(n) => Err(invalid(
                spec,
                &format!("index {} exceeds the {} available attributes", n, width),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    Single(Bound),
    Span(Bound, Bound),
}

fn invalid(spec: &str, reason: &str) -> ImputationError {
    ImputationError::InvalidRange {
        range: spec.to_string(),
        reason: reason.to_string(),
    }
}

/// A parsed, schema-independent attribute range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRange {
    spec: String,
    elements: Vec<Element>,
    invert: bool,
}

impl AttributeRange {
    /// Parse a range specification.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRange` for malformed specifications. Bounds are only
    /// checked later, by [`AttributeRange::resolve`].
    pub fn new(spec: &str) -> Result<Self> {
        let mut elements = Vec::new();
        for part in spec.split(',') {
            let part = part.trim();
            if part.is_empty() {
                if spec.trim().is_empty() {
                    break;
                }
                return Err(invalid(spec, "empty element"));
            }
            let element = match part.split_once('-') {
                Some((lo, hi)) => Element::Span(Bound::parse(lo, spec)?, Bound::parse(hi, spec)?),
                None => Element::Single(Bound::parse(part, spec)?),
            };
            elements.push(element);
        }
        Ok(Self {
            spec: spec.trim().to_string(),
            elements,
            invert: false,
        })
    }

    /// Every attribute (`first-last`).
    pub fn all() -> Self {
        Self {
            spec: "first-last".to_string(),
            elements: vec![Element::Span(Bound::First, Bound::Last)],
            invert: false,
        }
    }

    /// Inverts the matching sense.
    pub fn inverted(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    pub fn is_inverted(&self) -> bool {
        self.invert
    }

    pub fn spec(&self) -> &str {
        &self.spec
    }

    /// Resolve against a schema with `width` attributes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRange` if a numeric index lies beyond `width` or a
    /// span runs backwards.
    pub fn resolve(&self, width: usize) -> Result<Vec<usize>> {
        let mut selected = vec![false; width];
        for element in &self.elements {
            let (lo, hi) = match *element {
                Element::Single(b) => (b, b),
                Element::Span(lo, hi) => (lo, hi),
            };
            if width == 0 {
                // symbolic bounds select nothing in an empty schema
                if let Bound::Index(_) = lo {
                    lo.resolve(width, &self.spec)?;
                }
                if let Bound::Index(_) = hi {
                    hi.resolve(width, &self.spec)?;
                }
                continue;
            }
            let start = lo.resolve(width, &self.spec)?;
            let end = hi.resolve(width, &self.spec)?;
            if start > end {
                return Err(invalid(
                    &self.spec,
                    &format!("span {}-{} runs backwards", start + 1, end + 1),
                ));
            }
            selected[start..=end].iter_mut().for_each(|s| *s = true);
        }
        Ok(selected
            .into_iter()
            .enumerate()
            .filter(|(_, s)| *s != self.invert)
            .map(|(i, _)| i)
            .collect())
    }

    /// Render ascending 0-based indices back into a compact 1-based spec.
    pub fn from_indices(indices: &[usize]) -> Self {
        let mut parts: Vec<String> = Vec::new();
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        let mut i = 0;
        while i < sorted.len() {
            let start = sorted[i];
            let mut end = start;
            while i + 1 < sorted.len() && sorted[i + 1] == end + 1 {
                i += 1;
                end = sorted[i];
            }
            if start == end {
                parts.push(format!("{}", start + 1));
            } else {
                parts.push(format!("{}-{}", start + 1, end + 1));
            }
            i += 1;
        }
        let elements = sorted
            .iter()
            .map(|&i| Element::Single(Bound::Index(i + 1)))
            .collect();
        Self {
            spec: parts.join(","),
            elements,
            invert: false,
        }
    }
}

impl Default for AttributeRange {
    fn default() -> Self {
        Self::all()
    }
}

impl FromStr for AttributeRange {
    type Err = ImputationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for AttributeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.invert {
            write!(f, "!({})", self.spec)
        } else {
            f.write_str(&self.spec)
        }
    }
}

/// Serialized as `{ "range": "first-3", "invert": false }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSpec {
    #[serde(default = "default_range")]
    pub range: String,
    #[serde(default)]
    pub invert: bool,
}

fn default_range() -> String {
    "first-last".to_string()
}

impl Default for RangeSpec {
    fn default() -> Self {
        Self {
            range: default_range(),
            invert: false,
        }
    }
}

impl RangeSpec {
    pub fn to_range(&self) -> Result<AttributeRange> {
        Ok(AttributeRange::new(&self.range)?.inverted(self.invert))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_last() {
        let range = AttributeRange::all();
        assert_eq!(range.resolve(4).unwrap(), vec![0, 1, 2, 3]);
        assert!(range.resolve(0).unwrap().is_empty());
    }

    #[test]
    fn test_singles_and_spans() {
        let range = AttributeRange::new("1,3,5-6").unwrap();
        assert_eq!(range.resolve(7).unwrap(), vec![0, 2, 4, 5]);
    }

    #[test]
    fn test_symbolic_endpoints() {
        let range = AttributeRange::new("first-2,4-last").unwrap();
        assert_eq!(range.resolve(6).unwrap(), vec![0, 1, 3, 4, 5]);
        let last = AttributeRange::new("last").unwrap();
        assert_eq!(last.resolve(3).unwrap(), vec![2]);
    }

    #[test]
    fn test_duplicates_collapse() {
        let range = AttributeRange::new("2,1-3,2").unwrap();
        assert_eq!(range.resolve(3).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_invert() {
        let range = AttributeRange::new("1,3").unwrap().inverted(true);
        assert_eq!(range.resolve(4).unwrap(), vec![1, 3]);
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let range = AttributeRange::new("2-5").unwrap();
        let error = range.resolve(4).unwrap_err();
        assert_eq!(error.error_code(), "INVALID_RANGE");
    }

    #[test]
    fn test_resolution_is_per_width() {
        let range = AttributeRange::new("first-last").unwrap();
        assert_eq!(range.resolve(2).unwrap().len(), 2);
        assert_eq!(range.resolve(5).unwrap().len(), 5);
    }

    #[test]
    fn test_malformed_specs() {
        assert!(AttributeRange::new("0").is_err());
        assert!(AttributeRange::new("a-3").is_err());
        assert!(AttributeRange::new("1,,2").is_err());
        assert!(AttributeRange::new("3-1").unwrap().resolve(5).is_err());
    }

    #[test]
    fn test_empty_spec_selects_nothing() {
        let range = AttributeRange::new("").unwrap();
        assert!(range.resolve(3).unwrap().is_empty());
        assert_eq!(range.inverted(true).resolve(2).unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_from_indices() {
        let range = AttributeRange::from_indices(&[0, 1, 2, 5, 7, 8]);
        assert_eq!(range.spec(), "1-3,6,8-9");
        assert_eq!(range.resolve(9).unwrap(), vec![0, 1, 2, 5, 7, 8]);
    }

    #[test]
    fn test_range_spec_deserialize_defaults() {
        let spec: RangeSpec = serde_json::from_str("{}").unwrap();
        assert_eq!(spec.range, "first-last");
        assert!(!spec.invert);
        assert_eq!(spec.to_range().unwrap().resolve(2).unwrap(), vec![0, 1]);
    }
}
