//! Shared helpers for the imputation and injection algorithms.
//!
//! Column statistics over [`Dataset`]s: weighted means, medians and label
//! counts, plus a small parser for blank-separated, optionally quoted lists.

use crate::dataset::{Dataset, Value};

// =============================================================================
// Column Statistics
// =============================================================================

/// Weighted mean of the observed numeric values of `attribute`.
///
/// Returns `None` when no value is observed or all observed weights are zero.
pub fn weighted_mean(data: &Dataset, attribute: usize) -> Option<f64> {
    let (sum, weight) = data
        .rows()
        .iter()
        .filter_map(|row| row.value(attribute).as_f64().map(|v| (v, row.weight())))
        .fold((0.0, 0.0), |(s, w), (v, rw)| (s + v * rw, w + rw));
    (weight > 0.0).then(|| sum / weight)
}

/// Per-label weighted counts of a nominal attribute.
pub fn label_counts(data: &Dataset, attribute: usize, num_labels: usize) -> Vec<f64> {
    let mut counts = vec![0.0; num_labels];
    for row in data.rows() {
        if let Some(i) = row.value(attribute).as_index()
            && let Some(slot) = counts.get_mut(i)
        {
            *slot += row.weight();
        }
    }
    counts
}

/// Index of the largest count; the first maximum wins ties.
///
/// Returns `None` if every count is zero.
pub fn first_max_index(counts: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &c) in counts.iter().enumerate() {
        if c > 0.0 && best.is_none_or(|(_, b)| c > b) {
            best = Some((i, c));
        }
    }
    best.map(|(i, _)| i)
}

/// Median of the observed values of a numeric attribute (unweighted).
///
/// Even counts average the two middle values.
pub fn median(data: &Dataset, attribute: usize) -> Option<f64> {
    let mut values: Vec<f64> = data
        .column(attribute)
        .filter_map(|v| match v {
            Value::Number(x) => Some(x),
            _ => None,
        })
        .collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Weighted mode of a nominal attribute; the first maximum wins ties.
pub fn mode(data: &Dataset, attribute: usize, num_labels: usize) -> Option<usize> {
    first_max_index(&label_counts(data, attribute, num_labels))
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Split a blank-separated list, honouring single or double quotes.
///
/// # Example
///
/// ```rust,ignore
/// use lex_imputation::utils::split_quoted;
///
/// assert_eq!(split_quoted(r#"? "not known" n/a"#), vec!["?", "not known", "n/a"]);
/// ```
pub fn split_quoted(list: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_item = false;

    for c in list.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_item = true;
            }
            None if c.is_whitespace() => {
                if in_item {
                    items.push(std::mem::take(&mut current));
                    in_item = false;
                }
            }
            None => {
                current.push(c);
                in_item = true;
            }
        }
    }
    if in_item {
        items.push(current);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::test_support::*;
    use crate::dataset::{Attribute, Row, Schema};

    #[test]
    fn test_weighted_mean() {
        let schema = Schema::new("t", vec![Attribute::numeric("x")]).unwrap();
        let data = Dataset::with_rows(
            schema,
            vec![
                Row::weighted(vec![num(1.0)], 1.0).unwrap(),
                Row::weighted(vec![num(4.0)], 3.0).unwrap(),
                Row::new(vec![M]),
            ],
        )
        .unwrap();
        assert_eq!(weighted_mean(&data, 0), Some(13.0 / 4.0));
    }

    #[test]
    fn test_weighted_mean_all_missing() {
        let data = dataset(vec![Attribute::numeric("x")], None, vec![vec![M], vec![M]]);
        assert_eq!(weighted_mean(&data, 0), None);
    }

    #[test]
    fn test_first_max_index_ties() {
        assert_eq!(first_max_index(&[2.0, 3.0, 3.0]), Some(1));
        assert_eq!(first_max_index(&[0.0, 0.0]), None);
        assert_eq!(first_max_index(&[]), None);
    }

    #[test]
    fn test_median() {
        let data = dataset(
            vec![Attribute::numeric("x")],
            None,
            vec![vec![num(5.0)], vec![M], vec![num(1.0)], vec![num(3.0)], vec![num(10.0)]],
        );
        assert_eq!(median(&data, 0), Some(4.0));
    }

    #[test]
    fn test_mode_first_max() {
        let data = dataset(
            vec![Attribute::nominal("c", ["a", "b"]).unwrap()],
            None,
            vec![vec![idx(1)], vec![idx(0)], vec![M]],
        );
        assert_eq!(mode(&data, 0, 2), Some(0));
    }

    #[test]
    fn test_mode_uses_row_weights() {
        let schema = Schema::new("t", vec![Attribute::nominal("c", ["a", "b"]).unwrap()]).unwrap();
        let data = Dataset::with_rows(
            schema,
            vec![
                Row::weighted(vec![idx(0)], 1.0).unwrap(),
                Row::weighted(vec![idx(0)], 1.0).unwrap(),
                Row::weighted(vec![idx(1)], 5.0).unwrap(),
            ],
        )
        .unwrap();
        assert_eq!(mode(&data, 0, 2), Some(1));
    }

    #[test]
    fn test_split_quoted() {
        assert_eq!(split_quoted(r#"? "not known"  n/a"#), vec!["?", "not known", "n/a"]);
        assert_eq!(split_quoted("'' x"), vec!["", "x"]);
        assert!(split_quoted("   ").is_empty());
    }
}
