use anyhow::{anyhow, Result};
use std::{cmp::Ordering, fmt, str::FromStr};
use tracing::{debug, warn};

use super::aggregate::Matrix;

/// How country bars are laid out left to right. One policy per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortPolicy {
    /// Sum of all available yearly values, descending.
    #[default]
    Total,
    /// Value in one year, descending. `None` means "the latest year present".
    Year(Option<i32>),
    /// Each country's chronologically last available value, descending.
    Latest,
}

impl FromStr for SortPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("total") {
            return Ok(SortPolicy::Total);
        }
        if s.eq_ignore_ascii_case("latest") {
            return Ok(SortPolicy::Latest);
        }
        let year_selector = s
            .get(..5)
            .filter(|prefix| prefix.eq_ignore_ascii_case("year:"))
            .map(|_| &s[5..]);
        if let Some(rest) = year_selector {
            let year = rest.trim().parse::<i32>().ok();
            if year.is_none() {
                warn!(selector = s, "unreadable sort year; using latest year in data");
            }
            return Ok(SortPolicy::Year(year));
        }
        Err(anyhow!(
            "unknown sort policy `{}` (expected total, latest or year:YYYY)",
            s
        ))
    }
}

impl fmt::Display for SortPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortPolicy::Total => f.write_str("total"),
            SortPolicy::Latest => f.write_str("latest"),
            SortPolicy::Year(Some(y)) => write!(f, "year:{}", y),
            SortPolicy::Year(None) => f.write_str("year:"),
        }
    }
}

/// Descending by value, missing last. Used with a stable sort so ties keep code order.
fn descending_missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn sort_by_key_desc<F>(matrix: &Matrix, key: F) -> Vec<String>
where
    F: Fn(&str) -> Option<f64>,
{
    let mut keyed: Vec<(&str, Option<f64>)> =
        matrix.countries().map(|code| (code, key(code))).collect();
    keyed.sort_by(|a, b| descending_missing_last(a.1, b.1));
    keyed.into_iter().map(|(code, _)| code.to_string()).collect()
}

/// Resolve which year a `year:` policy actually sorts by.
///
/// Falls back to the latest year present when the request is absent or not in
/// the data; `None` only when the matrix has no years at all.
pub fn resolve_sort_year(requested: Option<i32>, years: &[i32]) -> Option<i32> {
    match requested {
        Some(y) if years.contains(&y) => Some(y),
        _ => years.iter().max().copied(),
    }
}

/// Produce the category order for `matrix` under `policy`.
#[tracing::instrument(level = "info", skip_all, fields(policy = %policy))]
pub fn order_categories(matrix: &Matrix, policy: &SortPolicy) -> Vec<String> {
    match policy {
        SortPolicy::Total => sort_by_key_desc(matrix, |code| {
            matrix.row(code).map(|row| row.values().sum::<f64>())
        }),
        SortPolicy::Year(requested) => {
            match resolve_sort_year(*requested, matrix.years()) {
                Some(year) => {
                    if *requested != Some(year) {
                        debug!(?requested, year, "sort year not in data; falling back");
                    }
                    sort_by_key_desc(matrix, |code| matrix.get(code, year))
                }
                None => matrix.countries().map(str::to_string).collect(),
            }
        }
        SortPolicy::Latest => sort_by_key_desc(matrix, |code| {
            matrix
                .row(code)
                .and_then(|row| row.values().next_back().copied())
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn matrix(cells: &[(&str, i32, f64)]) -> Matrix {
        let mut rows: BTreeMap<String, BTreeMap<i32, f64>> = BTreeMap::new();
        for (code, year, value) in cells {
            rows.entry(code.to_string()).or_default().insert(*year, *value);
        }
        Matrix::from_rows(rows)
    }

    #[test]
    fn parses_selectors() -> Result<()> {
        assert_eq!("total".parse::<SortPolicy>()?, SortPolicy::Total);
        assert_eq!(" latest ".parse::<SortPolicy>()?, SortPolicy::Latest);
        assert_eq!("year:2021".parse::<SortPolicy>()?, SortPolicy::Year(Some(2021)));
        assert_eq!("year:soon".parse::<SortPolicy>()?, SortPolicy::Year(None));
        assert!("biggest".parse::<SortPolicy>().is_err());
        assert!("yea".parse::<SortPolicy>().is_err());
        assert_eq!(SortPolicy::Year(Some(2019)).to_string(), "year:2019");
        Ok(())
    }

    #[test]
    fn selectors_ignore_case() -> Result<()> {
        assert_eq!("TOTAL".parse::<SortPolicy>()?, SortPolicy::Total);
        assert_eq!("Latest".parse::<SortPolicy>()?, SortPolicy::Latest);
        assert_eq!("YEAR:2020".parse::<SortPolicy>()?, SortPolicy::Year(Some(2020)));
        assert_eq!("Year: 2019".parse::<SortPolicy>()?, SortPolicy::Year(Some(2019)));
        Ok(())
    }

    #[test]
    fn total_sorts_by_sum_descending() {
        let m = matrix(&[("A", 2020, 1.0), ("A", 2021, 2.0), ("B", 2020, 1.0)]);
        assert_eq!(order_categories(&m, &SortPolicy::Total), vec!["A", "B"]);

        let m = matrix(&[("A", 2020, 0.5), ("B", 2020, 4.0), ("C", 2021, 1.0)]);
        assert_eq!(order_categories(&m, &SortPolicy::Total), vec!["B", "C", "A"]);
    }

    #[test]
    fn total_ties_keep_code_order() {
        let m = matrix(&[
            ("C", 2020, 2.0),
            ("A", 2020, 1.0),
            ("A", 2021, 1.0),
            ("B", 2021, 2.0),
        ]);
        assert_eq!(order_categories(&m, &SortPolicy::Total), vec!["A", "B", "C"]);
    }

    #[test]
    fn year_policy_puts_missing_last() {
        let m = matrix(&[
            ("A", 2020, 1.0),
            ("B", 2020, 3.0),
            ("B", 2021, 0.1),
            ("C", 2021, 9.0),
        ]);
        assert_eq!(
            order_categories(&m, &SortPolicy::Year(Some(2020))),
            vec!["B", "A", "C"]
        );
    }

    #[test]
    fn year_policy_falls_back_to_latest_year() {
        let m = matrix(&[("A", 2020, 5.0), ("B", 2020, 1.0), ("B", 2021, 2.0)]);
        let expected = vec!["B", "A"];
        assert_eq!(order_categories(&m, &SortPolicy::Year(Some(1999))), expected);
        assert_eq!(order_categories(&m, &SortPolicy::Year(None)), expected);
        assert_eq!(resolve_sort_year(Some(1999), m.years()), Some(2021));
        assert_eq!(resolve_sort_year(Some(2020), m.years()), Some(2020));
        assert_eq!(resolve_sort_year(Some(2020), &[]), None);
    }

    #[test]
    fn year_policy_on_empty_matrix_is_empty() {
        let m = Matrix::default();
        assert!(order_categories(&m, &SortPolicy::Year(Some(2020))).is_empty());
    }

    #[test]
    fn latest_uses_last_available_value_per_country() {
        let m = matrix(&[
            ("A", 2019, 10.0),
            ("A", 2021, 1.0),
            ("B", 2019, 3.0),
            ("C", 2020, 2.0),
        ]);
        assert_eq!(order_categories(&m, &SortPolicy::Latest), vec!["B", "C", "A"]);
    }
}
