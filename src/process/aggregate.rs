use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use crate::model::NormalizedObservation;
use crate::process::utils::coerce_year;

/// Country × year matrix of per-capita values.
///
/// Countries iterate in code order and each row is ordered by year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Matrix {
    rows: BTreeMap<String, BTreeMap<i32, f64>>,
    years: Vec<i32>,
}

impl Matrix {
    pub fn from_rows(rows: BTreeMap<String, BTreeMap<i32, f64>>) -> Self {
        let years: BTreeSet<i32> = rows.values().flat_map(|r| r.keys().copied()).collect();
        Self {
            rows,
            years: years.into_iter().collect(),
        }
    }

    /// All years with at least one cell, ascending and deduplicated.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    pub fn row(&self, country_code: &str) -> Option<&BTreeMap<i32, f64>> {
        self.rows.get(country_code)
    }

    pub fn get(&self, country_code: &str, year: i32) -> Option<f64> {
        self.rows.get(country_code)?.get(&year).copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<i32, f64>)> {
        self.rows.iter().map(|(code, row)| (code.as_str(), row))
    }
}

/// Group by (country, year) and average, then pivot into a [`Matrix`].
///
/// Rows whose year does not coerce to an integer, or whose per-capita value
/// is undefined or non-finite, are skipped.
#[tracing::instrument(level = "info", skip_all)]
pub fn aggregate<'a, I>(rows: I) -> Matrix
where
    I: IntoIterator<Item = &'a NormalizedObservation>,
{
    let mut sums: BTreeMap<(String, i32), (f64, u32)> = BTreeMap::new();
    let mut skipped = 0usize;

    for row in rows {
        let year = coerce_year(&row.observation.year);
        let value = row.per_capita_value.filter(|v| v.is_finite());
        let (year, value) = match (year, value) {
            (Some(y), Some(v)) => (y, v),
            _ => {
                skipped += 1;
                continue;
            }
        };
        let slot = sums
            .entry((row.observation.country_code.clone(), year))
            .or_insert((0.0, 0));
        slot.0 += value;
        slot.1 += 1;
    }

    if skipped > 0 {
        debug!(skipped, "rows without a usable year or value");
    }

    let mut pivot: BTreeMap<String, BTreeMap<i32, f64>> = BTreeMap::new();
    for ((country, year), (sum, count)) in sums {
        pivot
            .entry(country)
            .or_default()
            .insert(year, sum / f64::from(count));
    }

    let matrix = Matrix::from_rows(pivot);
    info!(
        countries = matrix.len(),
        years = matrix.years().len(),
        "aggregated"
    );
    matrix
}
