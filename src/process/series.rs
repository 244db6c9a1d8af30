use serde::ser::{Serialize, SerializeMap, Serializer};

use super::aggregate::Matrix;
use super::utils::round2;

/// Per-year value arrays aligned to the category order.
///
/// Serializes as a JSON object keyed by year-as-string, years ascending,
/// with `null` for cells that have no data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSeries {
    by_year: Vec<(i32, Vec<Option<f64>>)>,
}

impl ChartSeries {
    pub fn for_year(&self, year: i32) -> Option<&[Option<f64>]> {
        self.by_year
            .iter()
            .find(|(y, _)| *y == year)
            .map(|(_, values)| values.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, &[Option<f64>])> {
        self.by_year.iter().map(|(y, v)| (*y, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.by_year.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_year.is_empty()
    }
}

impl Serialize for ChartSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.by_year.len()))?;
        for (year, values) in &self.by_year {
            map.serialize_entry(&year.to_string(), values)?;
        }
        map.end()
    }
}

/// One array per year in `years`, each `order.len()` long.
///
/// A missing cell is `None`, never zero. Present values are rounded to two
/// decimals for display.
pub fn build_series(matrix: &Matrix, years: &[i32], order: &[String]) -> ChartSeries {
    let by_year = years
        .iter()
        .map(|&year| {
            let values = order
                .iter()
                .map(|code| matrix.get(code, year).map(round2))
                .collect();
            (year, values)
        })
        .collect();
    ChartSeries { by_year }
}
