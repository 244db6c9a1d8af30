// src/process/mod.rs
pub mod aggregate;
pub mod normalize;
pub mod series;
pub mod sort;
pub mod utils;

use tracing::info;

use crate::model::NormalizedObservation;
use aggregate::{aggregate, Matrix};
use series::{build_series, ChartSeries};
use sort::{order_categories, SortPolicy};

/// Everything the report needs, derived from the normalized rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub matrix: Matrix,
    /// Years present in the matrix, ascending.
    pub years: Vec<i32>,
    /// Country codes, left to right.
    pub categories: Vec<String>,
    pub series: ChartSeries,
}

/// Aggregate → sort → series, in one pass.
#[tracing::instrument(level = "info", skip(rows), fields(rows = rows.len()))]
pub fn prepare_chart(rows: &[NormalizedObservation], policy: SortPolicy) -> ChartData {
    let matrix = aggregate(rows);
    let years = matrix.years().to_vec();
    let categories = order_categories(&matrix, &policy);
    let series = build_series(&matrix, &years, &categories);
    info!(
        categories = categories.len(),
        years = years.len(),
        "chart data ready"
    );
    ChartData {
        matrix,
        years,
        categories,
        series,
    }
}
