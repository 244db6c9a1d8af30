// src/model.rs

/// One row of the statistical export, as read from the input table.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// `COUNTRY` column, e.g. "DEU".
    pub country_code: String,
    /// `Country` column, the display name.
    pub country_name: String,
    /// `TIME_PERIOD` exactly as it appeared (trimmed). Coerced to a year at aggregation.
    pub year: String,
    /// `OBS_VALUE`; `None` when the cell is empty or not a number.
    pub raw_value: Option<f64>,
}

impl Observation {
    pub fn new(
        country_code: impl Into<String>,
        country_name: impl Into<String>,
        year: impl Into<String>,
        raw_value: Option<f64>,
    ) -> Self {
        Self {
            country_code: country_code.into(),
            country_name: country_name.into(),
            year: year.into(),
            raw_value,
        }
    }
}

/// An observation joined with a usable population entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedObservation {
    pub observation: Observation,
    /// Always > 0.
    pub population_millions: f64,
    /// `raw_value / population_millions`, unrounded. Undefined when the raw value is.
    pub per_capita_value: Option<f64>,
}
