use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};
use tracing::info;

use super::write_atomically;
use crate::model::{NormalizedObservation, Observation};

/// One line of the normalized reference table.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct NormalizedRecord {
    #[serde(rename = "COUNTRY")]
    country_code: String,
    #[serde(rename = "Country")]
    country_name: String,
    #[serde(rename = "TIME_PERIOD")]
    time_period: String,
    #[serde(rename = "OBS_VALUE")]
    obs_value: Option<f64>,
    #[serde(rename = "Population_millions")]
    population_millions: f64,
    #[serde(rename = "Patents_per_million")]
    patents_per_million: Option<f64>,
}

impl From<&NormalizedObservation> for NormalizedRecord {
    fn from(row: &NormalizedObservation) -> Self {
        Self {
            country_code: row.observation.country_code.clone(),
            country_name: row.observation.country_name.clone(),
            time_period: row.observation.year.clone(),
            obs_value: row.observation.raw_value,
            population_millions: row.population_millions,
            patents_per_million: row.per_capita_value,
        }
    }
}

impl From<NormalizedRecord> for NormalizedObservation {
    fn from(rec: NormalizedRecord) -> Self {
        Self {
            observation: Observation {
                country_code: rec.country_code,
                country_name: rec.country_name,
                year: rec.time_period,
                raw_value: rec.obs_value,
            },
            population_millions: rec.population_millions,
            per_capita_value: rec.patents_per_million,
        }
    }
}

/// Serialize rows with the header
/// `COUNTRY,Country,TIME_PERIOD,OBS_VALUE,Population_millions,Patents_per_million`.
/// Undefined values are written as empty cells.
pub fn encode_normalized<W: Write>(writer: W, rows: &[NormalizedObservation]) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(writer);
    if rows.is_empty() {
        wtr.write_record([
            "COUNTRY",
            "Country",
            "TIME_PERIOD",
            "OBS_VALUE",
            "Population_millions",
            "Patents_per_million",
        ])?;
    }
    for row in rows {
        wtr.serialize(NormalizedRecord::from(row))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn decode_normalized<R: Read>(reader: R) -> Result<Vec<NormalizedObservation>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut out = Vec::new();
    for (n, result) in rdr.deserialize::<NormalizedRecord>().enumerate() {
        let rec = result.with_context(|| format!("bad normalized record {}", n + 1))?;
        out.push(rec.into());
    }
    Ok(out)
}

#[tracing::instrument(level = "info", skip(path, rows), fields(path = %path.display(), rows = rows.len()))]
pub fn write_normalized_csv(path: &Path, rows: &[NormalizedObservation]) -> Result<()> {
    write_atomically(path, |file| encode_normalized(file, rows))?;
    info!("normalized CSV written");
    Ok(())
}

/// Re-read a table produced by [`write_normalized_csv`].
#[tracing::instrument(level = "info", skip(path), fields(path = %path.display()))]
pub fn read_normalized_csv(path: &Path) -> Result<Vec<NormalizedObservation>> {
    let file =
        File::open(path).with_context(|| format!("opening normalized {}", path.display()))?;
    let rows = decode_normalized(file).with_context(|| format!("reading {}", path.display()))?;
    info!(rows = rows.len(), "normalized rows read");
    Ok(rows)
}
