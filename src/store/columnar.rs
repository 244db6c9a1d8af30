// src/store/columnar.rs

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::{path::Path, sync::Arc};
use tracing::info;

use super::write_atomically;
use crate::model::NormalizedObservation;

/// Arrow schema mirroring the normalized CSV header.
pub fn normalized_schema() -> Schema {
    Schema::new(vec![
        Field::new("COUNTRY", DataType::Utf8, false),
        Field::new("Country", DataType::Utf8, false),
        Field::new("TIME_PERIOD", DataType::Utf8, false),
        Field::new("OBS_VALUE", DataType::Float64, true),
        Field::new("Population_millions", DataType::Float64, false),
        Field::new("Patents_per_million", DataType::Float64, true),
    ])
}

/// Build a single record batch of the normalized rows.
pub fn normalized_batch(rows: &[NormalizedObservation]) -> Result<RecordBatch> {
    let country: StringArray = rows
        .iter()
        .map(|r| Some(r.observation.country_code.as_str()))
        .collect();
    let name: StringArray = rows
        .iter()
        .map(|r| Some(r.observation.country_name.as_str()))
        .collect();
    let period: StringArray = rows
        .iter()
        .map(|r| Some(r.observation.year.as_str()))
        .collect();
    let obs: Float64Array = rows.iter().map(|r| r.observation.raw_value).collect();
    let pop: Float64Array = rows.iter().map(|r| Some(r.population_millions)).collect();
    let per_capita: Float64Array = rows.iter().map(|r| r.per_capita_value).collect();

    let columns: Vec<ArrayRef> = vec![
        Arc::new(country),
        Arc::new(name),
        Arc::new(period),
        Arc::new(obs),
        Arc::new(pop),
        Arc::new(per_capita),
    ];
    RecordBatch::try_new(Arc::new(normalized_schema()), columns)
        .context("building normalized record batch")
}

/// Snappy-compressed Parquet copy of the normalized table.
#[tracing::instrument(level = "info", skip(path, rows), fields(path = %path.display(), rows = rows.len()))]
pub fn write_normalized_parquet(path: &Path, rows: &[NormalizedObservation]) -> Result<()> {
    let batch = normalized_batch(rows)?;
    write_atomically(path, |file| {
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
            .context("creating Arrow writer")?;
        writer.write(&batch).context("writing normalized batch")?;
        writer.close().context("closing Parquet writer")?;
        Ok(())
    })?;
    info!("normalized Parquet written");
    Ok(())
}
