// src/pipeline.rs

use anyhow::Result;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::Settings;
use crate::model::NormalizedObservation;
use crate::process::{normalize::normalize, prepare_chart};
use crate::report::{render_html, write_report, ReportData, ReportStyle};
use crate::store::{
    read_normalized_csv, read_observations, write_normalized_csv, write_normalized_parquet,
};

/// What `RunOptions::input` contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputKind {
    /// The raw statistical export (COUNTRY, Country, TIME_PERIOD, OBS_VALUE, ...).
    #[default]
    Raw,
    /// A table previously written by this tool; normalization is skipped.
    Normalized,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    pub input_kind: InputKind,
    pub output_csv: PathBuf,
    pub output_html: PathBuf,
    pub output_parquet: Option<PathBuf>,
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub normalized_rows: usize,
    pub categories: Vec<String>,
    pub years: Vec<i32>,
    /// Every artifact written, in write order.
    pub written: Vec<PathBuf>,
}

fn export_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "chart".to_string())
}

fn load_rows(opts: &RunOptions) -> Result<Vec<NormalizedObservation>> {
    match opts.input_kind {
        InputKind::Raw => {
            let observations = read_observations(&opts.input)?;
            Ok(normalize(observations, &opts.settings.population))
        }
        InputKind::Normalized => read_normalized_csv(&opts.input),
    }
}

/// Read, normalize, chart and write.
///
/// The report is rendered before any output is touched, so a failure while
/// reading or preparing leaves no files behind.
#[tracing::instrument(level = "info", skip(opts), fields(input = %opts.input.display(), policy = %opts.settings.policy))]
pub fn run(opts: &RunOptions) -> Result<RunSummary> {
    let rows = load_rows(opts)?;
    let chart = prepare_chart(&rows, opts.settings.policy);

    let style = ReportStyle {
        title: opts.settings.title.clone(),
        palette: opts.settings.palette.clone(),
        export_name: export_name(&opts.output_html),
    };
    let html = render_html(&ReportData::from(&chart), &style, Utc::now())?;

    let mut written = Vec::new();
    match opts.input_kind {
        InputKind::Raw => {
            write_normalized_csv(&opts.output_csv, &rows)?;
            written.push(opts.output_csv.clone());
        }
        InputKind::Normalized => {
            info!("input already normalized; CSV not rewritten");
        }
    }
    if let Some(parquet_path) = &opts.output_parquet {
        write_normalized_parquet(parquet_path, &rows)?;
        written.push(parquet_path.clone());
    }
    write_report(&opts.output_html, &html)?;
    written.push(opts.output_html.clone());

    Ok(RunSummary {
        normalized_rows: rows.len(),
        categories: chart.categories,
        years: chart.years,
        written,
    })
}
