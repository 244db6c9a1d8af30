//! Self-contained HTML report: one stacked column per country, one segment per year.
//!
//! The chart data is embedded as JSON literals; the page pulls Highcharts from
//! its CDN and offers PNG export plus a stacked / grouped / 100% toggle.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::process::{series::ChartSeries, ChartData};
use crate::store::write_atomically;

const TEMPLATE: &str = include_str!("template.html");

/// Presentation-only knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportStyle {
    pub title: String,
    /// At least one colour; Highcharts cycles through it when years outnumber it.
    pub palette: Vec<String>,
    /// File name (without extension) offered by the "Save PNG" button.
    pub export_name: String,
}

/// The JSON-facing view of the chart, positionally aligned to `categories`.
#[derive(Debug, Serialize)]
pub struct ReportData<'a> {
    pub categories: &'a [String],
    pub years: &'a [i32],
    pub data_by_year: &'a ChartSeries,
}

impl<'a> From<&'a ChartData> for ReportData<'a> {
    fn from(chart: &'a ChartData) -> Self {
        Self {
            categories: &chart.categories,
            years: &chart.years,
            data_by_year: &chart.series,
        }
    }
}

/// JSON that cannot close the surrounding `<script>` element.
fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value)?;
    Ok(json.replace("</", "<\\/"))
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Substitute every `__NAME__` token in one pass, so inserted text is never rescanned.
fn fill_placeholders(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("__") {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match values.iter().find(|(token, _)| tail.starts_with(token)) {
            Some((token, value)) => {
                out.push_str(value);
                rest = &tail[token.len()..];
            }
            None => {
                out.push_str("__");
                rest = &tail[2..];
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn render_html(
    data: &ReportData<'_>,
    style: &ReportStyle,
    generated_at: DateTime<Utc>,
) -> Result<String> {
    let values = [
        ("__TITLE_JSON__", script_json(&style.title)?),
        ("__TITLE__", escape_html(&style.title)),
        (
            "__GENERATED__",
            generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        ),
        ("__EXPORT_NAME_JSON__", script_json(&style.export_name)?),
        ("__PALETTE__", script_json(&style.palette)?),
        ("__CATEGORIES__", script_json(data.categories)?),
        ("__YEARS__", script_json(data.years)?),
        ("__DATA_BY_YEAR__", script_json(data.data_by_year)?),
    ];
    Ok(fill_placeholders(TEMPLATE, &values))
}

#[tracing::instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn write_report(path: &Path, html: &str) -> Result<()> {
    write_atomically(path, |mut file| {
        use std::io::Write;
        file.write_all(html.as_bytes())
            .context("writing report body")?;
        Ok(())
    })?;
    info!(bytes = html.len(), "report written");
    Ok(())
}
