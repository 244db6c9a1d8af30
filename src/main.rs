use anyhow::Result;
use clap::Parser;
use patentscope::{
    config::{FileConfig, Settings},
    pipeline::{run, InputKind, RunOptions},
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Patents per million inhabitants, as a stacked-by-year column chart.
#[derive(Debug, Parser)]
#[command(name = "patentscope", version, about)]
struct Cli {
    /// OECD-style CSV export (COUNTRY, Country, TIME_PERIOD, OBS_VALUE).
    #[arg(short, long, default_value = "countriespatentsfiltered.csv")]
    input: PathBuf,

    /// Treat --input as a normalized table written by a previous run.
    #[arg(long)]
    from_normalized: bool,

    /// Normalized reference table.
    #[arg(long, default_value = "patents_per_million.csv")]
    output_csv: PathBuf,

    /// HTML chart.
    #[arg(long, default_value = "patents_per_million_chart.html")]
    output_html: PathBuf,

    /// Also write the normalized table as Parquet.
    #[arg(long)]
    parquet: Option<PathBuf>,

    /// YAML/JSON file with `population`, `palette`, `title` and `sort`.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bar order: total, latest or year:YYYY.
    #[arg(short, long)]
    sort: Option<String>,

    /// Chart title.
    #[arg(long)]
    title: Option<String>,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) resolve configuration ────────────────────────────────────
    let cli = Cli::parse();
    let file_config = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(cli.sort.as_deref(), cli.title.as_deref(), file_config)?;

    let opts = RunOptions {
        input: cli.input,
        input_kind: if cli.from_normalized {
            InputKind::Normalized
        } else {
            InputKind::Raw
        },
        output_csv: cli.output_csv,
        output_html: cli.output_html,
        output_parquet: cli.parquet,
        settings,
    };

    // ─── 3) run ──────────────────────────────────────────────────────
    let summary = run(&opts)?;
    info!(
        rows = summary.normalized_rows,
        countries = summary.categories.len(),
        years = summary.years.len(),
        "done"
    );
    for path in &summary.written {
        let shown = path.canonicalize().unwrap_or_else(|_| path.clone());
        info!("saved {}", shown.display());
    }
    Ok(())
}
