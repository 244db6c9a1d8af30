// src/config.rs

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::{collections::BTreeMap, fs, path::Path};
use tracing::{debug, info};

use crate::population::PopulationTable;
use crate::process::sort::SortPolicy;

pub const DEFAULT_TITLE: &str = "Patents per Million (stacked by year)";

/// Blues and greens, grey last for overflow. Colours cycle when years exceed it.
pub static DEFAULT_PALETTE: Lazy<Vec<String>> = Lazy::new(|| {
    [
        "#2E7CB6", "#86BC25", "#0B4F8A", "#A6CE39", "#1C5A99", "#6FAE21", "#154A7D", "#C3E26A",
        "#6D6E71",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect()
});

/// Optional YAML (or JSON) config file. Every key may be omitted.
///
/// ```yaml
/// sort: "year:2021"
/// title: Patents per million
/// palette: ["#2E7CB6", "#86BC25"]
/// population:
///   DEU: 83.0
///   FRA: 68.0
/// ```
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub population: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    pub palette: Option<Vec<String>>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
}

impl FileConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }
}

/// Fully resolved run settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub policy: SortPolicy,
    pub population: PopulationTable,
    pub palette: Vec<String>,
    pub title: String,
}

impl Settings {
    /// Command-line values win over the config file; the file wins over defaults.
    pub fn resolve(
        cli_sort: Option<&str>,
        cli_title: Option<&str>,
        file: FileConfig,
    ) -> Result<Self> {
        let policy = match cli_sort.or(file.sort.as_deref()) {
            Some(selector) => selector
                .parse::<SortPolicy>()
                .context("resolving sort policy")?,
            None => SortPolicy::default(),
        };

        let population = match file.population {
            Some(map) => {
                debug!(entries = map.len(), "population table from config");
                PopulationTable::from_pairs(map)
            }
            None => PopulationTable::builtin(),
        };

        let palette = match file.palette {
            Some(p) if p.is_empty() => bail!("palette must contain at least one colour"),
            Some(p) => p,
            None => DEFAULT_PALETTE.clone(),
        };

        let title = cli_title
            .map(str::to_string)
            .or(file.title)
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        info!(policy = %policy, countries = population.len(), "settings resolved");
        Ok(Self {
            policy,
            population,
            palette,
            title,
        })
    }
}
