// src/population.rs

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Population (millions) used when no config file supplies one.
static DEFAULT_POPULATION: Lazy<BTreeMap<&'static str, f64>> = Lazy::new(|| {
    BTreeMap::from([
        ("AUS", 27.0),
        ("CHE", 9.0),
        ("DEU", 83.0),
        ("ESP", 48.0),
        ("FRA", 68.0),
        ("GBR", 68.0),
        ("JPN", 125.0),
        ("KOR", 52.0),
        ("NLD", 18.0),
        ("USA", 333.0),
        ("WXOECD", 1350.0),
    ])
});

#[derive(Debug, Clone, PartialEq)]
pub struct PopulationEntry {
    pub country_code: String,
    pub population_millions: f64,
}

impl PopulationEntry {
    /// Only entries with a finite, strictly positive population can normalize a row.
    pub fn is_usable(&self) -> bool {
        self.population_millions.is_finite() && self.population_millions > 0.0
    }
}

/// Read-only lookup from country code to population.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopulationTable {
    entries: BTreeMap<String, PopulationEntry>,
}

impl PopulationTable {
    pub fn builtin() -> Self {
        Self::from_pairs(
            DEFAULT_POPULATION
                .iter()
                .map(|(code, pop)| (code.to_string(), *pop)),
        )
    }

    /// Later pairs override earlier ones with the same code.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(code, population_millions)| {
                let country_code: String = code.into();
                (
                    country_code.clone(),
                    PopulationEntry {
                        country_code,
                        population_millions,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, country_code: &str) -> Option<&PopulationEntry> {
        self.entries.get(country_code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PopulationEntry> {
        self.entries.values()
    }
}
