use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::model::{NormalizedObservation, Observation};
use crate::population::PopulationTable;

/// Left-join observations onto the population table and derive the per-capita value.
///
/// Rows without a population entry, or whose entry is not strictly positive,
/// are dropped without error.
#[tracing::instrument(level = "info", skip_all, fields(rows = observations.len()))]
pub fn normalize(
    observations: Vec<Observation>,
    population: &PopulationTable,
) -> Vec<NormalizedObservation> {
    let mut out = Vec::with_capacity(observations.len());
    let mut unmatched: BTreeSet<String> = BTreeSet::new();
    let mut non_positive = 0usize;

    for observation in observations {
        let entry = match population.get(&observation.country_code) {
            Some(entry) => entry,
            None => {
                unmatched.insert(observation.country_code);
                continue;
            }
        };
        if !entry.is_usable() {
            non_positive += 1;
            continue;
        }

        let population_millions = entry.population_millions;
        let per_capita_value = observation.raw_value.map(|v| v / population_millions);
        out.push(NormalizedObservation {
            observation,
            population_millions,
            per_capita_value,
        });
    }

    if !unmatched.is_empty() {
        debug!(codes = ?unmatched, "no population entry; rows dropped");
    }
    if non_positive > 0 {
        debug!(non_positive, "non-positive population; rows dropped");
    }
    info!(kept = out.len(), "normalized");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(code: &str, year: &str, value: Option<f64>) -> Observation {
        Observation::new(code, format!("{} name", code), year, value)
    }

    #[test]
    fn divides_by_population() {
        let population = PopulationTable::from_pairs([("A", 10.0), ("B", 5.0)]);
        let rows = normalize(
            vec![
                obs("A", "2020", Some(10.0)),
                obs("A", "2021", Some(20.0)),
                obs("B", "2020", Some(5.0)),
            ],
            &population,
        );

        let got: Vec<(&str, &str, Option<f64>)> = rows
            .iter()
            .map(|r| {
                (
                    r.observation.country_code.as_str(),
                    r.observation.year.as_str(),
                    r.per_capita_value,
                )
            })
            .collect();
        assert_eq!(
            got,
            vec![
                ("A", "2020", Some(1.0)),
                ("A", "2021", Some(2.0)),
                ("B", "2020", Some(1.0)),
            ]
        );
        assert_eq!(rows[0].population_millions, 10.0);
    }

    #[test]
    fn per_capita_is_unrounded() {
        let population = PopulationTable::from_pairs([("USA", 333.0)]);
        let rows = normalize(vec![obs("USA", "2022", Some(1000.0))], &population);
        let value = rows[0].per_capita_value.expect("value present");
        assert!((value - 1000.0 / 333.0).abs() < 1e-12);
    }

    #[test]
    fn drops_missing_and_non_positive_population() {
        let population = PopulationTable::from_pairs([("A", 2.0), ("Z", 0.0), ("N", -3.0)]);
        let rows = normalize(
            vec![
                obs("A", "2020", Some(4.0)),
                obs("Z", "2020", Some(4.0)),
                obs("N", "2020", Some(4.0)),
                obs("Q", "2020", Some(4.0)),
            ],
            &population,
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].observation.country_code, "A");
        assert!(rows.iter().all(|r| r.population_millions > 0.0));
    }

    #[test]
    fn undefined_raw_value_stays_undefined() {
        let population = PopulationTable::from_pairs([("A", 2.0)]);
        let rows = normalize(vec![obs("A", "2020", None)], &population);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].per_capita_value, None);
    }
}
