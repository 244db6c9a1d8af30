use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::{fs::File, io::Read, path::Path};
use tracing::{debug, info};

use crate::model::Observation;
use crate::process::utils::{clean_str, parse_number};

pub const COL_COUNTRY: &str = "COUNTRY";
pub const COL_COUNTRY_NAME: &str = "Country";
pub const COL_TIME_PERIOD: &str = "TIME_PERIOD";
pub const COL_OBS_VALUE: &str = "OBS_VALUE";

/// Column positions of the four fields we read; everything else is ignored.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    country: usize,
    country_name: usize,
    time_period: usize,
    obs_value: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let names: Vec<String> = headers
            .iter()
            .map(|h| clean_str(h.trim_start_matches('\u{feff}')))
            .collect();
        let find = |wanted: &str| {
            names
                .iter()
                .position(|n| n == wanted)
                .ok_or_else(|| anyhow!("missing required column `{}`", wanted))
        };
        Ok(Self {
            country: find(COL_COUNTRY)?,
            country_name: find(COL_COUNTRY_NAME)?,
            time_period: find(COL_TIME_PERIOD)?,
            obs_value: find(COL_OBS_VALUE)?,
        })
    }
}

/// Read an OECD-style export. Any I/O or CSV error, or a missing required
/// column, is fatal.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn read_observations<P: AsRef<Path>>(path: P) -> Result<Vec<Observation>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening input {}", path.display()))?;
    let rows = parse_observations(file).with_context(|| format!("reading {}", path.display()))?;
    info!(rows = rows.len(), "observations read");
    Ok(rows)
}

pub fn parse_observations<R: Read>(reader: R) -> Result<Vec<Observation>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers().context("reading header row")?.clone();
    let idx = ColumnIndex::from_headers(&headers)?;
    debug!(?idx, "located columns");

    let mut out = Vec::new();
    for (n, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error at record {}", n + 1))?;
        let cell = |i: usize| record.get(i).map(clean_str).unwrap_or_default();
        let country_code = cell(idx.country);
        if country_code.is_empty() {
            continue;
        }
        out.push(Observation {
            country_code,
            country_name: cell(idx.country_name),
            year: cell(idx.time_period),
            raw_value: record.get(idx.obs_value).and_then(parse_number),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    #[test]
    fn reads_required_columns_in_any_order() -> Result<()> {
        let data = "\u{feff}STRUCTURE,TIME_PERIOD,OBS_VALUE,COUNTRY,Country,UNIT\n\
                    DF,2020,1200,DEU,Germany,NUM\n\
                    DF,2021.0,,FRA,France,NUM\n\
                    DF,2022,oops,USA,United States\n";
        let rows = parse_observations(Cursor::new(data))?;

        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0],
            Observation::new("DEU", "Germany", "2020", Some(1200.0))
        );
        assert_eq!(rows[1].year, "2021.0");
        assert_eq!(rows[1].raw_value, None);
        assert_eq!(rows[2].raw_value, None);
        assert_eq!(rows[2].country_name, "United States");
        Ok(())
    }

    #[test]
    fn missing_column_is_an_error() {
        let data = "COUNTRY,Country,TIME_PERIOD\nDEU,Germany,2020\n";
        let err = parse_observations(Cursor::new(data)).unwrap_err();
        assert!(err.to_string().contains("OBS_VALUE"));
    }

    #[test]
    fn blank_country_rows_are_skipped() -> Result<()> {
        let data = "COUNTRY,Country,TIME_PERIOD,OBS_VALUE\n,,2020,1\nJPN,Japan,2020,5\n";
        let rows = parse_observations(Cursor::new(data))?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].country_code, "JPN");
        Ok(())
    }

    #[test]
    fn padded_and_quoted_codes_join_population() -> Result<()> {
        let data = "COUNTRY,Country,TIME_PERIOD,OBS_VALUE\n\" DEU \",Germany,2020,166\n";
        let rows = parse_observations(Cursor::new(data))?;
        assert_eq!(rows[0].country_code, "DEU");

        let population = crate::population::PopulationTable::from_pairs([("DEU", 83.0)]);
        let normalized = crate::process::normalize::normalize(rows, &population);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].per_capita_value, Some(2.0));
        Ok(())
    }

    #[test]
    fn reads_from_disk() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        write!(tmp, "COUNTRY,Country,TIME_PERIOD,OBS_VALUE\nKOR,Korea,2019,52\n")?;
        let rows = read_observations(tmp.path())?;
        assert_eq!(rows, vec![Observation::new("KOR", "Korea", "2019", Some(52.0))]);
        Ok(())
    }

    #[test]
    fn missing_file_is_fatal() {
        assert!(read_observations("/no/such/input.csv").is_err());
    }
}
