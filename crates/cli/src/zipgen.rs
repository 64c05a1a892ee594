//! One-shot reformat of a geocoding CSV into a zip-code lookup table.
//! Pure data shuttling, no matching logic.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::CliError;

#[derive(Debug, Deserialize)]
struct GeoRow {
    postal_code: String,
    place_name: Option<String>,
    state_code: String,
    county_name: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Serialize)]
struct ZipEntry {
    place_name: Option<String>,
    county_name: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

pub fn cmd_zip_table(input: &Path, state: &str, out: &Path) -> Result<(), CliError> {
    let text = std::fs::read_to_string(input)
        .map_err(|e| CliError::io(format!("cannot read {}: {}", input.display(), e)))?;

    let table = build_table(&text, state)?;
    if table.is_empty() {
        eprintln!("warning: no rows for state {state}");
    }

    let json = serde_json::to_string_pretty(&table)
        .map_err(|e| CliError::io(format!("cannot serialize zip table: {e}")))?;
    std::fs::write(out, json + "\n")
        .map_err(|e| CliError::io(format!("cannot write {}: {}", out.display(), e)))?;

    println!("wrote {} zip code records to {}", table.len(), out.display());
    Ok(())
}

/// Sorted zip -> entry map for one state. Later duplicates of a zip win,
/// matching the upstream dataset's row order semantics.
fn build_table(csv_data: &str, state: &str) -> Result<BTreeMap<String, ZipEntry>, CliError> {
    let mut reader = csv::Reader::from_reader(csv_data.as_bytes());
    let mut table = BTreeMap::new();

    for row in reader.deserialize() {
        let row: GeoRow = row.map_err(|e| CliError::parse(format!("geocoding CSV: {e}")))?;
        if row.state_code != state || row.postal_code.is_empty() {
            continue;
        }
        table.insert(
            row.postal_code,
            ZipEntry {
                place_name: row.place_name,
                county_name: row.county_name,
                latitude: row.latitude,
                longitude: row.longitude,
            },
        );
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
postal_code,place_name,state_code,county_name,latitude,longitude
01608,Worcester,MA,Worcester,42.2626,-71.8023
02108,Boston,MA,Suffolk,42.3583,-71.0603
10001,New York,NY,New York,40.7484,-73.9967
01002,Amherst,MA,Hampshire,,
";

    #[test]
    fn filters_by_state_and_sorts_keys() {
        let table = build_table(CSV, "MA").unwrap();
        let keys: Vec<_> = table.keys().collect();
        assert_eq!(keys, ["01002", "01608", "02108"]);
        assert_eq!(table["02108"].place_name.as_deref(), Some("Boston"));
        assert_eq!(table["02108"].latitude, Some(42.3583));
    }

    #[test]
    fn missing_coordinates_become_null() {
        let table = build_table(CSV, "MA").unwrap();
        let amherst = &table["01002"];
        assert_eq!(amherst.latitude, None);
        let json = serde_json::to_value(amherst).unwrap();
        assert!(json["latitude"].is_null());
    }

    #[test]
    fn rejects_malformed_rows() {
        let bad = "postal_code,place_name,state_code,county_name,latitude,longitude\n\
01608,Worcester,MA,Worcester,not-a-number,0\n";
        assert!(build_table(bad, "MA").is_err());
    }
}
