//! CSV report writing. Column order is the `ReportRow` field order.

use std::path::Path;

use courtsync_recon::model::ReconResult;

use crate::CliError;

pub fn write_report(path: &Path, result: &ReconResult) -> Result<(), CliError> {
    let file = std::fs::File::create(path)
        .map_err(|e| CliError::io(format!("cannot create {}: {}", path.display(), e)))?;
    let mut writer = csv::Writer::from_writer(std::io::BufWriter::new(file));

    for row in &result.rows {
        writer
            .serialize(row)
            .map_err(|e| CliError::io(format!("CSV write error: {}", e)))?;
    }

    writer
        .flush()
        .map_err(|e| CliError::io(format!("CSV flush error: {}", e)))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use courtsync_recon::engine::run;
    use courtsync_recon::model::{CourtRecord, ReconInput};
    use courtsync_recon::ReconConfig;

    use super::*;

    #[test]
    fn report_has_header_and_one_row_per_record() {
        let mut record = CourtRecord::default();
        record.source_file = "courts.json".into();
        record.name = "Central Court".into();
        record.address.city = "Riverton".into();

        let input = ReconInput {
            records: vec![record],
            locations: Vec::new(),
            verifications: BTreeMap::new(),
        };
        let result = run(&ReconConfig::default(), &input);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        write_report(&path, &result).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("source_file,court_name,code,"));
        assert!(lines[0].ends_with(",secondary_source_confidence,final_action"));
        assert!(lines[1].contains("Central Court"));
        assert!(lines[1].contains("review"));
    }
}
