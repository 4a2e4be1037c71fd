use std::io::Read;
use std::path::Path;

use anyhow::Context;
use tracing::debug;

use crate::models::RawTable;

/// Reads a sheet export. The first `skip_rows` lines are discarded, the next line
/// is the header and everything after it is data.
pub fn read_export(path: &Path, skip_rows: usize) -> anyhow::Result<RawTable> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open export {}", path.display()))?;
    read_export_from(file, skip_rows)
        .with_context(|| format!("failed to read {}", path.display()))
}

pub fn read_export_from<R: Read>(reader: R, skip_rows: usize) -> anyhow::Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut lines = reader.records().skip(skip_rows);

    let columns = match lines.next() {
        Some(header) => header
            .context("failed to parse header row")?
            .iter()
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    };

    let mut rows = Vec::new();
    for (index, line) in lines.enumerate() {
        let line = line.with_context(|| format!("failed to parse data row {}", index + 1))?;
        rows.push(line.iter().map(str::to_string).collect());
    }

    debug!(columns = columns.len(), rows = rows.len(), "read campaign export");
    Ok(RawTable::new(columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const EXPORT: &str = "\
Exported from campaign sheet,,,
Year,Month,Day,Time,Number,Campaign,Type,Message,Variant,Received,Opens,Unique Opens,Clicks,Unique Clicks,Unsubscribed
2024,3,5,09:00,1,Spring,promo,\"Sale, today\",A,\"1,000\",300,250,80,50,2
2024,3,6,09:00,1,Spring,promo,Reminder,B,900,200,150,40,30,1
";

    #[test]
    fn skips_banner_and_reads_header() {
        let table = read_export_from(EXPORT.as_bytes(), 1).unwrap();
        assert_eq!(table.columns.len(), 15);
        assert_eq!(table.columns[5], "Campaign");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][7], "Sale, today");
        assert_eq!(table.rows[0][9], "1,000");
    }

    #[test]
    fn empty_input_has_no_columns() {
        let table = read_export_from("".as_bytes(), 1).unwrap();
        assert!(table.columns.is_empty());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(EXPORT.as_bytes()).unwrap();
        let table = read_export(file.path(), 1).unwrap();
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = read_export(Path::new("/definitely/not/here.csv"), 1).unwrap_err();
        assert!(err.to_string().contains("failed to open export"));
    }
}
