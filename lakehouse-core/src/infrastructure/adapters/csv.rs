// lakehouse-core/src/infrastructure/adapters/csv.rs
//
// Bronze reader. CORDIS exports are ';' separated, hand-made files are often ','.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use tracing::{debug, instrument};

use crate::domain::silver::RawTable;
use crate::infrastructure::error::InfrastructureError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reads a Bronze file into untyped rows.
///
/// Rows whose width differs from the header are counted as malformed and dropped.
/// Unnamed index columns left by spreadsheet exports are removed.
#[instrument(skip_all, fields(file = %path.display()))]
pub fn read_bronze(path: &Path) -> Result<RawTable, InfrastructureError> {
    let file_label = path.display().to_string();
    let delimiter = sniff_delimiter(path)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(true)
        .from_reader(strip_bom(File::open(path)?)?);

    let raw_headers = reader
        .byte_headers()
        .map_err(|source| InfrastructureError::Csv {
            file: file_label.clone(),
            source,
        })?
        .clone();

    let keep: Vec<usize> = raw_headers
        .iter()
        .enumerate()
        .filter(|(_, h)| {
            let h = String::from_utf8_lossy(h);
            let h = h.trim();
            !h.is_empty() && !h.starts_with("Unnamed")
        })
        .map(|(i, _)| i)
        .collect();
    let headers: Vec<String> = keep
        .iter()
        .map(|&i| lossy(raw_headers.get(i).unwrap_or_default()))
        .collect();

    let mut rows = Vec::new();
    let mut malformed = 0;
    for record in reader.byte_records() {
        let record = match record {
            Ok(record) => record,
            // Broken quoting or invalid framing on a single line
            Err(e) if !matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                malformed += 1;
                continue;
            }
            Err(source) => {
                return Err(InfrastructureError::Csv {
                    file: file_label,
                    source,
                });
            }
        };
        if record.len() != raw_headers.len() {
            malformed += 1;
            continue;
        }
        if record.iter().all(|f| f.iter().all(u8::is_ascii_whitespace)) {
            continue;
        }
        rows.push(
            keep.iter()
                .map(|&i| lossy(record.get(i).unwrap_or_default()))
                .collect(),
        );
    }

    debug!(
        columns = headers.len(),
        rows = rows.len(),
        malformed,
        delimiter = %(delimiter as char),
        "Bronze file read"
    );

    let mut table = RawTable::new(headers, rows);
    table.malformed = malformed;
    Ok(table)
}

/// Picks ';' or ',' from whichever appears more often in the header line.
fn sniff_delimiter(path: &Path) -> Result<u8, InfrastructureError> {
    let mut first_line = Vec::new();
    BufReader::new(File::open(path)?).read_until(b'\n', &mut first_line)?;
    let count = |needle: u8| first_line.iter().filter(|&&b| b == needle).count();
    Ok(if count(b',') > count(b';') { b',' } else { b';' })
}

fn strip_bom(file: File) -> Result<impl Read, InfrastructureError> {
    let mut reader = BufReader::new(file);
    if reader.fill_buf()?.starts_with(UTF8_BOM) {
        reader.consume(UTF8_BOM.len());
    }
    Ok(reader)
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_semicolon_export_with_bom_and_index_column() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("project.csv");
        fs::write(
            &path,
            "\u{feff}Unnamed: 0;id;acronym;title\n0;101;ABC;\"Solar; panels\"\n1;102;DEF;Wind\n",
        )?;

        let table = read_bronze(&path)?;

        assert_eq!(table.headers, vec!["id", "acronym", "title"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][2], "Solar; panels");
        assert_eq!(table.malformed, 0);
        Ok(())
    }

    #[test]
    fn test_comma_file_counts_ragged_rows() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("topics.csv");
        fs::write(&path, "projectID,topic,title\n1,T1,Energy\n2,T2\n3,T3,Health\n")?;

        let table = read_bronze(&path)?;

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.malformed, 1);
        Ok(())
    }

    #[test]
    fn test_header_only_file_is_empty() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("webLink.csv");
        fs::write(&path, "id;projectID;physUrl\n")?;

        let table = read_bronze(&path)?;

        assert_eq!(table.headers.len(), 3);
        assert!(table.rows.is_empty());
        Ok(())
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = read_bronze(Path::new("/nonexistent/project.csv"));
        assert!(matches!(result, Err(InfrastructureError::Io(_))));
    }
}
