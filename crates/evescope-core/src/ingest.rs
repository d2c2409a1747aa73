use std::fs::File;
use std::io::{BufRead, BufReader, Lines, Read};
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};

// ---------------------------------------------------------------------------
// EveReader: streaming record source for EVE log files
// ---------------------------------------------------------------------------

/// Reads an EVE log and yields one record at a time as loosely-typed JSON.
/// The normal format is NDJSON (one object per line); a file that starts
/// with `[` is treated as an array-style export and read whole.
///
/// Blank lines are skipped, unparsable lines are skipped and counted in
/// `parse_errors`. The engine downstream never sees a malformed record.
pub struct EveReader {
    pub filename: String,
    pub file_sha256: String,
    pub file_size: u64,
    pub records_read: u64,
    pub parse_errors: u64,
    source: RecordSource,
}

enum RecordSource {
    Lines(Lines<BufReader<File>>),
    Array(std::vec::IntoIter<Value>),
}

impl EveReader {
    pub fn from_file(path: &Path) -> Result<Self> {
        let filename = path
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let file_size = std::fs::metadata(path)
            .with_context(|| format!("cannot stat {}", path.display()))?
            .len();

        let file_sha256 = compute_file_sha256(path)?;

        tracing::info!(
            file = %filename,
            size = file_size,
            sha256 = %file_sha256,
            "ingesting eve log"
        );

        let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
        let mut reader = BufReader::new(file);

        let source = if leads_with_bracket(&mut reader)? {
            let parsed: Value = serde_json::from_reader(reader)
                .with_context(|| format!("cannot parse array export {}", path.display()))?;
            let records = match parsed {
                Value::Array(items) => items.into_iter().filter(Value::is_object).collect(),
                _ => {
                    tracing::warn!(file = %filename, "array export did not contain an array");
                    Vec::new()
                }
            };
            RecordSource::Array(records.into_iter())
        } else {
            RecordSource::Lines(reader.lines())
        };

        Ok(Self {
            filename,
            file_sha256,
            file_size,
            records_read: 0,
            parse_errors: 0,
            source,
        })
    }

    /// Next well-formed record, or `None` at end of input.
    pub fn next_record(&mut self) -> Option<Value> {
        match &mut self.source {
            RecordSource::Array(records) => {
                let record = records.next()?;
                self.records_read += 1;
                Some(record)
            }
            RecordSource::Lines(lines) => loop {
                let line = match lines.next()? {
                    Ok(line) => line,
                    Err(err) => {
                        tracing::warn!(error = %err, "read failed, stopping ingest");
                        return None;
                    }
                };
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match serde_json::from_str(trimmed) {
                    Ok(record) => {
                        self.records_read += 1;
                        return Some(record);
                    }
                    Err(_) => {
                        self.parse_errors += 1;
                    }
                }
            },
        }
    }
}

impl Iterator for EveReader {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        self.next_record()
    }
}

/// Peek whether the first non-whitespace byte is `[` without consuming input.
fn leads_with_bracket(reader: &mut BufReader<File>) -> Result<bool> {
    let buf = reader.fill_buf().context("cannot read input")?;
    Ok(buf
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'['))
}

fn compute_file_sha256(path: &Path) -> Result<String> {
    let mut file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 65536];
    loop {
        let n = file
            .read(&mut buf)
            .with_context(|| format!("cannot read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    let digest = hasher.finalize();
    Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "evescope-ingest-{}-{}",
            std::process::id(),
            name
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_ndjson_skips_blank_and_malformed_lines() {
        let path = temp_file(
            "ndjson",
            "{\"event_type\": \"dns\"}\n\nnot json at all\n{\"event_type\": \"http\"}\n",
        );

        let mut reader = EveReader::from_file(&path).unwrap();
        let records: Vec<Value> = reader.by_ref().collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["event_type"], "dns");
        assert_eq!(records[1]["event_type"], "http");
        assert_eq!(reader.records_read, 2);
        assert_eq!(reader.parse_errors, 1);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_array_export_fallback() {
        let path = temp_file(
            "array",
            "[{\"event_type\": \"tls\"}, 17, {\"event_type\": \"alert\"}]",
        );

        let mut reader = EveReader::from_file(&path).unwrap();
        let records: Vec<Value> = reader.by_ref().collect();

        // Non-object elements are dropped.
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["event_type"], "tls");
        assert_eq!(reader.records_read, 2);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_metadata_captured_on_open() {
        let contents = "{\"event_type\": \"dns\"}\n";
        let path = temp_file("meta", contents);

        let reader = EveReader::from_file(&path).unwrap();
        assert_eq!(reader.file_size, contents.len() as u64);
        assert_eq!(reader.file_sha256.len(), 64);
        assert!(reader.filename.starts_with("evescope-ingest-"));

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let missing = std::env::temp_dir().join("evescope-ingest-definitely-missing.json");
        assert!(EveReader::from_file(&missing).is_err());
    }
}
