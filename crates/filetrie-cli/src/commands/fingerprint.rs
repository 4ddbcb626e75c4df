//! `filetrie fingerprint`.

use std::fmt;
use std::path::PathBuf;

use filetrie_storage::{expected_chunks, fingerprint_all, ByteSource, FileSource};
use filetrie_types::Fingerprint;
use serde::Serialize;
use tracing::{error, info};

use super::emit;
use crate::config::OutputFormat;

#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: String,
    pub size: u64,
    pub chunks: u64,
    pub fingerprint: Fingerprint,
}

impl fmt::Display for FileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {:>12}  {:>9}  {}",
            self.fingerprint, self.size, self.chunks, self.path
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
struct Reports(Vec<FileReport>);

impl fmt::Display for Reports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, report) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{report}")?;
        }
        Ok(())
    }
}

/// Fingerprint every path, at most `max_concurrent` at a time.
///
/// Files that fail are logged and skipped; the command fails at the end if
/// any did.
pub async fn run(
    paths: Vec<PathBuf>,
    max_concurrent: usize,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let total = paths.len();
    let mut failed = 0usize;

    let mut sources = Vec::with_capacity(total);
    for path in &paths {
        match FileSource::new(path).await {
            Ok(source) => sources.push(source),
            Err(e) => {
                error!(path = %path.display(), error = %e, "cannot open file");
                failed += 1;
            }
        }
    }

    info!(files = sources.len(), max_concurrent, "fingerprinting");
    let results = fingerprint_all(sources.clone(), max_concurrent).await;

    let mut reports = Vec::with_capacity(sources.len());
    for (source, result) in sources.iter().zip(results) {
        match result {
            Ok(fingerprint) => reports.push(FileReport {
                path: source.path().display().to_string(),
                size: source.size(),
                chunks: expected_chunks(source.size()),
                fingerprint,
            }),
            Err(e) => {
                error!(path = %source.path().display(), error = %e, "fingerprint failed");
                failed += 1;
            }
        }
    }

    if !reports.is_empty() {
        emit(format, &Reports(reports))?;
    }
    if failed > 0 {
        anyhow::bail!("{failed} of {total} files could not be fingerprinted");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_report_columns() {
        let report = FileReport {
            path: "a.bin".to_string(),
            size: 2048,
            chunks: 2,
            fingerprint: Fingerprint::default(),
        };
        let line = report.to_string();
        assert!(line.starts_with("0x0000"));
        assert!(line.ends_with("a.bin"));
        assert!(line.contains(" 2048 "));
    }

    #[test]
    fn test_json_reports_are_an_array() {
        let reports = Reports(vec![FileReport {
            path: "a.bin".to_string(),
            size: 1,
            chunks: 1,
            fingerprint: Fingerprint::default(),
        }]);
        let json = serde_json::to_value(&reports).expect("serialize");
        assert_eq!(json[0]["chunks"], 1);
        assert_eq!(json[0]["path"], "a.bin");
    }
}
