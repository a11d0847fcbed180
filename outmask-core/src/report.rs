//! report.rs - Redaction statistics and the per-run JSON report.
//!
//! Secrets never appear in a report. Each needle is identified by a short SHA-256
//! fingerprint, which is enough to tell configured values apart without exposing them.
//!
//! License: MIT OR APACHE 2.0

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::errors::{OutmaskError, Result};
use crate::sanitizers::compiler::SkipTable;

/// Hex digits of the SHA-256 digest kept in a fingerprint.
const FINGERPRINT_HEX_LEN: usize = 12;

/// Running counters kept by a [`crate::Redactor`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedactionStats {
    /// Bytes handed to the redactor.
    pub bytes_in: u64,
    /// Bytes written to the sink.
    pub bytes_out: u64,
    /// Matches per needle, indexed like [`SkipTable::needles`].
    pub occurrences: Vec<u64>,
}

impl RedactionStats {
    pub fn new(needle_count: usize) -> Self {
        Self {
            bytes_in: 0,
            bytes_out: 0,
            occurrences: vec![0; needle_count],
        }
    }

    pub fn total_redactions(&self) -> u64 {
        self.occurrences.iter().sum()
    }
}

/// Short, stable identifier for a secret value, e.g. `sha256:9f86d081884c`.
pub fn needle_fingerprint(needle: &[u8]) -> String {
    let digest = hex::encode(Sha256::digest(needle));
    format!("sha256:{}", &digest[..FINGERPRINT_HEX_LEN])
}

/// How often a single (fingerprinted) secret was redacted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeedleSummary {
    pub fingerprint: String,
    pub occurrences: u64,
}

/// Totals for one redacted stream, e.g. a job's stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamReport {
    pub name: String,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub redactions: u64,
    /// Only needles that matched at least once.
    pub needles: Vec<NeedleSummary>,
}

impl StreamReport {
    pub fn from_stats(name: impl Into<String>, table: &SkipTable, stats: &RedactionStats) -> Self {
        let needles = table
            .needles()
            .iter()
            .zip(&stats.occurrences)
            .filter(|(_, count)| **count > 0)
            .map(|(needle, &count)| NeedleSummary {
                fingerprint: needle_fingerprint(needle),
                occurrences: count,
            })
            .collect();

        Self {
            name: name.into(),
            bytes_in: stats.bytes_in,
            bytes_out: stats.bytes_out,
            redactions: stats.total_redactions(),
            needles,
        }
    }
}

/// Everything known about one redacted job run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// The supervised command line, or `None` when filtering stdin.
    pub command: Option<Vec<String>>,
    pub exit_code: Option<i32>,
    pub needle_count: usize,
    pub streams: Vec<StreamReport>,
}

impl RunReport {
    pub fn start(command: Option<Vec<String>>, needle_count: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            command,
            exit_code: None,
            needle_count,
            streams: Vec::new(),
        }
    }

    pub fn add_stream(&mut self, stream: StreamReport) {
        self.streams.push(stream);
    }

    pub fn finish(&mut self, exit_code: Option<i32>) {
        self.exit_code = exit_code;
        self.finished_at = Some(Utc::now());
    }

    pub fn total_redactions(&self) -> u64 {
        self.streams.iter().map(|s| s.redactions).sum()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(OutmaskError::from)
    }

    /// Writes the report as pretty-printed JSON.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        info!("Wrote run report {} to {}.", self.run_id, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_short_and_stable() {
        let fp = needle_fingerprint(b"test");
        assert_eq!(fp, "sha256:9f86d081884c");
        assert_eq!(fp, needle_fingerprint(b"test"));
        assert_ne!(fp, needle_fingerprint(b"Test"));
    }

    #[test]
    fn test_stream_report_skips_unmatched_needles() {
        let table = SkipTable::compile(["hunter2", "s3cr3t"], "#");
        let stats = RedactionStats {
            bytes_in: 40,
            bytes_out: 30,
            occurrences: vec![0, 2],
        };
        let report = StreamReport::from_stats("stdout", &table, &stats);
        assert_eq!(report.redactions, 2);
        assert_eq!(report.needles.len(), 1);
        assert_eq!(report.needles[0].fingerprint, needle_fingerprint(b"s3cr3t"));
        assert_eq!(report.needles[0].occurrences, 2);
    }

    #[test]
    fn test_run_report_json_never_contains_secrets() -> Result<()> {
        let table = SkipTable::compile(["hunter2"], "#");
        let stats = RedactionStats {
            bytes_in: 10,
            bytes_out: 4,
            occurrences: vec![1],
        };
        let mut report = RunReport::start(Some(vec!["make".into(), "deploy".into()]), 1);
        report.add_stream(StreamReport::from_stats("stdout", &table, &stats));
        report.finish(Some(0));

        let json = report.to_json()?;
        assert!(!json.contains("hunter2"));
        assert!(json.contains("\"exit_code\": 0"));
        assert_eq!(report.total_redactions(), 1);

        let parsed: RunReport = serde_json::from_str(&json)?;
        assert_eq!(parsed.run_id, report.run_id);
        assert_eq!(parsed.streams, report.streams);
        Ok(())
    }
}
