//! Result persistence.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use wordgauge_common::records::SessionResult;

/// Writes session results as timestamped pretty-printed JSON files.
pub struct Recorder {
    dir: PathBuf,
}

impl Recorder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist the result, stamped with the current local time.
    pub fn write(&self, result: &SessionResult) -> Result<PathBuf> {
        self.write_at(result, Local::now())
    }

    /// Persist the result with an explicit timestamp. Creates the output
    /// directory on first use.
    pub fn write_at(&self, result: &SessionResult, stamp: DateTime<Local>) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating results directory {}", self.dir.display()))?;

        let filename = format!("vocab_test_result_{}.json", stamp.format("%Y%m%d_%H%M%S"));
        let path = self.dir.join(filename);

        let body = serde_json::to_string_pretty(result).context("serializing session result")?;
        fs::write(&path, body)
            .with_context(|| format!("writing result file {}", path.display()))?;

        info!(path = %path.display(), "session result written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use wordgauge_common::records::{RoundRecord, SessionResult, WordObservation};

    fn sample_result() -> SessionResult {
        let mut result = SessionResult::default();
        result.push_round(RoundRecord::from_observations(
            1,
            vec![WordObservation {
                word: "ubiquitous".to_string(),
                known: true,
                anchor: "word_3".to_string(),
            }],
        ));
        result.final_vocab_size = Some("3406".to_string());
        result
    }

    #[test]
    fn writes_timestamped_file_into_created_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let recorder = Recorder::new(tmp.path().join("results"));
        let stamp = Local.with_ymd_and_hms(2026, 8, 23, 14, 30, 5).unwrap();

        let path = recorder.write_at(&sample_result(), stamp).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "vocab_test_result_20260823_143005.json"
        );

        let body = std::fs::read_to_string(&path).unwrap();
        assert!(body.contains("\"final_vocab_size\": \"3406\""));
        assert!(body.contains("\"for\": \"word_3\""));
    }

    #[test]
    fn distinct_stamps_produce_distinct_files_with_identical_content() {
        let tmp = tempfile::tempdir().unwrap();
        let recorder = Recorder::new(tmp.path());
        let result = sample_result();

        let a = recorder
            .write_at(&result, Local.with_ymd_and_hms(2026, 8, 23, 9, 0, 0).unwrap())
            .unwrap();
        let b = recorder
            .write_at(&result, Local.with_ymd_and_hms(2026, 8, 23, 9, 0, 1).unwrap())
            .unwrap();

        assert_ne!(a, b);
        assert_eq!(
            std::fs::read_to_string(a).unwrap(),
            std::fs::read_to_string(b).unwrap()
        );
    }
}
