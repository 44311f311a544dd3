// 📤 Export - JSON snapshots of a module's state
//
// Every module can dump its selections and results as a pretty-printed
// JSON document with a module-specific file name.

use crate::error::{CommandCenterError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportDocument {
    pub file_name: String,
    pub body: serde_json::Value,
}

impl ExportDocument {
    pub fn new<T: Serialize>(file_name: impl Into<String>, body: &T) -> Result<Self> {
        Ok(ExportDocument {
            file_name: file_name.into(),
            body: serde_json::to_value(body)?,
        })
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.body)?)
    }

    /// Write into `dir` (created if missing) and return the file path
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir).map_err(|source| CommandCenterError::Io {
            context: format!("creating export directory {}", dir.display()),
            source,
        })?;

        let path = dir.join(&self.file_name);
        fs::write(&path, self.to_pretty_json()?).map_err(|source| CommandCenterError::Io {
            context: format!("writing {}", path.display()),
            source,
        })?;

        tracing::info!("exported {}", path.display());
        Ok(path)
    }
}

/// Implemented by every module state that has an export button
pub trait Exportable {
    fn export(&self, now: DateTime<Utc>) -> Result<ExportDocument>;
}

/// `YYYY-MM-DD`, used in most export file names
pub fn date_stamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d").to_string()
}

/// Milliseconds since the epoch, used where the file name needs to be unique
pub fn millis_stamp(now: DateTime<Utc>) -> i64 {
    now.timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use tempfile::TempDir;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_stamps() {
        assert_eq!(date_stamp(fixed_now()), "2024-03-15");
        assert_eq!(millis_stamp(fixed_now()), 1_710_498_600_000);
    }

    #[test]
    fn test_write_to_dir() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("nested");
        let doc = ExportDocument::new("cost-projection-2024-03-15.json", &json!({"queries": 3})).unwrap();

        let path = doc.write_to_dir(&target).unwrap();
        assert_eq!(path, target.join("cost-projection-2024-03-15.json"));

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "{\n  \"queries\": 3\n}");
    }

    #[test]
    fn test_write_to_unwritable_dir_is_io_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("not-a-dir");
        fs::write(&file, "x").unwrap();

        let doc = ExportDocument::new("a.json", &json!({})).unwrap();
        let err = doc.write_to_dir(&file).unwrap_err();
        assert!(matches!(err, CommandCenterError::Io { .. }));
    }
}
