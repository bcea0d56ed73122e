//! JSONL file writer for provider failure records.
//!
//! Each [`FailureRecord`] is serialized as a single JSON line with a `type`
//! field and an RFC 3339 `timestamp`, appended via a buffered writer.

use colloquy_application::ports::error_sink::{ErrorSink, FailureRecord};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Value of the `type` field on every line
const RECORD_TYPE: &str = "provider_failure";

/// Error sink that appends one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every record
/// and on `Drop`.
pub struct JsonlErrorSink {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlErrorSink {
    /// Open `path` for appending, creating it and its parent directories.
    ///
    /// Returns `None` if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create error log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open error log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn to_line(record: &FailureRecord) -> Option<String> {
    let timestamp = record
        .timestamp
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    let mut value = serde_json::to_value(record).ok()?;
    if let serde_json::Value::Object(map) = &mut value {
        map.insert(
            "type".to_string(),
            serde_json::Value::String(RECORD_TYPE.to_string()),
        );
        map.insert(
            "timestamp".to_string(),
            serde_json::Value::String(timestamp),
        );
    }
    serde_json::to_string(&value).ok()
}

impl ErrorSink for JsonlErrorSink {
    fn record(&self, record: FailureRecord) {
        let Some(line) = to_line(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlErrorSink {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
