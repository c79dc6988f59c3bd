//! JSON-lines file sink

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::{AuditSink, AuditWriteError, DetectionEvent, Result};

/// Appends one JSON object per line to a file.
///
/// The file is opened in append mode for every record, so external rotation
/// is picked up on the next write. A mutex keeps concurrent appends from
/// interleaving.
#[derive(Debug)]
pub struct JsonlAuditor {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonlAuditor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back every record in a log file, in append order.
    pub fn read_events(path: impl AsRef<Path>) -> Result<Vec<DetectionEvent>> {
        let file = std::fs::File::open(path)?;
        let mut events = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            events.push(serde_json::from_str(&line)?);
        }
        Ok(events)
    }
}

impl AuditSink for JsonlAuditor {
    fn append(&self, event: &DetectionEvent) -> Result<()> {
        let mut line = event.to_json_line()?;
        line.push('\n');

        let _guard = self
            .lock
            .lock()
            .map_err(|_| AuditWriteError::Unavailable("audit lock poisoned".to_string()))?;

        let mut options = OpenOptions::new();
        options.create(true).append(true);
        let mut file = options.open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.flush()?;

        tracing::debug!(
            path = %self.path.display(),
            phase = %event.phase,
            "Audit record appended"
        );
        Ok(())
    }
}
