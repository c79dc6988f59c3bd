use std::sync::Mutex;

use crate::{AuditSink, AuditWriteError, DetectionEvent, Result};

/// Keeps events in memory, in append order.
#[derive(Debug, Default)]
pub struct MemoryAuditor {
    events: Mutex<Vec<DetectionEvent>>,
}

impl MemoryAuditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything appended so far.
    pub fn events(&self) -> Vec<DetectionEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemoryAuditor {
    fn append(&self, event: &DetectionEvent) -> Result<()> {
        self.events
            .lock()
            .map_err(|_| AuditWriteError::Unavailable("audit lock poisoned".to_string()))?
            .push(event.clone());
        Ok(())
    }
}
