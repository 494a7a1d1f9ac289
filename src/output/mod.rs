//! Output handling: record types and the result sink
//!
//! The crawler emits each record exactly once through a [`RecordSink`].
//! The default sink appends JSON Lines to a file; tests use the in-memory
//! sink to assert on emitted records.

mod jsonl;
mod record;

pub use jsonl::JsonLinesSink;
pub use record::{JobRecord, RawRecord, RawSalary};

use std::sync::Mutex;
use thiserror::Error;

/// Errors that can occur while emitting records
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to serialize record: {0}")]
    Serialize(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for emitted job records.
///
/// Implementations must be safe to call from multiple workers; the crawler
/// shares one sink across the pool.
pub trait RecordSink: Send + Sync {
    fn push(&self, record: &JobRecord) -> SinkResult<()>;
}

/// In-memory sink collecting records for inspection in tests
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<JobRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far
    pub fn records(&self) -> Vec<JobRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordSink for MemorySink {
    fn push(&self, record: &JobRecord) -> SinkResult<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_collects_records() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());

        sink.push(&JobRecord::stub("https://careerviet.vn/jobs/a-1.html"))
            .unwrap();
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.records()[0].url, "https://careerviet.vn/jobs/a-1.html");
    }
}
