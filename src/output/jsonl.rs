//! JSON Lines sink: one serialized record per line, appended as emitted

use crate::output::record::JobRecord;
use crate::output::{RecordSink, SinkError, SinkResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

/// Writes records as newline-delimited JSON to a file.
///
/// Workers emit concurrently, so the writer sits behind a mutex; each push
/// writes and flushes one full line.
pub struct JsonLinesSink {
    writer: Mutex<BufWriter<File>>,
    path: String,
}

impl JsonLinesSink {
    /// Creates (truncating) the output file at the given path
    pub fn create(path: &Path) -> SinkResult<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.display().to_string(),
        })
    }

    /// Path this sink writes to
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl RecordSink for JsonLinesSink {
    fn push(&self, record: &JobRecord) -> SinkResult<()> {
        let line = serde_json::to_string(record)
            .map_err(|e| SinkError::Serialize(e.to_string()))?;
        let mut writer = self.writer.lock().unwrap();
        writeln!(writer, "{line}")?;
        writer.flush()?;
        Ok(())
    }
}
