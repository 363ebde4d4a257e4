//! Stdio adapters for the pipeline collaborators.
//!
//! The daemon speaks JSON lines on both ends: records go to stdout one
//! object per line, control tasks arrive on stdin one object per line.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;

use sshwatch_core::error::{SinkError, TaskError};
use sshwatch_core::pipeline::{RecordSink, TaskSource};
use sshwatch_core::types::{Record, Task};

/// Writes each record as a single JSON line and flushes after every write.
pub struct JsonLineSink<W> {
    writer: Mutex<W>,
}

impl JsonLineSink<tokio::io::Stdout> {
    /// Sink over the process stdout.
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> JsonLineSink<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consume the sink and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W> RecordSink for JsonLineSink<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn send_record(&self, record: Record) -> Result<(), SinkError> {
        let mut line =
            serde_json::to_vec(&record).map_err(|e| SinkError::Encode(e.to_string()))?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }
}

/// Reads control tasks as JSON lines.
///
/// End of input is reported as [`TaskError::Closed`]. Blank lines are skipped.
pub struct JsonLineTaskSource<R> {
    reader: R,
    buf: String,
}

impl JsonLineTaskSource<BufReader<tokio::io::Stdin>> {
    /// Task source over the process stdin.
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R> JsonLineTaskSource<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
        }
    }
}

impl<R> TaskSource for JsonLineTaskSource<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async fn receive_task(&mut self) -> Result<Task, TaskError> {
        loop {
            self.buf.clear();
            let n = self.reader.read_line(&mut self.buf).await?;
            if n == 0 {
                return Err(TaskError::Closed);
            }

            let line = self.buf.trim();
            if line.is_empty() {
                continue;
            }

            return serde_json::from_str(line).map_err(|e| TaskError::Decode(e.to_string()));
        }
    }
}
