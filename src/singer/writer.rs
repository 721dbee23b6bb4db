//! Line-oriented message writer

use super::messages::Message;
use crate::error::Result;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Which messages reach the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Every message
    #[default]
    All,
    /// `SCHEMA` messages only (`--test schema`)
    SchemaOnly,
    /// Nothing (`--test`)
    Nothing,
}

impl OutputMode {
    fn allows(self, message: &Message) -> bool {
        match self {
            OutputMode::All => true,
            OutputMode::SchemaOnly => message.is_schema(),
            OutputMode::Nothing => false,
        }
    }
}

/// Writes Singer messages as JSON lines
pub struct MessageWriter {
    out: Box<dyn Write + Send>,
    mode: OutputMode,
    written: u64,
}

impl std::fmt::Debug for MessageWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageWriter")
            .field("mode", &self.mode)
            .field("written", &self.written)
            .finish()
    }
}

impl MessageWriter {
    /// Writer over any sink
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Box::new(out),
            mode: OutputMode::default(),
            written: 0,
        }
    }

    /// Writer over stdout
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    #[must_use]
    pub fn with_mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Messages actually written
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Write one message, flushing after `STATE`
    pub fn write(&mut self, message: &Message) -> Result<()> {
        if !self.mode.allows(message) {
            return Ok(());
        }

        let line = serde_json::to_string(message)?;
        self.out.write_all(line.as_bytes())?;
        self.out.write_all(b"\n")?;
        self.written += 1;

        if message.is_state() {
            self.out.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Cloneable in-memory sink
///
/// Lets a caller keep a handle on output written through a boxed writer.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Parse every non-empty line as JSON
    pub fn messages(&self) -> Result<Vec<serde_json::Value>> {
        self.contents()
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(Into::into))
            .collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "buffer poisoned"))?;
        inner.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
