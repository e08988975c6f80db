//! Output Channel
//!
//! Where sinks print human-readable output. The stdout variant holds the
//! process-wide handle without owning the stream: dropping the channel only
//! flushes it.

use std::fs::File;
use std::io::{self, BufWriter, Stdout, Write};
use std::path::Path;

enum Target {
    Stdout(Stdout),
    File(BufWriter<File>),
    Buffer(Vec<u8>),
}

/// Output handed to every sink write
pub struct OutputChannel {
    target: Target,
}

impl OutputChannel {
    /// Non-owning handle to the process's standard output
    pub fn stdout() -> Self {
        Self {
            target: Target::Stdout(io::stdout()),
        }
    }

    /// Owned file output, truncating an existing file
    pub fn file(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            target: Target::File(BufWriter::new(file)),
        })
    }

    /// In-memory output
    pub fn buffer() -> Self {
        Self {
            target: Target::Buffer(Vec::new()),
        }
    }

    /// Bytes written so far, for in-memory output
    pub fn contents(&self) -> Option<&[u8]> {
        match &self.target {
            Target::Buffer(buf) => Some(buf),
            _ => None,
        }
    }
}

impl Write for OutputChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.target {
            Target::Stdout(out) => out.write(buf),
            Target::File(out) => out.write(buf),
            Target::Buffer(out) => out.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.target {
            Target::Stdout(out) => out.flush(),
            Target::File(out) => out.flush(),
            Target::Buffer(_) => Ok(()),
        }
    }
}

impl std::fmt::Debug for OutputChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.target {
            Target::Stdout(_) => "stdout",
            Target::File(_) => "file",
            Target::Buffer(_) => "buffer",
        };
        f.debug_struct("OutputChannel").field("target", &kind).finish()
    }
}
