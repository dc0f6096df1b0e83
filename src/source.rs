//! Line sources the tailing reader pulls from.
//!
//! A [`FileSource`] follows a growing file: running out of data is
//! [`ReadStatus::Pending`], a partial last line is held back until its newline
//! arrives, and the file can be reopened from the start. A [`StreamSource`]
//! wraps any `BufRead` (standard input) and ends for good at end of stream.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Outcome of one read attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadStatus {
    /// A complete line, without its line terminator.
    Line(String),
    /// No complete line yet; more may arrive later.
    Pending,
    /// The source is finished and will never produce more lines.
    Eof,
}

/// A line-oriented readable source.
pub trait LineSource: Send {
    /// Read the next complete line, or report that none is available.
    fn read_line(&mut self) -> io::Result<ReadStatus>;

    /// Current length of the underlying file, `None` for streams.
    fn current_len(&self) -> io::Result<Option<u64>>;

    /// Reopen from the beginning.
    fn reopen(&mut self) -> io::Result<()>;

    /// Whether [`reopen`](Self::reopen) is supported.
    fn is_restartable(&self) -> bool;

    /// Human-readable name for log messages and the window title.
    fn name(&self) -> &str;
}

fn take_line(carry: &mut Vec<u8>) -> String {
    let mut bytes = std::mem::take(carry);
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// FileSource
// ─────────────────────────────────────────────────────────────────────────────

/// A growable file on disk.
pub struct FileSource {
    path: PathBuf,
    name: String,
    reader: BufReader<File>,
    /// Bytes of a line whose newline has not been written yet.
    carry: Vec<u8>,
}

impl FileSource {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let reader = BufReader::new(File::open(&path)?);
        Ok(Self {
            name: path.display().to_string(),
            path,
            reader,
            carry: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LineSource for FileSource {
    fn read_line(&mut self) -> io::Result<ReadStatus> {
        let n = self.reader.read_until(b'\n', &mut self.carry)?;
        if n == 0 || self.carry.last() != Some(&b'\n') {
            return Ok(ReadStatus::Pending);
        }
        Ok(ReadStatus::Line(take_line(&mut self.carry)))
    }

    fn current_len(&self) -> io::Result<Option<u64>> {
        match std::fs::metadata(&self.path) {
            Ok(meta) => Ok(Some(meta.len())),
            // A rotated-away file reads as empty until it is recreated.
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Some(0)),
            Err(e) => Err(e),
        }
    }

    fn reopen(&mut self) -> io::Result<()> {
        self.reader = BufReader::new(File::open(&self.path)?);
        self.carry.clear();
        Ok(())
    }

    fn is_restartable(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// StreamSource
// ─────────────────────────────────────────────────────────────────────────────

/// A finite, non-seekable stream such as standard input.
pub struct StreamSource<R> {
    reader: R,
    name: String,
    carry: Vec<u8>,
}

impl<R: BufRead + Send> StreamSource<R> {
    pub fn new(reader: R, name: impl Into<String>) -> Self {
        Self {
            reader,
            name: name.into(),
            carry: Vec::new(),
        }
    }
}

impl StreamSource<BufReader<io::Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(io::stdin()), "<standard input>")
    }
}

impl<R: BufRead + Send> LineSource for StreamSource<R> {
    fn read_line(&mut self) -> io::Result<ReadStatus> {
        let n = self.reader.read_until(b'\n', &mut self.carry)?;
        if n == 0 && self.carry.is_empty() {
            return Ok(ReadStatus::Eof);
        }
        // An unterminated last line is still a line once the stream ends.
        Ok(ReadStatus::Line(take_line(&mut self.carry)))
    }

    fn current_len(&self) -> io::Result<Option<u64>> {
        Ok(None)
    }

    fn reopen(&mut self) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("{} cannot be reopened", self.name),
        ))
    }

    fn is_restartable(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        &self.name
    }
}
