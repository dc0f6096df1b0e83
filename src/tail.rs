//! Tailing reader: the producer loop.
//!
//! ```text
//! Opening -> Reading -> (EofWait <-> Reading) -> Restarting -> Opening
//!                 \-> Closed   (shutdown, or end of a finite stream)
//! ```
//!
//! Each iteration checks for truncation (file sources with auto-restart on),
//! then for a restart request or shutdown, then reads one line. Lines go
//! through the [`LineParser`] and points into the [`PointBuffer`].

use std::io;
use std::time::Duration;

use log::{debug, info, warn};

use crate::buffer::{Ingest, PointBuffer};
use crate::controllers::TailController;
use crate::error::TailError;
use crate::parser::{LineOutcome, LineParser, RestartInference};
use crate::source::{LineSource, ReadStatus};

/// Default wait between polls when a growing file has no new data.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Why a pass over the source ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassEnd {
    Restart,
    EndOfStream,
    Shutdown,
}

/// Reads lines from a [`LineSource`] until shutdown or end of stream.
pub struct Tailer<S> {
    source: S,
    parser: LineParser,
    buffer: PointBuffer,
    control: TailController,
    poll_interval: Duration,
    restart_inference: RestartInference,
    /// Line number within the current pass.
    line_number: u64,
    sessions: u64,
}

impl<S: LineSource> Tailer<S> {
    pub fn new(source: S, parser: LineParser, buffer: PointBuffer, control: TailController) -> Self {
        Self {
            source,
            parser,
            buffer,
            control,
            poll_interval: DEFAULT_POLL_INTERVAL,
            restart_inference: RestartInference::default(),
            line_number: 0,
            sessions: 0,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_restart_inference(mut self, policy: RestartInference) -> Self {
        self.restart_inference = policy;
        self
    }

    pub fn controller(&self) -> &TailController {
        &self.control
    }

    pub fn parser(&self) -> &LineParser {
        &self.parser
    }

    /// Number of passes started so far (1 after the first, +1 per restart).
    pub fn sessions(&self) -> u64 {
        self.sessions
    }

    fn io_error(&self, error: io::Error) -> TailError {
        TailError::Io {
            source_name: self.source.name().to_string(),
            error,
        }
    }

    /// Run passes until shutdown or end of a finite stream. I/O errors end the
    /// loop and are returned; "no data yet" is not an error.
    pub fn run(&mut self) -> Result<(), TailError> {
        loop {
            match self.run_pass()? {
                PassEnd::Restart => self.restart()?,
                PassEnd::EndOfStream => {
                    info!("end of {}", self.source.name());
                    return Ok(());
                }
                PassEnd::Shutdown => return Ok(()),
            }
        }
    }

    /// Read until the current pass ends.
    pub fn run_pass(&mut self) -> Result<PassEnd, TailError> {
        if self.sessions == 0 {
            self.sessions = 1;
        }
        loop {
            if self.control.is_shutdown() {
                return Ok(PassEnd::Shutdown);
            }
            if let Some(len) = self.source.current_len().map_err(|e| self.io_error(e))? {
                if self.control.observe_len(len) {
                    info!("{} shrank to {} bytes, restarting", self.source.name(), len);
                }
            }
            if self.control.take_restart() {
                if self.source.is_restartable() {
                    return Ok(PassEnd::Restart);
                }
                warn!("{} cannot be restarted, ignoring restart request", self.source.name());
            }

            match self.source.read_line().map_err(|e| self.io_error(e))? {
                ReadStatus::Line(line) => {
                    self.line_number += 1;
                    self.ingest(&line);
                }
                ReadStatus::Pending => self.control.wait(self.poll_interval),
                ReadStatus::Eof => return Ok(PassEnd::EndOfStream),
            }
        }
    }

    fn ingest(&mut self, line: &str) {
        let outcome = self.parser.parse(line, self.line_number);
        if let Some(fields) = self.parser.take_established() {
            self.buffer.append(Ingest::Fields(fields));
        }
        // Errors are already logged by the parser; the line is simply skipped.
        if let Ok(LineOutcome::Point { point, .. }) = outcome {
            self.buffer.append_point(point);
        }
    }

    /// Reopen the source from the start and begin a new session.
    fn restart(&mut self) -> Result<(), TailError> {
        self.reopen()?;
        // Requests made while reopening are satisfied by this restart.
        self.control.take_restart();
        self.line_number = 0;
        self.control.reset_len();
        self.parser.reset(self.restart_inference);
        self.sessions += 1;
        self.buffer.append(Ingest::Restart);
        // A kept field set is announced again right away for the new session.
        if let Some(fields) = self.parser.take_established() {
            self.buffer.append(Ingest::Fields(fields));
        }
        debug!("session {} started", self.sessions);
        Ok(())
    }

    /// Reopen, waiting out the window in which a rotated file does not exist.
    fn reopen(&mut self) -> Result<(), TailError> {
        loop {
            match self.source.reopen() {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    if self.control.is_shutdown() {
                        return Ok(());
                    }
                    debug!("{} missing, waiting for it to reappear", self.source.name());
                    self.control.wait(self.poll_interval);
                    // Only shutdown should cut the wait short here.
                    self.control.take_restart();
                }
                Err(e) => return Err(self.io_error(e)),
            }
        }
    }
}
