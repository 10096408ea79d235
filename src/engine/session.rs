//! Replay sessions: command source -> engine -> sink.
//!
//! A session pulls records from a [`CommandReader`], applies them to a shared
//! [`Engine`] and hands every resulting batch of lines to a sink. It can run
//! inline against any `io::Write`, or on its own thread feeding a bounded
//! channel that the caller drains.

use std::io::{self, Read, Write};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};
use tracing::{debug, info, warn};

use crate::config::ErrorPolicy;
use crate::engine::Engine;
use crate::error::Result;
use crate::feed::{CommandReader, Record};
use crate::types::BookEvent;

/// One batch of sink output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Lines produced by one command
    Events(Vec<BookEvent>),

    /// A forwarded `#name:` comment
    Comment(String),
}

impl Output {
    /// Write the batch as text lines
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self {
            Output::Events(events) => {
                for event in events {
                    writeln!(out, "{}", event)?;
                }
                Ok(())
            }
            Output::Comment(comment) => writeln!(out, "{}", comment),
        }
    }
}

/// Counters of a finished session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Commands applied to the engine (including refused ones)
    pub commands: u64,
    /// `#name:` comments forwarded
    pub comments: u64,
    /// Commands the book refused and the policy skipped
    pub refused: u64,
    /// Malformed records dropped by the reader
    pub skipped_records: u64,
}

/// Drives one command stream through an engine.
pub struct Session {
    engine: Arc<Engine>,
    policy: ErrorPolicy,
    stats: SessionStats,
}

impl Session {
    pub fn new(engine: Arc<Engine>, policy: ErrorPolicy) -> Self {
        Self {
            engine,
            policy,
            stats: SessionStats::default(),
        }
    }

    /// Apply one record. `Ok(None)` when there is nothing to emit.
    pub fn step(&mut self, record: Record) -> Result<Option<Output>> {
        let command = match record {
            Record::Comment(comment) => {
                self.stats.comments += 1;
                return Ok(Some(Output::Comment(comment)));
            }
            Record::Command(command) => command,
        };

        self.stats.commands += 1;
        match self.engine.apply(&command) {
            Ok(events) if events.is_empty() => Ok(None),
            Ok(events) => Ok(Some(Output::Events(events))),
            Err(err) if err.is_command_error() && self.policy == ErrorPolicy::Skip => {
                warn!(?command, error = %err, "skipping refused command");
                self.stats.refused += 1;
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Run the whole stream inline, writing lines to `out`
    pub fn replay<R: Read, W: Write>(
        mut self,
        mut reader: CommandReader<R>,
        out: &mut W,
    ) -> Result<SessionStats> {
        for record in &mut reader {
            if let Some(output) = self.step(record?)? {
                output.write_to(out)?;
            }
        }
        out.flush()?;

        self.stats.skipped_records = reader.skipped();
        info!(stats = ?self.stats, "replay finished");
        Ok(self.stats)
    }

    /// Run the stream on a dedicated thread.
    ///
    /// Batches arrive on the returned receiver in command order; the channel
    /// closes when the stream ends or the session stops on an error, which
    /// the join handle then reports. Dropping the receiver stops the session
    /// after its current record.
    pub fn spawn<R: Read + Send + 'static>(
        self,
        reader: CommandReader<R>,
        channel_capacity: usize,
    ) -> Result<(Receiver<Output>, JoinHandle<Result<SessionStats>>)> {
        let (tx, rx) = channel::bounded(channel_capacity);
        let handle = thread::Builder::new()
            .name("book-session".to_string())
            .spawn(move || self.pump(reader, tx))?;
        Ok((rx, handle))
    }

    fn pump<R: Read>(
        mut self,
        mut reader: CommandReader<R>,
        tx: Sender<Output>,
    ) -> Result<SessionStats> {
        for record in &mut reader {
            if let Some(output) = self.step(record?)? {
                if tx.send(output).is_err() {
                    debug!("sink disconnected, stopping session");
                    break;
                }
            }
        }

        self.stats.skipped_records = reader.skipped();
        info!(stats = ?self.stats, "session finished");
        Ok(self.stats)
    }
}
