//! CSV command source.
//!
//! Reads a header-less, comma separated stream with a variable field count.
//! Fields are trimmed. Bad records are logged and skipped so a single typo
//! never aborts a replay; only an I/O failure of the underlying reader ends
//! the stream with an error.

use std::fs::File;
use std::io;
use std::path::Path;

use csv::{ErrorKind, StringRecord, StringRecordsIntoIter, Trim};
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::{BookError, Result};
use crate::feed::{Command, Record};
use crate::types::Side;

/// Prefix of comment lines that are forwarded to the sink
pub const NAME_PREFIX: &str = "#name:";

#[derive(Error, Debug)]
enum DecodeError {
    #[error("empty operation field")]
    EmptyOp,

    #[error("unknown operation {0:?}")]
    UnknownOp(String),

    #[error("operation {op} needs {expected} fields, found {found}")]
    MissingFields {
        op: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("field {field} is not an unsigned integer: {value:?}")]
    BadInteger { field: &'static str, value: String },
}

/// Iterator of decoded [`Record`]s over any `io::Read`.
pub struct CommandReader<R> {
    records: StringRecordsIntoIter<R>,
    skipped: u64,
}

impl CommandReader<File> {
    /// Open a command file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let reader = Self::builder().from_path(path)?;
        Ok(Self::from_csv(reader))
    }
}

impl<R: io::Read> CommandReader<R> {
    pub fn new(rdr: R) -> Self {
        Self::from_csv(Self::builder().from_reader(rdr))
    }

    fn from_csv(reader: csv::Reader<R>) -> Self {
        Self {
            records: reader.into_records(),
            skipped: 0,
        }
    }

    fn builder() -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder.has_headers(false).flexible(true).trim(Trim::All);
        builder
    }

    /// Number of records dropped as malformed so far
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

impl<R: io::Read> Iterator for CommandReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(err) if matches!(err.kind(), ErrorKind::Io(_)) => {
                    return Some(Err(BookError::Feed(err)));
                }
                Err(err) => {
                    warn!(error = %err, "skipping unreadable record");
                    self.skipped += 1;
                    continue;
                }
            };

            let line = record.position().map(|p| p.line()).unwrap_or_default();
            match decode(&record) {
                Ok(Some(decoded)) => {
                    debug!(line, ?record, "decoded record");
                    return Some(Ok(decoded));
                }
                Ok(None) => continue,
                Err(err) => {
                    warn!(line, ?record, error = %err, "skipping malformed record");
                    self.skipped += 1;
                }
            }
        }
    }
}

/// Decode one CSV record. `Ok(None)` for plain comments.
fn decode(record: &StringRecord) -> std::result::Result<Option<Record>, DecodeError> {
    let op = record.get(0).unwrap_or_default();

    if op.starts_with('#') {
        if op.starts_with(NAME_PREFIX) {
            return Ok(Some(Record::Comment(op.to_string())));
        }
        return Ok(None);
    }

    let command = match op {
        "" => return Err(DecodeError::EmptyOp),
        "N" => {
            require(record, "N", 7)?;
            Command::New {
                owner_id: uint(record, 1, "owner")?,
                price: uint(record, 3, "price")?,
                quantity: uint(record, 4, "quantity")?,
                side: Side::from_flag(record.get(5).unwrap_or_default()),
                order_id: uint(record, 6, "order")?,
            }
        }
        "C" => {
            require(record, "C", 3)?;
            Command::Cancel {
                order_id: uint(record, 2, "order")?,
            }
        }
        "F" => Command::Reset,
        other => return Err(DecodeError::UnknownOp(other.to_string())),
    };

    Ok(Some(Record::Command(command)))
}

fn require(
    record: &StringRecord,
    op: &'static str,
    expected: usize,
) -> std::result::Result<(), DecodeError> {
    if record.len() < expected {
        return Err(DecodeError::MissingFields {
            op,
            expected,
            found: record.len(),
        });
    }
    Ok(())
}

fn uint(
    record: &StringRecord,
    idx: usize,
    field: &'static str,
) -> std::result::Result<u64, DecodeError> {
    let value = record.get(idx).unwrap_or_default();
    value.parse().map_err(|_| DecodeError::BadInteger {
        field,
        value: value.to_string(),
    })
}
