//! Command stream: CSV records decoded into book operations.
//!
//! ```
//! use tob_book::feed::{Command, CommandReader, Record};
//!
//! let input = "#name: demo\nN, 1, IBM, 100, 10, B, 1\nC, 1, 1\n";
//! let records: Vec<Record> = CommandReader::new(input.as_bytes())
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//!
//! assert_eq!(records.len(), 3);
//! assert_eq!(records[2], Record::Command(Command::Cancel { order_id: 1 }));
//! ```

mod command;
mod reader;

pub use command::{Command, Record};
pub use reader::{CommandReader, NAME_PREFIX};
