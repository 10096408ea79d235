//! Run configuration for replaying a command stream.

use std::path::PathBuf;

use clap::ValueEnum;

/// What a session does when the book refuses a command
/// (unknown order on cancel, duplicate order ID on submit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ErrorPolicy {
    /// Stop the run and report the error
    #[default]
    Halt,
    /// Log the error and continue with the next record
    Skip,
}

/// Replay configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Command file to replay
    pub input: PathBuf,

    /// Orders to pre-allocate in the book arena
    pub capacity: usize,

    /// Reaction to refused commands
    pub error_policy: ErrorPolicy,

    /// Output batches buffered between the engine thread and the sink
    pub channel_capacity: usize,

    /// Print the final state root
    pub print_digest: bool,
}

impl Config {
    pub const DEFAULT_INPUT: &'static str = "input_file.csv";
    pub const DEFAULT_CAPACITY: usize = 10_000;
    pub const DEFAULT_CHANNEL_CAPACITY: usize = 1_024;
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from(Self::DEFAULT_INPUT),
            capacity: Self::DEFAULT_CAPACITY,
            error_policy: ErrorPolicy::default(),
            channel_capacity: Self::DEFAULT_CHANNEL_CAPACITY,
            print_digest: false,
        }
    }
}
