//! Error types for the order book and its command stream.
//!
//! A crossing order is not an error: it produces an `R, ...` line.

use thiserror::Error;

/// Result type alias for book operations.
pub type Result<T> = std::result::Result<T, BookError>;

/// Main error type for book operations.
#[derive(Error, Debug)]
pub enum BookError {
    /// Cancel of an order ID that is not resting in the book
    #[error("Order {0} does not exist")]
    OrderNotFound(u64),

    /// Submit of an order ID that is already resting in the book
    #[error("Order {0} is already resting in the book")]
    DuplicateOrderId(u64),

    /// Submit whose quantity would overflow the volume resting at its price
    #[error("Order {order_id} would overflow the volume at price {price}")]
    VolumeOverflow { order_id: u64, price: u64 },

    /// Book invariant violated (reported by `OrderBook::validate`)
    #[error("Book inconsistency: {0}")]
    Inconsistent(String),

    /// SSZ encoding of the resting book failed
    #[error("State encoding failed: {0}")]
    Encoding(String),

    /// Unrecoverable failure reading the command stream
    #[error("Command stream error: {0}")]
    Feed(#[from] csv::Error),

    /// Output sink failure
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

impl BookError {
    /// Create an inconsistency error from any string-like type.
    pub fn inconsistent(msg: impl Into<String>) -> Self {
        BookError::Inconsistent(msg.into())
    }

    /// True for errors caused by the content of a command rather than by the
    /// book or the stream. The session's error policy may skip these.
    pub fn is_command_error(&self) -> bool {
        matches!(
            self,
            BookError::OrderNotFound(_)
                | BookError::DuplicateOrderId(_)
                | BookError::VolumeOverflow { .. }
        )
    }
}
