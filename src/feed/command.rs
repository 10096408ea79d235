//! Decoded operations of the command stream.

use crate::types::Side;

/// One operation for the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `N, owner, symbol, price, quantity, side, order`
    New {
        owner_id: u64,
        price: u64,
        quantity: u64,
        side: Side,
        order_id: u64,
    },

    /// `C, owner, order`
    Cancel { order_id: u64 },

    /// `F`: discard the whole book
    Reset,
}

/// One item produced by the command source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Command(Command),

    /// A `#name:` comment, forwarded to the sink untouched
    Comment(String),
}
