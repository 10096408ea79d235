//! Output events produced by the book.
//!
//! Every event renders to exactly one output line through `Display`:
//!
//! ```text
//! A, {owner}, {order}          accepted (submit or cancel)
//! R, {owner}, {order}          rejected (crossing submit)
//! B, {S|B}, {price}, {volume}  top of book for one side, `-` when empty
//! ```

use std::fmt;

use crate::types::Side;

/// Best price and the total resting volume at that price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub price: u64,
    pub volume: u64,
}

/// One output event of `submit` or `cancel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookEvent {
    /// Submission or cancellation accepted
    Accepted { owner_id: u64, order_id: u64 },

    /// Submission rejected because it would cross the book
    Rejected { owner_id: u64, order_id: u64 },

    /// Top of book for `side` changed; `quote` is None when the side is empty
    TopOfBook { side: Side, quote: Option<Quote> },
}

impl BookEvent {
    /// True for `B, ...` events
    pub fn is_top_of_book(&self) -> bool {
        matches!(self, BookEvent::TopOfBook { .. })
    }
}

impl fmt::Display for BookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookEvent::Accepted { owner_id, order_id } => {
                write!(f, "A, {}, {}", owner_id, order_id)
            }
            BookEvent::Rejected { owner_id, order_id } => {
                write!(f, "R, {}, {}", owner_id, order_id)
            }
            BookEvent::TopOfBook { side, quote: Some(q) } => {
                write!(f, "B, {}, {}, {}", side.symbol(), q.price, q.volume)
            }
            BookEvent::TopOfBook { side, quote: None } => {
                write!(f, "B, {}, -, -", side.symbol())
            }
        }
    }
}
