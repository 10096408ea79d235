//! Shared engine: one order book behind one exclusive lock.
//!
//! ## Design Principles
//!
//! 1. **Single writer**: every operation holds the guard for its whole
//!    duration, so mutations never interleave
//! 2. **Scoped release**: the guard is dropped on every return path,
//!    including the error returns of `submit` and `cancel`
//! 3. **Synchronous**: no I/O and no waiting inside the lock
//!
//! ## Example
//!
//! ```
//! use tob_book::engine::Engine;
//! use tob_book::types::Side;
//!
//! let engine = Engine::with_capacity(1_000);
//!
//! engine.submit(1, 100, 10, Side::Buy, 1).unwrap();
//! assert!(engine.cancel(7).is_err());
//!
//! // The lock was released by the failed cancel
//! let lines: Vec<String> = engine.cancel(1).unwrap().iter().map(|e| e.to_string()).collect();
//! assert_eq!(lines, vec!["A, 1, 1", "B, B, -, -"]);
//! ```

pub mod session;

pub use session::{Output, Session, SessionStats};

use parking_lot::Mutex;
use tracing::debug;

use crate::error::Result;
use crate::feed::Command;
use crate::orderbook::OrderBook;
use crate::types::{BookEvent, Side};

/// Thread-safe handle over a single [`OrderBook`].
#[derive(Debug)]
pub struct Engine {
    book: Mutex<OrderBook>,
    capacity: usize,
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl Engine {
    /// Create an engine whose books pre-allocate `capacity` orders
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            book: Mutex::new(OrderBook::with_capacity(capacity)),
            capacity,
        }
    }

    /// See [`OrderBook::submit`]
    pub fn submit(
        &self,
        owner_id: u64,
        price: u64,
        quantity: u64,
        side: Side,
        order_id: u64,
    ) -> Result<Vec<BookEvent>> {
        self.book.lock().submit(owner_id, price, quantity, side, order_id)
    }

    /// See [`OrderBook::cancel`]
    pub fn cancel(&self, order_id: u64) -> Result<Vec<BookEvent>> {
        self.book.lock().cancel(order_id)
    }

    /// Throw the book away and start again from an empty one
    pub fn reset(&self) {
        let mut book = self.book.lock();
        debug!(discarded = book.order_count(), "resetting book");
        *book = OrderBook::with_capacity(self.capacity);
    }

    /// Apply one decoded command
    pub fn apply(&self, command: &Command) -> Result<Vec<BookEvent>> {
        match *command {
            Command::New {
                owner_id,
                price,
                quantity,
                side,
                order_id,
            } => self.submit(owner_id, price, quantity, side, order_id),
            Command::Cancel { order_id } => self.cancel(order_id),
            Command::Reset => {
                self.reset();
                Ok(Vec::new())
            }
        }
    }

    /// Run `f` against the book while holding the lock
    pub fn with_book<T>(&self, f: impl FnOnce(&OrderBook) -> T) -> T {
        f(&self.book.lock())
    }
}
