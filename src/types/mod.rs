//! Core data types for the order book
//!
//! ## Types
//!
//! - [`Order`]: A resting limit order
//! - [`Side`]: Buy or Sell
//! - [`BookEvent`]: An output line (accept / reject / top of book)
//! - [`Quote`]: Best price and volume for one side

mod order;
mod event;

// Re-export all types at module level
pub use order::{Order, Side};
pub use event::{BookEvent, Quote};
