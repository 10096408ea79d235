//! Ordered price index.
//!
//! A thin typed wrapper over `BTreeMap<u64, V>`. Keys are always ascending;
//! which end is "best" depends on the side (bids want the maximum, asks the
//! minimum), so the book picks `max`/`min` and `predecessor`/`successor`
//! accordingly. Every operation is O(log L) in the number of levels.

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

/// Price-keyed ordered map.
#[derive(Debug, Clone)]
pub struct PriceIndex<V> {
    levels: BTreeMap<u64, V>,
}

impl<V> Default for PriceIndex<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> PriceIndex<V> {
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }

    /// Insert `value` at `price`, returning the value it replaced
    pub fn insert(&mut self, price: u64, value: V) -> Option<V> {
        self.levels.insert(price, value)
    }

    /// Remove the entry at `price`
    pub fn delete(&mut self, price: u64) -> Option<V> {
        self.levels.remove(&price)
    }

    /// Exact lookup
    #[inline]
    pub fn search(&self, price: u64) -> Option<&V> {
        self.levels.get(&price)
    }

    /// Next-higher entry strictly above `price`
    pub fn successor(&self, price: u64) -> Option<(u64, &V)> {
        self.levels
            .range((Excluded(price), Unbounded))
            .next()
            .map(|(p, v)| (*p, v))
    }

    /// Next-lower entry strictly below `price`
    pub fn predecessor(&self, price: u64) -> Option<(u64, &V)> {
        self.levels
            .range(..price)
            .next_back()
            .map(|(p, v)| (*p, v))
    }

    /// Lowest entry
    pub fn min(&self) -> Option<(u64, &V)> {
        self.levels.iter().next().map(|(p, v)| (*p, v))
    }

    /// Highest entry
    pub fn max(&self) -> Option<(u64, &V)> {
        self.levels.iter().next_back().map(|(p, v)| (*p, v))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Ascending iteration
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (u64, &V)> + '_ {
        self.levels.iter().map(|(p, v)| (*p, v))
    }

    pub fn clear(&mut self) {
        self.levels.clear();
    }
}
