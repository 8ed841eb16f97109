//! Write Order Module
//!
//! Tracks which feed was written least recently, for eviction when the cache is full.

use std::collections::VecDeque;

// == Write Order ==
/// Tracks feed keys by last write.
///
/// Keys are stored in a VecDeque where:
/// - Front = Most recently written
/// - Back = Least recently written
///
/// Reads never reorder keys.
#[derive(Debug, Default)]
pub struct WriteOrder {
    order: VecDeque<String>,
}

impl WriteOrder {
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Touch ==
    /// Marks a key as just written (moves to front).
    pub fn touch(&mut self, key: &str) {
        self.remove(key);
        self.order.push_front(key.to_string());
    }

    pub fn remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently written key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        self.order.pop_back()
    }

    #[cfg(test)]
    pub fn peek_oldest(&self) -> Option<&String> {
        self.order.back()
    }

    /// Keys from most to least recently written.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[cfg(test)]
    pub fn contains(&self, key: &str) -> bool {
        self.order.iter().any(|k| k == key)
    }
}
