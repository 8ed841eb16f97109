//! Feed Queue Module
//!
//! Fixed-capacity, newest-first queue of encoded records for one feed.

use std::collections::VecDeque;

use crate::cache::EncodedRecord;

// == Feed Queue ==
/// Bounded queue of encoded records.
///
/// - Front = newest record
/// - Back = oldest record, dropped first once the queue is full
#[derive(Debug, Clone)]
pub struct FeedQueue {
    records: VecDeque<EncodedRecord>,
    capacity: usize,
}

impl FeedQueue {
    // == Constructor ==
    /// Creates an empty queue holding at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    // == Push Front ==
    /// Inserts a record at the front, dropping the oldest one if full.
    ///
    /// Returns the dropped record, if any.
    pub fn push_front(&mut self, record: EncodedRecord) -> Option<EncodedRecord> {
        if self.capacity == 0 {
            return Some(record);
        }

        let dropped = if self.records.len() >= self.capacity {
            self.records.pop_back()
        } else {
            None
        };
        self.records.push_front(record);
        dropped
    }

    /// Iterates front (newest) to back (oldest).
    pub fn iter(&self) -> impl Iterator<Item = &EncodedRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
