//! Draining iterator over a priority queue.

use crate::error::Result;
use crate::PriorityQueue;

/// Iterator that dequeues items in descending order until the queue is empty.
///
/// Created by [`PriorityQueue::drain`]. Each step is one `dequeue`, so an
/// I/O error surfaces as an `Err` item; iteration may continue afterwards.
pub struct Drain<'a> {
    queue: &'a mut PriorityQueue,
}

impl<'a> Drain<'a> {
    pub(crate) fn new(queue: &'a mut PriorityQueue) -> Self {
        Self { queue }
    }
}

impl Iterator for Drain<'_> {
    type Item = Result<i32>;

    fn next(&mut self) -> Option<Self::Item> {
        self.queue.dequeue().transpose()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.queue.len()))
    }
}
