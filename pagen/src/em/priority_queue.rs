//! External priority queue with the smallest element on top.
//!
//! Pushes land in a bounded insertion heap; when it fills up, the heap is
//! drained into a sorted run on disk. The top of the queue is the minimum
//! over the insertion heap and the front of every run.

use crate::core::utils::errors::PagenError;
use crate::em::record::Record;
use crate::em::runs::{RunReader, RunWriter};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use tempfile::TempDir;
use tracing::debug;

const MIN_HEAP_ITEMS: usize = 1024;

struct PqRun<R: Record> {
    front: R,
    rest: RunReader<R>,
}

pub struct ExternalPriorityQueue<R: Record + Ord> {
    heap: BinaryHeap<Reverse<R>>,
    heap_items: usize,
    runs: Vec<PqRun<R>>,
    dir: TempDir,
    len: u64,
}

impl<R: Record + Ord> ExternalPriorityQueue<R> {
    pub fn new(memory_bytes: usize) -> Result<Self, PagenError> {
        let dir = TempDir::new()?;
        let heap_items = (memory_bytes / R::ENCODED_LEN).max(MIN_HEAP_ITEMS);
        Ok(ExternalPriorityQueue {
            heap: BinaryHeap::new(),
            heap_items,
            runs: Vec::new(),
            dir,
            len: 0,
        })
    }

    pub fn push(&mut self, item: R) {
        if self.heap.len() >= self.heap_items {
            self.spill();
        }
        self.heap.push(Reverse(item));
        self.len += 1;
    }

    fn spill(&mut self) {
        debug!(
            items = self.heap.len(),
            run = self.runs.len(),
            "priority queue heap full, spilling run"
        );
        let mut writer = RunWriter::create(self.dir.path(), self.runs.len());
        while let Some(Reverse(item)) = self.heap.pop() {
            writer.append(&item);
        }
        let mut rest = writer.into_reader();
        if let Some(front) = rest.next() {
            self.runs.push(PqRun { front, rest });
        }
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn peek(&self) -> Option<R> {
        let mut smallest = self.heap.peek().map(|Reverse(item)| *item);
        for run in &self.runs {
            if smallest.map_or(true, |s| run.front < s) {
                smallest = Some(run.front);
            }
        }
        smallest
    }

    pub fn pop(&mut self) -> Option<R> {
        let heap_top = self.heap.peek().map(|Reverse(item)| *item);
        let mut source: Option<usize> = None;
        let mut smallest = heap_top;
        for (index, run) in self.runs.iter().enumerate() {
            if smallest.map_or(true, |s| run.front < s) {
                smallest = Some(run.front);
                source = Some(index);
            }
        }
        let item = smallest?;
        match source {
            None => {
                self.heap.pop();
            }
            Some(index) => match self.runs[index].rest.next() {
                Some(front) => self.runs[index].front = front,
                None => {
                    self.runs.swap_remove(index);
                }
            },
        }
        self.len -= 1;
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn pops_in_ascending_order() {
        let mut pq = ExternalPriorityQueue::new(1 << 20).expect("temp dir");
        for value in [9u64, 2, 7, 2, 0] {
            pq.push(value);
        }
        let mut drained = Vec::new();
        while let Some(value) = pq.pop() {
            drained.push(value);
        }
        assert_eq!(drained, vec![0, 2, 2, 7, 9]);
    }

    #[test]
    fn interleaved_push_pop_with_spills() {
        // zero budget clamps to the minimum heap, forcing regular spills
        let mut pq = ExternalPriorityQueue::new(0).expect("temp dir");
        let mut rng = StdRng::seed_from_u64(11);
        let mut reference = BinaryHeap::new();

        for round in 0u64..5_000 {
            let value = rng.gen_range(round..round + 1_000);
            pq.push(value);
            reference.push(Reverse(value));
            if rng.gen_bool(0.4) {
                let expected = reference.pop().map(|Reverse(v)| v);
                assert_eq!(pq.pop(), expected);
            }
        }
        while let Some(Reverse(expected)) = reference.pop() {
            assert_eq!(pq.peek(), Some(expected));
            assert_eq!(pq.pop(), Some(expected));
        }
        assert!(pq.is_empty());
        assert_eq!(pq.pop(), None);
    }

    #[test]
    fn len_tracks_content() {
        let mut pq = ExternalPriorityQueue::new(1 << 20).expect("temp dir");
        assert!(pq.is_empty());
        pq.push(3u64);
        pq.push(1);
        assert_eq!(pq.len(), 2);
        pq.pop();
        assert_eq!(pq.len(), 1);
    }
}
