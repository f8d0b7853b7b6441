//! Bulk interface over the external priority queue for the batch-parallel
//! engine.
//!
//! Tokens pushed during an epoch (between taking a push session and calling
//! [`BulkTokenQueue::bulk_push_end`]) stay invisible to `bulk_pop` until the
//! epoch closes. Each worker owns one shard, so pushes are uncontended; the
//! shards are drained into the queue at the end of the epoch, which is the
//! single point where visibility is established.

use crate::core::token::CompactToken;
use crate::core::utils::errors::PagenError;
use crate::em::priority_queue::ExternalPriorityQueue;
use parking_lot::{Mutex, MutexGuard};

pub struct BulkTokenQueue {
    pq: ExternalPriorityQueue<CompactToken>,
    shards: Vec<Mutex<Vec<CompactToken>>>,
}

impl BulkTokenQueue {
    pub fn new(memory_bytes: usize, workers: usize) -> Result<Self, PagenError> {
        let shards = (0..workers.max(1)).map(|_| Mutex::new(Vec::new())).collect();
        Ok(BulkTokenQueue {
            pq: ExternalPriorityQueue::new(memory_bytes)?,
            shards,
        })
    }

    /// Remove up to `n` smallest tokens into `buf`, ascending.
    pub fn bulk_pop(&mut self, buf: &mut Vec<CompactToken>, n: usize) {
        buf.clear();
        while buf.len() < n {
            match self.pq.pop() {
                Some(token) => buf.push(token),
                None => break,
            }
        }
    }

    /// Open a push epoch. Workers push through their shard handle; nothing
    /// becomes visible until [`Self::bulk_push_end`].
    pub fn bulk_push_session(&self) -> BulkPushSession<'_> {
        BulkPushSession {
            shards: &self.shards,
        }
    }

    /// Close the epoch: drain every shard into the queue.
    pub fn bulk_push_end(&mut self) {
        for shard in &self.shards {
            for token in shard.lock().drain(..) {
                self.pq.push(token);
            }
        }
    }

    /// Tokens visible to `bulk_pop`; excludes pushes of an open epoch.
    pub fn len(&self) -> u64 {
        self.pq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pq.is_empty()
    }
}

pub struct BulkPushSession<'a> {
    shards: &'a [Mutex<Vec<CompactToken>>],
}

impl BulkPushSession<'_> {
    /// Exclusive access to a worker's shard for the duration of a strip.
    pub fn shard(&self, worker: usize) -> MutexGuard<'_, Vec<CompactToken>> {
        self.shards[worker].lock()
    }
}
