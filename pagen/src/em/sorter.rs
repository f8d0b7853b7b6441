//! External ascending sorter.
//!
//! Items are pushed into a RAM buffer bounded by the configured byte budget.
//! A full buffer is stably sorted and spilled as one run; `sort` seals the
//! input and hands back a stream that k-merges the runs with the in-memory
//! tail. Ties resolve by run age, so the overall order is stable with
//! respect to insertion.

use crate::core::utils::errors::PagenError;
use crate::em::record::Record;
use crate::em::runs::{RunReader, RunWriter};
use pagen_itertools::KMergeBy;
use tempfile::TempDir;
use tracing::debug;

const MIN_BUFFER_ITEMS: usize = 1024;

pub struct ExternalSorter<R: Record + Ord> {
    buffer: Vec<R>,
    buffer_items: usize,
    runs: Vec<RunReader<R>>,
    dir: TempDir,
    len: u64,
}

impl<R: Record + Ord> ExternalSorter<R> {
    pub fn new(memory_bytes: usize) -> Result<Self, PagenError> {
        let dir = TempDir::new()?;
        let buffer_items = (memory_bytes / R::ENCODED_LEN).max(MIN_BUFFER_ITEMS);
        Ok(ExternalSorter {
            buffer: Vec::new(),
            buffer_items,
            runs: Vec::new(),
            dir,
            len: 0,
        })
    }

    pub fn push(&mut self, item: R) {
        if self.buffer.len() >= self.buffer_items {
            self.spill();
        }
        self.buffer.push(item);
        self.len += 1;
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn spill(&mut self) {
        debug!(
            items = self.buffer.len(),
            run = self.runs.len(),
            "sorter buffer full, spilling run"
        );
        self.buffer.sort();
        let mut writer = RunWriter::create(self.dir.path(), self.runs.len());
        for item in self.buffer.drain(..) {
            writer.append(&item);
        }
        self.runs.push(writer.into_reader());
    }

    /// Seal the input and return the merged ascending stream. The sorter's
    /// temp directory lives inside the stream until it is drained or dropped.
    pub fn sort(mut self) -> SortedStream<R> {
        self.buffer.sort();
        let mut inputs: Vec<SortedInput<R>> = self.runs.drain(..).map(SortedInput::Run).collect();
        // the freshest items merge last so ties keep insertion order
        inputs.push(SortedInput::Buffer(std::mem::take(&mut self.buffer).into_iter()));
        let first: fn(&R, &R) -> bool = |a, b| a < b;
        SortedStream {
            merged: KMergeBy::new(inputs, first),
            remaining: self.len,
            _dir: self.dir,
        }
    }
}

enum SortedInput<R: Record> {
    Run(RunReader<R>),
    Buffer(std::vec::IntoIter<R>),
}

impl<R: Record> Iterator for SortedInput<R> {
    type Item = R;

    fn next(&mut self) -> Option<R> {
        match self {
            SortedInput::Run(reader) => reader.next(),
            SortedInput::Buffer(items) => items.next(),
        }
    }
}

pub struct SortedStream<R: Record + Ord> {
    merged: KMergeBy<SortedInput<R>, fn(&R, &R) -> bool>,
    remaining: u64,
    _dir: TempDir,
}

impl<R: Record + Ord> Iterator for SortedStream<R> {
    type Item = R;

    fn next(&mut self) -> Option<R> {
        let item = self.merged.next();
        if item.is_some() {
            self.remaining -= 1;
        }
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (remaining, Some(remaining))
    }
}

impl<R: Record + Ord> ExactSizeIterator for SortedStream<R> {}
