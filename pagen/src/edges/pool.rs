//! Writer pool for the batch-parallel engine: worker `i` writes exclusively
//! to writer `i`, so no synchronization is needed on the output path. The
//! given path prefixes are used round-robin, which lets a run shard its
//! output across several devices.

use crate::core::utils::errors::PagenError;
use crate::edges::writer::{EdgeListWriter, EndpointWidth};
use tracing::debug;

pub struct EdgeWriterPool {
    writers: Vec<EdgeListWriter>,
}

impl EdgeWriterPool {
    /// Build `count` writers over the prefixes; writer `i` produces
    /// `{prefix[i % prefixes.len()]}graph{i}.bin`. A prefix naming a
    /// directory needs its trailing separator.
    pub fn create(
        prefixes: &[String],
        count: usize,
        width: EndpointWidth,
        expected_edges_per_writer: u64,
    ) -> Result<Self, PagenError> {
        if prefixes.is_empty() {
            return Err(PagenError::EmptyWriterPool);
        }
        let mut writers = Vec::with_capacity(count);
        for index in 0..count {
            let path = format!("{}graph{}.bin", prefixes[index % prefixes.len()], index);
            debug!(writer = index, path, "pool writer");
            writers.push(EdgeListWriter::create(
                &path,
                width,
                expected_edges_per_writer,
            )?);
        }
        Ok(EdgeWriterPool { writers })
    }

    /// A pool that consumes edges without writing, for measurement runs.
    pub fn disabled(count: usize, width: EndpointWidth) -> Self {
        EdgeWriterPool {
            writers: (0..count).map(|_| EdgeListWriter::disabled(width)).collect(),
        }
    }

    pub fn writer(&mut self, index: usize) -> &mut EdgeListWriter {
        &mut self.writers[index]
    }

    pub fn writers_mut(&mut self) -> &mut [EdgeListWriter] {
        &mut self.writers
    }

    pub fn len(&self) -> usize {
        self.writers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writers.is_empty()
    }

    pub fn total_edges_written(&self) -> u64 {
        self.writers.iter().map(|w| w.edges_written()).sum()
    }

    pub fn finish(self) -> Result<u64, PagenError> {
        let mut total = 0;
        for writer in self.writers {
            total += writer.finish()?;
        }
        Ok(total)
    }
}
