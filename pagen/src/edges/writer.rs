//! Binary edge-list files.
//!
//! The format is headerless: a flat sequence of little-endian unsigned
//! endpoints at a fixed width, consecutive pairs forming edges. The writer
//! pre-sizes the file to the expected edge count so the filesystem does not
//! have to extend it block by block, and truncates to the exact size on
//! finish.

use crate::core::utils::errors::PagenError;
use crate::core::{Edge, Node};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const FILE_BUFFER_BYTES: usize = 1 << 20;

/// On-disk endpoint width. The 40- and 48-bit forms store the low bytes of
/// the id in five and six contiguous bytes respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointWidth {
    U32,
    U40,
    U48,
    U64,
}

impl EndpointWidth {
    pub fn from_bytes(bytes: u8) -> Result<Self, PagenError> {
        match bytes {
            4 => Ok(EndpointWidth::U32),
            5 => Ok(EndpointWidth::U40),
            6 => Ok(EndpointWidth::U48),
            8 => Ok(EndpointWidth::U64),
            other => Err(PagenError::UnsupportedWidth(other)),
        }
    }

    pub fn bytes(self) -> usize {
        match self {
            EndpointWidth::U32 => 4,
            EndpointWidth::U40 => 5,
            EndpointWidth::U48 => 6,
            EndpointWidth::U64 => 8,
        }
    }

    pub fn max_node(self) -> Node {
        match self {
            EndpointWidth::U64 => u64::MAX,
            _ => (1 << (8 * self.bytes())) - 1,
        }
    }
}

pub struct EdgeListWriter {
    out: Option<(PathBuf, BufWriter<File>)>,
    width: EndpointWidth,
    edges_written: u64,
}

impl EdgeListWriter {
    /// Create (truncate) the output file and pre-size it for
    /// `expected_edges`. An underestimate only costs performance.
    pub fn create(
        path: impl AsRef<Path>,
        width: EndpointWidth,
        expected_edges: u64,
    ) -> Result<Self, PagenError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        if expected_edges > 0 {
            file.set_len(2 * expected_edges * width.bytes() as u64)?;
        }
        debug!(
            path = %path.display(),
            bytes_per_endpoint = width.bytes(),
            expected_edges,
            "edge writer initialised"
        );
        Ok(EdgeListWriter {
            out: Some((path, BufWriter::with_capacity(FILE_BUFFER_BYTES, file))),
            width,
            edges_written: 0,
        })
    }

    /// A writer that consumes its input without touching the filesystem.
    pub fn disabled(width: EndpointWidth) -> Self {
        EdgeListWriter {
            out: None,
            width,
            edges_written: 0,
        }
    }

    fn write_endpoint(&mut self, node: Node) -> Result<(), PagenError> {
        debug_assert!(node <= self.width.max_node(), "node id exceeds file width");
        if let Some((_, out)) = &mut self.out {
            let bytes = node.to_le_bytes();
            out.write_all(&bytes[..self.width.bytes()])?;
        }
        Ok(())
    }

    pub fn write_edge(&mut self, u: Node, v: Node) -> Result<(), PagenError> {
        self.write_endpoint(u)?;
        self.write_endpoint(v)?;
        self.edges_written += 1;
        Ok(())
    }

    /// Materialize a flat vertex stream; consecutive vertices pair into
    /// edges.
    pub fn write_vertices(
        &mut self,
        stream: impl Iterator<Item = Node>,
    ) -> Result<(), PagenError> {
        let mut vertices = 0u64;
        for node in stream {
            self.write_endpoint(node)?;
            vertices += 1;
        }
        debug_assert!(vertices % 2 == 0, "vertex stream ended mid-edge");
        self.edges_written += vertices / 2;
        Ok(())
    }

    pub fn write_edges(&mut self, stream: impl Iterator<Item = Edge>) -> Result<(), PagenError> {
        for (u, v) in stream {
            self.write_edge(u, v)?;
        }
        Ok(())
    }

    pub fn edges_written(&self) -> u64 {
        self.edges_written
    }

    /// Bytes per endpoint in the output; zero when output is disabled.
    pub fn bytes_per_endpoint(&self) -> usize {
        if self.out.is_some() {
            self.width.bytes()
        } else {
            0
        }
    }

    /// The file size a successful `finish` will leave behind.
    pub fn file_size(&self) -> u64 {
        2 * self.edges_written * self.bytes_per_endpoint() as u64
    }

    /// Flush and truncate the file to the exact written size. Only after
    /// this returns is the output complete.
    pub fn finish(mut self) -> Result<u64, PagenError> {
        if let Some((path, out)) = self.out.take() {
            let size = 2 * self.edges_written * self.width.bytes() as u64;
            let file = out
                .into_inner()
                .map_err(|err| PagenError::from(err.into_error()))?;
            file.set_len(size)?;
            file.sync_all()?;
            info!(path = %path.display(), edges = self.edges_written, size, "edge list written");
        }
        Ok(self.edges_written)
    }
}

/// Streams endpoints back out of a binary edge-list file.
pub struct EdgeListReader {
    input: BufReader<File>,
    width: EndpointWidth,
}

impl EdgeListReader {
    pub fn open(path: impl AsRef<Path>, width: EndpointWidth) -> Result<Self, PagenError> {
        let file = File::open(path)?;
        Ok(EdgeListReader {
            input: BufReader::with_capacity(FILE_BUFFER_BYTES, file),
            width,
        })
    }

    /// Reposition onto an arbitrary endpoint index.
    pub fn seek_to(&mut self, endpoint_index: u64) -> Result<(), PagenError> {
        use std::io::{Seek, SeekFrom};
        self.input
            .seek(SeekFrom::Start(endpoint_index * self.width.bytes() as u64))?;
        Ok(())
    }

    /// The endpoint stream regrouped into edges.
    pub fn edges(self) -> impl Iterator<Item = Edge> {
        use itertools::Itertools;
        self.tuples::<(Node, Node)>()
    }
}

impl Iterator for EdgeListReader {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        let mut bytes = [0u8; 8];
        match self.input.read_exact(&mut bytes[..self.width.bytes()]) {
            Ok(()) => Some(u64::from_le_bytes(bytes)),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_and_truncates_to_exact_size() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("graph.bin");

        let mut writer =
            EdgeListWriter::create(&path, EndpointWidth::U64, 100).expect("create writer");
        writer.write_edge(1, 2).expect("write");
        writer.write_edge(3, 4).expect("write");
        assert_eq!(writer.edges_written(), 2);
        let written = writer.finish().expect("finish");

        assert_eq!(written, 2);
        assert_eq!(std::fs::metadata(&path).expect("metadata").len(), 2 * 2 * 8);
    }

    #[test]
    fn roundtrips_at_every_width() {
        let dir = TempDir::new().expect("temp dir");
        let edges = vec![(0u64, 1u64), (77, 12), (1 << 30, (1 << 31) - 1)];

        for bytes in [4u8, 5, 6, 8] {
            let width = EndpointWidth::from_bytes(bytes).expect("width");
            let path = dir.path().join(format!("graph{bytes}.bin"));
            let mut writer = EdgeListWriter::create(&path, width, 3).expect("create writer");
            writer.write_edges(edges.iter().copied()).expect("write");
            writer.finish().expect("finish");

            let read: Vec<_> = EdgeListReader::open(&path, width)
                .expect("open reader")
                .edges()
                .collect();
            assert_eq!(read, edges, "width {bytes}");
        }
    }

    #[test]
    fn reader_seeks_to_arbitrary_endpoints() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("graph.bin");
        let mut writer = EdgeListWriter::create(&path, EndpointWidth::U40, 3).expect("create");
        writer
            .write_edges([(10u64, 11u64), (20, 21), (30, 31)].into_iter())
            .expect("write");
        writer.finish().expect("finish");

        let mut reader = EdgeListReader::open(&path, EndpointWidth::U40).expect("open");
        reader.seek_to(3).expect("seek");
        assert_eq!(reader.next(), Some(21));
        reader.seek_to(0).expect("seek");
        assert_eq!(reader.next(), Some(10));
    }

    #[test]
    fn disabled_writer_counts_without_output() {
        let mut writer = EdgeListWriter::disabled(EndpointWidth::U64);
        writer
            .write_vertices(vec![1, 2, 3, 4, 5, 6].into_iter())
            .expect("consume");
        assert_eq!(writer.edges_written(), 3);
        assert_eq!(writer.bytes_per_endpoint(), 0);
        assert_eq!(writer.file_size(), 0);
        assert_eq!(writer.finish().expect("finish"), 3);
    }

    #[test]
    fn rejects_unknown_width() {
        assert!(matches!(
            EndpointWidth::from_bytes(7),
            Err(PagenError::UnsupportedWidth(7))
        ));
    }
}
