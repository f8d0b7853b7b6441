//! Sorting and filtering of the materialized edge stream.

use crate::core::utils::errors::PagenError;
use crate::core::{Edge, Node};
use crate::em::sorter::{ExternalSorter, SortedStream};

/// Pairs a flat vertex stream into edges and re-emits them sorted
/// lexicographically. With `canonicalize` set each edge is stored as
/// `(min, max)` first, which is what makes deduplication meaningful for
/// undirected graphs.
pub struct SortedEdges {
    stream: SortedStream<Edge>,
}

impl SortedEdges {
    pub fn new(
        vertices: impl Iterator<Item = Node>,
        memory_bytes: usize,
        canonicalize: bool,
    ) -> Result<Self, PagenError> {
        let mut sorter = ExternalSorter::new(memory_bytes)?;
        let mut vertices = vertices;
        while let Some(u) = vertices.next() {
            let v = match vertices.next() {
                Some(v) => v,
                None => panic!("edge stream ended mid-edge"),
            };
            if canonicalize && v < u {
                sorter.push((v, u));
            } else {
                sorter.push((u, v));
            }
        }
        Ok(SortedEdges {
            stream: sorter.sort(),
        })
    }
}

impl Iterator for SortedEdges {
    type Item = Edge;

    fn next(&mut self) -> Option<Edge> {
        self.stream.next()
    }
}

/// Drops self-loops and/or collapses runs of identical edges. Multi-edge
/// collapsing requires the input to be sorted.
pub struct EdgeFilter<I> {
    stream: I,
    self_loops: bool,
    multi_edges: bool,
    last: Option<Edge>,
}

impl<I: Iterator<Item = Edge>> EdgeFilter<I> {
    pub fn new(stream: I, self_loops: bool, multi_edges: bool) -> Self {
        EdgeFilter {
            stream,
            self_loops,
            multi_edges,
            last: None,
        }
    }
}

impl<I: Iterator<Item = Edge>> Iterator for EdgeFilter<I> {
    type Item = Edge;

    fn next(&mut self) -> Option<Edge> {
        loop {
            let edge = self.stream.next()?;
            if self.self_loops && edge.0 == edge.1 {
                continue;
            }
            if self.multi_edges && self.last == Some(edge) {
                continue;
            }
            self.last = Some(edge);
            return Some(edge);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_self_loops_and_duplicates() {
        let input = vec![(1u64, 2u64), (1, 2), (1, 2), (2, 2), (2, 3)];
        let filtered: Vec<Edge> = EdgeFilter::new(input.into_iter(), true, true).collect();
        assert_eq!(filtered, vec![(1, 2), (2, 3)]);
    }

    #[test]
    fn filters_are_independent() {
        let input = vec![(1u64, 1u64), (1, 2), (1, 2)];
        let loops_only: Vec<Edge> =
            EdgeFilter::new(input.clone().into_iter(), true, false).collect();
        assert_eq!(loops_only, vec![(1, 2), (1, 2)]);

        let dedup_only: Vec<Edge> = EdgeFilter::new(input.into_iter(), false, true).collect();
        assert_eq!(dedup_only, vec![(1, 1), (1, 2)]);
    }

    #[test]
    fn filtering_twice_changes_nothing() {
        let input = vec![(1u64, 2u64), (1, 2), (2, 2), (3, 4), (3, 4), (3, 5)];
        let once: Vec<Edge> = EdgeFilter::new(input.into_iter(), true, true).collect();
        let twice: Vec<Edge> = EdgeFilter::new(once.clone().into_iter(), true, true).collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn sorts_and_canonicalizes_pairs() {
        let vertices = vec![5u64, 2, 1, 3, 2, 2];
        let edges: Vec<Edge> = SortedEdges::new(vertices.into_iter(), 1 << 20, true)
            .expect("sorter")
            .collect();
        assert_eq!(edges, vec![(1, 3), (2, 2), (2, 5)]);
    }

    #[test]
    fn directed_pairs_keep_orientation() {
        let vertices = vec![5u64, 2, 1, 3];
        let edges: Vec<Edge> = SortedEdges::new(vertices.into_iter(), 1 << 20, false)
            .expect("sorter")
            .collect();
        assert_eq!(edges, vec![(1, 3), (5, 2)]);
    }

    #[test]
    #[should_panic(expected = "mid-edge")]
    fn odd_vertex_stream_is_a_bug() {
        let _ = SortedEdges::new(vec![1u64, 2, 3].into_iter(), 1 << 20, false);
    }

    proptest::proptest! {
        #[test]
        fn filtering_any_sorted_stream_is_idempotent(
            mut edges in proptest::collection::vec((0u64..20, 0u64..20), 0..100)
        ) {
            edges.sort_unstable();
            let once: Vec<Edge> = EdgeFilter::new(edges.into_iter(), true, true).collect();
            let twice: Vec<Edge> = EdgeFilter::new(once.clone().into_iter(), true, true).collect();
            proptest::prop_assert_eq!(once, twice);
        }
    }
}
