//! The deterministic half of the Barabási–Albert edge list: every random
//! vertex occupies the "from" slot of each of its edges, so those link
//! tokens can be emitted without any randomness.

use crate::core::token::Token;
use crate::core::{Node, SlotId};

pub struct RegularVertexTokens {
    vertex_end: Node,
    edges_per_vertex: u64,
    current_vertex: Node,
    current_edge: u64,
    slot: SlotId,
}

impl RegularVertexTokens {
    /// `first_slot` is the edge-list position of `first_vertex`'s first edge;
    /// consecutive tokens advance by two slots.
    pub fn new(first_vertex: Node, first_slot: SlotId, vertices: u64, edges_per_vertex: u64) -> Self {
        RegularVertexTokens {
            vertex_end: first_vertex + vertices,
            edges_per_vertex,
            current_vertex: first_vertex,
            current_edge: 0,
            slot: first_slot,
        }
    }
}

impl Iterator for RegularVertexTokens {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.current_vertex >= self.vertex_end {
            return None;
        }
        let token = Token::link(self.slot, self.current_vertex);
        self.slot += 2;
        self.current_edge += 1;
        if self.current_edge >= self.edges_per_vertex {
            self.current_vertex += 1;
            self.current_edge = 0;
        }
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_every_from_slot_per_vertex() {
        let tokens: Vec<Token> = RegularVertexTokens::new(4, 8, 3, 2).collect();
        let expected: Vec<(u64, u64)> = vec![
            (8, 4),
            (10, 4),
            (12, 5),
            (14, 5),
            (16, 6),
            (18, 6),
        ];
        assert_eq!(
            tokens.iter().map(|t| (t.idx(), t.value())).collect::<Vec<_>>(),
            expected
        );
        assert!(tokens.iter().all(|t| !t.is_query()));
    }

    #[test]
    fn zero_vertices_is_empty() {
        assert_eq!(RegularVertexTokens::new(4, 8, 0, 2).count(), 0);
    }
}
