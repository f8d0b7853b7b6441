//! Link tokens for the ring seed graph that bootstraps the attachment
//! process: `k` vertices, `k` edges, `0 → 1 → … → k-1 → 0`.

use crate::core::token::Token;
use crate::core::{Node, SlotId};

#[derive(Clone)]
pub struct SeedCircle {
    tokens: u64,
    first_id: Node,
    next: SlotId,
}

impl SeedCircle {
    pub fn new(vertices: u64, first_id: Node) -> Self {
        SeedCircle {
            tokens: 2 * vertices,
            first_id,
            next: 0,
        }
    }

    /// Highest vertex id used by the ring.
    pub fn max_vertex_id(&self) -> Node {
        self.first_id + self.tokens / 2 - 1
    }

    pub fn number_of_edges(&self) -> u64 {
        self.tokens / 2
    }

    /// Closed-form lookup of the vertex at an edge-list slot; the parallel
    /// engine resolves samples into the seed range with this instead of
    /// emitting queries.
    pub fn vertex_at(&self, slot: SlotId) -> Node {
        debug_assert!(slot < self.tokens);
        if slot == self.tokens - 1 {
            // the last edge closes the ring
            self.first_id
        } else {
            self.first_id + (slot + 1) / 2
        }
    }
}

impl Iterator for SeedCircle {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.next >= self.tokens {
            return None;
        }
        let token = Token::link(self.next, self.vertex_at(self.next));
        self.next += 1;
        Some(token)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.tokens - self.next) as usize;
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    #[test]
    fn four_vertices_form_a_ring() {
        let circle = SeedCircle::new(4, 0);
        assert_eq!(circle.max_vertex_id(), 3);
        assert_eq!(circle.number_of_edges(), 4);

        let edges: Vec<(u64, u64)> = circle.map(|t| t.value()).tuples().collect();
        assert_eq!(edges, vec![(0, 1), (1, 2), (2, 3), (3, 0)]);
    }

    #[test]
    fn tokens_are_links_in_slot_order() {
        let tokens: Vec<Token> = SeedCircle::new(3, 10).collect();
        assert_eq!(tokens.len(), 6);
        for (slot, token) in tokens.iter().enumerate() {
            assert!(!token.is_query());
            assert_eq!(token.idx(), slot as u64);
        }
        assert_eq!(tokens[5].value(), 10);
    }

    #[test]
    fn slot_lookup_matches_emitted_tokens() {
        let circle = SeedCircle::new(5, 2);
        let emitted: Vec<u64> = circle.clone().map(|t| t.value()).collect();
        for (slot, &value) in emitted.iter().enumerate() {
            assert_eq!(circle.vertex_at(slot as u64), value);
        }
    }
}
