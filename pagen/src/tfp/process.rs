//! The sequential time-forward pass.
//!
//! Tokens arrive ascending from two sources: the merged input stream and the
//! priority queue holding answers generated along the way. A link token
//! writes its node into the edge list (one output value per link); a query
//! token looks at the node just written and re-inserts it as a link at the
//! slot that asked. Because links sort before queries at the same slot, a
//! query is always consumed immediately after its link.

use crate::core::token::Token;
use crate::core::Node;
use crate::em::priority_queue::ExternalPriorityQueue;
use std::iter::Peekable;

pub struct TokenProcessor<S: Iterator<Item = Token>> {
    stream: Peekable<S>,
    queue: ExternalPriorityQueue<Token>,
    /// Number of links consumed so far == slot of the next expected link.
    current_idx: u64,
    last_value: Node,
}

impl<S: Iterator<Item = Token>> TokenProcessor<S> {
    pub fn new(stream: S, queue: ExternalPriorityQueue<Token>) -> Self {
        TokenProcessor {
            stream: stream.peekable(),
            queue,
            current_idx: 0,
            last_value: 0,
        }
    }
}

impl<S: Iterator<Item = Token>> Iterator for TokenProcessor<S> {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        loop {
            let take_stream = match (self.stream.peek(), self.queue.peek()) {
                (None, None) => return None,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                // ties go to the input stream
                (Some(s), Some(q)) => *s <= q,
            };
            let token = if take_stream {
                self.stream.next()?
            } else {
                self.queue.pop()?
            };

            if token.is_query() {
                assert!(
                    self.current_idx > 0 && token.idx() == self.current_idx - 1,
                    "query {token:?} surfaced before its link"
                );
                assert!(
                    token.value() > token.idx(),
                    "query {token:?} would answer backwards in time"
                );
                self.queue.push(Token::link(token.value(), self.last_value));
            } else {
                assert!(
                    token.idx() == self.current_idx,
                    "link {token:?} arrived at slot {}",
                    self.current_idx
                );
                self.current_idx += 1;
                self.last_value = token.value();
                return Some(token.value());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn process(tokens: Vec<Token>) -> Vec<Node> {
        let queue = ExternalPriorityQueue::new(1 << 20).expect("temp dir");
        TokenProcessor::new(tokens.into_iter(), queue).collect()
    }

    #[test]
    fn links_pass_through_in_order() {
        let out = process(vec![
            Token::link(0, 5),
            Token::link(1, 6),
            Token::link(2, 5),
            Token::link(3, 8),
        ]);
        assert_eq!(out, vec![5, 6, 5, 8]);
    }

    #[test]
    fn queries_replay_the_last_link() {
        // slot 2 is filled by querying slot 0
        let out = process(vec![
            Token::link(0, 5),
            Token::query(0, 2),
            Token::link(1, 6),
            Token::link(3, 8),
        ]);
        assert_eq!(out, vec![5, 6, 5, 8]);
    }

    #[test]
    fn answers_can_chain_through_answered_slots() {
        // slot 2 asks slot 0, slot 3 asks slot 2's freshly answered value
        let out = process(vec![
            Token::link(0, 5),
            Token::query(0, 2),
            Token::link(1, 6),
            Token::query(2, 3),
        ]);
        assert_eq!(out, vec![5, 6, 5, 5]);
    }

    #[test]
    fn multiple_queries_on_one_slot_fan_out() {
        let out = process(vec![
            Token::link(0, 9),
            Token::query(0, 2),
            Token::query(0, 3),
            Token::link(1, 4),
        ]);
        assert_eq!(out, vec![9, 4, 9, 9]);
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(process(Vec::new()).is_empty());
    }

    #[test]
    #[should_panic(expected = "surfaced before its link")]
    fn orphan_query_is_a_generator_bug() {
        process(vec![Token::query(0, 2)]);
    }
}
