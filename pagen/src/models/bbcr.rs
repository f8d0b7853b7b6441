//! Directed scale-free graphs after Bollobás, Borgs, Chayes and Riordan.
//!
//! Each step adds one edge and, with probability `alpha` (new source) or
//! `gamma` (new sink), one vertex. Endpoint draws follow the in- or
//! out-degree distribution shifted by a configurable offset; the offset's
//! share of the mass picks an existing vertex uniformly instead.

use crate::core::config::BbcrConfig;
use crate::core::token::Token;
use crate::core::utils::errors::PagenError;
use crate::core::{Node, SlotId};
use crate::edges::filter::{EdgeFilter, SortedEdges};
use crate::edges::writer::EdgeListWriter;
use crate::em::priority_queue::ExternalPriorityQueue;
use crate::em::sorter::ExternalSorter;
use crate::stream::seed_circle::SeedCircle;
use crate::tfp::process::TokenProcessor;
use pagen_itertools::kmerge;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Distribution {
    In,
    Out,
}

/// Token drawing one endpoint of the next edge at slot `slot`.
///
/// With probability `v*offset / (v*offset + slot/2)` the endpoint is a
/// uniform pick over the `v + 1` existing vertices; otherwise a position of
/// the edge list so far is sampled, rounded to "to" slots (odd) for the
/// in-distribution and "from" slots (even) for the out-distribution.
fn endpoint_token(
    rng: &mut StdRng,
    next_vertex: Node,
    slot: SlotId,
    offset: f64,
    distribution: Distribution,
) -> Token {
    if offset > 0.0 {
        let mass = next_vertex as f64 * offset;
        if rng.gen::<f64>() < mass / (mass + (slot / 2) as f64) {
            return Token::link(slot, rng.gen_range(0..next_vertex + 1));
        }
    }
    let even_floor = slot & !1;
    let r = rng.gen_range(0..even_floor);
    let r = match distribution {
        Distribution::In => r | 1,
        Distribution::Out => r & !1,
    };
    Token::query(r, slot)
}

/// Sample all `2*edges` tokens into the sorter. Returns the number of
/// vertices created, seed ring included.
fn populate(
    config: &BbcrConfig,
    first_vertex: Node,
    first_edge: u64,
    sorter: &mut ExternalSorter<Token>,
) -> u64 {
    let (alpha, alpha_beta) = config.mixture_thresholds();
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut vertex = first_vertex;
    let mut slot = 2 * first_edge;
    let end = slot + 2 * config.edges;

    while slot < end {
        let mode: f64 = rng.gen();
        debug_assert!(slot % 2 == 0, "an edge always starts at an even slot");

        if mode < alpha {
            // new vertex with an outgoing edge
            sorter.push(Token::link(slot, vertex));
            slot += 1;
            sorter.push(endpoint_token(
                &mut rng,
                vertex,
                slot,
                config.degree_offset_in,
                Distribution::In,
            ));
            slot += 1;
            vertex += 1;
        } else if mode < alpha_beta {
            // edge between existing vertices
            sorter.push(endpoint_token(
                &mut rng,
                vertex,
                slot,
                config.degree_offset_out,
                Distribution::Out,
            ));
            slot += 1;
            sorter.push(endpoint_token(
                &mut rng,
                vertex,
                slot,
                config.degree_offset_in,
                Distribution::In,
            ));
            slot += 1;
        } else {
            // new vertex with an incoming edge
            sorter.push(endpoint_token(
                &mut rng,
                vertex,
                slot,
                config.degree_offset_out,
                Distribution::Out,
            ));
            slot += 1;
            sorter.push(Token::link(slot, vertex));
            slot += 1;
            vertex += 1;
        }
    }
    vertex
}

/// Run the sequential BBCR pipeline into `writer`. The caller still has to
/// `finish()` the writer.
pub fn generate_bbcr(config: &BbcrConfig, writer: &mut EdgeListWriter) -> Result<(), PagenError> {
    config.validate()?;

    let circle = SeedCircle::new(config.seed_vertices, 0);
    let first_vertex = circle.max_vertex_id() + 1;
    let first_edge = circle.number_of_edges();

    info!(
        edges = config.edges,
        seed_vertices = config.seed_vertices,
        alpha = config.alpha,
        beta = config.beta,
        gamma = config.gamma,
        seed = config.seed,
        "generating directed scale-free graph"
    );

    let mut sorter = ExternalSorter::new(config.memory.sorter_bytes)?;
    let vertices = populate(config, first_vertex, first_edge, &mut sorter);
    info!(vertices, "token generation done");

    let streams: Vec<Box<dyn Iterator<Item = Token>>> =
        vec![Box::new(circle), Box::new(sorter.sort())];
    let queue = ExternalPriorityQueue::new(config.memory.pq_bytes)?;
    let stream = TokenProcessor::new(kmerge(streams), queue);

    if config.filter_self_loops || config.filter_multi_edges {
        let sorted = SortedEdges::new(stream, config.memory.sorter_bytes, false)?;
        let filtered = EdgeFilter::new(
            sorted,
            config.filter_self_loops,
            config.filter_multi_edges,
        );
        writer.write_edges(filtered)?;
    } else {
        writer.write_vertices(stream)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edges::writer::EndpointWidth;

    #[test]
    fn emits_seed_plus_requested_edges() {
        let config = BbcrConfig::new(100, 4);
        let mut writer = EdgeListWriter::disabled(EndpointWidth::U64);
        generate_bbcr(&config, &mut writer).expect("generation");
        assert_eq!(writer.edges_written(), 104);
    }

    #[test]
    fn minimum_seed_ring_works() {
        let config = BbcrConfig::new(50, 2);
        let mut writer = EdgeListWriter::disabled(EndpointWidth::U64);
        generate_bbcr(&config, &mut writer).expect("generation");
        assert_eq!(writer.edges_written(), 52);
    }

    #[test]
    fn alpha_only_adds_one_vertex_per_edge() {
        let mut config = BbcrConfig::new(40, 3);
        config.alpha = 1.0;
        config.beta = 0.0;
        config.gamma = 0.0;
        let mut sorter = ExternalSorter::new(1 << 20).expect("temp dir");
        let vertices = populate(&config, 3, 3, &mut sorter);
        assert_eq!(vertices, 3 + 40);
        assert_eq!(sorter.len(), 80);
    }

    #[test]
    fn beta_only_adds_no_vertices() {
        let mut config = BbcrConfig::new(40, 3);
        config.alpha = 0.0;
        config.beta = 1.0;
        config.gamma = 0.0;
        let mut sorter = ExternalSorter::new(1 << 20).expect("temp dir");
        let vertices = populate(&config, 3, 3, &mut sorter);
        assert_eq!(vertices, 3);
    }

    #[test]
    fn degree_offsets_allow_uniform_links() {
        let mut config = BbcrConfig::new(200, 4);
        config.degree_offset_in = 5.0;
        config.degree_offset_out = 5.0;
        config.seed = 9;
        let mut writer = EdgeListWriter::disabled(EndpointWidth::U64);
        generate_bbcr(&config, &mut writer).expect("generation");
        assert_eq!(writer.edges_written(), 204);
    }
}
