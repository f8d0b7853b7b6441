//! External-memory generator for massive scale-free graphs.
//!
//! The edge list of the generated graph never has to fit in RAM: the
//! preferential-attachment neighbor query is rewritten as a time-forward
//! processing (TFP) pass over a sorted token stream, so a whole generation
//! runs in `O(sort(n))` external-memory I/O. Two models are provided, the
//! undirected Barabási–Albert model ([`models::ba`]) and the directed
//! Bollobás–Borgs–Chayes–Riordan model ([`models::bbcr`]), together with a
//! batch-parallel variant of the TFP engine ([`tfp::parallel`]).

pub mod core;
pub mod edges;
pub mod em;
pub mod models;
pub mod sampling;
pub mod stream;
pub mod tfp;

pub mod prelude {
    pub use crate::core::{
        config::{BaConfig, BbcrConfig, MemoryConfig},
        token::{CompactToken, Token},
        utils::errors::PagenError,
        Edge, Node, SlotId,
    };
    pub use crate::edges::{
        pool::EdgeWriterPool,
        writer::{EdgeListReader, EdgeListWriter, EndpointWidth},
    };
    pub use crate::models::{ba::generate_ba, bbcr::generate_bbcr};
    pub use crate::tfp::parallel::generate_ba_parallel;
}
