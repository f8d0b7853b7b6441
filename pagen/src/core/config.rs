//! Generator configuration.
//!
//! All parameters are validated before any sorter, queue or output file is
//! created, so configuration errors never leave partial state behind.

use crate::core::utils::errors::PagenError;

/// Memory budgets for the external-memory primitives. The engine never holds
/// more than these amounts in RAM outside a small constant overhead.
#[derive(Debug, Clone, Copy)]
pub struct MemoryConfig {
    /// RAM for each external sorter's run buffer, in bytes.
    pub sorter_bytes: usize,
    /// RAM for the priority queue's insertion heap, in bytes.
    pub pq_bytes: usize,
    /// Smallest batch the parallel engine extracts per iteration.
    pub min_batch: usize,
    /// Largest batch the parallel engine extracts per iteration.
    pub max_batch: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        MemoryConfig {
            sorter_bytes: 1 << 28,
            pq_bytes: 1 << 28,
            min_batch: 1 << 14,
            max_batch: 1 << 20,
        }
    }
}

/// Configuration of the Barabási–Albert generator.
#[derive(Debug, Clone)]
pub struct BaConfig {
    /// Number of random vertices added after the seed ring.
    pub vertices: u64,
    /// Edges attached per random vertex.
    pub edges_per_vertex: u64,
    /// Let later edges of a vertex depend on its earlier ones.
    pub edge_dependencies: bool,
    pub filter_self_loops: bool,
    pub filter_multi_edges: bool,
    pub seed: u64,
    /// Worker count for the batch-parallel engine.
    pub threads: usize,
    pub memory: MemoryConfig,
}

impl BaConfig {
    pub fn new(vertices: u64, edges_per_vertex: u64) -> Self {
        BaConfig {
            vertices,
            edges_per_vertex,
            edge_dependencies: false,
            filter_self_loops: false,
            filter_multi_edges: false,
            seed: 0,
            threads: 1,
            memory: MemoryConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), PagenError> {
        if self.vertices == 0 {
            return Err(PagenError::ZeroVertices);
        }
        if self.edges_per_vertex == 0 {
            return Err(PagenError::ZeroEdgesPerVertex);
        }
        if self.threads == 0 {
            return Err(PagenError::ZeroThreads);
        }
        Ok(())
    }

    /// The seed ring is twice the per-vertex edge count, so even the first
    /// random vertex finds enough distinct attachment slots.
    pub fn seed_vertices(&self) -> u64 {
        2 * self.edges_per_vertex
    }

    pub fn seed_edges(&self) -> u64 {
        self.seed_vertices()
    }

    pub fn random_edges(&self) -> u64 {
        self.vertices * self.edges_per_vertex
    }

    pub fn total_edges(&self) -> u64 {
        self.seed_edges() + self.random_edges()
    }
}

/// Configuration of the directed Bollobás–Borgs–Chayes–Riordan generator.
#[derive(Debug, Clone)]
pub struct BbcrConfig {
    /// Number of random edges added after the seed ring.
    pub edges: u64,
    /// Size of the seed ring; at least two.
    pub seed_vertices: u64,
    /// Relative probability to add a new vertex with an outgoing edge.
    pub alpha: f64,
    /// Relative probability to link two existing vertices.
    pub beta: f64,
    /// Relative probability to add a new vertex with an incoming edge.
    pub gamma: f64,
    pub degree_offset_in: f64,
    pub degree_offset_out: f64,
    pub filter_self_loops: bool,
    pub filter_multi_edges: bool,
    pub seed: u64,
    pub memory: MemoryConfig,
}

impl BbcrConfig {
    pub fn new(edges: u64, seed_vertices: u64) -> Self {
        BbcrConfig {
            edges,
            seed_vertices,
            alpha: 0.1,
            beta: 0.8,
            gamma: 0.1,
            degree_offset_in: 0.0,
            degree_offset_out: 0.0,
            filter_self_loops: false,
            filter_multi_edges: false,
            seed: 0,
            memory: MemoryConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), PagenError> {
        if self.edges == 0 {
            return Err(PagenError::ZeroEdges);
        }
        if self.seed_vertices < 2 {
            return Err(PagenError::SeedRingTooSmall(self.seed_vertices));
        }
        if self.alpha < 0.0 || self.beta < 0.0 || self.gamma < 0.0 {
            return Err(PagenError::InvalidMixture);
        }
        if self.alpha + self.beta + self.gamma < 1e-9 {
            return Err(PagenError::InvalidMixture);
        }
        if self.degree_offset_in < 0.0 || self.degree_offset_out < 0.0 {
            return Err(PagenError::NegativeDegreeOffset);
        }
        Ok(())
    }

    /// Normalized `(alpha, alpha + beta)` thresholds for the per-edge draw;
    /// gamma is the remaining probability mass.
    pub fn mixture_thresholds(&self) -> (f64, f64) {
        let norm = self.alpha + self.beta + self.gamma;
        (self.alpha / norm, (self.alpha + self.beta) / norm)
    }

    pub fn total_edges(&self) -> u64 {
        self.seed_vertices + self.edges
    }
}
