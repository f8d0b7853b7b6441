#[derive(thiserror::Error, Debug)]
pub enum PagenError {
    #[error("number of vertices must be positive")]
    ZeroVertices,
    #[error("edges per vertex must be positive")]
    ZeroEdgesPerVertex,
    #[error("number of edges must be positive")]
    ZeroEdges,
    #[error("seed ring needs at least two vertices, got {0}")]
    SeedRingTooSmall(u64),
    #[error("alpha, beta and gamma must be non-negative with a positive sum")]
    InvalidMixture,
    #[error("degree offsets must be non-negative")]
    NegativeDegreeOffset,
    #[error("thread count must be positive")]
    ZeroThreads,
    #[error("unsupported endpoint width: {0} bytes (expected 4, 5, 6 or 8)")]
    UnsupportedWidth(u8),
    #[error("writer pool needs at least one output prefix")]
    EmptyWriterPool,
    #[error("IO operation failed")]
    Io {
        #[from]
        source: std::io::Error,
    },
}
