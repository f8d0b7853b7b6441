pub mod config;
pub mod token;
pub mod utils;

/// Vertex identifier. On-disk width is configurable, in memory it is 64 bit.
pub type Node = u64;

/// Index of a slot in the virtual edge list: edge `e` occupies slots `2e`
/// (its "from" endpoint) and `2e + 1` (its "to" endpoint).
pub type SlotId = u64;

/// Index of an edge in creation order.
pub type EdgeId = u64;

/// An edge as a pair of endpoints, ordered lexicographically.
pub type Edge = (Node, Node);
