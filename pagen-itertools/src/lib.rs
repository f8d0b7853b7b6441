pub(crate) mod merge;

pub use merge::{kmerge, kmerge_by, KMergeBy, MergeAscBy, MergeAscExt};
