pub mod reservoir;

use rand::rngs::StdRng;
use rand::SeedableRng;

/// One generator per logical work item, derived from the master seed.
///
/// Seeding per item instead of per worker makes the sampled values
/// independent of engine choice and thread count: the sequential and the
/// batch-parallel generator draw identical sequences for the same master
/// seed.
pub fn stream_rng(master_seed: u64, item: u64) -> StdRng {
    StdRng::seed_from_u64(master_seed.wrapping_add(item))
}
