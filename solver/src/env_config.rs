//! Environment configuration shared by the library and the binary.
//!
//! | Variable | Default | Used for |
//! |----------|---------|----------|
//! | `CLUE_SEARCH_THREADS` (fallback `RAYON_NUM_THREADS`) | hardware parallelism | suggestion search pool |
//! | `CLUE_EXHAUSTIVE_LIMIT` | [`DEFAULT_EXHAUSTIVE_LIMIT`] | exhaustive closure bound |
//! | `CLUE_SEED` | unset | default self-play seed |

use crate::constants::DEFAULT_EXHAUSTIVE_LIMIT;
use crate::search::{ScoreWeights, SearchConfig};

fn parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

/// Read `CLUE_SEARCH_THREADS` (fallback `RAYON_NUM_THREADS`). `None` means
/// rayon's global pool, which is sized to the hardware.
pub fn search_threads() -> Option<usize> {
    parsed::<usize>("CLUE_SEARCH_THREADS")
        .or_else(|| parsed("RAYON_NUM_THREADS"))
        .filter(|&n| n > 0)
}

/// Read `CLUE_EXHAUSTIVE_LIMIT` (default [`DEFAULT_EXHAUSTIVE_LIMIT`]).
pub fn exhaustive_limit() -> u64 {
    parsed("CLUE_EXHAUSTIVE_LIMIT").unwrap_or(DEFAULT_EXHAUSTIVE_LIMIT)
}

/// Read `CLUE_SEED`.
pub fn seed() -> Option<u64> {
    parsed("CLUE_SEED")
}

/// Search configuration from the environment with default weights.
pub fn search_config() -> SearchConfig {
    SearchConfig {
        threads: search_threads(),
        weights: ScoreWeights::default(),
    }
}

/// Search configuration on the global pool, for processes that sized it
/// with [`init_rayon_threads_lenient`].
pub fn search_config_on_global_pool() -> SearchConfig {
    SearchConfig {
        threads: None,
        ..search_config()
    }
}

/// Size the global rayon pool from `CLUE_SEARCH_THREADS`. Tolerates an
/// already-initialized pool. Returns the thread count in use.
pub fn init_rayon_threads_lenient() -> usize {
    if let Some(n) = search_threads() {
        rayon::ThreadPoolBuilder::new().num_threads(n).build_global().ok(); // May fail if already initialized
    }
    rayon::current_num_threads()
}
