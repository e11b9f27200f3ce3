//! Self-play: every seat is an [`Agent`](crate::agent::Agent) and an
//! in-process referee holds the ground truth.
//!
//! - [`deal`]: random solution and hands
//! - [`game`]: referee loop and per-game summary
//! - [`statistics`]: batch aggregation and JSON output

pub mod deal;
pub mod game;
pub mod statistics;

use std::sync::Arc;

use rayon::prelude::*;

use crate::error::Result;
use crate::search::SuggestionSearch;

pub use deal::Deal;
pub use game::{play_game, Finish, GameConfig, GameSummary};
pub use statistics::{aggregate_statistics, save_statistics, GameStatistics};

/// Play `num_games` games in parallel; game `i` uses seed `seed + i`.
pub fn simulate_batch(
    config: &GameConfig,
    search: &Arc<SuggestionSearch>,
    num_games: usize,
    seed: u64,
) -> Result<Vec<GameSummary>> {
    (0..num_games)
        .into_par_iter()
        .map(|i| play_game(config, search, seed.wrapping_add(i as u64)))
        .collect()
}
