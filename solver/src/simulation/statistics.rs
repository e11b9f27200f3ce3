//! Aggregate statistics over a batch of self-played games.

use serde::Serialize;

use super::game::{Finish, GameSummary};

// ── Top-level statistics ────────────────────────────────────────────

#[derive(Serialize)]
pub struct GameStatistics {
    pub num_games: u64,
    pub seed: u64,
    pub player_count: usize,
    pub finishes: FinishCounts,
    pub turns: TurnDistribution,
    /// Wins per seat, seat 0 first.
    pub wins_by_seat: Vec<u64>,
    pub mean_suggestions: f64,
    pub undisproved_rate: f64,
    pub wrong_accusations: u64,
    pub audit_failures: u64,
    /// Messages of games that ended in an error.
    pub errors: Vec<String>,
}

#[derive(Serialize, Default)]
pub struct FinishCounts {
    pub accusation: u64,
    pub last_standing: u64,
    pub turn_limit: u64,
    pub error: u64,
}

// ── Turn distribution ───────────────────────────────────────────────

/// Seat turns until the game was decided, over decided games only.
#[derive(Serialize, Default)]
pub struct TurnDistribution {
    pub mean: f64,
    pub std_dev: f64,
    pub min: usize,
    pub max: usize,
    pub median: usize,
    pub mean_rounds: f64,
}

// ── Aggregation ─────────────────────────────────────────────────────

pub fn aggregate_statistics(summaries: &[GameSummary], seed: u64) -> GameStatistics {
    let player_count = summaries.first().map_or(0, |s| s.player_count);
    let mut finishes = FinishCounts::default();
    let mut wins_by_seat = vec![0u64; player_count];
    let mut errors = Vec::new();
    for s in summaries {
        match s.finish {
            Finish::Accusation => finishes.accusation += 1,
            Finish::LastStanding => finishes.last_standing += 1,
            Finish::TurnLimit => finishes.turn_limit += 1,
            Finish::Error => finishes.error += 1,
        }
        if let Some(w) = s.winner {
            if let Some(slot) = wins_by_seat.get_mut(w) {
                *slot += 1;
            }
        }
        if let Some(e) = &s.error {
            errors.push(format!("seed {}: {e}", s.seed));
        }
    }

    let decided: Vec<&GameSummary> = summaries.iter().filter(|s| s.winner.is_some()).collect();
    let total_suggestions: usize = summaries.iter().map(|s| s.suggestions).sum();
    let total_undisproved: usize = summaries.iter().map(|s| s.undisproved).sum();

    GameStatistics {
        num_games: summaries.len() as u64,
        seed,
        player_count,
        finishes,
        turns: turn_distribution(&decided),
        wins_by_seat,
        mean_suggestions: mean(summaries.iter().map(|s| s.suggestions as f64)),
        undisproved_rate: if total_suggestions == 0 {
            0.0
        } else {
            total_undisproved as f64 / total_suggestions as f64
        },
        wrong_accusations: summaries.iter().map(|s| s.wrong_accusations as u64).sum(),
        audit_failures: summaries.iter().map(|s| s.audit_failures as u64).sum(),
        errors,
    }
}

fn turn_distribution(decided: &[&GameSummary]) -> TurnDistribution {
    if decided.is_empty() {
        return TurnDistribution::default();
    }
    let mut turns: Vec<usize> = decided.iter().map(|s| s.turns).collect();
    turns.sort_unstable();
    let mean_turns = mean(turns.iter().map(|&t| t as f64));
    let variance = mean(turns.iter().map(|&t| (t as f64 - mean_turns).powi(2)));
    TurnDistribution {
        mean: mean_turns,
        std_dev: variance.sqrt(),
        min: turns[0],
        max: turns[turns.len() - 1],
        median: turns[turns.len() / 2],
        mean_rounds: mean(decided.iter().map(|s| s.rounds as f64)),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Write statistics as pretty-printed JSON, creating parent directories.
pub fn save_statistics(stats: &GameStatistics, path: &str) -> std::io::Result<()> {
    if let Some(parent) = std::path::Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(stats)?;
    std::fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Suggestion;

    fn summary(seed: u64, winner: Option<usize>, finish: Finish, turns: usize) -> GameSummary {
        GameSummary {
            seed,
            player_count: 3,
            solution: Suggestion::parse("Mu Kn Li").unwrap(),
            winner,
            finish,
            turns,
            rounds: turns.div_ceil(3),
            suggestions: turns,
            undisproved: 1,
            wrong_accusations: 0,
            audit_failures: 0,
            error: (finish == Finish::Error).then(|| "boom".to_string()),
        }
    }

    #[test]
    fn test_aggregate() {
        let summaries = vec![
            summary(1, Some(0), Finish::Accusation, 10),
            summary(2, Some(2), Finish::Accusation, 20),
            summary(3, Some(0), Finish::LastStanding, 30),
            summary(4, None, Finish::Error, 5),
        ];
        let stats = aggregate_statistics(&summaries, 1);
        assert_eq!(stats.num_games, 4);
        assert_eq!(stats.finishes.accusation, 2);
        assert_eq!(stats.finishes.error, 1);
        assert_eq!(stats.wins_by_seat, vec![2, 0, 1]);
        assert_eq!(stats.turns.min, 10);
        assert_eq!(stats.turns.max, 30);
        assert_eq!(stats.turns.median, 20);
        assert!((stats.turns.mean - 20.0).abs() < 1e-9);
        assert_eq!(stats.errors, vec!["seed 4: boom".to_string()]);
        assert!((stats.undisproved_rate - 4.0 / 65.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_batch() {
        let stats = aggregate_statistics(&[], 0);
        assert_eq!(stats.num_games, 0);
        assert_eq!(stats.turns.mean, 0.0);
    }

    #[test]
    fn test_save_statistics() {
        let dir = std::env::temp_dir().join(format!("cluedo-stats-{}", std::process::id()));
        let path = dir.join("stats.json");
        let stats = aggregate_statistics(&[summary(1, Some(1), Finish::Accusation, 7)], 1);
        save_statistics(&stats, path.to_str().unwrap()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"wins_by_seat\""));
        let _ = std::fs::remove_dir_all(dir);
    }
}
