//! In-process referee for one self-played game.
//!
//! Turn structure per seat still in the game: suggest, first seat to the
//! left holding a token disproves (eliminated seats still answer), every
//! agent is told the result (the token only reaches suggester and
//! disprover), then the suggester may accuse. A wrong accusation eliminates
//! the accuser; the game ends on a correct accusation, when one seat is
//! left, or at the turn cap.
//!
//! After every event each agent's Knowledge Base is audited against the
//! ground truth.

use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, warn};

use crate::agent::Agent;
use crate::constants::DEFAULT_EXHAUSTIVE_LIMIT;
use crate::error::Result;
use crate::search::SuggestionSearch;
use crate::types::Suggestion;

use super::deal::Deal;

/// Rules of a self-play game.
#[derive(Clone, Debug, Serialize)]
pub struct GameConfig {
    pub player_count: usize,
    /// Seat turns before the game is abandoned.
    pub max_turns: usize,
    pub exhaustive_limit: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            player_count: 4,
            max_turns: 200,
            exhaustive_limit: DEFAULT_EXHAUSTIVE_LIMIT,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Finish {
    Accusation,
    LastStanding,
    TurnLimit,
    Error,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameSummary {
    pub seed: u64,
    pub player_count: usize,
    pub solution: Suggestion,
    pub winner: Option<usize>,
    pub finish: Finish,
    /// Seat turns played.
    pub turns: usize,
    /// Full passes around the table, counting the one in progress.
    pub rounds: usize,
    pub suggestions: usize,
    pub undisproved: usize,
    pub wrong_accusations: usize,
    /// Events after which some agent's knowledge disagreed with the deal.
    pub audit_failures: usize,
    pub error: Option<String>,
}

/// Play one game. Errors from agents end the game with [`Finish::Error`];
/// only an unplayable configuration is returned as an error.
pub fn play_game(config: &GameConfig, search: &Arc<SuggestionSearch>, seed: u64) -> Result<GameSummary> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let deal = Deal::random(config.player_count, &mut rng)?;
    let mut summary = GameSummary {
        seed,
        player_count: config.player_count,
        solution: deal.solution,
        winner: None,
        finish: Finish::TurnLimit,
        turns: 0,
        rounds: 1,
        suggestions: 0,
        undisproved: 0,
        wrong_accusations: 0,
        audit_failures: 0,
        error: None,
    };
    if let Err(e) = run(config, search, &deal, &mut rng, &mut summary) {
        warn!(seed, error = %e, "game aborted");
        summary.finish = Finish::Error;
        summary.error = Some(e.to_string());
    }
    debug!(seed, winner = ?summary.winner, finish = ?summary.finish, turns = summary.turns, "game finished");
    Ok(summary)
}

fn run(
    config: &GameConfig,
    search: &Arc<SuggestionSearch>,
    deal: &Deal,
    rng: &mut SmallRng,
    summary: &mut GameSummary,
) -> Result<()> {
    let n = deal.player_count();

    let mut agents = deal
        .hands
        .iter()
        .enumerate()
        .map(|(seat, &hand)| -> Result<Agent> {
            let agent = Agent::new(n, seat, hand, Arc::clone(search), rng.random())?;
            let kb = agent.knowledge().clone().with_exhaustive_limit(config.exhaustive_limit);
            Ok(agent.with_knowledge(kb))
        })
        .collect::<Result<Vec<Agent>>>()?;
    let mut eliminated = vec![false; n];
    let mut active = 0;

    while summary.turns < config.max_turns {
        summary.turns += 1;

        let suggestion = agents[active].suggest()?;
        summary.suggestions += 1;
        let disprover = deal.first_disprover(active, suggestion);
        let shown = match disprover {
            Some(d) => Some(agents[d].disprove(active, suggestion)?),
            None => {
                summary.undisproved += 1;
                None
            }
        };
        for (seat, agent) in agents.iter_mut().enumerate() {
            let visible = if seat == active || Some(seat) == disprover { shown } else { None };
            agent.observe_suggestion(active, suggestion, disprover, visible)?;
        }
        audit(&agents, deal, summary);

        if let Some(accusation) = agents[active].accuse() {
            let correct = accusation == deal.solution;
            let mut winner = None;
            for agent in agents.iter_mut() {
                winner = agent.observe_accusation(active, accusation, correct)?.or(winner);
            }
            audit(&agents, deal, summary);
            if correct {
                summary.winner = Some(active);
                summary.finish = Finish::Accusation;
                return Ok(());
            }
            summary.wrong_accusations += 1;
            eliminated[active] = true;
            if winner.is_some() {
                summary.winner = winner;
                summary.finish = Finish::LastStanding;
                return Ok(());
            }
        }

        let previous = active;
        active = next_active(active, &eliminated);
        if active <= previous {
            summary.rounds += 1;
        }
    }
    Ok(())
}

/// Next seat in turn order that is still in the game.
fn next_active(current: usize, eliminated: &[bool]) -> usize {
    let n = eliminated.len();
    (1..=n)
        .map(|step| (current + step) % n)
        .find(|&seat| !eliminated[seat])
        .unwrap_or(current)
}

fn audit(agents: &[Agent], deal: &Deal, summary: &mut GameSummary) {
    for agent in agents {
        if !agent.knowledge().is_consistent_with(&deal.hands, deal.solution) {
            warn!(seat = agent.seat(), turn = summary.turns, "knowledge disagrees with the deal");
            summary.audit_failures += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchConfig;

    #[test]
    fn test_next_active_skips_eliminated() {
        assert_eq!(next_active(0, &[false, true, false]), 2);
        assert_eq!(next_active(2, &[false, true, false]), 0);
        assert_eq!(next_active(1, &[true, false, true]), 1);
    }

    #[test]
    fn test_game_finishes_soundly() {
        let search = Arc::new(SuggestionSearch::new(&SearchConfig::default()).unwrap());
        let config = GameConfig {
            player_count: 3,
            ..GameConfig::default()
        };
        let summary = play_game(&config, &search, 5).unwrap();
        assert_eq!(summary.error, None);
        assert_eq!(summary.audit_failures, 0);
        assert_eq!(summary.finish, Finish::Accusation);
        assert!(summary.winner.is_some());
        assert_eq!(summary.wrong_accusations, 0);
    }
}
