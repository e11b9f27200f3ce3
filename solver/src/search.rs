//! Suggestion search: worst-case information value of every candidate.
//!
//! For a candidate suggestion the search enumerates the answers the table
//! could give ([`outcomes`]): each opponent after the suggester in turn order
//! who might hold one of the three tokens contributes one branch per token
//! it might show, and the walk stops at the first opponent proven to hold
//! one. If no such opponent exists, "nobody disproves" is a branch too.
//!
//! Each branch is recorded on a throwaway copy of the Knowledge Base and the
//! resulting state is scored. A branch that propagates to a contradiction
//! describes an impossible world and is dropped. The candidate's score is
//! the minimum over the remaining branches.
//!
//! ## State score
//!
//! ```text
//! score = − solution · |possible solutions|
//!         + known    · Σ |known tokens|       (seats)
//!         + pair     · Σ |2-token clauses|
//!         + triple   · Σ |3-token clauses|
//!         − possible · Σ |possible tokens|    (seats)
//! ```
//!
//! and `+∞` once the solution is fully known. All weights are non-negative,
//! so fewer solutions never score lower, all else equal.
//!
//! Candidates are scored in parallel with rayon, either on the global pool
//! or on a dedicated pool when [`SearchConfig::threads`] is set. Results are
//! collected in candidate order, so the winner never depends on scheduling.

use rand::Rng;
use rayon::prelude::*;
use rayon::ThreadPool;
use serde::Serialize;
use tracing::debug;

use crate::error::{ClueError, Result};
use crate::knowledge::KnowledgeBase;
use crate::types::{Suggestion, Token};

/// Tunable weights of the state score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScoreWeights {
    pub solution: f64,
    pub known: f64,
    pub pair: f64,
    pub triple: f64,
    pub possible: f64,
}

impl Default for ScoreWeights {
    /// A known token is worth about C(17, 2) three-token clauses and a
    /// two-token clause about 16 of them.
    fn default() -> Self {
        ScoreWeights {
            solution: 1000.0,
            known: 1360.0,
            pair: 160.0,
            triple: 10.0,
            possible: 1.0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SearchConfig {
    /// Size of a dedicated worker pool. `None` uses rayon's global pool.
    pub threads: Option<usize>,
    pub weights: ScoreWeights,
}

/// One possible answer to a suggestion, as seen by the suggester.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Disproved { by: usize, shown: Token },
    NotDisproved,
}

/// Every answer the table could plausibly give to `suggester` asking
/// `suggestion`.
pub fn outcomes(kb: &KnowledgeBase, suggester: usize, suggestion: Suggestion) -> Vec<Outcome> {
    let n = kb.player_count();
    let tokens = suggestion.token_set();
    let mut result = Vec::new();
    for step in 1..n {
        let seat = (suggester + step) % n;
        let Some(pk) = kb.player(seat) else {
            continue;
        };
        for shown in tokens.intersection(pk.possible()) {
            result.push(Outcome::Disproved { by: seat, shown });
        }
        if !tokens.is_disjoint(pk.known_have()) {
            return result;
        }
    }
    result.push(Outcome::NotDisproved);
    result
}

pub struct SuggestionSearch {
    pool: Option<ThreadPool>,
    weights: ScoreWeights,
}

impl SuggestionSearch {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let pool = match config.threads {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("clue-search-{i}"))
                    .build()?,
            ),
            None => None,
        };
        Ok(SuggestionSearch {
            pool,
            weights: config.weights,
        })
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Information content of a state; higher is better for the agent.
    pub fn score_state(&self, kb: &KnowledgeBase) -> f64 {
        if kb.solution().is_resolved() {
            return f64::INFINITY;
        }
        let w = &self.weights;
        let mut score = -w.solution * kb.possible_solution_count() as f64;
        for pk in kb.players() {
            score += w.known * pk.known_have().len() as f64;
            score -= w.possible * pk.possible().len() as f64;
            for clause in pk.clauses() {
                score += match clause.len() {
                    2 => w.pair,
                    3 => w.triple,
                    _ => 0.0,
                };
            }
        }
        score
    }

    /// Worst-case score of `suggester` asking `suggestion`. `None` when
    /// every branch is impossible.
    pub fn score_suggestion(&self, kb: &KnowledgeBase, suggester: usize, suggestion: Suggestion) -> Result<Option<f64>> {
        let mut worst: Option<f64> = None;
        for outcome in outcomes(kb, suggester, suggestion) {
            let branch = match outcome {
                Outcome::Disproved { by, shown } => kb.on_suggestion_disproved(suggester, suggestion, by, Some(shown)),
                Outcome::NotDisproved => kb.on_suggestion_not_disproved(suggester, suggestion),
            };
            let branch = match branch {
                Ok(branch) => branch,
                Err(e) if e.is_contradiction() => continue,
                Err(e) => return Err(e),
            };
            let score = self.score_state(&branch);
            worst = Some(worst.map_or(score, |w| w.min(score)));
        }
        Ok(worst)
    }

    /// Scores for every candidate, in sorted candidate order. Candidates
    /// without a possible branch are left out.
    pub fn rank(&self, kb: &KnowledgeBase, candidates: &[Suggestion]) -> Result<Vec<(Suggestion, f64)>> {
        let suggester = kb.self_index().ok_or(ClueError::NotSeated)?;
        let mut candidates = candidates.to_vec();
        candidates.sort_unstable();
        candidates.dedup();

        let score_all = || {
            candidates
                .par_iter()
                .map(|&s| self.score_suggestion(kb, suggester, s).map(|score| score.map(|v| (s, v))))
                .collect::<Result<Vec<_>>>()
        };
        let scored = match &self.pool {
            Some(pool) => pool.install(score_all)?,
            None => score_all()?,
        };
        Ok(scored.into_iter().flatten().collect())
    }

    /// The best candidate, ties broken uniformly at random.
    pub fn choose<R: Rng>(&self, kb: &KnowledgeBase, candidates: &[Suggestion], rng: &mut R) -> Result<Suggestion> {
        let ranked = self.rank(kb, candidates)?;
        let best = ranked
            .iter()
            .map(|&(_, score)| score)
            .fold(f64::NEG_INFINITY, f64::max);
        let ties: Vec<Suggestion> = ranked
            .iter()
            .filter(|&&(_, score)| score == best)
            .map(|&(s, _)| s)
            .collect();
        if ties.is_empty() {
            return Err(ClueError::NoLegalSuggestion);
        }
        let choice = ties[rng.random_range(0..ties.len())];
        debug!(%choice, score = best, ties = ties.len(), candidates = candidates.len(), "chose suggestion");
        Ok(choice)
    }
}
