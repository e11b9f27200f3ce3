//! # Cluedo — deduction engine for a Clue-style hidden-information game
//!
//! Tracks what every participant might hold from the events a seated agent
//! observes, derives certain facts as early as possible, and picks the
//! suggestion whose worst-case answer teaches the most.
//!
//! ## Components
//!
//! | Component | Module | Description |
//! |-----------|--------|-------------|
//! | Token Model | [`constants`], [`types`] | 21 tokens in three categories, `u32` bit-sets, suggestions and their two-letter wire format |
//! | Participant Knowledge | [`participant`] | hand size, possible set, proven holdings and "at least one of" clauses for one seat or the solution |
//! | Propagation Engine | `propagation` | fixed point over all participants, plus an exhaustive closure when the joint hand space is small |
//! | Knowledge Base / Event Recorder | [`knowledge`] | immutable snapshots; every event returns a new, fully propagated value |
//! | Suggestion Search | [`search`] | worst-case scoring of hypothetical answers, parallel over candidates with rayon |
//! | Disprove Policy | [`policy`] | which token to show, when to accuse |
//!
//! [`agent`] wires these into a player; [`simulation`] plays whole games
//! against a referee holding the ground truth.
//!
//! ## Participants
//!
//! Seats `0..N` in turn order are the players (3 ≤ N ≤ 6); the solution is
//! a virtual participant with a hand of one token per category. The 18
//! remaining tokens are dealt round-robin, so the first `18 mod N` seats
//! hold one extra token.
//!
//! ## Soundness
//!
//! Every derived fact follows from the recorded events. An event stream that
//! cannot be reconciled yields [`ClueError::Contradiction`]; the suggestion
//! search is the only caller that discards contradictions, because there
//! they mark hypothetical answers that cannot happen.

#![allow(clippy::needless_range_loop)]

pub mod agent;
pub mod constants;
pub mod env_config;
pub mod error;
pub mod knowledge;
pub mod logging;
pub mod participant;
pub mod policy;
mod propagation;
pub mod search;
pub mod simulation;
pub mod types;

pub use agent::Agent;
pub use error::{ClueError, Result};
pub use knowledge::{Holder, KnowledgeBase, Record};
pub use participant::ParticipantKnowledge;
pub use policy::{choose_accusation, choose_disprove_token, choose_suggestion};
pub use search::{ScoreWeights, SearchConfig, SuggestionSearch};
pub use types::{Category, Certainty, Suggestion, Token, TokenSet};
