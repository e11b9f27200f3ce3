//! The Knowledge Base: every participant's knowledge plus game-wide facts,
//! and the Event Recorder that turns observed events into new values.
//!
//! A `KnowledgeBase` is never mutated once returned. Each `on_*` call clones
//! it, applies the event, runs propagation to a fixed point and returns the
//! result, or a [`ClueError::Contradiction`] when the
//! event cannot be reconciled with what is already known.
//!
//! Participant indices `0..player_count()` are the seats in turn order; the
//! solution is addressed separately through [`KnowledgeBase::solution`] or
//! [`Holder::Solution`].

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::constants::*;
use crate::error::{ClueError, Result};
use crate::participant::ParticipantKnowledge;
use crate::propagation::{self, Constraints};
use crate::types::{Category, Certainty, Suggestion, Token, TokenSet};

/// Who holds a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Holder {
    Player(usize),
    Solution,
}

/// One recorded event, in the order received.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Suggestion {
        suggester: usize,
        suggestion: Suggestion,
        disprover: Option<usize>,
        shown: Option<Token>,
    },
    Accusation {
        accuser: usize,
        accusation: Suggestion,
        correct: bool,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KnowledgeBase {
    /// Seats in turn order, then the solution.
    participants: Vec<ParticipantKnowledge>,
    self_index: Option<usize>,
    complete_deal: bool,
    refuted: Vec<Suggestion>,
    /// Per own token, bit `p` set when it has been shown to seat `p`.
    disclosures: [u8; TOKEN_COUNT],
    history: Vec<Record>,
    exhaustive_limit: u64,
}

impl KnowledgeBase {
    /// Initial state for a table of `player_count` seats.
    ///
    /// `self_index` and `self_hand` are given together when this process is
    /// one of the players, and omitted together for an observer.
    pub fn initialize(player_count: usize, self_index: Option<usize>, self_hand: Option<TokenSet>) -> Result<Self> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count) {
            return Err(ClueError::InvalidPlayerCount(player_count));
        }
        let seat_and_hand = match (self_index, self_hand) {
            (Some(seat), Some(hand)) if seat < player_count => Some((seat, hand)),
            (None, None) => None,
            (Some(seat), Some(_)) => {
                return Err(ClueError::InvalidEvent(format!(
                    "seat {seat} outside a table of {player_count}"
                )))
            }
            _ => {
                return Err(ClueError::InvalidEvent(
                    "own seat and own hand must be given together".to_string(),
                ))
            }
        };

        let own = seat_and_hand.map_or(TokenSet::EMPTY, |(_, hand)| hand);
        let mut participants = Vec::with_capacity(player_count + 1);
        let mut complete_deal = true;
        for seat in 0..player_count {
            match seat_and_hand {
                Some((me, hand)) if me == seat => {
                    if hand.len() != dealt_hand_size(player_count, seat) {
                        complete_deal = false;
                    }
                    participants.push(ParticipantKnowledge::with_hand(hand));
                }
                _ => participants.push(ParticipantKnowledge::new(
                    dealt_hand_size(player_count, seat),
                    own.complement(),
                )?),
            }
        }
        let mut solution = ParticipantKnowledge::new(SOLUTION_SIZE, own.complement())?;
        for category in Category::ALL {
            solution.holds_one_of(category.tokens())?;
        }
        participants.push(solution);

        let mut kb = KnowledgeBase {
            participants,
            self_index,
            complete_deal,
            refuted: Vec::new(),
            disclosures: [0; TOKEN_COUNT],
            history: Vec::new(),
            exhaustive_limit: DEFAULT_EXHAUSTIVE_LIMIT,
        };
        kb.settle()?;
        debug!(player_count, ?self_index, own = %own, complete_deal, "knowledge base initialized");
        Ok(kb)
    }

    /// Same state with a different bound for the exhaustive pass; zero
    /// disables it. Takes effect from the next recorded event.
    pub fn with_exhaustive_limit(mut self, limit: u64) -> Self {
        self.exhaustive_limit = limit;
        self
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn player_count(&self) -> usize {
        self.participants.len() - 1
    }

    pub fn self_index(&self) -> Option<usize> {
        self.self_index
    }

    /// Whether every non-solution token is held by a tracked seat with its
    /// dealt hand size.
    pub fn is_complete_deal(&self) -> bool {
        self.complete_deal
    }

    pub fn exhaustive_limit(&self) -> u64 {
        self.exhaustive_limit
    }

    /// Knowledge about seat `index`.
    pub fn player(&self, index: usize) -> Option<&ParticipantKnowledge> {
        self.participants[..self.player_count()].get(index)
    }

    pub fn players(&self) -> &[ParticipantKnowledge] {
        &self.participants[..self.player_count()]
    }

    pub fn solution(&self) -> &ParticipantKnowledge {
        &self.participants[self.player_count()]
    }

    pub fn history(&self) -> &[Record] {
        &self.history
    }

    /// Triples refuted by incorrect accusations.
    pub fn refuted_accusations(&self) -> &[Suggestion] {
        &self.refuted
    }

    pub fn has(&self, holder: Holder, token: Token) -> Certainty {
        match holder {
            Holder::Player(i) => self.player(i).map_or(Certainty::No, |pk| pk.has(token)),
            Holder::Solution => self.solution().has(token),
        }
    }

    // ── Event Recorder ───────────────────────────────────────────────────

    /// `suggester` asked `suggestion`; `disprover` answered, showing
    /// `shown` when this process saw the token.
    pub fn on_suggestion_disproved(
        &self,
        suggester: usize,
        suggestion: Suggestion,
        disprover: usize,
        shown: Option<Token>,
    ) -> Result<Self> {
        self.record_suggestion(suggester, suggestion, Some(disprover), shown)
    }

    /// `suggester` asked `suggestion` and nobody could answer.
    pub fn on_suggestion_not_disproved(&self, suggester: usize, suggestion: Suggestion) -> Result<Self> {
        self.record_suggestion(suggester, suggestion, None, None)
    }

    /// General form of the two suggestion events.
    pub fn record_suggestion(
        &self,
        suggester: usize,
        suggestion: Suggestion,
        disprover: Option<usize>,
        shown: Option<Token>,
    ) -> Result<Self> {
        let n = self.player_count();
        self.check_seat(suggester)?;
        if let Some(d) = disprover {
            self.check_seat(d)?;
            if d == suggester {
                return Err(ClueError::InvalidEvent(format!(
                    "seat {d} cannot disprove its own suggestion"
                )));
            }
        }
        if let Some(token) = shown {
            if disprover.is_none() {
                return Err(ClueError::InvalidEvent(format!("{token} shown without a disprover")));
            }
            if !suggestion.contains(token) {
                return Err(ClueError::InvalidEvent(format!("{token} is not part of {suggestion}")));
            }
        }

        let tokens = suggestion.token_set();
        let mut next = self.clone();
        for step in 1..n {
            let seat = (suggester + step) % n;
            if Some(seat) == disprover {
                break;
            }
            next.participants[seat].exclude(tokens)?;
        }

        match disprover {
            Some(d) => {
                let held = shown.map_or(tokens, TokenSet::single);
                next.participants[d].holds_one_of(held)?;
                if let (Some(token), Some(me)) = (shown, self.self_index) {
                    if d == me {
                        next.disclosures[token.id()] |= 1 << suggester;
                    }
                }
            }
            None if self.self_index == Some(suggester) => {
                // Nobody else holds them; whatever we lack is in the envelope.
                let missing = tokens.difference(next.participants[suggester].known_have());
                for token in missing {
                    next.participants[n].holds_one_of(TokenSet::single(token))?;
                }
            }
            None => {}
        }

        next.history.push(Record::Suggestion {
            suggester,
            suggestion,
            disprover,
            shown,
        });
        next.settle()?;
        debug!(
            suggester,
            %suggestion,
            ?disprover,
            shown = ?shown.map(Token::abbreviation),
            solutions = next.possible_solution_count(),
            "recorded suggestion"
        );
        Ok(next)
    }

    /// `accuser` accused `accusation`; `correct` is the referee's verdict.
    ///
    /// An incorrect accusation refutes the triple as a whole and says
    /// nothing about individual tokens.
    pub fn on_accusation(&self, accuser: usize, accusation: Suggestion, correct: bool) -> Result<Self> {
        self.check_seat(accuser)?;
        let mut next = self.clone();
        let n = self.player_count();
        if correct {
            for token in accusation.tokens() {
                next.participants[n].holds_one_of(TokenSet::single(token))?;
            }
        } else if !next.refuted.contains(&accusation) {
            next.refuted.push(accusation);
        }
        next.history.push(Record::Accusation {
            accuser,
            accusation,
            correct,
        });
        next.settle()?;
        debug!(accuser, %accusation, correct, "recorded accusation");
        Ok(next)
    }

    /// Hypothetical: `holder` holds exactly `hand`.
    pub fn assume_hand(&self, holder: Holder, hand: TokenSet) -> Result<Self> {
        let index = self.holder_index(holder)?;
        let pk = &self.participants[index];
        if hand.len() != pk.hand_size() {
            return Err(ClueError::InvalidEvent(format!(
                "hand {hand} has {} tokens, expected {}",
                hand.len(),
                pk.hand_size()
            )));
        }
        let mut next = self.clone();
        let pk = &mut next.participants[index];
        pk.restrict_to(hand)?;
        for token in hand {
            pk.holds_one_of(TokenSet::single(token))?;
        }
        next.settle()?;
        Ok(next)
    }

    /// Re-run propagation. On a value returned by this module the result
    /// equals the input.
    pub fn propagate(&self) -> Result<Self> {
        let mut next = self.clone();
        next.settle()?;
        Ok(next)
    }

    fn settle(&mut self) -> Result<usize> {
        let constraints = Constraints {
            complete_deal: self.complete_deal,
            refuted: &self.refuted,
            exhaustive_limit: self.exhaustive_limit,
        };
        propagation::propagate(&mut self.participants, &constraints)
    }

    fn check_seat(&self, seat: usize) -> Result<()> {
        if seat < self.player_count() {
            Ok(())
        } else {
            Err(ClueError::InvalidEvent(format!(
                "seat {seat} outside a table of {}",
                self.player_count()
            )))
        }
    }

    fn holder_index(&self, holder: Holder) -> Result<usize> {
        match holder {
            Holder::Player(i) => self.check_seat(i).map(|_| i),
            Holder::Solution => Ok(self.player_count()),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────────

    /// Triples that could still be the solution.
    pub fn possible_solutions(&self) -> Vec<Suggestion> {
        propagation::live_solutions(self.solution(), &self.refuted)
    }

    pub fn possible_solution_count(&self) -> usize {
        self.possible_solutions().len()
    }

    /// Solution candidates left in one category.
    pub fn remaining(&self, category: Category) -> TokenSet {
        self.solution().possible().in_category(category)
    }

    /// Per-seat candidate-hand counts (clauses ignored), solution last.
    pub fn candidate_hand_counts(&self) -> Vec<u64> {
        self.participants.iter().map(ParticipantKnowledge::candidate_hand_count).collect()
    }

    /// Rough size of the remaining world space: solutions times the
    /// candidate hands of every seat.
    pub fn estimate_possibilities(&self) -> f64 {
        self.players()
            .iter()
            .fold(self.possible_solution_count() as f64, |acc, pk| {
                acc * pk.candidate_hand_count() as f64
            })
    }

    /// The proven holder of `token`, if any.
    pub fn holder_of(&self, token: Token) -> Option<Holder> {
        propagation::proven_holder(&self.participants, token).map(|i| {
            if i == self.player_count() {
                Holder::Solution
            } else {
                Holder::Player(i)
            }
        })
    }

    /// Whether a ground-truth deal agrees with everything known here.
    pub fn is_consistent_with(&self, hands: &[TokenSet], solution: Suggestion) -> bool {
        let mut dealt = solution.token_set();
        for &hand in hands {
            if !hand.is_disjoint(dealt) {
                return false;
            }
            dealt = dealt.union(hand);
        }
        hands.len() == self.player_count()
            && self.players().iter().zip(hands).all(|(pk, &hand)| pk.admits(hand))
            && self.solution().admits(solution.token_set())
            && !self.refuted.contains(&solution)
    }

    // ── Disclosure ledger ────────────────────────────────────────────────

    /// Seats that have been shown `token` by this process.
    pub fn shown_to(&self, token: Token) -> impl Iterator<Item = usize> + '_ {
        let mask = self.disclosures[token.id()];
        (0..self.player_count()).filter(move |p| mask & (1 << p) != 0)
    }

    pub fn was_shown_to(&self, token: Token, seat: usize) -> bool {
        seat < MAX_PLAYERS && self.disclosures[token.id()] & (1 << seat) != 0
    }

    pub fn times_shown(&self, token: Token) -> usize {
        self.disclosures[token.id()].count_ones() as usize
    }
}

/// Grid of `x` (holds), `.` (does not) and `?` per token and participant.
impl fmt::Display for KnowledgeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "    ")?;
        for seat in 0..self.player_count() {
            write!(f, " P{seat}")?;
        }
        writeln!(f, " Sol")?;
        for token in Token::all() {
            write!(f, "{:<4}", token.abbreviation())?;
            for pk in &self.participants {
                let mark = match pk.has(token) {
                    Certainty::Yes => 'x',
                    Certainty::No => '.',
                    Certainty::Maybe => '?',
                };
                write!(f, "  {mark}")?;
            }
            writeln!(f)?;
        }
        write!(f, "solutions: {}", self.possible_solution_count())
    }
}
