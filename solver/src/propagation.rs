//! Fixed-point propagation over all participants of a Knowledge Base.
//!
//! ## Round structure
//!
//! | Step | Rule | Where |
//! |------|------|-------|
//! | 1–4 | clause shrink, subsumption, singletons, disjoint-union exclusion | [`ParticipantKnowledge::normalize`] |
//! | 3b | a proven holding is excluded from every other participant | [`cross_exclude`] |
//! | 5 | one candidate left in a solution category is the solution's | [`complete_solution_categories`] |
//! | 6 | a token possible for exactly one participant is held by it | [`assign_sole_holders`] |
//! | 7 | solution tokens must appear in some triple not yet refuted | [`narrow_by_refuted_triples`] |
//!
//! Rounds repeat until nothing changes. At that point, if the joint hand
//! space is small enough, [`exhaustive_closure`] enumerates it and the loop
//! resumes when that pass derived something new.
//!
//! Step 6 only holds when every token outside the solution was dealt to a
//! tracked seat, so it is gated on [`Constraints::complete_deal`].
//!
//! The solution participant is always the last element of the slice.

use tracing::trace;

use crate::error::{contradiction, Result};
use crate::participant::ParticipantKnowledge;
use crate::types::{Category, Suggestion, Token, TokenSet};

/// Game-wide facts that are not stored per participant.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Constraints<'a> {
    /// Every non-solution token is held by one of the tracked players.
    pub complete_deal: bool,
    /// Triples refuted by incorrect accusations.
    pub refuted: &'a [Suggestion],
    /// Upper bound on the product of candidate-hand counts for the
    /// exhaustive pass. Zero disables it.
    pub exhaustive_limit: u64,
}

/// Run every rule to a fixed point. Returns the number of rounds taken.
pub(crate) fn propagate(participants: &mut [ParticipantKnowledge], constraints: &Constraints) -> Result<usize> {
    let mut rounds = 0;
    loop {
        rounds += 1;
        let mut changed = false;
        for pk in participants.iter_mut() {
            changed |= pk.normalize()?;
        }
        changed |= cross_exclude(participants)?;
        changed |= complete_solution_categories(participants)?;
        if constraints.complete_deal {
            changed |= assign_sole_holders(participants)?;
        }
        if !constraints.refuted.is_empty() {
            changed |= narrow_by_refuted_triples(participants, constraints.refuted)?;
        }
        if changed {
            trace!(round = rounds, "propagation round changed state");
            continue;
        }
        if exhaustive_closure(participants, constraints)? {
            trace!(round = rounds, "exhaustive closure derived new facts");
            continue;
        }
        return Ok(rounds);
    }
}

/// Step 3b: a token proven held by one participant is excluded from all
/// others.
fn cross_exclude(participants: &mut [ParticipantKnowledge]) -> Result<bool> {
    let mut changed = false;
    for i in 0..participants.len() {
        let held = participants[i].known_have();
        if held.is_empty() {
            continue;
        }
        for (j, other) in participants.iter_mut().enumerate() {
            if j != i {
                changed |= other.exclude(held)?;
            }
        }
    }
    Ok(changed)
}

/// Step 5: the solution holds exactly one token per category.
fn complete_solution_categories(participants: &mut [ParticipantKnowledge]) -> Result<bool> {
    let Some(solution) = participants.last_mut() else {
        return Ok(false);
    };
    let mut changed = false;
    for category in Category::ALL {
        let known = solution.known_have().in_category(category);
        if known.len() > 1 {
            return contradiction(format!("solution holds two {} tokens: {known}", category.name()));
        }
        if known.len() == 1 {
            let others = category.tokens().difference(known);
            changed |= solution.exclude(others)?;
            continue;
        }
        let candidates = solution.possible().in_category(category);
        match candidates.len() {
            0 => return contradiction(format!("no {} left for the solution", category.name())),
            1 => changed |= solution.holds_one_of(candidates)?,
            _ => {}
        }
    }
    Ok(changed)
}

/// Step 6: with a complete deal every token is held by someone, so a token
/// that only one participant can still hold is theirs.
fn assign_sole_holders(participants: &mut [ParticipantKnowledge]) -> Result<bool> {
    let assigned = participants
        .iter()
        .fold(TokenSet::EMPTY, |acc, pk| acc.union(pk.known_have()));
    let mut changed = false;
    for token in assigned.complement() {
        let mut holders = participants
            .iter()
            .enumerate()
            .filter(|(_, pk)| pk.possible().contains(token))
            .map(|(i, _)| i);
        match (holders.next(), holders.next()) {
            (None, _) => return contradiction(format!("nobody can hold {token}")),
            (Some(only), None) => {
                changed |= participants[only].holds_one_of(TokenSet::single(token))?;
            }
            _ => {}
        }
    }
    Ok(changed)
}

/// Step 7: restrict the solution to tokens of triples that are still
/// possible and not refuted.
fn narrow_by_refuted_triples(participants: &mut [ParticipantKnowledge], refuted: &[Suggestion]) -> Result<bool> {
    let Some(solution) = participants.last_mut() else {
        return Ok(false);
    };
    let live = live_solutions(solution, refuted);
    if live.is_empty() {
        return contradiction("every remaining solution triple has been refuted");
    }
    let allowed = live.iter().fold(TokenSet::EMPTY, |acc, s| acc.union(s.token_set()));
    solution.restrict_to(allowed)
}

/// Triples the solution participant admits, minus refuted ones.
pub(crate) fn live_solutions(solution: &ParticipantKnowledge, refuted: &[Suggestion]) -> Vec<Suggestion> {
    Suggestion::all_within(solution.possible())
        .filter(|s| solution.known_have().is_subset(s.token_set()))
        .filter(|s| !refuted.contains(s))
        .collect()
}

// ── Exhaustive closure ───────────────────────────────────────────────────

/// Product of candidate-hand counts, saturating.
pub(crate) fn joint_hand_space(participants: &[ParticipantKnowledge]) -> u64 {
    participants
        .iter()
        .fold(1u64, |acc, pk| acc.saturating_mul(pk.candidate_hand_count()))
}

/// Enumerates every assignment of pairwise-disjoint candidate hands. Tokens
/// outside every consistent hand of a participant are excluded; tokens in
/// all of them are promoted. Returns whether anything changed.
fn exhaustive_closure(participants: &mut [ParticipantKnowledge], constraints: &Constraints) -> Result<bool> {
    if constraints.exhaustive_limit == 0 || participants.iter().all(ParticipantKnowledge::is_resolved) {
        return Ok(false);
    }
    let space = joint_hand_space(participants);
    if space > constraints.exhaustive_limit {
        return Ok(false);
    }

    // Most constrained participants first keeps the search tree narrow.
    let mut order: Vec<usize> = (0..participants.len()).collect();
    order.sort_by_key(|&i| participants[i].candidate_hand_count());
    let candidates: Vec<Vec<TokenSet>> = order.iter().map(|&i| participants[i].candidate_hands()).collect();

    let solution_slot = order.iter().position(|&i| i + 1 == participants.len());
    let mut search = ClosureSearch {
        candidates: &candidates,
        solution_slot,
        refuted: constraints.refuted,
        complete_deal: constraints.complete_deal,
        chosen: vec![TokenSet::EMPTY; order.len()],
        unions: vec![TokenSet::EMPTY; order.len()],
        intersections: vec![TokenSet::ALL; order.len()],
        consistent: 0,
    };
    search.descend(0, TokenSet::EMPTY);
    trace!(space, consistent = search.consistent, "exhaustive closure");

    if search.consistent == 0 {
        return contradiction("no assignment of hands satisfies every recorded fact");
    }

    let mut changed = false;
    for (slot, &i) in order.iter().enumerate() {
        let pk = &mut participants[i];
        changed |= pk.restrict_to(search.unions[slot])?;
        let forced = search.intersections[slot].difference(pk.known_have());
        for token in forced {
            changed |= pk.holds_one_of(TokenSet::single(token))?;
        }
    }
    Ok(changed)
}

struct ClosureSearch<'a> {
    candidates: &'a [Vec<TokenSet>],
    solution_slot: Option<usize>,
    refuted: &'a [Suggestion],
    complete_deal: bool,
    chosen: Vec<TokenSet>,
    unions: Vec<TokenSet>,
    intersections: Vec<TokenSet>,
    consistent: u64,
}

impl ClosureSearch<'_> {
    fn descend(&mut self, slot: usize, used: TokenSet) {
        if slot == self.candidates.len() {
            if self.complete_deal && used != TokenSet::ALL {
                return;
            }
            if let Some(s) = self.solution_slot {
                if self.is_refuted(self.chosen[s]) {
                    return;
                }
            }
            self.consistent += 1;
            for (i, &hand) in self.chosen.iter().enumerate() {
                self.unions[i] = self.unions[i].union(hand);
                self.intersections[i] = self.intersections[i].intersection(hand);
            }
            return;
        }
        for k in 0..self.candidates[slot].len() {
            let hand = self.candidates[slot][k];
            if hand.is_disjoint(used) {
                self.chosen[slot] = hand;
                self.descend(slot + 1, used.union(hand));
            }
        }
    }

    fn is_refuted(&self, hand: TokenSet) -> bool {
        self.refuted.iter().any(|s| s.token_set() == hand)
    }
}

/// Holder of `token` according to `participants`, if proven.
pub(crate) fn proven_holder(participants: &[ParticipantKnowledge], token: Token) -> Option<usize> {
    participants.iter().position(|pk| pk.known_have().contains(token))
}
