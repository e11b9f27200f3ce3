//! Knowledge about one participant's hand.
//!
//! A participant is a seated player or the virtual solution. What is known
//! about its hand is kept as three pieces:
//!
//! - `possible`: tokens not yet excluded (bit-set)
//! - `known`: tokens proven held, always a subset of `possible`
//! - `clauses`: "holds at least one of" constraints over `possible \ known`
//!
//! The public assertions return a new value; the `pub(crate)` mutators are
//! used by the propagation engine on its private working copy.
//!
//! ## Local normal form
//!
//! After every mutation the value is brought back to normal form:
//! 1. clauses are intersected with `possible` (an empty one is a contradiction)
//! 2. clauses already satisfied by `known` are dropped, supersets of another
//!    clause are dropped
//! 3. singleton clauses are promoted into `known`
//! 4. `k = hand_size - |known|` pairwise-disjoint clauses pin down the rest of
//!    the hand, so everything outside their union is excluded; `k + 1` of
//!    them is a contradiction
//!
//! and the hand-size counts are enforced: `|possible| == hand_size` promotes
//! everything, `|known| == hand_size` excludes everything else.

use crate::constants::binomial;
use crate::error::{contradiction, Result};
use crate::types::{Certainty, Token, TokenSet};

/// Upper bound on disjoint-clause families examined per normalisation.
/// Stopping early only skips exclusions; everything found is still sound.
const FAMILY_SEARCH_LIMIT: usize = 4096;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParticipantKnowledge {
    hand_size: usize,
    possible: TokenSet,
    known: TokenSet,
    /// Sorted by bits; every clause has at least two members.
    clauses: Vec<TokenSet>,
}

impl ParticipantKnowledge {
    /// A hand of `hand_size` tokens drawn from `possible`, nothing else known.
    pub fn new(hand_size: usize, possible: TokenSet) -> Result<Self> {
        let mut pk = ParticipantKnowledge {
            hand_size,
            possible,
            known: TokenSet::EMPTY,
            clauses: Vec::new(),
        };
        pk.normalize()?;
        Ok(pk)
    }

    /// A fully known hand.
    pub fn with_hand(hand: TokenSet) -> Self {
        ParticipantKnowledge {
            hand_size: hand.len(),
            possible: hand,
            known: hand,
            clauses: Vec::new(),
        }
    }

    pub fn hand_size(&self) -> usize {
        self.hand_size
    }

    pub fn possible(&self) -> TokenSet {
        self.possible
    }

    pub fn known_have(&self) -> TokenSet {
        self.known
    }

    pub fn known_not_have(&self) -> TokenSet {
        self.possible.complement()
    }

    /// Possible but not proven.
    pub fn unknown(&self) -> TokenSet {
        self.possible.difference(self.known)
    }

    pub fn clauses(&self) -> &[TokenSet] {
        &self.clauses
    }

    /// Whether every token of the hand is known.
    pub fn is_resolved(&self) -> bool {
        self.known.len() == self.hand_size
    }

    pub fn has(&self, token: Token) -> Certainty {
        if self.known.contains(token) {
            Certainty::Yes
        } else if self.possible.contains(token) {
            Certainty::Maybe
        } else {
            Certainty::No
        }
    }

    /// Record that the participant holds at least one of `tokens`.
    pub fn assert_holds_one_of(&self, tokens: TokenSet) -> Result<Self> {
        let mut next = self.clone();
        next.holds_one_of(tokens)?;
        Ok(next)
    }

    /// Record that the participant holds none of `tokens`.
    pub fn assert_excludes(&self, tokens: TokenSet) -> Result<Self> {
        let mut next = self.clone();
        next.exclude(tokens)?;
        Ok(next)
    }

    /// Number of hands consistent with `possible` and `known`, ignoring
    /// clauses. Used as a cheap size estimate.
    pub fn candidate_hand_count(&self) -> u64 {
        binomial(self.unknown().len(), self.hand_size - self.known.len())
    }

    /// Whether `hand` is a hand this participant could hold.
    pub fn admits(&self, hand: TokenSet) -> bool {
        hand.len() == self.hand_size
            && self.known.is_subset(hand)
            && hand.is_subset(self.possible)
            && self.clauses.iter().all(|c| !c.is_disjoint(hand))
    }

    /// Every hand satisfying all constraints. Exponential; callers bound it
    /// with [`candidate_hand_count`](Self::candidate_hand_count) first.
    pub fn candidate_hands(&self) -> Vec<TokenSet> {
        let pool: Vec<Token> = self.unknown().iter().collect();
        let need = self.hand_size - self.known.len();
        let mut hands = Vec::new();
        collect_combinations(&pool, need, 0, self.known, &mut |hand| {
            if self.clauses.iter().all(|c| !c.is_disjoint(hand)) {
                hands.push(hand);
            }
        });
        hands
    }

    // ── Mutators (propagation engine only) ───────────────────────────────

    /// Returns whether anything changed.
    pub(crate) fn holds_one_of(&mut self, tokens: TokenSet) -> Result<bool> {
        let live = tokens.intersection(self.possible);
        if live.is_empty() {
            return contradiction(format!(
                "participant cannot hold any of {tokens} (possible {})",
                self.possible
            ));
        }
        if !live.is_disjoint(self.known) || self.clauses.iter().any(|c| c.is_subset(live)) {
            return Ok(false);
        }
        self.clauses.push(live);
        self.normalize()?;
        Ok(true)
    }

    pub(crate) fn exclude(&mut self, tokens: TokenSet) -> Result<bool> {
        let proven = tokens.intersection(self.known);
        if !proven.is_empty() {
            return contradiction(format!("cannot exclude {proven}: already proven held"));
        }
        let removed = tokens.intersection(self.possible);
        if removed.is_empty() {
            return Ok(false);
        }
        self.possible = self.possible.difference(removed);
        self.normalize()?;
        Ok(true)
    }

    /// Exclude every token outside `allowed`.
    pub(crate) fn restrict_to(&mut self, allowed: TokenSet) -> Result<bool> {
        self.exclude(allowed.complement())
    }

    /// Bring the value back to normal form. Returns whether it changed.
    pub(crate) fn normalize(&mut self) -> Result<bool> {
        let mut any_change = false;
        loop {
            let mut changed = self.settle_counts()?;
            changed |= self.shrink_clauses()?;
            changed |= self.exclude_outside_disjoint_families()?;
            if !changed {
                return Ok(any_change);
            }
            any_change = true;
        }
    }

    fn settle_counts(&mut self) -> Result<bool> {
        if self.known.len() > self.hand_size {
            return contradiction(format!(
                "{} tokens proven held but hand size is {}",
                self.known.len(),
                self.hand_size
            ));
        }
        if self.possible.len() < self.hand_size {
            return contradiction(format!(
                "only {} possible tokens left for a hand of {}",
                self.possible.len(),
                self.hand_size
            ));
        }
        if self.possible.len() == self.hand_size && self.known != self.possible {
            self.known = self.possible;
            return Ok(true);
        }
        if self.known.len() == self.hand_size && self.possible != self.known {
            self.possible = self.known;
            return Ok(true);
        }
        Ok(false)
    }

    /// Steps 1–3: shrink, drop satisfied and subsumed clauses, promote
    /// singletons.
    fn shrink_clauses(&mut self) -> Result<bool> {
        let mut changed = false;
        let mut kept: Vec<TokenSet> = Vec::with_capacity(self.clauses.len());
        for &clause in &self.clauses {
            if !clause.is_disjoint(self.known) {
                changed = true;
                continue;
            }
            let live = clause.intersection(self.possible);
            if live.is_empty() {
                return contradiction(format!("clause {clause} has no possible token left"));
            }
            if live != clause {
                changed = true;
            }
            if live.len() == 1 {
                self.known = self.known.union(live);
                changed = true;
                continue;
            }
            kept.push(live);
        }
        if self.known.len() > self.hand_size {
            return contradiction(format!(
                "{} tokens proven held but hand size is {}",
                self.known.len(),
                self.hand_size
            ));
        }

        // Most specific first so that a superset always meets its subset.
        kept.sort_by_key(|c| (c.len(), c.bits()));
        let mut minimal: Vec<TokenSet> = Vec::with_capacity(kept.len());
        for clause in kept {
            if minimal.iter().any(|m| m.is_subset(clause)) {
                changed = true;
                continue;
            }
            minimal.push(clause);
        }
        minimal.sort();

        // Clauses promoted in this pass may satisfy others; the caller loops.
        if minimal != self.clauses {
            changed = true;
        }
        self.clauses = minimal;
        Ok(changed)
    }

    /// Step 4.
    fn exclude_outside_disjoint_families(&mut self) -> Result<bool> {
        let Some(need) = self.hand_size.checked_sub(self.known.len()) else {
            return contradiction(format!("more tokens proven held than the hand size {}", self.hand_size));
        };
        if need == 0 || self.clauses.len() < need {
            return Ok(false);
        }

        let mut allowed = self.possible;
        let mut budget = FAMILY_SEARCH_LIMIT;
        let mut overflow = false;
        disjoint_families(
            &self.clauses,
            need,
            0,
            TokenSet::EMPTY,
            &mut budget,
            &mut |union, extendable| {
                overflow |= extendable;
                allowed = allowed.intersection(union.union(self.known));
            },
        );
        if overflow {
            return contradiction(format!(
                "more than {need} disjoint clauses for the {need} unknown tokens of the hand"
            ));
        }
        if allowed == self.possible {
            return Ok(false);
        }
        self.possible = allowed;
        Ok(true)
    }
}

/// Depth-first search for families of `need` pairwise-disjoint clauses.
///
/// `visit(union, extendable)` is called once per family; `extendable` is
/// set when some later clause is disjoint from the whole family.
fn disjoint_families(
    clauses: &[TokenSet],
    need: usize,
    start: usize,
    union: TokenSet,
    budget: &mut usize,
    visit: &mut impl FnMut(TokenSet, bool),
) {
    if need == 0 {
        let extendable = clauses[start..].iter().any(|c| c.is_disjoint(union));
        visit(union, extendable);
        return;
    }
    for i in start..clauses.len() {
        if *budget == 0 {
            return;
        }
        if clauses.len() - i < need {
            return;
        }
        let clause = clauses[i];
        if clause.is_disjoint(union) {
            *budget -= 1;
            disjoint_families(clauses, need - 1, i + 1, union.union(clause), budget, visit);
        }
    }
}

/// Calls `emit(base ∪ c)` for every `need`-subset `c` of `pool[start..]`.
pub(crate) fn collect_combinations(
    pool: &[Token],
    need: usize,
    start: usize,
    base: TokenSet,
    emit: &mut impl FnMut(TokenSet),
) {
    if need == 0 {
        emit(base);
        return;
    }
    if pool.len() < start + need {
        return;
    }
    for i in start..=(pool.len() - need) {
        let mut next = base;
        next.insert(pool[i]);
        collect_combinations(pool, need - 1, i + 1, next, emit);
    }
}
