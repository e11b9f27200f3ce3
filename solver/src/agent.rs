//! A seated player: owns the live Knowledge Base lineage of one seat and
//! answers the host's three questions (suggest, disprove, accuse).

use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, warn};

use crate::error::Result;
use crate::knowledge::KnowledgeBase;
use crate::policy;
use crate::search::SuggestionSearch;
use crate::types::{Suggestion, Token, TokenSet};

pub struct Agent {
    seat: usize,
    hand: TokenSet,
    kb: KnowledgeBase,
    unasked: Vec<Suggestion>,
    playing: Vec<bool>,
    search: Arc<SuggestionSearch>,
    rng: SmallRng,
}

impl Agent {
    pub fn new(
        player_count: usize,
        seat: usize,
        hand: TokenSet,
        search: Arc<SuggestionSearch>,
        seed: u64,
    ) -> Result<Self> {
        let kb = KnowledgeBase::initialize(player_count, Some(seat), Some(hand))?;
        Ok(Agent {
            seat,
            hand,
            kb,
            unasked: Suggestion::all().collect(),
            playing: vec![true; player_count],
            search,
            rng: SmallRng::seed_from_u64(seed),
        })
    }

    /// Replace the Knowledge Base, e.g. to change its exhaustive limit.
    pub fn with_knowledge(mut self, kb: KnowledgeBase) -> Self {
        self.kb = kb;
        self
    }

    pub fn seat(&self) -> usize {
        self.seat
    }

    pub fn hand(&self) -> TokenSet {
        self.hand
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn unasked(&self) -> &[Suggestion] {
        &self.unasked
    }

    pub fn is_playing(&self, seat: usize) -> bool {
        self.playing.get(seat).copied().unwrap_or(false)
    }

    pub fn players_left(&self) -> usize {
        self.playing.iter().filter(|&&p| p).count()
    }

    /// The suggestion to ask this turn. It will not be offered again.
    pub fn suggest(&mut self) -> Result<Suggestion> {
        let choice = policy::choose_suggestion(&self.search, &self.kb, &self.unasked, &mut self.rng)?;
        self.unasked.retain(|&s| s != choice);
        Ok(choice)
    }

    pub fn disprove(&self, suggester: usize, suggestion: Suggestion) -> Result<Token> {
        policy::choose_disprove_token(&self.kb, self.hand, suggestion, suggester)
    }

    pub fn accuse(&self) -> Option<Suggestion> {
        policy::choose_accusation(&self.kb)
    }

    /// Feed a suggestion round into the Knowledge Base. On error the
    /// previous state is kept.
    pub fn observe_suggestion(
        &mut self,
        suggester: usize,
        suggestion: Suggestion,
        disprover: Option<usize>,
        shown: Option<Token>,
    ) -> Result<()> {
        match self.kb.record_suggestion(suggester, suggestion, disprover, shown) {
            Ok(next) => {
                self.kb = next;
                Ok(())
            }
            Err(e) => {
                warn!(seat = self.seat, suggester, %suggestion, error = %e, "rejected suggestion event");
                Err(e)
            }
        }
    }

    /// Feed an accusation into the Knowledge Base. Returns the winner once
    /// the game is decided.
    pub fn observe_accusation(&mut self, accuser: usize, accusation: Suggestion, correct: bool) -> Result<Option<usize>> {
        self.kb = self.kb.on_accusation(accuser, accusation, correct).inspect_err(|e| {
            warn!(seat = self.seat, accuser, %accusation, error = %e, "rejected accusation event");
        })?;
        if correct {
            debug!(seat = self.seat, winner = accuser, "game won by accusation");
            return Ok(Some(accuser));
        }
        if let Some(p) = self.playing.get_mut(accuser) {
            *p = false;
        }
        if self.players_left() == 1 {
            let last = self.playing.iter().position(|&p| p);
            debug!(seat = self.seat, winner = ?last, "last player standing");
            return Ok(last);
        }
        Ok(None)
    }
}
