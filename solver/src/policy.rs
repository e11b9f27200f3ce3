//! Decisions taken on the agent's behalf: what to ask, what to show, when
//! to accuse.

use rand::Rng;
use tracing::debug;

use crate::error::{ClueError, Result};
use crate::knowledge::KnowledgeBase;
use crate::search::SuggestionSearch;
use crate::types::{Suggestion, Token, TokenSet};

/// Pick the most informative suggestion among those not asked yet.
pub fn choose_suggestion<R: Rng>(
    search: &SuggestionSearch,
    kb: &KnowledgeBase,
    not_yet_asked: &[Suggestion],
    rng: &mut R,
) -> Result<Suggestion> {
    if not_yet_asked.is_empty() {
        return Err(ClueError::NoLegalSuggestion);
    }
    search.choose(kb, not_yet_asked, rng)
}

/// Pick the token of `hand` to reveal to `requester`.
///
/// A token the requester has already seen leaks nothing new. Otherwise the
/// token seen by the fewest seats is shown; ties go to the lowest id.
pub fn choose_disprove_token(
    kb: &KnowledgeBase,
    hand: TokenSet,
    suggestion: Suggestion,
    requester: usize,
) -> Result<Token> {
    let eligible = hand.intersection(suggestion.token_set());
    if let Some(seen) = eligible.iter().find(|&t| kb.was_shown_to(t, requester)) {
        debug!(token = %seen, requester, "re-showing token");
        return Ok(seen);
    }
    eligible
        .iter()
        .min_by_key(|&t| kb.times_shown(t))
        .ok_or(ClueError::NothingToDisprove)
}

/// The solution, once exactly one triple remains.
pub fn choose_accusation(kb: &KnowledgeBase) -> Option<Suggestion> {
    match kb.possible_solutions().as_slice() {
        [only] => Some(*only),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchConfig;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn set(s: &str) -> TokenSet {
        TokenSet::parse(s).unwrap()
    }

    fn tok(s: &str) -> Token {
        Token::parse(s).unwrap()
    }

    fn sug(s: &str) -> Suggestion {
        Suggestion::parse(s).unwrap()
    }

    fn seated() -> KnowledgeBase {
        KnowledgeBase::initialize(4, Some(0), Some(set("Gr Ca Ba Bi Co"))).unwrap()
    }

    #[test]
    fn test_disprove_prefers_token_already_shown_to_requester() {
        let kb = seated()
            .on_suggestion_disproved(2, sug("Mu Ca Li"), 0, Some(tok("Ca")))
            .unwrap();
        let hand = set("Gr Ca Ba Bi Co");
        assert_eq!(choose_disprove_token(&kb, hand, sug("Gr Ca Ba"), 2).unwrap(), tok("Ca"));
    }

    #[test]
    fn test_disprove_prefers_least_shown() {
        let kb = seated()
            .on_suggestion_disproved(1, sug("Gr Kn Li"), 0, Some(tok("Gr")))
            .unwrap()
            .on_suggestion_disproved(2, sug("Gr Kn Li"), 0, Some(tok("Gr")))
            .unwrap();
        let hand = set("Gr Ca Ba Bi Co");
        // Seat 3 has seen nothing; Ca has been shown to nobody.
        assert_eq!(choose_disprove_token(&kb, hand, sug("Gr Ca Li"), 3).unwrap(), tok("Ca"));
        // Lowest id among equally unseen tokens.
        assert_eq!(choose_disprove_token(&kb, hand, sug("Mu Ca Ba"), 3).unwrap(), tok("Ca"));
    }

    #[test]
    fn test_disprove_without_eligible_token() {
        let kb = seated();
        assert!(matches!(
            choose_disprove_token(&kb, set("Gr Ca Ba Bi Co"), sug("Mu Kn Li"), 1),
            Err(ClueError::NothingToDisprove)
        ));
    }

    #[test]
    fn test_accusation_needs_unique_solution() {
        let kb = seated();
        assert_eq!(choose_accusation(&kb), None);
        let kb = kb.on_suggestion_not_disproved(0, sug("Mu Kn Li")).unwrap();
        assert_eq!(choose_accusation(&kb), Some(sug("Mu Kn Li")));
    }

    #[test]
    fn test_choose_suggestion_respects_candidates() {
        let search = SuggestionSearch::new(&SearchConfig::default()).unwrap();
        let kb = seated();
        let mut rng = SmallRng::seed_from_u64(3);
        let only = [sug("Pe Pi Di")];
        assert_eq!(choose_suggestion(&search, &kb, &only, &mut rng).unwrap(), only[0]);
        assert!(matches!(
            choose_suggestion(&search, &kb, &[], &mut rng),
            Err(ClueError::NoLegalSuggestion)
        ));
    }
}
