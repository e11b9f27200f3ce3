//! Random ground truth for self-play: the solution and every seat's hand.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::constants::{MAX_PLAYERS, MIN_PLAYERS};
use crate::error::{ClueError, Result};
use crate::knowledge::Holder;
use crate::types::{Category, Suggestion, Token, TokenSet};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Deal {
    pub solution: Suggestion,
    /// Hands in seat order.
    pub hands: Vec<TokenSet>,
}

impl Deal {
    /// One token per category goes to the solution; the rest are shuffled
    /// and dealt round-robin from seat 0.
    pub fn random<R: Rng>(player_count: usize, rng: &mut R) -> Result<Deal> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count) {
            return Err(ClueError::InvalidPlayerCount(player_count));
        }
        let [suspect, weapon, room] = Category::ALL.map(|category| {
            let tokens: Vec<Token> = category.tokens().iter().collect();
            tokens[rng.random_range(0..tokens.len())]
        });
        let solution = Suggestion::new(suspect, weapon, room)?;

        let mut deck: Vec<Token> = solution.token_set().complement().iter().collect();
        deck.shuffle(rng);
        let mut hands = vec![TokenSet::EMPTY; player_count];
        for (i, token) in deck.into_iter().enumerate() {
            hands[i % player_count].insert(token);
        }
        Ok(Deal { solution, hands })
    }

    pub fn player_count(&self) -> usize {
        self.hands.len()
    }

    pub fn holder_of(&self, token: Token) -> Holder {
        self.hands
            .iter()
            .position(|hand| hand.contains(token))
            .map_or(Holder::Solution, Holder::Player)
    }

    /// First seat after `suggester` in turn order holding one of the tokens.
    pub fn first_disprover(&self, suggester: usize, suggestion: Suggestion) -> Option<usize> {
        let n = self.player_count();
        (1..n)
            .map(|step| (suggester + step) % n)
            .find(|&seat| !self.hands[seat].is_disjoint(suggestion.token_set()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{dealt_hand_size, TOKEN_COUNT};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_deal_partitions_tokens() {
        let mut rng = SmallRng::seed_from_u64(42);
        for players in MIN_PLAYERS..=MAX_PLAYERS {
            let deal = Deal::random(players, &mut rng).unwrap();
            let mut all = deal.solution.token_set();
            for (seat, hand) in deal.hands.iter().enumerate() {
                assert!(hand.is_disjoint(all));
                assert_eq!(hand.len(), dealt_hand_size(players, seat));
                all = all.union(*hand);
            }
            assert_eq!(all.len(), TOKEN_COUNT);
        }
    }

    #[test]
    fn test_random_deal_is_seeded() {
        let a = Deal::random(4, &mut SmallRng::seed_from_u64(9)).unwrap();
        let b = Deal::random(4, &mut SmallRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
        assert!(Deal::random(7, &mut SmallRng::seed_from_u64(9)).is_err());
    }

    #[test]
    fn test_first_disprover() {
        let deal = Deal {
            solution: Suggestion::parse("Sc Wr Ha").unwrap(),
            hands: vec![
                TokenSet::parse("Gr Ca Ba Bi Co Di").unwrap(),
                TokenSet::parse("Mu Kn Pi Ki Li Wh").unwrap(),
                TokenSet::parse("Pe Pl Re Ro Lo St").unwrap(),
            ],
        };
        let s = Suggestion::parse("Mu Ca Ha").unwrap();
        assert_eq!(deal.first_disprover(0, s), Some(1));
        assert_eq!(deal.first_disprover(1, s), Some(0));
        assert_eq!(deal.first_disprover(2, Suggestion::parse("Sc Wr Ha").unwrap()), None);
        assert_eq!(deal.holder_of(Token::parse("Ha").unwrap()), Holder::Solution);
        assert_eq!(deal.holder_of(Token::parse("Ro").unwrap()), Holder::Player(2));
    }
}
