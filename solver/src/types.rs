//! Core value types: tokens, token bit-sets and suggestions.
//!
//! Every type here is `Copy` and carries no behaviour beyond identity,
//! category lookup and the two-letter wire format. A [`Token`] is a stable
//! index into the static table in [`crate::constants`]; a [`TokenSet`] is a
//! `u32` bit-set over those indices.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{ClueError, Result};

// ── Category ──────────────────────────────────────────────────────────────

/// The three token categories, in id order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Suspect = 0,
    Weapon = 1,
    Room = 2,
}

impl Category {
    pub const ALL: [Category; CATEGORY_COUNT] = [Category::Suspect, Category::Weapon, Category::Room];

    /// All tokens of this category.
    #[inline]
    pub fn tokens(self) -> TokenSet {
        TokenSet(category_mask(self as usize))
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Suspect => "Suspect",
            Category::Weapon => "Weapon",
            Category::Room => "Room",
        }
    }
}

// ── Token ─────────────────────────────────────────────────────────────────

/// One card of the game, identified by its position in the token table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(u8);

impl Token {
    /// Token with the given id. Returns `None` outside the universe.
    #[inline]
    pub fn new(id: usize) -> Option<Token> {
        (id < TOKEN_COUNT).then_some(Token(id as u8))
    }

    #[inline]
    pub fn id(self) -> usize {
        self.0 as usize
    }

    pub fn category(self) -> Category {
        let id = self.id();
        if id < CATEGORY_OFFSETS[1] {
            Category::Suspect
        } else if id < CATEGORY_OFFSETS[2] {
            Category::Weapon
        } else {
            Category::Room
        }
    }

    pub fn name(self) -> &'static str {
        TOKEN_NAMES[self.id()]
    }

    pub fn abbreviation(self) -> &'static str {
        TOKEN_ABBREVIATIONS[self.id()]
    }

    #[inline]
    pub fn mask(self) -> u32 {
        1 << self.0
    }

    /// Every token in id order.
    pub fn all() -> impl Iterator<Item = Token> {
        (0..TOKEN_COUNT).map(|id| Token(id as u8))
    }

    /// Look a token up by its two-letter abbreviation, ignoring case.
    pub fn parse(abbreviation: &str) -> Result<Token> {
        TOKEN_ABBREVIATIONS
            .iter()
            .position(|a| a.eq_ignore_ascii_case(abbreviation))
            .map(|id| Token(id as u8))
            .ok_or_else(|| ClueError::UnknownToken(abbreviation.to_string()))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl FromStr for Token {
    type Err = ClueError;

    fn from_str(s: &str) -> Result<Self> {
        Token::parse(s)
    }
}

impl Serialize for Token {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.abbreviation())
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Token::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ── TokenSet ──────────────────────────────────────────────────────────────

/// Bit-set over token ids (bit `i` set ⇔ token `i` is a member).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenSet(u32);

impl TokenSet {
    pub const EMPTY: TokenSet = TokenSet(0);
    pub const ALL: TokenSet = TokenSet(ALL_TOKENS_MASK);

    #[inline]
    pub fn from_bits(bits: u32) -> TokenSet {
        TokenSet(bits & ALL_TOKENS_MASK)
    }

    #[inline]
    pub fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn single(token: Token) -> TokenSet {
        TokenSet(token.mask())
    }

    #[inline]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn contains(self, token: Token) -> bool {
        self.0 & token.mask() != 0
    }

    #[inline]
    pub fn insert(&mut self, token: Token) {
        self.0 |= token.mask();
    }

    #[inline]
    pub fn remove(&mut self, token: Token) {
        self.0 &= !token.mask();
    }

    #[inline]
    pub fn union(self, other: TokenSet) -> TokenSet {
        TokenSet(self.0 | other.0)
    }

    #[inline]
    pub fn intersection(self, other: TokenSet) -> TokenSet {
        TokenSet(self.0 & other.0)
    }

    #[inline]
    pub fn difference(self, other: TokenSet) -> TokenSet {
        TokenSet(self.0 & !other.0)
    }

    #[inline]
    pub fn complement(self) -> TokenSet {
        TokenSet(!self.0 & ALL_TOKENS_MASK)
    }

    #[inline]
    pub fn is_subset(self, other: TokenSet) -> bool {
        self.0 & !other.0 == 0
    }

    #[inline]
    pub fn is_disjoint(self, other: TokenSet) -> bool {
        self.0 & other.0 == 0
    }

    /// The lowest-id member, if any.
    #[inline]
    pub fn first(self) -> Option<Token> {
        (self.0 != 0).then(|| Token(self.0.trailing_zeros() as u8))
    }

    /// Members in id order.
    pub fn iter(self) -> TokenSetIter {
        TokenSetIter(self.0)
    }

    /// Members restricted to one category.
    #[inline]
    pub fn in_category(self, category: Category) -> TokenSet {
        self.intersection(category.tokens())
    }

    /// Space-separated abbreviations, e.g. `"Gr Ca Ba"`.
    pub fn abbreviations(self) -> String {
        self.iter().map(Token::abbreviation).collect::<Vec<_>>().join(" ")
    }

    /// Parse space-separated abbreviations into a set.
    pub fn parse(input: &str) -> Result<TokenSet> {
        input
            .split_whitespace()
            .map(Token::parse)
            .collect::<Result<Vec<_>>>()
            .map(|tokens| tokens.into_iter().collect())
    }
}

impl FromIterator<Token> for TokenSet {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        let mut set = TokenSet::EMPTY;
        for token in iter {
            set.insert(token);
        }
        set
    }
}

impl IntoIterator for TokenSet {
    type Item = Token;
    type IntoIter = TokenSetIter;

    fn into_iter(self) -> TokenSetIter {
        self.iter()
    }
}

impl fmt::Display for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.abbreviations())
    }
}

impl Serialize for TokenSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// Iterator over the members of a [`TokenSet`], lowest id first.
pub struct TokenSetIter(u32);

impl Iterator for TokenSetIter {
    type Item = Token;

    #[inline]
    fn next(&mut self) -> Option<Token> {
        if self.0 == 0 {
            return None;
        }
        let id = self.0.trailing_zeros();
        self.0 &= self.0 - 1;
        Some(Token(id as u8))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for TokenSetIter {}

// ── Suggestion ────────────────────────────────────────────────────────────

/// One token per category. Also used for accusations and the solution.
///
/// Fields are private so that the one-per-category shape is enforced by the
/// constructors; equality compares the three tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Suggestion {
    suspect: Token,
    weapon: Token,
    room: Token,
}

impl Suggestion {
    /// Build from three tokens given in any order.
    pub fn new(a: Token, b: Token, c: Token) -> Result<Suggestion> {
        let mut slots: [Option<Token>; CATEGORY_COUNT] = [None; CATEGORY_COUNT];
        for token in [a, b, c] {
            let slot = &mut slots[token.category() as usize];
            if slot.is_some() {
                return Err(ClueError::MalformedSuggestion {
                    input: format!("{a} {b} {c}"),
                    reason: format!("more than one {}", token.category().name()),
                });
            }
            *slot = Some(token);
        }
        match slots {
            [Some(suspect), Some(weapon), Some(room)] => Ok(Suggestion { suspect, weapon, room }),
            _ => Err(ClueError::MalformedSuggestion {
                input: format!("{a} {b} {c}"),
                reason: "expected one token per category".to_string(),
            }),
        }
    }

    /// The suggestion with the given per-category indices (0-based within
    /// each category). Callers guarantee the indices are in range.
    fn from_indices(s: usize, w: usize, r: usize) -> Suggestion {
        Suggestion {
            suspect: Token((CATEGORY_OFFSETS[0] + s) as u8),
            weapon: Token((CATEGORY_OFFSETS[1] + w) as u8),
            room: Token((CATEGORY_OFFSETS[2] + r) as u8),
        }
    }

    pub fn suspect(&self) -> Token {
        self.suspect
    }

    pub fn weapon(&self) -> Token {
        self.weapon
    }

    pub fn room(&self) -> Token {
        self.room
    }

    pub fn tokens(&self) -> [Token; CATEGORY_COUNT] {
        [self.suspect, self.weapon, self.room]
    }

    pub fn token_set(&self) -> TokenSet {
        TokenSet(self.suspect.mask() | self.weapon.mask() | self.room.mask())
    }

    #[inline]
    pub fn contains(&self, token: Token) -> bool {
        self.token_set().contains(token)
    }

    /// Every suggestion, suspect-major order.
    pub fn all() -> impl Iterator<Item = Suggestion> {
        (0..SUSPECT_COUNT).flat_map(|s| {
            (0..WEAPON_COUNT).flat_map(move |w| (0..ROOM_COUNT).map(move |r| Suggestion::from_indices(s, w, r)))
        })
    }

    /// Every suggestion drawing only from `tokens`.
    pub fn all_within(tokens: TokenSet) -> impl Iterator<Item = Suggestion> {
        Suggestion::all().filter(move |s| s.token_set().is_subset(tokens))
    }

    /// Parse `"Mu Kn Li"` (three whitespace-separated abbreviations).
    pub fn parse(input: &str) -> Result<Suggestion> {
        let parts: Vec<&str> = input.split_whitespace().collect();
        if parts.len() != CATEGORY_COUNT {
            return Err(ClueError::MalformedSuggestion {
                input: input.to_string(),
                reason: format!("expected {CATEGORY_COUNT} abbreviations, found {}", parts.len()),
            });
        }
        let tokens = parts
            .iter()
            .map(|p| Token::parse(p))
            .collect::<Result<Vec<_>>>()?;
        Suggestion::new(tokens[0], tokens[1], tokens[2])
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.suspect, self.weapon, self.room)
    }
}

impl FromStr for Suggestion {
    type Err = ClueError;

    fn from_str(s: &str) -> Result<Self> {
        Suggestion::parse(s)
    }
}

impl Serialize for Suggestion {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Suggestion {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Suggestion::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ── Certainty ─────────────────────────────────────────────────────────────

/// What is known about one participant holding one token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Certainty {
    Yes,
    No,
    Maybe,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(abbr: &str) -> Token {
        Token::parse(abbr).unwrap()
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(t("kn"), t("Kn"));
        assert_eq!(t("KN").name(), "Knife");
        assert_eq!(t("St").category(), Category::Room);
    }

    #[test]
    fn test_unknown_token() {
        assert!(matches!(Token::parse("Zz"), Err(ClueError::UnknownToken(_))));
        assert!(matches!(Token::parse("Knife"), Err(ClueError::UnknownToken(_))));
    }

    #[test]
    fn test_categories() {
        assert_eq!(Category::Suspect.tokens().len(), SUSPECT_COUNT);
        assert_eq!(Category::Weapon.tokens().len(), WEAPON_COUNT);
        assert_eq!(Category::Room.tokens().len(), ROOM_COUNT);
        for token in Token::all() {
            assert!(token.category().tokens().contains(token));
        }
    }

    #[test]
    fn test_token_set_iteration_order() {
        let set: TokenSet = [t("Ba"), t("Gr"), t("Ca")].into_iter().collect();
        let ids: Vec<usize> = set.iter().map(Token::id).collect();
        assert_eq!(ids, vec![0, 6, 12]);
        assert_eq!(set.abbreviations(), "Gr Ca Ba");
        assert_eq!(TokenSet::parse("gr ca ba").unwrap(), set);
    }

    #[test]
    fn test_token_set_algebra() {
        let a = TokenSet::parse("Gr Mu Kn").unwrap();
        let b = TokenSet::parse("Mu Kn Li").unwrap();
        assert_eq!(a.intersection(b), TokenSet::parse("Mu Kn").unwrap());
        assert_eq!(a.difference(b), TokenSet::parse("Gr").unwrap());
        assert_eq!(a.union(b).len(), 4);
        assert!(a.intersection(b).is_subset(a));
        assert_eq!(TokenSet::ALL.complement(), TokenSet::EMPTY);
        assert_eq!(a.first(), Some(t("Gr")));
    }

    #[test]
    fn test_suggestion_order_independent() {
        let a = Suggestion::new(t("Mu"), t("Kn"), t("Li")).unwrap();
        let b = Suggestion::new(t("Li"), t("Mu"), t("Kn")).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "Mu Kn Li");
        assert_eq!(Suggestion::parse("li mu kn").unwrap(), a);
    }

    #[test]
    fn test_malformed_suggestions() {
        assert!(matches!(
            Suggestion::parse("Mu Kn"),
            Err(ClueError::MalformedSuggestion { .. })
        ));
        assert!(matches!(
            Suggestion::parse("Mu Gr Li"),
            Err(ClueError::MalformedSuggestion { .. })
        ));
        assert!(matches!(Suggestion::parse("Mu Kn Xx"), Err(ClueError::UnknownToken(_))));
    }

    #[test]
    fn test_all_suggestions() {
        let all: Vec<Suggestion> = Suggestion::all().collect();
        assert_eq!(all.len(), SUGGESTION_COUNT);
        let unique: std::collections::HashSet<_> = all.iter().collect();
        assert_eq!(unique.len(), SUGGESTION_COUNT);
        assert_eq!(
            Suggestion::all_within(TokenSet::parse("Gr Mu Kn Li Ba").unwrap()).count(),
            4
        );
    }

    #[test]
    fn test_suggestion_serde_uses_abbreviations() {
        let s = Suggestion::parse("Li Mu Kn").unwrap();
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, "\"Mu Kn Li\"");
        assert_eq!(serde_json::from_str::<Suggestion>(&json).unwrap(), s);
    }

    #[test]
    fn test_suggestion_deserialize_rejects_invalid_triple() {
        assert!(serde_json::from_str::<Suggestion>("\"Ba Ba Ba\"").is_err());
        assert!(serde_json::from_str::<Suggestion>("\"Mu Gr Li\"").is_err());
        assert!(serde_json::from_str::<Suggestion>(r#"{"suspect":"Ba","weapon":"Ba","room":"Ba"}"#).is_err());
    }
}
