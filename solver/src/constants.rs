//! Token universe and game constants.
//!
//! Tokens are numbered category by category so that each category occupies a
//! contiguous run of bit positions in a [`TokenSet`](crate::types::TokenSet):
//!
//! | Category | Ids | Count |
//! |----------|-----|-------|
//! | Suspect  | 0..6   | [`SUSPECT_COUNT`] |
//! | Weapon   | 6..12  | [`WEAPON_COUNT`]  |
//! | Room     | 12..21 | [`ROOM_COUNT`]    |
//!
//! Only the three category sizes are fixed here; every mask and offset below
//! is derived from them.

/// Number of suspect tokens.
pub const SUSPECT_COUNT: usize = 6;

/// Number of weapon tokens.
pub const WEAPON_COUNT: usize = 6;

/// Number of room tokens.
pub const ROOM_COUNT: usize = 9;

/// Number of categories. The solution holds one token from each.
pub const CATEGORY_COUNT: usize = 3;

/// Size of the whole universe.
pub const TOKEN_COUNT: usize = SUSPECT_COUNT + WEAPON_COUNT + ROOM_COUNT;

/// First id of each category, indexed by `Category as usize`.
pub const CATEGORY_OFFSETS: [usize; CATEGORY_COUNT] = [0, SUSPECT_COUNT, SUSPECT_COUNT + WEAPON_COUNT];

/// Token count of each category, indexed by `Category as usize`.
pub const CATEGORY_SIZES: [usize; CATEGORY_COUNT] = [SUSPECT_COUNT, WEAPON_COUNT, ROOM_COUNT];

/// Hand size of the virtual solution participant.
pub const SOLUTION_SIZE: usize = CATEGORY_COUNT;

/// Tokens dealt to the players once the solution is set aside.
pub const DEALT_COUNT: usize = TOKEN_COUNT - SOLUTION_SIZE;

/// Number of distinct suggestions (one token per category).
pub const SUGGESTION_COUNT: usize = SUSPECT_COUNT * WEAPON_COUNT * ROOM_COUNT;

/// Smallest supported table.
pub const MIN_PLAYERS: usize = 3;

/// Largest supported table.
pub const MAX_PLAYERS: usize = 6;

/// Bit mask with every token set.
pub const ALL_TOKENS_MASK: u32 = (1 << TOKEN_COUNT) - 1;

/// Default bound on the product of candidate-hand counts under which the
/// exhaustive closure runs.
pub const DEFAULT_EXHAUSTIVE_LIMIT: u64 = 20_000;

/// Display names in id order.
pub const TOKEN_NAMES: [&str; TOKEN_COUNT] = [
    // Suspects
    "Green",
    "Mustard",
    "Peacock",
    "Plum",
    "Scarlet",
    "White",
    // Weapons
    "Candlestick",
    "Knife",
    "Pipe",
    "Revolver",
    "Rope",
    "Wrench",
    // Rooms
    "Ballroom",
    "Billiards Room",
    "Conservatory",
    "Dining Room",
    "Hall",
    "Kitchen",
    "Library",
    "Lounge",
    "Study",
];

/// Two-letter abbreviations in id order (the wire format).
pub const TOKEN_ABBREVIATIONS: [&str; TOKEN_COUNT] = [
    "Gr", "Mu", "Pe", "Pl", "Sc", "Wh", // Suspects
    "Ca", "Kn", "Pi", "Re", "Ro", "Wr", // Weapons
    "Ba", "Bi", "Co", "Di", "Ha", "Ki", "Li", "Lo", "St", // Rooms
];

/// Bit mask of one category's tokens.
#[inline(always)]
pub const fn category_mask(category_index: usize) -> u32 {
    ((1u32 << CATEGORY_SIZES[category_index]) - 1) << CATEGORY_OFFSETS[category_index]
}

/// Hand size dealt to `seat` at a table of `player_count` players.
///
/// The first `DEALT_COUNT % player_count` seats receive one extra token.
#[inline]
pub fn dealt_hand_size(player_count: usize, seat: usize) -> usize {
    DEALT_COUNT / player_count + usize::from(seat < DEALT_COUNT % player_count)
}

/// Binomial coefficient C(n, k), saturating at `u64::MAX`.
pub fn binomial(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u64 = 1;
    for i in 0..k {
        // result * (n - i) / (i + 1) stays integral at every step.
        result = match result.checked_mul((n - i) as u64) {
            Some(v) => v / (i as u64 + 1),
            None => return u64::MAX,
        };
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_masks_partition_universe() {
        let mut union = 0u32;
        for c in 0..CATEGORY_COUNT {
            assert_eq!(union & category_mask(c), 0);
            union |= category_mask(c);
        }
        assert_eq!(union, ALL_TOKENS_MASK);
        assert_eq!(category_mask(0).count_ones() as usize, SUSPECT_COUNT);
        assert_eq!(category_mask(2).count_ones() as usize, ROOM_COUNT);
    }

    #[test]
    fn test_dealt_hand_sizes() {
        for players in MIN_PLAYERS..=MAX_PLAYERS {
            let total: usize = (0..players).map(|s| dealt_hand_size(players, s)).sum();
            assert_eq!(total, DEALT_COUNT);
        }
        assert_eq!(dealt_hand_size(4, 0), 5);
        assert_eq!(dealt_hand_size(4, 1), 5);
        assert_eq!(dealt_hand_size(4, 2), 4);
        assert_eq!(dealt_hand_size(5, 3), 3);
    }

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(5, 0), 1);
        assert_eq!(binomial(5, 2), 10);
        assert_eq!(binomial(18, 6), 18_564);
        assert_eq!(binomial(3, 4), 0);
    }

    #[test]
    fn test_abbreviations_are_unique() {
        for i in 0..TOKEN_COUNT {
            assert!(TOKEN_NAMES[i].starts_with(TOKEN_ABBREVIATIONS[i]));
            for j in (i + 1)..TOKEN_COUNT {
                assert!(!TOKEN_ABBREVIATIONS[i].eq_ignore_ascii_case(TOKEN_ABBREVIATIONS[j]));
            }
        }
    }
}
