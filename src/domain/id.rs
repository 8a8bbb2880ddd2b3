//! Identifier types for lanes and cards
//!
//! ID Format:
//! - Lane IDs: lowercase ASCII letters, digits, `-` or `_`, at most 32 chars (e.g. `recon`)
//! - Card IDs: any non-empty string without whitespace (e.g. `task1`)
//!
//! Newly created cards get ids from [`CardIdGenerator`], which hands out
//! `task{n}` from a monotonic counter. The counter starts past every numeric
//! suffix already on the board, so generated ids never collide with seeded ones
//! or with each other, no matter how quickly they are requested.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const MAX_LANE_ID_LEN: usize = 32;
const GENERATED_PREFIX: &str = "task";

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid lane ID: expected 1-{MAX_LANE_ID_LEN} chars of [a-z0-9_-], got '{0}'")]
    InvalidLaneId(String),

    #[error("Invalid card ID: expected a non-empty id without whitespace, got '{0}'")]
    InvalidCardId(String),
}

/// Lane identifier, fixed at board initialization
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LaneId(String);

impl LaneId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LaneId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let valid = !s.is_empty()
            && s.len() <= MAX_LANE_ID_LEN
            && s.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');

        if !valid {
            return Err(IdError::InvalidLaneId(s.to_string()));
        }

        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for LaneId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LaneId> for String {
    fn from(id: LaneId) -> Self {
        id.0
    }
}

/// Card identifier, immutable once the card exists
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CardId(String);

impl CardId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric suffix of a generated-style id (`task12` -> 12)
    fn generated_sequence(&self) -> Option<u64> {
        self.0.strip_prefix(GENERATED_PREFIX)?.parse().ok()
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CardId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.chars().any(char::is_whitespace) {
            return Err(IdError::InvalidCardId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for CardId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CardId> for String {
    fn from(id: CardId) -> Self {
        id.0
    }
}

/// Monotonic card id source
///
/// Once `task{u64::MAX}` has been handed out the generator is exhausted and
/// [`CardIdGenerator::next_id`] returns `None` for good.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardIdGenerator {
    next: Option<u64>,
}

impl CardIdGenerator {
    /// Creates a generator whose first id is `task{start}`
    pub fn starting_at(start: u64) -> Self {
        Self {
            next: Some(start.max(1)),
        }
    }

    /// Creates a generator that skips past every `task{n}` id in `existing`
    pub fn after<'a>(existing: impl IntoIterator<Item = &'a CardId>) -> Self {
        let max = existing
            .into_iter()
            .filter_map(CardId::generated_sequence)
            .max()
            .unwrap_or(0);
        Self {
            next: max.checked_add(1),
        }
    }

    /// Returns a fresh id and advances the counter, or `None` when exhausted
    pub fn next_id(&mut self) -> Option<CardId> {
        let n = self.next?;
        self.next = n.checked_add(1);
        Some(CardId(format!("{}{}", GENERATED_PREFIX, n)))
    }

    pub fn is_exhausted(&self) -> bool {
        self.next.is_none()
    }
}

impl Default for CardIdGenerator {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn lane_id_parses_correctly() {
        let id: LaneId = "recon".parse().unwrap();
        assert_eq!(id.as_str(), "recon");
        assert_eq!(id.to_string(), "recon");
    }

    #[test]
    fn lane_id_trims_input() {
        let id: LaneId = "  exploit ".parse().unwrap();
        assert_eq!(id.as_str(), "exploit");
    }

    #[test]
    fn lane_id_rejects_invalid_format() {
        assert!("".parse::<LaneId>().is_err());
        assert!("Recon".parse::<LaneId>().is_err()); // uppercase
        assert!("two words".parse::<LaneId>().is_err());
        assert!("a".repeat(33).parse::<LaneId>().is_err());
        assert!("post-exploit_2".parse::<LaneId>().is_ok());
    }

    #[test]
    fn card_id_rejects_invalid_format() {
        assert!("".parse::<CardId>().is_err());
        assert!("   ".parse::<CardId>().is_err());
        assert!("task 1".parse::<CardId>().is_err());
        assert!("task1".parse::<CardId>().is_ok());
    }

    #[test]
    fn serde_rejects_invalid_lane_id() {
        let parsed: Result<LaneId, _> = serde_json::from_str("\"Bad Lane\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn serde_roundtrip_card_id() {
        let original: CardId = "task7".parse().unwrap();
        let json = serde_json::to_string(&original).unwrap();
        assert_eq!(json, "\"task7\"");
        let parsed: CardId = serde_json::from_str(&json).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn generator_skips_existing_ids() {
        let existing: Vec<CardId> = ["task1", "task4", "custom", "task-x"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();

        let mut gen = CardIdGenerator::after(&existing);
        assert_eq!(gen.next_id().unwrap().as_str(), "task5");
        assert_eq!(gen.next_id().unwrap().as_str(), "task6");
    }

    #[test]
    fn generator_on_empty_board_starts_at_one() {
        let mut gen = CardIdGenerator::after(std::iter::empty());
        assert_eq!(gen.next_id().unwrap().as_str(), "task1");
    }

    #[test]
    fn generator_never_repeats() {
        let mut gen = CardIdGenerator::default();
        let ids: HashSet<_> = (0..1000).map(|_| gen.next_id().unwrap()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn generator_stops_at_the_last_sequence_number() {
        let mut gen = CardIdGenerator::starting_at(u64::MAX);
        assert_eq!(gen.next_id().unwrap().as_str(), "task18446744073709551615");
        assert!(gen.is_exhausted());
        assert_eq!(gen.next_id(), None);
        assert_eq!(gen.next_id(), None);
    }

    #[test]
    fn generator_after_highest_id_is_exhausted() {
        let existing: Vec<CardId> = vec!["task18446744073709551615".parse().unwrap()];
        let mut gen = CardIdGenerator::after(&existing);
        assert!(gen.is_exhausted());
        assert_eq!(gen.next_id(), None);
    }
}
