//! Board state: lanes holding ordered cards
//!
//! Every transition is pure. It borrows the current board and returns a new
//! one, leaving the original untouched. Successful transitions bump
//! [`Board::revision`] so a presentation layer can tell "same value" from
//! "new value" without diffing lanes.

use serde::Serialize;
use thiserror::Error;

use super::id::{CardId, LaneId};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum BoardError {
    #[error("Unknown lane: {0}")]
    UnknownLane(LaneId),

    #[error("Duplicate lane: {0}")]
    DuplicateLane(LaneId),

    #[error("Board must have at least one lane")]
    NoLanes,

    #[error("Index {index} out of range for lane {lane} (valid: 0..{limit})")]
    IndexOutOfRange {
        lane: LaneId,
        index: usize,
        limit: usize,
    },

    #[error("Cannot move a card from lane {0} into itself; reorder it instead")]
    SameLane(LaneId),

    #[error("Card {0} already exists on the board")]
    DuplicateCard(CardId),

    #[error("Card {card} not found in lane {lane}")]
    CardNotFound { lane: LaneId, card: CardId },

    #[error("Card content must not be empty")]
    EmptyContent,

    #[error("No card ids left to assign")]
    IdsExhausted,
}

/// A unit of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub id: CardId,
    pub content: String,
}

impl Card {
    /// Creates a card, trimming the content
    pub fn new(id: CardId, content: &str) -> Result<Self, BoardError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(BoardError::EmptyContent);
        }
        Ok(Self {
            id,
            content: content.to_string(),
        })
    }
}

/// A named column of cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lane {
    pub id: LaneId,
    pub title: String,
    pub cards: Vec<Card>,
}

impl Lane {
    pub fn new(id: LaneId, title: impl Into<String>, cards: Vec<Card>) -> Self {
        Self {
            id,
            title: title.into(),
            cards,
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn position(&self, card: &CardId) -> Option<usize> {
        self.cards.iter().position(|c| &c.id == card)
    }
}

/// The whole board; lane order is display order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    lanes: Vec<Lane>,
    revision: u64,
}

impl Board {
    /// Builds a board, checking that lane ids and card ids are unique
    pub fn new(lanes: Vec<Lane>) -> Result<Self, BoardError> {
        if lanes.is_empty() {
            return Err(BoardError::NoLanes);
        }

        let mut lane_ids = std::collections::HashSet::new();
        let mut card_ids = std::collections::HashSet::new();
        for lane in &lanes {
            if !lane_ids.insert(&lane.id) {
                return Err(BoardError::DuplicateLane(lane.id.clone()));
            }
            for card in &lane.cards {
                if card.content.trim().is_empty() {
                    return Err(BoardError::EmptyContent);
                }
                if !card_ids.insert(&card.id) {
                    return Err(BoardError::DuplicateCard(card.id.clone()));
                }
            }
        }

        Ok(Self { lanes, revision: 0 })
    }

    /// Number of successful transitions that produced this value
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn lane_ids(&self) -> impl Iterator<Item = &LaneId> {
        self.lanes.iter().map(|l| &l.id)
    }

    pub fn lane(&self, id: &LaneId) -> Result<&Lane, BoardError> {
        self.lane_index(id).map(|idx| &self.lanes[idx])
    }

    /// Position of a lane in display order
    pub fn lane_index(&self, id: &LaneId) -> Result<usize, BoardError> {
        self.lanes
            .iter()
            .position(|l| &l.id == id)
            .ok_or_else(|| BoardError::UnknownLane(id.clone()))
    }

    pub fn total_cards(&self) -> usize {
        self.lanes.iter().map(Lane::len).sum()
    }

    pub fn card_ids(&self) -> impl Iterator<Item = &CardId> {
        self.lanes.iter().flat_map(|l| l.cards.iter().map(|c| &c.id))
    }

    pub fn contains_card(&self, card: &CardId) -> bool {
        self.card_ids().any(|id| id == card)
    }

    /// Looks up a card in one lane
    pub fn find_in_lane(&self, lane: &LaneId, card: &CardId) -> Result<Option<&Card>, BoardError> {
        Ok(self.lane(lane)?.cards.iter().find(|c| &c.id == card))
    }

    /// Moves a card within one lane with splice semantics: the card is removed
    /// first, then inserted at `to` in the shortened sequence.
    pub fn reorder_within_lane(
        &self,
        lane: &LaneId,
        from: usize,
        to: usize,
    ) -> Result<Board, BoardError> {
        let idx = self.lane_index(lane)?;
        let len = self.lanes[idx].len();
        check_index(lane, from, len)?;
        check_index(lane, to, len)?;

        let mut next = self.clone();
        let cards = &mut next.lanes[idx].cards;
        let card = cards.remove(from);
        cards.insert(to, card);
        next.revision += 1;
        Ok(next)
    }

    /// Moves a card to another lane; `to` indexes the destination as it was
    /// before the move.
    pub fn move_between_lanes(
        &self,
        source: &LaneId,
        from: usize,
        dest: &LaneId,
        to: usize,
    ) -> Result<Board, BoardError> {
        if source == dest {
            return Err(BoardError::SameLane(source.clone()));
        }
        let src_idx = self.lane_index(source)?;
        let dest_idx = self.lane_index(dest)?;
        check_index(source, from, self.lanes[src_idx].len())?;
        check_index(dest, to, self.lanes[dest_idx].len() + 1)?;

        let mut next = self.clone();
        let card = next.lanes[src_idx].cards.remove(from);
        next.lanes[dest_idx].cards.insert(to, card);
        next.revision += 1;
        Ok(next)
    }

    /// Appends a card to the end of a lane
    pub fn add_card(&self, lane: &LaneId, card: Card) -> Result<Board, BoardError> {
        let idx = self.lane_index(lane)?;
        if self.contains_card(&card.id) {
            return Err(BoardError::DuplicateCard(card.id));
        }

        let mut next = self.clone();
        next.lanes[idx].cards.push(card);
        next.revision += 1;
        Ok(next)
    }

    /// Removes a card from a lane. An absent card leaves the board unchanged,
    /// revision included.
    pub fn remove_card(&self, lane: &LaneId, card: &CardId) -> Result<Board, BoardError> {
        let idx = self.lane_index(lane)?;
        let Some(pos) = self.lanes[idx].position(card) else {
            return Ok(self.clone());
        };

        let mut next = self.clone();
        next.lanes[idx].cards.remove(pos);
        next.revision += 1;
        Ok(next)
    }
}

fn check_index(lane: &LaneId, index: usize, limit: usize) -> Result<(), BoardError> {
    if index < limit {
        Ok(())
    } else {
        Err(BoardError::IndexOutOfRange {
            lane: lane.clone(),
            index,
            limit,
        })
    }
}
