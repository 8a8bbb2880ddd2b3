//! Drag outcomes and how they become board transitions

use serde::Serialize;

use super::board::{Board, BoardError};
use super::id::LaneId;

/// A slot on the board: a lane and an index within it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub lane: LaneId,
    pub index: usize,
}

impl Slot {
    pub fn new(lane: LaneId, index: usize) -> Self {
        Self { lane, index }
    }
}

/// Result of a finished drag gesture
///
/// A missing destination means the card was dropped outside any lane, which
/// cancels the gesture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DragOutcome {
    pub source: Slot,
    pub destination: Option<Slot>,
}

impl DragOutcome {
    pub fn dropped(source: Slot, destination: Slot) -> Self {
        Self {
            source,
            destination: Some(destination),
        }
    }

    pub fn cancelled(source: Slot) -> Self {
        Self {
            source,
            destination: None,
        }
    }
}

/// Applies a drag outcome to a board.
///
/// Returns `Ok(None)` for a cancelled gesture. Same-lane drops reorder with
/// the destination index read after removal; cross-lane drops index the
/// destination lane as it was before the move.
pub fn apply(board: &Board, outcome: &DragOutcome) -> Result<Option<Board>, BoardError> {
    let Some(dest) = &outcome.destination else {
        return Ok(None);
    };
    let source = &outcome.source;

    let next = if source.lane == dest.lane {
        board.reorder_within_lane(&source.lane, source.index, dest.index)?
    } else {
        board.move_between_lanes(&source.lane, source.index, &dest.lane, dest.index)?
    };
    Ok(Some(next))
}

/// Number of valid drop indices in `target` for a card picked up from `source`.
///
/// Dropping back into the source lane offers `len` slots (the card is out of
/// the list while it is held); any other lane offers `len + 1`.
pub fn drop_slots(board: &Board, source: &LaneId, target: &LaneId) -> Result<usize, BoardError> {
    let len = board.lane(target)?.len();
    if source == target {
        Ok(len)
    } else {
        Ok(len + 1)
    }
}
