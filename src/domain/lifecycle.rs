//! Task lifecycle: adding and completing cards
//!
//! Both workflows keep the bookkeeping in step with the board. A real add or
//! completion appends exactly one log entry, and every completion bumps its
//! lane's counter by exactly one.

use std::collections::BTreeMap;

use serde::Serialize;

use super::board::{BoardError, Card};
use super::engine::BoardEngine;
use super::id::{CardId, LaneId};

/// Cards ever completed per lane. Values only go up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionCounters(BTreeMap<LaneId, u64>);

impl CompletionCounters {
    pub fn for_lanes<'a>(lanes: impl IntoIterator<Item = &'a LaneId>) -> Self {
        Self(lanes.into_iter().map(|id| (id.clone(), 0)).collect())
    }

    pub fn get(&self, lane: &LaneId) -> u64 {
        self.0.get(lane).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    fn increment(&mut self, lane: &LaneId) {
        *self.0.entry(lane.clone()).or_insert(0) += 1;
    }
}

/// Per-lane read model, computed on demand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LaneStats {
    pub total: usize,
    pub completed: u64,
}

impl BoardEngine {
    /// Adds a card with the trimmed text to the end of a lane.
    ///
    /// Blank text is ignored: `Ok(None)`, nothing changes.
    pub fn add_task(&mut self, lane: &LaneId, raw_text: &str) -> Result<Option<Card>, BoardError> {
        let title = self.board.lane(lane)?.title.clone();
        let content = raw_text.trim();
        if content.is_empty() {
            return Ok(None);
        }

        let id = self.ids.next_id().ok_or(BoardError::IdsExhausted)?;
        let card = Card::new(id, content)?;
        self.board = self.board.add_card(lane, card.clone())?;
        let now = self.now();
        self.log
            .append(format!("New task added to {}: {}", title, card.content), now);
        Ok(Some(card))
    }

    /// Completes a card: removes it, bumps the lane counter, logs it and
    /// starts the celebration.
    ///
    /// A card that is not in `lane` yields [`BoardError::CardNotFound`] and
    /// leaves everything untouched.
    pub fn mark_done(&mut self, lane: &LaneId, card_id: &CardId) -> Result<Card, BoardError> {
        let title = self.board.lane(lane)?.title.clone();
        let card = self
            .board
            .find_in_lane(lane, card_id)?
            .cloned()
            .ok_or_else(|| BoardError::CardNotFound {
                lane: lane.clone(),
                card: card_id.clone(),
            })?;

        self.board = self.board.remove_card(lane, card_id)?;
        self.completed.increment(lane);
        let now = self.now();
        self.log
            .append(format!("Task completed in {}: {}", title, card.content), now);
        self.celebrate();
        Ok(card)
    }

    pub fn lane_stats(&self, lane: &LaneId) -> Result<LaneStats, BoardError> {
        Ok(LaneStats {
            total: self.board.lane(lane)?.len(),
            completed: self.completed.get(lane),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::tests::{lane_id, sample_board};
    use crate::domain::clock::ManualClock;
    use crate::domain::drag::{DragOutcome, Slot};
    use crate::domain::engine::EngineSettings;
    use crate::domain::event_log::Heartbeat;
    use chrono::{Duration, Utc};
    use proptest::prelude::*;

    fn engine() -> (BoardEngine, ManualClock) {
        let clock = ManualClock::new(Utc::now());
        let engine = BoardEngine::new(
            sample_board(),
            EngineSettings::default(),
            Heartbeat::new(Vec::new(), Some(9)),
            Box::new(clock.clone()),
        );
        (engine, clock)
    }

    fn recon() -> LaneId {
        lane_id("recon")
    }

    fn card_ids(engine: &BoardEngine, lane: &LaneId) -> Vec<String> {
        engine
            .board()
            .lane(lane)
            .unwrap()
            .cards
            .iter()
            .map(|c| c.id.to_string())
            .collect()
    }

    #[test]
    fn add_task_trims_and_logs() {
        let (mut engine, _) = engine();
        let card = engine.add_task(&recon(), "  Scan ports  ").unwrap().unwrap();

        assert_eq!(card.content, "Scan ports");
        let lane = engine.board().lane(&recon()).unwrap();
        assert_eq!(lane.cards.last(), Some(&card));
        assert_eq!(lane.len(), 3);
        assert_eq!(engine.log().len(), 1);
        assert_eq!(
            engine.log().entries()[0].message,
            "New task added to Reconnaissance: Scan ports"
        );
    }

    #[test]
    fn add_task_ids_do_not_collide() {
        let (mut engine, _) = engine();
        let a = engine.add_task(&recon(), "one").unwrap().unwrap();
        let b = engine.add_task(&recon(), "two").unwrap().unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(a.id.as_str(), "task4"); // seeds go up to task3
    }

    #[test]
    fn blank_add_is_noop() {
        let (mut engine, _) = engine();
        let board = engine.board().clone();

        assert_eq!(engine.add_task(&recon(), "   "), Ok(None));
        assert_eq!(engine.add_task(&recon(), ""), Ok(None));
        assert_eq!(engine.board(), &board);
        assert!(engine.log().is_empty());
        assert_eq!(engine.counters().total(), 0);
    }

    #[test]
    fn add_to_unknown_lane_fails() {
        let (mut engine, _) = engine();
        assert_eq!(
            engine.add_task(&lane_id("ghost"), "x"),
            Err(BoardError::UnknownLane(lane_id("ghost")))
        );
    }

    #[test]
    fn add_task_after_highest_id_fails_cleanly() {
        use crate::domain::board::tests::card;
        use crate::domain::board::{Board, Lane};

        let board = Board::new(vec![Lane::new(
            recon(),
            "Reconnaissance",
            vec![card("task18446744073709551615", "Last one")],
        )])
        .unwrap();
        let clock = ManualClock::new(Utc::now());
        let mut engine = BoardEngine::new(
            board.clone(),
            EngineSettings::default(),
            Heartbeat::new(Vec::new(), Some(9)),
            Box::new(clock),
        );

        assert_eq!(engine.add_task(&recon(), "hello"), Err(BoardError::IdsExhausted));
        assert_eq!(engine.add_task(&recon(), "again"), Err(BoardError::IdsExhausted));
        assert_eq!(engine.board(), &board);
        assert!(engine.log().is_empty());
    }

    #[test]
    fn mark_done_removes_counts_and_logs() {
        let (mut engine, _) = engine();
        let done = engine.mark_done(&recon(), &"task1".parse().unwrap()).unwrap();

        assert_eq!(done.content, "Scan target network");
        assert_eq!(card_ids(&engine, &recon()), vec!["task2"]);
        assert_eq!(engine.counters().get(&recon()), 1);
        assert_eq!(
            engine.log().entries()[0].message,
            "Task completed in Reconnaissance: Scan target network"
        );
        assert!(engine.celebration_active());
    }

    #[test]
    fn mark_done_unknown_card_reports_not_found() {
        let (mut engine, _) = engine();
        let board = engine.board().clone();

        // task3 exists, but in another lane
        let result = engine.mark_done(&recon(), &"task3".parse().unwrap());
        assert_eq!(
            result,
            Err(BoardError::CardNotFound {
                lane: recon(),
                card: "task3".parse().unwrap(),
            })
        );
        assert_eq!(engine.board(), &board);
        assert_eq!(engine.counters().get(&recon()), 0);
        assert!(engine.log().is_empty());
        assert!(!engine.celebration_active());
    }

    #[test]
    fn celebration_clears_after_five_seconds() {
        let (mut engine, clock) = engine();
        engine.mark_done(&recon(), &"task1".parse().unwrap()).unwrap();

        clock.advance(Duration::seconds(5));
        engine.tick();
        assert!(!engine.celebration_active());
    }

    #[test]
    fn lane_stats_reflect_board_and_counters() {
        let (mut engine, _) = engine();
        engine.add_task(&recon(), "Scan ports").unwrap();
        engine.mark_done(&recon(), &"task1".parse().unwrap()).unwrap();

        assert_eq!(
            engine.lane_stats(&recon()),
            Ok(LaneStats {
                total: 2,
                completed: 1
            })
        );
        assert_eq!(
            engine.lane_stats(&lane_id("exfil")),
            Ok(LaneStats {
                total: 0,
                completed: 0
            })
        );
    }

    #[test]
    fn counters_outlive_moved_cards() {
        let (mut engine, _) = engine();
        engine.mark_done(&recon(), &"task1".parse().unwrap()).unwrap();
        engine
            .drag(&DragOutcome::dropped(
                Slot::new(recon(), 0),
                Slot::new(lane_id("exploit"), 0),
            ))
            .unwrap();

        assert_eq!(engine.lane_stats(&recon()).unwrap().total, 0);
        assert_eq!(engine.counters().get(&recon()), 1);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(usize, String),
        Done(usize, usize),
        Drag(usize, usize, usize, usize),
        Wait(i64, bool),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..3, "[ a-z]{0,6}").prop_map(|(l, t)| Op::Add(l, t)),
            (0usize..3, 0usize..4).prop_map(|(l, i)| Op::Done(l, i)),
            (0usize..3, 0usize..4, 0usize..3, 0usize..4).prop_map(|(a, b, c, d)| Op::Drag(a, b, c, d)),
            (0i64..12, any::<bool>()).prop_map(|(secs, tick)| Op::Wait(secs, tick)),
        ]
    }

    proptest! {
        #[test]
        fn bookkeeping_invariants_hold(ops in proptest::collection::vec(op(), 1..40)) {
            let (mut engine, clock) = engine();
            let lanes: Vec<LaneId> = engine.board().lane_ids().cloned().collect();
            let mut elapsed = 0i64;
            let mut beats_fired = 0i64;

            for op in ops {
                let total_before = engine.board().total_cards();
                let log_before = engine.log().len();
                let counters_before: Vec<u64> = lanes.iter().map(|l| engine.counters().get(l)).collect();

                let (expected_total, expected_log) = match op {
                    Op::Add(l, text) => {
                        let added = engine.add_task(&lanes[l], &text).unwrap().is_some();
                        prop_assert_eq!(added, !text.trim().is_empty());
                        let delta = usize::from(added);
                        (total_before + delta, log_before + delta)
                    }
                    Op::Done(l, i) => {
                        let target = engine.board().lanes()[l].cards.get(i).map(|c| c.id.clone());
                        match target {
                            Some(id) => {
                                engine.mark_done(&lanes[l], &id).unwrap();
                                prop_assert_eq!(engine.counters().get(&lanes[l]), counters_before[l] + 1);
                                (total_before - 1, log_before + 1)
                            }
                            None => (total_before, log_before),
                        }
                    }
                    Op::Drag(sl, si, dl, di) => {
                        let outcome = DragOutcome::dropped(Slot::new(lanes[sl].clone(), si), Slot::new(lanes[dl].clone(), di));
                        // out-of-range coordinates are rejected without touching state
                        let _ = engine.drag(&outcome);
                        (total_before, log_before)
                    }
                    Op::Wait(secs, tick) => {
                        // without a tick, due heartbeats wait for a later one
                        elapsed += secs;
                        clock.advance(Duration::seconds(secs));
                        if tick {
                            engine.tick();
                            let beats = (elapsed / 5 - beats_fired) as usize;
                            beats_fired = elapsed / 5;
                            (total_before, log_before + beats)
                        } else {
                            (total_before, log_before)
                        }
                    }
                };

                prop_assert_eq!(engine.board().total_cards(), expected_total);
                prop_assert_eq!(engine.log().len(), expected_log);
                let stamps: Vec<_> = engine.log().entries().iter().map(|e| e.timestamp).collect();
                prop_assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
                for (l, before) in lanes.iter().zip(counters_before) {
                    prop_assert!(engine.counters().get(l) >= before);
                }
                let mut ids: Vec<_> = engine.board().card_ids().cloned().collect();
                let count = ids.len();
                ids.sort();
                ids.dedup();
                prop_assert_eq!(ids.len(), count);
            }
        }
    }
}
