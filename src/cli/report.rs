//! Board snapshot printing shared by `show` and `run`

use serde::Serialize;

use super::output::Output;
use crate::domain::{BoardEngine, BoardError, Card, LaneStats, LogEntry};

#[derive(Debug, Serialize)]
pub struct LaneReport<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub cards: &'a [Card],
    pub stats: LaneStats,
}

#[derive(Debug, Serialize)]
pub struct BoardReport<'a> {
    pub revision: u64,
    pub lanes: Vec<LaneReport<'a>>,
    pub celebration_active: bool,
    pub log: &'a [LogEntry],
}

impl<'a> BoardReport<'a> {
    pub fn from_engine(engine: &'a BoardEngine) -> Result<Self, BoardError> {
        let lanes = engine
            .board()
            .lanes()
            .iter()
            .map(|lane| {
                Ok(LaneReport {
                    id: lane.id.as_str(),
                    title: &lane.title,
                    cards: &lane.cards,
                    stats: engine.lane_stats(&lane.id)?,
                })
            })
            .collect::<Result<Vec<_>, BoardError>>()?;

        Ok(Self {
            revision: engine.board().revision(),
            lanes,
            celebration_active: engine.celebration_active(),
            log: engine.log().entries(),
        })
    }

    pub fn print(&self, output: &Output, include_log: bool) {
        if output.is_json() {
            output.data(self);
            return;
        }

        for lane in &self.lanes {
            output.line(&format!(
                "{} [{}] ({} open, {} done)",
                lane.title, lane.id, lane.stats.total, lane.stats.completed
            ));
            if lane.cards.is_empty() {
                output.line("  (empty)");
            }
            for card in lane.cards {
                output.line(&format!("  {}\t{}", card.id, card.content));
            }
        }

        if include_log {
            output.blank();
            output.line("Log:");
            for entry in self.log {
                output.line(&format!("  {}  {}", entry.timestamp_iso(), entry.message));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::domain::ManualClock;
    use chrono::Utc;

    #[test]
    fn report_carries_lane_stats() {
        let config = Config::default();
        let mut engine = BoardEngine::new(
            config.build_board().unwrap(),
            config.engine_settings(),
            config.heartbeat(),
            Box::new(ManualClock::new(Utc::now())),
        );
        let recon = "recon".parse().unwrap();
        engine.mark_done(&recon, &"task1".parse().unwrap()).unwrap();

        let report = BoardReport::from_engine(&engine).unwrap();
        assert_eq!(report.lanes.len(), 4);
        assert_eq!(report.lanes[0].id, "recon");
        assert_eq!(report.lanes[0].stats, engine.lane_stats(&recon).unwrap());
        assert_eq!(report.lanes[0].stats, LaneStats { total: 1, completed: 1 });
        assert!(report.celebration_active);
        assert_eq!(report.log.len(), 1);
    }
}
