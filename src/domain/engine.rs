//! The board engine: current state plus its timers
//!
//! [`BoardEngine`] holds the current [`Board`] value, the completion counters,
//! the event log and the scheduler that drives the heartbeat and the
//! celebration auto-off. Callers feed it commands and call [`BoardEngine::tick`]
//! regularly. Timer firings are dispatched to plain handler functions that
//! take the engine as an argument.

use chrono::{DateTime, Duration, Utc};

use super::board::{Board, BoardError};
use super::clock::Clock;
use super::drag::{self, DragOutcome};
use super::event_log::{EventLog, Heartbeat};
use super::id::CardIdGenerator;
use super::lifecycle::CompletionCounters;
use super::scheduler::{Fired, Scheduler, TimerToken};

/// Timer intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub heartbeat_every: Duration,
    pub celebration_for: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            heartbeat_every: Duration::seconds(5),
            celebration_for: Duration::seconds(5),
        }
    }
}

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    Heartbeat,
    EndCelebration,
}

pub struct BoardEngine {
    pub(super) board: Board,
    pub(super) completed: CompletionCounters,
    pub(super) log: EventLog,
    pub(super) ids: CardIdGenerator,
    settings: EngineSettings,
    heartbeat: Heartbeat,
    scheduler: Scheduler<TimerTask>,
    heartbeat_timer: Option<TimerToken>,
    /// Pending auto-off while the celebration is showing
    celebration: Option<TimerToken>,
    clock: Box<dyn Clock>,
    shut_down: bool,
}

impl BoardEngine {
    /// Creates an engine and starts the heartbeat timer
    pub fn new(
        board: Board,
        settings: EngineSettings,
        heartbeat: Heartbeat,
        clock: Box<dyn Clock>,
    ) -> Self {
        let completed = CompletionCounters::for_lanes(board.lane_ids());
        let ids = CardIdGenerator::after(board.card_ids());
        let mut scheduler = Scheduler::new();
        let heartbeat_timer = Some(scheduler.schedule_repeating(
            clock.now(),
            settings.heartbeat_every,
            TimerTask::Heartbeat,
        ));

        Self {
            board,
            completed,
            log: EventLog::new(),
            ids,
            settings,
            heartbeat,
            scheduler,
            heartbeat_timer,
            celebration: None,
            clock,
            shut_down: false,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn counters(&self) -> &CompletionCounters {
        &self.completed
    }

    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn celebration_active(&self) -> bool {
        self.celebration.is_some()
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Applies a finished drag gesture. Returns whether the board changed.
    pub fn drag(&mut self, outcome: &DragOutcome) -> Result<bool, BoardError> {
        match drag::apply(&self.board, outcome)? {
            Some(next) => {
                self.board = next;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Fires every timer that is due now. Returns the number of firings.
    pub fn tick(&mut self) -> usize {
        if self.shut_down {
            return 0;
        }
        let fired = self.scheduler.due(self.clock.now());
        let count = fired.len();
        for firing in fired {
            on_timer(self, firing);
        }
        count
    }

    /// Shows the celebration and (re)starts its auto-off window
    pub(super) fn celebrate(&mut self) {
        if self.shut_down {
            return;
        }
        if let Some(pending) = self.celebration.take() {
            self.scheduler.cancel(pending);
        }
        let token = self.scheduler.schedule_once(
            self.clock.now(),
            self.settings.celebration_for,
            TimerTask::EndCelebration,
        );
        self.celebration = Some(token);
    }

    /// Cancels every outstanding timer. Later ticks fire nothing.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.scheduler.cancel_all();
        self.heartbeat_timer = None;
        self.celebration = None;
        self.shut_down = true;
    }
}

impl Drop for BoardEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn on_timer(engine: &mut BoardEngine, fired: Fired<TimerTask>) {
    match fired.task {
        TimerTask::Heartbeat => on_heartbeat(engine, fired.token),
        TimerTask::EndCelebration => on_celebration_end(engine, fired.token),
    }
}

/// Stamped with the current time, so a late tick keeps the log in order
fn on_heartbeat(engine: &mut BoardEngine, token: TimerToken) {
    if engine.heartbeat_timer != Some(token) {
        return;
    }
    let now = engine.now();
    engine.heartbeat.beat(&mut engine.log, now);
}

fn on_celebration_end(engine: &mut BoardEngine, token: TimerToken) {
    if engine.celebration == Some(token) {
        engine.celebration = None;
    }
}
