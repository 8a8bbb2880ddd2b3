//! Domain models for redboard
//!
//! The board state engine, with no terminal or file I/O.

mod id;
mod board;
mod drag;
mod clock;
mod scheduler;
mod event_log;
mod engine;
mod lifecycle;

pub use id::{CardId, CardIdGenerator, IdError, LaneId};
pub use board::{Board, BoardError, Card, Lane};
pub use drag::{apply as apply_drag, drop_slots, DragOutcome, Slot};
pub use clock::{Clock, ManualClock, SystemClock};
pub use scheduler::{Fired, Scheduler, TimerToken};
pub use event_log::{EventLog, Heartbeat, LogEntry, DEFAULT_HEARTBEAT_MESSAGES};
pub use engine::{BoardEngine, EngineSettings, TimerTask};
pub use lifecycle::{CompletionCounters, LaneStats};
