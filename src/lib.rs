//! redboard - a terminal kanban board for red-team operations
//!
//! A fixed set of lanes holds ordered cards. Cards can be reordered, dragged
//! between lanes, added and completed, and a side log records what happened.
//! The state engine in [`domain`] is independent of the terminal UI in
//! [`cli`].

pub mod domain;
pub mod config;
pub mod cli;

pub use domain::{Board, BoardEngine, Card, CardId, DragOutcome, Lane, LaneId, Slot};
