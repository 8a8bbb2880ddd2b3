//! Views rendered by the TUI

pub mod board;
