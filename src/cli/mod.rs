//! # Command-Line Interface
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `redboard` / `redboard tui` | Interactive board |
//! | `redboard show` | Print the initial board and lane stats |
//! | `redboard run <script>` | Replay a command script headlessly |
//!
//! ## Output Formats
//!
//! `show` and `run` support `--format`:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output on stderr:
//! ```bash
//! redboard --verbose run demo.txt
//! ```
//!
//! Inside the TUI, verbose notes go to the status bar instead.
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod report;
mod script;
mod tui;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
pub use report::{BoardReport, LaneReport};
pub use script::{ScriptCommand, ScriptError};
