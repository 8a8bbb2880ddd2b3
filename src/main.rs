//! redboard - terminal kanban board for red-team operations

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = redboard::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
