// Library crate: editor core (history, drag sync, snapping) plus the headless
// harness and JSON command interface used by tests and the CLI driver.

pub mod command;
pub mod fixtures;
pub mod harness;
pub mod state;
pub mod viewport;
