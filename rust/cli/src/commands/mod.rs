//! Command handler modules for the tablelog CLI.
//!
//! Each command lives in its own file with the same shape:
//!
//! - Public handler function: `pub fn handle_COMMAND_command(...) -> Result<(), CliError>`
//! - Output streams (`&mut dyn Write`) passed in, so tests can capture them
//! - Errors propagated via `CliError`; [`crate::run`] prints them and maps
//!   them to exit code 2

mod cfg;
mod record;
mod replay;
mod verify;

pub use cfg::handle_cfg_command;
pub use record::handle_record_command;
pub use replay::handle_replay_command;
pub use verify::handle_verify_command;
