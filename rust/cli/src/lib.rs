//! # Tablelog CLI Library
//!
//! Command-line front end for the tablelog hand recorder. Hands are entered
//! as plain text scripts, driven through the engine's state machine and
//! stored as JSONL histories that can be replayed and verified later.
//!
//! ## Main Entry Point
//!
//! The primary entry point is the [`run`] function, which parses command-line arguments
//! and executes the appropriate subcommand.
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::io;
//! let args = vec!["tablelog", "record", "--script", "tonight.hand", "--output", "data/tonight.jsonl"];
//! let code = tablelog_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```
//!
//! ## Available Subcommands
//!
//! - `record`: Run a hand script and store the finished hands
//! - `replay`: Print recorded hands street by street
//! - `verify`: Re-check pots, payouts and stacks of a hand history
//! - `cfg`: Display current configuration settings

use clap::Parser;
use std::io::Write;

#[macro_use]
mod macros;
pub mod cli;
pub mod commands;
mod config;
mod error;
pub mod exit_code;
pub mod formatters;
pub mod io_utils;
pub mod logging;
pub mod ui;
pub mod validation;

use cli::{Commands, TablelogCli};
use commands::{
    handle_cfg_command, handle_record_command, handle_replay_command, handle_verify_command,
};

pub use error::{BatchValidationError, CliError};

/// Main entry point for the CLI application.
///
/// # Arguments
///
/// * `args` - Iterator over command-line arguments (typically `std::env::args()`)
/// * `out` - Output stream for normal output (typically `stdout`)
/// * `err` - Output stream for error messages (typically `stderr`)
///
/// # Returns
///
/// Exit code: `0` for success, `2` for errors
///
/// # Example
///
/// ```
/// use std::io;
/// let code = tablelog_cli::run(vec!["tablelog", "--help"], &mut io::sink(), &mut io::sink());
/// assert_eq!(code, 0);
/// ```
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    const COMMANDS: &[&str] = &["record", "replay", "verify", "cfg"];
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match TablelogCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;

            // Help and version print to stdout and exit 0
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                write_or_exit!(out, "{}", e);
                return exit_code::SUCCESS;
            }
            write_or_exit!(err, "{}", e);
            write_or_exit!(err, "Tablelog hand recorder");
            write_or_exit!(err, "Usage: tablelog <command> [options]\n");
            write_or_exit!(err, "Commands:");
            for c in COMMANDS {
                write_or_exit!(err, "  {}", c);
            }
            write_or_exit!(err, "\nFor full help, run: tablelog --help");
            return exit_code::ERROR;
        }
    };

    let result = match cli.cmd {
        Commands::Cfg => handle_cfg_command(out),
        Commands::Record { script, output } => handle_record_command(script, output, out, err),
        Commands::Replay { input } => handle_replay_command(input, out, err),
        Commands::Verify { input } => handle_verify_command(input, out, err),
    };

    if let Err(e) = &result {
        let _ = ui::write_error(err, &e.to_string());
    }
    exit_code::for_result(&result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_record_with_optional_output() {
        let cli = TablelogCli::try_parse_from(["tablelog", "record", "--script", "a.hand"]).unwrap();
        match cli.cmd {
            Commands::Record { script, output } => {
                assert_eq!(script, "a.hand");
                assert_eq!(output, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_replay_requires_input() {
        assert!(TablelogCli::try_parse_from(["tablelog", "replay"]).is_err());
    }

    #[test]
    fn test_unknown_command_lists_commands() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = run(["tablelog", "deal"], &mut out, &mut err);
        assert_eq!(code, exit_code::ERROR);
        let stderr = String::from_utf8(err).unwrap();
        assert!(stderr.contains("Commands:"));
        assert!(stderr.contains("  verify"));
        assert!(out.is_empty());
    }

    #[test]
    fn test_help_goes_to_stdout() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        assert_eq!(run(["tablelog", "--help"], &mut out, &mut err), 0);
        let stdout = String::from_utf8(out).unwrap();
        assert!(stdout.contains("record"));
        assert!(err.is_empty());
    }

    #[test]
    fn test_missing_script_is_an_error() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = run(
            ["tablelog", "record", "--script", "no/such/file.hand"],
            &mut out,
            &mut err,
        );
        assert_eq!(code, exit_code::ERROR);
        let stderr = String::from_utf8(err).unwrap();
        assert!(stderr.starts_with("Error: Invalid input: Failed to read no/such/file.hand"));
    }
}
