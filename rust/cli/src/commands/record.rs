//! Record command handler.
//!
//! Runs a hand script (see [`crate::validation`]) through a
//! [`Session`] and writes every finished hand as one JSON line. Table
//! settings start from the resolved configuration; script header lines
//! override them.

use std::collections::BTreeMap;
use std::io::Write;

use tablelog_engine::betting::BettingAction;
use tablelog_engine::errors::HandError;
use tablelog_engine::hand::{CurrentHand, Resolution};
use tablelog_engine::logger::HandLogger;
use tablelog_engine::seats::{Position, TableSize};
use tablelog_engine::session::{Session, SessionConfig};
use tracing::{debug, info};

use crate::config::{self, Config};
use crate::error::CliError;
use crate::io_utils::{numbered_lines, read_text_auto};
use crate::ui;
use crate::validation::{ScriptLine, parse_script_line};

/// Handle the record command.
///
/// # Arguments
///
/// * `script` - Path to the hand script (`.zst` accepted)
/// * `output` - JSONL destination, written only when the script succeeds;
///   hands go to `out` when `None`
/// * `out` - Output stream for hands or the summary line
/// * `err` - Error stream for warnings and the summary when hands go to `out`
pub fn handle_record_command(
    script: String,
    output: Option<String>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let resolved = config::load_with_sources()
        .map_err(|e| CliError::Config(format!("Invalid configuration: {}", e)))?;
    let content = read_text_auto(&script)?;

    match output {
        Some(path) => {
            // an existing history is replaced only after the whole script ran
            let mut logger = HandLogger::from_writer(Vec::new());
            let recorded = record_script(&content, &resolved.config, &mut logger, err)?;
            let mut file = HandLogger::create(&path)?.into_inner();
            file.write_all(&logger.into_inner())?;
            file.flush()?;
            writeln!(out, "Recorded {} hand(s) to {}", recorded, path)?;
        }
        None => {
            let mut logger = HandLogger::from_writer(&mut *out);
            let recorded = record_script(&content, &resolved.config, &mut logger, err)?;
            writeln!(err, "Recorded {} hand(s)", recorded)?;
        }
    }
    Ok(())
}

/// Table settings collected from the configuration and script header.
#[derive(Debug, Clone)]
struct TableSetup {
    table_size: TableSize,
    small_blind: u32,
    big_blind: u32,
    stack: u32,
    seat_stacks: BTreeMap<Position, u32>,
    hero: Option<Position>,
}

impl TableSetup {
    fn from_config(config: &Config) -> Result<Self, CliError> {
        let invalid = |e: config::ConfigError| CliError::Config(e.to_string());
        Ok(Self {
            table_size: config.table().map_err(invalid)?,
            small_blind: config.small_blind,
            big_blind: config.big_blind,
            stack: config.starting_stack,
            seat_stacks: BTreeMap::new(),
            hero: config.hero_seat().map_err(invalid)?,
        })
    }

    fn apply(&mut self, line: &ScriptLine) {
        match line {
            ScriptLine::Seats(size) => self.table_size = *size,
            ScriptLine::Blinds { small, big } => {
                self.small_blind = *small;
                self.big_blind = *big;
            }
            ScriptLine::Stack { seat: None, chips } => self.stack = *chips,
            ScriptLine::Stack {
                seat: Some(seat),
                chips,
            } => {
                self.seat_stacks.insert(*seat, *chips);
            }
            ScriptLine::Hero(seat) => self.hero = Some(*seat),
            _ => {}
        }
    }

    fn session_config(&self) -> SessionConfig {
        let mut config = SessionConfig::new(self.table_size, self.small_blind, self.big_blind)
            .with_uniform_stacks(self.stack);
        for (seat, chips) in &self.seat_stacks {
            config = config.with_stack(*seat, *chips);
        }
        config.hero = self.hero;
        config
    }
}

fn record_script<W: Write>(
    content: &str,
    config: &Config,
    logger: &mut HandLogger<W>,
    err: &mut dyn Write,
) -> Result<usize, CliError> {
    let mut setup = TableSetup::from_config(config)?;
    let mut session: Option<Session> = None;
    let mut hand: Option<CurrentHand> = None;
    let mut recorded = 0usize;

    for (line_no, text) in numbered_lines(content, true) {
        debug!(line = line_no, instruction = text, "script line");
        let finished = step(text, &mut setup, &mut session, &mut hand)
            .map_err(|e| e.at_line(line_no))?;
        if finished && let (Some(table), Some(mut current)) = (session.as_mut(), hand.take()) {
            let stored = table
                .record(&mut current)
                .map_err(|e| CliError::from(e).at_line(line_no))?;
            logger.write(&stored)?;
            info!(hand_id = %stored.hand_id, pot = stored.result.pot_won, "hand recorded");
            recorded += 1;
        }
    }

    if let Some(open) = hand {
        ui::display_warning(
            err,
            &format!(
                "hand #{} is unfinished at end of script and was not recorded",
                open.hand_number()
            ),
        )?;
    }
    Ok(recorded)
}

/// Applies one script line; true once the hand in progress is finished.
fn step(
    text: &str,
    setup: &mut TableSetup,
    session: &mut Option<Session>,
    hand: &mut Option<CurrentHand>,
) -> Result<bool, CliError> {
    let line = parse_script_line(text)?;

    if line.is_header() {
        if session.is_some() {
            return Err(CliError::InvalidInput(format!(
                "'{}' is only allowed before the first hand",
                text
            )));
        }
        setup.apply(&line);
        return Ok(false);
    }

    if line == ScriptLine::Hand {
        if let Some(open) = hand {
            return Err(CliError::InvalidInput(format!(
                "hand #{} is not finished",
                open.hand_number()
            )));
        }
        if session.is_none() {
            *session = Some(Session::new(setup.session_config())?);
        }
        if let Some(table) = session.as_mut() {
            *hand = Some(table.start_hand()?);
        }
        return Ok(false);
    }

    let Some(current) = hand.as_mut() else {
        return Err(CliError::InvalidInput(
            "no hand in progress; start one with 'hand'".into(),
        ));
    };
    apply_line(current, line)?;
    Ok(current.is_finished())
}

fn apply_line(hand: &mut CurrentHand, line: ScriptLine) -> Result<(), HandError> {
    match line {
        ScriptLine::Hole(cards) => hand.set_hole_cards(cards)?,
        ScriptLine::Straddle(amount) => hand.post_straddle(amount)?,
        ScriptLine::Action { seat, kind, amount } => {
            hand.apply_action(BettingAction::new(seat, kind, amount))?
        }
        ScriptLine::Flop(cards) => hand.advance_to_flop(&cards)?,
        ScriptLine::Turn(card) => hand.advance_to_turn(card)?,
        ScriptLine::River(card) => hand.advance_to_river(card)?,
        ScriptLine::Showdown => hand.advance_to_showdown()?,
        ScriptLine::Winner(seat) => hand.resolve_showdown(Resolution::Winner(seat))?,
        ScriptLine::Chop(seats) => hand.resolve_showdown(Resolution::Chop(seats))?,
        ScriptLine::Seats(_)
        | ScriptLine::Blinds { .. }
        | ScriptLine::Stack { .. }
        | ScriptLine::Hero(_)
        | ScriptLine::Hand => return Ok(()),
    };
    Ok(())
}
