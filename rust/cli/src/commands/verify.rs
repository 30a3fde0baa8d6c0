//! Verify command handler module.
//!
//! Validates a JSONL hand history against the recorder's accounting rules:
//!
//! - Valid hand IDs (format: YYYYMMDD-NNNNNN) matching the hand number
//! - Pot identity: chips committed across rounds equal the pot awarded
//! - Payouts sum to the pot and go only to seats that did not fold
//! - Chip conservation and per-seat stack arithmetic
//! - Street progression (preflop, flop, turn, river) matching the board
//! - No duplicate cards across board and hole cards
//! - Hand numbers increase and stacks carry over between hands
//!
//! Errors are collected using the shared `BatchValidationError` pattern for structured reporting.

use std::collections::{BTreeMap, HashSet};
use std::io::Write;

use tablelog_engine::betting::{ActionKind, Street};
use tablelog_engine::logger::StoredHand;
use tablelog_engine::seats::Position;

use crate::error::{BatchValidationError, CliError};
use crate::io_utils::{numbered_lines, read_text_auto};

/// Type alias for verify-specific batch validation errors.
/// The `usize` context represents the hand index (1-based) for error reporting.
type VerifyError = BatchValidationError<usize>;

/// Handle the verify command - validate hand history integrity.
///
/// # Returns
///
/// `Ok(())` if all checks pass, otherwise an `Err` that maps to exit code `2`.
///
/// # Example
///
/// ```no_run
/// # use std::io;
/// # use tablelog_cli::commands::handle_verify_command;
/// let input = "data/hands/session.jsonl".to_string();
/// let result = handle_verify_command(input, &mut io::stdout(), &mut io::stderr());
/// ```
pub fn handle_verify_command(
    input: String,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let content = read_text_auto(&input)?;

    let mut errors: Vec<VerifyError> = Vec::new();
    let mut hands = 0usize;
    let mut previous: Option<StoredHand> = None;

    for (_, line) in numbered_lines(&content, false) {
        hands += 1;
        let hand: StoredHand = match serde_json::from_str(line) {
            Ok(h) => h,
            Err(e) => {
                errors.push(VerifyError {
                    item_context: hands,
                    message: format!("Invalid hand record: {}", e),
                });
                continue;
            }
        };

        let mut report = |message: String| {
            errors.push(VerifyError {
                item_context: hands,
                message,
            })
        };
        check_hand(&hand).into_iter().for_each(&mut report);
        if let Some(prev) = &previous {
            check_continuity(prev, &hand).into_iter().for_each(&mut report);
        }
        previous = Some(hand);
    }

    if errors.is_empty() {
        writeln!(out, "Verify: OK (hands={})", hands)?;
        Ok(())
    } else {
        writeln!(out, "Verify: FAIL (hands={})", hands)?;
        writeln!(err)?;
        writeln!(err, "Errors found:")?;
        for error in &errors {
            writeln!(err, "  Hand {}: {}", error.item_context, error.message)?;
        }
        writeln!(err)?;
        let invalid_hands: HashSet<usize> = errors.iter().map(|e| e.item_context).collect();
        writeln!(
            err,
            "Summary: {} error(s) in {} hands ({} invalid hands)",
            errors.len(),
            hands,
            invalid_hands.len()
        )?;
        Err(CliError::InvalidInput(format!(
            "{} validation errors found",
            errors.len()
        )))
    }
}

fn valid_id(id: &str, hand_number: u32) -> bool {
    id.is_ascii()
        && id.len() == 15
        && id[0..8].chars().all(|c| c.is_ascii_digit())
        && &id[8..9] == "-"
        && id[9..].parse::<u32>().ok() == Some(hand_number)
}

/// Checks that need only the hand itself.
fn check_hand(hand: &StoredHand) -> Vec<String> {
    let mut problems = Vec::new();
    let result = &hand.result;

    if !valid_id(&hand.hand_id, hand.hand_number) {
        problems.push(format!(
            "Invalid hand_id {} for hand number {}",
            hand.hand_id, hand.hand_number
        ));
    }

    // u64 sums: a hostile record may hold amounts near u32::MAX
    let pot = u64::from(result.pot_won);
    let committed: u64 = hand.rounds.iter().map(|r| r.chips_committed()).sum();
    if committed != pot {
        problems.push(format!(
            "Pot mismatch: rounds commit {} but {} was awarded",
            committed, result.pot_won
        ));
    }

    let paid: u64 = result.payouts.values().map(|&c| u64::from(c)).sum();
    if paid != pot {
        problems.push(format!(
            "Payouts total {} but pot is {}",
            paid, result.pot_won
        ));
    }
    let winners: HashSet<Position> = result.winners.iter().copied().collect();
    let paid_seats: HashSet<Position> = result.payouts.keys().copied().collect();
    if winners != paid_seats {
        problems.push("Winners do not match payout seats".to_string());
    }

    let folded: HashSet<Position> = hand
        .rounds
        .iter()
        .flat_map(|r| r.actions())
        .filter(|a| a.kind == ActionKind::Fold)
        .map(|a| a.position)
        .collect();
    for winner in &result.winners {
        if folded.contains(winner) {
            problems.push(format!("{} folded but was paid", winner));
        }
    }

    let before: u64 = hand.stacks_before.values().map(|&s| u64::from(s)).sum();
    let after: u64 = hand.stacks_after.values().map(|&s| u64::from(s)).sum();
    if before != after {
        problems.push(format!(
            "Chip conservation violated: {} before, {} after",
            before, after
        ));
    }

    problems.extend(check_stacks(hand));
    problems.extend(check_streets(hand));

    let mut seen = HashSet::new();
    let hole = hand.hole_cards.iter().flatten();
    let mut duplicates: Vec<String> = hand
        .board
        .iter()
        .chain(hole)
        .filter(|c| !seen.insert(*c))
        .map(|c| c.to_string())
        .collect();
    if !duplicates.is_empty() {
        duplicates.sort();
        problems.push(format!("Duplicate card(s) detected: {}", duplicates.join(", ")));
    }

    problems
}

/// Per-seat arithmetic: after = before - contribution + payout.
fn check_stacks(hand: &StoredHand) -> Vec<String> {
    let mut problems = Vec::new();
    let contributions = hand.contributions();
    for seat in contributions.keys() {
        if !hand.stacks_before.contains_key(seat) {
            problems.push(format!("{} acted without a stack", seat));
        }
    }
    for (seat, &start) in &hand.stacks_before {
        let start = u64::from(start);
        let put_in = contributions.get(seat).copied().unwrap_or(0);
        if put_in > start {
            problems.push(format!(
                "{} committed {} with a stack of {}",
                seat, put_in, start
            ));
            continue;
        }
        let won = hand.result.payouts.get(seat).map_or(0, |&c| u64::from(c));
        let expected = start - put_in + won;
        match hand.stacks_after.get(seat) {
            Some(&end) if u64::from(end) == expected => {}
            Some(&end) => problems.push(format!(
                "Stack mismatch for {}: expected {} but recorded {}",
                seat, expected, end
            )),
            None => problems.push(format!("Missing final stack for {}", seat)),
        }
    }
    problems
}

fn check_streets(hand: &StoredHand) -> Vec<String> {
    let mut problems = Vec::new();
    if hand.rounds.is_empty() {
        problems.push("Hand has no betting rounds".to_string());
        return problems;
    }
    for (round, expected) in hand.rounds.iter().zip(Street::ALL) {
        if round.street() != expected {
            problems.push(format!(
                "Invalid street progression: {} where {} was expected",
                round.street(),
                expected
            ));
        }
    }
    if hand.rounds.len() > Street::ALL.len() {
        problems.push(format!("Too many betting rounds: {}", hand.rounds.len()));
    }
    let board_for_rounds = match hand.rounds.len() {
        1 => 0,
        2 => 3,
        3 => 4,
        _ => 5,
    };
    if hand.board.len() != board_for_rounds {
        problems.push(format!(
            "Invalid board length: {} round(s) need {} cards but found {}",
            hand.rounds.len(),
            board_for_rounds,
            hand.board.len()
        ));
    }
    problems
}

/// Checks between consecutive hands of one session.
fn check_continuity(prev: &StoredHand, hand: &StoredHand) -> Vec<String> {
    let mut problems = Vec::new();
    if hand.hand_number <= prev.hand_number {
        problems.push(format!(
            "Hand number {} does not follow {}",
            hand.hand_number, prev.hand_number
        ));
    }
    let carried: BTreeMap<&Position, (&u32, &u32)> = hand
        .stacks_before
        .iter()
        .filter_map(|(seat, start)| prev.stacks_after.get(seat).map(|end| (seat, (end, start))))
        .collect();
    for (seat, (end, start)) in carried {
        if end != start {
            problems.push(format!(
                "Stack for {} changed between hands: {} then {}",
                seat, end, start
            ));
        }
    }
    problems
}
