//! Replay command handler.
//!
//! Prints recorded hands from a JSONL history street by street, with the
//! board as it stood on each street and a running pot after every action.
//! Compressed (`.zst`) histories are read transparently.

use std::collections::BTreeMap;
use std::io::Write;

use tablelog_engine::betting::{BettingRound, Street};
use tablelog_engine::cards::Card;
use tablelog_engine::logger::{Outcome, StoredHand};
use tablelog_engine::seats::Position;

use crate::error::CliError;
use crate::formatters::{format_action, format_board, format_card, format_stacks};
use crate::io_utils::{numbered_lines, read_text_auto};

/// Handle the replay command.
///
/// Lines that fail to parse are reported on `err` and skipped.
///
/// # Arguments
///
/// * `input` - Path to the JSONL hand history
/// * `out` - Output stream for the replay
/// * `err` - Error stream for unparsable lines
pub fn handle_replay_command(
    input: String,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let content = read_text_auto(&input)?;

    let mut shown = 0usize;
    for (index, (_, line)) in numbered_lines(&content, false).enumerate() {
        let hand = stored_hand_or_continue!(line, err, index + 1);
        if shown > 0 {
            writeln!(out)?;
        }
        print_hand(&hand, out)?;
        shown += 1;
    }

    if shown == 0 {
        writeln!(out, "No hands found in file.")?;
    }
    Ok(())
}

fn print_hand(hand: &StoredHand, out: &mut dyn Write) -> Result<(), CliError> {
    writeln!(
        out,
        "Hand #{} ({}) {}-max {}/{}  {}",
        hand.hand_number,
        hand.hand_id,
        hand.table_size.seat_count(),
        hand.blinds.small_blind,
        hand.blinds.big_blind,
        hand.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
    )?;
    writeln!(out, "═══════════════════════════════════════")?;
    writeln!(out, "Stacks: {}", format_stacks(&hand.stacks_before))?;
    if let Some(hero) = hand.hero {
        match &hand.hole_cards {
            Some([a, b]) => writeln!(out, "Hero: {} [{} {}]", hero, format_card(a), format_card(b))?,
            None => writeln!(out, "Hero: {}", hero)?,
        }
    }

    let mut pot = 0u64;
    for round in &hand.rounds {
        writeln!(out)?;
        print_street_header(round.street(), &hand.board, out)?;
        pot = print_round(round, pot, out)?;
    }

    writeln!(out)?;
    print_result(hand, out)
}

fn print_street_header(street: Street, board: &[Card], out: &mut dyn Write) -> std::io::Result<()> {
    let shown = match street {
        Street::Preflop => return writeln!(out, "Preflop:"),
        Street::Flop => 3,
        Street::Turn => 4,
        Street::River => 5,
    };
    let cards = &board[..shown.min(board.len())];
    let name = match street {
        Street::Flop => "Flop",
        Street::Turn => "Turn",
        _ => "River",
    };
    writeln!(out, "{}: {}", name, format_board(cards))
}

/// Prints every action with the pot after it; returns the pot at street end.
fn print_round(round: &BettingRound, mut pot: u64, out: &mut dyn Write) -> std::io::Result<u64> {
    let mut committed: BTreeMap<Position, u32> = BTreeMap::new();
    for action in round.actions() {
        if action.kind.commits_chips() {
            let before = committed.insert(action.position, action.amount).unwrap_or(0);
            pot += u64::from(action.amount.saturating_sub(before));
        }
        writeln!(out, "  {}  (pot {})", format_action(action), pot)?;
    }
    Ok(pot)
}

fn print_result(hand: &StoredHand, out: &mut dyn Write) -> Result<(), CliError> {
    let result = &hand.result;
    writeln!(out, "Result:")?;
    for (seat, chips) in &result.payouts {
        writeln!(out, "  {} wins {}", seat, chips)?;
    }
    if result.payouts.is_empty() {
        let winners: Vec<String> = result.winners.iter().map(|w| w.to_string()).collect();
        writeln!(out, "  {} win {}", winners.join(", "), result.pot_won)?;
    }
    if let Some(outcome) = result.outcome {
        let label = match outcome {
            Outcome::Won => "won",
            Outcome::Lost => "lost",
            Outcome::Folded => "folded",
            Outcome::Chopped => "chopped",
        };
        match result.stack_after {
            Some(stack) => writeln!(out, "  Hero {} (stack {})", label, stack)?,
            None => writeln!(out, "  Hero {}", label)?,
        }
    }
    writeln!(out, "Stacks: {}", format_stacks(&hand.stacks_after))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablelog_engine::betting::BettingAction;
    use tablelog_engine::hand::CurrentHand;
    use tablelog_engine::seats::TableSize;
    use tablelog_engine::session::{Session, SessionConfig};

    fn recorded_hand() -> StoredHand {
        let config = SessionConfig::new(TableSize::Six, 5, 10)
            .with_uniform_stacks(1_000)
            .with_hero(Position::Cutoff);
        let mut session = Session::new(config).unwrap();
        let mut hand: CurrentHand = session.start_hand().unwrap();
        hand.apply_action(BettingAction::raise(Position::Cutoff, 30))
            .unwrap();
        hand.apply_action(BettingAction::fold(Position::Button))
            .unwrap();
        hand.apply_action(BettingAction::fold(Position::SmallBlind))
            .unwrap();
        hand.apply_action(BettingAction::fold(Position::BigBlind))
            .unwrap();
        session.record(&mut hand).unwrap()
    }

    #[test]
    fn test_running_pot_counts_only_new_chips() {
        let hand = recorded_hand();
        let mut buf = Vec::new();
        let pot = print_round(&hand.rounds[0], 0, &mut buf).unwrap();
        assert_eq!(pot, 45);
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("SB posts small blind 5  (pot 5)"));
        assert!(text.contains("BB posts big blind 10  (pot 15)"));
        assert!(text.contains("UTG folds (auto)  (pot 15)"));
        assert!(text.contains("CO raises to 30  (pot 45)"));
    }

    #[test]
    fn test_print_hand_shows_hero_result() {
        let hand = recorded_hand();
        let mut buf = Vec::new();
        print_hand(&hand, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Hand #1 ("));
        assert!(text.contains("Hero: CO\n"));
        assert!(text.contains("  CO wins 45"));
        assert!(text.contains("  Hero won (stack 1015)"));
    }
}
