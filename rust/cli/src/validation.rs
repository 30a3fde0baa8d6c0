//! Parsing of hand script lines.
//!
//! A script is a plain text file with one instruction per line. Header lines
//! (`seats`, `blinds`, `stack`, `hero`) configure the table and are only valid
//! before the first `hand`. Everything else drives the hand in progress:
//!
//! ```text
//! seats 6
//! blinds 5 10
//! stack 1000
//! hero CO
//! hand
//! hole Ah Kd
//! UTG fold
//! CO raise 30
//! BTN call
//! SB fold
//! BB fold
//! flop Ah 7c 2d
//! CO check
//! BTN allin
//! CO call
//! turn 9s
//! river Qh
//! showdown
//! winner CO
//! ```

use tablelog_engine::betting::ActionKind;
use tablelog_engine::cards::Card;
use tablelog_engine::seats::{Position, TableSize};

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptLine {
    Seats(TableSize),
    Blinds { small: u32, big: u32 },
    /// `stack N` for every seat, `stack SEAT N` for one
    Stack { seat: Option<Position>, chips: u32 },
    Hero(Position),
    Hand,
    Hole([Card; 2]),
    Straddle(u32),
    Action { seat: Position, kind: ActionKind, amount: u32 },
    Flop(Vec<Card>),
    Turn(Card),
    River(Card),
    Showdown,
    Winner(Position),
    Chop(Vec<Position>),
}

impl ScriptLine {
    pub fn is_header(&self) -> bool {
        matches!(
            self,
            ScriptLine::Seats(_)
                | ScriptLine::Blinds { .. }
                | ScriptLine::Stack { .. }
                | ScriptLine::Hero(_)
        )
    }
}

/// Parse one non-blank, non-comment script line.
///
/// # Example
///
/// ```rust
/// # use tablelog_cli::validation::{parse_script_line, ScriptLine};
/// use tablelog_engine::betting::ActionKind;
/// use tablelog_engine::seats::Position;
///
/// assert_eq!(
///     parse_script_line("co raise 30"),
///     Ok(ScriptLine::Action { seat: Position::Cutoff, kind: ActionKind::Raise, amount: 30 })
/// );
/// assert!(parse_script_line("CO raise").is_err());
/// assert!(parse_script_line("deal").unwrap_err().contains("Unrecognized"));
/// ```
pub fn parse_script_line(line: &str) -> Result<ScriptLine, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some((head, rest)) = parts.split_first() else {
        return Err("Empty line".to_string());
    };

    if let Ok(seat) = head.parse::<Position>() {
        return parse_action(seat, rest);
    }

    match head.to_ascii_lowercase().as_str() {
        "seats" => {
            let n = single_number(rest, "seats")?;
            let size = u8::try_from(n)
                .ok()
                .and_then(|n| TableSize::from_seats(n).ok())
                .ok_or_else(|| format!("Unsupported table size {} (use 6 or 9)", n))?;
            Ok(ScriptLine::Seats(size))
        }
        "blinds" => match rest {
            [sb, bb] => Ok(ScriptLine::Blinds {
                small: amount(sb)?,
                big: amount(bb)?,
            }),
            _ => Err("blinds requires two amounts (e.g., 'blinds 5 10')".to_string()),
        },
        "stack" => match rest {
            [chips] => Ok(ScriptLine::Stack {
                seat: None,
                chips: amount(chips)?,
            }),
            [seat, chips] => Ok(ScriptLine::Stack {
                seat: Some(seat_label(seat)?),
                chips: amount(chips)?,
            }),
            _ => Err("stack requires an amount, optionally after a seat".to_string()),
        },
        "hero" => match rest {
            [seat] => Ok(ScriptLine::Hero(seat_label(seat)?)),
            _ => Err("hero requires one seat".to_string()),
        },
        "hand" if rest.is_empty() => Ok(ScriptLine::Hand),
        "hole" => {
            let cards = card_list(rest)?;
            match <[Card; 2]>::try_from(cards) {
                Ok(pair) => Ok(ScriptLine::Hole(pair)),
                Err(c) => Err(format!("hole requires 2 cards, got {}", c.len())),
            }
        }
        "straddle" => Ok(ScriptLine::Straddle(single_number(rest, "straddle")?)),
        "flop" => {
            let cards = card_list(rest)?;
            if cards.len() != 3 {
                return Err(format!("flop requires 3 cards, got {}", cards.len()));
            }
            Ok(ScriptLine::Flop(cards))
        }
        "turn" => Ok(ScriptLine::Turn(single_card(rest, "turn")?)),
        "river" => Ok(ScriptLine::River(single_card(rest, "river")?)),
        "showdown" if rest.is_empty() => Ok(ScriptLine::Showdown),
        "winner" => match rest {
            [seat] => Ok(ScriptLine::Winner(seat_label(seat)?)),
            _ => Err("winner requires one seat (use 'chop' for a split pot)".to_string()),
        },
        "chop" => {
            let seats = rest
                .iter()
                .map(|s| seat_label(s))
                .collect::<Result<Vec<_>, _>>()?;
            if seats.len() < 2 {
                return Err("chop requires at least two seats".to_string());
            }
            Ok(ScriptLine::Chop(seats))
        }
        other => Err(format!(
            "Unrecognized instruction '{}'. Valid: seats, blinds, stack, hero, hand, hole, straddle, <SEAT> <action>, flop, turn, river, showdown, winner, chop",
            other
        )),
    }
}

fn parse_action(seat: Position, rest: &[&str]) -> Result<ScriptLine, String> {
    let Some((verb, args)) = rest.split_first() else {
        return Err(format!("{} requires an action", seat));
    };
    let (kind, amount) = match (verb.to_ascii_lowercase().as_str(), args) {
        ("fold" | "f", []) => (ActionKind::Fold, 0),
        ("check" | "x", []) => (ActionKind::Check, 0),
        ("call" | "c", []) => (ActionKind::Call, 0),
        ("allin" | "all-in", []) => (ActionKind::AllIn, 0),
        ("raise" | "bet", [n]) => (ActionKind::Raise, amount(n)?),
        ("raise" | "bet", _) => {
            return Err(format!(
                "{} requires a total amount (e.g., '{} {} 30')",
                verb, seat, verb
            ));
        }
        (other, _) => {
            return Err(format!(
                "Unrecognized action '{}'. Valid actions: fold, check, call, raise <amount>, allin",
                other
            ));
        }
    };
    Ok(ScriptLine::Action { seat, kind, amount })
}

fn amount(token: &str) -> Result<u32, String> {
    token
        .parse::<u32>()
        .map_err(|_| format!("Invalid amount '{}'", token))
}

fn single_number(rest: &[&str], what: &str) -> Result<u32, String> {
    match rest {
        [n] => amount(n),
        _ => Err(format!("{} requires one number", what)),
    }
}

fn seat_label(token: &str) -> Result<Position, String> {
    token.parse::<Position>().map_err(|e| e.to_string())
}

fn card_list(tokens: &[&str]) -> Result<Vec<Card>, String> {
    tokens
        .iter()
        .map(|t| t.parse::<Card>().map_err(|e| e.to_string()))
        .collect()
}

fn single_card(rest: &[&str], what: &str) -> Result<Card, String> {
    match rest {
        [c] => c.parse::<Card>().map_err(|e| e.to_string()),
        _ => Err(format!("{} requires one card", what)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lines() {
        assert_eq!(
            parse_script_line("seats 9"),
            Ok(ScriptLine::Seats(TableSize::Nine))
        );
        assert!(parse_script_line("seats 7").unwrap_err().contains("6 or 9"));
        assert_eq!(
            parse_script_line("blinds 1 2"),
            Ok(ScriptLine::Blinds { small: 1, big: 2 })
        );
        assert_eq!(
            parse_script_line("stack BTN 250"),
            Ok(ScriptLine::Stack {
                seat: Some(Position::Button),
                chips: 250
            })
        );
        assert!(parse_script_line("hero utg+1").unwrap().is_header());
    }

    #[test]
    fn test_action_aliases() {
        assert_eq!(
            parse_script_line("SB x"),
            Ok(ScriptLine::Action {
                seat: Position::SmallBlind,
                kind: ActionKind::Check,
                amount: 0
            })
        );
        assert_eq!(
            parse_script_line("hj bet 60"),
            Ok(ScriptLine::Action {
                seat: Position::Hijack,
                kind: ActionKind::Raise,
                amount: 60
            })
        );
        assert!(parse_script_line("BB fold now").is_err());
        assert!(parse_script_line("BB").is_err());
    }

    #[test]
    fn test_board_lines() {
        assert!(matches!(
            parse_script_line("flop Ah 7c 2d"),
            Ok(ScriptLine::Flop(cards)) if cards.len() == 3
        ));
        assert!(parse_script_line("flop Ah 7c").is_err());
        assert!(parse_script_line("turn 9s 9h").is_err());
        assert!(parse_script_line("river 10h").is_err());
        assert!(matches!(
            parse_script_line("hole Ah Kd"),
            Ok(ScriptLine::Hole(_))
        ));
    }

    #[test]
    fn test_result_lines() {
        assert_eq!(
            parse_script_line("winner co"),
            Ok(ScriptLine::Winner(Position::Cutoff))
        );
        assert!(parse_script_line("chop BTN").is_err());
        assert_eq!(
            parse_script_line("chop BTN BB"),
            Ok(ScriptLine::Chop(vec![Position::Button, Position::BigBlind]))
        );
        assert!(parse_script_line("winner DEALER").is_ok());
    }
}
