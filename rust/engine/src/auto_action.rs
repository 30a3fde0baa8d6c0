//! Default actions for seats skipped by out-of-order input.
//!
//! When an operator records an action for a seat that is not next to act,
//! every pending seat between `next_to_act` and that seat receives a
//! synthesized fold (a bet is live) or check (nothing bet), applied through
//! [`apply_action`] like any other action.

use tracing::warn;

use crate::betting::{apply_action, seat_index, ActionKind, BettingAction, BettingRound, Street};
use crate::errors::HandError;
use crate::player::PlayerState;
use crate::seats::{rotation_from, Position};

/// Applies `action`, synthesizing actions for skipped seats first.
///
/// All-or-nothing: if any step fails, `round` and `players` are untouched.
/// Returns the synthesized actions in the order they were applied.
///
/// Skipping goes by table order, not by rotation from `next_to_act`. In a
/// fresh preflop round BTN, SB and BB sit before UTG, so they cannot open
/// by skipping. "Folds to the button" needs an explicit UTG fold first;
/// BTN's action then folds the seats in between.
///
/// # Errors
///
/// - [`HandError::OutOfTurnAction`] when the target seat has folded, is
///   all-in, has nothing left to do this round, or the round is closed
/// - [`HandError::ActingBeforeFirstPosition`] preflop, when the target sits
///   before the first seat due to act in a fresh hand, or when `hero` would
///   be skipped
pub fn apply_with_auto_actions(
    round: &mut BettingRound,
    players: &mut [PlayerState],
    action: BettingAction,
    hero: Option<Position>,
) -> Result<Vec<BettingAction>, HandError> {
    let target = action.position;
    let Some(expected) = round.next_to_act() else {
        return Err(HandError::OutOfTurnAction {
            expected: None,
            actual: target,
        });
    };
    if expected == target {
        apply_action(round, players, action)?;
        return Ok(Vec::new());
    }

    seat_index(players, target)?;
    let pending = round.pending_seats(players);
    if !pending.contains(&target) {
        return Err(HandError::OutOfTurnAction {
            expected: Some(expected),
            actual: target,
        });
    }

    if round.street() == Street::Preflop {
        let table = round.table_size();
        if round.only_forced_actions() && table.index_of(target) < table.index_of(expected) {
            return Err(HandError::ActingBeforeFirstPosition {
                first: expected,
                actual: target,
            });
        }
        if let Some(hero) = hero.filter(|h| *h != target) {
            let hero_skipped = std::iter::once(expected)
                .chain(rotation_from(table, expected))
                .take_while(|p| *p != target)
                .any(|p| p == hero && pending.contains(&p));
            if hero_skipped {
                return Err(HandError::ActingBeforeFirstPosition {
                    first: hero,
                    actual: target,
                });
            }
        }
    }

    let mut work_round = round.clone();
    let mut work_players = players.to_vec();
    let mut synthesized = Vec::new();

    while let Some(seat) = work_round.next_to_act() {
        if seat == target {
            break;
        }
        let kind = if work_round.current_bet() > 0 {
            ActionKind::Fold
        } else {
            ActionKind::Check
        };
        let filler = BettingAction::synthesized(seat, kind);
        apply_action(&mut work_round, &mut work_players, filler.clone())?;
        warn!(
            street = %work_round.street(),
            position = %seat,
            kind = %kind,
            target = %target,
            "synthesized action for skipped seat"
        );
        synthesized.push(filler);
    }

    // the skipped folds may have ended the round before the target's turn
    apply_action(&mut work_round, &mut work_players, action).map_err(|e| match e {
        HandError::OutOfTurnAction { .. } => HandError::OutOfTurnAction {
            expected: Some(expected),
            actual: target,
        },
        other => other,
    })?;

    *round = work_round;
    players.clone_from_slice(&work_players);
    Ok(synthesized)
}
