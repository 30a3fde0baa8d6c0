//! Betting round state and the single-action engine.
//!
//! [`apply_action`] is strict: only the seat named by
//! [`BettingRound::next_to_act`] may act. Out-of-band submissions go through
//! [`crate::auto_action`] first.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::HandError;
use crate::player::PlayerState;
use crate::rules::{validate_action, ValidatedAction};
use crate::seats::{next_active_seat, Position, TableSize};

/// A betting street.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
}

impl Street {
    pub const ALL: [Street; 4] = [Street::Preflop, Street::Flop, Street::Turn, Street::River];
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Street::Preflop => "preflop",
            Street::Flop => "flop",
            Street::Turn => "turn",
            Street::River => "river",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    Fold,
    Check,
    Call,
    Raise,
    AllIn,
    /// Forced bets are recorded by the hand itself, never submitted
    SmallBlind,
    BigBlind,
    Straddle,
}

impl ActionKind {
    pub fn is_forced(self) -> bool {
        matches!(
            self,
            ActionKind::SmallBlind | ActionKind::BigBlind | ActionKind::Straddle
        )
    }

    /// Whether the recorded amount is a chip commitment.
    pub fn commits_chips(self) -> bool {
        !matches!(self, ActionKind::Fold | ActionKind::Check)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::Fold => "fold",
            ActionKind::Check => "check",
            ActionKind::Call => "call",
            ActionKind::Raise => "raise",
            ActionKind::AllIn => "all-in",
            ActionKind::SmallBlind => "small blind",
            ActionKind::BigBlind => "big blind",
            ActionKind::Straddle => "straddle",
        };
        f.write_str(name)
    }
}

/// One action in a round's audit trail.
///
/// `amount` is the seat's total commitment for the round after the action,
/// not the chips added by it. Folds and checks record `0`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct BettingAction {
    pub position: Position,
    pub kind: ActionKind,
    #[serde(default)]
    pub amount: u32,
    pub timestamp: DateTime<Utc>,
    /// Synthesized for a skipped seat
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub auto: bool,
}

impl BettingAction {
    pub fn new(position: Position, kind: ActionKind, amount: u32) -> Self {
        Self {
            position,
            kind,
            amount,
            timestamp: Utc::now(),
            auto: false,
        }
    }

    pub fn fold(position: Position) -> Self {
        Self::new(position, ActionKind::Fold, 0)
    }

    pub fn check(position: Position) -> Self {
        Self::new(position, ActionKind::Check, 0)
    }

    pub fn call(position: Position) -> Self {
        Self::new(position, ActionKind::Call, 0)
    }

    /// Raise to `total` chips committed this round.
    pub fn raise(position: Position, total: u32) -> Self {
        Self::new(position, ActionKind::Raise, total)
    }

    /// Commit the whole stack.
    pub fn all_in(position: Position) -> Self {
        Self::new(position, ActionKind::AllIn, 0)
    }

    pub(crate) fn synthesized(position: Position, kind: ActionKind) -> Self {
        Self {
            auto: true,
            ..Self::new(position, kind, 0)
        }
    }
}

/// State of one street's betting.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct BettingRound {
    street: Street,
    table_size: TableSize,
    actions: Vec<BettingAction>,
    /// Chips collected from every round so far, this one included
    pot: u32,
    /// Highest commitment this round
    current_bet: u32,
    is_complete: bool,
    next_to_act: Option<Position>,
    /// Rotation starts after this seat until somebody acts
    anchor: Position,
    last_actor: Option<Position>,
}

impl BettingRound {
    /// Opens a street: clears every seat's round commitment and finds the
    /// first seat to act after `anchor`.
    pub(crate) fn open(
        table_size: TableSize,
        street: Street,
        carried_pot: u32,
        players: &mut [PlayerState],
        anchor: Position,
    ) -> Self {
        for p in players.iter_mut() {
            p.reset_for_street();
        }
        let mut round = Self {
            street,
            table_size,
            actions: Vec::new(),
            pot: carried_pot,
            current_bet: 0,
            is_complete: false,
            next_to_act: None,
            anchor,
            last_actor: None,
        };
        round.refresh(players);
        round
    }

    pub fn street(&self) -> Street {
        self.street
    }
    pub fn table_size(&self) -> TableSize {
        self.table_size
    }
    pub fn actions(&self) -> &[BettingAction] {
        &self.actions
    }
    pub fn pot(&self) -> u32 {
        self.pot
    }
    pub fn current_bet(&self) -> u32 {
        self.current_bet
    }
    pub fn is_complete(&self) -> bool {
        self.is_complete
    }
    pub fn next_to_act(&self) -> Option<Position> {
        self.next_to_act
    }

    /// A seat's total commitment in this round.
    pub fn committed_by(&self, position: Position) -> u32 {
        self.actions
            .iter()
            .filter(|a| a.position == position && a.kind.commits_chips())
            .map(|a| a.amount)
            .max()
            .unwrap_or(0)
    }

    /// Chips this round added to the pot, summed as `u64` so rounds read
    /// back from disk cannot overflow.
    pub fn chips_committed(&self) -> u64 {
        let mut seats: Vec<Position> = self.actions.iter().map(|a| a.position).collect();
        seats.sort();
        seats.dedup();
        seats.into_iter().map(|p| u64::from(self.committed_by(p))).sum()
    }

    /// True while no voluntary action has been recorded.
    pub fn only_forced_actions(&self) -> bool {
        self.actions.iter().all(|a| a.kind.is_forced())
    }

    /// Posts a blind or straddle for `position`, clipped to its stack.
    pub(crate) fn post_forced(
        &mut self,
        players: &mut [PlayerState],
        position: Position,
        kind: ActionKind,
        amount: u32,
    ) -> Result<u32, HandError> {
        let idx = seat_index(players, position)?;
        let delta = players[idx].commit_to(amount);
        self.pot += delta;
        let total = players[idx].current_bet();
        if total > self.current_bet {
            self.current_bet = total;
            reopen_action(players, position);
        }
        if kind == ActionKind::Straddle {
            self.anchor = position;
        }
        self.actions.push(BettingAction::new(position, kind, total));
        debug!(
            street = %self.street,
            position = %position,
            kind = %kind,
            amount = total,
            pot = self.pot,
            "forced bet posted"
        );
        self.refresh(players);
        Ok(delta)
    }

    /// Recomputes completion and the next seat to act.
    fn refresh(&mut self, players: &[PlayerState]) {
        let contenders = players.iter().filter(|p| p.is_in_hand()).count();
        let pending: Vec<Position> = players
            .iter()
            .filter(|p| owes_action(p, self.current_bet))
            .map(|p| p.position())
            .collect();
        let mut able = players.iter().filter(|p| p.is_active());
        // a lone active seat with nothing owed has nobody left to bet against
        let lone_matched = match (able.next(), able.next()) {
            (None, _) => true,
            (Some(p), None) => p.current_bet() >= self.current_bet,
            _ => false,
        };

        self.is_complete = contenders <= 1 || pending.is_empty() || lone_matched;
        self.next_to_act = if self.is_complete {
            None
        } else {
            let from = self.last_actor.unwrap_or(self.anchor);
            next_active_seat(self.table_size, from, &pending).ok()
        };
    }

    /// Seats that still owe an action this round.
    pub(crate) fn pending_seats(&self, players: &[PlayerState]) -> Vec<Position> {
        if self.is_complete {
            return Vec::new();
        }
        players
            .iter()
            .filter(|p| owes_action(p, self.current_bet))
            .map(|p| p.position())
            .collect()
    }
}

fn owes_action(p: &PlayerState, round_bet: u32) -> bool {
    p.is_active() && (!p.has_acted() || p.current_bet() < round_bet)
}

/// Every other active seat must respond to a new highest commitment.
fn reopen_action(players: &mut [PlayerState], aggressor: Position) {
    for p in players.iter_mut() {
        if p.position() != aggressor && p.is_active() {
            p.set_acted(false);
        }
    }
}

pub(crate) fn seat_index(players: &[PlayerState], position: Position) -> Result<usize, HandError> {
    players
        .iter()
        .position(|p| p.position() == position)
        .ok_or_else(|| HandError::UnknownSeat(position.to_string()))
}

/// Applies one action from the seat whose turn it is.
///
/// On success the action is appended to the round, the pot and
/// `current_bet` are updated, and `next_to_act` / `is_complete` are
/// recomputed. On failure nothing changes.
///
/// # Errors
///
/// - [`HandError::OutOfTurnAction`] when `action.position` is not
///   [`BettingRound::next_to_act`]
/// - any error from [`validate_action`]
pub fn apply_action(
    round: &mut BettingRound,
    players: &mut [PlayerState],
    action: BettingAction,
) -> Result<(), HandError> {
    if round.is_complete || round.next_to_act != Some(action.position) {
        return Err(HandError::OutOfTurnAction {
            expected: round.next_to_act,
            actual: action.position,
        });
    }
    let idx = seat_index(players, action.position)?;
    let validated = validate_action(&players[idx], round.current_bet, action.kind, action.amount)?;

    let player = &mut players[idx];
    let recorded = match validated {
        ValidatedAction::Fold => {
            player.fold();
            0
        }
        ValidatedAction::Check => 0,
        ValidatedAction::Call(total)
        | ValidatedAction::Raise(total)
        | ValidatedAction::AllIn(total) => {
            round.pot += player.commit_to(total);
            player.current_bet()
        }
    };
    player.set_acted(true);

    if recorded > round.current_bet {
        round.current_bet = recorded;
        reopen_action(players, action.position);
    }

    debug!(
        street = %round.street,
        position = %action.position,
        kind = %action.kind,
        amount = recorded,
        pot = round.pot,
        auto = action.auto,
        "action applied"
    );
    round.last_actor = Some(action.position);
    round.actions.push(BettingAction {
        amount: recorded,
        ..action
    });
    round.refresh(players);
    Ok(())
}
