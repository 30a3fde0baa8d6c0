use crate::betting::ActionKind as A;
use crate::errors::HandError;
use crate::player::PlayerState;

/// A submitted action after legality checks. Amounts are the seat's total
/// commitment for the round once the action is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedAction {
    Fold,
    Check,
    Call(u32),
    Raise(u32),
    AllIn(u32),
}

impl ValidatedAction {
    pub fn total(&self) -> Option<u32> {
        match self {
            ValidatedAction::Fold | ValidatedAction::Check => None,
            ValidatedAction::Call(t) | ValidatedAction::Raise(t) | ValidatedAction::AllIn(t) => {
                Some(*t)
            }
        }
    }
}

/// Smallest legal raise total against `current_bet`: strictly above it and at
/// least double it.
pub fn min_raise_to(current_bet: u32) -> u32 {
    current_bet
        .saturating_add(1)
        .max(current_bet.saturating_mul(2))
}

/// Validates one action for `player` against the round's highest commitment.
///
/// Nothing is mutated; the returned [`ValidatedAction`] tells the engine what
/// to apply.
///
/// # Errors
///
/// - [`HandError::CheckFacingBet`] when checking with chips still owed
/// - [`HandError::InvalidRaiseAmount`] when a raise is below
///   [`min_raise_to`] or above the seat's stack, or when an all-in names an
///   amount other than the whole stack
/// - [`HandError::ForcedBet`] for blind and straddle kinds
///
/// # Examples
///
/// ```
/// use tablelog_engine::betting::ActionKind;
/// use tablelog_engine::player::PlayerState;
/// use tablelog_engine::rules::{validate_action, ValidatedAction};
/// use tablelog_engine::seats::Position;
///
/// let player = PlayerState::new(Position::Cutoff, 1_000);
/// assert_eq!(
///     validate_action(&player, 20, ActionKind::Raise, 40),
///     Ok(ValidatedAction::Raise(40))
/// );
/// assert!(validate_action(&player, 20, ActionKind::Raise, 30).is_err());
/// ```
pub fn validate_action(
    player: &PlayerState,
    current_bet: u32,
    kind: A,
    amount: u32,
) -> Result<ValidatedAction, HandError> {
    let ceiling = player.max_commitment();
    match kind {
        A::Fold => Ok(ValidatedAction::Fold),
        A::Check => {
            let to_call = player.to_call(current_bet);
            if to_call == 0 {
                Ok(ValidatedAction::Check)
            } else {
                Err(HandError::CheckFacingBet { to_call })
            }
        }
        // a call that cannot be matched commits the whole stack; the status
        // change to all-in happens when the chips move
        A::Call => Ok(ValidatedAction::Call(current_bet.min(ceiling))),
        A::Raise => {
            let minimum = min_raise_to(current_bet);
            if amount < minimum || amount > ceiling {
                Err(HandError::InvalidRaiseAmount {
                    amount,
                    minimum,
                    maximum: ceiling,
                })
            } else {
                Ok(ValidatedAction::Raise(amount))
            }
        }
        A::AllIn => {
            if amount == 0 || amount == ceiling {
                Ok(ValidatedAction::AllIn(ceiling))
            } else {
                Err(HandError::InvalidRaiseAmount {
                    amount,
                    minimum: ceiling,
                    maximum: ceiling,
                })
            }
        }
        A::SmallBlind | A::BigBlind | A::Straddle => Err(HandError::ForcedBet(kind)),
    }
}
