//! Persistence contract for recorded hands.
//!
//! The engine never touches storage itself. A [`HandStore`] receives finished
//! hands and optionally parks the hand in progress so a session can resume.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hand::CurrentHand;
use crate::logger::StoredHand;

#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Storage lock poisoned")]
    StoragePoisoned,
    #[error("Hand #{0} is finalized and cannot be parked")]
    AlreadyFinalized(u32),
    #[error("Hand {0} already stored")]
    Duplicate(String),
}

pub trait HandStore: Send + Sync {
    /// Appends a finished hand. Clears the session's open hand.
    fn save_hand(&self, session: &SessionId, hand: StoredHand) -> Result<(), StoreError>;

    /// Parks the hand in progress, replacing any previous one.
    fn save_open_hand(&self, session: &SessionId, hand: &CurrentHand) -> Result<(), StoreError>;

    fn load_open_hand(&self, session: &SessionId) -> Result<Option<CurrentHand>, StoreError>;

    /// Finished hands of a session, oldest first.
    fn list_hands(&self, session: &SessionId) -> Result<Vec<StoredHand>, StoreError>;
}

/// In-process store backed by `RwLock`-guarded maps.
#[derive(Debug, Default)]
pub struct MemoryStore {
    hands: RwLock<HashMap<SessionId, Vec<StoredHand>>>,
    open: RwLock<HashMap<SessionId, CurrentHand>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HandStore for MemoryStore {
    fn save_hand(&self, session: &SessionId, hand: StoredHand) -> Result<(), StoreError> {
        let mut hands = self
            .hands
            .write()
            .map_err(|_| StoreError::StoragePoisoned)?;
        let list = hands.entry(session.clone()).or_default();
        if list.iter().any(|h| h.hand_id == hand.hand_id) {
            return Err(StoreError::Duplicate(hand.hand_id));
        }
        list.push(hand);
        drop(hands);

        let mut open = self.open.write().map_err(|_| StoreError::StoragePoisoned)?;
        open.remove(session);
        Ok(())
    }

    fn save_open_hand(&self, session: &SessionId, hand: &CurrentHand) -> Result<(), StoreError> {
        if hand.is_finalized() {
            return Err(StoreError::AlreadyFinalized(hand.hand_number()));
        }
        let mut open = self.open.write().map_err(|_| StoreError::StoragePoisoned)?;
        open.insert(session.clone(), hand.clone());
        Ok(())
    }

    fn load_open_hand(&self, session: &SessionId) -> Result<Option<CurrentHand>, StoreError> {
        let open = self.open.read().map_err(|_| StoreError::StoragePoisoned)?;
        Ok(open.get(session).cloned())
    }

    fn list_hands(&self, session: &SessionId) -> Result<Vec<StoredHand>, StoreError> {
        let hands = self.hands.read().map_err(|_| StoreError::StoragePoisoned)?;
        Ok(hands.get(session).cloned().unwrap_or_default())
    }
}
