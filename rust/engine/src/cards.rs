use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::HandError;

/// A card token: one rank character followed by one suit character
/// (`"As"`, `"T♥"`). The engine never interprets rank or suit; tokens are
/// only compared for equality.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Card(String);

impl Card {
    pub fn new(token: impl Into<String>) -> Result<Self, HandError> {
        let token = token.into();
        let mut chars = token.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(rank), Some(suit), None)
                if !rank.is_whitespace() && !suit.is_whitespace() =>
            {
                Ok(Card(token))
            }
            _ => Err(HandError::InvalidCard(token)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn rank(&self) -> char {
        self.0.chars().next().unwrap_or('?')
    }

    pub fn suit(&self) -> char {
        self.0.chars().nth(1).unwrap_or('?')
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Card {
    type Err = HandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Card::new(s.trim())
    }
}

impl TryFrom<String> for Card {
    type Error = HandError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Card::new(value)
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        card.0
    }
}

/// Fails with [`HandError::DuplicateCard`] on the first token seen twice.
pub fn ensure_distinct<'a, I>(cards: I) -> Result<(), HandError>
where
    I: IntoIterator<Item = &'a Card>,
{
    let mut seen = HashSet::new();
    for c in cards {
        if !seen.insert(c) {
            return Err(HandError::DuplicateCard(c.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ascii_and_symbol_suits() {
        assert_eq!(Card::new("As").unwrap().as_str(), "As");
        let heart = Card::new("T♥").unwrap();
        assert_eq!(heart.rank(), 'T');
        assert_eq!(heart.suit(), '♥');
    }

    #[test]
    fn rejects_wrong_length_tokens() {
        for bad in ["", "A", "10s", "A ", "Ahh"] {
            assert!(
                matches!(Card::new(bad), Err(HandError::InvalidCard(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn serializes_as_plain_string() {
        let c: Card = "Kd".parse().unwrap();
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"Kd\"");
        let back: Card = serde_json::from_str("\"Kd\"").unwrap();
        assert_eq!(back, c);
        assert!(serde_json::from_str::<Card>("\"Kdd\"").is_err());
    }

    #[test]
    fn duplicate_tokens_are_reported() {
        let cards = [Card::new("As").unwrap(), Card::new("Kd").unwrap(), Card::new("As").unwrap()];
        assert_eq!(
            ensure_distinct(cards.iter()),
            Err(HandError::DuplicateCard("As".to_string()))
        );
        assert!(ensure_distinct(cards[..2].iter()).is_ok());
    }
}
