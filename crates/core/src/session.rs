use chrono::NaiveDate;
use thiserror::Error;

use crate::model::IdiomCard;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("the deck has no cards")]
    EmptyDeck,

    #[error("card index {index} is out of range for a deck of {len} cards")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Navigation step through the deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Visible face of the current card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CardSide {
    #[default]
    Front,
    Back,
}

impl CardSide {
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            CardSide::Front => CardSide::Back,
            CardSide::Back => CardSide::Front,
        }
    }
}

/// Whether a stored due date is strictly before `today`.
///
/// Both sides are calendar dates, so a card due today is not overdue no matter
/// the time of day.
#[must_use]
pub fn is_overdue(due: NaiveDate, today: NaiveDate) -> bool {
    due < today
}

/// Cursor over a fixed, already-ordered deck.
///
/// The deck is never re-sorted after construction. The index always lies in
/// `[0, len)` for a non-empty deck and wraps on navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    deck: Vec<IdiomCard>,
    current: usize,
    side: CardSide,
}

impl SessionState {
    #[must_use]
    pub fn new(deck: Vec<IdiomCard>) -> Self {
        Self {
            deck,
            current: 0,
            side: CardSide::Front,
        }
    }

    #[must_use]
    pub fn deck(&self) -> &[IdiomCard] {
        &self.deck
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.deck.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deck.is_empty()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn side(&self) -> CardSide {
        self.side
    }

    /// The card at the current index.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyDeck` when there is nothing to show.
    pub fn current(&self) -> Result<&IdiomCard, SessionError> {
        self.deck.get(self.current).ok_or(SessionError::EmptyDeck)
    }

    /// Move one card forward or back, wrapping at either end.
    ///
    /// Always shows the front of the resulting card.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyDeck` on an empty deck.
    pub fn advance(&mut self, direction: Direction) -> Result<usize, SessionError> {
        let len = self.deck.len();
        if len == 0 {
            return Err(SessionError::EmptyDeck);
        }
        self.current = match direction {
            Direction::Next => (self.current + 1) % len,
            Direction::Previous => (self.current + len - 1) % len,
        };
        self.side = CardSide::Front;
        Ok(self.current)
    }

    /// Select a card directly, e.g. from the entries list.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::IndexOutOfRange` and leaves the state unchanged
    /// if `index` is not in `[0, len)`.
    pub fn jump_to(&mut self, index: usize) -> Result<(), SessionError> {
        let len = self.deck.len();
        if index >= len {
            return Err(SessionError::IndexOutOfRange { index, len });
        }
        self.current = index;
        self.side = CardSide::Front;
        Ok(())
    }

    /// Toggle between front and back of the current card.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyDeck` when there is no card to flip.
    pub fn flip(&mut self) -> Result<CardSide, SessionError> {
        if self.deck.is_empty() {
            return Err(SessionError::EmptyDeck);
        }
        self.side = self.side.flipped();
        Ok(self.side)
    }
}
