use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::CardId;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors that can occur while interpreting review input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error("unknown review outcome: {0:?} (expected again, good or easy)")]
    UnknownOutcome(String),
}

//
// ─── OUTCOME ──────────────────────────────────────────────────────────────────
//

/// Three-level result chosen by the learner after looking at the back of a card.
///
/// Each outcome maps to a fixed number of calendar days until the card is due:
/// - `Again`: 1 day
/// - `Good`: 3 days
/// - `Easy`: 7 days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Again,
    Good,
    Easy,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::Again, Outcome::Good, Outcome::Easy];

    /// Calendar days between the review date and the next due date.
    #[must_use]
    pub fn day_offset(self) -> u64 {
        match self {
            Outcome::Again => 1,
            Outcome::Good => 3,
            Outcome::Easy => 7,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Again => "again",
            Outcome::Good => "good",
            Outcome::Easy => "easy",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "again" => Ok(Self::Again),
            "good" => Ok(Self::Good),
            "easy" => Ok(Self::Easy),
            _ => Err(ReviewError::UnknownOutcome(s.to_owned())),
        }
    }
}

//
// ─── REVIEW LOG ───────────────────────────────────────────────────────────────
//

/// Record of a single review made during the running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewLog {
    pub card_id: CardId,
    pub outcome: Outcome,
    pub reviewed_on: NaiveDate,
    pub due_date: NaiveDate,
}

impl ReviewLog {
    #[must_use]
    pub fn new(
        card_id: CardId,
        outcome: Outcome,
        reviewed_on: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            card_id,
            outcome,
            reviewed_on,
            due_date,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
