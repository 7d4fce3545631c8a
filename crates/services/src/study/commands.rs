use idiom_core::model::{Outcome, ReviewLog};
use idiom_core::session::{CardSide, Direction};

/// Named user actions the presentation shell can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Flip,
    Navigate(Direction),
    /// Zero-based position in the deck, as shown in the entries list.
    Select(usize),
    Review(Outcome),
    ToggleList,
}

impl Command {
    /// Look up an argument-less action by name.
    ///
    /// `select` takes an index and is not part of this table.
    #[must_use]
    pub fn from_action(name: &str) -> Option<Self> {
        let command = match name.trim().to_ascii_lowercase().as_str() {
            "flip" => Self::Flip,
            "next" | "skip" => Self::Navigate(Direction::Next),
            "previous" | "prev" | "back" => Self::Navigate(Direction::Previous),
            "again" => Self::Review(Outcome::Again),
            "good" => Self::Review(Outcome::Good),
            "easy" => Self::Review(Outcome::Easy),
            "list" => Self::ToggleList,
            _ => return None,
        };
        Some(command)
    }
}

/// Outcome of recording a review from the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewResult {
    pub log: ReviewLog,
    /// False when the store rejected the save; the new date is still kept in memory.
    pub persisted: bool,
    /// Index of the card shown after the review.
    pub next_index: usize,
}

/// What a dispatched command changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Flipped(CardSide),
    Moved { index: usize },
    Reviewed(ReviewResult),
    ListToggled { visible: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_table_covers_named_buttons() {
        assert_eq!(Command::from_action("flip"), Some(Command::Flip));
        assert_eq!(
            Command::from_action("Skip"),
            Some(Command::Navigate(Direction::Next))
        );
        assert_eq!(
            Command::from_action("back"),
            Some(Command::Navigate(Direction::Previous))
        );
        assert_eq!(
            Command::from_action(" good "),
            Some(Command::Review(Outcome::Good))
        );
        assert_eq!(Command::from_action("list"), Some(Command::ToggleList));
        assert_eq!(Command::from_action("select"), None);
        assert_eq!(Command::from_action("hard"), None);
    }
}
