use serde::{Deserialize, Serialize};

use crate::model::ids::CardId;

//
// ─── CARD TYPES ────────────────────────────────────────────────────────────────
//

/// One idiom record from the dataset.
///
/// Identity is `id`; every other field is display data. Optional fields are
/// `None` when the dataset cell is missing or blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdiomCard {
    pub id: CardId,
    pub idiom: String,
    pub emoji: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub image: Option<String>,
    pub meaning: Option<String>,
    pub business_example: Option<String>,
    pub cantonese_note: Option<String>,
    pub related_idiom: Option<String>,
}

impl IdiomCard {
    /// Creates a card with only the required fields set.
    #[must_use]
    pub fn new(id: CardId, idiom: impl Into<String>) -> Self {
        Self {
            id,
            idiom: idiom.into(),
            emoji: None,
            category: None,
            level: None,
            image: None,
            meaning: None,
            business_example: None,
            cantonese_note: None,
            related_idiom: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> &CardId {
        &self.id
    }

    #[must_use]
    pub fn with_meaning(mut self, meaning: impl Into<String>) -> Self {
        self.meaning = non_blank(meaning.into());
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = non_blank(category.into());
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = non_blank(level.into());
        self
    }

    #[must_use]
    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = non_blank(emoji.into());
        self
    }
}

/// Maps blank text to `None`, trimming surrounding whitespace otherwise.
#[must_use]
pub fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_owned())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_optional_fields_are_absent() {
        let card = IdiomCard::new(CardId::from(1), "Break the ice")
            .with_meaning("   ")
            .with_category(" Social ");

        assert_eq!(card.meaning, None);
        assert_eq!(card.category.as_deref(), Some("Social"));
        assert_eq!(card.id(), &CardId::new("1"));
    }
}
