use chrono::NaiveDate;
use std::fmt;

use idiom_core::model::{CardId, IdiomCard, ProgressMap};
use idiom_core::session::{CardSide, is_overdue};
use idiom_core::time::format_date;

const DEFAULT_BACK_EMOJI: &str = "🌈✨";

/// Render a difficulty level as stars; unknown levels are shown verbatim.
#[must_use]
pub fn level_display(level: &str) -> String {
    match level {
        "Easy" => "⭐".to_owned(),
        "Medium" => "⭐⭐".to_owned(),
        "Hard" => "⭐⭐⭐".to_owned(),
        other => other.to_owned(),
    }
}

/// Due-date column of the entries list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    Unseen,
    Due { date: NaiveDate, overdue: bool },
}

impl DueStatus {
    #[must_use]
    pub fn for_card(id: &CardId, progress: &ProgressMap, today: NaiveDate) -> Self {
        match progress.due_date(id) {
            Some(date) => DueStatus::Due {
                date,
                overdue: is_overdue(date, today),
            },
            None => DueStatus::Unseen,
        }
    }

    #[must_use]
    pub fn is_overdue(&self) -> bool {
        matches!(self, DueStatus::Due { overdue: true, .. })
    }
}

impl fmt::Display for DueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DueStatus::Unseen => f.pad("Unseen"),
            DueStatus::Due { date, .. } => f.pad(&format_date(*date)),
        }
    }
}

/// One labelled line on the back of a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailLine {
    pub label: &'static str,
    pub text: String,
}

/// Everything the shell needs to draw the current card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub index: usize,
    pub total: usize,
    pub side: CardSide,
    pub id: CardId,
    pub front_text: String,
    pub category: Option<String>,
    pub level: Option<String>,
    pub image: Option<String>,
    pub back_emoji: String,
    /// Only fields present in the dataset are listed.
    pub details: Vec<DetailLine>,
    pub due: DueStatus,
}

impl CardView {
    #[must_use]
    pub fn build(
        card: &IdiomCard,
        index: usize,
        total: usize,
        side: CardSide,
        due: DueStatus,
    ) -> Self {
        let front_text = match card.emoji.as_deref() {
            Some(emoji) => format!("{} {emoji}", card.idiom).trim().to_owned(),
            None => card.idiom.trim().to_owned(),
        };

        let details = [
            ("Meaning", &card.meaning),
            ("Example", &card.business_example),
            ("Cantonese", &card.cantonese_note),
            ("Related", &card.related_idiom),
        ]
        .into_iter()
        .filter_map(|(label, value)| {
            value.as_ref().map(|text| DetailLine {
                label,
                text: text.clone(),
            })
        })
        .collect();

        Self {
            index,
            total,
            side,
            id: card.id().clone(),
            front_text,
            category: card.category.clone(),
            level: card.level.as_deref().map(level_display),
            image: card.image.clone(),
            back_emoji: card
                .emoji
                .clone()
                .unwrap_or_else(|| DEFAULT_BACK_EMOJI.to_owned()),
            details,
            due,
        }
    }
}

/// One row of the navigable entries list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRow {
    pub index: usize,
    pub id: CardId,
    pub idiom: String,
    pub due: DueStatus,
    pub highlighted: bool,
}

/// Counts shown alongside the deck.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub total: usize,
    /// Due today or earlier.
    pub due_now: usize,
    pub overdue: usize,
    pub unseen: usize,
    pub reviewed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn level_stars_fall_back_to_raw_text() {
        assert_eq!(level_display("Easy"), "⭐");
        assert_eq!(level_display("Medium"), "⭐⭐");
        assert_eq!(level_display("Hard"), "⭐⭐⭐");
        assert_eq!(level_display("Expert"), "Expert");
    }

    #[test]
    fn card_view_omits_missing_details() {
        let card = IdiomCard::new(CardId::from(1), "Break the ice")
            .with_meaning("Start a conversation")
            .with_level("Medium");

        let view = CardView::build(&card, 0, 3, CardSide::Front, DueStatus::Unseen);

        assert_eq!(view.front_text, "Break the ice");
        assert_eq!(view.back_emoji, "🌈✨");
        assert_eq!(view.level.as_deref(), Some("⭐⭐"));
        assert_eq!(
            view.details,
            vec![DetailLine {
                label: "Meaning",
                text: "Start a conversation".into()
            }]
        );
        assert_eq!(view.category, None);
    }

    #[test]
    fn emoji_is_appended_to_front_text() {
        let card = IdiomCard::new(CardId::from(1), "Break the ice").with_emoji("🧊");
        let view = CardView::build(&card, 0, 1, CardSide::Back, DueStatus::Unseen);
        assert_eq!(view.front_text, "Break the ice 🧊");
        assert_eq!(view.back_emoji, "🧊");
    }

    #[test]
    fn due_status_marks_only_past_dates_overdue() {
        let id = CardId::from(1);
        let today = day(2024, 1, 2);
        let mut progress = ProgressMap::new();

        assert_eq!(DueStatus::for_card(&id, &progress, today), DueStatus::Unseen);
        assert_eq!(DueStatus::Unseen.to_string(), "Unseen");

        for (due, overdue) in [(day(2024, 1, 1), true), (today, false), (day(2024, 1, 3), false)] {
            progress.set_due_date(&id, due);
            let status = DueStatus::for_card(&id, &progress, today);
            assert_eq!(status.is_overdue(), overdue, "due {due}");
            assert_eq!(status.to_string(), format_date(due));
        }
    }
}
