use chrono::{Days, NaiveDate};
use thiserror::Error;

use crate::model::{CardId, IdiomCard, Outcome, ProgressMap, ReviewLog};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("due date out of range: {today} + {days} days")]
    DateOutOfRange { today: NaiveDate, days: u64 },
}

//
// ─── SCHEDULER ─────────────────────────────────────────────────────────────────
//

/// Fixed-offset due-date scheduler.
///
/// There are no ease factors or intervals: an outcome always moves a card to
/// `today + {1, 3, 7}` days. "Today" is always passed in by the caller so the
/// scheduler never reads the wall clock.
///
/// # Examples
///
/// ```
/// # use idiom_core::scheduler::Scheduler;
/// # use idiom_core::model::Outcome;
/// # use chrono::NaiveDate;
/// let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
/// let due = Scheduler::next_due_date(Outcome::Good, today)?;
/// assert_eq!(due.to_string(), "2024-01-05");
/// # Ok::<(), idiom_core::scheduler::SchedulerError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Scheduler;

impl Scheduler {
    /// Sort dataset records into the session deck.
    ///
    /// Cards with a stored due date come first, earliest date first. Cards
    /// without one follow in dataset order. The sort is stable, so equal due
    /// dates also keep dataset order.
    #[must_use]
    pub fn initial_order(records: Vec<IdiomCard>, progress: &ProgressMap) -> Vec<IdiomCard> {
        let mut deck = records;
        // `None` must sort after every date, so key on (is_unseen, date).
        deck.sort_by_key(|card| {
            let due = progress.due_date(card.id());
            (due.is_none(), due)
        });
        deck
    }

    /// Next due date for a review made on `today`.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::DateOutOfRange` if the result cannot be
    /// represented as a calendar date.
    pub fn next_due_date(outcome: Outcome, today: NaiveDate) -> Result<NaiveDate, SchedulerError> {
        let days = outcome.day_offset();
        today
            .checked_add_days(Days::new(days))
            .ok_or(SchedulerError::DateOutOfRange { today, days })
    }

    /// Apply a review to the in-memory progress map.
    ///
    /// Creates the card's progress entry on its first review. The caller is
    /// responsible for persisting `progress` afterwards.
    ///
    /// # Errors
    ///
    /// Propagates `SchedulerError` from [`Scheduler::next_due_date`]; `progress`
    /// is left untouched in that case.
    pub fn record_review(
        card_id: &CardId,
        outcome: Outcome,
        today: NaiveDate,
        progress: &mut ProgressMap,
    ) -> Result<ReviewLog, SchedulerError> {
        let due_date = Self::next_due_date(outcome, today)?;
        progress.set_due_date(card_id, due_date);
        Ok(ReviewLog::new(card_id.clone(), outcome, today, due_date))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProgressEntry;
    use crate::time::{fixed_today, format_date};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn cards(ids: &[u64]) -> Vec<IdiomCard> {
        ids.iter()
            .map(|id| IdiomCard::new(CardId::from(*id), format!("idiom {id}")))
            .collect()
    }

    fn ids(deck: &[IdiomCard]) -> Vec<String> {
        deck.iter().map(|card| card.id().to_string()).collect()
    }

    #[test]
    fn dated_cards_come_before_unseen_cards() {
        let progress: ProgressMap = [(CardId::from(2), ProgressEntry::due_on(day(2024, 1, 1)))]
            .into_iter()
            .collect();

        let deck = Scheduler::initial_order(cards(&[1, 2, 3]), &progress);

        assert_eq!(ids(&deck), vec!["2", "1", "3"]);
    }

    #[test]
    fn unseen_cards_keep_dataset_order() {
        let progress: ProgressMap = [
            (CardId::from(5), ProgressEntry::due_on(day(2024, 3, 1))),
            (CardId::from(3), ProgressEntry::due_on(day(2024, 1, 9))),
            (CardId::from(8), ProgressEntry::default()),
        ]
        .into_iter()
        .collect();

        let deck = Scheduler::initial_order(cards(&[9, 8, 5, 7, 3, 1]), &progress);

        assert_eq!(ids(&deck), vec!["3", "5", "9", "8", "7", "1"]);
    }

    #[test]
    fn equal_due_dates_keep_dataset_order() {
        let same = day(2024, 1, 4);
        let progress: ProgressMap = [4_u64, 2, 6]
            .into_iter()
            .map(|id| (CardId::from(id), ProgressEntry::due_on(same)))
            .collect();

        let deck = Scheduler::initial_order(cards(&[6, 1, 4, 2]), &progress);

        assert_eq!(ids(&deck), vec!["6", "4", "2", "1"]);
    }

    #[test]
    fn empty_dataset_orders_to_empty_deck() {
        let deck = Scheduler::initial_order(Vec::new(), &ProgressMap::new());
        assert!(deck.is_empty());
    }

    #[test]
    fn outcomes_add_fixed_calendar_days() {
        let today = day(2024, 2, 27);
        assert_eq!(Scheduler::next_due_date(Outcome::Again, today).unwrap(), day(2024, 2, 28));
        assert_eq!(Scheduler::next_due_date(Outcome::Good, today).unwrap(), day(2024, 3, 1));
        assert_eq!(Scheduler::next_due_date(Outcome::Easy, today).unwrap(), day(2024, 3, 5));
    }

    #[test]
    fn offsets_cross_year_boundary() {
        let due = Scheduler::next_due_date(Outcome::Easy, day(2023, 12, 29)).unwrap();
        assert_eq!(format_date(due), "2024-01-05");
    }

    #[test]
    fn next_due_date_reports_overflow() {
        let err = Scheduler::next_due_date(Outcome::Again, NaiveDate::MAX).unwrap_err();
        assert_eq!(
            err,
            SchedulerError::DateOutOfRange {
                today: NaiveDate::MAX,
                days: 1
            }
        );
    }

    #[test]
    fn record_review_creates_entry_for_unseen_card() {
        let mut progress = ProgressMap::new();
        let card = CardId::from(2);

        let log = Scheduler::record_review(&card, Outcome::Good, fixed_today(), &mut progress)
            .unwrap();

        assert_eq!(progress.due_date(&card), Some(day(2024, 1, 5)));
        assert_eq!(log.due_date, day(2024, 1, 5));
        assert_eq!(log.reviewed_on, fixed_today());
        assert_eq!(log.outcome, Outcome::Good);
    }

    #[test]
    fn record_review_overwrites_existing_date() {
        let card = CardId::from(1);
        let mut progress: ProgressMap = [(card.clone(), ProgressEntry::due_on(day(2030, 1, 1)))]
            .into_iter()
            .collect();

        Scheduler::record_review(&card, Outcome::Again, fixed_today(), &mut progress).unwrap();

        assert_eq!(progress.due_date(&card), Some(day(2024, 1, 3)));
        assert_eq!(progress.len(), 1);
    }
}
