use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use idiom_core::model::{IdiomCard, Outcome, ProgressMap, ReviewLog};
use idiom_core::scheduler::Scheduler;
use idiom_core::session::{Direction, SessionState, is_overdue};
use storage::ProgressStore;
use tracing::{debug, info, warn};

use super::commands::{Command, CommandOutcome, ReviewResult};
use super::view::{CardView, DueStatus, EntryRow, SessionStats};
use crate::Clock;
use crate::error::StudyError;

//
// ─── STUDY SERVICE ─────────────────────────────────────────────────────────────
//

/// One study session over a fixed deck.
///
/// Owns the ordered deck, the navigation state and the in-memory progress
/// map. Every review is written through to the progress store before the
/// session moves on. The deck order is computed once in [`StudyService::start`]
/// and never changes afterwards, even when due dates do.
pub struct StudyService {
    clock: Clock,
    store: Arc<dyn ProgressStore>,
    progress: ProgressMap,
    session: SessionState,
    reviews: Vec<ReviewLog>,
    list_visible: bool,
}

impl StudyService {
    /// Load progress and order `records` into a new session.
    ///
    /// An unreachable store is not fatal: the session starts with empty
    /// progress.
    pub async fn start(records: Vec<IdiomCard>, store: Arc<dyn ProgressStore>, clock: Clock) -> Self {
        let progress = match store.load().await {
            Ok(progress) => progress,
            Err(err) => {
                warn!(error = %err, "progress store unavailable, starting from empty progress");
                ProgressMap::new()
            }
        };

        let deck = Scheduler::initial_order(records, &progress);
        info!(
            cards = deck.len(),
            tracked = progress.len(),
            today = %clock.today(),
            "study session started"
        );

        Self {
            clock,
            store,
            progress,
            session: SessionState::new(deck),
            reviews: Vec::new(),
            list_visible: false,
        }
    }

    /// Read the dataset at `path`, then [`StudyService::start`].
    ///
    /// # Errors
    ///
    /// Returns `StudyError::Dataset` if the dataset cannot be read or parsed.
    pub async fn start_from_dataset(
        path: impl AsRef<Path>,
        store: Arc<dyn ProgressStore>,
        clock: Clock,
    ) -> Result<Self, StudyError> {
        let records = storage::load_dataset(path).await?;
        Ok(Self::start(records, store, clock).await)
    }

    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressMap {
        &self.progress
    }

    #[must_use]
    pub fn reviews(&self) -> &[ReviewLog] {
        &self.reviews
    }

    #[must_use]
    pub fn is_list_visible(&self) -> bool {
        self.list_visible
    }

    /// Run one named user action against the session.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::Session` for an empty deck or an out-of-range
    /// selection; the session is unchanged in both cases.
    pub async fn dispatch(&mut self, command: Command) -> Result<CommandOutcome, StudyError> {
        debug!(?command, index = self.session.current_index(), "dispatch");
        match command {
            Command::Flip => Ok(CommandOutcome::Flipped(self.session.flip()?)),
            Command::Navigate(direction) => {
                let index = self.session.advance(direction)?;
                Ok(CommandOutcome::Moved { index })
            }
            Command::Select(index) => {
                self.session.jump_to(index)?;
                Ok(CommandOutcome::Moved { index })
            }
            Command::Review(outcome) => Ok(CommandOutcome::Reviewed(self.review(outcome).await?)),
            Command::ToggleList => {
                self.list_visible = !self.list_visible;
                Ok(CommandOutcome::ListToggled {
                    visible: self.list_visible,
                })
            }
        }
    }

    /// Record `outcome` for the current card, persist, and move to the next card.
    ///
    /// A failed save is logged and reported through `ReviewResult::persisted`;
    /// the session keeps the new due date and continues.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::Session(EmptyDeck)` when there is no card, or
    /// `StudyError::Scheduler` if the due date overflows.
    pub async fn review(&mut self, outcome: Outcome) -> Result<ReviewResult, StudyError> {
        let card_id = self.session.current()?.id().clone();
        let today = self.clock.today();
        let log = Scheduler::record_review(&card_id, outcome, today, &mut self.progress)?;

        let persisted = match self.store.save(&self.progress).await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, card = %card_id, "failed to persist progress");
                false
            }
        };
        info!(card = %card_id, %outcome, due = %log.due_date, persisted, "review recorded");

        self.reviews.push(log.clone());
        let next_index = self.session.advance(Direction::Next)?;

        Ok(ReviewResult {
            log,
            persisted,
            next_index,
        })
    }

    /// View model for the current card.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::Session(EmptyDeck)` when there is nothing to show.
    pub fn card_view(&self) -> Result<CardView, StudyError> {
        let card = self.session.current()?;
        Ok(CardView::build(
            card,
            self.session.current_index(),
            self.session.len(),
            self.session.side(),
            DueStatus::for_card(card.id(), &self.progress, self.today()),
        ))
    }

    /// Rows of the entries list, in deck order, with the current card highlighted.
    #[must_use]
    pub fn entries(&self) -> Vec<EntryRow> {
        let today = self.today();
        let current = self.session.current_index();
        self.session
            .deck()
            .iter()
            .enumerate()
            .map(|(index, card)| EntryRow {
                index,
                id: card.id().clone(),
                idiom: card.idiom.clone(),
                due: DueStatus::for_card(card.id(), &self.progress, today),
                highlighted: index == current,
            })
            .collect()
    }

    #[must_use]
    pub fn stats(&self) -> SessionStats {
        let today = self.today();
        let mut stats = SessionStats {
            total: self.session.len(),
            reviewed: self.reviews.len(),
            ..SessionStats::default()
        };
        for card in self.session.deck() {
            match self.progress.due_date(card.id()) {
                Some(due) => {
                    if due <= today {
                        stats.due_now += 1;
                    }
                    if is_overdue(due, today) {
                        stats.overdue += 1;
                    }
                }
                None => stats.unseen += 1,
            }
        }
        stats
    }
}
