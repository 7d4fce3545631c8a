#![forbid(unsafe_code)]

pub mod error;
pub mod study;

pub use idiom_core::Clock;

pub use error::StudyError;
pub use study::{
    CardView, Command, CommandOutcome, DetailLine, DueStatus, EntryRow, ReviewResult,
    SessionStats, StudyService, level_display,
};
