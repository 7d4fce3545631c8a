mod commands;
mod service;
mod view;

// Public API of the study subsystem.
pub use crate::error::StudyError;
pub use commands::{Command, CommandOutcome, ReviewResult};
pub use service::StudyService;
pub use view::{CardView, DetailLine, DueStatus, EntryRow, SessionStats, level_display};
