mod card;
mod ids;
mod progress;
mod review;

pub use card::{IdiomCard, non_blank};
pub use ids::{CardId, ParseIdError};
pub use progress::{ProgressEntry, ProgressMap};
pub use review::{Outcome, ReviewError, ReviewLog};
