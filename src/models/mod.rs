pub mod checkin;
pub mod log;
pub mod profile;
pub mod saved;

pub use checkin::CheckIn;
pub use log::{LoggedBlock, LoggedSet, WorkoutLog};
pub use profile::{Goal, Profile, StageKey, StageMode};
pub use saved::SavedEntry;
