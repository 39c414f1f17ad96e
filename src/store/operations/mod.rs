pub mod progress;
pub mod reviews;
pub mod streaks;
