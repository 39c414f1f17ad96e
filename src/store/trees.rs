pub const REVIEWS: &str = "reviews";
pub const REVIEW_DUE_INDEX: &str = "review_due_index";
pub const STREAKS: &str = "streaks";
pub const LESSON_PROGRESS: &str = "lesson_progress";
pub const CONFIG_VERSIONS: &str = "config_versions";
