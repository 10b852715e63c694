/// Application name
pub const APP_NAME: &str = "Ruah Ignis";

/// Hosted store collection names
pub const TABLE_PROFILES: &str = "profiles";
pub const TABLE_PRAYERS: &str = "prayers";
pub const TABLE_MESSAGES: &str = "messages";
pub const TABLE_DAILY_QUIZ: &str = "daily_quiz";
pub const TABLE_QUIZ_ANSWERS: &str = "quiz_answers";

/// Maximum chat message length in characters
pub const MAX_MESSAGE_LEN: usize = 2_000;

/// Default leaderboard page size
pub const LEADERBOARD_LIMIT: u32 = 50;

/// Default chat history page size
pub const CHAT_PAGE_LIMIT: u32 = 50;

/// Badge thresholds (streak length in days)
pub const EMBER_MIN_STREAK: u32 = 4;
pub const TORCH_MIN_STREAK: u32 = 11;
pub const BLAZE_MIN_STREAK: u32 = 21;

/// File name of the locally persisted session identifier
pub const SESSION_FILE_NAME: &str = "session_id";

/// File name of the locally persisted theme preference
pub const THEME_FILE_NAME: &str = "theme";
