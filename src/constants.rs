/// CAS（Compare-And-Swap）操作最大重试次数
pub const MAX_CAS_RETRIES: u32 = 20;

/// 新复习记录的初始间隔（天）
pub const DEFAULT_INTERVAL_DAYS: u32 = 1;

/// 新复习记录的初始易度因子
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// SM-2 易度因子下限
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// 复习间隔上限（天，约 5500 年），保证 `now + interval` 仍为四位数年份
pub const MAX_INTERVAL_DAYS: u32 = 2_000_000;

/// 低于此评分视为遗忘
pub const PASSING_GRADE: u8 = 3;

/// SM-2 最高评分
pub const MAX_GRADE: u8 = 5;

/// 前端“答对”映射的评分
pub const CORRECT_ANSWER_GRADE: u8 = 5;

/// 前端“答错”映射的评分
pub const INCORRECT_ANSWER_GRADE: u8 = 2;

/// 评分已提交但连续天数写入失败时附带的警告码
pub const STREAK_UPDATE_FAILED: &str = "STREAK_UPDATE_FAILED";
