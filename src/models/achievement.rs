// src/models/achievement.rs

use serde::Serialize;

/// One row of the achievements page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AchievementStatus {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub unlocked: bool,
    /// True when this evaluation unlocked it for the first time.
    pub newly_unlocked: bool,
}

#[derive(Debug, Serialize)]
pub struct AchievementsResponse {
    pub achievements: Vec<AchievementStatus>,
    pub unlocked_count: usize,
    pub total_count: usize,
    pub progress_percentage: u32,
}
