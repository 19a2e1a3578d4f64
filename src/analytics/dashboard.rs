// src/analytics/dashboard.rs

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::{
    config::{DEFAULT_DAILY_GOAL, RECENT_QUIZ_LIMIT},
    models::{quiz::QuizAttempt, user::User},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyStats {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub quizzes_this_week: usize,
    pub questions_this_week: u32,
    pub average_score: f64,
    pub weekly_goal: u32,
    /// Share of the weekly goal reached, in percent. May exceed 100.
    pub progress: f64,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub full_name: String,
    pub avatar_url: String,
    pub accuracy: u32,
    pub total_quizzes: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub badge_count: usize,
    pub weekly: WeeklyStats,
    pub recent_quizzes: Vec<QuizAttempt>,
}

/// Sunday-to-Saturday week containing `day`.
pub fn week_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = day - Duration::days(i64::from(day.weekday().num_days_from_sunday()));
    (start, start + Duration::days(6))
}

pub fn weekly_stats(quizzes: &[QuizAttempt], daily_goal: u32, now: DateTime<Utc>) -> WeeklyStats {
    let (week_start, week_end) = week_bounds(now.date_naive());

    let this_week: Vec<&QuizAttempt> = quizzes
        .iter()
        .filter(|q| {
            let day = q.completed_at.date_naive();
            day >= week_start && day <= week_end
        })
        .collect();

    let questions_this_week: u32 = this_week.iter().map(|q| q.total_questions).sum();
    let average_score = if this_week.is_empty() {
        0.0
    } else {
        this_week.iter().map(|q| f64::from(q.score_percentage)).sum::<f64>() / this_week.len() as f64
    };

    let weekly_goal = daily_goal * 7;
    let progress = if weekly_goal > 0 {
        f64::from(questions_this_week) / f64::from(weekly_goal) * 100.0
    } else {
        0.0
    };

    WeeklyStats {
        week_start,
        week_end,
        quizzes_this_week: this_week.len(),
        questions_this_week,
        average_score,
        weekly_goal,
        progress,
        message: if questions_this_week > 0 {
            "You're on your way to greatness!"
        } else {
            "Let's get started! Your journey begins now!"
        },
    }
}

/// Builds the dashboard from the user and their attempts (newest first).
pub fn build(user: &User, quizzes: &[QuizAttempt], now: DateTime<Utc>) -> DashboardResponse {
    let stats = &user.statistics;
    let daily_goal = user
        .learning_preferences
        .daily_goal
        .unwrap_or(DEFAULT_DAILY_GOAL);

    DashboardResponse {
        full_name: user.full_name.clone(),
        avatar_url: user.avatar_url.clone(),
        accuracy: stats.accuracy(),
        total_quizzes: stats.total_quizzes,
        current_streak: stats.current_streak,
        longest_streak: stats.longest_streak,
        badge_count: stats.badges.len(),
        weekly: weekly_stats(quizzes, daily_goal, now),
        recent_quizzes: quizzes.iter().take(RECENT_QUIZ_LIMIT).cloned().collect(),
    }
}
