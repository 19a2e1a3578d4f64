// src/analytics/progress.rs

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
    config::RECENT_QUIZ_LIMIT,
    error::AppError,
    models::{
        question::QuestionRecord,
        quiz::{Difficulty, QuizAttempt},
        user::UserStatistics,
    },
};

/// Time ranges offered on the progress page, in days.
pub const ALLOWED_RANGES: [u32; 3] = [7, 30, 90];
pub const DEFAULT_RANGE: u32 = 30;

#[derive(Debug, Deserialize)]
pub struct ProgressParams {
    pub days: Option<u32>,
}

impl ProgressParams {
    pub fn range(&self) -> Result<u32, AppError> {
        let days = self.days.unwrap_or(DEFAULT_RANGE);
        if ALLOWED_RANGES.contains(&days) {
            Ok(days)
        } else {
            Err(AppError::BadRequest(format!(
                "days must be one of {:?}",
                ALLOWED_RANGES
            )))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub quizzes: usize,
    /// Rounded average score of the day, 0 without attempts.
    pub score: u32,
    pub questions: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicPerformance {
    pub topic: String,
    pub accuracy: u32,
    pub total: u32,
    pub correct: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifficultyPerformance {
    pub difficulty: Difficulty,
    pub accuracy: u32,
    pub total: u32,
    pub correct: u32,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub days: u32,
    pub accuracy: u32,
    pub statistics: UserStatistics,
    pub daily: Vec<DailyPoint>,
    pub topics: Vec<TopicPerformance>,
    pub difficulties: Vec<DifficultyPerformance>,
    pub recent_quizzes: Vec<QuizAttempt>,
}

fn percent(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (f64::from(correct) / f64::from(total) * 100.0).round() as u32
}

/// One point per day for the `days` days ending on `today`, oldest first.
pub fn daily_series(quizzes: &[QuizAttempt], days: u32, today: NaiveDate) -> Vec<DailyPoint> {
    (0..days)
        .map(|i| {
            let date = today - Duration::days(i64::from(days - 1 - i));
            let day_quizzes: Vec<&QuizAttempt> = quizzes
                .iter()
                .filter(|q| q.completed_at.date_naive() == date)
                .collect();

            let score = if day_quizzes.is_empty() {
                0
            } else {
                let sum: u32 = day_quizzes.iter().map(|q| q.score_percentage).sum();
                (f64::from(sum) / day_quizzes.len() as f64).round() as u32
            };

            DailyPoint {
                date,
                quizzes: day_quizzes.len(),
                score,
                questions: day_quizzes.iter().map(|q| q.total_questions).sum(),
            }
        })
        .collect()
}

/// Accuracy per topic, best first. Ties keep topic name order.
pub fn topic_performance(questions: &[QuestionRecord]) -> Vec<TopicPerformance> {
    let mut tally: BTreeMap<&str, (u32, u32)> = BTreeMap::new();
    for q in questions {
        let entry = tally.entry(q.topic.as_str()).or_default();
        entry.0 += 1;
        if q.is_correct {
            entry.1 += 1;
        }
    }

    let mut performance: Vec<TopicPerformance> = tally
        .into_iter()
        .map(|(topic, (total, correct))| TopicPerformance {
            topic: topic.to_string(),
            accuracy: percent(correct, total),
            total,
            correct,
        })
        .collect();
    performance.sort_by(|a, b| b.accuracy.cmp(&a.accuracy));
    performance
}

/// Accuracy per difficulty, easy to hard.
pub fn difficulty_performance(questions: &[QuestionRecord]) -> Vec<DifficultyPerformance> {
    let mut tally: BTreeMap<Difficulty, (u32, u32)> = BTreeMap::new();
    for q in questions {
        let entry = tally.entry(q.difficulty).or_default();
        entry.0 += 1;
        if q.is_correct {
            entry.1 += 1;
        }
    }

    tally
        .into_iter()
        .map(|(difficulty, (total, correct))| DifficultyPerformance {
            difficulty,
            accuracy: percent(correct, total),
            total,
            correct,
        })
        .collect()
}

pub fn build(
    statistics: &UserStatistics,
    quizzes: &[QuizAttempt],
    questions: &[QuestionRecord],
    days: u32,
    today: NaiveDate,
) -> ProgressResponse {
    ProgressResponse {
        days,
        accuracy: statistics.accuracy(),
        statistics: statistics.clone(),
        daily: daily_series(quizzes, days, today),
        topics: topic_performance(questions),
        difficulties: difficulty_performance(questions),
        recent_quizzes: quizzes.iter().take(RECENT_QUIZ_LIMIT).cloned().collect(),
    }
}
