// src/analytics/achievements.rs

//! Badge rules. Every badge is a row in [`ACHIEVEMENTS`] and all rows go
//! through the same [`AchievementRule::is_met`].

use std::collections::{BTreeSet, HashSet};

use crate::models::{
    achievement::{AchievementStatus, AchievementsResponse},
    quiz::QuizAttempt,
    user::UserStatistics,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AchievementRule {
    /// At least this many attempts.
    QuizCount(usize),
    /// At least `count` attempts scoring `min_score` or more.
    ScoreAtLeastCount { min_score: u32, count: usize },
    LongestStreak(u32),
    /// Overall accuracy over at least `min_questions` answered questions.
    OverallAccuracy { min_questions: u32, min_accuracy: u32 },
    DistinctTopics(usize),
    /// One attempt with enough questions finished strictly under the limit.
    FastQuiz { min_questions: u32, max_seconds: u32 },
}

impl AchievementRule {
    pub fn is_met(&self, stats: &UserStatistics, quizzes: &[QuizAttempt]) -> bool {
        match *self {
            AchievementRule::QuizCount(n) => quizzes.len() >= n,
            AchievementRule::ScoreAtLeastCount { min_score, count } => {
                quizzes
                    .iter()
                    .filter(|q| q.score_percentage >= min_score)
                    .count()
                    >= count
            }
            AchievementRule::LongestStreak(n) => stats.longest_streak >= n,
            AchievementRule::OverallAccuracy {
                min_questions,
                min_accuracy,
            } => {
                stats.total_questions >= min_questions
                    && u64::from(stats.correct_answers) * 100
                        >= u64::from(min_accuracy) * u64::from(stats.total_questions)
            }
            AchievementRule::DistinctTopics(n) => {
                quizzes
                    .iter()
                    .flat_map(|q| q.topics.iter())
                    .collect::<HashSet<_>>()
                    .len()
                    >= n
            }
            AchievementRule::FastQuiz {
                min_questions,
                max_seconds,
            } => quizzes.iter().any(|q| {
                q.total_questions >= min_questions
                    && q.time_taken.is_some_and(|secs| secs < max_seconds)
            }),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AchievementDefinition {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub rule: AchievementRule,
}

pub const ACHIEVEMENTS: [AchievementDefinition; 10] = [
    AchievementDefinition {
        id: "first_quiz",
        title: "First Steps",
        description: "Complete your first quiz",
        rule: AchievementRule::QuizCount(1),
    },
    AchievementDefinition {
        id: "quiz_master_10",
        title: "Quiz Master",
        description: "Complete 10 quizzes",
        rule: AchievementRule::QuizCount(10),
    },
    AchievementDefinition {
        id: "quiz_legend_50",
        title: "Quiz Legend",
        description: "Complete 50 quizzes",
        rule: AchievementRule::QuizCount(50),
    },
    AchievementDefinition {
        id: "perfect_score",
        title: "Perfectionist",
        description: "Score 100% on any quiz",
        rule: AchievementRule::ScoreAtLeastCount {
            min_score: 100,
            count: 1,
        },
    },
    AchievementDefinition {
        id: "high_scorer",
        title: "High Achiever",
        description: "Score 90% or higher on 5 quizzes",
        rule: AchievementRule::ScoreAtLeastCount {
            min_score: 90,
            count: 5,
        },
    },
    AchievementDefinition {
        id: "streak_7",
        title: "Week Warrior",
        description: "Maintain a 7-day learning streak",
        rule: AchievementRule::LongestStreak(7),
    },
    AchievementDefinition {
        id: "streak_30",
        title: "Monthly Marvel",
        description: "Maintain a 30-day learning streak",
        rule: AchievementRule::LongestStreak(30),
    },
    AchievementDefinition {
        id: "accuracy_master",
        title: "Accuracy Master",
        description: "Maintain 80%+ overall accuracy with 100+ questions",
        rule: AchievementRule::OverallAccuracy {
            min_questions: 100,
            min_accuracy: 80,
        },
    },
    AchievementDefinition {
        id: "diverse_learner",
        title: "Diverse Learner",
        description: "Complete quizzes in 5 different topics",
        rule: AchievementRule::DistinctTopics(5),
    },
    AchievementDefinition {
        id: "speed_demon",
        title: "Speed Demon",
        description: "Complete a 20-question quiz in under 10 minutes",
        rule: AchievementRule::FastQuiz {
            min_questions: 20,
            max_seconds: 600,
        },
    },
];

/// Outcome of one evaluation pass.
#[derive(Debug)]
pub struct Evaluation {
    pub response: AchievementsResponse,
    /// Badge set including anything unlocked by this pass.
    pub badges: BTreeSet<String>,
    /// Whether `badges` differs from what the user already had.
    pub changed: bool,
}

/// Evaluates every rule. Badges already held stay unlocked even if their
/// rule no longer holds.
pub fn evaluate(stats: &UserStatistics, quizzes: &[QuizAttempt]) -> Evaluation {
    let mut badges = stats.badges.clone();
    let mut changed = false;

    let achievements: Vec<AchievementStatus> = ACHIEVEMENTS
        .iter()
        .map(|def| {
            let held = badges.contains(def.id);
            let met = def.rule.is_met(stats, quizzes);
            let newly_unlocked = met && !held;
            if newly_unlocked {
                badges.insert(def.id.to_string());
                changed = true;
            }
            AchievementStatus {
                id: def.id,
                title: def.title,
                description: def.description,
                unlocked: held || met,
                newly_unlocked,
            }
        })
        .collect();

    let unlocked_count = achievements.iter().filter(|a| a.unlocked).count();
    let total_count = achievements.len();

    Evaluation {
        response: AchievementsResponse {
            achievements,
            unlocked_count,
            total_count,
            progress_percentage: (unlocked_count as f64 / total_count as f64 * 100.0).round() as u32,
        },
        badges,
        changed,
    }
}
