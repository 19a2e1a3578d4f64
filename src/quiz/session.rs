// src/quiz/session.rs

//! Per-user quiz slots: the builder → runner hand-off and the live runners.

use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::{
    error::AppError,
    models::{staged::StagedQuiz, user::CurrentUser},
    quiz::{
        recorder,
        runner::{Countdown, QuizResult, QuizRunner, SubmitStart, Submission},
    },
    state::AppState,
};

pub type SharedRunner = Arc<Mutex<QuizRunner>>;

/// Staged quizzes waiting to be played and the runners being played.
///
/// A staged quiz is a typed value moved into exactly one runner: staging
/// replaces whatever was waiting, and starting takes it out of the slot.
///
/// Both maps hold at most one entry per user. A completed runner stays in
/// place so its result can still be read, until the next quiz replaces it.
#[derive(Clone, Default)]
pub struct QuizSessions {
    staged: Arc<Mutex<HashMap<String, StagedQuiz>>>,
    runners: Arc<Mutex<HashMap<String, SharedRunner>>>,
}

impl QuizSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn stage(&self, user_id: &str, quiz: StagedQuiz) {
        self.staged.lock().await.insert(user_id.to_string(), quiz);
    }

    /// Removes and returns the staged quiz, if any.
    pub async fn take_staged(&self, user_id: &str) -> Option<StagedQuiz> {
        self.staged.lock().await.remove(user_id)
    }

    /// Makes `runner` the user's active runner. A previous runner is
    /// abandoned: its countdown stops and nothing of it is persisted.
    pub async fn install(&self, user_id: &str, runner: QuizRunner) -> SharedRunner {
        let shared = Arc::new(Mutex::new(runner));
        if self
            .runners
            .lock()
            .await
            .insert(user_id.to_string(), shared.clone())
            .is_some()
        {
            tracing::info!(user_id, "Abandoned previous quiz runner");
        }
        shared
    }

    pub async fn runner(&self, user_id: &str) -> Option<SharedRunner> {
        self.runners.lock().await.get(user_id).cloned()
    }

    async fn is_active(&self, user_id: &str, runner: &SharedRunner) -> bool {
        self.runners
            .lock()
            .await
            .get(user_id)
            .is_some_and(|active| Arc::ptr_eq(active, runner))
    }
}

/// Result of a submit request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Completed { result: QuizResult },
    /// Another submission for this attempt is running; nothing was done.
    InFlight,
}

/// What triggered a submission, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    User,
    Timeout,
}

/// Takes the user's staged quiz and starts playing it. Without a staged quiz
/// the player is sent back to setup and nothing is persisted.
pub async fn start_quiz(state: &AppState, user: &CurrentUser) -> Result<SharedRunner, AppError> {
    let staged = state
        .sessions
        .take_staged(&user.id)
        .await
        .ok_or_else(|| AppError::NoStagedQuiz("No quiz has been generated yet".to_string()))?;

    let runner = QuizRunner::start(staged)?;
    let timed = runner.is_timed();
    let shared = state.sessions.install(&user.id, runner).await;

    if timed {
        spawn_countdown(state.clone(), user.clone(), shared.clone());
    }

    tracing::info!(user_id = %user.id, timed, "Quiz started");
    Ok(shared)
}

/// Submits the attempt held by `runner`.
///
/// Only the first caller does the work; concurrent callers get `InFlight`.
/// After a failed submission the next call tries again.
pub async fn submit(
    state: &AppState,
    user: &CurrentUser,
    runner: &SharedRunner,
    trigger: SubmitTrigger,
) -> Result<SubmitOutcome, AppError> {
    let submission = match runner.lock().await.begin_submission(Utc::now()) {
        SubmitStart::Started(submission) => submission,
        SubmitStart::InFlight => {
            tracing::debug!(user_id = %user.id, ?trigger, "Submission already in flight");
            return Ok(SubmitOutcome::InFlight);
        }
        SubmitStart::AlreadyCompleted(result) => return Ok(SubmitOutcome::Completed { result }),
    };

    record(state, user, runner, submission, trigger).await
}

/// Persists a started submission and settles the runner. The runner lock is
/// not held across the remote writes.
async fn record(
    state: &AppState,
    user: &CurrentUser,
    runner: &SharedRunner,
    submission: Submission,
    trigger: SubmitTrigger,
) -> Result<SubmitOutcome, AppError> {
    tracing::info!(user_id = %user.id, ?trigger, "Submitting quiz");

    let recorded = async {
        let prior = state.store.load_user(user).await?.statistics;
        recorder::record_attempt(
            state.store.as_ref(),
            user,
            &submission.attempt,
            &submission.question_records(),
            &prior,
        )
        .await
    }
    .await;

    let mut guard = runner.lock().await;
    match recorded {
        Ok(recorded) => {
            let result = QuizResult {
                quiz_id: recorded.quiz.id,
                score: submission.attempt.score_percentage,
                correct_count: submission.attempt.correct_answers,
                total_questions: submission.attempt.total_questions,
                time_taken: submission.attempt.time_taken,
                questions: submission.questions,
                statistics: recorded.statistics,
                statistics_saved: recorded.statistics_saved,
            };
            guard.complete(result.clone());
            Ok(SubmitOutcome::Completed { result })
        }
        Err(e) => {
            tracing::warn!(user_id = %user.id, ?trigger, "Submission failed: {}", e);
            guard.fail(e.to_string());
            Err(e)
        }
    }
}

/// Ticks the runner once a second and submits when time runs out. Stops
/// when the runner leaves `InProgress` or is replaced by a newer one.
pub fn spawn_countdown(state: AppState, user: CurrentUser, runner: SharedRunner) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            if !state.sessions.is_active(&user.id, &runner).await {
                tracing::debug!(user_id = %user.id, "Countdown stopped for abandoned runner");
                return;
            }

            let step = runner.lock().await.countdown(Utc::now());
            match step {
                Countdown::Running(_) => continue,
                Countdown::Stopped => return,
                Countdown::Expired(submission) => {
                    tracing::info!(user_id = %user.id, "Time is up, auto-submitting");
                    if let Err(e) =
                        record(&state, &user, &runner, submission, SubmitTrigger::Timeout).await
                    {
                        tracing::error!(user_id = %user.id, "Auto-submit failed: {:?}", e);
                    }
                    return;
                }
            }
        }
    });
}
