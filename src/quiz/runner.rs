// src/quiz/runner.rs

//! State machine for a single quiz attempt.
//!
//! A runner only exists once a staged quiz has been taken; before that the
//! user's slot is in the awaiting state (see `quiz::session`). From there:
//! `InProgress` → `Submitting` → `Completed`. A failed submission stays in
//! `Submitting` with the error recorded until the player submits again.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    error::AppError,
    models::{
        question::{NewQuestionRecord, PublicQuestion, QuestionDraft, QuestionResult},
        quiz::NewQuizAttempt,
        staged::{QuizSettings, StagedQuiz},
        user::UserStatistics,
    },
};

/// Rounded percentage of correct answers; an empty quiz scores 0.
pub fn score_percentage(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (correct as f64 / total as f64 * 100.0).round() as u32
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    InProgress,
    Submitting { error: Option<String> },
    Completed { result: QuizResult },
}

/// What a finished attempt reports back to the player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizResult {
    pub quiz_id: String,
    pub score: u32,
    pub correct_count: u32,
    pub total_questions: u32,
    pub time_taken: Option<u32>,
    pub questions: Vec<QuestionResult>,
    pub statistics: UserStatistics,
    /// False when the attempt was stored but the statistics update failed.
    pub statistics_saved: bool,
}

/// Everything the recorder needs to persist one attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub attempt: NewQuizAttempt,
    pub questions: Vec<QuestionResult>,
}

impl Submission {
    pub fn question_records(&self) -> Vec<NewQuestionRecord> {
        self.questions.iter().map(QuestionResult::to_record).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitStart {
    /// The caller now owns the submission and must finish it with
    /// [`QuizRunner::complete`] or [`QuizRunner::fail`].
    Started(Submission),
    /// A submission is already in flight.
    InFlight,
    AlreadyCompleted(QuizResult),
}

/// Outcome of one countdown step, see [`QuizRunner::countdown`].
#[derive(Debug, Clone, PartialEq)]
pub enum Countdown {
    Running(u32),
    /// Time ran out and the submission has started. The caller must
    /// finish it.
    Expired(Submission),
    Stopped,
}

/// Outcome of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Running(u32),
    /// Time ran out; the caller must submit.
    Expired,
    /// Untimed, or no longer in progress.
    Stopped,
}

#[derive(Debug, Clone)]
pub struct QuizRunner {
    questions: Vec<QuestionDraft>,
    settings: QuizSettings,
    answers: HashMap<usize, String>,
    current: usize,
    remaining: Option<u32>,
    phase: Phase,
}

/// Snapshot for the player. Answers stay hidden until completion.
#[derive(Debug, Serialize)]
pub struct RunnerView {
    pub settings: QuizSettings,
    pub total_questions: usize,
    pub current_index: usize,
    pub current_question: PublicQuestion,
    pub answers: HashMap<usize, String>,
    pub answered_count: usize,
    pub time_remaining: Option<u32>,
    #[serde(flatten)]
    pub phase: Phase,
}

impl QuizRunner {
    /// Takes ownership of a staged quiz. A quiz without questions is
    /// malformed and sends the player back to setup.
    pub fn start(staged: StagedQuiz) -> Result<Self, AppError> {
        if staged.questions.is_empty() {
            return Err(AppError::NoStagedQuiz(
                "Staged quiz has no questions".to_string(),
            ));
        }

        let remaining = staged.settings.time_limit.filter(|&t| t > 0);

        Ok(Self {
            questions: staged.questions,
            settings: staged.settings,
            answers: HashMap::new(),
            current: 0,
            remaining,
            phase: Phase::InProgress,
        })
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_timed(&self) -> bool {
        self.settings.time_limit.is_some()
    }

    pub fn time_remaining(&self) -> Option<u32> {
        self.remaining
    }

    pub fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(&index).map(String::as_str)
    }

    fn ensure_in_progress(&self) -> Result<(), AppError> {
        match self.phase {
            Phase::InProgress => Ok(()),
            _ => Err(AppError::Conflict("Quiz has already been submitted".to_string())),
        }
    }

    /// Records or overwrites the answer for question `index`.
    pub fn select_answer(&mut self, index: usize, choice: &str) -> Result<(), AppError> {
        self.ensure_in_progress()?;

        let question = self.questions.get(index).ok_or_else(|| {
            AppError::BadRequest(format!("Question {} does not exist", index))
        })?;

        let choice = choice.trim().to_uppercase();
        if !question.has_option(&choice) {
            return Err(AppError::BadRequest(format!(
                "'{}' is not an option of question {}",
                choice, index
            )));
        }

        self.answers.insert(index, choice);
        Ok(())
    }

    /// Moves to the next question; stays put on the last one.
    pub fn advance(&mut self) -> Result<usize, AppError> {
        self.ensure_in_progress()?;
        if self.current + 1 < self.questions.len() {
            self.current += 1;
        }
        Ok(self.current)
    }

    /// Moves to the previous question; stays put on the first one.
    pub fn retreat(&mut self) -> Result<usize, AppError> {
        self.ensure_in_progress()?;
        self.current = self.current.saturating_sub(1);
        Ok(self.current)
    }

    /// Jumps straight to question `index`.
    pub fn go_to(&mut self, index: usize) -> Result<usize, AppError> {
        self.ensure_in_progress()?;
        if index >= self.questions.len() {
            return Err(AppError::BadRequest(format!(
                "Question {} does not exist",
                index
            )));
        }
        self.current = index;
        Ok(self.current)
    }

    /// Advances the countdown by one second.
    pub fn tick(&mut self) -> Tick {
        if self.phase != Phase::InProgress {
            return Tick::Stopped;
        }
        match self.remaining {
            None => Tick::Stopped,
            Some(left) if left <= 1 => {
                self.remaining = Some(0);
                Tick::Expired
            }
            Some(left) => {
                self.remaining = Some(left - 1);
                Tick::Running(left - 1)
            }
        }
    }

    /// Ticks once. On expiry the submission begins under the same borrow,
    /// so the answers held at that moment are final.
    pub fn countdown(&mut self, now: DateTime<Utc>) -> Countdown {
        match self.tick() {
            Tick::Running(left) => Countdown::Running(left),
            Tick::Stopped => Countdown::Stopped,
            Tick::Expired => match self.begin_submission(now) {
                SubmitStart::Started(submission) => Countdown::Expired(submission),
                _ => Countdown::Stopped,
            },
        }
    }

    /// Scores the collected answers. Unanswered questions count as wrong.
    pub fn grade(&self, completed_at: DateTime<Utc>) -> Submission {
        let questions: Vec<QuestionResult> = self
            .questions
            .iter()
            .enumerate()
            .map(|(index, q)| {
                let user_answer = self.answers.get(&index).cloned();
                QuestionResult {
                    is_correct: user_answer.as_deref() == Some(q.correct_answer.as_str()),
                    question_text: q.question_text.clone(),
                    options: q.options.clone(),
                    correct_answer: q.correct_answer.clone(),
                    user_answer,
                    explanation: q.explanation.clone(),
                    topic: q.topic.clone(),
                    difficulty: q.difficulty,
                }
            })
            .collect();

        let total = questions.len() as u32;
        let correct = questions.iter().filter(|q| q.is_correct).count() as u32;

        let time_taken = self
            .settings
            .time_limit
            .map(|limit| limit.saturating_sub(self.remaining.unwrap_or(0)));

        Submission {
            attempt: NewQuizAttempt {
                title: NewQuizAttempt::title_for(&self.settings.topics),
                topics: self.settings.topics.clone(),
                difficulty: self.settings.difficulty,
                total_questions: total,
                correct_answers: correct,
                score_percentage: score_percentage(correct, total),
                time_taken,
                completed_at,
            },
            questions,
        }
    }

    /// Enters `Submitting` unless a submission is running or done. A failed
    /// submission may be started again.
    pub fn begin_submission(&mut self, now: DateTime<Utc>) -> SubmitStart {
        match &self.phase {
            Phase::InProgress | Phase::Submitting { error: Some(_) } => {
                let submission = self.grade(now);
                self.phase = Phase::Submitting { error: None };
                SubmitStart::Started(submission)
            }
            Phase::Submitting { error: None } => SubmitStart::InFlight,
            Phase::Completed { result } => SubmitStart::AlreadyCompleted(result.clone()),
        }
    }

    pub fn complete(&mut self, result: QuizResult) {
        self.phase = Phase::Completed { result };
    }

    /// Keeps the runner in `Submitting` with the error attached. Answers stay
    /// locked.
    pub fn fail(&mut self, error: String) {
        self.phase = Phase::Submitting { error: Some(error) };
    }

    pub fn view(&self) -> RunnerView {
        RunnerView {
            settings: self.settings.clone(),
            total_questions: self.questions.len(),
            current_index: self.current,
            current_question: PublicQuestion::from_draft(
                self.current,
                &self.questions[self.current],
            ),
            answers: self.answers.clone(),
            answered_count: self.answers.len(),
            time_remaining: self.remaining,
            phase: self.phase.clone(),
        }
    }
}
