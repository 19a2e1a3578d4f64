// src/quiz/recorder.rs

use crate::{
    error::AppError,
    models::{
        question::NewQuestionRecord,
        quiz::{NewQuizAttempt, QuizAttempt},
        user::{CurrentUser, UserStatistics},
    },
    store::EntityStore,
};

#[derive(Debug, Clone)]
pub struct RecordedAttempt {
    pub quiz: QuizAttempt,
    pub statistics: UserStatistics,
    pub statistics_saved: bool,
}

/// Persists one finished attempt.
///
/// Writes the attempt, then each question record in order, then the updated
/// statistics. The writes are not atomic as a group: a failed question write
/// leaves the attempt with an incomplete record set, and a failed statistics
/// write is only logged (the attempt still counts as recorded).
pub async fn record_attempt(
    store: &dyn EntityStore,
    user: &CurrentUser,
    attempt: &NewQuizAttempt,
    questions: &[NewQuestionRecord],
    prior: &UserStatistics,
) -> Result<RecordedAttempt, AppError> {
    let quiz = store.create_quiz(user, attempt).await.map_err(|e| {
        tracing::error!(user_id = %user.id, "Failed to create quiz record: {:?}", e);
        e
    })?;

    for (index, question) in questions.iter().enumerate() {
        let record = NewQuestionRecord {
            quiz_id: quiz.id.clone(),
            ..question.clone()
        };
        store.create_question(&record).await.map_err(|e| {
            tracing::error!(
                quiz_id = %quiz.id,
                index,
                "Failed to create question record, attempt left incomplete: {:?}",
                e
            );
            e
        })?;
    }

    let statistics = prior.with_attempt(
        attempt.total_questions,
        attempt.correct_answers,
        attempt.score_percentage,
    );

    let statistics_saved = match store.save_statistics(&user.id, &statistics).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(
                user_id = %user.id,
                quiz_id = %quiz.id,
                "Attempt recorded but statistics update failed: {:?}",
                e
            );
            false
        }
    };

    tracing::info!(
        user_id = %user.id,
        quiz_id = %quiz.id,
        score = attempt.score_percentage,
        streak = statistics.current_streak,
        "Recorded quiz attempt"
    );

    Ok(RecordedAttempt {
        quiz,
        statistics,
        statistics_saved,
    })
}
