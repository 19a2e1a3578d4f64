// tests/timer_tests.rs

mod common;

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use common::{MemoryStore, StubLlm, test_state};
use qurio::{
    models::{
        question::QuestionDraft,
        quiz::Difficulty,
        staged::{QuizSettings, StagedQuiz},
        user::CurrentUser,
    },
    quiz::{
        runner::Phase,
        session::{self, SubmitOutcome, SubmitTrigger},
    },
    store::EntityStore,
};

fn user() -> CurrentUser {
    CurrentUser {
        id: "timer-user".to_string(),
        email: "timer@example.com".to_string(),
    }
}

fn staged(count: usize, time_limit: Option<u32>) -> StagedQuiz {
    let options: BTreeMap<String, String> = [("A", "Yes"), ("B", "No")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    StagedQuiz {
        questions: (0..count)
            .map(|i| QuestionDraft {
                question_text: format!("Question {}?", i),
                options: options.clone(),
                correct_answer: "A".to_string(),
                explanation: String::new(),
                topic: "History".to_string(),
                difficulty: Difficulty::Easy,
            })
            .collect(),
        settings: QuizSettings {
            topics: vec!["History".to_string()],
            difficulty: Difficulty::Easy,
            time_limit,
            total_questions: count as u32,
        },
    }
}

#[tokio::test(start_paused = true)]
async fn expired_timer_auto_submits() {
    let store = Arc::new(MemoryStore::default());
    let state = test_state(store.clone(), Arc::new(StubLlm::new()));

    state.sessions.stage(&user().id, staged(4, Some(3))).await;
    let runner = session::start_quiz(&state, &user()).await.unwrap();
    runner.lock().await.select_answer(0, "A").unwrap();

    tokio::time::sleep(Duration::from_secs(5)).await;

    let guard = runner.lock().await;
    match guard.phase() {
        Phase::Completed { result } => {
            assert_eq!(result.score, 25);
            assert_eq!(result.time_taken, Some(3));
        }
        other => panic!("expected a completed quiz, got {:?}", other),
    }
    assert_eq!(guard.time_remaining(), Some(0));
    drop(guard);

    let quizzes = store.list_quizzes(&user()).await.unwrap();
    assert_eq!(quizzes.len(), 1);
    assert_eq!(quizzes[0].score_percentage, 25);
}

#[tokio::test(start_paused = true)]
async fn unanswered_timed_quiz_scores_zero() {
    let store = Arc::new(MemoryStore::default());
    let state = test_state(store.clone(), Arc::new(StubLlm::new()));

    state.sessions.stage(&user().id, staged(3, Some(2))).await;
    let runner = session::start_quiz(&state, &user()).await.unwrap();

    tokio::time::sleep(Duration::from_secs(10)).await;

    assert!(matches!(
        runner.lock().await.phase(),
        Phase::Completed { result } if result.score == 0
    ));
    let stats = store.load_user(&user()).await.unwrap().statistics;
    assert_eq!(stats.total_quizzes, 1);
    assert_eq!(stats.current_streak, 0);
}

#[tokio::test(start_paused = true)]
async fn manual_submit_stops_countdown() {
    let store = Arc::new(MemoryStore::default());
    let state = test_state(store.clone(), Arc::new(StubLlm::new()));

    state.sessions.stage(&user().id, staged(2, Some(60))).await;
    let runner = session::start_quiz(&state, &user()).await.unwrap();

    tokio::time::sleep(Duration::from_secs(10)).await;
    let outcome = session::submit(&state, &user(), &runner, SubmitTrigger::User)
        .await
        .unwrap();
    assert!(matches!(outcome, SubmitOutcome::Completed { .. }));

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(store.list_quizzes(&user()).await.unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn abandoned_runner_is_never_submitted() {
    let store = Arc::new(MemoryStore::default());
    let state = test_state(store.clone(), Arc::new(StubLlm::new()));

    state.sessions.stage(&user().id, staged(2, Some(3))).await;
    let first = session::start_quiz(&state, &user()).await.unwrap();

    // A new quiz replaces the timed one before it runs out.
    state.sessions.stage(&user().id, staged(2, None)).await;
    let second = session::start_quiz(&state, &user()).await.unwrap();

    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(*first.lock().await.phase(), Phase::InProgress);
    assert_eq!(*second.lock().await.phase(), Phase::InProgress);
    assert!(store.list_quizzes(&user()).await.unwrap().is_empty());
}
