// tests/profile_tests.rs

mod common;

use common::{TestApp, new_user_token, spawn_app};
use serde_json::{Value, json};

async fn get_json(app: &TestApp, token: &str, path: &str) -> (u16, Value) {
    let response = app
        .client
        .get(app.url(path))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to execute request");
    let status = response.status().as_u16();
    (status, response.json().await.unwrap_or(Value::Null))
}

/// Plays one quiz of `count` questions, answering the first `correct` right.
async fn play_quiz(app: &TestApp, token: &str, topic: &str, count: usize, correct: usize) -> Value {
    let response = app
        .client
        .post(app.url("/api/quiz/setup"))
        .bearer_auth(token)
        .json(&json!({ "topics": [topic], "question_count": count }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    let response = app
        .client
        .post(app.url("/api/quiz/start"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    for index in 0..correct {
        app.client
            .put(app.url(&format!("/api/quiz/session/answers/{}", index)))
            .bearer_auth(token)
            .json(&json!({ "answer": "A" }))
            .send()
            .await
            .unwrap();
    }

    app.client
        .post(app.url("/api/quiz/session/submit"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_profile_complex_flow() {
    // Arrange
    let app = spawn_app().await;
    let (user_id, token) = new_user_token();

    // 1. A new user starts empty.
    let (status, profile) = get_json(&app, &token, "/api/profile").await;
    assert_eq!(status, 200);
    assert_eq!(profile["id"], user_id.as_str());
    assert_eq!(profile["accuracy"], 0);
    assert_eq!(profile["statistics"]["total_quizzes"], 0);

    // 2. Update name, bio and preferences. Markup is stripped from the bio.
    let response = app
        .client
        .put(app.url("/api/profile"))
        .bearer_auth(&token)
        .json(&json!({
            "full_name": "Ada Lovelace",
            "bio": "I <b>love</b> maths<script>alert(1)</script>",
            "avatar_url": "https://example.com/ada.png",
            "learning_preferences": { "favorite_topics": ["mathematics"], "daily_goal": 5 }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["full_name"], "Ada Lovelace");
    assert_eq!(updated["bio"], "I love maths");
    assert_eq!(updated["learning_preferences"]["daily_goal"], 5);

    // 3. A partial preference update keeps the other fields.
    app.client
        .put(app.url("/api/profile"))
        .bearer_auth(&token)
        .json(&json!({ "learning_preferences": { "preferred_difficulty": "hard" } }))
        .send()
        .await
        .unwrap();

    let (_, profile) = get_json(&app, &token, "/api/profile").await;
    assert_eq!(profile["full_name"], "Ada Lovelace");
    assert_eq!(profile["learning_preferences"]["favorite_topics"], json!(["mathematics"]));
    assert_eq!(profile["learning_preferences"]["preferred_difficulty"], "hard");
    assert_eq!(profile["learning_preferences"]["daily_goal"], 5);
}

#[tokio::test]
async fn test_profile_validation() {
    let app = spawn_app().await;
    let (_, token) = new_user_token();

    let bad_bodies = [
        json!({ "full_name": "x".repeat(101) }),
        json!({ "bio": "b".repeat(501) }),
        json!({ "avatar_url": "ftp://example.com/a.png" }),
        json!({ "learning_preferences": { "daily_goal": 51 } }),
        json!({ "learning_preferences": { "favorite_topics": ["astrology"] } }),
    ];

    for body in bad_bodies {
        let response = app
            .client
            .put(app.url("/api/profile"))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400, "accepted {}", body);
    }
}

#[tokio::test]
async fn test_dashboard_and_progress() {
    let app = spawn_app().await;
    let (_, token) = new_user_token();

    play_quiz(&app, &token, "history", 5, 4).await;
    play_quiz(&app, &token, "science", 5, 2).await;

    let (status, dashboard) = get_json(&app, &token, "/api/dashboard").await;
    assert_eq!(status, 200);
    assert_eq!(dashboard["total_quizzes"], 2);
    assert_eq!(dashboard["accuracy"], 60);
    assert_eq!(dashboard["current_streak"], 0);
    assert_eq!(dashboard["longest_streak"], 1);
    assert_eq!(dashboard["weekly"]["quizzes_this_week"], 2);
    assert_eq!(dashboard["weekly"]["questions_this_week"], 10);
    assert_eq!(dashboard["weekly"]["weekly_goal"], 70);
    assert_eq!(dashboard["recent_quizzes"].as_array().unwrap().len(), 2);
    assert_eq!(dashboard["recent_quizzes"][0]["title"], "Science Quiz");

    let (status, progress) = get_json(&app, &token, "/api/progress?days=7").await;
    assert_eq!(status, 200);
    assert_eq!(progress["days"], 7);
    let daily = progress["daily"].as_array().unwrap();
    assert_eq!(daily.len(), 7);
    assert_eq!(daily[6]["quizzes"], 2);
    assert_eq!(daily[6]["score"], 60);
    assert_eq!(progress["topics"][0]["topic"], "History");
    assert_eq!(progress["topics"][0]["accuracy"], 80);
    assert_eq!(progress["topics"][1]["accuracy"], 40);

    let (status, _) = get_json(&app, &token, "/api/progress?days=14").await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_achievements_are_saved_once() {
    let app = spawn_app().await;
    let (_, token) = new_user_token();

    let (_, achievements) = get_json(&app, &token, "/api/achievements").await;
    assert_eq!(achievements["unlocked_count"], 0);
    assert_eq!(achievements["total_count"], 10);

    play_quiz(&app, &token, "geography", 5, 5).await;

    let (status, achievements) = get_json(&app, &token, "/api/achievements").await;
    assert_eq!(status, 200);
    assert_eq!(achievements["unlocked_count"], 2);
    assert_eq!(achievements["progress_percentage"], 20);
    let newly: Vec<&str> = achievements["achievements"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|a| a["newly_unlocked"] == true)
        .map(|a| a["id"].as_str().unwrap())
        .collect();
    assert_eq!(newly, vec!["first_quiz", "perfect_score"]);

    let (_, profile) = get_json(&app, &token, "/api/profile").await;
    assert_eq!(profile["statistics"]["badges"], json!(["first_quiz", "perfect_score"]));
    assert_eq!(profile["statistics"]["total_quizzes"], 1);

    // Second look: still unlocked, nothing new.
    let (_, achievements) = get_json(&app, &token, "/api/achievements").await;
    assert_eq!(achievements["unlocked_count"], 2);
    assert!(
        achievements["achievements"]
            .as_array()
            .unwrap()
            .iter()
            .all(|a| a["newly_unlocked"] == false)
    );
}
