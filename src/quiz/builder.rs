// src/quiz/builder.rs

//! Turns a setup request into a staged quiz by asking the LLM for questions.

use std::collections::BTreeMap;

use serde_json::{Value, json};
use validator::Validate;

use crate::{
    config::{DEFAULT_QUESTION_COUNT, FAVORITE_TOPIC_PREFILL},
    error::AppError,
    llm::LlmClient,
    models::{
        question::QuestionDraft,
        quiz::Difficulty,
        staged::{QuizSettings, QuizSetupRequest, StagedQuiz},
        topic,
        user::User,
    },
    utils::json::structured,
};

const OPTION_KEYS: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

/// Resolves the request against the catalog and the user's preferences.
///
/// Catalog topics win over a custom topic. With neither, the user's first
/// favorite topics are used. Difficulty falls back to the preferred one.
pub fn resolve_settings(req: &QuizSetupRequest, user: &User) -> Result<QuizSettings, AppError> {
    req.validate()?;

    let prefs = &user.learning_preferences;
    let custom = req
        .custom_topic
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let mut topics = topic::resolve_names(&req.topics);
    if topics.is_empty() {
        if let Some(custom) = custom {
            topics.push(custom.to_string());
        } else {
            let favorites: Vec<String> = prefs
                .favorite_topics
                .iter()
                .take(FAVORITE_TOPIC_PREFILL)
                .cloned()
                .collect();
            topics = topic::resolve_names(&favorites);
        }
    }

    if topics.is_empty() {
        return Err(AppError::BadRequest(
            "Select at least one topic or enter a custom topic".to_string(),
        ));
    }

    Ok(QuizSettings {
        topics,
        difficulty: req
            .difficulty
            .or(prefs.preferred_difficulty)
            .unwrap_or_default(),
        time_limit: req.time_limit_minutes.map(|m| m * 60),
        total_questions: req.question_count.unwrap_or(DEFAULT_QUESTION_COUNT),
    })
}

pub fn generation_prompt(settings: &QuizSettings) -> String {
    format!(
        r#"Generate a JSON object with a key "questions". The value should be an array of {count} general knowledge quiz questions based on these topics: {topics}. The difficulty should be {difficulty}.

For each question in the array, provide a JSON object with the following keys:
- "question_text": The question itself.
- "options": An object with four keys: "A", "B", "C", "D".
- "correct_answer": The key of the correct option (e.g., "A").
- "explanation": A detailed explanation for the correct answer.
- "topic": The specific topic of the question.
- "difficulty": The difficulty level of the question (e.g., "Easy", "Medium", "Hard").

Ensure the JSON is well-formed."#,
        count = settings.total_questions,
        topics = settings.topics.join(", "),
        difficulty = settings.difficulty,
    )
}

/// JSON schema sent along with the generation prompt.
pub fn question_schema() -> Value {
    let text = json!({ "type": "string" });
    json!({
        "type": "object",
        "properties": {
            "questions": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "question_text": text,
                        "options": {
                            "type": "object",
                            "properties": { "A": text, "B": text, "C": text, "D": text }
                        },
                        "correct_answer": text,
                        "explanation": text,
                        "topic": text,
                        "difficulty": text
                    }
                }
            }
        }
    })
}

/// Parses the model reply into question drafts, skipping unusable entries.
///
/// Accepts `{"questions": [...]}`, a bare array, or either one embedded in a
/// string. Options may be an object keyed by letter or a plain array. A
/// correct answer given as option text instead of a key is mapped back to its
/// key.
pub fn parse_questions(reply: Value, settings: &QuizSettings) -> Result<Vec<QuestionDraft>, AppError> {
    let payload = structured(reply).ok_or_else(|| {
        AppError::Upstream("Question generator returned no JSON".to_string())
    })?;

    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("questions") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(AppError::Upstream(
                    "Question generator reply has no questions array".to_string(),
                ));
            }
        },
        _ => {
            return Err(AppError::Upstream(
                "Question generator reply has an unexpected shape".to_string(),
            ));
        }
    };

    let received = items.len();
    let drafts: Vec<QuestionDraft> = items
        .iter()
        .filter_map(|item| parse_draft(item, settings))
        .take(settings.total_questions as usize)
        .collect();

    if drafts.len() < received {
        tracing::warn!(
            received,
            kept = drafts.len(),
            "Discarded malformed or surplus generated questions"
        );
    }

    if drafts.is_empty() {
        return Err(AppError::Upstream(
            "Question generator returned no usable questions".to_string(),
        ));
    }

    Ok(drafts)
}

fn parse_draft(item: &Value, settings: &QuizSettings) -> Option<QuestionDraft> {
    let text_of = |key: &str| {
        item.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };

    let question_text = text_of("question_text").or_else(|| text_of("question"))?;

    let options: BTreeMap<String, String> = match item.get("options")? {
        Value::Object(map) => map
            .iter()
            .filter_map(|(k, v)| {
                let text = v.as_str()?.trim();
                (!text.is_empty()).then(|| (k.trim().to_uppercase(), text.to_string()))
            })
            .collect(),
        Value::Array(list) => OPTION_KEYS
            .iter()
            .zip(list.iter())
            .filter_map(|(k, v)| Some((k.to_string(), v.as_str()?.trim().to_string())))
            .collect(),
        _ => return None,
    };

    if options.len() < 2 {
        return None;
    }

    let answer = text_of("correct_answer")?;
    let correct_answer = if options.contains_key(&answer.to_uppercase()) {
        answer.to_uppercase()
    } else {
        options
            .iter()
            .find(|(_, text)| text.eq_ignore_ascii_case(answer))
            .map(|(key, _)| key.clone())?
    };

    let topic = text_of("topic")
        .map(str::to_string)
        .or_else(|| settings.topics.first().cloned())
        .unwrap_or_default();

    let difficulty: Difficulty = text_of("difficulty")
        .and_then(|d| d.parse().ok())
        .unwrap_or(settings.difficulty);

    Some(QuestionDraft {
        question_text: question_text.to_string(),
        options,
        correct_answer,
        explanation: text_of("explanation").unwrap_or_default().to_string(),
        topic,
        difficulty,
    })
}

/// Resolves settings, asks the generator, and stages the result.
pub async fn build(
    llm: &dyn LlmClient,
    req: &QuizSetupRequest,
    user: &User,
) -> Result<StagedQuiz, AppError> {
    let settings = resolve_settings(req, user)?;
    let prompt = generation_prompt(&settings);
    let schema = question_schema();

    let reply = llm.invoke(&prompt, Some(&schema)).await.map_err(|e| {
        tracing::error!("Question generation failed: {:?}", e);
        e
    })?;

    let questions = parse_questions(reply, &settings)?;

    tracing::info!(
        user_id = %user.id,
        topics = ?settings.topics,
        requested = settings.total_questions,
        generated = questions.len(),
        "Staged new quiz"
    );

    Ok(StagedQuiz { questions, settings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::LearningPreferences;

    fn settings() -> QuizSettings {
        QuizSettings {
            topics: vec!["History".to_string()],
            difficulty: Difficulty::Medium,
            time_limit: None,
            total_questions: 5,
        }
    }

    #[test]
    fn test_resolve_prefers_catalog_topics() {
        let req = QuizSetupRequest {
            topics: vec!["science".to_string(), "sports".to_string()],
            custom_topic: Some("Volcanoes".to_string()),
            time_limit_minutes: Some(15),
            ..Default::default()
        };
        let s = resolve_settings(&req, &User::default()).unwrap();
        assert_eq!(s.topics, vec!["Science", "Sports"]);
        assert_eq!(s.time_limit, Some(900));
        assert_eq!(s.total_questions, 10);
        assert_eq!(s.difficulty, Difficulty::Medium);
    }

    #[test]
    fn test_resolve_custom_topic() {
        let req = QuizSetupRequest {
            custom_topic: Some("  Volcanoes ".to_string()),
            difficulty: Some(Difficulty::Hard),
            ..Default::default()
        };
        let s = resolve_settings(&req, &User::default()).unwrap();
        assert_eq!(s.topics, vec!["Volcanoes"]);
        assert_eq!(s.difficulty, Difficulty::Hard);
        assert_eq!(s.time_limit, None);
    }

    #[test]
    fn test_resolve_falls_back_to_preferences() {
        let user = User {
            learning_preferences: LearningPreferences {
                favorite_topics: vec![
                    "history".to_string(),
                    "science".to_string(),
                    "economics".to_string(),
                    "sports".to_string(),
                ],
                preferred_difficulty: Some(Difficulty::Easy),
                daily_goal: None,
            },
            ..Default::default()
        };
        let s = resolve_settings(&QuizSetupRequest::default(), &user).unwrap();
        assert_eq!(s.topics, vec!["History", "Science", "Economics"]);
        assert_eq!(s.difficulty, Difficulty::Easy);
    }

    #[test]
    fn test_resolve_requires_a_topic() {
        let err = resolve_settings(&QuizSetupRequest::default(), &User::default()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_resolve_rejects_out_of_range_count() {
        let req = QuizSetupRequest {
            topics: vec!["history".to_string()],
            question_count: Some(51),
            ..Default::default()
        };
        assert!(matches!(
            resolve_settings(&req, &User::default()),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_prompt_mentions_settings() {
        let prompt = generation_prompt(&settings());
        assert!(prompt.contains("array of 5 general knowledge quiz questions"));
        assert!(prompt.contains("these topics: History."));
        assert!(prompt.contains("difficulty should be medium"));
    }

    #[test]
    fn test_parse_well_formed_reply() {
        let reply = json!({
            "questions": [{
                "question_text": "Who was the first Roman emperor?",
                "options": {"A": "Augustus", "B": "Nero", "C": "Caesar", "D": "Trajan"},
                "correct_answer": "A",
                "explanation": "Octavian became Augustus in 27 BC.",
                "topic": "Ancient Rome",
                "difficulty": "Easy"
            }]
        });
        let drafts = parse_questions(reply, &settings()).unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].correct_answer, "A");
        assert_eq!(drafts[0].difficulty, Difficulty::Easy);
        assert_eq!(drafts[0].option_texts(), vec!["Augustus", "Nero", "Caesar", "Trajan"]);
    }

    #[test]
    fn test_parse_tolerates_loose_shapes() {
        let reply = Value::String(
            "```json\n[{\"question\": \"2+2?\", \"options\": [\"3\", \"4\"], \"correct_answer\": \"4\"}]\n```"
                .to_string(),
        );
        let drafts = parse_questions(reply, &settings()).unwrap();
        assert_eq!(drafts[0].correct_answer, "B");
        assert_eq!(drafts[0].topic, "History");
        assert_eq!(drafts[0].difficulty, Difficulty::Medium);
    }

    #[test]
    fn test_parse_skips_bad_items_and_truncates() {
        let good = json!({
            "question_text": "Q",
            "options": {"A": "x", "B": "y"},
            "correct_answer": "b"
        });
        let bad_key = json!({
            "question_text": "Q",
            "options": {"A": "x", "B": "y"},
            "correct_answer": "Z"
        });
        let no_options = json!({ "question_text": "Q", "correct_answer": "A" });
        let mut items = vec![bad_key, no_options];
        items.extend(std::iter::repeat_n(good, 7));

        let drafts = parse_questions(json!({ "questions": items }), &settings()).unwrap();
        assert_eq!(drafts.len(), 5);
        assert!(drafts.iter().all(|d| d.correct_answer == "B"));
    }

    #[test]
    fn test_parse_rejects_unusable_reply() {
        assert!(matches!(
            parse_questions(json!({"questions": []}), &settings()),
            Err(AppError::Upstream(_))
        ));
        assert!(matches!(
            parse_questions(json!("I cannot help with that."), &settings()),
            Err(AppError::Upstream(_))
        ));
        assert!(matches!(
            parse_questions(json!(42), &settings()),
            Err(AppError::Upstream(_))
        ));
    }
}
