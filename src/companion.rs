// src/companion.rs

//! The study companion: canned mood suggestions and a short LLM chat that
//! recommends topics.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::{llm::LlmClient, models::topic::TOPIC_CATEGORIES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoodSuggestion {
    pub mood: &'static str,
    pub emoji: &'static str,
    pub topics: [&'static str; 2],
    pub message: &'static str,
}

pub const MOODS: [MoodSuggestion; 4] = [
    MoodSuggestion {
        mood: "Curious",
        emoji: "🤔",
        topics: ["History", "Science"],
        message: "Feeling curious? Let's dive into the depths of History or uncover the secrets of Science!",
    },
    MoodSuggestion {
        mood: "Creative",
        emoji: "🎨",
        topics: ["Art & Culture", "Literature"],
        message: "Unleash your creativity! How about a journey through Art & Culture or the world of Literature?",
    },
    MoodSuggestion {
        mood: "Energetic",
        emoji: "⚡",
        topics: ["Sports", "Technology"],
        message: "Feeling energetic? Let's test your knowledge in the fast-paced worlds of Sports or Technology!",
    },
    MoodSuggestion {
        mood: "Focused",
        emoji: "🎯",
        topics: ["Mathematics", "Economics"],
        message: "Ready to focus? Challenge your mind with Mathematics or the principles of Economics!",
    },
];

pub const GREETING: &str =
    "Hi there! I'm Qurio AI, your learning companion! How are you feeling today? Pick a mood to get started!";

pub const FALLBACK_REPLY: &str = "I'm having trouble connecting right now. But I'd love to help you find the perfect quiz! Try asking me about different topics you're interested in!";

#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 500, message = "Message must be between 1 and 500 characters."))]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
    /// False when the companion could not reach the model.
    pub generated: bool,
}

#[derive(Debug, Serialize)]
pub struct MoodsResponse {
    pub greeting: &'static str,
    pub moods: &'static [MoodSuggestion],
}

pub fn moods() -> MoodsResponse {
    MoodsResponse {
        greeting: GREETING,
        moods: &MOODS,
    }
}

pub fn chat_prompt(message: &str) -> String {
    let topics: Vec<&str> = TOPIC_CATEGORIES.iter().map(|t| t.name).collect();
    format!(
        "User said: \"{}\"\n\n\
         Analyze the user's mood and suggest appropriate quiz topics. Be friendly, encouraging, and personalized.\n\n\
         Available topics: {}\n\n\
         Respond in a conversational way and suggest 2-3 topics that match their mood. Keep it under 120 words.",
        message,
        topics.join(", ")
    )
}

fn reply_text(reply: Value) -> Option<String> {
    let text = match reply {
        Value::String(text) => text,
        Value::Object(mut map) => match map.remove("response") {
            Some(Value::String(text)) => text,
            _ => return None,
        },
        _ => return None,
    };
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Asks the model for topic suggestions. Never fails: any problem with the
/// model yields [`FALLBACK_REPLY`].
pub async fn chat(llm: &dyn LlmClient, message: &str) -> ChatReply {
    match llm.invoke(&chat_prompt(message.trim()), None).await {
        Ok(reply) => match reply_text(reply) {
            Some(reply) => ChatReply {
                reply,
                generated: true,
            },
            None => {
                tracing::warn!("Companion reply was empty or not text");
                ChatReply {
                    reply: FALLBACK_REPLY.to_string(),
                    generated: false,
                }
            }
        },
        Err(e) => {
            tracing::warn!("Companion chat failed: {:?}", e);
            ChatReply {
                reply: FALLBACK_REPLY.to_string(),
                generated: false,
            }
        }
    }
}
