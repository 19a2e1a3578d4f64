// src/models/topic.rs

use serde::Serialize;

/// One entry of the fixed topic catalog offered in quiz setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TopicCategory {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

pub const TOPIC_CATEGORIES: [TopicCategory; 10] = [
    TopicCategory {
        id: "history",
        name: "History",
        icon: "🏛️",
        description: "World history, civilizations, wars, and historical figures",
    },
    TopicCategory {
        id: "geography",
        name: "Geography",
        icon: "🌍",
        description: "Countries, capitals, physical geography, and landmarks",
    },
    TopicCategory {
        id: "science",
        name: "Science",
        icon: "🔬",
        description: "Physics, chemistry, biology, and scientific discoveries",
    },
    TopicCategory {
        id: "current_affairs",
        name: "Current Affairs",
        icon: "📰",
        description: "Recent events, politics, and global news",
    },
    TopicCategory {
        id: "sports",
        name: "Sports",
        icon: "⚽",
        description: "Sports history, records, and famous athletes",
    },
    TopicCategory {
        id: "literature",
        name: "Literature",
        icon: "📚",
        description: "Authors, books, poetry, and literary works",
    },
    TopicCategory {
        id: "art_culture",
        name: "Art & Culture",
        icon: "🎨",
        description: "Paintings, music, movies, and cultural traditions",
    },
    TopicCategory {
        id: "technology",
        name: "Technology",
        icon: "💻",
        description: "Computing, internet, innovations, and tech history",
    },
    TopicCategory {
        id: "mathematics",
        name: "Mathematics",
        icon: "🔢",
        description: "Basic math, famous mathematicians, and concepts",
    },
    TopicCategory {
        id: "economics",
        name: "Economics",
        icon: "💰",
        description: "Economic principles, famous economists, and markets",
    },
];

pub fn find(id: &str) -> Option<&'static TopicCategory> {
    TOPIC_CATEGORIES.iter().find(|t| t.id == id)
}

pub fn find_by_name(name: &str) -> Option<&'static TopicCategory> {
    TOPIC_CATEGORIES.iter().find(|t| t.name == name)
}

/// Maps topic ids to display names, silently dropping unknown ids.
pub fn resolve_names(ids: &[String]) -> Vec<String> {
    ids.iter()
        .filter_map(|id| find(id))
        .map(|t| t.name.to_string())
        .collect()
}
