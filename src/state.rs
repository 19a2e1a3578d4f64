use axum::extract::FromRef;

use crate::{config::Config, llm::SharedLlm, quiz::session::QuizSessions, store::SharedStore};

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub llm: SharedLlm,
    pub sessions: QuizSessions,
    pub config: Config,
}

impl FromRef<AppState> for SharedStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for SharedLlm {
    fn from_ref(state: &AppState) -> Self {
        state.llm.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
