// src/state.rs

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::{
    config::Config,
    services::{analysis::AnalysisService, questions::QuestionService},
};

#[derive(Clone)]
pub struct AppState {
    /// Used by the authoring and lecture handlers for writes and listings.
    pub pool: PgPool,
    pub config: Config,
    pub questions: QuestionService,
    pub analysis: AnalysisService,
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for QuestionService {
    fn from_ref(state: &AppState) -> Self {
        state.questions.clone()
    }
}

impl FromRef<AppState> for AnalysisService {
    fn from_ref(state: &AppState) -> Self {
        state.analysis.clone()
    }
}
