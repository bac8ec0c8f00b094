// src/handlers/quiz.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    config::{DEFAULT_QUESTION_LIMIT, MAX_QUESTION_LIMIT},
    error::AppError,
    models::{
        analysis::SubmitTestRequest,
        question::{ExamCategory, Question},
    },
    services::{analysis::AnalysisService, questions::QuestionService},
    utils::formula::normalize,
};

/// Query parameters for fetching a mock-test paper.
#[derive(Debug, Deserialize)]
pub struct QuestionParams {
    pub exam: ExamCategory,
    pub limit: Option<i64>,
    /// Convert formula shorthand in the question text to LaTeX.
    #[serde(default)]
    pub render: bool,
}

pub(crate) fn render_question(mut question: Question) -> Question {
    question.content = normalize(&question.content);
    question.options = question.options.iter().map(|o| normalize(o)).collect();
    question.explanation = question.explanation.as_deref().map(normalize);
    question
}

/// Returns up to `limit` questions for the exam.
///
/// Never fails because of the backing store: the `source` field tells the
/// client whether the paper came from the database, the local cache or the
/// built-in samples.
pub async fn get_questions(
    State(questions): State<QuestionService>,
    Query(params): Query<QuestionParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_QUESTION_LIMIT);
    if !(1..=MAX_QUESTION_LIMIT).contains(&limit) {
        return Err(AppError::BadRequest(format!(
            "limit must be between 1 and {}",
            MAX_QUESTION_LIMIT
        )));
    }

    let mut batch = questions.fetch_questions(params.exam, limit).await;
    if params.render {
        batch.questions = batch.questions.into_iter().map(render_question).collect();
    }

    Ok(Json(batch))
}

/// Scores a finished mock test and returns the full analysis.
pub async fn analyze_test(
    State(analysis): State<AnalysisService>,
    Json(req): Json<SubmitTestRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.answers.is_empty() {
        return Err(AppError::BadRequest("No answers submitted".to_string()));
    }

    let report = analysis.analyze(req.exam_category, &req.answers).await;
    tracing::info!(
        "Analyzed {} test: {}/{} correct, grade {}, enriched: {}",
        report.exam_category,
        report.correct_answers,
        report.total_questions,
        report.grade,
        report.ai_enriched
    );

    Ok(Json(report))
}
