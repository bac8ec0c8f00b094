// src/handlers/admin.rs

use std::collections::HashSet;

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::{PgPool, Postgres, QueryBuilder, types::Json as SqlJson};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        lecture::CreateLectureRequest,
        question::{
            CreateQuestionRequest, ExamCategory, Question, QuestionRow, UpdateQuestionRequest,
        },
    },
    services::{questions::QuestionService, store::QuestionFilter},
    utils::{
        html::{clean_html, clean_optional},
        jwt::Claims,
    },
};

/// Upper bound on rows pulled per category when snapshotting the store.
const SNAPSHOT_LIMIT: i64 = 10_000;

fn clean_all(values: &[String]) -> Vec<String> {
    values.iter().map(|v| clean_html(v)).collect()
}

fn check_invariants(question: &Question) -> Result<(), AppError> {
    if !question.is_well_formed() {
        return Err(AppError::BadRequest(
            "Question needs content and 4 non-empty options with a valid answer".to_string(),
        ));
    }
    if !question.has_consistent_pyq() {
        return Err(AppError::BadRequest(
            "pyq_year must be set exactly when is_pyq is true".to_string(),
        ));
    }
    Ok(())
}

/// Validates and sanitizes a create request into the question to insert.
pub(crate) fn prepare_question(payload: &CreateQuestionRequest) -> Result<Question, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let question = Question {
        id: uuid::Uuid::new_v4().to_string(),
        exam_type: payload.exam_type,
        class_level: payload.class_level,
        subject: payload.subject,
        chapter: clean_html(&payload.chapter),
        content: clean_html(&payload.content),
        options: clean_all(&payload.options),
        correct_option: payload.correct_option,
        explanation: clean_optional(payload.explanation.as_deref()),
        difficulty: payload.difficulty,
        tags: clean_all(&payload.tags),
        is_pyq: payload.is_pyq,
        pyq_year: payload.pyq_year,
    };
    check_invariants(&question)?;
    Ok(question)
}

/// Applies a partial update to the stored question and re-checks the
/// combined invariants. Clearing `is_pyq` also clears the year.
pub(crate) fn merge_update(
    mut question: Question,
    payload: &UpdateQuestionRequest,
) -> Result<Question, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if let Some(exam_type) = payload.exam_type {
        question.exam_type = exam_type;
    }
    if let Some(class_level) = payload.class_level {
        question.class_level = class_level;
    }
    if let Some(subject) = payload.subject {
        question.subject = subject;
    }
    if let Some(chapter) = &payload.chapter {
        question.chapter = clean_html(chapter);
    }
    if let Some(content) = &payload.content {
        question.content = clean_html(content);
    }
    if let Some(options) = &payload.options {
        question.options = clean_all(options);
    }
    if let Some(correct_option) = payload.correct_option {
        question.correct_option = correct_option;
    }
    if let Some(explanation) = &payload.explanation {
        question.explanation = clean_optional(Some(explanation.as_str()));
    }
    if let Some(difficulty) = payload.difficulty {
        question.difficulty = difficulty;
    }
    if let Some(tags) = &payload.tags {
        question.tags = clean_all(tags);
    }
    if let Some(is_pyq) = payload.is_pyq {
        question.is_pyq = is_pyq;
        if !is_pyq && payload.pyq_year.is_none() {
            question.pyq_year = None;
        }
    }
    if let Some(pyq_year) = payload.pyq_year {
        question.pyq_year = Some(pyq_year);
    }

    check_invariants(&question)?;
    Ok(question)
}

/// Creates a new question.
/// Admin only.
pub async fn create_question(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let question = prepare_question(&payload)?;

    sqlx::query(
        r#"
        INSERT INTO questions
        (id, exam_type, class_level, subject, chapter, content, options,
         correct_option, explanation, difficulty, tags, is_pyq, pyq_year)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(&question.id)
    .bind(question.exam_type.as_str())
    .bind(i32::from(question.class_level))
    .bind(question.subject.as_str())
    .bind(&question.chapter)
    .bind(&question.content)
    .bind(SqlJson(&question.options))
    .bind(i32::from(question.correct_option))
    .bind(&question.explanation)
    .bind(question.difficulty.as_str())
    .bind(SqlJson(&question.tags))
    .bind(question.is_pyq)
    .bind(question.pyq_year.map(i32::from))
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create question: {:?}", e);
        AppError::from(e)
    })?;

    tracing::info!("Question {} created by {}", question.id, claims.sub);
    Ok((StatusCode::CREATED, Json(json!({ "id": question.id }))))
}

async fn fetch_question(pool: &PgPool, id: &str) -> Result<Question, AppError> {
    let row = sqlx::query_as::<_, QuestionRow>(
        r#"
        SELECT
            id, exam_type, class_level, subject, chapter, content, options,
            correct_option, explanation, difficulty, tags, is_pyq, pyq_year, created_at
        FROM questions
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    Question::try_from(row).map_err(|reason| {
        tracing::error!("Stored question {} is malformed: {}", id, reason);
        AppError::InternalServerError(format!("Stored question {} is malformed", id))
    })
}

/// Updates a question by ID.
/// Admin only. The merged question must still be well formed.
pub async fn update_question(
    State(pool): State<PgPool>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.is_empty() {
        return Ok(StatusCode::OK);
    }

    let merged = merge_update(fetch_question(&pool, &id).await?, &payload)?;

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE questions SET ");
    let mut separated = builder.separated(", ");

    if payload.exam_type.is_some() {
        separated.push("exam_type = ");
        separated.push_bind_unseparated(merged.exam_type.as_str());
    }

    if payload.class_level.is_some() {
        separated.push("class_level = ");
        separated.push_bind_unseparated(i32::from(merged.class_level));
    }

    if payload.subject.is_some() {
        separated.push("subject = ");
        separated.push_bind_unseparated(merged.subject.as_str());
    }

    if payload.chapter.is_some() {
        separated.push("chapter = ");
        separated.push_bind_unseparated(merged.chapter.clone());
    }

    if payload.content.is_some() {
        separated.push("content = ");
        separated.push_bind_unseparated(merged.content.clone());
    }

    if payload.options.is_some() {
        separated.push("options = ");
        separated.push_bind_unseparated(SqlJson(merged.options.clone()));
    }

    if payload.correct_option.is_some() {
        separated.push("correct_option = ");
        separated.push_bind_unseparated(i32::from(merged.correct_option));
    }

    if payload.explanation.is_some() {
        separated.push("explanation = ");
        separated.push_bind_unseparated(merged.explanation.clone());
    }

    if payload.difficulty.is_some() {
        separated.push("difficulty = ");
        separated.push_bind_unseparated(merged.difficulty.as_str());
    }

    if payload.tags.is_some() {
        separated.push("tags = ");
        separated.push_bind_unseparated(SqlJson(merged.tags.clone()));
    }

    if payload.is_pyq.is_some() {
        separated.push("is_pyq = ");
        separated.push_bind_unseparated(merged.is_pyq);
    }

    if payload.is_pyq.is_some() || payload.pyq_year.is_some() {
        separated.push("pyq_year = ");
        separated.push_bind_unseparated(merged.pyq_year.map(i32::from));
    }

    builder.push(" WHERE id = ");
    builder.push_bind(&id);

    let result = builder.build().execute(&pool).await.map_err(|e| {
        tracing::error!("Failed to update question: {:?}", e);
        AppError::from(e)
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Deletes a question by ID.
/// Admin only.
pub async fn delete_question(
    State(pool): State<PgPool>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM questions WHERE id = $1")
        .bind(&id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete question: {:?}", e);
            AppError::from(e)
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Reports store readiness and the number of eligible questions per exam.
/// Admin only.
pub async fn question_stats(
    State(questions): State<QuestionService>,
) -> Result<impl IntoResponse, AppError> {
    let store = questions.store();
    let ready = store.is_ready().await;

    let mut eligible = serde_json::Map::new();
    if ready {
        for category in ExamCategory::ALL {
            let count = store
                .count_questions(&QuestionFilter::for_category(category))
                .await?;
            eligible.insert(category.as_str().to_string(), json!(count));
        }
    }

    // a corrupt cache file is reported, not turned into a client error
    let cached = match questions.cache().load().await {
        Ok(records) => Some(records.len()),
        Err(e) => {
            tracing::warn!(
                "Question cache {} unreadable: {}",
                questions.cache().path().display(),
                e
            );
            None
        }
    };

    Ok(Json(json!({
        "store_ready": ready,
        "eligible": eligible,
        "cached": cached,
    })))
}

/// Copies every eligible question from the store into the local cache file.
/// Admin only. An empty store never overwrites the existing cache.
pub async fn snapshot_questions(
    State(questions): State<QuestionService>,
) -> Result<impl IntoResponse, AppError> {
    let store = questions.store();
    if !store.is_ready().await {
        return Err(AppError::InternalServerError(
            "Question store is unavailable".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    let mut snapshot = Vec::new();
    for category in ExamCategory::ALL {
        let found = store
            .find_questions(&QuestionFilter::for_category(category), SNAPSHOT_LIMIT)
            .await?;
        for question in found {
            if seen.insert(question.id.clone()) {
                snapshot.push(question);
            }
        }
    }

    if snapshot.is_empty() {
        tracing::warn!("Question store is empty, keeping existing cache file");
        return Err(AppError::Conflict(
            "Question store is empty; the existing cache was left unchanged".to_string(),
        ));
    }

    questions.cache().store(&snapshot).await?;
    tracing::info!(
        "Snapshot of {} questions written to {}",
        snapshot.len(),
        questions.cache().path().display()
    );

    Ok(Json(json!({
        "stored": snapshot.len(),
        "path": questions.cache().path().display().to_string(),
    })))
}

/// Creates a new free lecture.
/// Admin only.
pub async fn create_lecture(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateLectureRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO lectures (title, subject, class_level, chapter, video_url, duration_minutes)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(clean_html(&payload.title))
    .bind(payload.subject.as_str())
    .bind(payload.class_level)
    .bind(clean_html(&payload.chapter))
    .bind(&payload.video_url)
    .bind(payload.duration_minutes)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create lecture: {:?}", e);
        AppError::from(e)
    })?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// Deletes a lecture by ID.
/// Admin only.
pub async fn delete_lecture(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM lectures WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete lecture: {:?}", e);
            AppError::from(e)
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Lecture not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
