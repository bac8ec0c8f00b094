// src/handlers/lecture.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    error::AppError,
    models::lecture::{Lecture, LectureListParams},
};

/// Lists free lectures, optionally filtered by subject and class.
pub async fn list_lectures(
    State(pool): State<PgPool>,
    Query(params): Query<LectureListParams>,
) -> Result<impl IntoResponse, AppError> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT id, title, subject, class_level, chapter, video_url, duration_minutes, created_at \
         FROM lectures WHERE TRUE",
    );

    if let Some(subject) = params.subject {
        builder.push(" AND subject = ");
        builder.push_bind(subject.as_str());
    }
    if let Some(class_level) = params.class_level {
        builder.push(" AND class_level = ");
        builder.push_bind(class_level);
    }
    builder.push(" ORDER BY class_level, subject, chapter, id");

    let lectures: Vec<Lecture> = builder
        .build_query_as()
        .fetch_all(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list lectures: {:?}", e);
            AppError::from(e)
        })?;

    Ok(Json(lectures))
}
