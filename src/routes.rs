// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, formula, lecture, quiz},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (quiz, formula, lectures, auth, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state.
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let quiz_routes = Router::new()
        .route("/questions", get(quiz::get_questions))
        .route("/analyze", post(quiz::analyze_test));

    let formula_routes = Router::new().route("/normalize", post(formula::normalize_text));

    let lecture_routes = Router::new().route("/", get(lecture::list_lectures));

    let auth_routes = Router::new().route("/login", post(auth::login));

    let admin_routes = Router::new()
        .route("/questions", post(admin::create_question))
        .route("/questions/stats", get(admin::question_stats))
        .route("/questions/snapshot", post(admin::snapshot_questions))
        .route(
            "/questions/{id}",
            put(admin::update_question).delete(admin::delete_question),
        )
        .route("/lectures", post(admin::create_lecture))
        .route("/lectures/{id}", delete(admin::delete_lecture))
        // Auth runs first (outermost), then the admin role check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/quiz", quiz_routes)
        .nest("/api/formula", formula_routes)
        .nest("/api/lectures", lecture_routes)
        .nest("/api/auth", auth_routes)
        .nest("/api/admin", admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        config::{AiConfig, Config},
        services::{
            ai::{DisabledGenerator, GenerationParams},
            analysis::AnalysisService,
            cache::LocalQuestionCache,
            questions::{QuestionService, testing::MemoryStore},
        },
        utils::jwt::{ADMIN_ROLE, sign_jwt},
    };

    const SECRET: &str = "router-test-secret";

    fn app() -> Router {
        let database_url = "postgres://mocktest@127.0.0.1:1/mocktest".to_string();
        let pool = PgPoolOptions::new()
            .connect_lazy(&database_url)
            .unwrap();
        let cache_path = std::env::temp_dir().join(format!("routes-{}.json", uuid::Uuid::new_v4()));

        let state = AppState {
            pool,
            config: Config {
                database_url,
                jwt_secret: SECRET.to_string(),
                jwt_expiration: 60,
                rust_log: "error".to_string(),
                port: 0,
                admin_username: None,
                admin_password_hash: None,
                question_cache_path: cache_path.display().to_string(),
                store_query_timeout: Duration::from_secs(1),
                ai: AiConfig::default(),
            },
            questions: QuestionService::new(
                Arc::new(MemoryStore::with(Vec::new())),
                LocalQuestionCache::new(cache_path),
            ),
            analysis: AnalysisService::new(
                Arc::new(DisabledGenerator),
                GenerationParams {
                    temperature: 0.7,
                    max_tokens: 64,
                },
                Duration::from_millis(100),
            ),
        };
        create_router(state)
    }

    fn stats_request(token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/api/admin/questions/stats");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let response = app()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_requires_admin_role() {
        let response = app().oneshot(stats_request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let student = sign_jwt("student", "user", SECRET, 60).unwrap();
        let response = app().oneshot(stats_request(Some(&student))).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let admin = sign_jwt("admin", ADMIN_ROLE, SECRET, 60).unwrap();
        let response = app().oneshot(stats_request(Some(&admin))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_login_disabled_without_admin_credentials() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"username":"admin","password":"secret"}"#))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Admin login is not configured");
    }
}
