// src/config.rs

use std::env;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;

/// Overall percentage at or above which a subject counts as a strength.
pub const STRENGTH_THRESHOLD: u32 = 70;

/// Overall percentage below which a subject counts as a weakness.
pub const WEAKNESS_THRESHOLD: u32 = 50;

/// Chapter accuracy below which the chapter is reported as a weak topic.
pub const WEAK_TOPIC_THRESHOLD: u32 = 60;

/// Upper bound on incorrect (subject, chapter) pairs embedded in the AI prompt.
pub const MAX_INCORRECT_IN_PROMPT: usize = 10;

pub const DEFAULT_QUESTION_LIMIT: i64 = 30;
pub const MAX_QUESTION_LIMIT: i64 = 200;

/// Settings for the external text-generation service.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// `None` disables enrichment entirely.
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(30),
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub port: u16,
    pub admin_username: Option<String>,
    /// Argon2 hash of the admin password, computed at start-up.
    pub admin_password_hash: Option<String>,
    pub question_cache_path: String,
    pub store_query_timeout: Duration,
    pub ai: AiConfig,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let defaults = AiConfig::default();
        let ai = AiConfig {
            api_key: env::var("AI_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            api_base: env::var("AI_API_BASE").unwrap_or(defaults.api_base),
            model: env::var("AI_MODEL").unwrap_or(defaults.model),
            timeout: Duration::from_secs(parse_or("AI_TIMEOUT_SECS", 30)),
            temperature: parse_or("AI_TEMPERATURE", defaults.temperature),
            max_tokens: parse_or("AI_MAX_TOKENS", defaults.max_tokens),
        };

        Self {
            database_url,
            jwt_secret,
            jwt_expiration: parse_or("JWT_EXPIRATION", 3600),
            rust_log,
            port: parse_or("PORT", 3000),
            admin_username: env::var("ADMIN_USERNAME").ok(),
            // main.rs replaces the plain password from ADMIN_PASSWORD with its hash
            admin_password_hash: None,
            question_cache_path: env::var("QUESTION_CACHE_PATH")
                .unwrap_or_else(|_| "data/questions_cache.json".to_string()),
            store_query_timeout: Duration::from_secs(parse_or("STORE_QUERY_TIMEOUT_SECS", 5)),
            ai,
        }
    }
}

/// Reads and parses an environment variable, falling back to `default`
/// when it is unset or unparseable.
fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid value for {}: {:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}
