// src/models/lecture.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use url::Url;
use validator::Validate;

use crate::models::question::Subject;

/// Represents the 'lectures' table in the database.
/// Free video lectures listed publicly.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Lecture {
    pub id: i64,

    pub title: String,

    /// Subject name, one of the `Subject` values.
    pub subject: String,

    pub class_level: i32,

    pub chapter: String,

    /// Link to the hosted video.
    pub video_url: String,

    pub duration_minutes: Option<i32>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Query parameters for listing lectures.
#[derive(Debug, Deserialize)]
pub struct LectureListParams {
    pub subject: Option<Subject>,
    pub class_level: Option<i32>,
}

/// DTO for creating a new lecture.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLectureRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub subject: Subject,
    #[validate(range(min = 9, max = 12))]
    pub class_level: i32,
    #[validate(length(min = 1, max = 200))]
    pub chapter: String,
    #[validate(length(min = 1, max = 500), custom(function = validate_url_string))]
    pub video_url: String,
    #[validate(range(min = 1, max = 600))]
    pub duration_minutes: Option<i32>,
}

/// Validates that a string is a correctly formatted http(s) URL.
fn validate_url_string(url: &str) -> Result<(), validator::ValidationError> {
    match Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => Err(validator::ValidationError::new("invalid_url")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(video_url: &str) -> CreateLectureRequest {
        CreateLectureRequest {
            title: "Laws of Motion".into(),
            subject: Subject::Physics,
            class_level: 11,
            chapter: "Newton's Laws".into(),
            video_url: video_url.into(),
            duration_minutes: Some(45),
        }
    }

    #[test]
    fn test_valid_lecture_passes() {
        assert!(request("https://videos.example.com/nlm-1").validate().is_ok());
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(request("not a url").validate().is_err());
        assert!(request("ftp://videos.example.com/a").validate().is_err());
    }
}
