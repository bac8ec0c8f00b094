// src/services/cache.rs

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{
    error::AppError,
    models::question::{ExamCategory, Question},
};

/// Flat JSON file of previously fetched questions, used when the primary store is down.
#[derive(Debug, Clone)]
pub struct LocalQuestionCache {
    path: PathBuf,
}

impl LocalQuestionCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole file. A missing file is an empty cache; records that do
    /// not deserialize or break the question invariants are skipped.
    pub async fn load(&self) -> Result<Vec<Question>, AppError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("Question cache {} does not exist", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let records: Vec<serde_json::Value> = serde_json::from_str(&raw)?;
        let total = records.len();
        let questions: Vec<Question> = records
            .into_iter()
            .filter_map(|record| serde_json::from_value::<Question>(record).ok())
            .filter(Question::is_well_formed)
            .collect();

        if questions.len() < total {
            tracing::warn!(
                "Skipped {} malformed record(s) in {}",
                total - questions.len(),
                self.path.display()
            );
        }
        Ok(questions)
    }

    /// Questions eligible for `category` by class and subject, in file order.
    pub async fn find(&self, category: ExamCategory, limit: usize) -> Result<Vec<Question>, AppError> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .filter(|q| q.is_eligible_for(category, false))
            .take(limit)
            .collect())
    }

    /// Replaces the cache file with `questions`.
    pub async fn store(&self, questions: &[Question]) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_vec_pretty(questions)
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        // write next to the target and rename so readers never see a partial file
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
