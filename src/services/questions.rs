// src/services/questions.rs

use std::sync::Arc;

use serde::Serialize;

use crate::{
    models::question::{ExamCategory, Question},
    services::{
        cache::LocalQuestionCache,
        samples::builtin_samples,
        store::{QuestionFilter, QuestionStore},
    },
};

/// Tier that produced a batch of questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionSource {
    Primary,
    Secondary,
    BuiltinSample,
}

/// Questions together with their provenance.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionBatch {
    pub questions: Vec<Question>,
    pub source: QuestionSource,
    pub used_fallback: bool,
}

impl QuestionBatch {
    fn new(questions: Vec<Question>, source: QuestionSource) -> Self {
        Self {
            questions,
            source,
            used_fallback: source != QuestionSource::Primary,
        }
    }
}

/// Resolves question requests through the primary store, the local cache and
/// the built-in samples, in that order.
#[derive(Clone)]
pub struct QuestionService {
    store: Arc<dyn QuestionStore>,
    cache: LocalQuestionCache,
}

impl QuestionService {
    pub fn new(store: Arc<dyn QuestionStore>, cache: LocalQuestionCache) -> Self {
        Self { store, cache }
    }

    pub fn store(&self) -> &Arc<dyn QuestionStore> {
        &self.store
    }

    pub fn cache(&self) -> &LocalQuestionCache {
        &self.cache
    }

    /// Never fails: every degradation is absorbed into the next tier.
    pub async fn fetch_questions(&self, category: ExamCategory, limit: i64) -> QuestionBatch {
        let limit = limit.max(1);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);

        let primary = self.fetch_primary(category, limit).await;
        if !primary.is_empty() {
            tracing::debug!("Served {} {} question(s) from primary store", primary.len(), category);
            return QuestionBatch::new(primary, QuestionSource::Primary);
        }

        let cached = match self.cache.find(category, take).await {
            Ok(questions) => questions,
            Err(e) => {
                tracing::warn!("Question cache {} unreadable: {}", self.cache.path().display(), e);
                Vec::new()
            }
        };
        if !cached.is_empty() {
            tracing::warn!("Serving {} {} question(s) from local cache", cached.len(), category);
            return QuestionBatch::new(cached, QuestionSource::Secondary);
        }

        tracing::warn!("No stored questions for {}, serving built-in samples", category);
        QuestionBatch::new(builtin_samples(category, take), QuestionSource::BuiltinSample)
    }

    async fn fetch_primary(&self, category: ExamCategory, limit: i64) -> Vec<Question> {
        if !self.store.is_ready().await {
            tracing::warn!("Question store not ready, falling back");
            return Vec::new();
        }

        let filter = QuestionFilter::for_category(category);
        match self.store.find_questions(&filter, limit).await {
            Ok(questions) => {
                let total = questions.len();
                let questions: Vec<Question> = questions
                    .into_iter()
                    .filter(Question::is_well_formed)
                    .collect();
                if questions.len() < total {
                    tracing::warn!(
                        "Dropped {} malformed question(s) from primary store",
                        total - questions.len()
                    );
                }
                questions
            }
            Err(e) => {
                tracing::warn!("Question store query failed, falling back: {}", e);
                Vec::new()
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::MemoryStore;
    use super::*;
    use crate::models::question::{Subject, fixtures::question};

    fn empty_cache() -> LocalQuestionCache {
        LocalQuestionCache::new(
            std::env::temp_dir().join(format!("absent-{}.json", uuid::Uuid::new_v4())),
        )
    }

    async fn cache_with(questions: &[Question]) -> LocalQuestionCache {
        let cache = empty_cache();
        cache.store(questions).await.unwrap();
        cache
    }

    fn many(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| question(&format!("q{}", i), Subject::Physics, "Optics"))
            .collect()
    }

    #[tokio::test]
    async fn test_primary_returns_exactly_limit() {
        let service = QuestionService::new(Arc::new(MemoryStore::with(many(10))), empty_cache());
        let batch = service.fetch_questions(ExamCategory::Neet, 4).await;

        assert_eq!(batch.source, QuestionSource::Primary);
        assert!(!batch.used_fallback);
        let ids: Vec<&str> = batch.questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["q0", "q1", "q2", "q3"]);
    }

    #[tokio::test]
    async fn test_empty_primary_falls_back_to_cache() {
        let cache = cache_with(&[question("c1", Subject::Biology, "Genetics")]).await;
        let service = QuestionService::new(Arc::new(MemoryStore::with(Vec::new())), cache.clone());
        let batch = service.fetch_questions(ExamCategory::Neet, 5).await;

        assert_eq!(batch.source, QuestionSource::Secondary);
        assert!(batch.used_fallback);
        assert_eq!(batch.questions.len(), 1);
        let _ = tokio::fs::remove_file(cache.path()).await;
    }

    #[tokio::test]
    async fn test_unready_or_failing_store_falls_back_to_cache() {
        let cache = cache_with(&many(3)).await;

        let mut down = MemoryStore::with(many(10));
        down.ready = false;
        let service = QuestionService::new(Arc::new(down), cache.clone());
        assert_eq!(
            service.fetch_questions(ExamCategory::Jee, 5).await.source,
            QuestionSource::Secondary
        );

        let mut failing = MemoryStore::with(many(10));
        failing.fail = true;
        let service = QuestionService::new(Arc::new(failing), cache.clone());
        let batch = service.fetch_questions(ExamCategory::Jee, 2).await;
        assert_eq!(batch.source, QuestionSource::Secondary);
        assert_eq!(batch.questions.len(), 2);

        let _ = tokio::fs::remove_file(cache.path()).await;
    }

    #[tokio::test]
    async fn test_everything_empty_serves_builtin_samples() {
        let service = QuestionService::new(Arc::new(MemoryStore::with(Vec::new())), empty_cache());
        let batch = service.fetch_questions(ExamCategory::Neet, 3).await;

        assert_eq!(batch.source, QuestionSource::BuiltinSample);
        assert!(batch.used_fallback);
        assert_eq!(batch.questions.len(), 3);
        assert!(batch.questions.iter().all(|q| q.id.starts_with("sample-")));
    }

    #[tokio::test]
    async fn test_cache_without_matching_rows_serves_samples() {
        let cache = cache_with(&[question("m1", Subject::Mathematics, "Calculus")]).await;
        let service = QuestionService::new(Arc::new(MemoryStore::with(Vec::new())), cache.clone());
        let batch = service.fetch_questions(ExamCategory::Neet, 10).await;

        assert_eq!(batch.source, QuestionSource::BuiltinSample);
        let _ = tokio::fs::remove_file(cache.path()).await;
    }

    #[tokio::test]
    async fn test_jee_pyq_never_served_for_neet() {
        let mut pyq = question("pyq", Subject::Physics, "Optics");
        pyq.is_pyq = true;
        pyq.exam_type = ExamCategory::Jee;
        pyq.pyq_year = Some(2021);
        let regular = question("regular", Subject::Physics, "Optics");

        let service = QuestionService::new(
            Arc::new(MemoryStore::with(vec![pyq, regular])),
            empty_cache(),
        );

        let neet = service.fetch_questions(ExamCategory::Neet, 10).await;
        let ids: Vec<&str> = neet.questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["regular"]);

        let jee = service.fetch_questions(ExamCategory::Jee, 10).await;
        assert_eq!(jee.questions.len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_primary_rows_dropped() {
        let mut broken = question("broken", Subject::Physics, "Optics");
        broken.options.truncate(2);
        let service = QuestionService::new(
            Arc::new(MemoryStore::with(vec![broken, question("ok", Subject::Physics, "Optics")])),
            empty_cache(),
        );
        let batch = service.fetch_questions(ExamCategory::Neet, 10).await;
        assert_eq!(batch.source, QuestionSource::Primary);
        assert_eq!(batch.questions.len(), 1);
    }

    #[tokio::test]
    async fn test_limit_clamped_to_one() {
        let service = QuestionService::new(Arc::new(MemoryStore::with(many(5))), empty_cache());
        assert_eq!(service.fetch_questions(ExamCategory::Neet, 0).await.questions.len(), 1);
    }
}
