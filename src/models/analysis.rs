// src/models/analysis.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::question::{ExamCategory, Question};

/// One answered (or skipped) question of a finished test session.
///
/// Carries a copy of the question so the analysis never refetches it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentAnswer {
    pub question: Question,

    /// Selected option index; `None` when the question was left unanswered.
    pub selected_option: Option<u8>,
}

impl StudentAnswer {
    pub fn new(question: Question, selected_option: Option<u8>) -> Self {
        Self {
            question,
            selected_option,
        }
    }

    /// Correctness is derived from the embedded question, never trusted from the client.
    pub fn is_correct(&self) -> bool {
        self.selected_option == Some(self.question.correct_option)
    }

    pub fn is_unanswered(&self) -> bool {
        self.selected_option.is_none()
    }
}

/// DTO for submitting a finished mock test.
#[derive(Debug, Deserialize)]
pub struct SubmitTestRequest {
    pub exam_category: ExamCategory,
    pub answers: Vec<StudentAnswer>,
}

/// Score breakdown for a single subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectAnalysis {
    pub score: u32,
    pub total: u32,
    pub percentage: u32,
    /// Chapters whose accuracy is below the weak-topic threshold.
    pub weak_topics: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyPlan {
    pub priority_subjects: Vec<String>,
    pub recommended_topics: Vec<String>,
    pub weekly_study_hours: u32,
    pub focus_areas: Vec<String>,
}

/// Full report for a test submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestAnalysis {
    pub exam_category: ExamCategory,
    pub score_percentage: u32,
    pub grade: String,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub unanswered: u32,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    /// Keyed by subject name; sorted for stable output.
    pub subject_analysis: BTreeMap<String, SubjectAnalysis>,
    pub detailed_feedback: String,
    pub study_plan: StudyPlan,
    /// Whether any narrative field came from the text-generation service.
    pub ai_enriched: bool,
}

/// Fields recovered from a text-generation reply.
///
/// Every field is optional; only the ones present overwrite the base analysis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisPatch {
    pub detailed_feedback: Option<String>,
    pub priority_subjects: Option<Vec<String>>,
    pub recommended_topics: Option<Vec<String>>,
    pub focus_areas: Option<Vec<String>>,
    pub weekly_study_hours: Option<u32>,
}

impl AnalysisPatch {
    pub fn is_empty(&self) -> bool {
        self.detailed_feedback.is_none()
            && self.priority_subjects.is_none()
            && self.recommended_topics.is_none()
            && self.focus_areas.is_none()
            && self.weekly_study_hours.is_none()
    }
}

impl TestAnalysis {
    /// Overwrites narrative fields with the ones present in `patch`.
    pub fn apply(&mut self, patch: AnalysisPatch) {
        if patch.is_empty() {
            return;
        }
        if let Some(feedback) = patch.detailed_feedback {
            self.detailed_feedback = feedback;
        }
        if let Some(subjects) = patch.priority_subjects {
            self.study_plan.priority_subjects = subjects;
        }
        if let Some(topics) = patch.recommended_topics {
            self.study_plan.recommended_topics = topics;
        }
        if let Some(areas) = patch.focus_areas {
            self.study_plan.focus_areas = areas;
        }
        if let Some(hours) = patch.weekly_study_hours {
            self.study_plan.weekly_study_hours = hours;
        }
        self.ai_enriched = true;
    }
}
