// src/services/analysis.rs

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;

use crate::{
    config::MAX_INCORRECT_IN_PROMPT,
    models::{
        analysis::{AnalysisPatch, StudentAnswer, TestAnalysis},
        question::ExamCategory,
    },
    services::{
        ai::{GenerationParams, TextGenerator},
        scoring,
    },
};

/// Longest list accepted from a reply section.
const MAX_LIST_ITEMS: usize = 10;

/// Plausible range for a weekly study-hours recommendation.
const STUDY_HOURS_RANGE: std::ops::RangeInclusive<u32> = 1..=100;

const FEEDBACK: &str = "FEEDBACK";
const PRIORITY_SUBJECTS: &str = "PRIORITY_SUBJECTS";
const RECOMMENDED_TOPICS: &str = "RECOMMENDED_TOPICS";
const FOCUS_AREAS: &str = "FOCUS_AREAS";
const STUDY_HOURS: &str = "STUDY_HOURS";

/// Matches a section label at the start of a line, tolerating markdown
/// decoration such as `**FEEDBACK:**` or `## Focus areas:`.
static LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?mi)^[ \t]*[*#]*[ \t]*(feedback|priority[ _]subjects|recommended[ _]topics|focus[ _]areas|study[ _]hours)[ \t]*\**[ \t]*:[ \t]*\**",
    )
    .expect("label pattern must compile")
});

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("number pattern must compile"));

/// Scores a finished test and, when possible, enriches the narrative part
/// with feedback from a text-generation service.
#[derive(Clone)]
pub struct AnalysisService {
    generator: Arc<dyn TextGenerator>,
    params: GenerationParams,
    timeout: Duration,
}

impl AnalysisService {
    pub fn new(generator: Arc<dyn TextGenerator>, params: GenerationParams, timeout: Duration) -> Self {
        Self {
            generator,
            params,
            timeout,
        }
    }

    /// Always returns a complete analysis. Score, grade and subject breakdown
    /// are computed locally; enrichment failures only cost the narrative fields.
    pub async fn analyze(&self, category: ExamCategory, answers: &[StudentAnswer]) -> TestAnalysis {
        let mut analysis = scoring::score(category, answers);
        if answers.is_empty() {
            return analysis;
        }

        let prompt = build_prompt(&analysis, answers);
        let reply = match tokio::time::timeout(self.timeout, self.generator.generate(&prompt, self.params)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                tracing::warn!("AI analysis unavailable, keeping template feedback: {}", e);
                return analysis;
            }
            Err(_) => {
                tracing::warn!("AI analysis timed out after {:?}", self.timeout);
                return analysis;
            }
        };

        let patch = parse_reply(&reply);
        if patch.is_empty() {
            tracing::warn!("AI reply contained no recognizable sections");
        } else {
            analysis.apply(patch);
        }
        analysis
    }
}

/// Subject/chapter pairs of wrong or skipped answers, capped for the prompt.
fn incorrect_pairs(answers: &[StudentAnswer]) -> Vec<(String, String)> {
    answers
        .iter()
        .filter(|a| !a.is_correct())
        .take(MAX_INCORRECT_IN_PROMPT)
        .map(|a| (a.question.subject.to_string(), a.question.chapter.clone()))
        .collect()
}

pub fn build_prompt(analysis: &TestAnalysis, answers: &[StudentAnswer]) -> String {
    let mut prompt = format!(
        "Exam: {} mock test\nOverall score: {}/{} ({}%), grade {}\nUnanswered: {}\n\nSubject-wise performance:\n",
        analysis.exam_category,
        analysis.correct_answers,
        analysis.total_questions,
        analysis.score_percentage,
        analysis.grade,
        analysis.unanswered
    );
    for (subject, s) in &analysis.subject_analysis {
        let weak = if s.weak_topics.is_empty() {
            "none".to_string()
        } else {
            s.weak_topics.join(", ")
        };
        prompt.push_str(&format!(
            "- {}: {}/{} ({}%), weak chapters: {}\n",
            subject, s.score, s.total, s.percentage, weak
        ));
    }

    let incorrect = incorrect_pairs(answers);
    if !incorrect.is_empty() {
        prompt.push_str("\nIncorrectly answered questions (subject - chapter):\n");
        for (subject, chapter) in incorrect {
            prompt.push_str(&format!("- {} - {}\n", subject, chapter));
        }
    }

    prompt.push_str(&format!(
        "\nRespond with the following sections, each on its own line starting with the label and a colon:\n\
         {FEEDBACK}: 3-5 sentences of personalised feedback.\n\
         {PRIORITY_SUBJECTS}: comma-separated subjects to prioritise.\n\
         {RECOMMENDED_TOPICS}: comma-separated chapters to revise.\n\
         {FOCUS_AREAS}: comma-separated skills or habits to work on.\n\
         {STUDY_HOURS}: recommended study hours per week as a single number.\n"
    ));
    prompt
}

fn canonical_label(raw: &str) -> String {
    raw.to_ascii_uppercase().replace(' ', "_")
}

/// Removes a leading bullet (`-`, `*`, `•`) or ordinal (`1.`, `2)`).
fn strip_marker(item: &str) -> &str {
    let item = item.trim().trim_start_matches(['-', '*', '•']).trim_start();
    let digits = item.len() - item.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 && item[digits..].starts_with(['.', ')']) {
        item[digits + 1..].trim_start()
    } else {
        item
    }
}

/// Splits a section into list items.
fn parse_list(section: &str) -> Option<Vec<String>> {
    let items: Vec<String> = section
        .split([',', ';', '\n'])
        .map(|item| strip_marker(item).trim_end_matches('.').trim().to_string())
        .filter(|item| !item.is_empty())
        .take(MAX_LIST_ITEMS)
        .collect();
    (!items.is_empty()).then_some(items)
}

fn parse_hours(section: &str) -> Option<u32> {
    NUMBER
        .find(section)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|hours| STUDY_HOURS_RANGE.contains(hours))
}

/// Extracts labelled sections from a free-text reply. Each section runs until
/// the next known label; the first occurrence of a label wins.
pub fn parse_reply(reply: &str) -> AnalysisPatch {
    let labels: Vec<(String, usize, usize)> = LABEL
        .captures_iter(reply)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            Some((canonical_label(name.as_str()), whole.start(), whole.end()))
        })
        .collect();

    let mut patch = AnalysisPatch::default();
    for (i, (label, _, body_start)) in labels.iter().enumerate() {
        let body_end = labels.get(i + 1).map_or(reply.len(), |next| next.1);
        let body = reply[*body_start..body_end].trim();
        if body.is_empty() {
            continue;
        }

        match label.as_str() {
            FEEDBACK if patch.detailed_feedback.is_none() => {
                patch.detailed_feedback = Some(body.to_string());
            }
            PRIORITY_SUBJECTS if patch.priority_subjects.is_none() => {
                patch.priority_subjects = parse_list(body);
            }
            RECOMMENDED_TOPICS if patch.recommended_topics.is_none() => {
                patch.recommended_topics = parse_list(body);
            }
            FOCUS_AREAS if patch.focus_areas.is_none() => {
                patch.focus_areas = parse_list(body);
            }
            STUDY_HOURS if patch.weekly_study_hours.is_none() => {
                patch.weekly_study_hours = parse_hours(body);
            }
            _ => {}
        }
    }
    patch
}
