// src/models/question.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

/// Exam a mock test is prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExamCategory {
    #[serde(rename = "NEET")]
    Neet,
    #[serde(rename = "JEE")]
    Jee,
    #[serde(rename = "CBSE")]
    Cbse,
}

impl ExamCategory {
    pub const ALL: [ExamCategory; 3] = [ExamCategory::Neet, ExamCategory::Jee, ExamCategory::Cbse];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExamCategory::Neet => "NEET",
            ExamCategory::Jee => "JEE",
            ExamCategory::Cbse => "CBSE",
        }
    }

    /// Class levels whose questions are eligible for this exam.
    pub fn class_levels(&self) -> &'static [u8] {
        match self {
            ExamCategory::Neet | ExamCategory::Jee => &[11, 12],
            ExamCategory::Cbse => &[9, 10, 11, 12],
        }
    }

    /// Subjects examined in this category.
    pub fn subjects(&self) -> &'static [Subject] {
        match self {
            ExamCategory::Neet => &[Subject::Physics, Subject::Chemistry, Subject::Biology],
            ExamCategory::Jee => &[Subject::Physics, Subject::Chemistry, Subject::Mathematics],
            ExamCategory::Cbse => &[
                Subject::Physics,
                Subject::Chemistry,
                Subject::Biology,
                Subject::Mathematics,
            ],
        }
    }
}

impl fmt::Display for ExamCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExamCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEET" => Ok(ExamCategory::Neet),
            "JEE" => Ok(ExamCategory::Jee),
            "CBSE" => Ok(ExamCategory::Cbse),
            other => Err(format!("unknown exam category '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Subject {
    Physics,
    Chemistry,
    Biology,
    Mathematics,
}

impl Subject {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Physics => "Physics",
            Subject::Chemistry => "Chemistry",
            Subject::Biology => "Biology",
            Subject::Mathematics => "Mathematics",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Physics" => Ok(Subject::Physics),
            "Chemistry" => Ok(Subject::Chemistry),
            "Biology" => Ok(Subject::Biology),
            "Mathematics" => Ok(Subject::Mathematics),
            other => Err(format!("unknown subject '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

/// Allowed class levels across all categories.
pub const CLASS_LEVELS: [u8; 4] = [9, 10, 11, 12];

/// A multiple-choice exam question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,

    /// Exam the question belongs to. Only decisive for previous-year questions.
    pub exam_type: ExamCategory,

    pub class_level: u8,

    pub subject: Subject,

    /// Chapter or topic name.
    pub chapter: String,

    /// Question body; may contain formula shorthand such as `H2SO4` or `x^2`.
    pub content: String,

    /// Exactly four answer options.
    pub options: Vec<String>,

    /// Index of the correct option, in `0..=3`.
    pub correct_option: u8,

    pub explanation: Option<String>,

    pub difficulty: Difficulty,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub is_pyq: bool,

    pub pyq_year: Option<u16>,
}

impl Question {
    /// Checks the structural invariants of a stored question.
    pub fn is_well_formed(&self) -> bool {
        self.options.len() == 4
            && self.options.iter().all(|o| !o.trim().is_empty())
            && (self.correct_option as usize) < self.options.len()
            && CLASS_LEVELS.contains(&self.class_level)
            && !self.content.trim().is_empty()
    }

    /// A previous-year question carries its year; any other question has none.
    pub fn has_consistent_pyq(&self) -> bool {
        self.is_pyq == self.pyq_year.is_some()
    }

    /// Whether the question may be served for `category`.
    ///
    /// `honor_pyq` restricts previous-year questions to their own exam; the
    /// local cache tier evaluates the predicate without it.
    pub fn is_eligible_for(&self, category: ExamCategory, honor_pyq: bool) -> bool {
        category.class_levels().contains(&self.class_level)
            && category.subjects().contains(&self.subject)
            && (!honor_pyq || !self.is_pyq || self.exam_type == category)
    }
}

/// Raw row of the `questions` table.
#[derive(Debug, Clone, FromRow)]
pub struct QuestionRow {
    pub id: String,
    pub exam_type: String,
    pub class_level: i32,
    pub subject: String,
    pub chapter: String,
    pub content: String,
    pub options: Json<Vec<String>>,
    pub correct_option: i32,
    pub explanation: Option<String>,
    pub difficulty: String,
    pub tags: Json<Vec<String>>,
    pub is_pyq: bool,
    pub pyq_year: Option<i32>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl TryFrom<QuestionRow> for Question {
    type Error = String;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        let class_level = u8::try_from(row.class_level)
            .map_err(|_| format!("class_level {} out of range", row.class_level))?;
        let correct_option = u8::try_from(row.correct_option)
            .map_err(|_| format!("correct_option {} out of range", row.correct_option))?;
        let pyq_year = row
            .pyq_year
            .map(|y| u16::try_from(y).map_err(|_| format!("pyq_year {} out of range", y)))
            .transpose()?;

        Ok(Question {
            id: row.id,
            exam_type: row.exam_type.parse()?,
            class_level,
            subject: row.subject.parse()?,
            chapter: row.chapter,
            content: row.content,
            options: row.options.0,
            correct_option,
            explanation: row.explanation,
            difficulty: row.difficulty.parse()?,
            tags: row.tags.0,
            is_pyq: row.is_pyq,
            pyq_year,
        })
    }
}

/// DTO for creating a new question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    pub exam_type: ExamCategory,
    #[validate(range(min = 9, max = 12))]
    pub class_level: u8,
    pub subject: Subject,
    #[validate(length(min = 1, max = 200))]
    pub chapter: String,
    #[validate(length(min = 1, max = 4000))]
    pub content: String,
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,
    #[validate(range(max = 3))]
    pub correct_option: u8,
    #[validate(length(max = 4000))]
    pub explanation: Option<String>,
    pub difficulty: Difficulty,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_pyq: bool,
    #[validate(range(min = 1950, max = 2100))]
    pub pyq_year: Option<u16>,
}

/// DTO for updating a question. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuestionRequest {
    pub exam_type: Option<ExamCategory>,
    #[validate(range(min = 9, max = 12))]
    pub class_level: Option<u8>,
    pub subject: Option<Subject>,
    #[validate(length(min = 1, max = 200))]
    pub chapter: Option<String>,
    #[validate(length(min = 1, max = 4000))]
    pub content: Option<String>,
    #[validate(custom(function = validate_options))]
    pub options: Option<Vec<String>>,
    #[validate(range(max = 3))]
    pub correct_option: Option<u8>,
    #[validate(length(max = 4000))]
    pub explanation: Option<String>,
    pub difficulty: Option<Difficulty>,
    #[validate(length(max = 20))]
    pub tags: Option<Vec<String>>,
    pub is_pyq: Option<bool>,
    #[validate(range(min = 1950, max = 2100))]
    pub pyq_year: Option<u16>,
}

impl UpdateQuestionRequest {
    pub fn is_empty(&self) -> bool {
        self.exam_type.is_none()
            && self.class_level.is_none()
            && self.subject.is_none()
            && self.chapter.is_none()
            && self.content.is_none()
            && self.options.is_none()
            && self.correct_option.is_none()
            && self.explanation.is_none()
            && self.difficulty.is_none()
            && self.tags.is_none()
            && self.is_pyq.is_none()
            && self.pyq_year.is_none()
    }
}

fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    if options.len() != 4 {
        return Err(validator::ValidationError::new("exactly_four_options_required"));
    }
    for opt in options {
        if opt.trim().is_empty() {
            return Err(validator::ValidationError::new("option_cannot_be_empty"));
        }
        if opt.len() > 500 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::fixtures::question;
    use super::*;

    #[test]
    fn test_pyq_year_must_match_flag() {
        let mut q = question("q1", Subject::Physics, "Kinematics");
        assert!(q.has_consistent_pyq());

        q.pyq_year = Some(2021);
        assert!(!q.has_consistent_pyq());

        q.is_pyq = true;
        assert!(q.has_consistent_pyq());

        q.pyq_year = None;
        assert!(!q.has_consistent_pyq());
    }

    #[test]
    fn test_pyq_only_eligible_for_its_own_exam() {
        let mut q = question("q1", Subject::Physics, "Kinematics");
        q.is_pyq = true;
        q.exam_type = ExamCategory::Jee;

        assert!(q.is_eligible_for(ExamCategory::Jee, true));
        assert!(!q.is_eligible_for(ExamCategory::Neet, true));
        // cache tier ignores the PYQ rule
        assert!(q.is_eligible_for(ExamCategory::Neet, false));
    }

    #[test]
    fn test_regular_question_eligible_for_every_matching_exam() {
        let q = question("q1", Subject::Chemistry, "Mole Concept");
        assert!(q.is_eligible_for(ExamCategory::Neet, true));
        assert!(q.is_eligible_for(ExamCategory::Jee, true));
        assert!(q.is_eligible_for(ExamCategory::Cbse, true));
    }

    #[test]
    fn test_subject_and_class_sets_respected() {
        let bio = question("q1", Subject::Biology, "Genetics");
        assert!(!bio.is_eligible_for(ExamCategory::Jee, true));

        let mut junior = question("q2", Subject::Physics, "Motion");
        junior.class_level = 9;
        assert!(!junior.is_eligible_for(ExamCategory::Neet, true));
        assert!(junior.is_eligible_for(ExamCategory::Cbse, true));
    }

    #[test]
    fn test_is_well_formed() {
        let mut q = question("q1", Subject::Physics, "Optics");
        assert!(q.is_well_formed());

        q.options.pop();
        assert!(!q.is_well_formed());

        let mut q = question("q2", Subject::Physics, "Optics");
        q.correct_option = 4;
        assert!(!q.is_well_formed());

        let mut q = question("q3", Subject::Physics, "Optics");
        q.options[2] = "  ".into();
        assert!(!q.is_well_formed());
    }

    #[test]
    fn test_row_conversion_rejects_unknown_enum() {
        let row = QuestionRow {
            id: "x".into(),
            exam_type: "GATE".into(),
            class_level: 11,
            subject: "Physics".into(),
            chapter: "Optics".into(),
            content: "?".into(),
            options: Json(vec!["a".into(), "b".into(), "c".into(), "d".into()]),
            correct_option: 1,
            explanation: None,
            difficulty: "easy".into(),
            tags: Json(Vec::new()),
            is_pyq: false,
            pyq_year: None,
            created_at: None,
        };
        assert!(Question::try_from(row).is_err());
    }

    #[test]
    fn test_create_request_requires_four_options() {
        let req: CreateQuestionRequest = serde_json::from_value(serde_json::json!({
            "exam_type": "NEET",
            "class_level": 11,
            "subject": "Biology",
            "chapter": "Cell",
            "content": "Powerhouse of the cell?",
            "options": ["Mitochondria", "Nucleus", "Ribosome"],
            "correct_option": 0,
            "difficulty": "easy"
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_request_rejects_out_of_range_answer_and_class() {
        let req: CreateQuestionRequest = serde_json::from_value(serde_json::json!({
            "exam_type": "JEE",
            "class_level": 8,
            "subject": "Physics",
            "chapter": "Optics",
            "content": "Focal length?",
            "options": ["1", "2", "3", "4"],
            "correct_option": 5,
            "difficulty": "hard"
        }))
        .unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("class_level"));
        assert!(fields.contains_key("correct_option"));
    }
}
