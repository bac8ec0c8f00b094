// src/services/samples.rs

use crate::models::question::{Difficulty, ExamCategory, Question, Subject};

struct Sample {
    id: &'static str,
    class_level: u8,
    subject: Subject,
    chapter: &'static str,
    content: &'static str,
    options: [&'static str; 4],
    correct_option: u8,
    explanation: &'static str,
    difficulty: Difficulty,
}

const SAMPLES: &[Sample] = &[
    Sample {
        id: "sample-phy-1",
        class_level: 11,
        subject: Subject::Physics,
        chapter: "Laws of Motion",
        content: "A force of 10 N acts on a body of mass 2 kg. What is its acceleration? (F=ma)",
        options: ["2 m/s2", "5 m/s2", "10 m/s2", "20 m/s2"],
        correct_option: 1,
        explanation: "a = F/m = 10/2 = 5 m/s2",
        difficulty: Difficulty::Easy,
    },
    Sample {
        id: "sample-phy-2",
        class_level: 12,
        subject: Subject::Physics,
        chapter: "Current Electricity",
        content: "Two resistors of 4 ohm and 6 ohm are connected in series. The equivalent resistance is",
        options: ["2.4 ohm", "5 ohm", "10 ohm", "24 ohm"],
        correct_option: 2,
        explanation: "In series the resistances add: 4 + 6 = 10 ohm.",
        difficulty: Difficulty::Easy,
    },
    Sample {
        id: "sample-chem-1",
        class_level: 11,
        subject: Subject::Chemistry,
        chapter: "Some Basic Concepts of Chemistry",
        content: "What is the molar mass of H2SO4?",
        options: ["49 g/mol", "96 g/mol", "98 g/mol", "100 g/mol"],
        correct_option: 2,
        explanation: "2(1) + 32 + 4(16) = 98 g/mol",
        difficulty: Difficulty::Easy,
    },
    Sample {
        id: "sample-chem-2",
        class_level: 12,
        subject: Subject::Chemistry,
        chapter: "Electrochemistry",
        content: "In the reaction Zn + Cu2+ -> Zn2+ + Cu, which species is reduced?",
        options: ["Zn", "Cu2+", "Zn2+", "Cu"],
        correct_option: 1,
        explanation: "Cu2+ gains two electrons and is reduced to Cu.",
        difficulty: Difficulty::Medium,
    },
    Sample {
        id: "sample-bio-1",
        class_level: 11,
        subject: Subject::Biology,
        chapter: "Cell: The Unit of Life",
        content: "Which organelle is known as the powerhouse of the cell?",
        options: ["Nucleus", "Mitochondria", "Golgi apparatus", "Ribosome"],
        correct_option: 1,
        explanation: "Mitochondria produce most of the cell's ATP through aerobic respiration.",
        difficulty: Difficulty::Easy,
    },
    Sample {
        id: "sample-bio-2",
        class_level: 12,
        subject: Subject::Biology,
        chapter: "Principles of Inheritance and Variation",
        content: "The phenotypic ratio of a monohybrid cross in the F2 generation is",
        options: ["1:2:1", "3:1", "9:3:3:1", "1:1"],
        correct_option: 1,
        explanation: "Complete dominance gives a 3:1 phenotypic ratio.",
        difficulty: Difficulty::Easy,
    },
    Sample {
        id: "sample-math-1",
        class_level: 11,
        subject: Subject::Mathematics,
        chapter: "Trigonometric Functions",
        content: "What is the value of sin^2 theta + cos^2 theta?",
        options: ["0", "1", "2", "It depends on theta"],
        correct_option: 1,
        explanation: "This is the fundamental Pythagorean identity.",
        difficulty: Difficulty::Easy,
    },
    Sample {
        id: "sample-math-2",
        class_level: 12,
        subject: Subject::Mathematics,
        chapter: "Integrals",
        content: "The integral of 2x with respect to x is",
        options: ["x^2 + C", "2x^2 + C", "x + C", "2 + C"],
        correct_option: 0,
        explanation: "d/dx (x^2) = 2x",
        difficulty: Difficulty::Easy,
    },
];

impl Sample {
    fn to_question(&self, exam_type: ExamCategory) -> Question {
        Question {
            id: self.id.to_string(),
            exam_type,
            class_level: self.class_level,
            subject: self.subject,
            chapter: self.chapter.to_string(),
            content: self.content.to_string(),
            options: self.options.iter().map(|o| o.to_string()).collect(),
            correct_option: self.correct_option,
            explanation: Some(self.explanation.to_string()),
            difficulty: self.difficulty,
            tags: vec!["sample".to_string()],
            is_pyq: false,
            pyq_year: None,
        }
    }
}

/// Hand-authored questions served when neither the store nor the cache has any.
/// Covers every subject of `category`.
pub fn builtin_samples(category: ExamCategory, limit: usize) -> Vec<Question> {
    SAMPLES
        .iter()
        .map(|s| s.to_question(category))
        .filter(|q| q.is_eligible_for(category, false))
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_subject_covered() {
        for category in ExamCategory::ALL {
            let subjects: HashSet<Subject> = builtin_samples(category, usize::MAX)
                .into_iter()
                .map(|q| q.subject)
                .collect();
            let expected: HashSet<Subject> = category.subjects().iter().copied().collect();
            assert_eq!(subjects, expected, "{}", category);
        }
    }

    #[test]
    fn test_samples_are_well_formed() {
        for q in builtin_samples(ExamCategory::Cbse, usize::MAX) {
            assert!(q.is_well_formed(), "{}", q.id);
        }
    }

    #[test]
    fn test_truncated_to_limit() {
        assert_eq!(builtin_samples(ExamCategory::Neet, 2).len(), 2);
        assert!(builtin_samples(ExamCategory::Jee, 0).is_empty());
    }
}
