// src/services/scoring.rs

//! Locally computed part of a test analysis. Never touches the network, so the
//! score, grade and subject breakdown are always available.

use std::collections::BTreeMap;

use crate::{
    config::{STRENGTH_THRESHOLD, WEAK_TOPIC_THRESHOLD, WEAKNESS_THRESHOLD},
    models::{
        analysis::{StudentAnswer, StudyPlan, SubjectAnalysis, TestAnalysis},
        question::ExamCategory,
    },
};

/// Cap on weak topics copied into the default study plan.
const MAX_RECOMMENDED_TOPICS: usize = 10;

/// `correct / total × 100`, rounded to the nearest integer. Zero when `total` is zero.
pub fn percentage(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (f64::from(correct) / f64::from(total) * 100.0).round() as u32
}

pub fn grade_for(percentage: u32) -> &'static str {
    match percentage {
        90.. => "A+",
        80..=89 => "A",
        70..=79 => "B+",
        60..=69 => "B",
        50..=59 => "C",
        40..=49 => "D",
        _ => "F",
    }
}

/// Suggested weekly study hours for an overall percentage.
pub fn weekly_hours_for(percentage: u32) -> u32 {
    match percentage {
        80.. => 15,
        60..=79 => 20,
        40..=59 => 28,
        _ => 35,
    }
}

#[derive(Default)]
struct Tally {
    correct: u32,
    total: u32,
}

impl Tally {
    fn record(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
        }
    }

    /// Exact comparison of `correct / total` against a percentage threshold.
    fn below(&self, threshold: u32) -> bool {
        self.correct * 100 < threshold * self.total
    }
}

#[derive(Default)]
struct SubjectTally {
    overall: Tally,
    chapters: BTreeMap<String, Tally>,
}

fn subject_recommendations(subject: &str, pct: u32, weak_topics: &[String]) -> Vec<String> {
    let mut recommendations = Vec::new();
    if pct < WEAKNESS_THRESHOLD {
        recommendations.push(format!(
            "Rebuild the fundamentals of {} from NCERT before attempting more mock tests.",
            subject
        ));
    } else if pct < STRENGTH_THRESHOLD {
        recommendations.push(format!(
            "Practise mixed {} questions to push accuracy above {}%.",
            subject, STRENGTH_THRESHOLD
        ));
    } else {
        recommendations.push(format!("Maintain {} with timed revision sets.", subject));
    }
    if !weak_topics.is_empty() {
        recommendations.push(format!("Revise: {}.", weak_topics.join(", ")));
    }
    recommendations
}

fn template_feedback(analysis: &TestAnalysis) -> String {
    let mut feedback = format!(
        "You scored {}% ({}/{}) in this {} mock test, earning grade {}.",
        analysis.score_percentage,
        analysis.correct_answers,
        analysis.total_questions,
        analysis.exam_category,
        analysis.grade
    );
    if !analysis.strengths.is_empty() {
        feedback.push_str(&format!(" Strong areas: {}.", analysis.strengths.join(", ")));
    }
    if !analysis.weaknesses.is_empty() {
        feedback.push_str(&format!(" Needs attention: {}.", analysis.weaknesses.join(", ")));
    }
    if analysis.unanswered > 0 {
        feedback.push_str(&format!(
            " You left {} question(s) unanswered.",
            analysis.unanswered
        ));
    }
    feedback.push_str(match analysis.score_percentage {
        80.. => " Keep up the consistent revision.",
        50..=79 => " Targeted practice on weak chapters will lift your score.",
        _ => " Focus on core concepts before attempting full-length tests.",
    });
    feedback
}

fn default_study_plan(analysis: &TestAnalysis) -> StudyPlan {
    let mut ranked: Vec<(&String, u32)> = analysis
        .subject_analysis
        .iter()
        .filter(|(_, s)| s.percentage < STRENGTH_THRESHOLD)
        .map(|(name, s)| (name, s.percentage))
        .collect();
    ranked.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));

    let recommended_topics = analysis
        .subject_analysis
        .iter()
        .flat_map(|(name, s)| s.weak_topics.iter().map(move |t| format!("{}: {}", name, t)))
        .take(MAX_RECOMMENDED_TOPICS)
        .collect();

    let mut focus_areas = Vec::new();
    if analysis.score_percentage < 60 {
        focus_areas.push("Concept clarity".to_string());
    }
    if !analysis.weaknesses.is_empty() {
        focus_areas.push(format!("Targeted practice in {}", analysis.weaknesses.join(", ")));
    }
    if analysis.unanswered > 0 {
        focus_areas.push("Time management and attempt strategy".to_string());
    }
    focus_areas.push("Weekly full-length mock tests".to_string());

    StudyPlan {
        priority_subjects: ranked.into_iter().map(|(name, _)| name.clone()).collect(),
        recommended_topics,
        weekly_study_hours: weekly_hours_for(analysis.score_percentage),
        focus_areas,
    }
}

/// Builds the complete analysis from the answers alone.
pub fn score(category: ExamCategory, answers: &[StudentAnswer]) -> TestAnalysis {
    let mut subjects: BTreeMap<String, SubjectTally> = BTreeMap::new();
    let mut correct_answers = 0;
    let mut unanswered = 0;

    for answer in answers {
        let correct = answer.is_correct();
        if correct {
            correct_answers += 1;
        }
        if answer.is_unanswered() {
            unanswered += 1;
        }
        let tally = subjects
            .entry(answer.question.subject.to_string())
            .or_default();
        tally.overall.record(correct);
        tally
            .chapters
            .entry(answer.question.chapter.clone())
            .or_default()
            .record(correct);
    }

    let total_questions = answers.len() as u32;
    let score_percentage = percentage(correct_answers, total_questions);

    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    let mut subject_analysis = BTreeMap::new();
    for (name, tally) in subjects {
        let pct = percentage(tally.overall.correct, tally.overall.total);
        if pct >= STRENGTH_THRESHOLD {
            strengths.push(name.clone());
        } else if pct < WEAKNESS_THRESHOLD {
            weaknesses.push(name.clone());
        }
        let weak_topics: Vec<String> = tally
            .chapters
            .iter()
            .filter(|(_, chapter)| chapter.below(WEAK_TOPIC_THRESHOLD))
            .map(|(chapter, _)| chapter.clone())
            .collect();
        let recommendations = subject_recommendations(&name, pct, &weak_topics);
        subject_analysis.insert(
            name,
            SubjectAnalysis {
                score: tally.overall.correct,
                total: tally.overall.total,
                percentage: pct,
                weak_topics,
                recommendations,
            },
        );
    }

    let mut analysis = TestAnalysis {
        exam_category: category,
        score_percentage,
        grade: grade_for(score_percentage).to_string(),
        correct_answers,
        total_questions,
        unanswered,
        strengths,
        weaknesses,
        subject_analysis,
        detailed_feedback: String::new(),
        study_plan: StudyPlan {
            priority_subjects: Vec::new(),
            recommended_topics: Vec::new(),
            weekly_study_hours: 0,
            focus_areas: Vec::new(),
        },
        ai_enriched: false,
    };
    analysis.detailed_feedback = template_feedback(&analysis);
    analysis.study_plan = default_study_plan(&analysis);
    analysis
}


#[cfg(test)]
mod tests {
    use super::testing::answers;
    use super::*;
    use crate::models::question::{Subject, fixtures::question};

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(grade_for(100), "A+");
        assert_eq!(grade_for(90), "A+");
        assert_eq!(grade_for(89), "A");
        assert_eq!(grade_for(80), "A");
        assert_eq!(grade_for(70), "B+");
        assert_eq!(grade_for(60), "B");
        assert_eq!(grade_for(50), "C");
        assert_eq!(grade_for(49), "D");
        assert_eq!(grade_for(40), "D");
        assert_eq!(grade_for(39), "F");
        assert_eq!(grade_for(0), "F");
    }

    #[test]
    fn test_percentage_rounds() {
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn test_seven_of_ten_biology() {
        let analysis = score(ExamCategory::Neet, &answers(Subject::Biology, "Genetics", 7, 10));

        assert_eq!(analysis.score_percentage, 70);
        assert_eq!(analysis.grade, "B+");
        let biology = &analysis.subject_analysis["Biology"];
        assert_eq!((biology.score, biology.total, biology.percentage), (7, 10, 70));
        assert_eq!(analysis.strengths, vec!["Biology"]);
        assert!(analysis.weaknesses.is_empty());
        assert!(biology.weak_topics.is_empty());
    }

    #[test]
    fn test_strength_and_weakness_thresholds() {
        let mut all = answers(Subject::Physics, "Optics", 3, 10);
        all.extend(answers(Subject::Chemistry, "Bonding", 6, 10));
        all.extend(answers(Subject::Biology, "Cell", 5, 10));
        let analysis = score(ExamCategory::Neet, &all);

        assert!(analysis.weaknesses.contains(&"Physics".to_string()));
        // 50 and 60 are neither strengths nor weaknesses
        assert!(!analysis.weaknesses.contains(&"Biology".to_string()));
        assert!(!analysis.strengths.contains(&"Chemistry".to_string()));
        assert!(analysis.strengths.is_empty());
        assert_eq!(analysis.study_plan.priority_subjects, vec!["Physics", "Biology", "Chemistry"]);
    }

    #[test]
    fn test_weak_topics_per_chapter() {
        let mut all = answers(Subject::Physics, "Optics", 1, 2);
        all.extend(answers(Subject::Physics, "Kinematics", 3, 3));
        all.extend(answers(Subject::Physics, "Waves", 3, 5));
        let analysis = score(ExamCategory::Jee, &all);

        // 50% is weak, 60% is not
        assert_eq!(analysis.subject_analysis["Physics"].weak_topics, vec!["Optics"]);
        assert_eq!(analysis.study_plan.recommended_topics, vec!["Physics: Optics"]);
    }

    #[test]
    fn test_unanswered_counted_as_incorrect() {
        let q = question("u1", Subject::Physics, "Optics");
        let analysis = score(
            ExamCategory::Neet,
            &[StudentAnswer::new(q.clone(), None), StudentAnswer::new(q, Some(0))],
        );
        assert_eq!(analysis.unanswered, 1);
        assert_eq!(analysis.correct_answers, 1);
        assert_eq!(analysis.score_percentage, 50);
        assert!(analysis.detailed_feedback.contains("1 question(s) unanswered"));
        assert!(analysis
            .study_plan
            .focus_areas
            .contains(&"Time management and attempt strategy".to_string()));
    }

    #[test]
    fn test_template_feedback_and_defaults() {
        let analysis = score(ExamCategory::Neet, &answers(Subject::Biology, "Genetics", 9, 10));
        assert_eq!(
            analysis.detailed_feedback,
            "You scored 90% (9/10) in this NEET mock test, earning grade A+. \
             Strong areas: Biology. Keep up the consistent revision."
        );
        assert_eq!(analysis.study_plan.weekly_study_hours, 15);
        assert!(analysis.study_plan.priority_subjects.is_empty());
        assert!(!analysis.ai_enriched);
    }

    #[test]
    fn test_empty_answers() {
        let analysis = score(ExamCategory::Cbse, &[]);
        assert_eq!(analysis.score_percentage, 0);
        assert_eq!(analysis.grade, "F");
        assert!(analysis.subject_analysis.is_empty());
    }
}
