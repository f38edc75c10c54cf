use std::collections::HashMap;

use crate::model::assessment::AssessmentDefinition;
use crate::model::ids::QuestionId;

/// Selected option index per question id for one attempt.
pub type AnswerMap = HashMap<QuestionId, usize>;

/// Per-attempt scoring result.
///
/// Every question lands in exactly one bucket: answered correctly, answered
/// wrongly, or left empty. Wrong and empty both score zero points; there is
/// no negative marking for guessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBreakdown {
    score: u32,
    correct: u32,
    wrong: u32,
    empty: u32,
}

impl ScoreBreakdown {
    /// Grades an answer map against the assessment's answer key.
    ///
    /// Walks the questions in order: a missing entry counts as empty, a
    /// matching option index as correct, anything else as wrong. Entries for
    /// ids the assessment does not contain are ignored. The score is
    /// `points_per_correct * correct`.
    #[must_use]
    pub fn from_answers(assessment: &AssessmentDefinition, answers: &AnswerMap) -> Self {
        let mut correct = 0_u32;
        let mut wrong = 0_u32;
        let mut empty = 0_u32;

        for question in assessment.questions() {
            match answers.get(question.id()) {
                None => empty = empty.saturating_add(1),
                Some(&index) if question.is_correct(index) => {
                    correct = correct.saturating_add(1);
                }
                Some(_) => wrong = wrong.saturating_add(1),
            }
        }

        Self {
            score: assessment.points_per_correct().saturating_mul(correct),
            correct,
            wrong,
            empty,
        }
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn wrong(&self) -> u32 {
        self.wrong
    }

    #[must_use]
    pub fn empty(&self) -> u32 {
        self.empty
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.correct
            .saturating_add(self.wrong)
            .saturating_add(self.empty)
    }

    /// Share of correct answers as a whole percent, rounded half-up.
    #[must_use]
    pub fn percent_correct(&self) -> u32 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        let correct = u64::from(self.correct);
        let total = u64::from(total);
        // floor((100 * correct / total) + 0.5) in integer arithmetic
        let percent = (correct * 200 + total) / (total * 2);
        u32::try_from(percent).unwrap_or(100)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::assessment::QuestionDefinition;
    use crate::model::ids::AssessmentId;

    fn build_assessment(correct_indices: &[usize]) -> AssessmentDefinition {
        let questions = correct_indices
            .iter()
            .enumerate()
            .map(|(i, &correct)| {
                QuestionDefinition::new(
                    QuestionId::new(format!("q{}", i + 1)),
                    format!("Prompt {}", i + 1),
                    vec!["a".into(), "b".into(), "c".into()],
                    correct,
                    None,
                )
                .unwrap()
            })
            .collect();

        AssessmentDefinition::new(
            AssessmentId::new("a1"),
            "Scoring",
            None,
            600,
            40,
            4,
            questions,
        )
        .unwrap()
    }

    fn answers(entries: &[(&str, usize)]) -> AnswerMap {
        entries
            .iter()
            .map(|(id, index)| (QuestionId::new(*id), *index))
            .collect()
    }

    #[test]
    fn full_answer_set_with_one_wrong() {
        let assessment = build_assessment(&[1, 0, 2]);
        let breakdown = ScoreBreakdown::from_answers(
            &assessment,
            &answers(&[("q1", 1), ("q2", 0), ("q3", 1)]),
        );

        assert_eq!(breakdown.correct(), 2);
        assert_eq!(breakdown.wrong(), 1);
        assert_eq!(breakdown.empty(), 0);
        assert_eq!(breakdown.score(), 8);
    }

    #[test]
    fn unanswered_questions_count_as_empty() {
        let assessment = build_assessment(&[1, 0, 2]);
        let breakdown = ScoreBreakdown::from_answers(&assessment, &answers(&[("q1", 1)]));

        assert_eq!(breakdown.correct(), 1);
        assert_eq!(breakdown.wrong(), 0);
        assert_eq!(breakdown.empty(), 2);
        assert_eq!(breakdown.score(), 4);
    }

    #[test]
    fn wrong_and_empty_score_the_same() {
        let assessment = build_assessment(&[0, 0]);
        let all_wrong = ScoreBreakdown::from_answers(&assessment, &answers(&[("q1", 1), ("q2", 1)]));
        let all_empty = ScoreBreakdown::from_answers(&assessment, &AnswerMap::new());

        assert_eq!(all_wrong.score(), all_empty.score());
        assert_eq!(all_wrong.score(), 0);
    }

    #[test]
    fn buckets_partition_the_question_set() {
        let assessment = build_assessment(&[1, 0, 2, 1, 0]);
        let breakdown = ScoreBreakdown::from_answers(
            &assessment,
            &answers(&[("q1", 1), ("q3", 0), ("q5", 2)]),
        );

        assert_eq!(
            breakdown.correct() + breakdown.wrong() + breakdown.empty(),
            assessment.question_count() as u32
        );
    }

    #[test]
    fn stray_answer_ids_are_ignored() {
        let assessment = build_assessment(&[1]);
        let breakdown =
            ScoreBreakdown::from_answers(&assessment, &answers(&[("q1", 1), ("ghost", 0)]));

        assert_eq!(breakdown.correct(), 1);
        assert_eq!(breakdown.total(), 1);
    }

    #[test]
    fn percent_rounds_half_up() {
        let assessment = build_assessment(&[0; 8]);
        // 1/8 = 12.5% -> 13
        let breakdown = ScoreBreakdown::from_answers(&assessment, &answers(&[("q1", 0)]));
        assert_eq!(breakdown.percent_correct(), 13);

        // 1/3 = 33.33% -> 33
        let assessment = build_assessment(&[0, 0, 0]);
        let breakdown = ScoreBreakdown::from_answers(&assessment, &answers(&[("q1", 0)]));
        assert_eq!(breakdown.percent_correct(), 33);

        // 2/3 = 66.67% -> 67
        let breakdown =
            ScoreBreakdown::from_answers(&assessment, &answers(&[("q1", 0), ("q2", 0)]));
        assert_eq!(breakdown.percent_correct(), 67);
    }
}
