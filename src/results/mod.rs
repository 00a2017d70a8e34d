pub mod affinity;
pub mod distribution;
pub mod tally;

use crate::models::{AnswerSet, Question, SubmissionRecord};
use affinity::majority_score;
use distribution::{DEFAULT_BUCKETS, DistributionPoint, build_distribution};
use serde::{Deserialize, Serialize};
use tally::{VoteTally, tally};

// Aggregate view of every submission, seen from one respondent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsSummary {
    /// Vote counts per question and option.
    pub summary: VoteTally,
    pub total: usize,
    /// Histogram of every respondent's score, with 0 and 100 sentinels.
    pub distribution: Vec<DistributionPoint>,
    pub user_score: f64,
}

// Vote count for one declared option of a question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionCount {
    pub option: String,
    pub votes: u64,
    pub chosen: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBreakdown {
    pub text: String,
    pub options: Vec<OptionCount>,
}

/// Builds the full results for `target` from every stored submission.
///
/// Everything is recomputed from the records passed in; nothing is cached
/// between calls.
pub fn aggregate(submissions: &[SubmissionRecord], target: &AnswerSet) -> ResultsSummary {
    let summary = tally(submissions.iter().map(|s| &s.answers));

    let all_scores: Vec<f64> = submissions
        .iter()
        .map(|s| majority_score(&s.answers, &summary))
        .collect();
    let user_score = majority_score(target, &summary);
    let distribution = build_distribution(&all_scores, DEFAULT_BUCKETS);

    ResultsSummary {
        summary,
        total: submissions.len(),
        distribution,
        user_score,
    }
}

/// Per-question vote counts in schema order, listing every declared option
/// (zero when nobody picked it) and marking the target's choice.
pub fn breakdown(questions: &[Question], tally: &VoteTally, target: &AnswerSet) -> Vec<QuestionBreakdown> {
    questions
        .iter()
        .map(|question| {
            let user_choice = target.get(&question.id);
            QuestionBreakdown {
                text: question.text.clone(),
                options: question
                    .options
                    .iter()
                    .map(|option| OptionCount {
                        option: option.clone(),
                        votes: tally.count(&question.id, option),
                        chosen: user_choice == Some(option.as_str()),
                    })
                    .collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user_id: &str, pairs: &[(&str, &str)]) -> SubmissionRecord {
        SubmissionRecord::new(user_id, pairs.iter().copied().collect())
    }

    fn sample() -> Vec<SubmissionRecord> {
        vec![
            record("u1", &[("q1", "A")]),
            record("u2", &[("q1", "A")]),
            record("u3", &[("q1", "B")]),
        ]
    }

    #[test]
    fn test_end_to_end_example() {
        let submissions = sample();

        let results = aggregate(&submissions, &submissions[0].answers);

        assert_eq!(results.total, 3);
        assert_eq!(results.summary.count("q1", "A"), 2);
        assert_eq!(results.summary.count("q1", "B"), 1);
        assert!((results.user_score - 66.666_666_666).abs() < 1e-6);

        let u3 = aggregate(&submissions, &submissions[2].answers);
        assert!((u3.user_score - 33.333_333_333).abs() < 1e-6);
    }

    #[test]
    fn test_distribution_covers_every_submission() {
        let submissions = sample();
        let results = aggregate(&submissions, &submissions[0].answers);

        assert_eq!(results.distribution.len(), DEFAULT_BUCKETS + 2);
        let counted: u64 = results.distribution.iter().map(|p| p.users).sum();
        assert_eq!(counted, 3);
        // 66.67 -> bucket 13, 33.33 -> bucket 6 (offset by the leading sentinel)
        assert_eq!(results.distribution[14].users, 2);
        assert_eq!(results.distribution[7].users, 1);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let submissions = sample();
        let first = aggregate(&submissions, &submissions[1].answers);
        let second = aggregate(&submissions, &submissions[1].answers);
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_submissions() {
        let results = aggregate(&[], &AnswerSet::new());

        assert_eq!(results.total, 0);
        assert!(results.summary.is_empty());
        assert_eq!(results.user_score, 50.0);
        assert!(results.distribution.iter().all(|p| p.users == 0));
    }

    #[test]
    fn test_breakdown_lists_declared_options_in_order() {
        let questions = vec![
            Question::new("q1", "First", &["A", "B", "C"]),
            Question::new("q2", "Second", &["X"]),
        ];
        let submissions = sample();
        let results = aggregate(&submissions, &submissions[2].answers);

        let rows = breakdown(&questions, &results.summary, &submissions[2].answers);

        assert_eq!(rows.len(), 2);
        let q1: Vec<(&str, u64, bool)> = rows[0]
            .options
            .iter()
            .map(|o| (o.option.as_str(), o.votes, o.chosen))
            .collect();
        assert_eq!(q1, vec![("A", 2, false), ("B", 1, true), ("C", 0, false)]);
        assert_eq!(rows[1].options[0].votes, 0);
        assert!(!rows[1].options[0].chosen);
    }
}
