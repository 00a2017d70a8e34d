use crate::models::AnswerSet;
use crate::results::tally::VoteTally;

/// Score given to a respondent who answered nothing.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// How closely a respondent's choices follow the crowd, from 0 to 100.
///
/// For every answered question this takes the share of all votes on that
/// question that went to the respondent's option, then averages the shares
/// over the answered questions. Unanswered questions are left out of the
/// average. A question with no votes, or where the respondent's option is
/// missing from the tally, contributes 0.
///
/// The respondent's own vote is part of the tally being measured against.
pub fn majority_score(answers: &AnswerSet, tally: &VoteTally) -> f64 {
    if answers.is_empty() {
        return NEUTRAL_SCORE;
    }

    let total_affinity: f64 = answers
        .iter()
        .map(|(question_id, choice)| {
            let total = tally.total_for(question_id);
            let votes = tally.count(question_id, choice);
            if total == 0 || votes == 0 {
                0.0
            } else {
                votes as f64 / total as f64 * 100.0
            }
        })
        .sum();

    total_affinity / answers.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::tally::tally;

    fn answers(pairs: &[(&str, &str)]) -> AnswerSet {
        pairs.iter().copied().collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_answers_score_neutral() {
        let populated = tally(&[answers(&[("q1", "A")])]);
        assert_eq!(majority_score(&AnswerSet::new(), &populated), 50.0);
        assert_eq!(majority_score(&AnswerSet::new(), &VoteTally::default()), 50.0);
    }

    #[test]
    fn test_share_of_votes() {
        let sets = vec![
            answers(&[("q1", "A")]),
            answers(&[("q1", "A")]),
            answers(&[("q1", "B")]),
        ];
        let tally = tally(&sets);

        assert!(approx(majority_score(&sets[0], &tally), 200.0 / 3.0));
        assert!(approx(majority_score(&sets[2], &tally), 100.0 / 3.0));
    }

    #[test]
    fn test_averages_over_answered_questions_only() {
        let sets = vec![
            answers(&[("q1", "A"), ("q2", "X")]),
            answers(&[("q1", "B"), ("q2", "X")]),
        ];
        let tally = tally(&sets);

        // q1: 50%, q2: 100%
        assert!(approx(majority_score(&sets[0], &tally), 75.0));
        // only q2 answered: 100%
        assert!(approx(majority_score(&answers(&[("q2", "X")]), &tally), 100.0));
    }

    #[test]
    fn test_missing_option_or_question_contributes_zero() {
        let tally = tally(&[answers(&[("q1", "A")])]);

        assert_eq!(majority_score(&answers(&[("q1", "Z")]), &tally), 0.0);
        assert_eq!(majority_score(&answers(&[("q9", "A")]), &tally), 0.0);
        // one full match, one unknown question
        assert!(approx(majority_score(&answers(&[("q1", "A"), ("q9", "A")]), &tally), 50.0));
    }

    #[test]
    fn test_own_vote_is_counted() {
        // A lone respondent agrees with themself completely.
        let only = answers(&[("q1", "B"), ("q2", "Y")]);
        let tally = tally(std::slice::from_ref(&only));
        assert_eq!(majority_score(&only, &tally), 100.0);
    }

    #[test]
    fn test_score_stays_within_bounds() {
        let sets: Vec<AnswerSet> = (0..40)
            .map(|i| {
                answers(&[
                    ("q1", ["A", "B", "C"][i % 3]),
                    ("q2", ["X", "Y"][i % 2]),
                    ("q3", ["L", "M", "N", "O"][i % 4]),
                ])
            })
            .collect();
        let tally = tally(&sets);

        for set in &sets {
            let score = majority_score(set, &tally);
            assert!((0.0..=100.0).contains(&score), "score {} out of range", score);
        }
    }
}
