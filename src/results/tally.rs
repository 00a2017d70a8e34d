use crate::models::AnswerSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Vote counts per question and option. Questions or options nobody picked
/// are absent and read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoteTally(BTreeMap<String, BTreeMap<String, u64>>);

impl VoteTally {
    pub fn record(&mut self, question_id: &str, choice: &str) {
        *self
            .0
            .entry(question_id.to_string())
            .or_default()
            .entry(choice.to_string())
            .or_insert(0) += 1;
    }

    pub fn count(&self, question_id: &str, choice: &str) -> u64 {
        self.0
            .get(question_id)
            .and_then(|options| options.get(choice))
            .copied()
            .unwrap_or(0)
    }

    /// Total votes cast on a question across all respondents.
    pub fn total_for(&self, question_id: &str) -> u64 {
        self.0
            .get(question_id)
            .map(|options| options.values().sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Counts every (question, choice) pair across the answer sets. Choices are
/// counted verbatim, whether or not they are declared options.
pub fn tally<'a>(answer_sets: impl IntoIterator<Item = &'a AnswerSet>) -> VoteTally {
    let mut tally = VoteTally::default();
    for answers in answer_sets {
        for (question_id, choice) in answers.iter() {
            tally.record(question_id, choice);
        }
    }
    tally
}
