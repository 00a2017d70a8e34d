use crate::error::SurveyError;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

// Discord caps a select menu at 25 entries.
pub const MAX_OPTIONS: usize = 25;

lazy_static! {
    static ref QUESTION_ID: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]{0,63}$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub options: Vec<String>,
}

impl Question {
    pub fn new(id: &str, text: &str, options: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            text: text.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    /// Checks the id format and that the options are a non-empty list of
    /// distinct strings.
    pub fn validate(&self) -> Result<(), String> {
        if !QUESTION_ID.is_match(&self.id) {
            return Err(format!("question id '{}' is not a valid identifier", self.id));
        }
        if self.options.is_empty() {
            return Err(format!("question '{}' has no options", self.id));
        }
        if self.options.len() > MAX_OPTIONS {
            return Err(format!(
                "question '{}' has {} options, at most {} are supported",
                self.id,
                self.options.len(),
                MAX_OPTIONS
            ));
        }
        let mut seen = HashSet::new();
        for option in &self.options {
            if !seen.insert(option.as_str()) {
                return Err(format!("question '{}' lists option '{}' twice", self.id, option));
            }
        }
        Ok(())
    }
}

/// One respondent's choices, keyed by question id.
///
/// Values are expected to be one of the question's declared options. That is
/// checked by [`validate_answers`] before a submission is written; the
/// aggregation code accepts whatever was stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<String, String>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a choice, returning the previous one for that question.
    pub fn insert(&mut self, question_id: impl Into<String>, choice: impl Into<String>) -> Option<String> {
        self.0.insert(question_id.into(), choice.into())
    }

    pub fn get(&self, question_id: &str) -> Option<&str> {
        self.0.get(question_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(q, c)| (q.as_str(), c.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub user_id: String,
    pub answers: AnswerSet,
}

impl SubmissionRecord {
    pub fn new(user_id: impl Into<String>, answers: AnswerSet) -> Self {
        Self {
            user_id: user_id.into(),
            answers,
        }
    }
}

/// Rejects answers to unknown questions and choices that are not among the
/// question's declared options.
pub fn validate_answers(questions: &[Question], answers: &AnswerSet) -> Result<(), SurveyError> {
    for (question_id, choice) in answers.iter() {
        let question = questions
            .iter()
            .find(|q| q.id == question_id)
            .ok_or_else(|| SurveyError::InvalidAnswer {
                question_id: question_id.to_string(),
                reason: "unknown question".to_string(),
            })?;

        if !question.has_option(choice) {
            return Err(SurveyError::InvalidAnswer {
                question_id: question_id.to_string(),
                reason: format!("'{}' is not one of the options", choice),
            });
        }
    }
    Ok(())
}
