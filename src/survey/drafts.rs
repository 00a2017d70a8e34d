use crate::models::AnswerSet;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

struct Draft {
    answers: AnswerSet,
    touched_at: DateTime<Utc>,
}

/// Choices a user has made in the form but not submitted yet.
#[derive(Default)]
pub struct DraftBook {
    drafts: Mutex<HashMap<String, Draft>>,
}

impl DraftBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one choice and returns the user's draft as it now stands.
    pub async fn choose(&self, user_id: &str, question_id: &str, choice: &str) -> AnswerSet {
        self.choose_at(user_id, question_id, choice, Utc::now()).await
    }

    async fn choose_at(&self, user_id: &str, question_id: &str, choice: &str, now: DateTime<Utc>) -> AnswerSet {
        let mut drafts = self.drafts.lock().await;
        let draft = drafts.entry(user_id.to_string()).or_insert_with(|| Draft {
            answers: AnswerSet::new(),
            touched_at: now,
        });
        draft.answers.insert(question_id, choice);
        draft.touched_at = now;
        draft.answers.clone()
    }

    pub async fn get(&self, user_id: &str) -> AnswerSet {
        self.drafts
            .lock()
            .await
            .get(user_id)
            .map(|d| d.answers.clone())
            .unwrap_or_default()
    }

    pub async fn discard(&self, user_id: &str) {
        self.drafts.lock().await.remove(user_id);
    }

    /// Drops drafts not touched since `cutoff`, returning how many went.
    pub async fn sweep(&self, cutoff: DateTime<Utc>) -> usize {
        let mut drafts = self.drafts.lock().await;
        let before = drafts.len();
        drafts.retain(|_, draft| draft.touched_at >= cutoff);
        before - drafts.len()
    }

    pub async fn len(&self) -> usize {
        self.drafts.lock().await.len()
    }
}
