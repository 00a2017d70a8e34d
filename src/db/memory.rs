use crate::db::SubmissionStore;
use crate::error::StoreError;
use crate::models::{AnswerSet, SubmissionRecord};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Process-local store, used by tests and for running without a database file.
#[derive(Default)]
pub struct MemoryStore {
    submissions: RwLock<BTreeMap<String, AnswerSet>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn put(&self, user_id: &str, answers: &AnswerSet) -> Result<(), StoreError> {
        self.submissions
            .write()
            .await
            .insert(user_id.to_string(), answers.clone());
        Ok(())
    }

    async fn get(&self, user_id: &str) -> Result<Option<AnswerSet>, StoreError> {
        Ok(self.submissions.read().await.get(user_id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<SubmissionRecord>, StoreError> {
        Ok(self
            .submissions
            .read()
            .await
            .iter()
            .map(|(user_id, answers)| SubmissionRecord::new(user_id.clone(), answers.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_and_list() {
        let store = MemoryStore::new();
        let first: AnswerSet = [("q1", "A")].into_iter().collect();
        let second: AnswerSet = [("q1", "B")].into_iter().collect();

        store.put("u2", &first).await.unwrap();
        store.put("u1", &first).await.unwrap();
        store.put("u1", &second).await.unwrap();

        assert_eq!(store.get("u1").await.unwrap(), Some(second.clone()));
        assert_eq!(store.get("missing").await.unwrap(), None);

        let users: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.user_id)
            .collect();
        assert_eq!(users, vec!["u1", "u2"]);
    }
}
