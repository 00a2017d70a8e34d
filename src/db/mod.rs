pub mod memory;

use crate::error::StoreError;
use crate::models::{AnswerSet, SubmissionRecord};
use async_trait::async_trait;
use log::info;
use sqlx::{migrate::MigrateDatabase, sqlite::{SqlitePool, SqlitePoolOptions}, Sqlite, Row};
use std::time::Duration;

/// Where submissions live. One answer set per user id; writing again for the
/// same user replaces the previous set.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn put(&self, user_id: &str, answers: &AnswerSet) -> Result<(), StoreError>;

    async fn get(&self, user_id: &str) -> Result<Option<AnswerSet>, StoreError>;

    /// Every submission currently stored, ordered by user id.
    async fn list_all(&self) -> Result<Vec<SubmissionRecord>, StoreError>;
}

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(db_url: &str) -> Result<Self, StoreError> {
        let in_memory = db_url.contains(":memory:");

        // Create database if it doesn't exist
        if !in_memory && !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            info!("Creating database at {}", db_url);
            Sqlite::create_database(db_url).await?;
        }

        // An in-memory database only exists inside its connection, so keep
        // exactly one open for the life of the pool.
        let options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = options.connect(db_url).await?;

        Self::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    async fn init_schema(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS respondents (
                user_id TEXT PRIMARY KEY
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS answers (
                user_id TEXT NOT NULL,
                question_id TEXT NOT NULL,
                choice TEXT NOT NULL,
                PRIMARY KEY (user_id, question_id),
                FOREIGN KEY (user_id) REFERENCES respondents(user_id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl SubmissionStore for Database {
    // Replaces the user's whole answer set in one transaction
    async fn put(&self, user_id: &str, answers: &AnswerSet) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO respondents (user_id) VALUES (?) ON CONFLICT(user_id) DO NOTHING")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM answers WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        for (question_id, choice) in answers.iter() {
            sqlx::query(
                r#"
                INSERT INTO answers (user_id, question_id, choice)
                VALUES (?, ?, ?)
                "#,
            )
            .bind(user_id)
            .bind(question_id)
            .bind(choice)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get(&self, user_id: &str) -> Result<Option<AnswerSet>, StoreError> {
        let exists = sqlx::query("SELECT 1 FROM respondents WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .is_some();

        if !exists {
            return Ok(None);
        }

        let answers: AnswerSet = sqlx::query(
            r#"
            SELECT question_id, choice
            FROM answers
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| (row.get::<String, _>("question_id"), row.get::<String, _>("choice")))
        .collect();

        Ok(Some(answers))
    }

    async fn list_all(&self) -> Result<Vec<SubmissionRecord>, StoreError> {
        // LEFT JOIN keeps respondents whose answer set is empty
        let rows = sqlx::query(
            r#"
            SELECT r.user_id AS user_id, a.question_id AS question_id, a.choice AS choice
            FROM respondents r
            LEFT JOIN answers a ON a.user_id = r.user_id
            ORDER BY r.user_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut records: Vec<SubmissionRecord> = Vec::new();
        for row in rows {
            let user_id = row.get::<String, _>("user_id");
            let question_id: Option<String> = row.get("question_id");
            let choice: Option<String> = row.get("choice");

            if records.last().map(|r| r.user_id != user_id).unwrap_or(true) {
                records.push(SubmissionRecord::new(user_id, AnswerSet::new()));
            }
            if let (Some(question_id), Some(choice), Some(record)) = (question_id, choice, records.last_mut()) {
                record.answers.insert(question_id, choice);
            }
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn database() -> Database {
        Database::new("sqlite::memory:").await.unwrap()
    }

    fn answers(pairs: &[(&str, &str)]) -> AnswerSet {
        pairs.iter().copied().collect()
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let db = database().await;
        let set = answers(&[("q1", "A"), ("q2", "B")]);

        db.put("u1", &set).await.unwrap();

        assert_eq!(db.get("u1").await.unwrap(), Some(set));
        assert_eq!(db.get("u2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let db = database().await;
        db.put("u1", &answers(&[("q1", "A"), ("q2", "B")])).await.unwrap();
        db.put("u1", &answers(&[("q1", "C")])).await.unwrap();

        assert_eq!(db.get("u1").await.unwrap(), Some(answers(&[("q1", "C")])));
        assert_eq!(db.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_all_groups_by_user() {
        let db = database().await;
        db.put("u2", &answers(&[("q1", "B")])).await.unwrap();
        db.put("u1", &answers(&[("q1", "A"), ("q2", "X")])).await.unwrap();
        db.put("u3", &AnswerSet::new()).await.unwrap();

        let records = db.list_all().await.unwrap();

        assert_eq!(
            records,
            vec![
                SubmissionRecord::new("u1", answers(&[("q1", "A"), ("q2", "X")])),
                SubmissionRecord::new("u2", answers(&[("q1", "B")])),
                SubmissionRecord::new("u3", AnswerSet::new()),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_answer_set_is_still_a_submission() {
        let db = database().await;
        db.put("u1", &AnswerSet::new()).await.unwrap();
        assert_eq!(db.get("u1").await.unwrap(), Some(AnswerSet::new()));
    }

    #[tokio::test]
    async fn test_closed_pool_is_unavailable() {
        let db = database().await;
        db.pool.close().await;

        assert!(matches!(db.get("u1").await, Err(StoreError::Unavailable(_))));
        assert!(matches!(db.put("u1", &AnswerSet::new()).await, Err(StoreError::Unavailable(_))));
    }
}
