use thiserror::Error;

/// Failures raised by a submission store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    // Closed or exhausted pools are unavailable, not failed queries
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => StoreError::Unavailable(err.to_string()),
            err => StoreError::Database(err),
        }
    }
}

#[derive(Debug, Error)]
pub enum SurveyError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to load questions from {path}: {reason}")]
    Questions { path: String, reason: String },

    #[error("invalid answer for question '{question_id}': {reason}")]
    InvalidAnswer { question_id: String, reason: String },

    #[error("survey is incomplete: {answered} of {total} questions answered")]
    Incomplete { answered: usize, total: usize },

    #[error("user {0} has already submitted")]
    AlreadySubmitted(String),

    #[error("no submission found for user {0}")]
    NotFound(String),

    #[error("failed to save submission: {0}")]
    Write(#[source] StoreError),

    #[error("failed to read submissions: {0}")]
    Read(#[source] StoreError),
}

impl SurveyError {
    /// Store failures can be retried with unchanged state; everything else
    /// needs different input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SurveyError::Write(_) | SurveyError::Read(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_failures_are_retryable() {
        let write = SurveyError::Write(StoreError::Unavailable("down".to_string()));
        let read = SurveyError::Read(StoreError::Unavailable("down".to_string()));
        assert!(write.is_retryable());
        assert!(read.is_retryable());
    }

    #[test]
    fn test_precondition_failures_are_not_retryable() {
        assert!(!SurveyError::NotFound("u1".to_string()).is_retryable());
        assert!(!SurveyError::AlreadySubmitted("u1".to_string()).is_retryable());
        assert!(!SurveyError::Incomplete { answered: 1, total: 2 }.is_retryable());
    }

    #[test]
    fn test_messages_name_the_failure() {
        let err = SurveyError::Incomplete { answered: 3, total: 5 };
        assert_eq!(err.to_string(), "survey is incomplete: 3 of 5 questions answered");
    }

    #[test]
    fn test_pool_failures_map_to_unavailable() {
        assert!(matches!(StoreError::from(sqlx::Error::PoolTimedOut), StoreError::Unavailable(_)));
        assert!(matches!(StoreError::from(sqlx::Error::PoolClosed), StoreError::Unavailable(_)));
        assert!(matches!(StoreError::from(sqlx::Error::RowNotFound), StoreError::Database(_)));
    }
}
