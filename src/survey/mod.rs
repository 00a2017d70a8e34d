pub mod drafts;

use crate::db::SubmissionStore;
use crate::error::SurveyError;
use crate::models::{validate_answers, AnswerSet, Question};
use crate::results::{aggregate, breakdown, QuestionBreakdown, ResultsSummary};
use drafts::DraftBook;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

/// How far through the form a user is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.answered >= self.total
    }

    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.answered as f64 / self.total as f64 * 100.0
        }
    }
}

/// Results for one respondent along with the per-question view of them.
pub struct UserResults {
    pub summary: ResultsSummary,
    pub questions: Vec<QuestionBreakdown>,
}

/// Ties the question list, the submission store and unsubmitted drafts
/// together. A user submits once; results are computed fresh on each request.
pub struct SurveyService {
    questions: Vec<Question>,
    store: Arc<dyn SubmissionStore>,
    drafts: DraftBook,
    // Held across the already-submitted check and the write
    submit_lock: Mutex<()>,
}

impl SurveyService {
    pub fn new(questions: Vec<Question>, store: Arc<dyn SubmissionStore>) -> Self {
        Self {
            questions,
            store,
            drafts: DraftBook::new(),
            submit_lock: Mutex::new(()),
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn drafts(&self) -> &DraftBook {
        &self.drafts
    }

    /// Counts only answers to questions in the current schema.
    pub fn progress(&self, answers: &AnswerSet) -> Progress {
        let answered = self
            .questions
            .iter()
            .filter(|q| answers.get(&q.id).is_some())
            .count();
        Progress {
            answered,
            total: self.questions.len(),
        }
    }

    pub async fn has_submitted(&self, user_id: &str) -> Result<bool, SurveyError> {
        let existing = self.store.get(user_id).await.map_err(SurveyError::Read)?;
        Ok(existing.is_some())
    }

    /// Stores a user's answers. Fails without writing anything if the user
    /// already submitted, an answer is not a declared option, or a question
    /// is unanswered.
    pub async fn submit(&self, user_id: &str, answers: &AnswerSet) -> Result<(), SurveyError> {
        validate_answers(&self.questions, answers)?;

        let progress = self.progress(answers);
        if !progress.is_complete() {
            return Err(SurveyError::Incomplete {
                answered: progress.answered,
                total: progress.total,
            });
        }

        // The store itself is last-write-wins, so write-once only holds while
        // every submit goes through this lock.
        let _guard = self.submit_lock.lock().await;
        if self.has_submitted(user_id).await? {
            return Err(SurveyError::AlreadySubmitted(user_id.to_string()));
        }

        self.store.put(user_id, answers).await.map_err(|e| {
            warn!("Failed to store submission for {}: {}", user_id, e);
            SurveyError::Write(e)
        })?;

        info!("Stored submission for user {}", user_id);
        Ok(())
    }

    /// Submits the user's draft and discards it once stored. On failure the
    /// draft is kept so the user can try again.
    pub async fn submit_draft(&self, user_id: &str) -> Result<(), SurveyError> {
        let answers = self.drafts.get(user_id).await;
        self.submit(user_id, &answers).await?;
        self.drafts.discard(user_id).await;
        Ok(())
    }

    /// Aggregates every stored submission and scores `user_id` against them.
    pub async fn results_for(&self, user_id: &str) -> Result<UserResults, SurveyError> {
        let answers = self
            .store
            .get(user_id)
            .await
            .map_err(SurveyError::Read)?
            .ok_or_else(|| SurveyError::NotFound(user_id.to_string()))?;

        let submissions = self.store.list_all().await.map_err(|e| {
            warn!("Failed to list submissions: {}", e);
            SurveyError::Read(e)
        })?;

        let summary = aggregate(&submissions, &answers);
        let questions = breakdown(&self.questions, &summary.summary, &answers);
        info!(
            "Computed results for {} over {} submissions (score {:.1})",
            user_id, summary.total, summary.user_score
        );

        Ok(UserResults {
            summary,
            questions,
        })
    }
}
