//! Feedback service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        feedback::{CreateFeedback, FeedbackResponse},
        page::PageResponse,
        user::ActingUser,
    },
    repository::{CatalogStore, FeedbackStore, Repository},
};

use super::clamp_page;

#[derive(Clone)]
pub struct FeedbacksService {
    catalog: Arc<dyn CatalogStore>,
    feedbacks: Arc<dyn FeedbackStore>,
}

impl FeedbacksService {
    pub fn new(repository: Repository) -> Self {
        Self::with_stores(Arc::new(repository.books), Arc::new(repository.feedbacks))
    }

    /// Build the service over arbitrary store implementations
    pub fn with_stores(catalog: Arc<dyn CatalogStore>, feedbacks: Arc<dyn FeedbackStore>) -> Self {
        Self { catalog, feedbacks }
    }

    /// Leave feedback on a book. The same book guards as borrowing apply:
    /// no feedback on archived or unshareable books, none on your own.
    pub async fn save(&self, feedback: CreateFeedback, acting: ActingUser) -> AppResult<i32> {
        feedback
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let book = self
            .catalog
            .find_book_by_id(feedback.book_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No book found with id {}", feedback.book_id))
            })?;

        if !book.is_borrowable() {
            return Err(AppError::NotPermitted(
                "You cannot give feedback for an archived or not shareable book".to_string(),
            ));
        }
        if book.is_owned_by(acting.id) {
            return Err(AppError::NotPermitted(
                "You cannot give feedback to your own book".to_string(),
            ));
        }

        let id = self.feedbacks.create_feedback(&feedback, acting.id).await?;
        tracing::info!(feedback_id = id, book_id = feedback.book_id, "feedback created");
        Ok(id)
    }

    /// List feedback for a book, flagging the acting user's own entries
    pub async fn find_all_by_book(
        &self,
        book_id: i32,
        page: Option<i64>,
        size: Option<i64>,
        acting: ActingUser,
    ) -> AppResult<PageResponse<FeedbackResponse>> {
        let (page, size) = clamp_page(page, size);
        self.feedbacks
            .list_by_book(book_id, acting.id, page, size)
            .await
    }
}
