//! Feedbacks repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::AppResult,
    models::{
        feedback::{CreateFeedback, FeedbackResponse},
        page::PageResponse,
    },
};

/// Feedback persistence, as seen by the feedback service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Insert a feedback entry authored by `user_id`
    async fn create_feedback(&self, feedback: &CreateFeedback, user_id: i32) -> AppResult<i32>;

    /// List feedback for a book, flagging entries authored by `user_id`
    async fn list_by_book(
        &self,
        book_id: i32,
        user_id: i32,
        page: i64,
        size: i64,
    ) -> AppResult<PageResponse<FeedbackResponse>>;
}

#[derive(Clone)]
pub struct FeedbacksRepository {
    pool: Pool<Postgres>,
}

impl FeedbacksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeedbackStore for FeedbacksRepository {
    async fn create_feedback(&self, feedback: &CreateFeedback, user_id: i32) -> AppResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO feedbacks (book_id, user_id, note, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(feedback.book_id)
        .bind(user_id)
        .bind(feedback.note)
        .bind(&feedback.comment)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn list_by_book(
        &self,
        book_id: i32,
        user_id: i32,
        page: i64,
        size: i64,
    ) -> AppResult<PageResponse<FeedbackResponse>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM feedbacks WHERE book_id = $1")
            .bind(book_id)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query(
            r#"
            SELECT note, comment, (user_id = $2) AS own_feedback
            FROM feedbacks
            WHERE book_id = $1
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .bind(size)
        .bind(page * size)
        .fetch_all(&self.pool)
        .await?;

        let content = rows
            .into_iter()
            .map(|row| FeedbackResponse {
                note: row.get("note"),
                comment: row.get("comment"),
                own_feedback: row.get("own_feedback"),
            })
            .collect();

        Ok(PageResponse::new(content, page, size, total))
    }
}
