//! Feedback model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Feedback model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Feedback {
    pub id: i32,
    pub book_id: i32,
    pub user_id: i32,
    pub note: f64,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Feedback entry for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeedbackResponse {
    pub note: f64,
    pub comment: Option<String>,
    /// Whether the requesting user authored this feedback
    pub own_feedback: bool,
}

/// Create feedback request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFeedback {
    pub book_id: i32,
    #[validate(range(min = 0.0, max = 5.0, message = "Note must be between 0 and 5"))]
    pub note: f64,
    pub comment: Option<String>,
}
