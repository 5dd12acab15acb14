//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i32,
    pub owner_id: i32,
    pub title: String,
    pub author_name: String,
    pub isbn: String,
    pub synopsis: Option<String>,
    pub shareable: bool,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Book {
    /// A book can only be borrowed while it is shareable and not archived.
    pub fn is_borrowable(&self) -> bool {
        self.shareable && !self.archived
    }

    pub fn is_owned_by(&self, user_id: i32) -> bool {
        self.owner_id == user_id
    }
}

/// Book details for display, with owner name and average feedback rate
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookResponse {
    pub id: i32,
    pub title: String,
    pub author_name: String,
    pub isbn: String,
    pub synopsis: Option<String>,
    pub owner: String,
    pub rate: Option<f64>,
    pub shareable: bool,
    pub archived: bool,
}

/// Book as seen through a lending transaction (borrowed or returned lists)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowedBookResponse {
    pub id: i32,
    pub title: String,
    pub author_name: String,
    pub isbn: String,
    pub rate: Option<f64>,
    pub returned: bool,
    pub return_approved: bool,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author name is required"))]
    pub author_name: String,
    #[validate(length(min = 1, message = "ISBN is required"))]
    pub isbn: String,
    pub synopsis: Option<String>,
    /// Whether the book is immediately visible in the shared catalog
    pub shareable: Option<bool>,
}

/// Pagination query parameters for book lists
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
}
