//! Paginated response wrapper

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One page of results plus positioning metadata.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[aliases(
    BookPage = PageResponse<crate::models::book::BookResponse>,
    BorrowedBookPage = PageResponse<crate::models::book::BorrowedBookResponse>,
    FeedbackPage = PageResponse<crate::models::feedback::FeedbackResponse>
)]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub number: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
    pub first: bool,
    pub last: bool,
}

impl<T> PageResponse<T> {
    /// Wrap a fetched page. `number` is zero-based.
    pub fn new(content: Vec<T>, number: i64, size: i64, total_elements: i64) -> Self {
        let size = size.max(1);
        let total_pages = (total_elements + size - 1) / size;
        Self {
            content,
            number,
            size,
            total_elements,
            total_pages,
            first: number == 0,
            last: number + 1 >= total_pages,
        }
    }
}
