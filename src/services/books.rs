//! Book catalog service

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{BookResponse, BorrowedBookResponse, CreateBook},
        page::PageResponse,
        user::ActingUser,
    },
    repository::Repository,
};

use super::clamp_page;

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Publish a new book owned by the acting user
    pub async fn save(&self, book: CreateBook, acting: ActingUser) -> AppResult<i32> {
        // Verify the owner exists before creating the row
        self.repository.users.get_by_id(acting.id).await?;
        let id = self.repository.books.create(&book, acting.id).await?;
        tracing::info!(book_id = id, owner_id = acting.id, "book created");
        Ok(id)
    }

    /// Get book details by ID
    pub async fn find_by_id(&self, book_id: i32) -> AppResult<BookResponse> {
        self.repository
            .books
            .get_details(book_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No book found with id {}", book_id)))
    }

    /// Shared catalog: books the acting user could borrow
    pub async fn find_all_displayable(
        &self,
        page: Option<i64>,
        size: Option<i64>,
        acting: ActingUser,
    ) -> AppResult<PageResponse<BookResponse>> {
        let (page, size) = clamp_page(page, size);
        self.repository
            .books
            .list_displayable(acting.id, page, size)
            .await
    }

    /// Books owned by the acting user
    pub async fn find_all_by_owner(
        &self,
        page: Option<i64>,
        size: Option<i64>,
        acting: ActingUser,
    ) -> AppResult<PageResponse<BookResponse>> {
        let (page, size) = clamp_page(page, size);
        self.repository.books.list_by_owner(acting.id, page, size).await
    }

    /// Books the acting user has borrowed, past and present
    pub async fn find_all_borrowed(
        &self,
        page: Option<i64>,
        size: Option<i64>,
        acting: ActingUser,
    ) -> AppResult<PageResponse<BorrowedBookResponse>> {
        let (page, size) = clamp_page(page, size);
        self.repository.books.list_borrowed(acting.id, page, size).await
    }

    /// Returned transactions on the acting user's own books
    pub async fn find_all_returned(
        &self,
        page: Option<i64>,
        size: Option<i64>,
        acting: ActingUser,
    ) -> AppResult<PageResponse<BorrowedBookResponse>> {
        let (page, size) = clamp_page(page, size);
        self.repository.books.list_returned(acting.id, page, size).await
    }
}
