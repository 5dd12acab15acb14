//! Books repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        book::{Book, BookResponse, BorrowedBookResponse, CreateBook},
        page::PageResponse,
    },
};

/// Read/write access to book records, as seen by the lending engine.
///
/// The engine only ever needs a lookup and a single-row save; everything
/// else on [`BooksRepository`] serves the catalog endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_book_by_id(&self, id: i32) -> AppResult<Option<Book>>;
    async fn save_book(&self, book: &Book) -> AppResult<Book>;
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a new book owned by `owner_id`
    pub async fn create(&self, book: &CreateBook, owner_id: i32) -> AppResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO books (owner_id, title, author_name, isbn, synopsis, shareable, archived)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE)
            RETURNING id
            "#,
        )
        .bind(owner_id)
        .bind(&book.title)
        .bind(&book.author_name)
        .bind(&book.isbn)
        .bind(&book.synopsis)
        .bind(book.shareable.unwrap_or(false))
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Get book details with owner name and average feedback rate
    pub async fn get_details(&self, id: i32) -> AppResult<Option<BookResponse>> {
        let book = sqlx::query_as::<_, BookResponse>(
            r#"
            SELECT b.id, b.title, b.author_name, b.isbn, b.synopsis,
                   TRIM(COALESCE(u.firstname, '') || ' ' || COALESCE(u.lastname, '')) AS owner,
                   (SELECT AVG(f.note) FROM feedbacks f WHERE f.book_id = b.id) AS rate,
                   b.shareable, b.archived
            FROM books b
            JOIN users u ON u.id = b.owner_id
            WHERE b.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
    }

    /// List books visible in the shared catalog: shareable, not archived
    /// and not owned by the requesting user. Newest first.
    pub async fn list_displayable(
        &self,
        user_id: i32,
        page: i64,
        size: i64,
    ) -> AppResult<PageResponse<BookResponse>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM books WHERE shareable AND NOT archived AND owner_id != $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let content = sqlx::query_as::<_, BookResponse>(
            r#"
            SELECT b.id, b.title, b.author_name, b.isbn, b.synopsis,
                   TRIM(COALESCE(u.firstname, '') || ' ' || COALESCE(u.lastname, '')) AS owner,
                   (SELECT AVG(f.note) FROM feedbacks f WHERE f.book_id = b.id) AS rate,
                   b.shareable, b.archived
            FROM books b
            JOIN users u ON u.id = b.owner_id
            WHERE b.shareable AND NOT b.archived AND b.owner_id != $1
            ORDER BY b.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(size)
        .bind(page * size)
        .fetch_all(&self.pool)
        .await?;

        Ok(PageResponse::new(content, page, size, total))
    }

    /// List books owned by the requesting user. Newest first.
    pub async fn list_by_owner(
        &self,
        owner_id: i32,
        page: i64,
        size: i64,
    ) -> AppResult<PageResponse<BookResponse>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        let content = sqlx::query_as::<_, BookResponse>(
            r#"
            SELECT b.id, b.title, b.author_name, b.isbn, b.synopsis,
                   TRIM(COALESCE(u.firstname, '') || ' ' || COALESCE(u.lastname, '')) AS owner,
                   (SELECT AVG(f.note) FROM feedbacks f WHERE f.book_id = b.id) AS rate,
                   b.shareable, b.archived
            FROM books b
            JOIN users u ON u.id = b.owner_id
            WHERE b.owner_id = $1
            ORDER BY b.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner_id)
        .bind(size)
        .bind(page * size)
        .fetch_all(&self.pool)
        .await?;

        Ok(PageResponse::new(content, page, size, total))
    }

    /// List books the requesting user has borrowed, with transaction flags
    pub async fn list_borrowed(
        &self,
        user_id: i32,
        page: i64,
        size: i64,
    ) -> AppResult<PageResponse<BorrowedBookResponse>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM lending_transactions WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        let content = sqlx::query_as::<_, BorrowedBookResponse>(
            r#"
            SELECT b.id, b.title, b.author_name, b.isbn,
                   (SELECT AVG(f.note) FROM feedbacks f WHERE f.book_id = b.id) AS rate,
                   t.returned, t.return_approved
            FROM lending_transactions t
            JOIN books b ON b.id = t.book_id
            WHERE t.user_id = $1
            ORDER BY t.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(size)
        .bind(page * size)
        .fetch_all(&self.pool)
        .await?;

        Ok(PageResponse::new(content, page, size, total))
    }

    /// List returned transactions on the requesting user's own books,
    /// i.e. the owner's approval queue.
    pub async fn list_returned(
        &self,
        owner_id: i32,
        page: i64,
        size: i64,
    ) -> AppResult<PageResponse<BorrowedBookResponse>> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM lending_transactions t
            JOIN books b ON b.id = t.book_id
            WHERE b.owner_id = $1 AND t.returned
            "#,
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        let content = sqlx::query_as::<_, BorrowedBookResponse>(
            r#"
            SELECT b.id, b.title, b.author_name, b.isbn,
                   (SELECT AVG(f.note) FROM feedbacks f WHERE f.book_id = b.id) AS rate,
                   t.returned, t.return_approved
            FROM lending_transactions t
            JOIN books b ON b.id = t.book_id
            WHERE b.owner_id = $1 AND t.returned
            ORDER BY t.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner_id)
        .bind(size)
        .bind(page * size)
        .fetch_all(&self.pool)
        .await?;

        Ok(PageResponse::new(content, page, size, total))
    }
}

#[async_trait]
impl CatalogStore for BooksRepository {
    async fn find_book_by_id(&self, id: i32) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(book)
    }

    async fn save_book(&self, book: &Book) -> AppResult<Book> {
        let saved = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $2, author_name = $3, isbn = $4, synopsis = $5,
                shareable = $6, archived = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.author_name)
        .bind(&book.isbn)
        .bind(&book.synopsis)
        .bind(book.shareable)
        .bind(book.archived)
        .fetch_one(&self.pool)
        .await?;

        Ok(saved)
    }
}
