//! Lending transactions repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::transaction::TransactionRecord,
};

/// Postgres unique-violation SQLSTATE, raised by the partial unique index
/// on active (book_id, user_id) pairs.
const UNIQUE_VIOLATION: &str = "23505";

/// The lending engine's view of the transaction ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionLedger: Send + Sync {
    /// Find the unreturned record for a (book, borrower) pair, if any
    async fn find_active_record(
        &self,
        book_id: i32,
        user_id: i32,
    ) -> AppResult<Option<TransactionRecord>>;

    /// Find a returned-but-unapproved record on a book owned by `owner_id`
    async fn find_returned_unapproved(
        &self,
        book_id: i32,
        owner_id: i32,
    ) -> AppResult<Option<TransactionRecord>>;

    /// Create a fresh active record for a (book, borrower) pair
    async fn create_record(&self, book_id: i32, user_id: i32) -> AppResult<TransactionRecord>;

    /// Persist flag updates on an existing record
    async fn save_record(&self, record: &TransactionRecord) -> AppResult<TransactionRecord>;
}

#[derive(Clone)]
pub struct TransactionsRepository {
    pool: Pool<Postgres>,
}

impl TransactionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionLedger for TransactionsRepository {
    async fn find_active_record(
        &self,
        book_id: i32,
        user_id: i32,
    ) -> AppResult<Option<TransactionRecord>> {
        let record = sqlx::query_as::<_, TransactionRecord>(
            r#"
            SELECT * FROM lending_transactions
            WHERE book_id = $1 AND user_id = $2 AND NOT returned
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_returned_unapproved(
        &self,
        book_id: i32,
        owner_id: i32,
    ) -> AppResult<Option<TransactionRecord>> {
        let record = sqlx::query_as::<_, TransactionRecord>(
            r#"
            SELECT t.* FROM lending_transactions t
            JOIN books b ON b.id = t.book_id
            WHERE t.book_id = $1 AND b.owner_id = $2
              AND t.returned AND NOT t.return_approved
            ORDER BY t.created_at
            LIMIT 1
            "#,
        )
        .bind(book_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn create_record(&self, book_id: i32, user_id: i32) -> AppResult<TransactionRecord> {
        let result = sqlx::query_as::<_, TransactionRecord>(
            r#"
            INSERT INTO lending_transactions (book_id, user_id, returned, return_approved)
            VALUES ($1, $2, FALSE, FALSE)
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(record) => Ok(record),
            // A concurrent borrow for the same pair lost the race against
            // the active-pair index; report it like the pre-check does.
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(AppError::NotPermitted(
                    "The requested book is already borrowed".to_string(),
                ))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save_record(&self, record: &TransactionRecord) -> AppResult<TransactionRecord> {
        let saved = sqlx::query_as::<_, TransactionRecord>(
            r#"
            UPDATE lending_transactions
            SET returned = $2, return_approved = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(record.id)
        .bind(record.returned)
        .bind(record.return_approved)
        .fetch_one(&self.pool)
        .await?;

        Ok(saved)
    }
}
