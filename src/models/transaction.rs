//! Lending transaction model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A borrow/return record for a (book, user) pair.
///
/// Lifecycle: `Active (returned=false)` -> `Returned (returned=true)` ->
/// `Approved (return_approved=true)`. No stage is skipped and neither flag
/// is ever cleared once set.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TransactionRecord {
    pub id: i32,
    pub book_id: i32,
    pub user_id: i32,
    pub returned: bool,
    pub return_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TransactionRecord {
    /// An active record blocks further borrows of the same book by the
    /// same user.
    pub fn is_active(&self) -> bool {
        !self.returned
    }
}
