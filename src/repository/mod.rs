//! Repository layer for database operations

pub mod books;
pub mod feedbacks;
pub mod transactions;
pub mod users;

use sqlx::{Pool, Postgres};

pub use books::CatalogStore;
pub use feedbacks::FeedbackStore;
pub use transactions::TransactionLedger;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub transactions: transactions::TransactionsRepository,
    pub feedbacks: feedbacks::FeedbacksRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            transactions: transactions::TransactionsRepository::new(pool.clone()),
            feedbacks: feedbacks::FeedbacksRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }
}
