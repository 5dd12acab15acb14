//! Data models for BookNet

pub mod book;
pub mod feedback;
pub mod page;
pub mod transaction;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookResponse, BorrowedBookResponse};
pub use feedback::Feedback;
pub use page::PageResponse;
pub use transaction::TransactionRecord;
pub use user::{ActingUser, User};
