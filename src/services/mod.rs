//! Business logic services

pub mod books;
pub mod feedbacks;
pub mod lending;

use crate::{config::LendingConfig, repository::Repository};

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

/// Normalize pagination parameters for the list endpoints.
pub(crate) fn clamp_page(page: Option<i64>, size: Option<i64>) -> (i64, i64) {
    let page = page.unwrap_or(0).max(0);
    let size = size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    (page, size)
}

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub lending: lending::LendingService,
    pub feedbacks: feedbacks::FeedbacksService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, lending_config: &LendingConfig) -> Self {
        Self {
            books: books::BooksService::new(repository.clone()),
            lending: lending::LendingService::new(repository.clone(), lending_config),
            feedbacks: feedbacks::FeedbacksService::new(repository),
        }
    }
}
