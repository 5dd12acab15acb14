//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, feedbacks, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "BookNet API",
        version = "1.0.0",
        description = "Book Sharing Network REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::create_book,
        books::get_book,
        books::list_books,
        books::list_own_books,
        books::list_borrowed_books,
        books::list_returned_books,
        books::toggle_shareable,
        books::toggle_archived,
        // Lending
        books::borrow_book,
        books::return_book,
        books::approve_return,
        // Feedbacks
        feedbacks::create_feedback,
        feedbacks::list_book_feedbacks,
    ),
    components(
        schemas(
            // Books
            crate::models::book::BookResponse,
            crate::models::book::BorrowedBookResponse,
            crate::models::book::CreateBook,
            crate::models::page::BookPage,
            crate::models::page::BorrowedBookPage,
            books::CreatedResponse,
            books::ToggleResponse,
            books::TransactionResponse,
            // Feedbacks
            crate::models::feedback::CreateFeedback,
            crate::models::feedback::FeedbackResponse,
            crate::models::page::FeedbackPage,
            feedbacks::FeedbackCreatedResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog management"),
        (name = "lending", description = "Borrow, return and approval workflow"),
        (name = "feedbacks", description = "Book feedback")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
