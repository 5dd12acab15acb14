//! Book catalog and lending endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{BookQuery, BookResponse, BorrowedBookResponse, CreateBook},
        page::{BookPage, BorrowedBookPage, PageResponse},
    },
};

use super::AuthenticatedUser;

/// Created book response
#[derive(Serialize, ToSchema)]
pub struct CreatedResponse {
    /// ID of the created book
    pub id: i32,
}

/// Status toggle response
#[derive(Serialize, ToSchema)]
pub struct ToggleResponse {
    /// Book ID
    pub id: i32,
    /// The flag's value after the toggle
    pub value: bool,
}

/// Lending operation response
#[derive(Serialize, ToSchema)]
pub struct TransactionResponse {
    /// Transaction record ID
    pub transaction_id: i32,
    /// Status message
    pub message: String,
}

/// Publish a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = CreatedResponse),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let id = state.services.books.save(request, claims.acting_user()).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BookResponse>> {
    let book = state.services.books.find_by_id(id).await?;
    Ok(Json(book))
}

/// List books available to borrow
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    params(BookQuery),
    responses(
        (status = 200, description = "Shared catalog page", body = BookPage),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<PageResponse<BookResponse>>> {
    let page = state
        .services
        .books
        .find_all_displayable(query.page, query.size, claims.acting_user())
        .await?;
    Ok(Json(page))
}

/// List the authenticated user's own books
#[utoipa::path(
    get,
    path = "/books/owner",
    tag = "books",
    security(("bearer_auth" = [])),
    params(BookQuery),
    responses(
        (status = 200, description = "Owned books page", body = BookPage)
    )
)]
pub async fn list_own_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<PageResponse<BookResponse>>> {
    let page = state
        .services
        .books
        .find_all_by_owner(query.page, query.size, claims.acting_user())
        .await?;
    Ok(Json(page))
}

/// List books the authenticated user has borrowed
#[utoipa::path(
    get,
    path = "/books/borrowed",
    tag = "books",
    security(("bearer_auth" = [])),
    params(BookQuery),
    responses(
        (status = 200, description = "Borrowed books page", body = BorrowedBookPage)
    )
)]
pub async fn list_borrowed_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<PageResponse<BorrowedBookResponse>>> {
    let page = state
        .services
        .books
        .find_all_borrowed(query.page, query.size, claims.acting_user())
        .await?;
    Ok(Json(page))
}

/// List returned transactions on the authenticated user's books
#[utoipa::path(
    get,
    path = "/books/returned",
    tag = "books",
    security(("bearer_auth" = [])),
    params(BookQuery),
    responses(
        (status = 200, description = "Returned books page", body = BorrowedBookPage)
    )
)]
pub async fn list_returned_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<PageResponse<BorrowedBookResponse>>> {
    let page = state
        .services
        .books
        .find_all_returned(query.page, query.size, claims.acting_user())
        .await?;
    Ok(Json(page))
}

/// Toggle a book's shareable status (owner only)
#[utoipa::path(
    patch,
    path = "/books/{id}/shareable",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "New shareable value", body = ToggleResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn toggle_shareable(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ToggleResponse>> {
    let value = state
        .services
        .lending
        .toggle_shareable(id, claims.acting_user())
        .await?;
    Ok(Json(ToggleResponse { id, value }))
}

/// Toggle a book's archived status (owner only)
#[utoipa::path(
    patch,
    path = "/books/{id}/archived",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "New archived value", body = ToggleResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn toggle_archived(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ToggleResponse>> {
    let value = state
        .services
        .lending
        .toggle_archived(id, claims.acting_user())
        .await?;
    Ok(Json(ToggleResponse { id, value }))
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/books/{id}/borrow",
    tag = "lending",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 201, description = "Book borrowed", body = TransactionResponse),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Book not borrowable, own book or already borrowed")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<(StatusCode, Json<TransactionResponse>)> {
    let transaction_id = state.services.lending.borrow(id, claims.acting_user()).await?;
    Ok((
        StatusCode::CREATED,
        Json(TransactionResponse {
            transaction_id,
            message: "Book borrowed successfully".to_string(),
        }),
    ))
}

/// Return a borrowed book
#[utoipa::path(
    patch,
    path = "/books/{id}/return",
    tag = "lending",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = TransactionResponse),
        (status = 404, description = "Book not found"),
        (status = 422, description = "No active borrow for this book")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<TransactionResponse>> {
    let transaction_id = state
        .services
        .lending
        .return_book(id, claims.acting_user())
        .await?;
    Ok(Json(TransactionResponse {
        transaction_id,
        message: "Book returned successfully".to_string(),
    }))
}

/// Approve the return of an owned book
#[utoipa::path(
    patch,
    path = "/books/{id}/approve",
    tag = "lending",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Return approved", body = TransactionResponse),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Book not returned yet")
    )
)]
pub async fn approve_return(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<TransactionResponse>> {
    let transaction_id = state
        .services
        .lending
        .approve_return(id, claims.acting_user())
        .await?;
    Ok(Json(TransactionResponse {
        transaction_id,
        message: "Return approved".to_string(),
    }))
}
