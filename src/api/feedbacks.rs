//! Feedback endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        book::BookQuery,
        feedback::{CreateFeedback, FeedbackResponse},
        page::{FeedbackPage, PageResponse},
    },
};

use super::AuthenticatedUser;

/// Created feedback response
#[derive(Serialize, ToSchema)]
pub struct FeedbackCreatedResponse {
    /// ID of the created feedback
    pub id: i32,
}

/// Leave feedback on a book
#[utoipa::path(
    post,
    path = "/feedbacks",
    tag = "feedbacks",
    security(("bearer_auth" = [])),
    request_body = CreateFeedback,
    responses(
        (status = 201, description = "Feedback created", body = FeedbackCreatedResponse),
        (status = 400, description = "Note out of range"),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Own book or book not shareable")
    )
)]
pub async fn create_feedback(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateFeedback>,
) -> AppResult<(StatusCode, Json<FeedbackCreatedResponse>)> {
    let id = state
        .services
        .feedbacks
        .save(request, claims.acting_user())
        .await?;
    Ok((StatusCode::CREATED, Json(FeedbackCreatedResponse { id })))
}

/// List feedback for a book
#[utoipa::path(
    get,
    path = "/feedbacks/book/{id}",
    tag = "feedbacks",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID"),
        BookQuery
    ),
    responses(
        (status = 200, description = "Feedback page", body = FeedbackPage)
    )
)]
pub async fn list_book_feedbacks(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<PageResponse<FeedbackResponse>>> {
    let page = state
        .services
        .feedbacks
        .find_all_by_book(book_id, query.page, query.size, claims.acting_user())
        .await?;
    Ok(Json(page))
}
