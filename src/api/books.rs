//! Book endpoints, scoped to the caller's own books

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Book, CreateBook},
    AppState,
};

use super::{AuthenticatedUser, MaybeUser, OkResponse};

/// List the caller's books, newest first
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "Caller's books; empty when not signed in", body = Vec<Book>)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.list(user.as_ref()).await?;
    Ok(Json(books))
}

/// Add a book to the caller's catalog
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Not signed in", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    payload: Result<Json<CreateBook>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let Json(data) = payload.map_err(|_| AppError::Validation("Invalid input".to_string()))?;

    let book = state.services.books.create(Some(&user), &data).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Delete one of the caller's books
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted", body = OkResponse),
        (status = 401, description = "Not signed in", body = crate::error::ErrorResponse),
        (status = 403, description = "Book belongs to someone else", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<String>,
) -> AppResult<Json<OkResponse>> {
    let id = Uuid::parse_str(&id).map_err(|_| AppError::NotFound(format!("Book {} not found", id)))?;

    state.services.books.delete(Some(&user), id).await?;
    Ok(Json(OkResponse::ok()))
}
