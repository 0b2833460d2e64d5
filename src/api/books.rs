//! Book catalog endpoints.
//!
//! Handlers only sequence the layers: capability check, form validation on
//! write paths, entity validation inside the catalog service, then persist
//! or fetch.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::Multipart;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult, ErrorResponse},
    forms::BookForm,
    models::{
        author::Author,
        book::{Book, BookStatus, BookSummary, StatusChoice},
        user::Permission,
    },
};

use super::AuthenticatedUser;

/// Context a renderer needs to draw the book form
#[derive(Serialize, ToSchema)]
pub struct BookFormContext {
    /// Status choices in form order
    pub statuses: Vec<StatusChoice>,
    /// Selectable authors
    pub authors: Vec<Author>,
    /// Current values, present on the edit form only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book: Option<Book>,
}

/// Flat list response
#[derive(Serialize, ToSchema)]
pub struct BookListResponse {
    pub books: Vec<BookSummary>,
}

/// Deletion acknowledgement
#[derive(Serialize, ToSchema)]
pub struct DeleteResponse {
    pub id: i32,
}

/// Render context for the creation form
#[utoipa::path(
    get,
    path = "/bookshelf/form",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Creation form context", body = BookFormContext),
        (status = 303, description = "Not authenticated"),
        (status = 403, description = "Missing the add_book permission", body = ErrorResponse)
    )
)]
pub async fn create_form(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<BookFormContext>> {
    claims.require(Permission::AddBook)?;

    let authors = state.services.catalog.list_authors().await?;
    Ok(Json(BookFormContext {
        statuses: BookStatus::choices(),
        authors,
        book: None,
    }))
}

/// Create a book from a multipart form submission
#[utoipa::path(
    post,
    path = "/bookshelf/form",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Field validation errors", body = ErrorResponse),
        (status = 403, description = "Missing the add_book permission", body = ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Book>)> {
    claims.require(Permission::AddBook)?;

    let form = BookForm::from_multipart(multipart).await?;
    let known_authors = state.services.catalog.author_ids().await?;
    let draft = form
        .validate(&known_authors)
        .map_err(AppError::FieldValidation)?;

    let book = state.services.catalog.create_book(draft).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// List all books
#[utoipa::path(
    get,
    path = "/bookshelf/list",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Flat list of all books", body = BookListResponse),
        (status = 303, description = "Not authenticated")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<BookListResponse>> {
    let books = state.services.catalog.list_books().await?;
    Ok(Json(BookListResponse { books }))
}

/// Render context for the edit form
#[utoipa::path(
    get,
    path = "/bookshelf/{id}/edit",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Edit form context", body = BookFormContext),
        (status = 403, description = "Missing the change_book permission", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn edit_form(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BookFormContext>> {
    claims.require(Permission::ChangeBook)?;

    let book = state.services.catalog.get_book(id).await?;
    let authors = state.services.catalog.list_authors().await?;
    Ok(Json(BookFormContext {
        statuses: BookStatus::choices(),
        authors,
        book: Some(book),
    }))
}

/// Update a book from a multipart form submission
#[utoipa::path(
    post,
    path = "/bookshelf/{id}/edit",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Field validation errors", body = ErrorResponse),
        (status = 403, description = "Missing the change_book permission", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> AppResult<Json<Book>> {
    claims.require(Permission::ChangeBook)?;

    let form = BookForm::from_multipart(multipart).await?;
    let known_authors = state.services.catalog.author_ids().await?;
    let draft = form
        .validate(&known_authors)
        .map_err(AppError::FieldValidation)?;

    let book = state.services.catalog.update_book(id, draft).await?;
    Ok(Json(book))
}

/// Deletion confirmation: the book about to be removed
#[utoipa::path(
    get,
    path = "/bookshelf/{id}/delete",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book pending deletion", body = Book),
        (status = 403, description = "Missing the delete_book permission", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn delete_confirm(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    claims.require(Permission::DeleteBook)?;

    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Delete a book
#[utoipa::path(
    post,
    path = "/bookshelf/{id}/delete",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted", body = DeleteResponse),
        (status = 403, description = "Missing the delete_book permission", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<DeleteResponse>> {
    claims.require(Permission::DeleteBook)?;

    state.services.catalog.delete_book(id).await?;
    Ok(Json(DeleteResponse { id }))
}

/// Book detail with its author set
#[utoipa::path(
    get,
    path = "/bookshelf/{id}/detail",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 303, description = "Not authenticated"),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn book_detail(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}
