//! Author endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        author::{
            Author, AuthorDeleteConfirmation, AuthorDeletion, AuthorQuery, AuthorWithBooks,
            CreateAuthor, UpdateAuthor,
        },
        pagination::{PageRequest, PaginatedResponse},
    },
};

use super::AuthenticatedUser;

/// Body returned when an author cannot be deleted yet
#[derive(Serialize, ToSchema)]
pub struct AuthorDeleteBlocked {
    pub message: String,
    pub confirmation: AuthorDeleteConfirmation,
}

/// List authors with their books
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    params(AuthorQuery),
    responses(
        (status = 200, description = "List of authors", body = PaginatedResponse<AuthorWithBooks>),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn list_authors(
    State(state): State<crate::AppState>,
    Query(query): Query<AuthorQuery>,
) -> AppResult<Json<PaginatedResponse<AuthorWithBooks>>> {
    let page = PageRequest::new(query.page, state.config.pagination.authors_per_page)?;
    let authors = state.services.authors.list(page).await?;
    Ok(Json(authors))
}

/// Author details with their books
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author details", body = AuthorWithBooks),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<AuthorWithBooks>> {
    let author = state.services.authors.get(id).await?;
    Ok(Json(author))
}

/// Create an author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = CreateAuthor,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Permission catalog.add_author required")
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(author): Json<CreateAuthor>,
) -> AppResult<(StatusCode, Json<Author>)> {
    let created = state.services.authors.create(author, &claims).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an author
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    request_body = UpdateAuthor,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 403, description = "Permission catalog.change_author required"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(author): Json<UpdateAuthor>,
) -> AppResult<Json<Author>> {
    let updated = state.services.authors.update(id, author, &claims).await?;
    Ok(Json(updated))
}

/// Delete confirmation for an author
#[utoipa::path(
    get,
    path = "/authors/{id}/delete",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author and the number of books attributed", body = AuthorDeleteConfirmation),
        (status = 403, description = "Permission catalog.delete_author required"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_confirmation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<AuthorDeleteConfirmation>> {
    let confirmation = state
        .services
        .authors
        .delete_confirmation(id, &claims)
        .await?;
    Ok(Json(confirmation))
}

/// Delete an author. Refused with the confirmation again while books still
/// reference the author.
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 403, description = "Permission catalog.delete_author required"),
        (status = 404, description = "Author not found"),
        (status = 409, description = "Author still has books", body = AuthorDeleteBlocked)
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Response> {
    match state.services.authors.delete(id, &claims).await? {
        AuthorDeletion::Deleted => Ok(StatusCode::NO_CONTENT.into_response()),
        AuthorDeletion::Blocked(confirmation) => {
            let body = AuthorDeleteBlocked {
                message: format!(
                    "Delete the {} book(s) of {} before deleting the author",
                    confirmation.book_count, confirmation.author
                ),
                confirmation,
            };
            Ok((StatusCode::CONFLICT, Json(body)).into_response())
        }
    }
}
