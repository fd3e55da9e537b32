//! Loan endpoints: borrowed lists, renewal and return

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        book_instance::{
            BookInstance, BookInstanceWithTitle, LoanQuery, RenewBookInstance, RenewalForm,
            UpdateBookInstance,
        },
        pagination::{PageRequest, PaginatedResponse},
    },
};

use super::{today, AuthenticatedUser};

/// Copies on loan to the current user
#[utoipa::path(
    get,
    path = "/mybooks",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(LoanQuery),
    responses(
        (status = 200, description = "Copies borrowed by the current user", body = PaginatedResponse<BookInstanceWithTitle>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<PaginatedResponse<BookInstanceWithTitle>>> {
    let page = PageRequest::new(query.page, state.config.pagination.loans_per_page)?;
    let loans = state.services.loans.my_loans(&claims, page, today()).await?;
    Ok(Json(loans))
}

/// Every copy on loan
#[utoipa::path(
    get,
    path = "/borrowed",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(LoanQuery),
    responses(
        (status = 200, description = "All borrowed copies", body = PaginatedResponse<BookInstanceWithTitle>),
        (status = 403, description = "Permission catalog.can_mark_returned required")
    )
)]
pub async fn borrowed(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<PaginatedResponse<BookInstanceWithTitle>>> {
    let page = PageRequest::new(query.page, state.config.pagination.loans_per_page)?;
    let loans = state.services.loans.all_loans(&claims, page, today()).await?;
    Ok(Json(loans))
}

/// Renewal form with a proposed date three weeks ahead
#[utoipa::path(
    get,
    path = "/bookinstances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Renewal form", body = RenewalForm),
        (status = 403, description = "Permission catalog.can_mark_returned required"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renew_form(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RenewalForm>> {
    let form = state.services.loans.renewal_form(id, &claims, today()).await?;
    Ok(Json(form))
}

/// Renew a copy until the given date
#[utoipa::path(
    post,
    path = "/bookinstances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    request_body = RenewBookInstance,
    responses(
        (status = 200, description = "Due date moved", body = BookInstance),
        (status = 400, description = "Renewal date in the past or more than 4 weeks ahead"),
        (status = 403, description = "Permission catalog.can_mark_returned required"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renew(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<RenewBookInstance>,
) -> AppResult<Json<BookInstance>> {
    let renewed = state
        .services
        .loans
        .renew(id, request.renewal_date, &claims, today())
        .await?;
    Ok(Json(renewed))
}

/// Mark a copy as returned and available
#[utoipa::path(
    post,
    path = "/bookinstances/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Copy returned", body = BookInstance),
        (status = 403, description = "Permission catalog.can_mark_returned required"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn mark_returned(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookInstance>> {
    let returned = state.services.loans.mark_returned(id, &claims).await?;
    Ok(Json(returned))
}

/// Edit a copy: lend it, reserve it, send it to maintenance
#[utoipa::path(
    put,
    path = "/bookinstances/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    request_body = UpdateBookInstance,
    responses(
        (status = 200, description = "Copy updated", body = BookInstance),
        (status = 400, description = "Invalid input or unknown borrower"),
        (status = 403, description = "Permission catalog.change_bookinstance required"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn update_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateBookInstance>,
) -> AppResult<Json<BookInstance>> {
    let updated = state
        .services
        .loans
        .update_instance(id, data, &claims)
        .await?;
    Ok(Json(updated))
}

/// Delete a copy
#[utoipa::path(
    delete,
    path = "/bookinstances/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 204, description = "Copy deleted"),
        (status = 403, description = "Permission catalog.delete_bookinstance required"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn delete_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.loans.delete_instance(id, &claims).await?;
    Ok(StatusCode::NO_CONTENT)
}
