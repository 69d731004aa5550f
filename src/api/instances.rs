//! Book instance (copy) administration endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    context::RequestContext,
    error::AppResult,
    models::book_instance::{BookInstance, CreateBookInstance, UpdateBookInstance},
};

use super::AuthenticatedUser;

/// Get a copy by ID
#[utoipa::path(
    get,
    path = "/book-instances/{id}",
    tag = "book-instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Book instance", body = BookInstance),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn get_book_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookInstance>> {
    let instance = state.services.instances.get(id).await?;
    Ok(Json(instance))
}

/// Create a copy of a book
#[utoipa::path(
    post,
    path = "/book-instances",
    tag = "book-instances",
    security(("bearer_auth" = [])),
    request_body = CreateBookInstance,
    responses(
        (status = 201, description = "Book instance created", body = BookInstance),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Missing catalog.add_bookinstance"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn create_book_instance(
    State(state): State<crate::AppState>,
    ctx: RequestContext,
    Json(data): Json<CreateBookInstance>,
) -> AppResult<(StatusCode, Json<BookInstance>)> {
    let instance = state.services.instances.create(&ctx, data).await?;
    Ok((StatusCode::CREATED, Json(instance)))
}

/// Update a copy
#[utoipa::path(
    put,
    path = "/book-instances/{id}",
    tag = "book-instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    request_body = UpdateBookInstance,
    responses(
        (status = 200, description = "Book instance updated", body = BookInstance),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Missing catalog.change_bookinstance"),
        (status = 404, description = "Book instance not found"),
        (status = 409, description = "Copy modified concurrently")
    )
)]
pub async fn update_book_instance(
    State(state): State<crate::AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateBookInstance>,
) -> AppResult<Json<BookInstance>> {
    let instance = state.services.instances.update(&ctx, id, data).await?;
    Ok(Json(instance))
}

/// Delete a copy
#[utoipa::path(
    delete,
    path = "/book-instances/{id}",
    tag = "book-instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 204, description = "Book instance deleted"),
        (status = 403, description = "Missing catalog.delete_bookinstance"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn delete_book_instance(
    State(state): State<crate::AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.instances.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
