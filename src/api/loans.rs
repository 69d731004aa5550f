//! Loan endpoints: listings, renewal and return

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::{
    context::RequestContext,
    error::{AppError, AppResult},
    models::{
        book_instance::{BookInstance, LoanedCopy},
        loan::{RenewRequest, RenewalProposal},
        pagination::{Page, PageQuery},
    },
};

/// List every copy currently on loan
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Copies on loan, soonest due first", body = LoanedCopyPage),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Missing catalog.can_mark_returned")
    )
)]
pub async fn list_on_loan(
    State(state): State<crate::AppState>,
    ctx: RequestContext,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<LoanedCopy>>> {
    let page = state.services.queries.list_on_loan(&ctx, &query).await?;
    Ok(Json(page))
}

/// List the copies on loan to the current user
#[utoipa::path(
    get,
    path = "/loans/mine",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Caller's loans, soonest due first", body = LoanedCopyPage),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_my_loans(
    State(state): State<crate::AppState>,
    ctx: RequestContext,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<LoanedCopy>>> {
    let page = state
        .services
        .queries
        .list_on_loan_for_borrower(&ctx, &query)
        .await?;
    Ok(Json(page))
}

/// Renewal form: current copy state and the proposed due date
#[utoipa::path(
    get,
    path = "/book-instances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Renewal proposal", body = RenewalProposal),
        (status = 403, description = "Missing catalog.can_mark_returned"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn get_renewal_proposal(
    State(state): State<crate::AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RenewalProposal>> {
    let proposal = state.services.loans.renewal_proposal(&ctx, id).await?;
    Ok(Json(proposal))
}

/// Renew a loan; an empty body renews to the proposed due date
#[utoipa::path(
    post,
    path = "/book-instances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    request_body = RenewRequest,
    responses(
        (status = 200, description = "Loan renewed", body = BookInstance),
        (status = 400, description = "Malformed body, or date in past or too far in future"),
        (status = 403, description = "Missing catalog.can_mark_returned"),
        (status = 404, description = "Book instance not found"),
        (status = 409, description = "Copy modified concurrently"),
        (status = 422, description = "Copy is not on loan")
    )
)]
pub async fn renew_book_instance(
    State(state): State<crate::AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> AppResult<Json<BookInstance>> {
    let request = parse_renew_request(&body)?;
    let instance = state.services.loans.renew(&ctx, id, request.due_back).await?;
    Ok(Json(instance))
}

/// Mark a copy as returned
#[utoipa::path(
    post,
    path = "/book-instances/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Copy returned", body = BookInstance),
        (status = 403, description = "Missing catalog.can_mark_returned"),
        (status = 404, description = "Book instance not found"),
        (status = 409, description = "Copy modified concurrently")
    )
)]
pub async fn return_book_instance(
    State(state): State<crate::AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookInstance>> {
    let instance = state.services.loans.return_book(&ctx, id).await?;
    Ok(Json(instance))
}

fn parse_renew_request(body: &[u8]) -> AppResult<RenewRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RenewRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid renew request: {}", e)))
}
