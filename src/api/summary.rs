//! Landing summary endpoint

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{context::RequestContext, error::AppResult, models::book::TitleQuery, services::queries::CatalogSummary};

/// Catalog counters for the landing page; counts a visit for the session
#[utoipa::path(
    get,
    path = "/summary",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(TitleQuery),
    responses(
        (status = 200, description = "Catalog counters", body = CatalogSummary),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_summary(
    State(state): State<crate::AppState>,
    ctx: RequestContext,
    Query(query): Query<TitleQuery>,
) -> AppResult<Json<CatalogSummary>> {
    let visits = state.services.visits.record_visit(ctx.actor.session_key()).await;
    let summary = state
        .services
        .queries
        .summary(&ctx, query.title_contains.as_deref(), visits)
        .await?;
    Ok(Json(summary))
}
