//! Reaction handlers
//!
//! Endpoints for toggling, setting and rating reactions, plus the read-only
//! summary and "my reactions" views.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use engage_service::dto::{
    ApiResponse, MyReactionResponse, MyReactionsQuery, RateRequest, RatingResponse,
    ReactionStateResponse, SetReactionRequest, SummaryQuery, SummaryResponse,
    ToggleReactionRequest,
};
use engage_service::{ReactionOutcome, ReactionService};

use crate::extractors::{CurrentActor, KnownActor, ValidatedJson, ValidatedQuery};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Toggle a reaction
///
/// POST /reactions/toggle
///
/// 201 when the reaction is now on, 200 when it was removed.
pub async fn toggle_reaction(
    State(state): State<AppState>,
    CurrentActor(resolved): CurrentActor,
    ValidatedJson(body): ValidatedJson<ToggleReactionRequest>,
) -> ApiResult<(StatusCode, Json<ReactionStateResponse>)> {
    let service = ReactionService::new(state.service_context());
    let outcome = service.toggle(&resolved.actor, &body).await?;

    let status = if outcome.on {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(state_response(outcome))))
}

/// Set a reaction on or off
///
/// POST /reactions/set
///
/// 201 only when this call created the row.
pub async fn set_reaction(
    State(state): State<AppState>,
    CurrentActor(resolved): CurrentActor,
    ValidatedJson(body): ValidatedJson<SetReactionRequest>,
) -> ApiResult<(StatusCode, Json<ReactionStateResponse>)> {
    let service = ReactionService::new(state.service_context());
    let outcome = service.set(&resolved.actor, &body).await?;

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(state_response(outcome))))
}

/// Rate a target 1..5
///
/// POST /reactions/rate
pub async fn rate_target(
    State(state): State<AppState>,
    CurrentActor(resolved): CurrentActor,
    ValidatedJson(body): ValidatedJson<RateRequest>,
) -> ApiResult<Created<Json<RatingResponse>>> {
    let service = ReactionService::new(state.service_context());
    let outcome = service.rate(&resolved.actor, &body).await?;

    Ok(Created(Json(RatingResponse {
        value: outcome.value.get(),
        aggregate: outcome.aggregate,
    })))
}

/// Grouped reaction counts
///
/// GET /reactions/summary?targetId=..|targetIds=..&breakdown=..
pub async fn get_summary(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<SummaryQuery>,
) -> ApiResult<Json<ApiResponse<SummaryResponse>>> {
    let service = ReactionService::new(state.service_context());
    let summary = service.summary(&query).await?;
    Ok(Json(ApiResponse::new(summary)))
}

/// The caller's own reactions
///
/// GET /reactions/me?targetIds=..
pub async fn get_my_reactions(
    State(state): State<AppState>,
    KnownActor(actor): KnownActor,
    ValidatedQuery(query): ValidatedQuery<MyReactionsQuery>,
) -> ApiResult<Json<ApiResponse<Vec<MyReactionResponse>>>> {
    let service = ReactionService::new(state.service_context());
    let reactions = service.my_reactions(&actor, &query).await?;
    Ok(Json(ApiResponse::new(reactions)))
}

fn state_response(outcome: ReactionOutcome) -> ReactionStateResponse {
    ReactionStateResponse {
        on: outcome.on,
        aggregate: outcome.aggregate,
    }
}
