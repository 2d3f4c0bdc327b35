//! Comment handlers
//!
//! Public listing and guarded creation.

use axum::{
    extract::{Path, State},
    Json,
};
use engage_core::Snowflake;
use engage_service::dto::{
    parse_target_id, ApiResponse, CommentListQuery, CommentResponse, CreateCommentRequest,
    PaginatedResponse,
};
use engage_service::CommentService;

use crate::extractors::{ClientMeta, CurrentActor, ValidatedJson, ValidatedQuery};
use crate::response::{ApiError, ApiResult, Created, QuotaHeaders};
use crate::state::AppState;

/// List published comments of a target, newest first
///
/// GET /comments/target/{target_id}
pub async fn list_comments(
    State(state): State<AppState>,
    Path(target_id): Path<String>,
    ValidatedQuery(query): ValidatedQuery<CommentListQuery>,
) -> ApiResult<Json<PaginatedResponse<CommentResponse>>> {
    let target_id = path_target_id(&target_id)?;

    let service = CommentService::new(state.service_context());
    let page = service.list(target_id, &query).await?;
    Ok(Json(page))
}

/// Create a comment
///
/// POST /comments/target/{target_id}
///
/// The risk token may come in the body or as the `x-risk-token` header.
pub async fn create_comment(
    State(state): State<AppState>,
    CurrentActor(resolved): CurrentActor,
    client: ClientMeta,
    Path(target_id): Path<String>,
    ValidatedJson(mut body): ValidatedJson<CreateCommentRequest>,
) -> ApiResult<(QuotaHeaders, Created<Json<ApiResponse<CommentResponse>>>)> {
    let target_id = path_target_id(&target_id)?;
    if body.risk_token.is_none() {
        body.risk_token = client.risk_token;
    }

    let service = CommentService::new(state.service_context());
    let created = service
        .create(
            &resolved.actor,
            resolved.fresh,
            &client.info,
            target_id,
            &body,
        )
        .await?;

    Ok((
        QuotaHeaders(created.quota),
        Created(Json(ApiResponse::new(created.comment))),
    ))
}

fn path_target_id(raw: &str) -> ApiResult<Snowflake> {
    parse_target_id(raw).map_err(|_| ApiError::invalid_path("invalid_target_id"))
}
