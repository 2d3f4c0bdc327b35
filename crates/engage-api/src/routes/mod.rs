//! Route definitions
//!
//! Engagement routes are mounted under /api/v1; health routes sit at the root.

use axum::{routing::{get, post}, Router};

use crate::handlers::{comments, health, reactions};
use crate::state::AppState;

/// Create the main API router (health routes are separate so they skip the governor)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(reaction_routes())
        .merge(comment_routes())
}

/// Reaction routes
fn reaction_routes() -> Router<AppState> {
    Router::new()
        .route("/reactions/toggle", post(reactions::toggle_reaction))
        .route("/reactions/set", post(reactions::set_reaction))
        .route("/reactions/rate", post(reactions::rate_target))
        .route("/reactions/summary", get(reactions::get_summary))
        .route("/reactions/me", get(reactions::get_my_reactions))
}

/// Comment routes
fn comment_routes() -> Router<AppState> {
    Router::new().route(
        "/comments/target/:target_id",
        get(comments::list_comments).post(comments::create_comment),
    )
}
