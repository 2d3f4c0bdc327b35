//! # engage-api
//!
//! REST API server for reactions and comments, built with Axum.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_service_context, run};
pub use state::AppState;
