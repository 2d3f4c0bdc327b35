//! Actor resolution
//!
//! Runs once per request before any handler. A valid bearer session wins;
//! otherwise a correctly signed guest cookie; otherwise a new guest id is
//! minted and set as a cookie on the response. Resolution never rejects.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    extract::cookie::{Cookie, SameSite, SignedCookieJar},
    headers::{authorization::Bearer, Authorization, HeaderMapExt},
};
use engage_common::ActorCookieConfig;
use engage_core::Actor;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::state::AppState;

/// Identity attached to the request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedActor {
    pub actor: Actor,
    /// The guest id was minted for this request; the client has no history yet
    pub fresh: bool,
}

pub async fn resolve_actor(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let cookie_config = state.actor_cookie();
    let jar = SignedCookieJar::from_headers(request.headers(), state.cookie_key().clone());

    let (resolved, minted) = match session_actor(&state, request.headers()) {
        Some(actor) => (ResolvedActor { actor, fresh: false }, None),
        None => match cookie_guest(&jar, cookie_config) {
            Some(id) => (
                ResolvedActor {
                    actor: Actor::guest(id),
                    fresh: false,
                },
                None,
            ),
            None => {
                let id = Uuid::new_v4();
                debug!(guest_id = %id, "Minted guest actor");
                (
                    ResolvedActor {
                        actor: Actor::guest(id),
                        fresh: true,
                    },
                    Some(id),
                )
            }
        },
    };

    request.extensions_mut().insert(resolved);
    let response = next.run(request).await;

    match minted {
        Some(id) => (jar.add(guest_cookie(cookie_config, id)), response).into_response(),
        None => response,
    }
}

/// A malformed or expired session is ignored, not rejected
fn session_actor(state: &AppState, headers: &HeaderMap) -> Option<Actor> {
    let Authorization(bearer) = headers.typed_get::<Authorization<Bearer>>()?;
    match state.jwt_service().verify_session(bearer.token()) {
        Ok(actor) => Some(actor),
        Err(e) => {
            warn!(error = %e, "Ignoring invalid session token");
            None
        }
    }
}

fn cookie_guest(jar: &SignedCookieJar, config: &ActorCookieConfig) -> Option<Uuid> {
    let cookie = jar.get(&config.cookie_name)?;
    Uuid::parse_str(cookie.value()).ok()
}

fn guest_cookie(config: &ActorCookieConfig, id: Uuid) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), id.to_string()))
        .path("/")
        .http_only(true)
        .secure(config.secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(config.max_age_days))
        .build()
}
