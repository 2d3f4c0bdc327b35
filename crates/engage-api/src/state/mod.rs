//! Application state
//!
//! Holds the shared state for the Axum application: the service context,
//! configuration, the session verifier and the actor cookie key.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use engage_common::{ActorCookieConfig, AppConfig, JwtService};
use engage_service::ServiceContext;
use sha2::{Digest, Sha512};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    config: Arc<AppConfig>,
    jwt_service: Arc<JwtService>,
    cookie_key: Key,
}

impl AppState {
    pub fn new(service_context: Arc<ServiceContext>, config: AppConfig) -> Self {
        let jwt_service = JwtService::new(&config.jwt.secret, config.jwt.access_token_expiry);
        let cookie_key = cookie_key(&config.actor.secret);
        Self {
            service_context,
            config: Arc::new(config),
            jwt_service: Arc::new(jwt_service),
            cookie_key,
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn actor_cookie(&self) -> &ActorCookieConfig {
        &self.config.actor
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn cookie_key(&self) -> &Key {
        &self.cookie_key
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &"ServiceContext")
            .field("config", &"AppConfig")
            .finish_non_exhaustive()
    }
}

/// Signing key from a secret of any length. The digest is always 64 bytes,
/// which is what [`Key::from`] requires.
fn cookie_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}
