//! Actor extractors
//!
//! Read the identity that the resolver middleware attached to the request.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use engage_core::Actor;

use crate::middleware::ResolvedActor;
use crate::response::ApiError;

/// Any resolved actor, including a guest minted on this request
#[derive(Debug, Clone, Copy)]
pub struct CurrentActor(pub ResolvedActor);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ResolvedActor>()
            .copied()
            .map(CurrentActor)
            .ok_or_else(|| ApiError::internal(anyhow::anyhow!("actor resolver layer is missing")))
    }
}

/// An actor the client already carried: a session or a previously issued
/// guest cookie
#[derive(Debug, Clone, Copy)]
pub struct KnownActor(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for KnownActor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentActor(resolved) = CurrentActor::from_request_parts(parts, state).await?;
        if resolved.fresh {
            return Err(ApiError::ActorRequired);
        }
        Ok(KnownActor(resolved.actor))
    }
}
