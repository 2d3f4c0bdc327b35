//! Client network details
//!
//! Forwarding headers are honoured only when the socket peer is a configured
//! trusted proxy. Then the first `x-forwarded-for` hop wins, then `x-real-ip`.
//! Otherwise the socket peer is the client.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts, HeaderMap, Request},
};
use engage_service::ClientInfo;
use tower_governor::{key_extractor::KeyExtractor, GovernorError};

use crate::middleware::RISK_TOKEN_HEADER;
use crate::state::AppState;

#[derive(Debug, Clone, Default)]
pub struct ClientMeta {
    pub info: ClientInfo,
    /// Risk token sent as a header instead of in the body
    pub risk_token: Option<String>,
}

#[async_trait]
impl FromRequestParts<AppState> for ClientMeta {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        let ip = client_ip(&parts.headers, peer, &state.config().api.trusted_proxies);
        let info = ClientInfo {
            ip: ip.map(|ip| ip.to_string()),
            user_agent: header_str(&parts.headers, header::USER_AGENT.as_str()),
        };

        Ok(ClientMeta {
            info,
            risk_token: header_str(&parts.headers, RISK_TOKEN_HEADER),
        })
    }
}

/// Governor key: the same client address the handlers see
#[derive(Debug, Clone)]
pub struct ClientIpKeyExtractor {
    trusted_proxies: Arc<[IpAddr]>,
}

impl ClientIpKeyExtractor {
    pub fn new(trusted_proxies: &[IpAddr]) -> Self {
        Self {
            trusted_proxies: trusted_proxies.into(),
        }
    }
}

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let peer = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        client_ip(req.headers(), peer, &self.trusted_proxies).ok_or(GovernorError::UnableToExtractKey)
    }
}

fn client_ip(headers: &HeaderMap, peer: Option<IpAddr>, trusted_proxies: &[IpAddr]) -> Option<IpAddr> {
    match peer {
        Some(peer) if trusted_proxies.contains(&peer) => forwarded_ip(headers).or(Some(peer)),
        peer => peer,
    }
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    header_str(headers, "x-forwarded-for")
        .and_then(|chain| chain.split(',').next().and_then(|hop| hop.trim().parse().ok()))
        .or_else(|| header_str(headers, "x-real-ip").and_then(|ip| ip.parse().ok()))
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}
