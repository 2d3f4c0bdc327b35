//! Test helpers for integration tests
//!
//! Serves the real router, wired to in-memory stores, on an ephemeral port
//! and drives it over HTTP.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use engage_api::{create_app, AppState};
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::fixtures::{Harness, COOKIE_NAME};

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub harness: Harness,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server with default test configuration
    pub async fn start() -> Result<Self> {
        Self::start_with(Harness::new(&[])).await
    }

    pub async fn start_with(harness: Harness) -> Result<Self> {
        let state = AppState::new(harness.context.clone(), harness.config.clone());
        let app = create_app(state)?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
                .await
                .ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            harness,
            _handle: handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str, caller: &Caller) -> Result<Response> {
        Ok(caller.apply(self.client.get(self.url(path))).send().await?)
    }

    pub async fn post<T: Serialize>(&self, path: &str, caller: &Caller, body: &T) -> Result<Response> {
        Ok(caller
            .apply(self.client.post(self.url(path)))
            .json(body)
            .send()
            .await?)
    }
}

/// Identity and network details a test request goes out with
#[derive(Debug, Clone, Default)]
pub struct Caller {
    /// `name=value` pair of the actor cookie
    pub cookie: Option<String>,
    pub bearer: Option<String>,
    pub forwarded_for: Option<String>,
    pub risk_token_header: Option<String>,
}

impl Caller {
    /// No cookie, no session
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn from_ip(ip: &str) -> Self {
        Self {
            forwarded_for: Some(ip.to_string()),
            ..Self::default()
        }
    }

    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn with_risk_header(mut self, token: impl Into<String>) -> Self {
        self.risk_token_header = Some(token.into());
        self
    }

    fn apply(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        if let Some(token) = &self.bearer {
            request = request.bearer_auth(token);
        }
        if let Some(ip) = &self.forwarded_for {
            request = request.header("x-forwarded-for", ip);
        }
        if let Some(token) = &self.risk_token_header {
            request = request.header("x-risk-token", token);
        }
        request
    }
}

/// The actor cookie set by a response, as a `name=value` pair
pub fn actor_cookie(response: &Response) -> Option<String> {
    set_cookie_header(response).map(|raw| raw.split(';').next().unwrap_or_default().trim().to_string())
}

/// The full `Set-Cookie` header of the actor cookie, attributes included
pub fn set_cookie_header(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{COOKIE_NAME}=")))
        .map(str::to_string)
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(response: Response, expected_status: StatusCode) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(response.json().await?)
}

/// Assert an error response and return its machine reason
pub async fn assert_error(response: Response, expected_status: StatusCode) -> Result<String> {
    let body: Value = assert_json(response, expected_status).await?;
    body["error"]["message"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("error body without message: {body}"))
}
