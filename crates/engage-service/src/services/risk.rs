//! reCAPTCHA Enterprise assessment client

use async_trait::async_trait;
use engage_common::RiskConfig;
use engage_core::{DomainError, RepoResult, RiskAssessment, RiskRequest, RiskVerifier};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

/// Calls `projects.assessments.create` over HTTPS with a bounded timeout
#[derive(Debug, Clone)]
pub struct RecaptchaVerifier {
    client: reqwest::Client,
    url: String,
    site_key: String,
}

#[derive(Debug, Serialize)]
struct AssessmentRequest<'a> {
    event: Event<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Event<'a> {
    token: &'a str,
    site_key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_ip_address: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_agent: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected_action: Option<&'a str>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssessmentResponse {
    #[serde(default)]
    token_properties: TokenProperties,
    #[serde(default)]
    risk_analysis: RiskAnalysis,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenProperties {
    #[serde(default)]
    valid: bool,
    invalid_reason: Option<String>,
    action: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RiskAnalysis {
    score: Option<f64>,
}

impl From<AssessmentResponse> for RiskAssessment {
    fn from(body: AssessmentResponse) -> Self {
        Self {
            valid: body.token_properties.valid,
            invalid_reason: body
                .token_properties
                .invalid_reason
                .filter(|reason| reason != "INVALID_REASON_UNSPECIFIED"),
            action: body.token_properties.action.filter(|a| !a.is_empty()),
            score: body.risk_analysis.score,
        }
    }
}

fn provider_error(msg: impl Into<String>) -> DomainError {
    DomainError::RiskProviderError(msg.into())
}

impl RecaptchaVerifier {
    pub fn new(config: &RiskConfig) -> RepoResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| provider_error(format!("client build failed: {e}")))?;

        Ok(Self {
            client,
            url: assessment_url(&config.endpoint, &config.project_id, &config.api_key),
            site_key: config.site_key.clone(),
        })
    }
}

fn assessment_url(endpoint: &str, project_id: &str, api_key: &str) -> String {
    format!(
        "{}/v1/projects/{project_id}/assessments?key={api_key}",
        endpoint.trim_end_matches('/')
    )
}

#[async_trait]
impl RiskVerifier for RecaptchaVerifier {
    #[instrument(skip_all)]
    async fn assess(&self, request: &RiskRequest) -> RepoResult<RiskAssessment> {
        let body = AssessmentRequest {
            event: Event {
                token: &request.token,
                site_key: &self.site_key,
                user_ip_address: request.user_ip.as_deref(),
                user_agent: request.user_agent.as_deref(),
                expected_action: request.expected_action.as_deref(),
            },
        };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    warn!("Risk assessment timed out");
                    provider_error("timeout")
                } else {
                    warn!(error = %e.without_url(), "Risk assessment request failed");
                    provider_error("unreachable")
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Risk provider rejected the call");
            return Err(provider_error(format!("provider status {status}")));
        }

        let assessment: AssessmentResponse = response.json().await.map_err(|e| {
            warn!(error = %e.without_url(), "Risk assessment body could not be decoded");
            provider_error("malformed response")
        })?;

        Ok(assessment.into())
    }
}
