use std::sync::Arc;

use anyhow::anyhow;
use folio_extern_contracts::relay::{RelayApiService, RelaySubmission, RelaySubmitError};
use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use crate::http::HttpClient;

/// https://formsubmit.co/ajax-documentation
pub const RELAY_ENDPOINT: &str = "https://formsubmit.co/ajax/contact@amirlehmam.com";

#[derive(Debug, Clone)]
pub struct RelayApiServiceImpl {
    config: RelayApiServiceConfig,
    http: HttpClient,
}

#[derive(Debug, Clone)]
pub struct RelayApiServiceConfig {
    endpoint: Arc<Url>,
    /// Treat a 2xx response as a failure if its body says so.
    pub inspect_response_body: bool,
}

impl RelayApiServiceConfig {
    pub fn new(endpoint_override: Option<Url>) -> Self {
        Self {
            endpoint: endpoint_override
                .unwrap_or_else(|| RELAY_ENDPOINT.parse().unwrap())
                .into(),
            inspect_response_body: false,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl RelayApiServiceImpl {
    pub fn new(config: RelayApiServiceConfig, http: HttpClient) -> Self {
        Self { config, http }
    }
}

impl RelayApiService for RelayApiServiceImpl {
    #[instrument(skip_all, fields(endpoint = %self.config.endpoint))]
    async fn submit(&self, submission: RelaySubmission) -> Result<(), RelaySubmitError> {
        let response = self
            .http
            .post((*self.config.endpoint).clone())
            .header(header::ACCEPT, "application/json")
            .json(&SubmitRequest::from(&submission))
            .send()
            .await
            .map_err(|err| {
                RelaySubmitError::Transport(anyhow!(err).context("Failed to send relay request"))
            })?;

        let status = response.status();
        debug!(%status, "relay responded");

        if !status.is_success() {
            let reason = response
                .json::<SubmitResponse>()
                .await
                .ok()
                .and_then(|body| body.message);
            return Err(RelaySubmitError::Rejected {
                status: status.as_u16(),
                reason,
            });
        }

        if !self.config.inspect_response_body {
            return Ok(());
        }

        let body = response.json::<SubmitResponse>().await.map_err(|err| {
            RelaySubmitError::MalformedResponse(
                anyhow!(err).context("Failed to deserialize relay response"),
            )
        })?;

        match body.success {
            Some(flag) if !flag.is_true() => Err(RelaySubmitError::Rejected {
                status: status.as_u16(),
                reason: body.message,
            }),
            Some(_) => Ok(()),
            None => Err(RelaySubmitError::MalformedResponse(anyhow!(
                "Relay response has no success flag"
            ))),
        }
    }
}

#[derive(Serialize)]
struct SubmitRequest<'a> {
    name: &'a str,
    email: &'a str,
    message: &'a str,
    #[serde(rename = "_subject")]
    subject: &'a str,
}

impl<'a> From<&'a RelaySubmission> for SubmitRequest<'a> {
    fn from(value: &'a RelaySubmission) -> Self {
        Self {
            name: &value.name,
            email: &value.email,
            message: &value.message,
            subject: &value.subject,
        }
    }
}

#[derive(Deserialize)]
struct SubmitResponse {
    success: Option<SuccessFlag>,
    message: Option<String>,
}

/// FormSubmit reports `success` as the string `"true"`/`"false"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum SuccessFlag {
    Bool(bool),
    Text(String),
}

impl SuccessFlag {
    fn is_true(&self) -> bool {
        match self {
            Self::Bool(flag) => *flag,
            Self::Text(flag) => flag.eq_ignore_ascii_case("true"),
        }
    }
}
