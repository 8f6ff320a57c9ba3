use std::{net::IpAddr, sync::Arc};

use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

pub const RELAY_ROUTE: &str = "/ajax/:recipient";

/// Submissions from addresses in this domain are rejected with 422.
pub const REJECTED_EMAIL_DOMAIN: &str = "@reject.invalid";
/// Submissions with this name get a 200 response that reports a failure.
pub const REFUSED_NAME: &str = "refuse";
/// Submissions with this message get a 200 response with a non-json body.
pub const MALFORMED_MESSAGE: &str = "garbage";

pub async fn start_server(host: IpAddr, port: u16) -> anyhow::Result<()> {
    info!("Starting relay testing server on {host}:{port}");
    info!("Relay endpoint: http://{host}:{port}/ajax/<recipient>");
    info!(
        "Submissions are accepted unless the email ends with {REJECTED_EMAIL_DOMAIN:?}, the name \
         is {REFUSED_NAME:?} or the message is {MALFORMED_MESSAGE:?}"
    );

    let listener = TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind to {host}:{port}"))?;
    serve(listener, Default::default()).await
}

pub async fn serve(listener: TcpListener, state: Arc<RelayState>) -> anyhow::Result<()> {
    axum::serve(listener, router(state))
        .await
        .context("Failed to start HTTP server")
}

pub fn router(state: Arc<RelayState>) -> Router {
    Router::new()
        .route(RELAY_ROUTE, routing::get(received).post(submit))
        .with_state(state)
}

#[derive(Debug, Default)]
pub struct RelayState {
    received: RwLock<Vec<ReceivedSubmission>>,
}

impl RelayState {
    /// All submissions that passed the `Accept` header check, oldest first.
    pub async fn received(&self) -> Vec<ReceivedSubmission> {
        self.received.read().await.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceivedSubmission {
    pub recipient: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub subject: String,
}

#[derive(Deserialize)]
struct SubmitRequest {
    name: String,
    email: String,
    message: String,
    #[serde(rename = "_subject")]
    subject: String,
}

#[derive(Serialize)]
struct SubmitResponse {
    success: &'static str,
    message: &'static str,
}

async fn submit(
    State(state): State<Arc<RelayState>>,
    Path(recipient): Path<String>,
    headers: HeaderMap,
    Json(request): Json<SubmitRequest>,
) -> Response {
    let accepts_json = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"));
    if !accepts_json {
        return StatusCode::NOT_ACCEPTABLE.into_response();
    }

    let submission = ReceivedSubmission {
        recipient,
        name: request.name,
        email: request.email,
        message: request.message,
        subject: request.subject,
    };
    info!(?submission, "Received submission");

    let response = if submission.email.ends_with(REJECTED_EMAIL_DOMAIN) {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(SubmitResponse {
                success: "false",
                message: "This email address is not allowed.",
            }),
        )
            .into_response()
    } else if submission.name == REFUSED_NAME {
        Json(SubmitResponse {
            success: "false",
            message: "The form could not be submitted.",
        })
        .into_response()
    } else if submission.message == MALFORMED_MESSAGE {
        "<html>garbage</html>".into_response()
    } else {
        Json(SubmitResponse {
            success: "true",
            message: "The form was submitted successfully.",
        })
        .into_response()
    };

    state.received.write().await.push(submission);

    response
}

async fn received(
    State(state): State<Arc<RelayState>>,
    Path(recipient): Path<String>,
) -> Json<Vec<ReceivedSubmission>> {
    let received = state.received.read().await;
    Json(
        received
            .iter()
            .filter(|x| x.recipient == recipient)
            .cloned()
            .collect(),
    )
}
