use std::future::Future;

use thiserror::Error;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait RelayApiService: Send + Sync + 'static {
    /// Forward a contact form submission to the relay endpoint.
    fn submit(
        &self,
        submission: RelaySubmission,
    ) -> impl Future<Output = Result<(), RelaySubmitError>> + Send;
}

/// The payload accepted by the relay endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySubmission {
    pub name: String,
    pub email: String,
    pub message: String,
    /// Subject line of the email the relay sends.
    pub subject: String,
}

#[derive(Debug, Error)]
pub enum RelaySubmitError {
    /// No response was received, e.g. because the endpoint is unreachable or
    /// the request timed out.
    #[error("Failed to reach the relay endpoint.")]
    Transport(#[source] anyhow::Error),
    #[error("The relay endpoint rejected the submission with status {status}.")]
    Rejected { status: u16, reason: Option<String> },
    #[error("The relay endpoint returned a malformed response.")]
    MalformedResponse(#[source] anyhow::Error),
}

#[cfg(feature = "mock")]
impl MockRelayApiService {
    pub fn with_submit(
        mut self,
        submission: RelaySubmission,
        result: Result<(), RelaySubmitError>,
    ) -> Self {
        self.expect_submit()
            .once()
            .with(mockall::predicate::eq(submission))
            .return_once(|_| Box::pin(std::future::ready(result)));
        self
    }
}
