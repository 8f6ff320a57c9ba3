use std::future::Future;

use folio_extern_contracts::relay::RelaySubmitError;
use folio_models::contact::{ContactField, ContactFormState};
use thiserror::Error;
use tokio::sync::watch;

/// Drives the contact form: holds the draft, sends it to the relay and tracks
/// the submission status.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactFeatureService: Send + Sync + 'static {
    /// Overwrite a single field of the draft.
    fn update_field(&self, field: ContactField, value: String);

    /// Send the current draft to the relay.
    ///
    /// The status is `Sending` while the request is in flight and becomes
    /// `Succeeded` or `Failed` afterwards. In both cases it returns to `Idle`
    /// after the configured reset delay. The draft is cleared on success only.
    fn submit(&self) -> impl Future<Output = Result<(), ContactSubmitError>> + Send;

    /// Returns a snapshot of the form.
    fn state(&self) -> ContactFormState;

    /// Returns a receiver that observes every change of the form.
    fn subscribe(&self) -> watch::Receiver<ContactFormState>;
}

#[derive(Debug, Error)]
pub enum ContactSubmitError {
    #[error("A message is already being sent.")]
    AlreadySending,
    #[error("Failed to send message.")]
    Relay(#[source] RelaySubmitError),
}

#[cfg(feature = "mock")]
impl MockContactFeatureService {
    pub fn with_update_field(mut self, field: ContactField, value: String) -> Self {
        self.expect_update_field()
            .once()
            .with(
                mockall::predicate::eq(field),
                mockall::predicate::eq(value),
            )
            .return_const(());
        self
    }

    pub fn with_submit(mut self, result: Result<(), ContactSubmitError>) -> Self {
        self.expect_submit()
            .once()
            .return_once(|| Box::pin(std::future::ready(result)));
        self
    }

    pub fn with_state(mut self, state: ContactFormState) -> Self {
        self.expect_state().once().return_const(state);
        self
    }
}
