use std::time::Duration;

use folio_core_contact_contracts::ContactFeatureService;
use folio_extern_contracts::relay::{MockRelayApiService, RelaySubmission, RelaySubmitError};
use folio_models::contact::{ContactDraft, ContactField};
use tokio::sync::oneshot;

use crate::{ContactFeatureConfig, ContactFeatureServiceImpl};


type Sut = ContactFeatureServiceImpl<MockRelayApiService>;

const RESET_DELAY: Duration = Duration::from_secs(3);

fn make_sut(relay_api: MockRelayApiService) -> Sut {
    ContactFeatureServiceImpl::new(relay_api, ContactFeatureConfig::default())
}

/// Types `draft` into the form, one field at a time.
fn fill(sut: &Sut, draft: &ContactDraft) {
    for field in ContactField::ALL {
        sut.update_field(field, draft.get(field).into());
    }
}

/// Expects one relay call whose response is held back until the returned
/// sender is used.
fn with_pending_submit(
    mut relay_api: MockRelayApiService,
    submission: RelaySubmission,
) -> (
    MockRelayApiService,
    oneshot::Sender<Result<(), RelaySubmitError>>,
) {
    let (tx, rx) = oneshot::channel();
    relay_api
        .expect_submit()
        .once()
        .with(mockall::predicate::eq(submission))
        .return_once(move |_| Box::pin(async move { rx.await.unwrap() }));
    (relay_api, tx)
}
