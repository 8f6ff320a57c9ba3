use std::sync::LazyLock;

use folio_extern_contracts::relay::RelaySubmission;
use folio_models::contact::{ContactDraft, DEFAULT_SUBJECT_PREFIX};

pub static JANE: LazyLock<ContactDraft> = LazyLock::new(|| ContactDraft {
    name: "Jane".into(),
    email: "jane@x.com".into(),
    message: "Hello".into(),
});

pub static JANE_SUBMISSION: LazyLock<RelaySubmission> = LazyLock::new(|| submission(&JANE));

pub static MAX: LazyLock<ContactDraft> = LazyLock::new(|| ContactDraft {
    name: "Max Mustermann".into(),
    email: "max.mustermann@example.de".into(),
    message: "Hello World!".into(),
});

pub static MAX_SUBMISSION: LazyLock<RelaySubmission> = LazyLock::new(|| submission(&MAX));

/// The relay payload the contact form produces for `draft` with the default
/// subject prefix.
pub fn submission(draft: &ContactDraft) -> RelaySubmission {
    RelaySubmission {
        name: draft.name.clone(),
        email: draft.email.clone(),
        message: draft.message.clone(),
        subject: format!("{DEFAULT_SUBJECT_PREFIX} {}", draft.name),
    }
}
