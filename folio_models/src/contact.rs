use std::{fmt, str::FromStr};

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SUCCESS_MESSAGE: &str = "Message sent successfully!";
pub const FAILURE_MESSAGE: &str = "Failed to send message. Please try again.";

pub const SUBMIT_LABEL: &str = "Send Message";
pub const SENDING_LABEL: &str = "Sending...";

/// Prepended to the sender's name to form the email subject, unless configured
/// otherwise.
pub const DEFAULT_SUBJECT_PREFIX: &str = "Portfolio Contact from";

/// One of the three inputs of the contact form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactField {
    Name,
    Email,
    Message,
}

impl ContactField {
    pub const ALL: [Self; 3] = [Self::Name, Self::Email, Self::Message];

    /// The id of the form control bound to this field.
    pub fn id(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown contact field {0:?}.")]
pub struct UnknownContactField(pub String);

impl FromStr for ContactField {
    type Err = UnknownContactField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.id() == s)
            .ok_or_else(|| UnknownContactField(s.into()))
    }
}

/// The values the visitor has typed into the contact form so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDraft {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactDraft {
    pub fn get(&self, field: ContactField) -> &str {
        match field {
            ContactField::Name => &self.name,
            ContactField::Email => &self.email,
            ContactField::Message => &self.message,
        }
    }

    /// Overwrites a single slot, leaving the other two untouched.
    pub fn set(&mut self, field: ContactField, value: String) {
        let slot = match field {
            ContactField::Name => &mut self.name,
            ContactField::Email => &mut self.email,
            ContactField::Message => &mut self.message,
        };
        *slot = value;
    }

    pub fn is_empty(&self) -> bool {
        ContactField::ALL.iter().all(|&field| self.get(field).is_empty())
    }

    /// Checks the draft the way the form controls do before submission is
    /// possible: every field is required and the email must be an address.
    pub fn validate(&self) -> Result<(), ContactDraftError> {
        if let Some(field) = ContactField::ALL
            .into_iter()
            .find(|&field| self.get(field).trim().is_empty())
        {
            return Err(ContactDraftError::Missing(field));
        }

        if !EmailAddress::is_valid(self.email.trim()) {
            return Err(ContactDraftError::InvalidEmail);
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContactDraftError {
    #[error("Please fill out the {0} field.")]
    Missing(ContactField),
    #[error("Please enter a valid email address.")]
    InvalidEmail,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ContactStatus {
    #[default]
    Idle,
    Sending,
    Succeeded,
    Failed {
        message: String,
    },
}

impl ContactStatus {
    /// Whether the status will be reset to [`ContactStatus::Idle`] after a
    /// delay.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed { .. })
    }
}

/// Everything the contact form renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFormState {
    pub draft: ContactDraft,
    pub status: ContactStatus,
}

impl ContactFormState {
    pub fn submit_enabled(&self) -> bool {
        self.status != ContactStatus::Sending
    }

    pub fn submit_label(&self) -> &'static str {
        match self.status {
            ContactStatus::Sending => SENDING_LABEL,
            _ => SUBMIT_LABEL,
        }
    }

    pub fn error_detail(&self) -> Option<&str> {
        match &self.status {
            ContactStatus::Failed { message } => Some(message),
            _ => None,
        }
    }

    pub fn status_message(&self) -> Option<&str> {
        match &self.status {
            ContactStatus::Succeeded => Some(SUCCESS_MESSAGE),
            ContactStatus::Failed { message } => Some(message),
            ContactStatus::Idle | ContactStatus::Sending => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use folio_utils::assert_matches;
    use pretty_assertions::assert_eq;

    use super::*;

    fn jane() -> ContactDraft {
        ContactDraft {
            name: "Jane".into(),
            email: "jane@x.com".into(),
            message: "Hello".into(),
        }
    }

    #[test]
    fn parse_field_ids() {
        assert_eq!("name".parse::<ContactField>(), Ok(ContactField::Name));
        assert_eq!("email".parse::<ContactField>(), Ok(ContactField::Email));
        assert_eq!("message".parse::<ContactField>(), Ok(ContactField::Message));
        assert_eq!(
            "subject".parse::<ContactField>(),
            Err(UnknownContactField("subject".into()))
        );
    }

    #[test]
    fn set_overwrites_only_one_field() {
        let mut draft = ContactDraft::default();

        draft.set(ContactField::Name, "J".into());
        draft.set(ContactField::Email, "jane@x.com".into());
        draft.set(ContactField::Name, "Jane".into());
        draft.set(ContactField::Message, "Hi".into());
        draft.set(ContactField::Message, "Hello".into());

        assert_eq!(draft, jane());
        assert_eq!(draft.get(ContactField::Email), "jane@x.com");
    }

    #[test]
    fn is_empty() {
        assert!(ContactDraft::default().is_empty());
        assert!(!jane().is_empty());

        let mut draft = ContactDraft::default();
        draft.set(ContactField::Message, "x".into());
        assert!(!draft.is_empty());
    }

    #[test]
    fn validate_ok() {
        jane().validate().unwrap();
    }

    #[test]
    fn validate_missing_fields() {
        let draft = ContactDraft::default();
        assert_matches!(
            draft.validate(),
            Err(ContactDraftError::Missing(ContactField::Name))
        );

        let draft = ContactDraft {
            message: "   ".into(),
            ..jane()
        };
        assert_matches!(
            draft.validate(),
            Err(ContactDraftError::Missing(ContactField::Message))
        );
    }

    #[test]
    fn validate_invalid_email() {
        let draft = ContactDraft {
            email: "not an email".into(),
            ..jane()
        };
        assert_matches!(draft.validate(), Err(ContactDraftError::InvalidEmail));
    }

    #[test]
    fn view_idle() {
        let state = ContactFormState::default();

        assert!(state.submit_enabled());
        assert_eq!(state.submit_label(), SUBMIT_LABEL);
        assert_eq!(state.status_message(), None);
        assert_eq!(state.error_detail(), None);
    }

    #[test]
    fn view_sending() {
        let state = ContactFormState {
            draft: jane(),
            status: ContactStatus::Sending,
        };

        assert!(!state.submit_enabled());
        assert_eq!(state.submit_label(), SENDING_LABEL);
        assert_eq!(state.status_message(), None);
    }

    #[test]
    fn view_succeeded() {
        let state = ContactFormState {
            draft: ContactDraft::default(),
            status: ContactStatus::Succeeded,
        };

        assert!(state.submit_enabled());
        assert!(state.status.is_terminal());
        assert_eq!(state.status_message(), Some(SUCCESS_MESSAGE));
        assert_eq!(state.error_detail(), None);
    }

    #[test]
    fn view_failed() {
        let state = ContactFormState {
            draft: jane(),
            status: ContactStatus::Failed {
                message: FAILURE_MESSAGE.into(),
            },
        };

        assert!(state.submit_enabled());
        assert!(state.status.is_terminal());
        assert_eq!(state.status_message(), Some(FAILURE_MESSAGE));
        assert_eq!(state.error_detail(), Some(FAILURE_MESSAGE));
    }

    #[test]
    fn draft_serializes_with_field_ids() {
        let value = serde_json::to_value(jane()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"name": "Jane", "email": "jane@x.com", "message": "Hello"})
        );
    }
}
