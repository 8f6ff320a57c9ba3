use anyhow::Context;
use clap::Args;
use folio_config::Config;
use folio_core_contact_contracts::ContactFeatureService;
use folio_models::contact::{ContactDraft, ContactField, ContactFormState, ContactStatus};
use tracing::info;

use crate::environment::{ConfigProvider, Provider};

#[derive(Debug, Args)]
pub struct SendCommand {
    /// Your name
    #[arg(long)]
    name: String,
    /// Your email address
    #[arg(long)]
    email: String,
    /// Your message
    #[arg(long)]
    message: String,
    /// Keep running until the contact form has returned to idle
    #[arg(long)]
    wait_reset: bool,
}

impl SendCommand {
    pub async fn invoke(self, config: Config) -> anyhow::Result<()> {
        let provider = Provider::new(ConfigProvider::new(&config));
        let contact = provider.contact_feature()?;

        let draft = ContactDraft {
            name: self.name,
            email: self.email,
            message: self.message,
        };

        let result = send(&contact, &draft).await;

        if self.wait_reset && contact.state().status.is_terminal() {
            wait_for_idle(&contact).await?;
        }

        result.map(|_| ())
    }
}

/// Fills the contact form with `draft` and submits it, printing the message
/// the form would show.
pub async fn send<Contact>(
    contact: &Contact,
    draft: &ContactDraft,
) -> anyhow::Result<ContactFormState>
where
    Contact: ContactFeatureService,
{
    draft.validate()?;

    for field in ContactField::ALL {
        contact.update_field(field, draft.get(field).into());
    }

    let result = contact.submit().await;

    let state = contact.state();
    if let Some(message) = state.status_message() {
        println!("{message}");
    }

    result.context("Failed to send contact message")?;

    Ok(state)
}

async fn wait_for_idle(contact: &impl ContactFeatureService) -> anyhow::Result<()> {
    contact
        .subscribe()
        .wait_for(|state| state.status == ContactStatus::Idle)
        .await
        .context("Contact form was closed before it returned to idle")?;
    info!("Contact form is idle again");
    Ok(())
}
