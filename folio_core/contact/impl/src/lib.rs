use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, PoisonError, Weak,
    },
    time::Duration,
};

use folio_core_contact_contracts::{ContactFeatureService, ContactSubmitError};
use folio_extern_contracts::relay::{RelayApiService, RelaySubmission};
use folio_models::contact::{
    ContactDraft, ContactField, ContactFormState, ContactStatus, DEFAULT_SUBJECT_PREFIX,
    FAILURE_MESSAGE,
};
use tokio::{runtime::Handle, sync::watch, task::JoinHandle};
use tracing::{debug, error, info, instrument, warn};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone)]
pub struct ContactFeatureServiceImpl<RelayApi> {
    relay_api: RelayApi,
    config: ContactFeatureConfig,
    state: Arc<State>,
}

#[derive(Debug, Clone)]
pub struct ContactFeatureConfig {
    /// How long `Succeeded` and `Failed` are shown before the form returns to
    /// `Idle`.
    pub reset_delay: Duration,
    /// Prepended to the sender's name to form the email subject.
    pub subject_prefix: Arc<str>,
}

impl Default for ContactFeatureConfig {
    fn default() -> Self {
        Self {
            reset_delay: Duration::from_secs(3),
            subject_prefix: DEFAULT_SUBJECT_PREFIX.into(),
        }
    }
}

#[derive(Debug)]
struct State {
    form: watch::Sender<ContactFormState>,
    /// Incremented whenever a submission starts. A reset task only applies to
    /// the submission it was scheduled for.
    generation: AtomicU64,
    reset_task: Mutex<Option<JoinHandle<()>>>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            form: watch::Sender::new(ContactFormState::default()),
            generation: Default::default(),
            reset_task: Default::default(),
        }
    }
}

impl State {
    fn reset_task(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.reset_task.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for State {
    fn drop(&mut self) {
        let task = self
            .reset_task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.abort();
        }
    }
}

/// Tracks the relay call of one submission. If it is dropped before
/// [`Submission::finish`] runs, the submission counts as failed.
struct Submission<'a, RelayApi> {
    service: &'a ContactFeatureServiceImpl<RelayApi>,
    generation: u64,
    finished: bool,
}

impl<RelayApi> Submission<'_, RelayApi> {
    fn finish(mut self, sent: bool) {
        self.finished = true;
        self.service.finish_submission(self.generation, sent);
    }
}

impl<RelayApi> Drop for Submission<'_, RelayApi> {
    fn drop(&mut self) {
        if !self.finished {
            warn!(
                generation = self.generation,
                "Contact submission was cancelled before the relay answered"
            );
            self.service.finish_submission(self.generation, false);
        }
    }
}

impl<RelayApi> ContactFeatureServiceImpl<RelayApi> {
    pub fn new(relay_api: RelayApi, config: ContactFeatureConfig) -> Self {
        Self {
            relay_api,
            config,
            state: Default::default(),
        }
    }

    fn subject(&self, draft: &ContactDraft) -> String {
        format!("{} {}", self.config.subject_prefix, draft.name)
    }

    /// Marks the form as `Sending` and returns the draft to send, unless a
    /// submission is already in flight.
    fn begin_submission(&self) -> Option<(u64, ContactDraft)> {
        let mut started = None;
        self.state.form.send_if_modified(|form| {
            if form.status == ContactStatus::Sending {
                return false;
            }
            let generation = self.state.generation.fetch_add(1, Ordering::SeqCst) + 1;
            form.status = ContactStatus::Sending;
            started = Some((generation, form.draft.clone()));
            true
        });
        started
    }

    /// Moves submission `generation` from `Sending` to its outcome and
    /// schedules the reset.
    fn finish_submission(&self, generation: u64, sent: bool) {
        let finished = self.state.form.send_if_modified(|form| {
            if self.state.generation.load(Ordering::SeqCst) != generation
                || form.status != ContactStatus::Sending
            {
                return false;
            }
            if sent {
                form.status = ContactStatus::Succeeded;
                form.draft = ContactDraft::default();
            } else {
                form.status = ContactStatus::Failed {
                    message: FAILURE_MESSAGE.into(),
                };
            }
            true
        });

        if finished {
            self.schedule_reset(generation);
        }
    }

    fn schedule_reset(&self, generation: u64) {
        let Ok(runtime) = Handle::try_current() else {
            warn!(generation, "No runtime to schedule the reset on");
            return;
        };

        let state = Arc::downgrade(&self.state);
        let delay = self.config.reset_delay;
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            reset(state, generation);
        });

        if let Some(previous) = self.state.reset_task().replace(task) {
            previous.abort();
        }
    }

    fn cancel_reset(&self) {
        if let Some(task) = self.state.reset_task().take() {
            debug!("cancelled pending reset");
            task.abort();
        }
    }
}

/// Returns the form to `Idle` if no newer submission has started since
/// `generation`.
fn reset(state: Weak<State>, generation: u64) {
    let Some(state) = state.upgrade() else {
        return;
    };

    let changed = state.form.send_if_modified(|form| {
        if state.generation.load(Ordering::SeqCst) != generation || !form.status.is_terminal() {
            return false;
        }
        form.status = ContactStatus::Idle;
        true
    });

    if changed {
        debug!(generation, "contact form reset to idle");
    }
}

impl<RelayApi> ContactFeatureService for ContactFeatureServiceImpl<RelayApi>
where
    RelayApi: RelayApiService,
{
    #[instrument(skip(self, value))]
    fn update_field(&self, field: ContactField, value: String) {
        self.state.form.send_modify(|form| form.draft.set(field, value));
    }

    #[instrument(skip(self))]
    async fn submit(&self) -> Result<(), ContactSubmitError> {
        let Some((generation, draft)) = self.begin_submission() else {
            warn!("Ignoring submission while another one is in flight");
            return Err(ContactSubmitError::AlreadySending);
        };
        info!(generation, "Sending contact message");
        let in_flight = Submission {
            service: self,
            generation,
            finished: false,
        };

        self.cancel_reset();

        let submission = RelaySubmission {
            subject: self.subject(&draft),
            name: draft.name,
            email: draft.email,
            message: draft.message,
        };

        let result = self
            .relay_api
            .submit(submission)
            .await
            .inspect_err(|err| error!("Failed to send contact message: {err:?}"));

        in_flight.finish(result.is_ok());

        if result.is_ok() {
            info!(generation, "Contact message sent");
        }

        result.map_err(ContactSubmitError::Relay)
    }

    fn state(&self) -> ContactFormState {
        self.state.form.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<ContactFormState> {
        self.state.form.subscribe()
    }
}
