use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::task::Spawn;

use crate::config::ContactConfig;
use crate::feedback::{Notification, NotificationCenter, NotificationKind};
use crate::form::{
    FieldError, FieldKey, FieldLens, FormController, FormModel, FormOptions, FormResult,
    FormSnapshot, SubmitOutcome,
};

use super::model::{ContactParams, ContactValues, ContactValuesFields};
use super::notifier::Notifier;
use super::registry::register_contact_rules;

/// The contact form: field registry, submission controller and banner.
pub struct ContactForm<N> {
    form: FormController<ContactValues, FieldError>,
    notifications: NotificationCenter,
    notifier: Arc<N>,
    config: Arc<ContactConfig>,
}

impl<N> Clone for ContactForm<N> {
    fn clone(&self) -> Self {
        Self {
            form: self.form.clone(),
            notifications: self.notifications.clone(),
            notifier: Arc::clone(&self.notifier),
            config: Arc::clone(&self.config),
        }
    }
}

impl<N> ContactForm<N>
where
    N: Notifier,
{
    pub fn new(notifier: N, spawner: impl Spawn + Send + Sync + 'static) -> FormResult<Self> {
        Self::with_config(notifier, spawner, ContactConfig::default())
    }

    pub fn with_config(
        notifier: N,
        spawner: impl Spawn + Send + Sync + 'static,
        config: ContactConfig,
    ) -> FormResult<Self> {
        Self::from_parts(notifier, NotificationCenter::new(spawner), config)
    }

    pub(crate) fn from_parts(
        notifier: N,
        notifications: NotificationCenter,
        config: ContactConfig,
    ) -> FormResult<Self> {
        let form = FormController::new(ContactValues::default(), FormOptions::default());
        register_contact_rules(&form, &config.messages)?;
        Ok(Self {
            form,
            notifications,
            notifier: Arc::new(notifier),
            config: Arc::new(config),
        })
    }

    pub fn fields() -> ContactValuesFields {
        ContactValues::fields()
    }

    pub fn form(&self) -> &FormController<ContactValues, FieldError> {
        &self.form
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn config(&self) -> &ContactConfig {
        &self.config
    }

    pub fn set<L>(&self, lens: L, value: impl Into<String>) -> FormResult<()>
    where
        L: FieldLens<ContactValues, Value = String>,
    {
        self.form.set(lens, value.into())
    }

    pub fn touch<L>(&self, lens: L) -> FormResult<()>
    where
        L: FieldLens<ContactValues>,
    {
        self.form.touch(lens)
    }

    pub fn values(&self) -> FormResult<ContactValues> {
        Ok(self.form.snapshot()?.model)
    }

    pub fn snapshot(&self) -> FormResult<FormSnapshot<ContactValues, FieldError>> {
        self.form.snapshot()
    }

    pub fn field_error<L>(&self, lens: L) -> FormResult<Option<String>>
    where
        L: FieldLens<ContactValues>,
    {
        self.form.field_error_for_display(lens)
    }

    pub fn first_error_field(&self) -> FormResult<Option<FieldKey>> {
        self.form.first_error_field()
    }

    /// True while a submission is waiting on the notifier.
    pub fn submit_disabled(&self) -> FormResult<bool> {
        self.form.is_submitting()
    }

    pub fn notification(&self) -> Option<Notification> {
        self.notifications.current()
    }

    /// Runs one submit attempt.
    ///
    /// Invalid input stops here with the errors recorded next to the fields.
    /// Otherwise the notifier is awaited, a success or error banner is shown,
    /// and the form is cleared whatever the notifier returned. Dropping the
    /// future while the notifier is pending clears the form without a banner.
    pub async fn submit(&self) -> FormResult<SubmitOutcome<N::Error>> {
        let notifier = Arc::clone(&self.notifier);
        let reset = ResetOnDrop::new(&self.form);
        let reached = reset.trigger();
        let outcome = self
            .form
            .submit_async(move |values| {
                reached.store(true, Ordering::SeqCst);
                async move {
                    let params = ContactParams::from(values);
                    notifier.send(&params).await
                }
            })
            .await?;

        let messages = &self.config.messages;
        match &outcome {
            SubmitOutcome::Invalid => {
                tracing::debug!(
                    first_error = ?self.form.first_error_field()?,
                    "contact form blocked by validation"
                );
                return Ok(outcome);
            }
            SubmitOutcome::Sent => {
                tracing::debug!("contact form submitted");
                self.notifications
                    .notify(&messages.submit_succeeded, NotificationKind::Success);
            }
            SubmitOutcome::Failed(error) => {
                tracing::error!(%error, "contact form submission failed");
                self.notifications
                    .notify(&messages.submit_failed, NotificationKind::Error);
            }
        }

        reset.disarm();
        self.form.reset_to_initial()?;
        Ok(outcome)
    }
}

/// Clears the form on drop once the notifier has been called.
struct ResetOnDrop<'a> {
    form: &'a FormController<ContactValues, FieldError>,
    armed: Arc<AtomicBool>,
}

impl<'a> ResetOnDrop<'a> {
    fn new(form: &'a FormController<ContactValues, FieldError>) -> Self {
        Self {
            form,
            armed: Arc::new(AtomicBool::new(false)),
        }
    }

    fn trigger(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.armed)
    }

    fn disarm(&self) {
        self.armed.store(false, Ordering::SeqCst);
    }
}

impl Drop for ResetOnDrop<'_> {
    fn drop(&mut self) {
        if !self.armed.swap(false, Ordering::SeqCst) {
            return;
        }
        tracing::debug!("contact form submit interrupted, clearing fields");
        if let Err(error) = self.form.reset_to_initial() {
            tracing::warn!(%error, "could not clear contact form after interrupted submit");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::notifier::{BoxedSendFuture, NoopNotifier};
    use crate::form::{FormError, SubmitState};
    use futures::channel::oneshot;
    use futures::executor::{ThreadPool, block_on};
    use std::future::Future;
    use std::sync::Mutex;
    use std::task::{Context, Poll};
    use std::time::Duration;

    #[derive(Debug, thiserror::Error)]
    #[error("mail relay refused the message")]
    struct RelayRefused;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<ContactParams>>,
    }

    impl Notifier for RecordingNotifier {
        type Error = RelayRefused;
        type Fut<'a> = BoxedSendFuture<'a, RelayRefused>;

        fn send<'a>(&'a self, params: &'a ContactParams) -> Self::Fut<'a> {
            Box::pin(async move {
                self.sent
                    .lock()
                    .expect("recording lock")
                    .push(params.clone());
                Ok::<(), RelayRefused>(())
            })
        }
    }

    struct RefusingNotifier;

    impl Notifier for RefusingNotifier {
        type Error = RelayRefused;
        type Fut<'a> = BoxedSendFuture<'a, RelayRefused>;

        fn send<'a>(&'a self, _params: &'a ContactParams) -> Self::Fut<'a> {
            Box::pin(async { Err::<(), _>(RelayRefused) })
        }
    }

    struct GatedNotifier {
        gate: Mutex<Option<oneshot::Receiver<()>>>,
    }

    impl Notifier for GatedNotifier {
        type Error = RelayRefused;
        type Fut<'a> = BoxedSendFuture<'a, RelayRefused>;

        fn send<'a>(&'a self, _params: &'a ContactParams) -> Self::Fut<'a> {
            let gate = self.gate.lock().expect("gate lock").take();
            Box::pin(async move {
                if let Some(gate) = gate {
                    gate.await.map_err(|_| RelayRefused)?;
                }
                Ok::<(), RelayRefused>(())
            })
        }
    }

    fn contact_form<N: Notifier>(notifier: N) -> ContactForm<N> {
        let pool = ThreadPool::new().expect("thread pool");
        ContactForm::from_parts(
            notifier,
            NotificationCenter::with_display_duration(pool, Duration::from_millis(200)),
            ContactConfig::default(),
        )
        .expect("contact form")
    }

    fn fill<N: Notifier>(
        form: &ContactForm<N>,
        name: &str,
        email: &str,
        subject: &str,
        message: &str,
    ) {
        let fields = ContactForm::<N>::fields();
        form.set(fields.name(), name).expect("set name");
        form.set(fields.email(), email).expect("set email");
        form.set(fields.subject(), subject).expect("set subject");
        form.set(fields.message(), message).expect("set message");
    }

    #[test]
    fn valid_submission_notifies_success_and_resets() {
        let form = contact_form(RecordingNotifier::default());
        fill(&form, "Ann", "ann@example.com", "Hello", "Hi there");

        let outcome = block_on(form.submit()).expect("submit");
        assert!(matches!(outcome, SubmitOutcome::Sent));

        let sent = form.notifier.sent.lock().expect("recording lock").clone();
        assert_eq!(
            sent,
            vec![ContactParams {
                name: "Ann".into(),
                email: "ann@example.com".into(),
                subject: "Hello".into(),
                message: "Hi there".into(),
            }]
        );

        let banner = form.notification().expect("success banner");
        assert_eq!(banner.message, "Form submission was successful!");
        assert_eq!(banner.kind, NotificationKind::Success);
        assert_eq!(form.values().expect("values"), ContactValues::default());
        assert!(!form.submit_disabled().expect("submit state"));
    }

    #[test]
    fn missing_name_blocks_submission_without_banner() {
        let form = contact_form(RecordingNotifier::default());
        fill(&form, "", "ann@example.com", "Hello", "Hi");

        let outcome = block_on(form.submit()).expect("submit");
        assert!(matches!(outcome, SubmitOutcome::Invalid));
        assert!(form.notifier.sent.lock().expect("recording lock").is_empty());
        assert_eq!(form.notification(), None);

        let fields = ContactForm::<RecordingNotifier>::fields();
        assert_eq!(
            form.field_error(fields.name()).expect("name error"),
            Some("Please enter your name".to_string())
        );
        assert_eq!(form.first_error_field().expect("focus"), Some(fields.name().key()));
        assert_eq!(form.values().expect("values").email, "ann@example.com");
    }

    #[test]
    fn notifier_failure_shows_generic_error_and_still_resets() {
        let form = contact_form(RefusingNotifier);
        fill(&form, "Ann", "ann@example.com", "Hello", "Hi");

        let outcome = block_on(form.submit()).expect("submit");
        assert!(matches!(outcome, SubmitOutcome::Failed(RelayRefused)));

        let banner = form.notification().expect("error banner");
        assert_eq!(banner.message, "Uh oh. Something went wrong.");
        assert_eq!(banner.kind, NotificationKind::Error);
        assert_eq!(form.values().expect("values"), ContactValues::default());
        assert_eq!(
            form.snapshot().expect("snapshot").submit_state,
            SubmitState::Idle
        );
    }

    #[test]
    fn submit_is_disabled_while_notifier_is_pending() {
        let (release, gate) = oneshot::channel();
        let form = contact_form(GatedNotifier {
            gate: Mutex::new(Some(gate)),
        });
        fill(&form, "Ann", "ann@example.com", "Hello", "Hi");

        let mut pending = Box::pin(form.submit());
        let waker = futures::task::noop_waker();
        let mut cx = Context::from_waker(&waker);
        assert!(matches!(pending.as_mut().poll(&mut cx), Poll::Pending));
        assert!(form.submit_disabled().expect("submit state"));

        let second = block_on(form.submit());
        assert!(matches!(second, Err(FormError::AlreadySubmitting)));

        release.send(()).expect("notifier still waiting");
        let outcome = block_on(pending).expect("first submit");
        assert!(matches!(outcome, SubmitOutcome::Sent));
        assert!(!form.submit_disabled().expect("submit state"));
    }

    #[test]
    fn dropped_submit_clears_form_and_reenables_submit() {
        let (_release, gate) = oneshot::channel();
        let form = contact_form(GatedNotifier {
            gate: Mutex::new(Some(gate)),
        });
        fill(&form, "Ann", "ann@example.com", "Hello", "Hi");

        let mut pending = Box::pin(form.submit());
        let waker = futures::task::noop_waker();
        let mut cx = Context::from_waker(&waker);
        assert!(matches!(pending.as_mut().poll(&mut cx), Poll::Pending));
        assert!(form.submit_disabled().expect("submit state"));

        drop(pending);
        assert!(!form.submit_disabled().expect("submit state"));
        assert_eq!(form.values().expect("values"), ContactValues::default());
        assert_eq!(form.notification(), None);

        fill(&form, "Ann", "ann@example.com", "Hello", "Hi again");
        let outcome = block_on(form.submit()).expect("second submit");
        assert!(matches!(outcome, SubmitOutcome::Sent));
    }

    #[test]
    fn rejected_second_submit_keeps_pending_values() {
        let (release, gate) = oneshot::channel();
        let form = contact_form(GatedNotifier {
            gate: Mutex::new(Some(gate)),
        });
        fill(&form, "Ann", "ann@example.com", "Hello", "Hi");

        let mut pending = Box::pin(form.submit());
        let waker = futures::task::noop_waker();
        let mut cx = Context::from_waker(&waker);
        assert!(matches!(pending.as_mut().poll(&mut cx), Poll::Pending));

        assert!(matches!(
            block_on(form.submit()),
            Err(FormError::AlreadySubmitting)
        ));
        assert_eq!(form.values().expect("values").name, "Ann");

        release.send(()).expect("notifier still waiting");
        assert!(matches!(
            block_on(pending).expect("first submit"),
            SubmitOutcome::Sent
        ));
    }

    #[test]
    fn errors_revalidate_on_change_after_failed_submit() {
        let form = contact_form(NoopNotifier);
        let fields = ContactForm::<NoopNotifier>::fields();
        fill(&form, &"x".repeat(31), "ann@example.com", "Hello", "Hi");

        let outcome = block_on(form.submit()).expect("submit");
        assert!(matches!(outcome, SubmitOutcome::Invalid));
        assert_eq!(
            form.field_error(fields.name()).expect("name error"),
            Some("Please use 30 characters or less".to_string())
        );

        form.set(fields.name(), "x".repeat(30)).expect("shorten name");
        assert_eq!(form.field_error(fields.name()).expect("name error"), None);

        let outcome = block_on(form.submit()).expect("submit");
        assert!(matches!(outcome, SubmitOutcome::Sent));
    }

    #[test]
    fn banner_clears_itself_after_display_duration() {
        let form = contact_form(NoopNotifier);
        fill(&form, "Ann", "ann@example.com", "Hello", "Hi");
        let _ = block_on(form.submit()).expect("submit");
        assert!(form.notifications().is_visible());

        std::thread::sleep(Duration::from_millis(600));
        assert_eq!(form.notification(), None);
    }
}
