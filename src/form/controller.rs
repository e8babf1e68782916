use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::validation::{FieldLens, ValidationError};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldKey(&'static str);

impl FieldKey {
    pub const fn new(value: &'static str) -> Self {
        Self(value)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitState {
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

/// When a field is validated before the first submit attempt.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationMode {
    OnChange,
    OnBlur,
    OnSubmit,
}

/// When a field is validated again once the form has been submitted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RevalidateMode {
    OnChange,
    OnBlur,
    OnSubmit,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FormOptions {
    pub validate_mode: ValidationMode,
    pub revalidate_mode: RevalidateMode,
    pub validate_first_error_only: bool,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            validate_mode: ValidationMode::OnSubmit,
            revalidate_mode: RevalidateMode::OnChange,
            validate_first_error_only: true,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldMeta<E> {
    pub dirty: bool,
    pub touched: bool,
    pub errors: Vec<E>,
}

impl<E> Default for FieldMeta<E> {
    fn default() -> Self {
        Self {
            dirty: false,
            touched: false,
            errors: Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FormSnapshot<T, E> {
    pub model: T,
    pub submit_state: SubmitState,
    pub submit_count: u32,
    pub is_dirty: bool,
    pub is_valid: bool,
    pub field_meta: BTreeMap<FieldKey, FieldMeta<E>>,
}

impl<T, E> FormSnapshot<T, E> {
    pub fn is_submitting(&self) -> bool {
        self.submit_state == SubmitState::Submitting
    }
}

/// Result of a submit attempt that passed the re-entrancy guard.
#[derive(Debug, Eq, PartialEq)]
pub enum SubmitOutcome<X> {
    /// Validation failed; the submit handler was not called.
    Invalid,
    Sent,
    Failed(X),
}

impl<X> SubmitOutcome<X> {
    pub fn reached_handler(&self) -> bool {
        !matches!(self, SubmitOutcome::Invalid)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("form state lock poisoned while {0}")]
    StatePoisoned(&'static str),
    #[error("invalid submit state transition: {from:?} -> {to:?}")]
    InvalidStateTransition { from: SubmitState, to: SubmitState },
    #[error("form submit is already in progress")]
    AlreadySubmitting,
}

pub type FormResult<T> = Result<T, FormError>;

pub(super) type ValidatorFn<T, E> = Arc<dyn Fn(&T) -> Result<(), E> + Send + Sync>;

/// Validators and the required flag, keyed by field.
pub(super) struct FieldRegistry<T, E> {
    pub(super) validators: BTreeMap<FieldKey, Vec<ValidatorFn<T, E>>>,
    pub(super) required: BTreeSet<FieldKey>,
}

impl<T, E> Default for FieldRegistry<T, E> {
    fn default() -> Self {
        Self {
            validators: BTreeMap::new(),
            required: BTreeSet::new(),
        }
    }
}

pub(super) struct FormState<T, E> {
    pub(super) initial_model: T,
    pub(super) model: T,
    pub(super) submit_state: SubmitState,
    pub(super) submit_count: u32,
    pub(super) dirty_fields: BTreeSet<FieldKey>,
    pub(super) field_meta: BTreeMap<FieldKey, FieldMeta<E>>,
    pub(super) field_order: Vec<FieldKey>,
    pub(super) first_error: Option<FieldKey>,
}

impl<T: Clone, E> FormState<T, E> {
    fn fresh(initial: T) -> Self {
        Self {
            model: initial.clone(),
            initial_model: initial,
            submit_state: SubmitState::Idle,
            submit_count: 0,
            dirty_fields: BTreeSet::new(),
            field_meta: BTreeMap::new(),
            field_order: Vec::new(),
            first_error: None,
        }
    }
}

impl<T, E> FormState<T, E> {
    pub(super) fn note_field(&mut self, key: FieldKey) {
        if !self.field_order.contains(&key) {
            self.field_order.push(key);
        }
    }

    pub(super) fn ensure_meta(&mut self, key: FieldKey) -> &mut FieldMeta<E> {
        self.note_field(key);
        self.field_meta.entry(key).or_default()
    }

    /// First erroring field in registration order.
    pub(super) fn refresh_first_error(&mut self) {
        self.first_error = self.field_order.iter().copied().find(|key| {
            self.field_meta
                .get(key)
                .is_some_and(|meta| !meta.errors.is_empty())
        });
    }
}

/// Puts the submit state back to `Idle` unless the attempt reached a final
/// state. Covers a dropped submit future and early error returns.
struct InFlight<'a, T, E> {
    state: &'a RwLock<FormState<T, E>>,
    armed: bool,
}

impl<'a, T, E> InFlight<'a, T, E> {
    fn arm(state: &'a RwLock<FormState<T, E>>) -> Self {
        Self { state, armed: true }
    }

    fn settle(mut self) {
        self.armed = false;
    }
}

impl<T, E> Drop for InFlight<'_, T, E> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.submit_state = SubmitState::Idle;
    }
}

#[derive(Clone)]
pub struct FormController<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: ValidationError,
{
    pub(super) options: FormOptions,
    pub(super) state: Arc<RwLock<FormState<T, E>>>,
    pub(super) registry: Arc<RwLock<FieldRegistry<T, E>>>,
}

impl<T, E> FormController<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: ValidationError,
{
    pub fn new(initial: T, options: FormOptions) -> Self {
        Self {
            options,
            state: Arc::new(RwLock::new(FormState::fresh(initial))),
            registry: Arc::new(RwLock::new(FieldRegistry::default())),
        }
    }

    pub fn register_required_field<L>(&self, lens: L) -> FormResult<()>
    where
        L: FieldLens<T>,
    {
        write_lock(&self.registry, "marking field required")?
            .required
            .insert(lens.key());
        Ok(())
    }

    pub fn is_required<L>(&self, lens: L) -> FormResult<bool>
    where
        L: FieldLens<T>,
    {
        Ok(read_lock(&self.registry, "reading required fields")?
            .required
            .contains(&lens.key()))
    }

    /// Validates the whole model and, when valid, hands a copy of it to `f`.
    ///
    /// A second call while an attempt is in flight fails with
    /// [`FormError::AlreadySubmitting`]. Dropping the returned future before
    /// it completes puts the form back to `Idle`. The model is never reset
    /// here.
    pub async fn submit_async<F, Fut, X>(&self, f: F) -> FormResult<SubmitOutcome<X>>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<(), X>>,
    {
        let in_flight = {
            let mut state = write_lock(&self.state, "starting submit")?;
            if matches!(
                state.submit_state,
                SubmitState::Validating | SubmitState::Submitting
            ) {
                return Err(FormError::AlreadySubmitting);
            }
            transition_submit_state(&mut state, SubmitState::Validating)?;
            state.submit_count = state.submit_count.saturating_add(1);
            InFlight::arm(&self.state)
        };

        if !self.validate_form()? {
            let mut state = write_lock(&self.state, "rejecting invalid submit")?;
            transition_submit_state(&mut state, SubmitState::Failed)?;
            in_flight.settle();
            return Ok(SubmitOutcome::Invalid);
        }

        let model = {
            let mut state = write_lock(&self.state, "handing model to submit handler")?;
            transition_submit_state(&mut state, SubmitState::Submitting)?;
            state.model.clone()
        };
        let result = f(model).await;

        let mut state = write_lock(&self.state, "finishing submit")?;
        let (next, outcome) = match result {
            Ok(()) => (SubmitState::Succeeded, SubmitOutcome::Sent),
            Err(error) => (SubmitState::Failed, SubmitOutcome::Failed(error)),
        };
        transition_submit_state(&mut state, next)?;
        in_flight.settle();
        Ok(outcome)
    }

    /// The field that should receive focus after a failed submit.
    pub fn first_error_field(&self) -> FormResult<Option<FieldKey>> {
        Ok(read_lock(&self.state, "reading first error field")?.first_error)
    }

    /// Restores the initial model and forgets every submit attempt.
    /// Registered fields keep their order.
    pub fn reset_to_initial(&self) -> FormResult<()> {
        let mut state = write_lock(&self.state, "resetting form")?;
        let order = std::mem::take(&mut state.field_order);
        let mut fresh = FormState::fresh(state.initial_model.clone());
        fresh.field_order = order;
        *state = fresh;
        Ok(())
    }

    pub fn snapshot(&self) -> FormResult<FormSnapshot<T, E>> {
        let state = read_lock(&self.state, "taking form snapshot")?;
        Ok(FormSnapshot {
            model: state.model.clone(),
            submit_state: state.submit_state,
            submit_count: state.submit_count,
            is_dirty: !state.dirty_fields.is_empty(),
            is_valid: state.field_meta.values().all(|meta| meta.errors.is_empty()),
            field_meta: state.field_meta.clone(),
        })
    }

    pub fn is_submitting(&self) -> FormResult<bool> {
        Ok(read_lock(&self.state, "reading submit state")?.submit_state == SubmitState::Submitting)
    }

    pub fn field_meta<L>(&self, lens: L) -> FormResult<Option<FieldMeta<E>>>
    where
        L: FieldLens<T>,
    {
        let state = read_lock(&self.state, "reading field meta")?;
        Ok(state.field_meta.get(&lens.key()).cloned())
    }
}

pub(super) fn transition_submit_state<T, E>(
    state: &mut FormState<T, E>,
    next: SubmitState,
) -> FormResult<()> {
    let current = state.submit_state;
    if current == next {
        return Ok(());
    }

    let allowed = matches!(
        (current, next),
        (SubmitState::Idle, SubmitState::Validating)
            | (SubmitState::Validating, SubmitState::Submitting)
            | (SubmitState::Validating, SubmitState::Failed)
            | (SubmitState::Submitting, SubmitState::Succeeded)
            | (SubmitState::Submitting, SubmitState::Failed)
            | (SubmitState::Succeeded, SubmitState::Validating)
            | (SubmitState::Failed, SubmitState::Validating)
            | (_, SubmitState::Idle)
    );
    if !allowed {
        return Err(FormError::InvalidStateTransition {
            from: current,
            to: next,
        });
    }
    state.submit_state = next;
    Ok(())
}

pub(super) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

pub(super) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}
