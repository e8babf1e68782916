use std::collections::{BTreeMap, BTreeSet};

use super::controller::{
    FieldKey, FormController, FormResult, RevalidateMode, ValidationMode, ValidatorFn, read_lock,
    write_lock,
};

pub trait ValidationError: Clone + Send + Sync + 'static {
    fn message(&self) -> String;
}

pub trait FieldLens<T>: Copy + Send + Sync + 'static {
    type Value: Clone + PartialEq + Send + Sync + 'static;

    fn key(self) -> FieldKey;
    fn get<'a>(self, model: &'a T) -> &'a Self::Value;
    fn set(self, model: &mut T, value: Self::Value);
}

pub trait FormModel: Clone + Send + Sync + 'static {
    type Fields;

    fn fields() -> Self::Fields;

    /// Keys of every lens in declaration order.
    fn field_keys() -> &'static [FieldKey];
}

pub trait FieldValidator<T, L, E>: Send + Sync
where
    L: FieldLens<T>,
    E: ValidationError,
{
    fn validate(&self, model: &T, value: &L::Value) -> Result<(), E>;
}

impl<T, L, E, F> FieldValidator<T, L, E> for F
where
    L: FieldLens<T>,
    E: ValidationError,
    F: for<'a> Fn(&'a T, &'a L::Value) -> Result<(), E> + Send + Sync,
{
    fn validate(&self, model: &T, value: &L::Value) -> Result<(), E> {
        (self)(model, value)
    }
}

impl<T, E> FormController<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: ValidationError,
{
    pub fn register_field_validator<L, V>(&self, lens: L, validator: V) -> FormResult<()>
    where
        L: FieldLens<T>,
        V: FieldValidator<T, L, E> + 'static,
    {
        let key = lens.key();
        let validator = std::sync::Arc::new(validator);
        let wrapped: ValidatorFn<T, E> =
            std::sync::Arc::new(move |model: &T| validator.validate(model, lens.get(model)));
        write_lock(&self.state, "registering field order")?.note_field(key);
        write_lock(&self.registry, "registering field validator")?
            .validators
            .entry(key)
            .or_default()
            .push(wrapped);
        Ok(())
    }

    pub fn set<L>(&self, lens: L, value: L::Value) -> FormResult<()>
    where
        L: FieldLens<T>,
    {
        let key = lens.key();
        let submitted = {
            let mut state = write_lock(&self.state, "writing form model")?;
            lens.set(&mut state.model, value);
            let is_dirty = lens.get(&state.model) != lens.get(&state.initial_model);
            if is_dirty {
                state.dirty_fields.insert(key);
            } else {
                state.dirty_fields.remove(&key);
            }
            state.ensure_meta(key).dirty = is_dirty;
            state.submit_count > 0
        };

        let validate = if submitted {
            self.options.revalidate_mode == RevalidateMode::OnChange
        } else {
            self.options.validate_mode == ValidationMode::OnChange
        };
        if validate {
            let _ = self.validate_field_by_key(key)?;
        }
        Ok(())
    }

    pub fn touch<L>(&self, lens: L) -> FormResult<()>
    where
        L: FieldLens<T>,
    {
        let key = lens.key();
        let submitted = {
            let mut state = write_lock(&self.state, "touching field")?;
            state.ensure_meta(key).touched = true;
            state.submit_count > 0
        };

        let validate = if submitted {
            self.options.revalidate_mode == RevalidateMode::OnBlur
        } else {
            self.options.validate_mode == ValidationMode::OnBlur
        };
        if validate {
            let _ = self.validate_field_by_key(key)?;
        }
        Ok(())
    }

    /// Validates one field and reports whether it is free of errors.
    pub fn validate_field<L>(&self, lens: L) -> FormResult<bool>
    where
        L: FieldLens<T>,
    {
        self.validate_field_by_key(lens.key())
    }

    pub fn validate_form(&self) -> FormResult<bool> {
        let model = {
            read_lock(&self.state, "reading model for form validation")?
                .model
                .clone()
        };
        let field_validators = read_lock(&self.registry, "reading validators for form")?
            .validators
            .clone();

        let mut field_errors = BTreeMap::<FieldKey, Vec<E>>::new();
        for (key, validators) in field_validators {
            field_errors.insert(key, self.run_validators(&model, &validators));
        }

        {
            let mut state = write_lock(&self.state, "applying form validation result")?;
            let mut keys = state
                .field_meta
                .keys()
                .copied()
                .collect::<BTreeSet<FieldKey>>();
            keys.extend(field_errors.keys().copied());
            for key in keys {
                let meta = state.ensure_meta(key);
                meta.errors = field_errors.remove(&key).unwrap_or_default();
            }
            state.refresh_first_error();
        }

        Ok(self.snapshot()?.is_valid)
    }

    pub(super) fn validate_field_by_key(&self, key: FieldKey) -> FormResult<bool> {
        let model = {
            read_lock(&self.state, "reading model for field validation")?
                .model
                .clone()
        };
        let validators = {
            read_lock(&self.registry, "reading validators for field")?
                .validators
                .get(&key)
                .cloned()
                .unwrap_or_default()
        };

        let errors = self.run_validators(&model, &validators);

        let mut state = write_lock(&self.state, "writing field validation result")?;
        state.ensure_meta(key).errors = errors;
        state.refresh_first_error();
        Ok(state
            .field_meta
            .get(&key)
            .is_none_or(|meta| meta.errors.is_empty()))
    }

    fn run_validators(&self, model: &T, validators: &[ValidatorFn<T, E>]) -> Vec<E> {
        let mut errors = Vec::new();
        for validator in validators {
            if let Err(error) = validator(model) {
                errors.push(error);
                if self.options.validate_first_error_only {
                    break;
                }
            }
        }
        errors
    }
}
