use super::controller::{FieldKey, FormController, FormResult, read_lock};
use super::validation::{FieldLens, ValidationError};

/// Everything an input needs to draw itself for one field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldBinding<V> {
    pub key: FieldKey,
    pub value: V,
    pub required: bool,
    pub error: Option<String>,
}

impl<V> FieldBinding<V> {
    pub fn is_invalid(&self) -> bool {
        self.error.is_some()
    }
}

impl<T, E> FormController<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: ValidationError,
{
    pub fn field_error_for_display<L>(&self, lens: L) -> FormResult<Option<String>>
    where
        L: FieldLens<T>,
    {
        self.display_error_message(lens.key())
    }

    pub fn bind<L>(&self, lens: L) -> FormResult<FieldBinding<L::Value>>
    where
        L: FieldLens<T>,
    {
        let key = lens.key();
        let value = {
            let state = read_lock(&self.state, "reading field value for binding")?;
            lens.get(&state.model).clone()
        };
        let required = self.is_required(lens)?;

        Ok(FieldBinding {
            key,
            value,
            required,
            error: self.display_error_message(key)?,
        })
    }

    fn display_error_message(&self, key: FieldKey) -> FormResult<Option<String>> {
        let state = read_lock(&self.state, "reading display error message")?;
        let Some(meta) = state.field_meta.get(&key) else {
            return Ok(None);
        };
        if !meta.touched && state.submit_count == 0 {
            return Ok(None);
        }
        Ok(meta.errors.first().map(ValidationError::message))
    }
}
