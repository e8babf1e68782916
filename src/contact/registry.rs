use crate::config::ContactMessages;
use crate::form::{FieldError, FieldRules, FormController, FormModel, FormResult};

use super::model::{ContactValues, NAME_MAX_LEN, SUBJECT_MAX_LEN, email_regex};

/// Binds the four contact inputs to their rules. Registration order is the
/// on-screen order, which is also the focus order after a failed submit.
pub fn register_contact_rules(
    form: &FormController<ContactValues, FieldError>,
    messages: &ContactMessages,
) -> FormResult<()> {
    let fields = ContactValues::fields();

    form.register_rules(
        fields.name(),
        FieldRules::new()
            .required(&messages.name_required)
            .max_len(NAME_MAX_LEN, &messages.name_too_long),
    )?;
    form.register_rules(
        fields.email(),
        FieldRules::new()
            .required(&messages.email_invalid)
            .pattern(email_regex().clone(), &messages.email_invalid),
    )?;
    form.register_rules(
        fields.subject(),
        FieldRules::new()
            .required(&messages.subject_required)
            .max_len(SUBJECT_MAX_LEN, &messages.subject_too_long),
    )?;
    form.register_rules(
        fields.message(),
        FieldRules::new().required(&messages.message_required),
    )?;
    Ok(())
}
