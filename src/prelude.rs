pub use crate::config::{ContactConfig, ContactDetails, ContactMessages};
pub use crate::contact::{
    ContactForm, ContactFormView, ContactParams, ContactValues, NoopNotifier, Notifier,
};
pub use crate::feedback::{Notification, NotificationCenter, NotificationKind};
pub use crate::form::{
    FieldError, FieldLens, FieldRules, FormController, FormError, FormModel, FormOptions,
    FormResult, SubmitOutcome,
};
