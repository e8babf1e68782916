mod component;
mod model;
mod notifier;
mod registry;
mod view;

pub use component::ContactForm;
pub use model::{
    ContactParams, ContactValues, ContactValuesEmailLens, ContactValuesFields,
    ContactValuesMessageLens, ContactValuesNameLens, ContactValuesSubjectLens, EMAIL_PATTERN,
    NAME_MAX_LEN, SUBJECT_MAX_LEN, email_regex,
};
pub use notifier::{BoxedSendFuture, NoopNotifier, Notifier};
pub use registry::register_contact_rules;
pub use view::{
    ContactFormView, ContactLink, FieldView, InputKind, MapEmbed, SubmitControl,
};
