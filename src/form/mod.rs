mod binding;
mod controller;
mod rules;
mod validation;


pub use binding::FieldBinding;
pub use contactus_form_derive::FormModel;
pub use controller::{
    FieldKey, FieldMeta, FormController, FormError, FormOptions, FormResult, FormSnapshot,
    RevalidateMode, SubmitOutcome, SubmitState, ValidationMode,
};
pub use rules::{FieldError, FieldRules, RuleKind};
pub use validation::{FieldLens, FieldValidator, FormModel, ValidationError};
