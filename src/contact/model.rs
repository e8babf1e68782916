use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::form::FormModel;

pub const NAME_MAX_LEN: usize = 30;
pub const SUBJECT_MAX_LEN: usize = 75;

/// Local part, `@`, then dot-separated domain labels. A top-level domain is
/// not required.
pub const EMAIL_PATTERN: &str =
    r"^[a-zA-Z0-9.!#$%&'’*+/=?^_`{|}~-]+@[a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)*$";

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"));

pub fn email_regex() -> &'static Regex {
    &EMAIL_REGEX
}

/// Values typed into the contact form. Starts empty and returns to empty
/// after every submit that reached the notifier.
#[derive(Clone, Debug, Default, Eq, PartialEq, FormModel)]
pub struct ContactValues {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Parameter bundle handed to a [`Notifier`](super::Notifier).
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ContactParams {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl From<ContactValues> for ContactParams {
    fn from(values: ContactValues) -> Self {
        let ContactValues {
            name,
            email,
            subject,
            message,
        } = values;
        Self {
            name,
            email,
            subject,
            message,
        }
    }
}
