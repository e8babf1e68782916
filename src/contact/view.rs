use crate::config::ContactDetails;
use crate::feedback::Notification;
use crate::form::{FieldBinding, FieldKey, FormResult};

use super::component::ContactForm;
use super::notifier::Notifier;

pub const FORM_TITLE: &str = "Contact Us";
pub const SUBMIT_LABEL: &str = "Submit";
pub const MESSAGE_ROWS: u8 = 3;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputKind {
    Text,
    Email,
    MultiLine { rows: u8 },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldView {
    pub key: FieldKey,
    pub placeholder: &'static str,
    pub input: InputKind,
    pub value: String,
    pub required: bool,
    pub error: Option<String>,
}

impl FieldView {
    fn from_binding(
        binding: FieldBinding<String>,
        placeholder: &'static str,
        input: InputKind,
    ) -> Self {
        Self {
            key: binding.key,
            placeholder,
            input,
            value: binding.value,
            required: binding.required,
            error: binding.error,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SubmitControl {
    pub label: &'static str,
    pub disabled: bool,
}

/// Static, non-interactive map frame.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MapEmbed {
    pub src: String,
    pub allow_fullscreen: bool,
    pub lazy: bool,
    pub referrer_policy: &'static str,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContactLink {
    pub label: &'static str,
    pub text: String,
    pub href: String,
}

/// Everything a UI layer needs to paint the contact page.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContactFormView {
    pub title: &'static str,
    pub fields: Vec<FieldView>,
    pub submit: SubmitControl,
    pub focus: Option<FieldKey>,
    pub banner: Option<Notification>,
    pub map: MapEmbed,
    pub links: Vec<ContactLink>,
}

impl<N> ContactForm<N>
where
    N: Notifier,
{
    pub fn view(&self) -> FormResult<ContactFormView> {
        let fields = Self::fields();
        let form = self.form();

        Ok(ContactFormView {
            title: FORM_TITLE,
            fields: vec![
                FieldView::from_binding(form.bind(fields.name())?, "Name", InputKind::Text),
                FieldView::from_binding(
                    form.bind(fields.email())?,
                    "Email address",
                    InputKind::Email,
                ),
                FieldView::from_binding(form.bind(fields.subject())?, "Subject", InputKind::Text),
                FieldView::from_binding(
                    form.bind(fields.message())?,
                    "Message",
                    InputKind::MultiLine { rows: MESSAGE_ROWS },
                ),
            ],
            submit: SubmitControl {
                label: SUBMIT_LABEL,
                disabled: self.submit_disabled()?,
            },
            focus: self.first_error_field()?,
            banner: self.notification(),
            map: map_embed(&self.config().details),
            links: contact_links(&self.config().details),
        })
    }
}

fn map_embed(details: &ContactDetails) -> MapEmbed {
    MapEmbed {
        src: details.map_embed_url.clone(),
        allow_fullscreen: true,
        lazy: true,
        referrer_policy: "no-referrer-when-downgrade",
    }
}

fn contact_links(details: &ContactDetails) -> Vec<ContactLink> {
    vec![
        ContactLink {
            label: "Email",
            text: details.email.clone(),
            href: details.mailto_href(),
        },
        ContactLink {
            label: "Mobile",
            text: details.phone.clone(),
            href: details.tel_href(),
        },
    ]
}
