pub mod config;
pub mod contact;
pub mod feedback;
pub mod form;
pub mod prelude;

pub use config::{ConfigError, ContactConfig};
pub use contact::ContactForm;
