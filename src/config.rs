use std::path::Path;

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read contact config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid contact config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Static contact details rendered next to the form.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContactDetails {
    pub email: String,
    pub phone: String,
    pub map_embed_url: String,
}

impl Default for ContactDetails {
    fn default() -> Self {
        Self {
            email: "circuitdantewada@example.com".to_string(),
            phone: "+91 98765 43210".to_string(),
            map_embed_url: concat!(
                "https://www.google.com/maps/embed?pb=!1m18!1m12!1m3!1d14548.208061321366",
                "!2d81.32319769999999!3d19.0631655!2m3!1f0!2f0!3f0!3m2!1i1024!2i768!4f13.1",
                "!3m3!1m2!1s0x3a2c2f9fef25c30f%3A0x1f477973b8ec60!2sDantewada%2C%20Chhattisgarh",
                "!5e0!3m2!1sen!2sin!4v1696192434087!5m2!1sen!2sin"
            )
            .to_string(),
        }
    }
}

impl ContactDetails {
    pub fn mailto_href(&self) -> String {
        format!("mailto:{}", self.email)
    }

    /// `tel:` URI with the display spacing removed.
    pub fn tel_href(&self) -> String {
        let digits = self
            .phone
            .chars()
            .filter(|ch| ch.is_ascii_digit() || *ch == '+')
            .collect::<String>();
        format!("tel:{digits}")
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContactMessages {
    pub name_required: String,
    pub name_too_long: String,
    pub email_invalid: String,
    pub subject_required: String,
    pub subject_too_long: String,
    pub message_required: String,
    pub submit_succeeded: String,
    pub submit_failed: String,
}

impl Default for ContactMessages {
    fn default() -> Self {
        Self {
            name_required: "Please enter your name".to_string(),
            name_too_long: "Please use 30 characters or less".to_string(),
            email_invalid: "Please enter a valid email address".to_string(),
            subject_required: "Please enter a subject".to_string(),
            subject_too_long: "Subject cannot exceed 75 characters".to_string(),
            message_required: "Please enter a message".to_string(),
            submit_succeeded: "Form submission was successful!".to_string(),
            submit_failed: "Uh oh. Something went wrong.".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub details: ContactDetails,
    pub messages: ContactMessages,
}

impl ContactConfig {
    /// Missing sections and keys fall back to the defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), "loaded contact config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_page_defaults() {
        let config = ContactConfig::from_toml_str("").expect("empty config parses");
        assert_eq!(config, ContactConfig::default());
        assert_eq!(config.details.mailto_href(), "mailto:circuitdantewada@example.com");
        assert_eq!(config.details.tel_href(), "tel:+919876543210");
        assert!(config.details.map_embed_url.contains("Dantewada"));
    }

    #[test]
    fn partial_sections_override_only_given_keys() {
        let config = ContactConfig::from_toml_str(
            r#"
            [details]
            email = "hello@example.org"

            [messages]
            submit_failed = "Could not send your message."
            "#,
        )
        .expect("partial config parses");

        assert_eq!(config.details.email, "hello@example.org");
        assert_eq!(config.details.phone, "+91 98765 43210");
        assert_eq!(config.messages.submit_failed, "Could not send your message.");
        assert_eq!(
            config.messages.submit_succeeded,
            "Form submission was successful!"
        );
    }

    #[test]
    fn malformed_config_is_a_parse_error() {
        let error = ContactConfig::from_toml_str("[details\nemail = 1").expect_err("must fail");
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let error = ContactConfig::load("/nonexistent/contactus.toml").expect_err("must fail");
        assert!(error.to_string().contains("/nonexistent/contactus.toml"));
    }
}
