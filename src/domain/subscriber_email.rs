use std::fmt::Display;

/// The address submitted through the signup form.
///
/// Only blank input is rejected here. Anything else is passed through as-is;
/// the marketing service is the actual validator, and its rejection surfaces
/// as an `IntegrationError::Subscribe`.
#[derive(Debug, Clone)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    pub fn parse(email: String) -> Result<Self, String> {
        match email.trim().is_empty() {
            true => Err("Email address is required".to_string()),
            false => Ok(Self(email)),
        }
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str { &self.0 }
}

impl Display for SubscriberEmail {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
