use std::fmt::Display;

use md5::Digest;
use md5::Md5;

/// Addressing key for per-member endpoints of the marketing API: the lowercase
/// hex MD5 digest of the lower-cased email address.
///
/// Recomputed on demand; never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberHash(String);

impl SubscriberHash {
    pub fn from_email(email: &str) -> Self {
        let digest = Md5::digest(email.to_lowercase().as_bytes());
        Self(hex::encode(digest))
    }
}

impl AsRef<str> for SubscriberHash {
    fn as_ref(&self) -> &str { &self.0 }
}

impl Display for SubscriberHash {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
