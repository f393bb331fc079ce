//! Client for the marketing list service (Mailchimp Marketing API v3).
//!
//! One `MarketingClient` is built per subscription attempt:
//!
//! 1. `authenticate` installs the credentials (no network call)
//! 2. `subscribe` adds the address to the audience, and returns the
//!    `SubscribedMember` needed for the next step
//! 3. `tag` attaches the configured tags to that member
//!
//! Nothing is retried, and a member that was subscribed but could not be
//! tagged stays subscribed.

use std::fmt::Debug;

use reqwest::Client;
use reqwest::Response;
use secrecy::ExposeSecret;
use secrecy::Secret;
use serde::Deserialize;
use serde::Serialize;

use crate::configuration::MarketingSettings;
use crate::domain::SubscriberEmail;
use crate::domain::SubscriberHash;
use crate::domain::Tag;
use crate::domain::TagList;
use crate::domain::TagStatus;
use crate::utils::error_chain_fmt;

/// The API ignores the basic auth username; only the key (password) matters
const API_USER: &str = "anystring";

/// Failure reported by (or while reaching) the remote service
#[derive(thiserror::Error)]
pub enum ProviderError {
    /// The service answered with a non-success status
    #[error("{message}")]
    Api { status: u16, message: String },
    /// Connection failure, timeout, unreadable response
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl Debug for ProviderError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// One variant per step, so that callers can tell which step failed without
/// inspecting the message.
#[derive(thiserror::Error)]
pub enum IntegrationError {
    #[error("Could not configure the marketing client: {0}")]
    Authentication(String),
    #[error("Could not subscribe {email} to audience {audience_id}")]
    Subscribe {
        email: String,
        audience_id: String,
        #[source]
        source: ProviderError,
    },
    #[error("Could not add {email} to the following tags: {tags}")]
    Tag {
        email: String,
        tags: String,
        #[source]
        source: ProviderError,
    },
}

impl IntegrationError {
    /// The text reported by the remote service (or the local reason, for
    /// `Authentication`)
    pub fn provider_message(&self) -> String {
        match self {
            Self::Authentication(reason) => reason.clone(),
            Self::Subscribe { source, .. } | Self::Tag { source, .. } => match source {
                ProviderError::Transport(e) => transport_message(e),
                api => api.to_string(),
            },
        }
    }
}

/// reqwest's own text only names the failing URL; the reason (e.g. the
/// timeout) is further down the `source` chain
fn transport_message(e: &reqwest::Error) -> String {
    let mut message = e.to_string();
    let mut current = std::error::Error::source(e);
    while let Some(cause) = current {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        current = cause.source();
    }
    if e.is_timeout() && !message.contains("timed out") {
        message.push_str(" (timed out)");
    }
    message
}

impl Debug for IntegrationError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Proof of a successful `subscribe`. Fields are private, so the only way to
/// obtain one (and thus to call `tag`) is to subscribe first.
#[derive(Debug, Clone)]
pub struct SubscribedMember {
    email: SubscriberEmail,
    hash: SubscriberHash,
}

impl SubscribedMember {
    pub fn email(&self) -> &SubscriberEmail { &self.email }

    pub fn hash(&self) -> &SubscriberHash { &self.hash }
}

#[derive(Serialize)]
struct AddMemberRequest<'a> {
    email_address: &'a str,
    status: &'a str,
}

#[derive(Serialize)]
struct UpdateTagsRequest {
    tags: Vec<Tag>,
}

/// Error body returned by the API (`application/problem+json`); only the
/// human-readable parts are kept
#[derive(Deserialize)]
struct ProblemDetail {
    title: Option<String>,
    detail: Option<String>,
}

pub struct MarketingClient {
    http_client: Client,
    base_url: String,
    api_key: Secret<String>,
    audience_id: String,
    tags: TagList,
}

impl MarketingClient {
    /// Check and install the credentials from `settings`. `http_client` is
    /// expected to be shared across requests (connections are expensive to
    /// establish).
    ///
    /// The key must be non-blank without whitespace, the server prefix must be
    /// alphanumeric, and a key ending in `-<dc>` must belong to that same
    /// data center.
    #[tracing::instrument(
        name = "Configuring marketing client",
        skip_all,
        fields(server_prefix = %settings.server_prefix)
    )]
    pub fn authenticate(
        settings: &MarketingSettings,
        http_client: Client,
    ) -> Result<Self, IntegrationError> {
        let api_key = settings.api_key.expose_secret();
        if api_key.trim().is_empty() || api_key.chars().any(char::is_whitespace) {
            return Err(IntegrationError::Authentication(
                "API key must be a non-empty string without whitespace".to_string(),
            ));
        }

        let prefix = &settings.server_prefix;
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(IntegrationError::Authentication(format!(
                "Invalid server prefix: {prefix:?}"
            )));
        }

        if let Some((_, dc)) = api_key.rsplit_once('-') {
            if dc != prefix {
                return Err(IntegrationError::Authentication(format!(
                    "API key belongs to data center {dc:?}, not {prefix:?}"
                )));
            }
        }

        let base_url = settings
            .base_url
            .clone()
            .unwrap_or_else(|| format!("https://{prefix}.api.mailchimp.com/3.0"));

        Ok(Self {
            http_client,
            base_url,
            api_key: settings.api_key.clone(),
            audience_id: settings.audience_id.clone(),
            tags: settings.default_tag_list(),
        })
    }

    /// Replace the tags (and their status) applied by the next `tag` call
    pub fn set_tag_list<I, S>(
        &mut self,
        names: I,
        status: TagStatus,
    ) where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = TagList::new(names, status);
    }

    /// `POST /lists/{audience_id}/members`, with status `subscribed`. An
    /// address that is already a member is reported by the service as an
    /// error, which is passed through like any other.
    #[tracing::instrument(
        name = "Adding member to audience",
        skip(self, email),
        fields(
            subscriber_email = %email,
            audience_id = %self.audience_id,
        )
    )]
    pub async fn subscribe(
        &self,
        email: &SubscriberEmail,
    ) -> Result<SubscribedMember, IntegrationError> {
        let url = format!("{}/lists/{}/members", self.base_url, self.audience_id);
        let body = AddMemberRequest {
            email_address: email.as_ref(),
            status: "subscribed",
        };

        if let Err(e) = self.post(&url, &body).await {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "The user with the email {email} could not be subscribed to audience id {}",
                self.audience_id,
            );
            return Err(IntegrationError::Subscribe {
                email: email.to_string(),
                audience_id: self.audience_id.clone(),
                source: e,
            });
        }

        Ok(SubscribedMember {
            hash: SubscriberHash::from_email(email.as_ref()),
            email: email.clone(),
        })
    }

    /// Attach the current tag list (see `set_tag_list`) to `member`
    pub async fn tag(
        &self,
        member: &SubscribedMember,
    ) -> Result<(), IntegrationError> {
        self.tag_with(member, &self.tags).await
    }

    /// `POST /lists/{audience_id}/members/{subscriber_hash}/tags`, with an
    /// explicit tag list instead of the configured one
    #[tracing::instrument(
        name = "Updating member tags",
        skip(self, member, tags),
        fields(
            subscriber_email = %member.email,
            subscriber_hash = %member.hash,
            tags = %tags,
        )
    )]
    pub async fn tag_with(
        &self,
        member: &SubscribedMember,
        tags: &TagList,
    ) -> Result<(), IntegrationError> {
        let url = format!(
            "{}/lists/{}/members/{}/tags",
            self.base_url, self.audience_id, member.hash
        );
        let body = UpdateTagsRequest { tags: tags.tags() };

        self.post(&url, &body).await.map_err(|e| {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "The member with the email {} could not be added to the following tags: {tags}",
                member.email,
            );
            IntegrationError::Tag {
                email: member.email.to_string(),
                tags: tags.to_string(),
                source: e,
            }
        })
    }

    async fn post<T: Serialize>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<(), ProviderError> {
        let response = self
            .http_client
            .post(url)
            .basic_auth(API_USER, Some(self.api_key.expose_secret()))
            .json(body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

/// `error_for_status` would discard the body, which is where the service
/// explains what went wrong
async fn check_status(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await?;
    let message = match serde_json::from_str::<ProblemDetail>(&body) {
        Ok(ProblemDetail {
            title: Some(title),
            detail: Some(detail),
        }) => format!("{title}: {detail}"),
        Ok(ProblemDetail {
            title: Some(message),
            detail: None,
        })
        | Ok(ProblemDetail {
            title: None,
            detail: Some(message),
        }) => message,
        _ if !body.trim().is_empty() => body,
        _ => status.to_string(),
    };

    Err(ProviderError::Api {
        status: status.as_u16(),
        message,
    })
}
