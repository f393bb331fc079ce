use std::fmt::Debug;

use actix_web::error::InternalError;
use actix_web::web;
use actix_web::HttpResponse;
use actix_web_flash_messages::FlashMessage;
use serde::Deserialize;

use crate::configuration::MarketingSettings;
use crate::domain::SubscriberEmail;
use crate::marketing_client::IntegrationError;
use crate::marketing_client::MarketingClient;
use crate::utils::error_chain_fmt;
use crate::utils::redirect;

pub const SUCCESS_MESSAGE: &str = "Email received. Thank you!";
pub const FAILURE_MESSAGE: &str = "We could not subscribe you right now. Please try again later.";

#[derive(Deserialize)]
pub struct FormData {
    email: String,
}

#[derive(thiserror::Error)]
pub enum SubscribeError {
    #[error("{0}")]
    ValidationError(String),
    #[error(transparent)]
    IntegrationError(#[from] IntegrationError),
}

impl Debug for SubscribeError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// `POST /subscriptions`
///
/// Registers `email` with the marketing service: authenticate, subscribe, then
/// tag. Either way, the user is sent back to the form (`303`), where the
/// outcome is shown as a flash message.
///
/// A missing `email` field is rejected by the `Form` extractor (400), a blank
/// one by `SubscriberEmail::parse` (400). The address format itself is not
/// checked here.
///
/// # Request example
///
/// ```sh
///     curl -v --data 'email=john@foo.com' http://127.0.0.1:8000/subscriptions
/// ```
#[tracing::instrument(
    name = "Subscribing new member",
    skip(form, settings, http_client),
    fields(
        subscriber_email = %form.email,
        subscriber_hash = tracing::field::Empty,
    )
)]
pub async fn subscribe(
    form: web::Form<FormData>,
    settings: web::Data<MarketingSettings>,
    http_client: web::Data<reqwest::Client>,
    // `InternalError` lets us return the redirect while still handing the error
    // to the middleware chain (i.e. `TracingLogger`)
) -> Result<HttpResponse, InternalError<SubscribeError>> {
    let email = SubscriberEmail::parse(form.0.email).map_err(|e| {
        InternalError::from_response(
            SubscribeError::ValidationError(e),
            HttpResponse::BadRequest().finish(),
        )
    })?;

    match register_member(&email, &settings, http_client.get_ref().clone()).await {
        Ok(()) => {
            FlashMessage::success(SUCCESS_MESSAGE).send();
            Ok(redirect("/subscriptions"))
        }
        Err(e) => {
            FlashMessage::error(FAILURE_MESSAGE).send();
            Err(InternalError::from_response(
                e.into(),
                redirect("/subscriptions"),
            ))
        }
    }
}

/// The whole exchange with the marketing service, independent of the web
/// framework. Stops at the first failing step.
async fn register_member(
    email: &SubscriberEmail,
    settings: &MarketingSettings,
    http_client: reqwest::Client,
) -> Result<(), IntegrationError> {
    let client = MarketingClient::authenticate(settings, http_client)?;
    let member = client.subscribe(email).await?;
    tracing::Span::current().record("subscriber_hash", tracing::field::display(member.hash()));

    client.tag(&member).await?;
    tracing::info!("{} subscribed and tagged", member.email());
    Ok(())
}
