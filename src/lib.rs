//! Signup form for a hosted mailing list.
//!
//! An address posted to `/subscriptions` is added to the configured audience
//! of the marketing service, then tagged with the configured tags. See
//! `marketing_client` for the remote side and `routes` for the web side.

pub mod configuration;
pub mod domain;
pub mod marketing_client;
pub mod routes;
pub mod startup;
pub mod telemetry;
pub mod utils;
