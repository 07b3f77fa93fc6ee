//! # zohobooks-rs
//!
//! A Rust client library for the Zoho Books API.
//!
//! Requests are authenticated either with an OAuth access token
//! (`Zoho-oauthtoken`) or a legacy static key (`Zoho-authtoken`), routed to the
//! regional datacenter of the organization, and answered with a JSON envelope
//! whose `code`/`message` pair decides success.
//!
//! ```no_run
//! use zohobooks_rs::{ClientBuilder, Datacenter, KeyPair, OAuthCredentials};
//!
//! # async fn example() -> zohobooks_rs::error::Result<()> {
//! let client = ClientBuilder::new()
//!     .oauth(OAuthCredentials::new(
//!         KeyPair::new("1000.CLIENT".into(), "secret".into()),
//!         "1000.refresh".into(),
//!         "https://example.com/callback".into(),
//!     ))
//!     .organization_id("10234695")
//!     .datacenter(Datacenter::In)
//!     .build()?;
//!
//! client.refresh_access_token().await?;
//! let currencies = client.currencies().list().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Sentry Integration
//!
//! Application errors capture a span trace at the point they are created. With
//! the `sentry` feature enabled errors convert into Sentry breadcrumbs; see
//! the `sentry_integration` module for setup.

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

#[macro_use]
extern crate tracing;

pub mod client;
pub mod config;
pub mod endpoints;
pub mod entities;
pub mod envelope;
pub mod error;
pub mod oauth;
pub mod scope;
pub mod utils;

#[cfg(feature = "sentry")]
pub mod sentry_integration;

pub use client::Client;
pub use config::{ClientBuilder, Config};
pub use endpoints::{Datacenter, ZohoEndpoint};
pub use entities::*;
pub use envelope::{Envelope, Payload, Projection};
pub use error::Error;
pub use oauth::{KeyPair, OAuthCredentials, authorize_url};
pub use scope::{Module, Operation, Scope, ScopeType};

// Re-export SpanTrace for users who want to access it
pub use tracing_error::SpanTrace;

pub use entities::contact::{Contact, ContactParams};
pub use entities::invoice::{Invoice, InvoiceParams, LineItem};
pub use entities::payment::{Payment, PaymentParams};
