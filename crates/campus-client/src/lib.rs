//! # campus-client
//!
//! REST client for the campusdesk API.
//!
//! This crate provides:
//! - [`ApiClient`]: base URL, session cookie, timeouts and error mapping
//! - [`HttpGateway`]: the [`campus_core::RemoteGateway`] for one entity
//! - [`envelope`]: normalization of the API's response envelopes
//! - [`SessionClient`] and [`AuthGate`]: admin session checks
//! - [`public`]: newsletter signup, catalog listings, contact link
//!
//! # Example
//!
//! ```rust,no_run
//! use campus_client::{ApiClient, ClientConfig, HttpGateway};
//! use campus_core::entity::UNIVERSITY;
//! use campus_core::RemoteGateway;
//!
//! #[tokio::main]
//! async fn main() -> campus_core::Result<()> {
//!     let api = ApiClient::new(ClientConfig::from_env())?;
//!     let universities = HttpGateway::new(api, &UNIVERSITY).get_all().await?;
//!     println!("{} universities", universities.len());
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod envelope;
pub mod http;
pub mod public;

pub use auth::{AuthDecision, AuthGate, SessionClient};
pub use config::ClientConfig;
pub use http::{ApiClient, HttpGateway};
