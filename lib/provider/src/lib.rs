//! The remote identity/resource provider, seen from tunegate.
//!
//! This crate provides:
//! - The `AuthProvider` collaborator interface used by the auth adaptor
//! - `OAuth2Provider`, its authorization-code implementation
//! - `ApiClient`, the per-request capability for calling the provider API
//! - `ProviderConfig`, endpoint and client registration settings
//!
//! Defaults target the Spotify accounts service and Web API.

pub mod client;
pub mod config;
pub mod error;
pub mod oauth;
pub mod provider;

pub use client::{ApiClient, UserProfile};
pub use config::ProviderConfig;
pub use error::{ApiError, ProviderError};
pub use oauth::OAuth2Provider;
pub use provider::{AuthProvider, CallbackParams};
