//! Core domain types and utilities for tunegate.
//!
//! This crate provides the foundational types shared by the session codec,
//! the provider client, and the server: the `Credential` bundle granted by
//! the remote provider, and the `Result` alias used for error propagation.

pub mod credential;
pub mod error;

pub use credential::Credential;
pub use error::Result;
