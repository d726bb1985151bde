//! tunegate web server.
//!
//! This crate provides the cookie-session login gateway in front of the
//! provider API: the OAuth2 callback and login routes, the session
//! middleware, and the protected `/v1` routes.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
