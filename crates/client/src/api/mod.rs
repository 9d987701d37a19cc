//! Document service API client
//!
//! This module provides the typed operation surface over the HTTP
//! transport. It handles authentication headers, status-code
//! classification, and the two-phase move operation.
//!
//! # Architecture
//!
//! - Uses [`crate::http::HttpClient`] (no direct reqwest)
//! - Bearer-token authentication via [`crate::auth::AccessTokenProvider`]
//! - Form-url-encoded writes, structured-object reads
//! - Partial-failure reporting for multi-step operations; no compensation

pub mod client;
mod wire;

pub use client::{NewThreadRequest, SearchResults, ThreadClient};
