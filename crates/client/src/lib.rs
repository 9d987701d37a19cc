//! # ThreadLoom Client
//!
//! Typed async client for the ThreadLoom document collaboration API.
//!
//! This crate contains:
//! - Configuration loading (environment first, file fallback)
//! - Bearer-token handling behind an injectable provider trait
//! - A retrying HTTP transport (one retry on 429/5xx, fixed backoff)
//! - The markup section scanner
//! - [`ThreadClient`], the typed operation surface
//!
//! ## Architecture
//! - Domain types and the error taxonomy live in `threadloom-domain`
//! - The client is stateless: no cache, no background task, no shared
//!   mutable state beyond the immutable configuration and credential
//! - Every mutating call is an irreversible remote state change; the client
//!   never compensates on partial failure

pub mod api;
pub mod auth;
pub mod config;
pub mod http;
pub mod sections;

// Re-export commonly used items
pub use api::{NewThreadRequest, SearchResults, ThreadClient};
pub use auth::{AccessToken, AccessTokenProvider, StaticToken};
pub use config::ClientConfig;
pub use http::HttpClient;
