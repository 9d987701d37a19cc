//! HTTP transport
//!
//! A thin layer over `reqwest` implementing the protocol's fixed retry
//! policy. Status-code classification into the error taxonomy happens one
//! layer up, in [`crate::api`].

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
