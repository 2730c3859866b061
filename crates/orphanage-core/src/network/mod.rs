//! Network utilities for HTTP operations.
//!
//! Requests are blocking; callers that need a deadline wrap the whole
//! operation themselves.

mod client;

pub use client::{join_url, HttpClient};
