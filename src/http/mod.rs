//! HTTP client module
//!
//! Provides the client used by every probe to reach the estimation API.

mod client;

pub use client::{ApiClient, ApiRequest, ApiResponse, HttpError};
