//! RIPE Atlas access: measurement results and probe metadata over HTTP.
//!
//! This module provides types and traits for:
//! - Building HTTP requests and handling responses ([`HttpRequest`], [`HttpResponse`])
//! - Abstracting HTTP clients ([`HttpClient`]) with a reqwest implementation ([`ReqwestClient`])
//! - Retry policy configuration ([`RetryPolicy`])
//! - The Atlas API itself ([`AtlasApi`])

mod api;
mod client;
mod error;
mod http;
mod retry;

#[cfg(test)]
pub(crate) mod mock;


pub use api::{AtlasApi, DEFAULT_API_URL};
pub use client::{DEFAULT_TIMEOUT, ReqwestClient};
pub use error::{AttemptError, FetchError, HttpError, IsRetryable};
pub use http::{HttpClient, HttpRequest, HttpResponse};
pub use retry::RetryPolicy;
