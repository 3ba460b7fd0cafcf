//! Shared upstream HTTP plumbing.
//!
//! Maps transport and status outcomes onto `UpstreamError` and applies an
//! optional local request throttle.

use std::num::NonZeroU32;
use std::sync::Arc;

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use commission_types::UpstreamError;

type Throttle = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// HTTP access to one named upstream service.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    service: &'static str,
    throttle: Option<Arc<Throttle>>,
}

impl UpstreamClient {
    pub fn new(http: reqwest::Client, service: &'static str) -> Self {
        Self {
            http,
            service,
            throttle: None,
        }
    }

    /// Caps outbound calls at `requests` per minute. Zero disables the cap.
    ///
    /// Calls over the cap fail immediately with `RateLimited` instead of
    /// spending upstream quota.
    pub fn with_requests_per_minute(mut self, requests: u32) -> Self {
        self.throttle = NonZeroU32::new(requests)
            .map(|n| Arc::new(RateLimiter::direct(Quota::per_minute(n))));
        self
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    /// Starts a GET request.
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.http.get(url)
    }

    /// Sends `request` and returns the body of a successful response.
    ///
    /// `resource` names what was asked for, for not-found errors and logs.
    pub async fn send(
        &self,
        request: RequestBuilder,
        resource: &str,
    ) -> Result<String, UpstreamError> {
        if let Some(throttle) = &self.throttle {
            if throttle.check().is_err() {
                warn!(service = self.service, resource, "local request quota exhausted");
                return Err(UpstreamError::RateLimited {
                    service: self.service,
                    status: None,
                });
            }
        }

        debug!(service = self.service, resource, "calling upstream");
        let response = request.send().await.map_err(|e| self.network(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                service = self.service,
                resource,
                status = status.as_u16(),
                "upstream returned error status"
            );
            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => UpstreamError::RateLimited {
                    service: self.service,
                    status: Some(status.as_u16()),
                },
                StatusCode::NOT_FOUND => UpstreamError::NotFound {
                    service: self.service,
                    resource: resource.to_string(),
                },
                other => UpstreamError::Status {
                    service: self.service,
                    status: other.as_u16(),
                },
            });
        }

        response.text().await.map_err(|e| self.network(e))
    }

    /// Decodes a JSON body.
    pub fn decode<T: DeserializeOwned>(&self, body: &str) -> Result<T, UpstreamError> {
        serde_json::from_str(body).map_err(|e| UpstreamError::Decode {
            service: self.service,
            message: e.to_string(),
        })
    }

    /// Builds an `InvalidData` error for this service.
    pub fn invalid_data(&self, message: impl Into<String>) -> UpstreamError {
        UpstreamError::InvalidData {
            service: self.service,
            message: message.into(),
        }
    }

    fn network(&self, err: reqwest::Error) -> UpstreamError {
        // Strip the URL: it may carry an access key.
        let err = err.without_url();
        let message = if err.is_timeout() {
            format!("request timed out: {}", err)
        } else {
            err.to_string()
        };
        UpstreamError::Network {
            service: self.service,
            message,
        }
    }
}
