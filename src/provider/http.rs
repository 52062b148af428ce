//! HTTP Transport
//!
//! The client seam injected into the provider, plus the shipped reqwest
//! implementation. Implementations return the parsed JSON response body;
//! timeout and proxy policy belong to the client, not the provider.

use std::future::Future;

use serde_json::Value;

use crate::error::Result;

/// Transport capability injected into the provider
pub trait HttpClient: Send + Sync {
    /// Issue a GET request to a fully formed URL
    fn get(&self, url: &str) -> impl Future<Output = Result<Value>> + Send;

    /// Issue a POST request with a JSON body
    fn post(&self, url: &str, body: &Value) -> impl Future<Output = Result<Value>> + Send;
}

/// `HttpClient` backed by a shared `reqwest::Client`
#[derive(Clone, Debug, Default)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a preconfigured client (timeouts, proxies, default headers)
    pub fn with_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }
}

impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<Value> {
        let response = self.inner.get(url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value> {
        let response = self
            .inner
            .post(url)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}
