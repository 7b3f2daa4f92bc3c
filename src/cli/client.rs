use std::time::Duration;

use anyhow::Context;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;

/// Thin HTTP client for the customizer API. Unwraps the `{success, data}`
/// envelope and turns `{success: false}` bodies into errors.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, path: &str) -> anyhow::Result<Value> {
        self.send::<()>(Method::GET, path, None).await
    }

    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> anyhow::Result<Value> {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn put<B: Serialize>(&self, path: &str, body: &B) -> anyhow::Result<Value> {
        self.send(Method::PUT, path, Some(body)).await
    }

    pub async fn delete<B: Serialize>(&self, path: &str, body: &B) -> anyhow::Result<Value> {
        self.send(Method::DELETE, path, Some(body)).await
    }

    /// Health check; any transport failure counts as down
    pub async fn ping(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.http.get(&url).timeout(Duration::from_secs(5)).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> anyhow::Result<Value> {
        let mut request = self.request(method, path);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .with_context(|| format!("request to {}{} failed", self.base_url, path))?;
        Self::read_envelope(response).await
    }

    async fn read_envelope(response: reqwest::Response) -> anyhow::Result<Value> {
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .with_context(|| format!("server returned a non-JSON body ({})", status))?;
        unwrap_envelope(status, body)
    }
}

fn unwrap_envelope(status: StatusCode, mut body: Value) -> anyhow::Result<Value> {
    if body.get("success").and_then(Value::as_bool) == Some(true) {
        return Ok(body.get_mut("data").map(Value::take).unwrap_or(Value::Null));
    }

    let message = body
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("request failed");
    match body.get("details").and_then(Value::as_str) {
        Some(details) => anyhow::bail!("{} ({}): {}", message, status.as_u16(), details),
        None => anyhow::bail!("{} ({})", message, status.as_u16()),
    }
}
