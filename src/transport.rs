use std::fmt;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;

use crate::{ClientConfig, ClientError, RequestDescriptor, Response, Result, TransformPipeline};

/// Outcome of a request that did not produce a 2xx response.
#[derive(Debug)]
pub(crate) enum Failure {
    /// A response arrived with a non-success status.
    Status(Response),
    /// No response was received, or its body could not be read.
    Network(reqwest::Error),
    /// The body could not be encoded; nothing was sent.
    Encode(ClientError),
}

/// Thin wrapper over `reqwest::Client` bound to one validated config.
#[derive(Clone)]
pub(crate) struct Transport {
    http: reqwest::Client,
    config: ClientConfig,
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.config.base_url)
            .field("timeout_ms", &self.config.timeout_ms)
            .finish()
    }
}

impl Transport {
    pub(crate) fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            http: reqwest::Client::new(),
            config,
        })
    }

    pub(crate) fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sends `request`, running its body through `pipeline` first.
    ///
    /// The descriptor itself is left untouched so it can be resubmitted.
    pub(crate) async fn execute(
        &self,
        request: &RequestDescriptor,
        pipeline: &TransformPipeline,
    ) -> std::result::Result<Response, Failure> {
        // `.timeout()` on the request builder works on both native and WASM;
        // on WASM reqwest wires it to an AbortController.
        let mut builder = self
            .http
            .request(
                request.method.clone(),
                resolve_url(&self.config.base_url, &request.url),
            )
            .headers(request.headers.clone())
            .timeout(Duration::from_millis(self.config.timeout_ms));

        if let Some(body) = &request.body {
            let encoded = pipeline.encode(body.clone()).map_err(Failure::Encode)?;
            if !request.headers.contains_key(CONTENT_TYPE) {
                builder = builder.header(CONTENT_TYPE, "application/json");
            }
            builder = builder.body(encoded);
        }

        let response = builder.send().await.map_err(Failure::Network)?;
        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().to_string();
        let body = response.text().await.map_err(Failure::Network)?;

        let response = Response {
            status,
            headers,
            url,
            body,
        };
        if status.is_success() {
            Ok(response)
        } else {
            Err(Failure::Status(response))
        }
    }
}

/// Joins a request URL onto the base URL unless it is already absolute.
pub(crate) fn resolve_url(base_url: &str, url: &str) -> String {
    if is_absolute_url(url) {
        return url.to_owned();
    }
    if url.is_empty() {
        return base_url.to_owned();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        url.trim_start_matches('/')
    )
}

/// `scheme://…` or protocol-relative `//…`.
fn is_absolute_url(url: &str) -> bool {
    if url.starts_with("//") {
        return true;
    }
    let Some((scheme, _)) = url.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|first| first.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
