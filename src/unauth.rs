//! Unauthenticated client: plain JSON bodies, every failure normalized.

use std::fmt;

use crate::{
    transport::{Failure, Transport},
    ClientConfig, ErrorEnvelope, RequestDescriptor, Response, Result, TransformPipeline, Value,
};

/// HTTP client for public endpoints.
///
/// Failures never surface as [`crate::ClientError`]; they are unwrapped into
/// an [`ErrorEnvelope`] carrying the response body, or the fallback title
/// when no response was received.
#[derive(Clone)]
pub struct UnauthenticatedClient {
    transport: Transport,
    pipeline: TransformPipeline,
}

impl fmt::Debug for UnauthenticatedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.transport.config();
        f.debug_struct("UnauthenticatedClient")
            .field("base_url", &config.base_url)
            .field("timeout_ms", &config.timeout_ms)
            .finish()
    }
}

impl UnauthenticatedClient {
    /// Builds a client. Fails with [`crate::ClientError::Config`] if the config is invalid.
    pub fn create(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(config)?,
            pipeline: TransformPipeline::new(),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        self.transport.config()
    }

    pub async fn get(&self, url: &str) -> std::result::Result<Response, ErrorEnvelope> {
        self.send(RequestDescriptor::get(url)).await
    }

    pub async fn delete(&self, url: &str) -> std::result::Result<Response, ErrorEnvelope> {
        self.send(RequestDescriptor::delete(url)).await
    }

    pub async fn head(&self, url: &str) -> std::result::Result<Response, ErrorEnvelope> {
        self.send(RequestDescriptor::new(reqwest::Method::HEAD, url))
            .await
    }

    pub async fn post(
        &self,
        url: &str,
        body: impl Into<Value>,
    ) -> std::result::Result<Response, ErrorEnvelope> {
        self.send(RequestDescriptor::post(url, body)).await
    }

    pub async fn put(
        &self,
        url: &str,
        body: impl Into<Value>,
    ) -> std::result::Result<Response, ErrorEnvelope> {
        self.send(RequestDescriptor::put(url, body)).await
    }

    pub async fn patch(
        &self,
        url: &str,
        body: impl Into<Value>,
    ) -> std::result::Result<Response, ErrorEnvelope> {
        self.send(RequestDescriptor::patch(url, body)).await
    }

    pub async fn send(
        &self,
        request: RequestDescriptor,
    ) -> std::result::Result<Response, ErrorEnvelope> {
        match self.transport.execute(&request, &self.pipeline).await {
            Ok(response) => Ok(response),
            Err(Failure::Status(response)) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    "{} {} failed with status {}",
                    request.method,
                    request.url,
                    response.status
                );

                Err(ErrorEnvelope::from_body(&response.body))
            }
            Err(Failure::Network(_err)) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("{} {} got no response: {}", request.method, request.url, _err);

                Err(ErrorEnvelope::fallback())
            }
            Err(Failure::Encode(_)) => Err(ErrorEnvelope::fallback()),
        }
    }
}
