//! Authenticated client: date-normalized bodies and single-shot 401 recovery.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::{
    transport::{Failure, Transport},
    ClientConfig, ClientError, RequestDescriptor, Response, Result, TransformPipeline, Value,
};

/// Recovers from the first 401 of a request.
///
/// Typically refreshes credentials, updates the descriptor's headers and
/// resubmits it through the given client. Whatever this returns becomes the
/// caller's result; it is not inspected again. Resubmitting the same
/// descriptor keeps its retry flag set, so a second 401 is final.
///
/// Any `Fn(AuthenticatedClient, RequestDescriptor) -> impl Future<Output =
/// Result<Response>>` closure implements this trait.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait RecoveryCallback: Send + Sync {
    async fn recover(
        &self,
        client: AuthenticatedClient,
        request: RequestDescriptor,
    ) -> Result<Response>;
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait]
impl<F, Fut> RecoveryCallback for F
where
    F: Fn(AuthenticatedClient, RequestDescriptor) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response>> + Send,
{
    async fn recover(
        &self,
        client: AuthenticatedClient,
        request: RequestDescriptor,
    ) -> Result<Response> {
        (self)(client, request).await
    }
}

#[cfg(target_arch = "wasm32")]
#[async_trait(?Send)]
impl<F, Fut> RecoveryCallback for F
where
    F: Fn(AuthenticatedClient, RequestDescriptor) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response>>,
{
    async fn recover(
        &self,
        client: AuthenticatedClient,
        request: RequestDescriptor,
    ) -> Result<Response> {
        (self)(client, request).await
    }
}

struct Inner {
    transport: Transport,
    pipeline: TransformPipeline,
    recovery: Option<Arc<dyn RecoveryCallback>>,
}

/// HTTP client for endpoints that require credentials.
///
/// Cloning is cheap and clones share configuration and recovery callback.
#[derive(Clone)]
pub struct AuthenticatedClient {
    inner: Arc<Inner>,
}

impl fmt::Debug for AuthenticatedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.inner.transport.config();
        f.debug_struct("AuthenticatedClient")
            .field("base_url", &config.base_url)
            .field("timeout_ms", &config.timeout_ms)
            .field("transforms", &self.inner.pipeline.len())
            .field("recovery", &self.inner.recovery.is_some())
            .finish()
    }
}

impl AuthenticatedClient {
    /// Builds a client, optionally with a 401 recovery callback.
    ///
    /// Fails with [`ClientError::Config`] if the config is invalid.
    pub fn create(
        config: ClientConfig,
        recovery: Option<Arc<dyn RecoveryCallback>>,
    ) -> Result<Self> {
        let pipeline = TransformPipeline::with_date_normalization(config.date_offset);
        let transport = Transport::new(config)?;
        Ok(Self {
            inner: Arc::new(Inner {
                transport,
                pipeline,
                recovery,
            }),
        })
    }

    /// Builds a client without a recovery callback.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::create(config, None)
    }

    /// Returns a client that delegates the first 401 of each request to `recovery`.
    pub fn with_recovery<C>(self, recovery: C) -> Self
    where
        C: RecoveryCallback + 'static,
    {
        self.rebuild(|inner| inner.recovery = Some(Arc::new(recovery)))
    }

    /// Returns a client with `step` appended to the body pipeline.
    ///
    /// Steps run after date normalization and before JSON encoding.
    pub fn with_transform<F>(self, step: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.rebuild(|inner| inner.pipeline.push(step))
    }

    pub fn config(&self) -> &ClientConfig {
        self.inner.transport.config()
    }

    pub async fn get(&self, url: &str) -> Result<Response> {
        self.send(RequestDescriptor::get(url)).await
    }

    pub async fn delete(&self, url: &str) -> Result<Response> {
        self.send(RequestDescriptor::delete(url)).await
    }

    pub async fn head(&self, url: &str) -> Result<Response> {
        self.send(RequestDescriptor::new(reqwest::Method::HEAD, url))
            .await
    }

    pub async fn post(&self, url: &str, body: impl Into<Value>) -> Result<Response> {
        self.send(RequestDescriptor::post(url, body)).await
    }

    pub async fn put(&self, url: &str, body: impl Into<Value>) -> Result<Response> {
        self.send(RequestDescriptor::put(url, body)).await
    }

    pub async fn patch(&self, url: &str, body: impl Into<Value>) -> Result<Response> {
        self.send(RequestDescriptor::patch(url, body)).await
    }

    /// Sends a request through the pipeline and the 401 interceptor.
    pub async fn send(&self, mut request: RequestDescriptor) -> Result<Response> {
        let failure = match self
            .inner
            .transport
            .execute(&request, &self.inner.pipeline)
            .await
        {
            Ok(response) => return Ok(response),
            Err(failure) => failure,
        };

        match failure {
            Failure::Status(response) => {
                if response.status == StatusCode::UNAUTHORIZED && !request.is_retried() {
                    if let Some(recovery) = &self.inner.recovery {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(
                            "delegating 401 for {} {} to recovery callback",
                            request.method,
                            request.url
                        );

                        request.mark_retried();
                        return recovery.recover(self.clone(), request).await;
                    }
                }

                #[cfg(feature = "tracing")]
                tracing::debug!(
                    "{} {} failed with status {} (retried: {})",
                    request.method,
                    request.url,
                    response.status,
                    request.is_retried()
                );

                Err(ClientError::Http {
                    response: Box::new(response),
                    request: Box::new(request),
                })
            }
            Failure::Network(source) => Err(ClientError::Transport {
                source,
                request: Box::new(request),
            }),
            Failure::Encode(err) => Err(err),
        }
    }

    fn rebuild(self, edit: impl FnOnce(&mut Inner)) -> Self {
        let mut inner = match Arc::try_unwrap(self.inner) {
            Ok(inner) => inner,
            Err(shared) => Inner {
                transport: shared.transport.clone(),
                pipeline: shared.pipeline.clone(),
                recovery: shared.recovery.clone(),
            },
        };
        edit(&mut inner);
        Self {
            inner: Arc::new(inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AuthenticatedClient;
    use crate::{ClientConfig, ClientError, RequestDescriptor, Response, Value};

    #[test]
    fn create_rejects_invalid_config() {
        let err = AuthenticatedClient::new(ClientConfig::new("https://api.example.com", 0))
            .expect_err("must fail");
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn pipeline_starts_with_date_normalization() {
        let client = AuthenticatedClient::new(ClientConfig::new("https://api.example.com", 1_000))
            .expect("valid config")
            .with_transform(|value| value);
        assert_eq!(client.inner.pipeline.len(), 2);

        let date = chrono::DateTime::parse_from_rfc3339("2024-05-06T07:08:09+03:00")
            .expect("valid date");
        let applied = client
            .inner
            .pipeline
            .apply(Value::object([("at", Value::date(date))]));
        assert_eq!(
            applied.get("at"),
            Some(&Value::text("2024-05-06T07:08:09+03:00"))
        );
    }

    #[test]
    fn debug_reports_recovery_without_internals() {
        let client = AuthenticatedClient::new(ClientConfig::new("https://api.example.com", 1_000))
            .expect("valid config")
            .with_recovery(|_client: AuthenticatedClient, _request: RequestDescriptor| async {
                Err::<Response, ClientError>(ClientError::Recovery("unused".to_owned()))
            });

        let debug = format!("{client:?}");
        assert!(debug.contains("https://api.example.com"));
        assert!(debug.contains("recovery: true"));
    }
}
