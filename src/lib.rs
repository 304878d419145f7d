//! `app-http-clients` builds the two HTTP client handles a front-end talks to
//! its API with.
//!
//! - [`AuthenticatedClient`] normalizes dates in request bodies to
//!   `YYYY-MM-DDTHH:mm:ss±HH:MM` and hands the first 401 of each request to a
//!   [`RecoveryCallback`], which can refresh credentials and resubmit.
//! - [`UnauthenticatedClient`] sends bodies as plain JSON and turns every
//!   failure into an [`ErrorEnvelope`].
//!
//! ```no_run
//! use app_http_clients::{AuthenticatedClient, ClientConfig, RequestDescriptor};
//!
//! # async fn run() -> app_http_clients::Result<()> {
//! let api = AuthenticatedClient::new(ClientConfig::new("https://api.example.com", 10_000))?
//!     .with_recovery(|client: AuthenticatedClient, mut request: RequestDescriptor| async move {
//!         request.set_bearer_auth("fresh-token")?;
//!         client.send(request).await
//!     });
//! let me = api.get("/me").await?;
//! # let _ = me;
//! # Ok(())
//! # }
//! ```

mod auth;
mod envelope;
mod error;
mod options;
mod request;
mod response;
mod transform;
mod transport;
mod unauth;
mod value;

pub use auth::{AuthenticatedClient, RecoveryCallback};
pub use envelope::{ErrorEnvelope, DEFAULT_ERROR_TITLE};
pub use error::ClientError;
pub use options::{ClientConfig, DEFAULT_TIMEOUT_MS};
pub use request::RequestDescriptor;
pub use response::Response;
pub use transform::{format_date, normalize_dates, BodyTransform, TransformPipeline};
pub use unauth::UnauthenticatedClient;
pub use value::Value;

pub use reqwest::{header, Method, StatusCode};

pub type Result<T> = std::result::Result<T, ClientError>;
