use chrono::FixedOffset;

use crate::{ClientError, Result};

/// Default per-request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Base URL, timeout and body formatting settings shared by both clients.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientConfig {
    /// Prefix for relative request URLs.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Offset dates are converted into before normalization.
    ///
    /// `None` keeps each date in its own offset.
    pub date_offset: Option<FixedOffset>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms,
            date_offset: None,
        }
    }

    /// Renders every normalized date in `offset`.
    pub fn with_date_offset(mut self, offset: FixedOffset) -> Self {
        self.date_offset = Some(offset);
        self
    }

    /// Creates a config from environment variables.
    ///
    /// Reads:
    /// - `{PREFIX}_BASE_URL` — required, must not be empty
    /// - `{PREFIX}_TIMEOUT_MS` — optional, defaults to [`DEFAULT_TIMEOUT_MS`]
    ///
    /// **Not available on `wasm32` targets** — environment variables do not
    /// exist in browser runtimes.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use app_http_clients::ClientConfig;
    ///
    /// let config = ClientConfig::from_env("API").expect("missing API_BASE_URL");
    /// ```
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env(prefix: &str) -> Result<Self> {
        let url_var = format!("{prefix}_BASE_URL");
        let timeout_var = format!("{prefix}_TIMEOUT_MS");

        let base_url = std::env::var(&url_var)
            .map_err(|_| ClientError::Config(format!("missing {url_var} environment variable")))?;
        let timeout_ms = match std::env::var(&timeout_var) {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|err| {
                ClientError::Config(format!("{timeout_var} '{raw}' is not a valid timeout: {err}"))
            })?,
            Err(_) => DEFAULT_TIMEOUT_MS,
        };

        let config = Self::new(base_url, timeout_ms);
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants every client relies on.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(ClientError::Config("base_url must not be empty".to_owned()));
        }
        if self.timeout_ms == 0 {
            return Err(ClientError::Config(
                "timeout_ms must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }
}
