use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION},
    Method,
};

use crate::{ClientError, Result, Value};

/// One outgoing request and its single-use retry flag.
///
/// The descriptor is owned by the request lifecycle: the client hands it to
/// the recovery callback, which may edit headers and resubmit the same value.
/// Cloning keeps the flag, since a clone describes the same logical request.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Absolute URL, or a path resolved against the client's base URL.
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
    retried: bool,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
            retried: false,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    pub fn post(url: impl Into<String>, body: impl Into<Value>) -> Self {
        Self::new(Method::POST, url).with_body(body)
    }

    pub fn put(url: impl Into<String>, body: impl Into<Value>) -> Self {
        Self::new(Method::PUT, url).with_body(body)
    }

    pub fn patch(url: impl Into<String>, body: impl Into<Value>) -> Self {
        Self::new(Method::PATCH, url).with_body(body)
    }

    pub fn with_body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Whether this request already went through 401 recovery.
    pub fn is_retried(&self) -> bool {
        self.retried
    }

    /// Marks the request as recovered. There is no way back to `false`.
    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }

    /// Sets a header, replacing any previous value.
    ///
    /// `Authorization` values are flagged sensitive so they never show up in
    /// `Debug` output.
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<()> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| ClientError::InvalidHeader(format!("name '{name}': {err}")))?;
        let mut value = HeaderValue::from_str(value)
            .map_err(|err| ClientError::InvalidHeader(format!("value for '{name}': {err}")))?;
        if name == AUTHORIZATION {
            value.set_sensitive(true);
        }
        self.headers.insert(name, value);
        Ok(())
    }

    /// Sets `Authorization: Bearer <token>`.
    ///
    /// If the token already carries the `Bearer ` prefix it is kept as is.
    pub fn set_bearer_auth(&mut self, token: &str) -> Result<()> {
        let authorization = normalize_bearer_authorization(token);
        self.set_header(AUTHORIZATION.as_str(), &authorization)
    }

    pub fn with_bearer_auth(mut self, token: &str) -> Result<Self> {
        self.set_bearer_auth(token)?;
        Ok(self)
    }
}

fn normalize_bearer_authorization(token: &str) -> String {
    let trimmed = token.trim();
    let prefix = trimmed.get(..7);
    if prefix.is_some_and(|value| value.eq_ignore_ascii_case("bearer ")) {
        trimmed.to_owned()
    } else {
        format!("Bearer {trimmed}")
    }
}
