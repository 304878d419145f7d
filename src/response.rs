use reqwest::{header::HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

use crate::{ClientError, Result};

/// Buffered HTTP response.
#[derive(Clone, Debug)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Final URL after redirects.
    pub url: String,
    pub body: String,
}

impl Response {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|err| {
            ClientError::Decode(format!(
                "invalid JSON response from {}: {err}; body: {}",
                self.url, self.body
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use reqwest::{header::HeaderMap, StatusCode};
    use serde::Deserialize;

    use super::Response;
    use crate::ClientError;

    fn response(status: StatusCode, body: &str) -> Response {
        Response {
            status,
            headers: HeaderMap::new(),
            url: "https://api.example.com/items".to_owned(),
            body: body.to_owned(),
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: u64,
    }

    #[test]
    fn json_decodes_body() {
        let item: Item = response(StatusCode::OK, r#"{"id": 4}"#)
            .json()
            .expect("must decode");
        assert_eq!(item, Item { id: 4 });
    }

    #[test]
    fn json_reports_decode_error() {
        let err = response(StatusCode::OK, "not json")
            .json::<Item>()
            .expect_err("must fail");
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn success_follows_status() {
        assert!(response(StatusCode::CREATED, "").is_success());
        assert!(!response(StatusCode::UNAUTHORIZED, "").is_success());
    }
}
