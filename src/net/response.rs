//! Minimal HTTP response model.
//!
//! This struct represents a **fully buffered** HTTP response returned by the
//! [`Gateway`](crate::net::Gateway). It contains the final URL (after the
//! redirects the client followed), status code + reason, response headers,
//! and the raw body bytes.
//!
//! ## Notes
//! - `headers` is an `http::HeaderMap`, which is **case-insensitive** for
//!   header names.
//! - Structured bodies are parsed with [`Response::json`], which turns a
//!   parse failure into [`GiftError::MalformedResponse`] so that callers never
//!   see a half-read document.
//!
use crate::errors::GiftError;
use crate::session::Cookie;
use http::header::{LOCATION, SET_COOKIE};
use http::HeaderMap;
use serde::de::DeserializeOwned;

/// Simple structure for HTTP responses.
#[derive(Debug)]
pub struct Response {
    /// Final URL of the response (after redirects, if any).
    pub url: url::Url,

    /// Numeric HTTP status code (e.g., `200`, `404`).
    pub status: u16,

    /// Human-readable reason phrase (e.g., `"OK"`, `"Not Found"`).
    ///
    /// May be `"Unknown"` for non-standard codes.
    pub status_text: String,

    /// Response headers as a case-insensitive map.
    pub headers: HeaderMap,

    /// Raw response body bytes.
    pub body: Vec<u8>,
}

impl Response {
    /// Buffers a `reqwest` response. We don't do streaming.
    pub(crate) async fn read(res: reqwest::Response) -> Result<Response, reqwest::Error> {
        let url = res.url().clone();
        let status = res.status().as_u16();
        let status_text = res.status().canonical_reason().unwrap_or("Unknown").to_string();
        let headers = res.headers().clone();
        let body = res.bytes().await?.to_vec();

        Ok(Response {
            url,
            status,
            status_text,
            headers,
            body,
        })
    }

    /// Body as text, lossy on invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parses the body as JSON into a per-endpoint result struct.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, GiftError> {
        serde_json::from_slice(&self.body).map_err(|e| {
            GiftError::MalformedResponse(format!("{} did not return the expected JSON: {e}", self.url.path()))
        })
    }

    pub fn is_redirect(&self) -> bool {
        (300..=399).contains(&self.status)
    }

    /// Target of a redirect, if the response carries one.
    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
    }

    /// Value of the cookie `name` set by this very response.
    ///
    /// This reads the `Set-Cookie` headers, not the jar. When the header
    /// appears more than once the last one wins. Cookies the response
    /// already expires do not count.
    pub fn set_cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(Cookie::parse)
            .filter(|c| c.name == name && !c.is_expired())
            .last()
            .map(|c| c.value)
    }
}

#[cfg(test)]
pub(crate) fn test_response(status: u16, headers: &[(&'static str, &str)], body: &str) -> Response {
    let mut map = HeaderMap::new();
    for (k, v) in headers {
        map.append(*k, v.parse().unwrap());
    }
    Response {
        url: url::Url::parse("https://store.steampowered.com/cart/").unwrap(),
        status,
        status_text: String::new(),
        headers: map,
        body: body.as_bytes().to_vec(),
    }
}
