//! Cookie jar abstraction and a simple in-memory implementation.
//!
//! A **cookie jar** holds every cookie of one client session. The HTTP layer
//! hands it response headers to absorb and asks it which cookies to send; the
//! [`SessionStore`](crate::session::SessionStore) writes into it directly.
//!
//! ## Notes & limitations
//! - Cookies are bucketed by **domain**: the `Domain` attribute when present,
//!   otherwise the request host (host-only cookie). Ports and schemes do not
//!   separate buckets, just like in browsers.
//! - Within a domain a cookie is identified by name and path; writing the same
//!   pair again replaces it ("last write wins").
//! - Expired cookies stay in the jar until [`CookieJar::purge_expired`] runs but
//!   are never returned by lookups.
//! - This module is **not** internally synchronized. Use it via a
//!   `CookieJarHandle = Arc<RwLock<dyn CookieJar + Send + Sync>>`.
//!
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use crate::session::Cookie;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use url::Url;

/// A handle to a cookie jar trait.
///
/// Obtain a **read lock** for queries and a **write lock** for mutations.
pub type CookieJarHandle = Arc<RwLock<dyn CookieJar + Send + Sync>>;

/// A cookie jar keeps the cookies for one single session.
pub trait CookieJar: Send + Sync {
    /// Stores `cookie` as if it was received from `url`.
    ///
    /// A `Domain` attribute that does not cover the host of `url` makes the
    /// cookie be ignored.
    fn set_cookie(&mut self, url: &Url, cookie: Cookie);

    /// Stores all cookies found in raw `Set-Cookie` header values for `url`.
    fn store_response_cookies(&mut self, url: &Url, set_cookie_headers: &mut dyn Iterator<Item = &str>) {
        for raw in set_cookie_headers {
            match Cookie::parse(raw) {
                Some(cookie) => self.set_cookie(url, cookie),
                None => log::debug!("ignoring malformed set-cookie header from {}", url.host_str().unwrap_or_default()),
            }
        }
    }

    /// Returns the live cookies that would be sent with a request to `url`.
    ///
    /// Filters by domain, path, the `Secure` flag and expiry.
    fn cookies_for(&self, url: &Url) -> Vec<Cookie>;

    /// Returns the `Cookie` request header value to send for `url`, if any.
    fn get_request_cookies(&self, url: &Url) -> Option<String> {
        let header = self
            .cookies_for(url)
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ");

        if header.is_empty() {
            None
        } else {
            Some(header)
        }
    }

    /// Returns the live cookie named `name` that a request to `url` would carry.
    fn get_cookie(&self, url: &Url, name: &str) -> Option<Cookie> {
        self.cookies_for(url).into_iter().find(|c| c.name == name)
    }

    /// Expires every cookie named `name` that the host of `url` can see,
    /// whatever its domain attribute or path.
    fn expire(&mut self, url: &Url, name: &str);

    /// Drops every expired cookie from the jar.
    fn purge_expired(&mut self);

    /// Removes all cookies from the jar.
    fn clear(&mut self);

    /// Retrieves all live cookies grouped by domain, formatted as `"name=value"` pairs.
    ///
    /// This is primarily intended for diagnostics/inspection.
    fn get_all_cookies(&self) -> Vec<(String, String)>;
}

/// Default in-memory cookie jar. Performs **no persistence**.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultCookieJar {
    /// Cookies bucketed by domain (lowercase, no leading dot).
    pub entries: HashMap<String, Vec<Cookie>>,
}

impl DefaultCookieJar {
    /// Creates an empty in-memory cookie jar.
    pub fn new() -> Self {
        DefaultCookieJar {
            entries: HashMap::new(),
        }
    }
}

impl From<DefaultCookieJar> for CookieJarHandle {
    fn from(jar: DefaultCookieJar) -> Self {
        Arc::new(RwLock::new(jar))
    }
}

fn domain_matches(host: &str, domain: &str) -> bool {
    host == domain || host.ends_with(&format!(".{}", domain))
}

fn default_path(url: &Url) -> &str {
    url.path().rsplit_once('/').map_or("/", |(a, _)| if a.is_empty() { "/" } else { a })
}

fn now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

impl CookieJar for DefaultCookieJar {
    fn set_cookie(&mut self, url: &Url, mut cookie: Cookie) {
        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();

        let key = match &cookie.domain {
            Some(domain) if domain_matches(&host, domain) => domain.clone(),
            Some(domain) => {
                log::debug!("rejecting cookie '{}' for foreign domain {} (host {})", cookie.name, domain, host);
                return;
            }
            None => host,
        };

        if cookie.path.is_none() {
            cookie.path = Some(default_path(url).to_string());
        }

        let bucket = self.entries.entry(key).or_default();

        // Replace existing cookie with same name and path
        if let Some(existing) = bucket.iter_mut().find(|c| c.name == cookie.name && c.path == cookie.path) {
            *existing = cookie;
        } else {
            bucket.push(cookie);
        }
    }

    fn cookies_for(&self, url: &Url) -> Vec<Cookie> {
        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        let host = host.as_str();
        let path = url.path();
        let is_https = url.scheme() == "https";
        let now = now();

        let mut cookies = self
            .entries
            .iter()
            .filter(|(key, _)| domain_matches(host, key))
            .flat_map(|(key, bucket)| {
                bucket.iter().filter(move |cookie| {
                    // Host-only cookies need an exact host
                    cookie.domain.is_some() || host == key.as_str()
                })
            })
            .filter(|cookie| {
                // Check path match
                match &cookie.path {
                    Some(cookie_path) => path.starts_with(cookie_path.as_str()),
                    None => true,
                }
            })
            .filter(|cookie| !cookie.secure || is_https)
            .filter(|cookie| !cookie.is_expired_at(now))
            .cloned()
            .collect::<Vec<_>>();

        // More specific paths first
        cookies.sort_by_key(|c| std::cmp::Reverse(c.path.as_ref().map_or(0, |p| p.len())));
        cookies
    }

    fn expire(&mut self, url: &Url, name: &str) {
        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();

        for (key, bucket) in self.entries.iter_mut().filter(|(key, _)| domain_matches(&host, key)) {
            for cookie in bucket
                .iter_mut()
                .filter(|c| c.name == name && (c.domain.is_some() || host == *key))
            {
                cookie.expires = Some(0);
            }
        }
    }

    fn purge_expired(&mut self) {
        let now = now();
        for bucket in self.entries.values_mut() {
            bucket.retain(|c| !c.is_expired_at(now));
        }
        self.entries.retain(|_, bucket| !bucket.is_empty());
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn get_all_cookies(&self) -> Vec<(String, String)> {
        let now = now();
        self.entries
            .iter()
            .map(|(domain, cookies)| {
                let str_ = cookies
                    .iter()
                    .filter(|c| !c.is_expired_at(now))
                    .map(|c| format!("{}={}", c.name, c.value))
                    .collect::<Vec<_>>()
                    .join("; ");
                (domain.clone(), str_)
            })
            .filter(|(_, cookies)| !cookies.is_empty())
            .collect()
    }
}
