//! Cookie record and `Set-Cookie` parsing.
//!
//! [`Cookie`] captures the attributes the session cares about and can be
//! (de)serialized via `serde` for inspection or persistence by callers.
//!
//! Expiry is kept as a unix timestamp. A cookie whose expiry lies in the past
//! is still stored but treated as absent by every lookup, which is how the
//! session performs logical deletion.

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// A cookie as stored by the session jar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name (case-sensitive).
    pub name: String,

    /// Raw cookie value (not URL-decoded).
    pub value: String,

    /// Path scoping. Defaults to the directory of the request path when absent.
    pub path: Option<String>,

    /// Domain attribute. `None` means the cookie is host-only.
    pub domain: Option<String>,

    /// If `true`, cookie is sent only over HTTPS.
    pub secure: bool,

    /// If `true`, cookie is hidden from client-side scripts.
    pub http_only: bool,

    /// Expiration as unix timestamp in seconds. Session cookies have `None`.
    pub expires: Option<i64>,
}

impl Cookie {
    /// Creates a host-only session cookie on path `/`.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: Some("/".to_string()),
            domain: None,
            secure: false,
            http_only: false,
            expires: None,
        }
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn expires_at(mut self, unix_timestamp: i64) -> Self {
        self.expires = Some(unix_timestamp);
        self
    }

    /// Returns true when the cookie expired at or before `now` (unix seconds).
    pub fn is_expired_at(&self, now: i64) -> bool {
        matches!(self.expires, Some(exp) if exp <= now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(OffsetDateTime::now_utc().unix_timestamp())
    }

    /// Parses a `Set-Cookie` style string (`name=value; Attr=...; Flag`).
    ///
    /// Returns `None` when there is no `name=value` pair or the name is empty.
    /// Unknown attributes are ignored and an unparsable `Expires` leaves the
    /// cookie as a session cookie.
    pub fn parse(raw: &str) -> Option<Cookie> {
        let mut parts = raw.split(';');
        let (name, value) = parts.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut cookie = Cookie {
            name: name.to_string(),
            value: value.trim().trim_matches('"').to_string(),
            path: None,
            domain: None,
            secure: false,
            http_only: false,
            expires: None,
        };
        let mut max_age: Option<i64> = None;

        for part in parts {
            let part = part.trim();
            if let Some((k, v)) = part.split_once('=') {
                let v = v.trim();
                match k.trim().to_ascii_lowercase().as_str() {
                    "path" => cookie.path = Some(v.to_string()),
                    "domain" => {
                        let domain = v.trim_start_matches('.').to_ascii_lowercase();
                        if !domain.is_empty() {
                            cookie.domain = Some(domain);
                        }
                    }
                    "expires" => match parse_http_date(v) {
                        Some(ts) => cookie.expires = Some(ts),
                        None => log::debug!("ignoring unparsable expiry on cookie '{}'", cookie.name),
                    },
                    "max-age" => max_age = v.parse::<i64>().ok(),
                    _ => {}
                }
            } else if part.eq_ignore_ascii_case("secure") {
                cookie.secure = true;
            } else if part.eq_ignore_ascii_case("httponly") {
                cookie.http_only = true;
            }
        }

        // Max-Age wins over Expires
        if let Some(age) = max_age {
            cookie.expires = Some(if age <= 0 {
                0
            } else {
                OffsetDateTime::now_utc().unix_timestamp().saturating_add(age)
            });
        }

        Some(cookie)
    }
}

/// Parses the cookie date format (`Thu, 01 Jan 1970 00:00:00 GMT`, also with
/// dashes between the date parts) into a unix timestamp.
fn parse_http_date(s: &str) -> Option<i64> {
    let normalized = s.trim().replace('-', " ");
    let format = format_description!(
        "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
    );
    PrimitiveDateTime::parse(&normalized, format)
        .ok()
        .map(|dt| dt.assume_utc().unix_timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_value_only() {
        let c = Cookie::parse("sessionid=abc123").unwrap();
        assert_eq!(c.name, "sessionid");
        assert_eq!(c.value, "abc123");
        assert_eq!(c.path, None);
        assert!(!c.secure);
        assert_eq!(c.expires, None);
    }

    #[test]
    fn parses_attributes() {
        let c = Cookie::parse("shoppingCartGID=ABC123; Path=/; Domain=.Steampowered.com; Secure; HttpOnly").unwrap();
        assert_eq!(c.value, "ABC123");
        assert_eq!(c.path.as_deref(), Some("/"));
        assert_eq!(c.domain.as_deref(), Some("steampowered.com"));
        assert!(c.secure);
        assert!(c.http_only);
    }

    #[test]
    fn value_may_contain_equals_sign() {
        let c = Cookie::parse("token=a=b=c").unwrap();
        assert_eq!(c.name, "token");
        assert_eq!(c.value, "a=b=c");
    }

    #[test]
    fn rejects_missing_pair() {
        assert!(Cookie::parse("garbage").is_none());
        assert!(Cookie::parse("=value").is_none());
    }

    #[test]
    fn parses_epoch_expiry() {
        let c = Cookie::parse("gone=null; expires=Thu, 01 Jan 1970 00:00:00 GMT").unwrap();
        assert_eq!(c.expires, Some(0));
        assert!(c.is_expired());
    }

    #[test]
    fn parses_dashed_expiry() {
        let c = Cookie::parse("a=b; expires=Wed, 21-Oct-2015 07:28:00 GMT").unwrap();
        assert_eq!(c.expires, Some(1445412480));
    }

    #[test]
    fn max_age_zero_expires_immediately() {
        let c = Cookie::parse("a=b; Max-Age=0").unwrap();
        assert!(c.is_expired());

        let c = Cookie::parse("a=b; Max-Age=3600").unwrap();
        assert!(!c.is_expired());
    }

    #[test]
    fn unparsable_expiry_keeps_session_cookie() {
        let c = Cookie::parse("a=b; expires=tomorrow").unwrap();
        assert_eq!(c.expires, None);
        assert!(!c.is_expired());
    }
}
