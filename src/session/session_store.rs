//! Session state shared by every storefront call.
//!
//! The session is the cookie jar plus what is derived from it: the CSRF
//! `sessionid` token, the shopping cart id and the logged-in identity. Every
//! write and delete is mirrored to both the store and the community domain so
//! both surfaces see the same session.
use crate::errors::GiftError;
use crate::session::{Cookie, CookieJarHandle, DefaultCookieJar};
use crate::steam_id::SteamId;
use percent_encoding::percent_decode_str;
use rand::Rng;
use std::sync::PoisonError;
use url::Url;

pub const SESSION_ID_COOKIE: &str = "sessionid";
pub const CART_ID_COOKIE: &str = "shoppingCartGID";
pub const CHECKOUT_CART_COOKIE: &str = "beginCheckoutCart";
pub const LANGUAGE_COOKIE: &str = "Steam_Language";
pub const TIMEZONE_COOKIE: &str = "timezoneOffset";

const LOGIN_COOKIES: [&str; 2] = ["steamLogin", "steamLoginSecure"];

/// Cookies that must only travel over TLS.
fn is_secure_cookie(name: &str) -> bool {
    name.starts_with("steamMachineAuth") || name == "steamLoginSecure"
}

/// Cookie values are sent percent-encoded; `sessionid` is read decoded.
/// A `+` is a literal plus here, not a space.
fn decode_cookie_value(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

pub struct SessionStore {
    /// Jar shared with the HTTP client
    jar: CookieJarHandle,
    /// Store surface, the one whose view of the jar is authoritative for reads
    store_url: Url,
    /// Community surface, mirrored on every write
    community_url: Url,
    /// Account behind the login cookie, if one has been set
    identity: Option<SteamId>,
}

impl SessionStore {
    pub fn new(store_url: Url, community_url: Url) -> Self {
        Self::with_jar(DefaultCookieJar::new().into(), store_url, community_url)
    }

    /// Creates a session on top of an existing jar (e.g. one restored by the caller).
    pub fn with_jar(jar: CookieJarHandle, store_url: Url, community_url: Url) -> Self {
        Self {
            jar,
            store_url,
            community_url,
            identity: None,
        }
    }

    /// Handle to the underlying jar. The HTTP client holds a clone of it.
    pub fn jar(&self) -> CookieJarHandle {
        self.jar.clone()
    }

    pub fn identity(&self) -> Option<SteamId> {
        self.identity
    }

    /// Sets a single cookie given as `name=value` (attributes are allowed).
    ///
    /// A login cookie also updates the session identity from the numeric id
    /// its value starts with.
    pub fn set_cookie(&mut self, raw: &str) -> Result<(), GiftError> {
        let mut cookie = Cookie::parse(raw).ok_or_else(|| GiftError::InvalidCookie(raw.to_string()))?;

        if LOGIN_COOKIES.contains(&cookie.name.as_str()) {
            self.update_identity(&cookie.value);
        }

        // The session writes on behalf of both surfaces, never for a foreign domain.
        cookie.domain = None;
        if cookie.path.is_none() {
            cookie.path = Some("/".to_string());
        }
        if is_secure_cookie(&cookie.name) {
            cookie.secure = true;
        }

        self.mirror(cookie);
        Ok(())
    }

    /// Sets several cookies. Stops at the first malformed one.
    pub fn set_cookies<I, S>(&mut self, cookies: I) -> Result<(), GiftError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for raw in cookies {
            self.set_cookie(raw.as_ref())?;
        }
        Ok(())
    }

    /// Logically deletes a cookie by writing an epoch-expired marker to both domains.
    ///
    /// Copies absorbed from responses under a `Domain` attribute or a deeper
    /// path are expired as well, so no read or request sees the old value.
    pub fn delete_cookie(&mut self, name: &str) {
        {
            let mut jar = self.jar.write().unwrap_or_else(PoisonError::into_inner);
            for url in [&self.store_url, &self.community_url] {
                jar.expire(url, name);
            }
        }

        let marker = Cookie::new(name, "null")
            .secure(is_secure_cookie(name))
            .expires_at(0);
        self.mirror(marker);
    }

    /// Returns the live value of cookie `name` as seen by the store surface.
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.jar
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get_cookie(&self.store_url, name)
            .map(|c| c.value)
    }

    /// Returns the CSRF session token, generating and storing one when absent.
    ///
    /// The generated token is a plain random number below 10^9. It only has to
    /// match between cookie and form field, it protects no secret.
    pub fn session_id(&mut self) -> String {
        if let Some(raw) = self.cookie(SESSION_ID_COOKIE) {
            return decode_cookie_value(&raw);
        }

        let session_id = rand::rng().random_range(0..1_000_000_000u32).to_string();
        self.mirror(Cookie::new(SESSION_ID_COOKIE, session_id.clone()));
        session_id
    }

    /// Returns the shopping cart id, or `None` when no cart exists yet.
    pub fn cart_id(&self) -> Option<String> {
        self.cookie(CART_ID_COOKIE)
    }

    fn mirror(&self, cookie: Cookie) {
        let mut jar = self.jar.write().unwrap_or_else(PoisonError::into_inner);
        for url in [&self.store_url, &self.community_url] {
            jar.set_cookie(&with_scheme(url, cookie.secure), cookie.clone());
        }
    }

    fn update_identity(&mut self, value: &str) {
        let digits: String = value.chars().take_while(|c| c.is_ascii_digit()).collect();
        match digits.parse::<u64>() {
            Ok(id) => self.identity = Some(SteamId::from_steam_id64(id)),
            Err(_) => log::warn!("login cookie does not start with a numeric account id"),
        }
    }
}

/// Secure cookies are written as if received over https.
fn with_scheme(url: &Url, secure: bool) -> Url {
    let mut url = url.clone();
    if secure && url.scheme() == "http" {
        // http -> https is always a permitted scheme change
        let _ = url.set_scheme("https");
    }
    url
}
