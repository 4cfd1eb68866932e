//! Bridge between the session cookie jar and `reqwest`.
//!
//! `reqwest` asks its cookie provider for the `Cookie` header of every
//! outgoing request and hands it every `Set-Cookie` header it receives.
//! [`SharedCookieJar`] answers both from the same [`CookieJarHandle`] the
//! [`SessionStore`](crate::session::SessionStore) writes to, so cookies set by
//! the caller and cookies set by the server live in one place.
use crate::session::CookieJarHandle;
use http::HeaderValue;
use std::sync::PoisonError;
use url::Url;

pub struct SharedCookieJar {
    jar: CookieJarHandle,
}

impl SharedCookieJar {
    pub fn new(jar: CookieJarHandle) -> Self {
        Self { jar }
    }
}

impl reqwest::cookie::CookieStore for SharedCookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let mut raw = cookie_headers.filter_map(|h| h.to_str().ok());
        self.jar
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .store_response_cookies(url, &mut raw);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let header = self
            .jar
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get_request_cookies(url)?;

        HeaderValue::from_str(&header).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{CookieJar, DefaultCookieJar};
    use reqwest::cookie::CookieStore;

    #[test]
    fn response_cookies_are_visible_to_the_shared_jar() {
        let jar: CookieJarHandle = DefaultCookieJar::new().into();
        let provider = SharedCookieJar::new(jar.clone());
        let url = Url::parse("https://store.steampowered.com/cart/").unwrap();

        let headers = [HeaderValue::from_static("shoppingCartGID=ABC123; Path=/")];
        provider.set_cookies(&mut headers.iter(), &url);

        let stored = jar.read().unwrap().get_cookie(&url, "shoppingCartGID").unwrap();
        assert_eq!(stored.value, "ABC123");
    }

    #[test]
    fn request_header_comes_from_the_jar() {
        let jar: CookieJarHandle = DefaultCookieJar::new().into();
        let provider = SharedCookieJar::new(jar.clone());
        let url = Url::parse("https://steamcommunity.com/actions/AddFriendAjax").unwrap();

        assert!(provider.cookies(&url).is_none());

        jar.write().unwrap().set_cookie(&url, crate::session::Cookie::new("sessionid", "42"));
        assert_eq!(provider.cookies(&url).unwrap(), "sessionid=42");
    }
}
