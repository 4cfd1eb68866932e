// src/session.rs
//! Session state: [`SessionStore`], [`CookieJar`] and the `reqwest` bridge.

mod cookie;
mod cookie_jar;
mod cookie_provider;
mod session_store;

pub use cookie::Cookie;

pub use cookie_jar::CookieJar;
pub use cookie_jar::CookieJarHandle;
pub use cookie_jar::DefaultCookieJar;

pub use cookie_provider::SharedCookieJar;

pub use session_store::SessionStore;
pub use session_store::{CART_ID_COOKIE, CHECKOUT_CART_COOKIE, LANGUAGE_COOKIE, SESSION_ID_COOKIE, TIMEZONE_COOKIE};
