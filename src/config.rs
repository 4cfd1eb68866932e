//! Client configuration.
//!
//! `ClientConfig` controls how a [`GiftClient`](crate::GiftClient) talks to the
//! storefront: which base URLs it uses for the store and community surfaces,
//! the identity it presents (user agent, language, timezone) and the request
//! limits (timeout, redirects).
//!
//! `ClientConfig` provides working defaults via [`Default`] and a fluent
//! [`ClientConfig::builder()`] for customization with validation.
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use steam_gift::ClientConfig;
//! let cfg = ClientConfig::default();
//! assert_eq!(cfg.language, "english");
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use std::time::Duration;
//! use steam_gift::ClientConfig;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = ClientConfig::builder()
//!     .timeout(Duration::from_secs(20))
//!     .user_agent("Mozilla/5.0 (X11; Linux x86_64)")
//!     .language("german")
//!     .build()?; // returns Result<ClientConfig, ClientConfigError>
//! # Ok(()) }
//! ```
//!
//! # Errors
//!
//! Builder validation returns [`ClientConfigError`] when the timeout is zero,
//! the user agent is empty, or a base URL is not an `http(s)` root ending in `/`.

use std::fmt;
use std::time::Duration;
use url::Url;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/71.0.3578.98 Safari/537.36";
const DEFAULT_STORE_URL: &str = "https://store.steampowered.com/";
const DEFAULT_COMMUNITY_URL: &str = "https://steamcommunity.com/";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User agent sent with every request
    pub user_agent: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Base URL of the storefront (cart, checkout, purchase history)
    pub store_url: Url,
    /// Base URL of the community site (friend actions)
    pub community_url: Url,
    /// Storefront language, written into the `Steam_Language` cookie
    pub language: String,
    /// Value of the `timezoneOffset` cookie
    pub timezone_offset: String,
    /// Redirects followed before a request fails
    pub max_redirects: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(50),
            store_url: Url::parse(DEFAULT_STORE_URL).expect("default store url is valid"),
            community_url: Url::parse(DEFAULT_COMMUNITY_URL).expect("default community url is valid"),
            language: "english".to_string(),
            timezone_offset: "0,0".to_string(),
            max_redirects: 10,
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// `Accept-Language` value derived from the storefront language.
    pub fn accept_language(&self) -> &'static str {
        match self.language.as_str() {
            "german" => "de-DE,de;q=0.9,en;q=0.8",
            "french" => "fr-FR,fr;q=0.9,en;q=0.8",
            "spanish" => "es-ES,es;q=0.9,en;q=0.8",
            "russian" => "ru-RU,ru;q=0.9,en;q=0.8",
            _ => "en-US,en;q=0.9",
        }
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    inner: ClientConfig,
}

impl ClientConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut ClientConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn user_agent<S: Into<String>>(self, ua: S) -> Self { self.map(|c| c.user_agent = ua.into()) }
    pub fn timeout(self, timeout: Duration) -> Self { self.map(|c| c.timeout = timeout) }
    pub fn store_url(self, url: Url) -> Self { self.map(|c| c.store_url = url) }
    pub fn community_url(self, url: Url) -> Self { self.map(|c| c.community_url = url) }
    pub fn language<S: Into<String>>(self, lang: S) -> Self { self.map(|c| c.language = lang.into()) }
    pub fn timezone_offset<S: Into<String>>(self, offset: S) -> Self { self.map(|c| c.timezone_offset = offset.into()) }
    pub fn max_redirects(self, n: usize) -> Self { self.map(|c| c.max_redirects = n) }

    /// Points both the store and the community surface at the same base URL.
    pub fn base_url(self, url: Url) -> Self {
        self.map(|c| {
            c.store_url = url.clone();
            c.community_url = url;
        })
    }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut ClientConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<ClientConfig, ClientConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientConfigError {
    ZeroTimeout,
    EmptyUserAgent,
    InvalidBaseUrl(String),
}

impl fmt::Display for ClientConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientConfigError::ZeroTimeout =>
                write!(f, "timeout must be larger than zero"),
            ClientConfigError::EmptyUserAgent =>
                write!(f, "user_agent must not be empty"),
            ClientConfigError::InvalidBaseUrl(url) =>
                write!(f, "base url {url} must be an http(s) url ending in '/'"),
        }
    }
}
impl std::error::Error for ClientConfigError {}

fn validate_base_url(url: &Url) -> Result<(), ClientConfigError> {
    let http = matches!(url.scheme(), "http" | "https");
    if !http || url.host_str().is_none() || !url.path().ends_with('/') {
        return Err(ClientConfigError::InvalidBaseUrl(url.to_string()));
    }
    Ok(())
}

pub(crate) fn validate(c: &ClientConfig) -> Result<(), ClientConfigError> {
    if c.timeout.is_zero() {
        return Err(ClientConfigError::ZeroTimeout);
    }
    if c.user_agent.trim().is_empty() {
        return Err(ClientConfigError::EmptyUserAgent);
    }
    validate_base_url(&c.store_url)?;
    validate_base_url(&c.community_url)?;
    Ok(())
}
