use crate::config::{validate, ClientConfig};
use crate::errors::GiftError;
use crate::net::Gateway;
use crate::session::{SessionStore, LANGUAGE_COOKIE, TIMEZONE_COOKIE};
use crate::steam_id::SteamId;

/// A client bound to one storefront session.
///
/// The client owns one [`SessionStore`] and one [`Gateway`] that share the
/// same cookie jar. Cart, checkout and friend operations are methods on this
/// type (see the [`cart`](crate::cart), [`transaction`](crate::transaction)
/// and [`friends`](crate::friends) modules).
///
/// Operations that change session state take `&mut self`, which keeps a cart
/// or transaction from being driven by two calls at once. Separate clients
/// share nothing and can run concurrently.
pub struct GiftClient {
    pub(crate) session: SessionStore,
    pub(crate) gateway: Gateway,
    config: ClientConfig,
}

impl GiftClient {
    /// Creates a new client. If `config` is `None`, [`ClientConfig::default`] is used.
    ///
    /// The language and timezone cookies are set right away; the login
    /// cookies have to be supplied by the caller through [`set_cookies`](Self::set_cookies).
    pub fn new(config: Option<ClientConfig>) -> Result<Self, GiftError> {
        let config = config.unwrap_or_default();
        validate(&config)?;

        let session = SessionStore::new(config.store_url.clone(), config.community_url.clone());
        let gateway = Gateway::new(&config, session.jar())?;

        let mut client = Self { session, gateway, config };
        let language = format!("{LANGUAGE_COOKIE}={}", client.config.language);
        let timezone = format!("{TIMEZONE_COOKIE}={}", client.config.timezone_offset);
        client.session.set_cookies([timezone, language])?;

        Ok(client)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionStore {
        &mut self.session
    }

    /// Sets a single cookie in `name=value` form on both domains.
    pub fn set_cookie(&mut self, cookie: &str) -> Result<(), GiftError> {
        self.session.set_cookie(cookie)
    }

    /// Sets multiple cookies, typically the ones of a logged-in browser session.
    pub fn set_cookies<I, S>(&mut self, cookies: I) -> Result<(), GiftError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.session.set_cookies(cookies)
    }

    pub fn delete_cookie(&mut self, name: &str) {
        self.session.delete_cookie(name)
    }

    /// CSRF token of this session, created on first use.
    pub fn session_id(&mut self) -> String {
        self.session.session_id()
    }

    /// Current shopping cart id, `None` until an item was added.
    pub fn cart_id(&self) -> Option<String> {
        self.session.cart_id()
    }

    /// Account of the login cookie, if one was set.
    pub fn steam_id(&self) -> Option<SteamId> {
        self.session.identity()
    }

    /// Cart id or [`GiftError::CartMissing`] for calls that cannot work without one.
    pub(crate) fn require_cart_id(&self) -> Result<String, GiftError> {
        self.cart_id().ok_or(GiftError::CartMissing)
    }
}
