//! Outbound HTTP for every storefront call.
//!
//! The [`Gateway`] owns the `reqwest` client with the session's cookie jar
//! plugged in, the default headers and the timeout. Every response it returns
//! has been through [`classify`], so transport failures, expired sessions and
//! HTTP errors surface the same way whichever component made the call.
use crate::config::ClientConfig;
use crate::errors::GiftError;
use crate::net::Response;
use crate::session::{CookieJarHandle, SharedCookieJar};
use http::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::redirect::{Attempt, Policy};
use reqwest::RequestBuilder;
use std::sync::Arc;
use url::Url;

/// Which site an endpoint lives on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Surface {
    Store,
    Community,
}

fn is_login_path(path: &str) -> bool {
    path.contains("/login")
}

/// Sorts a buffered response into the shared failure classes.
///
/// - a redirect towards a login page means the session cookies are no longer
///   accepted: [`GiftError::NotAuthenticated`]
/// - a status of 400 or above: [`GiftError::Http`]
/// - anything else is handed back for endpoint-specific interpretation
pub fn classify(response: Response) -> Result<Response, GiftError> {
    if response.is_redirect() && response.location().is_some_and(is_login_path) {
        return Err(GiftError::NotAuthenticated);
    }

    if response.status >= 400 {
        return Err(GiftError::Http { code: response.status });
    }

    Ok(response)
}

pub struct Gateway {
    client: reqwest::Client,
    store_url: Url,
    community_url: Url,
}

impl Gateway {
    pub fn new(config: &ClientConfig, jar: CookieJarHandle) -> Result<Self, GiftError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(config.accept_language()));

        // Login redirects are not followed so that `classify` gets to see them
        let max_redirects = config.max_redirects;
        let redirects = Policy::custom(move |attempt: Attempt| {
            if is_login_path(attempt.url().path()) {
                attempt.stop()
            } else if attempt.previous().len() > max_redirects {
                attempt.error(format!("too many redirects (limit {max_redirects})"))
            } else {
                attempt.follow()
            }
        });

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.timeout)
            .gzip(true)
            .cookie_provider(Arc::new(SharedCookieJar::new(jar)))
            .redirect(redirects)
            .build()?;

        Ok(Self {
            client,
            store_url: config.store_url.clone(),
            community_url: config.community_url.clone(),
        })
    }

    /// Resolves `path` against the base URL of `surface`.
    pub fn endpoint(&self, surface: Surface, path: &str) -> Result<Url, GiftError> {
        let base = match surface {
            Surface::Store => &self.store_url,
            Surface::Community => &self.community_url,
        };
        Ok(base.join(path)?)
    }

    pub async fn get(&self, url: Url, query: &[(&str, String)]) -> Result<Response, GiftError> {
        self.execute(self.client.get(url).query(query)).await
    }

    /// POST with an `application/x-www-form-urlencoded` body.
    pub async fn post_form(&self, url: Url, form: &[(&str, String)]) -> Result<Response, GiftError> {
        self.execute(self.client.post(url).form(form)).await
    }

    /// POST with a `multipart/form-data` body.
    pub async fn post_multipart(&self, url: Url, fields: Vec<(&'static str, String)>) -> Result<Response, GiftError> {
        let form = fields
            .into_iter()
            .fold(reqwest::multipart::Form::new(), |form, (name, value)| form.text(name, value));

        self.execute(self.client.post(url).multipart(form)).await
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, GiftError> {
        let res = request.send().await.map_err(|e| {
            log::debug!("transport failure: {e}");
            GiftError::Transport(e)
        })?;

        let response = Response::read(res).await?;
        log::debug!("{} -> {} {}", response.url.path(), response.status, response.status_text);

        classify(response)
    }
}
