//! Test helpers shared by the module tests.
use crate::{ClientConfig, GiftClient};
use std::time::Duration;
use url::Url;
use wiremock::MockServer;

/// Config with both surfaces pointing at `server`.
pub(crate) fn mock_config(server: &MockServer) -> ClientConfig {
    ClientConfig::builder()
        .base_url(Url::parse(&server.uri()).unwrap())
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

/// Config pointing at a port nothing listens on.
pub(crate) fn unreachable_config() -> ClientConfig {
    ClientConfig::builder()
        .base_url(Url::parse("http://127.0.0.1:1/").unwrap())
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap()
}

pub(crate) fn mock_client(server: &MockServer) -> GiftClient {
    GiftClient::new(Some(mock_config(server))).unwrap()
}

/// Client against `server` that already holds a session and a cart.
pub(crate) fn mock_client_with_cart(server: &MockServer, cart_id: &str) -> GiftClient {
    let mut client = mock_client(server);
    client
        .set_cookies(["sessionid=sess42".to_string(), format!("shoppingCartGID={cart_id}")])
        .unwrap();
    client
}
