//! Shopping cart operations.
//!
//! The cart lives on the server; locally only its id is kept, in the
//! `shoppingCartGID` cookie (mirrored into `beginCheckoutCart`, which the
//! checkout pages read). Cart contents are read back from the cart page
//! markup, where every row carries the app id of its item.
use crate::client::GiftClient;
use crate::errors::{CartDiscrepancy, GiftError};
use crate::net::Surface;
use crate::session::{CART_ID_COOKIE, CHECKOUT_CART_COOKIE};
use lazy_static::lazy_static;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

const CART_PATH: &str = "cart/";

lazy_static! {
    /// Every item row of the cart page.
    static ref CART_ROW: Selector = Selector::parse(".cart_row").expect("valid cart row selector");
    /// First item row, which is the one just added.
    static ref ADDED_ROW: Selector = Selector::parse(".cart_row.even").expect("valid added row selector");
}

const APP_ID_ATTR: &str = "data-ds-appid";

/// One cart entry: the package that was bought and the app it resolved to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartItem {
    pub sub_id: u32,
    pub app_id: u32,
}

fn parse_app_id(raw: &str) -> Result<u32, GiftError> {
    raw.trim()
        .parse()
        .map_err(|_| GiftError::MalformedResponse(format!("cart row has non-numeric app id '{raw}'")))
}

/// App id of the row that was just added, from the add-to-cart response.
fn added_app_id(markup: &str) -> Result<u32, GiftError> {
    let document = Html::parse_document(markup);
    let raw = document
        .select(&ADDED_ROW)
        .next()
        .and_then(|row| row.value().attr(APP_ID_ATTR))
        .ok_or_else(|| GiftError::MalformedResponse("added cart row without app id".to_string()))?;

    parse_app_id(raw)
}

/// App ids of all cart rows, in page order.
fn cart_app_ids(markup: &str) -> Result<Vec<u32>, GiftError> {
    let document = Html::parse_document(markup);
    document
        .select(&CART_ROW)
        .map(|row| {
            row.value()
                .attr(APP_ID_ATTR)
                .ok_or_else(|| GiftError::MalformedResponse("cart row without app id".to_string()))
                .and_then(parse_app_id)
        })
        .collect()
}

/// Checks that `cart` holds exactly the apps of `expected`, counting duplicates.
fn verify_cart(cart: &[u32], expected: &[CartItem]) -> Result<(), CartDiscrepancy> {
    if cart.len() != expected.len() {
        return Err(CartDiscrepancy::CountMismatch {
            expected: expected.len(),
            found: cart.len(),
        });
    }

    // Each cart row may satisfy one expected item only
    let mut remaining = cart.to_vec();
    for item in expected {
        match remaining.iter().position(|app_id| *app_id == item.app_id) {
            Some(i) => {
                remaining.swap_remove(i);
            }
            None => return Err(CartDiscrepancy::NotFound { app_id: item.app_id }),
        }
    }

    Ok(())
}

impl GiftClient {
    /// Forgets the current cart locally. The next add starts a new cart.
    pub fn forget_cart(&mut self) {
        self.session.delete_cookie(CART_ID_COOKIE);
        self.session.delete_cookie(CHECKOUT_CART_COOKIE);
    }

    /// Adds the package `sub_id` to the cart and returns the resulting entry.
    ///
    /// The cart id is taken from the `Set-Cookie` headers of this response and
    /// stored under both cart cookie names. A response without the added row
    /// means the add silently failed on the server.
    pub async fn add_to_cart(&mut self, sub_id: u32) -> Result<CartItem, GiftError> {
        let url = self.gateway.endpoint(Surface::Store, CART_PATH)?;
        let fields = vec![
            ("sessionid", self.session.session_id()),
            ("action", "add_to_cart".to_string()),
            ("snr", "1_5_9__403".to_string()),
            ("originating_snr", "1_store-navigation__".to_string()),
            ("subid", sub_id.to_string()),
        ];

        let response = self.gateway.post_multipart(url, fields).await?;

        match response.set_cookie(CART_ID_COOKIE) {
            Some(cart_id) => {
                self.session.set_cookie(&format!("{CART_ID_COOKIE}={cart_id}"))?;
                self.session.set_cookie(&format!("{CHECKOUT_CART_COOKIE}={cart_id}"))?;
            }
            None => log::debug!("add to cart kept the existing cart"),
        }

        let app_id = added_app_id(&response.text())?;
        log::info!("added sub {sub_id} (app {app_id}) to cart");

        Ok(CartItem { sub_id, app_id })
    }

    /// Verifies that the remote cart holds exactly `items`.
    ///
    /// Fails with [`GiftError::CartMismatch`] when the number of rows differs or
    /// an expected app is missing, which catches leftovers from earlier or
    /// concurrent additions before money is spent.
    pub async fn checkout_gift_cart(&self, items: &[CartItem]) -> Result<(), GiftError> {
        let url = self.gateway.endpoint(Surface::Store, CART_PATH)?;
        let response = self.gateway.get(url, &[]).await?;

        let cart = cart_app_ids(&response.text())?;
        verify_cart(&cart, items).map_err(GiftError::CartMismatch)?;

        log::debug!("cart verified with {} items", cart.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::CookieJar;
    use crate::testing::{mock_client, mock_client_with_cart};
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    fn item(sub_id: u32, app_id: u32) -> CartItem {
        CartItem { sub_id, app_id }
    }

    fn cart_page(app_ids: &[u32]) -> String {
        let rows: String = app_ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let parity = if i % 2 == 0 { "even" } else { "odd" };
                format!(r#"<div class="cart_row {parity}" data-ds-appid="{id}"><a>Game {id}</a></div>"#)
            })
            .collect();
        format!(r#"<html><body><div id="cart_area">{rows}</div></body></html>"#)
    }

    #[test]
    fn verify_accepts_same_multiset_in_any_order() {
        let expected = [item(100, 555), item(101, 777)];
        assert_eq!(verify_cart(&[777, 555], &expected), Ok(()));
    }

    #[test]
    fn verify_rejects_missing_item() {
        let expected = [item(100, 555), item(101, 777)];
        assert_eq!(
            verify_cart(&[555], &expected),
            Err(CartDiscrepancy::CountMismatch { expected: 2, found: 1 })
        );
        assert_eq!(verify_cart(&[555, 999], &expected), Err(CartDiscrepancy::NotFound { app_id: 777 }));
    }

    #[test]
    fn verify_rejects_surplus_and_duplicates() {
        let expected = [item(100, 555)];
        assert!(matches!(verify_cart(&[555, 555], &expected), Err(CartDiscrepancy::CountMismatch { .. })));

        let expected = [item(100, 555), item(100, 555)];
        assert_eq!(verify_cart(&[555, 777], &expected), Err(CartDiscrepancy::NotFound { app_id: 555 }));
    }

    #[test]
    fn cart_rows_are_read_in_order() {
        assert_eq!(cart_app_ids(&cart_page(&[3, 1, 2])).unwrap(), vec![3, 1, 2]);
        assert!(cart_app_ids("<html></html>").unwrap().is_empty());
    }

    #[test]
    fn row_without_app_id_is_malformed() {
        let page = r#"<div class="cart_row even">broken</div>"#;
        assert!(matches!(cart_app_ids(page), Err(GiftError::MalformedResponse(_))));
        assert!(matches!(added_app_id(page), Err(GiftError::MalformedResponse(_))));
    }

    #[test]
    fn forget_cart_clears_both_cookies() {
        let mut client = crate::GiftClient::new(None).unwrap();
        client.set_cookies(["shoppingCartGID=A", "beginCheckoutCart=A"]).unwrap();

        client.forget_cart();
        assert_eq!(client.cart_id(), None);
        assert_eq!(client.session().cookie("beginCheckoutCart"), None);
    }

    #[tokio::test]
    async fn add_to_cart_captures_cart_id_and_app_id() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::path("/cart/"))
            .and(matchers::body_string_contains("add_to_cart"))
            .and(matchers::body_string_contains("100"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Set-Cookie", "shoppingCartGID=ABC123; Path=/")
                    .set_body_string(cart_page(&[555])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut client = mock_client(&server);
        let added = client.add_to_cart(100).await.unwrap();

        assert_eq!(added, item(100, 555));
        assert_eq!(client.cart_id().as_deref(), Some("ABC123"));
        assert_eq!(client.session().cookie("beginCheckoutCart").as_deref(), Some("ABC123"));
    }

    #[tokio::test]
    async fn forget_cart_also_drops_cookie_absorbed_from_response() {
        let server = MockServer::start().await;

        // No Path attribute, so the jar scopes the absorbed copy to /cart
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/cart/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Set-Cookie", "shoppingCartGID=OLD")
                    .set_body_string(cart_page(&[555])),
            )
            .mount(&server)
            .await;

        let mut client = mock_client(&server);
        client.add_to_cart(100).await.unwrap();
        client.forget_cart();

        let cart_url = client.gateway.endpoint(Surface::Store, CART_PATH).unwrap();
        assert_eq!(client.cart_id(), None);
        assert!(client
            .session()
            .jar()
            .read()
            .unwrap()
            .get_cookie(&cart_url, CART_ID_COOKIE)
            .is_none());
    }

    #[tokio::test]
    async fn add_to_cart_sends_the_session_token() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::path("/cart/"))
            .and(matchers::body_string_contains("sess42"))
            .and(matchers::header_regex("cookie", "sessionid=sess42"))
            .respond_with(ResponseTemplate::new(200).set_body_string(cart_page(&[10])))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = mock_client_with_cart(&server, "KEEP");
        let added = client.add_to_cart(7).await.unwrap();

        assert_eq!(added.app_id, 10);
        // No new cart cookie in the response, the existing cart stays
        assert_eq!(client.cart_id().as_deref(), Some("KEEP"));
    }

    #[tokio::test]
    async fn add_to_cart_without_row_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::path("/cart/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>Your cart is empty</body></html>"))
            .mount(&server)
            .await;

        let mut client = mock_client(&server);
        assert!(matches!(client.add_to_cart(100).await, Err(GiftError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn checkout_accepts_matching_cart() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("GET"))
            .and(matchers::path("/cart/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(cart_page(&[555])))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server);
        client.checkout_gift_cart(&[item(100, 555)]).await.unwrap();
    }

    #[tokio::test]
    async fn checkout_rejects_cart_missing_an_item() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("GET"))
            .and(matchers::path("/cart/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(cart_page(&[555, 999])))
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let err = client
            .checkout_gift_cart(&[item(100, 555), item(101, 777)])
            .await
            .unwrap_err();

        assert!(matches!(err, GiftError::CartMismatch(CartDiscrepancy::NotFound { app_id: 777 })));
        assert!(err.to_string().contains("not found in cart: app 777"));
    }

    #[tokio::test]
    async fn checkout_rejects_short_cart() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("GET"))
            .and(matchers::path("/cart/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(cart_page(&[555])))
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let err = client
            .checkout_gift_cart(&[item(100, 555), item(101, 777)])
            .await
            .unwrap_err();

        assert!(matches!(err, GiftError::CartMismatch(CartDiscrepancy::CountMismatch { expected: 2, found: 1 })));
    }
}
