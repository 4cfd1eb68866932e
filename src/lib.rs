//! Session-bound gifting client for the Steam storefront.
//!
//! The crate drives the storefront's web checkout with an already
//! authenticated browser session (cookies) instead of a documented API:
//! put items in the cart, verify the cart, initialize a gift transaction,
//! confirm the price, finalize it and then poll until the gift shows up in
//! the recipient's inventory.
//!
//! ```rust,no_run
//! use steam_gift::{GiftClient, SteamId};
//!
//! # async fn run() -> Result<(), steam_gift::GiftError> {
//! let mut client = GiftClient::new(None)?;
//! client.set_cookies(["steamLoginSecure=76561198000000000%7C%7Ctoken", "sessionid=abc"])?;
//!
//! client.forget_cart();
//! let item = client.add_to_cart(54029).await?;
//! client.checkout_gift_cart(&[item]).await?;
//!
//! let giftee: SteamId = "76561198000000001".parse()?;
//! let trans_id = client.init_transaction("US", giftee, "Friend", "Enjoy!", "Best Wishes").await?;
//! client.get_final_price(1, &trans_id).await?;
//! client.finalize_transaction(&trans_id).await?;
//! # Ok(()) }
//! ```
pub mod cart;
pub mod client;
pub mod config;
pub mod errors;
pub mod friends;
pub mod net;
pub mod result_code;
pub mod session;
pub mod steam_id;
pub mod transaction;

#[cfg(test)]
mod testing;

pub use cart::CartItem;
pub use client::GiftClient;
pub use config::{ClientConfig, ClientConfigError};
pub use errors::{CartDiscrepancy, GiftError};
pub use result_code::{ResultCode, TransStatus};
pub use steam_id::SteamId;
pub use transaction::{FinalPrice, GiftOrder, TransId, Transaction, TransactionState};
