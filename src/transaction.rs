//! Gift checkout transactions.
//!
//! A checkout moves through a fixed sequence of calls, each needing the
//! transaction id handed out by the first one:
//!
//! ```text
//! Uninitialized --init_transaction--> Initialized --get_final_price--> PriceConfirmed
//!               --finalize_transaction--> Finalized
//! ```
//!
//! Next to that sequence the server's verdict can be polled at any time after
//! initialization with [`GiftClient::get_transaction_status`], and once the gift
//! has been delivered its inventory asset id can be looked up with
//! [`GiftClient::get_transaction_asset_id`]. Both probes swallow failures
//! so they can be called in a loop.
//!
//! The client does not remember transactions; callers keep the [`TransId`].
//! [`GiftClient::purchase_gift`] runs the whole sequence and tracks the
//! [`TransactionState`] for callers that do not need the individual steps.
use crate::cart::CartItem;
use crate::client::GiftClient;
use crate::errors::GiftError;
use crate::net::{de, Surface};
use crate::result_code::{ResultCode, TransStatus};
use crate::steam_id::SteamId;
use lazy_static::lazy_static;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

const INIT_TRANSACTION_PATH: &str = "checkout/inittransaction/";
const FINAL_PRICE_PATH: &str = "checkout/getfinalprice/";
const FINALIZE_TRANSACTION_PATH: &str = "checkout/finalizetransaction/";
const TRANSACTION_STATUS_PATH: &str = "checkout/transactionstatus/";
const PURCHASE_HISTORY_PATH: &str = "account/history/";

lazy_static! {
    /// Link from a purchase to the delivered item in the recipient's inventory.
    static ref INVENTORY_LINK: Selector =
        Selector::parse(r#"a[href*="/inventory/#"]"#).expect("valid inventory link selector");
}

/// Server-assigned id of one checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransId(String);

impl TransId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TransId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How far a checkout has progressed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TransactionState {
    Uninitialized,
    Initialized,
    PriceConfirmed,
    Finalized,
}

/// A checkout driven by [`GiftClient::purchase_gift`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransId,
    pub state: TransactionState,
    /// Items verified in the cart before the transaction was started
    pub items: Vec<CartItem>,
}

impl Transaction {
    fn advance(&mut self, next: TransactionState) {
        log::info!("transaction {}: {:?} -> {:?}", self.id, self.state, next);
        self.state = next;
    }
}

/// Everything needed to gift a set of packages to one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftOrder {
    /// Country code of the purchasing account (e.g. `US`)
    pub region: String,
    pub giftee: SteamId,
    pub giftee_name: String,
    pub message: String,
    pub sentiment: String,
    /// Packages to put in the cart, in order
    pub sub_ids: Vec<u32>,
}

/// Price figures reported before finalizing. Not validated here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FinalPrice {
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub base: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub tax: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_i64")]
    pub total: Option<i64>,
    #[serde(default, rename = "formattedTotal", deserialize_with = "de::opt_string")]
    pub formatted_total: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InitTransactionResponse {
    #[serde(default, deserialize_with = "de::opt_i32")]
    success: Option<i32>,
    #[serde(default, deserialize_with = "de::opt_string")]
    transid: Option<String>,
    #[serde(default, deserialize_with = "de::opt_i32")]
    purchaseresultdetail: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct ResultResponse {
    #[serde(default, deserialize_with = "de::opt_i32")]
    success: Option<i32>,
    #[serde(default, deserialize_with = "de::opt_i32")]
    purchaseresultdetail: Option<i32>,
}

/// Error for a result code that is not accepted by the calling step.
fn rejection(success: Option<i32>, purchase_result_detail: Option<i32>) -> GiftError {
    match success.and_then(ResultCode::from_code) {
        Some(code) => GiftError::DomainRejected {
            code: code.code(),
            detail: code.name().to_string(),
        },
        None => GiftError::DomainRejected {
            code: success.unwrap_or_default(),
            detail: match purchase_result_detail {
                Some(detail) => format!("Error {detail}"),
                None => "Error unknown".to_string(),
            },
        },
    }
}

/// Trailing asset id of an inventory deep link (`.../inventory/#<app>_<context>_<asset>`).
fn asset_id_from_link(href: &str) -> Option<u64> {
    let (_, fragment) = href.split_once("/inventory/#")?;
    let parts: Vec<&str> = fragment.split('_').collect();
    match parts.as_slice() {
        [_app, _context, asset] => asset.parse().ok(),
        _ => None,
    }
}

fn find_asset_id(markup: &str) -> Option<u64> {
    Html::parse_document(markup)
        .select(&INVENTORY_LINK)
        .filter_map(|a| a.value().attr("href"))
        .find_map(asset_id_from_link)
}

impl GiftClient {
    /// Starts a gift transaction for the current cart and returns its id.
    ///
    /// Payment is always the wallet balance; no card is involved. `giftee` is
    /// sent as 32-bit account number.
    pub async fn init_transaction(
        &mut self,
        region: &str,
        giftee: SteamId,
        giftee_name: &str,
        message: &str,
        sentiment: &str,
    ) -> Result<TransId, GiftError> {
        let cart_id = self.require_cart_id()?;
        let url = self.gateway.endpoint(Surface::Store, INIT_TRANSACTION_PATH)?;

        let fields = vec![
            ("sessionid", self.session.session_id()),
            ("gidShoppingCart", cart_id),
            ("gidReplayOfTransID", "-1".to_string()),
            ("PaymentMethod", "steamaccount".to_string()),
            ("abortPendingTransactions", "0".to_string()),
            ("bHasCardInfo", "0".to_string()),
            ("Country", region.to_string()),
            ("bIsGift", "1".to_string()),
            ("GifteeAccountID", giftee.account_id().to_string()),
            ("ScheduledSendOnDate", "0".to_string()),
            ("bSaveBillingAddress", "1".to_string()),
            ("bUseRemainingSteamAccount", "1".to_string()),
            ("bPreAuthOnly", "0".to_string()),
            ("GifteeName", giftee_name.to_string()),
            ("GiftMessage", message.to_string()),
            ("Sentiment", sentiment.to_string()),
        ];

        let response = self.gateway.post_multipart(url, fields).await?;
        let body: InitTransactionResponse = response.json()?;

        if body.success != Some(ResultCode::Ok.code()) {
            return Err(rejection(body.success, body.purchaseresultdetail));
        }

        // Success without an id breaks the endpoint's contract
        let trans_id = body
            .transid
            .ok_or_else(|| GiftError::ProtocolViolation("transaction initialized without transid".to_string()))?;

        log::info!("initialized transaction {trans_id} for {giftee}");
        Ok(TransId(trans_id))
    }

    /// Asks the server for the final price of `count` items in transaction `trans_id`.
    ///
    /// Success only means the call went through. The figures are parsed on a
    /// best-effort basis and left to the caller to judge.
    pub async fn get_final_price(&self, count: u32, trans_id: &TransId) -> Result<FinalPrice, GiftError> {
        let cart_id = self.require_cart_id()?;
        let url = self.gateway.endpoint(Surface::Store, FINAL_PRICE_PATH)?;

        let query = [
            ("count", count.to_string()),
            ("transid", trans_id.to_string()),
            ("purchasetype", "gift".to_string()),
            ("microtxnid", "-1".to_string()),
            ("cart", cart_id),
            ("gidReplayOfTransID", "-1".to_string()),
        ];

        let response = self.gateway.get(url, &query).await?;
        let price = response.json::<FinalPrice>().unwrap_or_else(|e| {
            log::debug!("final price without figures: {e}");
            FinalPrice::default()
        });

        Ok(price)
    }

    /// Finalizes transaction `trans_id`, paying from the wallet balance.
    ///
    /// Accepted when the server answers `OK` or `Pending`.
    pub async fn finalize_transaction(&self, trans_id: &TransId) -> Result<(), GiftError> {
        let url = self.gateway.endpoint(Surface::Store, FINALIZE_TRANSACTION_PATH)?;
        let form = [
            ("transid", trans_id.to_string()),
            // wallet payment, there is no card to verify
            ("CardCVV2", String::new()),
        ];

        let response = self.gateway.post_form(url, &form).await?;
        let body: ResultResponse = response.json()?;

        match body.success.and_then(ResultCode::from_code) {
            Some(ResultCode::Ok) | Some(ResultCode::Pending) => {
                log::info!("finalized transaction {trans_id}");
                Ok(())
            }
            _ => Err(rejection(body.success, body.purchaseresultdetail)),
        }
    }

    /// Polls the server's current verdict on transaction `trans_id`.
    ///
    /// Never fails: transport errors, non-200 answers and unreadable bodies
    /// all come back as [`TransStatus::Invalid`]. This keeps polling loops
    /// simple, but it means `Invalid` is not proof that the transaction is
    /// dead; it may only mean this particular poll failed.
    pub async fn get_transaction_status(&self, trans_id: &TransId, count: u32) -> TransStatus {
        let url = match self.gateway.endpoint(Surface::Store, TRANSACTION_STATUS_PATH) {
            Ok(url) => url,
            Err(e) => {
                log::warn!("status poll for {trans_id} failed: {e}");
                return TransStatus::Invalid;
            }
        };
        let query = [("count", count.to_string()), ("transid", trans_id.to_string())];

        let response = match self.gateway.get(url, &query).await {
            Ok(response) if response.status == 200 => response,
            Ok(response) => {
                log::warn!("status poll for {trans_id} answered {}", response.status);
                return TransStatus::Invalid;
            }
            Err(e) => {
                log::warn!("status poll for {trans_id} failed: {e}");
                return TransStatus::Invalid;
            }
        };

        match response.json::<ResultResponse>() {
            Ok(body) => TransStatus::from_result(body.success),
            Err(e) => {
                log::warn!("status poll for {trans_id} unreadable: {e}");
                TransStatus::Invalid
            }
        }
    }

    /// Looks up the inventory asset id of the item delivered by `trans_id`.
    ///
    /// Returns `None` while the delivery is not visible yet and on any failure,
    /// so it can be polled until it yields a value.
    pub async fn get_transaction_asset_id(&self, trans_id: &TransId) -> Option<u64> {
        let url = self.gateway.endpoint(Surface::Store, PURCHASE_HISTORY_PATH).ok()?;
        let query = [("transid", trans_id.to_string())];

        match self.gateway.get(url, &query).await {
            Ok(response) => find_asset_id(&response.text()),
            Err(e) => {
                log::debug!("asset lookup for {trans_id} failed: {e}");
                None
            }
        }
    }

    /// Buys `order.sub_ids` as a gift for `order.giftee` in one go.
    ///
    /// Starts from an empty cart, adds every package, verifies the cart and
    /// then runs init, price confirmation and finalize. The first failing step
    /// aborts with its error; the returned transaction is `Finalized`.
    pub async fn purchase_gift(&mut self, order: &GiftOrder) -> Result<Transaction, GiftError> {
        self.forget_cart();

        let mut items = Vec::with_capacity(order.sub_ids.len());
        for sub_id in &order.sub_ids {
            items.push(self.add_to_cart(*sub_id).await?);
        }
        self.checkout_gift_cart(&items).await?;

        let id = self
            .init_transaction(&order.region, order.giftee, &order.giftee_name, &order.message, &order.sentiment)
            .await?;
        let mut transaction = Transaction {
            id,
            state: TransactionState::Uninitialized,
            items,
        };
        transaction.advance(TransactionState::Initialized);

        let count = transaction.items.len() as u32;
        let price = self.get_final_price(count, &transaction.id).await?;
        if let Some(total) = &price.formatted_total {
            log::info!("transaction {} total: {total}", transaction.id);
        }
        transaction.advance(TransactionState::PriceConfirmed);

        self.finalize_transaction(&transaction.id).await?;
        transaction.advance(TransactionState::Finalized);

        Ok(transaction)
    }
}
