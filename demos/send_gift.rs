//! Buys a gift with a logged-in browser session and waits for its delivery.
//!
//! ```text
//! STEAM_COOKIES="steamLoginSecure=...; sessionid=..." \
//! GIFTEE=76561198000000001 SUB_IDS=54029 REGION=US \
//! RUST_LOG=info cargo run --example send_gift
//! ```
use anyhow::{bail, Context};
use std::time::Duration;
use steam_gift::{GiftClient, GiftOrder, SteamId, TransStatus};

const STATUS_POLLS: u32 = 10;
const POLL_INTERVAL: Duration = Duration::from_secs(3);

fn env(name: &str) -> anyhow::Result<String> {
    std::env::var(name).with_context(|| format!("{name} is not set"))
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cookies = env("STEAM_COOKIES")?;
    let giftee: SteamId = env("GIFTEE")?.parse()?;
    let sub_ids = env("SUB_IDS")?
        .split(',')
        .map(|s| s.trim().parse::<u32>())
        .collect::<Result<Vec<_>, _>>()
        .context("SUB_IDS must be a comma separated list of package ids")?;

    let mut client = GiftClient::new(None)?;
    client.set_cookies(cookies.split(';').map(str::trim).filter(|c| !c.is_empty()))?;

    if client.steam_id().is_none() {
        bail!("STEAM_COOKIES holds no login cookie");
    }

    let order = GiftOrder {
        region: env_or("REGION", "US"),
        giftee,
        giftee_name: env_or("GIFTEE_NAME", "Friend"),
        message: env_or("GIFT_MESSAGE", "Enjoy!"),
        sentiment: env_or("GIFT_SENTIMENT", "Best Wishes"),
        sub_ids,
    };

    let transaction = client.purchase_gift(&order).await?;
    println!("transaction {} finalized", transaction.id);

    let count = transaction.items.len() as u32;
    for poll in 1..=STATUS_POLLS {
        match client.get_transaction_status(&transaction.id, count).await {
            TransStatus::None => break,
            TransStatus::Declined => bail!("transaction {} was declined", transaction.id),
            TransStatus::Invalid if poll == STATUS_POLLS => bail!("transaction {} never settled", transaction.id),
            TransStatus::Invalid => tokio::time::sleep(POLL_INTERVAL).await,
        }
    }

    for _ in 0..STATUS_POLLS {
        if let Some(asset_id) = client.get_transaction_asset_id(&transaction.id).await {
            println!("gift delivered as asset {asset_id}");
            return Ok(());
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }

    println!("gift sent, asset id not visible yet");
    Ok(())
}
