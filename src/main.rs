use std::path::Path;
use std::sync::Arc;

use ahbot::{
    bot::AuctionHouseBot,
    catalog::StaticItemSource,
    config::ConfigLoader,
    logging::init_logger,
    market::{InMemoryAuctionHouse, LogStore},
    types::{HouseType, ItemQuality},
    utils::format_money,
};
use anyhow::Result;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval, Duration, Instant};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    init_logger()?;
    info!("Starting ahbot v{}", env!("CARGO_PKG_VERSION"));

    // Load or create configuration
    let config_loader = ConfigLoader::new();
    let config = config_loader.load()?;

    let source = Arc::new(StaticItemSource::from_json_file(Path::new(
        &config.items_file,
    ))?);
    info!("Item catalog holds {} templates", source.len());

    let market = Arc::new(InMemoryAuctionHouse::new());
    let store = Arc::new(LogStore);

    let mut bot = AuctionHouseBot::new(config, source, market.clone(), store);
    bot.initialize();
    let bot = Arc::new(Mutex::new(bot));

    // Console admin loop
    {
        let bot = bot.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                handle_command(&bot, &config_loader, line.trim());
            }
        });
    }

    // Drive the engine from a one-second tick; expiry settlement stands in
    // for the host server's mail-out of sold and returned listings
    let mut ticker = interval(Duration::from_secs(1));
    let mut last = Instant::now();
    loop {
        ticker.tick().await;
        let now = Utc::now();
        let diff = last.elapsed();
        last = Instant::now();

        bot.lock().update(diff, now);

        for entry in market.remove_expired(now) {
            if let Some(bidder) = entry.bidder {
                info!(
                    "Auction for item {} x{} settled at {} to character {}",
                    entry.item_id,
                    entry.stack_count,
                    format_money(entry.bid),
                    bidder
                );
            }
        }
    }
}

fn handle_command(bot: &Mutex<AuctionHouseBot>, config_loader: &ConfigLoader, line: &str) {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        [] => {}
        ["status"] => {
            for status in bot.lock().status() {
                info!(
                    "{:?}: {} listings (by quality {:?})",
                    status.house, status.total, status.per_quality
                );
            }
        }
        ["ratio", alliance, horde, neutral] => {
            match (
                alliance.parse::<u32>(),
                horde.parse::<u32>(),
                neutral.parse::<u32>(),
            ) {
                (Ok(a), Ok(h), Ok(n)) => bot.lock().set_items_ratio(a, h, n),
                _ => warn!("Usage: ratio <alliance> <horde> <neutral>"),
            }
        }
        ["ratio", house, value] => match (parse_house(house), value.parse::<u32>()) {
            (Some(house), Ok(value)) => bot.lock().set_items_ratio_for_house(house, value),
            _ => warn!("Usage: ratio <alliance|horde|neutral> <percent>"),
        },
        ["amount", quality, value] => match (parse_quality(quality), value.parse::<u32>()) {
            (Some(quality), Ok(value)) => bot.lock().set_items_amount_for_quality(quality, value),
            _ => warn!("Usage: amount <grey|white|green|blue|purple|orange|yellow> <count>"),
        },
        ["rebuild"] => bot.lock().rebuild(false),
        ["rebuild", "all"] => bot.lock().rebuild(true),
        ["reload"] => match config_loader.load() {
            Ok(config) => bot.lock().reload(config),
            Err(e) => error!("Failed to reload configuration: {}", e),
        },
        ["quit"] | ["exit"] => {
            info!("Shutting down");
            std::process::exit(0);
        }
        _ => warn!(
            "Unknown command: {} (try status, ratio, amount, rebuild, reload, quit)",
            line
        ),
    }
}

fn parse_house(s: &str) -> Option<HouseType> {
    match s {
        "alliance" => Some(HouseType::Alliance),
        "horde" => Some(HouseType::Horde),
        "neutral" => Some(HouseType::Neutral),
        _ => None,
    }
}

fn parse_quality(s: &str) -> Option<ItemQuality> {
    match s {
        "grey" | "gray" => Some(ItemQuality::Grey),
        "white" => Some(ItemQuality::White),
        "green" => Some(ItemQuality::Green),
        "blue" => Some(ItemQuality::Blue),
        "purple" => Some(ItemQuality::Purple),
        "orange" => Some(ItemQuality::Orange),
        "yellow" => Some(ItemQuality::Yellow),
        _ => None,
    }
}
