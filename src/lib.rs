//! ahbot - simulated auction-house economy engine
//!
//! Keeps a game server's auction houses stocked and liquid: a seller planner
//! synthesizes listings from a curated item pool up to configured targets,
//! and a buyer planner bids on and buys out player listings with a chance
//! that falls off as prices climb past fair value.

pub mod bot;
pub mod buyer;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod market;
pub mod seller;
pub mod types;
pub mod utils;

pub use bot::{AuctionHouseBot, HouseStatus};
pub use buyer::AuctionBotBuyer;
pub use seller::AuctionBotSeller;
pub use types::{AuctionEntry, BotState, HouseType, ItemClass, ItemQuality, ItemTemplate};
