mod house;
mod store;

pub use house::{AuctionHouse, InMemoryAuctionHouse};
pub use store::{AuctionStore, LogStore};
