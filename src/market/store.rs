use tracing::debug;
use uuid::Uuid;

use crate::types::{AuctionEntry, CharacterId};

/// Durability sink for listing rows.
///
/// Writes are fire-and-forget: the live auction-house map stays the source
/// of truth for the process lifetime and failures never surface back into
/// planning state.
pub trait AuctionStore: Send + Sync {
    fn insert_auction(&self, entry: &AuctionEntry);

    fn update_bid(&self, id: Uuid, bidder: Option<CharacterId>, amount: u64);
}

/// Store that only journals to the log, for hosts without a database.
pub struct LogStore;

impl AuctionStore for LogStore {
    fn insert_auction(&self, entry: &AuctionEntry) {
        debug!(
            "store: insert auction {} item {} x{} start {} buyout {}",
            entry.id, entry.item_id, entry.stack_count, entry.start_bid, entry.buyout
        );
    }

    fn update_bid(&self, id: Uuid, bidder: Option<CharacterId>, amount: u64) {
        debug!("store: auction {} bid {} by {:?}", id, amount, bidder);
    }
}
