use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::types::{AuctionEntry, CharacterId, HouseType, ItemTemplate};

/// The live set of auction entries per house type.
///
/// The engine enumerates, inserts, bids and buys through this interface;
/// listing expiry and sale settlement remain the host's job. Implementations
/// manage their own interior mutability — the engine assumes the host's
/// single-writer-per-tick discipline.
pub trait AuctionHouse: Send + Sync {
    fn for_each_auction(&self, house: HouseType, visit: &mut dyn FnMut(&AuctionEntry));

    fn get_auction(&self, house: HouseType, id: Uuid) -> Option<AuctionEntry>;

    /// Inserts a new listing; the map becomes its sole owner.
    fn add_auction(&self, entry: AuctionEntry);

    /// Raises the current bid. Returns false when the entry is gone or the
    /// amount does not beat the standing bid.
    fn place_bid(&self, house: HouseType, id: Uuid, bidder: Option<CharacterId>, amount: u64)
        -> bool;

    /// Instant purchase. Returns false when the entry is gone or bid-only.
    fn buyout(&self, house: HouseType, id: Uuid, bidder: Option<CharacterId>) -> bool;

    /// Marks a listing as expiring immediately, leaving removal to the
    /// host's own expiry sweep.
    fn expire_auction(&self, house: HouseType, id: Uuid);

    /// Listing fee for a stack at the given duration.
    fn deposit(
        &self,
        house: HouseType,
        duration_hours: u32,
        template: &ItemTemplate,
        stack_count: u32,
    ) -> u64;
}

/// Reference `AuctionHouse` backed by per-house maps, standing in for the
/// host engine's auction-house mirror in the demo binary and in tests.
pub struct InMemoryAuctionHouse {
    houses: [RwLock<HashMap<Uuid, AuctionEntry>>; 3],
}

impl InMemoryAuctionHouse {
    pub fn new() -> Self {
        Self {
            houses: std::array::from_fn(|_| RwLock::new(HashMap::new())),
        }
    }

    pub fn count(&self, house: HouseType) -> usize {
        self.houses[house.index()].read().len()
    }

    /// Removes listings past their expiry, returning them so the host can
    /// settle sales. Buyouts are settled here too: a bought-out entry has
    /// its expiry forced into the past at purchase time.
    pub fn remove_expired(&self, now: DateTime<Utc>) -> Vec<AuctionEntry> {
        let mut removed = Vec::new();
        for house in &self.houses {
            let mut entries = house.write();
            let expired: Vec<Uuid> = entries
                .values()
                .filter(|e| e.expires_at <= now)
                .map(|e| e.id)
                .collect();
            for id in expired {
                if let Some(entry) = entries.remove(&id) {
                    removed.push(entry);
                }
            }
        }
        removed
    }
}

impl Default for InMemoryAuctionHouse {
    fn default() -> Self {
        Self::new()
    }
}

impl AuctionHouse for InMemoryAuctionHouse {
    fn for_each_auction(&self, house: HouseType, visit: &mut dyn FnMut(&AuctionEntry)) {
        for entry in self.houses[house.index()].read().values() {
            visit(entry);
        }
    }

    fn get_auction(&self, house: HouseType, id: Uuid) -> Option<AuctionEntry> {
        self.houses[house.index()].read().get(&id).cloned()
    }

    fn add_auction(&self, entry: AuctionEntry) {
        debug!(
            "Listing item {} x{} on {:?} (buyout {})",
            entry.item_id, entry.stack_count, entry.house, entry.buyout
        );
        self.houses[entry.house.index()].write().insert(entry.id, entry);
    }

    fn place_bid(
        &self,
        house: HouseType,
        id: Uuid,
        bidder: Option<CharacterId>,
        amount: u64,
    ) -> bool {
        let mut entries = self.houses[house.index()].write();
        let Some(entry) = entries.get_mut(&id) else {
            return false;
        };
        if amount <= entry.bid || amount < entry.start_bid {
            return false;
        }
        entry.bid = amount;
        entry.bidder = bidder;
        true
    }

    fn buyout(&self, house: HouseType, id: Uuid, bidder: Option<CharacterId>) -> bool {
        let mut entries = self.houses[house.index()].write();
        let Some(entry) = entries.get_mut(&id) else {
            return false;
        };
        if entry.buyout == 0 {
            return false;
        }
        entry.bid = entry.buyout;
        entry.bidder = bidder;
        // Settled by the next expiry sweep
        entry.expires_at = Utc::now() - chrono::Duration::seconds(1);
        true
    }

    fn expire_auction(&self, house: HouseType, id: Uuid) {
        if let Some(entry) = self.houses[house.index()].write().get_mut(&id) {
            entry.expires_at = Utc::now() - chrono::Duration::seconds(1);
        }
    }

    fn deposit(
        &self,
        house: HouseType,
        duration_hours: u32,
        template: &ItemTemplate,
        stack_count: u32,
    ) -> u64 {
        // Faction houses take 15% of vendor value per 12h period, the
        // neutral house 75%.
        let rate = match house {
            HouseType::Neutral => 75,
            _ => 15,
        };
        let periods = (duration_hours / 12).max(1) as u64;
        template.sell_price * stack_count as u64 * rate / 100 * periods
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Bonding, ItemClass};

    fn entry(house: HouseType, buyout: u64) -> AuctionEntry {
        AuctionEntry {
            id: Uuid::new_v4(),
            house,
            item_id: 1,
            stack_count: 1,
            owner: Some(42),
            bidder: None,
            start_bid: 50,
            bid: 0,
            buyout,
            deposit: 10,
            expires_at: Utc::now() + chrono::Duration::hours(12),
        }
    }

    #[test]
    fn test_add_and_enumerate_per_house() {
        let market = InMemoryAuctionHouse::new();
        market.add_auction(entry(HouseType::Alliance, 100));
        market.add_auction(entry(HouseType::Alliance, 200));
        market.add_auction(entry(HouseType::Horde, 300));

        assert_eq!(market.count(HouseType::Alliance), 2);
        assert_eq!(market.count(HouseType::Horde), 1);
        assert_eq!(market.count(HouseType::Neutral), 0);

        let mut seen = 0;
        market.for_each_auction(HouseType::Alliance, &mut |_| seen += 1);
        assert_eq!(seen, 2);
    }

    #[test]
    fn test_place_bid_rules() {
        let market = InMemoryAuctionHouse::new();
        let e = entry(HouseType::Neutral, 500);
        let id = e.id;
        market.add_auction(e);

        // Below start bid
        assert!(!market.place_bid(HouseType::Neutral, id, Some(1), 10));
        assert!(market.place_bid(HouseType::Neutral, id, Some(1), 60));
        // Must beat the standing bid
        assert!(!market.place_bid(HouseType::Neutral, id, Some(2), 60));
        assert!(market.place_bid(HouseType::Neutral, id, Some(2), 70));

        let stored = market.get_auction(HouseType::Neutral, id).unwrap();
        assert_eq!(stored.bid, 70);
        assert_eq!(stored.bidder, Some(2));
    }

    #[test]
    fn test_buyout_settles_on_sweep() {
        let market = InMemoryAuctionHouse::new();
        let e = entry(HouseType::Neutral, 500);
        let id = e.id;
        market.add_auction(e);

        assert!(market.buyout(HouseType::Neutral, id, Some(7)));
        let removed = market.remove_expired(Utc::now());
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].bid, 500);
        assert_eq!(removed[0].bidder, Some(7));
        assert_eq!(market.count(HouseType::Neutral), 0);
    }

    #[test]
    fn test_bid_only_entry_rejects_buyout() {
        let market = InMemoryAuctionHouse::new();
        let e = entry(HouseType::Horde, 0);
        let id = e.id;
        market.add_auction(e);
        assert!(!market.buyout(HouseType::Horde, id, None));
    }

    #[test]
    fn test_deposit_scales_with_house_and_duration() {
        let market = InMemoryAuctionHouse::new();
        let template = crate::types::ItemTemplate {
            id: 1,
            name: "Test".into(),
            class: ItemClass::TradeGoods,
            subclass: 0,
            quality: 1,
            item_level: 10,
            required_level: 0,
            required_skill_rank: 0,
            buy_price: 400,
            sell_price: 100,
            max_stack: 20,
            bonding: Bonding::None,
        };

        let faction = market.deposit(HouseType::Alliance, 12, &template, 1);
        let neutral = market.deposit(HouseType::Neutral, 12, &template, 1);
        assert_eq!(faction, 15);
        assert_eq!(neutral, 75);
        assert_eq!(market.deposit(HouseType::Alliance, 48, &template, 1), 60);
        assert_eq!(market.deposit(HouseType::Alliance, 12, &template, 10), 150);
    }
}
