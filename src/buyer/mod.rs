use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, trace};
use uuid::Uuid;

use crate::catalog::ItemSource;
use crate::config::Config;
use crate::market::{AuctionHouse, AuctionStore};
use crate::seller::vendor_value;
use crate::types::{
    AuctionEntry, HouseType, ItemId, ItemQuality, ItemTemplate, MAX_AUCTION_QUALITY,
};

/// Fair per-unit price per quality for items with no vendor value at all.
const FALLBACK_VENDOR_PRICE: [u64; MAX_AUCTION_QUALITY] =
    [50, 150, 500, 1500, 5000, 15000, 50000];

/// Per-item-id aggregate over the tracked listings, rebuilt every cycle.
/// Bid-only listings feed the bid side, buyout-capable ones the buy side.
#[derive(Debug, Default, Clone)]
struct ItemStats {
    bid_count: u32,
    buy_count: u32,
    min_bid_price: u64,
    min_buy_price: u64,
    total_bid_price: f64,
    total_buy_price: f64,
}

/// A live player listing under bid/buy consideration.
struct TrackedEntry {
    /// When the listing was last evaluated. Set to the first-seen time on
    /// entry, so a fresh listing waits one recheck interval.
    last_checked: DateTime<Utc>,
    /// Last scan that saw the listing; entries that stop appearing were
    /// sold, cancelled or expired and are dropped.
    last_seen: DateTime<Utc>,
}

struct HouseState {
    item_stats: HashMap<ItemId, ItemStats>,
    tracked: HashMap<Uuid, TrackedEntry>,
}

impl HouseState {
    fn new() -> Self {
        Self {
            item_stats: HashMap::new(),
            tracked: HashMap::new(),
        }
    }
}

/// Buyer planner: simulates demand by bidding on and buying out
/// player-originated listings. Never acts on bot-owned listings.
pub struct AuctionBotBuyer {
    houses: [HouseState; 3],
}

impl AuctionBotBuyer {
    pub fn new() -> Self {
        Self {
            houses: [HouseState::new(), HouseState::new(), HouseState::new()],
        }
    }

    pub fn tracked_count(&self, house: HouseType) -> usize {
        self.houses[house.index()].tracked.len()
    }

    /// One buyer pass over a house: refresh the eligibility set, rebuild
    /// the per-item aggregates, then roll and act on due listings.
    /// Returns the number of bids and buyouts placed.
    pub fn buy_and_bid_items(
        &mut self,
        config: &Config,
        source: &dyn ItemSource,
        market: &dyn AuctionHouse,
        store: &dyn AuctionStore,
        house: HouseType,
        now: DateTime<Utc>,
        rng: &mut impl Rng,
    ) -> u32 {
        let tracked = self.prepare_list_of_entry(config, market, house, now);
        if tracked == 0 {
            trace!("No player listings on the {:?} house", house);
            return 0;
        }
        self.collect_item_stats(source, market, house);

        let recheck = Duration::minutes(config.buyer.recheck_interval_mins as i64);
        let state = &mut self.houses[house.index()];

        let due: Vec<Uuid> = state
            .tracked
            .iter()
            .filter(|(_, t)| now - t.last_checked >= recheck)
            .map(|(&id, _)| id)
            .collect();

        let mut actions = 0u32;
        for id in due {
            let Some(entry) = market.get_auction(house, id) else {
                continue;
            };
            if let Some(t) = state.tracked.get_mut(&id) {
                t.last_checked = now;
            }
            let Some(template) = source.template(entry.item_id) else {
                // Deleted or corrupt item record
                debug!("Auction {} references unknown item {}", id, entry.item_id);
                continue;
            };
            let stats = state.item_stats.get(&entry.item_id).cloned();
            let bidder = config.bot_characters.choose(rng).copied();

            if entry.buyout > 0 && Self::roll_buy_chance(stats.as_ref(), &template, &entry, config, rng)
            {
                if market.buyout(house, id, bidder) {
                    store.update_bid(id, bidder, entry.buyout);
                    info!(
                        "Bought out {} x{} for {}",
                        template.name, entry.stack_count, entry.buyout
                    );
                    state.tracked.remove(&id);
                    actions += 1;
                }
                continue;
            }

            let next_bid = if entry.bid > 0 {
                entry.bid + minimal_outbid(entry.bid)
            } else {
                entry.start_bid.max(1)
            };

            if Self::roll_bid_chance(stats.as_ref(), &template, &entry, next_bid, config, rng) {
                if entry.buyout > 0 && next_bid >= entry.buyout {
                    // The next bid meets the buyout; take it outright
                    if market.buyout(house, id, bidder) {
                        store.update_bid(id, bidder, entry.buyout);
                        state.tracked.remove(&id);
                        actions += 1;
                    }
                } else if market.place_bid(house, id, bidder, next_bid) {
                    store.update_bid(id, bidder, next_bid);
                    debug!("Bid {} on {} x{}", next_bid, template.name, entry.stack_count);
                    actions += 1;
                }
            }
        }

        if actions > 0 {
            info!("Buyer placed {} orders on the {:?} house", actions, house);
        }
        actions
    }

    /// Refreshes the eligibility set from the live house. New player
    /// listings enter with no check timestamp; listings absent from this
    /// scan are dropped for good.
    fn prepare_list_of_entry(
        &mut self,
        config: &Config,
        market: &dyn AuctionHouse,
        house: HouseType,
        now: DateTime<Utc>,
    ) -> usize {
        let state = &mut self.houses[house.index()];

        market.for_each_auction(house, &mut |entry| {
            let player_owned = entry
                .owner
                .map_or(false, |owner| !config.is_bot_character(owner));
            if !player_owned {
                return;
            }
            let tracked = state.tracked.entry(entry.id).or_insert(TrackedEntry {
                last_checked: now,
                last_seen: now,
            });
            tracked.last_seen = now;
        });

        let before = state.tracked.len();
        state.tracked.retain(|_, t| t.last_seen >= now);
        let vanished = before - state.tracked.len();
        if vanished > 0 {
            debug!(
                "{} tracked listings vanished from the {:?} house (sold or expired)",
                vanished, house
            );
        }
        state.tracked.len()
    }

    /// Rebuilds per-item price aggregates over the tracked listings.
    fn collect_item_stats(
        &mut self,
        source: &dyn ItemSource,
        market: &dyn AuctionHouse,
        house: HouseType,
    ) {
        let state = &mut self.houses[house.index()];
        state.item_stats.clear();

        let ids: Vec<Uuid> = state.tracked.keys().copied().collect();
        for id in ids {
            let Some(entry) = market.get_auction(house, id) else {
                continue;
            };
            if source.template(entry.item_id).is_none() {
                continue;
            }
            let stack = entry.stack_count.max(1) as u64;
            let stats = state.item_stats.entry(entry.item_id).or_default();

            if entry.buyout > 0 {
                let unit_buy = entry.buyout / stack;
                stats.buy_count += 1;
                stats.total_buy_price += unit_buy as f64;
                stats.min_buy_price = if stats.buy_count == 1 {
                    unit_buy
                } else {
                    stats.min_buy_price.min(unit_buy)
                };
            } else {
                let unit_bid = entry.start_bid / stack;
                stats.bid_count += 1;
                stats.total_bid_price += unit_bid as f64;
                stats.min_bid_price = if stats.bid_count == 1 {
                    unit_bid
                } else {
                    stats.min_bid_price.min(unit_bid)
                };
            }
        }
    }

    fn roll_buy_chance(
        stats: Option<&ItemStats>,
        template: &ItemTemplate,
        entry: &AuctionEntry,
        config: &Config,
        rng: &mut impl Rng,
    ) -> bool {
        if entry.buyout == 0 {
            return false;
        }
        let unit_price = entry.buyout as f64 / entry.stack_count.max(1) as f64;
        let mut chance = base_chance(unit_price, template, config);

        // A listing someone already bid on is much less attractive
        if entry.bidder.is_some() {
            chance /= 5.0;
        }

        if let Some(stats) = stats {
            if stats.buy_count > 5 {
                let avg = stats.total_buy_price / stats.buy_count as f64;
                if avg > 0.0 {
                    chance *= 1.0 / (unit_price / avg).sqrt();
                }
            }
        }

        chance *= quality_multiplier(template, config);
        let roll = rng.gen_range(0.0..100.0);
        trace!(
            "Buy roll for {}: chance {:.3} roll {:.3}",
            template.name,
            chance,
            roll
        );
        roll < chance
    }

    fn roll_bid_chance(
        stats: Option<&ItemStats>,
        template: &ItemTemplate,
        entry: &AuctionEntry,
        bid_price: u64,
        config: &Config,
        rng: &mut impl Rng,
    ) -> bool {
        let unit_price = bid_price as f64 / entry.stack_count.max(1) as f64;
        let mut chance = base_chance(unit_price, template, config);

        if entry.bidder.is_some() {
            chance /= 3.0;
        }

        if let Some(stats) = stats {
            if stats.bid_count > 5 {
                let avg = stats.total_bid_price / stats.bid_count as f64;
                if avg > 0.0 {
                    chance *= 1.0 / (unit_price / avg).sqrt();
                }
            }
        }

        chance *= quality_multiplier(template, config);
        let roll = rng.gen_range(0.0..100.0);
        trace!(
            "Bid roll for {}: chance {:.3} roll {:.3}",
            template.name,
            chance,
            roll
        );
        roll < chance
    }
}

impl Default for AuctionBotBuyer {
    fn default() -> Self {
        Self::new()
    }
}

/// Chance in [0, 100] of acting on a listing priced `unit_price` per item.
/// At or below the fair price the chance saturates; above it, it decays
/// exponentially, tempered by the configured chance factor.
fn base_chance(unit_price: f64, template: &ItemTemplate, config: &Config) -> f64 {
    // The house cut sits on top of the fair price; without the margin a
    // listing at exactly vendor value would never trade
    let fair = fair_unit_price(template) * 1.4;
    let exponent = 1.0 + (1.0 - unit_price / fair) / config.buyer.effective_chance_factor();
    100f64.min(100f64.powf(exponent))
}

fn fair_unit_price(template: &ItemTemplate) -> f64 {
    let vendor = vendor_value(template);
    if vendor > 0 {
        return vendor as f64;
    }
    let quality = template.quality_tier().unwrap_or(ItemQuality::Grey);
    FALLBACK_VENDOR_PRICE[quality.index()] as f64
}

fn quality_multiplier(template: &ItemTemplate, config: &Config) -> f64 {
    let quality = template.quality_tier().unwrap_or(ItemQuality::Grey);
    config.buyer.chance_multipliers.get(quality) as f64 / 100.0
}

/// Minimum increment over the standing bid, 5% floored at 1.
fn minimal_outbid(bid: u64) -> u64 {
    (bid * 5 / 100).max(1)
}
