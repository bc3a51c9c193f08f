mod pricing;

pub use pricing::vendor_value;

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, trace, warn};
use uuid::Uuid;

use crate::catalog::{ItemPool, ItemSource};
use crate::config::Config;
use crate::market::{AuctionHouse, AuctionStore};
use crate::types::{
    AuctionEntry, HouseType, ItemClass, ItemQuality, ITEM_CLASS_COUNT, MAX_AUCTION_QUALITY,
};

/// One value per (quality, class) cell.
type CellTable<T> = [[T; ITEM_CLASS_COUNT]; MAX_AUCTION_QUALITY];

/// Listing durations the seller draws from, in hours.
const AUCTION_DURATION_HOURS: [u32; 3] = [12, 24, 48];

/// Per-house planning tables.
struct HouseState {
    /// Target listing count per cell.
    targets: CellTable<u32>,
    /// `max(target - existing, 0)` per cell, refreshed by `set_stat`.
    missing: CellTable<u32>,
    /// Class x quality price ratio per cell.
    price_ratios: CellTable<f64>,
    /// Target count per quality, before class redistribution.
    quality_targets: [u32; MAX_AUCTION_QUALITY],
    /// Summed deficit from the last `set_stat`, drives boost batching.
    last_missed: u32,
}

impl HouseState {
    fn empty() -> Self {
        Self {
            targets: [[0; ITEM_CLASS_COUNT]; MAX_AUCTION_QUALITY],
            missing: [[0; ITEM_CLASS_COUNT]; MAX_AUCTION_QUALITY],
            price_ratios: [[0.0; ITEM_CLASS_COUNT]; MAX_AUCTION_QUALITY],
            quality_targets: [0; MAX_AUCTION_QUALITY],
            last_missed: 0,
        }
    }
}

/// Seller planner: keeps every house stocked up to its configured targets
/// by synthesizing listings from the item pool.
pub struct AuctionBotSeller {
    pool: ItemPool,
    houses: [HouseState; 3],
}

impl AuctionBotSeller {
    pub fn new(pool: ItemPool, config: &Config) -> Self {
        let mut seller = Self {
            pool,
            houses: [HouseState::empty(), HouseState::empty(), HouseState::empty()],
        };
        seller.load_config(config);
        seller
    }

    /// Recomputes target and price-ratio tables from the configuration.
    ///
    /// Per quality, the house-ratio-scaled amount is split across classes
    /// proportionally to their priorities; classes with an empty pool
    /// bucket always get weight 0 and therefore target 0.
    pub fn load_config(&mut self, config: &Config) {
        for house in HouseType::ALL {
            self.houses[house.index()] = Self::plan_house(&self.pool, config, house);
        }
    }

    fn plan_house(pool: &ItemPool, config: &Config, house: HouseType) -> HouseState {
        let ratio = config.house_ratio(house);
        let mut state = HouseState::empty();

        for quality in ItemQuality::ALL {
            let q = quality.index();
            let total =
                (config.quality_amount(quality) as f64 * ratio as f64 / 100.0).round() as u32;
            state.quality_targets[q] = total;

            let weight_sum: u32 = ItemClass::ALL
                .iter()
                .filter(|&&class| pool.bucket_len(quality, class) > 0)
                .map(|&class| config.classes.get(class).priority)
                .sum();

            for class in ItemClass::ALL {
                let c = class.index();
                state.price_ratios[q][c] = config.classes.get(class).price_ratio as f64
                    * config.quality_price_ratios.get(quality) as f64
                    / 10000.0;

                if weight_sum == 0 || pool.bucket_len(quality, class) == 0 {
                    continue;
                }
                let priority = config.classes.get(class).priority;
                state.targets[q][c] =
                    (total as f64 * priority as f64 / weight_sum as f64).round() as u32;
            }
        }

        state.missing = state.targets;
        state
    }

    pub fn target_count(&self, house: HouseType, quality: ItemQuality, class: ItemClass) -> u32 {
        self.houses[house.index()].targets[quality.index()][class.index()]
    }

    pub fn missing_count(&self, house: HouseType, quality: ItemQuality, class: ItemClass) -> u32 {
        self.houses[house.index()].missing[quality.index()][class.index()]
    }

    pub fn quality_target(&self, house: HouseType, quality: ItemQuality) -> u32 {
        self.houses[house.index()].quality_targets[quality.index()]
    }

    pub fn last_missed(&self, house: HouseType) -> u32 {
        self.houses[house.index()].last_missed
    }

    /// Diffs targets against the live house: counts bot-owned or unowned
    /// listings per cell and refreshes the missing-item table. Listings
    /// owned by real players never satisfy a target.
    pub fn set_stat(
        &mut self,
        config: &Config,
        source: &dyn ItemSource,
        market: &dyn AuctionHouse,
        house: HouseType,
    ) {
        let mut existing: CellTable<u32> = [[0; ITEM_CLASS_COUNT]; MAX_AUCTION_QUALITY];

        market.for_each_auction(house, &mut |entry| {
            let player_owned = entry
                .owner
                .map_or(false, |owner| !config.is_bot_character(owner));
            if player_owned {
                return;
            }
            let Some(template) = source.template(entry.item_id) else {
                return;
            };
            if let Some(quality) = template.quality_tier() {
                existing[quality.index()][template.class.index()] += 1;
            }
        });

        let state = &mut self.houses[house.index()];
        let mut total_missing = 0u32;
        for q in 0..MAX_AUCTION_QUALITY {
            for c in 0..ITEM_CLASS_COUNT {
                state.missing[q][c] = state.targets[q][c].saturating_sub(existing[q][c]);
                total_missing += state.missing[q][c];
            }
        }
        state.last_missed = total_missing;

        trace!(
            "{:?} house stock refreshed: {} listings missing",
            house,
            total_missing
        );
    }

    /// Cells that still need listings beyond what this batch already added.
    /// Selection over the result is uniform per pair, not weighted by
    /// deficit size.
    fn cells_to_sell(state: &HouseState, added: &CellTable<u32>) -> Vec<(ItemQuality, ItemClass)> {
        let mut cells = Vec::new();
        for quality in ItemQuality::ALL {
            for class in ItemClass::ALL {
                if state.missing[quality.index()][class.index()]
                    > added[quality.index()][class.index()]
                {
                    cells.push((quality, class));
                }
            }
        }
        cells
    }

    /// Creates up to one batch of listings for the house. The boost batch
    /// size applies while the previously observed deficit exceeds it.
    /// Returns the number of listings created.
    pub fn add_new_auctions(
        &mut self,
        config: &Config,
        source: &dyn ItemSource,
        market: &dyn AuctionHouse,
        store: &dyn AuctionStore,
        house: HouseType,
        now: DateTime<Utc>,
        rng: &mut impl Rng,
    ) -> u32 {
        let pool = &self.pool;
        let state = &mut self.houses[house.index()];

        let total_missing: u32 = state.missing.iter().flatten().sum();
        if total_missing == 0 {
            trace!("{:?} house fully stocked", house);
            return 0;
        }

        let batch = if state.last_missed > config.seller.items_per_cycle_boost {
            info!(
                "{:?} house is {} listings short, boosting batch to {}",
                house, state.last_missed, config.seller.items_per_cycle_boost
            );
            config.seller.items_per_cycle_boost
        } else {
            config.seller.items_per_cycle_normal
        };

        let mut added: CellTable<u32> = [[0; ITEM_CLASS_COUNT]; MAX_AUCTION_QUALITY];
        let mut created = 0u32;

        for _ in 0..batch {
            let cells = Self::cells_to_sell(state, &added);
            let Some(&(quality, class)) = cells.choose(rng) else {
                break;
            };
            let (q, c) = (quality.index(), class.index());

            let Some(&item_id) = pool.bucket(quality, class).choose(rng) else {
                // Deficit on an empty bucket violates the planning
                // invariant; drop the cell for this batch.
                warn!("{:?}/{:?} has a deficit but no pool items", quality, class);
                added[q][c] = state.missing[q][c];
                continue;
            };
            let Some(template) = source.template(item_id) else {
                warn!("Pool item {} has no template, skipping", item_id);
                continue;
            };

            let class_config = config.classes.get(class);
            let stack_count = if template.max_stack > 1
                && rng.gen_range(0u32..100) < class_config.random_stack_ratio
            {
                rng.gen_range(1..=template.max_stack)
            } else {
                1
            };

            let (buyout, bid) = pricing::compute_prices(
                &template,
                stack_count,
                state.price_ratios[q][c],
                &config.seller,
                rng,
            );

            let hours = AUCTION_DURATION_HOURS[rng.gen_range(0..AUCTION_DURATION_HOURS.len())]
                .clamp(config.seller.min_time(), config.seller.max_time());
            let owner = config.bot_characters.choose(rng).copied();
            let deposit = market.deposit(house, hours, &template, stack_count).max(1);

            let entry = AuctionEntry {
                id: Uuid::new_v4(),
                house,
                item_id,
                stack_count,
                owner,
                bidder: None,
                start_bid: bid,
                bid: 0,
                buyout,
                deposit,
                expires_at: now + Duration::hours(hours as i64),
            };

            store.insert_auction(&entry);
            market.add_auction(entry);
            added[q][c] += 1;
            created += 1;
        }

        if created > 0 {
            info!("Added {} listings to the {:?} house", created, house);
        }
        created
    }
}
