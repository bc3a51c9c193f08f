use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, trace};

use crate::buyer::AuctionBotBuyer;
use crate::catalog::{build_item_pool, CatalogError, ItemSource};
use crate::config::Config;
use crate::market::{AuctionHouse, AuctionStore};
use crate::seller::AuctionBotSeller;
use crate::types::{BotState, HouseType, ItemQuality, MAX_AUCTION_QUALITY};

/// Upper bound accepted for a house ratio, percent.
const MAX_HOUSE_RATIO: u32 = 10_000;
/// Upper bound accepted for a per-quality amount.
const MAX_QUALITY_AMOUNT: u32 = 100_000;
/// Three seller phases then three buyer phases, one house each.
const OPERATION_COUNT: u32 = 6;

/// Snapshot of the engine's footprint on one house.
#[derive(Debug, Clone)]
pub struct HouseStatus {
    pub house: HouseType,
    pub total: u32,
    pub per_quality: [u32; MAX_AUCTION_QUALITY],
}

/// The engine: owns both planners and drives them from a host-supplied
/// clock.
///
/// `update` takes `&mut self`, so a tick can never reenter; hosts drive the
/// engine from a single task and share it behind a mutex if they need to.
pub struct AuctionHouseBot {
    config: Config,
    source: Arc<dyn ItemSource>,
    market: Arc<dyn AuctionHouse>,
    store: Arc<dyn AuctionStore>,
    seller: Option<AuctionBotSeller>,
    buyer: Option<AuctionBotBuyer>,
    state: BotState,
    rng: StdRng,
    elapsed: Duration,
    operation_selector: u32,
}

impl AuctionHouseBot {
    pub fn new(
        config: Config,
        source: Arc<dyn ItemSource>,
        market: Arc<dyn AuctionHouse>,
        store: Arc<dyn AuctionStore>,
    ) -> Self {
        Self {
            config,
            source,
            market,
            store,
            seller: None,
            buyer: None,
            state: BotState::Uninitialized,
            rng: StdRng::from_entropy(),
            elapsed: Duration::ZERO,
            operation_selector: 0,
        }
    }

    pub fn state(&self) -> BotState {
        self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Builds the item pool and brings up whichever planners the
    /// configuration enables. An empty pool disables the seller and zeroes
    /// the house ratios; the buyer is unaffected.
    pub fn initialize(&mut self) {
        self.set_state(BotState::Initializing);
        self.seller = None;

        if self.config.seller.enabled {
            match build_item_pool(&self.config, self.source.as_ref()) {
                Ok(pool) => {
                    self.seller = Some(AuctionBotSeller::new(pool, &self.config));
                }
                Err(CatalogError::EmptyItemPool) => {
                    error!("Item pool is empty after filtering, disabling the seller");
                    self.config.seller.enabled = false;
                    for house in HouseType::ALL {
                        self.config.houses.set(house, 0);
                    }
                }
            }
        }

        self.buyer = if self.config.buyer.any_enabled() {
            Some(AuctionBotBuyer::new())
        } else {
            None
        };

        info!(
            "Engine ready: seller {}, buyer {}",
            if self.seller.is_some() { "on" } else { "off" },
            if self.buyer.is_some() { "on" } else { "off" }
        );
        self.set_state(BotState::Running);
    }

    /// Advances the engine clock by `diff`. Once the accumulated time
    /// crosses the configured interval, one operation runs: the selector
    /// walks seller-alliance, seller-horde, seller-neutral, then the three
    /// buyer phases, and wraps.
    pub fn update(&mut self, diff: Duration, now: DateTime<Utc>) {
        if self.state != BotState::Running {
            return;
        }
        if self.seller.is_none() && self.buyer.is_none() {
            return;
        }

        self.elapsed += diff;
        let interval = Duration::from_secs(self.config.update_interval_secs);
        if self.elapsed < interval {
            return;
        }
        self.elapsed = Duration::ZERO;

        let selector = self.operation_selector;
        self.operation_selector = (selector + 1) % OPERATION_COUNT;

        let house = HouseType::ALL[(selector % 3) as usize];
        if selector < 3 {
            self.run_seller_phase(house, now);
        } else {
            self.run_buyer_phase(house, now);
        }
    }

    fn run_seller_phase(&mut self, house: HouseType, now: DateTime<Utc>) {
        let Self {
            config,
            source,
            market,
            store,
            seller,
            rng,
            ..
        } = self;
        let Some(seller) = seller.as_mut() else {
            return;
        };
        if config.house_ratio(house) == 0 {
            trace!("{:?} house ratio is 0, seller idle", house);
            return;
        }
        seller.set_stat(config, source.as_ref(), market.as_ref(), house);
        seller.add_new_auctions(
            config,
            source.as_ref(),
            market.as_ref(),
            store.as_ref(),
            house,
            now,
            rng,
        );
    }

    fn run_buyer_phase(&mut self, house: HouseType, now: DateTime<Utc>) {
        let Self {
            config,
            source,
            market,
            store,
            buyer,
            rng,
            ..
        } = self;
        let Some(buyer) = buyer.as_mut() else {
            return;
        };
        if !config.buyer.enabled_for(house) {
            return;
        }
        buyer.buy_and_bid_items(
            config,
            source.as_ref(),
            market.as_ref(),
            store.as_ref(),
            house,
            now,
            rng,
        );
    }

    /// Sets all three house ratios at once, clamped to the accepted range,
    /// and replans the seller.
    pub fn set_items_ratio(&mut self, alliance: u32, horde: u32, neutral: u32) {
        self.set_state(BotState::Reconfiguring);
        self.config.houses.alliance = alliance.min(MAX_HOUSE_RATIO);
        self.config.houses.horde = horde.min(MAX_HOUSE_RATIO);
        self.config.houses.neutral = neutral.min(MAX_HOUSE_RATIO);
        self.replan();
        self.set_state(BotState::Running);
    }

    pub fn set_items_ratio_for_house(&mut self, house: HouseType, ratio: u32) {
        self.set_state(BotState::Reconfiguring);
        self.config.houses.set(house, ratio.min(MAX_HOUSE_RATIO));
        self.replan();
        self.set_state(BotState::Running);
    }

    /// Sets the per-quality amount table, clamped, and replans the seller.
    pub fn set_items_amount(&mut self, amounts: [u32; MAX_AUCTION_QUALITY]) {
        self.set_state(BotState::Reconfiguring);
        for quality in ItemQuality::ALL {
            self.config
                .amounts
                .set(quality, amounts[quality.index()].min(MAX_QUALITY_AMOUNT));
        }
        self.replan();
        self.set_state(BotState::Running);
    }

    pub fn set_items_amount_for_quality(&mut self, quality: ItemQuality, amount: u32) {
        self.set_state(BotState::Reconfiguring);
        self.config
            .amounts
            .set(quality, amount.min(MAX_QUALITY_AMOUNT));
        self.replan();
        self.set_state(BotState::Running);
    }

    fn replan(&mut self) {
        if let Some(seller) = &mut self.seller {
            seller.load_config(&self.config);
        }
    }

    /// Expires engine-owned listings so the host's next sweep clears them
    /// and the seller restocks from fresh prices. With `include_bid_on`
    /// false, listings a player already bid on are left to run out.
    pub fn rebuild(&mut self, include_bid_on: bool) {
        let mut expired = 0u32;
        for house in HouseType::ALL {
            let mut ids = Vec::new();
            let config = &self.config;
            self.market.for_each_auction(house, &mut |entry| {
                let player_owned = entry
                    .owner
                    .map_or(false, |owner| !config.is_bot_character(owner));
                if player_owned {
                    return;
                }
                if entry.bid == 0 || include_bid_on {
                    ids.push(entry.id);
                }
            });
            for id in ids {
                self.market.expire_auction(house, id);
                expired += 1;
            }
        }
        info!(
            "Rebuild expired {} listings ({} those with bids)",
            expired,
            if include_bid_on { "including" } else { "excluding" }
        );
    }

    /// Swaps in a new configuration and reinitializes the planners.
    pub fn reload(&mut self, config: Config) {
        info!("Reloading configuration");
        self.config = config;
        self.initialize();
    }

    /// Counts engine-owned (and unowned) listings per house and quality.
    pub fn status(&self) -> Vec<HouseStatus> {
        HouseType::ALL
            .iter()
            .map(|&house| {
                let mut per_quality = [0u32; MAX_AUCTION_QUALITY];
                let mut total = 0u32;
                let config = &self.config;
                let source = &self.source;
                self.market.for_each_auction(house, &mut |entry| {
                    let player_owned = entry
                        .owner
                        .map_or(false, |owner| !config.is_bot_character(owner));
                    if player_owned {
                        return;
                    }
                    total += 1;
                    if let Some(quality) = source
                        .template(entry.item_id)
                        .and_then(|t| t.quality_tier())
                    {
                        per_quality[quality.index()] += 1;
                    }
                });
                HouseStatus {
                    house,
                    total,
                    per_quality,
                }
            })
            .collect()
    }

    fn set_state(&mut self, state: BotState) {
        if self.state != state {
            trace!("State changed: {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticItemSource;
    use crate::market::{InMemoryAuctionHouse, LogStore};
    use crate::types::{Bonding, ItemClass, ItemTemplate};

    fn template(id: u32, class: ItemClass, quality: u32) -> ItemTemplate {
        ItemTemplate {
            id,
            name: format!("Item {id}"),
            class,
            subclass: 0,
            quality,
            item_level: 20,
            required_level: 10,
            required_skill_rank: 0,
            buy_price: 200,
            sell_price: 50,
            max_stack: 5,
            bonding: Bonding::None,
        }
    }

    fn source_with(templates: Vec<ItemTemplate>) -> Arc<StaticItemSource> {
        let ids: Vec<u32> = templates.iter().map(|t| t.id).collect();
        Arc::new(StaticItemSource::new(templates, Vec::new(), ids))
    }

    fn engine(
        config: Config,
        source: Arc<StaticItemSource>,
        market: Arc<InMemoryAuctionHouse>,
    ) -> AuctionHouseBot {
        AuctionHouseBot::new(config, source, market, Arc::new(LogStore))
    }

    fn seller_config() -> Config {
        let mut config = Config::default();
        config.seller.enabled = true;
        config.bot_characters = vec![900];
        config.update_interval_secs = 20;
        config
    }

    #[test]
    fn test_empty_pool_disables_seller_but_not_buyer() {
        let mut config = seller_config();
        config.buyer.neutral_enabled = true;
        let source = Arc::new(StaticItemSource::new(Vec::new(), Vec::new(), Vec::new()));
        let market = Arc::new(InMemoryAuctionHouse::new());

        let mut bot = engine(config, source, market);
        bot.initialize();

        assert_eq!(bot.state(), BotState::Running);
        assert!(!bot.config().seller.enabled);
        assert_eq!(bot.config().houses.alliance, 0);
        assert_eq!(bot.config().houses.horde, 0);
        assert_eq!(bot.config().houses.neutral, 0);
        assert!(bot.buyer.is_some());
        assert!(bot.seller.is_none());
    }

    #[test]
    fn test_full_cycle_services_every_house() {
        let mut config = seller_config();
        config.amounts = crate::config::QualityTable::uniform(0);
        config.amounts.green = 12;
        config.seller.items_per_cycle_normal = 12;
        let source = source_with(vec![template(1, ItemClass::Armor, 2)]);
        let market = Arc::new(InMemoryAuctionHouse::new());

        let mut bot = engine(config, source, market.clone());
        bot.initialize();

        // Six operations: three seller phases stock the houses, three
        // buyer phases are idle (buyer disabled)
        let tick = Duration::from_secs(20);
        for _ in 0..6 {
            bot.update(tick, Utc::now());
        }

        for house in HouseType::ALL {
            assert_eq!(market.count(house), 12, "{house:?} not stocked");
        }
    }

    #[test]
    fn test_accumulator_gates_operations() {
        let mut config = seller_config();
        config.amounts = crate::config::QualityTable::uniform(0);
        config.amounts.green = 5;
        let source = source_with(vec![template(1, ItemClass::Armor, 2)]);
        let market = Arc::new(InMemoryAuctionHouse::new());

        let mut bot = engine(config, source, market.clone());
        bot.initialize();

        // 15s accumulated: below the 20s interval, nothing happens
        bot.update(Duration::from_secs(15), Utc::now());
        assert_eq!(market.count(HouseType::Alliance), 0);

        // Crossing the interval runs exactly one operation
        bot.update(Duration::from_secs(5), Utc::now());
        assert_eq!(market.count(HouseType::Alliance), 5);
        assert_eq!(market.count(HouseType::Horde), 0);
    }

    #[test]
    fn test_uninitialized_engine_ignores_updates() {
        let config = seller_config();
        let source = source_with(vec![template(1, ItemClass::Armor, 2)]);
        let market = Arc::new(InMemoryAuctionHouse::new());

        let mut bot = engine(config, source, market.clone());
        assert_eq!(bot.state(), BotState::Uninitialized);
        bot.update(Duration::from_secs(60), Utc::now());
        assert_eq!(market.count(HouseType::Alliance), 0);
    }

    #[test]
    fn test_admin_clamps_and_replans() {
        let mut config = seller_config();
        config.amounts = crate::config::QualityTable::uniform(0);
        config.amounts.green = 10;
        let source = source_with(vec![template(1, ItemClass::Armor, 2)]);
        let market = Arc::new(InMemoryAuctionHouse::new());

        let mut bot = engine(config, source, market);
        bot.initialize();

        bot.set_items_ratio(20_000, 300, 100);
        assert_eq!(bot.config().houses.alliance, MAX_HOUSE_RATIO);
        assert_eq!(bot.config().houses.horde, 300);

        bot.set_items_amount_for_quality(ItemQuality::Green, 500_000);
        assert_eq!(
            bot.config().amounts.green,
            MAX_QUALITY_AMOUNT,
            "amount clamped"
        );
        // The seller replans from the clamped values
        let seller = bot.seller.as_ref().unwrap();
        assert_eq!(
            seller.quality_target(HouseType::Horde, ItemQuality::Green),
            MAX_QUALITY_AMOUNT * 3
        );
        assert_eq!(bot.state(), BotState::Running);
    }

    #[test]
    fn test_rebuild_expires_engine_listings_only() {
        let mut config = seller_config();
        config.amounts = crate::config::QualityTable::uniform(0);
        config.amounts.green = 8;
        config.seller.items_per_cycle_normal = 8;
        let source = source_with(vec![template(1, ItemClass::Armor, 2)]);
        let market = Arc::new(InMemoryAuctionHouse::new());

        let mut bot = engine(config, source, market.clone());
        bot.initialize();
        bot.update(Duration::from_secs(20), Utc::now());
        assert_eq!(market.count(HouseType::Alliance), 8);

        // A player listing must survive the rebuild
        market.add_auction(crate::types::AuctionEntry {
            id: uuid::Uuid::new_v4(),
            house: HouseType::Alliance,
            item_id: 1,
            stack_count: 1,
            owner: Some(12345),
            bidder: None,
            start_bid: 10,
            bid: 0,
            buyout: 100,
            deposit: 1,
            expires_at: Utc::now() + chrono::Duration::hours(12),
        });

        bot.rebuild(true);
        market.remove_expired(Utc::now());
        assert_eq!(market.count(HouseType::Alliance), 1);
    }

    #[test]
    fn test_status_counts_per_quality() {
        let mut config = seller_config();
        config.amounts = crate::config::QualityTable::uniform(0);
        config.amounts.blue = 3;
        config.seller.items_per_cycle_normal = 3;
        let source = source_with(vec![template(1, ItemClass::Weapon, 3)]);
        let market = Arc::new(InMemoryAuctionHouse::new());

        let mut bot = engine(config, source, market);
        bot.initialize();
        bot.update(Duration::from_secs(20), Utc::now());

        let status = bot.status();
        let alliance = status
            .iter()
            .find(|s| s.house == HouseType::Alliance)
            .unwrap();
        assert_eq!(alliance.total, 3);
        assert_eq!(alliance.per_quality[ItemQuality::Blue.index()], 3);
        assert_eq!(alliance.per_quality[ItemQuality::Green.index()], 0);
    }
}
