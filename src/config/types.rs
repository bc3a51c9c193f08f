use serde::{Deserialize, Serialize};

use crate::types::{Bonding, CharacterId, HouseType, ItemClass, ItemQuality};

/// Engine configuration.
///
/// Every knob is a named field grouped into sections; planners receive a
/// `&Config` at construction and reload time rather than reading globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Seconds between orchestrator operations.
    #[serde(default = "default_update_interval_secs")]
    pub update_interval_secs: u64,

    /// Item catalog data file consumed by the demo host.
    #[serde(default = "default_items_file")]
    pub items_file: String,

    /// Characters the engine lists and bids as. Empty means listings are
    /// created unowned.
    #[serde(default)]
    pub bot_characters: Vec<CharacterId>,

    #[serde(default)]
    pub seller: SellerConfig,

    #[serde(default)]
    pub buyer: BuyerConfig,

    #[serde(default)]
    pub houses: HouseRatios,

    /// Target listing counts per quality, before house ratio scaling.
    #[serde(default = "default_amounts")]
    pub amounts: QualityTable,

    /// Per-quality price ratio, percent (100 = neutral).
    #[serde(default = "default_quality_ratios")]
    pub quality_price_ratios: QualityTable,

    #[serde(default)]
    pub filters: FilterConfig,

    #[serde(default)]
    pub classes: ClassTable,
}

impl Config {
    pub fn is_bot_character(&self, id: CharacterId) -> bool {
        self.bot_characters.contains(&id)
    }

    pub fn house_ratio(&self, house: HouseType) -> u32 {
        self.houses.get(house)
    }

    pub fn quality_amount(&self, quality: ItemQuality) -> u32 {
        self.amounts.get(quality)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            update_interval_secs: default_update_interval_secs(),
            items_file: default_items_file(),
            bot_characters: Vec::new(),
            seller: SellerConfig::default(),
            buyer: BuyerConfig::default(),
            houses: HouseRatios::default(),
            amounts: default_amounts(),
            quality_price_ratios: default_quality_ratios(),
            filters: FilterConfig::default(),
            classes: ClassTable::default(),
        }
    }
}

/// Seller planner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Listings created per serviced house per cycle.
    #[serde(default = "default_items_per_cycle_normal")]
    pub items_per_cycle_normal: u32,

    /// Larger batch used while the deficit exceeds this same value.
    #[serde(default = "default_items_per_cycle_boost")]
    pub items_per_cycle_boost: u32,

    #[serde(default = "default_min_time_hours")]
    pub min_time_hours: u32,

    #[serde(default = "default_max_time_hours")]
    pub max_time_hours: u32,

    /// Global multiplier applied to every modeled price.
    #[serde(default = "default_money_rate")]
    pub money_rate: f64,

    /// Bid price as a fraction of buyout, lower bound.
    #[serde(default = "default_bid_price_min")]
    pub bid_price_min: f64,

    /// Bid price as a fraction of buyout, upper bound.
    #[serde(default = "default_bid_price_max")]
    pub bid_price_max: f64,
}

impl SellerConfig {
    /// Lower listing duration bound in hours. Always <= `max_time`.
    pub fn min_time(&self) -> u32 {
        self.min_time_hours.min(self.max_time_hours)
    }

    /// Upper listing duration bound in hours. Always >= `min_time`.
    pub fn max_time(&self) -> u32 {
        self.min_time_hours.max(self.max_time_hours)
    }

    /// Ordered (min, max) bid fraction pair.
    pub fn bid_fraction_range(&self) -> (f64, f64) {
        let lo = self.bid_price_min.min(self.bid_price_max);
        let hi = self.bid_price_min.max(self.bid_price_max);
        (lo, hi)
    }
}

impl Default for SellerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            items_per_cycle_normal: default_items_per_cycle_normal(),
            items_per_cycle_boost: default_items_per_cycle_boost(),
            min_time_hours: default_min_time_hours(),
            max_time_hours: default_max_time_hours(),
            money_rate: default_money_rate(),
            bid_price_min: default_bid_price_min(),
            bid_price_max: default_bid_price_max(),
        }
    }
}

/// Buyer planner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyerConfig {
    #[serde(default)]
    pub alliance_enabled: bool,

    #[serde(default)]
    pub horde_enabled: bool,

    #[serde(default)]
    pub neutral_enabled: bool,

    /// Minutes before a tracked listing is evaluated again.
    #[serde(default = "default_recheck_interval_mins")]
    pub recheck_interval_mins: u32,

    /// Divisor in the chance exponent; larger means pickier buying.
    #[serde(default = "default_chance_factor")]
    pub chance_factor: f64,

    /// Per-quality chance multiplier, percent.
    #[serde(default = "default_quality_ratios")]
    pub chance_multipliers: QualityTable,
}

impl BuyerConfig {
    pub fn enabled_for(&self, house: HouseType) -> bool {
        match house {
            HouseType::Alliance => self.alliance_enabled,
            HouseType::Horde => self.horde_enabled,
            HouseType::Neutral => self.neutral_enabled,
        }
    }

    pub fn any_enabled(&self) -> bool {
        self.alliance_enabled || self.horde_enabled || self.neutral_enabled
    }

    /// Chance factor guarded against a zero divisor.
    pub fn effective_chance_factor(&self) -> f64 {
        self.chance_factor.max(0.1)
    }
}

impl Default for BuyerConfig {
    fn default() -> Self {
        Self {
            alliance_enabled: false,
            horde_enabled: false,
            neutral_enabled: false,
            recheck_interval_mins: default_recheck_interval_mins(),
            chance_factor: default_chance_factor(),
            chance_multipliers: default_quality_ratios(),
        }
    }
}

/// Per-house listing amount ratio, percent of the configured amounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseRatios {
    #[serde(default = "default_house_ratio")]
    pub alliance: u32,
    #[serde(default = "default_house_ratio")]
    pub horde: u32,
    #[serde(default = "default_house_ratio")]
    pub neutral: u32,
}

impl HouseRatios {
    pub fn get(&self, house: HouseType) -> u32 {
        match house {
            HouseType::Alliance => self.alliance,
            HouseType::Horde => self.horde,
            HouseType::Neutral => self.neutral,
        }
    }

    pub fn set(&mut self, house: HouseType, ratio: u32) {
        match house {
            HouseType::Alliance => self.alliance = ratio,
            HouseType::Horde => self.horde = ratio,
            HouseType::Neutral => self.neutral = ratio,
        }
    }
}

impl Default for HouseRatios {
    fn default() -> Self {
        Self {
            alliance: default_house_ratio(),
            horde: default_house_ratio(),
            neutral: default_house_ratio(),
        }
    }
}

/// One value per quality tier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityTable {
    #[serde(default)]
    pub grey: u32,
    #[serde(default)]
    pub white: u32,
    #[serde(default)]
    pub green: u32,
    #[serde(default)]
    pub blue: u32,
    #[serde(default)]
    pub purple: u32,
    #[serde(default)]
    pub orange: u32,
    #[serde(default)]
    pub yellow: u32,
}

impl QualityTable {
    pub fn uniform(value: u32) -> Self {
        Self {
            grey: value,
            white: value,
            green: value,
            blue: value,
            purple: value,
            orange: value,
            yellow: value,
        }
    }

    pub fn get(&self, quality: ItemQuality) -> u32 {
        match quality {
            ItemQuality::Grey => self.grey,
            ItemQuality::White => self.white,
            ItemQuality::Green => self.green,
            ItemQuality::Blue => self.blue,
            ItemQuality::Purple => self.purple,
            ItemQuality::Orange => self.orange,
            ItemQuality::Yellow => self.yellow,
        }
    }

    pub fn set(&mut self, quality: ItemQuality, value: u32) {
        match quality {
            ItemQuality::Grey => self.grey = value,
            ItemQuality::White => self.white = value,
            ItemQuality::Green => self.green = value,
            ItemQuality::Blue => self.blue = value,
            ItemQuality::Purple => self.purple = value,
            ItemQuality::Orange => self.orange = value,
            ItemQuality::Yellow => self.yellow = value,
        }
    }
}

/// Catalog filter toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Allow items sold by NPC vendors.
    #[serde(default)]
    pub vendor_items: bool,

    /// Allow items dropped as loot.
    #[serde(default = "default_true")]
    pub loot_items: bool,

    /// Allow items that are neither vendor- nor loot-sourced.
    #[serde(default)]
    pub other_items: bool,

    #[serde(default = "default_true")]
    pub bind_none: bool,
    #[serde(default)]
    pub bind_pickup: bool,
    #[serde(default = "default_true")]
    pub bind_equip: bool,
    #[serde(default = "default_true")]
    pub bind_use: bool,
    #[serde(default)]
    pub bind_quest: bool,

    /// Comma-separated item ids inserted regardless of every other filter.
    #[serde(default)]
    pub force_include: String,

    /// Comma-separated item ids never inserted.
    #[serde(default)]
    pub force_exclude: String,
}

impl FilterConfig {
    pub fn allows_bonding(&self, bonding: Bonding) -> bool {
        match bonding {
            Bonding::None => self.bind_none,
            Bonding::BindOnPickup => self.bind_pickup,
            Bonding::BindOnEquip => self.bind_equip,
            Bonding::BindOnUse => self.bind_use,
            Bonding::QuestItem => self.bind_quest,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            vendor_items: false,
            loot_items: true,
            other_items: false,
            bind_none: true,
            bind_pickup: false,
            bind_equip: true,
            bind_use: true,
            bind_quest: false,
            force_include: String::new(),
            force_exclude: String::new(),
        }
    }
}

/// Per-class seller settings and catalog filter ranges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassConfig {
    /// Weight used when splitting a quality's target across classes.
    #[serde(default)]
    pub priority: u32,

    /// Price ratio, percent (100 = neutral).
    #[serde(default = "default_ratio")]
    pub price_ratio: u32,

    /// Percent chance a listing rolls a random stack size instead of 1.
    #[serde(default = "default_ratio")]
    pub random_stack_ratio: u32,

    /// Admit items whose buy and sell prices are both zero.
    #[serde(default)]
    pub allow_zero_price: bool,

    // Range filters; 0 leaves that side unbounded.
    #[serde(default)]
    pub min_item_level: u32,
    #[serde(default)]
    pub max_item_level: u32,
    #[serde(default)]
    pub min_required_level: u32,
    #[serde(default)]
    pub max_required_level: u32,
    #[serde(default)]
    pub min_skill_rank: u32,
    #[serde(default)]
    pub max_skill_rank: u32,
}

impl ClassConfig {
    fn with_priority(priority: u32) -> Self {
        Self {
            priority,
            price_ratio: default_ratio(),
            random_stack_ratio: default_ratio(),
            allow_zero_price: false,
            min_item_level: 0,
            max_item_level: 0,
            min_required_level: 0,
            max_required_level: 0,
            min_skill_rank: 0,
            max_skill_rank: 0,
        }
    }
}

impl Default for ClassConfig {
    fn default() -> Self {
        Self::with_priority(1)
    }
}

/// One `ClassConfig` per item class, statically named.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassTable {
    #[serde(default = "default_consumable")]
    pub consumable: ClassConfig,
    #[serde(default = "default_container")]
    pub container: ClassConfig,
    #[serde(default = "default_weapon")]
    pub weapon: ClassConfig,
    #[serde(default = "default_gem")]
    pub gem: ClassConfig,
    #[serde(default = "default_armor")]
    pub armor: ClassConfig,
    #[serde(default)]
    pub reagent: ClassConfig,
    #[serde(default = "default_projectile")]
    pub projectile: ClassConfig,
    #[serde(default = "default_trade_goods")]
    pub trade_goods: ClassConfig,
    #[serde(default)]
    pub generic: ClassConfig,
    #[serde(default = "default_recipe")]
    pub recipe: ClassConfig,
    #[serde(default)]
    pub quiver: ClassConfig,
    #[serde(default)]
    pub quest: ClassConfig,
    #[serde(default)]
    pub key: ClassConfig,
    #[serde(default = "default_miscellaneous")]
    pub miscellaneous: ClassConfig,
    #[serde(default = "default_glyph")]
    pub glyph: ClassConfig,
}

impl ClassTable {
    pub fn get(&self, class: ItemClass) -> &ClassConfig {
        match class {
            ItemClass::Consumable => &self.consumable,
            ItemClass::Container => &self.container,
            ItemClass::Weapon => &self.weapon,
            ItemClass::Gem => &self.gem,
            ItemClass::Armor => &self.armor,
            ItemClass::Reagent => &self.reagent,
            ItemClass::Projectile => &self.projectile,
            ItemClass::TradeGoods => &self.trade_goods,
            ItemClass::Generic => &self.generic,
            ItemClass::Recipe => &self.recipe,
            ItemClass::Quiver => &self.quiver,
            ItemClass::Quest => &self.quest,
            ItemClass::Key => &self.key,
            ItemClass::Miscellaneous => &self.miscellaneous,
            ItemClass::Glyph => &self.glyph,
        }
    }
}

impl Default for ClassTable {
    fn default() -> Self {
        Self {
            consumable: default_consumable(),
            container: default_container(),
            weapon: default_weapon(),
            gem: default_gem(),
            armor: default_armor(),
            reagent: ClassConfig::default(),
            projectile: default_projectile(),
            trade_goods: default_trade_goods(),
            generic: ClassConfig::default(),
            recipe: default_recipe(),
            quiver: ClassConfig::default(),
            quest: ClassConfig::default(),
            key: ClassConfig::default(),
            miscellaneous: default_miscellaneous(),
            glyph: default_glyph(),
        }
    }
}

// Default values

fn default_update_interval_secs() -> u64 {
    20
}

fn default_items_file() -> String {
    "data/items.json".to_string()
}

fn default_items_per_cycle_normal() -> u32 {
    20
}

fn default_items_per_cycle_boost() -> u32 {
    75
}

fn default_min_time_hours() -> u32 {
    1
}

fn default_max_time_hours() -> u32 {
    72
}

fn default_money_rate() -> f64 {
    1.0
}

fn default_bid_price_min() -> f64 {
    0.6
}

fn default_bid_price_max() -> f64 {
    0.9
}

fn default_recheck_interval_mins() -> u32 {
    20
}

fn default_chance_factor() -> f64 {
    2.0
}

fn default_house_ratio() -> u32 {
    100
}

fn default_ratio() -> u32 {
    100
}

fn default_true() -> bool {
    true
}

fn default_amounts() -> QualityTable {
    QualityTable {
        grey: 0,
        white: 2000,
        green: 2500,
        blue: 1500,
        purple: 500,
        orange: 0,
        yellow: 0,
    }
}

fn default_quality_ratios() -> QualityTable {
    QualityTable::uniform(100)
}

fn default_consumable() -> ClassConfig {
    ClassConfig::with_priority(6)
}

fn default_container() -> ClassConfig {
    ClassConfig::with_priority(4)
}

fn default_weapon() -> ClassConfig {
    ClassConfig::with_priority(8)
}

fn default_gem() -> ClassConfig {
    ClassConfig::with_priority(3)
}

fn default_armor() -> ClassConfig {
    ClassConfig::with_priority(8)
}

fn default_projectile() -> ClassConfig {
    ClassConfig::with_priority(2)
}

fn default_trade_goods() -> ClassConfig {
    ClassConfig::with_priority(10)
}

fn default_recipe() -> ClassConfig {
    ClassConfig::with_priority(6)
}

fn default_miscellaneous() -> ClassConfig {
    ClassConfig::with_priority(5)
}

fn default_glyph() -> ClassConfig {
    ClassConfig::with_priority(3)
}
