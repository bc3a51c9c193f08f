use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of auctionable quality tiers (grey through yellow).
pub const MAX_AUCTION_QUALITY: usize = 7;

/// Number of item classes the planners partition the catalog into.
pub const ITEM_CLASS_COUNT: usize = 15;

/// One of the three marketplace partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HouseType {
    Alliance,
    Horde,
    Neutral,
}

impl HouseType {
    pub const ALL: [HouseType; 3] = [HouseType::Alliance, HouseType::Horde, HouseType::Neutral];

    pub fn index(self) -> usize {
        match self {
            HouseType::Alliance => 0,
            HouseType::Horde => 1,
            HouseType::Neutral => 2,
        }
    }
}

/// Item rarity tier, color-named like the config keys that reference it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemQuality {
    Grey,
    White,
    Green,
    Blue,
    Purple,
    Orange,
    Yellow,
}

impl ItemQuality {
    pub const ALL: [ItemQuality; MAX_AUCTION_QUALITY] = [
        ItemQuality::Grey,
        ItemQuality::White,
        ItemQuality::Green,
        ItemQuality::Blue,
        ItemQuality::Purple,
        ItemQuality::Orange,
        ItemQuality::Yellow,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Maps a raw template quality value onto a tier. Values at or beyond
    /// the auctionable range yield `None`.
    pub fn from_raw(raw: u32) -> Option<ItemQuality> {
        Self::ALL.get(raw as usize).copied()
    }
}

/// Item class partition used for pool bucketing and per-class configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemClass {
    Consumable,
    Container,
    Weapon,
    Gem,
    Armor,
    Reagent,
    Projectile,
    TradeGoods,
    Generic,
    Recipe,
    Quiver,
    Quest,
    Key,
    Miscellaneous,
    Glyph,
}

impl ItemClass {
    pub const ALL: [ItemClass; ITEM_CLASS_COUNT] = [
        ItemClass::Consumable,
        ItemClass::Container,
        ItemClass::Weapon,
        ItemClass::Gem,
        ItemClass::Armor,
        ItemClass::Reagent,
        ItemClass::Projectile,
        ItemClass::TradeGoods,
        ItemClass::Generic,
        ItemClass::Recipe,
        ItemClass::Quiver,
        ItemClass::Quest,
        ItemClass::Key,
        ItemClass::Miscellaneous,
        ItemClass::Glyph,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// How an item binds to its owner. Each kind is independently allowed or
/// rejected by the catalog filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bonding {
    #[default]
    None,
    BindOnPickup,
    BindOnEquip,
    BindOnUse,
    QuestItem,
}

/// Catalog item identifier.
pub type ItemId = u32;

/// Character identifier used for listing owners and bidders.
pub type CharacterId = u64;

/// Read-only item catalog row. Immutable for the engine's purposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemTemplate {
    pub id: ItemId,
    pub name: String,
    pub class: ItemClass,
    #[serde(default)]
    pub subclass: u32,
    /// Raw quality value; anything >= `MAX_AUCTION_QUALITY` never auctions.
    pub quality: u32,
    #[serde(default)]
    pub item_level: u32,
    #[serde(default)]
    pub required_level: u32,
    #[serde(default)]
    pub required_skill_rank: u32,
    #[serde(default)]
    pub buy_price: u64,
    #[serde(default)]
    pub sell_price: u64,
    #[serde(default = "default_max_stack")]
    pub max_stack: u32,
    #[serde(default)]
    pub bonding: Bonding,
}

fn default_max_stack() -> u32 {
    1
}

impl ItemTemplate {
    pub fn quality_tier(&self) -> Option<ItemQuality> {
        ItemQuality::from_raw(self.quality)
    }
}

/// A live marketplace listing.
///
/// Created either by the seller planner (owner drawn from the bot character
/// pool, or absent) or by the host on behalf of a player. Expiry and sale
/// settlement belong to the host; the engine only inserts, bids and buys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionEntry {
    pub id: Uuid,
    pub house: HouseType,
    pub item_id: ItemId,
    pub stack_count: u32,
    /// `None` marks an unowned (house) listing; bot characters also count
    /// as non-player owners for planning purposes.
    pub owner: Option<CharacterId>,
    pub bidder: Option<CharacterId>,
    /// Minimum first bid.
    pub start_bid: u64,
    /// Current highest bid, 0 while unbid.
    pub bid: u64,
    /// Instant-sale price, 0 when bid-only.
    pub buyout: u64,
    pub deposit: u64,
    pub expires_at: DateTime<Utc>,
}

/// Engine lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotState {
    Uninitialized,
    Initializing,
    Running,
    Reconfiguring,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_from_raw() {
        assert_eq!(ItemQuality::from_raw(0), Some(ItemQuality::Grey));
        assert_eq!(ItemQuality::from_raw(3), Some(ItemQuality::Blue));
        assert_eq!(ItemQuality::from_raw(6), Some(ItemQuality::Yellow));
        assert_eq!(ItemQuality::from_raw(7), None);
        assert_eq!(ItemQuality::from_raw(99), None);
    }

    #[test]
    fn test_indexing_matches_all_order() {
        for (i, class) in ItemClass::ALL.iter().enumerate() {
            assert_eq!(class.index(), i);
        }
        for (i, quality) in ItemQuality::ALL.iter().enumerate() {
            assert_eq!(quality.index(), i);
        }
        for (i, house) in HouseType::ALL.iter().enumerate() {
            assert_eq!(house.index(), i);
        }
    }
}
