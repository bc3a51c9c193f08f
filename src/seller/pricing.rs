use rand::Rng;

use crate::config::SellerConfig;
use crate::types::{ItemClass, ItemTemplate};

/// Models buyout and bid prices for a stack of the given item.
///
/// Templates without a catalog buy price get one derived from the sell
/// price, or failing that from item level and quality. The base price is
/// scaled by the (class x quality) ratio and the global money rate, spread
/// by +/-4%, and floored at 1. The bid is a random fraction of the buyout,
/// floored at 1 and never above it.
pub fn compute_prices(
    template: &ItemTemplate,
    stack_count: u32,
    price_ratio: f64,
    seller: &SellerConfig,
    rng: &mut impl Rng,
) -> (u64, u64) {
    let mut buy_price = template.buy_price as f64;

    if buy_price <= 0.0 {
        if template.sell_price > 0 {
            buy_price = template.sell_price as f64 * sell_modifier(template.class) as f64;
        } else {
            let divisor = match template.class {
                ItemClass::Weapon | ItemClass::Armor => 284.0,
                _ => 80.0,
            };
            let level = template.item_level.max(1) as f64;
            let quality = template.quality.max(1) as f64;
            buy_price = level * quality * buy_modifier(template) * level / divisor;
        }
    }

    let stack_divisor = if template.class == ItemClass::Projectile {
        // Projectiles are priced per 200 regardless of stack limits
        200.0
    } else {
        template.max_stack.max(1) as f64
    };

    let mut base = buy_price * stack_count as f64 / stack_divisor;
    base *= price_ratio * seller.money_rate;

    let spread = base * 0.04;
    let buyout = rng
        .gen_range(base - spread..=base + spread)
        .round()
        .max(1.0) as u64;

    let (lo, hi) = seller.bid_fraction_range();
    let fraction = rng.gen_range(lo..=hi);
    let bid = (((buyout as f64) * fraction).round().max(1.0) as u64).min(buyout);

    (buyout, bid)
}

/// Vendor value of one unit, back-deriving a sell price when the catalog
/// has none. Used by the buyer as the fair-price anchor.
pub fn vendor_value(template: &ItemTemplate) -> u64 {
    if template.sell_price > 0 {
        return template.sell_price;
    }
    if template.buy_price > 10 {
        template.buy_price / 4
    } else {
        template.buy_price
    }
}

/// Multiplier from sell price up to a synthetic buy price.
fn sell_modifier(class: ItemClass) -> u32 {
    match class {
        ItemClass::Weapon | ItemClass::Armor | ItemClass::Reagent | ItemClass::Projectile => 5,
        _ => 4,
    }
}

/// Base modifier for level/quality derived prices, by class and subclass.
fn buy_modifier(template: &ItemTemplate) -> f64 {
    match template.class {
        ItemClass::Consumable => match template.subclass {
            1 => 1.0,  // potions
            2 => 1.2,  // elixirs
            3 => 1.5,  // flasks
            5 => 0.5,  // food
            _ => 0.8,
        },
        ItemClass::Weapon => match template.subclass {
            20 => 0.2, // fishing poles
            _ => 1.5,
        },
        ItemClass::Gem => 2.0,
        ItemClass::Armor => match template.subclass {
            1 => 0.8, // cloth
            2 => 1.0, // leather
            3 => 1.2, // mail
            4 => 1.4, // plate
            6 => 1.3, // shields
            _ => 0.6,
        },
        ItemClass::Projectile => 0.5,
        ItemClass::TradeGoods => match template.subclass {
            7 => 1.5,  // metal and stone
            9 => 1.2,  // herbs
            10 => 1.8, // elemental
            _ => 1.0,
        },
        ItemClass::Recipe => 1.5,
        ItemClass::Glyph => 1.8,
        _ => 1.0,
    }
}
