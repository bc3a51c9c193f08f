use std::collections::HashSet;

use tracing::{debug, info};

use super::{parse_id_list, CatalogError, ItemPool, ItemSource};
use crate::config::Config;
use crate::types::{ItemId, ItemQuality, ItemTemplate};

/// Builds the item pool from the full catalog, applying the configured
/// exclusion and eligibility rules.
///
/// Forced-include items bypass every filter. An entirely empty result is a
/// startup failure; single empty buckets are not.
pub fn build_item_pool(
    config: &Config,
    source: &dyn ItemSource,
) -> Result<ItemPool, CatalogError> {
    let include = parse_id_list(&config.filters.force_include);
    let exclude = parse_id_list(&config.filters.force_exclude);

    let mut vendor_items: HashSet<ItemId> = HashSet::new();
    source.each_vendor_item(&mut |id| {
        vendor_items.insert(id);
    });

    let mut loot_items: HashSet<ItemId> = HashSet::new();
    source.each_loot_item(&mut |id| {
        loot_items.insert(id);
    });

    let mut pool = ItemPool::new();
    let mut rejected = 0usize;

    source.each_template(&mut |template| {
        if exclude.contains(&template.id) {
            rejected += 1;
            return;
        }

        let forced = include.contains(&template.id);
        if !forced && !passes_filters(config, template, &vendor_items, &loot_items) {
            rejected += 1;
            return;
        }

        // Items beyond the auctionable quality range have no bucket to
        // live in, forced or not.
        let Some(quality) = template.quality_tier() else {
            rejected += 1;
            return;
        };

        pool.insert(quality, template.class, template.id);
    });

    if pool.is_empty() {
        return Err(CatalogError::EmptyItemPool);
    }

    let counts = pool.quality_counts();
    for (i, quality) in ItemQuality::ALL.iter().enumerate() {
        debug!("Item pool {:?}: {} items", quality, counts[i]);
    }
    info!(
        "Item pool built: {} eligible items, {} rejected",
        pool.total(),
        rejected
    );

    Ok(pool)
}

fn passes_filters(
    config: &Config,
    template: &ItemTemplate,
    vendor_items: &HashSet<ItemId>,
    loot_items: &HashSet<ItemId>,
) -> bool {
    if template.quality_tier().is_none() {
        return false;
    }

    if !config.filters.allows_bonding(template.bonding) {
        return false;
    }

    let class_config = config.classes.get(template.class);

    if template.buy_price == 0 && template.sell_price == 0 && !class_config.allow_zero_price {
        return false;
    }

    let is_vendor = vendor_items.contains(&template.id);
    let is_loot = loot_items.contains(&template.id);

    if !is_vendor && !is_loot && !config.filters.other_items {
        return false;
    }
    if is_vendor && !config.filters.vendor_items {
        return false;
    }
    if is_loot && !config.filters.loot_items {
        return false;
    }

    in_range(
        template.item_level,
        class_config.min_item_level,
        class_config.max_item_level,
    ) && in_range(
        template.required_level,
        class_config.min_required_level,
        class_config.max_required_level,
    ) && in_range(
        template.required_skill_rank,
        class_config.min_skill_rank,
        class_config.max_skill_rank,
    )
}

/// Inclusive range check where a bound of 0 leaves that side open.
fn in_range(value: u32, min: u32, max: u32) -> bool {
    if min != 0 && value < min {
        return false;
    }
    if max != 0 && value > max {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticItemSource;
    use crate::types::{Bonding, ItemClass};

    fn template(id: ItemId, class: ItemClass, quality: u32) -> ItemTemplate {
        ItemTemplate {
            id,
            name: format!("Item {id}"),
            class,
            subclass: 0,
            quality,
            item_level: 20,
            required_level: 10,
            required_skill_rank: 0,
            buy_price: 500,
            sell_price: 125,
            max_stack: 5,
            bonding: Bonding::None,
        }
    }

    fn lootable_source(templates: Vec<ItemTemplate>) -> StaticItemSource {
        let ids: Vec<ItemId> = templates.iter().map(|t| t.id).collect();
        StaticItemSource::new(templates, Vec::new(), ids)
    }

    #[test]
    fn test_basic_bucketing() {
        let source = lootable_source(vec![
            template(1, ItemClass::Weapon, 2),
            template(2, ItemClass::Weapon, 2),
            template(3, ItemClass::Armor, 3),
        ]);
        let pool = build_item_pool(&Config::default(), &source).unwrap();

        assert_eq!(pool.bucket_len(ItemQuality::Green, ItemClass::Weapon), 2);
        assert_eq!(pool.bucket_len(ItemQuality::Blue, ItemClass::Armor), 1);
        assert_eq!(pool.total(), 3);
    }

    #[test]
    fn test_empty_pool_is_hard_failure() {
        let source = StaticItemSource::new(Vec::new(), Vec::new(), Vec::new());
        assert!(matches!(
            build_item_pool(&Config::default(), &source),
            Err(CatalogError::EmptyItemPool)
        ));
    }

    #[test]
    fn test_quality_cutoff() {
        let mut beyond = template(1, ItemClass::Weapon, 7);
        beyond.name = "Heirloom".into();
        let source = lootable_source(vec![beyond, template(2, ItemClass::Weapon, 2)]);
        let pool = build_item_pool(&Config::default(), &source).unwrap();
        assert_eq!(pool.total(), 1);
    }

    #[test]
    fn test_bonding_rejection() {
        let mut bound = template(1, ItemClass::Armor, 2);
        bound.bonding = Bonding::BindOnPickup;
        let source = lootable_source(vec![bound, template(2, ItemClass::Armor, 2)]);
        let pool = build_item_pool(&Config::default(), &source).unwrap();
        assert_eq!(pool.total(), 1);
        assert_eq!(pool.bucket(ItemQuality::Green, ItemClass::Armor), &[2]);
    }

    #[test]
    fn test_zero_price_needs_class_flag() {
        let mut free = template(1, ItemClass::Quest, 1);
        free.buy_price = 0;
        free.sell_price = 0;
        let source = lootable_source(vec![free, template(2, ItemClass::Armor, 2)]);

        let mut config = Config::default();
        assert_eq!(
            build_item_pool(&config, &source).unwrap().total(),
            1,
            "zero-priced item rejected by default"
        );

        config.classes.quest.allow_zero_price = true;
        assert_eq!(build_item_pool(&config, &source).unwrap().total(), 2);
    }

    #[test]
    fn test_source_membership_modes() {
        let vendor = template(1, ItemClass::TradeGoods, 1);
        let loot = template(2, ItemClass::TradeGoods, 1);
        let neither = template(3, ItemClass::TradeGoods, 1);
        let source = StaticItemSource::new(vec![vendor, loot, neither], vec![1], vec![2]);

        // Defaults: loot only
        let pool = build_item_pool(&Config::default(), &source).unwrap();
        assert_eq!(pool.bucket(ItemQuality::White, ItemClass::TradeGoods), &[2]);

        let mut config = Config::default();
        config.filters.vendor_items = true;
        config.filters.loot_items = false;
        config.filters.other_items = true;
        let pool = build_item_pool(&config, &source).unwrap();
        let mut bucket: Vec<_> = pool
            .bucket(ItemQuality::White, ItemClass::TradeGoods)
            .to_vec();
        bucket.sort_unstable();
        assert_eq!(bucket, vec![1, 3]);
    }

    #[test]
    fn test_level_range_filters() {
        let mut low = template(1, ItemClass::Weapon, 2);
        low.item_level = 5;
        let mut high = template(2, ItemClass::Weapon, 2);
        high.item_level = 70;
        let source = lootable_source(vec![low, high, template(3, ItemClass::Weapon, 2)]);

        let mut config = Config::default();
        config.classes.weapon.min_item_level = 10;
        config.classes.weapon.max_item_level = 60;
        let pool = build_item_pool(&config, &source).unwrap();
        assert_eq!(pool.bucket(ItemQuality::Green, ItemClass::Weapon), &[3]);
    }

    #[test]
    fn test_forced_include_bypasses_everything() {
        // Fails zero-price, bonding and source filters at once
        let mut contraband = template(1, ItemClass::Quest, 1);
        contraband.buy_price = 0;
        contraband.sell_price = 0;
        contraband.bonding = Bonding::QuestItem;
        let source = StaticItemSource::new(
            vec![contraband, template(2, ItemClass::Armor, 2)],
            Vec::new(),
            vec![2],
        );

        let mut config = Config::default();
        config.filters.force_include = "1".to_string();
        let pool = build_item_pool(&config, &source).unwrap();
        assert_eq!(pool.bucket(ItemQuality::White, ItemClass::Quest), &[1]);
    }

    #[test]
    fn test_forced_exclude_wins() {
        let source = lootable_source(vec![
            template(1, ItemClass::Armor, 2),
            template(2, ItemClass::Armor, 2),
        ]);
        let mut config = Config::default();
        config.filters.force_exclude = "1".to_string();
        // Exclude beats include
        config.filters.force_include = "1".to_string();
        let pool = build_item_pool(&config, &source).unwrap();
        assert_eq!(pool.bucket(ItemQuality::Green, ItemClass::Armor), &[2]);
    }
}
