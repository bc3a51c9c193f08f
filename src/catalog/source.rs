use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{ItemId, ItemTemplate};

/// Read-only access to the host's item, vendor and loot catalogs.
pub trait ItemSource: Send + Sync {
    fn each_template(&self, visit: &mut dyn FnMut(&ItemTemplate));

    fn template(&self, id: ItemId) -> Option<ItemTemplate>;

    /// Items sold by any NPC vendor.
    fn each_vendor_item(&self, visit: &mut dyn FnMut(ItemId));

    /// Items referenced by any loot template.
    fn each_loot_item(&self, visit: &mut dyn FnMut(ItemId));
}

/// On-disk catalog layout consumed by [`StaticItemSource::from_json_file`].
#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    templates: Vec<ItemTemplate>,
    #[serde(default)]
    vendor_items: Vec<ItemId>,
    #[serde(default)]
    loot_items: Vec<ItemId>,
}

/// In-memory `ItemSource` built from plain collections. The demo host loads
/// one from JSON; tests construct them directly.
pub struct StaticItemSource {
    templates: HashMap<ItemId, ItemTemplate>,
    vendor_items: HashSet<ItemId>,
    loot_items: HashSet<ItemId>,
}

impl StaticItemSource {
    pub fn new(
        templates: Vec<ItemTemplate>,
        vendor_items: Vec<ItemId>,
        loot_items: Vec<ItemId>,
    ) -> Self {
        Self {
            templates: templates.into_iter().map(|t| (t.id, t)).collect(),
            vendor_items: vendor_items.into_iter().collect(),
            loot_items: loot_items.into_iter().collect(),
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read item catalog {:?}", path))?;

        let file: CatalogFile =
            serde_json::from_str(&contents).context("Failed to parse item catalog")?;

        info!(
            "Loaded item catalog from {:?}: {} templates, {} vendor items, {} loot items",
            path,
            file.templates.len(),
            file.vendor_items.len(),
            file.loot_items.len()
        );

        Ok(Self::new(file.templates, file.vendor_items, file.loot_items))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl ItemSource for StaticItemSource {
    fn each_template(&self, visit: &mut dyn FnMut(&ItemTemplate)) {
        for template in self.templates.values() {
            visit(template);
        }
    }

    fn template(&self, id: ItemId) -> Option<ItemTemplate> {
        self.templates.get(&id).cloned()
    }

    fn each_vendor_item(&self, visit: &mut dyn FnMut(ItemId)) {
        for &id in &self.vendor_items {
            visit(id);
        }
    }

    fn each_loot_item(&self, visit: &mut dyn FnMut(ItemId)) {
        for &id in &self.loot_items {
            visit(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemClass;

    fn template(id: ItemId) -> ItemTemplate {
        ItemTemplate {
            id,
            name: format!("Item {id}"),
            class: ItemClass::TradeGoods,
            subclass: 0,
            quality: 1,
            item_level: 10,
            required_level: 0,
            required_skill_rank: 0,
            buy_price: 100,
            sell_price: 25,
            max_stack: 20,
            bonding: Default::default(),
        }
    }

    #[test]
    fn test_static_source_lookup() {
        let source = StaticItemSource::new(vec![template(1), template(2)], vec![1], vec![2]);

        assert_eq!(source.len(), 2);
        assert_eq!(source.template(1).unwrap().id, 1);
        assert!(source.template(3).is_none());

        let mut vendor = Vec::new();
        source.each_vendor_item(&mut |id| vendor.push(id));
        assert_eq!(vendor, vec![1]);
    }

    #[test]
    fn test_catalog_file_parse() {
        let json = r#"{
            "templates": [
                {"id": 5, "name": "Linen Cloth", "class": "trade_goods", "quality": 1,
                 "buy_price": 13, "sell_price": 3, "max_stack": 20}
            ],
            "loot_items": [5]
        }"#;
        let file: CatalogFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.templates.len(), 1);
        assert_eq!(file.templates[0].class, ItemClass::TradeGoods);
        assert_eq!(file.templates[0].max_stack, 20);
        assert!(file.vendor_items.is_empty());
    }
}
