use crate::types::{ItemClass, ItemId, ItemQuality, ITEM_CLASS_COUNT, MAX_AUCTION_QUALITY};

/// Quality x class partitioned pool of auctionable item ids, built once at
/// startup by the catalog filter.
///
/// An id lives in at most one bucket. Buckets may be empty; every downstream
/// quantity computed for an empty bucket is zero.
pub struct ItemPool {
    buckets: [[Vec<ItemId>; ITEM_CLASS_COUNT]; MAX_AUCTION_QUALITY],
}

impl ItemPool {
    pub fn new() -> Self {
        Self {
            buckets: std::array::from_fn(|_| std::array::from_fn(|_| Vec::new())),
        }
    }

    pub fn insert(&mut self, quality: ItemQuality, class: ItemClass, id: ItemId) {
        self.buckets[quality.index()][class.index()].push(id);
    }

    pub fn bucket(&self, quality: ItemQuality, class: ItemClass) -> &[ItemId] {
        &self.buckets[quality.index()][class.index()]
    }

    pub fn bucket_len(&self, quality: ItemQuality, class: ItemClass) -> usize {
        self.bucket(quality, class).len()
    }

    pub fn total(&self) -> usize {
        self.buckets
            .iter()
            .flat_map(|row| row.iter())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Item count per quality tier, for startup summaries and status output.
    pub fn quality_counts(&self) -> [usize; MAX_AUCTION_QUALITY] {
        std::array::from_fn(|q| self.buckets[q].iter().map(Vec::len).sum())
    }
}

impl Default for ItemPool {
    fn default() -> Self {
        Self::new()
    }
}
