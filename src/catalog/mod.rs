mod filter;
mod pool;
mod source;

pub use filter::build_item_pool;
pub use pool::ItemPool;
pub use source::{ItemSource, StaticItemSource};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// No item survived filtering in any (quality, class) bucket. The
    /// seller cannot operate on an empty pool.
    #[error("item pool is empty after filtering; seller disabled")]
    EmptyItemPool,
}

/// Parses a comma-separated id list, tolerating blanks and junk tokens.
pub fn parse_id_list(raw: &str) -> std::collections::HashSet<crate::types::ItemId> {
    raw.split(',')
        .filter_map(|token| token.trim().parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_list() {
        let ids = parse_id_list("12, 17,,abc, 9");
        assert_eq!(ids.len(), 3);
        assert!(ids.contains(&12));
        assert!(ids.contains(&17));
        assert!(ids.contains(&9));

        assert!(parse_id_list("").is_empty());
        assert!(parse_id_list("  ,  ").is_empty());
    }
}
