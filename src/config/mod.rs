mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    BuyerConfig, ClassConfig, ClassTable, Config, FilterConfig, HouseRatios, QualityTable,
    SellerConfig,
};
