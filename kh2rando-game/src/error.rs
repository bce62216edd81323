use crate::{ItemCategory, LocationCategory, NodeIdx};
use thiserror::Error;

/// Problems with the graph, item pool, or settings. Retrying with a new seed cannot fix these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("duplicate node `{0}`")]
    DuplicateNode(String),
    #[error("duplicate check `{0}`")]
    DuplicateCheck(String),
    #[error("check `{name}` reuses location id {location_id} in category {category}")]
    DuplicateLocationId {
        name: String,
        location_id: u16,
        category: LocationCategory,
    },
    #[error("duplicate item `{0}` in catalog")]
    DuplicateItem(String),
    #[error("unknown item `{0}`")]
    UnknownItem(String),
    #[error("edge references unknown node index {0}")]
    UnknownNode(NodeIdx),
    #[error("no goal node was set")]
    MissingGoal,
    #[error("no check can ever hold `{item}`")]
    NoEligibleChecks { item: String },
    #[error("{needed} copies of [{items}] compete for only {available} eligible checks")]
    InsufficientEligibleChecks {
        items: String,
        needed: usize,
        available: usize,
    },
    #[error("item pool holds {items} items but only {slots} slots exist")]
    PoolOverflow { items: usize, slots: usize },
    #[error("open slots remain after the item pool but the catalog has no junk items")]
    NoJunkItems,
    #[error("the item pool cannot be spread over the checks that accept its items")]
    UnplaceablePool,
    #[error("goal is unreachable even with the entire item pool")]
    UnbeatablePool,
    #[error("{character} has {count} starting items but only {max} fit")]
    TooManyStartingItems {
        character: String,
        count: usize,
        max: usize,
    },
    #[error("`{item}` of category {category} cannot be stocked in the shop")]
    UnexpectedShopItem { item: String, category: ItemCategory },
}
