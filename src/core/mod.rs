// Core algorithm exports
pub mod contact;
pub mod distance;
pub mod filters;
pub mod finder;

pub use contact::normalize_contact;
pub use distance::{distance_km, rank_by_distance};
pub use filters::{apply_filters, is_online, matches_selection, partition_by_mode};
pub use finder::{GroupFinder, SearchOutcome, DEFAULT_SHOWCASE_LIMIT};
