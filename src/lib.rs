//! LifeGroup Finder - match visitors with nearby small groups
//!
//! This library loads the LifeGroup roster, geocodes it, ranks in-person
//! groups by distance from a visitor and notifies group leaders.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{GroupFinder, SearchOutcome, normalize_contact, distance::{distance_km, rank_by_distance}};
pub use models::{GroupRecord, Roster, ResolvedLocation, FilterSelection, FilterOptions, RankedGroup, NotificationPayload};
