use crate::models::{FilterSelection, GroupRecord, RankedGroup, ResolvedLocation};
use crate::core::{
    distance::rank_by_distance,
    filters::{apply_filters, partition_by_mode},
};

/// Number of in-person groups shown before the overflow list
pub const DEFAULT_SHOWCASE_LIMIT: usize = 3;

/// Result of one search
#[derive(Debug, Default)]
pub struct SearchOutcome {
    /// Closest in-person groups, ascending by distance
    pub nearby: Vec<RankedGroup>,
    /// Remaining in-person groups, still ascending
    pub more: Vec<RankedGroup>,
    pub online: Vec<GroupRecord>,
    /// Number of groups that passed the filters
    pub total_matched: usize,
}

impl SearchOutcome {
    pub fn is_empty(&self) -> bool {
        self.total_matched == 0
    }

    /// Disclosure label for the overflow list, e.g. "2 more"
    pub fn more_label(&self) -> Option<String> {
        if self.more.is_empty() {
            None
        } else {
            Some(format!("{} more", self.more.len()))
        }
    }
}

/// Search orchestrator
///
/// # Pipeline Stages
/// 1. Multi-select filtering (category, day, mode)
/// 2. Online / in-person partition
/// 3. Distance ranking of the in-person groups
/// 4. Showcase / overflow split
#[derive(Debug, Clone)]
pub struct GroupFinder {
    showcase_limit: usize,
}

impl GroupFinder {
    pub fn new(showcase_limit: usize) -> Self {
        Self { showcase_limit }
    }

    /// Filter and partition the roster without ranking
    ///
    /// Returns (online, in-person). Useful to check for an empty result
    /// before spending a geocoding call on the visitor's address.
    pub fn select(
        &self,
        groups: &[GroupRecord],
        selection: &FilterSelection,
    ) -> (Vec<GroupRecord>, Vec<GroupRecord>) {
        partition_by_mode(apply_filters(groups, selection))
    }

    /// Run the complete search pipeline for a resolved visitor location
    pub fn search(
        &self,
        groups: &[GroupRecord],
        selection: &FilterSelection,
        origin: &ResolvedLocation,
    ) -> SearchOutcome {
        let (online, in_person) = self.select(groups, selection);
        self.rank(online, in_person, origin)
    }

    /// Rank an already partitioned selection
    pub fn rank(
        &self,
        online: Vec<GroupRecord>,
        in_person: Vec<GroupRecord>,
        origin: &ResolvedLocation,
    ) -> SearchOutcome {
        let total_matched = online.len() + in_person.len();

        let mut nearby = rank_by_distance((origin.latitude, origin.longitude), in_person);
        let more = if nearby.len() > self.showcase_limit {
            nearby.split_off(self.showcase_limit)
        } else {
            Vec::new()
        };

        SearchOutcome {
            nearby,
            more,
            online,
            total_matched,
        }
    }
}

impl Default for GroupFinder {
    fn default() -> Self {
        Self::new(DEFAULT_SHOWCASE_LIMIT)
    }
}
