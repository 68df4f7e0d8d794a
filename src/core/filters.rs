use std::collections::BTreeSet;
use crate::models::{FilterOptions, FilterSelection, GroupRecord};

/// Check if a meeting mode denotes an online group
///
/// Any mode containing "online", in any case, counts as online.
#[inline]
pub fn is_online(mode: &str) -> bool {
    mode.to_lowercase().contains("online")
}

/// Check if a group passes all three multi-select filters
#[inline]
pub fn matches_selection(group: &GroupRecord, selection: &FilterSelection) -> bool {
    selection.categories.contains(&group.category)
        && selection.days.contains(&group.day)
        && selection.modes.contains(&group.mode)
}

/// Keep the groups whose category, day and mode are all selected
pub fn apply_filters(groups: &[GroupRecord], selection: &FilterSelection) -> Vec<GroupRecord> {
    groups
        .iter()
        .filter(|group| matches_selection(group, selection))
        .cloned()
        .collect()
}

/// Split groups into (online, in-person), preserving order
pub fn partition_by_mode(groups: Vec<GroupRecord>) -> (Vec<GroupRecord>, Vec<GroupRecord>) {
    groups.into_iter().partition(|group| group.is_online())
}

impl FilterSelection {
    /// Select every value observed in `groups`
    pub fn all(groups: &[GroupRecord]) -> Self {
        Self {
            categories: groups.iter().map(|g| g.category.clone()).collect(),
            days: groups.iter().map(|g| g.day.clone()).collect(),
            modes: groups.iter().map(|g| g.mode.clone()).collect(),
        }
    }

    /// Build a selection, using every observed value where none was given
    pub fn from_choices(
        groups: &[GroupRecord],
        categories: Option<Vec<String>>,
        days: Option<Vec<String>>,
        modes: Option<Vec<String>>,
    ) -> Self {
        let all = Self::all(groups);
        Self {
            categories: categories.map(|values| values.into_iter().collect()).unwrap_or(all.categories),
            days: days.map(|values| values.into_iter().collect()).unwrap_or(all.days),
            modes: modes.map(|values| values.into_iter().collect()).unwrap_or(all.modes),
        }
    }
}

impl FilterOptions {
    /// Sorted distinct values of each filter dimension
    pub fn from_groups(groups: &[GroupRecord]) -> Self {
        fn distinct<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
            values.cloned().collect::<BTreeSet<_>>().into_iter().collect()
        }

        Self {
            categories: distinct(groups.iter().map(|g| &g.category)),
            days: distinct(groups.iter().map(|g| &g.day)),
            modes: distinct(groups.iter().map(|g| &g.mode)),
        }
    }
}
