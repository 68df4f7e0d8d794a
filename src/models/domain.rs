use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Neighborhood shown when the roster leaves the column blank
pub const UNSPECIFIED_NEIGHBORHOOD: &str = "unspecified";

/// One small-group meeting from the roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRecord {
    /// Position of the source row in the spreadsheet, starting at 0
    #[serde(default)]
    pub row: usize,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_neighborhood")]
    pub neighborhood: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub mode: String,
    #[serde(rename = "startTime", default)]
    pub start_time: String,
    #[serde(rename = "leaderName", default)]
    pub leader_name: String,
    #[serde(rename = "leaderContact", default)]
    pub leader_contact: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl GroupRecord {
    /// Resolved (latitude, longitude), if geocoding succeeded
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    /// Helper to check whether this group meets online
    pub fn is_online(&self) -> bool {
        crate::core::filters::is_online(&self.mode)
    }
}

fn default_neighborhood() -> String {
    UNSPECIFIED_NEIGHBORHOOD.to_string()
}

/// A geocoded roster, tagged with the source it was loaded from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roster {
    pub source: String,
    pub groups: Vec<GroupRecord>,
    /// Rows dropped because their address could not be resolved
    pub unresolved: usize,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

impl Roster {
    pub fn empty(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            groups: Vec::new(),
            unresolved: 0,
            loaded_at: chrono::Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Look up a group by spreadsheet row
    ///
    /// The name must match too, so a card rendered from an older roster
    /// never reaches a different group.
    pub fn find(&self, row: usize, name: &str) -> Option<&GroupRecord> {
        self.groups.iter().find(|g| g.row == row && g.name == name)
    }
}

/// Resolved position of an address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub label: String,
}

/// Visitor data collected for one search
#[derive(Debug, Clone, Default)]
pub struct VisitorQuery {
    pub name: String,
    pub contact: String,
    pub address: String,
    pub selection: FilterSelection,
}

/// Multi-select filter values; a record must match all three dimensions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub categories: HashSet<String>,
    pub days: HashSet<String>,
    pub modes: HashSet<String>,
}

/// Distinct filter values observed in a roster, sorted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub categories: Vec<String>,
    pub days: Vec<String>,
    pub modes: Vec<String>,
}

/// A group paired with its distance from the visitor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedGroup {
    pub group: GroupRecord,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
}

/// Body posted to the notification sink
///
/// Keys follow the sink's existing contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    #[serde(rename = "visitante_nome")]
    pub visitor_name: String,
    #[serde(rename = "visitante_zap")]
    pub visitor_contact: String,
    #[serde(rename = "life_nome")]
    pub group_name: String,
    #[serde(rename = "lider_nome")]
    pub leader_name: String,
    #[serde(rename = "lider_zap")]
    pub leader_contact: String,
    #[serde(rename = "modo")]
    pub mode: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
