use serde::{Deserialize, Serialize};
use crate::models::domain::{FilterOptions, GroupRecord};

/// One group as shown to the visitor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupCard {
    /// Roster row, echoed back by the notify request
    pub row: usize,
    pub name: String,
    pub neighborhood: String,
    pub category: String,
    pub mode: String,
    pub day: String,
    #[serde(rename = "startTime")]
    pub start_time: String,
    #[serde(rename = "leaderName")]
    pub leader_name: String,
    #[serde(rename = "distanceKm")]
    pub distance_km: Option<f64>,
    /// Normalized leader contact; `None` when the roster has no usable number
    #[serde(rename = "leaderContact")]
    pub leader_contact: Option<String>,
    #[serde(rename = "messagingLink")]
    pub messaging_link: Option<String>,
}

impl GroupCard {
    pub fn from_group(group: &GroupRecord, distance_km: Option<f64>) -> Self {
        Self {
            row: group.row,
            name: group.name.clone(),
            neighborhood: group.neighborhood.clone(),
            category: group.category.clone(),
            mode: group.mode.clone(),
            day: group.day.clone(),
            start_time: group.start_time.clone(),
            leader_name: group.leader_name.clone(),
            distance_km,
            leader_contact: None,
            messaging_link: None,
        }
    }
}

/// Response for the search endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Human-readable form of the visitor's resolved address
    pub reference: Option<String>,
    pub nearby: Vec<GroupCard>,
    pub more: Vec<GroupCard>,
    #[serde(rename = "moreLabel")]
    pub more_label: Option<String>,
    pub online: Vec<GroupCard>,
    pub message: Option<String>,
    #[serde(rename = "testMode")]
    pub test_mode: bool,
}

/// Response for the filter options endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsResponse {
    #[serde(flatten)]
    pub options: FilterOptions,
    #[serde(rename = "totalGroups")]
    pub total_groups: usize,
    #[serde(rename = "rosterError")]
    pub roster_error: Option<String>,
}

/// Response for the notify endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyResponse {
    pub delivered: bool,
    pub message: String,
    #[serde(rename = "messagingLink")]
    pub messaging_link: Option<String>,
    #[serde(rename = "testMode")]
    pub test_mode: bool,
    pub request_id: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "rosterSize")]
    pub roster_size: usize,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
