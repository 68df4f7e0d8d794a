use crate::models::{GroupRecord, Roster, UNSPECIFIED_NEIGHBORHOOD};
use crate::services::geocoder::{GeocodeOutcome, NominatimClient};
use reqwest::Client;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while loading the roster
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Failed to read roster file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to download roster: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Roster download returned status {0}")]
    ApiError(u16),

    #[error("Malformed roster: {0}")]
    CsvError(#[from] csv::Error),
}

/// Where the roster spreadsheet lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterSource {
    File(PathBuf),
    Url(String),
}

impl RosterSource {
    /// Interpret a configured location; `http(s)://` means a download
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            RosterSource::Url(location.to_string())
        } else {
            RosterSource::File(PathBuf::from(location))
        }
    }

    /// Identity used as the cache key
    pub fn identity(&self) -> String {
        match self {
            RosterSource::File(path) => format!("file:{}", path.display()),
            RosterSource::Url(url) => format!("url:{}", url),
        }
    }
}

/// One spreadsheet row, before geocoding
///
/// Column names follow the spreadsheet's Portuguese headers; English
/// names are accepted as aliases.
#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "Nome do Life", alias = "name", default)]
    name: Option<String>,
    #[serde(rename = "Endereço", alias = "address", default)]
    address: Option<String>,
    #[serde(rename = "Bairro", alias = "neighborhood", default)]
    neighborhood: Option<String>,
    #[serde(rename = "Tipo de Life", alias = "category", default)]
    category: Option<String>,
    #[serde(rename = "Dia da Semana", alias = "day", default)]
    day: Option<String>,
    #[serde(rename = "Horário de Início", alias = "start_time", default)]
    start_time: Option<String>,
    #[serde(rename = "Modo", alias = "mode", default)]
    mode: Option<String>,
    #[serde(rename = "Líderes", alias = "leader_name", default)]
    leader_name: Option<String>,
    #[serde(rename = "Telefone", alias = "leader_contact", default)]
    leader_contact: Option<String>,
}

impl RosterRow {
    fn into_group(self, row: usize) -> Option<GroupRecord> {
        let name = non_blank(self.name)?;

        Some(GroupRecord {
            row,
            name,
            address: non_blank(self.address),
            neighborhood: non_blank(self.neighborhood)
                .unwrap_or_else(|| UNSPECIFIED_NEIGHBORHOOD.to_string()),
            category: self.category.unwrap_or_default(),
            day: self.day.unwrap_or_default(),
            mode: self.mode.unwrap_or_default(),
            start_time: self.start_time.unwrap_or_default(),
            leader_name: self.leader_name.unwrap_or_default(),
            leader_contact: non_blank(self.leader_contact),
            latitude: None,
            longitude: None,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse roster CSV text into group records
///
/// Header names are trimmed, rows without a group name are dropped and
/// rows with missing trailing cells are tolerated. Each record keeps the
/// index of its data row. Coordinates are left unresolved.
pub fn parse_roster(data: &[u8]) -> Result<Vec<GroupRecord>, RosterError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(data);

    let mut groups = Vec::new();
    for (index, row) in reader.deserialize::<RosterRow>().enumerate() {
        if let Some(group) = row?.into_group(index) {
            groups.push(group);
        }
    }
    Ok(groups)
}

/// Loads the roster spreadsheet and geocodes every group
pub struct RosterLoader {
    source: RosterSource,
    client: Client,
    geocoder: Arc<NominatimClient>,
    lookup_interval: Duration,
}

impl RosterLoader {
    pub fn new(
        source: RosterSource,
        geocoder: Arc<NominatimClient>,
        download_timeout: Duration,
        lookup_interval: Duration,
    ) -> Result<Self, RosterError> {
        let client = Client::builder()
            .timeout(download_timeout)
            .build()?;

        Ok(Self {
            source,
            client,
            geocoder,
            lookup_interval,
        })
    }

    pub fn source(&self) -> &RosterSource {
        &self.source
    }

    async fn fetch(&self) -> Result<Vec<u8>, RosterError> {
        match &self.source {
            RosterSource::File(path) => Ok(tokio::fs::read(path).await?),
            RosterSource::Url(url) => {
                let response = self.client.get(url).send().await?;
                if !response.status().is_success() {
                    return Err(RosterError::ApiError(response.status().as_u16()));
                }
                Ok(response.bytes().await?.to_vec())
            }
        }
    }

    /// Read the spreadsheet and geocode it into a usable roster
    ///
    /// Groups are geocoded one at a time in spreadsheet order. Groups whose
    /// address cannot be resolved are left out of the result.
    pub async fn load(&self) -> Result<Roster, RosterError> {
        let data = self.fetch().await?;
        let parsed = parse_roster(&data)?;
        let total = parsed.len();

        tracing::info!("Geocoding {} roster entries from {}", total, self.source.identity());

        let mut groups = Vec::with_capacity(total);
        let mut lookups = 0usize;
        for mut group in parsed {
            let Some(address) = group.address.as_deref() else {
                tracing::debug!("Group {:?} has no address, skipping", group.name);
                continue;
            };

            // Pause only between actual requests
            if lookups > 0 && !self.lookup_interval.is_zero() {
                tokio::time::sleep(self.lookup_interval).await;
            }
            lookups += 1;

            match self.geocoder.resolve_roster_address(address).await {
                GeocodeOutcome::Resolved(hit) => {
                    group.latitude = Some(hit.latitude);
                    group.longitude = Some(hit.longitude);
                    groups.push(group);
                }
                GeocodeOutcome::NotFound => {
                    tracing::debug!("Address of group {:?} not found: {}", group.name, address);
                }
                GeocodeOutcome::Failed(e) => {
                    tracing::warn!("Geocoding failed for group {:?}: {}", group.name, e);
                }
            }
        }

        let unresolved = total - groups.len();
        tracing::info!(
            "Roster loaded: {} usable groups, {} without coordinates",
            groups.len(),
            unresolved
        );

        Ok(Roster {
            source: self.source.identity(),
            groups,
            unresolved,
            loaded_at: chrono::Utc::now(),
        })
    }
}
