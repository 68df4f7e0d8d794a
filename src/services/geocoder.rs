use crate::models::ResolvedLocation;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the geocoding provider
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Geocoder returned status {0}")]
    ApiError(u16),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// A single geocoder match
#[derive(Debug, Clone)]
pub struct GeocodeHit {
    pub latitude: f64,
    pub longitude: f64,
    /// Full unstructured address
    pub display_name: String,
    /// Structured address breakdown, keys vary by place
    pub address: Option<Value>,
}

/// Outcome of one geocoding query
#[derive(Debug)]
pub enum GeocodeOutcome {
    Resolved(GeocodeHit),
    NotFound,
    /// Transport error, timeout, bad status or unreadable body
    Failed(GeocodeError),
}

/// Raw place as returned by the provider's search endpoint
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    address: Option<Value>,
}

/// Nominatim-compatible geocoding client
pub struct NominatimClient {
    base_url: String,
    user_agent: String,
    client: Client,
    roster_timeout: Duration,
    country_hint: String,
    region_hint: String,
}

impl NominatimClient {
    /// Create a new geocoding client
    ///
    /// `request_timeout` bounds every call; roster lookups use the shorter
    /// `roster_timeout` on top of it.
    pub fn new(
        base_url: String,
        user_agent: String,
        request_timeout: Duration,
        roster_timeout: Duration,
        country_hint: String,
        region_hint: String,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            base_url,
            user_agent,
            client,
            roster_timeout,
            country_hint,
            region_hint,
        })
    }

    /// Run a single search query
    pub async fn lookup(&self, query: &str, timeout: Option<Duration>) -> GeocodeOutcome {
        match self.search(query, timeout).await {
            Ok(Some(hit)) => GeocodeOutcome::Resolved(hit),
            Ok(None) => GeocodeOutcome::NotFound,
            Err(e) => GeocodeOutcome::Failed(e),
        }
    }

    async fn search(
        &self,
        query: &str,
        timeout: Option<Duration>,
    ) -> Result<Option<GeocodeHit>, GeocodeError> {
        let url = format!(
            "{}/search?q={}&format=json&limit=1&addressdetails=1",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(query)
        );

        tracing::debug!("Geocoding query: {}", query);

        let mut request = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(GeocodeError::ApiError(response.status().as_u16()));
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        let latitude = place
            .lat
            .parse::<f64>()
            .map_err(|_| GeocodeError::InvalidResponse(format!("bad latitude {:?}", place.lat)))?;
        let longitude = place
            .lon
            .parse::<f64>()
            .map_err(|_| GeocodeError::InvalidResponse(format!("bad longitude {:?}", place.lon)))?;

        Ok(Some(GeocodeHit {
            latitude,
            longitude,
            display_name: place.display_name,
            address: place.address,
        }))
    }

    /// Geocode a roster address: one query, country hint appended, short timeout
    pub async fn resolve_roster_address(&self, address: &str) -> GeocodeOutcome {
        let query = format!("{}, {}", address, self.country_hint);
        self.lookup(&query, Some(self.roster_timeout)).await
    }

    /// Geocode the visitor's address
    ///
    /// Tries the address within the configured region first and falls back to
    /// the whole country when the region query finds nothing. A failed first
    /// query is reported as is, without the fallback.
    ///
    /// # Returns
    /// `Ok(None)` when neither query finds the address
    pub async fn resolve_visitor_address(
        &self,
        address: &str,
    ) -> Result<Option<ResolvedLocation>, GeocodeError> {
        let regional = format!("{}, {}, {}", address, self.region_hint, self.country_hint);
        let hit = match self.lookup(&regional, None).await {
            GeocodeOutcome::Resolved(hit) => hit,
            GeocodeOutcome::Failed(e) => return Err(e),
            GeocodeOutcome::NotFound => {
                tracing::debug!("No regional match for visitor address, widening to country");
                let national = format!("{}, {}", address, self.country_hint);
                match self.lookup(&national, None).await {
                    GeocodeOutcome::Resolved(hit) => hit,
                    GeocodeOutcome::NotFound => return Ok(None),
                    GeocodeOutcome::Failed(e) => return Err(e),
                }
            }
        };

        let label = format_label(hit.address.as_ref(), &hit.display_name);
        Ok(Some(ResolvedLocation {
            latitude: hit.latitude,
            longitude: hit.longitude,
            label,
        }))
    }
}

const STREET_KEYS: &[&str] = &["road"];
const NUMBER_KEYS: &[&str] = &["house_number"];
const NEIGHBORHOOD_KEYS: &[&str] = &["suburb", "neighbourhood"];
const CITY_KEYS: &[&str] = &["city", "town", "municipality"];

/// Shortest label accepted from the structured address
const MIN_LABEL_CHARS: usize = 5;

/// Build a short human-readable label for a geocoded address
///
/// Joins street, house number and neighbourhood, then appends the city.
/// Falls back to the first segment of `display_name` when the structured
/// breakdown is missing, malformed or too short.
pub fn format_label(address: Option<&Value>, display_name: &str) -> String {
    address
        .and_then(Value::as_object)
        .and_then(structured_label)
        .filter(|label| label.chars().count() >= MIN_LABEL_CHARS)
        .unwrap_or_else(|| first_segment(display_name))
}

fn structured_label(fields: &Map<String, Value>) -> Option<String> {
    let street = pick(fields, STREET_KEYS)?;
    let number = pick(fields, NUMBER_KEYS)?;
    let neighborhood = pick(fields, NEIGHBORHOOD_KEYS)?;
    let city = pick(fields, CITY_KEYS)?;

    let mut label = [street, number, neighborhood]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    if !city.is_empty() {
        label.push_str(" - ");
        label.push_str(city);
    }
    Some(label)
}

/// First present key wins; `None` when that value is neither a string nor null
fn pick<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    match keys.iter().find_map(|key| fields.get(*key)) {
        Some(Value::Null) | None => Some(""),
        Some(value) => value.as_str(),
    }
}

fn first_segment(display_name: &str) -> String {
    display_name.split(',').next().unwrap_or_default().trim().to_string()
}
