/// Flight-data API clients module
use crate::config::{ApiKey, MarketConfig, UpstreamConfig};
use crate::domain::{Airport, FlightResult, SearchRequest};
use crate::errors::{ApiError, ApiResult};
use crate::utils::{format_duration, query_len};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Shortest query the directory is asked about
pub const MIN_QUERY_LEN: usize = 2;
/// Itineraries kept from one search response
pub const MAX_FLIGHT_RESULTS: usize = 10;

const AIRPORT_LOOKUP_FALLBACK: &str = "Failed to search airports";
const FLIGHT_SEARCH_FALLBACK: &str = "Failed to search flights";

/// Maps free text to airport candidates
pub trait AirportDirectory: Send + Sync {
    fn search_airports(&self, query: &str) -> impl Future<Output = ApiResult<Vec<Airport>>> + Send;
}

/// Maps an origin/destination/date triple to normalized itineraries
pub trait FlightSearch: Send + Sync {
    fn search_flights(
        &self,
        request: &SearchRequest,
    ) -> impl Future<Output = ApiResult<Vec<FlightResult>>> + Send;
}

/// HTTP client wrapper with upstream credentials attached
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    host: String,
    api_key: ApiKey,
}

impl HttpClient {
    pub fn new(config: &UpstreamConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("flight-search/1.0")
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            host: config.host.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// GET an endpoint and return the HTTP status with the JSON body (Null if not JSON)
    async fn get_json(&self, endpoint: &str, query: &[(&str, &str)]) -> ApiResult<(StatusCode, Value)> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let resp = self
            .client
            .get(&url)
            .query(query)
            .header("x-rapidapi-host", &self.host)
            .header("x-rapidapi-key", self.api_key.expose())
            .send()
            .await?;

        let status = resp.status();
        let bytes = resp.bytes().await?;
        let body = serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            warn!("Upstream {} returned a non-JSON body ({}): {}", endpoint, status, e);
            Value::Null
        });
        Ok((status, body))
    }
}

/// Returns the `data` member of a successful envelope, or the upstream message on failure
fn open_envelope(status: StatusCode, body: &Value) -> Result<&Value, Option<String>> {
    let ok = body.get("status").and_then(Value::as_bool).unwrap_or(false);
    if ok && status.is_success() {
        return Ok(body.get("data").unwrap_or(&Value::Null));
    }

    let message = match body.get("message") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Null) | None => None,
        Some(Value::String(_)) => None,
        Some(other) => Some(other.to_string()),
    };
    Err(message)
}

/// Upstream airport directory client
#[derive(Clone)]
pub struct AirportClient {
    http_client: HttpClient,
}

impl AirportClient {
    pub fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }
}

impl AirportDirectory for AirportClient {
    async fn search_airports(&self, query: &str) -> ApiResult<Vec<Airport>> {
        if query_len(query) < MIN_QUERY_LEN {
            return Err(ApiError::Validation(format!(
                "query must be at least {} characters",
                MIN_QUERY_LEN
            )));
        }

        let (status, body) = self
            .http_client
            .get_json("searchAirport", &[("query", query)])
            .await
            .map_err(|e| {
                warn!("Airport lookup transport failure: {}", e);
                ApiError::Lookup(AIRPORT_LOOKUP_FALLBACK.to_string())
            })?;

        let data = open_envelope(status, &body).map_err(|message| {
            ApiError::Lookup(message.unwrap_or_else(|| AIRPORT_LOOKUP_FALLBACK.to_string()))
        })?;

        let airports = parse_candidates(data)?;
        debug!("Airport lookup '{}' returned {} candidates", query, airports.len());
        Ok(airports)
    }
}

/// Parses candidates one by one, skipping malformed entries
fn parse_candidates(data: &Value) -> ApiResult<Vec<Airport>> {
    let items = match data {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        other => {
            warn!("Airport lookup data is not a list: {}", other);
            return Err(ApiError::Lookup(AIRPORT_LOOKUP_FALLBACK.to_string()));
        }
    };

    Ok(items
        .iter()
        .filter_map(|item| match serde_json::from_value::<Airport>(item.clone()) {
            Ok(airport) => Some(airport),
            Err(e) => {
                warn!("Skipping malformed airport candidate: {}", e);
                None
            }
        })
        .collect())
}

/// Upstream flight search client
#[derive(Clone)]
pub struct FlightClient {
    http_client: HttpClient,
    market: MarketConfig,
}

impl FlightClient {
    pub fn new(http_client: HttpClient, market: MarketConfig) -> Self {
        Self {
            http_client,
            market,
        }
    }
}

impl FlightSearch for FlightClient {
    async fn search_flights(&self, request: &SearchRequest) -> ApiResult<Vec<FlightResult>> {
        let date = request.iso_date();
        let adults = request.adults.to_string();
        let query = [
            ("originSkyId", request.origin.sky_id.as_str()),
            ("destinationSkyId", request.destination.sky_id.as_str()),
            ("originEntityId", request.origin.entity_id.as_str()),
            ("destinationEntityId", request.destination.entity_id.as_str()),
            ("date", date.as_str()),
            ("adults", adults.as_str()),
            ("currency", self.market.currency.as_str()),
            ("locale", self.market.locale.as_str()),
            ("market", self.market.market.as_str()),
            ("cabinClass", self.market.cabin_class.as_str()),
            ("countryCode", self.market.country_code.as_str()),
        ];

        let (status, body) = self
            .http_client
            .get_json("searchFlights", &query)
            .await
            .map_err(|e| {
                warn!("Flight search transport failure: {}", e);
                ApiError::Search(FLIGHT_SEARCH_FALLBACK.to_string())
            })?;

        let data = open_envelope(status, &body).map_err(|message| {
            ApiError::Search(message.unwrap_or_else(|| FLIGHT_SEARCH_FALLBACK.to_string()))
        })?;

        Ok(normalize_itineraries(data))
    }
}

/// Non-empty string at a JSON pointer
fn str_at(v: &Value, pointer: &str) -> Option<String> {
    v.pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Keeps the first `MAX_FLIGHT_RESULTS` itineraries, projecting only their first leg.
/// Connections beyond the first leg are dropped.
pub fn normalize_itineraries(data: &Value) -> Vec<FlightResult> {
    let Some(items) = data.get("itineraries").and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .take(MAX_FLIGHT_RESULTS)
        .map(normalize_itinerary)
        .collect()
}

/// Each field falls back on its own; a malformed field never hides the others
fn normalize_itinerary(item: &Value) -> FlightResult {
    let price = str_at(item, "/price/formatted").unwrap_or_else(|| "N/A".to_string());
    let leg = item.pointer("/legs/0").unwrap_or(&Value::Null);

    let airline = str_at(leg, "/carriers/marketing/0/name").unwrap_or_else(|| "Unknown".to_string());
    let airline_code = str_at(leg, "/carriers/marketing/0/alternateId").unwrap_or_default();

    let flight_number = str_at(leg, "/segments/0/flightNumber")
        .map(|n| format!("{}{}", airline_code, n))
        .unwrap_or_default();

    let stops = leg
        .get("stopCount")
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0);

    FlightResult {
        airline,
        airline_code,
        price,
        duration: format_duration(leg.get("durationInMinutes").and_then(Value::as_u64)),
        departure_time: str_at(leg, "/departure").unwrap_or_default(),
        arrival_time: str_at(leg, "/arrival").unwrap_or_default(),
        origin: str_at(leg, "/origin/displayCode").unwrap_or_default(),
        destination: str_at(leg, "/destination/displayCode").unwrap_or_default(),
        stops,
        flight_number,
    }
}
