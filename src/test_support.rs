//! Fixtures and a fake flight-data upstream shared by the test modules
use crate::config::{ApiKey, UpstreamConfig};
use crate::domain::{Airport, Coordinates, Navigation, Presentation, SearchRequest};
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const TEST_KEY: &str = "test-key";

pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 20).unwrap()
}

pub fn test_upstream_config(base_url: &str) -> UpstreamConfig {
    UpstreamConfig {
        base_url: base_url.to_string(),
        host: "sky-scrapper.p.rapidapi.com".to_string(),
        api_key: ApiKey::new(TEST_KEY),
        timeout_seconds: 5,
    }
}

pub fn airport(sky_id: &str, entity_type: &str) -> Airport {
    Airport {
        sky_id: sky_id.to_string(),
        entity_id: format!("entity-{}", sky_id),
        presentation: Presentation {
            title: format!("{} title", sky_id),
            suggestion_title: format!("{} Airport ({})", sky_id, sky_id),
            subtitle: "Somewhere".to_string(),
        },
        navigation: Navigation {
            entity_id: format!("entity-{}", sky_id),
            entity_type: entity_type.to_string(),
            coordinates: None,
        },
    }
}

pub fn airport_at(sky_id: &str, latitude: f64, longitude: f64) -> Airport {
    let mut a = airport(sky_id, "AIRPORT");
    a.navigation.coordinates = Some(Coordinates {
        latitude,
        longitude,
    });
    a
}

pub fn airport_request(origin: &str, destination: &str, adults: u8) -> SearchRequest {
    SearchRequest {
        origin: Arc::new(airport(origin, "AIRPORT")),
        destination: Arc::new(airport(destination, "AIRPORT")),
        date: test_date(),
        adults,
    }
}

#[derive(Clone, Default)]
struct Recorded {
    airport_queries: Arc<Mutex<Vec<String>>>,
    flight_calls: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

/// Handle on a running fake upstream
pub struct FakeUpstream {
    pub base_url: String,
    recorded: Recorded,
}

impl FakeUpstream {
    pub fn airport_queries(&self) -> Vec<String> {
        self.recorded.airport_queries.lock().unwrap().clone()
    }

    pub fn flight_calls(&self) -> Vec<HashMap<String, String>> {
        self.recorded.flight_calls.lock().unwrap().clone()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("x-rapidapi-key")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == TEST_KEY)
        .unwrap_or(false)
}

async fn fake_airports(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    if !authorized(&headers) {
        return Json(json!({"status": false, "message": "Invalid API key"}));
    }
    let query = params.get("query").cloned().unwrap_or_default();
    recorded.airport_queries.lock().unwrap().push(query.clone());

    let data = match query.as_str() {
        "fail-with-message" => return Json(json!({"status": false, "message": "Upstream is down"})),
        "fail" => return Json(json!({"status": false})),
        "broken" => {
            let data = json!([
                airport("JFK", "AIRPORT"),
                {"skyId": null, "entityId": "entity-BAD", "navigation": {"entityType": "AIRPORT"}},
                airport("LGA", "AIRPORT"),
            ]);
            return Json(json!({"status": true, "data": data}));
        }
        "new york" => vec![
            airport_at("JFK", 40.6413, -73.7781),
            airport("NYCA", "CITY"),
            airport("LGA", "AIRPORT"),
        ],
        "los angeles" => vec![airport_at("LAX", 33.9416, -118.4085)],
        "paris" => vec![airport("PARI", "CITY")],
        _ => Vec::new(),
    };
    Json(json!({"status": true, "timestamp": 1, "data": data}))
}

async fn fake_flights(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    if !authorized(&headers) {
        return Json(json!({"status": false, "message": "Invalid API key"}));
    }
    let origin = params.get("originSkyId").cloned().unwrap_or_default();
    recorded.flight_calls.lock().unwrap().push(params);

    if origin == "ERR" {
        return Json(json!({"status": false, "message": "You have exceeded the rate limit"}));
    }

    let itineraries: Vec<Value> = (0..12)
        .map(|i| {
            json!({
                "id": format!("it-{}", i),
                "price": {"raw": 100 + i, "formatted": format!("${}", 100 + i)},
                "legs": [{
                    "origin": {"displayCode": origin},
                    "destination": {"displayCode": "LAX"},
                    "durationInMinutes": 300 + i,
                    "stopCount": i % 3,
                    "departure": "2025-04-20T08:00:00",
                    "arrival": "2025-04-20T13:00:00",
                    "carriers": {"marketing": [{"name": format!("Airline {}", i), "alternateId": "XX"}]},
                    "segments": [{"flightNumber": format!("{}", 100 + i)}]
                }]
            })
        })
        .collect();
    Json(json!({"status": true, "data": {"itineraries": itineraries}}))
}

/// Starts a fake upstream on an ephemeral local port
pub async fn spawn_fake_upstream() -> FakeUpstream {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/searchAirport", get(fake_airports))
        .route("/searchFlights", get(fake_flights))
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeUpstream {
        base_url: format!("http://{}", addr),
        recorded,
    }
}

/// Base URL of a local port with nothing listening on it
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
