/// Domain models for the flight search front end
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Entity type the dropdown is restricted to
pub const AIRPORT_ENTITY_TYPE: &str = "AIRPORT";

/// Airport candidate as returned by the upstream directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Airport {
    pub sky_id: String,
    pub entity_id: String,
    #[serde(default)]
    pub presentation: Presentation,
    #[serde(default)]
    pub navigation: Navigation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Presentation {
    pub title: String,
    pub suggestion_title: String,
    pub subtitle: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Navigation {
    pub entity_id: String,
    pub entity_type: String,
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Airport {
    pub fn is_airport(&self) -> bool {
        self.navigation.entity_type == AIRPORT_ENTITY_TYPE
    }

    /// Title echoed into the text field once the airport is committed
    pub fn display_title(&self) -> &str {
        if self.presentation.suggestion_title.is_empty() {
            &self.presentation.title
        } else {
            &self.presentation.suggestion_title
        }
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.navigation.coordinates
    }
}

/// Normalized itinerary projection (first leg, first marketing carrier only)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightResult {
    pub airline: String,
    pub airline_code: String,
    pub price: String,
    pub duration: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub origin: String,
    pub destination: String,
    pub stops: u32,
    pub flight_number: String,
}

/// Which of the two airport inputs an event targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Origin,
    Destination,
}

impl Slot {
    pub fn index(self) -> usize {
        match self {
            Slot::Origin => 0,
            Slot::Destination => 1,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Origin => write!(f, "origin"),
            Slot::Destination => write!(f, "destination"),
        }
    }
}

/// The user's current search inputs. Airports are shared, never copied.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSelection {
    pub origin: Option<Arc<Airport>>,
    pub destination: Option<Arc<Airport>>,
    pub date: NaiveDate,
    pub adults: u8,
}

impl SearchSelection {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            origin: None,
            destination: None,
            date,
            adults: 1,
        }
    }

    pub fn airport(&self, slot: Slot) -> Option<&Arc<Airport>> {
        match slot {
            Slot::Origin => self.origin.as_ref(),
            Slot::Destination => self.destination.as_ref(),
        }
    }

    /// Builds a flight search request when both slots are committed
    pub fn to_request(&self) -> Option<SearchRequest> {
        match (&self.origin, &self.destination) {
            (Some(origin), Some(destination)) => Some(SearchRequest {
                origin: Arc::clone(origin),
                destination: Arc::clone(destination),
                date: self.date,
                adults: self.adults,
            }),
            _ => None,
        }
    }
}

/// Resolved input for one flight search call
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub origin: Arc<Airport>,
    pub destination: Arc<Airport>,
    pub date: NaiveDate,
    pub adults: u8,
}

impl SearchRequest {
    pub fn iso_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestCategory {
    AirportLookup,
    FlightSearch,
}

impl RequestCategory {
    pub(crate) fn index(self) -> usize {
        match self {
            RequestCategory::AirportLookup => 0,
            RequestCategory::FlightSearch => 1,
        }
    }
}

/// Lifecycle of the latest request in one category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed(String),
}
