/// Read-only projections of the store and form; map and date picker get plain coordinates and constraints
use crate::domain::{Airport, FlightResult, RequestCategory, RequestState, SearchSelection, Slot};
use crate::services::{FieldState, FormState, MAX_PASSENGERS};
use crate::store::FlightState;
use crate::utils::{format_clock_time, format_stops, haversine_km, or_fallback, passengers_label};
use serde::Serialize;

pub const DATE_DISPLAY_FORMAT: &str = "EEE, MMM d";
const MAP_ZOOM: u8 = 4;

#[derive(Debug, Serialize)]
pub struct ResultsView {
    pub status: RequestState,
    pub loading: bool,
    pub error: Option<String>,
    pub header: Option<ResultsHeader>,
    pub cards: Vec<FlightCardView>,
}

#[derive(Debug, Serialize)]
pub struct ResultsHeader {
    pub title: &'static str,
    pub count: usize,
    pub count_label: String,
}

#[derive(Debug, Serialize)]
pub struct FlightCardView {
    pub airline: String,
    pub price: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub origin: String,
    pub destination: String,
    pub duration: String,
    pub stops: String,
    pub flight_number: String,
    /// Selecting a flight is not supported yet
    pub select_enabled: bool,
}

impl From<&FlightResult> for FlightCardView {
    fn from(flight: &FlightResult) -> Self {
        Self {
            airline: or_fallback(&flight.airline, "Unknown Airline"),
            price: or_fallback(&flight.price, "N/A"),
            departure_time: format_clock_time(&flight.departure_time),
            arrival_time: format_clock_time(&flight.arrival_time),
            origin: or_fallback(&flight.origin, "Unknown"),
            destination: or_fallback(&flight.destination, "Unknown"),
            duration: or_fallback(&flight.duration, "--:--"),
            stops: format_stops(flight.stops),
            flight_number: flight.flight_number.clone(),
            select_enabled: false,
        }
    }
}

pub fn results_view(state: &FlightState) -> ResultsView {
    let cards: Vec<FlightCardView> = state.flights.iter().map(FlightCardView::from).collect();
    let header = (!cards.is_empty()).then(|| ResultsHeader {
        title: "Available Flights",
        count: cards.len(),
        count_label: format!("{} flights found", cards.len()),
    });

    ResultsView {
        status: state.request_state(RequestCategory::FlightSearch).clone(),
        loading: state.loading,
        error: state.error.clone(),
        header,
        cards,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Airports without navigation coordinates are drawn at (0, 0)
    fn of(airport: &Airport) -> Self {
        airport
            .coordinates()
            .map(|c| LatLng {
                lat: c.latitude,
                lng: c.longitude,
            })
            .unwrap_or(LatLng { lat: 0.0, lng: 0.0 })
    }
}

#[derive(Debug, Serialize)]
pub struct MapMarker {
    pub position: LatLng,
    pub label: &'static str,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct MapOverlay {
    pub origin: MapMarker,
    pub destination: MapMarker,
    pub center: LatLng,
    pub zoom: u8,
    pub path: [LatLng; 2],
    pub distance_km: f64,
}

pub fn map_overlay(selection: &SearchSelection) -> Option<MapOverlay> {
    let origin = selection.origin.as_ref()?;
    let destination = selection.destination.as_ref()?;

    let from = LatLng::of(origin);
    let to = LatLng::of(destination);

    Some(MapOverlay {
        origin: MapMarker {
            position: from,
            label: "Origin Airport",
            code: origin.sky_id.clone(),
        },
        destination: MapMarker {
            position: to,
            label: "Destination Airport",
            code: destination.sky_id.clone(),
        },
        center: LatLng {
            lat: (from.lat + to.lat) / 2.0,
            lng: (from.lng + to.lng) / 2.0,
        },
        zoom: MAP_ZOOM,
        path: [from, to],
        distance_km: haversine_km(from.lat, from.lng, to.lat, to.lng),
    })
}

#[derive(Debug, Serialize)]
pub struct DropdownItem {
    pub sky_id: String,
    pub title: String,
    pub subtitle: String,
    pub entity_type: String,
}

#[derive(Debug, Serialize)]
pub struct FieldView {
    pub text: String,
    pub state: FieldState,
    pub dropdown: Vec<DropdownItem>,
    pub selected: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DateView {
    pub value: String,
    pub display: String,
    pub min: String,
    pub format: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PassengerOption {
    pub value: u8,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct PassengersView {
    pub adults: u8,
    pub label: String,
    pub options: Vec<PassengerOption>,
}

#[derive(Debug, Serialize)]
pub struct FormView {
    pub origin: FieldView,
    pub destination: FieldView,
    pub date: DateView,
    pub passengers: PassengersView,
    pub can_search: bool,
}

fn field_view(form: &FormState, selection: &SearchSelection, slot: Slot) -> FieldView {
    let field = form.field(slot);
    let dropdown = if field.state == FieldState::DropdownOpen {
        field
            .candidates
            .iter()
            .map(|a| DropdownItem {
                sky_id: a.sky_id.clone(),
                title: a.display_title().to_string(),
                subtitle: a.presentation.subtitle.clone(),
                entity_type: a.navigation.entity_type.clone(),
            })
            .collect()
    } else {
        Vec::new()
    };

    FieldView {
        text: field.text.clone(),
        state: field.state,
        dropdown,
        selected: selection.airport(slot).map(|a| a.sky_id.clone()),
    }
}

pub fn form_view(form: &FormState, selection: &SearchSelection) -> FormView {
    FormView {
        origin: field_view(form, selection, Slot::Origin),
        destination: field_view(form, selection, Slot::Destination),
        date: DateView {
            value: selection.date.format("%Y-%m-%d").to_string(),
            display: selection.date.format("%a, %b %-d").to_string(),
            min: form.min_date.format("%Y-%m-%d").to_string(),
            format: DATE_DISPLAY_FORMAT,
        },
        passengers: PassengersView {
            adults: selection.adults,
            label: passengers_label(selection.adults),
            options: (1..=MAX_PASSENGERS)
                .map(|n| PassengerOption {
                    value: n,
                    label: passengers_label(n),
                })
                .collect(),
        },
        can_search: selection.to_request().is_some(),
    }
}
