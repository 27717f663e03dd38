/// Application state store: a closed set of actions applied to one state struct
use crate::domain::{
    Airport, FlightResult, RequestCategory, RequestState, SearchRequest, SearchSelection, Slot,
};
use chrono::NaiveDate;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Generation counters are kept per key, so the two fields never supersede each other
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKey {
    Lookup(Slot),
    Flights,
}

impl RequestKey {
    const COUNT: usize = 3;

    fn index(self) -> usize {
        match self {
            RequestKey::Lookup(slot) => slot.index(),
            RequestKey::Flights => 2,
        }
    }

    pub fn category(self) -> RequestCategory {
        match self {
            RequestKey::Lookup(_) => RequestCategory::AirportLookup,
            RequestKey::Flights => RequestCategory::FlightSearch,
        }
    }
}

/// Identifies one issued request; only the newest ticket per key may complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    pub key: RequestKey,
    pub generation: u64,
}

impl RequestTicket {
    pub fn category(&self) -> RequestCategory {
        self.key.category()
    }
}

/// A flight search whose ticket was issued in the same transition that made it due
#[derive(Debug, Clone)]
pub struct PendingSearch {
    pub request: SearchRequest,
    pub ticket: RequestTicket,
}

#[derive(Debug, Clone)]
pub enum Action {
    SelectAirport { slot: Slot, airport: Arc<Airport> },
    SetDate(NaiveDate),
    SetPassengers(u8),
    RequestStarted(RequestTicket),
    /// `flights` is only kept for the flight search category
    RequestSucceeded {
        ticket: RequestTicket,
        flights: Vec<FlightResult>,
    },
    RequestFailed {
        ticket: RequestTicket,
        message: String,
    },
    Clear,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlightState {
    pub selection: SearchSelection,
    pub flights: Vec<FlightResult>,
    pub loading: bool,
    pub error: Option<String>,
    requests: [RequestState; 2],
    latest: [u64; RequestKey::COUNT],
}

impl FlightState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            selection: SearchSelection::new(date),
            flights: Vec::new(),
            loading: false,
            error: None,
            requests: Default::default(),
            latest: [0; RequestKey::COUNT],
        }
    }

    pub fn request_state(&self, category: RequestCategory) -> &RequestState {
        &self.requests[category.index()]
    }

    fn is_current(&self, ticket: RequestTicket) -> bool {
        self.latest[ticket.key.index()] == ticket.generation
    }

    fn issue(&mut self, key: RequestKey) -> RequestTicket {
        let ticket = RequestTicket {
            key,
            generation: self.latest[key.index()] + 1,
        };
        self.apply(Action::RequestStarted(ticket));
        ticket
    }

    /// Applies one action. Returns false when a stale response was discarded.
    pub fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::SelectAirport { slot, airport } => match slot {
                Slot::Origin => self.selection.origin = Some(airport),
                Slot::Destination => self.selection.destination = Some(airport),
            },
            Action::SetDate(date) => self.selection.date = date,
            Action::SetPassengers(adults) => self.selection.adults = adults,
            Action::RequestStarted(ticket) => {
                self.latest[ticket.key.index()] = ticket.generation;
                self.requests[ticket.category().index()] = RequestState::Loading;
                self.loading = true;
                self.error = None;
            }
            Action::RequestSucceeded { ticket, flights } => {
                if !self.is_current(ticket) {
                    debug!("Discarding stale {:?} response (generation {})", ticket.key, ticket.generation);
                    return false;
                }
                self.requests[ticket.category().index()] = RequestState::Succeeded;
                self.loading = false;
                if ticket.key == RequestKey::Flights {
                    self.flights = flights;
                }
            }
            Action::RequestFailed { ticket, message } => {
                if !self.is_current(ticket) {
                    debug!("Discarding stale {:?} failure (generation {})", ticket.key, ticket.generation);
                    return false;
                }
                self.requests[ticket.category().index()] = RequestState::Failed(message.clone());
                self.loading = false;
                self.error = Some(message);
            }
            Action::Clear => {
                self.flights.clear();
                self.error = None;
                for request in self.requests.iter_mut() {
                    if *request != RequestState::Loading {
                        *request = RequestState::Idle;
                    }
                }
            }
        }
        true
    }
}

/// Selection before and after one transition
#[derive(Debug, Clone)]
struct Change {
    before: SearchSelection,
    after: SearchSelection,
}

fn same_airport(a: Option<&Arc<Airport>>, b: Option<&Arc<Airport>>) -> bool {
    match (a, b) {
        (Some(x), Some(y)) => Arc::ptr_eq(x, y),
        (None, None) => true,
        _ => false,
    }
}

/// Post-transition watcher: a search is due when both airports are committed
/// and either an airport or the date just changed.
fn auto_search(change: &Change) -> Option<SearchRequest> {
    let request = change.after.to_request()?;

    let airports_changed = !same_airport(change.before.origin.as_ref(), change.after.origin.as_ref())
        || !same_airport(
            change.before.destination.as_ref(),
            change.after.destination.as_ref(),
        );
    let date_changed = change.before.date != change.after.date;

    (airports_changed || date_changed).then_some(request)
}

/// The single shared mutable resource; all writes go through `dispatch`
pub struct Store {
    state: Mutex<FlightState>,
}

impl Store {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            state: Mutex::new(FlightState::new(date)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FlightState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> FlightState {
        self.lock().clone()
    }

    pub fn selection(&self) -> SearchSelection {
        self.lock().selection.clone()
    }

    /// Applies one action and runs the watcher under the same lock. A due
    /// search gets its ticket before any other transition can interleave.
    pub fn dispatch(&self, action: Action) -> Option<PendingSearch> {
        let mut state = self.lock();
        let before = state.selection.clone();
        state.apply(action);
        let change = Change {
            before,
            after: state.selection.clone(),
        };
        let request = auto_search(&change)?;
        let ticket = state.issue(RequestKey::Flights);
        Some(PendingSearch { request, ticket })
    }

    /// Explicit search: reads the selection and issues the ticket atomically
    pub fn begin_search(&self) -> Option<PendingSearch> {
        let mut state = self.lock();
        let request = state.selection.to_request()?;
        let ticket = state.issue(RequestKey::Flights);
        Some(PendingSearch { request, ticket })
    }

    /// Issues a fresh ticket and marks its category as loading
    pub fn begin(&self, key: RequestKey) -> RequestTicket {
        self.lock().issue(key)
    }

    /// Records a response. Returns false if a newer request superseded it.
    pub fn succeed(&self, ticket: RequestTicket, flights: Vec<FlightResult>) -> bool {
        self.lock().apply(Action::RequestSucceeded { ticket, flights })
    }

    pub fn fail(&self, ticket: RequestTicket, message: String) -> bool {
        self.lock().apply(Action::RequestFailed { ticket, message })
    }
}
