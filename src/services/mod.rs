/// Search form controller: field state machines and search orchestration
use crate::clients::{AirportDirectory, FlightSearch, MIN_QUERY_LEN};
use crate::domain::{Airport, Slot};
use crate::errors::{ApiError, ApiResult};
use crate::store::{Action, PendingSearch, RequestKey, Store};
use crate::utils::query_len;
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

pub const MAX_PASSENGERS: u8 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldState {
    Idle,
    Querying,
    DropdownOpen,
    Committed,
}

/// One airport text input with its dropdown
#[derive(Debug, Clone)]
pub struct FieldInput {
    pub text: String,
    pub state: FieldState,
    pub candidates: Vec<Arc<Airport>>,
    generation: u64,
}

impl Default for FieldInput {
    fn default() -> Self {
        Self {
            text: String::new(),
            state: FieldState::Idle,
            candidates: Vec::new(),
            generation: 0,
        }
    }
}

impl FieldInput {
    fn close(&mut self) {
        self.state = FieldState::Idle;
        self.candidates.clear();
    }
}

/// Form-local state; lookup candidates never reach the store
#[derive(Debug, Clone)]
pub struct FormState {
    pub fields: [FieldInput; 2],
    pub min_date: NaiveDate,
}

impl FormState {
    pub fn field(&self, slot: Slot) -> &FieldInput {
        &self.fields[slot.index()]
    }
}

pub struct SearchController<A, F> {
    airports: A,
    flights: F,
    store: Store,
    form: Mutex<FormState>,
}

impl<A, F> SearchController<A, F>
where
    A: AirportDirectory,
    F: FlightSearch,
{
    pub fn new(airports: A, flights: F, default_date: NaiveDate, min_date: NaiveDate) -> Self {
        Self {
            airports,
            flights,
            store: Store::new(default_date),
            form: Mutex::new(FormState {
                fields: Default::default(),
                min_date,
            }),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn form(&self) -> FormState {
        self.lock_form().clone()
    }

    fn lock_form(&self) -> MutexGuard<'_, FormState> {
        self.form.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Keystroke in an airport field
    pub async fn input(&self, slot: Slot, text: &str) -> ApiResult<()> {
        let generation = {
            let mut form = self.lock_form();
            let field = &mut form.fields[slot.index()];
            field.text = text.to_string();
            field.generation += 1;
            if query_len(text) < MIN_QUERY_LEN {
                debug!("Suppressing {} lookup for short query '{}'", slot, text);
                field.close();
                return Ok(());
            }
            field.state = FieldState::Querying;
            field.generation
        };

        info!("Looking up {} airports for '{}'", slot, text);
        let ticket = self.store.begin(RequestKey::Lookup(slot));

        match self.airports.search_airports(text).await {
            Ok(found) => {
                self.store.succeed(ticket, Vec::new());
                let candidates: Vec<Arc<Airport>> = found
                    .into_iter()
                    .filter(Airport::is_airport)
                    .map(Arc::new)
                    .collect();

                let mut form = self.lock_form();
                let field = &mut form.fields[slot.index()];
                if field.generation != generation {
                    debug!("Dropping superseded {} lookup for '{}'", slot, text);
                    return Ok(());
                }
                field.state = if candidates.is_empty() {
                    FieldState::Idle
                } else {
                    FieldState::DropdownOpen
                };
                field.candidates = candidates;
            }
            Err(e) => {
                warn!("Airport lookup for '{}' failed: {}", text, e);
                self.store.fail(ticket, e.to_string());

                let mut form = self.lock_form();
                let field = &mut form.fields[slot.index()];
                if field.generation == generation {
                    field.close();
                }
            }
        }
        Ok(())
    }

    /// Commits a dropdown candidate into the store
    pub async fn select(&self, slot: Slot, sky_id: &str) -> ApiResult<()> {
        let airport = {
            let mut form = self.lock_form();
            let field = &mut form.fields[slot.index()];
            if field.state != FieldState::DropdownOpen {
                return Err(ApiError::InvalidInput(format!("{} dropdown is not open", slot)));
            }
            let airport = field
                .candidates
                .iter()
                .find(|a| a.sky_id == sky_id)
                .cloned()
                .ok_or_else(|| ApiError::NotFound(format!("airport {} in {} dropdown", sky_id, slot)))?;

            field.text = airport.display_title().to_string();
            field.state = FieldState::Committed;
            field.candidates.clear();
            airport
        };

        info!("Selected {} airport {}", slot, airport.sky_id);
        let pending = self.store.dispatch(Action::SelectAirport { slot, airport });
        self.run_pending(pending).await;
        Ok(())
    }

    /// Pointer or focus landed outside the field's dropdown
    pub fn dismiss(&self, slot: Slot) {
        let mut form = self.lock_form();
        let field = &mut form.fields[slot.index()];
        match field.state {
            FieldState::DropdownOpen => field.close(),
            FieldState::Querying => {
                // a response still in flight must not reopen the dropdown
                field.generation += 1;
                field.close();
            }
            FieldState::Idle | FieldState::Committed => {}
        }
    }

    pub async fn set_date(&self, date: NaiveDate) -> ApiResult<()> {
        let min_date = self.lock_form().min_date;
        if date < min_date {
            return Err(ApiError::InvalidInput(format!(
                "departure date {} is before {}",
                date, min_date
            )));
        }
        let pending = self.store.dispatch(Action::SetDate(date));
        self.run_pending(pending).await;
        Ok(())
    }

    pub fn set_passengers(&self, adults: u8) -> ApiResult<()> {
        if !(1..=MAX_PASSENGERS).contains(&adults) {
            return Err(ApiError::InvalidInput(format!(
                "passengers must be between 1 and {}",
                MAX_PASSENGERS
            )));
        }
        self.store.dispatch(Action::SetPassengers(adults));
        Ok(())
    }

    /// Explicit Search: re-fetches whenever both airports are committed.
    /// Returns whether a search was issued.
    pub async fn search(&self) -> bool {
        match self.store.begin_search() {
            Some(pending) => {
                self.run_search(pending).await;
                true
            }
            None => {
                debug!("Search ignored, origin and destination are not both selected");
                false
            }
        }
    }

    pub fn clear(&self) {
        self.store.dispatch(Action::Clear);
    }

    async fn run_pending(&self, pending: Option<PendingSearch>) {
        if let Some(pending) = pending {
            self.run_search(pending).await;
        }
    }

    async fn run_search(&self, pending: PendingSearch) {
        let PendingSearch { request, ticket } = pending;
        info!(
            "Searching flights {} -> {} on {} (generation {})",
            request.origin.sky_id,
            request.destination.sky_id,
            request.iso_date(),
            ticket.generation
        );

        match self.flights.search_flights(&request).await {
            Ok(results) => {
                let count = results.len();
                if self.store.succeed(ticket, results) {
                    info!("Flight search generation {} returned {} results", ticket.generation, count);
                } else {
                    info!("Flight search generation {} superseded, response discarded", ticket.generation);
                }
            }
            Err(e) => {
                error!("Flight search generation {} failed: {}", ticket.generation, e);
                self.store.fail(ticket, e.to_string());
            }
        }
    }
}
