/// HTTP request handlers
use crate::clients::{AirportClient, FlightClient};
use crate::domain::Slot;
use crate::errors::ApiError;
use crate::services::SearchController;
use crate::views::{form_view, map_overlay, results_view, FormView, MapOverlay, ResultsView};
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type Controller = SearchController<AirportClient, FlightClient>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<Controller>,
}

/// Successful response wrapper
#[derive(Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub ok: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self { ok: true, data }
    }
}

type Reply<T> = Result<Json<SuccessResponse<T>>, ApiError>;

fn reply<T: Serialize>(data: T) -> Reply<T> {
    Ok(Json(SuccessResponse::new(data)))
}

/// Health check response
#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub now: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct InputBody {
    pub text: String,
}

#[derive(Deserialize)]
pub struct SelectBody {
    pub sky_id: String,
}

#[derive(Deserialize)]
pub struct DateBody {
    pub date: NaiveDate,
}

#[derive(Deserialize)]
pub struct PassengersBody {
    pub adults: u8,
}

#[derive(Serialize)]
pub struct SearchReply {
    pub issued: bool,
    pub results: ResultsView,
}

#[derive(Serialize)]
pub struct MapReply {
    pub overlay: Option<MapOverlay>,
}

fn current_form(state: &AppState) -> FormView {
    let controller = &state.controller;
    form_view(&controller.form(), &controller.store().selection())
}

fn current_results(state: &AppState) -> ResultsView {
    results_view(&state.controller.store().snapshot())
}

/// Health check handler
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        now: Utc::now(),
    })
}

/// Keystroke in the origin or destination field
pub async fn field_input(
    Path(slot): Path<Slot>,
    State(state): State<AppState>,
    Json(body): Json<InputBody>,
) -> Reply<FormView> {
    state.controller.input(slot, &body.text).await?;
    reply(current_form(&state))
}

/// Pick a dropdown candidate
pub async fn field_select(
    Path(slot): Path<Slot>,
    State(state): State<AppState>,
    Json(body): Json<SelectBody>,
) -> Reply<FormView> {
    state.controller.select(slot, &body.sky_id).await?;
    reply(current_form(&state))
}

/// Click or focus outside a field's dropdown
pub async fn field_dismiss(Path(slot): Path<Slot>, State(state): State<AppState>) -> Reply<FormView> {
    state.controller.dismiss(slot);
    reply(current_form(&state))
}

pub async fn set_date(State(state): State<AppState>, Json(body): Json<DateBody>) -> Reply<FormView> {
    state.controller.set_date(body.date).await?;
    reply(current_form(&state))
}

pub async fn set_passengers(
    State(state): State<AppState>,
    Json(body): Json<PassengersBody>,
) -> Reply<FormView> {
    state.controller.set_passengers(body.adults)?;
    reply(current_form(&state))
}

/// Explicit Search button
pub async fn search(State(state): State<AppState>) -> Reply<SearchReply> {
    let issued = state.controller.search().await;
    reply(SearchReply {
        issued,
        results: current_results(&state),
    })
}

pub async fn clear(State(state): State<AppState>) -> Reply<ResultsView> {
    state.controller.clear();
    reply(current_results(&state))
}

pub async fn get_form(State(state): State<AppState>) -> Reply<FormView> {
    reply(current_form(&state))
}

pub async fn get_results(State(state): State<AppState>) -> Reply<ResultsView> {
    reply(current_results(&state))
}

pub async fn get_map(State(state): State<AppState>) -> Reply<MapReply> {
    let selection = state.controller.store().selection();
    reply(MapReply {
        overlay: map_overlay(&selection),
    })
}
