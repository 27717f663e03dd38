/// Application routes configuration
use crate::handlers::{
    clear, field_dismiss, field_input, field_select, get_form, get_map, get_results, health,
    search, set_date, set_passengers, AppState,
};
use axum::{
    routing::{get, post, put},
    Router,
};

/// Build the application router with all routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health))
        // Form events
        .route("/form", get(get_form))
        .route("/form/date", put(set_date))
        .route("/form/passengers", put(set_passengers))
        .route("/form/:field/input", post(field_input))
        .route("/form/:field/select", post(field_select))
        .route("/form/:field/dismiss", post(field_dismiss))
        // Search lifecycle
        .route("/search", post(search))
        .route("/clear", post(clear))
        // Views
        .route("/results", get(get_results))
        .route("/map", get(get_map))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{AirportClient, FlightClient, HttpClient};
    use crate::config::MarketConfig;
    use crate::handlers::Controller;
    use crate::test_support::{spawn_fake_upstream, test_date, test_upstream_config, FakeUpstream};
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn app() -> (Router, FakeUpstream) {
        let upstream = spawn_fake_upstream().await;
        let http = HttpClient::new(&test_upstream_config(&upstream.base_url)).unwrap();
        let controller: Controller = Controller::new(
            AirportClient::new(http.clone()),
            FlightClient::new(http, MarketConfig::default()),
            test_date(),
            test_date(),
        );
        let state = AppState {
            controller: Arc::new(controller),
        };
        (build_router(state), upstream)
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(b) => builder
                .header("content-type", "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = app.clone().oneshot(request).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _upstream) = app().await;
        let (status, body) = call(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_full_search_flow() {
        let (app, upstream) = app().await;

        let (_, form) = call(&app, Method::POST, "/form/origin/input", Some(json!({"text": "n"}))).await;
        assert_eq!(form["origin"]["state"], "idle");
        assert!(upstream.airport_queries().is_empty());

        let (status, form) =
            call(&app, Method::POST, "/form/origin/input", Some(json!({"text": "new york"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(form["ok"], true);
        assert_eq!(form["origin"]["state"], "dropdown_open");
        let dropdown = form["origin"]["dropdown"].as_array().unwrap();
        assert_eq!(dropdown.len(), 2);
        assert!(dropdown.iter().all(|d| d["entity_type"] == "AIRPORT"));

        let (_, form) =
            call(&app, Method::POST, "/form/origin/select", Some(json!({"sky_id": "JFK"}))).await;
        assert_eq!(form["origin"]["state"], "committed");
        assert_eq!(form["origin"]["text"], "JFK Airport (JFK)");
        assert!(upstream.flight_calls().is_empty());

        call(&app, Method::POST, "/form/destination/input", Some(json!({"text": "los angeles"}))).await;
        let (_, form) =
            call(&app, Method::POST, "/form/destination/select", Some(json!({"sky_id": "LAX"}))).await;
        assert_eq!(form["can_search"], true);

        let calls = upstream.flight_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0]["date"], "2025-04-20");

        let (_, results) = call(&app, Method::GET, "/results", None).await;
        assert_eq!(results["loading"], false);
        assert_eq!(results["header"]["count_label"], "10 flights found");
        assert_eq!(results["cards"].as_array().unwrap().len(), 10);
        assert_eq!(results["cards"][0]["departure_time"], "08:00");

        let (_, map) = call(&app, Method::GET, "/map", None).await;
        assert_eq!(map["overlay"]["origin"]["code"], "JFK");
        assert_eq!(map["overlay"]["path"].as_array().unwrap().len(), 2);

        let (_, form) = call(&app, Method::PUT, "/form/date", Some(json!({"date": "2025-04-22"}))).await;
        assert_eq!(form["date"]["value"], "2025-04-22");
        assert_eq!(upstream.flight_calls().len(), 2);

        let (_, searched) = call(&app, Method::POST, "/search", None).await;
        assert_eq!(searched["issued"], true);
        assert_eq!(upstream.flight_calls().len(), 3);

        let (_, cleared) = call(&app, Method::POST, "/clear", None).await;
        assert!(cleared["cards"].as_array().unwrap().is_empty());
        assert!(cleared["header"].is_null());
    }

    #[tokio::test]
    async fn test_search_without_selection_is_noop() {
        let (app, upstream) = app().await;
        let (status, body) = call(&app, Method::POST, "/search", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["issued"], false);
        assert!(upstream.flight_calls().is_empty());

        let (_, map) = call(&app, Method::GET, "/map", None).await;
        assert!(map["overlay"].is_null());
    }

    #[tokio::test]
    async fn test_invalid_events_are_rejected() {
        let (app, _upstream) = app().await;

        let (status, body) = call(&app, Method::PUT, "/form/date", Some(json!({"date": "2025-04-01"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"]["code"], "INVALID_INPUT");

        let (status, _) = call(&app, Method::PUT, "/form/passengers", Some(json!({"adults": 12}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) =
            call(&app, Method::POST, "/form/origin/select", Some(json!({"sky_id": "JFK"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_lookup_error_lands_in_results_view() {
        let (app, _upstream) = app().await;
        let (status, form) =
            call(&app, Method::POST, "/form/origin/input", Some(json!({"text": "fail-with-message"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(form["origin"]["state"], "idle");

        let (_, results) = call(&app, Method::GET, "/results", None).await;
        assert_eq!(results["error"], "Upstream is down");
    }

    #[tokio::test]
    async fn test_malformed_candidate_does_not_hide_the_rest() {
        let (app, _upstream) = app().await;
        let (status, form) =
            call(&app, Method::POST, "/form/origin/input", Some(json!({"text": "broken"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(form["origin"]["state"], "dropdown_open");
        assert_eq!(form["origin"]["dropdown"].as_array().unwrap().len(), 2);

        let (_, results) = call(&app, Method::GET, "/results", None).await;
        assert!(results["error"].is_null());
    }

    #[tokio::test]
    async fn test_dismiss_and_passengers() {
        let (app, _upstream) = app().await;
        call(&app, Method::POST, "/form/destination/input", Some(json!({"text": "new york"}))).await;
        let (_, form) = call(&app, Method::POST, "/form/destination/dismiss", None).await;
        assert_eq!(form["destination"]["state"], "idle");
        assert!(form["destination"]["dropdown"].as_array().unwrap().is_empty());

        let (_, form) = call(&app, Method::PUT, "/form/passengers", Some(json!({"adults": 3}))).await;
        assert_eq!(form["passengers"]["label"], "3 Adults");
    }
}
