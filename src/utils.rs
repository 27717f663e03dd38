/// Utility functions
use chrono::{DateTime, NaiveDateTime};

/// Calculate distance between two coordinates using Haversine formula
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let rlat1 = lat1.to_radians();
    let rlat2 = lat2.to_radians();
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2) + rlat1.cos() * rlat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    6371.0 * c
}

/// Render upstream total minutes as "<h>h <m>m"
pub fn format_duration(minutes: Option<u64>) -> String {
    match minutes {
        Some(m) => format!("{}h {}m", m / 60, m % 60),
        None => "Unknown".to_string(),
    }
}

/// Parse an upstream timestamp, with or without offset
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .ok()
}

/// "HH:MM" wall-clock time, "--:--" when unknown
pub fn format_clock_time(s: &str) -> String {
    parse_timestamp(s)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

pub fn format_stops(stops: u32) -> String {
    match stops {
        0 => "Direct".to_string(),
        1 => "1 stop".to_string(),
        n => format!("{} stops", n),
    }
}

pub fn passengers_label(adults: u8) -> String {
    if adults == 1 {
        "1 Adult".to_string()
    } else {
        format!("{} Adults", adults)
    }
}

/// Query length as the user perceives it
pub fn query_len(query: &str) -> usize {
    query.chars().count()
}

/// `fallback` when `value` is empty
pub fn or_fallback(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
