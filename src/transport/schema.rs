use serde_json::{ json, Value as JsonValue };

use crate::models::plan::{ GenerateRequest, TripRequest };

/// Request shape of one planning endpoint.
pub trait PlanSchema: Send + Sync {
    /// Path below the backend base (or below `/api` when proxied).
    fn route(&self) -> &'static str;

    fn encode(&self, request: &TripRequest) -> JsonValue;
}

/// `POST /plans` with `{ "destination": ... }`, answered by the demo route.
#[derive(Debug, Clone, Copy, Default)]
pub struct DestinationSchema;

impl PlanSchema for DestinationSchema {
    fn route(&self) -> &'static str {
        "/plans"
    }

    fn encode(&self, request: &TripRequest) -> JsonValue {
        json!({ "destination": request.query })
    }
}

/// `POST /generate` with `{ "query": ..., "date": ... }`, answered by the
/// planning backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuerySchema;

impl PlanSchema for QuerySchema {
    fn route(&self) -> &'static str {
        "/generate"
    }

    fn encode(&self, request: &TripRequest) -> JsonValue {
        let body = GenerateRequest {
            query: request.query.clone(),
            date: request.date_range.and_then(|r| r.to_query_date()),
        };
        serde_json::to_value(body).unwrap_or_else(|_| json!({ "query": request.query }))
    }
}
