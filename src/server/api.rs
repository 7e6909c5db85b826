use axum::{
    body::Bytes,
    extract::{ Path, State },
    http::{ header, HeaderValue, StatusCode },
    response::{ IntoResponse, Response },
    routing::post,
    Json,
    Router,
};
use log::{ info, warn, error };
use std::sync::Arc;
use tower_http::cors::{ Any, CorsLayer };

use crate::error::ApiError;
use crate::models::plan::{ DayPlan, PlansRequest, TripPlanResponse };

pub const DEMO_NOTES: &str =
    "This is a demo response. Connect your Gemini-powered backend to return live plans.";

const DEMO_TIMELINE: [(&str, &str); 3] = [
    (
        "Day 1 — Arrival & Old Town",
        "Check in, explore the historic district, and grab dinner at a neighborhood spot.",
    ),
    (
        "Day 2 — Museums & Waterfront",
        "Morning at a local museum, afternoon stroll along the waterfront, sunset viewpoints.",
    ),
    (
        "Day 3 — Day Trip Adventure",
        "Short train ride to nearby villages, sample regional food, and head back in the evening.",
    ),
];

#[derive(Clone)]
pub struct AppState {
    client: reqwest::Client,
    backend_url: Arc<str>,
}

impl AppState {
    pub fn new(backend_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            backend_url: Arc::from(backend_url.trim_end_matches('/')),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/plans", post(plans_handler))
        .route("/api/{*path}", post(proxy_handler))
        .layer(cors)
        .with_state(state)
}

pub fn demo_plan(destination: &str) -> TripPlanResponse {
    TripPlanResponse {
        destination: Some(destination.to_string()),
        timeline: DEMO_TIMELINE.iter()
            .map(|(title, details)| DayPlan {
                title: title.to_string(),
                details: details.to_string(),
                time: None,
                image: None,
                link: None,
            })
            .collect(),
        notes: Some(DEMO_NOTES.to_string()),
        ..Default::default()
    }
}

async fn plans_handler(body: Bytes) -> Result<Json<TripPlanResponse>, ApiError> {
    let req: PlansRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!("Rejected /api/plans payload: {}", e);
        ApiError::MalformedPayload
    })?;

    let destination = req.destination
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or(ApiError::MissingDestination)?;

    info!("Demo plan requested for '{}'", destination);
    Ok(Json(demo_plan(destination)))
}

async fn proxy_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let url = format!("{}/{}", state.backend_url, path);
    info!("Forwarding /api/{} to {}", path, url);

    let upstream = state.client
        .post(&url)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .send().await
        .map_err(|e| {
            error!("Upstream {} unreachable: {}", url, e);
            ApiError::Upstream(e.to_string())
        })?;

    let status = StatusCode::from_u16(upstream.status().as_u16())
        .unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = upstream.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| HeaderValue::from_str(v).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));
    let bytes = upstream.bytes().await.map_err(|e| {
        error!("Failed to read upstream body from {}: {}", url, e);
        ApiError::Upstream(e.to_string())
    })?;

    if !status.is_success() {
        warn!("Upstream {} returned {}", url, status);
    }

    Ok((status, [(header::CONTENT_TYPE, content_type)], bytes).into_response())
}
