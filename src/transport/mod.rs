pub mod schema;

use async_trait::async_trait;
use log::{ debug, error, info };
use std::sync::Arc;
use url::Url;

use crate::error::{ PlannerError, PROXY_ERROR_HEADER };
use crate::models::plan::{ ErrorBody, TripPlanResponse, TripRequest };
use self::schema::PlanSchema;

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &TripRequest) -> Result<TripPlanResponse, PlannerError>;
}

/// Where the client sends its requests. Built once from configuration and
/// handed to the transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Backend called directly when set.
    pub backend_base_url: Option<String>,
    /// Front-end origin used when no backend is configured; requests then go
    /// to `<origin>/api<route>` and rely on the proxy.
    pub origin: String,
}

impl TransportConfig {
    pub fn new(backend_base_url: Option<String>, origin: impl Into<String>) -> Self {
        Self {
            backend_base_url: backend_base_url.filter(|u| !u.trim().is_empty()),
            origin: origin.into(),
        }
    }

    /// Whether requests pass through the front-end proxy.
    pub fn is_proxied(&self) -> bool {
        self.backend_base_url.is_none()
    }

    pub fn endpoint(&self, route: &str) -> Result<Url, PlannerError> {
        let raw = match &self.backend_base_url {
            Some(base) => format!("{}{}", base.trim_end_matches('/'), route),
            None => format!("{}/api{}", self.origin.trim_end_matches('/'), route),
        };
        Url::parse(&raw).map_err(|e| PlannerError::Config(format!("'{}': {}", raw, e)))
    }
}

pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
    proxied: bool,
    schema: Arc<dyn PlanSchema>,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig, schema: Arc<dyn PlanSchema>) -> Result<Self, PlannerError> {
        let endpoint = config.endpoint(schema.route())?;
        info!("Planner transport configured: Endpoint={}", endpoint);
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            proxied: config.is_proxied(),
            schema,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &TripRequest) -> Result<TripPlanResponse, PlannerError> {
        let payload = self.schema.encode(request);
        debug!("POST {} {}", self.endpoint, payload);

        let resp = self.client
            .post(self.endpoint.clone())
            .json(&payload)
            .send().await
            .map_err(|e| {
                error!("Request to {} failed: {}", self.endpoint, e);
                PlannerError::Transport(e.to_string())
            })?;

        let status = resp.status();
        let proxy_failure = self.proxied && resp.headers().contains_key(PROXY_ERROR_HEADER);
        let body = resp.text().await.map_err(|e| PlannerError::Transport(e.to_string()))?;

        if !status.is_success() {
            error!("Backend returned {} from {}", status, self.endpoint);
            return Err(failure_from_status(status.as_u16(), body, proxy_failure));
        }

        decode_response(&body)
    }
}

/// `proxy_failure` is set when the front-end marked the response as its own
/// failure to reach upstream; anything else is the backend's answer.
fn failure_from_status(status: u16, body: String, proxy_failure: bool) -> PlannerError {
    if proxy_failure {
        return match serde_json::from_str::<ErrorBody>(&body) {
            Ok(ErrorBody { error }) => PlannerError::ProxyUpstream(error),
            Err(_) => PlannerError::ProxyUpstream(body),
        };
    }
    PlannerError::Backend { status, detail: body }
}

/// Decodes a success body into the typed response.
pub fn decode_response(body: &str) -> Result<TripPlanResponse, PlannerError> {
    serde_json::from_str(body).map_err(|e| PlannerError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_prefers_configured_backend() {
        let cfg = TransportConfig::new(Some("http://planner:8000/".into()), "http://127.0.0.1:3000");
        assert_eq!(cfg.endpoint("/generate").unwrap().as_str(), "http://planner:8000/generate");
    }

    #[test]
    fn endpoint_falls_back_to_same_origin_api() {
        let cfg = TransportConfig::new(Some("  ".into()), "http://127.0.0.1:3000/");
        assert_eq!(cfg.endpoint("/plans").unwrap().as_str(), "http://127.0.0.1:3000/api/plans");
    }

    #[test]
    fn unparsable_origin_is_a_config_error() {
        let cfg = TransportConfig::new(None, "not a url");
        assert!(matches!(cfg.endpoint("/generate"), Err(PlannerError::Config(_))));
    }

    #[test]
    fn only_marked_responses_are_proxy_failures() {
        let body = r#"{"error":"connection refused"}"#.to_string();
        assert_eq!(
            failure_from_status(500, body.clone(), true),
            PlannerError::ProxyUpstream("connection refused".into())
        );
        // A backend 500 with the same body shape is still a backend error.
        assert_eq!(
            failure_from_status(500, body.clone(), false),
            PlannerError::Backend { status: 500, detail: body }
        );
        assert!(matches!(
            failure_from_status(502, "Bad Gateway".into(), false),
            PlannerError::Backend { status: 502, .. }
        ));
    }

    #[test]
    fn non_json_body_is_a_decode_error() {
        assert!(matches!(decode_response("<html>"), Err(PlannerError::Decode(_))));
        assert_eq!(decode_response("{}").unwrap(), TripPlanResponse::default());
    }
}
