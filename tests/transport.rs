use axum::routing::post;
use axum::{ http::StatusCode, Json, Router };
use chrono::NaiveDate;
use riff_planner::controller::{ ControllerMode, FormController, SubmitOutcome };
use riff_planner::error::PlannerError;
use riff_planner::models::plan::{ DateRange, TripRequest };
use riff_planner::render::{ render_items, ViewMode };
use riff_planner::server::api::{ router, AppState };
use riff_planner::transport::schema::{ DestinationSchema, QuerySchema };
use riff_planner::transport::{ HttpTransport, Transport, TransportConfig };
use serde_json::{ json, Value };
use std::sync::atomic::{ AtomicUsize, Ordering };
use std::sync::{ Arc, Mutex };

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Stands in for the planning backend and records what it received.
async fn spawn_backend(calls: Arc<AtomicUsize>, seen: Arc<Mutex<Vec<Value>>>) -> String {
    let app = Router::new().route(
        "/generate",
        post(move |Json(body): Json<Value>| {
            let calls = calls.clone();
            let seen = seen.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                seen.lock().unwrap().push(body);
                Json(json!({
                    "ideas": [{
                        "title": "Night market",
                        "description": "Street food crawl",
                        "image": "",
                        "link": "https://www.google.com/maps/search/?api=1&query=Night+market"
                    }],
                    "timeline": [{
                        "time": "Day 1, 9:00 AM",
                        "title": "Temple visit",
                        "description": "Morning at Longshan Temple."
                    }]
                }))
            }
        }),
    );
    spawn(app).await
}

#[tokio::test]
async fn direct_backend_call_decodes_ideas_and_timeline() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let backend = spawn_backend(calls.clone(), seen.clone()).await;

    let config = TransportConfig::new(Some(backend), "http://127.0.0.1:3000");
    let transport = HttpTransport::new(&config, Arc::new(QuerySchema)).unwrap();

    let range = DateRange::new(NaiveDate::from_ymd_opt(2024, 1, 1), NaiveDate::from_ymd_opt(2024, 1, 3));
    let request = TripRequest::new("Weekend in Taipei", Some(range)).unwrap();
    let response = transport.send(&request).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        seen.lock().unwrap()[0],
        json!({ "query": "Weekend in Taipei", "date": "2024-01-01 - 2024-01-03" })
    );

    let ideas = render_items(&response, ViewMode::Ideas);
    assert_eq!(ideas.len(), 1);
    assert_eq!(ideas[0].image, None);
    let timeline = render_items(&response, ViewMode::Timeline);
    assert_eq!(timeline[0].body, "Morning at Longshan Temple.");
    assert!(render_items(&response, ViewMode::Ideas).iter().all(|i| i.time.is_none()));
}

#[tokio::test]
async fn same_origin_call_goes_through_front_end_proxy() {
    let calls = Arc::new(AtomicUsize::new(0));
    let backend = spawn_backend(calls.clone(), Arc::new(Mutex::new(Vec::new()))).await;
    let front_end = spawn(router(AppState::new(&backend))).await;

    let config = TransportConfig::new(None, front_end);
    let transport = Arc::new(HttpTransport::new(&config, Arc::new(QuerySchema)).unwrap());
    assert!(transport.endpoint().path().ends_with("/api/generate"));

    let controller = FormController::new(transport, ControllerMode::Chat);
    assert_eq!(controller.submit("Weekend in Taipei", None).await, SubmitOutcome::Applied);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let state = controller.snapshot();
    assert_eq!(state.history.len(), 2);
    assert_eq!(state.history[1].text, "(No answer returned)");
}

#[tokio::test]
async fn form_submit_against_demo_route() {
    let front_end = spawn(router(AppState::new("http://127.0.0.1:1"))).await;
    let config = TransportConfig::new(None, front_end);
    let transport = HttpTransport::new(&config, Arc::new(DestinationSchema)).unwrap();
    let controller = FormController::new(Arc::new(transport), ControllerMode::Form);

    assert_eq!(controller.submit("Lisbon, Portugal", None).await, SubmitOutcome::Applied);
    let plan = controller.snapshot().plan.unwrap();
    assert_eq!(plan.destination.as_deref(), Some("Lisbon, Portugal"));
    assert_eq!(plan.timeline.len(), 3);
    assert!(plan.ideas.is_empty());
}

#[tokio::test]
async fn unreachable_proxy_upstream_surfaces_as_proxy_error() {
    let front_end = spawn(router(AppState::new("http://127.0.0.1:1"))).await;
    let config = TransportConfig::new(None, front_end);
    let transport = HttpTransport::new(&config, Arc::new(QuerySchema)).unwrap();
    let controller = FormController::new(Arc::new(transport), ControllerMode::Chat);

    let outcome = controller.submit("Weekend in Taipei", None).await;
    assert!(matches!(outcome, SubmitOutcome::Failed(PlannerError::ProxyUpstream(_))));

    let state = controller.snapshot();
    assert!(!state.loading);
    assert!(state.error.unwrap().starts_with("Proxy could not reach upstream: "));
    assert_eq!(state.history.len(), 1);
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let config = TransportConfig::new(Some("http://127.0.0.1:1".into()), "http://127.0.0.1:3000");
    let transport = HttpTransport::new(&config, Arc::new(QuerySchema)).unwrap();
    let request = TripRequest::new("anywhere", None).unwrap();
    assert!(matches!(transport.send(&request).await, Err(PlannerError::Transport(_))));
}

#[tokio::test]
async fn backend_status_and_body_are_reported() {
    let app = Router::new().route(
        "/generate",
        post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "model overloaded") }),
    );
    let backend = spawn(app).await;
    let config = TransportConfig::new(Some(backend), "http://127.0.0.1:3000");
    let transport = HttpTransport::new(&config, Arc::new(QuerySchema)).unwrap();
    let request = TripRequest::new("anywhere", None).unwrap();

    let err = transport.send(&request).await.unwrap_err();
    assert_eq!(err, PlannerError::Backend { status: 503, detail: "model overloaded".into() });
    assert_eq!(err.to_string(), "Backend error: HTTP 503: model overloaded");
}

#[tokio::test]
async fn wrongly_shaped_success_body_is_a_decode_error() {
    let app = Router::new().route(
        "/generate",
        post(|| async { Json(json!({ "timeline": "tomorrow" })) }),
    );
    let backend = spawn(app).await;
    let config = TransportConfig::new(Some(backend), "http://127.0.0.1:3000");
    let transport = HttpTransport::new(&config, Arc::new(QuerySchema)).unwrap();
    let request = TripRequest::new("anywhere", None).unwrap();

    assert!(matches!(transport.send(&request).await, Err(PlannerError::Decode(_))));
}

#[tokio::test]
async fn relayed_backend_500_is_not_mistaken_for_proxy_failure() {
    let app = Router::new().route(
        "/generate",
        post(|| async {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "model crashed" })))
        }),
    );
    let backend = spawn(app).await;
    let front_end = spawn(router(AppState::new(&backend))).await;

    let config = TransportConfig::new(None, front_end);
    let transport = HttpTransport::new(&config, Arc::new(QuerySchema)).unwrap();
    let request = TripRequest::new("anywhere", None).unwrap();

    match transport.send(&request).await {
        Err(PlannerError::Backend { status, detail }) => {
            assert_eq!(status, 500);
            assert!(detail.contains("model crashed"));
        }
        other => panic!("expected a backend error, got {:?}", other),
    }
}
