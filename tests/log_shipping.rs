use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_observability::domain::{LogLevel, LogRecord, LogSink, Metrics, MonitoredRoutes};
use axum_observability::{
    build_router, AppState, LogShipper, LokiSink, PrometheusMetrics, RouteLogger,
    ShipperSettings,
};
use common::{request_count, ScriptedTask};
use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;

mod common;

type Pushes = Arc<Mutex<Vec<Value>>>;

/// Minimal stand-in for Loki's push API.
async fn fake_loki(status: StatusCode) -> (String, Pushes) {
    // ---
    let pushes: Pushes = Arc::default();

    let app = Router::new()
        .route(
            "/loki/api/v1/push",
            post(move |State(pushes): State<Pushes>, Json(body): Json<Value>| async move {
                pushes.lock().unwrap().push(body);
                status
            }),
        )
        .with_state(pushes.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), pushes)
}

fn record(level: LogLevel, message: &str, fields: Value) -> LogRecord {
    LogRecord::now(level, message, fields.as_object().cloned().unwrap_or_default())
}

#[tokio::test]
async fn loki_sink_posts_streams_per_level() {
    // ---
    let (host, pushes) = fake_loki(StatusCode::NO_CONTENT).await;
    let sink = LokiSink::new(&host, "it-job", Duration::from_secs(2)).unwrap();

    let batch = vec![
        record(LogLevel::Info, "Request to /", json!({"route": "/", "status": 200})),
        record(LogLevel::Error, "Some error in heavy task", json!({})),
    ];
    sink.push(&batch).await.unwrap();

    let pushes = pushes.lock().unwrap();
    assert_eq!(pushes.len(), 1);

    let streams = pushes[0]["streams"].as_array().unwrap();
    assert_eq!(streams.len(), 2);
    for stream in streams {
        assert_eq!(stream["stream"]["job"], "it-job");
    }

    let info = streams
        .iter()
        .find(|s| s["stream"]["level"] == "info")
        .unwrap();
    let entry = &info["values"][0];
    assert_eq!(entry[0], batch[0].timestamp_ns.to_string());

    let line: Value = serde_json::from_str(entry[1].as_str().unwrap()).unwrap();
    assert_eq!(line["message"], "Request to /");
    assert_eq!(line["route"], "/");
    assert_eq!(line["status"], 200);
}

#[tokio::test]
async fn loki_rejection_is_an_error() {
    // ---
    let (host, _pushes) = fake_loki(StatusCode::BAD_REQUEST).await;
    let sink = LokiSink::new(&host, "it-job", Duration::from_secs(2)).unwrap();

    let result = sink
        .push(&[record(LogLevel::Info, "x", json!({}))])
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn empty_batch_is_not_sent() {
    // ---
    let (host, pushes) = fake_loki(StatusCode::NO_CONTENT).await;
    let sink = LokiSink::new(&host, "it-job", Duration::from_secs(2)).unwrap();

    sink.push(&[]).await.unwrap();
    assert!(pushes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn route_logs_reach_loki_through_the_shipper() {
    // ---
    let (host, pushes) = fake_loki(StatusCode::NO_CONTENT).await;
    let sink = LokiSink::new(&host, "it-job", Duration::from_secs(2)).unwrap();
    let shipper = LogShipper::spawn(Arc::new(sink), ShipperSettings::default());

    let logger = RouteLogger::new(MonitoredRoutes::new(["/"]), shipper.handle());
    let state = AppState::new(
        Arc::new(PrometheusMetrics::new().unwrap()),
        logger,
        Arc::new(ScriptedTask::Succeed(Duration::from_millis(1))),
        "/metrics",
    );
    let router = build_router(state);

    let response = router
        .oneshot(
            axum::http::Request::get("/")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    shipper.shutdown().await;

    let pushes = pushes.lock().unwrap();
    let lines: Vec<Value> = pushes
        .iter()
        .flat_map(|p| p["streams"].as_array().cloned().unwrap_or_default())
        .flat_map(|s| s["values"].as_array().cloned().unwrap_or_default())
        .map(|v| serde_json::from_str(v[1].as_str().unwrap()).unwrap())
        .collect();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["message"], "Request to /");
    assert_eq!(lines[0]["method"], "GET");
}

#[tokio::test]
async fn unreachable_collector_never_breaks_requests() {
    // ---
    // Nothing listens on port 9 locally; pushes fail fast.
    let sink = LokiSink::new("http://127.0.0.1:9", "it-job", Duration::from_millis(200)).unwrap();
    let shipper = LogShipper::spawn(
        Arc::new(sink),
        ShipperSettings {
            capacity: 8,
            batch_size: 1,
            flush_interval: Duration::from_millis(10),
        },
    );

    let metrics = Arc::new(PrometheusMetrics::new().unwrap());
    let logger = RouteLogger::new(MonitoredRoutes::new(["/"]), shipper.handle());
    let state = AppState::new(
        metrics.clone(),
        logger,
        Arc::new(ScriptedTask::Succeed(Duration::from_millis(1))),
        "/metrics",
    );
    let router = build_router(state);

    for _ in 0..3 {
        let response = router
            .clone()
            .oneshot(
                axum::http::Request::get("/")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(request_count(&metrics.render(), "GET", "/"), 3.0);

    shipper.shutdown().await;
}

#[tokio::test]
async fn overflowing_queue_counts_dropped_records() {
    // ---
    let (host, pushes) = fake_loki(StatusCode::NO_CONTENT).await;
    let sink = LokiSink::new(&host, "it-job", Duration::from_secs(2)).unwrap();
    let shipper = LogShipper::spawn(
        Arc::new(sink),
        ShipperSettings {
            capacity: 3,
            batch_size: 100,
            flush_interval: Duration::from_secs(3600),
        },
    );
    let logger = RouteLogger::new(MonitoredRoutes::default(), shipper.handle());

    for i in 0..5 {
        logger.info(&format!("event {i}"), Value::Object(Map::new()));
    }
    assert_eq!(shipper.dropped(), 2);

    shipper.shutdown().await;

    let pushes = pushes.lock().unwrap();
    let messages: Vec<String> = pushes
        .iter()
        .flat_map(|p| p["streams"].as_array().cloned().unwrap_or_default())
        .flat_map(|s| s["values"].as_array().cloned().unwrap_or_default())
        .map(|v| {
            let line: Value = serde_json::from_str(v[1].as_str().unwrap()).unwrap();
            line["message"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(messages, vec!["event 2", "event 3", "event 4"]);
}
