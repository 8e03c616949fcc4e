use std::sync::Arc;
use std::time::{Duration, Instant};

use cockpit::audit::{AuditBackend, MemoryLog, RestSink};
use cockpit::service::{serve_on, AppState};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

struct TestServer {
    base: String,
    state: Arc<AppState>,
    shutdown: CancellationToken,
    client: reqwest::Client,
}

impl TestServer {
    async fn start(audit_capacity: usize) -> Self {
        Self::with_backend(AuditBackend::Memory(MemoryLog::new(audit_capacity))).await
    }

    async fn with_backend(audit: AuditBackend) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(AppState::new(audit, 100).unwrap());
        let shutdown = CancellationToken::new();
        tokio::spawn(serve_on(listener, state.clone(), shutdown.clone()));
        Self {
            base: format!("http://{addr}"),
            state,
            shutdown,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let resp = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap())
    }

    async fn get(&self, path: &str) -> Value {
        self.client
            .get(self.url(path))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    fn log(&self) -> &MemoryLog {
        match &self.state.audit {
            AuditBackend::Memory(log) => log,
            AuditBackend::Rest(_) => unreachable!("tests use the memory log"),
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// A prior record as a client would hold it: core readings only, no optional ones.
fn parked_prior() -> Value {
    json!({
        "speed": 0.0,
        "gear": "P",
        "safety_level": 5,
        "distraction_level": 0.0,
        "ar_opacity": 0.3,
        "battery_percentage": 72.0,
        "cabin_temp": 22.0,
        "location": "地下车库",
        "weather": "晴天",
        "aeb_triggered": false
    })
}

fn parked_music() -> Value {
    json!({
        "user_input": "播放音乐",
        "gear": "P",
        "speed": 0,
        "distraction_level": 0,
        "safety_level": 5,
        "vehicle_state_id": "state-1"
    })
}

#[tokio::test]
async fn test_decide_returns_decision_and_logs_it() {
    let server = TestServer::start(100).await;
    let (status, body) = server.post("/decide", parked_music()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], json!(true));
    assert_eq!(body["tier"], json!("parked"));
    assert_eq!(body["intent"], json!("music"));
    for field in ["response", "reasoning", "action_taken", "risk_assessment"] {
        assert!(
            !body[field].as_str().unwrap_or_default().is_empty(),
            "{field} empty"
        );
    }
    assert!(body["response_time_ms"].is_u64());
    let id = body["decision_id"].as_str().expect("decision id");

    let records = server.log().decisions().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id.to_string(), id);
    assert_eq!(records[0].user_input, "播放音乐");
    assert_eq!(records[0].vehicle_state_id.as_deref(), Some("state-1"));
}

#[tokio::test]
async fn test_decide_emergency_scenario_over_http() {
    let server = TestServer::start(100).await;
    let (status, body) = server
        .post(
            "/decide",
            json!({
                "user_input": "导航",
                "gear": "D",
                "speed": 70,
                "distraction_level": 0,
                "safety_level": 3,
                "aeb_triggered": true
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], json!(false));
    assert!(body["response"].as_str().unwrap().contains("AEB"));
}

#[tokio::test]
async fn test_decide_rejects_malformed_context() {
    let server = TestServer::start(100).await;

    let mut missing_gear = parked_music();
    missing_gear.as_object_mut().unwrap().remove("gear");
    let (status, body) = server.post("/decide", missing_gear).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], json!("gear"));

    let mut bad_battery = parked_music();
    bad_battery["battery_percentage"] = json!(130);
    let (status, body) = server.post("/decide", bad_battery).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], json!("battery_percentage"));

    let mut bad_gear = parked_music();
    bad_gear["gear"] = json!("X");
    let (status, _) = server.post("/decide", bad_gear).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let resp = server
        .client
        .post(server.url("/decide"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // nothing reached the audit log
    assert!(server.log().decisions().await.is_empty());
    let metrics = server.get("/metrics").await;
    assert_eq!(metrics["rejected_requests"], json!(4));
}

#[tokio::test]
async fn test_audit_failure_keeps_the_decision() {
    let server = TestServer::start(0).await;
    let (status, body) = server.post("/decide", parked_music()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], json!(true));
    assert!(body["decision_id"].is_null());

    let metrics = server.get("/metrics").await;
    assert_eq!(metrics["audit"]["decision_write_failures"], json!(1));
    assert_eq!(metrics["decisions"]["total"], json!(1));
}

#[tokio::test]
async fn test_preflight_and_cors_headers() {
    let server = TestServer::start(10).await;
    for path in ["/decide", "/synthesize-state"] {
        let resp = server
            .client
            .request(Method::OPTIONS, server.url(path))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
        assert!(resp.headers().contains_key("access-control-allow-headers"));
        assert!(resp.text().await.unwrap().is_empty());
    }

    let resp = server.client.get(server.url("/healthz")).send().await.unwrap();
    assert_eq!(
        resp.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], json!("ok"));
}

#[tokio::test]
async fn test_synthesize_fresh_state() {
    let server = TestServer::start(10).await;
    let resp = server
        .client
        .post(server.url("/synthesize-state"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();

    let level = body["safety_level"].as_u64().unwrap();
    assert!((1..=5).contains(&level));
    let opacity = body["ar_opacity"].as_f64().unwrap();
    assert!((0.3..=0.8).contains(&opacity));
    assert!(body["id"].is_string());
    assert!(body["created_at"].is_string());
    assert_eq!(server.log().states().await.len(), 1);
}

#[tokio::test]
async fn test_synthesize_with_preset_and_override() {
    let server = TestServer::start(10).await;
    let (status, body) = server
        .post(
            "/synthesize-state",
            json!({ "preset": "emergency-brake", "scenarioState": { "speed": 35 } }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["aeb_triggered"], json!(true));
    assert_eq!(body["safety_level"], json!(1));
    assert_eq!(body["ar_opacity"], json!(0.8));
    // scenarioState is layered over the preset
    assert_eq!(body["speed"], json!(35.0));

    let metrics = server.get("/metrics").await;
    assert_eq!(metrics["synthesis"]["overridden"], json!(1));
}

#[tokio::test]
async fn test_synthesize_override_of_base_state() {
    let server = TestServer::start(10).await;
    let (_, prior) = server.post("/synthesize-state", json!({})).await;

    let (status, body) = server
        .post(
            "/synthesize-state",
            json!({ "baseState": prior.clone(), "scenarioState": { "battery_percentage": 90 } }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["battery_percentage"], json!(90.0));
    for field in ["speed", "gear", "safety_level", "location", "weather", "cabin_temp"] {
        assert_eq!(body[field], prior[field], "{field} changed");
    }
    assert_ne!(body["id"], prior["id"]);
}

#[tokio::test]
async fn test_scenario_state_alone_keeps_prior_fields() {
    let server = TestServer::start(100).await;
    let prior = parked_prior();
    let mut scenario = prior.clone();
    scenario["battery_percentage"] = json!(90.0);

    for _ in 0..20 {
        let (status, body) = server
            .post("/synthesize-state", json!({ "scenarioState": scenario.clone() }))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["battery_percentage"], json!(90.0));
        assert_eq!(body["ar_opacity"], json!(0.3));

        let mut got = body.as_object().unwrap().clone();
        let mut want = prior.as_object().unwrap().clone();
        for field in ["battery_percentage", "ar_opacity", "id", "created_at"] {
            got.remove(field);
            want.remove(field);
        }
        assert_eq!(got, want, "fields outside the override changed");
    }
}

#[tokio::test]
async fn test_synthesize_rejects_bad_input() {
    let server = TestServer::start(10).await;
    let mut distracted = parked_prior();
    distracted["distraction_level"] = json!(150);
    let (status, body) = server
        .post("/synthesize-state", json!({ "scenarioState": distracted }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], json!("distraction_level"));

    // without a base record the scenario must carry every core reading
    let (status, body) = server
        .post(
            "/synthesize-state",
            json!({ "scenarioState": { "battery_percentage": 90 } }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], json!("speed"));
    assert!(server.log().states().await.is_empty());

    let (status, body) = server
        .post("/synthesize-state", json!({ "preset": "moon-landing" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], json!("preset"));
}

#[tokio::test]
async fn test_unresponsive_audit_sink_bounds_decision_latency() {
    let silent = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let sink_url = format!("http://{}", silent.local_addr().unwrap());
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = silent.accept().await {
            held.push(socket);
        }
    });
    let sink = RestSink::new(sink_url, None, Duration::from_millis(200)).unwrap();
    let server = TestServer::with_backend(AuditBackend::Rest(sink)).await;

    let started = Instant::now();
    let (status, body) = server.post("/decide", parked_music()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], json!(true));
    assert!(body["decision_id"].is_null());
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "audit wait exceeded its timeout: {:?}",
        started.elapsed()
    );

    let metrics = server.get("/metrics").await;
    assert_eq!(metrics["audit"]["decision_write_failures"], json!(1));
}

#[tokio::test]
async fn test_metrics_carry_no_user_content() {
    let server = TestServer::start(10).await;
    server.post("/decide", parked_music()).await;
    let mut video = parked_music();
    video["user_input"] = json!("播放一部电影");
    video["gear"] = json!("D");
    video["speed"] = json!(50);
    video["safety_level"] = json!(3);
    server.post("/decide", video).await;

    let metrics = server.get("/metrics").await;
    assert_eq!(metrics["decisions"]["total"], json!(2));
    assert_eq!(metrics["decisions"]["per_tier"]["parked"], json!(1));
    assert_eq!(metrics["decisions"]["per_tier"]["driving"], json!(1));

    let text = metrics.to_string();
    assert!(!text.contains("播放"));
    assert!(!text.contains("电影"));
}
