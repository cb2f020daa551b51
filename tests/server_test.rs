use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use tomato_lca::config::LcaConfig;
use tomato_lca::framework::fixtures::{seed_tomato_system, TomatoFixture};
use tomato_lca::framework::mock::FakeEngine;
use tomato_lca::lifecycle::LcaSystem;
use tomato_lca::server::{router, AppState};

const INPUT: &str = include_str!("fixtures/ventum_input.json");

fn app(config: LcaConfig) -> (Router, FakeEngine, TomatoFixture) {
    let engine = FakeEngine::new();
    let fixture = seed_tomato_system(&engine);
    let config = LcaConfig {
        poll_interval: Duration::from_millis(1),
        ..config
    };
    let system = LcaSystem::start(engine.clone(), &config);
    (router(AppState::from(&system)), engine, fixture)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request")
}

fn post(uri: &str, body: String) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .expect("request")
}

#[tokio::test]
async fn test_health() {
    let (app, _, _) = app(LcaConfig::default());

    let (status, body) = send(app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_ventum_acv_returns_five_lists() {
    let (app, engine, _) = app(LcaConfig::default());

    let (status, body) = send(app, post("/ventum-acv", INPUT.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    for key in [
        "impacto_fertilizantes",
        "impacto_manejo_cultivo",
        "impacto_pesticidas",
        "impacto_sistema_riego",
        "impacto_total",
    ] {
        let list = body[key].as_array().unwrap_or_else(|| panic!("{key} missing"));
        assert_eq!(list.len(), 2);
        assert!(list[0].get("category").is_some());
        assert!(list[0].get("amount").is_some());
        assert!(list[0].get("unit").is_some());
    }
    assert_eq!(engine.calls().calculations, 1);
}

#[tokio::test]
async fn test_ventum_acv_without_product_system_is_not_found() {
    let config = LcaConfig {
        product_system: "PEPINO".to_string(),
        ..LcaConfig::default()
    };
    let (app, _, _) = app(config);

    let (status, body) = send(app, post("/ventum-acv", INPUT.to_string())).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().is_some_and(|e| e.contains("PEPINO")));
}

#[tokio::test]
async fn test_ventum_acv_with_missing_pesticide_is_unprocessable() {
    let (app, engine, _) = app(LcaConfig::default());
    let mut input: Value = serde_json::from_str(INPUT).expect("fixture");
    input["fitosanitarios"] = json!({});

    let (status, body) = send(app, post("/ventum-acv", input.to_string())).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().is_some_and(|e| e.contains("fitosanitarios")));
    assert_eq!(engine.calls().puts, 0);
}

#[tokio::test]
async fn test_engine_down_is_service_unavailable() {
    let (app, engine, _) = app(LcaConfig::default());
    engine.set_unavailable(true);

    let (status, _) = send(app, get("/process")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_process_impact() {
    let (app, engine, fixture) = app(LcaConfig::default());
    let uri = format!("/process/{}/impact", fixture.root.id);
    let body = json!({ "impact_method_uid": fixture.method.id, "amount": 2.0 }).to_string();

    let (status, body) = send(app, post(&uri, body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["process"]["name"], "Tomate");
    assert_eq!(body["data"]["impact_result"].as_array().map(Vec::len), Some(2));
    assert_eq!(engine.calls().systems_created, 1);
    assert_eq!(engine.live_results(), 0);
}

#[tokio::test]
async fn test_flow_listings() {
    let (app, _, _) = app(LcaConfig::default());

    let (status, all) = send(app.clone(), get("/flow")).await;
    assert_eq!(status, StatusCode::OK);
    let (_, elementary) = send(app.clone(), get("/elementary-flow")).await;
    let (_, waste) = send(app, get("/waste-flow")).await;

    let all = all.as_array().expect("array").len();
    let elementary = elementary.as_array().expect("array").len();
    let waste = waste.as_array().expect("array");
    assert!(elementary > 0 && elementary < all);
    assert!(waste
        .iter()
        .all(|flow| flow["name"].as_str().is_some_and(|n| n.contains("Recycling"))));
}
