//! Integration tests for the catalog service.
//!
//! Each test serves the real router on an ephemeral port and talks to it
//! over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use catalog_service::api::{create_router, AppState};
use catalog_service::catalog::{CatalogStore, InMemoryStore, MockCatalogStore, Product, RemoteStore};
use catalog_service::health::{HealthReport, HealthStatus};
use catalog_service::resilience::{CircuitBreakerConfig, CircuitState};
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use rust_decimal_macros::dec;
use tokio::net::TcpListener;

/// Serve `state` on 127.0.0.1 with an OS-assigned port.
async fn spawn_server(state: AppState) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = create_router(state);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    addr
}

fn state_for(store: Arc<dyn CatalogStore>, breaker: CircuitBreakerConfig) -> AppState {
    AppState::new(store, breaker, Duration::from_millis(500))
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

fn fedora() -> Product {
    Product::new("329299", dec!(34.99))
        .with_name("Red Fedora")
        .with_description("Official Red Hat Fedora")
}

#[tokio::test]
async fn test_catalog_round_trip_over_http() {
    let store = InMemoryStore::with_products(vec![fedora()]);
    let addr = spawn_server(state_for(Arc::new(store), CircuitBreakerConfig::default())).await;
    let client = client();

    let res = client
        .post(format!("http://{}/product", addr))
        .json(&Product::new("165613", dec!(17.80)).with_name("Solid Performance Polo"))
        .send()
        .await
        .expect("service unreachable");
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .get(format!("http://{}/products", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get("content-type").unwrap(),
        "application/json"
    );
    let products: Vec<Product> = res.json().await.unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[1], fedora());

    let res = client
        .get(format!("http://{}/product/165613", addr))
        .send()
        .await
        .unwrap();
    let product: Product = res.json().await.unwrap();
    assert_eq!(product.name.as_deref(), Some("Solid Performance Polo"));
    assert_eq!(product.price, dec!(17.8));

    let res = client
        .get(format!("http://{}/product/999999", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_remote_store_forwards_to_upstream_catalog() {
    let upstream_store = InMemoryStore::with_products(vec![fedora()]);
    let upstream = spawn_server(state_for(
        Arc::new(upstream_store.clone()),
        CircuitBreakerConfig::default(),
    ))
    .await;

    let remote = RemoteStore::new(&format!("http://{}", upstream), Duration::from_secs(2)).unwrap();
    let front = spawn_server(state_for(Arc::new(remote), CircuitBreakerConfig::default())).await;
    let client = client();

    let res = client
        .post(format!("http://{}/product", front))
        .json(&Product::new("444434", dec!(24)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(upstream_store.len(), 2);

    let res = client
        .get(format!("http://{}/product/329299", front))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Product>().await.unwrap(), fedora());

    let res = client
        .get(format!("http://{}/product/missing", front))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(format!("http://{}/health/liveness", front))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unreachable_upstream_reports_down_and_503() {
    // Bind then drop to get a port nothing listens on.
    let dead = TcpListener::bind("127.0.0.1:0").await.unwrap().local_addr().unwrap();

    let remote = RemoteStore::new(&format!("http://{}", dead), Duration::from_millis(500)).unwrap();
    let front = spawn_server(state_for(Arc::new(remote), CircuitBreakerConfig::default())).await;
    let client = client();

    let res = client
        .get(format!("http://{}/products", front))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    let res = client
        .get(format!("http://{}/health/liveness", front))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let report: HealthReport = res.json().await.unwrap();
    assert_eq!(report.outcome, HealthStatus::Down);
    assert_eq!(report.checks[0].id, "health");

    // Readiness does not depend on the store.
    let res = client
        .get(format!("http://{}/health/readiness", front))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_slow_store_trips_breaker() {
    let store = MockCatalogStore::with_products(vec![fedora()]);
    store.set_latency_ms(500);
    let state = state_for(
        Arc::new(store),
        CircuitBreakerConfig {
            call_timeout: Duration::from_millis(100),
            ..CircuitBreakerConfig::default()
        },
    );
    let breaker = state.breaker.clone();
    let addr = spawn_server(state).await;
    let client = client();

    for _ in 0..3 {
        let res = client
            .get(format!("http://{}/products", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
    assert_eq!(breaker.state(), CircuitState::Open);

    // Open circuit answers immediately, without waiting on the store.
    let started = std::time::Instant::now();
    let res = client
        .get(format!("http://{}/product/329299", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(started.elapsed() < Duration::from_millis(100));
}

#[tokio::test]
async fn test_breaker_recovers_after_reset_timeout() {
    let store = MockCatalogStore::with_products(vec![fedora()]);
    store.set_fail_reads(true);
    let state = state_for(
        Arc::new(store.clone()),
        CircuitBreakerConfig {
            reset_timeout: Duration::from_millis(200),
            ..CircuitBreakerConfig::default()
        },
    );
    let breaker = state.breaker.clone();
    let addr = spawn_server(state).await;
    let client = client();

    for _ in 0..3 {
        client
            .get(format!("http://{}/products", addr))
            .send()
            .await
            .unwrap();
    }
    assert_eq!(breaker.state(), CircuitState::Open);

    store.set_fail_reads(false);
    tokio::time::sleep(Duration::from_millis(250)).await;

    let res = client
        .get(format!("http://{}/products", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(breaker.state(), CircuitState::Closed);
    assert_eq!(store.read_calls(), 4);
}
