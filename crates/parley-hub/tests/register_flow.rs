use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode, header},
    routing::get,
};
use parley_db::Database;
use parley_hub::{
    HealthVerifier, ListFilter, RegisterError, Registration, Registry, register,
};

fn test_registry() -> Registry {
    Registry::new(Arc::new(Database::open_in_memory().expect("open db")))
}

fn test_verifier() -> HealthVerifier {
    HealthVerifier::new(Duration::from_secs(2)).expect("build verifier")
}

fn registration(endpoint: &str, name: &str, authkey: &str) -> Registration {
    Registration {
        name: name.to_string(),
        endpoint: endpoint.to_string(),
        authkey: authkey.to_string(),
        service_type: "parley:board".to_string(),
    }
}

/// Loopback stand-in for a channel service's `/health` endpoint.
async fn spawn_health_server(name: &str, authkey: &str) -> String {
    let name = name.to_string();
    let expected = format!("authkey {authkey}");

    let app = Router::new().route(
        "/health",
        get(move |headers: HeaderMap| {
            let name = name.clone();
            let expected = expected.clone();
            async move {
                let authorized = headers
                    .get(header::AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .is_some_and(|v| v == expected);
                if authorized {
                    Ok(Json(serde_json::json!({ "name": name })))
                } else {
                    Err(StatusCode::BAD_REQUEST)
                }
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

/// An address nothing listens on.
async fn dead_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}

#[tokio::test]
async fn healthy_new_channel_registers_active() {
    let registry = test_registry();
    let verifier = test_verifier();
    let endpoint = spawn_health_server("Board", "k").await;

    let outcome = register(&registry, &verifier, registration(&endpoint, "Board", "k"))
        .await
        .expect("register");
    assert!(outcome.created);

    let channels = registry.list(ListFilter::All).expect("list");
    assert_eq!(channels.len(), 1);
    assert!(channels[0].active);
    assert!(channels[0].last_heartbeat.is_some());
}

#[tokio::test]
async fn reregistering_same_endpoint_does_not_duplicate() {
    let registry = test_registry();
    let verifier = test_verifier();
    let endpoint = spawn_health_server("Board", "k").await;

    let first = register(&registry, &verifier, registration(&endpoint, "Board", "k"))
        .await
        .expect("register");
    let second = register(&registry, &verifier, registration(&endpoint, "Board", "k"))
        .await
        .expect("re-register");

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.id, second.id);

    let channels = registry.list(ListFilter::All).expect("list");
    assert_eq!(channels.len(), 1);
    assert!(channels[0].active);
}

#[tokio::test]
async fn unhealthy_new_channel_is_rolled_back() {
    let registry = test_registry();
    let verifier = test_verifier();
    let endpoint = dead_endpoint().await;

    let err = register(&registry, &verifier, registration(&endpoint, "Board", "k"))
        .await
        .expect_err("should fail");
    assert!(matches!(err, RegisterError::Unhealthy));

    assert!(registry.list(ListFilter::All).expect("list").is_empty());
}

#[tokio::test]
async fn unhealthy_reregistration_leaves_row_inactive() {
    let registry = test_registry();
    let verifier = test_verifier();
    let endpoint = spawn_health_server("Board", "k").await;

    register(&registry, &verifier, registration(&endpoint, "Board", "k"))
        .await
        .expect("register");

    // The remote still answers as "Board", so re-registering under a new
    // name updates the row but fails identity verification.
    let err = register(&registry, &verifier, registration(&endpoint, "Renamed", "k"))
        .await
        .expect_err("should fail");
    assert!(matches!(err, RegisterError::Unhealthy));

    let channels = registry.list(ListFilter::All).expect("list");
    assert_eq!(channels.len(), 1);
    assert_eq!(channels[0].name, "Renamed");
    assert!(!channels[0].active);
}

#[tokio::test]
async fn name_spoofing_is_rejected_even_with_200() {
    let registry = test_registry();
    let verifier = test_verifier();
    let endpoint = spawn_health_server("Impostor", "k").await;

    let err = register(&registry, &verifier, registration(&endpoint, "Board", "k"))
        .await
        .expect_err("should fail");
    assert!(matches!(err, RegisterError::Unhealthy));
    assert!(registry.list(ListFilter::All).expect("list").is_empty());
}

#[tokio::test]
async fn wrong_channel_authkey_fails_verification() {
    let registry = test_registry();
    let verifier = test_verifier();
    let endpoint = spawn_health_server("Board", "k").await;

    let err = register(&registry, &verifier, registration(&endpoint, "Board", "wrong"))
        .await
        .expect_err("should fail");
    assert!(matches!(err, RegisterError::Unhealthy));
}
