use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::post,
};
use chrono::DateTime;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use workout_tracker_data_management::{RunStore, config::ApiConfig};
use workout_tracker_lib::{SessionRecord, TrackPoint, TrackerError, services::SessionStore};

#[derive(Clone, Default)]
struct Seen {
    auth: Arc<Mutex<Option<String>>>,
    body: Arc<Mutex<Option<Value>>>,
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn record() -> SessionRecord {
    SessionRecord {
        user_id: 7,
        season_order: 1,
        week_number: 4,
        session_number: 2,
        started_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        finished_at: DateTime::from_timestamp(1_700_000_600, 0).unwrap(),
        duration_seconds: 600,
        distance_meters: 2000,
        average_pace_sec_per_km: 300,
        trajectory: vec![
            TrackPoint::new(56.1572, 10.2107, Some(5.0), 1_700_000_000_000),
            TrackPoint::new(56.1580, 10.2107, None, 1_700_000_030_000),
        ],
    }
}

#[tokio::test]
async fn posts_record_and_reads_created_id() {
    let seen = Seen::default();
    let app = Router::new()
        .route(
            "/api/runs",
            post(
                |State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>| async move {
                    *seen.auth.lock().await = headers
                        .get(AUTHORIZATION)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    *seen.body.lock().await = Some(body);
                    (
                        StatusCode::CREATED,
                        Json(json!({ "data": { "id": 41, "documentId": "abc123" } })),
                    )
                },
            ),
        )
        .with_state(seen.clone());
    let addr = serve(app).await;

    let store = RunStore::new(ApiConfig::new(
        format!("http://{addr}/api/"),
        Some("secret".into()),
    ))
    .unwrap();
    let id = store.save(&record()).await.unwrap();

    assert_eq!(id.id, 41);
    assert_eq!(id.document_id.as_deref(), Some("abc123"));
    assert_eq!(seen.auth.lock().await.as_deref(), Some("Bearer secret"));

    let body = seen.body.lock().await.clone().unwrap();
    let data = &body["data"];
    assert_eq!(data["userId"], 7);
    assert_eq!(data["weekNumber"], 4);
    assert_eq!(data["distanceMeters"], 2000);
    assert_eq!(data["avgPaceSecPerKm"], 300);
    assert_eq!(data["track"].as_array().unwrap().len(), 2);
    assert_eq!(data["track"][0]["acc"], 5.0);
    assert!(data["track"][1]["acc"].is_null());
}

#[tokio::test]
async fn rejection_carries_status_and_message() {
    let app = Router::new().route(
        "/api/runs",
        post(|| async {
            (
                StatusCode::FORBIDDEN,
                Json(json!({ "data": null, "error": { "status": 403, "message": "Forbidden" } })),
            )
        }),
    );
    let addr = serve(app).await;

    let store = RunStore::new(ApiConfig::new(format!("http://{addr}/api"), None)).unwrap();
    match store.save(&record()).await {
        Err(TrackerError::RemoteRejected { status, message }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "Forbidden");
        }
        other => panic!("expected a rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn plain_text_error_body_is_kept() {
    let app = Router::new().route(
        "/api/runs",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database is down") }),
    );
    let addr = serve(app).await;

    let store = RunStore::new(ApiConfig::new(format!("http://{addr}/api"), None)).unwrap();
    match store.save(&record()).await {
        Err(TrackerError::RemoteRejected { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "database is down");
        }
        other => panic!("expected a rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    // Bind and drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = RunStore::new(ApiConfig::new(format!("http://{addr}/api"), None)).unwrap();
    let err = store.save(&record()).await.unwrap_err();
    assert!(matches!(err, TrackerError::Transport(_)), "{err:?}");
}
