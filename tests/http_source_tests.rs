use axum::{
    Json, Router,
    extract::Path,
    http::StatusCode,
    routing::get,
};
use bustrack::{
    config::Config,
    shared::Coordinate,
    tracker::{HttpVehicleSource, PollError, VehicleSource},
};
use serde_json::json;
use tokio::net::TcpListener;

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{address}")
}

fn source(base_url: String) -> HttpVehicleSource {
    HttpVehicleSource::new(&Config::default().with_api_base_url(base_url)).unwrap()
}

#[tokio::test]
async fn fetches_the_current_position() {
    let router = Router::new().route(
        "/api/v1/user/bus/{id}",
        get(|Path(id): Path<String>| async move {
            Json(json!({
                "bus": { "id": id, "current_latitude": 12.91, "current_longitude": 77.61 }
            }))
        }),
    );
    let source = source(serve(router).await);
    assert_eq!(
        source.fetch_position("bus-1").await.unwrap(),
        Coordinate::new(12.91, 77.61)
    );
}

#[tokio::test]
async fn unknown_vehicle_is_a_status_error() {
    let router = Router::new().route(
        "/api/v1/user/bus/{id}",
        get(|| async { StatusCode::NOT_FOUND }),
    );
    let source = source(serve(router).await);
    assert!(matches!(
        source.fetch_position("bus-9").await,
        Err(PollError::Status(status)) if status.as_u16() == 404
    ));
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let router = Router::new().route(
        "/api/v1/user/bus/{id}",
        get(|| async { Json(json!({ "bus": { "current_latitude": "north" } })) }),
    );
    let source = source(serve(router).await);
    assert!(matches!(
        source.fetch_position("bus-1").await,
        Err(PollError::Body(_))
    ));
}

#[tokio::test]
async fn impossible_coordinates_are_rejected() {
    let router = Router::new().route(
        "/api/v1/user/bus/{id}",
        get(|| async {
            Json(json!({ "bus": { "current_latitude": 91.0, "current_longitude": 77.61 } }))
        }),
    );
    let source = source(serve(router).await);
    assert!(matches!(
        source.fetch_position("bus-1").await,
        Err(PollError::InvalidCoordinate(_))
    ));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);
    let source = source(format!("http://{address}"));
    assert!(matches!(
        source.fetch_position("bus-1").await,
        Err(PollError::Transport(_))
    ));
}
