mod bus;
mod health;

pub use bus::*;
pub use health::*;

use crate::state::AppState;
use axum::{Router, routing::get};
use std::sync::Arc;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/user/bus/{id}", get(bus))
        .with_state(state)
}

#[cfg(test)]
async fn serve(buses: Vec<(&str, bustrack::polyline::Path)>) -> String {
    use crate::simulation::SimulatedBus;

    let buses = buses
        .into_iter()
        .map(|(id, path)| (id.to_string(), SimulatedBus::new(path).unwrap()))
        .collect();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let app = router(Arc::new(AppState::new(buses)));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{address}")
}

#[tokio::test]
async fn bus_endpoint_returns_current_position() {
    use bustrack::shared::geo::Coordinate;

    let path = vec![Coordinate::new(12.90, 77.60), Coordinate::new(12.91, 77.61)].into();
    let base = serve(vec![("bus-1", path)]).await;

    let response = reqwest::get(format!("{base}/api/v1/user/bus/bus-1"))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = serde_json::from_str(&response.text().await.unwrap()).unwrap();
    assert_eq!(body["bus"]["id"], "bus-1");
    assert_eq!(body["bus"]["current_latitude"], 12.90);
    assert_eq!(body["bus"]["current_longitude"], 77.60);
}

#[tokio::test]
async fn unknown_bus_is_not_found() {
    let base = serve(vec![]).await;
    let response = reqwest::get(format!("{base}/api/v1/user/bus/bus-9"))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn health_reports_running() {
    let base = serve(vec![]).await;
    let response = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "Server is running");
}
