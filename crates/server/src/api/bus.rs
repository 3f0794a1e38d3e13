use std::sync::Arc;

use crate::{dto::BusResponse, state::AppState};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::debug;

pub async fn bus(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, StatusCode> {
    let buses = state.buses.read().await;
    let Some(bus) = buses.get(&id) else {
        debug!("Unknown bus {id}");
        return Err(StatusCode::NOT_FOUND);
    };
    Ok(Json(BusResponse::from(&id, bus.position())).into_response())
}
