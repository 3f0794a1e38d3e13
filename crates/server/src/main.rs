mod api;
mod dto;
mod simulation;
mod state;

use crate::state::AppState;
use bustrack::{polyline, shared::ASSUMED_AVERAGE_SPEED_KMH};
use std::{collections::HashMap, sync::Arc, time::Instant};
use tracing::{error, info};

const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    info!("Starting server...");
    let args: Vec<_> = std::env::args().skip(1).collect();
    if args.is_empty() {
        error!("Usage: bustrack-server <vehicle_id>=<encoded_polyline>...");
        std::process::exit(1);
    }

    let now = Instant::now();
    let mut buses = HashMap::new();
    for arg in args {
        let Some((id, encoded)) = arg.split_once('=') else {
            error!("Expected <vehicle_id>=<encoded_polyline>, got {arg:?}");
            std::process::exit(1);
        };
        let path = match polyline::decode(encoded) {
            Ok(path) => path,
            Err(err) => {
                error!("Route for {id} is malformed: {err}");
                std::process::exit(1);
            }
        };
        match simulation::SimulatedBus::new(path) {
            Some(bus) => {
                info!("Simulating {id} along {:.1} km", bus.route_length().as_kilometers());
                buses.insert(id.to_string(), bus);
            }
            None => {
                error!("Route for {id} has no points");
                std::process::exit(1);
            }
        }
    }
    let state = Arc::new(AppState::new(buses));
    info!("Loading routes took {:?}", now.elapsed());

    tokio::spawn(simulation::run(state.clone(), ASSUMED_AVERAGE_SPEED_KMH));

    let port = std::env::var("PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let app = api::router(state);
    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind port {port}: {err}");
            std::process::exit(1);
        }
    };
    info!("Listening to port {port}");
    if let Err(err) = axum::serve(listener, app).await {
        error!("Server stopped: {err}");
    }
}
