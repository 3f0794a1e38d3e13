mod http;
mod location;

pub use http::*;
pub use location::*;

use crate::shared::{eta::DerivedMetrics, geo::Coordinate};
use chrono::{DateTime, Utc};
use std::{future::Future, sync::Arc};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum PollError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Invalid url: {0}")]
    InvalidUrl(String),
    #[error("Server answered with status {0}")]
    Status(reqwest::StatusCode),
    #[error("Malformed body: {0}")]
    Body(#[from] serde_json::Error),
    #[error("Vehicle reported an invalid coordinate: {0}")]
    InvalidCoordinate(Coordinate),
    #[error("Vehicle position unavailable: {0}")]
    Unavailable(String),
}

pub trait VehicleSource: Send + Sync + 'static {
    fn fetch_position(
        &self,
        vehicle_id: &str,
    ) -> impl Future<Output = Result<Coordinate, PollError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleFix {
    pub coordinate: Coordinate,
    pub sequence: u64,
    pub received_at: DateTime<Utc>,
}

/// Freshest known positions. Both are `None` until the first successful fix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackedPosition {
    pub vehicle: Option<VehicleFix>,
    pub user: Option<Coordinate>,
}

impl TrackedPosition {
    pub fn vehicle_coordinate(&self) -> Option<Coordinate> {
        self.vehicle.map(|fix| fix.coordinate)
    }

    pub fn metrics(&self, speed_kmh: f64) -> Option<DerivedMetrics> {
        let vehicle = self.vehicle_coordinate()?;
        let user = self.user?;
        Some(DerivedMetrics::between(&vehicle, &user, speed_kmh))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VehicleUpdate {
    Moved(Coordinate),
    Unchanged,
    Stale,
    Failed,
    Ignored,
}

/// Owns [`TrackedPosition`] and decides which poll results are applied.
#[derive(Debug)]
pub struct PositionTracker {
    vehicle_id: Arc<str>,
    position: TrackedPosition,
    next_sequence: u64,
    last_applied: Option<u64>,
    failures: u64,
    alive: bool,
}

impl PositionTracker {
    pub fn new(vehicle_id: impl Into<Arc<str>>) -> Self {
        Self {
            vehicle_id: vehicle_id.into(),
            position: TrackedPosition::default(),
            next_sequence: 0,
            last_applied: None,
            failures: 0,
            alive: true,
        }
    }

    pub fn begin_poll(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    pub fn apply_vehicle(
        &mut self,
        sequence: u64,
        result: Result<Coordinate, PollError>,
    ) -> VehicleUpdate {
        if !self.alive {
            debug!("Discarding poll {sequence} for {}, tracker is shut down", self.vehicle_id);
            return VehicleUpdate::Ignored;
        }
        let coordinate = match result {
            Ok(coordinate) => coordinate,
            Err(err) => {
                self.failures += 1;
                warn!("Poll {sequence} for vehicle {} failed: {err}", self.vehicle_id);
                return VehicleUpdate::Failed;
            }
        };
        if self.last_applied.is_some_and(|last| last >= sequence) {
            debug!(
                "Discarding poll {sequence} for {}, poll {:?} already applied",
                self.vehicle_id, self.last_applied
            );
            return VehicleUpdate::Stale;
        }

        let previous = self.position.vehicle_coordinate();
        self.last_applied = Some(sequence);
        self.position.vehicle = Some(VehicleFix {
            coordinate,
            sequence,
            received_at: Utc::now(),
        });
        if previous == Some(coordinate) {
            VehicleUpdate::Unchanged
        } else {
            debug!("Vehicle {} at {coordinate}", self.vehicle_id);
            VehicleUpdate::Moved(coordinate)
        }
    }

    pub fn apply_user(&mut self, result: Result<Coordinate, LocationError>) -> Option<Coordinate> {
        if !self.alive {
            return None;
        }
        match result {
            Ok(coordinate) if self.position.user == Some(coordinate) => None,
            Ok(coordinate) => {
                self.position.user = Some(coordinate);
                Some(coordinate)
            }
            Err(LocationError::PermissionDenied) => {
                info!("Location permission denied, distance and ETA unavailable");
                None
            }
            Err(err) => {
                warn!("Could not get user location: {err}");
                None
            }
        }
    }

    pub fn metrics(&self, speed_kmh: f64) -> Option<DerivedMetrics> {
        self.position.metrics(speed_kmh)
    }

    pub fn position(&self) -> &TrackedPosition {
        &self.position
    }

    pub fn vehicle_id(&self) -> &Arc<str> {
        &self.vehicle_id
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Stops accepting results. Responses still in flight are ignored when they land.
    pub fn shutdown(&mut self) {
        self.alive = false;
    }
}
