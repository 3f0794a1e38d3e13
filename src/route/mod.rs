mod details;
pub use details::*;

use crate::{
    polyline::{self, Path},
    shared::geo::Coordinate,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Route has no stops")]
    NoStops,
    #[error("Stop {index} ({name}) has an invalid coordinate")]
    InvalidStop { index: usize, name: String },
    #[error("Initial vehicle position {0} is not a valid coordinate")]
    InvalidInitialPosition(Coordinate),
    #[error("Vehicle id is empty")]
    MissingVehicleId,
    #[error("Json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub name: Arc<str>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Stop {
    pub fn new(name: impl Into<Arc<str>>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Everything the map screen receives from the route listing when it is mounted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDescriptor {
    stops: Box<[Stop]>,
    encoded_polyline: Arc<str>,
    vehicle_id: Arc<str>,
    initial_position: Coordinate,
}

impl RouteDescriptor {
    pub fn new(
        stops: Vec<Stop>,
        encoded_polyline: impl Into<Arc<str>>,
        vehicle_id: impl Into<Arc<str>>,
        initial_position: Coordinate,
    ) -> Result<Self, self::Error> {
        if stops.is_empty() {
            return Err(self::Error::NoStops);
        }
        if let Some((index, stop)) = stops
            .iter()
            .enumerate()
            .find(|(_, stop)| !stop.coordinate().is_valid())
        {
            return Err(self::Error::InvalidStop {
                index,
                name: stop.name.to_string(),
            });
        }
        if !initial_position.is_valid() {
            return Err(self::Error::InvalidInitialPosition(initial_position));
        }
        let vehicle_id: Arc<str> = vehicle_id.into();
        if vehicle_id.trim().is_empty() {
            return Err(self::Error::MissingVehicleId);
        }
        Ok(Self {
            stops: stops.into_boxed_slice(),
            encoded_polyline: encoded_polyline.into(),
            vehicle_id,
            initial_position,
        })
    }

    /// Parses the route details payload served by the route listing backend.
    pub fn from_route_details(json: &str) -> Result<Self, self::Error> {
        let payload: RouteDetailsPayload = serde_json::from_str(json)?;
        payload.into_details().try_into()
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn first_stop(&self) -> &Stop {
        // Constructors reject empty stop lists.
        &self.stops[0]
    }

    pub fn encoded_polyline(&self) -> &str {
        &self.encoded_polyline
    }

    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    pub fn initial_position(&self) -> Coordinate {
        self.initial_position
    }

    pub fn decode_path(&self) -> Result<Path, polyline::Error> {
        polyline::decode(&self.encoded_polyline)
    }
}

#[test]
fn rejects_empty_stop_list() {
    let result = RouteDescriptor::new(vec![], "", "bus-1", Coordinate::new(12.9, 77.6));
    assert!(matches!(result, Err(Error::NoStops)));
}

#[test]
fn rejects_out_of_range_stop() {
    let stops = vec![Stop::new("A", 12.9, 77.6), Stop::new("B", 120.0, 77.6)];
    let result = RouteDescriptor::new(stops, "", "bus-1", Coordinate::new(12.9, 77.6));
    assert!(matches!(result, Err(Error::InvalidStop { index: 1, .. })));
}
