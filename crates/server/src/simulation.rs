use std::{sync::Arc, time::Duration};

use bustrack::{
    polyline::Path,
    shared::geo::{Coordinate, Distance},
};
use tokio::time::{self, MissedTickBehavior};

use crate::state::AppState;

const STEP: Duration = Duration::from_secs(1);

/// A bus driving its route in a loop.
pub struct SimulatedBus {
    path: Path,
    length: Distance,
    travelled: Distance,
    position: Coordinate,
}

impl SimulatedBus {
    pub fn new(path: Path) -> Option<Self> {
        let position = *path.coordinates().first()?;
        Some(Self {
            length: path.length(),
            path,
            travelled: Distance::default(),
            position,
        })
    }

    pub fn advance(&mut self, elapsed: Duration, speed_kmh: f64) {
        let step = Distance::from_kilometers(speed_kmh * elapsed.as_secs_f64() / 3600.0);
        let length = self.length.as_meters();
        let travelled = if length > 0.0 {
            (self.travelled + step).as_meters() % length
        } else {
            0.0
        };
        self.travelled = Distance::from_meters(travelled);
        if let Some(position) = self.path.point_at(self.travelled) {
            self.position = position;
        }
    }

    pub fn position(&self) -> Coordinate {
        self.position
    }

    pub fn route_length(&self) -> Distance {
        self.length
    }
}

pub async fn run(state: Arc<AppState>, speed_kmh: f64) {
    let mut ticker = time::interval(STEP);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        let mut buses = state.buses.write().await;
        buses
            .values_mut()
            .for_each(|bus| bus.advance(STEP, speed_kmh));
    }
}

#[test]
fn bus_wraps_at_end_of_route() {
    let path: Path = vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.01)].into();
    let mut bus = SimulatedBus::new(path).unwrap();
    let length_km = bus.route_length().as_kilometers();
    // One and a half laps at 3600 km/h is 1.5 * length seconds.
    bus.advance(Duration::from_secs_f64(length_km * 1.5), 3600.0);
    assert!((bus.position().longitude - 0.005).abs() < 1e-6);
}

#[test]
fn empty_route_has_no_bus() {
    assert!(SimulatedBus::new(Path::default()).is_none());
}
