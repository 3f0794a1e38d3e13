use serde::Serialize;

use crate::shared::geo::{Coordinate, haversine_distance_km};

/// Fixed cruising speed used for every ETA. Not measured, not extrapolated.
pub const ASSUMED_AVERAGE_SPEED_KMH: f64 = 40.0;

pub fn estimate_eta_minutes(distance_km: f64, speed_kmh: f64) -> f64 {
    distance_km / speed_kmh * 60.0
}

/// Distance and ETA between the vehicle and the user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub distance_km: f64,
    /// `None` when the configured speed is not positive.
    pub eta_minutes: Option<f64>,
}

impl DerivedMetrics {
    pub fn between(vehicle: &Coordinate, user: &Coordinate, speed_kmh: f64) -> Self {
        let distance_km = haversine_distance_km(vehicle, user);
        let eta_minutes = (speed_kmh > 0.0).then(|| estimate_eta_minutes(distance_km, speed_kmh));
        Self {
            distance_km,
            eta_minutes,
        }
    }

    pub fn distance_text(&self) -> String {
        format_distance(self.distance_km)
    }

    pub fn eta_text(&self) -> String {
        match self.eta_minutes {
            Some(minutes) if minutes >= 60.0 => format_eta(minutes),
            Some(minutes) => format!("{} to arrival", format_eta(minutes)),
            None => "Calculating...".into(),
        }
    }

    pub fn summary(&self) -> String {
        format!("{} to bus • {}", self.distance_text(), self.eta_text())
    }
}

pub fn format_distance(distance_km: f64) -> String {
    if distance_km < 1.0 {
        format!("{} m", (distance_km * 1000.0).round() as i64)
    } else {
        format!("{distance_km:.1} km")
    }
}

pub fn format_eta(minutes: f64) -> String {
    if minutes >= 60.0 {
        format!("{:.1} hr", minutes / 60.0)
    } else {
        format!("{} min", minutes.round() as i64)
    }
}

#[test]
fn metrics_without_speed_report_calculating() {
    let a = Coordinate::new(12.90, 77.60);
    let b = Coordinate::new(12.91, 77.61);
    let metrics = DerivedMetrics::between(&a, &b, 0.0);
    assert!(metrics.eta_minutes.is_none());
    assert_eq!(metrics.eta_text(), "Calculating...");
}

#[test]
fn summary_combines_distance_and_eta() {
    let metrics = DerivedMetrics {
        distance_km: 0.85,
        eta_minutes: Some(1.275),
    };
    assert_eq!(metrics.summary(), "850 m to bus • 1 min to arrival");
}

#[test]
fn long_trips_are_reported_in_hours() {
    let metrics = DerivedMetrics {
        distance_km: 60.0,
        eta_minutes: Some(90.0),
    };
    assert_eq!(metrics.summary(), "60.0 km to bus • 1.5 hr");
}
