use std::{
    cmp,
    fmt::Display,
    iter::Sum,
    ops::{Add, Sub},
};

use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct Distance(f64);

impl PartialEq for Distance {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl Add for Distance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Distance {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sum for Distance {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, distance| acc + distance)
    }
}

impl Distance {
    pub const fn from_meters(distance: f64) -> Self {
        Self(distance)
    }

    pub const fn from_kilometers(distance: f64) -> Self {
        Self(distance * 1000.0)
    }

    pub const fn as_meters(&self) -> f64 {
        self.0
    }

    pub const fn as_kilometers(&self) -> f64 {
        self.0 / 1000.0
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}, {}", self.latitude, self.longitude))
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(value: Coordinate) -> Self {
        (value.latitude, value.longitude)
    }
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True when both components are finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn distance(&self, coord: &Self) -> Distance {
        Distance::from_kilometers(haversine_distance_km(self, coord))
    }

    pub fn lerp(&self, to: &Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            latitude: self.latitude + (to.latitude - self.latitude) * t,
            longitude: self.longitude + (to.longitude - self.longitude) * t,
        }
    }
}

/// Haversine distance in kilometers. Symmetric, non-negative, zero for identical points.
pub fn haversine_distance_km(a: &Coordinate, b: &Coordinate) -> f64 {
    let dist_lat = f64::to_radians(b.latitude - a.latitude);
    let dist_lon = f64::to_radians(b.longitude - a.longitude);
    let h = f64::powi(f64::sin(dist_lat / 2.0), 2)
        + f64::cos(f64::to_radians(a.latitude))
            * f64::cos(f64::to_radians(b.latitude))
            * f64::powi(f64::sin(dist_lon / 2.0), 2);
    // Rounding can push h a hair above 1 for antipodal points.
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * f64::atan2(f64::sqrt(h), f64::sqrt(1.0 - h));
    EARTH_RADIUS_KM * c
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub south_west: Coordinate,
    pub north_east: Coordinate,
}

impl Bounds {
    pub fn from_coordinates<'a, I>(coordinates: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Coordinate>,
    {
        let mut iter = coordinates.into_iter();
        let first = *iter.next()?;
        let bounds = iter.fold(
            Self {
                south_west: first,
                north_east: first,
            },
            |mut bounds, coord| {
                bounds.south_west.latitude = bounds.south_west.latitude.min(coord.latitude);
                bounds.south_west.longitude = bounds.south_west.longitude.min(coord.longitude);
                bounds.north_east.latitude = bounds.north_east.latitude.max(coord.latitude);
                bounds.north_east.longitude = bounds.north_east.longitude.max(coord.longitude);
                bounds
            },
        );
        Some(bounds)
    }

    pub fn center(&self) -> Coordinate {
        self.south_west.lerp(&self.north_east, 0.5)
    }

    pub fn contains(&self, coord: &Coordinate) -> bool {
        (self.south_west.latitude..=self.north_east.latitude).contains(&coord.latitude)
            && (self.south_west.longitude..=self.north_east.longitude).contains(&coord.longitude)
    }
}

#[test]
fn distance_eq_test() {
    let dist_a = Distance::from_meters(1000.0);
    let dist_b = Distance::from_kilometers(1.0);
    assert_eq!(dist_a, dist_b)
}

#[test]
fn distance_cmp_test() {
    let dist_a = Distance::from_meters(1000.0);
    let dist_b = Distance::from_kilometers(0.5);
    assert!(dist_a > dist_b)
}

#[test]
fn antipodal_distance_is_half_circumference() {
    let a = Coordinate::new(0.0, 0.0);
    let b = Coordinate::new(0.0, 180.0);
    let half = std::f64::consts::PI * EARTH_RADIUS_KM;
    assert!((haversine_distance_km(&a, &b) - half).abs() < 1e-6);
}

#[test]
fn bounds_span_all_points() {
    let coords = [
        Coordinate::new(12.9, 77.6),
        Coordinate::new(12.95, 77.55),
        Coordinate::new(12.85, 77.7),
    ];
    let bounds = Bounds::from_coordinates(&coords).unwrap();
    assert_eq!(bounds.south_west, Coordinate::new(12.85, 77.55));
    assert_eq!(bounds.north_east, Coordinate::new(12.95, 77.7));
    assert!(coords.iter().all(|c| bounds.contains(c)));
}

#[test]
fn bounds_of_nothing_is_none() {
    assert!(Bounds::from_coordinates(&[] as &[Coordinate]).is_none());
}
