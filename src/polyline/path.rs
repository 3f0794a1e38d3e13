use serde::Serialize;

use crate::shared::geo::{Bounds, Coordinate, Distance};

/// Ordered coordinates of a decoded route line. Immutable once decoded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Path(Box<[Coordinate]>);

impl From<Vec<Coordinate>> for Path {
    fn from(value: Vec<Coordinate>) -> Self {
        Self(value.into_boxed_slice())
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Coordinate;
    type IntoIter = std::slice::Iter<'a, Coordinate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Path {
    pub fn coordinates(&self) -> &[Coordinate] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Coordinate> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_coordinates(self.0.iter())
    }

    /// Great-circle length summed over every segment.
    pub fn length(&self) -> Distance {
        self.0
            .windows(2)
            .map(|segment| segment[0].distance(&segment[1]))
            .sum()
    }

    /// Point reached after travelling `along` from the first coordinate.
    /// Distances past the end clamp to the last coordinate.
    pub fn point_at(&self, along: Distance) -> Option<Coordinate> {
        let first = *self.0.first()?;
        let mut remaining = along.as_meters().max(0.0);
        for segment in self.0.windows(2) {
            let length = segment[0].distance(&segment[1]).as_meters();
            if remaining <= length {
                let t = if length > 0.0 { remaining / length } else { 0.0 };
                return Some(segment[0].lerp(&segment[1], t));
            }
            remaining -= length;
        }
        Some(self.0.last().copied().unwrap_or(first))
    }
}

#[test]
fn point_at_walks_segments() {
    let path: Path = vec![
        Coordinate::new(0.0, 0.0),
        Coordinate::new(0.0, 1.0),
        Coordinate::new(0.0, 2.0),
    ]
    .into();
    let half = Distance::from_meters(path.length().as_meters() / 2.0);
    let middle = path.point_at(half).unwrap();
    assert!((middle.longitude - 1.0).abs() < 1e-9);
    assert_eq!(
        path.point_at(Distance::from_kilometers(10_000.0)),
        Some(Coordinate::new(0.0, 2.0))
    );
    assert_eq!(path.point_at(Distance::default()), Some(Coordinate::new(0.0, 0.0)));
}

#[test]
fn point_at_on_empty_path_is_none() {
    assert!(Path::default().point_at(Distance::default()).is_none());
}
