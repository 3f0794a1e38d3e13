use serde::{Deserialize, Deserializer};

use crate::{
    route::{self, RouteDescriptor, Stop},
    shared::geo::Coordinate,
};

/// Route details as served by the backend, optionally wrapped in `{"route": ...}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RouteDetailsPayload {
    Wrapped { route: RouteDetails },
    Bare(RouteDetails),
}

impl RouteDetailsPayload {
    pub(crate) fn into_details(self) -> RouteDetails {
        match self {
            Self::Wrapped { route } => route,
            Self::Bare(details) => details,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteDetails {
    pub stops: StopList,
    pub route_polyline: String,
    pub bus: BusDetails,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StopList {
    pub stops: Vec<Stop>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BusDetails {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub current_latitude: f64,
    pub current_longitude: f64,
}

impl BusDetails {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.current_latitude, self.current_longitude)
    }
}

impl TryFrom<RouteDetails> for RouteDescriptor {
    type Error = route::Error;

    fn try_from(value: RouteDetails) -> Result<Self, Self::Error> {
        let initial_position = value.bus.coordinate();
        RouteDescriptor::new(
            value.stops.stops,
            value.route_polyline,
            value.bus.id,
            initial_position,
        )
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(value) => value,
        Id::Number(value) => value.to_string(),
    })
}
