use bustrack::shared::geo::Coordinate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct BusDto {
    pub id: String,
    pub current_latitude: f64,
    pub current_longitude: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BusResponse {
    pub bus: BusDto,
}

impl BusResponse {
    pub fn from(id: &str, position: Coordinate) -> Self {
        Self {
            bus: BusDto {
                id: id.to_string(),
                current_latitude: position.latitude,
                current_longitude: position.longitude,
            },
        }
    }
}
