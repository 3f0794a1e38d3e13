use reqwest::{Client, Url, header::ACCEPT};
use serde::Deserialize;
use tracing::trace;

use crate::{
    config::Config,
    shared::geo::Coordinate,
    tracker::{PollError, VehicleSource},
};

#[derive(Debug, Deserialize)]
struct BusEnvelope {
    bus: BusPosition,
}

#[derive(Debug, Deserialize)]
struct BusPosition {
    current_latitude: f64,
    current_longitude: f64,
}

/// Fetches `GET <base-url>/api/v1/user/bus/{vehicle_id}`.
#[derive(Debug, Clone)]
pub struct HttpVehicleSource {
    client: Client,
    base_url: Url,
}

impl HttpVehicleSource {
    pub fn new(config: &Config) -> Result<Self, PollError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Self::with_client(client, &config.api_base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self, PollError> {
        let base_url = Url::parse(base_url).map_err(|err| PollError::InvalidUrl(err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(PollError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self { client, base_url })
    }

    pub fn url_for(&self, vehicle_id: &str) -> Result<Url, PollError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PollError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["api", "v1", "user", "bus", vehicle_id]);
        Ok(url)
    }
}

impl VehicleSource for HttpVehicleSource {
    async fn fetch_position(&self, vehicle_id: &str) -> Result<Coordinate, PollError> {
        let url = self.url_for(vehicle_id)?;
        trace!("Fetching {url}");
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PollError::Status(status));
        }
        let body = response.bytes().await?;
        let envelope: BusEnvelope = serde_json::from_slice(&body)?;
        let coordinate = Coordinate::new(
            envelope.bus.current_latitude,
            envelope.bus.current_longitude,
        );
        if !coordinate.is_valid() {
            return Err(PollError::InvalidCoordinate(coordinate));
        }
        Ok(coordinate)
    }
}

#[test]
fn url_keeps_base_path() {
    let source =
        HttpVehicleSource::with_client(Client::new(), "https://example.com/backend/").unwrap();
    assert_eq!(
        source.url_for("bus-1").unwrap().as_str(),
        "https://example.com/backend/api/v1/user/bus/bus-1"
    );
}

#[test]
fn rejects_non_base_urls() {
    assert!(HttpVehicleSource::with_client(Client::new(), "mailto:ops@example.com").is_err());
}
