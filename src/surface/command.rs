use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::shared::geo::{Bounds, Coordinate};

/// Logical identity of a marker. At most one marker per identity exists on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum MarkerId {
    Vehicle,
    User,
    Stop(usize),
}

impl Display for MarkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkerId::Vehicle => f.write_str("vehicle"),
            MarkerId::User => f.write_str("user"),
            MarkerId::Stop(index) => write!(f, "stop-{index}"),
        }
    }
}

impl FromStr for MarkerId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vehicle" => Ok(Self::Vehicle),
            "user" => Ok(Self::User),
            other => other
                .strip_prefix("stop-")
                .and_then(|index| index.parse().ok())
                .map(Self::Stop)
                .ok_or_else(|| format!("unknown marker id {other:?}")),
        }
    }
}

impl From<MarkerId> for String {
    fn from(value: MarkerId) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for MarkerId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub id: MarkerId,
    pub coordinate: Coordinate,
    pub label: String,
    /// `None` renders the renderer's default pin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathStyle {
    pub color: String,
    pub weight: f32,
    pub opacity: f32,
}

/// Imperative commands understood by the embedded renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    AddMarker(Marker),
    MoveMarker { id: MarkerId, coordinate: Coordinate },
    RemoveMarker { id: MarkerId },
    DrawPath {
        coordinates: Vec<Coordinate>,
        style: PathStyle,
    },
    FitBounds { bounds: Bounds, padding: u32 },
    SetView { center: Coordinate, zoom: u8 },
}

impl Command {
    pub fn to_message(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_message(message: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(message)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Command::AddMarker(_) => "addMarker",
            Command::MoveMarker { .. } => "moveMarker",
            Command::RemoveMarker { .. } => "removeMarker",
            Command::DrawPath { .. } => "drawPath",
            Command::FitBounds { .. } => "fitBounds",
            Command::SetView { .. } => "setView",
        }
    }
}

/// Raw events posted by the embedded renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RendererEvent {
    Ready,
    TouchStart,
    TouchEnd,
    TouchCancel,
    LoadFailed { reason: String },
}

impl RendererEvent {
    /// Parses a message posted by the renderer, JSON or one of the bare legacy strings.
    pub fn from_message(message: &str) -> Option<Self> {
        match message.trim() {
            "MAP_READY" => Some(Self::Ready),
            "MAP_TOUCH_START" => Some(Self::TouchStart),
            "MAP_TOUCH_END" => Some(Self::TouchEnd),
            other => serde_json::from_str(other).ok(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    /// Both `touchEnd` and `touchCancel`.
    End,
}

/// Events a surface reports to its owner after translating renderer events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Ready,
    Touch(TouchPhase),
    Failed(String),
}

#[test]
fn marker_ids_round_trip_through_strings() {
    for id in [MarkerId::Vehicle, MarkerId::User, MarkerId::Stop(12)] {
        assert_eq!(id.to_string().parse::<MarkerId>(), Ok(id));
    }
    assert!("stop-x".parse::<MarkerId>().is_err());
}

#[test]
fn commands_carry_a_type_tag() {
    let command = Command::MoveMarker {
        id: MarkerId::Vehicle,
        coordinate: Coordinate::new(12.91, 77.61),
    };
    let value: serde_json::Value = serde_json::from_str(&command.to_message().unwrap()).unwrap();
    assert_eq!(value["type"], "moveMarker");
    assert_eq!(value["id"], "vehicle");
    assert_eq!(value["coordinate"]["latitude"], 12.91);
}

#[test]
fn renderer_events_accept_legacy_messages() {
    assert_eq!(
        RendererEvent::from_message("MAP_READY"),
        Some(RendererEvent::Ready)
    );
    assert_eq!(
        RendererEvent::from_message(r#"{"type":"touchCancel"}"#),
        Some(RendererEvent::TouchCancel)
    );
    assert_eq!(RendererEvent::from_message("garbage"), None);
}
