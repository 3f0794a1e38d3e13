use serde::Serialize;

use crate::{
    polyline::Path,
    route::RouteDescriptor,
    shared::geo::{Bounds, Coordinate},
    surface::{Marker, MarkerId, PathStyle},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub route_color: String,
    pub route_weight: f32,
    pub route_opacity: f32,
    pub vehicle_color: String,
    pub user_color: String,
    pub vehicle_label: String,
    pub user_label: String,
    pub fit_padding: u32,
    pub initial_zoom: u8,
    pub focus_zoom: u8,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            route_color: "#1a73e8".into(),
            route_weight: 5.0,
            route_opacity: 0.7,
            vehicle_color: "#FF4B4B".into(),
            user_color: "#4CAF50".into(),
            vehicle_label: "Bus Current Location".into(),
            user_label: "Your Location".into(),
            fit_padding: 30,
            initial_zoom: 12,
            focus_zoom: 15,
        }
    }
}

impl Theme {
    pub fn path_style(&self) -> PathStyle {
        PathStyle {
            color: self.route_color.clone(),
            weight: self.route_weight,
            opacity: self.route_opacity,
        }
    }

    pub fn live_marker(&self, id: MarkerId, coordinate: Coordinate) -> Marker {
        let (label, color) = match id {
            MarkerId::Vehicle => (self.vehicle_label.clone(), Some(self.vehicle_color.clone())),
            MarkerId::User => (self.user_label.clone(), Some(self.user_color.clone())),
            MarkerId::Stop(index) => (format!("Stop {}", index + 1), None),
        };
        Marker {
            id,
            coordinate,
            label,
            color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceInit {
    pub center: Coordinate,
    pub zoom: u8,
    pub markers: Vec<Marker>,
    pub path: Path,
    pub path_style: PathStyle,
    /// `None` when the path is empty; the view then stays on `center`.
    pub fit_bounds: Option<Bounds>,
    pub fit_padding: u32,
    pub theme: Theme,
}

impl SurfaceInit {
    pub fn for_route(route: &RouteDescriptor, path: Path, theme: &Theme) -> Self {
        let mut markers: Vec<Marker> = route
            .stops()
            .iter()
            .enumerate()
            .map(|(index, stop)| Marker {
                id: MarkerId::Stop(index),
                coordinate: stop.coordinate(),
                label: stop.name.to_string(),
                color: None,
            })
            .collect();
        markers.push(theme.live_marker(MarkerId::Vehicle, route.initial_position()));

        Self {
            center: route.first_stop().coordinate(),
            zoom: theme.initial_zoom,
            markers,
            fit_bounds: path.bounds(),
            path,
            path_style: theme.path_style(),
            fit_padding: theme.fit_padding,
            theme: theme.clone(),
        }
    }

    pub fn to_message(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
