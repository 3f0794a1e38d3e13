pub mod bridge;
pub mod config;
pub mod orchestrator;
pub mod polyline;
pub mod route;
pub mod shared;
pub mod surface;
pub mod tracker;

pub mod prelude {
    pub use crate::bridge::{GestureOwner, ScrollCallbacks, ScrollFlag, ScrollHost, TouchBridge};
    pub use crate::config::Config;
    pub use crate::orchestrator::{MapHandle, MapOrchestrator};
    pub use crate::polyline::{self, Path};
    pub use crate::route::{RouteDescriptor, Stop};
    pub use crate::shared::{
        ASSUMED_AVERAGE_SPEED_KMH, Bounds, Coordinate, DerivedMetrics, Distance,
        estimate_eta_minutes, haversine_distance_km,
    };
    pub use crate::surface::{
        ChannelRenderer, Command, MapSurface, MarkerId, Renderer, RendererEvent,
        RendererMessage, SurfaceEvent, SurfaceInit, SurfaceState, Theme, TouchPhase,
    };
    pub use crate::tracker::{
        HttpVehicleSource, LocationError, LocationProvider, NoLocation, Permission, PollError,
        PositionTracker, SharedLocation, TrackedPosition, VehicleSource,
    };
}
