mod channel;
mod command;
mod init;

pub use channel::*;
pub use command::*;
pub use init::*;

use crate::shared::geo::Coordinate;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Renderer failed to initialise: {0}")]
    RenderInitFailure(String),
    #[error("Surface was already loaded")]
    AlreadyLoaded,
    #[error("Renderer channel is closed")]
    ChannelClosed,
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub trait Renderer {
    fn initialize(&mut self, init: &SurfaceInit) -> Result<(), self::Error>;
    fn execute(&mut self, command: &Command) -> Result<(), self::Error>;
    fn release(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceState {
    #[default]
    Uninitialized,
    Loading,
    Ready,
    /// Initialisation failed; the surface will never become ready.
    Failed,
    Disposed,
}

pub struct MapSurface<R: Renderer> {
    renderer: R,
    state: SurfaceState,
    theme: Theme,
    initial_markers: Vec<(MarkerId, Coordinate)>,
    markers: HashMap<MarkerId, Coordinate>,
    dropped: usize,
}

impl<R: Renderer> MapSurface<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            state: SurfaceState::Uninitialized,
            theme: Theme::default(),
            initial_markers: Vec::new(),
            markers: HashMap::new(),
            dropped: 0,
        }
    }

    pub fn load(&mut self, init: SurfaceInit) -> Result<(), self::Error> {
        if self.state != SurfaceState::Uninitialized {
            return Err(self::Error::AlreadyLoaded);
        }
        self.state = SurfaceState::Loading;
        if let Err(err) = self.renderer.initialize(&init) {
            self.state = SurfaceState::Failed;
            return Err(self::Error::RenderInitFailure(err.to_string()));
        }
        self.initial_markers = init
            .markers
            .iter()
            .map(|marker| (marker.id, marker.coordinate))
            .collect();
        self.theme = init.theme;
        debug!(
            "Surface loading with {} markers and {} path points",
            self.initial_markers.len(),
            init.path.len()
        );
        Ok(())
    }

    pub fn handle_event(&mut self, event: RendererEvent) -> Option<SurfaceEvent> {
        match (self.state, event) {
            (SurfaceState::Disposed, _) => None,
            (SurfaceState::Loading, RendererEvent::Ready) => {
                self.state = SurfaceState::Ready;
                self.markers.extend(self.initial_markers.drain(..));
                info!("Map surface ready");
                Some(SurfaceEvent::Ready)
            }
            (_, RendererEvent::Ready) => {
                debug!("Ignoring ready event in state {:?}", self.state);
                None
            }
            (SurfaceState::Loading, RendererEvent::LoadFailed { reason }) => {
                self.state = SurfaceState::Failed;
                error!("Map surface failed to load: {reason}");
                Some(SurfaceEvent::Failed(reason))
            }
            (_, RendererEvent::LoadFailed { .. }) => None,
            (_, RendererEvent::TouchStart) => Some(SurfaceEvent::Touch(TouchPhase::Start)),
            (_, RendererEvent::TouchEnd | RendererEvent::TouchCancel) => {
                Some(SurfaceEvent::Touch(TouchPhase::End))
            }
        }
    }

    pub fn send(&mut self, command: Command) -> bool {
        if self.state != SurfaceState::Ready {
            self.dropped += 1;
            debug!(
                "Dropping {} command, surface is {:?}",
                command.kind(),
                self.state
            );
            return false;
        }
        if let Err(err) = self.renderer.execute(&command) {
            warn!("Renderer rejected {} command: {err}", command.kind());
            return false;
        }
        match command {
            Command::AddMarker(marker) => {
                self.markers.insert(marker.id, marker.coordinate);
            }
            Command::MoveMarker { id, coordinate } => {
                self.markers.insert(id, coordinate);
            }
            Command::RemoveMarker { id } => {
                self.markers.remove(&id);
            }
            Command::DrawPath { .. } | Command::FitBounds { .. } | Command::SetView { .. } => {}
        }
        true
    }

    /// Places the marker of `id` at `coordinate`, adding it the first time and moving the
    /// existing one afterwards so an identity never has two markers.
    pub fn move_marker(&mut self, id: MarkerId, coordinate: Coordinate) -> bool {
        let command = if self.markers.contains_key(&id) {
            Command::MoveMarker { id, coordinate }
        } else {
            Command::AddMarker(self.theme.live_marker(id, coordinate))
        };
        self.send(command)
    }

    pub fn set_view(&mut self, center: Coordinate, zoom: u8) -> bool {
        self.send(Command::SetView { center, zoom })
    }

    pub fn dispose(&mut self) {
        if self.state == SurfaceState::Disposed {
            return;
        }
        self.renderer.release();
        self.markers.clear();
        self.initial_markers.clear();
        self.state = SurfaceState::Disposed;
        debug!("Map surface disposed");
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == SurfaceState::Ready
    }

    pub fn marker(&self, id: MarkerId) -> Option<Coordinate> {
        self.markers.get(&id).copied()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn dropped_commands(&self) -> usize {
        self.dropped
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

impl<R: Renderer> Drop for MapSurface<R> {
    fn drop(&mut self) {
        self.dispose();
    }
}
