mod handle;
pub use handle::*;

use std::sync::Arc;
use tokio::{
    sync::{mpsc, watch},
    task::{JoinError, JoinSet},
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};

use crate::{
    bridge::{self, ScrollHost, TouchBridge},
    config::Config,
    polyline::Path,
    route::RouteDescriptor,
    shared::{eta::DerivedMetrics, geo::Coordinate},
    surface::{MapSurface, MarkerId, Renderer, RendererEvent, SurfaceEvent, SurfaceInit, Theme},
    tracker::{
        LocationError, LocationProvider, PollError, PositionTracker, TrackedPosition,
        VehicleSource, VehicleUpdate, locate_user,
    },
};

pub(crate) enum Input {
    Renderer(RendererEvent),
    LocateUser,
    CenterOn(MarkerId),
    Unmount,
}

enum Completion {
    Vehicle {
        sequence: u64,
        result: Result<Coordinate, PollError>,
    },
    User(Result<Coordinate, LocationError>),
}

pub struct MapOrchestrator<R, V, L, H>
where
    R: Renderer + Send + 'static,
    V: VehicleSource,
    L: LocationProvider,
    H: ScrollHost + 'static,
{
    config: Config,
    theme: Theme,
    route: RouteDescriptor,
    surface: MapSurface<R>,
    tracker: PositionTracker,
    bridge: TouchBridge<H>,
    vehicles: Arc<V>,
    location: Arc<L>,
    tasks: JoinSet<Completion>,
    metrics: watch::Sender<Option<DerivedMetrics>>,
    position: watch::Sender<TrackedPosition>,
}

impl<R, V, L, H> MapOrchestrator<R, V, L, H>
where
    R: Renderer + Send + 'static,
    V: VehicleSource,
    L: LocationProvider,
    H: ScrollHost + 'static,
{
    pub fn new(
        route: RouteDescriptor,
        config: Config,
        renderer: R,
        vehicles: V,
        location: L,
        host: H,
    ) -> Self {
        let tracker = PositionTracker::new(route.vehicle_id());
        let bridge = TouchBridge::new(host, config.touch_release_delay);
        Self {
            theme: Theme::default(),
            surface: MapSurface::new(renderer),
            tracker,
            bridge,
            vehicles: Arc::new(vehicles),
            location: Arc::new(location),
            tasks: JoinSet::new(),
            metrics: watch::Sender::new(None),
            position: watch::Sender::new(TrackedPosition::default()),
            route,
            config,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Starts the screen on the current tokio runtime.
    pub fn mount(self) -> MapHandle {
        let (inputs, receiver) = mpsc::unbounded_channel();
        let metrics = self.metrics.subscribe();
        let position = self.position.subscribe();
        let task = tokio::spawn(self.run(receiver));
        MapHandle::new(inputs, metrics, position, task)
    }

    async fn run(mut self, mut inputs: mpsc::UnboundedReceiver<Input>) {
        info!("Mounting map for vehicle {}", self.route.vehicle_id());
        self.load_surface();
        self.locate_user();

        let period = self.config.poll_interval;
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let release = self.bridge.release_deadline();
            tokio::select! {
                _ = ticker.tick() => self.poll_vehicle(),
                Some(joined) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    self.on_completion(joined)
                }
                input = inputs.recv() => match input {
                    Some(Input::Unmount) | None => break,
                    Some(input) => self.on_input(input),
                },
                _ = bridge::release_timer(release) => {
                    self.bridge.poll_release(Instant::now());
                }
            }
        }

        self.unmount();
    }

    fn load_surface(&mut self) {
        let path = match self.route.decode_path() {
            Ok(path) => path,
            Err(err) => {
                error!("Route polyline is malformed, drawing no route line: {err}");
                Path::default()
            }
        };
        let init = SurfaceInit::for_route(&self.route, path, &self.theme);
        if let Err(err) = self.surface.load(init) {
            error!("Map surface unavailable, live tracking will not be drawn: {err}");
        }
    }

    fn poll_vehicle(&mut self) {
        let sequence = self.tracker.begin_poll();
        let vehicles = Arc::clone(&self.vehicles);
        let vehicle_id = Arc::clone(self.tracker.vehicle_id());
        self.tasks.spawn(async move {
            let result = vehicles.fetch_position(&vehicle_id).await;
            Completion::Vehicle { sequence, result }
        });
    }

    fn locate_user(&mut self) {
        let location = Arc::clone(&self.location);
        self.tasks
            .spawn(async move { Completion::User(locate_user(location.as_ref()).await) });
    }

    fn on_completion(&mut self, joined: Result<Completion, JoinError>) {
        match joined {
            Ok(Completion::Vehicle { sequence, result }) => {
                match self.tracker.apply_vehicle(sequence, result) {
                    VehicleUpdate::Moved(_) => {
                        self.sync_vehicle_marker();
                        self.publish();
                    }
                    VehicleUpdate::Unchanged => self.sync_vehicle_marker(),
                    VehicleUpdate::Stale | VehicleUpdate::Failed | VehicleUpdate::Ignored => {}
                }
            }
            Ok(Completion::User(result)) => {
                if let Some(coordinate) = self.tracker.apply_user(result) {
                    self.surface.move_marker(MarkerId::User, coordinate);
                    self.publish();
                }
            }
            Err(err) => warn!("Background fetch did not complete: {err}"),
        }
    }

    fn on_input(&mut self, input: Input) {
        match input {
            Input::Renderer(event) => match self.surface.handle_event(event) {
                Some(SurfaceEvent::Ready) => self.on_surface_ready(),
                Some(SurfaceEvent::Touch(phase)) => self.bridge.on_touch(phase, Instant::now()),
                Some(SurfaceEvent::Failed(_)) | None => {}
            },
            Input::LocateUser => self.locate_user(),
            Input::CenterOn(id) => self.center_on(id),
            Input::Unmount => {}
        }
    }

    // Vehicle updates computed before this point are gone; the next successful poll
    // redraws the vehicle. The user marker is placed now because it is not polled.
    fn on_surface_ready(&mut self) {
        if let Some(user) = self.tracker.position().user {
            self.surface.move_marker(MarkerId::User, user);
        }
    }

    // The surface lags the tracker after a command dropped before ready or rejected by
    // the renderer.
    fn sync_vehicle_marker(&mut self) {
        let Some(coordinate) = self.tracker.position().vehicle_coordinate() else {
            return;
        };
        if self.surface.marker(MarkerId::Vehicle) != Some(coordinate) {
            self.surface.move_marker(MarkerId::Vehicle, coordinate);
        }
    }

    fn center_on(&mut self, id: MarkerId) {
        let target = match id {
            MarkerId::Vehicle => Some(
                self.tracker
                    .position()
                    .vehicle_coordinate()
                    .unwrap_or(self.route.initial_position()),
            ),
            MarkerId::User => self.tracker.position().user,
            MarkerId::Stop(index) => self.route.stops().get(index).map(|stop| stop.coordinate()),
        };
        match target {
            Some(center) => {
                self.surface.set_view(center, self.theme.focus_zoom);
            }
            None => debug!("Nothing to center on for {id}"),
        }
    }

    fn publish(&mut self) {
        let metrics = self.tracker.metrics(self.config.assumed_speed_kmh);
        self.metrics.send_if_modified(|current| {
            if *current == metrics {
                return false;
            }
            *current = metrics;
            true
        });
        self.position.send_replace(self.tracker.position().clone());
    }

    fn unmount(&mut self) {
        self.tracker.shutdown();
        self.bridge.release_now();
        self.surface.dispose();
        info!("Unmounted map for vehicle {}", self.route.vehicle_id());
    }
}
