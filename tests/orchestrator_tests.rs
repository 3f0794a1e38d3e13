use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use bustrack::{
    bridge::ScrollFlag,
    config::Config,
    orchestrator::{MapHandle, MapOrchestrator},
    polyline,
    route::{RouteDescriptor, Stop},
    shared::{Coordinate, haversine_distance_km},
    surface::{ChannelRenderer, Command, MarkerId, RendererEvent, RendererMessage},
    tracker::{PollError, SharedLocation, VehicleSource},
};
use tokio::{sync::mpsc::UnboundedReceiver, time::sleep};

type Reply = (Duration, Result<Coordinate, PollError>);

/// Answers polls from a script, one reply per poll, after the scripted delay.
#[derive(Clone, Default)]
struct ScriptedSource {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl ScriptedSource {
    fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            requested: Default::default(),
        }
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl VehicleSource for ScriptedSource {
    async fn fetch_position(&self, vehicle_id: &str) -> Result<Coordinate, PollError> {
        self.requested.lock().unwrap().push(vehicle_id.to_string());
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some((delay, result)) => {
                if !delay.is_zero() {
                    sleep(delay).await;
                }
                result
            }
            None => Err(PollError::Unavailable("script exhausted".into())),
        }
    }
}

struct Screen {
    handle: MapHandle,
    messages: UnboundedReceiver<RendererMessage>,
    flag: ScrollFlag,
    location: SharedLocation,
}

fn route_with_polyline(encoded: String) -> RouteDescriptor {
    RouteDescriptor::new(
        vec![Stop::new("Stop A", 12.90, 77.60)],
        encoded,
        "bus-1",
        Coordinate::new(12.90, 77.60),
    )
    .unwrap()
}

fn route() -> RouteDescriptor {
    route_with_polyline(polyline::encode(&[
        Coordinate::new(12.90, 77.60),
        Coordinate::new(12.905, 77.605),
        Coordinate::new(12.91, 77.61),
    ]))
}

fn mount(route: RouteDescriptor, source: ScriptedSource) -> Screen {
    let (renderer, messages) = ChannelRenderer::channel();
    let flag = ScrollFlag::new();
    let location = SharedLocation::new();
    let handle = MapOrchestrator::new(
        route,
        Config::default(),
        renderer,
        source,
        location.clone(),
        flag.clone(),
    )
    .mount();
    Screen {
        handle,
        messages,
        flag,
        location,
    }
}

async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

fn drain(messages: &mut UnboundedReceiver<RendererMessage>) -> Vec<RendererMessage> {
    let mut drained = Vec::new();
    while let Ok(message) = messages.try_recv() {
        drained.push(message);
    }
    drained
}

fn commands(messages: &mut UnboundedReceiver<RendererMessage>) -> Vec<Command> {
    drain(messages)
        .into_iter()
        .filter_map(|message| match message {
            RendererMessage::Command(json) => Some(Command::from_message(&json).unwrap()),
            _ => None,
        })
        .collect()
}

fn vehicle_commands(commands: &[Command]) -> Vec<&Command> {
    commands
        .iter()
        .filter(|command| match command {
            Command::AddMarker(marker) => marker.id == MarkerId::Vehicle,
            Command::MoveMarker { id, .. } => *id == MarkerId::Vehicle,
            _ => false,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn single_poll_moves_the_vehicle_once() {
    let bus = Coordinate::new(12.91, 77.61);
    let source = ScriptedSource::new(vec![(Duration::ZERO, Ok(bus))]);
    let mut screen = mount(route(), source.clone());

    screen.handle.post_message("MAP_READY");
    settle().await;
    let messages = drain(&mut screen.messages);
    assert!(matches!(messages.first(), Some(RendererMessage::Initialize(_))));
    assert!(screen.handle.metrics().is_none());

    sleep(Duration::from_millis(4_100)).await;
    settle().await;
    let commands = commands(&mut screen.messages);
    assert_eq!(
        vehicle_commands(&commands),
        vec![&Command::MoveMarker {
            id: MarkerId::Vehicle,
            coordinate: bus
        }]
    );
    assert_eq!(source.requested(), vec!["bus-1".to_string()]);
    assert_eq!(screen.handle.position().vehicle_coordinate(), Some(bus));
    assert!(screen.handle.metrics().is_none());
    assert!(screen.handle.metrics_text().is_none());

    let user = Coordinate::new(12.90, 77.60);
    screen.location.grant(user);
    screen.handle.locate_user();
    settle().await;
    let metrics = screen.handle.metrics().unwrap();
    assert!((metrics.distance_km - haversine_distance_km(&bus, &user)).abs() < 1e-9);
    assert!(screen.handle.metrics_text().unwrap().contains(" to bus • "));

    screen.handle.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn polls_keep_running_after_a_failure() {
    let a = Coordinate::new(12.91, 77.61);
    let b = Coordinate::new(12.92, 77.62);
    let source = ScriptedSource::new(vec![
        (Duration::ZERO, Ok(a)),
        (Duration::ZERO, Err(PollError::Unavailable("timeout".into()))),
        (Duration::ZERO, Ok(b)),
    ]);
    let screen = mount(route(), source.clone());
    screen.handle.post_event(RendererEvent::Ready);

    sleep(Duration::from_millis(4_100)).await;
    settle().await;
    assert_eq!(screen.handle.position().vehicle_coordinate(), Some(a));

    sleep(Duration::from_secs(4)).await;
    settle().await;
    assert_eq!(screen.handle.position().vehicle_coordinate(), Some(a));

    sleep(Duration::from_secs(4)).await;
    settle().await;
    assert_eq!(screen.handle.position().vehicle_coordinate(), Some(b));
    assert_eq!(source.requested().len(), 3);
    assert!(screen.handle.is_mounted());
}

#[tokio::test(start_paused = true)]
async fn slow_response_never_overwrites_a_newer_one() {
    let old = Coordinate::new(12.91, 77.61);
    let new = Coordinate::new(12.92, 77.62);
    let source = ScriptedSource::new(vec![
        (Duration::from_secs(6), Ok(old)),
        (Duration::ZERO, Ok(new)),
    ]);
    let mut screen = mount(route(), source);
    screen.handle.post_event(RendererEvent::Ready);

    // Poll 0 starts at 4 s and lands at 10 s, poll 1 starts and lands at 8 s.
    sleep(Duration::from_millis(8_100)).await;
    settle().await;
    assert_eq!(screen.handle.position().vehicle_coordinate(), Some(new));

    sleep(Duration::from_secs(2)).await;
    settle().await;
    assert_eq!(screen.handle.position().vehicle_coordinate(), Some(new));
    let commands = commands(&mut screen.messages);
    assert_eq!(vehicle_commands(&commands).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn updates_before_ready_are_not_replayed() {
    let a = Coordinate::new(12.91, 77.61);
    let b = Coordinate::new(12.92, 77.62);
    let source = ScriptedSource::new(vec![(Duration::ZERO, Ok(a)), (Duration::ZERO, Ok(b))]);
    let mut screen = mount(route(), source);

    sleep(Duration::from_millis(4_100)).await;
    settle().await;
    assert_eq!(screen.handle.position().vehicle_coordinate(), Some(a));
    assert!(commands(&mut screen.messages).is_empty());

    screen.handle.post_message("MAP_READY");
    settle().await;
    assert!(commands(&mut screen.messages).is_empty());

    sleep(Duration::from_secs(4)).await;
    settle().await;
    assert_eq!(
        commands(&mut screen.messages),
        vec![Command::MoveMarker {
            id: MarkerId::Vehicle,
            coordinate: b
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn stationary_bus_is_redrawn_after_ready() {
    let parked = Coordinate::new(12.91, 77.61);
    let source = ScriptedSource::new(vec![
        (Duration::ZERO, Ok(parked)),
        (Duration::ZERO, Ok(parked)),
        (Duration::ZERO, Ok(parked)),
    ]);
    let mut screen = mount(route(), source);

    sleep(Duration::from_millis(4_100)).await;
    settle().await;
    assert_eq!(screen.handle.position().vehicle_coordinate(), Some(parked));

    screen.handle.post_message("MAP_READY");
    settle().await;
    assert!(commands(&mut screen.messages).is_empty());

    sleep(Duration::from_secs(4)).await;
    settle().await;
    assert_eq!(
        commands(&mut screen.messages),
        vec![Command::MoveMarker {
            id: MarkerId::Vehicle,
            coordinate: parked
        }]
    );

    sleep(Duration::from_secs(4)).await;
    settle().await;
    assert!(commands(&mut screen.messages).is_empty());
}

#[tokio::test(start_paused = true)]
async fn user_marker_is_placed_once_ready() {
    let source = ScriptedSource::new(vec![]);
    let mut screen = mount(route(), source);
    let user = Coordinate::new(12.89, 77.59);
    screen.location.grant(user);
    screen.handle.locate_user();
    settle().await;
    assert_eq!(screen.handle.position().user, Some(user));
    assert!(commands(&mut screen.messages).is_empty());

    screen.handle.post_message("MAP_READY");
    settle().await;
    assert!(matches!(
        commands(&mut screen.messages).as_slice(),
        [Command::AddMarker(marker)] if marker.id == MarkerId::User && marker.coordinate == user
    ));
}

#[tokio::test(start_paused = true)]
async fn touch_release_waits_for_the_debounce() {
    let screen = mount(route(), ScriptedSource::default());
    screen.handle.post_message("MAP_READY");

    screen.handle.post_message("MAP_TOUCH_START");
    settle().await;
    assert!(!screen.flag.is_enabled());

    screen.handle.post_message("MAP_TOUCH_END");
    settle().await;
    sleep(Duration::from_millis(99)).await;
    settle().await;
    assert!(!screen.flag.is_enabled());

    sleep(Duration::from_millis(2)).await;
    settle().await;
    assert!(screen.flag.is_enabled());
}

#[tokio::test(start_paused = true)]
async fn rapid_touches_keep_scrolling_disabled() {
    let screen = mount(route(), ScriptedSource::default());
    screen.handle.post_event(RendererEvent::Ready);

    screen.handle.post_event(RendererEvent::TouchStart);
    screen.handle.post_event(RendererEvent::TouchEnd);
    settle().await;
    sleep(Duration::from_millis(50)).await;
    screen.handle.post_event(RendererEvent::TouchStart);
    settle().await;
    assert!(!screen.flag.is_enabled());

    sleep(Duration::from_millis(100)).await;
    settle().await;
    assert!(!screen.flag.is_enabled());

    screen.handle.post_event(RendererEvent::TouchCancel);
    settle().await;
    sleep(Duration::from_millis(101)).await;
    settle().await;
    assert!(screen.flag.is_enabled());
}

#[tokio::test(start_paused = true)]
async fn malformed_polyline_still_mounts() {
    let bus = Coordinate::new(12.91, 77.61);
    let source = ScriptedSource::new(vec![(Duration::ZERO, Ok(bus))]);
    let mut screen = mount(route_with_polyline("_p~iF~ps|U_".into()), source);

    settle().await;
    let Some(RendererMessage::Initialize(json)) = drain(&mut screen.messages).into_iter().next()
    else {
        panic!("expected an init message");
    };
    let init: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(init["path"].as_array().unwrap().is_empty());
    assert!(init["fitBounds"].is_null());

    screen.handle.post_message("MAP_READY");
    sleep(Duration::from_millis(4_100)).await;
    settle().await;
    assert_eq!(vehicle_commands(&commands(&mut screen.messages)).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn center_on_vehicle_uses_the_initial_position() {
    let mut screen = mount(route(), ScriptedSource::default());
    screen.handle.post_message("MAP_READY");
    screen.handle.center_on(MarkerId::Vehicle);
    screen.handle.center_on(MarkerId::User);
    settle().await;
    assert_eq!(
        commands(&mut screen.messages),
        vec![Command::SetView {
            center: Coordinate::new(12.90, 77.60),
            zoom: 15
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn unmount_stops_polling_and_releases_everything() {
    let source = ScriptedSource::new(vec![(Duration::from_secs(10), Ok(Coordinate::new(1.0, 1.0)))]);
    let Screen {
        handle,
        mut messages,
        flag,
        ..
    } = mount(route(), source.clone());
    handle.post_message("MAP_READY");
    handle.post_message("MAP_TOUCH_START");
    sleep(Duration::from_millis(4_100)).await;
    settle().await;
    assert!(!flag.is_enabled());
    assert_eq!(source.requested().len(), 1);

    handle.unmount().await;
    assert!(flag.is_enabled());
    assert_eq!(drain(&mut messages).last(), Some(&RendererMessage::Release));

    sleep(Duration::from_secs(20)).await;
    assert_eq!(source.requested().len(), 1);
}
