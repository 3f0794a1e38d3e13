use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// The scroll container that hosts the map.
pub trait ScrollHost: Send {
    /// Called the moment the map takes gestures. The host disables scrolling.
    fn on_map_touch_start(&mut self);
    /// Called once the map has let go of gestures. The host enables scrolling.
    fn on_map_touch_end(&mut self);
}

/// Shared scroll-enabled flag, the simplest possible host.
#[derive(Debug, Clone)]
pub struct ScrollFlag(Arc<AtomicBool>);

impl Default for ScrollFlag {
    fn default() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }
}

impl ScrollFlag {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl ScrollHost for ScrollFlag {
    fn on_map_touch_start(&mut self) {
        self.0.store(false, Ordering::Release);
    }

    fn on_map_touch_end(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Host built from two closures.
pub struct ScrollCallbacks<S, E> {
    on_start: S,
    on_end: E,
}

impl<S, E> ScrollCallbacks<S, E>
where
    S: FnMut() + Send,
    E: FnMut() + Send,
{
    pub fn new(on_start: S, on_end: E) -> Self {
        Self { on_start, on_end }
    }
}

impl<S, E> ScrollHost for ScrollCallbacks<S, E>
where
    S: FnMut() + Send,
    E: FnMut() + Send,
{
    fn on_map_touch_start(&mut self) {
        (self.on_start)()
    }

    fn on_map_touch_end(&mut self) {
        (self.on_end)()
    }
}
