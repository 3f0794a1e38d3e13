mod host;
pub use host::*;

use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

use crate::surface::TouchPhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOwner {
    Map,
    Page,
}

pub struct TouchBridge<H: ScrollHost> {
    host: H,
    owner: GestureOwner,
    release_delay: Duration,
    release_at: Option<Instant>,
}

impl<H: ScrollHost> TouchBridge<H> {
    pub fn new(host: H, release_delay: Duration) -> Self {
        Self {
            host,
            owner: GestureOwner::Page,
            release_delay,
            release_at: None,
        }
    }

    pub fn on_touch(&mut self, phase: TouchPhase, now: Instant) {
        match phase {
            TouchPhase::Start => self.touch_start(),
            TouchPhase::End => self.touch_end(now),
        }
    }

    /// Disables page scrolling right away and cancels any pending release.
    pub fn touch_start(&mut self) {
        self.release_at = None;
        if self.owner == GestureOwner::Page {
            self.owner = GestureOwner::Map;
            trace!("Map took gesture ownership");
            self.host.on_map_touch_start();
        }
    }

    pub fn touch_end(&mut self, now: Instant) {
        if self.owner == GestureOwner::Map {
            self.release_at = Some(now + self.release_delay);
        }
    }

    pub fn release_deadline(&self) -> Option<Instant> {
        self.release_at
    }

    pub fn poll_release(&mut self, now: Instant) -> bool {
        match self.release_at {
            Some(deadline) if now >= deadline => {
                self.release_at = None;
                self.owner = GestureOwner::Page;
                trace!("Page took gesture ownership");
                self.host.on_map_touch_end();
                true
            }
            _ => false,
        }
    }

    /// Gives scrolling back to the page without waiting, for when the map goes away
    /// in the middle of a gesture.
    pub fn release_now(&mut self) {
        self.release_at = None;
        if self.owner == GestureOwner::Map {
            self.owner = GestureOwner::Page;
            self.host.on_map_touch_end();
        }
    }

    pub fn owner(&self) -> GestureOwner {
        self.owner
    }

    pub fn release_delay(&self) -> Duration {
        self.release_delay
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

pub(crate) async fn release_timer(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
