use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, warn};

use crate::{
    orchestrator::Input,
    shared::eta::DerivedMetrics,
    surface::{MarkerId, RendererEvent},
    tracker::TrackedPosition,
};

/// Handle to a mounted map. Dropping it unmounts the map as well.
pub struct MapHandle {
    inputs: mpsc::UnboundedSender<Input>,
    metrics: watch::Receiver<Option<DerivedMetrics>>,
    position: watch::Receiver<TrackedPosition>,
    task: JoinHandle<()>,
}

impl MapHandle {
    pub(crate) fn new(
        inputs: mpsc::UnboundedSender<Input>,
        metrics: watch::Receiver<Option<DerivedMetrics>>,
        position: watch::Receiver<TrackedPosition>,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            inputs,
            metrics,
            position,
            task,
        }
    }

    pub fn post_event(&self, event: RendererEvent) -> bool {
        self.send(Input::Renderer(event))
    }

    /// Parses and forwards a raw renderer message. Unknown messages are ignored.
    pub fn post_message(&self, message: &str) -> bool {
        match RendererEvent::from_message(message) {
            Some(event) => self.post_event(event),
            None => {
                debug!("Ignoring unknown renderer message {message:?}");
                false
            }
        }
    }

    pub fn locate_user(&self) -> bool {
        self.send(Input::LocateUser)
    }

    pub fn center_on(&self, id: MarkerId) -> bool {
        self.send(Input::CenterOn(id))
    }

    pub fn metrics(&self) -> Option<DerivedMetrics> {
        *self.metrics.borrow()
    }

    pub fn metrics_text(&self) -> Option<String> {
        self.metrics().map(|metrics| metrics.summary())
    }

    pub fn subscribe_metrics(&self) -> watch::Receiver<Option<DerivedMetrics>> {
        self.metrics.clone()
    }

    pub fn position(&self) -> TrackedPosition {
        self.position.borrow().clone()
    }

    pub fn is_mounted(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops polling, releases the surface and waits for the map task to finish.
    pub async fn unmount(self) {
        let _ = self.inputs.send(Input::Unmount);
        if let Err(err) = self.task.await {
            warn!("Map task ended abnormally: {err}");
        }
    }

    fn send(&self, input: Input) -> bool {
        self.inputs.send(input).is_ok()
    }
}
