use tokio::sync::mpsc;

use crate::surface::{self, Command, Renderer, SurfaceInit};

/// Serialized traffic towards the embedded renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RendererMessage {
    /// JSON encoded [`SurfaceInit`].
    Initialize(String),
    /// JSON encoded [`Command`].
    Command(String),
    Release,
}

/// Renderer that serializes everything onto a channel. The receiving end lives next to
/// the real rendering technology and applies the messages there.
#[derive(Debug, Clone)]
pub struct ChannelRenderer {
    sender: mpsc::UnboundedSender<RendererMessage>,
}

impl ChannelRenderer {
    pub fn new(sender: mpsc::UnboundedSender<RendererMessage>) -> Self {
        Self { sender }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<RendererMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }

    fn post(&self, message: RendererMessage) -> Result<(), surface::Error> {
        self.sender
            .send(message)
            .map_err(|_| surface::Error::ChannelClosed)
    }
}

impl Renderer for ChannelRenderer {
    fn initialize(&mut self, init: &SurfaceInit) -> Result<(), surface::Error> {
        self.post(RendererMessage::Initialize(init.to_message()?))
    }

    fn execute(&mut self, command: &Command) -> Result<(), surface::Error> {
        self.post(RendererMessage::Command(command.to_message()?))
    }

    fn release(&mut self) {
        let _ = self.post(RendererMessage::Release);
    }
}
