use std::sync::OnceLock;

use shared::{error::PiineError, trigger::Trigger};
use tokio::sync::{broadcast, mpsc, oneshot, watch};

use crate::controller::{AppController, AppEvent, ControllerMessage, SessionSnapshot};

static INSTANCE: OnceLock<AppHandle> = OnceLock::new();

/// Returns the process-wide handle, building and spawning the controller on
/// first access. Later calls ignore `init` and return the same handle.
///
/// The first call must happen inside a Tokio runtime. The installed
/// controller lives until it is disposed; it is never replaced.
pub fn instance_or_init<F>(init: F) -> &'static AppHandle
where
    F: FnOnce() -> AppController,
{
    INSTANCE.get_or_init(|| AppHandle::spawn(init()))
}

pub fn instance() -> Option<&'static AppHandle> {
    INSTANCE.get()
}

/// Cloneable front for a controller running on its own task.
///
/// Every mutation goes through the controller's inbox, so session state has
/// exactly one writer regardless of how many handles exist.
#[derive(Clone)]
pub struct AppHandle {
    inbox: mpsc::UnboundedSender<ControllerMessage>,
    status: watch::Receiver<SessionSnapshot>,
    events: broadcast::Sender<AppEvent>,
}

impl AppHandle {
    pub fn spawn(controller: AppController) -> Self {
        let (inbox, rx) = mpsc::unbounded_channel();
        let handle = Self {
            inbox,
            status: controller.watch(),
            events: controller.event_sender(),
        };
        tokio::spawn(controller.run(rx));
        handle
    }

    pub fn trigger(&self, trigger: Trigger) -> Result<(), PiineError> {
        self.send(ControllerMessage::Trigger(trigger))
    }

    pub fn click(&self, element_id: &str) -> Result<(), PiineError> {
        self.trigger(Trigger::click(element_id))
    }

    pub fn unload(&self) -> Result<(), PiineError> {
        self.trigger(Trigger::unload())
    }

    pub fn attach_events(&self) -> Result<(), PiineError> {
        self.send(ControllerMessage::AttachEvents)
    }

    pub fn detach_events(&self) -> Result<(), PiineError> {
        self.send(ControllerMessage::DetachEvents)
    }

    pub fn render(&self) -> Result<(), PiineError> {
        self.send(ControllerMessage::Render)
    }

    pub fn dispose(&self) -> Result<(), PiineError> {
        self.send(ControllerMessage::Dispose)
    }

    /// Last published state. May lag behind messages still in the inbox.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.status.borrow().clone()
    }

    /// State after every message sent so far has been handled.
    pub async fn flush(&self) -> Result<SessionSnapshot, PiineError> {
        let (reply, rx) = oneshot::channel();
        self.send(ControllerMessage::Flush(reply))?;
        rx.await.map_err(|_| self.stopped_error())
    }

    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.status.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<AppEvent> {
        self.events.subscribe()
    }

    /// Waits until no ovation is in flight (or the controller is disposed).
    pub async fn wait_for_idle(&self) -> Result<SessionSnapshot, PiineError> {
        match self.flush().await {
            Ok(_) => {}
            Err(PiineError::Disposed) => return Ok(self.snapshot()),
            Err(err) => return Err(err),
        }
        let mut status = self.status.clone();
        let snapshot = status
            .wait_for(|snapshot| snapshot.active_ovations == 0 || snapshot.disposed)
            .await
            .map_err(|_| PiineError::ControllerStopped)?;
        Ok(snapshot.clone())
    }

    /// Resolves once the controller task has stopped.
    pub async fn closed(&self) {
        self.inbox.closed().await;
    }

    fn send(&self, message: ControllerMessage) -> Result<(), PiineError> {
        self.inbox.send(message).map_err(|_| self.stopped_error())
    }

    fn stopped_error(&self) -> PiineError {
        if self.status.borrow().disposed {
            PiineError::Disposed
        } else {
            PiineError::ControllerStopped
        }
    }
}
