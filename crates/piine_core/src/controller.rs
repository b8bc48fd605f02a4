//! The app controller: session state, trigger wiring, and ovation bursts.

use std::{sync::Arc, time::Duration};

use futures::StreamExt;
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use shared::{
    domain::{Control, ElementRef, OvationId, ParticipantId, VIEW_ID},
    error::PiineError,
    trigger::{Trigger, TriggerKind, TriggerSource},
};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio_stream::StreamMap;
use tracing::{debug, info, trace, warn};

use crate::{
    host::HostEnvironment,
    ovation::{draw_reactions, OvationEvent, OvationRun, OVATION_DURATION},
    registry::{EventRegistry, Handler},
    view::ViewPort,
};

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub participant_count: u32,
    pub attached: bool,
    pub disposed: bool,
    pub active_ovations: usize,
    pub completed_ovations: u64,
    pub ovation_ticks: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AppEvent {
    Joined { participant: ParticipantId },
    Left { participant: ParticipantId },
    ReceivedPiine { participant: ParticipantId },
    OvationStarted { id: OvationId },
    OvationFinished { id: OvationId, ticks: u64 },
    Disposed,
}

pub enum ControllerMessage {
    Trigger(Trigger),
    AttachEvents,
    DetachEvents,
    Render,
    Dispose,
    Flush(oneshot::Sender<SessionSnapshot>),
}

pub struct AppController {
    host: Arc<dyn HostEnvironment>,
    view: Box<dyn ViewPort>,
    registry: EventRegistry<AppController>,
    participant_count: u32,
    attached: bool,
    disposed: bool,
    rng: StdRng,
    ovations: StreamMap<OvationId, OvationRun>,
    next_ovation: u64,
    completed_ovations: u64,
    ovation_ticks: u64,
    status: watch::Sender<SessionSnapshot>,
    events: broadcast::Sender<AppEvent>,
}

impl AppController {
    pub fn new(host: Arc<dyn HostEnvironment>, view: Box<dyn ViewPort>) -> Self {
        Self::construct(host, view, StdRng::from_os_rng())
    }

    /// Same as [`AppController::new`] with a deterministic reaction sequence.
    pub fn with_seed(host: Arc<dyn HostEnvironment>, view: Box<dyn ViewPort>, seed: u64) -> Self {
        Self::construct(host, view, StdRng::seed_from_u64(seed))
    }

    fn construct(host: Arc<dyn HostEnvironment>, view: Box<dyn ViewPort>, rng: StdRng) -> Self {
        let (status, _) = watch::channel(SessionSnapshot::default());
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let mut controller = Self {
            host,
            view,
            registry: EventRegistry::new(),
            participant_count: 0,
            attached: false,
            disposed: false,
            rng,
            ovations: StreamMap::new(),
            next_ovation: 0,
            completed_ovations: 0,
            ovation_ticks: 0,
            status,
            events,
        };
        controller.attach_events();
        controller.render();
        controller
    }

    pub fn participant_count(&self) -> u32 {
        self.participant_count
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn active_ovations(&self) -> usize {
        self.ovations.len()
    }

    pub fn listener_count(&self) -> usize {
        self.registry.len()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            participant_count: self.participant_count,
            attached: self.attached,
            disposed: self.disposed,
            active_ovations: self.ovations.len(),
            completed_ovations: self.completed_ovations,
            ovation_ticks: self.ovation_ticks,
        }
    }

    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.status.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<AppEvent> {
        self.events.subscribe()
    }

    pub(crate) fn event_sender(&self) -> broadcast::Sender<AppEvent> {
        self.events.clone()
    }

    pub fn attach_events(&mut self) {
        if self.attached || self.disposed {
            return;
        }

        self.registry.listen(
            Some(TriggerSource::Window),
            TriggerKind::Unload,
            Self::handle_unload,
        );
        for control in Control::ALL {
            let source = match self.locate(control.element_id()) {
                Ok(element) => Some(TriggerSource::Element(element)),
                Err(err) => {
                    warn!(%err, "control not bound");
                    None
                }
            };
            self.registry
                .listen(source, TriggerKind::Click, Self::control_handler(control));
        }
        self.attached = true;
        debug!(listeners = self.registry.len(), "events attached");
        self.publish();
    }

    pub fn detach_events(&mut self) {
        if !self.attached {
            return;
        }
        self.registry.remove_all();
        self.attached = false;
        debug!("events detached");
        self.publish();
    }

    /// Mounts the view into the view host. A missing host is logged and
    /// otherwise ignored.
    pub fn render(&mut self) {
        if self.disposed {
            return;
        }
        match self.locate(VIEW_ID) {
            Ok(element) => self.view.mount(&element),
            Err(err) => warn!(%err, "view not rendered"),
        }
    }

    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        let in_flight: Vec<OvationId> = self.ovations.keys().copied().collect();
        for id in in_flight {
            if let Some(run) = self.ovations.remove(&id) {
                let ticks = run.finish();
                debug!(ovation = %id, ticks, "ovation cut short by dispose");
            }
        }
        self.view.release();
        self.registry.dispose();
        self.attached = false;
        self.disposed = true;
        info!("controller disposed");
        self.emit(AppEvent::Disposed);
        self.publish();
    }

    /// Routes `trigger` to every handler bound to it.
    pub fn dispatch(&mut self, trigger: &Trigger) {
        if self.disposed {
            debug!(%trigger, "trigger ignored after dispose");
            return;
        }
        let handlers = self.registry.handlers_for(trigger);
        if handlers.is_empty() {
            trace!(%trigger, "no listeners");
        }
        for handler in handlers {
            if self.disposed {
                break;
            }
            handler(self, trigger);
        }
        self.publish();
    }

    /// Starts a burst of random reactions lasting `duration`.
    ///
    /// Overlapping calls run independently. Needs a Tokio runtime with
    /// timers enabled.
    pub fn ovation(&mut self, duration: Duration) -> Option<OvationId> {
        if self.disposed {
            return None;
        }
        let id = OvationId(self.next_ovation);
        self.next_ovation += 1;
        self.ovations.insert(id, OvationRun::start(id, duration));
        info!(ovation = %id, duration_ms = duration.as_millis() as u64, "ovation started");
        self.emit(AppEvent::OvationStarted { id });
        self.publish();
        Some(id)
    }

    /// Runs the controller until it is disposed or every handle is gone.
    pub async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<ControllerMessage>) {
        while !self.disposed {
            tokio::select! {
                biased;
                Some((id, event)) = self.ovations.next(), if !self.ovations.is_empty() => {
                    self.on_ovation_event(id, event);
                }
                message = inbox.recv() => match message {
                    Some(message) => self.handle_message(message),
                    None => {
                        debug!("inbox closed");
                        self.dispose();
                    }
                },
            }
        }
        // Answer anything still queued so waiting handles observe the final state.
        inbox.close();
        while let Ok(message) = inbox.try_recv() {
            if let ControllerMessage::Flush(reply) = message {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    fn handle_message(&mut self, message: ControllerMessage) {
        match message {
            ControllerMessage::Trigger(trigger) => self.dispatch(&trigger),
            ControllerMessage::AttachEvents => self.attach_events(),
            ControllerMessage::DetachEvents => self.detach_events(),
            ControllerMessage::Render => self.render(),
            ControllerMessage::Dispose => self.dispose(),
            ControllerMessage::Flush(reply) => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    fn on_ovation_event(&mut self, id: OvationId, event: OvationEvent) {
        match event {
            OvationEvent::Tick(_) => self.handle_tick(id),
            OvationEvent::Elapsed => self.finish_ovation(id),
        }
        self.publish();
    }

    fn handle_tick(&mut self, id: OvationId) {
        self.ovation_ticks += 1;
        let picks = draw_reactions(&mut self.rng, self.participant_count);
        trace!(ovation = %id, reactions = picks.len(), "ovation tick");
        for participant in picks {
            self.view.mark_reacting(participant);
        }
    }

    fn finish_ovation(&mut self, id: OvationId) {
        if let Some(run) = self.ovations.remove(&id) {
            let ticks = run.finish();
            self.completed_ovations += 1;
            info!(ovation = %id, ticks, "ovation finished");
            self.emit(AppEvent::OvationFinished { id, ticks });
        }
    }

    fn control_handler(control: Control) -> Handler<Self> {
        match control {
            Control::AddUser => Self::handle_join,
            Control::RemoveUser => Self::handle_leave,
            Control::ReactUser => Self::handle_receive_piine,
            Control::Ovation => Self::handle_ovation,
        }
    }

    fn handle_unload(&mut self, _trigger: &Trigger) {
        debug!("unload received");
        self.dispose();
    }

    fn handle_join(&mut self, _trigger: &Trigger) {
        let label = ParticipantId(self.participant_count);
        let Some(next) = self.participant_count.checked_add(1) else {
            warn!("participant count saturated; join ignored");
            return;
        };
        self.participant_count = next;
        self.view.add_participant(label);
        info!(participant = %label, count = next, "participant joined");
        self.emit(AppEvent::Joined { participant: label });
    }

    fn handle_leave(&mut self, _trigger: &Trigger) {
        if self.participant_count == 0 {
            return;
        }
        let label = ParticipantId(self.participant_count);
        self.participant_count -= 1;
        self.view.remove_participant(label);
        info!(participant = %label, count = self.participant_count, "participant left");
        self.emit(AppEvent::Left { participant: label });
    }

    fn handle_receive_piine(&mut self, _trigger: &Trigger) {
        if self.participant_count == 0 {
            return;
        }
        let participant = ParticipantId(0);
        self.view.mark_reacting(participant);
        self.emit(AppEvent::ReceivedPiine { participant });
    }

    fn handle_ovation(&mut self, _trigger: &Trigger) {
        self.ovation(OVATION_DURATION);
    }

    fn locate(&self, id: &str) -> Result<ElementRef, PiineError> {
        self.host
            .element(id)
            .ok_or_else(|| PiineError::missing_element(id))
    }

    fn emit(&self, event: AppEvent) {
        let _ = self.events.send(event);
    }

    fn publish(&self) {
        self.status.send_replace(self.snapshot());
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
