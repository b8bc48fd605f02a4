use shared::domain::{ElementRef, ParticipantId};

/// Rendering collaborator that materializes participants and reactions.
pub trait ViewPort: Send {
    fn mount(&mut self, host: &ElementRef);
    fn add_participant(&mut self, label: ParticipantId);
    fn remove_participant(&mut self, label: ParticipantId);
    fn mark_reacting(&mut self, index: ParticipantId);
    fn release(&mut self);
}
