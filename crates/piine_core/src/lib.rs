//! Session controller for the piine reaction viewer.
//!
//! [`AppController`] owns the participant count, binds host triggers through
//! an [`EventRegistry`], and drives ovation bursts on a [`PeriodicScheduler`].
//! Rendering stays behind the [`ViewPort`] trait and element lookup behind
//! [`HostEnvironment`].

pub mod controller;
pub mod handle;
pub mod host;
pub mod ovation;
pub mod registry;
pub mod scheduler;
pub mod view;

pub use controller::{AppController, AppEvent, ControllerMessage, SessionSnapshot};
pub use handle::{instance, instance_or_init, AppHandle};
pub use host::{HostEnvironment, StaticHost};
pub use ovation::{
    MAX_SIMULTANEOUS_PIINE_IN_OVATION, OVATION_DURATION, OVATION_TICK_INTERVAL,
};
pub use registry::{EventRegistry, Handler, ListenerKey};
pub use scheduler::PeriodicScheduler;
pub use view::ViewPort;
