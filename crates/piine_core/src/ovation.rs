//! Timed bursts of randomized reactions.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};

use futures::Stream;
use rand::Rng;
use shared::domain::{OvationId, ParticipantId};
use tokio::time::{sleep, Sleep};

use crate::scheduler::PeriodicScheduler;

pub const OVATION_DURATION: Duration = Duration::from_millis(2000);
pub const OVATION_TICK_INTERVAL: Duration = Duration::from_millis(100);
pub const MAX_SIMULTANEOUS_PIINE_IN_OVATION: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OvationEvent {
    Tick(u64),
    Elapsed,
}

/// One burst: a running scheduler plus the deadline that ends it.
///
/// As a stream it yields `Tick`s until the deadline, then a single
/// `Elapsed`, then ends. A tick due at the deadline itself is dropped.
pub struct OvationRun {
    id: OvationId,
    scheduler: PeriodicScheduler,
    deadline: Pin<Box<Sleep>>,
    elapsed: bool,
}

impl OvationRun {
    pub fn start(id: OvationId, duration: Duration) -> Self {
        Self::start_with_interval(id, duration, OVATION_TICK_INTERVAL)
    }

    pub fn start_with_interval(id: OvationId, duration: Duration, tick_interval: Duration) -> Self {
        let mut scheduler = PeriodicScheduler::new(tick_interval);
        scheduler.start();
        Self {
            id,
            scheduler,
            deadline: Box::pin(sleep(duration)),
            elapsed: false,
        }
    }

    pub fn id(&self) -> OvationId {
        self.id
    }

    pub fn ticks(&self) -> u64 {
        self.scheduler.tick_count()
    }

    /// Stops and releases the scheduler, returning how many ticks it fired.
    pub fn finish(mut self) -> u64 {
        self.scheduler.stop();
        self.scheduler.dispose();
        self.scheduler.tick_count()
    }
}

impl Stream for OvationRun {
    type Item = OvationEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.elapsed {
            return Poll::Ready(None);
        }
        if this.deadline.as_mut().poll(cx).is_ready() {
            this.elapsed = true;
            return Poll::Ready(Some(OvationEvent::Elapsed));
        }
        this.scheduler
            .poll_tick(cx)
            .map(|tick| tick.map(OvationEvent::Tick))
    }
}

/// Number of reactions for a real-valued bound drawn from `[0, MAX)`.
pub fn reactions_for_bound(bound: f64) -> u32 {
    if !bound.is_finite() || bound <= 0.0 {
        return 0;
    }
    (bound.floor() as u32).min(MAX_SIMULTANEOUS_PIINE_IN_OVATION - 1)
}

/// Picks the participants that react on one tick.
///
/// The bound is drawn even when nobody is present so the random sequence
/// does not depend on the participant count.
pub fn draw_reactions<R: Rng>(rng: &mut R, participant_count: u32) -> Vec<ParticipantId> {
    let bound = rng.random::<f64>() * f64::from(MAX_SIMULTANEOUS_PIINE_IN_OVATION);
    if participant_count == 0 {
        return Vec::new();
    }
    (0..reactions_for_bound(bound))
        .map(|_| ParticipantId(rng.random_range(0..participant_count)))
        .collect()
}

#[cfg(test)]
#[path = "tests/ovation_tests.rs"]
mod tests;
