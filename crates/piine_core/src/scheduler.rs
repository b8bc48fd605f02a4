use std::{
    future::poll_fn,
    task::{Context, Poll},
    time::Duration,
};

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchedulerState {
    Idle,
    Running,
    Stopped,
    Disposed,
}

/// Fixed-interval tick source whose start and stop are driven by its owner.
///
/// The first tick arrives one interval after `start`. A stopped scheduler
/// stays pending until restarted; a disposed one ends its stream for good.
#[derive(Debug)]
pub struct PeriodicScheduler {
    interval: Duration,
    timer: Option<Interval>,
    state: SchedulerState,
    ticks: u64,
}

impl PeriodicScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            timer: None,
            state: SchedulerState::Idle,
            ticks: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn start(&mut self) {
        if matches!(self.state, SchedulerState::Running | SchedulerState::Disposed) {
            return;
        }
        let mut timer = interval_at(Instant::now() + self.interval, self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.timer = Some(timer);
        self.state = SchedulerState::Running;
    }

    pub fn stop(&mut self) {
        if self.state == SchedulerState::Running {
            self.timer = None;
            self.state = SchedulerState::Stopped;
        }
    }

    pub fn dispose(&mut self) {
        self.stop();
        self.timer = None;
        self.state = SchedulerState::Disposed;
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    pub fn is_disposed(&self) -> bool {
        self.state == SchedulerState::Disposed
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Yields the running tick number, or `None` once disposed.
    pub fn poll_tick(&mut self, cx: &mut Context<'_>) -> Poll<Option<u64>> {
        match (self.state, self.timer.as_mut()) {
            (SchedulerState::Disposed, _) => Poll::Ready(None),
            (SchedulerState::Running, Some(timer)) => timer.poll_tick(cx).map(|_| {
                self.ticks += 1;
                Some(self.ticks)
            }),
            _ => Poll::Pending,
        }
    }

    pub async fn tick(&mut self) -> Option<u64> {
        poll_fn(|cx| self.poll_tick(cx)).await
    }
}

#[cfg(test)]
#[path = "tests/scheduler_tests.rs"]
mod tests;
