use std::time::Duration;

use crate::timer::{TimerHandle, TimerService, TimerSet};
use crate::TimerEvent;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    Idle,
    Grace,
    Running,
    Expired,
    Cancelled,
}

/// One second of the countdown. `remaining` is already decremented;
/// `expired` is set on the tick that reached zero, and no tick follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownTick {
    pub remaining: u32,
    pub expired: bool,
}

/// Counts down to forced termination once a scene has nothing left to play.
#[derive(Debug)]
pub struct IdleCountdown {
    remaining: u32,
    state: CountdownState,
    timers: TimerSet,
}

impl IdleCountdown {
    pub fn new(initial_seconds: u32) -> Self {
        Self {
            remaining: initial_seconds,
            state: CountdownState::Idle,
            timers: TimerSet::new(),
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Arms the grace period; ticking begins when it elapses.
    pub fn start(
        &mut self,
        timers: &mut dyn TimerService<TimerEvent>,
        initial_seconds: u32,
        grace: Duration,
    ) {
        if self.state != CountdownState::Idle {
            return;
        }
        self.remaining = initial_seconds;
        self.state = CountdownState::Grace;
        self.timers
            .track(timers.after(grace, TimerEvent::CountdownGrace));
    }

    /// Grace period over. Returns the value to show before the first tick.
    pub fn on_grace(
        &mut self,
        timers: &mut dyn TimerService<TimerEvent>,
        handle: TimerHandle,
    ) -> Option<u32> {
        self.timers.forget(handle);
        if self.state != CountdownState::Grace {
            return None;
        }
        self.state = CountdownState::Running;
        self.timers
            .track(timers.every(TICK_INTERVAL, TimerEvent::CountdownTick));
        Some(self.remaining)
    }

    pub fn on_tick(&mut self, timers: &mut dyn TimerService<TimerEvent>) -> Option<CountdownTick> {
        if self.state != CountdownState::Running {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        let expired = self.remaining == 0;
        if expired {
            self.timers.cancel_all(timers);
            self.state = CountdownState::Expired;
        }
        Some(CountdownTick {
            remaining: self.remaining,
            expired,
        })
    }

    pub fn cancel(&mut self, timers: &mut dyn TimerService<TimerEvent>) {
        self.timers.cancel_all(timers);
        if matches!(self.state, CountdownState::Grace | CountdownState::Running) {
            self.state = CountdownState::Cancelled;
        }
    }
}
