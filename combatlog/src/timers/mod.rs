//! Tick-driven recurring timers
//!
//! Provides:
//! - heartbeat: periodic callbacks identified by a `TimerHandle`
//! - `TickScheduler`: a `Scheduler` for hosts with a fixed game tick
//!
//! The host advances the scheduler by each game tick's elapsed time and
//! dispatches the returned handles. A heartbeat fires at most once per
//! `advance` call; beats missed by a long stall are skipped, not replayed.

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::debug;

use crate::host::{Scheduler, TimerHandle};

/// A recurring heartbeat timer
#[derive(Debug, Clone)]
pub struct HeartBeat {
    /// Handle given to the owner
    pub handle: TimerHandle,
    /// Interval between beats
    pub period: Duration,
    /// Time accumulated since the last beat
    pub elapsed: Duration,
}

impl HeartBeat {
    /// Create a new heartbeat
    pub fn new(handle: TimerHandle, period: Duration) -> Self {
        Self {
            handle,
            period,
            elapsed: Duration::ZERO,
        }
    }

    /// Accumulate `dt`; returns true if the beat is due
    fn advance(&mut self, dt: Duration) -> bool {
        self.elapsed += dt;
        if self.elapsed < self.period {
            return false;
        }
        self.elapsed -= self.period;
        if self.elapsed >= self.period {
            self.elapsed = Duration::ZERO;
        }
        true
    }
}

/// Scheduler for hosts that run a fixed-rate game loop
#[derive(Debug, Default)]
pub struct TickScheduler {
    next_handle: u64,
    heartbeats: BTreeMap<TimerHandle, HeartBeat>,
}

impl TickScheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance all heartbeats by `dt`, returning the handles that are due
    pub fn advance(&mut self, dt: Duration) -> Vec<TimerHandle> {
        let fired: Vec<TimerHandle> = self
            .heartbeats
            .values_mut()
            .filter_map(|hb| hb.advance(dt).then_some(hb.handle))
            .collect();

        if !fired.is_empty() {
            debug!("{} heartbeat(s) due", fired.len());
        }
        fired
    }

    /// Check whether a handle is still running
    pub fn is_running(&self, handle: TimerHandle) -> bool {
        self.heartbeats.contains_key(&handle)
    }

    /// Get count of running heartbeats
    pub fn heartbeat_count(&self) -> usize {
        self.heartbeats.len()
    }
}

impl Scheduler for TickScheduler {
    fn start_repeating(&mut self, period: Duration) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.heartbeats.insert(handle, HeartBeat::new(handle, period));
        handle
    }

    fn stop(&mut self, handle: TimerHandle) {
        self.heartbeats.remove(&handle);
    }
}
