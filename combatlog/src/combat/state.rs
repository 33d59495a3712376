//! Combat state tracking
//!
//! Keeps one countdown per player flagged in combat:
//! - Hostile hits flag or refresh both players
//! - A once-per-second decay tick counts down and expires flags
//! - The decay timer runs only while someone is flagged

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::messages::{self, TIME};
use crate::config::Settings;
use crate::host::{Messenger, PlayerDirectory, PlayerId, Scheduler, TimerHandle};

/// Interval between decay ticks
pub const DECAY_PERIOD: Duration = Duration::from_secs(1);

/// Lifecycle of the decay timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecayTimer {
    #[default]
    Stopped,
    Running(TimerHandle),
}

/// Combat countdown for one flagged player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatSession {
    /// Seconds until the flag expires
    pub remaining_seconds: u32,
    /// Player who most recently hit this one
    pub last_aggressor: Option<PlayerId>,
}

impl CombatSession {
    fn new(duration: u32) -> Self {
        Self {
            remaining_seconds: duration,
            last_aggressor: None,
        }
    }
}

/// Registry of players currently in combat.
///
/// Invariant: the decay timer is running iff at least one session exists.
#[derive(Debug)]
pub struct CombatTracker {
    settings: Arc<Settings>,
    sessions: BTreeMap<PlayerId, CombatSession>,
    timer: DecayTimer,
}

impl CombatTracker {
    /// Create an empty tracker with a stopped timer
    pub fn new(settings: Arc<Settings>) -> Self {
        Self {
            settings,
            sessions: BTreeMap::new(),
            timer: DecayTimer::Stopped,
        }
    }

    /// Flag a player (or refresh their countdown).
    ///
    /// Returns false when the player is exempt from combat tracking.
    pub fn mark_in_combat<H>(&mut self, host: &mut H, player: PlayerId) -> bool
    where
        H: Scheduler + Messenger + PlayerDirectory + ?Sized,
    {
        if !self.settings.operators_can_be_in_combat && host.is_operator(player) {
            debug!("Operator {} is exempt from combat tracking", player);
            return false;
        }

        let duration = self.settings.combat_time;
        match self.sessions.entry(player) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().remaining_seconds = duration;
                debug!("Combat time for {} reset to {}s", player, duration);
            }
            Entry::Vacant(entry) => {
                entry.insert(CombatSession::new(duration));
                info!("Player {} entered combat for {}s", player, duration);
                if let Some(text) = messages::render(&self.settings.initiated_combat_message, &[])
                {
                    messages::tell(host, player, &text);
                }
            }
        }

        self.start_timer_if_needed(host);
        true
    }

    /// Flag both sides of a hostile hit and remember who struck the victim
    pub fn record_aggression<H>(&mut self, host: &mut H, attacker: PlayerId, victim: PlayerId)
    where
        H: Scheduler + Messenger + PlayerDirectory + ?Sized,
    {
        if attacker == victim {
            return;
        }

        self.mark_in_combat(host, attacker);
        if self.mark_in_combat(host, victim) {
            if let Some(session) = self.sessions.get_mut(&victim) {
                session.last_aggressor = Some(attacker);
            }
        }
    }

    /// Check if a player is in combat
    pub fn is_in_combat(&self, player: PlayerId) -> bool {
        self.sessions.contains_key(&player)
    }

    /// Both players are currently flagged
    pub fn is_in_combat_with(&self, a: PlayerId, b: PlayerId) -> bool {
        self.is_in_combat(a) && self.is_in_combat(b)
    }

    pub fn session(&self, player: PlayerId) -> Option<&CombatSession> {
        self.sessions.get(&player)
    }

    pub fn remaining_seconds(&self, player: PlayerId) -> Option<u32> {
        self.sessions.get(&player).map(|s| s.remaining_seconds)
    }

    /// The last player to hit `player` while flagged
    pub fn recent_aggressor(&self, player: PlayerId) -> Option<PlayerId> {
        self.sessions.get(&player).and_then(|s| s.last_aggressor)
    }

    /// Remove a player's flag, returning whether one existed
    pub fn clear_combat_status<S: Scheduler + ?Sized>(
        &mut self,
        scheduler: &mut S,
        player: PlayerId,
    ) -> bool {
        let removed = self.sessions.remove(&player).is_some();
        if removed {
            info!("Combat status cleared for {}", player);
        }
        self.stop_timer_if_empty(scheduler);
        removed
    }

    /// Drop every session and stop the timer
    pub fn clear_all<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) {
        self.sessions.clear();
        self.stop_timer_if_empty(scheduler);
    }

    /// One decay step: count every session down, expire those reaching zero
    pub fn tick<H>(&mut self, host: &mut H)
    where
        H: Scheduler + Messenger + ?Sized,
    {
        let mut expired = Vec::new();
        let mut remaining = Vec::new();
        for (&player, session) in self.sessions.iter_mut() {
            session.remaining_seconds = session.remaining_seconds.saturating_sub(1);
            if session.remaining_seconds == 0 {
                expired.push(player);
            } else {
                remaining.push((player, session.remaining_seconds));
            }
        }

        for player in expired {
            self.sessions.remove(&player);
            info!("Player {} is no longer in combat", player);
            if let Some(text) = messages::render(&self.settings.ended_combat_message, &[]) {
                messages::tell(host, player, &text);
            }
        }

        if self.settings.combat_time_message_enabled {
            for (player, seconds) in remaining {
                let seconds = seconds.to_string();
                if let Some(text) =
                    messages::render(&self.settings.combat_time_message, &[(TIME, seconds.as_str())])
                {
                    messages::tell(host, player, &text);
                }
            }
        }

        self.stop_timer_if_empty(host);
    }

    pub fn timer(&self) -> DecayTimer {
        self.timer
    }

    pub fn is_timer_running(&self) -> bool {
        matches!(self.timer, DecayTimer::Running(_))
    }

    /// Number of flagged players
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Flagged players in id order
    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.sessions.keys().copied()
    }

    fn start_timer_if_needed<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if self.timer == DecayTimer::Stopped && !self.sessions.is_empty() {
            let handle = scheduler.start_repeating(DECAY_PERIOD);
            debug!("Combat decay timer started ({:?})", handle);
            self.timer = DecayTimer::Running(handle);
        }
    }

    fn stop_timer_if_empty<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if let DecayTimer::Running(handle) = self.timer {
            if self.sessions.is_empty() {
                scheduler.stop(handle);
                debug!("Combat decay timer stopped ({:?})", handle);
                self.timer = DecayTimer::Stopped;
            }
        }
    }
}
