//! combatlog - combat logging deterrent for multiplayer game servers
//!
//! Players who trade hostile hits are flagged as in combat for a while.
//! Leaving while flagged is punished, and deaths can run scripted commands
//! and leave a chest gravestone holding the victim's inventory.

pub mod combat;
pub mod config;
pub mod death;
pub mod gravestone;
pub mod host;
pub mod items;
pub mod timers;
pub mod world;

use std::sync::Arc;

use tracing::{debug, info};

use combat::messages::{self, NAME};
use combat::CombatTracker;
use config::Settings;
use death::{DamageOrigin, DeathEvent, DeathHandler, DeathOutcome, DeathTrigger};
use gravestone::drop_player_inventory;
use host::{Host, PlayerId, Scheduler, TimerHandle};
use world::Location;

/// Result of a player leaving while in combat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutPenalty {
    pub death: DeathOutcome,
    /// Stacks dropped at the logout position
    pub dropped: usize,
    /// Experience points dropped at the logout position
    pub experience: u32,
}

/// The combat logger service.
///
/// Owns the combat registry and its decay timer. The host forwards its
/// events here from the game thread.
#[derive(Debug)]
pub struct CombatLogger {
    settings: Arc<Settings>,
    tracker: CombatTracker,
    deaths: DeathHandler,
}

impl CombatLogger {
    /// Enable the logger with an empty registry
    pub fn init(settings: Settings) -> Self {
        let settings = Arc::new(settings.normalized());
        info!(
            "Combat logger enabled (combat time {}s, gravestones on death: {}, on logout: {})",
            settings.combat_time,
            settings.set_chest_gravestone_on_death,
            settings.set_chest_gravestone_on_log
        );
        Self {
            tracker: CombatTracker::new(settings.clone()),
            deaths: DeathHandler::new(settings.clone()),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tracker(&self) -> &CombatTracker {
        &self.tracker
    }

    pub fn is_in_combat(&self, player: PlayerId) -> bool {
        self.tracker.is_in_combat(player)
    }

    /// A player hit another player
    pub fn on_player_attacked<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        attacker: PlayerId,
        victim: PlayerId,
    ) {
        self.tracker.record_aggression(host, attacker, victim);
    }

    /// Dispatch a due timer handle.
    ///
    /// Returns false when the handle is not the decay timer.
    pub fn on_timer<H: Host + ?Sized>(&mut self, host: &mut H, handle: TimerHandle) -> bool {
        if self.tracker.timer() != combat::DecayTimer::Running(handle) {
            return false;
        }
        self.tracker.tick(host);
        true
    }

    /// A player died
    pub fn on_player_died<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        event: &DeathEvent,
    ) -> DeathOutcome {
        self.deaths
            .run(&mut self.tracker, host, event, DeathTrigger::Died)
    }

    /// A player disconnected.
    ///
    /// Nothing happens unless the player is in combat. Otherwise the logout
    /// is announced, the death sequence runs against the recent aggressor,
    /// any inventory not stored in a gravestone is dropped where they stood
    /// and so is their experience.
    pub fn on_player_left<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        player: PlayerId,
        location: Location,
    ) -> Option<LogoutPenalty> {
        if !self.tracker.is_in_combat(player) {
            return None;
        }

        let name = host.display_name(player);
        info!("Player {} ({}) logged out while in combat", name, player);
        if let Some(text) = messages::render(
            &self.settings.logout_while_in_combat_message,
            &[(NAME, name.as_str())],
        ) {
            messages::announce(host, &text);
        }

        let event = DeathEvent {
            victim: player,
            location,
            origin: DamageOrigin::Other,
        };
        let death = self
            .deaths
            .run(&mut self.tracker, host, &event, DeathTrigger::LoggedOut);

        let dropped = if death.gravestone.is_placed() {
            0
        } else {
            drop_player_inventory(host, player, location.position)
        };
        let experience = host.drop_experience(player, location.position);
        if experience > 0 {
            debug!("Dropped {} experience for {}", experience, player);
        }

        self.tracker.clear_combat_status(host, player);
        Some(LogoutPenalty {
            death,
            dropped,
            experience,
        })
    }

    /// Administrative removal of a player's flag
    pub fn clear_combat_status<S: Scheduler + ?Sized>(
        &mut self,
        scheduler: &mut S,
        player: PlayerId,
    ) -> bool {
        self.tracker.clear_combat_status(scheduler, player)
    }

    /// Disable the logger: drain the registry and stop the timer
    pub fn teardown<S: Scheduler + ?Sized>(mut self, scheduler: &mut S) {
        let flagged = self.tracker.len();
        self.tracker.clear_all(scheduler);
        info!("Combat logger disabled ({} player(s) were in combat)", flagged);
    }
}
