//! Death sequence
//!
//! Runs once per death (or combat logout):
//! 1. Attribute the killer
//! 2. Run scripted death/killer commands and announce the kill
//! 3. Clear combat flags
//! 4. Build a gravestone when enabled

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::combat::messages::{self, HEALTH, KILLER, NAME, VICTIM};
use crate::combat::{health_indicator, CombatTracker};
use crate::config::{KillerAttribution, Settings};
use crate::gravestone::{build_gravestone, GravestoneOutcome};
use crate::host::{CommandOrigin, Host, PlayerId};
use crate::world::Location;

/// Where the fatal damage came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DamageOrigin {
    /// Hit by another player
    PlayerAttack(PlayerId),
    /// Mobs, falling, lava, the void...
    #[default]
    Other,
}

impl DamageOrigin {
    pub fn attacker(&self) -> Option<PlayerId> {
        match self {
            DamageOrigin::PlayerAttack(id) => Some(*id),
            DamageOrigin::Other => None,
        }
    }
}

/// A player death reported by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeathEvent {
    pub victim: PlayerId,
    pub location: Location,
    pub origin: DamageOrigin,
}

/// Why the sequence runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathTrigger {
    /// The player actually died
    Died,
    /// The player disconnected while in combat
    LoggedOut,
}

/// Result of one death sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeathOutcome {
    pub killer: Option<PlayerId>,
    pub was_in_combat: bool,
    /// Commands and kill message ran
    pub scripted: bool,
    pub gravestone: GravestoneOutcome,
}

/// Pick the killer from the event attacker and the victim's combat history.
///
/// The recent aggressor only counts while still in combat with the victim;
/// players for whom `is_exempt` holds are never flagged, so for them the
/// victim's own flag is enough.
pub fn attribute_killer<F>(
    tracker: &CombatTracker,
    policy: KillerAttribution,
    victim: PlayerId,
    attacker: Option<PlayerId>,
    is_exempt: F,
) -> Option<PlayerId>
where
    F: Fn(PlayerId) -> bool,
{
    let attacker = attacker.filter(|&a| a != victim);
    let recent = tracker.recent_aggressor(victim).filter(|&r| {
        r != victim
            && tracker.is_in_combat(victim)
            && (tracker.is_in_combat(r) || is_exempt(r))
    });

    match policy {
        KillerAttribution::Attacker => attacker.or(recent),
        KillerAttribution::RecentAggressor => match (attacker, recent) {
            (Some(a), Some(r)) if a != r => Some(r),
            (a, r) => a.or(r),
        },
    }
}

/// Executes death sequences with the shared settings
#[derive(Debug, Clone)]
pub struct DeathHandler {
    settings: Arc<Settings>,
}

impl DeathHandler {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    /// Run the full sequence for one death
    pub fn run<H: Host + ?Sized>(
        &self,
        tracker: &mut CombatTracker,
        host: &mut H,
        event: &DeathEvent,
        trigger: DeathTrigger,
    ) -> DeathOutcome {
        let victim = event.victim;
        let was_in_combat = tracker.is_in_combat(victim);
        let operators_exempt = !self.settings.operators_can_be_in_combat;
        let killer = attribute_killer(
            tracker,
            self.settings.killer_attribution,
            victim,
            event.origin.attacker(),
            |player| operators_exempt && host.is_operator(player),
        );
        debug!(
            "Death of {} ({:?}): killer {:?}, in combat {}",
            victim, trigger, killer, was_in_combat
        );

        let scripted = was_in_combat || !self.settings.death_sequence_requires_combat;
        if scripted {
            self.run_commands(host, victim, killer);
            self.announce_kill(host, victim, killer);
        }

        tracker.clear_combat_status(host, victim);
        if let Some(killer) = killer {
            if self.settings.clear_killer_combat_on_kill {
                tracker.clear_combat_status(host, killer);
            }
        }

        let gravestone = self.gravestone(host, event, trigger);
        DeathOutcome {
            killer,
            was_in_combat,
            scripted,
            gravestone,
        }
    }

    fn run_commands<H: Host + ?Sized>(&self, host: &mut H, victim: PlayerId, killer: Option<PlayerId>) {
        if !self.settings.execute_death_commands {
            return;
        }

        let victim_name = host.display_name(victim);
        if let Some(command) = messages::render(&self.settings.death_command, &[(NAME, victim_name.as_str())])
        {
            if let Err(e) = host.execute(CommandOrigin::Player(victim), &command) {
                warn!("Death command for {} failed: {}", victim, e);
            }
        }

        let Some(killer) = killer else {
            return;
        };
        let killer_name = host.display_name(killer);
        if let Some(command) = messages::render(
            &self.settings.killer_command,
            &[(NAME, killer_name.as_str()), (VICTIM, victim_name.as_str())],
        ) {
            if let Err(e) = host.execute(CommandOrigin::Player(killer), &command) {
                warn!("Killer command for {} failed: {}", killer, e);
            }
        }
    }

    fn announce_kill<H: Host + ?Sized>(&self, host: &mut H, victim: PlayerId, killer: Option<PlayerId>) {
        let Some(killer) = killer else {
            return;
        };
        let health = host
            .health(killer)
            .map(|h| health_indicator(h, self.settings.use_resource_pack_glyphs_in_death_message))
            .unwrap_or_default();
        let victim_name = host.display_name(victim);
        let killer_name = host.display_name(killer);
        if let Some(text) = messages::render(
            &self.settings.kill_message,
            &[
                (VICTIM, victim_name.as_str()),
                (KILLER, killer_name.as_str()),
                (HEALTH, health.as_str()),
            ],
        ) {
            messages::announce(host, text.trim_end());
        }
    }

    fn gravestone<H: Host + ?Sized>(
        &self,
        host: &mut H,
        event: &DeathEvent,
        trigger: DeathTrigger,
    ) -> GravestoneOutcome {
        let enabled = match trigger {
            DeathTrigger::Died => self.settings.set_chest_gravestone_on_death,
            DeathTrigger::LoggedOut => self.settings.set_chest_gravestone_on_log,
        };
        if !enabled {
            return GravestoneOutcome::Disabled;
        }
        if trigger == DeathTrigger::Died && host.keeps_inventory_on_death() {
            info!("Inventories are kept on death, no gravestone for {}", event.victim);
            return GravestoneOutcome::KeptInventory;
        }
        build_gravestone(host, &self.settings, event.victim, &event.location)
    }
}
