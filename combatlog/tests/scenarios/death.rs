//! Death scenario tests
//!
//! Tests killer attribution, scripted commands, kill messages and the
//! gravestone step of the death sequence

use combatlog::combat::messages::{ABSORPTION_ASCII, HEALTH_ASCII, HEALTH_GLYPH};
use combatlog::config::{KillerAttribution, Settings};
use combatlog::death::{DamageOrigin, DeathEvent};
use combatlog::gravestone::GravestoneOutcome;
use combatlog::host::{CommandOrigin, PlayerId};
use combatlog::world::{BlockPos, Location};
use combatlog::CombatLogger;

use crate::harness::{run_seconds, TestHost, TestWorld};

fn arena() -> (TestHost, PlayerId, PlayerId) {
    let mut host = TestHost::new(TestWorld::flat(63));
    let alice = host.join(1, "alice");
    let bob = host.join(2, "bob");
    (host, alice, bob)
}

fn death(victim: PlayerId, origin: DamageOrigin) -> DeathEvent {
    DeathEvent {
        victim,
        location: Location::overworld(0.5, 64.0, 0.5),
        origin,
    }
}

fn with_gravestones() -> Settings {
    Settings {
        set_chest_gravestone_on_death: true,
        ..Settings::default()
    }
}

/// Test: A PvP kill runs both commands and announces the killer's health
#[test]
fn test_pvp_kill_sequence() {
    let (mut host, alice, bob) = arena();
    host.set_health(bob, 17.5, 4.0);
    let mut logger = CombatLogger::init(Settings::default());

    logger.on_player_attacked(&mut host, bob, alice);
    let outcome = logger.on_player_died(&mut host, &death(alice, DamageOrigin::PlayerAttack(bob)));

    assert_eq!(outcome.killer, Some(bob));
    assert!(outcome.was_in_combat);
    assert!(outcome.scripted);
    assert_eq!(
        host.commands,
        vec![
            (CommandOrigin::Player(alice), "function death".to_string()),
            (CommandOrigin::Player(bob), "function killer".to_string()),
        ]
    );
    assert_eq!(
        host.broadcasts(),
        vec![format!(
            "alice was slain by bob 17.5{} 4{}",
            HEALTH_ASCII, ABSORPTION_ASCII
        )]
    );

    assert!(!logger.is_in_combat(alice));
    // The killer keeps fighting unless configured otherwise
    assert!(logger.is_in_combat(bob));
    assert_eq!(outcome.gravestone, GravestoneOutcome::Disabled);
}

/// Test: Placeholders reach the configured commands and messages
#[test]
fn test_custom_templates() {
    let (mut host, alice, bob) = arena();
    let settings = Settings {
        death_command: "tag %name% add fallen".to_string(),
        killer_command: "give %name% diamond 1 # for %victim%".to_string(),
        kill_message: "%killer% ended %victim% [%health%]".to_string(),
        use_resource_pack_glyphs_in_death_message: true,
        ..Settings::default()
    };
    let mut logger = CombatLogger::init(settings);

    logger.on_player_attacked(&mut host, bob, alice);
    logger.on_player_died(&mut host, &death(alice, DamageOrigin::PlayerAttack(bob)));

    assert_eq!(host.commands[0].1, "tag alice add fallen");
    assert_eq!(host.commands[1].1, "give bob diamond 1 # for alice");
    assert_eq!(host.broadcasts(), vec![format!("bob ended alice [20{}]", HEALTH_GLYPH)]);
}

/// Test: Deaths outside combat are left alone by default
#[test]
fn test_death_outside_combat_not_scripted() {
    let (mut host, alice, _bob) = arena();
    let mut logger = CombatLogger::init(Settings::default());

    let outcome = logger.on_player_died(&mut host, &death(alice, DamageOrigin::Other));
    assert!(!outcome.was_in_combat);
    assert!(!outcome.scripted);
    assert_eq!(outcome.killer, None);
    assert!(host.commands.is_empty());
    assert!(host.broadcasts().is_empty());
}

/// Test: Every death can be scripted; without a killer there is no kill message
#[test]
fn test_every_death_scripted() {
    let (mut host, alice, _bob) = arena();
    let settings = Settings {
        death_sequence_requires_combat: false,
        ..Settings::default()
    };
    let mut logger = CombatLogger::init(settings);

    let outcome = logger.on_player_died(&mut host, &death(alice, DamageOrigin::Other));
    assert!(outcome.scripted);
    assert_eq!(
        host.commands,
        vec![(CommandOrigin::Player(alice), "function death".to_string())]
    );
    assert!(host.broadcasts().is_empty());
}

/// Test: Knocked off a ledge mid-fight, the last attacker gets the kill
#[test]
fn test_environmental_death_credits_recent_aggressor() {
    let (mut host, alice, bob) = arena();
    let mut logger = CombatLogger::init(Settings::default());

    logger.on_player_attacked(&mut host, bob, alice);
    run_seconds(&mut logger, &mut host, 3);
    let outcome = logger.on_player_died(&mut host, &death(alice, DamageOrigin::Other));

    assert_eq!(outcome.killer, Some(bob));
    assert_eq!(host.commands.len(), 2);
}

/// Test: A stale aggressor whose combat has ended gets no credit
#[test]
fn test_expired_aggressor_not_credited() {
    let (mut host, alice, bob) = arena();
    let carol = host.join(3, "carol");
    let settings = Settings {
        combat_time: 10,
        ..Settings::default()
    };
    let mut logger = CombatLogger::init(settings);

    logger.on_player_attacked(&mut host, bob, alice);
    run_seconds(&mut logger, &mut host, 5);
    // Carol keeps alice flagged, then bob's combat runs out
    logger.on_player_attacked(&mut host, alice, carol);
    run_seconds(&mut logger, &mut host, 5);
    assert!(!logger.is_in_combat(bob));
    assert!(logger.is_in_combat(alice));

    let outcome = logger.on_player_died(&mut host, &death(alice, DamageOrigin::Other));
    assert_eq!(outcome.killer, None);
}

/// Test: Recent-aggressor attribution overrides the event attacker
#[test]
fn test_recent_aggressor_policy() {
    let (mut host, alice, bob) = arena();
    let carol = host.join(3, "carol");
    let settings = Settings {
        killer_attribution: KillerAttribution::RecentAggressor,
        ..Settings::default()
    };
    let mut logger = CombatLogger::init(settings);

    logger.on_player_attacked(&mut host, bob, alice);
    // Carol steals the last hit without ever being the recent aggressor
    let outcome = logger.on_player_died(&mut host, &death(alice, DamageOrigin::PlayerAttack(carol)));
    assert_eq!(outcome.killer, Some(bob));
    assert!(host.broadcasts()[0].starts_with("alice was slain by bob"));
}

/// Test: Clearing the killer on a kill frees both players and the timer
#[test]
fn test_clear_killer_on_kill() {
    let (mut host, alice, bob) = arena();
    let settings = Settings {
        clear_killer_combat_on_kill: true,
        ..Settings::default()
    };
    let mut logger = CombatLogger::init(settings);

    logger.on_player_attacked(&mut host, bob, alice);
    logger.on_player_died(&mut host, &death(alice, DamageOrigin::PlayerAttack(bob)));

    assert!(!logger.is_in_combat(bob));
    assert!(!logger.tracker().is_timer_running());
    assert_eq!(host.scheduler.heartbeat_count(), 0);
}

/// Test: Failing commands do not stop the rest of the sequence
#[test]
fn test_command_failures_are_not_fatal() {
    let (mut host, alice, bob) = arena();
    host.fail_commands = true;
    host.give_items(alice, 3);
    let mut logger = CombatLogger::init(with_gravestones());

    logger.on_player_attacked(&mut host, bob, alice);
    let outcome = logger.on_player_died(&mut host, &death(alice, DamageOrigin::PlayerAttack(bob)));

    assert!(host.commands.is_empty());
    assert_eq!(host.broadcasts().len(), 1);
    assert!(outcome.gravestone.is_placed());
    assert!(!logger.is_in_combat(alice));
}

/// Test: Dying on flat ground leaves a chest where the player stood
#[test]
fn test_death_leaves_gravestone() {
    let (mut host, alice, bob) = arena();
    host.give_items(alice, 5);
    let before = host.inventory(alice).item_count();
    let expected: Vec<_> = host.inventory(alice).slots().iter().flatten().cloned().collect();
    let mut logger = CombatLogger::init(with_gravestones());

    logger.on_player_attacked(&mut host, bob, alice);
    let outcome = logger.on_player_died(&mut host, &death(alice, DamageOrigin::PlayerAttack(bob)));

    let GravestoneOutcome::Placed(placed) = outcome.gravestone else {
        panic!("expected a gravestone, got {:?}", outcome.gravestone);
    };
    assert_eq!(placed.site.placement, BlockPos::new(0, 64, 0));
    assert_eq!(placed.stored, 5);
    assert_eq!(placed.overflow, 0);

    let chest = &host.containers[&BlockPos::new(0, 64, 0)];
    assert_eq!(chest.stacks().cloned().collect::<Vec<_>>(), expected);
    assert_eq!(chest.item_count(), before);
    assert!(host.inventory(alice).is_empty());
    assert!(host.ground.is_empty());
}

/// Test: Gravestones do not depend on the death being scripted
#[test]
fn test_gravestone_outside_combat() {
    let (mut host, alice, _bob) = arena();
    host.give_items(alice, 2);
    let mut logger = CombatLogger::init(with_gravestones());

    let outcome = logger.on_player_died(&mut host, &death(alice, DamageOrigin::Other));
    assert!(!outcome.scripted);
    assert!(outcome.gravestone.is_placed());
}

/// Test: Keep-inventory worlds never get gravestones
#[test]
fn test_keep_inventory_respected() {
    let (mut host, alice, _bob) = arena();
    host.keep_inventory = true;
    host.give_items(alice, 4);
    let mut logger = CombatLogger::init(with_gravestones());

    let outcome = logger.on_player_died(&mut host, &death(alice, DamageOrigin::Other));
    assert_eq!(outcome.gravestone, GravestoneOutcome::KeptInventory);
    assert_eq!(host.inventory(alice).occupied(), 4);
    assert!(host.containers.is_empty());
}

/// Test: A refused container spills the moved items instead of losing them
#[test]
fn test_refused_container_drops_items() {
    let (mut host, alice, _bob) = arena();
    host.refuse_containers = true;
    host.give_items(alice, 5);
    let before = host.inventory(alice).item_count();
    let mut logger = CombatLogger::init(with_gravestones());

    let outcome = logger.on_player_died(&mut host, &death(alice, DamageOrigin::Other));
    assert_eq!(outcome.gravestone, GravestoneOutcome::Refused { dropped: 5 });
    assert!(host.inventory(alice).is_empty());
    assert_eq!(host.items_outside_inventories(), before);
    assert!(host.containers.is_empty());
}

/// Test: Empty pockets leave no empty chest behind
#[test]
fn test_empty_inventory_no_gravestone() {
    let (mut host, alice, _bob) = arena();
    let mut logger = CombatLogger::init(with_gravestones());

    let outcome = logger.on_player_died(&mut host, &death(alice, DamageOrigin::Other));
    assert_eq!(outcome.gravestone, GravestoneOutcome::EmptyInventory);
    assert!(host.containers.is_empty());
}
