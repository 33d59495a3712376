//! Host collaborator interfaces
//!
//! The game server embedding this crate implements these traits. Everything
//! runs on the host's single game thread, so every method takes `&mut self`
//! or `&self` and nothing here is `Send`/`Sync`-bound.

use std::fmt;
use std::ops::RangeInclusive;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::items::{Container, EnchantmentId, Inventory, ItemId, ItemStack};
use crate::world::{BlockPos, Material, Vec3};


/// Stable player identity (the host's account/xuid handle)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle of a recurring timer issued by a [`Scheduler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

/// Errors reported by host collaborators
#[derive(Debug, Error)]
pub enum HostError {
    #[error("player {0} is not online")]
    PlayerOffline(PlayerId),

    #[error("host service unavailable: {0}")]
    Unavailable(String),

    #[error("request rejected: {0}")]
    Rejected(String),
}

/// The host refused to create a container; the contents come back untouched
#[derive(Debug, Error)]
#[error("cannot place container at {at}: {source}")]
pub struct PlacementError {
    pub at: BlockPos,
    pub contents: Container,
    #[source]
    pub source: HostError,
}

/// Recurring callbacks on the game thread.
///
/// The host invokes the owner's tick entry point once per `period` for every
/// running handle, never re-entrantly.
pub trait Scheduler {
    fn start_repeating(&mut self, period: Duration) -> TimerHandle;
    fn stop(&mut self, handle: TimerHandle);
}

/// Chat delivery
pub trait Messenger {
    fn send(&mut self, to: PlayerId, text: &str) -> Result<(), HostError>;
    fn broadcast(&mut self, text: &str) -> Result<(), HostError>;
}

/// Who a scripted command runs as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOrigin {
    Console,
    Player(PlayerId),
}

/// Scripted command execution
pub trait CommandRunner {
    fn execute(&mut self, origin: CommandOrigin, command: &str) -> Result<(), HostError>;
}

/// Health readout used in kill messages
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Health {
    pub current: f32,
    pub absorption: f32,
}

/// Player database lookups
pub trait PlayerDirectory {
    fn name(&self, player: PlayerId) -> Option<String>;
    fn is_operator(&self, player: PlayerId) -> bool;
    fn health(&self, player: PlayerId) -> Option<Health>;

    /// Display name, falling back to the numeric id
    fn display_name(&self, player: PlayerId) -> String {
        self.name(player).unwrap_or_else(|| player.to_string())
    }
}

/// Read-only block access
pub trait BlockView {
    fn material_at(&self, pos: BlockPos) -> Material;

    /// Lowest and highest buildable y
    fn height_limits(&self) -> RangeInclusive<i32>;
}

/// Mutable world access for gravestones and drops
pub trait World: BlockView {
    fn inventory_mut(&mut self, player: PlayerId) -> Option<&mut Inventory>;

    /// Create a container block at `at` holding `contents`
    fn place_container(&mut self, at: BlockPos, contents: Container) -> Result<(), PlacementError>;

    /// Spawn an item entity on the ground
    fn drop_item(&mut self, at: Vec3, stack: ItemStack);

    /// Drop a player's experience as orbs at `at`, returning the points dropped.
    ///
    /// Hosts without experience leave the default.
    fn drop_experience(&mut self, _player: PlayerId, _at: Vec3) -> u32 {
        0
    }

    /// Whether the host's rules keep inventories on death
    fn keeps_inventory_on_death(&self) -> bool {
        false
    }
}

/// Item and enchantment registries
pub trait ItemRegistry {
    /// Maximum stack size, `None` for unknown items
    fn max_stack_size(&self, item: ItemId) -> Option<u8>;
    fn has_enchantment(&self, id: EnchantmentId) -> bool;
}

/// Everything the combat logger needs from its host
pub trait Host: Scheduler + Messenger + CommandRunner + PlayerDirectory + World + ItemRegistry {}

impl<T> Host for T where
    T: Scheduler + Messenger + CommandRunner + PlayerDirectory + World + ItemRegistry + ?Sized
{
}
