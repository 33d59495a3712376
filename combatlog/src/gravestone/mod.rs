//! Chest gravestones
//!
//! Finds a safe spot near a death location, moves the victim's inventory
//! into a fresh container there, and optionally adds configured extra items.
//! Whatever does not fit, or cannot be placed, is dropped on the ground so no
//! item disappears.

mod search;
mod transfer;

use tracing::{info, warn};

use crate::config::{Settings, MAX_GRAVESTONE_CAPACITY};
use crate::host::{ItemRegistry, PlayerId, World};
use crate::items::Container;
use crate::world::Location;

pub use search::{find_safe_site, is_safe_block, is_safe_region, SafeSite, SearchBounds};
pub use transfer::{
    build_extra_stack, drop_player_inventory, transfer_player_inventory_to_chest,
    try_add_extra_items_to_chest,
};

/// A gravestone that made it into the world
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedGravestone {
    pub site: SafeSite,
    /// Player stacks stored in the container
    pub stored: usize,
    /// Configured extra stacks added
    pub extras: usize,
    /// Player stacks that did not fit and were dropped
    pub overflow: usize,
}

/// What happened to the gravestone step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GravestoneOutcome {
    /// Not enabled for this trigger
    Disabled,
    /// The host keeps inventories on death
    KeptInventory,
    /// Player has no inventory the host can hand over
    NoInventory,
    /// Nothing to store
    EmptyInventory,
    /// No safe site within the search bounds
    NoSafeSite,
    Placed(PlacedGravestone),
    /// The host refused the container; the player's stacks were dropped
    Refused { dropped: usize },
}

impl GravestoneOutcome {
    pub fn is_placed(&self) -> bool {
        matches!(self, GravestoneOutcome::Placed(_))
    }
}

/// Search, fill and place a gravestone for `player` dying at `location`
pub fn build_gravestone<H>(
    host: &mut H,
    settings: &Settings,
    player: PlayerId,
    location: &Location,
) -> GravestoneOutcome
where
    H: World + ItemRegistry + ?Sized,
{
    let extras_enabled =
        settings.enable_extra_items_for_chest_gravestone && !settings.extra_items.is_empty();
    match host.inventory_mut(player) {
        None => {
            warn!("No inventory for player {}, skipping gravestone", player);
            return GravestoneOutcome::NoInventory;
        }
        Some(inventory) if inventory.is_empty() && !extras_enabled => {
            return GravestoneOutcome::EmptyInventory;
        }
        Some(_) => {}
    }

    let bounds = SearchBounds::new(
        settings.gravestone_search_radius,
        settings.gravestone_search_height,
    );
    let Some(site) = find_safe_site(host, location.block(), bounds) else {
        info!(
            "No safe gravestone site for {} near {}, leaving items to the host",
            player, location
        );
        return GravestoneOutcome::NoSafeSite;
    };

    let mut chest =
        Container::with_capacity(settings.gravestone_capacity.min(MAX_GRAVESTONE_CAPACITY));
    let overflow = match host.inventory_mut(player) {
        Some(inventory) => transfer_player_inventory_to_chest(inventory, &mut chest),
        None => return GravestoneOutcome::NoInventory,
    };
    let stored = chest.stacks().count();

    let extras = if extras_enabled {
        try_add_extra_items_to_chest(host, &mut chest, &settings.extra_items)
    } else {
        0
    };

    let overflow_count = overflow.len();
    for stack in overflow {
        host.drop_item(location.position, stack);
    }

    match host.place_container(site.placement, chest) {
        Ok(()) => {
            info!(
                "Placed gravestone for {} at {} in {} ({} stacks, {} extra, {} dropped)",
                player, site.placement, location.dimension, stored, extras, overflow_count
            );
            GravestoneOutcome::Placed(PlacedGravestone {
                site,
                stored,
                extras,
                overflow: overflow_count,
            })
        }
        Err(e) => {
            warn!("Gravestone for {} not placed: {}", player, e);
            // Player stacks fill the lowest slots; extras after them are discarded
            let stacks = e.contents.into_stacks();
            let dropped = stored.min(stacks.len());
            for stack in stacks.into_iter().take(dropped) {
                host.drop_item(location.position, stack);
            }
            GravestoneOutcome::Refused {
                dropped: dropped + overflow_count,
            }
        }
    }
}
