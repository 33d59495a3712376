//! Moving items into gravestones
//!
//! Stacks move, they are never copied: a slot is emptied once its stack has
//! a new home, either a container slot or the returned overflow list the
//! caller drops on the ground.

use tracing::{debug, warn};

use crate::config::ExtraItem;
use crate::host::{ItemRegistry, PlayerId, World};
use crate::items::{Container, Enchantment, EnchantmentId, Inventory, ItemId, ItemStack};
use crate::world::Vec3;

/// Move every occupied inventory slot, in slot order, into the container.
///
/// Stacks that do not fit are returned in slot order for the ground-drop
/// fallback; nothing is discarded.
pub fn transfer_player_inventory_to_chest(
    inventory: &mut Inventory,
    chest: &mut Container,
) -> Vec<ItemStack> {
    let mut overflow = Vec::new();
    for index in 0..inventory.len() {
        let Some(stack) = inventory.take(index) else {
            continue;
        };
        if let Err(stack) = chest.insert(stack) {
            overflow.push(stack);
        }
    }

    if !overflow.is_empty() {
        debug!(
            "Gravestone full, {} stack(s) left for the ground",
            overflow.len()
        );
    }
    overflow
}

/// Build the stack described by a configured extra item.
///
/// Unknown items and non-positive counts yield `None`; counts are clamped to
/// the item's stack limit and unknown enchantments are dropped.
pub fn build_extra_stack<R: ItemRegistry + ?Sized>(
    registry: &R,
    extra: &ExtraItem,
) -> Option<ItemStack> {
    let item = ItemId(extra.id);
    let Some(max_stack) = registry.max_stack_size(item) else {
        warn!("Skipping extra item: unknown item id {}", extra.id);
        return None;
    };
    if extra.count <= 0 {
        warn!("Skipping extra item {}: count {} is not positive", extra.id, extra.count);
        return None;
    }

    let count = extra.count.min(i32::from(max_stack)) as u8;
    if i32::from(count) < extra.count {
        warn!(
            "Extra item {} count {} clamped to stack size {}",
            extra.id, extra.count, max_stack
        );
    }

    let mut stack = ItemStack::new(item, extra.aux, count);
    if !extra.custom_name.is_empty() {
        stack.custom_name = Some(extra.custom_name.clone());
    }
    stack.lore = extra.lore.clone();
    for entry in &extra.enchants {
        let id = EnchantmentId(entry.id);
        if registry.has_enchantment(id) {
            stack.enchantments.push(Enchantment {
                id,
                level: entry.level,
            });
        } else {
            warn!("Extra item {}: unknown enchantment {} dropped", extra.id, entry.id);
        }
    }
    Some(stack)
}

/// Append configured extra items in order until the container is full.
///
/// Returns how many stacks were added.
pub fn try_add_extra_items_to_chest<R: ItemRegistry + ?Sized>(
    registry: &R,
    chest: &mut Container,
    extras: &[ExtraItem],
) -> usize {
    let mut added = 0;
    for (index, extra) in extras.iter().enumerate() {
        if chest.is_full() {
            debug!(
                "Gravestone full, {} extra item(s) skipped",
                extras.len() - index
            );
            break;
        }
        let Some(stack) = build_extra_stack(registry, extra) else {
            continue;
        };
        if chest.insert(stack).is_ok() {
            added += 1;
        }
    }
    added
}

/// Drop every stack of a player's inventory at `at`.
///
/// Returns the number of stacks dropped.
pub fn drop_player_inventory<W: World + ?Sized>(
    world: &mut W,
    player: PlayerId,
    at: Vec3,
) -> usize {
    let stacks: Vec<ItemStack> = match world.inventory_mut(player) {
        Some(inventory) => (0..inventory.len())
            .filter_map(|index| inventory.take(index))
            .collect(),
        None => {
            warn!("No inventory for player {}, nothing to drop", player);
            return 0;
        }
    };

    let dropped = stacks.len();
    for stack in stacks {
        world.drop_item(at, stack);
    }
    dropped
}
