//! Safe gravestone site search
//!
//! Candidates are visited in a fixed order: increasing Manhattan distance
//! from the origin, then same level before other levels, lower before
//! higher, then by x and z. The first candidate passing every check wins,
//! so identical worlds always produce identical sites. The search volume is
//! bounded by the configured radius and height.

use tracing::debug;

use crate::config::{MAX_SEARCH_HEIGHT, MAX_SEARCH_RADIUS};
use crate::host::BlockView;
use crate::world::{BlockPos, Material};

/// Where a gravestone goes: a container cell resting on a support cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SafeSite {
    pub support: BlockPos,
    pub placement: BlockPos,
}

/// Search volume around the origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchBounds {
    /// Maximum |dx| and |dz|
    radius: i32,
    /// Maximum |dy|
    height: i32,
}

impl SearchBounds {
    /// Bounds clamped to `MAX_SEARCH_RADIUS` x `MAX_SEARCH_HEIGHT`
    pub fn new(radius: u32, height: u32) -> Self {
        Self {
            radius: radius.min(MAX_SEARCH_RADIUS) as i32,
            height: height.min(MAX_SEARCH_HEIGHT) as i32,
        }
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Offsets in visiting order
    pub fn offsets(&self) -> Vec<(i32, i32, i32)> {
        let (r, h) = (self.radius, self.height);
        let mut offsets = Vec::new();
        for dx in -r..=r {
            for dy in -h..=h {
                for dz in -r..=r {
                    offsets.push((dx, dy, dz));
                }
            }
        }
        offsets.sort_by_key(|&(dx, dy, dz)| {
            let distance = dx
                .unsigned_abs()
                .saturating_add(dy.unsigned_abs())
                .saturating_add(dz.unsigned_abs());
            (distance, dy.unsigned_abs(), dy, dx, dz)
        });
        offsets
    }
}

/// Classify one cell.
///
/// With `is_above_block` false the cell must carry the container: solid and
/// load-bearing. With it true the cell receives the container: passable and
/// dry.
pub fn is_safe_block(material: Material, is_above_block: bool) -> bool {
    if is_above_block {
        material.is_passable() && !material.is_liquid()
    } else {
        material.is_load_bearing()
    }
}

/// Check the neighbourhood of a placement cell.
///
/// The cell above must be open so the container can be opened, and no side
/// neighbour may be another container (it would merge) or liquid (it would
/// flow into the site).
pub fn is_safe_region<V: BlockView + ?Sized>(view: &V, placement: BlockPos) -> bool {
    let limits = view.height_limits();
    let headroom = placement.above();
    if !limits.contains(&placement.below().y) || !limits.contains(&headroom.y) {
        return false;
    }

    if !is_safe_block(view.material_at(headroom), true) {
        return false;
    }

    placement.horizontal_neighbors().iter().all(|&n| {
        let material = view.material_at(n);
        material != Material::Container && !material.is_liquid()
    })
}

/// Find the nearest safe site around `origin`, or `None` when the bounded
/// volume has none.
pub fn find_safe_site<V: BlockView + ?Sized>(
    view: &V,
    origin: BlockPos,
    bounds: SearchBounds,
) -> Option<SafeSite> {
    for (dx, dy, dz) in bounds.offsets() {
        let placement = origin.offset(dx, dy, dz);
        let support = placement.below();

        if is_safe_block(view.material_at(support), false)
            && is_safe_block(view.material_at(placement), true)
            && is_safe_region(view, placement)
        {
            debug!("Safe gravestone site at {} (origin {})", placement, origin);
            return Some(SafeSite { support, placement });
        }
    }

    debug!(
        "No safe gravestone site within {}x{} of {}",
        bounds.radius, bounds.height, origin
    );
    None
}
