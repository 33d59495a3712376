//! TestWorld - sparse voxel world builder
//!
//! Every cell not set explicitly has the background material. Builders
//! chain so scenarios read like a map legend:
//!
//! ```rust,ignore
//! let world = TestWorld::flat(63).fill((-5, 64, -5), (-1, 65, 5), Material::Liquid);
//! ```

#![allow(dead_code)]

use std::collections::HashMap;
use std::ops::RangeInclusive;

use combatlog::host::BlockView;
use combatlog::world::{BlockPos, Material};

/// Half-width of the floor laid by `flat`
pub const FLOOR_HALF_WIDTH: i32 = 16;

#[derive(Debug, Clone)]
pub struct TestWorld {
    cells: HashMap<BlockPos, Material>,
    background: Material,
    height_limits: RangeInclusive<i32>,
}

impl TestWorld {
    /// Uniform world of one material
    pub fn filled(background: Material) -> Self {
        Self {
            cells: HashMap::new(),
            background,
            height_limits: -64..=319,
        }
    }

    /// Open air above a solid floor at `y`
    pub fn flat(y: i32) -> Self {
        let r = FLOOR_HALF_WIDTH;
        Self::filled(Material::Air).fill((-r, y, -r), (r, y, r), Material::Solid)
    }

    pub fn with_height_limits(mut self, limits: RangeInclusive<i32>) -> Self {
        self.height_limits = limits;
        self
    }

    pub fn set(mut self, pos: (i32, i32, i32), material: Material) -> Self {
        self.set_block(BlockPos::new(pos.0, pos.1, pos.2), material);
        self
    }

    /// Fill the inclusive box between two corners
    pub fn fill(mut self, from: (i32, i32, i32), to: (i32, i32, i32), material: Material) -> Self {
        for x in from.0.min(to.0)..=from.0.max(to.0) {
            for y in from.1.min(to.1)..=from.1.max(to.1) {
                for z in from.2.min(to.2)..=from.2.max(to.2) {
                    self.set_block(BlockPos::new(x, y, z), material);
                }
            }
        }
        self
    }

    pub fn set_block(&mut self, pos: BlockPos, material: Material) {
        self.cells.insert(pos, material);
    }
}

impl BlockView for TestWorld {
    fn material_at(&self, pos: BlockPos) -> Material {
        self.cells.get(&pos).copied().unwrap_or(self.background)
    }

    fn height_limits(&self) -> RangeInclusive<i32> {
        self.height_limits.clone()
    }
}
