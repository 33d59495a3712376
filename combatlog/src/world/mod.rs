//! World geometry - positions, voxels, dimensions and block materials
//!
//! The host owns the real world; this module only names the coordinates and
//! the coarse block classification the gravestone logic needs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A continuous position in the world (entity feet position)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

/// Integer voxel coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The voxel containing a continuous position
    pub fn containing(pos: Vec3) -> Self {
        Self {
            x: pos.x.floor() as i32,
            y: pos.y.floor() as i32,
            z: pos.z.floor() as i32,
        }
    }

    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    pub fn above(self) -> Self {
        self.offset(0, 1, 0)
    }

    pub fn below(self) -> Self {
        self.offset(0, -1, 0)
    }

    /// The four voxels sharing a vertical face with this one (-x, +x, -z, +z)
    pub fn horizontal_neighbors(self) -> [BlockPos; 4] {
        [
            self.offset(-1, 0, 0),
            self.offset(1, 0, 0),
            self.offset(0, 0, -1),
            self.offset(0, 0, 1),
        ]
    }

    /// Center of the voxel's bottom face, where dropped items land
    pub fn bottom_center(self) -> Vec3 {
        Vec3::new(self.x as f64 + 0.5, self.y as f64, self.z as f64 + 0.5)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// World dimension a location belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dimension {
    #[default]
    Overworld,
    Nether,
    TheEnd,
    /// Host-defined dimension by numeric id
    Custom(i32),
}

impl Dimension {
    /// Map the host's numeric dimension id
    pub fn from_id(id: i32) -> Self {
        match id {
            0 => Dimension::Overworld,
            1 => Dimension::Nether,
            2 => Dimension::TheEnd,
            other => Dimension::Custom(other),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Overworld => write!(f, "overworld"),
            Dimension::Nether => write!(f, "nether"),
            Dimension::TheEnd => write!(f, "the_end"),
            Dimension::Custom(id) => write!(f, "dimension {}", id),
        }
    }
}

/// Where something happened: dimension plus position
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Location {
    pub dimension: Dimension,
    pub position: Vec3,
}

impl Location {
    pub fn new(dimension: Dimension, position: Vec3) -> Self {
        Self {
            dimension,
            position,
        }
    }

    pub fn overworld(x: f64, y: f64, z: f64) -> Self {
        Self::new(Dimension::Overworld, Vec3::new(x, y, z))
    }

    pub fn block(&self) -> BlockPos {
        BlockPos::containing(self.position)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.position, self.dimension)
    }
}

/// Coarse block classification reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Material {
    /// Empty space
    Air,
    /// Passable and overwritten on placement (grass, flowers, snow layers)
    Replaceable,
    /// Water, lava and other fluids
    Liquid,
    /// Damages or destroys what touches it (fire, cactus, magma)
    Hazard,
    /// Full, load-bearing block
    Solid,
    /// Block that holds items (chests, barrels)
    Container,
}

impl Material {
    /// An entity or a placed block can occupy this cell
    pub fn is_passable(self) -> bool {
        matches!(self, Material::Air | Material::Replaceable)
    }

    pub fn is_liquid(self) -> bool {
        self == Material::Liquid
    }

    /// Can hold up another block resting on top of it
    pub fn is_load_bearing(self) -> bool {
        self == Material::Solid
    }
}
