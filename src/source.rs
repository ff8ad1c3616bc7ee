// Copyright 2026 the PGF developers. This file is part of PGF.
//
// PGF is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// PGF is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with PGF. If not, see <http://www.gnu.org/licenses/>.

use std::ops::BitOr;

use cgmath::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::shape::{GravityShape, RangeTest};

/// Numerator of the inverse-square falloff.
pub const FALLOFF_SCALE: f32 = 4_000_000.0;

/// Effective distances below this clamp up to it, capping the magnitude.
pub const FALLOFF_FLOOR: f32 = 1.0;

/// Bitmask of gravity categories. A query names the categories it wants and
/// a source participates when the masks intersect.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct GravityTypeMask(u8);

impl GravityTypeMask {
    pub const NORMAL: GravityTypeMask = GravityTypeMask(0x01);
    pub const SHADOW: GravityTypeMask = GravityTypeMask(0x02);
    pub const MAGNET: GravityTypeMask = GravityTypeMask(0x04);
    pub const ALL: GravityTypeMask = GravityTypeMask(0x07);

    pub fn intersects(self, other: GravityTypeMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for GravityTypeMask {
    type Output = GravityTypeMask;

    fn bitor(self, rhs: GravityTypeMask) -> GravityTypeMask {
        GravityTypeMask(self.0 | rhs.0)
    }
}

/// Strength tier of a source. The tier is carried for the host's benefit
/// (e.g. animation or camera response); it does not scale the magnitude.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum GravityPower {
    Light,
    Normal,
    Heavy,
}

/// A single authored gravity volume: a shape plus the attributes every
/// source shares. Attribute fields are plain data; after changing the shape's
/// geometry, call [`commit`](GravitySource::commit) before querying.
#[derive(Clone, Debug)]
pub struct GravitySource {
    shape: GravityShape,
    /// Maximum influence distance. Negative means unbounded.
    pub range: f32,
    /// Grace distance subtracted from the raw distance before falloff, and
    /// added to the range during the range test.
    pub distant: f32,
    /// Sources are evaluated in descending priority order. Tiers below zero
    /// never count as a found result.
    pub priority: f32,
    /// Host-assigned identifier; -1 when unassigned.
    pub id: i32,
    pub type_mask: GravityTypeMask,
    pub power: GravityPower,
    /// Flips the pull away from the shape.
    pub inverse: bool,
    /// Scene-level on/off, driven by the owning actor's appear/vanish.
    pub alive: bool,
    /// Trigger-level on/off, driven by external switches.
    pub switch_active: bool,
}

impl GravitySource {
    pub fn new(shape: GravityShape) -> Self {
        GravitySource {
            shape,
            range: -1.0,
            distant: 0.0,
            priority: 0.0,
            id: -1,
            type_mask: GravityTypeMask::NORMAL,
            power: GravityPower::Normal,
            inverse: false,
            alive: false,
            switch_active: true,
        }
    }

    pub fn shape(&self) -> &GravityShape {
        &self.shape
    }

    pub fn shape_mut(&mut self) -> &mut GravityShape {
        &mut self.shape
    }

    /// Recomputes the shape's derived state. Must be called after mutating
    /// the shape's geometry and before the next query.
    pub fn commit(&mut self) {
        self.shape.update_mtx();
    }

    pub fn is_active(&self) -> bool {
        self.alive && self.switch_active
    }

    fn range_test(&self) -> RangeTest {
        RangeTest {
            range: self.range,
            distant: self.distant,
        }
    }

    /// The raw shape query: unit direction and raw distance, before falloff
    /// and inversion.
    pub fn calc_own_gravity_vector(&self, coord: Point3<f32>) -> Option<(Vector3<f32>, f32)> {
        self.shape.calc_own_gravity_vector(coord, self.range_test())
    }

    /// Full query: direction scaled by the inverse-square falloff magnitude,
    /// flipped when the source is inverted.
    pub fn calc_gravity(&self, coord: Point3<f32>) -> Option<Vector3<f32>> {
        let (dir, distance) = self.calc_own_gravity_vector(coord)?;
        let effective = (distance - self.distant).max(FALLOFF_FLOOR);
        let magnitude = FALLOFF_SCALE / (effective * effective);
        let vec = dir * magnitude;
        if self.inverse {
            Some(-vec)
        } else {
            Some(vec)
        }
    }
}
