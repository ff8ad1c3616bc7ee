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

use cgmath::{InnerSpace, Point3, Vector3, Zero};

use crate::math::normalize_or_zero;
use crate::source::{GravitySource, GravityTypeMask};

/// Stable identifier for a source registered in a [`GravityRegistry`].
/// Handles are never reused within one registry.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct SourceHandle(u64);

struct Entry {
    handle: SourceHandle,
    source: GravitySource,
}

/// Extra per-query output: the strongest single contributor and the priority
/// tier that won.
#[derive(Copy, Clone, Debug)]
pub struct GravityQueryInfo {
    /// The winning source's own unnormalized falloff vector, not the tier
    /// sum.
    pub direction: Vector3<f32>,
    /// Priority of the winning tier. -1 when no source applied.
    pub priority: f32,
    /// The single source contributing the largest magnitude, if any applied.
    pub source: Option<SourceHandle>,
}

impl GravityQueryInfo {
    pub fn new() -> Self {
        GravityQueryInfo {
            direction: Vector3::zero(),
            priority: -1.0,
            source: None,
        }
    }
}

impl Default for GravityQueryInfo {
    fn default() -> Self {
        GravityQueryInfo::new()
    }
}

/// The ordered collection of gravity sources. Sources are kept sorted by
/// descending priority; among equal priorities, registration order is
/// preserved.
pub struct GravityRegistry {
    entries: Vec<Entry>,
    next_handle: u64,
}

impl GravityRegistry {
    pub fn new() -> Self {
        GravityRegistry {
            entries: Vec::new(),
            next_handle: 0,
        }
    }

    /// Adds a source and returns its handle. Insertion keeps the priority
    /// order without disturbing the relative order of equal priorities.
    pub fn register(&mut self, source: GravitySource) -> SourceHandle {
        let handle = SourceHandle(self.next_handle);
        self.next_handle += 1;
        let at = self
            .entries
            .partition_point(|e| e.source.priority >= source.priority);
        self.entries.insert(at, Entry { handle, source });
        handle
    }

    /// Removes a source, returning it if the handle was present.
    pub fn remove(&mut self, handle: SourceHandle) -> Option<GravitySource> {
        let at = self.entries.iter().position(|e| e.handle == handle)?;
        Some(self.entries.remove(at).source)
    }

    pub fn source(&self, handle: SourceHandle) -> Option<&GravitySource> {
        self.entries
            .iter()
            .find(|e| e.handle == handle)
            .map(|e| &e.source)
    }

    /// Mutable access to a registered source. Changing the priority through
    /// this reference does not re-sort; remove and re-register instead.
    pub fn source_mut(&mut self, handle: SourceHandle) -> Option<&mut GravitySource> {
        self.entries
            .iter_mut()
            .find(|e| e.handle == handle)
            .map(|e| &mut e.source)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SourceHandle, &GravitySource)> {
        self.entries.iter().map(|e| (e.handle, &e.source))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Computes the blended gravity direction at `pos` considering every
    /// active source whose type mask intersects `mask`.
    ///
    /// Only the highest priority tier with at least one applicable source
    /// contributes: its vectors are summed and the sum normalized. Lower
    /// tiers are never evaluated, and a tier below priority zero never
    /// counts as found. Returns `None` when no source applies.
    pub fn calc_total_gravity_vector(
        &self,
        pos: Point3<f32>,
        mask: GravityTypeMask,
        mut info: Option<&mut GravityQueryInfo>,
    ) -> Option<Vector3<f32>> {
        let mut total = Vector3::zero();
        let mut best_priority = -1.0_f32;
        let mut best_mag = -1.0_f32;
        let mut best_handle = None;
        let mut winner_vec = Vector3::zero();

        for entry in &self.entries {
            let source = &entry.source;
            if !source.is_active() || !source.type_mask.intersects(mask) {
                continue;
            }
            // Entries are priority sorted, so once a tier has produced a
            // result nothing below it can matter.
            if source.priority < best_priority {
                break;
            }

            let vec = match source.calc_gravity(pos) {
                Some(v) => v,
                None => continue,
            };

            let mag = vec.magnitude();
            let new_best;
            if source.priority == best_priority {
                total += vec;
                new_best = mag > best_mag;
            } else {
                total = vec;
                best_priority = source.priority;
                new_best = true;
            }

            if new_best {
                best_mag = mag;
                best_handle = Some(entry.handle);
                winner_vec = vec;
            }
        }

        if best_priority < 0.0 {
            return None;
        }

        if let Some(info) = info.as_mut() {
            info.direction = winner_vec;
            info.priority = best_priority;
            info.source = best_handle;
        }

        Some(normalize_or_zero(total))
    }
}

impl Default for GravityRegistry {
    fn default() -> Self {
        GravityRegistry::new()
    }
}
