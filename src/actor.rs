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

use crate::registry::{GravityRegistry, SourceHandle};
use crate::source::GravitySource;

/// Lifecycle adapter binding a registered gravity source to the host's
/// scene objects and trigger switches.
///
/// The actor owns its source's activation state: `appear` and `vanish` drive
/// the scene-level `alive` flag, and `update_switches` folds the wired
/// trigger switches into the trigger-level flag each frame. The two switches
/// have opposite senses: switch A enables the source while on, switch B
/// disables it while on.
pub struct GravityActor {
    handle: SourceHandle,
    use_switch_a: bool,
    use_switch_b: bool,
}

impl GravityActor {
    /// Registers `source` and appears immediately, matching placement-time
    /// construction.
    pub fn new(
        registry: &mut GravityRegistry,
        source: GravitySource,
        use_switch_a: bool,
        use_switch_b: bool,
    ) -> Self {
        let handle = registry.register(source);
        let mut actor = GravityActor {
            handle,
            use_switch_a,
            use_switch_b,
        };
        actor.appear(registry, false, false);
        actor
    }

    pub fn handle(&self) -> SourceHandle {
        self.handle
    }

    /// Brings the source into the scene and refreshes its switch state.
    pub fn appear(&mut self, registry: &mut GravityRegistry, switch_a_on: bool, switch_b_on: bool) {
        if let Some(source) = registry.source_mut(self.handle) {
            source.alive = true;
        }
        self.update_switches(registry, switch_a_on, switch_b_on);
    }

    /// Removes the source from the scene. Switch state is left as-is.
    pub fn vanish(&mut self, registry: &mut GravityRegistry) {
        if let Some(source) = registry.source_mut(self.handle) {
            source.alive = false;
        }
    }

    /// Folds the current switch readings into the source's trigger flag.
    /// Does nothing unless at least one switch is wired.
    pub fn update_switches(
        &mut self,
        registry: &mut GravityRegistry,
        switch_a_on: bool,
        switch_b_on: bool,
    ) {
        if !self.use_switch_a && !self.use_switch_b {
            return;
        }
        let active_a = !self.use_switch_a || switch_a_on;
        let active_b = !self.use_switch_b || !switch_b_on;
        if let Some(source) = registry.source_mut(self.handle) {
            source.switch_active = active_a && active_b;
        }
    }

    /// Unregisters and returns the source, consuming the actor.
    pub fn release(self, registry: &mut GravityRegistry) -> Option<GravitySource> {
        registry.remove(self.handle)
    }
}
