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

//! A multi-shape gravity field library intended for use in 3D video game
//! development.
//!
//! # Gravity field overview
//!
//! A gravity field is built from a set of authored sources, each of which
//! pulls objects toward a shape:
//!
//! - `GravityShape`: a closed set of shape evaluators (parallel plane, cube,
//!   point, segment, disk, disk-torus, cone, wire). Each answers a point
//!   query with a unit pull direction and a raw scalar distance, or nothing
//!   when the point is outside the shape's influence.
//! - `GravitySource`: a shape plus the attributes shared by every source --
//!   range, priority, type mask, activation flags -- and the fixed
//!   inverse-square falloff mapping distance to pull magnitude.
//! - `GravityRegistry`: the ordered collection of live sources. Its point
//!   query scans sources in descending priority, sums the strongest tier and
//!   returns a single normalized direction.
//! - `GravityActor`: the lifecycle adapter that owns a registered source and
//!   drives its activation from external trigger switches.
//!
//! Sources are constructed from level-authored placement parameters through
//! the `create_*_gravity` routines in `params`.

pub extern crate cgmath;
extern crate smallvec;

mod math;
pub use crate::math::*;

mod shape;
pub use crate::shape::*;

mod source;
pub use crate::source::*;

mod registry;
pub use crate::registry::*;

mod params;
pub use crate::params::*;

mod actor;
pub use crate::actor::*;
