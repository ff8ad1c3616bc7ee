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

//! Construction of gravity sources from level-authored placement data.
//!
//! Placement records carry a scale/rotation/translation frame plus up to
//! three numeric shape arguments, each optional. The creators here translate
//! those into configured [`GravitySource`]s using the same unit conventions
//! throughout: a scale of 1.0 spans 500 world units, angular arguments are in
//! degrees, and a missing argument selects the documented default.

use cgmath::{InnerSpace, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::math::{
    matrix_axis_x, matrix_axis_y, matrix_translation, model_matrix_srt, model_matrix_tr,
    normalize_or_zero, scale_matrix_axes, set_matrix_translation,
};
use crate::shape::{
    ConeGravity, CubeFaces, CubeGravity, DiskGravity, DiskTorusEdgeType, DiskTorusGravity,
    GravityShape, ParallelDistanceCalc, ParallelGravity, ParallelRangeType, PointGravity,
    SegmentGravity, WireGravity,
};
use crate::source::{GravityPower, GravitySource, GravityTypeMask};

/// Optional overrides for the attributes shared by every gravity source.
/// An absent field keeps the source's default.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GravityParams {
    pub range: Option<f32>,
    pub distant: Option<f32>,
    pub priority: Option<f32>,
    pub id: Option<i32>,
    pub type_mask: Option<GravityTypeMask>,
    pub power: Option<GravityPower>,
    pub inverse: Option<bool>,
}

/// One authored gravity placement: a world frame, up to three shape
/// arguments and the common attribute overrides.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlacementInfo {
    pub translation: Point3<f32>,
    /// Euler rotation in radians, applied in X then Y then Z order.
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
    pub arg0: Option<f32>,
    pub arg1: Option<f32>,
    pub arg2: Option<f32>,
    pub params: GravityParams,
}

impl PlacementInfo {
    pub fn new(translation: Point3<f32>) -> Self {
        PlacementInfo {
            translation,
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
            arg0: None,
            arg1: None,
            arg2: None,
            params: GravityParams::default(),
        }
    }
}

fn apply_common_params(source: &mut GravitySource, params: &GravityParams) {
    if let Some(range) = params.range {
        source.range = range;
    }
    if let Some(distant) = params.distant {
        source.distant = distant;
    }
    if let Some(priority) = params.priority {
        source.priority = priority;
    }
    if let Some(id) = params.id {
        source.id = id;
    }
    if let Some(type_mask) = params.type_mask {
        source.type_mask = type_mask;
    }
    if let Some(power) = params.power {
        source.power = power;
    }
    if let Some(inverse) = params.inverse {
        source.inverse = inverse;
    }
}

fn finish(mut source: GravitySource, info: &PlacementInfo) -> GravitySource {
    apply_common_params(&mut source, &info.params);
    source.commit();
    source
}

/// Missing integer arguments read as -1.
fn arg_int(arg: Option<f32>) -> i32 {
    arg.map(|v| v as i32).unwrap_or(-1)
}

/// An unbounded plane whose pull direction is the frame's negated up axis.
pub fn create_plane_gravity(info: &PlacementInfo) -> GravitySource {
    let frame = model_matrix_tr(info.translation, info.rotation);
    let gravity = ParallelGravity::new(matrix_axis_y(&frame), info.translation);
    finish(GravitySource::new(GravityShape::Parallel(gravity)), info)
}

/// A plane bounded by an oriented box. The box is centered one half-height
/// above the placement origin so the origin sits on its bottom face.
///
/// `arg0` >= 0 overrides the base distance. `arg1` selects the distance bias
/// axis: 0, 1 or 2 for the box's local X, Y or Z; missing means none.
pub fn create_plane_in_box_gravity(info: &PlacementInfo) -> GravitySource {
    let mut frame = model_matrix_tr(info.translation, info.rotation);
    let up = matrix_axis_y(&frame);

    let mut gravity = ParallelGravity::new(up, info.translation);
    gravity.set_range_type(ParallelRangeType::Box);

    let half = info.scale * 500.0;
    let center = info.translation + up * half.y;
    set_matrix_translation(&mut frame, center);
    scale_matrix_axes(&mut frame, half);
    gravity.set_range_box(frame);

    let arg0 = arg_int(info.arg0);
    if arg0 >= 0 {
        gravity.set_base_distance(arg0 as f32);
    }
    match arg_int(info.arg1) {
        -1 => {}
        0 => gravity.set_distance_calc(ParallelDistanceCalc::X),
        1 => gravity.set_distance_calc(ParallelDistanceCalc::Y),
        2 => gravity.set_distance_calc(ParallelDistanceCalc::Z),
        v => panic!("{} is not a valid distance calc axis", v),
    }

    finish(GravitySource::new(GravityShape::Parallel(gravity)), info)
}

/// A plane bounded by a cylinder of radius `500 * scale.x` and height
/// `500 * scale.y` standing on the placement origin. `arg0` >= 0 overrides
/// the base distance.
pub fn create_plane_in_cylinder_gravity(info: &PlacementInfo) -> GravitySource {
    let frame = model_matrix_tr(info.translation, info.rotation);

    let mut gravity = ParallelGravity::new(matrix_axis_y(&frame), info.translation);
    gravity.set_range_type(ParallelRangeType::Cylinder);
    gravity.set_range_cylinder(500.0 * info.scale.x, 500.0 * info.scale.y);

    let arg0 = arg_int(info.arg0);
    if arg0 >= 0 {
        gravity.set_base_distance(arg0 as f32);
    }

    finish(GravitySource::new(GravityShape::Parallel(gravity)), info)
}

/// A point at the placement origin. The scale sets the grace distance to
/// `500 * scale.x`; the params override can still replace it.
pub fn create_point_gravity(info: &PlacementInfo) -> GravitySource {
    let gravity = PointGravity::new(info.translation);
    let mut source = GravitySource::new(GravityShape::Point(gravity));
    source.distant = 500.0 * info.scale.x;
    finish(source, info)
}

/// An oriented cube with half-extents `500 * scale`, centered one Y
/// half-extent above the placement origin.
///
/// `arg0`, `arg1` and `arg2` are per-axis face bitfields (bit 0 the negative
/// face, bit 1 the positive face) for X, Y and Z. A missing argument enables
/// both faces of its axis.
pub fn create_cube_gravity(info: &PlacementInfo) -> GravitySource {
    let mut frame = model_matrix_tr(info.translation, info.rotation);
    let half = info.scale * 500.0;

    let center = info.translation + matrix_axis_y(&frame) * half.y;
    set_matrix_translation(&mut frame, center);
    scale_matrix_axes(&mut frame, half);

    let mut gravity = CubeGravity::new(frame);

    let mut faces = CubeFaces::NONE;
    let arg0 = arg_int(info.arg0) as u32;
    if arg0 & 0x01 != 0 {
        faces |= CubeFaces::X_LEFT;
    }
    if arg0 & 0x02 != 0 {
        faces |= CubeFaces::X_RIGHT;
    }
    let arg1 = arg_int(info.arg1) as u32;
    if arg1 & 0x01 != 0 {
        faces |= CubeFaces::Y_LEFT;
    }
    if arg1 & 0x02 != 0 {
        faces |= CubeFaces::Y_RIGHT;
    }
    let arg2 = arg_int(info.arg2) as u32;
    if arg2 & 0x01 != 0 {
        faces |= CubeFaces::Z_LEFT;
    }
    if arg2 & 0x02 != 0 {
        faces |= CubeFaces::Z_RIGHT;
    }
    gravity.valid_faces = faces;

    finish(GravitySource::new(GravityShape::Cube(gravity)), info)
}

/// A segment running from the placement origin 1000 scaled units along the
/// frame's up axis, with the side window anchored to the frame's X axis.
///
/// `arg0` selects endpoint validity: 0 neither, 1 the start only, 2 the end
/// only, 3 both; anything else keeps both valid. `arg1` >= 0 sets the side
/// window in degrees.
pub fn create_segment_gravity(info: &PlacementInfo) -> GravitySource {
    let frame = model_matrix_srt(info.scale, info.rotation, info.translation);
    let side = matrix_axis_x(&frame);
    let along = matrix_axis_y(&frame);

    let p0 = info.translation;
    let p1 = p0 + along * 1000.0;
    let mut gravity = SegmentGravity::new(p0, p1);
    gravity.set_side_vector(normalize_or_zero(side));

    match arg_int(info.arg0) {
        0 => {
            gravity.set_edge_valid(0, false);
            gravity.set_edge_valid(1, false);
        }
        1 => {
            gravity.set_edge_valid(0, true);
            gravity.set_edge_valid(1, false);
        }
        2 => {
            gravity.set_edge_valid(0, false);
            gravity.set_edge_valid(1, true);
        }
        3 => {
            gravity.set_edge_valid(0, true);
            gravity.set_edge_valid(1, true);
        }
        _ => {}
    }

    let arg1 = arg_int(info.arg1);
    if arg1 >= 0 {
        gravity.set_valid_side_degree(arg1 as f32);
    }

    finish(GravitySource::new(GravityShape::Segment(gravity)), info)
}

/// A disk of radius `500 * max(scale)` facing along the frame's up axis.
///
/// `arg0` = 0 disables the back side (missing means both sides). `arg1` = 0
/// disables rim gravity (missing means enabled). `arg2` >= 0 sets the valid
/// arc in degrees.
pub fn create_disk_gravity(info: &PlacementInfo) -> GravitySource {
    let frame = model_matrix_tr(info.translation, info.rotation);

    let mut gravity = DiskGravity::new(info.translation, matrix_axis_y(&frame));
    gravity.set_side_direction(matrix_axis_x(&frame));

    let max_scale = info.scale.x.max(info.scale.y).max(info.scale.z);
    gravity.set_radius(500.0 * max_scale);

    gravity.set_both_side(arg_int(info.arg0) != 0);
    gravity.set_enable_edge_gravity(arg_int(info.arg1) != 0);
    let arg2 = arg_int(info.arg2);
    gravity.set_valid_degree(if arg2 >= 0 { arg2 as f32 } else { 360.0 });

    finish(GravitySource::new(GravityShape::Disk(gravity)), info)
}

/// An annular band of outer radius `500 * max(scale)` facing along the
/// frame's up axis.
///
/// `arg0` = 0 disables the back side. `arg1` selects the edge type (0 none,
/// 1 inside, 2 outside, 3 both; missing means both). `arg2` is the band
/// width; a missing width leaves the band degenerate so only the rim pulls.
pub fn create_disk_torus_gravity(info: &PlacementInfo) -> GravitySource {
    let frame = model_matrix_tr(info.translation, info.rotation);

    let mut gravity = DiskTorusGravity::new(info.translation, matrix_axis_y(&frame));

    let max_scale = info.scale.x.max(info.scale.y).max(info.scale.z);
    gravity.set_radius(500.0 * max_scale);

    gravity.set_both_side(arg_int(info.arg0) != 0);
    match arg_int(info.arg1) {
        -1 | 3 => gravity.set_edge_type(DiskTorusEdgeType::Both),
        0 => gravity.set_edge_type(DiskTorusEdgeType::None),
        1 => gravity.set_edge_type(DiskTorusEdgeType::Inside),
        2 => gravity.set_edge_type(DiskTorusEdgeType::Outside),
        v => panic!("{} is not a valid edge type", v),
    }
    gravity.set_disk_radius(info.arg2.unwrap_or(-1.0));

    finish(GravitySource::new(GravityShape::DiskTorus(gravity)), info)
}

/// A cone of base radius `500 * scale.x` and height `500 * scale.y` standing
/// on the placement origin.
///
/// `arg0` = 0 clears the bottom flag (missing sets it). `arg1` is the top
/// cut in thousandths of the height; missing leaves the cone pointed.
pub fn create_cone_gravity(info: &PlacementInfo) -> GravitySource {
    let frame = model_matrix_srt(info.scale * 500.0, info.rotation, info.translation);
    let mut gravity = ConeGravity::new(frame);

    gravity.set_enable_bottom(arg_int(info.arg0) != 0);
    gravity.set_top_cut_rate(info.arg1.unwrap_or(-1.0) / 1000.0);

    finish(GravitySource::new(GravityShape::Cone(gravity)), info)
}

/// A wire resampled from the rail polyline at uniform arc length. `arg0`
/// sets the segment count (default 20); the wire gets one more point than
/// segments, starting at the rail's head.
pub fn create_wire_gravity(info: &PlacementInfo, rail: &[Point3<f32>]) -> GravitySource {
    let mut gravity = WireGravity::new();

    if !rail.is_empty() {
        let segment_count = info.arg0.map(|v| v as usize).unwrap_or(20);
        let total: f32 = rail.windows(2).map(|p| (p[1] - p[0]).magnitude()).sum();
        let step = total / (segment_count + 1) as f32;

        for i in 0..segment_count + 1 {
            gravity.add_point(sample_polyline(rail, step * i as f32));
        }
    }

    finish(GravitySource::new(GravityShape::Wire(gravity)), info)
}

/// Point at arc-length `dist` along a polyline, clamped to its ends.
fn sample_polyline(rail: &[Point3<f32>], dist: f32) -> Point3<f32> {
    let mut remaining = dist;
    for pair in rail.windows(2) {
        let delta = pair[1] - pair[0];
        let len = delta.magnitude();
        if remaining <= len && len > 0.0 {
            return pair[0] + delta * (remaining / len);
        }
        remaining -= len;
    }
    rail[rail.len() - 1]
}
