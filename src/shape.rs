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

use std::ops::{BitOr, BitOrAssign};

use cgmath::{InnerSpace, Matrix4, MetricSpace, Point3, Vector3};
use smallvec::SmallVec;

use crate::math::{
    is_near_zero, is_near_zero_vec3, lerp, make_axis_vertical_zx, matrix_axis_x, matrix_axis_y,
    matrix_axis_z, matrix_translation, normalize_or_zero, perpendic_foot_to_line_inside,
    rotate_about_axis, vec_kill_element, GRAVITY_EPSILON, VEC_EPSILON,
};

/// The range test every shape evaluator applies to its raw distance. A
/// negative range means unbounded.
#[derive(Copy, Clone, Debug)]
pub struct RangeTest {
    pub range: f32,
    pub distant: f32,
}

impl RangeTest {
    pub fn contains(&self, distance: f32) -> bool {
        if self.range < 0.0 {
            return true;
        }
        distance < self.range + self.distant
    }

    /// Squared-distance variant used by the wire shape. The asymmetry with
    /// `contains` is deliberate; the wire evaluator compares squared
    /// distances to avoid a root per segment.
    pub fn contains_squared(&self, squared_distance: f32) -> bool {
        if self.range < 0.0 {
            return true;
        }
        let range = self.range + self.distant;
        squared_distance < range * range
    }
}

/// Pull straight toward `target` if it is in range. Shared by the cone's
/// rim and base cases.
fn gravity_toward(coord: Point3<f32>, target: Point3<f32>, range: RangeTest) -> Option<(Vector3<f32>, f32)> {
    let delta = target - coord;
    let dist = delta.magnitude();
    if range.contains(dist) {
        Some((normalize_or_zero(delta), dist))
    } else {
        None
    }
}

////////////////////////////////////////////////////////////////////////////////
// Parallel gravity: an infinite half-space pull bounded by a range volume.

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ParallelRangeType {
    Sphere,
    Box,
    Cylinder,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ParallelDistanceCalc {
    None,
    X,
    Y,
    Z,
}

/// Gravity that pulls along a fixed direction (the negated plane normal)
/// anywhere inside its range volume. The reported distance is a constant
/// base distance, optionally biased by the query point's offset inside the
/// range volume.
#[derive(Clone, Debug)]
pub struct ParallelGravity {
    range_type: ParallelRangeType,
    base_distance: f32,
    cylinder_radius: f32,
    cylinder_height: f32,
    box_mtx: Option<Matrix4<f32>>,
    box_extents_sq: Vector3<f32>,
    plane_normal: Vector3<f32>,
    pos: Point3<f32>,
    distance_calc: ParallelDistanceCalc,
}

impl ParallelGravity {
    pub fn new(normal: Vector3<f32>, pos: Point3<f32>) -> Self {
        let mut gravity = ParallelGravity {
            range_type: ParallelRangeType::Sphere,
            base_distance: 2000.0,
            cylinder_radius: 500.0,
            cylinder_height: 1000.0,
            box_mtx: None,
            box_extents_sq: Vector3::new(0.0, 0.0, 0.0),
            plane_normal: Vector3::new(0.0, 1.0, 0.0),
            pos,
            distance_calc: ParallelDistanceCalc::None,
        };
        gravity.set_plane(normal, pos);
        gravity
    }

    pub fn set_plane(&mut self, normal: Vector3<f32>, pos: Point3<f32>) {
        self.plane_normal = normalize_or_zero(normal);
        self.pos = pos;
    }

    pub fn set_base_distance(&mut self, v: f32) {
        self.base_distance = v;
    }

    pub fn set_distance_calc(&mut self, v: ParallelDistanceCalc) {
        self.distance_calc = v;
    }

    pub fn set_range_type(&mut self, v: ParallelRangeType) {
        self.range_type = v;
    }

    pub fn set_range_cylinder(&mut self, radius: f32, height: f32) {
        self.cylinder_radius = radius;
        self.cylinder_height = height;
    }

    pub fn set_range_box(&mut self, mtx: Matrix4<f32>) {
        self.box_mtx = Some(mtx);
    }

    pub(crate) fn update_mtx(&mut self) {
        if self.range_type == ParallelRangeType::Box {
            let m = self.box_mtx.as_ref().expect("box range type requires a box matrix");
            self.box_extents_sq = Vector3::new(
                matrix_axis_x(m).magnitude2(),
                matrix_axis_y(m).magnitude2(),
                matrix_axis_z(m).magnitude2(),
            );
        }
    }

    fn sphere_range(&self, coord: Point3<f32>, range: RangeTest) -> Option<f32> {
        if range.range >= 0.0 {
            let dist_sq = self.pos.distance2(coord);
            if dist_sq < range.range * range.range {
                Some(self.base_distance)
            } else {
                None
            }
        } else {
            Some(self.base_distance)
        }
    }

    fn box_range(&self, coord: Point3<f32>) -> Option<f32> {
        let m = self.box_mtx.as_ref().expect("box range type requires a box matrix");
        let local = coord - matrix_translation(m);
        let ex = self.box_extents_sq;

        // The box axes are unnormalized, so each dot product is the local
        // offset scaled by the axis length and compares against the squared
        // extent.
        let dot_x = local.dot(matrix_axis_x(m));
        if dot_x < -ex.x || dot_x > ex.x {
            return None;
        }
        let dot_y = local.dot(matrix_axis_y(m));
        if dot_y < -ex.y || dot_y > ex.y {
            return None;
        }
        let dot_z = local.dot(matrix_axis_z(m));
        if dot_z < -ex.z || dot_z > ex.z {
            return None;
        }

        let dist = match self.distance_calc {
            ParallelDistanceCalc::None => self.base_distance,
            ParallelDistanceCalc::X => self.base_distance + dot_x.abs() / ex.x.sqrt(),
            ParallelDistanceCalc::Y => self.base_distance + dot_y.abs() / ex.y.sqrt(),
            ParallelDistanceCalc::Z => self.base_distance + dot_z.abs() / ex.z.sqrt(),
        };
        Some(dist)
    }

    fn cylinder_range(&self, coord: Point3<f32>) -> Option<f32> {
        let (ortho, depth) = vec_kill_element(coord - self.pos, self.plane_normal);
        if depth < 0.0 || depth > self.cylinder_height {
            return None;
        }
        let mag = ortho.magnitude();
        if mag > self.cylinder_radius {
            return None;
        }
        Some(self.base_distance + mag)
    }

    pub fn calc_own_gravity_vector(
        &self,
        coord: Point3<f32>,
        range: RangeTest,
    ) -> Option<(Vector3<f32>, f32)> {
        let distance = match self.range_type {
            ParallelRangeType::Sphere => self.sphere_range(coord, range),
            ParallelRangeType::Box => self.box_range(coord),
            ParallelRangeType::Cylinder => self.cylinder_range(coord),
        }?;
        Some((-self.plane_normal, distance))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Cube gravity: 27-region classification around an oriented box.

/// The set of cube faces whose surrounding regions participate in gravity.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct CubeFaces(u8);

impl CubeFaces {
    pub const NONE: CubeFaces = CubeFaces(0);
    pub const X_RIGHT: CubeFaces = CubeFaces(0x01);
    pub const X_LEFT: CubeFaces = CubeFaces(0x02);
    pub const Y_RIGHT: CubeFaces = CubeFaces(0x04);
    pub const Y_LEFT: CubeFaces = CubeFaces(0x08);
    pub const Z_RIGHT: CubeFaces = CubeFaces(0x10);
    pub const Z_LEFT: CubeFaces = CubeFaces(0x20);
    pub const ALL: CubeFaces = CubeFaces(0x3f);

    pub fn contains(self, other: CubeFaces) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for CubeFaces {
    type Output = CubeFaces;

    fn bitor(self, rhs: CubeFaces) -> CubeFaces {
        CubeFaces(self.0 | rhs.0)
    }
}

impl BitOrAssign for CubeFaces {
    fn bitor_assign(&mut self, rhs: CubeFaces) {
        self.0 |= rhs.0;
    }
}

/// Where a point sits relative to one local axis of the cube.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum AxisRegion {
    Left,
    Inside,
    Right,
}

type CubeArea = (AxisRegion, AxisRegion, AxisRegion);

/// Gravity toward an oriented box. Space around the box partitions into 27
/// regions (left/inside/right per local axis): 6 face regions pull along the
/// face normal, 12 edge regions pull toward the nearest edge point, 8 corner
/// regions pull toward the corner. Faces can be individually disabled, which
/// rejects every region touching them. The all-inside region yields nothing.
#[derive(Clone, Debug)]
pub struct CubeGravity {
    mtx: Matrix4<f32>,
    extents: Vector3<f32>,
    pub valid_faces: CubeFaces,
}

impl CubeGravity {
    pub fn new(mtx: Matrix4<f32>) -> Self {
        CubeGravity {
            mtx,
            extents: Vector3::new(0.0, 0.0, 0.0),
            valid_faces: CubeFaces::ALL,
        }
    }

    pub fn set_cube(&mut self, mtx: Matrix4<f32>) {
        self.mtx = mtx;
    }

    pub(crate) fn update_mtx(&mut self) {
        self.extents = Vector3::new(
            matrix_axis_x(&self.mtx).magnitude(),
            matrix_axis_y(&self.mtx).magnitude(),
            matrix_axis_z(&self.mtx).magnitude(),
        );
    }

    fn classify_axis(&self, dist: f32, extent: f32, left: CubeFaces, right: CubeFaces) -> Option<AxisRegion> {
        if dist > extent {
            if !self.valid_faces.contains(right) {
                return None;
            }
            Some(AxisRegion::Right)
        } else if dist >= -extent {
            Some(AxisRegion::Inside)
        } else {
            if !self.valid_faces.contains(left) {
                return None;
            }
            Some(AxisRegion::Left)
        }
    }

    fn calc_gravity_area(&self, coord: Point3<f32>) -> Option<CubeArea> {
        let local = coord - matrix_translation(&self.mtx);

        // Dividing by the axis length turns the unnormalized dot product
        // into a world-space offset along the axis.
        let dist_x = local.dot(matrix_axis_x(&self.mtx)) / self.extents.x;
        let x = self.classify_axis(dist_x, self.extents.x, CubeFaces::X_LEFT, CubeFaces::X_RIGHT)?;

        let dist_y = local.dot(matrix_axis_y(&self.mtx)) / self.extents.y;
        let y = self.classify_axis(dist_y, self.extents.y, CubeFaces::Y_LEFT, CubeFaces::Y_RIGHT)?;

        let dist_z = local.dot(matrix_axis_z(&self.mtx)) / self.extents.z;
        let z = self.classify_axis(dist_z, self.extents.z, CubeFaces::Z_LEFT, CubeFaces::Z_RIGHT)?;

        Some((x, y, z))
    }

    fn calc_face_gravity(&self, coord: Point3<f32>, area: CubeArea) -> Option<(Vector3<f32>, f32)> {
        use self::AxisRegion::*;

        let axis = match area {
            (Left, Inside, Inside) => matrix_axis_x(&self.mtx),
            (Right, Inside, Inside) => -matrix_axis_x(&self.mtx),
            (Inside, Left, Inside) => matrix_axis_y(&self.mtx),
            (Inside, Right, Inside) => -matrix_axis_y(&self.mtx),
            (Inside, Inside, Left) => matrix_axis_z(&self.mtx),
            (Inside, Inside, Right) => -matrix_axis_z(&self.mtx),
            _ => return None,
        };

        let axis_size = axis.magnitude();
        let dir = normalize_or_zero(axis);

        let to_center = matrix_translation(&self.mtx) - coord;
        let dist = (to_center.dot(dir) - axis_size).max(0.0);
        Some((dir, dist))
    }

    fn calc_edge_gravity(&self, coord: Point3<f32>, area: CubeArea) -> Option<(Vector3<f32>, f32)> {
        use self::AxisRegion::*;

        let ax = matrix_axis_x(&self.mtx);
        let ay = matrix_axis_y(&self.mtx);
        let az = matrix_axis_z(&self.mtx);

        // Each edge region keeps one axis free and pushes out along the
        // other two; `infl` is the edge's center offset from the cube center.
        let (edge_axis, infl) = match area {
            (Inside, Left, Left) => (ax, -ay - az),
            (Left, Inside, Left) => (ay, -ax - az),
            (Right, Inside, Left) => (ay, ax - az),
            (Inside, Right, Left) => (ax, ay - az),
            (Left, Left, Inside) => (az, -ax - ay),
            (Right, Left, Inside) => (az, ax - ay),
            (Left, Right, Inside) => (az, -ax + ay),
            (Right, Right, Inside) => (az, ax + ay),
            (Inside, Left, Right) => (ax, -ay + az),
            (Left, Inside, Right) => (ay, -ax + az),
            (Right, Inside, Right) => (ay, ax + az),
            (Inside, Right, Right) => (ax, ay + az),
            _ => return None,
        };

        let edge_point = matrix_translation(&self.mtx) + infl;
        let edge_axis = normalize_or_zero(edge_axis);

        let (delta, _) = vec_kill_element(edge_point - coord, edge_axis);

        if !is_near_zero_vec3(delta, VEC_EPSILON) {
            let dist = delta.magnitude();
            Some((normalize_or_zero(delta), dist))
        } else {
            // Exactly on the edge line; fall toward the edge's outward offset.
            Some((normalize_or_zero(infl), 0.0))
        }
    }

    fn calc_corner_gravity(&self, coord: Point3<f32>, area: CubeArea) -> Option<(Vector3<f32>, f32)> {
        use self::AxisRegion::*;

        let ax = matrix_axis_x(&self.mtx);
        let ay = matrix_axis_y(&self.mtx);
        let az = matrix_axis_z(&self.mtx);

        let infl = match area {
            (Left, Left, Left) => -ax - ay - az,
            (Right, Left, Left) => ax - ay - az,
            (Left, Right, Left) => -ax + ay - az,
            (Right, Right, Left) => ax + ay - az,
            (Left, Left, Right) => -ax - ay + az,
            (Right, Left, Right) => ax - ay + az,
            (Left, Right, Right) => -ax + ay + az,
            (Right, Right, Right) => ax + ay + az,
            _ => return None,
        };

        let corner = matrix_translation(&self.mtx) + infl;
        let delta = corner - coord;
        if !is_near_zero_vec3(delta, VEC_EPSILON) {
            let dist = delta.magnitude();
            Some((normalize_or_zero(delta), dist))
        } else {
            Some((normalize_or_zero(infl), 0.0))
        }
    }

    pub fn calc_own_gravity_vector(
        &self,
        coord: Point3<f32>,
        range: RangeTest,
    ) -> Option<(Vector3<f32>, f32)> {
        let area = self.calc_gravity_area(coord)?;

        let (dir, dist) = self
            .calc_face_gravity(coord, area)
            .or_else(|| self.calc_edge_gravity(coord, area))
            .or_else(|| self.calc_corner_gravity(coord, area))?;

        if range.contains(dist) {
            Some((dir, dist))
        } else {
            None
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Point gravity.

/// Gravity toward a single point.
#[derive(Copy, Clone, Debug)]
pub struct PointGravity {
    pub pos: Point3<f32>,
}

impl PointGravity {
    pub fn new(pos: Point3<f32>) -> Self {
        PointGravity { pos }
    }

    pub fn calc_own_gravity_vector(
        &self,
        coord: Point3<f32>,
        range: RangeTest,
    ) -> Option<(Vector3<f32>, f32)> {
        let delta = self.pos - coord;
        let mag = delta.magnitude();
        let dir = normalize_or_zero(delta);
        if range.contains(mag) {
            Some((dir, mag))
        } else {
            None
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Segment gravity.

/// Gravity toward the closest point on a line segment. Projections past
/// either endpoint clamp to it only when that endpoint is marked valid, and
/// an angular window around an orthogonalized side vector can reject points
/// on the wrong side of the segment.
#[derive(Clone, Debug)]
pub struct SegmentGravity {
    gravity_points: [Point3<f32>; 2],
    side_vector: Vector3<f32>,
    edge_valid: [bool; 2],
    side_vector_ortho: Vector3<f32>,
    valid_side_degree: f32,
    valid_side_cos: f32,
    segment_direction: Vector3<f32>,
    segment_length: f32,
}

impl SegmentGravity {
    pub fn new(p0: Point3<f32>, p1: Point3<f32>) -> Self {
        SegmentGravity {
            gravity_points: [p0, p1],
            side_vector: Vector3::new(1.0, 0.0, 0.0),
            edge_valid: [true, true],
            side_vector_ortho: Vector3::new(0.0, 0.0, 0.0),
            valid_side_degree: 360.0,
            valid_side_cos: -1.0,
            segment_direction: Vector3::new(0.0, 1.0, 0.0),
            segment_length: 0.0,
        }
    }

    pub fn set_gravity_point(&mut self, i: usize, v: Point3<f32>) {
        self.gravity_points[i] = v;
    }

    pub fn set_side_vector(&mut self, v: Vector3<f32>) {
        self.side_vector = normalize_or_zero(v);
    }

    pub fn set_valid_side_degree(&mut self, v: f32) {
        self.valid_side_degree = v;
    }

    pub fn set_edge_valid(&mut self, i: usize, v: bool) {
        self.edge_valid[i] = v;
    }

    pub(crate) fn update_mtx(&mut self) {
        let theta = self.valid_side_degree.to_radians() * 0.5;
        self.valid_side_cos = theta.cos();

        let delta = self.gravity_points[1] - self.gravity_points[0];
        self.segment_direction = normalize_or_zero(delta);
        self.segment_length = delta.magnitude();

        // The side vector is orthogonalized against the segment, then swung
        // by the half-angle so the window opens symmetrically around it.
        let (ortho, _) = vec_kill_element(self.side_vector, self.segment_direction);
        self.side_vector_ortho = rotate_about_axis(ortho, self.segment_direction, theta);
    }

    pub fn calc_own_gravity_vector(
        &self,
        coord: Point3<f32>,
        range: RangeTest,
    ) -> Option<(Vector3<f32>, f32)> {
        let local = coord - self.gravity_points[0];
        let dot = local.dot(self.segment_direction);

        if self.valid_side_cos > -1.0 {
            let side = normalize_or_zero(local - self.segment_direction * dot);
            if side.dot(self.side_vector_ortho) < self.valid_side_cos {
                return None;
            }
        }

        let closest = if dot >= 0.0 && dot <= self.segment_length {
            self.gravity_points[0] + self.segment_direction * dot
        } else if dot >= 0.0 {
            if !self.edge_valid[1] {
                return None;
            }
            self.gravity_points[1]
        } else {
            if !self.edge_valid[0] {
                return None;
            }
            self.gravity_points[0]
        };

        let delta = closest - coord;
        let dist = delta.magnitude();
        if !range.contains(dist) {
            return None;
        }

        Some((normalize_or_zero(delta), dist))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Disk gravity.

/// Gravity toward a one- or two-sided disk. Points over the disk fall
/// straight along its normal; points past the rim optionally fall toward the
/// rim edge. An angular window restricts the valid arc.
#[derive(Clone, Debug)]
pub struct DiskGravity {
    enable_edge_gravity: bool,
    both_side: bool,
    valid_degree: f32,
    valid_cos: f32,
    local_position: Point3<f32>,
    local_direction: Vector3<f32>,
    side_direction: Vector3<f32>,
    side_direction_ortho: Vector3<f32>,
    radius: f32,
    world_position: Point3<f32>,
    world_direction: Vector3<f32>,
    world_side_direction: Vector3<f32>,
    world_radius: f32,
}

impl DiskGravity {
    pub fn new(position: Point3<f32>, direction: Vector3<f32>) -> Self {
        DiskGravity {
            enable_edge_gravity: false,
            both_side: false,
            valid_degree: 360.0,
            valid_cos: -1.0,
            local_position: position,
            local_direction: normalize_or_zero(direction),
            side_direction: Vector3::new(1.0, 0.0, 0.0),
            side_direction_ortho: Vector3::new(1.0, 0.0, 0.0),
            radius: 250.0,
            world_position: position,
            world_direction: Vector3::new(0.0, 1.0, 0.0),
            world_side_direction: Vector3::new(1.0, 0.0, 0.0),
            world_radius: 250.0,
        }
    }

    pub fn set_both_side(&mut self, v: bool) {
        self.both_side = v;
    }

    pub fn set_enable_edge_gravity(&mut self, v: bool) {
        self.enable_edge_gravity = v;
    }

    pub fn set_valid_degree(&mut self, v: f32) {
        self.valid_degree = v;
    }

    pub fn set_local_position(&mut self, v: Point3<f32>) {
        self.local_position = v;
    }

    pub fn set_local_direction(&mut self, v: Vector3<f32>) {
        self.local_direction = normalize_or_zero(v);
    }

    pub fn set_side_direction(&mut self, v: Vector3<f32>) {
        self.side_direction = v;
    }

    pub fn set_radius(&mut self, v: f32) {
        self.radius = v;
    }

    pub(crate) fn update_mtx(&mut self) {
        let theta = self.valid_degree.to_radians() * 0.5;
        self.valid_cos = theta.cos();

        // The half-angle rotation spins about the raw side direction, not
        // the disk normal.
        let (ortho, _) = vec_kill_element(self.side_direction, self.local_direction);
        self.side_direction_ortho = rotate_about_axis(ortho, self.side_direction, theta);

        self.world_position = self.local_position;
        self.world_direction = self.local_direction;
        let length = self.side_direction_ortho.magnitude();
        self.world_side_direction = normalize_or_zero(self.side_direction_ortho);
        self.world_radius = self.radius * length;
    }

    pub fn calc_own_gravity_vector(
        &self,
        coord: Point3<f32>,
        range: RangeTest,
    ) -> Option<(Vector3<f32>, f32)> {
        let local = coord - self.world_position;
        let dot = local.dot(self.world_direction);

        // Wrong side.
        if dot < 0.0 && !self.both_side {
            return None;
        }

        let radial = local - self.world_direction * dot;
        let length = radial.magnitude();
        let radial_dir = normalize_or_zero(radial);

        if self.valid_cos > -1.0 && radial_dir.dot(self.world_side_direction) < self.valid_cos {
            return None;
        }

        let (dir, dist) = if length >= self.world_radius {
            if !self.enable_edge_gravity {
                return None;
            }
            let to_rim = radial_dir * self.world_radius - local;
            let dist = to_rim.magnitude();
            (normalize_or_zero(to_rim), dist)
        } else {
            let sign = if dot > 0.0 {
                1.0
            } else if dot < 0.0 {
                -1.0
            } else {
                0.0
            };
            (self.world_direction * -sign, dot.abs())
        };

        if !range.contains(dist) {
            return None;
        }

        Some((dir, dist))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Disk-torus gravity.

/// Which rim exclusion a disk-torus permits. `Inside` allows falling only
/// from inside the inner radius, `Outside` only from outside the outer
/// radius; the names refer to the permitted exclusion zone, not the query
/// point's position.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum DiskTorusEdgeType {
    None,
    Inside,
    Outside,
    Both,
}

/// Gravity toward an annular band. The band itself pulls along the disk
/// normal; the hole pulls toward the inner rim and the exterior pulls toward
/// the outer rim, each gated by the edge type.
#[derive(Clone, Debug)]
pub struct DiskTorusGravity {
    both_side: bool,
    edge_type: DiskTorusEdgeType,
    disk_radius: f32,
    radius: f32,
    position: Point3<f32>,
    direction: Vector3<f32>,
    world_radius: f32,
    world_position: Point3<f32>,
    world_direction: Vector3<f32>,
}

impl DiskTorusGravity {
    pub fn new(position: Point3<f32>, direction: Vector3<f32>) -> Self {
        DiskTorusGravity {
            both_side: false,
            edge_type: DiskTorusEdgeType::Both,
            disk_radius: 0.0,
            radius: 2000.0,
            position,
            direction: normalize_or_zero(direction),
            world_radius: 2000.0,
            world_position: position,
            world_direction: Vector3::new(0.0, 1.0, 0.0),
        }
    }

    pub fn set_both_side(&mut self, v: bool) {
        self.both_side = v;
    }

    pub fn set_edge_type(&mut self, v: DiskTorusEdgeType) {
        self.edge_type = v;
    }

    pub fn set_disk_radius(&mut self, v: f32) {
        self.disk_radius = v;
    }

    pub fn set_radius(&mut self, v: f32) {
        self.radius = v;
    }

    pub fn set_position(&mut self, v: Point3<f32>) {
        self.position = v;
    }

    pub fn set_direction(&mut self, v: Vector3<f32>) {
        self.direction = normalize_or_zero(v);
    }

    pub(crate) fn update_mtx(&mut self) {
        self.world_position = self.position;
        let length = self.direction.magnitude();
        self.world_direction = normalize_or_zero(self.direction);
        self.world_radius = self.radius * length;
    }

    pub fn calc_own_gravity_vector(
        &self,
        coord: Point3<f32>,
        range: RangeTest,
    ) -> Option<(Vector3<f32>, f32)> {
        let local = coord - self.world_position;
        let dot = local.dot(self.world_direction);

        // Wrong side.
        if dot < 0.0 && !self.both_side {
            return None;
        }

        let radial = local - self.world_direction * dot;
        let length = radial.magnitude();
        let mut radial_dir = normalize_or_zero(radial);

        // On the axis every radial direction is as good as any other.
        if is_near_zero(length, GRAVITY_EPSILON) {
            radial_dir = make_axis_vertical_zx(self.world_direction);
        }

        let (dir, dist) = if length >= self.world_radius {
            if self.edge_type == DiskTorusEdgeType::None || self.edge_type == DiskTorusEdgeType::Inside {
                return None;
            }
            let target = self.world_position + radial_dir * self.world_radius;
            let delta = target - coord;
            let dist = delta.magnitude();
            (normalize_or_zero(delta), dist)
        } else if length >= self.world_radius - self.disk_radius {
            let dir = if dot >= 0.0 {
                -self.world_direction
            } else {
                self.world_direction
            };
            (dir, dot.abs())
        } else {
            if self.edge_type == DiskTorusEdgeType::None || self.edge_type == DiskTorusEdgeType::Outside {
                return None;
            }
            let target = self.world_position + radial_dir * (self.world_radius - self.disk_radius);
            let delta = target - coord;
            let dist = delta.magnitude();
            (normalize_or_zero(delta), dist)
        };

        if !range.contains(dist) {
            return None;
        }

        Some((dir, dist))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Cone gravity.

/// Gravity toward a cone (optionally a frustum via a top cut). The space
/// above the base plane projects onto the slanted surface line; the space
/// below pulls toward the base circle. Points exactly on a surface report a
/// zero distance with a well-defined direction.
#[derive(Clone, Debug)]
pub struct ConeGravity {
    enable_bottom: bool,
    top_cut_rate: f32,
    mtx: Matrix4<f32>,
    mag_x: f32,
}

impl ConeGravity {
    pub fn new(mtx: Matrix4<f32>) -> Self {
        ConeGravity {
            enable_bottom: false,
            top_cut_rate: 0.0,
            mtx,
            mag_x: 0.0,
        }
    }

    pub fn set_enable_bottom(&mut self, v: bool) {
        self.enable_bottom = v;
    }

    pub fn enable_bottom(&self) -> bool {
        self.enable_bottom
    }

    pub fn set_top_cut_rate(&mut self, v: f32) {
        self.top_cut_rate = v;
    }

    pub fn set_local_matrix(&mut self, m: Matrix4<f32>) {
        self.mtx = m;
    }

    pub(crate) fn update_mtx(&mut self) {
        self.mag_x = matrix_axis_x(&self.mtx).magnitude();
    }

    pub fn calc_own_gravity_vector(
        &self,
        coord: Point3<f32>,
        range: RangeTest,
    ) -> Option<(Vector3<f32>, f32)> {
        let axis_y = matrix_axis_y(&self.mtx);
        let height = axis_y.magnitude();
        let axis = normalize_or_zero(axis_y);

        let origin = matrix_translation(&self.mtx);
        let (radial, dot) = vec_kill_element(coord - origin, axis);

        if is_near_zero_vec3(radial, GRAVITY_EPSILON) {
            // Exactly on the axis; fall straight along it, toward whichever
            // end is nearer.
            let mut dist = dot.abs();
            if dot > 0.0 {
                dist = (dist - lerp(0.0, height, self.top_cut_rate)).max(0.0);
            }
            return if range.contains(dist) {
                let dir = axis * if dot > 0.0 { -1.0 } else { 1.0 };
                Some((dir, dist))
            } else {
                None
            };
        }

        let radial_dist = radial.magnitude();
        let top = origin + axis * height;
        // Base rim point on the same side as the query point.
        let rim = origin + radial * (self.mag_x / radial_dist);

        if dot >= 0.0 {
            let mut top_pt = top;

            if self.top_cut_rate >= 0.01 {
                // Frustum: the tip becomes a circle located `rate` of the way
                // down the slant line.
                top_pt = top + (rim - top) * self.top_cut_rate;

                let circle_center = origin + axis * lerp(height, 0.0, self.top_cut_rate);
                let outward = top_pt - circle_center;
                let past_rim = coord - top_pt;

                if outward.dot(past_rim) <= 0.0 {
                    // Over the flat top surface.
                    let dist = axis.dot(coord - circle_center).max(0.0);
                    return if range.contains(dist) {
                        Some((-axis, dist))
                    } else {
                        None
                    };
                }
            }

            let foot = perpendic_foot_to_line_inside(coord, top_pt, rim);
            if !is_near_zero(foot.distance2(coord), GRAVITY_EPSILON) {
                if !is_near_zero(height, GRAVITY_EPSILON)
                    && !is_near_zero(self.mag_x, GRAVITY_EPSILON)
                    && radial_dist < self.mag_x - dot * (self.mag_x / height)
                {
                    // Inside the cone volume; push out through the surface.
                    Some((normalize_or_zero(coord - foot), 0.0))
                } else {
                    gravity_toward(coord, foot, range)
                }
            } else {
                // On the slant surface itself; aim at the axis line.
                let slant = normalize_or_zero(top_pt - rim);
                let (toward_axis, _) = vec_kill_element(-radial, slant);
                if !is_near_zero_vec3(toward_axis, GRAVITY_EPSILON) {
                    Some((normalize_or_zero(toward_axis), 0.0))
                } else {
                    Some((-axis, 0.0))
                }
            }
        } else {
            // Below the base plane. The bottom influence is always applied;
            // the configured enable_bottom flag is carried for identity but
            // does not gate this branch.
            let foot = perpendic_foot_to_line_inside(coord, origin, rim);
            if !is_near_zero(foot.distance2(coord), GRAVITY_EPSILON) {
                gravity_toward(coord, foot, range)
            } else {
                Some((-axis, 0.0))
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Wire gravity.

/// Gravity toward the closest point on a polyline.
#[derive(Clone, Debug)]
pub struct WireGravity {
    pub points: SmallVec<[Point3<f32>; 8]>,
}

impl WireGravity {
    pub fn new() -> Self {
        WireGravity {
            points: SmallVec::new(),
        }
    }

    pub fn add_point(&mut self, point: Point3<f32>) {
        self.points.push(point);
    }

    pub fn calc_own_gravity_vector(
        &self,
        coord: Point3<f32>,
        range: RangeTest,
    ) -> Option<(Vector3<f32>, f32)> {
        let mut best: Option<(Point3<f32>, f32)> = None;

        for pair in self.points.windows(2) {
            let foot = perpendic_foot_to_line_inside(coord, pair[0], pair[1]);
            let sq_dist = foot.distance2(coord);
            if best.map_or(true, |(_, best_sq)| sq_dist < best_sq) {
                best = Some((foot, sq_dist));
            }
        }

        let (foot, sq_dist) = best?;
        if !range.contains_squared(sq_dist) {
            return None;
        }

        let delta = foot - coord;
        let dist = delta.magnitude();
        Some((normalize_or_zero(delta), dist))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Shape dispatch.

/// The closed set of gravity shapes. Dispatch is a match rather than a trait
/// object; the shape set is fixed and call sites benefit from exhaustiveness
/// checking.
#[derive(Clone, Debug)]
pub enum GravityShape {
    Parallel(ParallelGravity),
    Cube(CubeGravity),
    Point(PointGravity),
    Segment(SegmentGravity),
    Disk(DiskGravity),
    DiskTorus(DiskTorusGravity),
    Cone(ConeGravity),
    Wire(WireGravity),
}

impl GravityShape {
    /// Computes the unit pull direction and raw distance from `coord` toward
    /// this shape, or `None` when the point is outside its influence.
    pub fn calc_own_gravity_vector(
        &self,
        coord: Point3<f32>,
        range: RangeTest,
    ) -> Option<(Vector3<f32>, f32)> {
        match self {
            GravityShape::Parallel(g) => g.calc_own_gravity_vector(coord, range),
            GravityShape::Cube(g) => g.calc_own_gravity_vector(coord, range),
            GravityShape::Point(g) => g.calc_own_gravity_vector(coord, range),
            GravityShape::Segment(g) => g.calc_own_gravity_vector(coord, range),
            GravityShape::Disk(g) => g.calc_own_gravity_vector(coord, range),
            GravityShape::DiskTorus(g) => g.calc_own_gravity_vector(coord, range),
            GravityShape::Cone(g) => g.calc_own_gravity_vector(coord, range),
            GravityShape::Wire(g) => g.calc_own_gravity_vector(coord, range),
        }
    }

    /// Recomputes the derived extents and local frames. Called once when the
    /// source's geometry is committed; evaluators assume it has run.
    pub(crate) fn update_mtx(&mut self) {
        match self {
            GravityShape::Parallel(g) => g.update_mtx(),
            GravityShape::Cube(g) => g.update_mtx(),
            GravityShape::Segment(g) => g.update_mtx(),
            GravityShape::Disk(g) => g.update_mtx(),
            GravityShape::DiskTorus(g) => g.update_mtx(),
            GravityShape::Cone(g) => g.update_mtx(),
            GravityShape::Point(_) | GravityShape::Wire(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, Matrix4, Point3, Vector3};

    use crate::math::model_matrix_srt;
    use crate::shape::*;

    const UNBOUNDED: RangeTest = RangeTest {
        range: -1.0,
        distant: 0.0,
    };

    fn cube_mtx(half_extent: f32) -> Matrix4<f32> {
        model_matrix_srt(
            Vector3::new(half_extent, half_extent, half_extent),
            Vector3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
        )
    }

    mod parallel {
        use approx::assert_relative_eq;

        use super::*;

        #[test]
        fn test_sphere_range() {
            let g = ParallelGravity::new(Vector3::unit_y(), Point3::new(0.0, 0.0, 0.0));
            let bounded = RangeTest {
                range: 1000.0,
                distant: 0.0,
            };

            let (dir, dist) = g
                .calc_own_gravity_vector(Point3::new(0.0, 500.0, 0.0), bounded)
                .unwrap();
            assert_eq!(dir, Vector3::new(0.0, -1.0, 0.0));
            assert_eq!(dist, 2000.0);

            assert!(g
                .calc_own_gravity_vector(Point3::new(0.0, 2000.0, 0.0), bounded)
                .is_none());
            // Unbounded range always applies.
            assert!(g
                .calc_own_gravity_vector(Point3::new(0.0, 1.0e7, 0.0), UNBOUNDED)
                .is_some());
        }

        #[test]
        fn test_box_range() {
            let mut g = ParallelGravity::new(Vector3::unit_y(), Point3::new(0.0, 0.0, 0.0));
            g.set_range_type(ParallelRangeType::Box);
            g.set_range_box(cube_mtx(100.0));
            g.set_base_distance(2000.0);
            g.update_mtx();

            let (_, dist) = g
                .calc_own_gravity_vector(Point3::new(50.0, 0.0, 0.0), UNBOUNDED)
                .unwrap();
            assert_eq!(dist, 2000.0);
            assert!(g
                .calc_own_gravity_vector(Point3::new(150.0, 0.0, 0.0), UNBOUNDED)
                .is_none());
            assert!(g
                .calc_own_gravity_vector(Point3::new(0.0, 0.0, -150.0), UNBOUNDED)
                .is_none());
        }

        #[test]
        fn test_box_distance_calc_bias() {
            let mut g = ParallelGravity::new(Vector3::unit_y(), Point3::new(0.0, 0.0, 0.0));
            g.set_range_type(ParallelRangeType::Box);
            g.set_range_box(cube_mtx(100.0));
            g.set_base_distance(2000.0);
            g.set_distance_calc(ParallelDistanceCalc::X);
            g.update_mtx();

            let (_, dist) = g
                .calc_own_gravity_vector(Point3::new(50.0, 0.0, 0.0), UNBOUNDED)
                .unwrap();
            assert_relative_eq!(dist, 2050.0, epsilon = 1e-2);
        }

        #[test]
        fn test_cylinder_range() {
            let mut g = ParallelGravity::new(Vector3::unit_y(), Point3::new(0.0, 0.0, 0.0));
            g.set_range_type(ParallelRangeType::Cylinder);
            g.set_range_cylinder(500.0, 1000.0);
            g.set_base_distance(2000.0);
            g.update_mtx();

            let (dir, dist) = g
                .calc_own_gravity_vector(Point3::new(100.0, 500.0, 0.0), UNBOUNDED)
                .unwrap();
            assert_eq!(dir, Vector3::new(0.0, -1.0, 0.0));
            assert_relative_eq!(dist, 2100.0, epsilon = 1e-2);

            // Below the plane or past the radius is outside.
            assert!(g
                .calc_own_gravity_vector(Point3::new(0.0, -1.0, 0.0), UNBOUNDED)
                .is_none());
            assert!(g
                .calc_own_gravity_vector(Point3::new(600.0, 500.0, 0.0), UNBOUNDED)
                .is_none());
        }
    }

    mod cube {
        use approx::assert_relative_eq;

        use super::*;

        #[test]
        fn test_face_region() {
            let mut g = CubeGravity::new(cube_mtx(100.0));
            g.update_mtx();

            let (dir, dist) = g
                .calc_own_gravity_vector(Point3::new(250.0, 0.0, 0.0), UNBOUNDED)
                .unwrap();
            assert_relative_eq!(dir, Vector3::new(-1.0, 0.0, 0.0), epsilon = 1e-5);
            assert_relative_eq!(dist, 150.0, epsilon = 1e-3);
        }

        #[test]
        fn test_edge_region() {
            let mut g = CubeGravity::new(cube_mtx(100.0));
            g.update_mtx();

            let (dir, dist) = g
                .calc_own_gravity_vector(Point3::new(250.0, 250.0, 0.0), UNBOUNDED)
                .unwrap();
            let inv_sqrt2 = 1.0 / 2.0_f32.sqrt();
            assert_relative_eq!(dir, Vector3::new(-inv_sqrt2, -inv_sqrt2, 0.0), epsilon = 1e-5);
            assert_relative_eq!(dist, 150.0 * 2.0_f32.sqrt(), epsilon = 1e-2);
        }

        #[test]
        fn test_corner_region() {
            let mut g = CubeGravity::new(cube_mtx(100.0));
            g.update_mtx();

            let (dir, dist) = g
                .calc_own_gravity_vector(Point3::new(250.0, 250.0, 250.0), UNBOUNDED)
                .unwrap();
            let inv_sqrt3 = 1.0 / 3.0_f32.sqrt();
            assert_relative_eq!(
                dir,
                Vector3::new(-inv_sqrt3, -inv_sqrt3, -inv_sqrt3),
                epsilon = 1e-5
            );
            assert_relative_eq!(dist, 150.0 * 3.0_f32.sqrt(), epsilon = 1e-2);
        }

        #[test]
        fn test_region_totality() {
            let mut g = CubeGravity::new(cube_mtx(100.0));
            g.update_mtx();

            // Every outer region yields a unit direction and a non-negative
            // distance; the all-inside region yields nothing.
            for sx in -1..=1 {
                for sy in -1..=1 {
                    for sz in -1..=1 {
                        let p = Point3::new(
                            sx as f32 * 250.0,
                            sy as f32 * 250.0,
                            sz as f32 * 250.0,
                        );
                        let result = g.calc_own_gravity_vector(p, UNBOUNDED);
                        if sx == 0 && sy == 0 && sz == 0 {
                            assert!(result.is_none());
                        } else {
                            let (dir, dist) = result.unwrap();
                            assert!((dir.magnitude() - 1.0).abs() < 1e-5);
                            assert!(dist >= 0.0);
                        }
                    }
                }
            }
        }

        #[test]
        fn test_disabled_face_rejects_touching_regions() {
            let mut g = CubeGravity::new(cube_mtx(100.0));
            g.valid_faces = CubeFaces::X_LEFT
                | CubeFaces::Y_RIGHT
                | CubeFaces::Y_LEFT
                | CubeFaces::Z_RIGHT
                | CubeFaces::Z_LEFT;
            g.update_mtx();

            // All nine regions on the +X side are gone.
            for sy in -1..=1 {
                for sz in -1..=1 {
                    let p = Point3::new(250.0, sy as f32 * 250.0, sz as f32 * 250.0);
                    assert!(g.calc_own_gravity_vector(p, UNBOUNDED).is_none());
                }
            }
            // The -X face still works.
            assert!(g
                .calc_own_gravity_vector(Point3::new(-250.0, 0.0, 0.0), UNBOUNDED)
                .is_some());
        }

        #[test]
        fn test_range_excludes_far_points() {
            let mut g = CubeGravity::new(cube_mtx(100.0));
            g.update_mtx();
            let bounded = RangeTest {
                range: 100.0,
                distant: 0.0,
            };
            assert!(g
                .calc_own_gravity_vector(Point3::new(250.0, 0.0, 0.0), bounded)
                .is_none());
            assert!(g
                .calc_own_gravity_vector(Point3::new(150.0, 0.0, 0.0), bounded)
                .is_some());
        }
    }

    mod point {
        use super::*;

        #[test]
        fn test_direction_and_range() {
            let g = PointGravity::new(Point3::new(0.0, 0.0, 0.0));
            let (dir, dist) = g
                .calc_own_gravity_vector(Point3::new(0.0, 100.0, 0.0), UNBOUNDED)
                .unwrap();
            assert_eq!(dir, Vector3::new(0.0, -1.0, 0.0));
            assert_eq!(dist, 100.0);

            let bounded = RangeTest {
                range: 50.0,
                distant: 0.0,
            };
            assert!(g
                .calc_own_gravity_vector(Point3::new(0.0, 100.0, 0.0), bounded)
                .is_none());
            // distant extends the tested range.
            let extended = RangeTest {
                range: 50.0,
                distant: 60.0,
            };
            assert!(g
                .calc_own_gravity_vector(Point3::new(0.0, 100.0, 0.0), extended)
                .is_some());
        }
    }

    mod segment {
        use approx::assert_relative_eq;

        use super::*;

        fn vertical_segment() -> SegmentGravity {
            let mut g = SegmentGravity::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 1000.0, 0.0));
            g.set_side_vector(Vector3::unit_x());
            g.update_mtx();
            g
        }

        #[test]
        fn test_perpendicular_foot() {
            let g = vertical_segment();
            let (dir, dist) = g
                .calc_own_gravity_vector(Point3::new(300.0, 500.0, 0.0), UNBOUNDED)
                .unwrap();
            assert_relative_eq!(dir, Vector3::new(-1.0, 0.0, 0.0), epsilon = 1e-5);
            assert_relative_eq!(dist, 300.0, epsilon = 1e-3);
        }

        #[test]
        fn test_endpoint_clamp_and_validity() {
            let mut g = vertical_segment();
            let (dir, dist) = g
                .calc_own_gravity_vector(Point3::new(0.0, 1200.0, 0.0), UNBOUNDED)
                .unwrap();
            assert_relative_eq!(dir, Vector3::new(0.0, -1.0, 0.0), epsilon = 1e-5);
            assert_relative_eq!(dist, 200.0, epsilon = 1e-3);

            g.set_edge_valid(1, false);
            assert!(g
                .calc_own_gravity_vector(Point3::new(0.0, 1200.0, 0.0), UNBOUNDED)
                .is_none());

            g.set_edge_valid(0, false);
            assert!(g
                .calc_own_gravity_vector(Point3::new(0.0, -200.0, 0.0), UNBOUNDED)
                .is_none());
        }

        #[test]
        fn test_side_angle_window() {
            let mut g = vertical_segment();
            g.set_valid_side_degree(180.0);
            g.update_mtx();

            // The 90 degree half-swing about the segment moves the window
            // toward -Z; +Z points are outside it.
            assert!(g
                .calc_own_gravity_vector(Point3::new(0.0, 500.0, 300.0), UNBOUNDED)
                .is_none());
            assert!(g
                .calc_own_gravity_vector(Point3::new(0.0, 500.0, -300.0), UNBOUNDED)
                .is_some());
        }
    }

    mod disk {
        use approx::assert_relative_eq;

        use super::*;

        fn flat_disk() -> DiskGravity {
            let mut g = DiskGravity::new(Point3::new(0.0, 0.0, 0.0), Vector3::unit_y());
            g.set_side_direction(Vector3::unit_x());
            g.set_radius(300.0);
            g.update_mtx();
            g
        }

        #[test]
        fn test_pull_along_normal() {
            let g = flat_disk();
            let (dir, dist) = g
                .calc_own_gravity_vector(Point3::new(100.0, 50.0, 0.0), UNBOUNDED)
                .unwrap();
            assert_relative_eq!(dir, Vector3::new(0.0, -1.0, 0.0), epsilon = 1e-5);
            assert_relative_eq!(dist, 50.0, epsilon = 1e-3);
        }

        #[test]
        fn test_back_side_gated_by_both_side() {
            let mut g = flat_disk();
            assert!(g
                .calc_own_gravity_vector(Point3::new(100.0, -50.0, 0.0), UNBOUNDED)
                .is_none());

            g.set_both_side(true);
            g.update_mtx();
            let (dir, dist) = g
                .calc_own_gravity_vector(Point3::new(100.0, -50.0, 0.0), UNBOUNDED)
                .unwrap();
            assert_relative_eq!(dir, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-5);
            assert_relative_eq!(dist, 50.0, epsilon = 1e-3);
        }

        #[test]
        fn test_edge_gravity_past_rim() {
            let mut g = flat_disk();
            assert!(g
                .calc_own_gravity_vector(Point3::new(400.0, 50.0, 0.0), UNBOUNDED)
                .is_none());

            g.set_enable_edge_gravity(true);
            g.update_mtx();
            let (dir, dist) = g
                .calc_own_gravity_vector(Point3::new(400.0, 50.0, 0.0), UNBOUNDED)
                .unwrap();
            // Toward the rim point (300, 0, 0).
            let expected = Vector3::new(-100.0, -50.0, 0.0).normalize();
            assert_relative_eq!(dir, expected, epsilon = 1e-5);
            assert_relative_eq!(dist, (100.0_f32 * 100.0 + 50.0 * 50.0).sqrt(), epsilon = 1e-2);
        }
    }

    mod disk_torus {
        use approx::assert_relative_eq;

        use super::*;

        fn band() -> DiskTorusGravity {
            let mut g = DiskTorusGravity::new(Point3::new(0.0, 0.0, 0.0), Vector3::unit_y());
            g.set_radius(2000.0);
            g.set_disk_radius(500.0);
            g.set_edge_type(DiskTorusEdgeType::Both);
            g.update_mtx();
            g
        }

        #[test]
        fn test_band_pulls_along_normal() {
            let g = band();
            let (dir, dist) = g
                .calc_own_gravity_vector(Point3::new(1750.0, 300.0, 0.0), UNBOUNDED)
                .unwrap();
            assert_relative_eq!(dir, Vector3::new(0.0, -1.0, 0.0), epsilon = 1e-5);
            assert_relative_eq!(dist, 300.0, epsilon = 1e-3);
        }

        #[test]
        fn test_outside_pulls_toward_outer_rim() {
            let g = band();
            let (dir, dist) = g
                .calc_own_gravity_vector(Point3::new(2500.0, 0.0, 0.0), UNBOUNDED)
                .unwrap();
            assert_relative_eq!(dir, Vector3::new(-1.0, 0.0, 0.0), epsilon = 1e-5);
            assert_relative_eq!(dist, 500.0, epsilon = 1e-3);
        }

        #[test]
        fn test_hole_pulls_toward_inner_rim() {
            let g = band();
            let (dir, dist) = g
                .calc_own_gravity_vector(Point3::new(1000.0, 0.0, 0.0), UNBOUNDED)
                .unwrap();
            assert_relative_eq!(dir, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
            assert_relative_eq!(dist, 500.0, epsilon = 1e-3);
        }

        #[test]
        fn test_edge_type_gates_exclusion_zones() {
            let mut g = band();

            // Inside permits only the inner exclusion: the hole works, the
            // exterior does not.
            g.set_edge_type(DiskTorusEdgeType::Inside);
            assert!(g
                .calc_own_gravity_vector(Point3::new(2500.0, 0.0, 0.0), UNBOUNDED)
                .is_none());
            assert!(g
                .calc_own_gravity_vector(Point3::new(1000.0, 0.0, 0.0), UNBOUNDED)
                .is_some());

            g.set_edge_type(DiskTorusEdgeType::Outside);
            assert!(g
                .calc_own_gravity_vector(Point3::new(2500.0, 0.0, 0.0), UNBOUNDED)
                .is_some());
            assert!(g
                .calc_own_gravity_vector(Point3::new(1000.0, 0.0, 0.0), UNBOUNDED)
                .is_none());

            g.set_edge_type(DiskTorusEdgeType::None);
            assert!(g
                .calc_own_gravity_vector(Point3::new(2500.0, 0.0, 0.0), UNBOUNDED)
                .is_none());
            assert!(g
                .calc_own_gravity_vector(Point3::new(1000.0, 0.0, 0.0), UNBOUNDED)
                .is_none());
        }

        #[test]
        fn test_on_axis_direction_is_well_defined() {
            let g = band();
            let (dir, _) = g
                .calc_own_gravity_vector(Point3::new(0.0, 100.0, 0.0), UNBOUNDED)
                .unwrap();
            assert!((dir.magnitude() - 1.0).abs() < 1e-5);
            assert!(!dir.x.is_nan() && !dir.y.is_nan() && !dir.z.is_nan());
        }
    }

    mod cone {
        use approx::assert_relative_eq;

        use super::*;

        fn cone() -> ConeGravity {
            // Base radius 100, height 200.
            let mut g = ConeGravity::new(model_matrix_srt(
                Vector3::new(100.0, 200.0, 100.0),
                Vector3::new(0.0, 0.0, 0.0),
                Point3::new(0.0, 0.0, 0.0),
            ));
            g.update_mtx();
            g
        }

        #[test]
        fn test_on_axis_above_and_below() {
            let g = cone();
            let (dir, dist) = g
                .calc_own_gravity_vector(Point3::new(0.0, 300.0, 0.0), UNBOUNDED)
                .unwrap();
            assert_relative_eq!(dir, Vector3::new(0.0, -1.0, 0.0), epsilon = 1e-5);
            assert_relative_eq!(dist, 300.0, epsilon = 1e-3);

            let (dir, dist) = g
                .calc_own_gravity_vector(Point3::new(0.0, -50.0, 0.0), UNBOUNDED)
                .unwrap();
            assert_relative_eq!(dir, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-5);
            assert_relative_eq!(dist, 50.0, epsilon = 1e-3);
        }

        #[test]
        fn test_side_pulls_toward_base_rim() {
            let g = cone();
            let (dir, dist) = g
                .calc_own_gravity_vector(Point3::new(300.0, 0.0, 0.0), UNBOUNDED)
                .unwrap();
            assert_relative_eq!(dir, Vector3::new(-1.0, 0.0, 0.0), epsilon = 1e-4);
            assert_relative_eq!(dist, 200.0, epsilon = 1e-2);
        }

        #[test]
        fn test_below_base_pulls_toward_base_circle() {
            let g = cone();
            let (dir, dist) = g
                .calc_own_gravity_vector(Point3::new(300.0, -100.0, 0.0), UNBOUNDED)
                .unwrap();
            let expected = Vector3::new(-200.0, 100.0, 0.0).normalize();
            assert_relative_eq!(dir, expected, epsilon = 1e-4);
            assert_relative_eq!(dist, (200.0_f32 * 200.0 + 100.0 * 100.0).sqrt(), epsilon = 1e-2);
        }

        #[test]
        fn test_top_cut_flat_surface() {
            let mut g = cone();
            g.set_top_cut_rate(0.5);
            g.update_mtx();

            // Above the frustum's flat top, inside its footprint.
            let (dir, dist) = g
                .calc_own_gravity_vector(Point3::new(30.0, 300.0, 0.0), UNBOUNDED)
                .unwrap();
            assert_relative_eq!(dir, Vector3::new(0.0, -1.0, 0.0), epsilon = 1e-5);
            assert_relative_eq!(dist, 200.0, epsilon = 1e-2);
        }

        #[test]
        fn test_top_cut_shortens_axis_distance() {
            let mut g = cone();
            g.set_top_cut_rate(0.5);
            g.update_mtx();

            // On the axis above the cut plane (height 200, cut at 100).
            let (dir, dist) = g
                .calc_own_gravity_vector(Point3::new(0.0, 300.0, 0.0), UNBOUNDED)
                .unwrap();
            assert_relative_eq!(dir, Vector3::new(0.0, -1.0, 0.0), epsilon = 1e-5);
            assert_relative_eq!(dist, 200.0, epsilon = 1e-3);
        }
    }

    mod wire {
        use approx::assert_relative_eq;

        use super::*;

        fn bent_wire() -> WireGravity {
            let mut g = WireGravity::new();
            g.add_point(Point3::new(0.0, 0.0, 0.0));
            g.add_point(Point3::new(1000.0, 0.0, 0.0));
            g.add_point(Point3::new(1000.0, 1000.0, 0.0));
            g
        }

        #[test]
        fn test_closest_segment_wins() {
            let g = bent_wire();
            let (dir, dist) = g
                .calc_own_gravity_vector(Point3::new(500.0, 200.0, 0.0), UNBOUNDED)
                .unwrap();
            assert_relative_eq!(dir, Vector3::new(0.0, -1.0, 0.0), epsilon = 1e-5);
            assert_relative_eq!(dist, 200.0, epsilon = 1e-3);

            let (dir, _) = g
                .calc_own_gravity_vector(Point3::new(1200.0, 500.0, 0.0), UNBOUNDED)
                .unwrap();
            assert_relative_eq!(dir, Vector3::new(-1.0, 0.0, 0.0), epsilon = 1e-5);
        }

        #[test]
        fn test_squared_range_test() {
            let g = bent_wire();
            let bounded = RangeTest {
                range: 100.0,
                distant: 0.0,
            };
            assert!(g
                .calc_own_gravity_vector(Point3::new(500.0, 200.0, 0.0), bounded)
                .is_none());
            assert!(g
                .calc_own_gravity_vector(Point3::new(500.0, 50.0, 0.0), bounded)
                .is_some());
        }

        #[test]
        fn test_empty_and_single_point_wire() {
            let g = WireGravity::new();
            assert!(g
                .calc_own_gravity_vector(Point3::new(0.0, 0.0, 0.0), UNBOUNDED)
                .is_none());

            let mut g = WireGravity::new();
            g.add_point(Point3::new(0.0, 0.0, 0.0));
            // One point means no segments.
            assert!(g
                .calc_own_gravity_vector(Point3::new(10.0, 0.0, 0.0), UNBOUNDED)
                .is_none());
        }
    }
}
