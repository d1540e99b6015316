//! Conversions between glam types and rapier/nalgebra types

use glam::{Quat, Vec3};
use nalgebra::{Quaternion, Translation3, UnitQuaternion};
use possession_core::Pose;
use rapier3d::prelude::{Isometry, Point, Real, Rotation, Vector};

pub fn vector(v: Vec3) -> Vector<Real> {
    Vector::new(v.x, v.y, v.z)
}

pub fn point(v: Vec3) -> Point<Real> {
    Point::new(v.x, v.y, v.z)
}

pub fn rotation(q: Quat) -> Rotation<Real> {
    UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

pub fn vec3(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub fn quat(r: &Rotation<Real>) -> Quat {
    Quat::from_xyzw(r.i, r.j, r.k, r.w)
}

pub fn isometry(pose: &Pose) -> Isometry<Real> {
    let p = pose.position;
    Isometry::from_parts(Translation3::new(p.x, p.y, p.z), rotation(pose.rotation()))
}

pub fn pose(iso: &Isometry<Real>) -> Pose {
    Pose::from_position_rotation(vec3(&iso.translation.vector), quat(&iso.rotation))
}
