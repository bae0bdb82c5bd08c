//! Euler rotations in degrees and the constant-speed interpolation shared by
//! every motion source.
//!
//! The world is Y-up and a zero rotator faces +X. Yaw turns about +Y, pitch
//! lifts the nose toward +Y and roll spins about the facing axis.

use bevy::prelude::{Quat, Reflect, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Lengths below this are treated as "no direction".
pub const KINDA_SMALL_NUMBER: f32 = 1.0e-4;

/// Pitch/yaw/roll in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Reflect, Serialize, Deserialize)]
pub struct Rotator {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl Rotator {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Heading that looks along `direction`, with zero roll.
    ///
    /// A degenerate direction yields [`Rotator::ZERO`].
    pub fn from_direction(direction: Vec3) -> Self {
        if direction.length_squared() < KINDA_SMALL_NUMBER * KINDA_SMALL_NUMBER {
            return Self::ZERO;
        }
        let horizontal = Vec2::new(direction.x, direction.z).length();
        Self {
            pitch: direction.y.atan2(horizontal).to_degrees(),
            yaw: (-direction.z).atan2(direction.x).to_degrees(),
            roll: 0.0,
        }
    }

    pub fn from_quat(rotation: Quat) -> Self {
        let mut rotator = Self::from_direction(rotation * Vec3::X);
        let heading = Self::new(rotator.pitch, rotator.yaw, 0.0).to_quat();
        let twist = heading.inverse() * rotation;
        rotator.roll = normalize_axis((2.0 * twist.x.atan2(twist.w)).to_degrees());
        rotator
    }

    pub fn to_quat(&self) -> Quat {
        Quat::from_rotation_y(self.yaw.to_radians())
            * Quat::from_rotation_z(self.pitch.to_radians())
            * Quat::from_rotation_x(self.roll.to_radians())
    }

    /// Unit facing vector.
    pub fn direction(&self) -> Vec3 {
        let (sin_pitch, cos_pitch) = self.pitch.to_radians().sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.to_radians().sin_cos();
        Vec3::new(cos_pitch * cos_yaw, sin_pitch, -cos_pitch * sin_yaw)
    }

    /// Every axis wrapped into `(-180, 180]`.
    pub fn normalized(&self) -> Self {
        Self::new(
            normalize_axis(self.pitch),
            normalize_axis(self.yaw),
            normalize_axis(self.roll),
        )
    }

    pub fn is_nearly_equal(&self, other: &Rotator, tolerance: f32) -> bool {
        normalize_axis(self.pitch - other.pitch).abs() <= tolerance
            && normalize_axis(self.yaw - other.yaw).abs() <= tolerance
            && normalize_axis(self.roll - other.roll).abs() <= tolerance
    }

    /// Moves each axis toward `target` along the shortest arc at a constant
    /// `speed` in degrees per second.
    ///
    /// No axis moves more than `speed * delta_time` degrees, the result lands
    /// exactly on the normalized target once it is within reach, and nothing
    /// moves when `delta_time` or `speed` is not positive.
    pub fn interp_constant_to(self, target: Rotator, delta_time: f32, speed: f32) -> Self {
        if delta_time <= 0.0 || speed <= 0.0 {
            return self;
        }
        let max_step = speed * delta_time;
        Self::new(
            step_axis(self.pitch, target.pitch, max_step),
            step_axis(self.yaw, target.yaw, max_step),
            step_axis(self.roll, target.roll, max_step),
        )
    }
}

impl std::ops::Add for Rotator {
    type Output = Rotator;

    fn add(self, rhs: Rotator) -> Rotator {
        Rotator::new(self.pitch + rhs.pitch, self.yaw + rhs.yaw, self.roll + rhs.roll)
    }
}

/// Wraps an angle in degrees into `(-180, 180]`.
pub fn normalize_axis(angle: f32) -> f32 {
    let mut angle = angle % 360.0;
    if angle > 180.0 {
        angle -= 360.0;
    } else if angle <= -180.0 {
        angle += 360.0;
    }
    angle
}

fn step_axis(current: f32, target: f32, max_step: f32) -> f32 {
    let delta = normalize_axis(target - current);
    if delta.abs() <= max_step {
        normalize_axis(target)
    } else {
        normalize_axis(current + delta.signum() * max_step)
    }
}

/// Turns heading `from` toward `to` by at most `max_delta` radians.
///
/// Angular differences at or below `tolerance` keep the current heading so
/// near-zero inputs do not make the result jitter. Returns a unit vector,
/// except when either input is degenerate, in which case `from` is returned
/// untouched.
pub fn rotate_toward(from: Vec3, to: Vec3, tolerance: f32, max_delta: f32) -> Vec3 {
    let (Some(from_dir), Some(to_dir)) = (from.try_normalize(), to.try_normalize()) else {
        return from;
    };
    let angle = from_dir.angle_between(to_dir);
    if angle <= tolerance || max_delta <= 0.0 {
        return from_dir;
    }
    if angle <= max_delta {
        return to_dir;
    }
    let arc = Quat::from_rotation_arc(from_dir, to_dir);
    (Quat::IDENTITY.slerp(arc, max_delta / angle) * from_dir).normalize()
}
