//! Per-variant motion synthesis.
//!
//! Every variant produces motion per simulated second, then stretches the
//! translation by `simulation_time / tick_time` so catch-up replays that cover
//! several simulated seconds in one tick still travel the right distance.

use bevy::prelude::{Quat, Vec3};

use super::{
    BreachArc, BreachRise, ForwardForce, HEADING_TOLERANCE, MIN_HEADING_SPEED, MotionSource,
    MotionVariant, ProxyPolicy,
};
use crate::collaborator::{CharacterActor, MovementSnapshot};
use crate::rotator::{KINDA_SMALL_NUMBER, Rotator, rotate_toward};

const SMALL_NUMBER: f32 = 1.0e-8;

/// Translation and rotation delta contributed by one source for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootMotion {
    pub translation: Vec3,
    /// Applied on top of the actor's current rotation.
    pub rotation: Quat,
}

impl RootMotion {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };
}

pub fn time_scale(simulation_time: f32, tick_time: f32) -> f32 {
    if tick_time > SMALL_NUMBER {
        simulation_time / tick_time
    } else {
        1.0
    }
}

impl MotionSource {
    /// Computes this tick's motion and advances elapsed time by
    /// `simulation_time`. Negative times count as zero so elapsed never runs
    /// backwards.
    pub fn prepare_motion(
        &mut self,
        simulation_time: f32,
        tick_time: f32,
        actor: &dyn CharacterActor,
        movement: &MovementSnapshot,
    ) -> RootMotion {
        let simulation_time = simulation_time.max(0.0);
        if self.proxy_policy == ProxyPolicy::Freeze && actor.is_simulated_proxy() {
            self.elapsed += simulation_time;
            return RootMotion::IDENTITY;
        }

        let (strength, duration, elapsed) = (self.strength, self.duration, self.elapsed);
        let mut motion = match &mut self.variant {
            MotionVariant::ForwardForce(force) => {
                force.prepare(strength, duration, elapsed, tick_time, actor, movement)
            }
            MotionVariant::BreachRise(rise) => rise.prepare(strength, tick_time, actor, movement),
            MotionVariant::BreachJump(arc) | MotionVariant::BreachFall(arc) => {
                arc.prepare(strength, tick_time, actor, movement)
            }
        };
        motion.translation *= time_scale(simulation_time, tick_time);

        self.elapsed += simulation_time;
        motion
    }
}

impl ForwardForce {
    fn prepare(
        &mut self,
        strength: f32,
        duration: f32,
        elapsed: f32,
        tick_time: f32,
        actor: &dyn CharacterActor,
        movement: &MovementSnapshot,
    ) -> RootMotion {
        let forward = actor.forward();
        let mut direction = forward;
        if self.follow_acceleration {
            let current = self.heading.unwrap_or(forward);
            direction = if movement.acceleration.length() > KINDA_SMALL_NUMBER {
                rotate_toward(
                    current,
                    movement.acceleration,
                    HEADING_TOLERANCE,
                    self.turn_rate.to_radians() * tick_time,
                )
            } else {
                current
            };
            self.heading = Some(direction);
        }

        let mut translation = direction.normalize_or_zero() * strength;
        if let Some(curve) = &self.curve {
            translation *= curve.sample(curve_time(elapsed, duration));
        }

        RootMotion {
            translation,
            rotation: arc_between(forward, direction),
        }
    }
}

/// Normalized progress for finite forces, raw seconds for infinite ones.
fn curve_time(elapsed: f32, duration: f32) -> f32 {
    if duration < 0.0 {
        elapsed
    } else if duration > SMALL_NUMBER {
        (elapsed / duration).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

fn arc_between(from: Vec3, to: Vec3) -> Quat {
    match (from.try_normalize(), to.try_normalize()) {
        (Some(from), Some(to)) => Quat::from_rotation_arc(from, to),
        _ => Quat::IDENTITY,
    }
}

/// Rotation taking `actor` from its current rotation to `target`.
fn delta_to(actor: &dyn CharacterActor, target: Rotator) -> Quat {
    target.to_quat() * actor.rotation().to_quat().inverse()
}

impl BreachRise {
    fn prepare(
        &mut self,
        strength: f32,
        tick_time: f32,
        actor: &dyn CharacterActor,
        movement: &MovementSnapshot,
    ) -> RootMotion {
        if self.is_ramping() {
            self.ability_acceleration = (self.ability_acceleration + tick_time.max(0.0)).min(1.0);
            return RootMotion {
                translation: actor.forward() * strength * self.ability_acceleration,
                rotation: Quat::IDENTITY,
            };
        }

        let mut heading = if movement.velocity.length() > MIN_HEADING_SPEED {
            Rotator::from_direction(movement.velocity)
        } else {
            let rotation = actor.rotation();
            Rotator::new(rotation.pitch, rotation.yaw, 0.0)
        };
        heading.pitch = heading.pitch.clamp(-self.pitch_limit, self.pitch_limit);

        let mut direction = heading.direction();
        if actor.has_controller() {
            direction = rotate_toward(
                direction,
                actor.control_rotation().direction(),
                HEADING_TOLERANCE,
                self.rotation_speed.to_radians() * tick_time,
            );
        }

        RootMotion {
            translation: direction * strength,
            rotation: delta_to(actor, Rotator::from_direction(direction)),
        }
    }
}

impl BreachArc {
    fn prepare(
        &mut self,
        strength: f32,
        tick_time: f32,
        actor: &dyn CharacterActor,
        movement: &MovementSnapshot,
    ) -> RootMotion {
        let velocity = movement.last_update_velocity;
        let target = if velocity.length() > KINDA_SMALL_NUMBER {
            Rotator::from_direction(velocity)
        } else {
            self.fall_rotation
        };
        self.fall_rotation = self
            .fall_rotation
            .interp_constant_to(target, tick_time, self.rotation_speed);

        RootMotion {
            translation: velocity * strength,
            rotation: delta_to(actor, self.fall_rotation),
        }
    }
}
