//! A deliberately small physical world for exercising root motion without a
//! renderer or collision: one water surface and one flat floor. Gravity
//! pulls above water, drag slows below it and friction slows on the floor.

use avian3d::prelude::{GravityScale, LinearVelocity, Position};
use bevy::prelude::*;
use root_motion::body::{CharacterBody, Locomotion};

/// cm/s², matching the centimetre scale of force strengths.
pub const GRAVITY: f32 = 980.0;
/// Fraction of velocity water removes per second.
pub const WATER_DRAG: f32 = 0.8;
/// Fraction of horizontal velocity the floor removes per second.
pub const GROUND_FRICTION: f32 = 8.0;

#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct WaterWorld {
    pub surface_height: f32,
    pub floor_height: f32,
}

impl Default for WaterWorld {
    fn default() -> Self {
        Self {
            surface_height: 0.0,
            floor_height: -5000.0,
        }
    }
}

pub struct WaterWorldPlugin;

impl Plugin for WaterWorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WaterWorld>();
        app.add_systems(FixedPostUpdate, integrate_bodies);
    }
}

fn integrate_bodies(
    world: Res<WaterWorld>,
    time: Res<Time<Fixed>>,
    mut query: Query<(
        &mut Position,
        &mut LinearVelocity,
        &mut CharacterBody,
        Option<&GravityScale>,
    )>,
) {
    let dt = time.timestep().as_secs_f32();
    for (mut position, mut velocity, mut body, gravity) in &mut query {
        let submerged = body.swimmer.is_some() && position.0.y < world.surface_height;
        if submerged {
            velocity.0 *= (1.0 - WATER_DRAG * dt).max(0.0);
        } else {
            let scale = gravity.map_or(1.0, |gravity| gravity.0);
            velocity.0.y -= GRAVITY * scale * dt;
        }

        position.0 += velocity.0 * dt;
        let grounded = position.0.y <= world.floor_height;
        if grounded {
            position.0.y = world.floor_height;
            velocity.0.y = velocity.0.y.max(0.0);
            let keep = (1.0 - GROUND_FRICTION * dt).max(0.0);
            velocity.0.x *= keep;
            velocity.0.z *= keep;
        }

        let locomotion = if body.swimmer.is_some() && position.0.y < world.surface_height {
            Locomotion::Swimming
        } else if grounded {
            if body.locomotion == Locomotion::Sprinting {
                Locomotion::Sprinting
            } else {
                Locomotion::Walking
            }
        } else {
            Locomotion::Falling
        };
        if body.locomotion != locomotion {
            debug!("{:?} -> {:?} at {:?}", body.locomotion, locomotion, position.0);
            body.locomotion = locomotion;
        }
    }
}
