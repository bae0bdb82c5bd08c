pub mod abilities;
pub mod body;
pub mod collaborator;
pub mod config;
pub mod curve;
pub mod input;
pub mod movement;
pub mod protocol;
pub mod replication;
pub mod rotator;
pub mod source;
pub mod systems;
pub mod task;

#[cfg(test)]
mod tests;

use bevy::prelude::{App, FixedUpdate, IntoScheduleConfigs, Plugin};

use crate::abilities::{ApplyForce, ForceCompleted, advance_breach_sequences, begin_breach_sequences};
use crate::config::MotionConfig;
use crate::curve::CurveLibrary;
use crate::input::read_ability_input;
use crate::systems::{
    apply_root_motion, publish_active_forces, start_requested_forces, sync_movement_state,
    tick_force_tasks,
};

pub const FIXED_TIMESTEP_HZ: f64 = 60.0;

/// Root motion for every entity carrying a [`body::CharacterBody`].
///
/// Entities that should move also need a [`movement::RootMotionSources`];
/// without one their forces still run and complete but apply nothing.
pub struct RootMotionPlugin;

impl Plugin for RootMotionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MotionConfig>()
            .init_resource::<CurveLibrary>()
            .register_type::<MotionConfig>()
            .register_type::<body::CharacterBody>()
            .register_type::<abilities::BreachSequence>()
            .add_message::<ApplyForce>()
            .add_message::<ForceCompleted>();

        app.add_systems(
            FixedUpdate,
            (
                read_ability_input,
                begin_breach_sequences,
                sync_movement_state,
                start_requested_forces,
                apply_root_motion,
                tick_force_tasks,
                advance_breach_sequences,
                publish_active_forces,
            )
                .chain(),
        );
    }
}
