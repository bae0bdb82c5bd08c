//! Fixed-step systems moving forces from request to completion.

use avian3d::prelude::{GravityScale, LinearVelocity, Position, Rotation};
use bevy::log::{debug, warn};
use bevy::prelude::*;

use crate::abilities::{ApplyForce, ForceCompleted, ForceTasks};
use crate::body::{CharacterBody, Locomotion};
use crate::collaborator::{CharacterActor, MovementComponent};
use crate::config::MotionConfig;
use crate::movement::RootMotionSources;
use crate::replication::ActiveForces;
use crate::rotator::Rotator;
use crate::task::{ForceCompletion, ForceTask};

fn fixed_delta(time: &Time<Fixed>) -> f32 {
    time.timestep().as_secs_f32()
}

/// Copies physics state into the actor and the source registry.
pub(crate) fn sync_movement_state(
    mut query: Query<(
        &mut RootMotionSources,
        &mut CharacterBody,
        Option<&LinearVelocity>,
        Option<&Position>,
    )>,
) {
    for (mut sources, mut body, velocity, position) in &mut query {
        if let Some(position) = position {
            body.position = position.0;
        }
        let velocity = velocity.map_or(sources.velocity, |velocity| velocity.0);
        let on_ground = matches!(body.locomotion, Locomotion::Walking | Locomotion::Sprinting);
        sources.set_kinematics(velocity, body.move_input, on_ground);
    }
}

pub(crate) fn start_requested_forces(
    mut requests: MessageReader<ApplyForce>,
    mut query: Query<(
        &mut ForceTasks,
        &CharacterBody,
        Option<&mut RootMotionSources>,
    )>,
    config: Res<MotionConfig>,
    time: Res<Time<Fixed>>,
) {
    let now = time.elapsed_secs();
    for ApplyForce { entity, request } in requests.read() {
        let Ok((mut tasks, body, mut sources)) = query.get_mut(*entity) else {
            warn!("Force '{}' requested for unknown character {:?}", request.name, entity);
            continue;
        };

        if let Some(previous) = tasks.find_mut(&request.name) {
            debug!("Replacing running force '{}' on {:?}", request.name, entity);
            previous.end(
                sources
                    .as_deref_mut()
                    .map(|sources| sources as &mut dyn MovementComponent),
            );
        }
        tasks.retain_unfinished();

        let mut task = ForceTask::new(request.clone(), &config);
        task.activate(
            now,
            body,
            sources
                .as_deref_mut()
                .map(|sources| sources as &mut dyn MovementComponent),
        );
        tasks.push(task);
    }
}

/// Composes every active source and writes the result to the body.
pub(crate) fn apply_root_motion(
    mut query: Query<(
        &mut RootMotionSources,
        &mut CharacterBody,
        Option<&mut LinearVelocity>,
        Option<&mut Rotation>,
        Option<&mut GravityScale>,
    )>,
    time: Res<Time<Fixed>>,
) {
    let dt = fixed_delta(&time);
    for (mut sources, mut body, velocity, rotation, gravity) in &mut query {
        if sources.is_empty() {
            continue;
        }

        let output = sources.prepare_root_motion(dt, dt, &*body);
        sources.velocity = output.velocity;
        if output.rotation != Quat::IDENTITY {
            let turned = Rotator::from_quat(output.rotation * body.rotation.to_quat());
            body.set_rotation(turned);
        }

        if let Some(mut velocity) = velocity {
            velocity.0 = output.velocity;
        }
        if let Some(mut rotation) = rotation {
            rotation.0 = body.rotation.to_quat();
        }
        if let Some(mut gravity) = gravity {
            gravity.0 = if output.gravity_enabled { 1.0 } else { 0.0 };
        }
    }
}

pub(crate) fn tick_force_tasks(
    mut query: Query<(
        Entity,
        &mut ForceTasks,
        &mut CharacterBody,
        Option<&mut RootMotionSources>,
        Option<&mut LinearVelocity>,
        Option<&mut GravityScale>,
    )>,
    time: Res<Time<Fixed>>,
    mut completed: MessageWriter<ForceCompleted>,
) {
    let dt = fixed_delta(&time);
    for (entity, mut tasks, mut body, mut sources, velocity, gravity) in &mut query {
        if tasks.is_empty() {
            continue;
        }

        let mut completions: Vec<ForceCompletion> = Vec::new();
        for task in tasks.iter_mut() {
            task.tick(
                dt,
                &mut *body,
                sources
                    .as_deref_mut()
                    .map(|sources| sources as &mut dyn MovementComponent),
                &mut completions,
            );
        }

        let before = tasks.len();
        tasks.retain_unfinished();
        if tasks.len() != before {
            // Finish velocity and gravity take effect once a source is gone.
            if let (Some(sources), Some(mut velocity)) = (sources.as_deref(), velocity) {
                velocity.0 = sources.velocity;
            }
            if let (Some(sources), Some(mut gravity)) = (sources.as_deref(), gravity)
                && sources.is_empty()
            {
                gravity.0 = 1.0;
            }
        }

        completed.write_batch(
            completions
                .into_iter()
                .map(|completion| ForceCompleted { entity, completion }),
        );
    }
}

/// Refreshes replicated descriptors when a task changed or the set of tasks
/// did.
pub(crate) fn publish_active_forces(mut query: Query<(&mut ForceTasks, &mut ActiveForces)>) {
    for (mut tasks, mut active) in &mut query {
        let mut dirty = false;
        for task in tasks.bypass_change_detection().iter_mut() {
            dirty |= !task.replicated_mut().take_dirty().is_empty();
        }
        let reshaped = active
            .0
            .iter()
            .map(|descriptor| descriptor.name.as_str())
            .ne(tasks.iter().map(ForceTask::name));

        if dirty || reshaped {
            active.set_if_neq(ActiveForces(
                tasks.iter().map(ForceTask::descriptor).collect(),
            ));
        }
    }
}
