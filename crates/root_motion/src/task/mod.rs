//! Owning tasks: one per force application, from activation until the force
//! completes or is torn down.

mod completion;
mod request;

use bevy::log::{debug, warn};

use crate::collaborator::{CharacterActor, MovementComponent};
use crate::config::MotionConfig;
use crate::replication::{ForceDescriptor, ReplicatedForceParams};
use crate::source::{
    BreachArc, BreachRise, ForwardForce, MotionKind, MotionSource, MotionVariant, ProxyPolicy,
    SourceId,
};

pub use completion::{CompletionSink, ForceCompletion, ForceOutcome};
pub use request::{ForceParams, ForceRequest, ForceShape};

#[derive(Clone, Debug)]
struct TaskTuning {
    priority: u16,
    water_depth: f32,
    breach_rotation_speed: f32,
    rise_turn_rate: f32,
    rise_pitch_limit: f32,
    forward_turn_rate: f32,
    forward_policy: ProxyPolicy,
    breach_policy: ProxyPolicy,
}

impl From<&MotionConfig> for TaskTuning {
    fn from(config: &MotionConfig) -> Self {
        Self {
            priority: config.source_priority,
            water_depth: config.water_depth_threshold,
            breach_rotation_speed: config.breach_rotation_speed,
            rise_turn_rate: config.rise_turn_rate,
            rise_pitch_limit: config.rise_pitch_limit,
            forward_turn_rate: config.forward_turn_rate,
            forward_policy: config.forward_proxy_policy,
            breach_policy: config.breach_proxy_policy,
        }
    }
}

/// Lifetime of one applied force.
///
/// The task registers a [`MotionSource`] on activation and keeps only its id.
/// Each tick it checks the completion rules for its kind; on completion it
/// notifies the sink and removes the source. `finished` flips once and
/// nothing runs after it.
#[derive(Debug)]
pub struct ForceTask {
    name: String,
    shape: ForceShape,
    params: ForceParams,
    replicated: ReplicatedForceParams,
    source_id: Option<SourceId>,
    start_time: f32,
    end_time: Option<f32>,
    elapsed: f32,
    active: bool,
    finished: bool,
    tuning: TaskTuning,
}

impl ForceTask {
    pub fn new(request: ForceRequest, config: &MotionConfig) -> Self {
        let ForceRequest {
            name,
            shape,
            mut params,
        } = request;

        let kind = shape.kind();
        if matches!(kind, MotionKind::BreachJump | MotionKind::BreachFall) && params.strength > 1.0
        {
            warn!(
                "{:?} '{}' strength {} scales velocity and must be at most 1.0, clamping",
                kind, name, params.strength
            );
            params.strength = 1.0;
        }

        let replicated = ReplicatedForceParams::new(
            params.strength,
            params.duration,
            params.accumulate_mode,
            params.enable_gravity,
            shape.curve_id(),
        );

        Self {
            name,
            shape,
            params,
            replicated,
            source_id: None,
            start_time: 0.0,
            end_time: None,
            elapsed: 0.0,
            active: false,
            finished: false,
            tuning: TaskTuning::from(config),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MotionKind {
        self.shape.kind()
    }

    pub fn strength(&self) -> f32 {
        self.params.strength
    }

    pub fn duration(&self) -> f32 {
        self.params.duration
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn start_time(&self) -> f32 {
        self.start_time
    }

    /// `None` for infinite forces and before activation.
    pub fn end_time(&self) -> Option<f32> {
        self.end_time
    }

    pub fn source_id(&self) -> Option<SourceId> {
        self.source_id
    }

    pub fn is_active(&self) -> bool {
        self.active && !self.finished
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn replicated(&self) -> &ReplicatedForceParams {
        &self.replicated
    }

    pub fn replicated_mut(&mut self) -> &mut ReplicatedForceParams {
        &mut self.replicated
    }

    pub fn descriptor(&self) -> ForceDescriptor {
        self.replicated.descriptor(&self.name, self.kind())
    }

    /// Builds the source and hands it to `movement`. Without a movement
    /// component the task still runs its completion rules but moves nothing.
    pub fn activate(
        &mut self,
        now: f32,
        actor: &dyn CharacterActor,
        movement: Option<&mut dyn MovementComponent>,
    ) {
        if self.active || self.finished {
            return;
        }
        self.active = true;
        self.start_time = now;
        self.end_time = (self.params.duration >= 0.0).then(|| now + self.params.duration);

        let Some(movement) = movement else {
            warn!(
                "No movement component for {:?} '{}', force will not be applied",
                self.kind(),
                self.name
            );
            return;
        };
        self.source_id = movement.register_source(self.build_source(actor));
        if self.source_id.is_none() {
            warn!("Movement component rejected {:?} '{}'", self.kind(), self.name);
        }
    }

    fn build_source(&self, actor: &dyn CharacterActor) -> MotionSource {
        let tuning = &self.tuning;
        let (variant, policy) = match &self.shape {
            ForceShape::ForwardForce {
                curve,
                follow_acceleration,
            } => {
                let mut force = ForwardForce::new(curve.clone());
                if *follow_acceleration {
                    force = force.following_acceleration(tuning.forward_turn_rate);
                }
                (MotionVariant::ForwardForce(force), tuning.forward_policy)
            }
            ForceShape::BreachRise => {
                let mut rise = BreachRise::new(tuning.rise_turn_rate);
                rise.pitch_limit = tuning.rise_pitch_limit;
                (MotionVariant::BreachRise(rise), tuning.breach_policy)
            }
            ForceShape::BreachJump => (
                MotionVariant::BreachJump(BreachArc::new(
                    actor.rotation(),
                    tuning.breach_rotation_speed,
                )),
                tuning.breach_policy,
            ),
            ForceShape::BreachFall => (
                MotionVariant::BreachFall(BreachArc::new(
                    actor.rotation(),
                    tuning.breach_rotation_speed,
                )),
                tuning.breach_policy,
            ),
        };

        MotionSource::new(
            self.name.clone(),
            self.params.strength,
            self.params.duration,
            variant,
        )
        .with_priority(tuning.priority)
        .with_accumulate_mode(self.params.accumulate_mode)
        .with_gravity(self.params.enable_gravity)
        .with_finish_velocity(self.params.finish_velocity)
        .with_proxy_policy(policy)
    }

    /// Advances the task by `delta` simulated seconds and completes it when
    /// its rules say so.
    pub fn tick(
        &mut self,
        delta: f32,
        actor: &mut dyn CharacterActor,
        movement: Option<&mut dyn MovementComponent>,
        sink: &mut dyn CompletionSink,
    ) {
        if self.finished {
            return;
        }
        self.elapsed += delta.max(0.0);

        if let Some(outcome) = self.evaluate(&*actor, movement.as_deref()) {
            self.complete(outcome, actor, movement, sink);
        }
    }

    /// Finishes the task. Only the first call has any effect.
    ///
    /// Peers that merely mirror the character skip the net update, rotation
    /// fix-ups and notification, but still release the source.
    pub fn complete(
        &mut self,
        outcome: ForceOutcome,
        actor: &mut dyn CharacterActor,
        movement: Option<&mut dyn MovementComponent>,
        sink: &mut dyn CompletionSink,
    ) {
        if self.finished {
            return;
        }
        self.finished = true;

        if !actor.is_simulated_proxy() {
            actor.force_net_update();
            match (self.kind(), outcome) {
                (MotionKind::BreachRise, _) => {
                    let mut rotation = actor.rotation();
                    rotation.roll = 0.0;
                    actor.set_rotation(rotation);
                }
                (MotionKind::BreachFall, ForceOutcome::Failed) => {
                    let mut rotation = actor.rotation();
                    rotation.pitch = 0.0;
                    actor.set_rotation(rotation);
                }
                _ => {}
            }
            sink.force_completed(ForceCompletion {
                name: self.name.clone(),
                kind: self.kind(),
                outcome,
            });
        }

        debug!(
            "{:?} '{}' finished after {:.3}s: {:?}",
            self.kind(),
            self.name,
            self.elapsed,
            outcome
        );
        self.release(movement);
    }

    /// Teardown without a verdict: the owning ability ended or replication
    /// destroyed the task. Safe to call after completion.
    pub fn end(&mut self, movement: Option<&mut dyn MovementComponent>) {
        self.finished = true;
        self.release(movement);
    }

    fn release(&mut self, movement: Option<&mut dyn MovementComponent>) {
        let Some(id) = self.source_id.take() else {
            return;
        };
        match movement {
            Some(movement) => movement.remove_source_by_id(id),
            None => warn!(
                "Movement component gone before {:?} '{}' could remove {:?}",
                self.kind(),
                self.name,
                id
            ),
        }
    }
}
