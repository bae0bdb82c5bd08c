//! When a task is done, and how that is reported.

use bevy::log::error;
use bevy::prelude::Vec3;
use serde::{Deserialize, Serialize};

use super::ForceTask;
use crate::collaborator::{AquaticCapability, CharacterActor, MovementComponent};
use crate::rotator::KINDA_SMALL_NUMBER;
use crate::source::MotionKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForceOutcome {
    /// A forward force ran its course. Carries no verdict.
    Elapsed,
    Succeeded,
    Failed,
}

impl ForceOutcome {
    /// `None` for forward forces, whose completion has no success flag.
    pub fn success(self) -> Option<bool> {
        match self {
            ForceOutcome::Elapsed => None,
            ForceOutcome::Succeeded => Some(true),
            ForceOutcome::Failed => Some(false),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForceCompletion {
    pub name: String,
    pub kind: MotionKind,
    pub outcome: ForceOutcome,
}

/// Receives completion notifications from tasks.
pub trait CompletionSink {
    fn force_completed(&mut self, completion: ForceCompletion);
}

impl CompletionSink for Vec<ForceCompletion> {
    fn force_completed(&mut self, completion: ForceCompletion) {
        self.push(completion);
    }
}

impl ForceTask {
    /// Stage condition first, then the shared timeout.
    pub(super) fn evaluate(
        &self,
        actor: &dyn CharacterActor,
        movement: Option<&dyn MovementComponent>,
    ) -> Option<ForceOutcome> {
        let kind = self.kind();
        let stage = if kind.is_breach() {
            let Some(aquatic) = actor.as_aquatic() else {
                error!(
                    "{:?} '{}' applied to a character that cannot swim",
                    kind, self.name
                );
                return Some(ForceOutcome::Failed);
            };
            self.breach_outcome(kind, aquatic, actor, movement)
        } else {
            None
        };

        stage.or_else(|| self.timed_out().then(|| self.timeout_outcome()))
    }

    fn breach_outcome(
        &self,
        kind: MotionKind,
        aquatic: &dyn AquaticCapability,
        actor: &dyn CharacterActor,
        movement: Option<&dyn MovementComponent>,
    ) -> Option<ForceOutcome> {
        let depth = self.tuning.water_depth;
        match kind {
            MotionKind::BreachRise => {
                (!aquatic.is_in_water(depth)).then_some(ForceOutcome::Succeeded)
            }
            MotionKind::BreachJump => {
                let grounded = actor.is_walking()
                    || movement.is_some_and(|movement| movement.is_moving_on_ground());
                if grounded {
                    return Some(ForceOutcome::Failed);
                }
                let velocity = movement.map(|movement| movement.velocity())?;
                past_apex(velocity).then_some(ForceOutcome::Succeeded)
            }
            MotionKind::BreachFall => {
                if aquatic.is_in_water(depth) {
                    Some(ForceOutcome::Succeeded)
                } else if actor.is_walking() || actor.is_sprinting() {
                    Some(ForceOutcome::Failed)
                } else {
                    None
                }
            }
            MotionKind::ForwardForce => None,
        }
    }

    pub(super) fn timed_out(&self) -> bool {
        let duration = self.params.duration;
        duration >= 0.0 && self.elapsed >= duration
    }

    fn timeout_outcome(&self) -> ForceOutcome {
        if self.kind().is_breach() {
            ForceOutcome::Failed
        } else {
            ForceOutcome::Elapsed
        }
    }
}

fn past_apex(velocity: Vec3) -> bool {
    velocity.y <= 0.0 || velocity.length() < KINDA_SMALL_NUMBER
}
