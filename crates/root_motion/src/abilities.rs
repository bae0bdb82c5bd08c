//! Abilities built on root motion: the dash and the three-stage breach.

use bevy::log::{debug, info, warn};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::body::CharacterBody;
use crate::collaborator::CharacterActor;
use crate::config::{BreachConfig, MotionConfig};
use crate::task::{ForceCompletion, ForceOutcome, ForceRequest, ForceTask};

pub const DASH_FORCE: &str = "dash";

/// Live force tasks owned by a character.
#[derive(Component, Debug, Default)]
pub struct ForceTasks(Vec<ForceTask>);

impl ForceTasks {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ForceTask> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ForceTask> {
        self.0.iter_mut()
    }

    pub fn find(&self, name: &str) -> Option<&ForceTask> {
        self.0.iter().find(|task| task.name() == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut ForceTask> {
        self.0.iter_mut().find(|task| task.name() == name)
    }

    pub fn push(&mut self, task: ForceTask) {
        self.0.push(task);
    }

    /// Drops finished tasks.
    pub fn retain_unfinished(&mut self) {
        self.0.retain(|task| !task.is_finished());
    }
}

/// Ask `entity` to start a force on its next fixed tick.
#[derive(Message, Clone, Debug)]
pub struct ApplyForce {
    pub entity: Entity,
    pub request: ForceRequest,
}

#[derive(Message, Clone, Debug, PartialEq)]
pub struct ForceCompleted {
    pub entity: Entity,
    pub completion: ForceCompletion,
}

pub fn dash_request(config: &MotionConfig) -> ForceRequest {
    let dash = &config.dash;
    let request = ForceRequest::forward_force(DASH_FORCE, dash.strength, dash.duration);
    if dash.follow_acceleration {
        request.following_acceleration()
    } else {
        request
    }
}

// ============================================================================
// BREACH
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum BreachStage {
    #[default]
    Rise,
    Jump,
    Fall,
}

impl BreachStage {
    pub fn force_name(self) -> &'static str {
        match self {
            BreachStage::Rise => "breach_rise",
            BreachStage::Jump => "breach_jump",
            BreachStage::Fall => "breach_fall",
        }
    }

    pub fn request(self, config: &BreachConfig) -> ForceRequest {
        let name = self.force_name();
        match self {
            BreachStage::Rise => {
                ForceRequest::breach_rise(name, config.rise_strength, config.rise_duration)
            }
            BreachStage::Jump => {
                ForceRequest::breach_jump(name, config.jump_strength, config.jump_duration)
                    .with_gravity(true)
            }
            BreachStage::Fall => {
                ForceRequest::breach_fall(name, config.fall_strength, config.fall_duration)
                    .with_gravity(true)
            }
        }
    }

    fn next(self) -> Option<Self> {
        match self {
            BreachStage::Rise => Some(BreachStage::Jump),
            BreachStage::Jump => Some(BreachStage::Fall),
            BreachStage::Fall => None,
        }
    }
}

/// A breach in progress. Inserting it starts the rise.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Reflect, Serialize, Deserialize)]
pub struct BreachSequence {
    pub stage: BreachStage,
}

/// True when the character can swim and is deep enough to surface from.
pub fn can_breach(body: &CharacterBody, config: &MotionConfig) -> bool {
    body.as_aquatic()
        .is_some_and(|aquatic| aquatic.is_in_water(config.water_depth_threshold))
}

/// Stage that follows `stage` after `outcome`, if any.
pub fn next_breach_stage(stage: BreachStage, outcome: ForceOutcome) -> Option<BreachStage> {
    match outcome {
        ForceOutcome::Succeeded => stage.next(),
        ForceOutcome::Failed | ForceOutcome::Elapsed => None,
    }
}

pub(crate) fn begin_breach_sequences(
    mut commands: Commands,
    sequences: Query<(Entity, &CharacterBody, &BreachSequence), Added<BreachSequence>>,
    config: Res<MotionConfig>,
    mut apply: MessageWriter<ApplyForce>,
) {
    for (entity, body, sequence) in &sequences {
        if sequence.stage == BreachStage::Rise && !can_breach(body, &config) {
            warn!("Entity {:?} cannot breach from here, dropping sequence", entity);
            commands.entity(entity).remove::<BreachSequence>();
            continue;
        }
        info!("Entity {:?} starting breach at {:?}", entity, sequence.stage);
        apply.write(ApplyForce {
            entity,
            request: sequence.stage.request(&config.breach),
        });
    }
}

pub(crate) fn advance_breach_sequences(
    mut commands: Commands,
    mut completed: MessageReader<ForceCompleted>,
    mut sequences: Query<&mut BreachSequence>,
    config: Res<MotionConfig>,
    mut apply: MessageWriter<ApplyForce>,
) {
    for ForceCompleted { entity, completion } in completed.read() {
        let Ok(mut sequence) = sequences.get_mut(*entity) else {
            continue;
        };
        if completion.name != sequence.stage.force_name() {
            continue;
        }

        match next_breach_stage(sequence.stage, completion.outcome) {
            Some(stage) => {
                debug!("Entity {:?} breach {:?} -> {:?}", entity, sequence.stage, stage);
                sequence.stage = stage;
                apply.write(ApplyForce {
                    entity: *entity,
                    request: stage.request(&config.breach),
                });
            }
            None => {
                info!(
                    "Entity {:?} breach ended at {:?}: {:?}",
                    entity, sequence.stage, completion.outcome
                );
                commands.entity(*entity).remove::<BreachSequence>();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotator::Rotator;
    use crate::source::MotionKind;

    #[test]
    fn breach_stages_chain_on_success_only() {
        assert_eq!(
            next_breach_stage(BreachStage::Rise, ForceOutcome::Succeeded),
            Some(BreachStage::Jump)
        );
        assert_eq!(
            next_breach_stage(BreachStage::Jump, ForceOutcome::Succeeded),
            Some(BreachStage::Fall)
        );
        assert_eq!(next_breach_stage(BreachStage::Fall, ForceOutcome::Succeeded), None);
        assert_eq!(next_breach_stage(BreachStage::Rise, ForceOutcome::Failed), None);
    }

    #[test]
    fn stage_requests_use_breach_tunables() {
        let config = BreachConfig::default();
        let rise = BreachStage::Rise.request(&config);
        assert_eq!(rise.kind(), MotionKind::BreachRise);
        assert_eq!(rise.params.strength, config.rise_strength);

        let fall = BreachStage::Fall.request(&config);
        assert_eq!(fall.kind(), MotionKind::BreachFall);
        assert!(fall.params.enable_gravity);
    }

    #[test]
    fn only_submerged_swimmers_can_breach() {
        let config = MotionConfig::default();
        let land = CharacterBody::new(Rotator::ZERO);
        let shallow = CharacterBody::new(Rotator::ZERO)
            .swimming_under(0.0)
            .at(Vec3::new(0.0, -10.0, 0.0));
        let deep = CharacterBody::new(Rotator::ZERO)
            .swimming_under(0.0)
            .at(Vec3::new(0.0, -200.0, 0.0));
        assert!(!can_breach(&land, &config));
        assert!(!can_breach(&shallow, &config));
        assert!(can_breach(&deep, &config));
    }

    #[test]
    fn dash_follows_configured_steering() {
        let mut config = MotionConfig::default();
        config.dash.follow_acceleration = false;
        let request = dash_request(&config);
        assert_eq!(request.name, DASH_FORCE);
        assert!(matches!(
            request.shape,
            crate::task::ForceShape::ForwardForce {
                follow_acceleration: false,
                ..
            }
        ));
    }
}
