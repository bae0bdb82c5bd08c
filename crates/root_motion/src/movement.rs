//! Movement-side bookkeeping for root motion: the registry of active sources,
//! priority-ordered evaluation and composition into one velocity/rotation.

use bevy::log::{debug, warn};
use bevy::prelude::*;

use crate::collaborator::{CharacterActor, MovementComponent, MovementSnapshot};
use crate::source::{AccumulateMode, MotionSource, SourceId, SourceSettings};

/// More simultaneous sources than this on one character is a leak.
pub const MAX_ACTIVE_SOURCES: usize = 32;

// ============================================================================
// COMPONENTS
// ============================================================================

/// Active sources of one character plus the kinematic state they read.
#[derive(Component, Debug, Default)]
pub struct RootMotionSources {
    sources: Vec<MotionSource>,
    last_id: u16,
    pub velocity: Vec3,
    pub last_update_velocity: Vec3,
    pub acceleration: Vec3,
    pub on_ground: bool,
}

/// Result of composing every active source for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootMotionOutput {
    pub velocity: Vec3,
    pub rotation: Quat,
    pub has_override: bool,
    pub gravity_enabled: bool,
}

impl RootMotionSources {
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MotionSource> {
        self.sources.iter()
    }

    pub fn find_source_by_id(&self, id: SourceId) -> Option<&MotionSource> {
        self.sources.iter().find(|source| source.id() == Some(id))
    }

    /// Records the velocity physics settled on at the end of the previous
    /// step. It stays `last_update_velocity` for the whole tick while
    /// `velocity` follows whatever root motion produces.
    pub fn set_kinematics(&mut self, velocity: Vec3, acceleration: Vec3, on_ground: bool) {
        self.last_update_velocity = velocity;
        self.velocity = velocity;
        self.acceleration = acceleration;
        self.on_ground = on_ground;
    }

    fn next_id(&mut self) -> SourceId {
        loop {
            self.last_id = self.last_id.wrapping_add(1);
            if self.last_id == 0 {
                continue;
            }
            let id = SourceId(self.last_id);
            if self.find_source_by_id(id).is_none() {
                return id;
            }
        }
    }

    /// Evaluates every source in ascending priority and composes the results
    /// onto the current velocity.
    ///
    /// Later Override sources win. Finite sources get their last tick cut to
    /// the remaining duration unless they opt out.
    pub fn prepare_root_motion(
        &mut self,
        simulation_time: f32,
        tick_time: f32,
        actor: &dyn CharacterActor,
    ) -> RootMotionOutput {
        let snapshot = MovementSnapshot::of(&*self);
        let mut order: Vec<usize> = (0..self.sources.len()).collect();
        order.sort_by_key(|&index| self.sources[index].priority);

        let mut output = RootMotionOutput {
            velocity: self.velocity,
            rotation: Quat::IDENTITY,
            has_override: false,
            gravity_enabled: true,
        };

        for index in order {
            let source = &mut self.sources[index];
            let step = match source.remaining() {
                Some(remaining)
                    if !source
                        .settings
                        .contains(SourceSettings::DISABLE_PARTIAL_END_TICK) =>
                {
                    simulation_time.min(remaining)
                }
                _ => simulation_time,
            };
            if source.take_catchup() {
                debug!(
                    "Source '{}' resuming from authoritative progress {:.3}s",
                    source.instance_name,
                    source.elapsed()
                );
            }
            let motion = source.prepare_motion(step, tick_time, actor, &snapshot);

            match source.accumulate_mode {
                AccumulateMode::Override => {
                    let vertical = output.velocity.y;
                    output.velocity = motion.translation;
                    if source
                        .settings
                        .contains(SourceSettings::IGNORE_VERTICAL_ACCUMULATE)
                    {
                        output.velocity.y = vertical;
                    }
                    output.has_override = true;
                    output.gravity_enabled = source.enable_gravity;
                }
                AccumulateMode::Additive => output.velocity += motion.translation,
            }
            output.rotation = motion.rotation * output.rotation;
        }

        output
    }

    /// Folds an authoritative copy of a source into the local list: a matching
    /// local source only catches up its progress, anything else is replaced.
    pub fn merge_replicated(&mut self, incoming: MotionSource) -> Option<SourceId> {
        let existing = self
            .sources
            .iter()
            .position(|source| source.instance_name == incoming.instance_name);

        if let Some(index) = existing {
            let local = &mut self.sources[index];
            if local.matches(&incoming) {
                if !local.matches_and_has_same_state(&incoming) {
                    local.update_state_from(&incoming, true);
                }
                return local.id();
            }
            let stale = self.sources.remove(index);
            debug!(
                "Replacing predicted source '{}' ({:?}) with authoritative copy",
                stale.instance_name,
                stale.id()
            );
        }

        self.register_source(incoming)
    }
}

impl MovementComponent for RootMotionSources {
    fn register_source(&mut self, mut source: MotionSource) -> Option<SourceId> {
        if self.sources.len() >= MAX_ACTIVE_SOURCES {
            warn!(
                "Rejecting root motion source '{}': {} sources already active",
                source.instance_name,
                self.sources.len()
            );
            return None;
        }
        let id = self.next_id();
        source.set_id(id);
        debug!("Registered root motion source '{}' as {:?}", source.instance_name, id);
        self.sources.push(source);
        Some(id)
    }

    fn remove_source_by_id(&mut self, id: SourceId) {
        let Some(index) = self.sources.iter().position(|source| source.id() == Some(id)) else {
            debug!("Root motion source {:?} already removed", id);
            return;
        };
        let source = self.sources.remove(index);
        self.velocity = source.finish_velocity.apply(self.velocity);
        debug!("Removed root motion source '{}' ({:?})", source.instance_name, id);
    }

    fn find_source_by_name(&self, name: &str) -> Option<&MotionSource> {
        self.sources.iter().find(|source| source.instance_name == name)
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn last_update_velocity(&self) -> Vec3 {
        self.last_update_velocity
    }

    fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    fn is_moving_on_ground(&self) -> bool {
        let sensitive = self.sources.iter().any(|source| {
            source
                .settings
                .contains(SourceSettings::USE_SENSITIVE_LIFTOFF_CHECK)
        });
        self.on_ground && !(sensitive && self.velocity.y > 0.0)
    }
}

// ============================================================================
// TESTS
// ============================================================================
