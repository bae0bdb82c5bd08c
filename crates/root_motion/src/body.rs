use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::abilities::ForceTasks;
use crate::collaborator::{AquaticCapability, CharacterActor};
use crate::replication::ActiveForces;
use crate::rotator::Rotator;

/// Who simulates this character on the local peer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum NetRole {
    #[default]
    Authority,
    /// The owning client predicting its own character.
    AutonomousProxy,
    /// Someone else's character, only extrapolated here.
    SimulatedProxy,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum Locomotion {
    #[default]
    Walking,
    Sprinting,
    Swimming,
    Falling,
}

/// Marks a creature that can swim and tracks the surface it swims under.
#[derive(Clone, Copy, Debug, PartialEq, Reflect, Serialize, Deserialize)]
pub struct Swimmer {
    pub surface_height: f32,
}

/// Character state root motion reads and writes.
#[derive(Component, Clone, Debug, Default, Reflect)]
#[require(ForceTasks, ActiveForces)]
pub struct CharacterBody {
    pub rotation: Rotator,
    /// `None` when nothing possesses the character.
    pub control_rotation: Option<Rotator>,
    pub role: NetRole,
    pub locomotion: Locomotion,
    pub position: Vec3,
    /// World-space locomotion input, read as acceleration by steered forces.
    pub move_input: Vec3,
    pub swimmer: Option<Swimmer>,
    pub net_update_requested: bool,
}

impl CharacterBody {
    pub fn new(rotation: Rotator) -> Self {
        Self {
            rotation,
            ..default()
        }
    }

    pub fn with_role(mut self, role: NetRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_controller(mut self, control_rotation: Rotator) -> Self {
        self.control_rotation = Some(control_rotation);
        self
    }

    pub fn with_locomotion(mut self, locomotion: Locomotion) -> Self {
        self.locomotion = locomotion;
        self
    }

    pub fn moving_toward(mut self, move_input: Vec3) -> Self {
        self.move_input = move_input;
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn swimming_under(mut self, surface_height: f32) -> Self {
        self.swimmer = Some(Swimmer { surface_height });
        self.locomotion = Locomotion::Swimming;
        self
    }

    /// Depth below the tracked surface, negative above it.
    pub fn depth(&self) -> Option<f32> {
        self.swimmer.map(|swimmer| swimmer.surface_height - self.position.y)
    }
}

impl CharacterActor for CharacterBody {
    fn rotation(&self) -> Rotator {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Rotator) {
        self.rotation = rotation.normalized();
    }

    fn has_controller(&self) -> bool {
        self.control_rotation.is_some()
    }

    fn control_rotation(&self) -> Rotator {
        self.control_rotation.unwrap_or(self.rotation)
    }

    fn has_authority(&self) -> bool {
        self.role == NetRole::Authority
    }

    fn is_locally_controlled(&self) -> bool {
        self.role == NetRole::AutonomousProxy
    }

    fn is_walking(&self) -> bool {
        self.locomotion == Locomotion::Walking
    }

    fn is_sprinting(&self) -> bool {
        self.locomotion == Locomotion::Sprinting
    }

    fn force_net_update(&mut self) {
        self.net_update_requested = true;
    }

    fn as_aquatic(&self) -> Option<&dyn AquaticCapability> {
        self.swimmer.is_some().then_some(self as &dyn AquaticCapability)
    }
}

impl AquaticCapability for CharacterBody {
    fn is_in_water(&self, depth: f32) -> bool {
        self.depth().is_some_and(|below| below >= depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn land_characters_have_no_aquatic_capability() {
        let body = CharacterBody::new(Rotator::ZERO);
        assert!(body.as_aquatic().is_none());
    }

    #[test]
    fn submersion_uses_depth_threshold() {
        let body = CharacterBody::new(Rotator::ZERO)
            .swimming_under(0.0)
            .at(Vec3::new(0.0, -60.0, 0.0));
        let aquatic = body.as_aquatic().expect("swimmer");
        assert!(aquatic.is_in_water(50.0));
        assert!(!aquatic.is_in_water(80.0));
    }

    #[test]
    fn roles_map_to_authority_flags() {
        let proxy = CharacterBody::default().with_role(NetRole::SimulatedProxy);
        assert!(proxy.is_simulated_proxy());
        let owner = CharacterBody::default().with_role(NetRole::AutonomousProxy);
        assert!(!owner.is_simulated_proxy());
        assert!(!CharacterBody::default().is_simulated_proxy());
    }
}
