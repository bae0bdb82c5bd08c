//! Seams between root motion and the rest of the character: the movement
//! component that owns active sources and the actor that wears them.

use bevy::prelude::Vec3;

use crate::rotator::Rotator;
use crate::source::{MotionSource, SourceId};

/// Movement side: owns registered sources and reports kinematic state.
pub trait MovementComponent {
    /// Takes ownership of `source`. `None` means the source was rejected.
    fn register_source(&mut self, source: MotionSource) -> Option<SourceId>;

    /// Removing an id that is unknown or already removed is a no-op.
    fn remove_source_by_id(&mut self, id: SourceId);

    fn find_source_by_name(&self, name: &str) -> Option<&MotionSource>;

    fn velocity(&self) -> Vec3;

    fn last_update_velocity(&self) -> Vec3;

    fn acceleration(&self) -> Vec3;

    fn is_moving_on_ground(&self) -> bool;
}

/// Actor side: facing, control, network role and locomotion queries.
pub trait CharacterActor {
    fn rotation(&self) -> Rotator;

    fn set_rotation(&mut self, rotation: Rotator);

    fn forward(&self) -> Vec3 {
        self.rotation().direction()
    }

    fn has_controller(&self) -> bool;

    fn control_rotation(&self) -> Rotator;

    fn has_authority(&self) -> bool;

    fn is_locally_controlled(&self) -> bool;

    /// Neither authority nor the owning client: a remote puppet.
    fn is_simulated_proxy(&self) -> bool {
        !self.has_authority() && !self.is_locally_controlled()
    }

    fn is_walking(&self) -> bool;

    fn is_sprinting(&self) -> bool;

    fn force_net_update(&mut self);

    /// `None` when this actor cannot swim.
    fn as_aquatic(&self) -> Option<&dyn AquaticCapability>;
}

pub trait AquaticCapability {
    /// True when the actor is at least `depth` below the water surface.
    fn is_in_water(&self, depth: f32) -> bool;
}

/// Kinematic state handed to sources while they synthesize motion.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MovementSnapshot {
    pub velocity: Vec3,
    pub last_update_velocity: Vec3,
    pub acceleration: Vec3,
}

impl MovementSnapshot {
    pub fn of(movement: &dyn MovementComponent) -> Self {
        Self {
            velocity: movement.velocity(),
            last_update_velocity: movement.last_update_velocity(),
            acceleration: movement.acceleration(),
        }
    }
}
