//! What travels over the network: push-style dirty tracking for the
//! descriptive parameters of each force, the replicated `ActiveForces`
//! component, and the serde form of a whole motion source.

use bevy::log::warn;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::curve::{CurveId, CurveLibrary};
use crate::rotator::Rotator;
use crate::source::{
    AccumulateMode, BreachArc, BreachRise, FinishVelocity, ForwardForce, MotionKind, MotionSource,
    MotionVariant, ProxyPolicy, SourceSettings,
};

// ============================================================================
// DIRTY TRACKING
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirtyFields(u8);

impl DirtyFields {
    pub const NONE: Self = Self(0);
    pub const STRENGTH: Self = Self(1);
    pub const DURATION: Self = Self(1 << 1);
    pub const ACCUMULATE_MODE: Self = Self(1 << 2);
    pub const GRAVITY: Self = Self(1 << 3);
    pub const CURVE: Self = Self(1 << 4);
    pub const ALL: Self = Self(0b1_1111);

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

/// Replicated parameters of one force. Setters only mark a field dirty when
/// the value actually changes; a fresh set is dirty everywhere.
#[derive(Clone, Debug, PartialEq)]
pub struct ReplicatedForceParams {
    strength: f32,
    duration: f32,
    accumulate_mode: AccumulateMode,
    enable_gravity: bool,
    curve: Option<CurveId>,
    dirty: DirtyFields,
}

impl ReplicatedForceParams {
    pub fn new(
        strength: f32,
        duration: f32,
        accumulate_mode: AccumulateMode,
        enable_gravity: bool,
        curve: Option<CurveId>,
    ) -> Self {
        Self {
            strength,
            duration,
            accumulate_mode,
            enable_gravity,
            curve,
            dirty: DirtyFields::ALL,
        }
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn accumulate_mode(&self) -> AccumulateMode {
        self.accumulate_mode
    }

    pub fn enable_gravity(&self) -> bool {
        self.enable_gravity
    }

    pub fn curve(&self) -> Option<CurveId> {
        self.curve
    }

    pub fn set_strength(&mut self, strength: f32) {
        if self.strength != strength {
            self.strength = strength;
            self.dirty.insert(DirtyFields::STRENGTH);
        }
    }

    pub fn set_duration(&mut self, duration: f32) {
        if self.duration != duration {
            self.duration = duration;
            self.dirty.insert(DirtyFields::DURATION);
        }
    }

    pub fn set_accumulate_mode(&mut self, mode: AccumulateMode) {
        if self.accumulate_mode != mode {
            self.accumulate_mode = mode;
            self.dirty.insert(DirtyFields::ACCUMULATE_MODE);
        }
    }

    pub fn set_enable_gravity(&mut self, enable_gravity: bool) {
        if self.enable_gravity != enable_gravity {
            self.enable_gravity = enable_gravity;
            self.dirty.insert(DirtyFields::GRAVITY);
        }
    }

    pub fn set_curve(&mut self, curve: Option<CurveId>) {
        if self.curve != curve {
            self.curve = curve;
            self.dirty.insert(DirtyFields::CURVE);
        }
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Returns the fields changed since the last call and clears them.
    pub fn take_dirty(&mut self) -> DirtyFields {
        std::mem::take(&mut self.dirty)
    }

    pub fn descriptor(&self, name: &str, kind: MotionKind) -> ForceDescriptor {
        ForceDescriptor {
            name: name.to_string(),
            kind,
            strength: self.strength,
            duration: self.duration,
            accumulate_mode: self.accumulate_mode,
            enable_gravity: self.enable_gravity,
            curve: self.curve,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForceDescriptor {
    pub name: String,
    pub kind: MotionKind,
    pub strength: f32,
    pub duration: f32,
    pub accumulate_mode: AccumulateMode,
    pub enable_gravity: bool,
    pub curve: Option<CurveId>,
}

/// Forces currently applied to a character, as seen by remote peers.
#[derive(Component, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveForces(pub Vec<ForceDescriptor>);

// ============================================================================
// WIRE FORMAT
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum VariantWire {
    ForwardForce {
        curve: Option<CurveId>,
        follow_acceleration: bool,
        turn_rate: f32,
        /// Steered heading so far, `None` until the first steered tick.
        heading: Option<Vec3>,
    },
    BreachRise {
        ability_acceleration: f32,
        rotation_speed: f32,
        pitch_limit: f32,
    },
    BreachJump {
        fall_rotation: Rotator,
        rotation_speed: f32,
    },
    BreachFall {
        fall_rotation: Rotator,
        rotation_speed: f32,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceWire {
    pub name: String,
    pub accumulate_mode: AccumulateMode,
    pub priority: u16,
    pub strength: f32,
    pub duration: f32,
    pub elapsed: f32,
    pub settings: u8,
    pub enable_gravity: bool,
    pub finish_velocity: FinishVelocity,
    pub proxy_policy: ProxyPolicy,
    pub variant: VariantWire,
}

impl MotionSource {
    /// Serializable form. Curves are sent by id only.
    pub fn to_wire(&self) -> SourceWire {
        let variant = match &self.variant {
            MotionVariant::ForwardForce(force) => VariantWire::ForwardForce {
                curve: force.curve.as_ref().map(|curve| curve.id()),
                follow_acceleration: force.follow_acceleration,
                turn_rate: force.turn_rate,
                heading: force.heading(),
            },
            MotionVariant::BreachRise(rise) => VariantWire::BreachRise {
                ability_acceleration: rise.ability_acceleration(),
                rotation_speed: rise.rotation_speed,
                pitch_limit: rise.pitch_limit,
            },
            MotionVariant::BreachJump(arc) => VariantWire::BreachJump {
                fall_rotation: arc.fall_rotation,
                rotation_speed: arc.rotation_speed,
            },
            MotionVariant::BreachFall(arc) => VariantWire::BreachFall {
                fall_rotation: arc.fall_rotation,
                rotation_speed: arc.rotation_speed,
            },
        };
        SourceWire {
            name: self.instance_name.clone(),
            accumulate_mode: self.accumulate_mode,
            priority: self.priority,
            strength: self.strength(),
            duration: self.duration(),
            elapsed: self.elapsed(),
            settings: self.settings.bits(),
            enable_gravity: self.enable_gravity,
            finish_velocity: self.finish_velocity,
            proxy_policy: self.proxy_policy,
            variant,
        }
    }

    /// Rebuilds a source received from the network. The result carries no id.
    /// A curve id unknown to `curves` degrades to an unshaped force.
    pub fn from_wire(wire: &SourceWire, curves: &CurveLibrary) -> MotionSource {
        let variant = match &wire.variant {
            VariantWire::ForwardForce {
                curve,
                follow_acceleration,
                turn_rate,
                heading,
            } => {
                let handle = curve.and_then(|id| {
                    let handle = curves.get(id);
                    if handle.is_none() {
                        warn!("Source '{}' references unknown curve {:?}", wire.name, id);
                    }
                    handle
                });
                let mut force = ForwardForce::new(handle);
                if *follow_acceleration {
                    force = force.following_acceleration(*turn_rate);
                }
                force.restore_heading(*heading);
                MotionVariant::ForwardForce(force)
            }
            VariantWire::BreachRise {
                ability_acceleration,
                rotation_speed,
                pitch_limit,
            } => {
                let mut rise = BreachRise::new(*rotation_speed);
                rise.pitch_limit = *pitch_limit;
                rise.restore_ramp(*ability_acceleration);
                MotionVariant::BreachRise(rise)
            }
            VariantWire::BreachJump {
                fall_rotation,
                rotation_speed,
            } => MotionVariant::BreachJump(BreachArc::new(*fall_rotation, *rotation_speed)),
            VariantWire::BreachFall {
                fall_rotation,
                rotation_speed,
            } => MotionVariant::BreachFall(BreachArc::new(*fall_rotation, *rotation_speed)),
        };

        let mut source = MotionSource::new(wire.name.clone(), wire.strength, wire.duration, variant)
            .with_accumulate_mode(wire.accumulate_mode)
            .with_priority(wire.priority)
            .with_settings(SourceSettings::from_bits(wire.settings))
            .with_gravity(wire.enable_gravity)
            .with_finish_velocity(wire.finish_velocity)
            .with_proxy_policy(wire.proxy_policy);
        source.restore_progress(wire.elapsed);
        source
    }
}
