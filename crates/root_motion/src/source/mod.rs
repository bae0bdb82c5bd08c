//! A single active force application and its variant payloads.

mod synthesis;

use std::ops::BitOr;

use bevy::prelude::{Reflect, Vec3};
use serde::{Deserialize, Serialize};

use crate::curve::CurveHandle;
use crate::rotator::Rotator;

pub use synthesis::{RootMotion, time_scale};

/// Strength difference still treated as the same source after replication.
pub const MATCH_STRENGTH_TOLERANCE: f32 = 0.1;
/// Elapsed-time difference still treated as the same state.
pub const STATE_TIME_TOLERANCE: f32 = 1.0e-4;
/// Priority every source in this crate is registered with.
pub const DEFAULT_PRIORITY: u16 = 5;
/// Angular dead zone (radians) for heading blends.
pub const HEADING_TOLERANCE: f32 = 0.05;
/// Below this speed a velocity no longer defines a heading.
pub const MIN_HEADING_SPEED: f32 = 10.0;
pub const DEFAULT_PITCH_LIMIT: f32 = 80.0;

/// Handle issued by the movement component when a source is registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId(pub u16);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum AccumulateMode {
    /// Replaces the velocity locomotion computed for the tick.
    #[default]
    Override,
    /// Adds to whatever the earlier sources produced.
    Additive,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSettings(u8);

impl SourceSettings {
    pub const NONE: Self = Self(0);
    /// Do not shorten the last tick to the remaining duration.
    pub const DISABLE_PARTIAL_END_TICK: Self = Self(1);
    /// Override sources leave the vertical velocity alone.
    pub const IGNORE_VERTICAL_ACCUMULATE: Self = Self(1 << 1);
    /// Any upward motion counts as having left the ground.
    pub const USE_SENSITIVE_LIFTOFF_CHECK: Self = Self(1 << 2);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for SourceSettings {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// What a source does when the actor is a remote puppet it does not own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum ProxyPolicy {
    /// Produce no motion, only advance time.
    Freeze,
    /// Compute full motion like the owner would.
    Simulate,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum FinishVelocityMode {
    #[default]
    MaintainLastRootMotionVelocity,
    SetVelocity,
    ClampVelocity,
}

/// Velocity fix-up the movement component applies when the source is removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Reflect, Serialize, Deserialize)]
pub struct FinishVelocity {
    pub mode: FinishVelocityMode,
    pub set_velocity: Vec3,
    pub clamp: f32,
}

impl FinishVelocity {
    pub fn set(velocity: Vec3) -> Self {
        Self {
            mode: FinishVelocityMode::SetVelocity,
            set_velocity: velocity,
            clamp: 0.0,
        }
    }

    pub fn clamp(max_speed: f32) -> Self {
        Self {
            mode: FinishVelocityMode::ClampVelocity,
            set_velocity: Vec3::ZERO,
            clamp: max_speed,
        }
    }

    pub fn apply(&self, velocity: Vec3) -> Vec3 {
        match self.mode {
            FinishVelocityMode::MaintainLastRootMotionVelocity => velocity,
            FinishVelocityMode::SetVelocity => self.set_velocity,
            FinishVelocityMode::ClampVelocity => velocity.clamp_length_max(self.clamp.max(0.0)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum MotionKind {
    ForwardForce,
    BreachRise,
    BreachJump,
    BreachFall,
}

impl MotionKind {
    pub fn is_breach(self) -> bool {
        !matches!(self, MotionKind::ForwardForce)
    }
}

/// Dash along the actor's facing, optionally steered by acceleration and
/// shaped by a strength curve.
#[derive(Clone, Debug, PartialEq)]
pub struct ForwardForce {
    pub curve: Option<CurveHandle>,
    pub follow_acceleration: bool,
    /// Degrees per second the heading may turn toward acceleration.
    pub turn_rate: f32,
    heading: Option<Vec3>,
}

impl ForwardForce {
    pub fn new(curve: Option<CurveHandle>) -> Self {
        Self {
            curve,
            follow_acceleration: false,
            turn_rate: 0.0,
            heading: None,
        }
    }

    pub fn following_acceleration(mut self, turn_rate: f32) -> Self {
        self.follow_acceleration = true;
        self.turn_rate = turn_rate;
        self
    }

    pub fn heading(&self) -> Option<Vec3> {
        self.heading
    }

    pub(crate) fn restore_heading(&mut self, heading: Option<Vec3>) {
        self.heading = heading;
    }
}

/// Surfacing stage: ramps up along the facing, then follows velocity blended
/// toward the control rotation.
#[derive(Clone, Debug, PartialEq)]
pub struct BreachRise {
    ability_acceleration: f32,
    /// Degrees per second the heading may turn toward the control rotation.
    pub rotation_speed: f32,
    pub pitch_limit: f32,
}

impl BreachRise {
    pub fn new(rotation_speed: f32) -> Self {
        Self {
            ability_acceleration: 0.0,
            rotation_speed,
            pitch_limit: DEFAULT_PITCH_LIMIT,
        }
    }

    /// Ramp-up factor in `[0, 1]`. Reaching `1.0` ends the ramp for good.
    pub fn ability_acceleration(&self) -> f32 {
        self.ability_acceleration
    }

    pub fn is_ramping(&self) -> bool {
        self.ability_acceleration < 1.0
    }

    pub(crate) fn restore_ramp(&mut self, ability_acceleration: f32) {
        self.ability_acceleration = ability_acceleration.clamp(0.0, 1.0);
    }
}

/// Payload shared by the jump and fall stages: velocity-driven motion with a
/// heading that turns toward the velocity at a constant rate.
#[derive(Clone, Debug, PartialEq)]
pub struct BreachArc {
    pub fall_rotation: Rotator,
    /// Degrees per second.
    pub rotation_speed: f32,
}

impl BreachArc {
    pub fn new(initial_rotation: Rotator, rotation_speed: f32) -> Self {
        Self {
            fall_rotation: initial_rotation,
            rotation_speed,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MotionVariant {
    ForwardForce(ForwardForce),
    BreachRise(BreachRise),
    BreachJump(BreachArc),
    BreachFall(BreachArc),
}

impl MotionVariant {
    pub fn kind(&self) -> MotionKind {
        match self {
            MotionVariant::ForwardForce(_) => MotionKind::ForwardForce,
            MotionVariant::BreachRise(_) => MotionKind::BreachRise,
            MotionVariant::BreachJump(_) => MotionKind::BreachJump,
            MotionVariant::BreachFall(_) => MotionKind::BreachFall,
        }
    }

    fn default_settings(&self) -> SourceSettings {
        match self {
            MotionVariant::ForwardForce(_) => SourceSettings::NONE,
            MotionVariant::BreachRise(_) | MotionVariant::BreachFall(_) => {
                SourceSettings::DISABLE_PARTIAL_END_TICK
            }
            MotionVariant::BreachJump(_) => {
                SourceSettings::DISABLE_PARTIAL_END_TICK
                    | SourceSettings::USE_SENSITIVE_LIFTOFF_CHECK
            }
        }
    }

    fn default_proxy_policy(&self) -> ProxyPolicy {
        match self {
            MotionVariant::ForwardForce(_) => ProxyPolicy::Freeze,
            _ => ProxyPolicy::Simulate,
        }
    }
}

/// One force applied to a character.
///
/// Identity (`id`) belongs to the movement component that registered it.
/// Finishing is the owning task's business: the source keeps producing motion
/// past its duration until someone removes it.
#[derive(Debug)]
pub struct MotionSource {
    id: Option<SourceId>,
    pub instance_name: String,
    pub accumulate_mode: AccumulateMode,
    pub priority: u16,
    strength: f32,
    duration: f32,
    elapsed: f32,
    pub settings: SourceSettings,
    pub enable_gravity: bool,
    pub finish_velocity: FinishVelocity,
    pub proxy_policy: ProxyPolicy,
    needs_catchup: bool,
    pub variant: MotionVariant,
}

impl MotionSource {
    /// A negative `duration` never times out.
    pub fn new(
        instance_name: impl Into<String>,
        strength: f32,
        duration: f32,
        variant: MotionVariant,
    ) -> Self {
        Self {
            id: None,
            instance_name: instance_name.into(),
            accumulate_mode: AccumulateMode::Override,
            priority: DEFAULT_PRIORITY,
            strength,
            duration,
            elapsed: 0.0,
            settings: variant.default_settings(),
            enable_gravity: false,
            finish_velocity: FinishVelocity::default(),
            proxy_policy: variant.default_proxy_policy(),
            needs_catchup: false,
            variant,
        }
    }

    pub fn with_priority(mut self, priority: u16) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_accumulate_mode(mut self, mode: AccumulateMode) -> Self {
        self.accumulate_mode = mode;
        self
    }

    pub fn with_settings(mut self, settings: SourceSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_gravity(mut self, enable_gravity: bool) -> Self {
        self.enable_gravity = enable_gravity;
        self
    }

    pub fn with_finish_velocity(mut self, finish_velocity: FinishVelocity) -> Self {
        self.finish_velocity = finish_velocity;
        self
    }

    pub fn with_proxy_policy(mut self, policy: ProxyPolicy) -> Self {
        self.proxy_policy = policy;
        self
    }

    pub fn id(&self) -> Option<SourceId> {
        self.id
    }

    /// Called by the movement component on registration.
    pub fn set_id(&mut self, id: SourceId) {
        self.id = Some(id);
    }

    pub fn kind(&self) -> MotionKind {
        self.variant.kind()
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn has_infinite_duration(&self) -> bool {
        self.duration < 0.0
    }

    /// Time left before the duration runs out, `None` when infinite.
    pub fn remaining(&self) -> Option<f32> {
        (!self.has_infinite_duration()).then(|| (self.duration - self.elapsed).max(0.0))
    }

    /// Set when authoritative progress overwrote local progress. The movement
    /// component clears it the next time it evaluates the source.
    pub fn needs_catchup(&self) -> bool {
        self.needs_catchup
    }

    pub(crate) fn take_catchup(&mut self) -> bool {
        std::mem::take(&mut self.needs_catchup)
    }

    /// Same variant, strength within [`MATCH_STRENGTH_TOLERANCE`], same
    /// priority and accumulate mode, plus the same curve for forward forces or
    /// the same settings for breach stages.
    pub fn matches(&self, other: &MotionSource) -> bool {
        if self.kind() != other.kind()
            || self.priority != other.priority
            || self.accumulate_mode != other.accumulate_mode
            || (self.strength - other.strength).abs() >= MATCH_STRENGTH_TOLERANCE
        {
            return false;
        }
        match (&self.variant, &other.variant) {
            (MotionVariant::ForwardForce(a), MotionVariant::ForwardForce(b)) => {
                a.curve.as_ref().map(CurveHandle::id) == b.curve.as_ref().map(CurveHandle::id)
            }
            _ => self.settings == other.settings,
        }
    }

    pub fn matches_and_has_same_state(&self, other: &MotionSource) -> bool {
        self.matches(other) && (self.elapsed - other.elapsed).abs() <= STATE_TIME_TOLERANCE
    }

    /// Pulls time progress from an authoritative copy, keeping this source's
    /// identity. Fails when the variants differ.
    pub fn update_state_from(&mut self, source: &MotionSource, mark_for_catchup: bool) -> bool {
        if self.kind() != source.kind() {
            return false;
        }
        self.elapsed = source.elapsed;
        self.needs_catchup = mark_for_catchup;
        true
    }

    pub(crate) fn restore_progress(&mut self, elapsed: f32) {
        self.elapsed = elapsed.max(0.0);
    }
}

/// Deep copy without identity: the copy has to be registered to get an id.
impl Clone for MotionSource {
    fn clone(&self) -> Self {
        Self {
            id: None,
            instance_name: self.instance_name.clone(),
            accumulate_mode: self.accumulate_mode,
            priority: self.priority,
            strength: self.strength,
            duration: self.duration,
            elapsed: self.elapsed,
            settings: self.settings,
            enable_gravity: self.enable_gravity,
            finish_velocity: self.finish_velocity,
            proxy_policy: self.proxy_policy,
            needs_catchup: self.needs_catchup,
            variant: self.variant.clone(),
        }
    }
}
