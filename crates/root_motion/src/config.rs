use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::source::{DEFAULT_PITCH_LIMIT, DEFAULT_PRIORITY, ProxyPolicy};

/// Root motion tunables shared by every character.
#[derive(Resource, Reflect, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct MotionConfig {
    pub source_priority: u16,
    /// Depth below the surface that counts as "in water" for breach stages.
    pub water_depth_threshold: f32,
    /// Degrees per second jump/fall headings turn toward velocity.
    pub breach_rotation_speed: f32,
    /// Degrees per second the rise heading blends toward the control rotation.
    pub rise_turn_rate: f32,
    pub rise_pitch_limit: f32,
    /// Degrees per second a dash may steer toward acceleration.
    pub forward_turn_rate: f32,
    pub forward_proxy_policy: ProxyPolicy,
    pub breach_proxy_policy: ProxyPolicy,
    pub dash: DashConfig,
    pub breach: BreachConfig,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            source_priority: DEFAULT_PRIORITY,
            water_depth_threshold: 50.0,
            breach_rotation_speed: 90.0,
            rise_turn_rate: 120.0,
            rise_pitch_limit: DEFAULT_PITCH_LIMIT,
            forward_turn_rate: 180.0,
            forward_proxy_policy: ProxyPolicy::Freeze,
            breach_proxy_policy: ProxyPolicy::Simulate,
            dash: DashConfig::default(),
            breach: BreachConfig::default(),
        }
    }
}

#[derive(Reflect, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DashConfig {
    pub strength: f32,
    pub duration: f32,
    pub follow_acceleration: bool,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            strength: 1200.0,
            duration: 0.35,
            follow_acceleration: true,
        }
    }
}

#[derive(Reflect, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct BreachConfig {
    pub rise_strength: f32,
    pub rise_duration: f32,
    /// Fraction of the current velocity kept while airborne, at most 1.
    pub jump_strength: f32,
    pub jump_duration: f32,
    pub fall_strength: f32,
    pub fall_duration: f32,
}

impl Default for BreachConfig {
    fn default() -> Self {
        Self {
            rise_strength: 900.0,
            rise_duration: 4.0,
            jump_strength: 1.0,
            jump_duration: 3.0,
            fall_strength: 1.0,
            fall_duration: 5.0,
        }
    }
}
