use crate::curve::{CurveHandle, CurveId};
use crate::source::{AccumulateMode, FinishVelocity, MotionKind};

/// Parameters an ability hands over when it applies a force.
#[derive(Clone, Debug, PartialEq)]
pub struct ForceParams {
    pub strength: f32,
    /// Negative means the force never times out.
    pub duration: f32,
    pub accumulate_mode: AccumulateMode,
    pub enable_gravity: bool,
    pub finish_velocity: FinishVelocity,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ForceShape {
    ForwardForce {
        curve: Option<CurveHandle>,
        follow_acceleration: bool,
    },
    BreachRise,
    BreachJump,
    BreachFall,
}

impl ForceShape {
    pub fn kind(&self) -> MotionKind {
        match self {
            ForceShape::ForwardForce { .. } => MotionKind::ForwardForce,
            ForceShape::BreachRise => MotionKind::BreachRise,
            ForceShape::BreachJump => MotionKind::BreachJump,
            ForceShape::BreachFall => MotionKind::BreachFall,
        }
    }

    pub fn curve_id(&self) -> Option<CurveId> {
        match self {
            ForceShape::ForwardForce { curve, .. } => curve.as_ref().map(CurveHandle::id),
            _ => None,
        }
    }
}

/// Everything needed to create a [`super::ForceTask`].
#[derive(Clone, Debug, PartialEq)]
pub struct ForceRequest {
    pub name: String,
    pub shape: ForceShape,
    pub params: ForceParams,
}

impl ForceRequest {
    fn new(name: impl Into<String>, shape: ForceShape, strength: f32, duration: f32) -> Self {
        Self {
            name: name.into(),
            shape,
            params: ForceParams {
                strength,
                duration,
                accumulate_mode: AccumulateMode::Override,
                enable_gravity: false,
                finish_velocity: FinishVelocity::default(),
            },
        }
    }

    pub fn forward_force(name: impl Into<String>, strength: f32, duration: f32) -> Self {
        Self::new(
            name,
            ForceShape::ForwardForce {
                curve: None,
                follow_acceleration: false,
            },
            strength,
            duration,
        )
    }

    pub fn breach_rise(name: impl Into<String>, strength: f32, duration: f32) -> Self {
        Self::new(name, ForceShape::BreachRise, strength, duration)
    }

    /// `strength` scales the current velocity and must not exceed 1.
    pub fn breach_jump(name: impl Into<String>, strength: f32, duration: f32) -> Self {
        Self::new(name, ForceShape::BreachJump, strength, duration)
    }

    /// `strength` scales the current velocity and must not exceed 1.
    pub fn breach_fall(name: impl Into<String>, strength: f32, duration: f32) -> Self {
        Self::new(name, ForceShape::BreachFall, strength, duration)
    }

    /// Strength-over-time curve. Ignored by breach stages.
    pub fn with_curve(mut self, handle: CurveHandle) -> Self {
        if let ForceShape::ForwardForce { curve, .. } = &mut self.shape {
            *curve = Some(handle);
        }
        self
    }

    /// Steer a forward force toward the character's acceleration.
    pub fn following_acceleration(mut self) -> Self {
        if let ForceShape::ForwardForce {
            follow_acceleration,
            ..
        } = &mut self.shape
        {
            *follow_acceleration = true;
        }
        self
    }

    pub fn with_accumulate_mode(mut self, mode: AccumulateMode) -> Self {
        self.params.accumulate_mode = mode;
        self
    }

    pub fn with_gravity(mut self, enable_gravity: bool) -> Self {
        self.params.enable_gravity = enable_gravity;
        self
    }

    pub fn with_finish_velocity(mut self, finish_velocity: FinishVelocity) -> Self {
        self.params.finish_velocity = finish_velocity;
        self
    }

    pub fn kind(&self) -> MotionKind {
        self.shape.kind()
    }
}
