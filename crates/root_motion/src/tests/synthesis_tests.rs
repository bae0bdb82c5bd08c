//! Motion produced by each variant for a single source.

use bevy::prelude::*;

use crate::body::{CharacterBody, NetRole};
use crate::collaborator::MovementSnapshot;
use crate::curve::{CurveLibrary, FloatCurve};
use crate::rotator::Rotator;
use crate::source::{
    BreachArc, BreachRise, ForwardForce, MotionSource, MotionVariant, ProxyPolicy, time_scale,
};

fn dash(strength: f32, duration: f32) -> MotionSource {
    MotionSource::new(
        "dash",
        strength,
        duration,
        MotionVariant::ForwardForce(ForwardForce::new(None)),
    )
}

fn rise(strength: f32) -> MotionSource {
    MotionSource::new(
        "rise",
        strength,
        4.0,
        MotionVariant::BreachRise(BreachRise::new(120.0)),
    )
}

fn jump(initial: Rotator, rotation_speed: f32) -> MotionSource {
    MotionSource::new(
        "jump",
        1.0,
        3.0,
        MotionVariant::BreachJump(BreachArc::new(initial, rotation_speed)),
    )
}

fn moving(velocity: Vec3) -> MovementSnapshot {
    MovementSnapshot {
        velocity,
        last_update_velocity: velocity,
        acceleration: Vec3::ZERO,
    }
}

#[test]
fn test_time_scale_guards_tiny_ticks() {
    assert_eq!(time_scale(0.2, 0.1), 2.0);
    assert_eq!(time_scale(0.2, 0.0), 1.0);
}

#[test]
fn test_catch_up_stretches_translation() {
    let actor = CharacterBody::new(Rotator::ZERO);
    let mut source = dash(500.0, -1.0);

    let motion = source.prepare_motion(0.3, 0.1, &actor, &MovementSnapshot::default());

    assert!(motion.translation.distance(Vec3::new(1500.0, 0.0, 0.0)) < 1.0e-2);
    assert!((source.elapsed() - 0.3).abs() < 1.0e-6);
}

#[test]
fn test_negative_simulation_time_never_rewinds_elapsed() {
    let actor = CharacterBody::new(Rotator::ZERO);
    let proxy = CharacterBody::new(Rotator::ZERO).with_role(NetRole::SimulatedProxy);
    let mut source = dash(500.0, 2.0);

    source.prepare_motion(0.5, 0.1, &actor, &MovementSnapshot::default());
    let motion = source.prepare_motion(-0.2, 0.1, &actor, &MovementSnapshot::default());
    assert_eq!(source.elapsed(), 0.5, "elapsed went backwards");
    assert_eq!(motion.translation, Vec3::ZERO, "no time simulated, no distance");

    source.prepare_motion(-0.2, 0.1, &proxy, &MovementSnapshot::default());
    assert_eq!(source.elapsed(), 0.5, "frozen proxies must not rewind either");
}

#[test]
fn test_forward_force_freezes_on_simulated_proxies() {
    let proxy = CharacterBody::new(Rotator::ZERO).with_role(NetRole::SimulatedProxy);
    let mut source = dash(500.0, 2.0);

    let motion = source.prepare_motion(0.1, 0.1, &proxy, &MovementSnapshot::default());

    assert_eq!(motion.translation, Vec3::ZERO);
    assert_eq!(motion.rotation, Quat::IDENTITY);
    assert!((source.elapsed() - 0.1).abs() < 1.0e-6, "time still advances");
}

#[test]
fn test_forward_force_moves_owning_client() {
    let owner = CharacterBody::new(Rotator::ZERO).with_role(NetRole::AutonomousProxy);
    let mut source = dash(500.0, 2.0);
    let motion = source.prepare_motion(0.1, 0.1, &owner, &MovementSnapshot::default());
    assert!(motion.translation.distance(Vec3::new(500.0, 0.0, 0.0)) < 1.0e-2);
}

/// Breach stages keep simulating on proxies unless told otherwise.
#[test]
fn test_breach_stages_simulate_on_proxies_by_default() {
    let proxy = CharacterBody::new(Rotator::ZERO).with_role(NetRole::SimulatedProxy);
    let velocity = Vec3::new(300.0, 200.0, 0.0);

    let mut simulated = jump(Rotator::ZERO, 90.0);
    assert_eq!(simulated.proxy_policy, ProxyPolicy::Simulate);
    let motion = simulated.prepare_motion(0.1, 0.1, &proxy, &moving(velocity));
    assert!(motion.translation.distance(velocity) < 1.0e-3);

    let mut frozen = jump(Rotator::ZERO, 90.0).with_proxy_policy(ProxyPolicy::Freeze);
    let motion = frozen.prepare_motion(0.1, 0.1, &proxy, &moving(velocity));
    assert_eq!(motion.translation, Vec3::ZERO);
}

#[test]
fn test_forward_force_curve_uses_normalized_time() {
    let mut library = CurveLibrary::default();
    let ramp = library.register("ramp", FloatCurve::new([(0.0, 0.0), (1.0, 1.0)]));
    let actor = CharacterBody::new(Rotator::ZERO);
    let mut source = MotionSource::new(
        "dash",
        400.0,
        2.0,
        MotionVariant::ForwardForce(ForwardForce::new(Some(ramp))),
    );

    let start = source.prepare_motion(1.0, 1.0, &actor, &MovementSnapshot::default());
    let half = source.prepare_motion(0.1, 0.1, &actor, &MovementSnapshot::default());

    assert!(start.translation.length() < 1.0e-3, "curve starts at zero");
    assert!((half.translation.x - 200.0).abs() < 1.0e-2);
}

#[test]
fn test_infinite_forward_force_samples_raw_elapsed() {
    let mut library = CurveLibrary::default();
    let ramp = library.register("long", FloatCurve::new([(0.0, 0.0), (10.0, 1.0)]));
    let actor = CharacterBody::new(Rotator::ZERO);
    let mut source = MotionSource::new(
        "drift",
        100.0,
        -1.0,
        MotionVariant::ForwardForce(ForwardForce::new(Some(ramp))),
    );

    source.prepare_motion(5.0, 5.0, &actor, &MovementSnapshot::default());
    let motion = source.prepare_motion(0.1, 0.1, &actor, &MovementSnapshot::default());
    assert!((motion.translation.x - 50.0).abs() < 1.0e-2);
}

#[test]
fn test_forward_force_steers_at_bounded_rate() {
    let actor = CharacterBody::new(Rotator::ZERO);
    let mut source = MotionSource::new(
        "dash",
        500.0,
        2.0,
        MotionVariant::ForwardForce(ForwardForce::new(None).following_acceleration(90.0)),
    );
    let snapshot = MovementSnapshot {
        acceleration: Vec3::new(0.0, 0.0, -1.0),
        ..default()
    };

    let motion = source.prepare_motion(0.1, 0.1, &actor, &snapshot);
    let turned = Vec3::X.angle_between(motion.translation).to_degrees();

    assert!((turned - 9.0).abs() < 0.05, "turned {turned} degrees");
    assert!(motion.rotation != Quat::IDENTITY);
}

#[test]
fn test_forward_force_ignores_tiny_acceleration() {
    let actor = CharacterBody::new(Rotator::ZERO);
    let mut source = MotionSource::new(
        "dash",
        500.0,
        2.0,
        MotionVariant::ForwardForce(ForwardForce::new(None).following_acceleration(90.0)),
    );
    let snapshot = MovementSnapshot {
        acceleration: Vec3::new(1.0, 0.0, -0.01),
        ..default()
    };

    let motion = source.prepare_motion(0.1, 0.1, &actor, &snapshot);
    assert!(motion.translation.distance(Vec3::new(500.0, 0.0, 0.0)) < 1.0e-2);
}

#[test]
fn test_rise_ramp_is_monotonic_and_capped() {
    let actor = CharacterBody::new(Rotator::ZERO);
    let mut source = rise(900.0);
    let mut previous = 0.0;

    for _ in 0..10 {
        source.prepare_motion(0.3, 0.3, &actor, &MovementSnapshot::default());
        let MotionVariant::BreachRise(rise) = &source.variant else {
            panic!("variant changed");
        };
        let ramp = rise.ability_acceleration();
        assert!(ramp >= previous, "ramp went down from {previous} to {ramp}");
        assert!(ramp <= 1.0);
        previous = ramp;
    }
    assert_eq!(previous, 1.0);
}

#[test]
fn test_rise_ramp_follows_facing_without_turning() {
    let actor = CharacterBody::new(Rotator::new(0.0, 90.0, 0.0));
    let mut source = rise(800.0);

    let motion = source.prepare_motion(0.25, 0.25, &actor, &moving(Vec3::new(500.0, 0.0, 0.0)));

    assert!(motion.translation.distance(Vec3::new(0.0, 0.0, -200.0)) < 1.0e-2);
    assert_eq!(motion.rotation, Quat::IDENTITY);
}

#[test]
fn test_rise_after_ramp_follows_velocity_with_pitch_limit() {
    let actor = CharacterBody::new(Rotator::ZERO);
    let mut source = rise(900.0);
    source.prepare_motion(1.0, 1.0, &actor, &MovementSnapshot::default());

    let motion = source.prepare_motion(0.1, 0.1, &actor, &moving(Vec3::new(0.0, 400.0, 0.0)));
    let heading = Rotator::from_direction(motion.translation);

    assert!((heading.pitch - 80.0).abs() < 1.0e-2, "pitch {}", heading.pitch);
    assert!((motion.translation.length() - 900.0).abs() < 1.0e-2);
}

#[test]
fn test_rise_after_ramp_blends_toward_control() {
    let actor = CharacterBody::new(Rotator::ZERO).with_controller(Rotator::new(0.0, 90.0, 0.0));
    let mut source = rise(900.0);
    source.prepare_motion(1.0, 1.0, &actor, &MovementSnapshot::default());

    let motion = source.prepare_motion(0.1, 0.1, &actor, &MovementSnapshot::default());
    let heading = Rotator::from_direction(motion.translation);

    assert!((heading.yaw - 12.0).abs() < 0.05, "yaw {}", heading.yaw);
}

#[test]
fn test_jump_translation_is_scaled_velocity() {
    let actor = CharacterBody::new(Rotator::ZERO);
    let mut source = MotionSource::new(
        "jump",
        0.5,
        3.0,
        MotionVariant::BreachJump(BreachArc::new(Rotator::ZERO, 90.0)),
    );
    let motion = source.prepare_motion(0.1, 0.1, &actor, &moving(Vec3::new(200.0, 100.0, 0.0)));
    assert!(motion.translation.distance(Vec3::new(100.0, 50.0, 0.0)) < 1.0e-3);
}

#[test]
fn test_jump_heading_turns_at_constant_rate() {
    let actor = CharacterBody::new(Rotator::ZERO);
    let mut source = jump(Rotator::ZERO, 90.0);
    let toward_plus_z = moving(Vec3::new(0.0, 0.0, 300.0));

    for step in 1..=3 {
        source.prepare_motion(0.1, 0.1, &actor, &toward_plus_z);
        let MotionVariant::BreachJump(arc) = &source.variant else {
            panic!("variant changed");
        };
        let expected = -9.0 * step as f32;
        assert!(
            (arc.fall_rotation.yaw - expected).abs() < 1.0e-3,
            "step {step}: yaw {}",
            arc.fall_rotation.yaw
        );
    }
}

#[test]
fn test_fall_shares_jump_motion() {
    let actor = CharacterBody::new(Rotator::new(10.0, 0.0, 0.0));
    let snapshot = moving(Vec3::new(100.0, -300.0, 50.0));
    let mut jump_source = jump(Rotator::ZERO, 45.0);
    let mut fall_source = MotionSource::new(
        "fall",
        1.0,
        3.0,
        MotionVariant::BreachFall(BreachArc::new(Rotator::ZERO, 45.0)),
    );

    let a = jump_source.prepare_motion(0.1, 0.1, &actor, &snapshot);
    let b = fall_source.prepare_motion(0.1, 0.1, &actor, &snapshot);

    assert_eq!(a.translation, b.translation);
    assert!(a.rotation.abs_diff_eq(b.rotation, 1.0e-6));
}
