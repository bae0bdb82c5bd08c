//! Replicated root motion state next to lightyear's registrations.

use bevy::prelude::*;

use crate::RootMotionPlugin;
use crate::abilities::{ApplyForce, BreachSequence, BreachStage};
use crate::body::CharacterBody;
use crate::movement::RootMotionSources;
use crate::protocol::ProtocolPlugin;
use crate::replication::{ActiveForces, ForceDescriptor};
use crate::rotator::Rotator;
use crate::source::{AccumulateMode, MotionKind};
use crate::task::ForceRequest;

fn setup_networked_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(ProtocolPlugin);
    app.insert_resource(Time::<Fixed>::from_hz(10.0));
    app.add_plugins(RootMotionPlugin);
    app
}

#[test]
fn test_registered_components_are_stored() {
    let mut app = setup_networked_app();
    let entity = app
        .world_mut()
        .spawn((
            CharacterBody::new(Rotator::ZERO),
            BreachSequence {
                stage: BreachStage::Jump,
            },
        ))
        .id();

    assert_eq!(
        app.world().get::<BreachSequence>(entity).map(|sequence| sequence.stage),
        Some(BreachStage::Jump),
        "BreachSequence should be stored as inserted"
    );
    assert_eq!(
        app.world().get::<ActiveForces>(entity),
        Some(&ActiveForces::default()),
        "ActiveForces should start empty"
    );
}

#[test]
fn test_active_forces_publish_descriptors() {
    let mut app = setup_networked_app();
    let entity = app
        .world_mut()
        .spawn((CharacterBody::new(Rotator::ZERO), RootMotionSources::default()))
        .id();
    app.world_mut().write_message(ApplyForce {
        entity,
        request: ForceRequest::forward_force("shove", 400.0, 2.0)
            .with_accumulate_mode(AccumulateMode::Additive),
    });

    app.world_mut().run_schedule(FixedUpdate);

    let active = app.world().get::<ActiveForces>(entity).unwrap();
    assert_eq!(active.0.len(), 1, "one force should be published");
    let ForceDescriptor {
        name,
        kind,
        strength,
        duration,
        accumulate_mode,
        ..
    } = &active.0[0];
    assert_eq!(name, "shove");
    assert_eq!(*kind, MotionKind::ForwardForce);
    assert_eq!(*strength, 400.0);
    assert_eq!(*duration, 2.0);
    assert_eq!(*accumulate_mode, AccumulateMode::Additive);
}
