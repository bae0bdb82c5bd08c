use std::time::Duration;

use avian3d::prelude::{GravityScale, LinearVelocity, Position};
use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use root_motion::abilities::{ApplyForce, BreachSequence, ForceCompleted, dash_request};
use root_motion::body::CharacterBody;
use root_motion::config::MotionConfig;
use root_motion::input::get_ability_input_map;
use root_motion::movement::RootMotionSources;
use root_motion::rotator::Rotator;
use root_motion::task::ForceCompletion;
use root_motion::{FIXED_TIMESTEP_HZ, RootMotionPlugin};

use crate::world::{WaterWorld, WaterWorldPlugin};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scenario {
    /// A runner on flat ground dashes forward.
    Dash,
    /// A swimmer deep underwater breaches, leaps and dives back in.
    Breach,
}

/// Completions observed during a run, in order.
#[derive(Resource, Default, Debug)]
pub struct CompletionLog(pub Vec<ForceCompletion>);

#[derive(Debug)]
pub struct ScenarioReport {
    pub completions: Vec<ForceCompletion>,
    pub position: Vec3,
    pub velocity: Vec3,
    pub ticks: u32,
}

/// Headless app on a fixed timestep. `log_level` installs a log subscriber,
/// which can only happen once per process.
pub fn create_sim_app(config: MotionConfig, world: WaterWorld, log_level: Option<Level>) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    if let Some(level) = log_level {
        app.add_plugins(LogPlugin {
            level,
            filter: "bevy_ecs=info,bevy_app=info".to_string(),
            ..default()
        });
    }
    app.insert_resource(Time::<Fixed>::from_duration(Duration::from_secs_f64(
        1.0 / FIXED_TIMESTEP_HZ,
    )));
    app.insert_resource(config);
    app.insert_resource(world);
    app.add_plugins(RootMotionPlugin);
    app.add_plugins(WaterWorldPlugin);
    app.init_resource::<CompletionLog>();
    app.add_systems(FixedPostUpdate, record_completions);
    app
}

fn record_completions(mut completed: MessageReader<ForceCompleted>, mut log: ResMut<CompletionLog>) {
    for ForceCompleted { entity, completion } in completed.read() {
        info!(
            "{:?}: {:?} '{}' completed with {:?}",
            entity, completion.kind, completion.name, completion.outcome
        );
        log.0.push(completion.clone());
    }
}

/// Spawns the scenario's character and kicks off its ability.
pub fn spawn_scenario(app: &mut App, scenario: Scenario) -> Entity {
    let floor = app.world().resource::<WaterWorld>().floor_height;
    let surface = app.world().resource::<WaterWorld>().surface_height;
    let world = app.world_mut();

    match scenario {
        Scenario::Dash => {
            let entity = world
                .spawn((
                    CharacterBody::new(Rotator::ZERO)
                        .with_controller(Rotator::ZERO)
                        .at(Vec3::new(0.0, floor, 0.0)),
                    RootMotionSources::default(),
                    Position(Vec3::new(0.0, floor, 0.0)),
                    LinearVelocity::default(),
                    GravityScale(1.0),
                    get_ability_input_map(),
                ))
                .id();
            let request = dash_request(world.resource::<MotionConfig>());
            world.write_message(ApplyForce { entity, request });
            entity
        }
        Scenario::Breach => {
            let start = Vec3::new(0.0, surface - 300.0, 0.0);
            let looking_up = Rotator::new(60.0, 0.0, 0.0);
            world
                .spawn((
                    CharacterBody::new(looking_up)
                        .with_controller(looking_up)
                        .swimming_under(surface)
                        .at(start),
                    RootMotionSources::default(),
                    Position(start),
                    LinearVelocity::default(),
                    GravityScale(1.0),
                    get_ability_input_map(),
                    BreachSequence::default(),
                ))
                .id()
        }
    }
}

/// Advances one fixed step: root motion, then the world integrator.
pub fn step(app: &mut App) {
    let world = app.world_mut();
    world.run_schedule(FixedUpdate);
    world.run_schedule(FixedPostUpdate);
}

pub fn run_scenario(app: &mut App, entity: Entity, ticks: u32) -> ScenarioReport {
    for _ in 0..ticks {
        step(app);
    }

    let world = app.world();
    ScenarioReport {
        completions: world.resource::<CompletionLog>().0.clone(),
        position: world.get::<Position>(entity).map_or(Vec3::ZERO, |position| position.0),
        velocity: world
            .get::<LinearVelocity>(entity)
            .map_or(Vec3::ZERO, |velocity| velocity.0),
        ticks,
    }
}
