use bevy::{
    log::debug,
    prelude::{App, Plugin, default},
};
use lightyear::input::config::InputConfig;
use lightyear::prelude::input::leafwing;
use lightyear::prelude::*;

use crate::abilities::BreachSequence;
use crate::input::AbilityAction;
use crate::replication::ActiveForces;

/// Networking registrations for root motion. Added next to lightyear's
/// client or server plugins, never on its own.
#[derive(Clone)]
pub struct ProtocolPlugin;

impl Plugin for ProtocolPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(leafwing::InputPlugin::<AbilityAction> {
            config: InputConfig::<AbilityAction> {
                rebroadcast_inputs: false,
                lag_compensation: true,
                ..default()
            },
        });

        app.register_component::<ActiveForces>().add_prediction();
        app.register_component::<BreachSequence>().add_prediction();

        debug!("Root motion protocol registered");
    }
}
