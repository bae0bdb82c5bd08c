use bevy::log::debug;
use bevy::prelude::*;
use leafwing_input_manager::Actionlike;
use leafwing_input_manager::prelude::{ActionState, InputMap};
use serde::{Deserialize, Serialize};

use crate::abilities::{ApplyForce, BreachSequence, can_breach, dash_request};
use crate::body::CharacterBody;
use crate::config::MotionConfig;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Reflect, Serialize, Deserialize, Actionlike)]
pub enum AbilityAction {
    #[actionlike(Button)]
    Dash,

    #[actionlike(Button)]
    Breach,
}

pub fn get_ability_input_map() -> InputMap<AbilityAction> {
    InputMap::<AbilityAction>::default()
        .with(AbilityAction::Dash, KeyCode::ShiftLeft)
        .with(AbilityAction::Dash, GamepadButton::East)
        .with(AbilityAction::Breach, KeyCode::Space)
        .with(AbilityAction::Breach, GamepadButton::South)
}

/// Turns freshly pressed ability buttons into force requests.
pub(crate) fn read_ability_input(
    mut commands: Commands,
    query: Query<(
        Entity,
        &ActionState<AbilityAction>,
        &CharacterBody,
        Has<BreachSequence>,
    )>,
    config: Res<MotionConfig>,
    mut apply: MessageWriter<ApplyForce>,
) {
    for (entity, action_state, body, breaching) in &query {
        if action_state.just_pressed(&AbilityAction::Dash) {
            apply.write(ApplyForce {
                entity,
                request: dash_request(&config),
            });
        }

        if action_state.just_pressed(&AbilityAction::Breach) {
            if breaching {
                debug!("Entity {:?} is already breaching", entity);
            } else if can_breach(body, &config) {
                commands.entity(entity).insert(BreachSequence::default());
            } else {
                debug!("Entity {:?} is not deep enough to breach", entity);
            }
        }
    }
}
