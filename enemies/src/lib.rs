mod brain_states;
mod spawner;

#[cfg(test)]
mod tests;

use {
    bevy::prelude::*,
    collision_components::{AabbCollider, ColliderType},
    combat::UnitState,
    combat_components::*,
    combat_events::EnemyKilled,
    combat_resources::{EnemyConfig, EnemyRoster},
    fsm::{StateEntry, validate},
    pool::PrefabRegistry,
    states::SimState,
};

pub use {brain_states::{Move, *}, spawner::*};

pub const ENEMY_FSM: &str = "enemy";
/// Blackboard key of the player an enemy is chasing.
pub const TARGET_PLAYER: &str = "target_player";
pub const DEFAULT_ENEMY_PREFAB: &str = "Enemy1";

pub struct EnemiesPlugin;

impl Plugin for EnemiesPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (validate_enemy_states, register_enemy_prefabs))
            .add_systems(OnEnter(SimState::Running), start_enemy_spawner)
            .add_observer(forget_killed_enemy);
    }
}

pub fn enemy_states(config: &EnemyConfig) -> Vec<UnitState> {
    vec![
        StateEntry::new(Move),
        StateEntry::new(Attack::default()),
        StateEntry::new(Die::new(config.death_delay)),
    ]
}

fn validate_enemy_states(mut exit: MessageWriter<AppExit>) {
    match validate(ENEMY_FSM, &enemy_states(&EnemyConfig::default())) {
        Ok(()) => debug!("enemy state machine validated"),
        Err(error) => {
            error!(%error, "enemy state machine is misconfigured");
            exit.write(AppExit::error());
        }
    }
}

fn enemy_prefab(entity: &mut EntityWorldMut) {
    entity.insert((
        Name::new(DEFAULT_ENEMY_PREFAB),
        Enemy,
        AabbCollider::new(ColliderType::Enemy, Vec2::ONE),
    ));
}

pub fn register_enemy_prefabs(mut prefabs: ResMut<PrefabRegistry>) {
    prefabs.register(DEFAULT_ENEMY_PREFAB, enemy_prefab);
}

fn forget_killed_enemy(trigger: On<EnemyKilled>, mut roster: ResMut<EnemyRoster>) {
    let enemy = trigger.event().entity;
    if roster.remove(enemy) {
        debug!(?enemy, alive = roster.len(), "enemy left the roster");
    }
}
