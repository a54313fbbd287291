mod brain_states;


use {
    bevy::prelude::*,
    collision_components::{AabbCollider, ColliderType},
    combat::{UnitState, attach_brain},
    combat_components::*,
    combat_resources::{PlayerConfig, SceneRoots, SimConfig},
    fsm::{FsmError, StateEntry, StateId, validate},
    skill_components::SkillLoadout,
    states::SimState,
};

pub use brain_states::*;

pub const PLAYER_FSM: &str = "player";
/// Blackboard key of the enemy the player is attacking.
pub const TARGET_ENEMY: &str = "target_enemy";

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, validate_player_states)
            .add_systems(OnEnter(SimState::Running), spawn_player);
    }
}

pub fn player_states(config: &PlayerConfig) -> Vec<UnitState> {
    vec![
        StateEntry::new(Idle),
        StateEntry::new(Attack),
        StateEntry::new(Die::new(config.death_delay)),
    ]
}

fn validate_player_states(mut exit: MessageWriter<AppExit>) {
    match validate(PLAYER_FSM, &player_states(&PlayerConfig::default())) {
        Ok(()) => debug!("player state machine validated"),
        Err(error) => {
            error!(%error, "player state machine is misconfigured");
            exit.write(AppExit::error());
        }
    }
}

fn spawn_player(world: &mut World) {
    let config = world
        .get_resource::<SimConfig>()
        .map(|config| config.player.clone())
        .unwrap_or_default();

    match build_player(world, &config, Vec2::ZERO) {
        Ok(player) => info!(
            ?player,
            health = config.health,
            skills = ?config.skills,
            "player spawned"
        ),
        Err(error) => error!(%error, "player brain rejected"),
    }
}

/// Spawns the player under the units root and starts its brain in [`Idle`].
pub fn build_player(world: &mut World, config: &PlayerConfig, at: Vec2) -> Result<Entity, FsmError> {
    let parent = world.get_resource::<SceneRoots>().map(|roots| roots.units);

    let mut entity = world.spawn((
        Name::new("Player"),
        Player,
        Health::new(config.health),
        AttackPower(config.attack_power),
        MovementSpeed(config.speed),
        Transform::from_translation(at.extend(0.0)),
        AabbCollider::new(ColliderType::Player, Vec2::from(config.collider_size)),
        SkillLoadout::new(config.skills.iter().copied()),
    ));
    if let Some(parent) = parent {
        entity.insert(ChildOf(parent));
    }
    let player = entity.id();

    attach_brain(
        world,
        player,
        PLAYER_FSM,
        player_states(config),
        StateId::of::<Idle>(),
        StateId::of::<Die>(),
    )?;
    Ok(player)
}
