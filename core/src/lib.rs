mod systems;

use {
    bevy::prelude::*,
    collision::CollisionPlugin,
    combat::CombatPlugin,
    combat_resources::CombatResourcesPlugin,
    enemies::EnemiesPlugin,
    loading::LoadingManagerPlugin,
    player::PlayerPlugin,
    pool::PoolPlugin,
    skills::SkillsPlugin,
    states::SimState,
    system_schedule::SystemSchedulePlugin,
};

pub use systems::*;

/// Whole simulation. Expects `MinimalPlugins` (or more), `AssetPlugin` and
/// `StatesPlugin` to be added first.
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        // `teardown` releases these services in reverse order.
        app.init_state::<SimState>()
            .add_plugins((
                CollisionPlugin,
                PoolPlugin,
                SkillsPlugin,
                SystemSchedulePlugin,
                CombatResourcesPlugin,
                CombatPlugin,
                PlayerPlugin,
                EnemiesPlugin,
                LoadingManagerPlugin,
            ))
            .add_systems(Startup, spawn_scene_roots)
            .add_systems(
                OnEnter(SimState::GameOver),
                (shutdown_simulation, exit_after_game_over).chain(),
            );
    }
}
