pub mod selection;
pub mod systems;


use {
    bevy::prelude::*,
    collision_components::{AabbCollider, ColliderType},
    pool::PrefabRegistry,
    skill_components::*,
    skills_assets::*,
    states::SimState,
};

pub use {selection::*, systems::*};

pub struct SkillsPlugin;

impl Plugin for SkillsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(SkillsAssetsPlugin)
            .register_type::<SkillLoadout>()
            .add_systems(Startup, register_skill_prefabs)
            .add_systems(OnEnter(SimState::Running), start_cooldown_decay)
            .add_observer(systems::on_skill_instance_collision);
    }
}

pub const MAGIC_BOLT_PREFAB: &str = "Bullet1";
pub const FIREBALL_PREFAB: &str = "Fireball";

fn magic_bolt(entity: &mut EntityWorldMut) {
    entity.insert((
        Name::new(MAGIC_BOLT_PREFAB),
        AabbCollider::new(ColliderType::Bullet, Vec2::splat(0.3)),
    ));
}

fn fireball(entity: &mut EntityWorldMut) {
    entity.insert((
        Name::new(FIREBALL_PREFAB),
        AabbCollider::new(ColliderType::Bullet, Vec2::splat(0.6)),
    ));
}

pub fn register_skill_prefabs(mut prefabs: ResMut<PrefabRegistry>) {
    prefabs.register(MAGIC_BOLT_PREFAB, magic_bolt);
    prefabs.register(FIREBALL_PREFAB, fireball);
}
