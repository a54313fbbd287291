use {
    crate::{ENEMY_FSM, enemy_states},
    bevy::prelude::*,
    collision::register_collider,
    collision_components::{AabbCollider, ColliderType},
    combat::attach_brain,
    combat_components::*,
    combat_resources::{EnemyConfig, EnemyRoster, SceneRoots, SimConfig},
    fsm::StateId,
    pool::{acquire, release},
    rand::Rng,
    std::time::Duration,
    system_schedule::{CancelToken, Step, TaskScheduler},
};

pub const SPAWNER_TASK: &str = "enemy_spawner";

/// Starts the periodic spawner: one attempt right away, then one per
/// interval. Each attempt tops the roster up by a single enemy.
pub fn start_enemy_spawner(world: &mut World) {
    let config = world
        .get_resource::<SimConfig>()
        .map(|config| config.spawner.clone())
        .unwrap_or_default();
    let interval = Duration::from_millis(config.interval_ms);

    let Some(mut scheduler) = world.get_resource_mut::<TaskScheduler>() else {
        warn!("no task scheduler, enemies will not spawn");
        return;
    };
    scheduler.spawn(SPAWNER_TASK, CancelToken::new(), move |world: &mut World| {
        let alive = world.get_resource::<EnemyRoster>().map_or(0, EnemyRoster::len);
        if alive < config.max_enemies {
            let extent = config.spawn_extent.abs();
            let mut rng = rand::rng();
            let at = Vec2::new(
                rng.random_range(-extent..=extent),
                rng.random_range(-extent..=extent),
            );
            spawn_enemy(world, at);
        }
        Step::After(interval)
    });
    info!(?interval, max_enemies = config.max_enemies, "enemy spawner started");
}

/// Acquires an enemy from the pool, resets it to full strength at `at` and
/// gives it a fresh brain in [`crate::Move`].
pub fn spawn_enemy(world: &mut World, at: Vec2) -> Option<Entity> {
    let config = world
        .get_resource::<SimConfig>()
        .map(|config| config.enemy.clone())
        .unwrap_or_default();
    let parent = world.get_resource::<SceneRoots>().map(|roots| roots.enemies);

    let enemy = acquire(world, &config.prefab, parent)?;
    reset_enemy(world, enemy, &config, at);

    if let Err(error) = attach_brain(
        world,
        enemy,
        ENEMY_FSM,
        enemy_states(&config),
        StateId::of::<crate::Move>(),
        StateId::of::<crate::Die>(),
    ) {
        error!(?enemy, %error, "enemy brain rejected, releasing");
        release(world, enemy);
        return None;
    }

    if let Some(mut roster) = world.get_resource_mut::<EnemyRoster>() {
        roster.insert(enemy);
    }
    info!(?enemy, position = ?at, prefab = %config.prefab, "enemy spawned");
    Some(enemy)
}

fn reset_enemy(world: &mut World, enemy: Entity, config: &EnemyConfig, at: Vec2) {
    let size = Vec2::from(config.collider_size);
    let mut entity = world.entity_mut(enemy);
    entity
        .insert((
            Enemy,
            Health::new(config.health),
            MovementSpeed(config.speed),
            AttackPower(config.attack_power),
            AttackRange(config.attack_range),
            AttackCooldown(config.attack_cooldown),
            Transform::from_translation(at.extend(0.0)),
        ))
        .remove::<(Dead, PendingDeath)>();

    let collider = entity
        .get::<AabbCollider>()
        .cloned()
        .unwrap_or_else(|| AabbCollider::new(ColliderType::Enemy, size));
    entity.insert(AabbCollider {
        size,
        enabled: true,
        ..collider
    });
    register_collider(world, enemy);
}
