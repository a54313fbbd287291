use {
    crate::*,
    bevy::time::TimeUpdateStrategy,
    collision::{CollisionPlugin, CollisionRegistry},
    combat::{Brain, CombatPlugin, apply_damage},
    combat_events::EnemyAttacked,
    combat_resources::{SceneRoots, SimConfig},
    pool::{ObjectPool, PoolPlugin, Pooled},
    std::time::Duration,
    system_schedule::{SystemSchedulePlugin, TaskScheduler},
};

#[derive(Resource, Default)]
struct Attacks(Vec<(Entity, Entity, i32)>);

fn setup_app(config: SimConfig) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins((
            SystemSchedulePlugin,
            CollisionPlugin,
            PoolPlugin,
            CombatPlugin,
            EnemiesPlugin,
        ))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)))
        .insert_resource(config)
        .init_resource::<EnemyRoster>()
        .init_resource::<Attacks>()
        .add_observer(|trigger: On<EnemyAttacked>, mut attacks: ResMut<Attacks>| {
            let event = trigger.event();
            attacks.0.push((event.entity, event.target, event.damage));
        });

    let roots = SceneRoots::spawn(app.world_mut());
    app.world_mut().insert_resource(roots);
    app.update();
    app
}

fn spawn_player(app: &mut App, at: Vec2) -> Entity {
    app.world_mut()
        .spawn((
            Player,
            Health::new(100),
            Transform::from_translation(at.extend(0.0)),
            AabbCollider::new(ColliderType::Player, Vec2::ONE),
        ))
        .id()
}

fn brain_in<S: 'static>(app: &App, enemy: Entity) -> bool {
    app.world()
        .get::<Brain>(enemy)
        .is_some_and(|brain| brain.is_in::<S>())
}

fn attack_count(app: &App) -> usize {
    app.world().resource::<Attacks>().0.len()
}

#[test]
fn enemy_states_pass_validation() {
    assert!(validate(ENEMY_FSM, &enemy_states(&EnemyConfig::default())).is_ok());
}

#[test]
fn enemy_walks_into_range_then_attacks_on_cooldown() {
    let mut app = setup_app(SimConfig::default());
    let player = spawn_player(&mut app, Vec2::ZERO);
    let enemy = spawn_enemy(app.world_mut(), Vec2::new(10.0, 0.0)).expect("enemy");

    app.update();
    assert!(brain_in::<Move>(&app, enemy));
    let x = app.world().get::<Transform>(enemy).map(|t| t.translation.x);
    assert!(x.is_some_and(|x| x < 10.0 && x > 9.0));
    assert_eq!(attack_count(&app), 0);

    let mut frames = 1;
    while !brain_in::<Attack>(&app, enemy) && frames < 60 {
        app.update();
        frames += 1;
    }
    assert!(brain_in::<Attack>(&app, enemy));
    assert!(frames > 20, "8.5 units at 3 per second take more than 2s");
    assert_eq!(app.world().resource::<Attacks>().0, vec![(enemy, player, 10)]);
    assert_eq!(app.world().get::<Health>(player).map(|h| h.current), Some(90));

    for _ in 0..5 {
        app.update();
    }
    assert_eq!(attack_count(&app), 1);

    for _ in 0..20 {
        app.update();
    }
    assert_eq!(attack_count(&app), 3);
}

#[test]
fn enemy_attack_period_matches_cooldown() {
    let mut config = SimConfig::default();
    config.enemy.attack_cooldown = 0.33;
    let mut app = setup_app(config);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(125)));
    spawn_player(&mut app, Vec2::ZERO);
    let enemy = spawn_enemy(app.world_mut(), Vec2::new(1.0, 0.0)).expect("enemy");

    app.update();
    assert!(brain_in::<Attack>(&app, enemy));
    assert_eq!(attack_count(&app), 1);

    // 2.875 s holds eight whole 0.33 s periods.
    for _ in 0..23 {
        app.update();
    }
    assert_eq!(attack_count(&app), 9);
}

#[test]
fn enemy_resumes_chase_when_player_leaves_range() {
    let mut app = setup_app(SimConfig::default());
    let player = spawn_player(&mut app, Vec2::ZERO);
    let enemy = spawn_enemy(app.world_mut(), Vec2::new(1.0, 0.0)).expect("enemy");

    app.update();
    assert!(brain_in::<Attack>(&app, enemy));

    app.world_mut()
        .get_mut::<Transform>(player)
        .expect("player")
        .translation = Vec3::new(20.0, 0.0, 0.0);
    app.update();

    assert!(brain_in::<Move>(&app, enemy));
}

#[test]
fn enemy_without_player_stays_put() {
    let mut app = setup_app(SimConfig::default());
    let enemy = spawn_enemy(app.world_mut(), Vec2::new(4.0, 2.0)).expect("enemy");

    for _ in 0..5 {
        app.update();
    }

    assert!(brain_in::<Move>(&app, enemy));
    assert_eq!(
        app.world().get::<Transform>(enemy).map(|t| t.translation.truncate()),
        Some(Vec2::new(4.0, 2.0))
    );
}

#[test]
fn dead_enemy_leaves_roster_and_returns_to_pool_after_delay() {
    let mut app = setup_app(SimConfig::default());
    let enemy = spawn_enemy(app.world_mut(), Vec2::new(4.0, 0.0)).expect("enemy");
    assert_eq!(app.world().resource::<EnemyRoster>().len(), 1);

    apply_damage(app.world_mut(), enemy, 1000, None);
    assert!(app.world().resource::<EnemyRoster>().is_empty());

    app.update();
    assert!(brain_in::<Die>(&app, enemy));
    assert!(app.world().get::<Pooled>(enemy).is_none());

    for _ in 0..20 {
        app.update();
    }

    assert!(app.world().get::<Pooled>(enemy).is_some());
    assert!(app.world().get::<Brain>(enemy).is_none());
    assert_eq!(
        app.world()
            .resource::<ObjectPool>()
            .free_count(DEFAULT_ENEMY_PREFAB),
        1
    );
}

#[test]
fn pooled_enemy_comes_back_at_full_strength() {
    let mut app = setup_app(SimConfig::default());
    let first = spawn_enemy(app.world_mut(), Vec2::new(4.0, 0.0)).expect("enemy");
    apply_damage(app.world_mut(), first, 1000, None);
    for _ in 0..20 {
        app.update();
    }

    let second = spawn_enemy(app.world_mut(), Vec2::new(-3.0, 1.0)).expect("enemy");

    assert_eq!(second, first);
    let world = app.world();
    assert_eq!(world.get::<Health>(second), Some(&Health::new(50)));
    assert!(world.get::<Dead>(second).is_none());
    assert_eq!(world.get::<AabbCollider>(second).map(|c| c.enabled), Some(true));
    assert!(world.resource::<CollisionRegistry>().contains(second));
    assert!(
        world
            .get::<Brain>(second)
            .is_some_and(|brain| brain.is_in::<Move>())
    );
    assert_eq!(world.resource::<EnemyRoster>().len(), 1);
}

#[test]
fn spawner_tops_roster_up_to_the_cap() {
    let mut config = SimConfig::default();
    config.spawner.interval_ms = 500;
    config.spawner.max_enemies = 2;
    let mut app = setup_app(config);

    start_enemy_spawner(app.world_mut());
    assert!(app.world().resource::<TaskScheduler>().contains(SPAWNER_TASK));

    app.update();
    assert_eq!(app.world().resource::<EnemyRoster>().len(), 1);

    for _ in 0..20 {
        app.update();
    }
    assert_eq!(app.world().resource::<EnemyRoster>().len(), 2);

    let mut enemies = app
        .world_mut()
        .query_filtered::<&Transform, With<Enemy>>();
    for transform in enemies.iter(app.world()) {
        assert!(transform.translation.x.abs() <= 5.0);
        assert!(transform.translation.y.abs() <= 5.0);
    }
}
