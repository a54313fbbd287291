use {
    bevy::prelude::*,
    collision::CollisionRegistry,
    combat::destroy_brains,
    combat_resources::{EnemyRoster, SceneRoots},
    skills_assets::SkillCatalog,
    system_schedule::TaskScheduler,
};

pub fn spawn_scene_roots(world: &mut World) {
    let roots = SceneRoots::spawn(world);
    debug!(?roots, "scene roots spawned");
    world.insert_resource(roots);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Tasks,
    Catalog,
    Pool,
    Colliders,
    Brains,
}

/// What [`shutdown_simulation`] tore down, in release order.
#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct Teardown {
    pub released: Vec<Service>,
    pub tasks: usize,
    pub pooled: usize,
    pub colliders: usize,
    pub brains: usize,
}

/// Releases the services in reverse of their registration in `CorePlugin`,
/// then every live state machine.
pub fn teardown(world: &mut World) -> Teardown {
    let mut report = Teardown::default();

    if let Some(mut scheduler) = world.get_resource_mut::<TaskScheduler>() {
        report.tasks = scheduler.cancel_all();
        report.released.push(Service::Tasks);
    }

    if let Some(mut catalog) = world.get_resource_mut::<SkillCatalog>() {
        catalog.clear();
        report.released.push(Service::Catalog);
    }

    if world.contains_resource::<pool::ObjectPool>() {
        report.pooled = pool::drain(world);
        report.released.push(Service::Pool);
    }

    if let Some(mut registry) = world.get_resource_mut::<CollisionRegistry>() {
        report.colliders = registry.len();
        registry.clear();
        report.released.push(Service::Colliders);
    }

    report.brains = destroy_brains(world);
    report.released.push(Service::Brains);

    if let Some(mut roster) = world.get_resource_mut::<EnemyRoster>() {
        roster.clear();
    }

    report
}

pub fn shutdown_simulation(world: &mut World) {
    let report = teardown(world);
    info!(
        tasks = report.tasks,
        pooled = report.pooled,
        colliders = report.colliders,
        brains = report.brains,
        "simulation shut down"
    );
    world.insert_resource(report);
}

pub fn exit_after_game_over(mut exit: MessageWriter<AppExit>) {
    exit.write(AppExit::Success);
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        collision::CollisionPlugin,
        pool::{ObjectPool, PoolPlugin},
        system_schedule::{CancelToken, Step},
    };

    #[test]
    fn teardown_releases_services_in_reverse_registration_order() {
        let mut app = App::new();
        app.add_plugins((CollisionPlugin, PoolPlugin))
            .init_resource::<SkillCatalog>()
            .init_resource::<TaskScheduler>();
        app.world_mut()
            .resource_mut::<TaskScheduler>()
            .spawn("idle", CancelToken::new(), |_: &mut World| Step::NextTick);

        let report = teardown(app.world_mut());

        assert_eq!(
            report.released,
            vec![
                Service::Tasks,
                Service::Catalog,
                Service::Pool,
                Service::Colliders,
                Service::Brains,
            ]
        );
        assert_eq!(report.tasks, 1);
        assert!(app.world().resource::<TaskScheduler>().is_empty());
        assert!(app.world().contains_resource::<ObjectPool>());
    }

    #[test]
    fn teardown_skips_missing_services() {
        let mut world = World::new();
        world.init_resource::<TaskScheduler>();

        let report = teardown(&mut world);

        assert_eq!(report.released, vec![Service::Tasks, Service::Brains]);
    }
}
