pub mod systems;


use {
    bevy::{ecs::entity_disabling::Disabled, platform::collections::HashMap, prelude::*},
    collision_components::*,
    system_schedule::GameSchedule,
};

pub use systems::{COLLISION_PAIRS, detect_collisions};

pub struct CollisionPlugin;

impl Plugin for CollisionPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(CollisionComponentsPlugin)
            .init_resource::<CollisionRegistry>()
            .add_systems(
                Update,
                detect_collisions.in_set(GameSchedule::PerformAction),
            )
            .add_observer(systems::register_on_add)
            .add_observer(systems::unregister_on_remove);
    }
}

/// Every active collider, as a flat list and bucketed by type.
#[derive(Resource, Default, Debug)]
pub struct CollisionRegistry {
    all: Vec<Entity>,
    buckets: HashMap<ColliderType, Vec<Entity>>,
}

impl CollisionRegistry {
    /// Returns false if the entity was already registered.
    pub fn register(&mut self, entity: Entity, kind: ColliderType) -> bool {
        if self.all.contains(&entity) {
            debug!(?entity, ?kind, "collider already registered");
            return false;
        }
        self.all.push(entity);
        self.buckets.entry(kind).or_default().push(entity);
        trace!(?entity, ?kind, "collider registered");
        true
    }

    /// Returns false if the entity was not registered.
    pub fn unregister(&mut self, entity: Entity) -> bool {
        let Some(index) = self.all.iter().position(|e| *e == entity) else {
            return false;
        };
        self.all.remove(index);
        for bucket in self.buckets.values_mut() {
            bucket.retain(|e| *e != entity);
        }
        trace!(?entity, "collider unregistered");
        true
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.all.contains(&entity)
    }

    pub fn of_kind(&self, kind: ColliderType) -> &[Entity] {
        self.buckets.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn all(&self) -> &[Entity] {
        &self.all
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn clear(&mut self) {
        self.all.clear();
        self.buckets.clear();
    }
}

/// Registers the entity's collider. No-op without a collider or registry.
pub fn register_collider(world: &mut World, entity: Entity) -> bool {
    let Some(kind) = world
        .get_entity(entity)
        .ok()
        .and_then(|e| e.get::<AabbCollider>())
        .map(|collider| collider.kind)
    else {
        return false;
    };

    world
        .get_resource_mut::<CollisionRegistry>()
        .is_some_and(|mut registry| registry.register(entity, kind))
}

pub fn unregister_collider(world: &mut World, entity: Entity) -> bool {
    world
        .get_resource_mut::<CollisionRegistry>()
        .is_some_and(|mut registry| registry.unregister(entity))
}

/// World bounds of a collider taking part in the scan: the entity exists, is
/// not disabled and its collider is enabled.
pub fn live_bounds(world: &World, entity: Entity) -> Option<Bounds2D> {
    let entity_ref = world.get_entity(entity).ok()?;
    if entity_ref.contains::<Disabled>() {
        return None;
    }
    let collider = entity_ref.get::<AabbCollider>().filter(|c| c.enabled)?;
    let position = entity_ref.get::<Transform>()?.translation.truncate();
    Some(collider.bounds(position))
}

/// Nearest live collider of `kind` by squared distance.
pub fn nearest_live(world: &World, kind: ColliderType, from: Vec2) -> Option<Entity> {
    let registry = world.get_resource::<CollisionRegistry>()?;
    registry
        .of_kind(kind)
        .iter()
        .filter(|&&entity| live_bounds(world, entity).is_some())
        .filter_map(|&entity| {
            let position = world.get::<Transform>(entity)?.translation.truncate();
            Some((entity, position.distance_squared(from)))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(entity, _)| entity)
}
