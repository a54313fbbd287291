
use {
    bevy::{
        ecs::entity_disabling::Disabled,
        platform::collections::HashMap,
        prelude::*,
    },
    collision::{register_collider, unregister_collider},
    combat_resources::SceneRoots,
    std::collections::VecDeque,
};

pub struct PoolPlugin;

impl Plugin for PoolPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ObjectPool>()
            .init_resource::<PrefabRegistry>()
            .register_type::<PrototypeKey>()
            .register_type::<Pooled>();
    }
}

/// Key of the prototype an instance was built from. Release files the
/// instance under exactly this key.
#[derive(Component, Reflect, Default, Debug, Clone, PartialEq, Eq, Hash)]
#[reflect(Component)]
pub struct PrototypeKey(pub String);

#[derive(Component, Reflect, Default)]
#[reflect(Component)]
pub struct Pooled;

pub type PrefabBuilder = fn(&mut EntityWorldMut);

#[derive(Resource, Default)]
pub struct PrefabRegistry {
    builders: HashMap<String, PrefabBuilder>,
}

impl PrefabRegistry {
    pub fn register(&mut self, key: impl Into<String>, builder: PrefabBuilder) {
        let key = key.into();
        if self.builders.insert(key.clone(), builder).is_some() {
            warn!(%key, "prefab registered twice, keeping the latest builder");
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.builders.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<PrefabBuilder> {
        self.builders.get(key).copied()
    }
}

#[derive(Debug)]
pub struct PoolBucket {
    pub node: Entity,
    pub free: VecDeque<Entity>,
}

#[derive(Resource, Default, Debug)]
pub struct ObjectPool {
    buckets: HashMap<String, PoolBucket>,
}

impl ObjectPool {
    pub fn bucket(&self, key: &str) -> Option<&PoolBucket> {
        self.buckets.get(key)
    }

    pub fn free_count(&self, key: &str) -> usize {
        self.buckets.get(key).map_or(0, |bucket| bucket.free.len())
    }

    fn pop_free(&mut self, key: &str) -> Option<Entity> {
        self.buckets.get_mut(key)?.free.pop_front()
    }
}

/// Takes a free instance of `key` or builds one. `None` parents it under the
/// units root.
pub fn acquire(world: &mut World, key: &str, parent: Option<Entity>) -> Option<Entity> {
    let parent = parent.or_else(|| world.get_resource::<SceneRoots>().map(|roots| roots.units));

    let entity = match reuse_free(world, key) {
        Some(entity) => entity,
        None => build(world, key)?,
    };

    if let Some(parent) = parent {
        world.entity_mut(entity).insert(ChildOf(parent));
    }
    Some(entity)
}

fn reuse_free(world: &mut World, key: &str) -> Option<Entity> {
    loop {
        let entity = world.get_resource_mut::<ObjectPool>()?.pop_free(key)?;
        let Ok(mut entity_mut) = world.get_entity_mut(entity) else {
            debug!(%key, ?entity, "pooled instance vanished, skipping");
            continue;
        };
        entity_mut.remove::<(Disabled, Pooled)>();
        register_collider(world, entity);
        trace!(%key, ?entity, "instance reused");
        return Some(entity);
    }
}

fn build(world: &mut World, key: &str) -> Option<Entity> {
    let Some(builder) = world
        .get_resource::<PrefabRegistry>()
        .and_then(|registry| registry.get(key))
    else {
        warn!(%key, "no prefab registered, spawn unavailable");
        return None;
    };

    let mut entity_mut = world.spawn((PrototypeKey(key.to_string()), Transform::default()));
    builder(&mut entity_mut);
    let entity = entity_mut.id();
    debug!(%key, ?entity, "instance built");
    Some(entity)
}

/// Returns an instance to its bucket. Rejects double releases. An entity
/// without a [`PrototypeKey`] cannot be pooled and is despawned.
pub fn release(world: &mut World, entity: Entity) -> bool {
    let Ok(entity_ref) = world.get_entity(entity) else {
        debug!(?entity, "release of missing entity ignored");
        return false;
    };
    if entity_ref.contains::<Pooled>() {
        warn!(?entity, "instance released twice, ignoring");
        return false;
    }
    let Some(key) = entity_ref.get::<PrototypeKey>().map(|key| key.0.clone()) else {
        warn!(?entity, "released entity has no prototype key, despawning");
        world.despawn(entity);
        return false;
    };

    unregister_collider(world, entity);
    let node = bucket_node(world, &key);
    world
        .entity_mut(entity)
        .insert((ChildOf(node), Disabled, Pooled));

    if let Some(mut pool) = world.get_resource_mut::<ObjectPool>() {
        if let Some(bucket) = pool.buckets.get_mut(&key) {
            bucket.free.push_back(entity);
        }
    }
    trace!(%key, ?entity, "instance released");
    true
}

fn bucket_node(world: &mut World, key: &str) -> Entity {
    if let Some(node) = world
        .get_resource::<ObjectPool>()
        .and_then(|pool| pool.bucket(key))
        .map(|bucket| bucket.node)
    {
        return node;
    }

    let pool_root = world.get_resource::<SceneRoots>().map(|roots| roots.pool);
    let mut node = world.spawn((Name::new(format!("Pool[{key}]")), Transform::default()));
    if let Some(root) = pool_root {
        node.insert(ChildOf(root));
    }
    let node = node.id();

    world
        .get_resource_or_insert_with(ObjectPool::default)
        .buckets
        .insert(
            key.to_string(),
            PoolBucket {
                node,
                free: VecDeque::new(),
            },
        );
    debug!(%key, ?node, "pool bucket created");
    node
}

/// Instances in use are left alone.
pub fn drain(world: &mut World) -> usize {
    let Some(mut pool) = world.get_resource_mut::<ObjectPool>() else {
        return 0;
    };
    let buckets: Vec<PoolBucket> = pool.buckets.drain().map(|(_, bucket)| bucket).collect();

    let mut despawned = 0;
    for bucket in buckets {
        for entity in bucket.free {
            if world.get_entity(entity).is_ok() {
                world.despawn(entity);
                despawned += 1;
            }
        }
        if world.get_entity(bucket.node).is_ok() {
            world.despawn(bucket.node);
        }
    }
    despawned
}

/// Deferred [`release`] for observers and systems holding `Commands`.
pub struct ReleaseToPool(pub Entity);

impl Command for ReleaseToPool {
    fn apply(self, world: &mut World) {
        release(world, self.0);
    }
}
