use {
    crate::*,
    combat_events::CollisionEnter,
};

/// Collider type pairs tested every frame. An empty bucket only skips its own
/// pair.
pub const COLLISION_PAIRS: &[(ColliderType, ColliderType)] =
    &[(ColliderType::Bullet, ColliderType::Enemy)];

/// Observer: colliders join the registry when added to an active entity.
pub fn register_on_add(
    trigger: On<Add, AabbCollider>,
    colliders: Query<&AabbCollider>,
    mut registry: ResMut<CollisionRegistry>,
) {
    let entity = trigger.event().entity;
    if let Ok(collider) = colliders.get(entity) {
        registry.register(entity, collider.kind);
    }
}

/// Observer: removal or despawn drops the collider from the registry.
pub fn unregister_on_remove(trigger: On<Remove, AabbCollider>, mut registry: ResMut<CollisionRegistry>) {
    registry.unregister(trigger.event().entity);
}

pub fn detect_collisions(world: &mut World) {
    for &(first, second) in COLLISION_PAIRS {
        scan_pair(world, first, second);
    }
}

/// Tests every `first` collider against every `second` collider, newest
/// first, and triggers [`CollisionEnter`] on both sides of each overlap.
///
/// Observers may release or kill either side mid-scan, so both lists are
/// snapshots and liveness is checked again before every test.
fn scan_pair(world: &mut World, first: ColliderType, second: ColliderType) {
    let (firsts, seconds) = {
        let Some(registry) = world.get_resource::<CollisionRegistry>() else {
            return;
        };
        let firsts = registry.of_kind(first);
        let seconds = registry.of_kind(second);
        if firsts.is_empty() || seconds.is_empty() {
            return;
        }
        (firsts.to_vec(), seconds.to_vec())
    };

    for &a in firsts.iter().rev() {
        for &b in seconds.iter().rev() {
            let Some(a_bounds) = live_bounds(world, a) else {
                break;
            };
            let Some(b_bounds) = live_bounds(world, b) else {
                continue;
            };
            if !a_bounds.intersects(&b_bounds) {
                continue;
            }

            trace!(?a, ?b, ?first, ?second, "collision");
            world.trigger(CollisionEnter {
                entity: a,
                other: b,
            });
            world.trigger(CollisionEnter {
                entity: b,
                other: a,
            });
            world.flush();

            if live_bounds(world, a).is_none() {
                break;
            }
        }
    }
}
