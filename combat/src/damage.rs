use {
    bevy::{ecs::entity_disabling::Disabled, prelude::*},
    collision::unregister_collider,
    collision_components::AabbCollider,
    combat_components::*,
    combat_events::{Died, EnemyKilled},
};

/// Entity exists, is active and alive.
pub fn is_targetable(world: &World, entity: Entity) -> bool {
    let Ok(entity_ref) = world.get_entity(entity) else {
        return false;
    };
    !entity_ref.contains::<Disabled>()
        && !entity_ref.contains::<Dead>()
        && entity_ref.get::<Health>().is_none_or(|health| !health.is_dead())
}

/// Applies damage to `target`. On the killing blow the target is marked dead,
/// its collider is disabled and unregistered, and [`Died`] (plus
/// [`EnemyKilled`] for enemies) is triggered. The brain switches to its die
/// state on its next update.
pub fn apply_damage(
    world: &mut World,
    target: Entity,
    amount: i32,
    source: Option<Entity>,
) -> DamageResult {
    let Ok(mut entity) = world.get_entity_mut(target) else {
        trace!(?target, "damage to missing entity ignored");
        return DamageResult::Ignored;
    };
    let Some(mut health) = entity.get_mut::<Health>() else {
        return DamageResult::Ignored;
    };
    let result = health.take_damage(amount);
    let remaining = health.current;

    match result {
        DamageResult::Ignored => trace!(?target, amount, "damage ignored"),
        DamageResult::Damaged => debug!(?target, ?source, amount, remaining, "damage applied"),
        DamageResult::Killed => {
            let is_enemy = entity.contains::<Enemy>();
            if let Some(mut collider) = entity.get_mut::<AabbCollider>() {
                collider.enabled = false;
            }
            entity.insert((Dead, PendingDeath));
            unregister_collider(world, target);

            info!(?target, ?source, amount, "unit died");
            world.trigger(Died {
                entity: target,
                killer: source,
            });
            if is_enemy {
                world.trigger(EnemyKilled { entity: target });
            }
        }
    }
    result
}

/// Deferred [`apply_damage`].
pub struct ApplyDamage {
    pub target: Entity,
    pub amount: i32,
    pub source: Option<Entity>,
}

impl Command for ApplyDamage {
    fn apply(self, world: &mut World) {
        apply_damage(world, self.target, self.amount, self.source);
    }
}
