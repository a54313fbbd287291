use bevy::prelude::*;

/// Triggered on each collider of an intersecting pair, once per side.
///
/// `entity` is the collider receiving the callback, `other` the collider it
/// touched.
#[derive(EntityEvent, Debug, Clone, Copy)]
pub struct CollisionEnter {
    #[event_target]
    pub entity: Entity,
    pub other: Entity,
}

/// Triggered on a unit the frame its health reaches zero.
#[derive(EntityEvent, Debug, Clone, Copy)]
pub struct Died {
    #[event_target]
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Triggered alongside [`Died`] when the dead unit is an enemy.
#[derive(EntityEvent, Debug, Clone, Copy)]
pub struct EnemyKilled {
    #[event_target]
    pub entity: Entity,
}

/// An enemy landed an attack on `target`.
#[derive(EntityEvent, Debug, Clone, Copy)]
pub struct EnemyAttacked {
    #[event_target]
    pub entity: Entity,
    pub target: Entity,
    pub damage: i32,
}
