mod brain;
mod damage;


use {bevy::prelude::*, combat_components::CombatComponentsPlugin, system_schedule::GameSchedule};

pub use {brain::*, damage::*};

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(CombatComponentsPlugin)
            .add_systems(Update, advance_brains.in_set(GameSchedule::ResolveIntent));
    }
}

pub fn position_of(world: &World, entity: Entity) -> Option<Vec2> {
    world
        .get::<Transform>(entity)
        .map(|transform| transform.translation.truncate())
}

pub fn distance(world: &World, a: Entity, b: Entity) -> Option<f32> {
    Some(position_of(world, a)?.distance(position_of(world, b)?))
}

/// Moves `entity` at most `max_step` toward `goal`. Returns the new position.
pub fn step_towards(world: &mut World, entity: Entity, goal: Vec2, max_step: f32) -> Option<Vec2> {
    let mut transform = world.get_mut::<Transform>(entity)?;
    let next = transform.translation.truncate().move_towards(goal, max_step);
    transform.translation = next.extend(transform.translation.z);
    Some(next)
}
