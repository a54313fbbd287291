use {
    bevy::prelude::*,
    combat_components::PendingDeath,
    fsm::{Fsm, FsmContext, FsmError, StateEntry, StateId},
};

pub type UnitFsm = Fsm<Entity, World>;
pub type UnitContext<'a> = FsmContext<'a, Entity, World>;
pub type UnitState = StateEntry<Entity, World>;

/// State machine driving a unit.
///
/// The brain is taken off its entity while it runs so states get the whole
/// world. It is put back afterwards unless the machine shut down or the unit
/// was despawned.
#[derive(Component)]
pub struct Brain {
    pub fsm: UnitFsm,
    /// Entered from outside the machine when the unit dies.
    pub die_state: StateId,
}

impl Brain {
    pub fn is_in<S: 'static>(&self) -> bool {
        self.fsm.is_in::<S>()
    }
}

/// Builds a machine for `owner`, starts it in `initial` and attaches it.
pub fn attach_brain(
    world: &mut World,
    owner: Entity,
    name: &str,
    states: Vec<UnitState>,
    initial: StateId,
    die_state: StateId,
) -> Result<(), FsmError> {
    let mut fsm = Fsm::new(name, owner, states)?;
    if !fsm.contains(die_state) {
        return Err(FsmError::UnregisteredState {
            fsm: name.into(),
            state: die_state,
        });
    }

    fsm.start_id(initial, world)?;
    if fsm.is_destroyed() {
        return Ok(());
    }

    match world.get_entity_mut(owner) {
        Ok(mut entity) => {
            entity.insert(Brain { fsm, die_state });
        }
        Err(_) => {
            warn!(?owner, fsm = name, "owner vanished while starting its brain");
            fsm.destroy(world);
        }
    }
    Ok(())
}

/// Exclusive system: one update per active brain. A pending death forces the
/// die state first.
pub fn advance_brains(world: &mut World) {
    let elapsed = world
        .get_resource::<Time>()
        .map(Time::delta_secs)
        .unwrap_or_default();
    let real_elapsed = world
        .get_resource::<Time<Real>>()
        .map(Time::delta_secs)
        .unwrap_or(elapsed);

    let owners: Vec<Entity> = world
        .query_filtered::<Entity, With<Brain>>()
        .iter(world)
        .collect();

    for owner in owners {
        let Ok(mut entity) = world.get_entity_mut(owner) else {
            continue;
        };
        let Some(mut brain) = entity.take::<Brain>() else {
            continue;
        };

        if entity.take::<PendingDeath>().is_some() {
            let die_state = brain.die_state;
            if let Err(error) = brain.fsm.force_state_id(die_state, world) {
                error!(?owner, %error, "failed to enter die state");
            }
        }
        brain.fsm.update(world, elapsed, real_elapsed);

        if brain.fsm.is_destroyed() {
            continue;
        }
        match world.get_entity_mut(owner) {
            Ok(mut entity) => {
                entity.insert(brain);
            }
            Err(_) => brain.fsm.destroy(world),
        }
    }
}

/// Destroys every attached machine.
pub fn destroy_brains(world: &mut World) -> usize {
    let owners: Vec<Entity> = world
        .query_filtered::<Entity, With<Brain>>()
        .iter(world)
        .collect();

    let mut destroyed = 0;
    for owner in owners {
        if let Some(mut brain) = world.get_entity_mut(owner).ok().and_then(|mut e| e.take::<Brain>()) {
            brain.fsm.destroy(world);
            destroyed += 1;
        }
    }
    destroyed
}
