use {
    crate::TARGET_ENEMY,
    bevy::prelude::*,
    collision::nearest_live,
    collision_components::ColliderType,
    combat::{UnitContext, is_targetable, position_of},
    fsm::{FsmState, StateId},
    skills::cast_rotation,
    states::SimState,
};

/// Waits for a live enemy collider and locks onto the nearest one.
pub struct Idle;

impl FsmState<Entity, World> for Idle {
    fn transitions(&self) -> Vec<StateId> {
        vec![StateId::of::<Attack>()]
    }

    fn on_update(&mut self, cx: &mut UnitContext, _elapsed: f32, _real_elapsed: f32) {
        let owner = *cx.owner();
        let Some(from) = position_of(cx.env, owner) else {
            return;
        };
        let Some(enemy) = nearest_live(cx.env, ColliderType::Enemy, from) else {
            return;
        };

        debug!(?owner, ?enemy, "player locked on");
        cx.set_data(TARGET_ENEMY, enemy);
        cx.change_state::<Attack>();
    }
}

/// Casts every ready in-range skill at the locked target each frame. Falls
/// back to [`Idle`] once nothing could be cast or the target is gone.
pub struct Attack;

fn locked_target(cx: &UnitContext) -> Option<Entity> {
    cx.get_data::<Entity>(TARGET_ENEMY)
        .copied()
        .filter(|target| is_targetable(cx.env, *target))
}

impl FsmState<Entity, World> for Attack {
    fn transitions(&self) -> Vec<StateId> {
        vec![StateId::of::<Idle>()]
    }

    fn on_enter(&mut self, cx: &mut UnitContext) {
        if locked_target(cx).is_none() {
            cx.change_state::<Idle>();
        }
    }

    fn on_update(&mut self, cx: &mut UnitContext, _elapsed: f32, _real_elapsed: f32) {
        let owner = *cx.owner();
        let Some(target) = locked_target(cx) else {
            debug!(?owner, "attack target invalid");
            cx.change_state::<Idle>();
            return;
        };

        let rotation = cast_rotation(cx.env, owner, target);
        if rotation.target_lost || rotation.executed == 0 {
            trace!(?owner, ?target, ?rotation, "nothing left to cast");
            cx.change_state::<Idle>();
        }
    }

    fn on_leave(&mut self, cx: &mut UnitContext, _is_shutdown: bool) {
        cx.remove_data(TARGET_ENEMY);
    }
}

/// Ends the run once the death delay elapsed.
pub struct Die {
    delay: f32,
    elapsed: f32,
}

impl Die {
    pub fn new(delay: f32) -> Self {
        Self {
            delay,
            elapsed: 0.0,
        }
    }
}

impl FsmState<Entity, World> for Die {
    fn on_enter(&mut self, cx: &mut UnitContext) {
        self.elapsed = 0.0;
        info!(player = ?cx.owner(), "player died");
    }

    fn on_update(&mut self, cx: &mut UnitContext, elapsed: f32, _real_elapsed: f32) {
        self.elapsed += elapsed;
        if self.elapsed < self.delay {
            return;
        }

        match cx.env.get_resource_mut::<NextState<SimState>>() {
            Some(mut next) => next.set(SimState::GameOver),
            None => warn!("no simulation state to end"),
        }
        cx.request_shutdown();
    }
}
