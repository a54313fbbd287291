use {
    crate::TARGET_PLAYER,
    bevy::prelude::*,
    combat::{UnitContext, apply_damage, is_targetable, position_of, step_towards},
    combat_components::{AttackCooldown, AttackPower, AttackRange, MovementSpeed, Player},
    combat_events::EnemyAttacked,
    fsm::{FsmState, StateId},
    pool::release,
};

/// Player the enemy is after: the remembered one while it is still
/// targetable, otherwise any targetable player.
fn chase_target(cx: &mut UnitContext) -> Option<Entity> {
    let remembered = cx
        .get_data::<Entity>(TARGET_PLAYER)
        .copied()
        .filter(|player| is_targetable(cx.env, *player));
    if remembered.is_some() {
        return remembered;
    }

    let players: Vec<Entity> = cx
        .env
        .query_filtered::<Entity, With<Player>>()
        .iter(cx.env)
        .collect();
    let found = players
        .into_iter()
        .find(|player| is_targetable(cx.env, *player));
    match found {
        Some(player) => cx.set_data(TARGET_PLAYER, player),
        None => {
            cx.remove_data(TARGET_PLAYER);
        }
    }
    found
}

fn attack_range(cx: &UnitContext) -> f32 {
    cx.env
        .get::<AttackRange>(*cx.owner())
        .map_or(0.0, |range| range.0)
}

/// Walks toward the player until it is within attack range.
pub struct Move;

impl FsmState<Entity, World> for Move {
    fn transitions(&self) -> Vec<StateId> {
        vec![StateId::of::<Attack>()]
    }

    fn on_update(&mut self, cx: &mut UnitContext, elapsed: f32, _real_elapsed: f32) {
        let owner = *cx.owner();
        let Some(target) = chase_target(cx) else {
            return;
        };
        let (Some(here), Some(goal)) = (position_of(cx.env, owner), position_of(cx.env, target))
        else {
            return;
        };

        let range = attack_range(cx);
        let here = if here.distance(goal) <= range {
            here
        } else {
            let speed = cx.env.get::<MovementSpeed>(owner).map_or(0.0, |s| s.0);
            step_towards(cx.env, owner, goal, speed * elapsed).unwrap_or(here)
        };

        if here.distance(goal) <= range {
            trace!(?owner, ?target, "player in range");
            cx.change_state::<Attack>();
        }
    }
}

/// Hits the player on entry and then once per cooldown while it stays in
/// range.
#[derive(Default)]
pub struct Attack {
    until_next: f32,
}

impl Attack {
    /// Target still valid and within range.
    fn engaged(cx: &mut UnitContext) -> Option<Entity> {
        let owner = *cx.owner();
        let target = cx
            .get_data::<Entity>(TARGET_PLAYER)
            .copied()
            .filter(|player| is_targetable(cx.env, *player))?;
        let distance = position_of(cx.env, owner)?.distance(position_of(cx.env, target)?);
        (distance <= attack_range(cx)).then_some(target)
    }

    fn strike(&mut self, cx: &mut UnitContext, target: Entity) {
        let owner = *cx.owner();
        let damage = cx.env.get::<AttackPower>(owner).map_or(0, |p| p.0);
        // Overshoot from the last frame counts toward the next attack.
        self.until_next += cx.env.get::<AttackCooldown>(owner).map_or(0.0, |c| c.0);

        let result = apply_damage(cx.env, target, damage, Some(owner));
        debug!(?owner, ?target, damage, ?result, "enemy attack");
        cx.env.trigger(EnemyAttacked {
            entity: owner,
            target,
            damage,
        });
    }
}

impl FsmState<Entity, World> for Attack {
    fn transitions(&self) -> Vec<StateId> {
        vec![StateId::of::<Move>()]
    }

    fn on_enter(&mut self, cx: &mut UnitContext) {
        self.until_next = 0.0;
        match Self::engaged(cx) {
            Some(target) => self.strike(cx, target),
            None => {
                cx.change_state::<Move>();
            }
        }
    }

    fn on_update(&mut self, cx: &mut UnitContext, elapsed: f32, _real_elapsed: f32) {
        let Some(target) = Self::engaged(cx) else {
            trace!(owner = ?cx.owner(), "player out of reach");
            cx.change_state::<Move>();
            return;
        };

        self.until_next -= elapsed;
        if self.until_next <= 0.0 {
            self.strike(cx, target);
        }
    }
}

/// Lingers for the death delay, then returns the enemy to the pool and shuts
/// the machine down.
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
        debug!(enemy = ?cx.owner(), "enemy dying");
    }

    fn on_update(&mut self, cx: &mut UnitContext, elapsed: f32, _real_elapsed: f32) {
        self.elapsed += elapsed;
        if self.elapsed < self.delay {
            return;
        }

        let owner = *cx.owner();
        release(cx.env, owner);
        cx.request_shutdown();
    }
}
