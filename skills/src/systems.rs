use {
    crate::*,
    bevy::ecs::entity_disabling::Disabled,
    combat::{ApplyDamage, apply_damage, is_targetable, position_of, step_towards},
    combat_components::Enemy,
    combat_events::CollisionEnter,
    combat_resources::{SceneRoots, SimConfig},
    pool::{ReleaseToPool, acquire, release},
    skill_events::{SkillCast, SkillHit},
    system_schedule::{CancelToken, Step, TaskScheduler},
    std::time::Duration,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillOutcome {
    Spawned(Entity),
    Applied,
    TargetLost,
    Unavailable,
}

impl SkillOutcome {
    pub fn executed(&self) -> bool {
        matches!(self, SkillOutcome::Spawned(_) | SkillOutcome::Applied)
    }
}

/// Does not touch cooldowns.
pub fn execute_skill(
    world: &mut World,
    caster: Entity,
    skill: &SkillDefinition,
    target: Entity,
) -> SkillOutcome {
    if !is_targetable(world, target) {
        debug!(skill_id = skill.id, ?target, "target lost before cast");
        return SkillOutcome::TargetLost;
    }
    let Some(origin) = position_of(world, caster) else {
        return SkillOutcome::Unavailable;
    };

    let outcome = match skill.prefab.as_deref() {
        None => {
            strike(world, caster, target, skill);
            SkillOutcome::Applied
        }
        Some(prefab) => match spawn_instance(world, caster, target, skill, prefab, origin) {
            Some(instance) => SkillOutcome::Spawned(instance),
            None => SkillOutcome::Unavailable,
        },
    };

    if outcome.executed() {
        debug!(skill_id = skill.id, skill = %skill.name, ?caster, ?target, ?outcome, "skill cast");
        world.trigger(SkillCast {
            entity: caster,
            skill_id: skill.id,
            target,
        });
    }
    outcome
}

fn strike(world: &mut World, caster: Entity, target: Entity, skill: &SkillDefinition) {
    let damage = skill.damage();
    let victims = match skill.targeting {
        TargetingMode::Area { radius, .. } => enemies_around(world, target, radius),
        TargetingMode::LockOn { .. } | TargetingMode::Collision { .. } => vec![target],
    };

    for victim in victims {
        apply_damage(world, victim, damage, Some(caster));
    }
}

fn enemies_around(world: &mut World, target: Entity, radius: f32) -> Vec<Entity> {
    let Some(center) = position_of(world, target) else {
        return vec![target];
    };

    let mut victims = vec![target];
    let mut enemies = world.query_filtered::<(Entity, &Transform), With<Enemy>>();
    let nearby: Vec<Entity> = enemies
        .iter(world)
        .filter(|(entity, transform)| {
            *entity != target && transform.translation.truncate().distance(center) <= radius
        })
        .map(|(entity, _)| entity)
        .collect();
    victims.extend(
        nearby
            .into_iter()
            .filter(|entity| is_targetable(world, *entity)),
    );
    victims
}

fn spawn_instance(
    world: &mut World,
    caster: Entity,
    target: Entity,
    skill: &SkillDefinition,
    prefab: &str,
    origin: Vec2,
) -> Option<Entity> {
    let parent = world
        .get_resource::<SceneRoots>()
        .map(|roots| roots.projectiles);
    let instance = acquire(world, prefab, parent)?;

    let token = CancelToken::new();
    world.entity_mut(instance).insert((
        Transform::from_translation(origin.extend(0.0)),
        SkillInstance {
            skill_id: skill.id,
            caster,
            target,
            damage: skill.damage(),
            mode: skill.targeting,
            token: token.clone(),
        },
    ));

    let label = format!("skill_{}_{instance}", skill.id);
    match skill.targeting {
        TargetingMode::LockOn { speed } => {
            let task = homing(instance, target, speed, token.clone());
            if let Some(mut scheduler) = world.get_resource_mut::<TaskScheduler>() {
                scheduler.spawn(label, token, task);
            }
        }
        TargetingMode::Collision { speed } => {
            let goal = position_of(world, target).unwrap_or(origin);
            let direction = (goal - origin).normalize_or_zero();
            let task = straight(instance, direction, speed, skill.range, token.clone());
            if let Some(mut scheduler) = world.get_resource_mut::<TaskScheduler>() {
                scheduler.spawn(label, token, task);
            }
        }
        TargetingMode::Area { .. } => {
            strike(world, caster, target, skill);
            token.cancel();
            release(world, instance);
        }
    }
    Some(instance)
}

fn frame_delta(world: &World) -> f32 {
    world
        .get_resource::<Time>()
        .map(Time::delta_secs)
        .unwrap_or_default()
}

fn is_released(world: &World, instance: Entity) -> bool {
    world
        .get_entity(instance)
        .map_or(true, |entity| entity.contains::<Disabled>())
}

/// Follows `target` every frame. A lost target releases the instance without
/// damage.
fn homing(
    instance: Entity,
    target: Entity,
    speed: f32,
    token: CancelToken,
) -> impl FnMut(&mut World) -> Step + Send + Sync + 'static {
    move |world: &mut World| {
        if token.is_cancelled() || is_released(world, instance) {
            return Step::Done;
        }

        let goal = position_of(world, target).filter(|_| is_targetable(world, target));
        let Some(goal) = goal else {
            debug!(?instance, ?target, "homing target lost, releasing");
            token.cancel();
            release(world, instance);
            return Step::Done;
        };

        let step = speed * frame_delta(world);
        step_towards(world, instance, goal, step);
        Step::NextTick
    }
}

fn straight(
    instance: Entity,
    direction: Vec2,
    speed: f32,
    max_distance: f32,
    token: CancelToken,
) -> impl FnMut(&mut World) -> Step + Send + Sync + 'static {
    let mut travelled = 0.0;
    move |world: &mut World| {
        if token.is_cancelled() || is_released(world, instance) {
            return Step::Done;
        }

        let step = speed * frame_delta(world);
        travelled += step;
        if let Some(mut transform) = world.get_mut::<Transform>(instance) {
            transform.translation += (direction * step).extend(0.0);
        }

        if travelled >= max_distance {
            trace!(?instance, travelled, "projectile out of range, releasing");
            token.cancel();
            release(world, instance);
            return Step::Done;
        }
        Step::NextTick
    }
}

/// Lock-on instances only accept their target, straight ones any enemy.
pub fn on_skill_instance_collision(
    trigger: On<CollisionEnter>,
    instances: Query<&SkillInstance>,
    colliders: Query<&AabbCollider>,
    mut commands: Commands,
) {
    let event = trigger.event();
    let Ok(instance) = instances.get(event.entity) else {
        return;
    };
    if instance.token.is_cancelled() {
        return;
    }

    let hits = match instance.mode {
        TargetingMode::LockOn { .. } => event.other == instance.target,
        TargetingMode::Collision { .. } => colliders
            .get(event.other)
            .is_ok_and(|collider| collider.kind == ColliderType::Enemy),
        TargetingMode::Area { .. } => false,
    };
    if !hits {
        return;
    }

    debug!(
        skill_id = instance.skill_id,
        instance = ?event.entity,
        victim = ?event.other,
        damage = instance.damage,
        "skill instance hit"
    );
    instance.token.cancel();
    commands.queue(ApplyDamage {
        target: event.other,
        amount: instance.damage,
        source: Some(instance.caster),
    });
    commands.trigger(SkillHit {
        entity: event.entity,
        skill_id: instance.skill_id,
        target: event.other,
        damage: instance.damage,
    });
    commands.queue(ReleaseToPool(event.entity));
}

pub fn start_cooldown_decay(world: &mut World) {
    let period = Duration::from_millis(
        world
            .get_resource::<SimConfig>()
            .map_or(1000, |config| config.cooldown_tick_ms),
    );
    let Some(mut scheduler) = world.get_resource_mut::<TaskScheduler>() else {
        warn!("no task scheduler, skill cooldowns will not decay");
        return;
    };

    let mut last_run = scheduler.now();
    scheduler.spawn_after(
        "skill_cooldowns",
        CancelToken::new(),
        period,
        move |world: &mut World| {
            let now = world
                .get_resource::<TaskScheduler>()
                .map_or(last_run, TaskScheduler::now);
            // Sub-millisecond remainders stay behind `last_run` for the next period.
            let elapsed_ms = now.saturating_sub(last_run).as_millis() as u32;
            last_run += Duration::from_millis(elapsed_ms.into());

            tick_all_cooldowns(world, elapsed_ms);
            Step::After(period)
        },
    );
    info!(?period, "skill cooldown decay started");
}

pub fn tick_all_cooldowns(world: &mut World, delta_ms: u32) {
    let mut loadouts = world.query::<&mut SkillLoadout>();
    for mut loadout in loadouts.iter_mut(world) {
        loadout.tick_cooldowns(delta_ms);
    }
}
