//! Picking which equipped skill to cast.

use {crate::*, combat::position_of};

/// Equipped skills off cooldown, in equip order. Ids missing from the catalog
/// are skipped.
pub fn ready_skills<'a>(loadout: &SkillLoadout, catalog: &'a SkillCatalog) -> Vec<&'a SkillDefinition> {
    loadout
        .ready()
        .filter_map(|id| {
            let skill = catalog.get(id);
            if skill.is_none() {
                debug!(skill_id = id, "equipped skill has no definition, skipping");
            }
            skill
        })
        .collect()
}

/// Lowest priority value first (ties keep equip order), first one whose range
/// covers the distance wins.
pub fn select_skill<'a>(
    ready: &[&'a SkillDefinition],
    from: Vec2,
    to: Vec2,
) -> Option<&'a SkillDefinition> {
    let distance = from.distance(to);
    let mut ordered = ready.to_vec();
    ordered.sort_by_key(|skill| skill.priority);
    ordered.into_iter().find(|skill| skill.range >= distance)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Rotation {
    pub executed: usize,
    pub target_lost: bool,
}

/// Casts every ready, in-range skill of `caster` on `target`, best first,
/// until none is left. Each skill is tried at most once per call and starts
/// its cooldown when it executes.
pub fn cast_rotation(world: &mut World, caster: Entity, target: Entity) -> Rotation {
    let mut rotation = Rotation::default();
    let mut attempted: Vec<SkillId> = Vec::new();

    while let Some(skill) = next_skill(world, caster, target, &attempted) {
        attempted.push(skill.id);

        match execute_skill(world, caster, &skill, target) {
            SkillOutcome::Spawned(_) | SkillOutcome::Applied => {
                if let Some(mut loadout) = world.get_mut::<SkillLoadout>(caster) {
                    loadout.start_cooldown(skill.id, skill.cooldown_ms);
                }
                rotation.executed += 1;
            }
            SkillOutcome::TargetLost => {
                rotation.target_lost = true;
                break;
            }
            SkillOutcome::Unavailable => {}
        }
    }
    rotation
}

fn next_skill(
    world: &World,
    caster: Entity,
    target: Entity,
    attempted: &[SkillId],
) -> Option<SkillDefinition> {
    let loadout = world.get::<SkillLoadout>(caster)?;
    let catalog = world.get_resource::<SkillCatalog>()?;
    let from = position_of(world, caster)?;
    let to = position_of(world, target)?;

    let ready: Vec<&SkillDefinition> = ready_skills(loadout, catalog)
        .into_iter()
        .filter(|skill| !attempted.contains(&skill.id))
        .collect();
    select_skill(&ready, from, to).cloned()
}
