use {bevy::prelude::*, skills_assets::SkillId};

/// Emitted after a skill executed (for VFX/Audio hooks).
#[derive(EntityEvent, Debug, Clone, Copy)]
pub struct SkillCast {
    /// The caster.
    #[event_target]
    pub entity: Entity,
    pub skill_id: SkillId,
    pub target: Entity,
}

/// Emitted when a skill instance damaged something.
#[derive(EntityEvent, Debug, Clone, Copy)]
pub struct SkillHit {
    /// The skill instance.
    #[event_target]
    pub entity: Entity,
    pub skill_id: SkillId,
    pub target: Entity,
    pub damage: i32,
}
