use {
    bevy::{platform::collections::HashMap, prelude::*},
    skills_assets::{SkillId, TargetingMode},
    system_schedule::CancelToken,
};

/// Skills equipped by a caster and their remaining cooldowns.
///
/// Every equipped id has a cooldown entry. Entries only shrink on cooldown
/// ticks and only grow when the skill executes.
#[derive(Component, Reflect, Default, Debug, Clone)]
#[reflect(Component)]
pub struct SkillLoadout {
    equipped: Vec<SkillId>,
    cooldowns: HashMap<SkillId, u32>,
}

impl SkillLoadout {
    pub fn new(skills: impl IntoIterator<Item = SkillId>) -> Self {
        let mut loadout = Self::default();
        for id in skills {
            loadout.equip(id);
        }
        loadout
    }

    /// Appends the skill, ready to use. Returns false if it was already equipped.
    pub fn equip(&mut self, id: SkillId) -> bool {
        if self.equipped.contains(&id) {
            return false;
        }
        self.equipped.push(id);
        self.cooldowns.insert(id, 0);
        true
    }

    /// Equip order.
    pub fn equipped(&self) -> &[SkillId] {
        &self.equipped
    }

    pub fn is_equipped(&self, id: SkillId) -> bool {
        self.cooldowns.contains_key(&id)
    }

    /// Resets the cooldown of an equipped skill. No-op otherwise.
    pub fn start_cooldown(&mut self, id: SkillId, cooldown_ms: u32) {
        if let Some(remaining) = self.cooldowns.get_mut(&id) {
            *remaining = cooldown_ms;
        }
    }

    pub fn tick_cooldowns(&mut self, delta_ms: u32) {
        for remaining in self.cooldowns.values_mut() {
            *remaining = remaining.saturating_sub(delta_ms);
        }
    }

    pub fn cooldown_remaining(&self, id: SkillId) -> Option<u32> {
        self.cooldowns.get(&id).copied()
    }

    pub fn is_ready(&self, id: SkillId) -> bool {
        self.cooldown_remaining(id) == Some(0)
    }

    /// Equipped ids with no cooldown left, in equip order.
    pub fn ready(&self) -> impl Iterator<Item = SkillId> + '_ {
        self.equipped.iter().copied().filter(|id| self.is_ready(*id))
    }
}

/// Live projectile or effect spawned by a skill.
#[derive(Component, Debug, Clone)]
pub struct SkillInstance {
    pub skill_id: SkillId,
    pub caster: Entity,
    pub target: Entity,
    pub damage: i32,
    pub mode: TargetingMode,
    /// Cancelled once the instance hit something or was released.
    pub token: CancelToken,
}
