use bevy::prelude::*;

pub struct CombatComponentsPlugin;

impl Plugin for CombatComponentsPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<Player>()
            .register_type::<Enemy>()
            .register_type::<Dead>()
            .register_type::<PendingDeath>()
            .register_type::<Health>()
            .register_type::<MovementSpeed>()
            .register_type::<AttackPower>()
            .register_type::<AttackRange>()
            .register_type::<AttackCooldown>();
    }
}

#[derive(Component, Reflect, Default)]
#[reflect(Component)]
pub struct Player;

#[derive(Component, Reflect, Default)]
#[reflect(Component)]
pub struct Enemy;

#[derive(Component, Reflect, Default)]
#[reflect(Component)]
pub struct Dead;

/// Set when health reached zero; the brain switches to its die state on the
/// next update and removes the marker.
#[derive(Component, Reflect, Default)]
#[reflect(Component)]
pub struct PendingDeath;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageResult {
    /// Target was already dead or the amount was not positive.
    Ignored,
    Damaged,
    Killed,
}

#[derive(Component, Reflect, Debug, Clone, PartialEq)]
#[reflect(Component)]
pub struct Health {
    pub current: i32,
    pub max: i32,
    pub dead: bool,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Health {
    pub fn new(max: i32) -> Self {
        let max = max.max(1);
        Self {
            current: max,
            max,
            dead: false,
        }
    }

    /// Health is clamped at zero and reaches it exactly once; later damage is
    /// ignored.
    pub fn take_damage(&mut self, amount: i32) -> DamageResult {
        if self.dead || amount <= 0 {
            return DamageResult::Ignored;
        }

        self.current = (self.current - amount).max(0);
        if self.current == 0 {
            self.dead = true;
            DamageResult::Killed
        } else {
            DamageResult::Damaged
        }
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn reset(&mut self) {
        self.current = self.max;
        self.dead = false;
    }
}

#[derive(Component, Reflect, Default, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct MovementSpeed(pub f32);

#[derive(Component, Reflect, Default, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct AttackPower(pub i32);

#[derive(Component, Reflect, Default, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct AttackRange(pub f32);

/// Seconds between two enemy attacks.
#[derive(Component, Reflect, Default, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct AttackCooldown(pub f32);
