use {
    bevy::{platform::collections::HashSet, prelude::*},
    bevy_common_assets::ron::RonAssetPlugin,
    serde::{Deserialize, Serialize},
    skills_assets::SkillId,
};

pub struct CombatResourcesPlugin;

impl Plugin for CombatResourcesPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(RonAssetPlugin::<SimConfig>::new(&["sim.ron"]))
            .init_resource::<SimConfig>()
            .init_resource::<EnemyRoster>();
    }
}

/// Tunables of one simulation run, loaded from `default.sim.ron`.
#[derive(Asset, TypePath, Resource, Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub enemy: EnemyConfig,
    #[serde(default)]
    pub spawner: SpawnerConfig,
    /// Period of the skill cooldown decay task.
    #[serde(default = "default_cooldown_tick_ms")]
    pub cooldown_tick_ms: u64,
}

fn default_cooldown_tick_ms() -> u64 {
    1000
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            player: PlayerConfig::default(),
            enemy: EnemyConfig::default(),
            spawner: SpawnerConfig::default(),
            cooldown_tick_ms: default_cooldown_tick_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub health: i32,
    pub attack_power: i32,
    pub speed: f32,
    pub collider_size: [f32; 2],
    /// Skills equipped at spawn, in equip order.
    pub skills: Vec<SkillId>,
    /// Seconds between death and game over.
    pub death_delay: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            health: 100,
            attack_power: 10,
            speed: 0.0,
            collider_size: [1.0, 1.0],
            skills: vec![1, 2],
            death_delay: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Pool prototype key.
    pub prefab: String,
    pub health: i32,
    pub speed: f32,
    pub attack_power: i32,
    pub attack_range: f32,
    /// Seconds between two attacks.
    pub attack_cooldown: f32,
    pub collider_size: [f32; 2],
    /// Seconds between death and release to the pool.
    pub death_delay: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            prefab: "Enemy1".into(),
            health: 50,
            speed: 3.0,
            attack_power: 10,
            attack_range: 1.5,
            attack_cooldown: 1.0,
            collider_size: [1.0, 1.0],
            death_delay: 1.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    pub interval_ms: u64,
    pub max_enemies: usize,
    /// Enemies appear within this distance of the origin on both axes.
    pub spawn_extent: f32,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            max_enemies: 2,
            spawn_extent: 5.0,
        }
    }
}

/// Parent nodes of everything the simulation spawns. All roots sit at the
/// origin so a child's `Transform` is its world position.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SceneRoots {
    pub units: Entity,
    pub enemies: Entity,
    pub projectiles: Entity,
    pub pool: Entity,
}

impl SceneRoots {
    pub fn spawn(world: &mut World) -> Self {
        let mut root = |name: &'static str| world.spawn((Name::new(name), Transform::default())).id();
        Self {
            units: root("Units"),
            enemies: root("Enemies"),
            projectiles: root("Projectiles"),
            pool: root("Pool"),
        }
    }
}

/// Enemies currently alive.
#[derive(Resource, Default, Debug)]
pub struct EnemyRoster {
    alive: HashSet<Entity>,
}

impl EnemyRoster {
    pub fn insert(&mut self, enemy: Entity) -> bool {
        self.alive.insert(enemy)
    }

    pub fn remove(&mut self, enemy: Entity) -> bool {
        self.alive.remove(&enemy)
    }

    pub fn len(&self) -> usize {
        self.alive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alive.is_empty()
    }

    pub fn clear(&mut self) {
        self.alive.clear();
    }
}
