use {
    bevy::{platform::collections::HashMap, prelude::*},
    bevy_common_assets::ron::RonAssetPlugin,
    serde::{Deserialize, Serialize},
    thiserror::Error,
};

pub struct SkillsAssetsPlugin;

impl Plugin for SkillsAssetsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(RonAssetPlugin::<SkillTable>::new(&["skills.ron"]))
            .init_resource::<SkillCatalog>()
            .register_type::<SkillKind>()
            .register_type::<TargetingMode>();
    }
}

pub type SkillId = u32;

/// Immutable skill record loaded from the packaged `.skills.ron` table.
#[derive(Debug, Clone, Serialize, Deserialize, Reflect, PartialEq)]
pub struct SkillDefinition {
    /// Unique key inside the table.
    pub id: SkillId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub kind: SkillKind,
    pub targeting: TargetingMode,
    /// Time before the skill is ready again after it executes.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u32,
    #[serde(default)]
    pub mana_cost: u32,
    #[serde(default = "default_cast_time_ms")]
    pub cast_time_ms: u32,
    /// Maximum distance between caster and target.
    #[serde(default = "default_range")]
    pub range: f32,
    #[serde(default)]
    pub duration: f32,
    /// Damage dealt on hit.
    #[serde(default = "default_effect_value")]
    pub effect_value: f32,
    /// Lower value wins.
    #[serde(default)]
    pub priority: i32,
    /// Pool prototype key of the spawned instance. Skills without one hit
    /// their target directly.
    #[serde(default)]
    pub prefab: Option<String>,
}

fn default_cooldown_ms() -> u32 {
    1000
}

fn default_cast_time_ms() -> u32 {
    1000
}

fn default_range() -> f32 {
    5.0
}

fn default_effect_value() -> f32 {
    10.0
}

fn full_circle() -> f32 {
    360.0
}

impl SkillDefinition {
    /// Integer damage applied to the target. Buffs deal none.
    pub fn damage(&self) -> i32 {
        match self.kind {
            SkillKind::Damage => self.effect_value as i32,
            SkillKind::Buff => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Reflect, Default, PartialEq, Eq)]
#[reflect(Serialize, Deserialize)]
pub enum SkillKind {
    #[default]
    Damage,
    Buff,
}

/// How a spawned skill instance reaches its target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Reflect, PartialEq)]
#[reflect(Serialize, Deserialize)]
pub enum TargetingMode {
    /// Homes on the bound target every frame and hits only that target.
    LockOn {
        /// Units per second.
        speed: f32,
    },
    /// Flies straight toward where the target stood at cast time and hits the
    /// first enemy it touches. Released after travelling the skill range.
    Collision { speed: f32 },
    /// Applies its effect the frame it is cast to the target and every enemy
    /// within `radius` of it.
    Area {
        radius: f32,
        #[serde(default = "full_circle")]
        angle: f32,
    },
}

/// Asset holding every skill definition of one `.skills.ron` file.
#[derive(Asset, TypePath, Debug, Clone, Serialize, Deserialize)]
pub struct SkillTable {
    pub skills: Vec<SkillDefinition>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse skill table")]
    Parse(#[from] ron::error::SpannedError),
    #[error("skill table `{0}` is not loaded")]
    NotLoaded(String),
}

/// Lookup of every loaded skill keyed by id. Built once at load time.
#[derive(Resource, Default, Debug)]
pub struct SkillCatalog {
    skills: HashMap<SkillId, SkillDefinition>,
}

impl SkillCatalog {
    /// Builds the catalog. A duplicate id is logged and the later entry is
    /// discarded.
    pub fn from_definitions(definitions: impl IntoIterator<Item = SkillDefinition>) -> Self {
        let mut skills: HashMap<SkillId, SkillDefinition> = HashMap::default();
        for definition in definitions {
            if let Some(existing) = skills.get(&definition.id) {
                error!(
                    skill_id = definition.id,
                    kept = %existing.name,
                    discarded = %definition.name,
                    "duplicate skill id in skill table, discarding later entry"
                );
                continue;
            }
            debug!(skill_id = definition.id, name = %definition.name, "skill registered");
            skills.insert(definition.id, definition);
        }
        Self { skills }
    }

    pub fn from_table(table: &SkillTable) -> Self {
        Self::from_definitions(table.skills.iter().cloned())
    }

    pub fn from_ron_str(source: &str) -> Result<Self, CatalogError> {
        let table: SkillTable = ron::from_str(source)?;
        Ok(Self::from_table(&table))
    }

    pub fn get(&self, id: SkillId) -> Option<&SkillDefinition> {
        self.skills.get(&id)
    }

    pub fn contains(&self, id: SkillId) -> bool {
        self.skills.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn clear(&mut self) {
        self.skills.clear();
    }
}
