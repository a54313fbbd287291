use {
    bevy::{asset::LoadState, prelude::*},
    combat_resources::SimConfig,
    skills_assets::{CatalogError, SkillCatalog, SkillTable},
    states::SimState,
};

pub const SIM_CONFIG_PATH: &str = "default.sim.ron";
pub const SKILL_TABLE_PATH: &str = "skills/default.skills.ron";

pub struct LoadingManagerPlugin;

impl Plugin for LoadingManagerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LoadingManager>()
            .init_resource::<LoadingStatus>()
            .add_systems(Startup, start_loading)
            .add_systems(
                Update,
                check_assets_loaded.run_if(in_state(SimState::Loading)),
            );
    }
}

// --- Resources ---

#[derive(Resource, Default)]
pub struct LoadingManager {
    pub sim_config: Handle<SimConfig>,
    pub skill_table: Handle<SkillTable>,
}

#[derive(Resource, Default, Debug)]
pub struct LoadingStatus {
    pub detail: String,
}

fn start_loading(mut manager: ResMut<LoadingManager>, asset_server: Res<AssetServer>) {
    info!(config = SIM_CONFIG_PATH, skills = SKILL_TABLE_PATH, "started loading assets");
    manager.sim_config = asset_server.load(SIM_CONFIG_PATH);
    manager.skill_table = asset_server.load(SKILL_TABLE_PATH);
}

/// Loaded or failed; either way nothing more will happen to it.
fn settled(state: &LoadState) -> bool {
    matches!(state, LoadState::Loaded | LoadState::Failed(_))
}

fn check_assets_loaded(
    mut commands: Commands,
    mut next_state: ResMut<NextState<SimState>>,
    mut status: ResMut<LoadingStatus>,
    mut exit: MessageWriter<AppExit>,
    manager: Res<LoadingManager>,
    asset_server: Res<AssetServer>,
    configs: Res<Assets<SimConfig>>,
    tables: Res<Assets<SkillTable>>,
) {
    let config_state = asset_server.load_state(manager.sim_config.id());
    let table_state = asset_server.load_state(manager.skill_table.id());
    if !settled(&config_state) || !settled(&table_state) {
        status.detail = "Loading files from disk...".into();
        return;
    }

    if let LoadState::Failed(error) = &config_state {
        warn!(path = SIM_CONFIG_PATH, %error, "config failed to load, using defaults");
    }
    if let LoadState::Failed(error) = &table_state {
        error!(path = SKILL_TABLE_PATH, %error, "skill table failed to load");
    }

    match resolve_loaded(tables.get(&manager.skill_table), configs.get(&manager.sim_config)) {
        Ok((catalog, config)) => {
            info!(skills = catalog.len(), "assets loaded, starting simulation");
            status.detail = "Ready".into();
            commands.insert_resource(catalog);
            commands.insert_resource(config);
            next_state.set(SimState::Running);
        }
        Err(error) => {
            error!(%error, "cannot start without skills");
            status.detail = error.to_string();
            exit.write(AppExit::error());
        }
    }
}

/// Builds the run's catalog and config from what finished loading. A missing
/// config falls back to defaults, a missing skill table is fatal.
pub fn resolve_loaded(
    table: Option<&SkillTable>,
    config: Option<&SimConfig>,
) -> Result<(SkillCatalog, SimConfig), CatalogError> {
    let table = table.ok_or_else(|| CatalogError::NotLoaded(SKILL_TABLE_PATH.into()))?;
    let config = config.cloned().unwrap_or_default();
    Ok((SkillCatalog::from_table(table), config))
}
