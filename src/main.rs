use {
    bevy::{app::ScheduleRunnerPlugin, log::LogPlugin, prelude::*, state::app::StatesPlugin},
    core::CorePlugin,
    std::time::Duration,
};

fn main() {
    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(
            Duration::from_secs_f64(1.0 / 60.0),
        )))
        .add_plugins(LogPlugin {
            filter: "error,loading=trace,\
                core=info,\
                fsm=debug,\
                collision=info,\
                pool=debug,\
                skills=debug,\
                player=debug,\
                enemies=debug"
                .into(),
            level: bevy::log::Level::TRACE,
            ..Default::default()
        })
        .add_plugins((AssetPlugin::default(), StatesPlugin))
        .add_plugins(CorePlugin)
        .run();
}
