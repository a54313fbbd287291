mod tasks;

#[cfg(test)]
mod tests;

use bevy::prelude::*;

pub use tasks::*;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum GameSchedule {
    FrameStart,
    ResolveIntent,
    PerformAction,
    Effect,
    FrameEnd,
}

pub struct SystemSchedulePlugin;

impl Plugin for SystemSchedulePlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                GameSchedule::FrameStart,
                GameSchedule::ResolveIntent,
                GameSchedule::PerformAction,
                GameSchedule::Effect,
                GameSchedule::FrameEnd,
            )
                .chain(),
        )
        .init_resource::<TaskScheduler>()
        .add_systems(Update, run_scheduled_tasks.in_set(GameSchedule::FrameStart));
    }
}
