//! Cooperative tasks resumed once per frame by a single scheduler.
//!
//! A task is a closure over `&mut World` that reports how it wants to be
//! suspended. Cancellation is a shared flag checked before every resumption.

use {
    bevy::prelude::*,
    std::{
        mem,
        sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
        },
        time::Duration,
    },
};

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Suspension point reported by a task after each resumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Resume on the next frame.
    NextTick,
    /// Resume once the scheduler clock advanced by at least this much.
    After(Duration),
    /// Drop the task.
    Done,
}

pub type TaskFn = Box<dyn FnMut(&mut World) -> Step + Send + Sync>;

struct ScheduledTask {
    label: String,
    token: CancelToken,
    wake_at: Duration,
    run: TaskFn,
}

#[derive(Resource, Default)]
pub struct TaskScheduler {
    clock: Duration,
    tasks: Vec<ScheduledTask>,
}

impl TaskScheduler {
    /// Time accumulated by the scheduler since it was created.
    pub fn now(&self) -> Duration {
        self.clock
    }

    /// Queues a task for the next frame. Tasks spawned while other tasks run
    /// are not resumed before the following frame.
    pub fn spawn(
        &mut self,
        label: impl Into<String>,
        token: CancelToken,
        task: impl FnMut(&mut World) -> Step + Send + Sync + 'static,
    ) {
        self.spawn_after(label, token, Duration::ZERO, task);
    }

    pub fn spawn_after(
        &mut self,
        label: impl Into<String>,
        token: CancelToken,
        delay: Duration,
        task: impl FnMut(&mut World) -> Step + Send + Sync + 'static,
    ) {
        let label = label.into();
        trace!(task = %label, ?delay, "task scheduled");
        self.tasks.push(ScheduledTask {
            label,
            token,
            wake_at: self.clock + delay,
            run: Box::new(task),
        });
    }

    /// Cancels and drops every queued task, returning how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        for task in &self.tasks {
            task.token.cancel();
        }
        let dropped = self.tasks.len();
        self.tasks.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.tasks.iter().any(|task| task.label == label)
    }
}

/// Advances the scheduler clock by the frame delta and resumes every due task
/// exactly once. Cancelled tasks are dropped without running.
pub fn run_scheduled_tasks(world: &mut World) {
    let delta = world
        .get_resource::<Time>()
        .map(Time::delta)
        .unwrap_or_default();

    let Some(mut scheduler) = world.get_resource_mut::<TaskScheduler>() else {
        return;
    };
    scheduler.clock += delta;
    let now = scheduler.clock;
    let (due, waiting): (Vec<_>, Vec<_>) = mem::take(&mut scheduler.tasks)
        .into_iter()
        .partition(|task| task.wake_at <= now);
    scheduler.tasks = waiting;

    let mut resumed = Vec::with_capacity(due.len());
    for mut task in due {
        if task.token.is_cancelled() {
            debug!(task = %task.label, "task cancelled, dropping");
            continue;
        }

        match (task.run)(world) {
            Step::NextTick => {
                task.wake_at = now;
                resumed.push(task);
            }
            Step::After(delay) => {
                task.wake_at = now + delay;
                resumed.push(task);
            }
            Step::Done => trace!(task = %task.label, "task finished"),
        }
    }

    if let Some(mut scheduler) = world.get_resource_mut::<TaskScheduler>() {
        scheduler.tasks.extend(resumed);
    }
}
