use {
    crate::*,
    bevy::prelude::*,
    std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    },
};

fn world_with_scheduler() -> World {
    let mut world = World::new();
    world.insert_resource(Time::<()>::default());
    world.init_resource::<TaskScheduler>();
    world
}

fn tick(world: &mut World, delta: Duration) {
    world.resource_mut::<Time>().advance_by(delta);
    run_scheduled_tasks(world);
}

fn counting_task(step: Step) -> (Arc<AtomicUsize>, impl FnMut(&mut World) -> Step + Send + Sync) {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();
    (runs, move |_: &mut World| {
        counter.fetch_add(1, Ordering::Relaxed);
        step
    })
}

#[test]
fn next_tick_task_runs_once_per_frame() {
    let mut world = world_with_scheduler();
    let (runs, task) = counting_task(Step::NextTick);
    world
        .resource_mut::<TaskScheduler>()
        .spawn("every_frame", CancelToken::new(), task);

    for _ in 0..3 {
        tick(&mut world, Duration::from_millis(16));
    }

    assert_eq!(runs.load(Ordering::Relaxed), 3);
}

#[test]
fn delayed_task_waits_for_clock() {
    let mut world = world_with_scheduler();
    let (runs, task) = counting_task(Step::After(Duration::from_millis(100)));
    world.resource_mut::<TaskScheduler>().spawn_after(
        "periodic",
        CancelToken::new(),
        Duration::from_millis(100),
        task,
    );

    tick(&mut world, Duration::from_millis(60));
    assert_eq!(runs.load(Ordering::Relaxed), 0);

    tick(&mut world, Duration::from_millis(60));
    assert_eq!(runs.load(Ordering::Relaxed), 1);

    // next wake is at 220ms
    tick(&mut world, Duration::from_millis(60));
    assert_eq!(runs.load(Ordering::Relaxed), 1);
    tick(&mut world, Duration::from_millis(60));
    assert_eq!(runs.load(Ordering::Relaxed), 2);
}

#[test]
fn cancelled_task_never_resumes() {
    let mut world = world_with_scheduler();
    let token = CancelToken::new();
    let (runs, task) = counting_task(Step::NextTick);
    world
        .resource_mut::<TaskScheduler>()
        .spawn("cancel_me", token.clone(), task);

    tick(&mut world, Duration::from_millis(16));
    token.cancel();
    tick(&mut world, Duration::from_millis(16));
    tick(&mut world, Duration::from_millis(16));

    assert_eq!(runs.load(Ordering::Relaxed), 1);
    assert!(world.resource::<TaskScheduler>().is_empty());
}

#[test]
fn finished_task_is_dropped() {
    let mut world = world_with_scheduler();
    let (runs, task) = counting_task(Step::Done);
    world
        .resource_mut::<TaskScheduler>()
        .spawn("one_shot", CancelToken::new(), task);

    tick(&mut world, Duration::from_millis(16));
    tick(&mut world, Duration::from_millis(16));

    assert_eq!(runs.load(Ordering::Relaxed), 1);
    assert!(!world.resource::<TaskScheduler>().contains("one_shot"));
}

#[test]
fn task_spawned_during_run_waits_for_next_frame() {
    let mut world = world_with_scheduler();
    let (child_runs, child) = counting_task(Step::Done);
    let mut child = Some(child);
    world
        .resource_mut::<TaskScheduler>()
        .spawn("parent", CancelToken::new(), move |world: &mut World| {
            if let Some(child) = child.take() {
                world
                    .resource_mut::<TaskScheduler>()
                    .spawn("child", CancelToken::new(), child);
            }
            Step::Done
        });

    tick(&mut world, Duration::from_millis(16));
    assert_eq!(child_runs.load(Ordering::Relaxed), 0);

    tick(&mut world, Duration::from_millis(16));
    assert_eq!(child_runs.load(Ordering::Relaxed), 1);
}

#[test]
fn cancel_all_flags_every_token() {
    let mut world = world_with_scheduler();
    let tokens = [CancelToken::new(), CancelToken::new()];
    for (i, token) in tokens.iter().enumerate() {
        world
            .resource_mut::<TaskScheduler>()
            .spawn(format!("task_{i}"), token.clone(), |_: &mut World| Step::NextTick);
    }

    let dropped = world.resource_mut::<TaskScheduler>().cancel_all();

    assert_eq!(dropped, 2);
    assert!(tokens.iter().all(CancelToken::is_cancelled));
}
