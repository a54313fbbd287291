use crate::*;

#[derive(Default)]
struct Journal {
    events: Vec<String>,
    hop_to_b_on_update: bool,
}

impl Journal {
    fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.events)
    }
}

type Ctx<'a> = FsmContext<'a, u32, Journal>;

#[derive(Default)]
struct A {
    inits: u32,
}

#[derive(Default)]
struct B;

#[derive(Default)]
struct Sink;

impl FsmState<u32, Journal> for A {
    fn transitions(&self) -> Vec<StateId> {
        vec![StateId::of::<B>()]
    }

    fn on_init(&mut self, owner: &u32, blackboard: &mut Blackboard) {
        self.inits += 1;
        blackboard.set("owner", *owner);
    }

    fn on_enter(&mut self, cx: &mut Ctx) {
        cx.env.events.push("enter A".into());
    }

    fn on_update(&mut self, cx: &mut Ctx, _elapsed: f32, _real: f32) {
        cx.env.events.push("update A".into());
        if cx.env.hop_to_b_on_update {
            cx.change_state::<B>();
        }
    }

    fn on_leave(&mut self, cx: &mut Ctx, is_shutdown: bool) {
        cx.env.events.push(format!("leave A {is_shutdown}"));
        // ignored: only enter/update may switch
        cx.change_state::<B>();
    }

    fn on_destroy(&mut self, cx: &mut Ctx) {
        cx.env.events.push(format!("destroy A inits={}", self.inits));
    }
}

impl FsmState<u32, Journal> for B {
    fn transitions(&self) -> Vec<StateId> {
        vec![StateId::of::<A>()]
    }

    fn on_enter(&mut self, cx: &mut Ctx) {
        cx.env.events.push("enter B".into());
        cx.set_data("visited_b", true);
    }

    fn on_update(&mut self, cx: &mut Ctx, elapsed: f32, real: f32) {
        cx.env.events.push(format!("update B {elapsed} {real}"));
        // not declared by B
        cx.change_state::<Sink>();
    }

    fn on_leave(&mut self, cx: &mut Ctx, is_shutdown: bool) {
        cx.env.events.push(format!("leave B {is_shutdown}"));
    }

    fn on_destroy(&mut self, cx: &mut Ctx) {
        cx.env.events.push("destroy B".into());
    }
}

impl FsmState<u32, Journal> for Sink {
    fn on_enter(&mut self, cx: &mut Ctx) {
        cx.env.events.push("enter Sink".into());
        cx.request_shutdown();
    }
}

fn machine() -> Fsm<u32, Journal> {
    Fsm::new(
        "test",
        7,
        vec![
            StateEntry::new(A::default()),
            StateEntry::new(B),
            StateEntry::new(Sink),
        ],
    )
    .expect("valid state set")
}

#[test]
fn init_runs_once_per_state_on_creation() {
    let fsm = machine();

    assert_eq!(fsm.blackboard().get::<u32>("owner"), Some(&7));
    assert_eq!(fsm.current_state(), None);
    assert_eq!(fsm.lifecycle(), Lifecycle::Created);
}

#[test]
fn start_enters_state_and_rejects_second_start() {
    let mut fsm = machine();
    let mut env = Journal::default();

    fsm.start::<A>(&mut env).expect("first start");
    assert!(fsm.is_in::<A>());
    assert_eq!(env.take(), vec!["enter A"]);

    assert!(matches!(
        fsm.start::<B>(&mut env),
        Err(FsmError::AlreadyStarted { .. })
    ));
    assert!(fsm.is_in::<A>());
}

#[test]
fn change_state_pairs_leave_before_enter() {
    let mut fsm = machine();
    let mut env = Journal {
        hop_to_b_on_update: true,
        ..Default::default()
    };
    fsm.start::<A>(&mut env).expect("start");
    env.take();

    fsm.update(&mut env, 0.5, 0.25);

    assert_eq!(env.take(), vec!["update A", "leave A false", "enter B"]);
    assert!(fsm.is_in::<B>());
    assert_eq!(fsm.blackboard().get::<bool>("visited_b"), Some(&true));
}

#[test]
fn undeclared_transition_is_ignored() {
    let mut fsm = machine();
    let mut env = Journal::default();
    fsm.start::<B>(&mut env).expect("start");
    env.take();

    fsm.update(&mut env, 1.0, 1.0);

    assert_eq!(env.take(), vec!["update B 1 1"]);
    assert!(fsm.is_in::<B>());
}

#[test]
fn force_state_bypasses_declared_transitions() {
    let mut fsm = machine();
    let mut env = Journal::default();
    fsm.start::<A>(&mut env).expect("start");
    env.take();

    fsm.force_state::<B>(&mut env).expect("force");

    assert_eq!(env.take(), vec!["leave A false", "enter B"]);
    assert!(fsm.force_state::<B>(&mut env).is_ok());
    assert!(env.take().is_empty());
}

#[test]
fn shutdown_request_destroys_machine() {
    let mut fsm = machine();
    let mut env = Journal::default();
    fsm.start::<A>(&mut env).expect("start");
    env.take();

    fsm.force_state::<Sink>(&mut env).expect("force");

    assert_eq!(
        env.take(),
        vec!["leave A false", "enter Sink", "destroy A inits=1", "destroy B"]
    );
    assert!(fsm.is_destroyed());
    assert_eq!(fsm.current_state(), None);
}

#[test]
fn destroy_leaves_current_then_destroys_all_once() {
    let mut fsm = machine();
    let mut env = Journal::default();
    fsm.start::<B>(&mut env).expect("start");
    env.take();

    fsm.destroy(&mut env);
    fsm.destroy(&mut env);

    assert_eq!(
        env.take(),
        vec!["leave B true", "destroy A inits=1", "destroy B"]
    );
    assert!(fsm.blackboard().is_empty());
    assert!(matches!(
        fsm.start::<A>(&mut env),
        Err(FsmError::Destroyed { .. })
    ));

    fsm.update(&mut env, 1.0, 1.0);
    assert!(env.take().is_empty());
}

#[test]
fn update_before_start_is_ignored() {
    let mut fsm = machine();
    let mut env = Journal::default();

    fsm.update(&mut env, 1.0, 1.0);

    assert!(env.take().is_empty());
}

#[test]
fn validation_catches_configuration_errors() {
    let empty: Vec<StateEntry<u32, Journal>> = Vec::new();
    assert!(matches!(
        validate("empty", &empty),
        Err(FsmError::NoStates { .. })
    ));

    let duplicated = vec![StateEntry::new(B), StateEntry::new(B)];
    assert!(matches!(
        validate::<u32, Journal>("dup", &duplicated),
        Err(FsmError::DuplicateState { .. })
    ));

    // A declares B which is missing
    let missing = vec![StateEntry::<u32, Journal>::new(A::default())];
    assert_eq!(
        validate("missing", &missing),
        Err(FsmError::UnregisteredTransition {
            fsm: "missing".into(),
            from: StateId::of::<A>(),
            to: StateId::of::<B>(),
        })
    );
    assert!(Fsm::new("missing", 1, missing).is_err());
}

#[test]
fn start_with_unregistered_state_fails() {
    struct Stranger;
    let mut fsm = Fsm::<u32, Journal>::new("partial", 1, vec![StateEntry::new(Sink)])
        .expect("valid state set");
    let mut env = Journal::default();

    assert!(matches!(
        fsm.start::<Stranger>(&mut env),
        Err(FsmError::UnregisteredState { .. })
    ));
    assert!(!fsm.is_running());
}

#[test]
fn blackboard_is_typed() {
    let mut blackboard = Blackboard::default();
    blackboard.set("target", 42_u64);

    assert_eq!(blackboard.get::<u64>("target"), Some(&42));
    assert_eq!(blackboard.get::<u32>("target"), None);
    assert_eq!(blackboard.get::<u64>("missing"), None);
    assert!(blackboard.remove("target"));
    assert!(!blackboard.remove("target"));
}
