use {
    crate::{Blackboard, FsmContext},
    std::{
        any::{TypeId, type_name},
        fmt,
        hash::{Hash, Hasher},
    },
};

/// Identity of a state type inside a machine.
#[derive(Clone, Copy)]
pub struct StateId {
    type_id: TypeId,
    name: &'static str,
}

impl StateId {
    pub fn of<S: 'static>() -> Self {
        let full = type_name::<S>();
        Self {
            type_id: TypeId::of::<S>(),
            name: full.rsplit("::").next().unwrap_or(full),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for StateId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for StateId {}

impl Hash for StateId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Hook currently executing. State changes are only honoured from
/// [`Hook::Enter`] and [`Hook::Update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    Enter,
    Update,
    Leave,
    Destroy,
}

/// One state of a machine owned by `O`, running against environment `E`.
///
/// Lifecycle: `on_init` once when the machine is built, then
/// `on_enter` -> `on_update`* -> `on_leave` per activation, and `on_destroy`
/// once when the machine is torn down.
pub trait FsmState<O, E>: Send + Sync + 'static {
    /// States this one may switch to with [`FsmContext::change_state`].
    fn transitions(&self) -> Vec<StateId> {
        Vec::new()
    }

    fn on_init(&mut self, _owner: &O, _blackboard: &mut Blackboard) {}

    fn on_enter(&mut self, _cx: &mut FsmContext<O, E>) {}

    /// `elapsed` is scaled simulation time, `real_elapsed` wall-clock time,
    /// both in seconds.
    fn on_update(&mut self, _cx: &mut FsmContext<O, E>, _elapsed: f32, _real_elapsed: f32) {}

    fn on_leave(&mut self, _cx: &mut FsmContext<O, E>, _is_shutdown: bool) {}

    fn on_destroy(&mut self, _cx: &mut FsmContext<O, E>) {}
}

/// Boxed state together with its type identity.
pub struct StateEntry<O, E> {
    pub(crate) id: StateId,
    pub(crate) transitions: Vec<StateId>,
    pub(crate) state: Box<dyn FsmState<O, E>>,
}

impl<O, E> StateEntry<O, E> {
    pub fn new<S: FsmState<O, E>>(state: S) -> Self {
        Self {
            id: StateId::of::<S>(),
            transitions: state.transitions(),
            state: Box::new(state),
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }
}
