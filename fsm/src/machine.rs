use {
    crate::*,
    bevy::{
        log::{debug, error, trace},
        platform::collections::HashSet,
    },
    std::marker::PhantomData,
};

/// Upper bound on transitions resolved within one call, catches ping-pong
/// between states that switch on enter.
const MAX_CHAINED_TRANSITIONS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Running,
    Destroyed,
}

#[derive(Default)]
struct Control {
    pending: Option<StateId>,
    shutdown: bool,
}

pub struct FsmContext<'a, O, E> {
    pub env: &'a mut E,
    owner: &'a O,
    blackboard: &'a mut Blackboard,
    control: &'a mut Control,
    fsm: &'a str,
    state: StateId,
    hook: Hook,
    transitions: &'a [StateId],
}

impl<O, E> FsmContext<'_, O, E> {
    pub fn owner(&self) -> &O {
        self.owner
    }

    pub fn fsm_name(&self) -> &str {
        self.fsm
    }

    pub fn state(&self) -> StateId {
        self.state
    }

    pub fn hook(&self) -> Hook {
        self.hook
    }

    pub fn blackboard(&self) -> &Blackboard {
        self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        self.blackboard
    }

    pub fn set_data<T: std::any::Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.blackboard.set(key, value);
    }

    pub fn get_data<T: std::any::Any>(&self, key: &str) -> Option<&T> {
        self.blackboard.get(key)
    }

    pub fn remove_data(&mut self, key: &str) -> bool {
        self.blackboard.remove(key)
    }

    pub fn has_data(&self, key: &str) -> bool {
        self.blackboard.contains(key)
    }

    /// Requests a switch to `S` once the running hook returns.
    pub fn change_state<S: 'static>(&mut self) -> bool {
        self.change_state_id(StateId::of::<S>())
    }

    pub fn change_state_id(&mut self, to: StateId) -> bool {
        if !matches!(self.hook, Hook::Enter | Hook::Update) {
            error!(
                fsm = %self.fsm,
                from = %self.state,
                %to,
                hook = ?self.hook,
                "state change requested outside enter/update, ignoring"
            );
            return false;
        }

        if !self.transitions.contains(&to) {
            error!(
                fsm = %self.fsm,
                from = %self.state,
                %to,
                "undeclared transition requested, ignoring"
            );
            return false;
        }

        self.control.pending = Some(to);
        true
    }

    pub fn request_shutdown(&mut self) {
        self.control.shutdown = true;
    }
}

/// Exactly one state is current between [`Fsm::start`] and [`Fsm::destroy`].
pub struct Fsm<O, E> {
    name: String,
    owner: O,
    states: Vec<StateEntry<O, E>>,
    current: Option<usize>,
    blackboard: Blackboard,
    control: Control,
    lifecycle: Lifecycle,
    _env: PhantomData<fn(&mut E)>,
}

/// Checks a state set without building a machine: at least one state, no
/// state type twice, every declared transition registered.
pub fn validate<O, E>(fsm: &str, states: &[StateEntry<O, E>]) -> Result<(), FsmError> {
    if states.is_empty() {
        return Err(FsmError::NoStates { fsm: fsm.into() });
    }

    let mut registered = HashSet::new();
    for entry in states {
        if !registered.insert(entry.id) {
            return Err(FsmError::DuplicateState {
                fsm: fsm.into(),
                state: entry.id,
            });
        }
    }

    for entry in states {
        if let Some(to) = entry.transitions.iter().find(|to| !registered.contains(*to)) {
            return Err(FsmError::UnregisteredTransition {
                fsm: fsm.into(),
                from: entry.id,
                to: *to,
            });
        }
    }

    Ok(())
}

impl<O: 'static, E: 'static> Fsm<O, E> {
    pub fn new(
        name: impl Into<String>,
        owner: O,
        mut states: Vec<StateEntry<O, E>>,
    ) -> Result<Self, FsmError> {
        let name = name.into();
        validate(&name, &states)?;

        let mut blackboard = Blackboard::default();
        for entry in &mut states {
            entry.state.on_init(&owner, &mut blackboard);
        }
        debug!(fsm = %name, states = states.len(), "fsm created");

        Ok(Self {
            name,
            owner,
            states,
            current: None,
            blackboard,
            control: Control::default(),
            lifecycle: Lifecycle::Created,
            _env: PhantomData,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> &O {
        &self.owner
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    pub fn is_destroyed(&self) -> bool {
        self.lifecycle == Lifecycle::Destroyed
    }

    pub fn current_state(&self) -> Option<StateId> {
        self.current.map(|index| self.states[index].id)
    }

    pub fn is_in<S: 'static>(&self) -> bool {
        self.current_state() == Some(StateId::of::<S>())
    }

    pub fn contains(&self, id: StateId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    pub fn start<S: 'static>(&mut self, env: &mut E) -> Result<(), FsmError> {
        self.start_id(StateId::of::<S>(), env)
    }

    pub fn start_id(&mut self, id: StateId, env: &mut E) -> Result<(), FsmError> {
        match self.lifecycle {
            Lifecycle::Created => {}
            Lifecycle::Running => {
                return Err(FsmError::AlreadyStarted {
                    fsm: self.name.clone(),
                });
            }
            Lifecycle::Destroyed => {
                return Err(FsmError::Destroyed {
                    fsm: self.name.clone(),
                });
            }
        }
        let index = self.require(id)?;

        debug!(fsm = %self.name, state = %id, "fsm started");
        self.lifecycle = Lifecycle::Running;
        self.current = Some(index);
        self.run_hook(index, Hook::Enter, env, |state, cx| state.on_enter(cx));
        self.settle(env);
        Ok(())
    }

    pub fn update(&mut self, env: &mut E, elapsed: f32, real_elapsed: f32) {
        let Some(index) = self.current.filter(|_| self.is_running()) else {
            trace!(fsm = %self.name, lifecycle = ?self.lifecycle, "update on idle fsm ignored");
            return;
        };

        self.run_hook(index, Hook::Update, env, |state, cx| {
            state.on_update(cx, elapsed, real_elapsed)
        });
        self.settle(env);
    }

    /// Switches state from outside the machine, bypassing declared
    /// transitions. Starts the machine if it was not started yet.
    pub fn force_state<S: 'static>(&mut self, env: &mut E) -> Result<(), FsmError> {
        self.force_state_id(StateId::of::<S>(), env)
    }

    pub fn force_state_id(&mut self, id: StateId, env: &mut E) -> Result<(), FsmError> {
        match self.lifecycle {
            Lifecycle::Created => return self.start_id(id, env),
            Lifecycle::Destroyed => {
                return Err(FsmError::Destroyed {
                    fsm: self.name.clone(),
                });
            }
            Lifecycle::Running => {}
        }
        let index = self.require(id)?;
        if self.current == Some(index) {
            return Ok(());
        }

        debug!(fsm = %self.name, state = %id, "forced state change");
        self.control.pending = None;
        self.switch_to(index, env);
        self.settle(env);
        Ok(())
    }

    /// Leaves the current state as a shutdown, then destroys every state.
    /// The machine is unusable afterwards. Calling it twice is a no-op.
    pub fn destroy(&mut self, env: &mut E) {
        if self.is_destroyed() {
            return;
        }

        if let Some(index) = self.current {
            self.run_hook(index, Hook::Leave, env, |state, cx| state.on_leave(cx, true));
        }
        for index in 0..self.states.len() {
            self.run_hook(index, Hook::Destroy, env, |state, cx| state.on_destroy(cx));
        }

        self.current = None;
        self.blackboard.clear();
        self.control = Control::default();
        self.lifecycle = Lifecycle::Destroyed;
        debug!(fsm = %self.name, "fsm destroyed");
    }

    fn index_of(&self, id: StateId) -> Option<usize> {
        self.states.iter().position(|entry| entry.id == id)
    }

    fn require(&self, id: StateId) -> Result<usize, FsmError> {
        self.index_of(id).ok_or_else(|| FsmError::UnregisteredState {
            fsm: self.name.clone(),
            state: id,
        })
    }

    fn switch_to(&mut self, index: usize, env: &mut E) {
        if let Some(old) = self.current {
            trace!(
                fsm = %self.name,
                from = %self.states[old].id,
                to = %self.states[index].id,
                "state change"
            );
            self.run_hook(old, Hook::Leave, env, |state, cx| state.on_leave(cx, false));
        }
        self.current = Some(index);
        self.run_hook(index, Hook::Enter, env, |state, cx| state.on_enter(cx));
    }

    fn settle(&mut self, env: &mut E) {
        let mut hops = 0;
        while !self.control.shutdown {
            let Some(next) = self.control.pending.take() else {
                break;
            };
            if hops == MAX_CHAINED_TRANSITIONS {
                error!(fsm = %self.name, dropped = %next, "too many chained transitions");
                break;
            }
            hops += 1;

            match self.index_of(next) {
                Some(index) => self.switch_to(index, env),
                None => error!(fsm = %self.name, state = %next, "transition to unregistered state"),
            }
        }

        if self.control.shutdown {
            self.destroy(env);
        }
    }

    fn run_hook(
        &mut self,
        index: usize,
        hook: Hook,
        env: &mut E,
        run: impl FnOnce(&mut dyn FsmState<O, E>, &mut FsmContext<'_, O, E>),
    ) {
        let Self {
            name,
            owner,
            states,
            blackboard,
            control,
            ..
        } = self;
        let Some(entry) = states.get_mut(index) else {
            return;
        };

        let mut cx = FsmContext {
            env,
            owner: &*owner,
            blackboard,
            control,
            fsm: name.as_str(),
            state: entry.id,
            hook,
            transitions: entry.transitions.as_slice(),
        };
        run(entry.state.as_mut(), &mut cx);
    }
}
