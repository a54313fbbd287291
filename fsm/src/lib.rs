//! Finite state machine runtime.
//!
//! An [`Fsm`] is bound to one owner `O` and drives a fixed set of states
//! keyed by their type. Hooks receive the environment `E` (the ECS world in
//! the game) through an [`FsmContext`], together with the owner and a typed
//! [`Blackboard`] shared by all states of the machine.

mod blackboard;
mod machine;
mod state;

#[cfg(test)]
mod tests;

pub use {blackboard::*, machine::*, state::*};

use thiserror::Error;

/// Configuration and lifecycle errors. Everything else is logged and ignored.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FsmError {
    #[error("fsm `{fsm}` has no states")]
    NoStates { fsm: String },
    #[error("fsm `{fsm}` registers state `{state}` more than once")]
    DuplicateState { fsm: String, state: StateId },
    #[error("state `{from}` of fsm `{fsm}` declares a transition to unregistered state `{to}`")]
    UnregisteredTransition {
        fsm: String,
        from: StateId,
        to: StateId,
    },
    #[error("state `{state}` is not registered in fsm `{fsm}`")]
    UnregisteredState { fsm: String, state: StateId },
    #[error("fsm `{fsm}` was already started")]
    AlreadyStarted { fsm: String },
    #[error("fsm `{fsm}` was destroyed")]
    Destroyed { fsm: String },
}
