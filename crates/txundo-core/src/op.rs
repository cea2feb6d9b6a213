#![forbid(unsafe_code)]

//! Reversible operations recorded by the [`Manager`](crate::Manager).
//!
//! An [`Op`] is a single unit of reversible work. The manager never looks
//! inside an op: it only flips the `done` flag and hands the op back to the
//! owning [`Object`](crate::Object) during replay, which is the only place
//! where the payload is interpreted.
//!
//! # Invariants
//!
//! - Every op stored in history is `done` unless its transaction has been
//!   undone.
//! - Once queued, an op is owned by the manager and dropped together with
//!   its transaction record.
//!
//! # Failure Modes
//!
//! - **Stale target**: the object was removed after the op was recorded.
//!   The manager skips such ops during replay; hooks never see them.
//! - **Hook failure**: a hook returns an [`OpError`]. Replay stops and the
//!   already replayed part of the transaction is reverted.

use std::any::Any;
use std::fmt;

/// Errors an object hook may report while replaying an op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpError {
    /// The state the op refers to no longer exists on the object.
    TargetGone(String),
    /// The object is in a state where the op cannot be applied.
    InvalidState(String),
    /// Generic error with message.
    Other(String),
}

impl fmt::Display for OpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetGone(what) => write!(f, "target gone: {}", what),
            Self::InvalidState(msg) => write!(f, "invalid state: {}", msg),
            Self::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for OpError {}

/// Result of an object hook.
pub type OpResult = Result<(), OpError>;

/// A reversible unit of work with a `done` flag.
///
/// `done == true` means the op's "new" state is currently in effect.
/// Everything else is payload defined by the implementor.
pub trait Op: Any + fmt::Debug + 'static {
    /// Whether the op's effect is currently applied.
    fn is_done(&self) -> bool;

    /// Set the applied state. Called by the manager after each replay.
    fn set_done(&mut self, done: bool);

    /// Downcast to concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Downcast to mutable concrete type for coalescing.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Size of this op in bytes for memory budgeting.
    fn size_bytes(&self) -> usize {
        std::mem::size_of_val(self)
    }

    /// Debug name of the op.
    fn debug_name(&self) -> &'static str {
        "Op"
    }
}

impl dyn Op {
    /// Returns the op as `T` if it is one.
    #[must_use]
    pub fn downcast_ref<T: Op>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Returns the op as mutable `T` if it is one.
    pub fn downcast_mut<T: Op>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Returns `true` if the op is a `T`.
    #[must_use]
    pub fn is<T: Op>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

// ============================================================================
// Built-in Property Op
// ============================================================================

/// Old/new value change of a named property.
///
/// The owning object decides what `property` means. During undo it applies
/// [`old`](Self::old), during redo [`new_value`](Self::new_value); the
/// [`value_for`](Self::value_for) helper picks the right one.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyOp<T> {
    property: &'static str,
    old: T,
    new: T,
    done: bool,
}

impl<T: Clone + fmt::Debug + 'static> PropertyOp<T> {
    /// Create an op for a change that has already been applied.
    #[must_use]
    pub fn new(property: &'static str, old: T, new: T) -> Self {
        Self {
            property,
            old,
            new,
            done: true,
        }
    }

    /// Create an op for a change that has not been applied yet.
    ///
    /// Queuing it makes the manager redo it on the object first.
    #[must_use]
    pub fn undone(property: &'static str, old: T, new: T) -> Self {
        Self {
            property,
            old,
            new,
            done: false,
        }
    }

    /// Property tag.
    #[must_use]
    pub fn property(&self) -> &'static str {
        self.property
    }

    /// Value before the change.
    #[must_use]
    pub fn old(&self) -> &T {
        &self.old
    }

    /// Value after the change.
    #[must_use]
    pub fn new_value(&self) -> &T {
        &self.new
    }

    /// Value that is in effect when the op is in the given state.
    #[must_use]
    pub fn value_for(&self, done: bool) -> &T {
        if done { &self.new } else { &self.old }
    }

    /// Extend the change to a later value, keeping the first `old`.
    ///
    /// Used to coalesce consecutive edits (e.g. drag steps) into one op.
    pub fn merge_new(&mut self, new: T) {
        self.new = new;
    }
}

impl<T: Clone + fmt::Debug + 'static> Op for PropertyOp<T> {
    fn is_done(&self) -> bool {
        self.done
    }

    fn set_done(&mut self, done: bool) {
        self.done = done;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn debug_name(&self) -> &'static str {
        "PropertyOp"
    }
}
