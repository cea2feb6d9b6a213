#![forbid(unsafe_code)]

//! Reference objects for exercising the manager.
//!
//! - [`Counter`] - integer property whose mutator queues its own ops and is
//!   reused by the undo/redo hooks, like editor objects usually are
//! - [`Probe`] - records every hook call into a shared [`Journal`]
//! - [`TaggedOp`] - payload-free op identified by a tag

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use txundo_core::{Manager, Object, ObjectId, ObjectRef, Op, OpError, OpResult, PropertyOp};

/// Wrap `object` for use with a manager.
///
/// Returns the typed handle for inspection and the erased handle the
/// manager works with. Both point at the same object.
pub fn shared<O: Object + 'static>(object: O) -> (Rc<RefCell<O>>, ObjectRef) {
    let typed = Rc::new(RefCell::new(object));
    let erased: ObjectRef = typed.clone();
    (typed, erased)
}

// ============================================================================
// Counter
// ============================================================================

/// Integer property with a queueing mutator.
///
/// [`set_value`](Counter::set_value) records a [`PropertyOp`] when the
/// manager is transacting and then applies the value. The hooks call the
/// same mutator, so every replay also exercises the manager's handling of
/// ops queued while replaying.
#[derive(Debug, Default)]
pub struct Counter {
    id: Option<ObjectId>,
    value: i64,
    refuse: Option<i64>,
    applied: usize,
}

impl Counter {
    /// Property tag used in queued ops.
    pub const PROPERTY: &'static str = "value";

    /// Counter starting at `value`.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    /// Register the counter with `manager` and remember its id.
    pub fn register(counter: &Rc<RefCell<Self>>, handle: &ObjectRef, manager: &mut Manager) {
        let id = manager.next_id(handle);
        counter.borrow_mut().id = Some(id);
    }

    /// Current value.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.value
    }

    /// Id assigned by [`register`](Self::register).
    #[must_use]
    pub fn id(&self) -> Option<ObjectId> {
        self.id
    }

    /// Number of values applied by hooks.
    #[must_use]
    pub fn applied(&self) -> usize {
        self.applied
    }

    /// Make hooks fail when they would restore `value`.
    pub fn refuse(&mut self, value: Option<i64>) {
        self.refuse = value;
    }

    /// Set the value, recording the change if `manager` is transacting.
    ///
    /// The counter must be [registered](Self::register) for the change to
    /// be recorded.
    ///
    /// # Errors
    ///
    /// Propagates the manager's error.
    pub fn set_value(&mut self, manager: &mut Manager, value: i64) -> OpResult {
        if let Some(id) = self.id
            && (manager.transacting() || manager.replaying())
        {
            let op = PropertyOp::new(Self::PROPERTY, self.value, value);
            manager.queue_for(id, Box::new(op))?;
        }
        self.value = value;
        Ok(())
    }

    fn restore(&mut self, op: &mut dyn Op, manager: &mut Manager, done: bool) -> OpResult {
        let target = op
            .downcast_ref::<PropertyOp<i64>>()
            .filter(|op| op.property() == Self::PROPERTY)
            .map(|op| *op.value_for(done))
            .ok_or_else(|| OpError::InvalidState(format!("{:?} is not a counter op", op)))?;
        if self.refuse == Some(target) {
            return Err(OpError::InvalidState(format!("counter refuses {target}")));
        }
        self.applied += 1;
        self.set_value(manager, target)
    }
}

impl Object for Counter {
    fn undo(&mut self, op: &mut dyn Op, manager: &mut Manager) -> OpResult {
        self.restore(op, manager, false)
    }

    fn redo(&mut self, op: &mut dyn Op, manager: &mut Manager) -> OpResult {
        self.restore(op, manager, true)
    }
}

// ============================================================================
// Probe
// ============================================================================

/// Which hook was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    Undo,
    Redo,
}

/// One recorded hook invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookCall {
    /// Name of the probe that received the call.
    pub probe: &'static str,
    /// Hook that ran.
    pub hook: Hook,
    /// Tag of the op, `None` for foreign ops.
    pub tag: Option<u32>,
    /// `done` flag of the op when the hook ran.
    pub was_done: bool,
}

/// Shared, append-only log of hook calls.
#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<HookCall>>>);

impl Journal {
    /// Create an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, call: HookCall) {
        self.0.borrow_mut().push(call);
    }

    /// All calls so far.
    #[must_use]
    pub fn calls(&self) -> Vec<HookCall> {
        self.0.borrow().clone()
    }

    /// `(hook, tag)` pairs, the usual thing to assert on.
    #[must_use]
    pub fn sequence(&self) -> Vec<(Hook, u32)> {
        self.0
            .borrow()
            .iter()
            .filter_map(|c| c.tag.map(|tag| (c.hook, tag)))
            .collect()
    }

    /// Forget recorded calls.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Number of recorded calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

/// Object that only records what the manager asks of it.
#[derive(Debug)]
pub struct Probe {
    name: &'static str,
    journal: Journal,
}

impl Probe {
    /// Probe writing into `journal`.
    #[must_use]
    pub fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            journal: journal.clone(),
        }
    }

    fn record(&self, op: &dyn Op, hook: Hook) {
        let tag = op.downcast_ref::<TaggedOp>().map(TaggedOp::tag);
        tracing::trace!(probe = self.name, ?hook, ?tag, "probe hook");
        self.journal.push(HookCall {
            probe: self.name,
            hook,
            tag,
            was_done: op.is_done(),
        });
    }
}

impl Object for Probe {
    fn undo(&mut self, op: &mut dyn Op, _manager: &mut Manager) -> OpResult {
        self.record(op, Hook::Undo);
        Ok(())
    }

    fn redo(&mut self, op: &mut dyn Op, _manager: &mut Manager) -> OpResult {
        self.record(op, Hook::Redo);
        Ok(())
    }
}

// ============================================================================
// TaggedOp
// ============================================================================

/// Op without payload, identified by a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedOp {
    tag: u32,
    done: bool,
}

impl TaggedOp {
    /// Applied op with `tag`.
    #[must_use]
    pub fn new(tag: u32) -> Self {
        Self { tag, done: true }
    }

    /// Not yet applied op with `tag`.
    #[must_use]
    pub fn undone(tag: u32) -> Self {
        Self { tag, done: false }
    }

    /// The tag.
    #[must_use]
    pub fn tag(&self) -> u32 {
        self.tag
    }
}

impl Op for TaggedOp {
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
        "TaggedOp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_mutator_records_when_transacting() {
        let mut mgr = Manager::default();
        let (counter, handle) = shared(Counter::new(0));
        Counter::register(&counter, &handle, &mut mgr);

        counter.borrow_mut().set_value(&mut mgr, 1).unwrap();
        assert!(!mgr.can_undo());

        mgr.transaction("set", None);
        counter.borrow_mut().set_value(&mut mgr, 2).unwrap();
        mgr.commit();

        mgr.undo().unwrap();
        assert_eq!(counter.borrow().value(), 1);
        assert_eq!(counter.borrow().applied(), 1);
    }

    #[test]
    fn probe_records_calls() {
        let journal = Journal::new();
        let (_probe, handle) = shared(Probe::new("p", &journal));
        let mut mgr = Manager::default();

        mgr.transaction("t", None);
        mgr.queue(&handle, Box::new(TaggedOp::new(7))).unwrap();
        mgr.commit();
        mgr.undo().unwrap();

        let calls = journal.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].probe, "p");
        assert_eq!(calls[0].hook, Hook::Undo);
        assert_eq!(calls[0].tag, Some(7));
        assert!(calls[0].was_done);
    }

    #[test]
    fn journal_clear() {
        let journal = Journal::new();
        assert!(journal.is_empty());
        let probe = Probe::new("p", &journal);
        probe.record(&TaggedOp::new(1), Hook::Redo);
        assert_eq!(journal.len(), 1);
        journal.clear();
        assert!(journal.is_empty());
    }

    #[test]
    fn tagged_op_flags() {
        assert!(TaggedOp::new(1).is_done());
        assert!(!TaggedOp::undone(1).is_done());
        assert_eq!(TaggedOp::new(5).tag(), 5);
    }
}
