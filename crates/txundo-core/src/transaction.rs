#![forbid(unsafe_code)]

//! Scoped transactions.
//!
//! A [`Transaction`] opens a transaction on construction and commits it when
//! dropped. While it lives it holds the manager exclusively, so edits are
//! queued through the guard.
//!
//! ```ignore
//! let mut tx = Transaction::new(&mut manager, "Move layer");
//! tx.queue(&layer, Box::new(PropertyOp::new("offset", old, new)))?;
//! // committed here
//! ```
//!
//! A guard can pause capturing with [`close`](Transaction::close) and
//! continue into the same history entry with [`open`](Transaction::open).
//! A detached guard (no manager) accepts every call and does nothing.

use std::fmt;

use crate::manager::{Manager, TransactionId};
use crate::object::{ObjectId, ObjectRef};
use crate::op::{Op, OpResult};

/// Transaction bound to a lexical scope. Commits on drop.
pub struct Transaction<'m> {
    manager: Option<&'m mut Manager>,
    id: Option<TransactionId>,
    description: String,
}

impl fmt::Debug for Transaction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("attached", &self.manager.is_some())
            .finish()
    }
}

impl<'m> Transaction<'m> {
    /// Open a new transaction on `manager`.
    pub fn new(manager: &'m mut Manager, description: impl Into<String>) -> Self {
        Self::open_on(Some(manager), description.into(), None)
    }

    /// Open a transaction that continues `join_with` if it is still the
    /// newest history entry.
    pub fn joined(
        manager: &'m mut Manager,
        description: impl Into<String>,
        join_with: TransactionId,
    ) -> Self {
        Self::open_on(Some(manager), description.into(), Some(join_with))
    }

    /// Open on `manager` if there is one; otherwise the guard is detached.
    pub fn from_option(manager: Option<&'m mut Manager>, description: impl Into<String>) -> Self {
        Self::open_on(manager, description.into(), None)
    }

    /// A guard without a manager. Every call is a no-op.
    pub fn detached(description: impl Into<String>) -> Self {
        Self::open_on(None, description.into(), None)
    }

    fn open_on(
        mut manager: Option<&'m mut Manager>,
        description: String,
        join_with: Option<TransactionId>,
    ) -> Self {
        let id = manager
            .as_deref_mut()
            .map(|m| m.transaction(description.clone(), join_with));
        Self {
            manager,
            id,
            description,
        }
    }

    /// Id of the underlying transaction, `None` when detached.
    #[must_use]
    pub fn id(&self) -> Option<TransactionId> {
        self.id
    }

    /// Description given at construction.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether the guard still drives a manager.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.manager.is_some()
    }

    /// Whether the manager currently records into a transaction.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.manager.as_deref().is_some_and(Manager::transacting)
    }

    /// The manager this guard drives.
    #[must_use]
    pub fn manager(&self) -> Option<&Manager> {
        self.manager.as_deref()
    }

    /// Mutable access to the manager this guard drives.
    pub fn manager_mut(&mut self) -> Option<&mut Manager> {
        self.manager.as_deref_mut()
    }

    /// Queue `op` for `object`. See [`Manager::queue`].
    ///
    /// # Errors
    ///
    /// Propagates the manager's error.
    pub fn queue(&mut self, object: &ObjectRef, op: Box<dyn Op>) -> OpResult {
        match self.manager.as_deref_mut() {
            Some(manager) => manager.queue(object, op),
            None => Ok(()),
        }
    }

    /// Queue `op` for the object named by `id`. See [`Manager::queue_for`].
    ///
    /// # Errors
    ///
    /// Propagates the manager's error.
    pub fn queue_for(&mut self, id: ObjectId, op: Box<dyn Op>) -> OpResult {
        match self.manager.as_deref_mut() {
            Some(manager) => manager.queue_for(id, op),
            None => Ok(()),
        }
    }

    /// Latest op queued for `object` in this transaction.
    pub fn last_queued(&mut self, object: &ObjectRef) -> Option<&mut dyn Op> {
        self.manager.as_deref_mut()?.last_queued(object)
    }

    /// Latest op of any object in this transaction.
    pub fn last_queued_any(&mut self) -> Option<&mut dyn Op> {
        self.manager.as_deref_mut()?.last_queued_any()
    }

    /// `true` if detached or nothing is queued in the open transaction.
    pub fn is_empty(&mut self) -> bool {
        self.last_queued_any().is_none()
    }

    /// Commit now, keeping the guard for a later [`open`](Self::open).
    pub fn close(&mut self) {
        if let Some(manager) = self.manager.as_deref_mut()
            && manager.transacting()
        {
            manager.commit();
        }
    }

    /// Resume recording into this guard's transaction.
    ///
    /// Joins the previous segment if it is still the newest history entry,
    /// otherwise a new entry is started and the guard's id follows it.
    pub fn open(&mut self) {
        let Some(manager) = self.manager.as_deref_mut() else {
            return;
        };
        if manager.transacting() {
            return;
        }
        self.id = Some(manager.transaction(self.description.clone(), self.id));
    }

    /// Undo everything queued through this guard and detach from the
    /// manager.
    pub fn cancel(&mut self) {
        self.open();
        if let Some(manager) = self.manager.take()
            && manager.transacting()
        {
            manager.cancel();
        }
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        self.close();
    }
}
