#![forbid(unsafe_code)]

//! Transaction log with undo/redo replay.
//!
//! The [`Manager`] groups queued [`Op`]s into named transaction records and
//! keeps a cursor into the record list. Records before the cursor can be
//! undone, records at or after it can be redone.
//!
//! # Architecture
//!
//! ```text
//!             cursor
//!               │
//! ┌─────┬─────┬─▼───┬─────┐
//! │ tx1 │ tx2 │ tx3 │ tx4 │     undo() replays tx2 backwards, cursor -> 1
//! └─────┴─────┴─────┴─────┘     redo() replays tx3 forwards,  cursor -> 3
//!  undoable    redoable
//!
//! transaction("tx5")  <-- new branch, tx3 and tx4 are erased
//! ┌─────┬─────┬─────┐
//! │ tx1 │ tx2 │ tx5 │  open, cursor points at it until commit
//! └─────┴─────┴─────┘
//! ```
//!
//! # Invariants
//!
//! 1. `cursor <= records.len()`
//! 2. While a transaction is open it is the last record and the cursor
//!    points at it; there is nothing to redo.
//! 3. Ops queued during replay never reach history.
//! 4. Every op before the cursor is done, every op after it is undone.
//! 5. `total_bytes` equals the summed size of every record except the open
//!    one, which is measured when it is committed.
//!
//! # Failure Modes
//!
//! - **Contract violation** (undo with nothing to undo, queue outside a
//!   transaction, nested `transaction`): panics. These are bugs in the
//!   calling layer.
//! - **Stale object id** during replay: the op is skipped silently.
//! - **Hook error** during replay: the part already replayed is reverted,
//!   the cursor stays put and a [`ReplayError`] is returned.

use std::cell::RefMut;
use std::collections::VecDeque;
use std::fmt;
use std::ops::RangeBounds;

use crate::object::{IdentityTable, Object, ObjectId, ObjectRef};
use crate::op::{Op, OpError, OpResult};

/// Identifies a transaction for joining and display.
///
/// Ids increase monotonically and are never reused by a manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId(u64);

impl TransactionId {
    /// Get the raw id value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx{}", self.0)
    }
}

/// Configuration for the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ManagerConfig {
    /// Master switch. A disabled manager records nothing.
    pub enabled: bool,
    /// Maximum number of committed transactions kept for undo.
    pub max_depth: usize,
    /// Maximum total bytes of recorded history (0 = unlimited).
    pub max_bytes: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_depth: usize::MAX,
            max_bytes: 0,
        }
    }
}

impl ManagerConfig {
    /// Configuration for a manager that records nothing.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Set the maximum undo depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the history byte budget (0 = unlimited).
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

/// Direction of a replay pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayDirection {
    /// Reverse insertion order, calling [`Object::undo`](crate::Object::undo).
    Undo,
    /// Insertion order, calling [`Object::redo`](crate::Object::redo).
    Redo,
}

impl ReplayDirection {
    fn as_str(self) -> &'static str {
        match self {
            Self::Undo => "undo",
            Self::Redo => "redo",
        }
    }

    fn inverse(self) -> Self {
        match self {
            Self::Undo => Self::Redo,
            Self::Redo => Self::Undo,
        }
    }

    /// `done` state an op has after a pass in this direction.
    fn done_after(self) -> bool {
        self == Self::Redo
    }
}

impl fmt::Display for ReplayDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An object hook failed while replaying a transaction.
///
/// The transaction has been rolled back to the state it had before the
/// failed pass and the cursor has not moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayError {
    /// Which pass failed.
    pub direction: ReplayDirection,
    /// Transaction being replayed.
    pub transaction: TransactionId,
    /// Object whose hook failed.
    pub object: ObjectId,
    /// Error reported by the hook.
    pub source: OpError,
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} failed on object {}: {}",
            self.direction, self.transaction, self.object, self.source
        )
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

struct QueuedOp {
    object: ObjectId,
    op: Box<dyn Op>,
}

struct TransactionRecord {
    id: TransactionId,
    description: String,
    ops: Vec<QueuedOp>,
}

impl TransactionRecord {
    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.description.len()
            + self
                .ops
                .iter()
                .map(|q| std::mem::size_of::<QueuedOp>() + q.op.size_bytes())
                .sum::<usize>()
    }
}

/// Undo/redo manager with an object identity table.
///
/// One manager per document. It owns every queued op but none of the
/// objects; objects are reached through [`ObjectId`]s.
pub struct Manager {
    objects: IdentityTable,
    records: VecDeque<TransactionRecord>,
    /// Number of records that can be undone.
    cursor: usize,
    opened: bool,
    replay: bool,
    next_transaction: u64,
    /// Bytes held by closed records.
    total_bytes: usize,
    config: ManagerConfig,
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("enabled", &self.config.enabled)
            .field("records", &self.records.len())
            .field("cursor", &self.cursor)
            .field("opened", &self.opened)
            .field("replay", &self.replay)
            .field("total_bytes", &self.total_bytes)
            .field("objects", &self.objects)
            .finish()
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new(ManagerConfig::default())
    }
}

impl Manager {
    /// Create a manager with the given configuration.
    #[must_use]
    pub fn new(config: ManagerConfig) -> Self {
        Self {
            objects: IdentityTable::new(),
            records: VecDeque::new(),
            cursor: 0,
            opened: false,
            replay: false,
            next_transaction: 1,
            total_bytes: 0,
            config,
        }
    }

    /// Create an enabled manager without limits.
    #[must_use]
    pub fn enabled() -> Self {
        Self::default()
    }

    /// Create a manager that records nothing.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(ManagerConfig::disabled())
    }

    // ========================================================================
    // Identity Table
    // ========================================================================

    /// Allocate an id for `object`. See [`IdentityTable::next_id`].
    pub fn next_id(&mut self, object: &ObjectRef) -> ObjectId {
        self.objects.next_id(object)
    }

    /// Release `id` for reuse. See [`IdentityTable::release_object`].
    pub fn release_object(&mut self, id: ObjectId) -> bool {
        self.objects.release_object(id)
    }

    /// Resolve `id`, or `None` if it no longer names a live object.
    #[must_use]
    pub fn object_by_id(&self, id: ObjectId) -> Option<ObjectRef> {
        self.objects.object_by_id(id)
    }

    /// Id currently assigned to `object`, if any.
    #[must_use]
    pub fn id_of(&self, object: &ObjectRef) -> Option<ObjectId> {
        self.objects.id_of(object)
    }

    /// The identity table.
    #[must_use]
    pub fn objects(&self) -> &IdentityTable {
        &self.objects
    }

    // ========================================================================
    // Transaction Lifecycle
    // ========================================================================

    /// Open a transaction.
    ///
    /// If `join_with` names the last record and nothing has been undone
    /// since, ops are appended to that record and its description is
    /// replaced. Otherwise any redoable records are erased and a new record
    /// is started.
    ///
    /// On a disabled manager nothing is opened and the returned id is
    /// meaningless.
    ///
    /// # Panics
    ///
    /// If a transaction is already open or a replay is running.
    pub fn transaction(
        &mut self,
        description: impl Into<String>,
        join_with: Option<TransactionId>,
    ) -> TransactionId {
        if !self.config.enabled {
            return self.allocate_transaction_id();
        }
        assert!(!self.replay, "transaction opened during undo/redo replay");
        assert!(!self.opened, "transaction opened while another is open");

        let description = description.into();
        let joinable = join_with.is_some_and(|id| {
            self.cursor == self.records.len() && self.records.back().is_some_and(|r| r.id == id)
        });

        let id = if let Some(record) = self.records.back_mut().filter(|_| joinable) {
            // Re-measured on commit.
            self.total_bytes = self.total_bytes.saturating_sub(record.size_bytes());
            record.description = description;
            self.cursor -= 1;
            tracing::debug!(
                target: "txundo.manager",
                transaction = %record.id,
                description = %record.description,
                ops = record.ops.len(),
                "joined transaction"
            );
            record.id
        } else {
            let erased = self.erase_transactions(self.cursor..);
            let id = self.allocate_transaction_id();
            tracing::debug!(
                target: "txundo.manager",
                transaction = %id,
                description = %description,
                erased,
                "opened transaction"
            );
            self.records.push_back(TransactionRecord {
                id,
                description,
                ops: Vec::new(),
            });
            self.cursor = self.records.len() - 1;
            id
        };

        self.opened = true;
        id
    }

    /// Close the open transaction, making it available for undo.
    ///
    /// No-op on a disabled manager.
    ///
    /// # Panics
    ///
    /// If no transaction is open or a replay is running.
    pub fn commit(&mut self) {
        if !self.config.enabled {
            return;
        }
        assert!(!self.replay, "commit during undo/redo replay");
        assert!(self.opened, "commit without an open transaction");

        self.opened = false;
        self.cursor += 1;
        if let Some(record) = self.records.back() {
            self.total_bytes += record.size_bytes();
            tracing::debug!(
                target: "txundo.manager",
                transaction = %record.id,
                ops = record.ops.len(),
                "committed transaction"
            );
        }
        self.enforce_limits();
    }

    /// Close the open transaction, undoing all of its ops and discarding it.
    ///
    /// Segments joined into the record are undone as well. Hook errors are
    /// logged and do not stop the cancel. No-op on a disabled manager.
    ///
    /// # Panics
    ///
    /// If no transaction is open or a replay is running.
    pub fn cancel(&mut self) {
        if !self.config.enabled {
            return;
        }
        assert!(!self.replay, "cancel during undo/redo replay");
        assert!(self.opened, "cancel without an open transaction");

        self.opened = false;
        let Some(mut record) = self.records.pop_back() else {
            return;
        };
        self.cursor = self.records.len();

        self.replay = true;
        for queued in record.ops.iter_mut().rev() {
            if let Some(object) = self.objects.object_by_id(queued.object) {
                let result = borrow_object(&object, queued.object)
                    .and_then(|mut target| target.undo(queued.op.as_mut(), self));
                if let Err(err) = result {
                    tracing::warn!(
                        target: "txundo.manager",
                        transaction = %record.id,
                        object = %queued.object,
                        error = %err,
                        "undo failed while cancelling transaction"
                    );
                }
            }
            queued.op.set_done(false);
        }
        self.replay = false;

        tracing::debug!(
            target: "txundo.manager",
            transaction = %record.id,
            ops = record.ops.len(),
            "cancelled transaction"
        );
    }

    /// Record `op` for `object` in the open transaction.
    ///
    /// The object gets an id on first use; later calls reuse it. An op
    /// arriving undone is first redone on the object so that history only
    /// holds applied ops.
    ///
    /// The op is dropped without being recorded when the manager is
    /// disabled or replaying.
    ///
    /// An undone op must not be queued while `object` is borrowed, e.g. from
    /// inside one of its own `&mut self` mutators, since redoing it needs a
    /// fresh mutable borrow. Queue ops that are already applied there.
    ///
    /// # Errors
    ///
    /// Returns the hook's error if redoing an undone op fails, or
    /// [`OpError::InvalidState`] if the object is already borrowed; the op is
    /// dropped in either case.
    ///
    /// # Panics
    ///
    /// If the manager is enabled, not replaying, and no transaction is open.
    pub fn queue(&mut self, object: &ObjectRef, op: Box<dyn Op>) -> OpResult {
        if !self.accepts_ops() {
            return Ok(());
        }
        let id = self.objects.ensure_id(object);
        self.record_op(id, Some(object.clone()), op)
    }

    /// Record `op` for the object named by `id`.
    ///
    /// Like [`queue`](Self::queue), for callers that only keep ids.
    ///
    /// # Errors
    ///
    /// [`OpError::TargetGone`] if `op` is undone and `id` does not resolve,
    /// [`OpError::InvalidState`] if the object is already borrowed, or the
    /// hook's error if redoing it fails.
    ///
    /// # Panics
    ///
    /// Same contract as [`queue`](Self::queue).
    pub fn queue_for(&mut self, id: ObjectId, op: Box<dyn Op>) -> OpResult {
        if !self.accepts_ops() {
            return Ok(());
        }
        let object = self.objects.object_by_id(id);
        self.record_op(id, object, op)
    }

    /// Most recent op queued for `object` in the open transaction.
    ///
    /// `None` if no transaction is open or `object` has no op in it.
    pub fn last_queued(&mut self, object: &ObjectRef) -> Option<&mut dyn Op> {
        if !self.transacting() {
            return None;
        }
        let id = self.objects.id_of(object)?;
        self.records
            .back_mut()?
            .ops
            .iter_mut()
            .rev()
            .find(|q| q.object == id)
            .map(|q| q.op.as_mut())
    }

    /// Most recent op of any object in the open transaction.
    ///
    /// `None` means nothing has been queued into the open record.
    pub fn last_queued_any(&mut self) -> Option<&mut dyn Op> {
        if !self.transacting() {
            return None;
        }
        self.records
            .back_mut()?
            .ops
            .last_mut()
            .map(|q| q.op.as_mut())
    }

    // ========================================================================
    // Replay
    // ========================================================================

    /// Undo the transaction before the cursor.
    ///
    /// Ops are replayed in reverse insertion order; ops whose object no
    /// longer resolves are skipped.
    ///
    /// # Errors
    ///
    /// [`ReplayError`] if a hook fails. The transaction is restored and the
    /// cursor does not move.
    ///
    /// # Panics
    ///
    /// If nothing can be undone, a transaction is open, or a replay is
    /// already running.
    pub fn undo(&mut self) -> Result<(), ReplayError> {
        assert!(!self.replay, "undo during undo/redo replay");
        assert!(!self.opened, "undo while a transaction is open");
        assert!(self.can_undo(), "undo with nothing to undo");

        let index = self.cursor - 1;
        self.replay_record(index, ReplayDirection::Undo)?;
        self.cursor = index;
        Ok(())
    }

    /// Redo the transaction at the cursor.
    ///
    /// Ops are replayed in insertion order; ops whose object no longer
    /// resolves are skipped.
    ///
    /// # Errors
    ///
    /// [`ReplayError`] if a hook fails. The transaction is restored and the
    /// cursor does not move.
    ///
    /// # Panics
    ///
    /// If nothing can be redone, a transaction is open, or a replay is
    /// already running.
    pub fn redo(&mut self) -> Result<(), ReplayError> {
        assert!(!self.replay, "redo during undo/redo replay");
        assert!(!self.opened, "redo while a transaction is open");
        assert!(self.can_redo(), "redo with nothing to redo");

        let index = self.cursor;
        self.replay_record(index, ReplayDirection::Redo)?;
        self.cursor = index + 1;
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Description of the transaction [`undo`](Self::undo) would revert.
    #[must_use]
    pub fn available_undo(&self) -> Option<&str> {
        self.undo_record().map(|r| r.description.as_str())
    }

    /// Description of the transaction [`redo`](Self::redo) would re-apply.
    #[must_use]
    pub fn available_redo(&self) -> Option<&str> {
        self.redo_record().map(|r| r.description.as_str())
    }

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.undo_record().is_some()
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.redo_record().is_some()
    }

    /// Id of the transaction [`undo`](Self::undo) would revert.
    #[must_use]
    pub fn transaction_id_for_undo(&self) -> Option<TransactionId> {
        self.undo_record().map(|r| r.id)
    }

    /// Id of the transaction [`redo`](Self::redo) would re-apply.
    #[must_use]
    pub fn transaction_id_for_redo(&self) -> Option<TransactionId> {
        self.redo_record().map(|r| r.id)
    }

    /// Id of the newest record in history, open or committed.
    #[must_use]
    pub fn last_transaction_id(&self) -> Option<TransactionId> {
        self.records.back().map(|r| r.id)
    }

    /// Whether a transaction is open on an enabled manager.
    #[must_use]
    pub fn transacting(&self) -> bool {
        self.config.enabled && self.opened
    }

    /// Whether an undo/redo replay is running.
    #[must_use]
    pub fn replaying(&self) -> bool {
        self.replay
    }

    /// Whether the manager records history.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Number of transactions that can be undone.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.cursor
    }

    /// Number of transactions that can be redone.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        if self.opened {
            0
        } else {
            self.records.len() - self.cursor
        }
    }

    /// Descriptions of undoable transactions, most recent first.
    pub fn undo_descriptions(&self, limit: usize) -> Vec<&str> {
        self.records
            .range(..self.cursor)
            .rev()
            .take(limit)
            .map(|r| r.description.as_str())
            .collect()
    }

    /// Descriptions of redoable transactions, next first.
    pub fn redo_descriptions(&self, limit: usize) -> Vec<&str> {
        if self.opened {
            return Vec::new();
        }
        self.records
            .range(self.cursor..)
            .take(limit)
            .map(|r| r.description.as_str())
            .collect()
    }

    /// Approximate bytes held by recorded history.
    ///
    /// The open transaction is counted once it is committed.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.total_bytes
    }

    /// Get the current configuration.
    #[must_use]
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Discard all history. The identity table is kept.
    ///
    /// An open transaction is dropped without undoing its ops.
    ///
    /// # Panics
    ///
    /// If called from inside a replay.
    pub fn clear(&mut self) {
        assert!(!self.replay, "clear during undo/redo replay");
        let erased = self.erase_transactions(..);
        self.cursor = 0;
        self.opened = false;
        self.total_bytes = 0;
        tracing::debug!(target: "txundo.manager", erased, "cleared history");
    }

    /// Switch recording on or off. History is discarded either way.
    ///
    /// # Panics
    ///
    /// If called from inside a replay.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.config.enabled == enabled {
            return;
        }
        self.clear();
        self.config.enabled = enabled;
        tracing::debug!(target: "txundo.manager", enabled, "recording switched");
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn allocate_transaction_id(&mut self) -> TransactionId {
        let id = TransactionId(self.next_transaction);
        self.next_transaction += 1;
        id
    }

    fn undo_record(&self) -> Option<&TransactionRecord> {
        self.cursor.checked_sub(1).and_then(|i| self.records.get(i))
    }

    fn redo_record(&self) -> Option<&TransactionRecord> {
        if self.opened {
            return None;
        }
        self.records.get(self.cursor)
    }

    /// Whether `queue` should record. Panics on a contract violation.
    fn accepts_ops(&self) -> bool {
        if !self.config.enabled {
            return false;
        }
        if self.replay {
            tracing::trace!(target: "txundo.manager", "op queued during replay dropped");
            return false;
        }
        assert!(self.opened, "op queued outside of a transaction");
        true
    }

    fn record_op(
        &mut self,
        id: ObjectId,
        object: Option<ObjectRef>,
        mut op: Box<dyn Op>,
    ) -> OpResult {
        if !op.is_done() {
            let object = object.ok_or_else(|| OpError::TargetGone(id.to_string()))?;
            let mut target = borrow_object(&object, id)?;
            // Hooks may call back into mutators that queue; hide those.
            self.replay = true;
            let result = target.redo(op.as_mut(), self);
            self.replay = false;
            result?;
            op.set_done(true);
        }

        if let Some(record) = self.records.back_mut() {
            tracing::trace!(
                target: "txundo.manager",
                transaction = %record.id,
                object = %id,
                op = op.debug_name(),
                "queued op"
            );
            record.ops.push(QueuedOp { object: id, op });
        }
        Ok(())
    }

    /// Replay the record at `index`, rolling back on hook failure.
    fn replay_record(
        &mut self,
        index: usize,
        direction: ReplayDirection,
    ) -> Result<(), ReplayError> {
        let transaction = self.records[index].id;
        let _span = tracing::debug_span!(
            "txundo.replay",
            direction = direction.as_str(),
            transaction = %transaction
        )
        .entered();

        // Hooks get `&mut self`, so the ops leave the record while replaying.
        let mut ops = std::mem::take(&mut self.records[index].ops);
        let order: Vec<usize> = match direction {
            ReplayDirection::Undo => (0..ops.len()).rev().collect(),
            ReplayDirection::Redo => (0..ops.len()).collect(),
        };

        self.replay = true;
        let mut failure = None;
        for (step, &i) in order.iter().enumerate() {
            if let Err(source) = self.replay_op(&mut ops[i], direction) {
                let object = ops[i].object;
                for &j in order[..step].iter().rev() {
                    if let Err(err) = self.replay_op(&mut ops[j], direction.inverse()) {
                        tracing::warn!(
                            target: "txundo.manager",
                            transaction = %transaction,
                            object = %ops[j].object,
                            error = %err,
                            "rollback after failed replay could not restore op"
                        );
                    }
                }
                failure = Some(ReplayError {
                    direction,
                    transaction,
                    object,
                    source,
                });
                break;
            }
        }
        self.replay = false;
        self.records[index].ops = ops;

        match failure {
            None => {
                tracing::debug!(target: "txundo.manager", "replayed transaction");
                Ok(())
            }
            Some(err) => {
                tracing::warn!(target: "txundo.manager", error = %err, "replay failed");
                Err(err)
            }
        }
    }

    /// Run one op's hook and flip its `done` flag. Stale ids are skipped.
    fn replay_op(&mut self, queued: &mut QueuedOp, direction: ReplayDirection) -> OpResult {
        match self.objects.object_by_id(queued.object) {
            Some(object) => {
                let mut target = borrow_object(&object, queued.object)?;
                match direction {
                    ReplayDirection::Undo => target.undo(queued.op.as_mut(), self)?,
                    ReplayDirection::Redo => target.redo(queued.op.as_mut(), self)?,
                }
            }
            None => {
                tracing::trace!(
                    target: "txundo.manager",
                    object = %queued.object,
                    "skipped op of released object"
                );
            }
        }
        queued.op.set_done(direction.done_after());
        Ok(())
    }

    /// Drop the records in `range`. Returns how many were erased.
    fn erase_transactions<R: RangeBounds<usize>>(&mut self, range: R) -> usize {
        let mut erased = 0;
        for record in self.records.drain(range) {
            self.total_bytes = self.total_bytes.saturating_sub(record.size_bytes());
            erased += 1;
        }
        erased
    }

    /// Evict the oldest records while over the depth or byte budget.
    fn enforce_limits(&mut self) {
        while self.records.len() > 1 && self.over_budget() {
            if let Some(record) = self.records.pop_front() {
                self.cursor -= 1;
                self.total_bytes = self.total_bytes.saturating_sub(record.size_bytes());
                tracing::debug!(
                    target: "txundo.manager",
                    transaction = %record.id,
                    "evicted oldest transaction"
                );
            }
        }
    }

    fn over_budget(&self) -> bool {
        self.cursor > self.config.max_depth
            || (self.config.max_bytes > 0 && self.total_bytes > self.config.max_bytes)
    }
}

/// Mutably borrow `object` for a hook, failing instead of panicking if it is
/// already borrowed.
fn borrow_object(object: &ObjectRef, id: ObjectId) -> Result<RefMut<'_, dyn Object + 'static>, OpError> {
    object
        .try_borrow_mut()
        .map_err(|_| OpError::InvalidState(format!("object {id} is already borrowed")))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Object;
    use crate::op::PropertyOp;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Cell {
        value: i32,
        calls: Vec<String>,
        fail_on: Option<i32>,
    }

    impl Cell {
        fn apply(&mut self, op: &mut dyn Op, done: bool, hook: &str) -> OpResult {
            let op = op
                .downcast_ref::<PropertyOp<i32>>()
                .ok_or_else(|| OpError::InvalidState("unexpected op".into()))?;
            let target = *op.value_for(done);
            if self.fail_on == Some(target) {
                return Err(OpError::Other(format!("refusing {target}")));
            }
            self.value = target;
            self.calls.push(format!("{hook}:{target}"));
            Ok(())
        }
    }

    impl Object for Cell {
        fn undo(&mut self, op: &mut dyn Op, _manager: &mut Manager) -> OpResult {
            self.apply(op, false, "undo")
        }

        fn redo(&mut self, op: &mut dyn Op, _manager: &mut Manager) -> OpResult {
            self.apply(op, true, "redo")
        }
    }

    fn cell() -> (Rc<RefCell<Cell>>, ObjectRef) {
        let cell = Rc::new(RefCell::new(Cell::default()));
        let handle: ObjectRef = cell.clone();
        (cell, handle)
    }

    /// Open, set the cell to `new`, queue the change, commit.
    fn set(
        mgr: &mut Manager,
        cell: &Rc<RefCell<Cell>>,
        handle: &ObjectRef,
        desc: &str,
        new: i32,
    ) -> TransactionId {
        let id = mgr.transaction(desc, None);
        let old = std::mem::replace(&mut cell.borrow_mut().value, new);
        mgr.queue(handle, Box::new(PropertyOp::new("value", old, new)))
            .unwrap();
        mgr.commit();
        id
    }

    #[test]
    fn new_manager_is_empty() {
        let mgr = Manager::default();
        assert!(mgr.is_enabled());
        assert!(!mgr.can_undo());
        assert!(!mgr.can_redo());
        assert!(!mgr.transacting());
        assert_eq!(mgr.available_undo(), None);
        assert_eq!(mgr.last_transaction_id(), None);
    }

    #[test]
    fn commit_enables_undo() {
        let mut mgr = Manager::default();
        let (c, h) = cell();
        let id = set(&mut mgr, &c, &h, "set to 1", 1);

        assert_eq!(mgr.available_undo(), Some("set to 1"));
        assert_eq!(mgr.transaction_id_for_undo(), Some(id));
        assert_eq!(mgr.transaction_id_for_redo(), None);
        assert_eq!(mgr.undo_depth(), 1);
    }

    #[test]
    fn undo_redo_cycle() {
        let mut mgr = Manager::default();
        let (c, h) = cell();
        set(&mut mgr, &c, &h, "set to 1", 1);
        set(&mut mgr, &c, &h, "set to 2", 2);

        mgr.undo().unwrap();
        assert_eq!(c.borrow().value, 1);
        assert_eq!(mgr.available_redo(), Some("set to 2"));
        mgr.undo().unwrap();
        assert_eq!(c.borrow().value, 0);
        assert!(!mgr.can_undo());

        mgr.redo().unwrap();
        assert_eq!(c.borrow().value, 1);
        assert_eq!(mgr.available_undo(), Some("set to 1"));
        assert_eq!(mgr.available_redo(), Some("set to 2"));
    }

    #[test]
    fn undo_runs_in_reverse_order() {
        let mut mgr = Manager::default();
        let (c, h) = cell();
        mgr.transaction("steps", None);
        for (old, new) in [(0, 1), (1, 2), (2, 3)] {
            c.borrow_mut().value = new;
            mgr.queue(&h, Box::new(PropertyOp::new("value", old, new)))
                .unwrap();
        }
        mgr.commit();

        mgr.undo().unwrap();
        mgr.redo().unwrap();
        assert_eq!(
            c.borrow().calls,
            ["undo:2", "undo:1", "undo:0", "redo:1", "redo:2", "redo:3"]
        );
    }

    #[test]
    fn new_transaction_discards_redo() {
        let mut mgr = Manager::default();
        let (c, h) = cell();
        set(&mut mgr, &c, &h, "a", 1);
        set(&mut mgr, &c, &h, "b", 2);
        mgr.undo().unwrap();
        assert!(mgr.can_redo());

        set(&mut mgr, &c, &h, "c", 5);
        assert!(!mgr.can_redo());
        assert_eq!(mgr.undo_descriptions(10), ["c", "a"]);
    }

    #[test]
    fn join_appends_to_previous() {
        let mut mgr = Manager::default();
        let (c, h) = cell();
        let first = set(&mut mgr, &c, &h, "x", 1);

        let joined = mgr.transaction("y", Some(first));
        assert_eq!(joined, first);
        c.borrow_mut().value = 2;
        mgr.queue(&h, Box::new(PropertyOp::new("value", 1, 2)))
            .unwrap();
        mgr.commit();

        assert_eq!(mgr.undo_depth(), 1);
        assert_eq!(mgr.available_undo(), Some("y"));
        mgr.undo().unwrap();
        assert_eq!(c.borrow().value, 0);
    }

    #[test]
    fn join_with_stale_id_starts_new_record() {
        let mut mgr = Manager::default();
        let (c, h) = cell();
        let first = set(&mut mgr, &c, &h, "x", 1);
        set(&mut mgr, &c, &h, "y", 2);

        let id = mgr.transaction("z", Some(first));
        assert_ne!(id, first);
        mgr.commit();
        assert_eq!(mgr.undo_depth(), 3);
    }

    #[test]
    fn join_after_undo_starts_new_record() {
        let mut mgr = Manager::default();
        let (c, h) = cell();
        let first = set(&mut mgr, &c, &h, "x", 1);
        mgr.undo().unwrap();

        let id = mgr.transaction("y", Some(first));
        assert_ne!(id, first);
        mgr.commit();
        assert_eq!(mgr.undo_depth(), 1);
        assert!(!mgr.can_redo());
    }

    #[test]
    fn cancel_reverts_and_discards() {
        let mut mgr = Manager::default();
        let (c, h) = cell();
        mgr.transaction("edit", None);
        c.borrow_mut().value = 5;
        mgr.queue(&h, Box::new(PropertyOp::new("value", 0, 5)))
            .unwrap();
        mgr.cancel();

        assert_eq!(c.borrow().value, 0);
        assert!(!mgr.can_undo());
        assert!(!mgr.transacting());
        assert_eq!(mgr.last_transaction_id(), None);
    }

    #[test]
    fn cancel_keeps_earlier_history() {
        let mut mgr = Manager::default();
        let (c, h) = cell();
        set(&mut mgr, &c, &h, "keep", 1);
        mgr.transaction("drop", None);
        c.borrow_mut().value = 9;
        mgr.queue(&h, Box::new(PropertyOp::new("value", 1, 9)))
            .unwrap();
        mgr.cancel();

        assert_eq!(c.borrow().value, 1);
        assert_eq!(mgr.available_undo(), Some("keep"));
        assert_eq!(mgr.undo_depth(), 1);
    }

    #[test]
    fn undone_op_is_redone_on_queue() {
        let mut mgr = Manager::default();
        let (c, h) = cell();
        mgr.transaction("deferred", None);
        mgr.queue(&h, Box::new(PropertyOp::undone("value", 0, 4)))
            .unwrap();
        assert_eq!(c.borrow().value, 4);
        assert!(mgr.last_queued(&h).unwrap().is_done());
        mgr.commit();

        mgr.undo().unwrap();
        assert_eq!(c.borrow().value, 0);
    }

    #[test]
    fn failing_normalization_drops_op() {
        let mut mgr = Manager::default();
        let (c, h) = cell();
        c.borrow_mut().fail_on = Some(4);
        mgr.transaction("deferred", None);
        let err = mgr
            .queue(&h, Box::new(PropertyOp::undone("value", 0, 4)))
            .unwrap_err();
        assert_eq!(err, OpError::Other("refusing 4".into()));
        assert!(mgr.last_queued_any().is_none());
        mgr.commit();
    }

    #[test]
    fn last_queued_per_object() {
        let mut mgr = Manager::default();
        let (_a, ha) = cell();
        let (_b, hb) = cell();
        assert!(mgr.last_queued_any().is_none());

        mgr.transaction("t", None);
        assert!(mgr.last_queued(&ha).is_none());
        mgr.queue(&ha, Box::new(PropertyOp::new("value", 0, 1)))
            .unwrap();
        mgr.queue(&hb, Box::new(PropertyOp::new("value", 0, 7)))
            .unwrap();

        let a_op = mgr.last_queued(&ha).unwrap();
        assert_eq!(
            *a_op.downcast_ref::<PropertyOp<i32>>().unwrap().new_value(),
            1
        );
        let any = mgr.last_queued_any().unwrap();
        assert_eq!(
            *any.downcast_ref::<PropertyOp<i32>>().unwrap().new_value(),
            7
        );
        mgr.commit();
        assert!(mgr.last_queued(&ha).is_none());
    }

    #[test]
    fn coalesce_through_last_queued() {
        let mut mgr = Manager::default();
        let (c, h) = cell();
        mgr.transaction("drag", None);
        for step in 1..=5 {
            let old = std::mem::replace(&mut c.borrow_mut().value, step);
            match mgr
                .last_queued(&h)
                .and_then(|op| op.downcast_mut::<PropertyOp<i32>>())
            {
                Some(op) => op.merge_new(step),
                None => mgr
                    .queue(&h, Box::new(PropertyOp::new("value", old, step)))
                    .unwrap(),
            }
        }
        mgr.commit();

        mgr.undo().unwrap();
        assert_eq!(c.borrow().value, 0);
        assert_eq!(c.borrow().calls, ["undo:0"]);
    }

    #[test]
    fn object_keeps_one_id() {
        let mut mgr = Manager::default();
        let (_c, h) = cell();
        mgr.transaction("t", None);
        mgr.queue(&h, Box::new(PropertyOp::new("value", 0, 1)))
            .unwrap();
        mgr.queue(&h, Box::new(PropertyOp::new("value", 1, 2)))
            .unwrap();
        mgr.commit();
        assert_eq!(mgr.objects().live_objects(), 1);
    }

    #[test]
    fn released_object_is_skipped() {
        let mut mgr = Manager::default();
        let (a, ha) = cell();
        let (b, hb) = cell();
        mgr.transaction("both", None);
        a.borrow_mut().value = 1;
        mgr.queue(&ha, Box::new(PropertyOp::new("value", 0, 1)))
            .unwrap();
        b.borrow_mut().value = 1;
        mgr.queue(&hb, Box::new(PropertyOp::new("value", 0, 1)))
            .unwrap();
        mgr.commit();

        let id = mgr.id_of(&ha).unwrap();
        assert!(mgr.release_object(id));
        mgr.undo().unwrap();
        assert_eq!(a.borrow().value, 1);
        assert_eq!(b.borrow().value, 0);
    }

    #[test]
    fn failed_undo_rolls_back() {
        let mut mgr = Manager::default();
        let (a, ha) = cell();
        let (b, hb) = cell();
        mgr.transaction("pair", None);
        a.borrow_mut().value = 1;
        mgr.queue(&ha, Box::new(PropertyOp::new("value", 0, 1)))
            .unwrap();
        b.borrow_mut().value = 2;
        mgr.queue(&hb, Box::new(PropertyOp::new("value", 0, 2)))
            .unwrap();
        mgr.commit();

        // `b` is undone first and succeeds, `a` refuses.
        a.borrow_mut().fail_on = Some(0);
        let err = mgr.undo().unwrap_err();
        assert_eq!(err.direction, ReplayDirection::Undo);
        assert_eq!(err.object, mgr.id_of(&ha).unwrap());
        assert_eq!(a.borrow().value, 1);
        assert_eq!(b.borrow().value, 2);
        assert!(mgr.can_undo());
        assert!(!mgr.can_redo());
        assert!(!mgr.replaying());

        a.borrow_mut().fail_on = None;
        mgr.undo().unwrap();
        assert_eq!((a.borrow().value, b.borrow().value), (0, 0));
    }

    #[test]
    fn replay_error_display_and_source() {
        use std::error::Error;
        let err = ReplayError {
            direction: ReplayDirection::Redo,
            transaction: TransactionId(3),
            object: ObjectId::new(1, 0),
            source: OpError::Other("nope".into()),
        };
        assert_eq!(err.to_string(), "redo of tx3 failed on object #1@0: nope");
        assert!(err.source().is_some());
    }

    #[test]
    fn disabled_manager_is_inert() {
        let mut mgr = Manager::disabled();
        let (c, h) = cell();
        for i in 0..3 {
            mgr.transaction("ignored", None);
            assert!(!mgr.transacting());
            mgr.queue(&h, Box::new(PropertyOp::new("value", i, i + 1)))
                .unwrap();
            mgr.commit();
        }
        assert!(!mgr.can_undo());
        assert_eq!(mgr.available_undo(), None);
        assert_eq!(mgr.objects().live_objects(), 0);
        assert_eq!(c.borrow().value, 0);
        mgr.cancel();
    }

    #[test]
    fn set_enabled_discards_history() {
        let mut mgr = Manager::default();
        let (c, h) = cell();
        set(&mut mgr, &c, &h, "a", 1);
        mgr.set_enabled(false);
        assert!(!mgr.can_undo());
        mgr.set_enabled(true);
        assert!(!mgr.can_undo());
        set(&mut mgr, &c, &h, "b", 2);
        assert_eq!(mgr.available_undo(), Some("b"));
    }

    #[test]
    fn clear_keeps_ids() {
        let mut mgr = Manager::default();
        let (c, h) = cell();
        set(&mut mgr, &c, &h, "a", 1);
        let id = mgr.id_of(&h).unwrap();
        mgr.clear();
        assert!(!mgr.can_undo());
        assert!(!mgr.can_redo());
        assert_eq!(mgr.memory_usage(), 0);
        assert!(mgr.object_by_id(id).is_some());
    }

    #[test]
    fn empty_transaction_is_kept() {
        let mut mgr = Manager::default();
        mgr.transaction("noop", None);
        assert!(mgr.last_queued_any().is_none());
        mgr.commit();
        assert_eq!(mgr.available_undo(), Some("noop"));
        mgr.undo().unwrap();
        assert_eq!(mgr.available_redo(), Some("noop"));
    }

    #[test]
    fn max_depth_evicts_oldest() {
        let mut mgr = Manager::new(ManagerConfig::default().with_max_depth(2));
        let (c, h) = cell();
        for (i, desc) in ["a", "b", "c", "d"].iter().enumerate() {
            set(&mut mgr, &c, &h, desc, i as i32 + 1);
        }
        assert_eq!(mgr.undo_depth(), 2);
        assert_eq!(mgr.undo_descriptions(10), ["d", "c"]);
    }

    #[test]
    fn byte_budget_keeps_latest() {
        let mut mgr = Manager::new(ManagerConfig::default().with_max_bytes(1));
        let (c, h) = cell();
        for i in 1..=4 {
            set(&mut mgr, &c, &h, "edit", i);
        }
        assert_eq!(mgr.undo_depth(), 1);
        mgr.undo().unwrap();
        assert_eq!(c.borrow().value, 3);
    }

    #[test]
    fn memory_usage_grows_with_history() {
        let mut mgr = Manager::default();
        let (c, h) = cell();
        assert_eq!(mgr.memory_usage(), 0);
        set(&mut mgr, &c, &h, "a", 1);
        let one = mgr.memory_usage();
        set(&mut mgr, &c, &h, "b", 2);
        assert!(mgr.memory_usage() > one);
    }

    /// Summed size of the closed records, computed from scratch.
    fn recorded_bytes(mgr: &Manager) -> usize {
        assert!(!mgr.opened);
        mgr.records.iter().map(TransactionRecord::size_bytes).sum()
    }

    #[derive(Debug)]
    struct Blob {
        bytes: Vec<u8>,
        done: bool,
    }

    impl Op for Blob {
        fn is_done(&self) -> bool {
            self.done
        }

        fn set_done(&mut self, done: bool) {
            self.done = done;
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }

        fn size_bytes(&self) -> usize {
            std::mem::size_of::<Self>() + self.bytes.len()
        }
    }

    #[test]
    fn memory_usage_matches_records() {
        let mut mgr = Manager::new(ManagerConfig::default().with_max_depth(3));
        let (c, h) = cell();
        set(&mut mgr, &c, &h, "a", 1);
        assert_eq!(mgr.memory_usage(), recorded_bytes(&mgr));

        // Join into the newest record with a longer description.
        let b = set(&mut mgr, &c, &h, "b", 2);
        mgr.transaction("b, continued at length", Some(b));
        c.borrow_mut().value = 3;
        mgr.queue(&h, Box::new(PropertyOp::new("value", 2, 3)))
            .unwrap();
        mgr.commit();
        assert_eq!(mgr.memory_usage(), recorded_bytes(&mgr));

        mgr.transaction("dropped", None);
        mgr.queue(&h, Box::new(PropertyOp::new("value", 3, 4)))
            .unwrap();
        mgr.cancel();
        assert_eq!(mgr.memory_usage(), recorded_bytes(&mgr));

        for v in 5..10 {
            set(&mut mgr, &c, &h, "more", v);
        }
        assert_eq!(mgr.undo_descriptions(10), ["more", "more", "more"]);
        assert_eq!(mgr.memory_usage(), recorded_bytes(&mgr));

        // Branching erases the redoable records.
        mgr.undo().unwrap();
        mgr.undo().unwrap();
        set(&mut mgr, &c, &h, "branch", 0);
        assert_eq!(mgr.memory_usage(), recorded_bytes(&mgr));

        mgr.clear();
        assert_eq!(mgr.memory_usage(), 0);
    }

    #[test]
    fn op_grown_through_last_queued_is_remeasured() {
        let mut mgr = Manager::default();
        let (_c, h) = cell();
        mgr.transaction("paste", None);
        mgr.queue(
            &h,
            Box::new(Blob {
                bytes: vec![0; 8],
                done: true,
            }),
        )
        .unwrap();
        mgr.last_queued(&h)
            .and_then(|op| op.downcast_mut::<Blob>())
            .unwrap()
            .bytes
            .extend_from_slice(&[1; 4096]);
        mgr.commit();

        assert_eq!(mgr.memory_usage(), recorded_bytes(&mgr));
        assert!(mgr.memory_usage() > 4096);
    }

    #[derive(Default)]
    struct Knob {
        id: Option<ObjectId>,
        value: i32,
    }

    impl Knob {
        /// Queue a change that the manager applies by redoing it.
        fn schedule(&mut self, mgr: &mut Manager, value: i32) -> OpResult {
            let op = PropertyOp::undone("value", self.value, value);
            mgr.queue_for(self.id.unwrap(), Box::new(op))
        }
    }

    impl Object for Knob {
        fn undo(&mut self, op: &mut dyn Op, _manager: &mut Manager) -> OpResult {
            self.value = *op.downcast_ref::<PropertyOp<i32>>().unwrap().old();
            Ok(())
        }

        fn redo(&mut self, op: &mut dyn Op, _manager: &mut Manager) -> OpResult {
            self.value = *op.downcast_ref::<PropertyOp<i32>>().unwrap().new_value();
            Ok(())
        }
    }

    #[test]
    fn undone_op_queued_from_own_mutator_is_rejected() {
        let mut mgr = Manager::default();
        let knob = Rc::new(RefCell::new(Knob::default()));
        let handle: ObjectRef = knob.clone();
        let id = mgr.next_id(&handle);
        knob.borrow_mut().id = Some(id);

        mgr.transaction("schedule", None);
        let err = knob.borrow_mut().schedule(&mut mgr, 3).unwrap_err();
        assert!(matches!(err, OpError::InvalidState(_)), "{err}");
        assert!(mgr.last_queued_any().is_none());
        assert!(!mgr.replaying());
        assert_eq!(knob.borrow().value, 0);

        // Outside its own borrow the same op is redone and recorded.
        let op = PropertyOp::undone("value", 0, 3);
        mgr.queue_for(id, Box::new(op)).unwrap();
        mgr.commit();
        assert_eq!(knob.borrow().value, 3);
        mgr.undo().unwrap();
        assert_eq!(knob.borrow().value, 0);
    }

    #[test]
    fn borrowed_object_fails_replay_without_moving() {
        let mut mgr = Manager::default();
        let (c, h) = cell();
        set(&mut mgr, &c, &h, "a", 1);

        let held = c.borrow();
        let err = mgr.undo().unwrap_err();
        drop(held);

        assert_eq!(err.direction, ReplayDirection::Undo);
        assert!(matches!(err.source, OpError::InvalidState(_)));
        assert!(mgr.can_undo());
        assert!(!mgr.replaying());
        mgr.undo().unwrap();
        assert_eq!(c.borrow().value, 0);
    }

    #[test]
    fn borrowed_object_does_not_break_cancel() {
        let mut mgr = Manager::default();
        let (c, h) = cell();
        mgr.transaction("edit", None);
        c.borrow_mut().value = 5;
        mgr.queue(&h, Box::new(PropertyOp::new("value", 0, 5)))
            .unwrap();

        let held = c.borrow();
        mgr.cancel();
        drop(held);

        assert!(!mgr.transacting());
        assert!(!mgr.can_undo());
        assert_eq!(c.borrow().value, 5);
    }

    #[test]
    fn descriptions_respect_limit() {
        let mut mgr = Manager::default();
        let (c, h) = cell();
        for (i, desc) in ["a", "b", "c"].iter().enumerate() {
            set(&mut mgr, &c, &h, desc, i as i32);
        }
        assert_eq!(mgr.undo_descriptions(2), ["c", "b"]);
        mgr.undo().unwrap();
        mgr.undo().unwrap();
        assert_eq!(mgr.redo_descriptions(5), ["b", "c"]);
        assert_eq!(mgr.redo_descriptions(1), ["b"]);
    }

    #[test]
    fn transaction_ids_are_unique() {
        let mut mgr = Manager::default();
        let a = mgr.transaction("a", None);
        mgr.commit();
        let b = mgr.transaction("b", None);
        mgr.cancel();
        let c = mgr.transaction("c", None);
        mgr.commit();
        assert!(a < b && b < c);
        assert_eq!(c.to_string(), format!("tx{}", c.raw()));
    }

    #[test]
    #[should_panic(expected = "undo with nothing to undo")]
    fn undo_without_history_panics() {
        Manager::default().undo().ok();
    }

    #[test]
    #[should_panic(expected = "redo with nothing to redo")]
    fn redo_without_history_panics() {
        Manager::default().redo().ok();
    }

    #[test]
    #[should_panic(expected = "op queued outside of a transaction")]
    fn queue_outside_transaction_panics() {
        let mut mgr = Manager::default();
        let (_c, h) = cell();
        mgr.queue(&h, Box::new(PropertyOp::new("value", 0, 1)))
            .ok();
    }

    #[test]
    #[should_panic(expected = "transaction opened while another is open")]
    fn nested_transaction_panics() {
        let mut mgr = Manager::default();
        mgr.transaction("outer", None);
        mgr.transaction("inner", None);
    }

    #[test]
    #[should_panic(expected = "commit without an open transaction")]
    fn commit_without_open_panics() {
        Manager::default().commit();
    }

    #[test]
    #[should_panic(expected = "undo while a transaction is open")]
    fn undo_while_open_panics() {
        let mut mgr = Manager::default();
        mgr.transaction("a", None);
        mgr.commit();
        mgr.transaction("b", None);
        mgr.undo().ok();
    }

    #[test]
    fn config_builders() {
        let config = ManagerConfig::default().with_max_depth(5).with_max_bytes(64);
        assert!(config.enabled);
        assert_eq!(config.max_depth, 5);
        assert_eq!(config.max_bytes, 64);
        assert!(!ManagerConfig::disabled().enabled);
        assert_eq!(Manager::new(config.clone()).config(), &config);
    }

    #[test]
    fn debug_impl() {
        let debug_str = format!("{:?}", Manager::default());
        assert!(debug_str.contains("Manager"));
        assert!(debug_str.contains("cursor"));
    }
}
