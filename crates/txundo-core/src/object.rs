#![forbid(unsafe_code)]

//! Objects that receive replayed ops, and the id table that names them.
//!
//! Ops refer to their target through an [`ObjectId`] instead of holding the
//! object itself. The [`IdentityTable`] maps ids back to objects without
//! owning them: it stores [`Weak`] handles, so an object dropped by the
//! application simply stops resolving.
//!
//! # Id Lifecycle
//!
//! ```text
//! next_id(a)        -> #0@0   slot 0 in use
//! next_id(b)        -> #1@0   slot 1 in use
//! release(#0@0)             slot 0 free, generation -> 1
//! object_by_id(#0@0)-> None   stale generation
//! next_id(c)        -> #0@1   smallest free index recycled
//! ```
//!
//! # Invariants
//!
//! 1. A slot is either in use (holds a handle) or on the free set, never both.
//! 2. An id resolves only if its index is in use AND its generation matches.
//! 3. Recycled indices are handed out smallest first.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::manager::Manager;
use crate::op::{Op, OpResult};

/// Something ops can be replayed on.
///
/// These hooks are the only place where op payloads are interpreted. The
/// manager passes itself so that hooks may call back into mutators which
/// [`queue`](Manager::queue) ops; those calls are accepted and dropped while
/// replaying.
pub trait Object {
    /// Revert `op` on this object.
    fn undo(&mut self, op: &mut dyn Op, manager: &mut Manager) -> OpResult;

    /// Re-apply `op` on this object.
    fn redo(&mut self, op: &mut dyn Op, manager: &mut Manager) -> OpResult;
}

/// Shared handle to an object known to a manager.
pub type ObjectRef = Rc<RefCell<dyn Object>>;

/// Stable, recyclable name of an object.
///
/// The `index` is the small integer that gets recycled; the `generation`
/// distinguishes successive owners of the same index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    index: u32,
    generation: u32,
}

impl ObjectId {
    /// Create an id from raw parts.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when this id was handed out.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.index, self.generation)
    }
}

/// Address of the allocation behind a handle, used for reverse lookup.
fn handle_key(object: &ObjectRef) -> usize {
    Rc::as_ptr(object).cast::<()>() as usize
}

/// Same key as [`handle_key`], taken from a slot's weak handle.
fn weak_key(object: &Weak<RefCell<dyn Object>>) -> usize {
    Weak::as_ptr(object).cast::<()>() as usize
}

struct Slot {
    generation: u32,
    object: Option<Weak<RefCell<dyn Object>>>,
}

/// Generation-stamped slot table mapping [`ObjectId`]s to objects.
#[derive(Default)]
pub struct IdentityTable {
    slots: Vec<Slot>,
    free: BTreeSet<u32>,
    by_handle: HashMap<usize, ObjectId>,
}

impl fmt::Debug for IdentityTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityTable")
            .field("capacity", &self.slots.len())
            .field("free", &self.free.len())
            .finish()
    }
}

impl IdentityTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id for `object`.
    ///
    /// Reuses the smallest released index if there is one, else appends.
    /// Does not check whether `object` already has an id.
    pub fn next_id(&mut self, object: &ObjectRef) -> ObjectId {
        let id = match self.free.pop_first() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.object = Some(Rc::downgrade(object));
                ObjectId::new(index, slot.generation)
            }
            None => {
                assert!(
                    self.slots.len() < u32::MAX as usize,
                    "object id space exhausted"
                );
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    object: Some(Rc::downgrade(object)),
                });
                ObjectId::new(index, 0)
            }
        };
        self.by_handle.insert(handle_key(object), id);
        tracing::trace!(target: "txundo.ids", id = %id, "allocated object id");
        id
    }

    /// Release `id` for reuse.
    ///
    /// Returns `false` and leaves the table untouched if `id` is out of
    /// range, already free, or stale.
    pub fn release_object(&mut self, id: ObjectId) -> bool {
        let live = self
            .slots
            .get(id.index as usize)
            .is_some_and(|slot| slot.object.is_some() && slot.generation == id.generation);
        if !live {
            tracing::warn!(target: "txundo.ids", id = %id, "release of unknown object id ignored");
            return false;
        }

        let slot = &mut self.slots[id.index as usize];
        if let Some(key) = slot.object.take().as_ref().map(weak_key)
            && self.by_handle.get(&key) == Some(&id)
        {
            self.by_handle.remove(&key);
        }
        slot.generation = slot.generation.wrapping_add(1);
        self.free.insert(id.index);
        tracing::trace!(target: "txundo.ids", id = %id, "released object id");
        true
    }

    /// Resolve `id` to its object.
    ///
    /// `None` if the id is out of range, free, stale, or its object has been
    /// dropped.
    #[must_use]
    pub fn object_by_id(&self, id: ObjectId) -> Option<ObjectRef> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.object.as_ref()?.upgrade()
    }

    /// Id currently cached for `object`, if it still resolves to it.
    #[must_use]
    pub fn id_of(&self, object: &ObjectRef) -> Option<ObjectId> {
        let id = *self.by_handle.get(&handle_key(object))?;
        let slot = self.slots.get(id.index as usize)?;
        let same = slot.generation == id.generation
            && slot
                .object
                .as_ref()
                .is_some_and(|weak| weak.ptr_eq(&Rc::downgrade(object)));
        same.then_some(id)
    }

    /// Id for `object`, allocating one if it has none.
    pub fn ensure_id(&mut self, object: &ObjectRef) -> ObjectId {
        match self.id_of(object) {
            Some(id) => id,
            None => self.next_id(object),
        }
    }

    /// Number of ids currently in use.
    #[must_use]
    pub fn live_objects(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Highest index ever allocated + 1.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
