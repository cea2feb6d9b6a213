#![forbid(unsafe_code)]

//! txundo core
//!
//! Transaction-based undo/redo for interactive editors: an object identity
//! table combined with a command log that groups reversible ops into named,
//! joinable transactions.
//!
//! # Key Components
//!
//! - [`Op`] - A reversible unit of work with a `done` flag
//! - [`Object`] - Receives ops during undo/redo replay
//! - [`IdentityTable`] - Recyclable, generation-checked [`ObjectId`]s
//! - [`Manager`] - Transaction log, cursor, and replay
//! - [`Transaction`] - Scope guard that commits on drop
//!
//! # Quick Start
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use txundo_core::{Manager, Object, ObjectRef, Op, OpResult, PropertyOp, Transaction};
//!
//! #[derive(Default)]
//! struct Layer {
//!     opacity: u8,
//! }
//!
//! impl Layer {
//!     fn restore(&mut self, op: &mut dyn Op, done: bool) -> OpResult {
//!         if let Some(op) = op.downcast_ref::<PropertyOp<u8>>() {
//!             self.opacity = *op.value_for(done);
//!         }
//!         Ok(())
//!     }
//! }
//!
//! impl Object for Layer {
//!     fn undo(&mut self, op: &mut dyn Op, _manager: &mut Manager) -> OpResult {
//!         self.restore(op, false)
//!     }
//!
//!     fn redo(&mut self, op: &mut dyn Op, _manager: &mut Manager) -> OpResult {
//!         self.restore(op, true)
//!     }
//! }
//!
//! let mut manager = Manager::default();
//! let layer = Rc::new(RefCell::new(Layer::default()));
//! let handle: ObjectRef = layer.clone();
//!
//! {
//!     let mut tx = Transaction::new(&mut manager, "Fade layer");
//!     layer.borrow_mut().opacity = 128;
//!     tx.queue(&handle, Box::new(PropertyOp::new("opacity", 0u8, 128u8)))
//!         .unwrap();
//! }
//!
//! assert_eq!(manager.available_undo(), Some("Fade layer"));
//! manager.undo().unwrap();
//! assert_eq!(layer.borrow().opacity, 0);
//! manager.redo().unwrap();
//! assert_eq!(layer.borrow().opacity, 128);
//! ```
//!
//! # Threading
//!
//! Everything is single-threaded and synchronous. Objects are shared through
//! `Rc<RefCell<_>>`, and the manager borrows an object mutably whenever it
//! runs one of its hooks. If the object is already borrowed at that point
//! (an undone op queued from the object's own mutator, or a hook reaching
//! back into its own object) the hook is not run and the call fails with
//! [`OpError::InvalidState`]; during undo/redo that surfaces as a
//! [`ReplayError`] and the transaction is rolled back.

pub mod manager;
pub mod object;
pub mod op;
pub mod transaction;

pub use manager::{Manager, ManagerConfig, ReplayDirection, ReplayError, TransactionId};
pub use object::{IdentityTable, Object, ObjectId, ObjectRef};
pub use op::{Op, OpError, OpResult, PropertyOp};
pub use transaction::Transaction;
