#![forbid(unsafe_code)]

//! Test harness for txundo.
//!
//! Reference objects and ops with observable hook behavior, a reference
//! model of linear undo history, and a `tracing` layer that captures
//! events for assertions. Used by the integration tests, benches and the
//! fuzz target of `txundo-core`.

pub mod model;
pub mod objects;
pub mod trace_capture;

pub use model::HistoryModel;
pub use objects::{Counter, Hook, HookCall, Journal, Probe, TaggedOp, shared};
pub use trace_capture::{CaptureHandle, CapturedEvent, CapturedSpan, EventCapture};
