//! Filament Core
//!
//! This crate provides the core runtime for Filament's fine-grained
//! reactive state graph. It implements:
//!
//! - Observable storage cells (signals) with lazy per-property child cells
//!   for nested object shapes
//! - Re-runnable computations (observers) with exact, self-refreshing
//!   dependency sets
//! - An ambient tracking context that records which computation is running
//! - A batch coordinator that coalesces multi-write updates into a single
//!   notification pass
//!
//! # Architecture
//!
//! - `reactive`: signals, observers, tracking context, batching
//! - `error`: the typed error surface
//!
//! # Example
//!
//! ```rust,ignore
//! use filament_core::{batch, observe, Signal, Value};
//!
//! let pos = Signal::new(Value::map([("x", 0), ("y", 0)]));
//!
//! // Runs immediately, then again whenever anything it read changes.
//! let _logger = observe(move || {
//!     println!("pos = {:?}", pos.get());
//! });
//!
//! // One merge, one re-run.
//! pos.set(Value::map([("x", 1), ("y", 1)]));
//!
//! // Group unrelated writes into a single notification pass.
//! batch(|| {
//!     pos.prop("x").set(2).unwrap();
//!     pos.prop("y").set(2).unwrap();
//! });
//! ```
//!
//! # Observability
//!
//! The runtime emits `tracing` events for reads, writes, child
//! materialization, triggers, and batch flushes. Install a subscriber to
//! see them; there is no behavioral effect either way.

pub mod error;
pub mod reactive;

pub use error::ReactiveError;
pub use reactive::{batch, observe, Observer, ObserverId, Prop, Signal, SignalId, Value};
