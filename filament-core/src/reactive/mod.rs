//! Reactive Primitives
//!
//! This module implements the core reactive system: signals, observers, the
//! ambient tracking context, and the batch coordinator. Together they form
//! a fine-grained dependency graph that re-runs exactly the computations
//! that depend on the data that changed.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A [`Signal`] is a storage cell for a [`Value`]. Reading it while an
//! observer is running registers that observer as a dependent; writing it
//! notifies the dependents. Object-shaped values grow one lazily
//! materialized child signal per property, so nested state stays
//! independently reactive: writing `p.y` never disturbs a computation that
//! only read `p.x`.
//!
//! ## Observers
//!
//! An [`Observer`] wraps a callback and re-runs it whenever a signal it
//! read on its last run changes. The dependency set is rebuilt from scratch
//! on every run, so conditional reads come and go precisely.
//!
//! ## Batches
//!
//! [`batch`] defers observer notification until a logical group of writes
//! completes, collapsing what would be one re-run per write into exactly
//! one re-run per observer.
//!
//! # Execution Model
//!
//! Single-threaded, cooperative, synchronous: every read, write, trigger,
//! and flush runs to completion on the calling thread. The only concurrency
//! concern is reentrancy (writes from inside callbacks), which is bounded
//! by the tracking stack's depth limit rather than prevented.
//!
//! This approach to transparent dependency tracking is the one used by
//! SolidJS, Vue 3, and Leptos.

pub mod batch;
pub mod context;
mod observer;
mod signal;
mod value;

pub use batch::batch;
pub use observer::{observe, Observer, ObserverId};
pub use signal::{Prop, Signal, SignalId};
pub use value::Value;
