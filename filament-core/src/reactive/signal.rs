//! Signal Graph
//!
//! A Signal is the fundamental reactive primitive: a storage cell that
//! tracks which observers depend on it. Leaf cells hold primitives; node
//! cells hold object-shaped [`Value::Map`]s and lazily grow one child cell
//! per property as those properties are read under tracking. Object shapes
//! are therefore only as deeply reactive as they have been observed.
//!
//! # How Signals Work
//!
//! 1. Reading a signal while an observer is running registers that observer
//!    as a subscriber of the signal and of every already-materialized
//!    descendant. Untracked reads have no subscription side effect and never
//!    grow the graph.
//!
//! 2. Writing a leaf stores the value and notifies subscribers, immediately
//!    or through the batch coordinator.
//!
//! 3. Writing an object onto a node does not replace the node's identity:
//!    the incoming keys are merged onto the stored map and forwarded to the
//!    child signals inside one implicit batch, so dependents see a single
//!    logical update.
//!
//! # Storage
//!
//! All nodes live in a central process-wide store indexed by [`SignalId`].
//! Parent and child links are ids, never owning pointers, so the tree cannot
//! form ownership cycles. The store lock is never held across an observer
//! callback.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use indexmap::IndexMap;
use parking_lot::RwLock;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::ReactiveError;

use super::batch;
use super::context;
use super::observer::{self, ObserverId};
use super::value::Value;

/// Unique identifier for a signal cell in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalId(u64);

impl SignalId {
    /// Generate a new unique signal ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for SignalId {
    fn default() -> Self {
        Self::new()
    }
}

/// One cell in the signal graph.
struct SignalNode {
    /// Diagnostic label; children are named by their key.
    name: String,

    /// The stored payload. For nodes, materialized children are
    /// authoritative for their keys; see [`SignalStore::compose`].
    value: Value,

    /// Back-reference to the enclosing node, if this cell was materialized
    /// as a property. Non-owning; used for diagnostics only.
    parent: Option<SignalId>,

    /// Lazily materialized children, keyed by property name. Always a
    /// subset of the stored map's keys.
    children: IndexMap<String, SignalId>,

    /// Subscriber multiset. Duplicates are permitted while an observer run
    /// is in progress and collapsed by [`SignalStore::dedup_subscribers`]
    /// once the run completes.
    subscribers: SmallVec<[ObserverId; 4]>,
}

/// The central arena owning every signal node.
#[derive(Default)]
struct SignalStore {
    nodes: HashMap<SignalId, SignalNode>,
}

static STORE: OnceLock<RwLock<SignalStore>> = OnceLock::new();

fn store() -> &'static RwLock<SignalStore> {
    STORE.get_or_init(|| RwLock::new(SignalStore::default()))
}

impl SignalStore {
    fn insert(&mut self, name: String, value: Value, parent: Option<SignalId>) -> SignalId {
        let id = SignalId::new();
        self.nodes.insert(
            id,
            SignalNode {
                name,
                value,
                parent,
                children: IndexMap::new(),
                subscribers: SmallVec::new(),
            },
        );
        id
    }

    fn node(&self, id: SignalId) -> &SignalNode {
        self.nodes.get(&id).expect("signal missing from store")
    }

    fn node_mut(&mut self, id: SignalId) -> &mut SignalNode {
        self.nodes.get_mut(&id).expect("signal missing from store")
    }

    /// Dotted path from the root signal down to `id`, for diagnostics.
    fn path(&self, id: SignalId) -> String {
        let mut segments = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.node(current);
            segments.push(node.name.clone());
            cursor = node.parent;
        }
        segments.reverse();
        segments.join(".")
    }

    /// Look up the child for `key`, materializing it from the stored value
    /// on first use. Returns `None` when the stored value has no such key.
    fn ensure_child(&mut self, parent: SignalId, key: &str) -> Option<SignalId> {
        if let Some(&child) = self.node(parent).children.get(key) {
            return Some(child);
        }

        let child_value = self.node(parent).value.get(key)?.clone();
        let child = self.insert(key.to_owned(), child_value, Some(parent));
        self.node_mut(parent).children.insert(key.to_owned(), child);

        debug!(signal = %self.path(child), "materialized child signal");
        Some(child)
    }

    /// Register `observer` on `id` and, recursively, on every materialized
    /// descendant. Each registered signal is appended to `touched`.
    fn add_observer_rec(&mut self, id: SignalId, observer: ObserverId, touched: &mut Vec<SignalId>) {
        self.node_mut(id).subscribers.push(observer);
        touched.push(id);

        let children: Vec<SignalId> = self.node(id).children.values().copied().collect();
        for child in children {
            self.add_observer_rec(child, observer, touched);
        }
    }

    /// Remove one occurrence of `observer` from `id` and recurse over the
    /// materialized children.
    fn remove_observer_rec(&mut self, id: SignalId, observer: ObserverId) {
        let subscribers = &mut self.node_mut(id).subscribers;
        if let Some(pos) = subscribers.iter().position(|o| *o == observer) {
            subscribers.remove(pos);
        }

        let children: Vec<SignalId> = self.node(id).children.values().copied().collect();
        for child in children {
            self.remove_observer_rec(child, observer);
        }
    }

    /// Detach every materialized descendant of `id`, clearing subscriber
    /// lists along the way. Returns the collected subscribers so the caller
    /// can give them one final notification against the new shape. Detached
    /// nodes stay in the store but are unreachable from the tree, so stale
    /// ids in observer bookkeeping resolve to empty cells.
    fn detach_children(&mut self, id: SignalId) -> Vec<ObserverId> {
        let children: Vec<SignalId> = self
            .node_mut(id)
            .children
            .drain(..)
            .map(|(_, child)| child)
            .collect();

        let mut collected = Vec::new();
        for child in children {
            let subscribers = std::mem::take(&mut self.node_mut(child).subscribers);
            collected.extend(subscribers);
            collected.extend(self.detach_children(child));
            self.node_mut(child).parent = None;
        }
        collected
    }

    /// Collapse the subscriber multiset to unique entries, preserving
    /// first-occurrence order.
    fn dedup_subscribers(&mut self, id: SignalId) {
        let subscribers = &mut self.node_mut(id).subscribers;
        let mut seen = HashSet::with_capacity(subscribers.len());
        subscribers.retain(|observer| seen.insert(*observer));
    }

    /// The signal's current value with every materialized child overlaid
    /// onto the stored map. Children are authoritative for their keys.
    fn compose(&self, id: SignalId) -> Value {
        let node = self.node(id);
        match &node.value {
            Value::Map(entries) => {
                let mut out = entries.clone();
                for (key, child) in &node.children {
                    out.insert(key.clone(), self.compose(*child));
                }
                Value::Map(out)
            }
            other => other.clone(),
        }
    }

    /// Completeness pass: force a child for every key of an object-shaped
    /// value (not only keys already read), subscribe `observer` to each, and
    /// recurse. Closes the gap between reading a whole object and reading
    /// each of its fields.
    fn observe_all_rec(&mut self, id: SignalId, observer: ObserverId, touched: &mut Vec<SignalId>) {
        let keys: Vec<String> = match self.node(id).value.as_map() {
            Some(entries) => entries.keys().cloned().collect(),
            None => return,
        };

        for key in keys {
            let child = self.ensure_child(id, &key).unwrap_or_else(|| {
                panic!("signal bookkeeping violated: no child signal for key `{key}`")
            });

            let subscribers = &mut self.node_mut(child).subscribers;
            if !subscribers.contains(&observer) {
                subscribers.push(observer);
            }
            touched.push(child);

            self.observe_all_rec(child, observer, touched);
        }
    }
}

// ----------------------------------------------------------------------------
// Store-level operations
// ----------------------------------------------------------------------------

pub(crate) fn create(name: &str, value: Value, parent: Option<SignalId>) -> SignalId {
    store().write().insert(name.to_owned(), value, parent)
}

/// Read a signal's composed value, registering the currently running
/// observer (if any) on the signal and its materialized descendants.
pub(crate) fn read(id: SignalId) -> Value {
    if let Some(observer_id) = context::current() {
        let touched = {
            let mut guard = store().write();
            let mut touched = Vec::new();
            guard.add_observer_rec(id, observer_id, &mut touched);
            trace!(signal = %guard.path(id), observer = ?observer_id, "tracked read");
            touched
        };
        // Store lock released before touching observer state.
        observer::record_observed(observer_id, &touched);
    }

    store().read().compose(id)
}

/// Read without registering any dependency, even inside an observer.
pub(crate) fn read_untracked(id: SignalId) -> Value {
    store().read().compose(id)
}

/// Write a value into a signal cell.
///
/// Leaf writes store the value and notify subscribers unconditionally. A
/// write that replaces an object shape with a leaf also detaches the node's
/// materialized children, folding their observers into the notification.
/// Object-onto-object writes merge key-by-key inside one implicit batch; if
/// either side is `Null` the write is a silent no-op.
pub(crate) fn write(id: SignalId, value: Value) {
    let mut guard = store().write();

    if guard.node(id).value.is_object() && value.is_object() {
        if guard.node(id).value.is_null() || value.is_null() {
            trace!(signal = %guard.path(id), "null merge ignored");
            return;
        }

        let Value::Map(entries) = value else {
            unreachable!("object-shaped non-null value must be a map");
        };

        trace!(signal = %guard.path(id), keys = entries.len(), "merge write");

        let mut forwards = Vec::with_capacity(entries.len());
        for (key, incoming) in entries {
            guard
                .node_mut(id)
                .value
                .as_map_mut()
                .expect("merge target must be a map")
                .insert(key.clone(), incoming.clone());

            let child = guard
                .ensure_child(id, &key)
                .expect("key was just inserted into the stored map");
            forwards.push((child, incoming));
        }
        drop(guard);

        // One flush for the whole merge.
        batch::batch(|| {
            for (child, incoming) in forwards {
                write(child, incoming);
            }
        });
    } else {
        // A non-object write over a node destroys its materialized children;
        // children must always be a subset of the stored map's keys. The
        // detached subtree's observers get one final trigger so they re-read
        // the new shape.
        let orphans = if guard.node(id).value.as_map().is_some() {
            guard.detach_children(id)
        } else {
            Vec::new()
        };

        guard.node_mut(id).value = value;
        let mut subscribers = guard.node(id).subscribers.clone();
        subscribers.extend(orphans);
        trace!(signal = %guard.path(id), subscribers = subscribers.len(), "leaf write");
        drop(guard);

        notify(id, subscribers);
    }
}

/// Trigger or queue every distinct live subscriber of `id`.
fn notify(id: SignalId, subscribers: SmallVec<[ObserverId; 4]>) {
    let mut seen = HashSet::with_capacity(subscribers.len());
    let distinct: Vec<ObserverId> = subscribers
        .into_iter()
        .filter(|observer| seen.insert(*observer))
        .collect();

    if distinct.is_empty() {
        return;
    }

    if batch::is_batching() {
        batch::add_all(distinct);
        return;
    }

    let mut dead = Vec::new();
    for observer_id in distinct {
        if !observer::trigger_by_id(observer_id) {
            dead.push(observer_id);
        }
    }

    // Prune subscriber entries whose observer has been dropped.
    if !dead.is_empty() {
        let mut guard = store().write();
        guard
            .node_mut(id)
            .subscribers
            .retain(|observer| !dead.contains(observer));
    }
}

/// Run the completeness pass for `observer` on `id`, returning every signal
/// it was subscribed to along the way.
pub(crate) fn observe_all(id: SignalId, observer: ObserverId) -> Vec<SignalId> {
    let mut guard = store().write();
    let mut touched = Vec::new();
    guard.observe_all_rec(id, observer, &mut touched);
    touched
}

pub(crate) fn remove_observer(id: SignalId, observer: ObserverId) {
    store().write().remove_observer_rec(id, observer);
}

pub(crate) fn dedup_subscribers(id: SignalId) {
    store().write().dedup_subscribers(id);
}

// ----------------------------------------------------------------------------
// Public handles
// ----------------------------------------------------------------------------

/// A handle to a reactive signal cell.
///
/// Handles are cheap ids into the central store; copying a handle aliases
/// the same cell.
///
/// # Example
///
/// ```rust,ignore
/// let health = Signal::new(10);
///
/// let logger = observe(move || {
///     println!("health is {:?}", health.get());
/// });
///
/// health.set(20); // logger re-runs synchronously
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Signal {
    id: SignalId,
}

impl Signal {
    /// Wrap a value in a new root signal named `"root"`.
    pub fn new(value: impl Into<Value>) -> Self {
        Self::with_name(value, "root")
    }

    /// Wrap a value in a new root signal with a diagnostic name.
    pub fn with_name(value: impl Into<Value>, name: &str) -> Self {
        let id = create(name, value.into(), None);
        Self { id }
    }

    /// The signal's unique ID.
    pub fn id(&self) -> SignalId {
        self.id
    }

    /// Read the current value.
    ///
    /// Inside an observer run this registers the observer as a subscriber
    /// of this signal and of every already-materialized child. Outside a
    /// run it is a plain read with no side effect.
    pub fn get(&self) -> Value {
        read(self.id)
    }

    /// Read the current value without establishing any dependency.
    pub fn get_untracked(&self) -> Value {
        read_untracked(self.id)
    }

    /// Write a new value.
    ///
    /// Writing an object onto an object-valued signal merges key-by-key
    /// under one implicit batch instead of replacing the node; writing when
    /// either side is `Null` is a silent no-op. All other writes store the
    /// value and notify subscribers.
    pub fn set(&self, value: impl Into<Value>) {
        write(self.id, value.into());
    }

    /// A per-property view mirroring the object shape of this signal.
    pub fn prop(&self, key: impl Into<String>) -> Prop {
        Prop {
            root: self.id,
            path: vec![key.into()],
        }
    }

    /// Number of subscriber entries currently recorded on this signal.
    pub fn subscriber_count(&self) -> usize {
        store().read().node(self.id).subscribers.len()
    }
}

/// A key-path view into an object-valued signal.
///
/// Obtained from [`Signal::prop`]; chains with [`Prop::prop`] for nested
/// shapes. Reads materialize child signals along the path only while a
/// tracked computation is active, so untracked access never grows the
/// graph.
#[derive(Debug, Clone)]
pub struct Prop {
    root: SignalId,
    path: Vec<String>,
}

impl Prop {
    /// Extend the path one key deeper.
    pub fn prop(mut self, key: impl Into<String>) -> Prop {
        self.path.push(key.into());
        self
    }

    /// Read the property's value. Absent keys read as [`Value::Null`].
    ///
    /// Under tracking, every signal along the path is materialized but only
    /// the final one is registered as a dependency; reading `p.x` must not
    /// make the observer react to writes of `p.y`. When the path dead-ends
    /// partway, the deepest reachable signal is registered instead, so a
    /// write restoring the missing shape re-runs the observer.
    pub fn get(&self) -> Value {
        if context::is_tracking() {
            let (target, resolved) = {
                let mut guard = store().write();
                let mut cursor = self.root;
                let mut consumed = 0;
                for segment in &self.path {
                    match guard.ensure_child(cursor, segment) {
                        Some(child) => {
                            cursor = child;
                            consumed += 1;
                        }
                        None => break,
                    }
                }
                (cursor, consumed == self.path.len())
            };

            if resolved {
                read(target)
            } else {
                // Partial resolution. Depend on the deepest reachable signal
                // so a write that restores the missing shape re-runs the
                // observer; a key missing on the root registers nothing.
                if target != self.root {
                    read(target);
                }
                Value::Null
            }
        } else {
            let guard = store().read();
            let mut cursor = self.root;
            let mut consumed = 0;
            for segment in &self.path {
                match guard.node(cursor).children.get(segment) {
                    Some(&child) => {
                        cursor = child;
                        consumed += 1;
                    }
                    None => break,
                }
            }

            let mut value = guard.compose(cursor);
            for segment in &self.path[consumed..] {
                match value.get(segment) {
                    Some(nested) => value = nested.clone(),
                    None => return Value::Null,
                }
            }
            value
        }
    }

    /// Write the property's value.
    ///
    /// If the final key has a materialized child signal the write goes
    /// through the child's full `set` semantics (including merge and
    /// notification). Otherwise the stored map is updated in place with no
    /// notification, since nothing ever observed that key. Walking through
    /// a missing or non-object intermediate key is an error.
    pub fn set(&self, value: impl Into<Value>) -> Result<(), ReactiveError> {
        let value = value.into();
        let last = self.path.len() - 1;

        let mut guard = store().write();
        let mut cursor = self.root;
        let mut consumed = 0;
        while consumed < last {
            match guard.node(cursor).children.get(&self.path[consumed]) {
                Some(&child) => {
                    cursor = child;
                    consumed += 1;
                }
                None => break,
            }
        }

        if consumed == last {
            let key = &self.path[last];
            if let Some(&child) = guard.node(cursor).children.get(key) {
                // Keep the stored map in sync, then forward to the child.
                if let Some(entries) = guard.node_mut(cursor).value.as_map_mut() {
                    entries.insert(key.clone(), value.clone());
                }
                drop(guard);
                write(child, value);
                return Ok(());
            }
        }

        // No child signal covers the final key: update the stored value in
        // place, silently.
        let base = guard.path(cursor);
        let dotted = |upto: usize| -> String {
            let mut out = base.clone();
            for segment in &self.path[consumed..upto] {
                out.push('.');
                out.push_str(segment);
            }
            out
        };

        let mut slot = &mut guard.node_mut(cursor).value;
        for (offset, segment) in self.path[consumed..last].iter().enumerate() {
            let here = consumed + offset;
            let entries = slot
                .as_map_mut()
                .ok_or_else(|| ReactiveError::NotAnObject { path: dotted(here) })?;
            slot = entries
                .get_mut(segment)
                .ok_or_else(|| ReactiveError::NoSuchProperty {
                    path: dotted(here + 1),
                })?;
        }

        let entries = slot
            .as_map_mut()
            .ok_or_else(|| ReactiveError::NotAnObject { path: dotted(last) })?;
        entries.insert(self.path[last].clone(), value);
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::context::TrackingGuard;

    #[test]
    fn leaf_get_and_set() {
        let signal = Signal::new(0);
        assert_eq!(signal.get(), Value::Int(0));

        signal.set(42);
        assert_eq!(signal.get(), Value::Int(42));
    }

    #[test]
    fn untracked_reads_do_not_materialize() {
        let signal = Signal::new(Value::map([("x", 0), ("y", 0)]));

        assert_eq!(signal.prop("x").get(), Value::Int(0));
        assert_eq!(signal.prop("missing").get(), Value::Null);

        let children = store().read().node(signal.id()).children.len();
        assert_eq!(children, 0);
    }

    #[test]
    fn tracked_reads_materialize_and_subscribe() {
        let signal = Signal::new(Value::map([("x", 1), ("y", 2)]));
        let observer = ObserverId::new();

        {
            let _guard = TrackingGuard::enter(observer);
            assert_eq!(signal.prop("x").get(), Value::Int(1));
        }

        let guard = store().read();
        let node = guard.node(signal.id());
        // Only the read key materialized, and only the child subscribed.
        assert_eq!(node.children.len(), 1);
        assert!(node.subscribers.is_empty());

        let child = *node.children.get("x").unwrap();
        assert_eq!(guard.node(child).subscribers.as_slice(), &[observer]);
    }

    #[test]
    fn node_read_registers_materialized_descendants() {
        let signal = Signal::new(Value::map([("x", 1)]));
        let first = ObserverId::new();
        {
            let _guard = TrackingGuard::enter(first);
            signal.prop("x").get();
        }

        let second = ObserverId::new();
        {
            let _guard = TrackingGuard::enter(second);
            signal.get();
        }

        let guard = store().read();
        let child = *guard.node(signal.id()).children.get("x").unwrap();
        assert!(guard.node(signal.id()).subscribers.contains(&second));
        assert!(guard.node(child).subscribers.contains(&second));
    }

    #[test]
    fn compose_overlays_children() {
        let signal = Signal::new(Value::map([("x", 0), ("y", 0)]));
        let observer = ObserverId::new();
        {
            let _guard = TrackingGuard::enter(observer);
            signal.prop("x").get();
        }

        signal.prop("x").set(7).unwrap();
        assert_eq!(
            signal.get_untracked(),
            Value::map([("x", 7), ("y", 0)])
        );
    }

    #[test]
    fn merge_copies_every_key() {
        let signal = Signal::new(Value::map([("x", 0), ("y", 0)]));
        signal.set(Value::map([("x", 1), ("y", 2)]));

        assert_eq!(
            signal.get_untracked(),
            Value::map([("x", 1), ("y", 2)])
        );

        // Merge materializes children for every written key.
        let children = store().read().node(signal.id()).children.len();
        assert_eq!(children, 2);
    }

    #[test]
    fn merge_inserts_new_keys() {
        let signal = Signal::new(Value::map([("x", 0)]));
        signal.set(Value::map([("z", 9)]));

        assert_eq!(
            signal.get_untracked(),
            Value::map([("x", 0), ("z", 9)])
        );
    }

    #[test]
    fn null_merge_is_a_silent_noop() {
        let signal = Signal::new(Value::map([("x", 0)]));
        signal.set(Value::Null);
        assert_eq!(signal.get_untracked(), Value::map([("x", 0)]));

        let null_signal = Signal::new(Value::Null);
        null_signal.set(Value::map([("x", 1)]));
        assert_eq!(null_signal.get_untracked(), Value::Null);
    }

    #[test]
    fn dedup_collapses_subscriber_multiset() {
        let signal = Signal::new(5);
        let observer = ObserverId::new();

        {
            let _guard = TrackingGuard::enter(observer);
            signal.get();
            signal.get();
            signal.get();
        }
        assert_eq!(signal.subscriber_count(), 3);

        dedup_subscribers(signal.id());
        assert_eq!(signal.subscriber_count(), 1);
    }

    #[test]
    fn remove_observer_detaches_subtree() {
        let signal = Signal::new(Value::map([("x", 0)]));
        let observer = ObserverId::new();
        {
            let _guard = TrackingGuard::enter(observer);
            signal.prop("x").get();
            signal.get();
        }

        let child = {
            let guard = store().read();
            *guard.node(signal.id()).children.get("x").unwrap()
        };

        // The child was subscribed twice (direct read plus node recursion);
        // clearing an observer removes once per observed signal, and both
        // the child and the node are in the observed set.
        remove_observer(child, observer);
        remove_observer(signal.id(), observer);

        let guard = store().read();
        assert!(guard.node(signal.id()).subscribers.is_empty());
        assert!(guard.node(child).subscribers.is_empty());
    }

    #[test]
    fn observe_all_materializes_every_key() {
        let signal = Signal::new(Value::map([
            ("x", Value::Int(0)),
            ("pos", Value::map([("a", 1), ("b", 2)])),
        ]));
        let observer = ObserverId::new();

        let touched = observe_all(signal.id(), observer);
        // x, pos, pos.a, pos.b
        assert_eq!(touched.len(), 4);

        let guard = store().read();
        let pos = *guard.node(signal.id()).children.get("pos").unwrap();
        assert_eq!(guard.node(pos).children.len(), 2);
        for id in touched {
            assert!(guard.node(id).subscribers.contains(&observer));
        }
    }

    #[test]
    fn prop_set_without_child_is_silent() {
        let signal = Signal::new(Value::map([("x", 0)]));
        signal.prop("x").set(3).unwrap();
        assert_eq!(signal.get_untracked(), Value::map([("x", 3)]));

        // Brand-new final key is inserted, still silently.
        signal.prop("fresh").set(1).unwrap();
        assert_eq!(signal.prop("fresh").get(), Value::Int(1));
    }

    #[test]
    fn prop_set_through_missing_intermediate_fails() {
        let signal = Signal::new(Value::map([("x", 0)]));
        let err = signal.prop("nope").prop("deep").set(1).unwrap_err();
        assert!(matches!(err, ReactiveError::NoSuchProperty { .. }));

        let err = signal.prop("x").prop("deep").set(1).unwrap_err();
        assert!(matches!(err, ReactiveError::NotAnObject { .. }));
    }

    #[test]
    fn type_change_write_detaches_children() {
        let signal = Signal::new(Value::map([("pos", Value::map([("x", 0)]))]));
        let observer = ObserverId::new();
        {
            let _guard = TrackingGuard::enter(observer);
            signal.prop("pos").prop("x").get();
        }

        let (pos, x) = {
            let guard = store().read();
            let pos = *guard.node(signal.id()).children.get("pos").unwrap();
            let x = *guard.node(pos).children.get("x").unwrap();
            (pos, x)
        };

        signal.prop("pos").set(7).unwrap();

        // The collapsed node has no children left and both read paths agree.
        {
            let guard = store().read();
            assert!(guard.node(pos).children.is_empty());
            assert!(guard.node(x).subscribers.is_empty());
        }
        assert_eq!(signal.get_untracked(), Value::map([("pos", 7)]));
        assert_eq!(signal.prop("pos").prop("x").get(), Value::Null);

        // The dead path rejects writes instead of mutating a detached cell.
        let err = signal.prop("pos").prop("x").set(9).unwrap_err();
        assert!(matches!(err, ReactiveError::NotAnObject { .. }));
    }

    #[test]
    fn partial_path_registers_deepest_resolved() {
        let signal = Signal::new(Value::map([("pos", 3)]));
        let observer = ObserverId::new();
        {
            let _guard = TrackingGuard::enter(observer);
            assert_eq!(signal.prop("pos").prop("x").get(), Value::Null);
        }

        let guard = store().read();
        let pos = *guard.node(signal.id()).children.get("pos").unwrap();
        assert!(guard.node(pos).subscribers.contains(&observer));
        drop(guard);

        // A key missing on the root registers nothing.
        let other = ObserverId::new();
        {
            let _guard = TrackingGuard::enter(other);
            assert_eq!(signal.prop("missing").get(), Value::Null);
        }
        assert!(store().read().node(signal.id()).subscribers.is_empty());
    }

    #[test]
    fn nested_prop_paths_resolve() {
        let signal = Signal::new(Value::map([(
            "pos",
            Value::map([("x", 4), ("y", 5)]),
        )]));

        assert_eq!(signal.prop("pos").prop("y").get(), Value::Int(5));

        signal.prop("pos").prop("y").set(9).unwrap();
        assert_eq!(signal.prop("pos").prop("y").get(), Value::Int(9));
    }

    #[test]
    fn signal_ids_are_unique() {
        let a = Signal::new(0);
        let b = Signal::new(0);
        let c = Signal::new(0);

        assert_ne!(a.id(), b.id());
        assert_ne!(b.id(), c.id());
        assert_ne!(a.id(), c.id());
    }
}
