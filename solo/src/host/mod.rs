//! Capabilities the lifecycle controller consumes from the host runtime.
//!
//! The controller never talks to a concrete engine; everything it needs from
//! the surrounding object graph goes through the [`Host`] trait. That keeps
//! the arbitration logic a pure state machine that is testable with a mock
//! host, while a real integration implements `Host` over its own scene or
//! component system. [`Graph`] is the in-tree reference implementation.

mod graph;

pub use graph::{Graph, Node};

use std::fmt::Debug;

/// Host-runtime capabilities for objects carrying a `T` component.
///
/// # Contract
///
/// The host delivers lifecycle events for a given candidate in order —
/// activation, then ready, then (at most once) teardown — from a single
/// logical update sequence; no two events are ever in flight concurrently.
/// During a teardown event the component must still be retrievable through
/// [`get_mut`](Host::get_mut).
pub trait Host<T> {
    /// Handle to an object in the host's graph. Cheap to copy and compare;
    /// comparing equal means "the same object".
    type Handle: Copy + Eq + Debug;

    /// Create a fresh object in the graph with a default `T` attached.
    ///
    /// Used only by lookup-or-create when no owner exists yet.
    fn create(&mut self) -> Self::Handle;

    /// Find any existing object carrying a `T`, if the graph has one.
    fn find_existing(&self) -> Option<Self::Handle>;

    /// Whether `handle` still refers to a live object carrying its `T`.
    ///
    /// This is the host's word on liveness; the controller uses it to detect
    /// owners the host silently lost (e.g. a persistence primitive that did
    /// not actually preserve the object across a context transition).
    fn is_alive(&self, handle: Self::Handle) -> bool;

    /// Mark the object as surviving context transitions.
    ///
    /// Invoked once per owner, when it is first claimed.
    fn persist(&mut self, handle: Self::Handle);

    /// Remove the `T` component from the object, leaving the object itself
    /// in the graph.
    fn detach(&mut self, handle: Self::Handle);

    /// Remove the whole object from the graph.
    fn despawn(&mut self, handle: Self::Handle);

    /// Borrow the `T` on `handle`, if it is alive.
    fn get(&self, handle: Self::Handle) -> Option<&T>;

    /// Mutably borrow the `T` on `handle`, if it is alive.
    fn get_mut(&mut self, handle: Self::Handle) -> Option<&mut T>;
}
