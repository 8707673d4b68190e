//! Singleton types and the machinery that keeps them single.
//!
//! This module provides the [`Singleton`] trait for component types that must
//! exist at most once per process, together with the [`Registry`] that records
//! ownership and phase state and the [`Lifecycle`] controller that arbitrates
//! host events. [`Lazy`] covers the simpler load-once case.
//!
//! # Lifecycle vs Lazy
//!
//! | Aspect | Lifecycle | Lazy |
//! |--------|-----------|------|
//! | Lives in | Host object graph | Plain value slot |
//! | Duplicates | Detected and removed | Not possible |
//! | Phases | Activation / ready / teardown | Single load |
//! | Terminal state | Yes (post-teardown) | No (failed load retries) |

mod lazy;
mod lifecycle;
mod registry;

pub use lazy::{Initialize, Lazy};
pub use lifecycle::{Arbitration, DuplicatePolicy, Lifecycle};
pub use registry::{Claim, Registry};

/// A component type with at most one live instance per process.
///
/// Implement this for the component the host runtime attaches to objects in
/// its graph. All four hooks have empty defaults; override the ones the type
/// needs. The [`Lifecycle`] controller guarantees the three phase hooks each
/// run at most once per process, no matter how many candidate instances the
/// host creates.
///
/// Do not run one-time initialization anywhere else — hooks are the only
/// call sites the controller gates.
pub trait Singleton: 'static {
    /// Runs once, on the first candidate to claim ownership, at its
    /// activation event. Never runs again, not even if ownership is later
    /// re-claimed by a fresh candidate.
    fn on_first_activation(&mut self) {}

    /// Runs once, at the owner's ready event, after `on_first_activation`.
    fn on_first_ready(&mut self) {}

    /// Runs once, at the owner's teardown event. The type is terminal
    /// afterwards: no new owner is ever claimed.
    fn on_final_teardown(&mut self) {}

    /// Notification that this instance was rejected as a duplicate. Runs on
    /// the duplicate itself, before the configured [`DuplicatePolicy`]
    /// removes it from the graph.
    fn on_duplicate_detected(&mut self) {}
}
