//! Arbitration of host lifecycle events for one singleton type.
//!
//! This module provides [`Lifecycle`], the controller that decides which of
//! the host's candidate instances "counts". The host may deliver activation,
//! ready, and teardown events to any number of candidates — leftovers from a
//! previous context, freshly loaded duplicates, re-affirmations of an object
//! it already reported — and the controller makes exactly one of them the
//! owner while every other candidate stays inert.
//!
//! # Arbitration
//!
//! Ownership is decided atomically at activation time, before any user hook
//! runs, so one-time initialization never double-fires and never fires on a
//! soon-to-be-discarded duplicate:
//!
//! 1. **Activation**: the candidate claims the [`Registry`]. A rejected
//!    candidate is a duplicate: its [`Singleton::on_duplicate_detected`] hook
//!    runs and the configured [`DuplicatePolicy`] removes it from the graph.
//!    A successful first claim persists the object and, once per process,
//!    runs [`Singleton::on_first_activation`].
//! 2. **Ready**: counts only for the current owner; the first one runs
//!    [`Singleton::on_first_ready`].
//! 3. **Teardown**: only the owner's teardown matters. It clears ownership,
//!    makes the registry terminal, and runs [`Singleton::on_final_teardown`].
//!    Duplicates tearing down are ignored.
//!
//! Every outcome is an ordinary [`Arbitration`] value; nothing here is an
//! error.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut graph = Graph::new();
//! let mut control = Lifecycle::<Widget, Graph<Widget>>::new();
//!
//! let a = graph.spawn(Widget::default());
//! assert_eq!(control.on_activation(&mut graph, a), Arbitration::Ran);
//!
//! let b = graph.spawn(Widget::default());
//! assert_eq!(control.on_activation(&mut graph, b), Arbitration::Duplicate);
//!
//! assert_eq!(control.instance(&mut graph), Some(a));
//! ```

use std::any::type_name;
use std::marker::PhantomData;

use log::{debug, info};

use crate::host::Host;
use crate::singleton::{
    Singleton,
    registry::{Claim, Registry},
};

/// What to remove from the graph when a candidate is rejected as a duplicate.
///
/// Hosts that colocate several singleton types on one object want the
/// default [`DestroyComponent`](Self::DestroyComponent); hosts that dedicate
/// an object per singleton can reclaim the whole object with
/// [`DestroyObject`](Self::DestroyObject).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Detach only the singleton component, leaving the object in the graph.
    #[default]
    DestroyComponent,
    /// Despawn the duplicate's whole object.
    DestroyObject,
}

/// Outcome of arbitrating one host event for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arbitration {
    /// The event was the phase's first for this type; the user hook ran.
    Ran,
    /// The candidate is the owner but this phase already ran earlier.
    AlreadyRan,
    /// The candidate was rejected as a duplicate and removed per policy.
    Duplicate,
    /// The event did not apply to this candidate (non-owner ready, duplicate
    /// or stale teardown).
    Ignored,
}

/// Lifecycle controller for singleton type `T` inside host `H`.
///
/// One controller value exists per singleton type; it owns that type's
/// [`Registry`] and is the only thing that mutates it. The host (or the glue
/// code integrating with it) forwards each candidate's lifecycle events here.
pub struct Lifecycle<T, H>
where
    T: Singleton,
    H: Host<T>,
{
    /// Ownership and phase state for `T`.
    registry: Registry<H::Handle>,

    /// How rejected duplicates are removed.
    policy: DuplicatePolicy,

    _marker: PhantomData<fn() -> T>,
}

impl<T, H> Lifecycle<T, H>
where
    T: Singleton,
    H: Host<T>,
{
    /// Construct a controller with the default duplicate policy.
    pub fn new() -> Self {
        Self::with_policy(DuplicatePolicy::default())
    }

    /// Construct a controller with an explicit duplicate policy.
    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            registry: Registry::new(),
            policy,
            _marker: PhantomData,
        }
    }

    /// Arbitrate a host activation event for `candidate`.
    ///
    /// Decides ownership. Duplicates are notified and removed; the first
    /// claim in the process runs [`Singleton::on_first_activation`].
    pub fn on_activation(&mut self, host: &mut H, candidate: H::Handle) -> Arbitration {
        self.vacate_stale(host);
        let fresh = self.registry.owner().is_none() && !self.registry.is_destroyed();
        match self.registry.try_claim(candidate) {
            Claim::Rejected => {
                info!(
                    "rejecting duplicate {} candidate {candidate:?} (owner: {:?})",
                    type_name::<T>(),
                    self.registry.owner(),
                );
                if let Some(component) = host.get_mut(candidate) {
                    component.on_duplicate_detected();
                }
                match self.policy {
                    DuplicatePolicy::DestroyComponent => host.detach(candidate),
                    DuplicatePolicy::DestroyObject => host.despawn(candidate),
                }
                Arbitration::Duplicate
            }
            Claim::Claimed => {
                if fresh {
                    host.persist(candidate);
                }
                if self.registry.mark_awakened() {
                    debug!("first activation of {} via {candidate:?}", type_name::<T>());
                    if let Some(component) = host.get_mut(candidate) {
                        component.on_first_activation();
                    }
                    Arbitration::Ran
                } else {
                    Arbitration::AlreadyRan
                }
            }
        }
    }

    /// Arbitrate a host ready event for `candidate`.
    ///
    /// Only the current owner's ready counts; the first one runs
    /// [`Singleton::on_first_ready`].
    pub fn on_ready(&mut self, host: &mut H, candidate: H::Handle) -> Arbitration {
        if self.registry.owner() != Some(candidate) {
            return Arbitration::Ignored;
        }
        if self.registry.mark_started() {
            debug!("first ready of {} via {candidate:?}", type_name::<T>());
            if let Some(component) = host.get_mut(candidate) {
                component.on_first_ready();
            }
            Arbitration::Ran
        } else {
            Arbitration::AlreadyRan
        }
    }

    /// Arbitrate a host teardown event for `candidate`.
    ///
    /// On the owner this is terminal: the registry never produces another
    /// owner, and [`Singleton::on_final_teardown`] runs while the component
    /// is still retrievable. Teardown of anything else is ignored.
    pub fn on_teardown(&mut self, host: &mut H, candidate: H::Handle) -> Arbitration {
        if self.registry.mark_destroyed_if(candidate) {
            info!("final teardown of {} via {candidate:?}", type_name::<T>());
            if let Some(component) = host.get_mut(candidate) {
                component.on_final_teardown();
            }
            Arbitration::Ran
        } else {
            Arbitration::Ignored
        }
    }

    /// The global access point: the current owner, lazily created.
    ///
    /// Returns the live owner if there is one. Otherwise finds an existing
    /// instance in the graph — or asks the host to create a fresh one — and
    /// claims it. No phase hook fires here; [`Singleton::on_first_activation`]
    /// runs when the host delivers that object's activation event. Once the
    /// type is terminal this returns `None` forever; no instance is
    /// resurrected after teardown.
    pub fn instance(&mut self, host: &mut H) -> Option<H::Handle> {
        if self.registry.is_destroyed() {
            return None;
        }
        self.vacate_stale(host);
        if let Some(owner) = self.registry.owner() {
            return Some(owner);
        }
        let handle = host.find_existing().unwrap_or_else(|| {
            debug!("creating {} on demand", type_name::<T>());
            host.create()
        });
        let claim = self.registry.try_claim(handle);
        debug_assert!(claim == Claim::Claimed);
        host.persist(handle);
        Some(handle)
    }

    /// Whether the first-activation phase has run for `T`.
    #[inline]
    pub fn is_awakened(&self) -> bool {
        self.registry.is_awakened()
    }

    /// Whether the first-ready phase has run for `T`.
    #[inline]
    pub fn is_started(&self) -> bool {
        self.registry.is_started()
    }

    /// Whether the final-teardown phase has run for `T` (terminal).
    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.registry.is_destroyed()
    }

    /// The duplicate policy this controller applies.
    #[inline]
    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Read-only view of the underlying registry.
    #[inline]
    pub fn registry(&self) -> &Registry<H::Handle> {
        &self.registry
    }

    /// Drop an owner the host no longer reports alive, so the next candidate
    /// claims ownership anew. Phase flags are process-monotonic and stay set.
    fn vacate_stale(&mut self, host: &H) {
        if let Some(owner) = self.registry.owner() {
            if !host.is_alive(owner) {
                debug!("evicting stale {} owner {owner:?}", type_name::<T>());
                self.registry.vacate();
            }
        }
    }
}

impl<T, H> Default for Lifecycle<T, H>
where
    T: Singleton,
    H: Host<T>,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::host::Graph;

    /// Hook invocation counters, shared with the host-owned component so the
    /// tallies survive the component's removal.
    #[derive(Debug, Default, Clone)]
    struct Tally {
        activated: Rc<Cell<u32>>,
        readied: Rc<Cell<u32>>,
        torn_down: Rc<Cell<u32>>,
        duplicates: Rc<Cell<u32>>,
    }

    #[derive(Debug, Default)]
    struct Widget {
        tally: Tally,
    }

    impl Widget {
        fn counted(tally: &Tally) -> Self {
            Self {
                tally: tally.clone(),
            }
        }
    }

    impl Singleton for Widget {
        fn on_first_activation(&mut self) {
            self.tally.activated.set(self.tally.activated.get() + 1);
        }

        fn on_first_ready(&mut self) {
            self.tally.readied.set(self.tally.readied.get() + 1);
        }

        fn on_final_teardown(&mut self) {
            self.tally.torn_down.set(self.tally.torn_down.get() + 1);
        }

        fn on_duplicate_detected(&mut self) {
            self.tally.duplicates.set(self.tally.duplicates.get() + 1);
        }
    }

    fn setup() -> (Graph<Widget>, Lifecycle<Widget, Graph<Widget>>, Tally) {
        (Graph::new(), Lifecycle::new(), Tally::default())
    }

    // ==================== Ownership ====================

    #[test]
    fn first_candidate_becomes_owner_and_awakens() {
        let (mut graph, mut control, tally) = setup();

        let a = graph.spawn(Widget::counted(&tally));
        let outcome = control.on_activation(&mut graph, a);

        assert_eq!(outcome, Arbitration::Ran);
        assert!(control.is_awakened());
        assert_eq!(tally.activated.get(), 1);
        assert_eq!(control.instance(&mut graph), Some(a));
    }

    #[test]
    fn one_owner_among_many_candidates() {
        let (mut graph, mut control, tally) = setup();

        let candidates: Vec<_> = (0..5).map(|_| graph.spawn(Widget::counted(&tally))).collect();
        let outcomes: Vec<_> = candidates
            .iter()
            .map(|&node| control.on_activation(&mut graph, node))
            .collect();

        assert_eq!(outcomes[0], Arbitration::Ran);
        assert!(outcomes[1..].iter().all(|&o| o == Arbitration::Duplicate));
        assert_eq!(tally.activated.get(), 1);
        assert_eq!(tally.duplicates.get(), 4);
        assert_eq!(control.instance(&mut graph), Some(candidates[0]));
    }

    #[test]
    fn reaffirmation_does_not_refire_activation() {
        let (mut graph, mut control, tally) = setup();
        let a = graph.spawn(Widget::counted(&tally));
        control.on_activation(&mut graph, a);

        let outcome = control.on_activation(&mut graph, a);

        assert_eq!(outcome, Arbitration::AlreadyRan);
        assert_eq!(tally.activated.get(), 1);
        assert_eq!(tally.duplicates.get(), 0);
    }

    #[test]
    fn claimed_owner_is_persisted_across_contexts() {
        let (mut graph, mut control, tally) = setup();
        let a = graph.spawn(Widget::counted(&tally));
        control.on_activation(&mut graph, a);

        graph.next_context();

        assert!(graph.contains(a));
        assert_eq!(control.instance(&mut graph), Some(a));
    }

    // ==================== Duplicate Removal ====================

    #[test]
    fn duplicate_component_is_detached_by_default() {
        let (mut graph, mut control, tally) = setup();
        let a = graph.spawn(Widget::counted(&tally));
        control.on_activation(&mut graph, a);

        let b = graph.spawn(Widget::counted(&tally));
        control.on_activation(&mut graph, b);

        assert!(graph.contains(b)); // object survives
        assert!(graph.get(b).is_none()); // component removed
        assert_eq!(tally.duplicates.get(), 1);
    }

    #[test]
    fn destroy_object_policy_despawns_the_duplicate() {
        let mut graph = Graph::new();
        let mut control: Lifecycle<Widget, Graph<Widget>> =
            Lifecycle::with_policy(DuplicatePolicy::DestroyObject);
        let tally = Tally::default();

        let a = graph.spawn(Widget::counted(&tally));
        control.on_activation(&mut graph, a);
        let b = graph.spawn(Widget::counted(&tally));
        control.on_activation(&mut graph, b);

        assert!(!graph.contains(b));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn duplicate_never_receives_ready_processing() {
        let (mut graph, mut control, tally) = setup();
        let a = graph.spawn(Widget::counted(&tally));
        let b = graph.spawn(Widget::counted(&tally));
        control.on_activation(&mut graph, a);
        control.on_activation(&mut graph, b);

        // Even a stray ready event for the duplicate handle is inert.
        assert_eq!(control.on_ready(&mut graph, b), Arbitration::Ignored);
        assert!(!control.is_started());
        assert_eq!(tally.readied.get(), 0);
    }

    // ==================== Ready Phase ====================

    #[test]
    fn owner_ready_fires_once() {
        let (mut graph, mut control, tally) = setup();
        let a = graph.spawn(Widget::counted(&tally));
        control.on_activation(&mut graph, a);

        assert_eq!(control.on_ready(&mut graph, a), Arbitration::Ran);
        assert_eq!(control.on_ready(&mut graph, a), Arbitration::AlreadyRan);
        assert!(control.is_started());
        assert_eq!(tally.readied.get(), 1);
    }

    // ==================== Teardown ====================

    #[test]
    fn owner_teardown_is_terminal() {
        let (mut graph, mut control, tally) = setup();
        let a = graph.spawn(Widget::counted(&tally));
        control.on_activation(&mut graph, a);
        control.on_ready(&mut graph, a);

        assert_eq!(control.on_teardown(&mut graph, a), Arbitration::Ran);
        graph.despawn(a);

        assert!(control.is_destroyed());
        assert_eq!(tally.torn_down.get(), 1);
        assert_eq!(control.instance(&mut graph), None);
        // Lookup never resurrects, even though the graph could create one.
        assert_eq!(control.instance(&mut graph), None);
        assert!(graph.is_empty());
    }

    #[test]
    fn duplicate_teardown_never_fires_final_hook() {
        let (mut graph, mut control, tally) = setup();
        let a = graph.spawn(Widget::counted(&tally));
        let b = graph.spawn(Widget::counted(&tally));
        control.on_activation(&mut graph, a);
        control.on_activation(&mut graph, b);

        assert_eq!(control.on_teardown(&mut graph, b), Arbitration::Ignored);

        assert!(!control.is_destroyed());
        assert_eq!(tally.torn_down.get(), 0);
        assert_eq!(control.instance(&mut graph), Some(a));
    }

    #[test]
    fn activation_after_teardown_is_rejected() {
        let (mut graph, mut control, tally) = setup();
        let a = graph.spawn(Widget::counted(&tally));
        control.on_activation(&mut graph, a);
        control.on_teardown(&mut graph, a);
        graph.despawn(a);

        let late = graph.spawn(Widget::counted(&tally));
        let outcome = control.on_activation(&mut graph, late);

        assert_eq!(outcome, Arbitration::Duplicate);
        assert!(graph.get(late).is_none()); // removed like any duplicate
        assert_eq!(tally.activated.get(), 1);
    }

    // ==================== Full Scenario ====================

    #[test]
    fn full_life_owner_duplicate_teardown() {
        let (mut graph, mut control, tally) = setup();

        // A activates and owns the type.
        let a = graph.spawn(Widget::counted(&tally));
        assert_eq!(control.on_activation(&mut graph, a), Arbitration::Ran);
        assert_eq!(tally.activated.get(), 1);

        // B is a duplicate; ownership stays with A.
        let b = graph.spawn(Widget::counted(&tally));
        assert_eq!(control.on_activation(&mut graph, b), Arbitration::Duplicate);
        assert_eq!(tally.duplicates.get(), 1);
        assert_eq!(control.instance(&mut graph), Some(a));

        // A becomes ready.
        assert_eq!(control.on_ready(&mut graph, a), Arbitration::Ran);
        assert_eq!(tally.readied.get(), 1);

        // B's teardown is a no-op; A's is terminal.
        assert_eq!(control.on_teardown(&mut graph, b), Arbitration::Ignored);
        assert_eq!(control.on_teardown(&mut graph, a), Arbitration::Ran);
        graph.despawn(a);
        assert_eq!(tally.torn_down.get(), 1);

        assert_eq!(control.instance(&mut graph), None);
    }

    // ==================== Stale Owners ====================

    #[test]
    fn lost_owner_lets_next_candidate_claim_anew() {
        let (mut graph, mut control, tally) = setup();
        let a = graph.spawn(Widget::counted(&tally));
        control.on_activation(&mut graph, a);

        // The host loses the object despite the persist flag.
        graph.despawn(a);

        let b = graph.spawn(Widget::counted(&tally));
        let outcome = control.on_activation(&mut graph, b);

        // B owns the type now, but the one-time phase does not re-fire.
        assert_eq!(outcome, Arbitration::AlreadyRan);
        assert_eq!(tally.activated.get(), 1);
        assert_eq!(control.instance(&mut graph), Some(b));
    }

    #[test]
    fn instance_ignores_stale_owner() {
        let (mut graph, mut control, tally) = setup();
        let a = graph.spawn(Widget::counted(&tally));
        control.on_activation(&mut graph, a);
        graph.despawn(a);

        let b = graph.spawn(Widget::counted(&tally));
        assert_eq!(control.instance(&mut graph), Some(b));
    }

    // ==================== Lookup or Create ====================

    #[test]
    fn instance_creates_on_demand() {
        let (mut graph, mut control, _tally) = setup();

        let handle = control.instance(&mut graph).unwrap();

        assert_eq!(graph.len(), 1);
        assert!(graph.get(handle).is_some());
        // The fresh object is already persisted and owned...
        graph.next_context();
        assert_eq!(control.instance(&mut graph), Some(handle));
        // ...but no phase hook has run before its activation event arrives.
        assert!(!control.is_awakened());
    }

    #[test]
    fn instance_prefers_existing_candidate() {
        let (mut graph, mut control, tally) = setup();
        let existing = graph.spawn(Widget::counted(&tally));

        assert_eq!(control.instance(&mut graph), Some(existing));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn activation_after_lookup_fires_hook_on_same_owner() {
        let (mut graph, mut control, tally) = setup();

        let handle = control.instance(&mut graph).unwrap();
        // Attach the counters the default-constructed widget lacks.
        graph.get_mut(handle).unwrap().tally = tally.clone();

        // The host later delivers the activation event for the same object.
        assert_eq!(control.on_activation(&mut graph, handle), Arbitration::Ran);
        assert_eq!(tally.activated.get(), 1);
        assert_eq!(control.instance(&mut graph), Some(handle));
    }
}
