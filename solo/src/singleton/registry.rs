//! Ownership and phase bookkeeping for one singleton type.
//!
//! This module provides [`Registry`], the table cell behind a single
//! [`Lifecycle`](crate::singleton::Lifecycle) controller. Each concrete
//! singleton type gets its own monomorphized registry value rather than a row
//! in a runtime type-keyed map, so there is no reflection and no type-tag
//! lookup on the hot path.
//!
//! # State Machine
//!
//! A registry tracks an optional owner handle plus three phase flags, each of
//! which transitions `false → true` exactly once and never reverts:
//!
//! - `awakened`: set no earlier than the first ownership claim
//! - `started`: set no earlier than `awakened`
//! - `destroyed`: terminal; the owner slot is cleared and can never be
//!   re-claimed
//!
//! All operations are total functions over this state machine. Nothing here
//! performs I/O and nothing returns an error; arbitration outcomes are plain
//! values.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut registry: Registry<u32> = Registry::new();
//!
//! assert_eq!(registry.try_claim(7), Claim::Claimed);
//! assert_eq!(registry.try_claim(9), Claim::Rejected); // 7 owns the type
//!
//! assert!(registry.mark_awakened());  // first time
//! assert!(!registry.mark_awakened()); // already ran
//!
//! assert!(registry.mark_destroyed_if(7)); // owner teardown, now terminal
//! assert_eq!(registry.try_claim(9), Claim::Rejected); // forever
//! ```

use std::fmt::Debug;

/// Outcome of an ownership claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// The candidate is now the owner, or already was (re-affirmation).
    Claimed,
    /// A different live owner exists, or the registry is terminal. The caller
    /// must treat the candidate as a duplicate.
    Rejected,
}

/// Ownership table and phase flags for one singleton type.
///
/// `H` is the host's handle type for objects in its graph. The registry never
/// dereferences handles; liveness is the controller's concern.
#[derive(Debug, Clone)]
pub struct Registry<H> {
    /// The live owner, if one has been claimed and not destroyed or vacated.
    owner: Option<H>,

    /// The first-activation phase has run.
    awakened: bool,

    /// The first-ready phase has run.
    started: bool,

    /// The final-teardown phase has run. Terminal.
    destroyed: bool,
}

impl<H: Copy + Eq + Debug> Registry<H> {
    /// Construct an empty registry: no owner, no phase has run.
    #[inline]
    pub const fn new() -> Self {
        Self {
            owner: None,
            awakened: false,
            started: false,
            destroyed: false,
        }
    }

    /// The current owner, if one is live and the registry is not terminal.
    #[inline]
    pub fn owner(&self) -> Option<H> {
        if self.destroyed { None } else { self.owner }
    }

    /// Attempt to install `candidate` as the owner.
    ///
    /// Claims succeed when the owner slot is vacant and the registry is not
    /// terminal, and idempotently when `candidate` already is the owner (a
    /// re-affirmation, not a fresh claim). Any other case is [`Claim::Rejected`]
    /// and the candidate must be treated as a duplicate.
    pub fn try_claim(&mut self, candidate: H) -> Claim {
        if self.destroyed {
            return Claim::Rejected;
        }
        match self.owner {
            None => {
                self.owner = Some(candidate);
                Claim::Claimed
            }
            Some(owner) if owner == candidate => Claim::Claimed,
            Some(_) => Claim::Rejected,
        }
    }

    /// Flip the `awakened` flag, returning `true` only on the first call.
    ///
    /// Callers must only invoke this after a successful claim; the owner slot
    /// is expected to be occupied.
    pub fn mark_awakened(&mut self) -> bool {
        debug_assert!(
            self.owner.is_some(),
            "mark_awakened without a claimed owner"
        );
        if self.awakened {
            return false;
        }
        self.awakened = true;
        true
    }

    /// Flip the `started` flag, returning `true` only on the first call.
    ///
    /// Gated on `awakened`: a ready event arriving before any activation event
    /// is a host contract violation, so this is a no-op (and asserts in debug
    /// builds) rather than a runtime error.
    pub fn mark_started(&mut self) -> bool {
        debug_assert!(self.awakened, "mark_started before mark_awakened");
        if !self.awakened || self.started {
            return false;
        }
        self.started = true;
        true
    }

    /// Tear down the registry if `instance` is the current owner.
    ///
    /// On the owner: clears the owner slot, sets the terminal flag, returns
    /// `true`. On anything else (a stale duplicate being torn down): returns
    /// `false` and the registry is untouched.
    pub fn mark_destroyed_if(&mut self, instance: H) -> bool {
        if self.destroyed || self.owner != Some(instance) {
            return false;
        }
        self.owner = None;
        self.destroyed = true;
        true
    }

    /// Evict an owner the host no longer knows about.
    ///
    /// Clears the owner slot without touching the phase flags, so the next
    /// candidate claims ownership anew but the one-time phases do not re-run.
    /// No-op once terminal.
    pub fn vacate(&mut self) {
        if !self.destroyed {
            self.owner = None;
        }
    }

    /// Whether the first-activation phase has run.
    #[inline]
    pub fn is_awakened(&self) -> bool {
        self.awakened
    }

    /// Whether the first-ready phase has run.
    #[inline]
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Whether the final-teardown phase has run (terminal).
    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl<H: Copy + Eq + Debug> Default for Registry<H> {
    fn default() -> Self {
        Self::new()
    }
}
