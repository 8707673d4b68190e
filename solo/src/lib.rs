//! Single-instance lifecycle control for host-managed object graphs.
//!
//! A host runtime (game engine, scene system, plugin container) often spawns
//! components on its own schedule: once per object it discovers, again after a
//! context reload, sometimes redundantly. `solo` guarantees that for a given
//! component type at most one instance "counts" — every other candidate is
//! detected as a duplicate and removed — and that the three one-time phase
//! hooks (first activation, first ready, final teardown) each run exactly once
//! per process no matter how many candidates the host ever delivers.
//!
//! # Architecture
//!
//! - [`singleton::Registry`]: per-type ownership table plus three monotonic
//!   phase flags. Pure state machine, no I/O.
//! - [`singleton::Lifecycle`]: arbitrates the host's activation / ready /
//!   teardown events against the registry and runs the [`Singleton`] hooks at
//!   the gated transitions.
//! - [`host::Host`]: the capability seam to the surrounding runtime (spawn,
//!   discover, liveness, persistence, removal).
//! - [`host::Graph`]: a small reference host with generation-tracked handles
//!   and context transitions, used by the tests and the demo.
//! - [`singleton::Lazy`]: a load-once companion for resource-backed singletons
//!   with no phase machine.
//!
//! # Example
//!
//! ```rust,ignore
//! use solo::{Graph, Lifecycle, Singleton};
//!
//! #[derive(Default)]
//! struct Audio;
//!
//! impl Singleton for Audio {
//!     fn on_first_activation(&mut self) {
//!         println!("audio up");
//!     }
//! }
//!
//! let mut graph = Graph::new();
//! let mut audio = Lifecycle::<Audio, Graph<Audio>>::new();
//!
//! let handle = graph.spawn(Audio);
//! audio.on_activation(&mut graph, handle); // owner claimed, hook runs
//!
//! let extra = graph.spawn(Audio);
//! audio.on_activation(&mut graph, extra); // duplicate, removed
//! ```

pub mod host;
pub mod singleton;

pub use host::{Graph, Host, Node};
pub use singleton::{
    Arbitration, Claim, DuplicatePolicy, Initialize, Lazy, Lifecycle, Registry, Singleton,
};
