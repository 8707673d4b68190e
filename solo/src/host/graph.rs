//! A minimal object graph used as the reference [`Host`].
//!
//! [`Graph`] stands in for the host runtime: it owns slots of objects, each
//! carrying at most one `T` component and a persistence flag, and it can
//! perform a context transition (the scene-reload analog) that despawns every
//! non-persistent object.
//!
//! # Generation Tracking
//!
//! Handles combine a slot id with a generation. Despawning a slot increments
//! its generation before the slot is recycled, so any handle to the old
//! object fails validation from then on:
//!
//! ```rust,ignore
//! let node = graph.spawn(Widget::default()); // Node { id: 0, generation: 0 }
//! graph.despawn(node);
//! let reused = graph.spawn(Widget::default()); // Node { id: 0, generation: 1 }
//! assert!(!graph.contains(node)); // stale handle detected
//! ```
//!
//! This is what makes the controller's stale-owner policy observable: an
//! owner the graph dropped stops being "alive" without any notification.
//!
//! The graph is strictly single-threaded, matching the one-logical-sequence
//! model the controller assumes, so slot recycling is a plain vector rather
//! than a concurrent queue.

use log::warn;

use crate::host::Host;

/// The generation of a slot, incremented each time the slot is despawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u32);

impl Generation {
    /// The generation of a slot that has never been recycled.
    const FIRST: Self = Self(0);

    /// Get the next generation from the current.
    #[inline]
    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// A slot identifier inside the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Id(u32);

impl Id {
    /// Index of this slot in the graph's backing storage.
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A generation-validated handle to an object in a [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Node {
    id: Id,
    generation: Generation,
}

/// The state of one slot in the graph.
enum State<T> {
    /// A live object. The component is `None` after a detach.
    Occupied { component: Option<T>, persistent: bool },
    /// No object; the slot is free for reuse.
    Vacant,
}

/// One slot of backing storage: the current generation plus its state.
struct Entry<T> {
    generation: Generation,
    state: State<T>,
}

/// A single-threaded object graph with generation-tracked handles.
pub struct Graph<T> {
    /// Slot storage, indexed by [`Id`].
    entries: Vec<Entry<T>>,

    /// Recycled slot ids, already bumped to their next generation.
    dead: Vec<Id>,
}

impl<T> Graph<T> {
    /// Construct an empty graph.
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            dead: Vec::new(),
        }
    }

    /// Spawn an object carrying `component`, reusing a dead slot if one is
    /// available.
    pub fn spawn(&mut self, component: T) -> Node {
        let state = State::Occupied {
            component: Some(component),
            persistent: false,
        };
        match self.dead.pop() {
            Some(id) => {
                let entry = &mut self.entries[id.index()];
                entry.state = state;
                Node {
                    id,
                    generation: entry.generation,
                }
            }
            None => {
                let id = Id(self.entries.len() as u32);
                self.entries.push(Entry {
                    generation: Generation::FIRST,
                    state,
                });
                Node {
                    id,
                    generation: Generation::FIRST,
                }
            }
        }
    }

    /// Remove the object at `node` from the graph, invalidating all handles
    /// to it.
    pub fn despawn(&mut self, node: Node) {
        if !self.contains(node) {
            warn!("despawn of dead handle {node:?}");
            return;
        }
        self.free(node.id);
    }

    /// Remove just the `T` component at `node`, leaving the object alive.
    pub fn detach(&mut self, node: Node) {
        match self.entry_mut(node) {
            Some(Entry {
                state: State::Occupied { component, .. },
                ..
            }) => *component = None,
            _ => warn!("detach on dead handle {node:?}"),
        }
    }

    /// Flag the object at `node` to survive context transitions.
    pub fn persist(&mut self, node: Node) {
        if let Some(Entry {
            state: State::Occupied { persistent, .. },
            ..
        }) = self.entry_mut(node)
        {
            *persistent = true;
        }
    }

    /// Whether `node` refers to a live object (component or not).
    pub fn contains(&self, node: Node) -> bool {
        matches!(
            self.entry(node),
            Some(Entry {
                state: State::Occupied { .. },
                ..
            })
        )
    }

    /// Borrow the component at `node`.
    pub fn get(&self, node: Node) -> Option<&T> {
        match self.entry(node)? {
            Entry {
                state: State::Occupied { component, .. },
                ..
            } => component.as_ref(),
            _ => None,
        }
    }

    /// Mutably borrow the component at `node`.
    pub fn get_mut(&mut self, node: Node) -> Option<&mut T> {
        match self.entry_mut(node)? {
            Entry {
                state: State::Occupied { component, .. },
                ..
            } => component.as_mut(),
            _ => None,
        }
    }

    /// Number of live objects in the graph.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.state, State::Occupied { .. }))
            .count()
    }

    /// Whether the graph holds no live objects.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Perform a context transition: every object not flagged persistent is
    /// despawned, as on a scene reload.
    pub fn next_context(&mut self) {
        for index in 0..self.entries.len() {
            if let State::Occupied {
                persistent: false, ..
            } = self.entries[index].state
            {
                self.free(Id(index as u32));
            }
        }
    }

    /// Free a slot known to be occupied: vacate, bump the generation, and
    /// queue the id for reuse.
    fn free(&mut self, id: Id) {
        let entry = &mut self.entries[id.index()];
        entry.state = State::Vacant;
        entry.generation = entry.generation.next();
        self.dead.push(id);
    }

    fn entry(&self, node: Node) -> Option<&Entry<T>> {
        self.entries
            .get(node.id.index())
            .filter(|entry| entry.generation == node.generation)
    }

    fn entry_mut(&mut self, node: Node) -> Option<&mut Entry<T>> {
        self.entries
            .get_mut(node.id.index())
            .filter(|entry| entry.generation == node.generation)
    }
}

impl<T> Default for Graph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default + 'static> Host<T> for Graph<T> {
    type Handle = Node;

    fn create(&mut self) -> Node {
        self.spawn(T::default())
    }

    fn find_existing(&self) -> Option<Node> {
        self.entries.iter().enumerate().find_map(|(index, entry)| {
            match &entry.state {
                State::Occupied {
                    component: Some(_), ..
                } => Some(Node {
                    id: Id(index as u32),
                    generation: entry.generation,
                }),
                _ => None,
            }
        })
    }

    fn is_alive(&self, handle: Node) -> bool {
        self.get(handle).is_some()
    }

    fn persist(&mut self, handle: Node) {
        Graph::persist(self, handle);
    }

    fn detach(&mut self, handle: Node) {
        Graph::detach(self, handle);
    }

    fn despawn(&mut self, handle: Node) {
        Graph::despawn(self, handle);
    }

    fn get(&self, handle: Node) -> Option<&T> {
        Graph::get(self, handle)
    }

    fn get_mut(&mut self, handle: Node) -> Option<&mut T> {
        Graph::get_mut(self, handle)
    }
}
