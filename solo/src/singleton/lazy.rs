//! Load-once singletons for resource-backed values.
//!
//! Not every singleton lives in the host's object graph. Configuration
//! bundles, asset manifests, and similar values are loaded from some source
//! exactly once and then shared. [`Lazy`] covers that case: no candidates,
//! no duplicates, no phase machine — just one load and one
//! [`Initialize::on_initialize`] call.

use std::any::type_name;

use log::debug;

/// Hook for values managed by [`Lazy`].
pub trait Initialize {
    /// Runs once, right after the value is first loaded.
    fn on_initialize(&mut self) {}
}

/// A slot holding at most one loaded value.
///
/// The value is produced by a caller-supplied source on first access. A
/// source returning `None` (the resource is missing) leaves the slot empty;
/// a later access retries with whatever source it is given.
pub struct Lazy<T> {
    value: Option<T>,
}

impl<T: Initialize + 'static> Lazy<T> {
    /// Construct an empty slot.
    #[inline]
    pub const fn new() -> Self {
        Self { value: None }
    }

    /// The loaded value, or `None` if nothing has been loaded yet. Never
    /// triggers a load.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Whether a value has been loaded.
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.value.is_some()
    }

    /// The loaded value, loading it through `source` if the slot is empty.
    ///
    /// On a successful first load the value's [`Initialize::on_initialize`]
    /// hook runs before anything can observe it. `source` is not called once
    /// a value is held.
    pub fn get_or_load<F>(&mut self, source: F) -> Option<&T>
    where
        F: FnOnce() -> Option<T>,
    {
        self.get_or_load_mut(source).map(|value| &*value)
    }

    /// Mutable variant of [`get_or_load`](Self::get_or_load).
    pub fn get_or_load_mut<F>(&mut self, source: F) -> Option<&mut T>
    where
        F: FnOnce() -> Option<T>,
    {
        if self.value.is_none() {
            if let Some(mut loaded) = source() {
                debug!("loaded singleton {}", type_name::<T>());
                loaded.on_initialize();
                self.value = Some(loaded);
            }
        }
        self.value.as_mut()
    }
}

impl<T: Initialize + 'static> Default for Lazy<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Manifest {
        entries: u32,
        initialized: bool,
    }

    impl Manifest {
        fn with_entries(entries: u32) -> Self {
            Self {
                entries,
                initialized: false,
            }
        }
    }

    impl Initialize for Manifest {
        fn on_initialize(&mut self) {
            self.initialized = true;
        }
    }

    #[test]
    fn starts_empty() {
        let slot: Lazy<Manifest> = Lazy::new();

        assert!(!slot.is_loaded());
        assert!(slot.get().is_none());
    }

    #[test]
    fn loads_and_initializes_on_first_access() {
        let mut slot = Lazy::new();

        let manifest = slot.get_or_load(|| Some(Manifest::with_entries(3))).unwrap();

        assert_eq!(manifest.entries, 3);
        assert!(manifest.initialized);
        assert!(slot.is_loaded());
    }

    #[test]
    fn source_is_not_called_again_once_loaded() {
        let mut slot = Lazy::new();
        slot.get_or_load(|| Some(Manifest::with_entries(1)));

        let again = slot
            .get_or_load(|| panic!("source called for a loaded slot"))
            .unwrap();

        assert_eq!(again.entries, 1);
    }

    #[test]
    fn failed_load_leaves_slot_empty_and_retries() {
        let mut slot = Lazy::new();

        assert!(slot.get_or_load(|| None).is_none());
        assert!(!slot.is_loaded());

        // A later access with a working source succeeds.
        assert!(slot.get_or_load(|| Some(Manifest::with_entries(2))).is_some());
    }

    #[test]
    fn get_or_load_mut_allows_mutation() {
        let mut slot = Lazy::new();
        slot.get_or_load(|| Some(Manifest::with_entries(1)));

        slot.get_or_load_mut(|| None).unwrap().entries += 10;

        assert_eq!(slot.get().unwrap().entries, 11);
    }
}
