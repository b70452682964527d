//! Field type registry: explicit registration from a handle to a
//! constructor, replacing convention-based dynamic class loading.

use rustc_hash::FxHashMap;

use super::FieldType;

/// Constructor for a registered field type.
pub type Constructor = fn() -> Box<dyn FieldType>;

/// Maps field type handles to constructors.
#[derive(Default)]
pub struct FieldRegistry {
    constructors: FxHashMap<String, Constructor>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor for `handle`. The first registration wins;
    /// returns false when the handle was already taken.
    pub fn register(&mut self, handle: &str, ctor: Constructor) -> bool {
        if self.constructors.contains_key(handle) {
            return false;
        }
        self.constructors.insert(handle.to_string(), ctor);
        true
    }

    pub fn contains(&self, handle: &str) -> bool {
        self.constructors.contains_key(handle)
    }

    /// Construct a brand-new instance of the registered type.
    pub fn instantiate(&self, handle: &str) -> Option<Box<dyn FieldType>> {
        self.constructors.get(handle).map(|ctor| ctor())
    }

    /// Registered handles, sorted.
    pub fn handles(&self) -> Vec<String> {
        let mut handles: Vec<String> = self.constructors.keys().cloned().collect();
        handles.sort();
        handles
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}
