//! Name resolver: a hand-maintained lookup from lower-cased type names
//! (including legacy `field{type}` class-style aliases) to registration
//! hooks. Consulted lazily when a handle is not yet in the registry.
//! Unmapped names are a silent no-op; failure surfaces at point of use.

use rustc_hash::FxHashMap;

use super::builtin;
use super::registry::FieldRegistry;

/// A registration hook invoked at most once per resolved name.
pub type RegisterHook = fn(&mut FieldRegistry);

struct Mapping {
    canonical: String,
    hook: RegisterHook,
}

pub struct Resolver {
    table: FxHashMap<String, Mapping>,
}

impl Resolver {
    pub fn empty() -> Self {
        Self {
            table: FxHashMap::default(),
        }
    }

    /// The static table covering the builtin field types and their
    /// class-style aliases.
    pub fn builtin() -> Self {
        let mut resolver = Self::empty();
        resolver.map("input", "input", builtin::register_input);
        resolver.map("fieldinput", "input", builtin::register_input);
        resolver.map("checkbox", "checkbox", builtin::register_checkbox);
        resolver.map("fieldcheckbox", "checkbox", builtin::register_checkbox);
        resolver.map("textarea", "textarea", builtin::register_textarea);
        resolver.map("fieldtextarea", "textarea", builtin::register_textarea);
        resolver
    }

    /// Map a name to a registration hook and the canonical handle that
    /// hook registers. Names are stored lower-cased.
    pub fn map(&mut self, name: &str, canonical: &str, hook: RegisterHook) {
        self.table.insert(
            name.to_ascii_lowercase(),
            Mapping {
                canonical: canonical.to_string(),
                hook,
            },
        );
    }

    /// Lower-case `name`, look it up, and run its hook against the
    /// registry. Registration is include-once: the registry keeps the
    /// first constructor for a handle. Returns the canonical handle the
    /// hook registers, so alias lookups can continue under it; unmapped
    /// names do nothing and return None.
    pub fn resolve(&self, name: &str, registry: &mut FieldRegistry) -> Option<String> {
        let mapping = self.table.get(&name.to_ascii_lowercase())?;
        (mapping.hook)(registry);
        Some(mapping.canonical.clone())
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::builtin()
    }
}
