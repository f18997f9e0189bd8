//! Data-driven capability dispatch table.
//!
//! Commands and plugin-contributed operations are dispatched through a flat
//! name → handler table populated at startup, not through trait-object
//! hierarchies. The core only defines the table; the command layer and the
//! plugin loader (outside this workspace) decide what the handler type is
//! and when to populate it.

use std::collections::HashMap;

/// A single registered capability.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Capability<H> {
    /// Handler invoked when the capability is dispatched.
    pub handler: H,
    /// One-line help text shown by the command layer.
    pub help: String,
}

/// Name → capability lookup table.
///
/// Later registrations under the same name replace earlier ones, so plugins
/// loaded at startup can override built-ins deliberately.
#[derive(Clone, Debug, Default)]
pub struct CapabilityTable<H> {
    entries: HashMap<String, Capability<H>>,
}

impl<H> CapabilityTable<H> {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register a capability under `name`.
    pub fn register(&mut self, name: impl Into<String>, handler: H, help: impl Into<String>) {
        let name = name.into();
        tracing::debug!(capability = %name, "capability registered");
        let _ = self.entries.insert(
            name,
            Capability {
                handler,
                help: help.into(),
            },
        );
    }

    /// Look up a capability by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Capability<H>> {
        self.entries.get(name)
    }

    /// Names of all registered capabilities, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered capabilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no capabilities are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
