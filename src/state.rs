// 🎛️ Selection State - catalogs, selected keys, re-entrancy guard
//
// Every module holds a static catalog and a handful of selected keys.
// The one invariant: a selected key always exists in its catalog.

use crate::error::{CommandCenterError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ============================================================================
// CATALOG
// ============================================================================

/// Ordered, keyed, read-only collection of configuration records.
///
/// Insertion order is display order.
#[derive(Debug, Clone)]
pub struct Catalog<T> {
    kind: &'static str,
    entries: Vec<(String, T)>,
}

impl<T> Catalog<T> {
    /// `kind` names the entries in error messages ("industry", "model", ...)
    pub fn new(kind: &'static str) -> Self {
        Catalog {
            kind,
            entries: Vec::new(),
        }
    }

    /// Builder-style insert. A repeated key replaces the earlier value in place.
    pub fn with(mut self, key: &str, value: T) -> Self {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key.to_string(), value));
        }
        self
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Like `get`, but a missing key is an `UnknownKey` error
    pub fn require(&self, key: &str) -> Result<&T> {
        self.get(key)
            .ok_or_else(|| CommandCenterError::unknown(self.kind, key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, index: usize) -> (&str, &T) {
        let (k, v) = &self.entries[index];
        (k.as_str(), v)
    }
}

// ============================================================================
// SELECTION
// ============================================================================

/// A single selected key that is known to exist in a catalog.
///
/// A selection must only be resolved against the catalog it was made from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    index: usize,
    key: String,
}

impl Selection {
    pub fn new<T>(catalog: &Catalog<T>, key: &str) -> Result<Self> {
        let index = catalog
            .position(key)
            .ok_or_else(|| CommandCenterError::unknown(catalog.kind(), key))?;
        Ok(Selection {
            index,
            key: key.to_string(),
        })
    }

    /// Select `key`, or the first entry when `key` is unknown.
    ///
    /// Only for built-in catalogs, which are never empty.
    pub fn or_first<T>(catalog: &Catalog<T>, key: &str) -> Self {
        Selection::new(catalog, key).unwrap_or_else(|_| {
            let (first, _) = catalog.entry(0);
            Selection {
                index: 0,
                key: first.to_string(),
            }
        })
    }

    /// Select `key`; an unknown key leaves the selection unchanged
    pub fn set<T>(&mut self, catalog: &Catalog<T>, key: &str) -> Result<()> {
        *self = Selection::new(catalog, key)?;
        Ok(())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is(&self, key: &str) -> bool {
        self.key == key
    }

    pub fn resolve<'a, T>(&self, catalog: &'a Catalog<T>) -> &'a T {
        catalog.entry(self.index).1
    }
}

// ============================================================================
// RUN GUARD
// ============================================================================

/// Boolean re-entrancy guard: overlapping runs are dropped, not queued.
#[derive(Debug, Clone, Default)]
pub struct RunGuard {
    running: Arc<AtomicBool>,
}

impl RunGuard {
    /// Claim the guard. `None` while another run holds it.
    pub fn try_start(&self) -> Option<RunTicket> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunTicket {
                running: Arc::clone(&self.running),
            })
    }

    /// Claim the guard or fail with `Busy(module)`
    pub fn start(&self, module: &'static str) -> Result<RunTicket> {
        self.try_start().ok_or(CommandCenterError::Busy(module))
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Held for as long as a run's animation plays; releases the guard on drop.
#[derive(Debug)]
pub struct RunTicket {
    running: Arc<AtomicBool>,
}

impl Drop for RunTicket {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}
