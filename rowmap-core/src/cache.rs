use crate::{Error, Result, ShapeFingerprint};
use parking_lot::RwLock;
use std::{
    any::Any,
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Routines currently cached.
    pub entries: usize,
    /// Successful compilations, including the ones that lost a publication race.
    pub compilations: u64,
    pub hits: u64,
}

/// Process-wide store of compiled routines keyed by shape fingerprint.
///
/// Lookups take a shared lock, compilation runs without any lock and the
/// result is published under the exclusive lock only if no other thread
/// published one first, so every caller of a fingerprint ends up with the
/// same routine.
#[derive(Default)]
pub struct FunctionCache {
    entries: RwLock<HashMap<ShapeFingerprint, Arc<dyn Any + Send + Sync>>>,
    compilations: AtomicU64,
    hits: AtomicU64,
}

impl FunctionCache {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn get<F: Any + Send + Sync>(&self, fingerprint: &ShapeFingerprint) -> Option<Arc<F>> {
        let entry = self.entries.read().get(fingerprint).cloned()?;
        let routine = entry.downcast::<F>().ok()?;
        self.hits.fetch_add(1, Ordering::Relaxed);
        log::trace!("Cache hit for {fingerprint}");
        Some(routine)
    }

    /// Returns the cached routine or compiles, publishes and returns a new one.
    ///
    /// A failed compilation caches nothing.
    pub fn get_or_compile<F, C>(&self, fingerprint: ShapeFingerprint, compile: C) -> Result<Arc<F>>
    where
        F: Any + Send + Sync,
        C: FnOnce(&ShapeFingerprint) -> Result<F>,
    {
        if let Some(routine) = self.get(&fingerprint) {
            return Ok(routine);
        }
        let routine: Arc<dyn Any + Send + Sync> = match compile(&fingerprint) {
            Ok(routine) => Arc::new(routine),
            Err(e) => {
                log::error!("Could not compile {fingerprint}: {e:#}");
                return Err(e);
            }
        };
        self.compilations.fetch_add(1, Ordering::Relaxed);
        log::debug!("Compiled {fingerprint}");
        let published = self
            .entries
            .write()
            .entry(fingerprint)
            .or_insert(routine)
            .clone();
        published
            .downcast::<F>()
            .map_err(|_| Error::msg("The cached routine has a different type than requested"))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drops every routine, counters are kept.
    pub fn reset(&self) {
        self.entries.write().clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            compilations: self.compilations.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
        }
    }
}
