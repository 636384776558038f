//! Reference lifecycle: minting, resolving, and expiring the stable `ref_N`
//! tokens handed to callers.
//!
//! Identity is keyed on the provider's opaque back-reference
//! ([`NodeHandle::key`]), never on structural position or content, so an
//! element that is still present keeps its id across independently constructed
//! tree walks. Ids live inside a *generation*: [`ReferenceManager::reset`]
//! starts a new one and invalidates everything issued before it.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::provider::NodeHandle;
use crate::types::{Bounds, ElementRole, ElementState};

/// The element facts captured at assignment time.
#[derive(Debug, Clone)]
pub struct ElementDetails {
    pub role: ElementRole,
    pub name: String,
    pub state: ElementState,
    pub bounds: Bounds,
    pub app_name: String,
}

/// One issued reference: the caller-facing token plus everything needed to
/// re-resolve and act on the live node.
#[derive(Debug, Clone)]
pub struct ElementReference {
    pub ref_id: String,
    /// Generation the id was minted in.
    pub generation: u64,
    pub node: NodeHandle,
    pub role: ElementRole,
    pub name: String,
    pub state: ElementState,
    pub bounds: Bounds,
    pub app_name: String,
    pub created: Instant,
    pub last_access: Instant,
}

#[derive(Default)]
struct Tables {
    generation: u64,
    counter: u64,
    by_id: HashMap<String, ElementReference>,
    /// Provider identity key -> issued ref id, scoped to the generation.
    by_key: HashMap<u64, String>,
}

/// Generation-scoped table of issued references.
///
/// All mutation happens on the serialized request path; the mutex exists for
/// `Send + Sync` soundness and to make the table swap during [`reset`] atomic.
///
/// [`reset`]: ReferenceManager::reset
#[derive(Default)]
pub struct ReferenceManager {
    tables: Mutex<Tables>,
}

impl ReferenceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the live reference id for this node, minting the next
    /// sequential id if the node has not been seen this generation.
    ///
    /// Re-assignment refreshes the stored facts (the element may have moved
    /// or been renamed) and the last-access time, but never the id.
    pub fn assign(&self, node: &NodeHandle, details: ElementDetails) -> String {
        let mut tables = self.tables.lock().unwrap();
        let now = Instant::now();

        if let Some(ref_id) = tables.by_key.get(&node.key()).cloned() {
            if let Some(existing) = tables.by_id.get_mut(&ref_id) {
                existing.role = details.role;
                existing.name = details.name;
                existing.state = details.state;
                existing.bounds = details.bounds;
                existing.app_name = details.app_name;
                existing.last_access = now;
                return ref_id;
            }
        }

        tables.counter += 1;
        let ref_id = format!("ref_{}", tables.counter);
        let reference = ElementReference {
            ref_id: ref_id.clone(),
            generation: tables.generation,
            node: node.clone(),
            role: details.role,
            name: details.name,
            state: details.state,
            bounds: details.bounds,
            app_name: details.app_name,
            created: now,
            last_access: now,
        };
        tables.by_key.insert(node.key(), ref_id.clone());
        tables.by_id.insert(ref_id.clone(), reference);
        ref_id
    }

    /// Look up a reference, refreshing its last-access time.
    ///
    /// This is only the table half of resolution; the caller still owes the
    /// node a liveness check and must [`evict`](Self::evict) on failure.
    pub fn get(&self, ref_id: &str) -> Option<ElementReference> {
        let mut tables = self.tables.lock().unwrap();
        let reference = tables.by_id.get_mut(ref_id)?;
        reference.last_access = Instant::now();
        Some(reference.clone())
    }

    /// Drop a reference whose node was confirmed gone. The id will not be
    /// reissued: a later walk that finds the node again mints a fresh id.
    pub fn evict(&self, ref_id: &str) -> Option<ElementReference> {
        let mut tables = self.tables.lock().unwrap();
        let reference = tables.by_id.remove(ref_id)?;
        tables.by_key.remove(&reference.node.key());
        debug!(ref_id, "evicted dead reference");
        Some(reference)
    }

    /// Explicit caller-requested release. Returns whether the id was live.
    pub fn release(&self, ref_id: &str) -> bool {
        self.evict(ref_id).is_some()
    }

    /// Evict references idle longer than `ttl`, relative to `now`.
    ///
    /// Invoked opportunistically before each snapshot rather than from a
    /// timer thread, so eviction stays deterministic relative to request
    /// order. Returns the number of references swept.
    pub fn sweep(&self, now: Instant, ttl: Duration) -> usize {
        let mut tables = self.tables.lock().unwrap();
        let expired: Vec<(String, u64)> = tables
            .by_id
            .iter()
            .filter(|(_, r)| now.duration_since(r.last_access) > ttl)
            .map(|(id, r)| (id.clone(), r.node.key()))
            .collect();
        for (ref_id, key) in &expired {
            tables.by_id.remove(ref_id);
            tables.by_key.remove(key);
        }
        if !expired.is_empty() {
            debug!(count = expired.len(), "swept idle references");
        }
        expired.len()
    }

    /// Start a new generation: every outstanding id becomes invalid and the
    /// counter restarts. Only ever invoked on an explicit caller request — a
    /// silent reset would break multi-step flows like click-after-snapshot.
    pub fn reset(&self) -> u64 {
        let mut tables = self.tables.lock().unwrap();
        let dropped = tables.by_id.len();
        tables.by_id.clear();
        tables.by_key.clear();
        tables.counter = 0;
        tables.generation += 1;
        info!(
            generation = tables.generation,
            dropped, "reference table reset"
        );
        tables.generation
    }

    pub fn generation(&self) -> u64 {
        self.tables.lock().unwrap().generation
    }

    pub fn len(&self) -> usize {
        self.tables.lock().unwrap().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
