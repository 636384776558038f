//! The accessibility-service boundary.
//!
//! [`TreeProvider`] is the narrow contract the core consumes: a synchronous,
//! blocking, non-reentrant connection that can enumerate top-level windows and
//! answer per-node queries. The core never assumes anything about the wire
//! protocol behind it; everything protocol-shaped lives on the other side of
//! this trait.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::errors::AutomationError;
use crate::types::{Bounds, RawStates};

/// Opaque back-reference to a live node owned by the tree provider.
///
/// `key` is the provider's stable identity for the node: two handles with the
/// same key refer to the same logical element, even when they come from
/// independent tree walks. The reference manager keys id stability on it.
/// The payload is whatever the provider needs to re-resolve the node and is
/// only ever inspected by the provider itself (via [`NodeHandle::payload`]).
#[derive(Clone)]
pub struct NodeHandle {
    key: u64,
    payload: Arc<dyn Any + Send + Sync>,
}

impl NodeHandle {
    pub fn new<P: Any + Send + Sync>(key: u64, payload: P) -> Self {
        Self {
            key,
            payload: Arc::new(payload),
        }
    }

    /// The provider's stable identity for this node.
    pub fn key(&self) -> u64 {
        self.key
    }

    /// Downcast the provider payload. Returns `None` for a foreign payload
    /// type, which a provider should treat as a node it does not own.
    pub fn payload<P: Any>(&self) -> Option<&P> {
        self.payload.downcast_ref::<P>()
    }
}

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeHandle").field(&self.key).finish()
    }
}

impl PartialEq for NodeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for NodeHandle {}

impl std::hash::Hash for NodeHandle {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

/// Attributes of one node as reported by the service.
#[derive(Debug, Clone, Default)]
pub struct RawAttributes {
    /// Free-form role string; normalized by `ElementRole::from_raw`.
    pub role: String,
    /// Accessible name or label. Empty when the service reports none.
    pub name: String,
    pub states: RawStates,
    pub bounds: Bounds,
    /// Owning application name, populated at least for top-level windows.
    pub app_name: Option<String>,
}

/// Synchronous, blocking connection to the desktop accessibility service.
///
/// The connection is non-reentrant: exactly one call may be in flight at a
/// time. Callers never invoke this directly — every call is funneled through
/// [`ProviderGateway`](crate::gateway::ProviderGateway), which serializes
/// access and offloads the blocking work.
///
/// Error contract: [`AutomationError::ServiceUnavailable`] means the
/// connection itself is gone and the whole operation must abort;
/// [`AutomationError::PlatformError`] is a per-node fault (the node vanished,
/// its process hung) and traversal skips that subtree.
pub trait TreeProvider: Send + Sync {
    /// Enumerate the current top-level windows.
    fn list_windows(&self) -> Result<Vec<NodeHandle>, AutomationError>;

    /// Ordered children of a node.
    fn children(&self, node: &NodeHandle) -> Result<Vec<NodeHandle>, AutomationError>;

    /// Role, name, states, and bounds of a node.
    fn attributes(&self, node: &NodeHandle) -> Result<RawAttributes, AutomationError>;

    /// Whether the node still exists in the live tree.
    fn is_alive(&self, node: &NodeHandle) -> Result<bool, AutomationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_identity_is_the_key() {
        let a = NodeHandle::new(7, "window payload");
        let b = NodeHandle::new(7, 123u32);
        let c = NodeHandle::new(8, "window payload");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn payload_downcast() {
        let handle = NodeHandle::new(1, String::from("atspi path"));
        assert_eq!(handle.payload::<String>().unwrap(), "atspi path");
        assert!(handle.payload::<u32>().is_none());
    }
}
