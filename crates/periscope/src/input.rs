//! Input-backend boundary.
//!
//! The actual click/type/key execution happens in external subprocess
//! backends. The core never drives them itself — it resolves references into
//! [`ActionTarget`]s and hands those over, so the request layer can pick
//! whichever backend the platform detection chose.

use serde::{Deserialize, Serialize};

use crate::errors::AutomationError;
use crate::provider::NodeHandle;
use crate::types::Bounds;

/// Mouse button for click actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Middle,
    Right,
}

/// A resolved, liveness-checked element ready to be acted on.
#[derive(Debug, Clone)]
pub struct ActionTarget {
    pub ref_id: String,
    pub bounds: Bounds,
    /// Back-reference for backends that can act through the accessibility
    /// service instead of synthesizing raw input.
    pub node: NodeHandle,
}

impl ActionTarget {
    /// Default click location: the center of the element's bounds.
    pub fn click_point(&self) -> (i32, i32) {
        self.bounds.center()
    }
}

/// External input execution contract. Implementations report per-action
/// success or failure; the core only supplies validated targets.
pub trait InputExecutor: Send + Sync {
    fn click(&self, target: &ActionTarget, button: MouseButton) -> Result<(), AutomationError>;

    fn click_at(&self, x: i32, y: i32, button: MouseButton) -> Result<(), AutomationError>;

    fn type_text(&self, target: &ActionTarget, text: &str) -> Result<(), AutomationError>;

    fn press_key(&self, key: &str, modifiers: &[&str]) -> Result<(), AutomationError>;
}
