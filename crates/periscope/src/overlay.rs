//! Border-overlay boundary.
//!
//! The renderer lives outside the core (GTK layer-shell, compositor plugin,
//! whatever the platform offers). The core only tells it when group
//! membership changes, and treats every rendering failure as non-fatal:
//! logged at warn level, never propagated.

use crate::errors::AutomationError;
use crate::window_manager::{GroupColor, WindowGeometry};

/// Draws and removes colored borders around targeted windows.
pub trait OverlayRenderer: Send + Sync {
    fn show_border(
        &self,
        window_id: &str,
        geometry: WindowGeometry,
        color: GroupColor,
    ) -> Result<(), AutomationError>;

    fn hide_border(&self, window_id: &str) -> Result<(), AutomationError>;

    fn hide_all(&self) -> Result<(), AutomationError>;
}
