//! Desktop accessibility snapshots through stable, short-lived references
//!
//! This crate exposes a live accessibility tree as `ref_N` handles an
//! automation client can hold on to across snapshots, and lets the client
//! narrow every subsequent query to a targeted working set of windows. The
//! accessibility connection itself sits behind the [`TreeProvider`] trait —
//! a single, blocking, non-reentrant resource that all requests share
//! through one serialized gateway.
//!
//! ```
//! use std::sync::Arc;
//! use periscope::{AutomationError, Desktop, NodeHandle, RawAttributes, TreeProvider};
//!
//! struct EmptyDesktop;
//!
//! impl TreeProvider for EmptyDesktop {
//!     fn list_windows(&self) -> Result<Vec<NodeHandle>, AutomationError> {
//!         Ok(vec![])
//!     }
//!     fn children(&self, _: &NodeHandle) -> Result<Vec<NodeHandle>, AutomationError> {
//!         Ok(vec![])
//!     }
//!     fn attributes(&self, _: &NodeHandle) -> Result<RawAttributes, AutomationError> {
//!         Ok(RawAttributes::default())
//!     }
//!     fn is_alive(&self, _: &NodeHandle) -> Result<bool, AutomationError> {
//!         Ok(true)
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), AutomationError> {
//! let desktop = Desktop::new(Arc::new(EmptyDesktop));
//! let snapshot = desktop.snapshot(None, None).await?;
//! assert_eq!(snapshot.element_count, 0);
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use serde::Serialize;
use tracing::{info, instrument, warn};

pub mod config;
pub mod errors;
pub mod gateway;
pub mod input;
pub mod overlay;
pub mod provider;
pub mod references;
pub mod snapshot;
pub mod types;
pub mod window_manager;

pub use config::{validate_coordinates, AutomationConfig, MAX_COORDINATE, MIN_COORDINATE};
pub use errors::AutomationError;
pub use gateway::ProviderGateway;
pub use input::{ActionTarget, InputExecutor, MouseButton};
pub use overlay::OverlayRenderer;
pub use provider::{NodeHandle, RawAttributes, TreeProvider};
pub use references::{ElementDetails, ElementReference, ReferenceManager};
pub use snapshot::{ElementNode, SearchMatch, Snapshot, SnapshotScope};
pub use tokio_util::sync::CancellationToken;
pub use types::{Bounds, ElementRole, ElementState, RawStates};
pub use window_manager::{
    ContextSummary, GroupColor, GroupSummary, NewTarget, WindowFilter, WindowGeometry,
    WindowGroupManager, WindowSummary, WindowTarget,
};

use snapshot::{TraversalConfig, TraversalStats};

/// A top-level window seen by discovery enumeration.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredWindow {
    pub app_name: String,
    pub title: String,
    pub bounds: Bounds,
    pub is_focused: bool,
    #[serde(skip)]
    pub handle: NodeHandle,
}

/// How `target_window` picks its window.
#[derive(Debug, Clone)]
pub enum WindowQuery {
    /// Case-insensitive substring match on the window title.
    Title(String),
    /// Any window of an application, matched by name.
    Application(String),
    /// An already-tracked window id: switches its group's active window.
    Id(String),
}

/// Outcome of a `target_window` call.
#[derive(Debug, Clone, Serialize)]
pub struct TargetResult {
    pub group: GroupSummary,
    pub window: WindowSummary,
    /// Discovery matches beyond the one that was targeted.
    pub additional_matches: usize,
}

/// The main entry point: every caller-facing operation of the automation
/// core, backed by one serialized accessibility connection.
///
/// All state is process-lifetime and in-memory; nothing survives a restart.
pub struct Desktop {
    gateway: ProviderGateway,
    references: Arc<ReferenceManager>,
    windows: Arc<WindowGroupManager>,
    overlay: Option<Arc<dyn OverlayRenderer>>,
    config: AutomationConfig,
    /// Cancellation token for stopping execution (wrapped in RwLock to allow reset)
    cancellation_token: Arc<RwLock<CancellationToken>>,
}

impl Desktop {
    pub fn new(provider: Arc<dyn TreeProvider>) -> Self {
        Self::with_config(provider, AutomationConfig::default())
    }

    pub fn with_config(provider: Arc<dyn TreeProvider>, config: AutomationConfig) -> Self {
        Self {
            gateway: ProviderGateway::new(provider),
            references: Arc::new(ReferenceManager::new()),
            windows: Arc::new(WindowGroupManager::new(config.auto_delete_empty_groups)),
            overlay: None,
            config,
            cancellation_token: Arc::new(RwLock::new(CancellationToken::new())),
        }
    }

    /// Attach a border-overlay renderer. Rendering failures are logged and
    /// never fail the operation that triggered them.
    pub fn with_overlay(mut self, overlay: Arc<dyn OverlayRenderer>) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn config(&self) -> &AutomationConfig {
        &self.config
    }

    // ---- snapshot / search -------------------------------------------------

    /// Traverse the (possibly filtered) accessibility tree and return an
    /// element tree with a stable reference assigned to every node.
    ///
    /// Passing `app_filter` scopes the walk to one application and overrides
    /// window targeting. With no filter, the active window group (if any)
    /// scopes the walk; otherwise the whole desktop is scanned. Idle
    /// references are swept before the walk starts.
    #[instrument(skip(self))]
    pub async fn snapshot(
        &self,
        app_filter: Option<&str>,
        max_depth: Option<usize>,
    ) -> Result<Snapshot, AutomationError> {
        self.references
            .sweep(Instant::now(), self.config.reference_ttl());

        let (filter, scope, pruned_windows) = self.scoped_filter(app_filter).await?;
        let max_depth = self.config.effective_depth(max_depth);
        let cancel = self.cancellation_token.read().unwrap().clone();
        let references = self.references.clone();

        let (windows, stats): (Vec<ElementNode>, TraversalStats) = self
            .gateway
            .run(move |provider| {
                let traversal = TraversalConfig { max_depth, cancel };
                snapshot::build_tree(provider, &references, &filter, &traversal)
            })
            .await?;

        Ok(Snapshot {
            scope,
            element_count: stats.visited,
            skipped_subtrees: stats.skipped_subtrees,
            pruned_windows,
            windows,
        })
    }

    /// Snapshot, then score every element against a natural-language query.
    ///
    /// Only nonzero-score elements are returned, ordered by descending
    /// score; ties go to the shallower element, then traversal order.
    #[instrument(skip(self))]
    pub async fn find(
        &self,
        query: &str,
        app_filter: Option<&str>,
    ) -> Result<Vec<SearchMatch>, AutomationError> {
        self.config.validate_query(query)?;
        let snap = self.snapshot(app_filter, None).await?;
        Ok(snapshot::rank_matches(&snap.windows, query))
    }

    // ---- references --------------------------------------------------------

    /// Resolve a reference id back to its element, confirming the underlying
    /// node is still alive. A dead node evicts the reference — the id will
    /// never resolve again within this generation.
    #[instrument(skip(self))]
    pub async fn resolve(&self, ref_id: &str) -> Result<ElementReference, AutomationError> {
        let reference = self
            .references
            .get(ref_id)
            .ok_or_else(|| AutomationError::ReferenceNotFound(ref_id.to_string()))?;

        let node = reference.node.clone();
        match self.gateway.run(move |provider| provider.is_alive(&node)).await {
            Ok(true) => Ok(reference),
            Ok(false) => {
                self.references.evict(ref_id);
                Err(AutomationError::ReferenceNotFound(format!(
                    "{ref_id}: element no longer exists"
                )))
            }
            Err(e) if e.is_fatal_for_traversal() => Err(e),
            Err(e) => {
                self.references.evict(ref_id);
                Err(AutomationError::ReferenceNotFound(format!(
                    "{ref_id}: liveness check failed ({e})"
                )))
            }
        }
    }

    /// Resolve a reference into a target an [`InputExecutor`] can act on.
    pub async fn action_target(&self, ref_id: &str) -> Result<ActionTarget, AutomationError> {
        let reference = self.resolve(ref_id).await?;
        if !reference.bounds.is_valid() {
            return Err(AutomationError::InvalidArgument(format!(
                "{ref_id} has no usable on-screen bounds"
            )));
        }
        let (x, y) = reference.bounds.center();
        validate_coordinates(x, y)?;
        Ok(ActionTarget {
            ref_id: reference.ref_id,
            bounds: reference.bounds,
            node: reference.node,
        })
    }

    /// Explicitly drop one reference.
    pub fn release_reference(&self, ref_id: &str) -> bool {
        self.references.release(ref_id)
    }

    /// Start a new reference generation, invalidating every outstanding id.
    /// Never happens implicitly — a silent reset would break multi-step
    /// flows like click-after-snapshot.
    pub fn reset_references(&self) -> u64 {
        self.references.reset()
    }

    pub fn reference_generation(&self) -> u64 {
        self.references.generation()
    }

    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    // ---- window targeting --------------------------------------------------

    /// Enumerate the currently visible top-level windows.
    #[instrument(skip(self))]
    pub async fn list_windows(&self) -> Result<Vec<DiscoveredWindow>, AutomationError> {
        self.gateway
            .run(|provider| {
                let mut windows = Vec::new();
                for handle in provider.list_windows()? {
                    let attrs = match provider.attributes(&handle) {
                        Ok(attrs) => attrs,
                        Err(e) if e.is_fatal_for_traversal() => return Err(e),
                        Err(_) => continue,
                    };
                    windows.push(DiscoveredWindow {
                        app_name: attrs.app_name.unwrap_or_else(|| attrs.name.clone()),
                        title: attrs.name,
                        bounds: attrs.bounds,
                        is_focused: attrs.states.focused,
                        handle,
                    });
                }
                Ok(windows)
            })
            .await
    }

    /// Target a window: add or move it into a group (created on demand) and
    /// reflect the membership on the overlay.
    ///
    /// `group` may be a group id, a group name, or `None` for the active
    /// group. When the query is an already-tracked window id, no discovery
    /// runs — the call just switches that group's active window.
    #[instrument(skip(self))]
    pub async fn target_window(
        &self,
        query: WindowQuery,
        group: Option<&str>,
        color: Option<GroupColor>,
    ) -> Result<TargetResult, AutomationError> {
        let color = color.unwrap_or_default();

        if let WindowQuery::Id(window_id) = &query {
            let window = self.windows.set_active_window(window_id)?;
            let (group_id, _) = self
                .windows
                .find_window(window_id)
                .expect("window just activated is tracked");
            return Ok(TargetResult {
                group: self.windows.group(&group_id)?,
                window,
                additional_matches: 0,
            });
        }

        let needle = match &query {
            WindowQuery::Title(title) => title,
            WindowQuery::Application(app) => app,
            WindowQuery::Id(_) => unreachable!("handled above"),
        };
        self.config.validate_query(needle)?;

        let discovered = self.list_windows().await?;
        let matches: Vec<DiscoveredWindow> = match &query {
            WindowQuery::Title(title) => {
                let needle = title.to_lowercase();
                discovered
                    .into_iter()
                    .filter(|w| w.title.to_lowercase().contains(&needle))
                    .collect()
            }
            WindowQuery::Application(app) => discovered
                .into_iter()
                .filter(|w| w.app_name.eq_ignore_ascii_case(app))
                .collect(),
            WindowQuery::Id(_) => unreachable!("handled above"),
        };

        let Some(window) = matches.first().cloned() else {
            return Err(AutomationError::WindowNotFound(format!(
                "no window matched {query:?}"
            )));
        };

        let geometry = window.bounds.is_valid().then_some(WindowGeometry {
            x: window.bounds.x,
            y: window.bounds.y,
            width: window.bounds.width,
            height: window.bounds.height,
        });
        let (group_summary, window_summary) = self.windows.target(
            NewTarget {
                app_name: window.app_name,
                title: window.title,
                handle: window.handle,
                geometry,
            },
            group,
            color,
        )?;

        if let (Some(overlay), Some(geometry)) = (&self.overlay, geometry) {
            if let Err(e) =
                overlay.show_border(&window_summary.window_id, geometry, group_summary.color)
            {
                warn!(window_id = %window_summary.window_id, error = %e, "failed to show border overlay");
            }
        }

        Ok(TargetResult {
            group: group_summary,
            window: window_summary,
            additional_matches: matches.len() - 1,
        })
    }

    /// Create a group and make it the active one.
    pub fn create_group(&self, name: Option<&str>, color: Option<GroupColor>) -> GroupSummary {
        let created = self.windows.create_group(name, color.unwrap_or_default());
        self.windows
            .set_active_group(&created.group_id)
            .expect("group just created exists");
        self.windows
            .group(&created.group_id)
            .expect("group just created exists")
    }

    /// Delete a group. Fails with [`AutomationError::GroupNotFound`] for an
    /// id that was never created; an empty group deletes normally.
    pub fn delete_group(&self, group_id: &str) -> Result<GroupSummary, AutomationError> {
        self.windows.delete_group(group_id)
    }

    pub fn set_active_group(&self, group_id: &str) -> Result<(), AutomationError> {
        self.windows.set_active_group(group_id)
    }

    /// Look up one group. An existing group with zero members answers with
    /// an empty member list — only an unknown id is an error.
    pub fn group(&self, group_id: &str) -> Result<GroupSummary, AutomationError> {
        self.windows.group(group_id)
    }

    /// Stop tracking one window and remove its overlay border.
    pub fn release_window(&self, window_id: &str) -> Result<WindowSummary, AutomationError> {
        let (_, target) = self.windows.release(window_id)?;
        if let Some(overlay) = &self.overlay {
            if let Err(e) = overlay.hide_border(window_id) {
                warn!(window_id, error = %e, "failed to hide border overlay");
            }
        }
        Ok(WindowSummary {
            window_id: target.window_id,
            app_name: target.app_name,
            title: target.title,
            geometry: target.geometry,
            is_active: target.is_active,
        })
    }

    /// Release every tracked window. Returns how many were released.
    pub fn release_all_windows(&self) -> usize {
        let released = self.windows.release_all();
        if let Some(overlay) = &self.overlay {
            if let Err(e) = overlay.hide_all() {
                warn!(error = %e, "failed to hide border overlays");
            }
        }
        released.len()
    }

    /// The read-only introspection surface: groups, members, active set.
    pub fn list_context(&self) -> ContextSummary {
        self.windows.list_context()
    }

    // ---- cancellation ------------------------------------------------------

    /// Cancel in-flight traversals. An offloaded provider call is never
    /// interrupted mid-flight; the walk stops at the next window boundary.
    pub fn stop_execution(&self) {
        let token = self.cancellation_token.read().unwrap();
        token.cancel();
        info!("cancellation requested");
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.read().unwrap().is_cancelled()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.read().unwrap().clone()
    }

    /// Replace a cancelled token so the desktop can be reused.
    pub fn reset_cancellation(&self) {
        *self.cancellation_token.write().unwrap() = CancellationToken::new();
    }

    // ---- internals ---------------------------------------------------------

    /// Work out what this snapshot is scoped to, pruning targeted windows
    /// that closed since the last call. Window closure is not an error: the
    /// pruned ids come back for the result summary.
    async fn scoped_filter(
        &self,
        app_filter: Option<&str>,
    ) -> Result<(WindowFilter, SnapshotScope, Vec<String>), AutomationError> {
        if let Some(app) = app_filter {
            return Ok((
                WindowFilter::Application(app.to_string()),
                SnapshotScope::Application {
                    name: app.to_string(),
                },
                Vec::new(),
            ));
        }

        let targets = self.windows.active_group_targets();
        if targets.is_empty() {
            return Ok((WindowFilter::All, SnapshotScope::Desktop, Vec::new()));
        }
        let group_id = self
            .windows
            .list_context()
            .active_group_id
            .unwrap_or_default();

        let probes: Vec<(String, NodeHandle)> = targets
            .iter()
            .map(|t| (t.window_id.clone(), t.handle.clone()))
            .collect();
        let dead = self
            .gateway
            .run(move |provider| {
                let mut dead = Vec::new();
                for (window_id, handle) in &probes {
                    match provider.is_alive(handle) {
                        Ok(true) => {}
                        Ok(false) => dead.push(window_id.clone()),
                        Err(e) if e.is_fatal_for_traversal() => return Err(e),
                        Err(_) => dead.push(window_id.clone()),
                    }
                }
                Ok(dead)
            })
            .await?;

        let pruned = self.windows.remove_gone(&dead);
        for window_id in &pruned {
            if let Some(overlay) = &self.overlay {
                if let Err(e) = overlay.hide_border(window_id) {
                    warn!(window_id = %window_id, error = %e, "failed to hide overlay for closed window");
                }
            }
        }

        let remaining = self.windows.active_group_targets();
        if remaining.is_empty() {
            info!(group_id = %group_id, "all targeted windows are gone");
            return Ok((
                WindowFilter::Windows(HashSet::new()),
                SnapshotScope::Targeted {
                    group_id,
                    window_ids: Vec::new(),
                },
                pruned,
            ));
        }

        let filter = self.windows.active_filter();
        let window_ids = remaining
            .iter()
            .filter(|t| filter.accepts(t.handle.key(), &t.app_name))
            .map(|t| t.window_id.clone())
            .collect();
        Ok((
            filter,
            SnapshotScope::Targeted {
                group_id,
                window_ids,
            },
            pruned,
        ))
    }
}
