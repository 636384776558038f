//! Snapshot and search over the (possibly filtered) accessibility tree.
//!
//! A snapshot walks breadth-first across the accepted top-level windows and
//! depth-first within each, building an [`ElementNode`] tree and assigning a
//! stable reference to every visited node. Search runs a snapshot internally
//! and scores the flattened tree against a natural-language query.

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::AutomationError;
use crate::provider::{NodeHandle, TreeProvider};
use crate::references::{ElementDetails, ReferenceManager};
use crate::types::{Bounds, ElementRole, ElementState};
use crate::window_manager::WindowFilter;

/// One discovered accessibility element.
///
/// Built fresh on every traversal and never mutated afterwards. The parent
/// link is by reference id; children are owned, so the tree has no cycles.
#[derive(Debug, Clone, Serialize)]
pub struct ElementNode {
    pub ref_id: String,
    pub role: ElementRole,
    pub name: String,
    pub state: ElementState,
    pub bounds: Bounds,
    pub app_name: String,
    /// Depth relative to the top-level window root (root = 0).
    pub depth: usize,
    pub parent_ref: Option<String>,
    pub children: Vec<ElementNode>,
    #[serde(skip)]
    pub node: NodeHandle,
}

/// What a snapshot was scoped to.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnapshotScope {
    /// Unscoped full-desktop scan.
    Desktop,
    /// Scoped to one application by name.
    Application { name: String },
    /// Scoped to the active window group.
    Targeted {
        group_id: String,
        window_ids: Vec<String>,
    },
}

/// Result of one snapshot traversal.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub scope: SnapshotScope,
    /// One root per accepted top-level window, in enumeration order.
    pub windows: Vec<ElementNode>,
    pub element_count: usize,
    /// Subtrees that became inaccessible mid-walk and were omitted.
    pub skipped_subtrees: usize,
    /// Targeted windows confirmed closed and pruned before the walk.
    pub pruned_windows: Vec<String>,
}

/// One scored match from a search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchMatch {
    pub ref_id: String,
    pub role: ElementRole,
    pub name: String,
    pub state: ElementState,
    pub bounds: Bounds,
    pub app_name: String,
    pub depth: usize,
    pub score: u32,
}

pub(crate) struct TraversalConfig {
    pub max_depth: usize,
    pub cancel: CancellationToken,
}

#[derive(Default)]
pub(crate) struct TraversalStats {
    pub visited: usize,
    pub skipped_subtrees: usize,
}

/// A top-level window accepted by the filter, ready to walk.
pub(crate) struct WindowStart {
    pub handle: NodeHandle,
    pub app_name: String,
}

/// Enumerate top-level windows and keep the ones the filter accepts.
pub(crate) fn accepted_windows(
    provider: &dyn TreeProvider,
    filter: &WindowFilter,
) -> Result<Vec<WindowStart>, AutomationError> {
    let mut starts = Vec::new();
    for handle in provider.list_windows()? {
        let attrs = match provider.attributes(&handle) {
            Ok(attrs) => attrs,
            Err(e) if e.is_fatal_for_traversal() => return Err(e),
            Err(e) => {
                debug!(key = handle.key(), error = %e, "window unreadable, skipping");
                continue;
            }
        };
        let app_name = attrs.app_name.unwrap_or_else(|| attrs.name.clone());
        if filter.accepts(handle.key(), &app_name) {
            starts.push(WindowStart { handle, app_name });
        }
    }
    Ok(starts)
}

/// Walk every accepted window. Runs entirely on the gateway's blocking
/// worker, so the whole traversal holds the provider for one serialized unit.
pub(crate) fn build_tree(
    provider: &dyn TreeProvider,
    references: &ReferenceManager,
    filter: &WindowFilter,
    config: &TraversalConfig,
) -> Result<(Vec<ElementNode>, TraversalStats), AutomationError> {
    let starts = accepted_windows(provider, filter)?;
    let mut roots = Vec::new();
    let mut stats = TraversalStats::default();
    for start in starts {
        // Cancellation is cooperative and only observed between windows; an
        // in-flight provider call is never interrupted.
        if config.cancel.is_cancelled() {
            return Err(AutomationError::Cancelled(
                "snapshot abandoned before completion".to_string(),
            ));
        }
        if let Some(root) = walk_node(
            provider,
            references,
            &start.handle,
            &start.app_name,
            0,
            None,
            config,
            &mut stats,
        )? {
            roots.push(root);
        }
    }
    debug!(
        windows = roots.len(),
        visited = stats.visited,
        skipped = stats.skipped_subtrees,
        "traversal complete"
    );
    Ok((roots, stats))
}

#[allow(clippy::too_many_arguments)]
fn walk_node(
    provider: &dyn TreeProvider,
    references: &ReferenceManager,
    handle: &NodeHandle,
    app_name: &str,
    depth: usize,
    parent_ref: Option<&str>,
    config: &TraversalConfig,
    stats: &mut TraversalStats,
) -> Result<Option<ElementNode>, AutomationError> {
    let attrs = match provider.attributes(handle) {
        Ok(attrs) => attrs,
        Err(e) if e.is_fatal_for_traversal() => return Err(e),
        Err(e) => {
            // The node went away mid-walk. Skip this subtree, keep siblings.
            debug!(key = handle.key(), error = %e, "subtree vanished mid-walk");
            stats.skipped_subtrees += 1;
            return Ok(None);
        }
    };

    let role = ElementRole::from_raw(&attrs.role);
    let state = ElementState::derive(attrs.states, role);
    let ref_id = references.assign(
        handle,
        ElementDetails {
            role,
            name: attrs.name.clone(),
            state,
            bounds: attrs.bounds,
            app_name: app_name.to_string(),
        },
    );
    stats.visited += 1;

    let mut node = ElementNode {
        ref_id: ref_id.clone(),
        role,
        name: attrs.name,
        state,
        bounds: attrs.bounds,
        app_name: app_name.to_string(),
        depth,
        parent_ref: parent_ref.map(str::to_string),
        children: Vec::new(),
        node: handle.clone(),
    };

    // Branches beyond max_depth are omitted outright, not truncated with a
    // placeholder.
    if depth < config.max_depth {
        match provider.children(handle) {
            Ok(children) => {
                for child in children {
                    if let Some(child_node) = walk_node(
                        provider,
                        references,
                        &child,
                        app_name,
                        depth + 1,
                        Some(&ref_id),
                        config,
                        stats,
                    )? {
                        node.children.push(child_node);
                    }
                }
            }
            Err(e) if e.is_fatal_for_traversal() => return Err(e),
            Err(e) => {
                debug!(key = handle.key(), error = %e, "children unavailable, keeping node as leaf");
                stats.skipped_subtrees += 1;
            }
        }
    }

    Ok(Some(node))
}

const NAME_WEIGHT: u32 = 3;
const ROLE_WEIGHT: u32 = 2;
const STATE_WEIGHT: u32 = 1;

/// Additive relevance score of one node against a query.
///
/// Name substring hits carry the highest weight, role keywords sit in the
/// middle, state keywords lowest. A whole-phrase name hit scores on top of
/// the per-word hits.
pub(crate) fn score_node(node: &ElementNode, query: &str) -> u32 {
    let query = query.to_lowercase();
    let name = node.name.to_lowercase();
    let mut score = 0;
    if name.contains(&query) {
        score += NAME_WEIGHT;
    }
    for word in query.split_whitespace() {
        if name.contains(word) {
            score += NAME_WEIGHT;
        }
        if node.role.matches_keyword(word) {
            score += ROLE_WEIGHT;
        }
        if node.state.matches_keyword(word) {
            score += STATE_WEIGHT;
        }
    }
    score
}

/// Score the flattened tree and rank: descending score, then shallower depth,
/// then traversal order. Zero-score nodes are dropped.
pub(crate) fn rank_matches(roots: &[ElementNode], query: &str) -> Vec<SearchMatch> {
    fn flatten<'a>(node: &'a ElementNode, out: &mut Vec<&'a ElementNode>) {
        out.push(node);
        for child in &node.children {
            flatten(child, out);
        }
    }

    let mut ordered = Vec::new();
    for root in roots {
        flatten(root, &mut ordered);
    }

    let mut scored: Vec<(usize, SearchMatch)> = ordered
        .into_iter()
        .enumerate()
        .filter_map(|(order, node)| {
            let score = score_node(node, query);
            (score > 0).then(|| {
                (
                    order,
                    SearchMatch {
                        ref_id: node.ref_id.clone(),
                        role: node.role,
                        name: node.name.clone(),
                        state: node.state,
                        bounds: node.bounds,
                        app_name: node.app_name.clone(),
                        depth: node.depth,
                        score,
                    },
                )
            })
        })
        .collect();

    scored.sort_by(|(order_a, a), (order_b, b)| {
        b.score
            .cmp(&a.score)
            .then(a.depth.cmp(&b.depth))
            .then(order_a.cmp(order_b))
    });
    scored.into_iter().map(|(_, m)| m).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawStates;

    fn node(
        key: u64,
        name: &str,
        role: ElementRole,
        raw: RawStates,
        depth: usize,
    ) -> ElementNode {
        let state = ElementState::derive(raw, role);
        ElementNode {
            ref_id: format!("ref_{key}"),
            role,
            name: name.to_string(),
            state,
            bounds: Bounds::new(0, 0, 100, 20),
            app_name: "App".to_string(),
            depth,
            parent_ref: None,
            children: Vec::new(),
            node: NodeHandle::new(key, ()),
        }
    }

    #[test]
    fn search_field_outranks_go_button() {
        let address_bar = node(
            1,
            "Search or enter address",
            ElementRole::Entry,
            RawStates {
                editable: true,
                focused: true,
                ..Default::default()
            },
            2,
        );
        let go_button = node(2, "Go", ElementRole::Button, RawStates::default(), 2);

        let matches = rank_matches(&[address_bar, go_button], "search field");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].ref_id, "ref_1");
        assert_eq!(matches[0].role, ElementRole::Entry);
    }

    #[test]
    fn zero_score_nodes_are_dropped() {
        let label = node(1, "Status", ElementRole::Label, RawStates::default(), 1);
        assert!(rank_matches(&[label], "button").is_empty());
    }

    #[test]
    fn role_keyword_alone_matches() {
        let button = node(1, "OK", ElementRole::Button, RawStates::default(), 1);
        let matches = rank_matches(&[button], "button");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].score, ROLE_WEIGHT);
    }

    #[test]
    fn state_keyword_contributes() {
        let focused = node(
            1,
            "Name",
            ElementRole::Entry,
            RawStates {
                focused: true,
                ..Default::default()
            },
            1,
        );
        let blurred = node(2, "Name", ElementRole::Entry, RawStates::default(), 1);
        let matches = rank_matches(&[focused, blurred], "focused name");
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].ref_id, "ref_1");
        assert!(matches[0].score > matches[1].score);
    }

    #[test]
    fn ties_break_by_depth_then_order() {
        let mut shallow = node(1, "Save", ElementRole::Button, RawStates::default(), 1);
        let deep = node(2, "Save", ElementRole::Button, RawStates::default(), 3);
        let sibling = node(3, "Save", ElementRole::Button, RawStates::default(), 1);

        // Traversal order: deep (child of shallow) before sibling.
        shallow.children.push(deep);
        let matches = rank_matches(&[shallow, sibling], "save");
        let ids: Vec<&str> = matches.iter().map(|m| m.ref_id.as_str()).collect();
        assert_eq!(ids, vec!["ref_1", "ref_3", "ref_2"]);
    }

    #[test]
    fn whole_phrase_hit_scores_above_word_hits() {
        let exact = node(
            1,
            "Save document",
            ElementRole::Button,
            RawStates::default(),
            1,
        );
        let scattered = node(
            2,
            "Save the current document",
            ElementRole::Button,
            RawStates::default(),
            1,
        );
        let matches = rank_matches(&[scattered, exact], "save document");
        assert_eq!(matches[0].ref_id, "ref_1");
    }
}
