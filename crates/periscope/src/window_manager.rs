//! Window groups: named working sets of targeted top-level windows.
//!
//! Targeting a window narrows every subsequent snapshot and search to the
//! active group, which keeps the returned trees small on busy desktops. A
//! window belongs to at most one group; retargeting moves it. An emptied
//! group is still a group — existence is checked by id, never by member
//! count.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::AutomationError;
use crate::provider::NodeHandle;

/// Overlay border colors available for window groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupColor {
    #[default]
    Blue,
    Purple,
    Green,
    Orange,
    Red,
    Cyan,
}

impl GroupColor {
    /// Case-insensitive parse; unknown names fall back to blue.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "purple" => GroupColor::Purple,
            "green" => GroupColor::Green,
            "orange" => GroupColor::Orange,
            "red" => GroupColor::Red,
            "cyan" => GroupColor::Cyan,
            _ => GroupColor::Blue,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GroupColor::Blue => "blue",
            GroupColor::Purple => "purple",
            GroupColor::Green => "green",
            GroupColor::Orange => "orange",
            GroupColor::Red => "red",
            GroupColor::Cyan => "cyan",
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            GroupColor::Blue => "#3584e4",
            GroupColor::Purple => "#9141ac",
            GroupColor::Green => "#2ec27e",
            GroupColor::Orange => "#ff7800",
            GroupColor::Red => "#e01b24",
            GroupColor::Cyan => "#33c7de",
        }
    }

    /// Channel floats in `0.0..=1.0`, the form overlay renderers consume.
    pub fn to_rgb(&self) -> (f64, f64, f64) {
        let hex = self.hex();
        let channel = |range| {
            u8::from_str_radix(&hex[range], 16).unwrap_or(0) as f64 / 255.0
        };
        (channel(1..3), channel(3..5), channel(5..7))
    }
}

/// On-screen placement of a tracked window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl WindowGeometry {
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// One tracked top-level window.
#[derive(Debug, Clone)]
pub struct WindowTarget {
    pub window_id: String,
    pub app_name: String,
    pub title: String,
    pub handle: NodeHandle,
    pub geometry: Option<WindowGeometry>,
    pub is_active: bool,
    pub last_seen: Instant,
}

impl WindowTarget {
    fn summary(&self) -> WindowSummary {
        WindowSummary {
            window_id: self.window_id.clone(),
            app_name: self.app_name.clone(),
            title: self.title.clone(),
            geometry: self.geometry,
            is_active: self.is_active,
        }
    }
}

/// Serializable view of a tracked window.
#[derive(Debug, Clone, Serialize)]
pub struct WindowSummary {
    pub window_id: String,
    pub app_name: String,
    pub title: String,
    pub geometry: Option<WindowGeometry>,
    pub is_active: bool,
}

/// Serializable view of one group.
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub group_id: String,
    pub name: Option<String>,
    pub color: GroupColor,
    pub windows: Vec<WindowSummary>,
    pub is_active: bool,
}

/// The read-only introspection surface over all groups.
#[derive(Debug, Clone, Serialize)]
pub struct ContextSummary {
    pub groups: Vec<GroupSummary>,
    pub active_group_id: Option<String>,
}

/// Discovery facts for a window about to be targeted.
#[derive(Debug, Clone)]
pub struct NewTarget {
    pub app_name: String,
    pub title: String,
    pub handle: NodeHandle,
    pub geometry: Option<WindowGeometry>,
}

/// Predicate applied to top-level windows during traversal.
#[derive(Debug, Clone)]
pub enum WindowFilter {
    /// Unscoped mode: accept every window.
    All,
    /// Accept windows of one application by name (case-insensitive).
    Application(String),
    /// Accept a fixed set of windows by provider key.
    Windows(HashSet<u64>),
}

impl WindowFilter {
    pub fn accepts(&self, window_key: u64, app_name: &str) -> bool {
        match self {
            WindowFilter::All => true,
            WindowFilter::Application(wanted) => app_name.eq_ignore_ascii_case(wanted),
            WindowFilter::Windows(keys) => keys.contains(&window_key),
        }
    }
}

struct WindowGroup {
    group_id: String,
    name: Option<String>,
    color: GroupColor,
    windows: Vec<WindowTarget>,
    active_window_id: Option<String>,
}

impl WindowGroup {
    /// The first window added becomes the group's active window.
    fn add(&mut self, mut target: WindowTarget) {
        target.is_active = self.windows.is_empty();
        if target.is_active {
            self.active_window_id = Some(target.window_id.clone());
        }
        self.windows.push(target);
    }

    /// Removing the active window promotes the first remaining member.
    fn remove(&mut self, window_id: &str) -> Option<WindowTarget> {
        let index = self.windows.iter().position(|t| t.window_id == window_id)?;
        let removed = self.windows.remove(index);
        if self.active_window_id.as_deref() == Some(window_id) {
            self.active_window_id = self.windows.first().map(|t| t.window_id.clone());
            if let Some(next) = self.windows.first_mut() {
                next.is_active = true;
            }
        }
        Some(removed)
    }

    fn set_active(&mut self, window_id: &str) -> bool {
        if !self.windows.iter().any(|t| t.window_id == window_id) {
            return false;
        }
        for target in &mut self.windows {
            target.is_active = target.window_id == window_id;
        }
        self.active_window_id = Some(window_id.to_string());
        true
    }

    fn active_window(&self) -> Option<&WindowTarget> {
        let id = self.active_window_id.as_deref()?;
        self.windows.iter().find(|t| t.window_id == id)
    }

    fn summary(&self, is_active: bool) -> GroupSummary {
        GroupSummary {
            group_id: self.group_id.clone(),
            name: self.name.clone(),
            color: self.color,
            windows: self.windows.iter().map(WindowTarget::summary).collect(),
            is_active,
        }
    }
}

#[derive(Default)]
struct State {
    groups: Vec<WindowGroup>,
    active_group_id: Option<String>,
    group_counter: u64,
    window_counter: u64,
}

impl State {
    fn group_mut(&mut self, group_id: &str) -> Option<&mut WindowGroup> {
        self.groups.iter_mut().find(|g| g.group_id == group_id)
    }

    fn group_position(&self, group_id: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.group_id == group_id)
    }

    /// Apply the emptied-group policy after a removal. Returns the id of a
    /// group that was auto-deleted, if any.
    fn apply_empty_policy(&mut self, group_id: &str, auto_delete: bool) -> Option<String> {
        if !auto_delete {
            return None;
        }
        let index = self.group_position(group_id)?;
        if !self.groups[index].windows.is_empty() {
            return None;
        }
        self.groups.remove(index);
        if self.active_group_id.as_deref() == Some(group_id) {
            self.active_group_id = self.groups.first().map(|g| g.group_id.clone());
        }
        Some(group_id.to_string())
    }
}

/// Process-scoped registry of window groups and their targets.
pub struct WindowGroupManager {
    state: Mutex<State>,
    auto_delete_empty: bool,
}

impl WindowGroupManager {
    pub fn new(auto_delete_empty: bool) -> Self {
        Self {
            state: Mutex::new(State::default()),
            auto_delete_empty,
        }
    }

    /// Create a group. The first group created becomes the active one.
    pub fn create_group(&self, name: Option<&str>, color: GroupColor) -> GroupSummary {
        let mut state = self.state.lock().unwrap();
        state.group_counter += 1;
        let group_id = format!("group_{}", state.group_counter);
        let group = WindowGroup {
            group_id: group_id.clone(),
            name: name.map(str::to_string),
            color,
            windows: Vec::new(),
            active_window_id: None,
        };
        if state.active_group_id.is_none() {
            state.active_group_id = Some(group_id.clone());
        }
        info!(%group_id, color = color.name(), "created window group");
        let is_active = state.active_group_id.as_deref() == Some(group_id.as_str());
        state.groups.push(group);
        state.groups.last().unwrap().summary(is_active)
    }

    pub fn set_active_group(&self, group_id: &str) -> Result<(), AutomationError> {
        let mut state = self.state.lock().unwrap();
        if state.group_position(group_id).is_none() {
            return Err(AutomationError::GroupNotFound(group_id.to_string()));
        }
        state.active_group_id = Some(group_id.to_string());
        Ok(())
    }

    /// Delete a group outright. Deleting the active group promotes the first
    /// remaining one.
    pub fn delete_group(&self, group_id: &str) -> Result<GroupSummary, AutomationError> {
        let mut state = self.state.lock().unwrap();
        let index = state
            .group_position(group_id)
            .ok_or_else(|| AutomationError::GroupNotFound(group_id.to_string()))?;
        let was_active = state.active_group_id.as_deref() == Some(group_id);
        let group = state.groups.remove(index);
        if was_active {
            state.active_group_id = state.groups.first().map(|g| g.group_id.clone());
        }
        info!(group_id, "deleted window group");
        Ok(group.summary(was_active))
    }

    /// Existence is answered by id: an empty group still resolves here, with
    /// a zero-length member list.
    pub fn group(&self, group_id: &str) -> Result<GroupSummary, AutomationError> {
        let state = self.state.lock().unwrap();
        let is_active = state.active_group_id.as_deref() == Some(group_id);
        state
            .groups
            .iter()
            .find(|g| g.group_id == group_id)
            .map(|g| g.summary(is_active))
            .ok_or_else(|| AutomationError::GroupNotFound(group_id.to_string()))
    }

    /// Add or move a window into a group, creating the group if absent.
    ///
    /// `group` may be a group id, a group name, or `None` for the active
    /// group (created on demand). A window already tracked anywhere keeps its
    /// window id but leaves its previous group — membership is exclusive.
    pub fn target(
        &self,
        window: NewTarget,
        group: Option<&str>,
        color: GroupColor,
    ) -> Result<(GroupSummary, WindowSummary), AutomationError> {
        let mut state = self.state.lock().unwrap();

        let destination_id = match group {
            Some(wanted) => {
                let found = state
                    .groups
                    .iter()
                    .find(|g| g.group_id == wanted || g.name.as_deref() == Some(wanted))
                    .map(|g| g.group_id.clone());
                match found {
                    Some(id) => id,
                    None => {
                        state.group_counter += 1;
                        let group_id = format!("group_{}", state.group_counter);
                        state.groups.push(WindowGroup {
                            group_id: group_id.clone(),
                            name: Some(wanted.to_string()),
                            color,
                            windows: Vec::new(),
                            active_window_id: None,
                        });
                        if state.active_group_id.is_none() {
                            state.active_group_id = Some(group_id.clone());
                        }
                        info!(%group_id, name = wanted, "created window group for target");
                        group_id
                    }
                }
            }
            None => match state.active_group_id.clone() {
                Some(id) => id,
                None => {
                    state.group_counter += 1;
                    let group_id = format!("group_{}", state.group_counter);
                    state.groups.push(WindowGroup {
                        group_id: group_id.clone(),
                        name: None,
                        color,
                        windows: Vec::new(),
                        active_window_id: None,
                    });
                    state.active_group_id = Some(group_id.clone());
                    group_id
                }
            },
        };

        // Exclusive membership: pull the window out of whatever group holds
        // it, keeping its id stable across the move.
        let key = window.handle.key();
        let mut window_id = None;
        let mut emptied_group = None;
        for group in &mut state.groups {
            if let Some(index) = group.windows.iter().position(|t| t.handle.key() == key) {
                let existing = group.windows[index].window_id.clone();
                group.remove(&existing);
                debug!(
                    window_id = %existing,
                    from_group = %group.group_id,
                    "moving window between groups"
                );
                if group.windows.is_empty() && group.group_id != destination_id {
                    emptied_group = Some(group.group_id.clone());
                }
                window_id = Some(existing);
                break;
            }
        }
        if let Some(emptied) = emptied_group {
            state.apply_empty_policy(&emptied, self.auto_delete_empty);
        }

        let window_id = window_id.unwrap_or_else(|| {
            state.window_counter += 1;
            format!("win_{}", state.window_counter)
        });

        let target = WindowTarget {
            window_id: window_id.clone(),
            app_name: window.app_name,
            title: window.title,
            handle: window.handle,
            geometry: window.geometry,
            is_active: false,
            last_seen: Instant::now(),
        };

        let is_active_group = state.active_group_id.as_deref() == Some(destination_id.as_str());
        let destination = state
            .group_mut(&destination_id)
            .expect("destination group exists");
        destination.add(target);
        let group_summary = destination.summary(is_active_group);
        let window_summary = destination
            .windows
            .iter()
            .find(|t| t.window_id == window_id)
            .map(WindowTarget::summary)
            .expect("window just added");
        info!(%window_id, group_id = %destination_id, "targeted window");
        Ok((group_summary, window_summary))
    }

    /// Release one window from tracking. Returns the owning group id and the
    /// released target.
    pub fn release(&self, window_id: &str) -> Result<(String, WindowTarget), AutomationError> {
        let mut state = self.state.lock().unwrap();
        let mut released = None;
        for group in &mut state.groups {
            if let Some(target) = group.remove(window_id) {
                released = Some((group.group_id.clone(), target));
                break;
            }
        }
        let (group_id, target) =
            released.ok_or_else(|| AutomationError::WindowNotFound(window_id.to_string()))?;
        state.apply_empty_policy(&group_id, self.auto_delete_empty);
        info!(window_id, group_id = %group_id, "released window");
        Ok((group_id, target))
    }

    /// Release every tracked window. Returns the released targets.
    pub fn release_all(&self) -> Vec<WindowTarget> {
        let mut state = self.state.lock().unwrap();
        let mut released = Vec::new();
        let group_ids: Vec<String> = state.groups.iter().map(|g| g.group_id.clone()).collect();
        for group_id in group_ids {
            if let Some(group) = state.group_mut(&group_id) {
                released.append(&mut group.windows);
                group.active_window_id = None;
            }
            state.apply_empty_policy(&group_id, self.auto_delete_empty);
        }
        info!(count = released.len(), "released all windows");
        released
    }

    pub fn find_window(&self, window_id: &str) -> Option<(String, WindowSummary)> {
        let state = self.state.lock().unwrap();
        for group in &state.groups {
            if let Some(target) = group.windows.iter().find(|t| t.window_id == window_id) {
                return Some((group.group_id.clone(), target.summary()));
            }
        }
        None
    }

    /// Switch the active window inside whichever group holds `window_id`.
    pub fn set_active_window(&self, window_id: &str) -> Result<WindowSummary, AutomationError> {
        let mut state = self.state.lock().unwrap();
        for group in &mut state.groups {
            if group.set_active(window_id) {
                let summary = group
                    .windows
                    .iter()
                    .find(|t| t.window_id == window_id)
                    .map(WindowTarget::summary)
                    .expect("window just activated");
                return Ok(summary);
            }
        }
        Err(AutomationError::WindowNotFound(window_id.to_string()))
    }

    /// Targets of the active group whose liveness a snapshot must confirm.
    pub fn active_group_targets(&self) -> Vec<WindowTarget> {
        let state = self.state.lock().unwrap();
        let Some(active_id) = state.active_group_id.as_deref() else {
            return Vec::new();
        };
        state
            .groups
            .iter()
            .find(|g| g.group_id == active_id)
            .map(|g| g.windows.clone())
            .unwrap_or_default()
    }

    /// Drop windows confirmed gone. Terminal: they leave their group and are
    /// no longer tracked. Returns the ids actually removed.
    pub fn remove_gone(&self, window_ids: &[String]) -> Vec<String> {
        let mut state = self.state.lock().unwrap();
        let mut removed = Vec::new();
        for window_id in window_ids {
            let mut owner = None;
            for group in &mut state.groups {
                if group.remove(window_id).is_some() {
                    owner = Some(group.group_id.clone());
                    break;
                }
            }
            if let Some(group_id) = owner {
                debug!(window_id = %window_id, group_id = %group_id, "pruned closed window");
                state.apply_empty_policy(&group_id, self.auto_delete_empty);
                removed.push(window_id.clone());
            }
        }
        removed
    }

    /// The predicate snapshots apply to top-level windows.
    ///
    /// When a group is active and non-empty, only its windows are accepted —
    /// narrowed further to the group's active window when one is set. With no
    /// active group (or an empty one) the filter is unscoped.
    pub fn active_filter(&self) -> WindowFilter {
        let state = self.state.lock().unwrap();
        let Some(active_id) = state.active_group_id.as_deref() else {
            return WindowFilter::All;
        };
        let Some(group) = state.groups.iter().find(|g| g.group_id == active_id) else {
            return WindowFilter::All;
        };
        if group.windows.is_empty() {
            return WindowFilter::All;
        }
        let keys = match group.active_window() {
            Some(active) => HashSet::from([active.handle.key()]),
            None => group.windows.iter().map(|t| t.handle.key()).collect(),
        };
        WindowFilter::Windows(keys)
    }

    pub fn list_context(&self) -> ContextSummary {
        let state = self.state.lock().unwrap();
        ContextSummary {
            groups: state
                .groups
                .iter()
                .map(|g| g.summary(state.active_group_id.as_deref() == Some(g.group_id.as_str())))
                .collect(),
            active_group_id: state.active_group_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_target(key: u64, app: &str, title: &str) -> NewTarget {
        NewTarget {
            app_name: app.to_string(),
            title: title.to_string(),
            handle: NodeHandle::new(key, ()),
            geometry: Some(WindowGeometry {
                x: 0,
                y: 0,
                width: 800,
                height: 600,
            }),
        }
    }

    #[test]
    fn color_parsing_defaults_to_blue() {
        assert_eq!(GroupColor::from_name("RED"), GroupColor::Red);
        assert_eq!(GroupColor::from_name("magenta"), GroupColor::Blue);
        assert_eq!(GroupColor::from_name(""), GroupColor::Blue);
    }

    #[test]
    fn color_rgb_channels() {
        let (r, g, b) = GroupColor::Red.to_rgb();
        assert!(r > 0.8);
        assert!(g < 0.3);
        assert!(b < 0.3);
        for color in [
            GroupColor::Blue,
            GroupColor::Purple,
            GroupColor::Green,
            GroupColor::Orange,
            GroupColor::Red,
            GroupColor::Cyan,
        ] {
            assert!(color.hex().starts_with('#'));
            assert_eq!(color.hex().len(), 7);
        }
    }

    #[test]
    fn geometry_validity() {
        assert!(WindowGeometry {
            x: 0,
            y: 0,
            width: 800,
            height: 600
        }
        .is_valid());
        assert!(!WindowGeometry {
            x: 0,
            y: 0,
            width: 0,
            height: 600
        }
        .is_valid());
    }

    #[test]
    fn first_group_becomes_active() {
        let manager = WindowGroupManager::new(false);
        let first = manager.create_group(Some("first"), GroupColor::Blue);
        let second = manager.create_group(Some("second"), GroupColor::Red);
        assert!(first.is_active);
        assert!(!second.is_active);
        assert_eq!(
            manager.list_context().active_group_id.as_deref(),
            Some(first.group_id.as_str())
        );
    }

    #[test]
    fn first_window_becomes_group_active() {
        let manager = WindowGroupManager::new(false);
        let (_, w1) = manager
            .target(new_target(1, "Firefox", "GitHub"), None, GroupColor::Blue)
            .unwrap();
        let (group, w2) = manager
            .target(new_target(2, "Firefox", "Docs"), None, GroupColor::Blue)
            .unwrap();
        assert!(w1.is_active);
        assert!(!w2.is_active);
        assert_eq!(group.windows.len(), 2);
    }

    #[test]
    fn removing_active_window_promotes_next() {
        let manager = WindowGroupManager::new(false);
        let (_, w1) = manager
            .target(new_target(1, "A", "one"), None, GroupColor::Blue)
            .unwrap();
        manager
            .target(new_target(2, "A", "two"), None, GroupColor::Blue)
            .unwrap();
        manager.release(&w1.window_id).unwrap();

        let context = manager.list_context();
        let group = &context.groups[0];
        assert_eq!(group.windows.len(), 1);
        assert!(group.windows[0].is_active);
    }

    #[test]
    fn retargeting_moves_membership() {
        let manager = WindowGroupManager::new(false);
        let (group_a, window) = manager
            .target(new_target(1, "A", "one"), Some("A"), GroupColor::Blue)
            .unwrap();
        let (group_b, moved) = manager
            .target(new_target(1, "A", "one"), Some("B"), GroupColor::Red)
            .unwrap();

        assert_eq!(window.window_id, moved.window_id);
        let a = manager.group(&group_a.group_id).unwrap();
        let b = manager.group(&group_b.group_id).unwrap();
        assert!(a.windows.is_empty());
        assert_eq!(b.windows.len(), 1);
    }

    #[test]
    fn empty_group_is_not_absent() {
        let manager = WindowGroupManager::new(false);
        let (group, window) = manager
            .target(new_target(1, "A", "one"), Some("A"), GroupColor::Blue)
            .unwrap();
        manager.release(&window.window_id).unwrap();

        let looked_up = manager.group(&group.group_id).unwrap();
        assert!(looked_up.windows.is_empty());

        assert!(matches!(
            manager.group("group_999"),
            Err(AutomationError::GroupNotFound(_))
        ));
    }

    #[test]
    fn auto_delete_policy_removes_emptied_group() {
        let manager = WindowGroupManager::new(true);
        let (group, window) = manager
            .target(new_target(1, "A", "one"), Some("A"), GroupColor::Blue)
            .unwrap();
        manager.release(&window.window_id).unwrap();
        assert!(matches!(
            manager.group(&group.group_id),
            Err(AutomationError::GroupNotFound(_))
        ));
    }

    #[test]
    fn delete_active_group_promotes_remaining() {
        let manager = WindowGroupManager::new(false);
        let first = manager.create_group(Some("first"), GroupColor::Blue);
        let second = manager.create_group(Some("second"), GroupColor::Red);
        manager.delete_group(&first.group_id).unwrap();
        assert_eq!(
            manager.list_context().active_group_id.as_deref(),
            Some(second.group_id.as_str())
        );
    }

    #[test]
    fn release_all_empties_every_group() {
        let manager = WindowGroupManager::new(false);
        manager
            .target(new_target(1, "A", "one"), Some("A"), GroupColor::Blue)
            .unwrap();
        manager
            .target(new_target(2, "B", "two"), Some("B"), GroupColor::Red)
            .unwrap();
        let released = manager.release_all();
        assert_eq!(released.len(), 2);
        assert!(manager
            .list_context()
            .groups
            .iter()
            .all(|g| g.windows.is_empty()));
    }

    #[test]
    fn filter_unscoped_without_groups() {
        let manager = WindowGroupManager::new(false);
        assert!(matches!(manager.active_filter(), WindowFilter::All));
        assert!(WindowFilter::All.accepts(99, "anything"));
    }

    #[test]
    fn filter_scopes_to_active_window() {
        let manager = WindowGroupManager::new(false);
        manager
            .target(new_target(1, "A", "one"), None, GroupColor::Blue)
            .unwrap();
        manager
            .target(new_target(2, "A", "two"), None, GroupColor::Blue)
            .unwrap();

        // First window is the group's active window, so the filter narrows
        // to it alone.
        let filter = manager.active_filter();
        assert!(filter.accepts(1, "A"));
        assert!(!filter.accepts(2, "A"));
    }

    #[test]
    fn remove_gone_is_terminal() {
        let manager = WindowGroupManager::new(false);
        let (_, window) = manager
            .target(new_target(1, "A", "one"), None, GroupColor::Blue)
            .unwrap();
        let removed = manager.remove_gone(&[window.window_id.clone()]);
        assert_eq!(removed, vec![window.window_id.clone()]);
        assert!(manager.find_window(&window.window_id).is_none());
        // A second prune of the same id is a no-op.
        assert!(manager.remove_gone(&[window.window_id]).is_empty());
    }

    #[test]
    fn set_active_window_switches() {
        let manager = WindowGroupManager::new(false);
        manager
            .target(new_target(1, "A", "one"), None, GroupColor::Blue)
            .unwrap();
        let (_, w2) = manager
            .target(new_target(2, "A", "two"), None, GroupColor::Blue)
            .unwrap();
        let switched = manager.set_active_window(&w2.window_id).unwrap();
        assert!(switched.is_active);
        let filter = manager.active_filter();
        assert!(filter.accepts(2, "A"));
        assert!(!filter.accepts(1, "A"));
    }
}
