//! Common types shared by the snapshot engine, reference manager, and the
//! provider boundary.

use serde::{Deserialize, Serialize};

use crate::config::MAX_COORDINATE;

/// Semantic role of an accessibility element.
///
/// Providers report roles as free-form strings; [`ElementRole::from_raw`]
/// normalizes the common ones and parks everything else under `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementRole {
    Application,
    Frame,
    Dialog,
    Panel,
    Button,
    Entry,
    Link,
    Menu,
    MenuItem,
    Checkbox,
    RadioButton,
    ComboBox,
    List,
    ListItem,
    Tab,
    Label,
    Image,
    Other,
}

impl ElementRole {
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "application" | "app" => ElementRole::Application,
            "frame" | "window" => ElementRole::Frame,
            "dialog" | "alert" => ElementRole::Dialog,
            "panel" | "filler" | "pane" => ElementRole::Panel,
            "button" | "push_button" => ElementRole::Button,
            "entry" | "text" | "text_field" | "edit" | "textbox" | "password_text" => {
                ElementRole::Entry
            }
            "link" | "hyperlink" => ElementRole::Link,
            "menu" | "menu_bar" | "popup_menu" => ElementRole::Menu,
            "menu_item" | "check_menu_item" => ElementRole::MenuItem,
            "checkbox" | "check_box" => ElementRole::Checkbox,
            "radio_button" | "radiobutton" => ElementRole::RadioButton,
            "combo_box" | "combobox" => ElementRole::ComboBox,
            "list" | "list_box" | "tree" | "table" => ElementRole::List,
            "list_item" | "tree_item" | "table_cell" => ElementRole::ListItem,
            "tab" | "page_tab" | "page_tab_list" => ElementRole::Tab,
            "label" | "static" | "heading" => ElementRole::Label,
            "image" | "icon" => ElementRole::Image,
            _ => ElementRole::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementRole::Application => "application",
            ElementRole::Frame => "frame",
            ElementRole::Dialog => "dialog",
            ElementRole::Panel => "panel",
            ElementRole::Button => "button",
            ElementRole::Entry => "entry",
            ElementRole::Link => "link",
            ElementRole::Menu => "menu",
            ElementRole::MenuItem => "menu item",
            ElementRole::Checkbox => "checkbox",
            ElementRole::RadioButton => "radio button",
            ElementRole::ComboBox => "combo box",
            ElementRole::List => "list",
            ElementRole::ListItem => "list item",
            ElementRole::Tab => "tab",
            ElementRole::Label => "label",
            ElementRole::Image => "image",
            ElementRole::Other => "other",
        }
    }

    /// Roles that imply a click target regardless of raw flags.
    pub fn is_click_target(&self) -> bool {
        matches!(
            self,
            ElementRole::Button
                | ElementRole::Link
                | ElementRole::MenuItem
                | ElementRole::Checkbox
                | ElementRole::RadioButton
        )
    }

    /// Whether a natural-language query word names this role.
    pub fn matches_keyword(&self, word: &str) -> bool {
        let keywords: &[&str] = match self {
            ElementRole::Application => &["application", "app"],
            ElementRole::Frame => &["window", "frame"],
            ElementRole::Dialog => &["dialog", "popup"],
            ElementRole::Panel => &["panel"],
            ElementRole::Button => &["button"],
            ElementRole::Entry => &["field", "entry", "input", "textbox", "text"],
            ElementRole::Link => &["link"],
            ElementRole::Menu => &["menu"],
            ElementRole::MenuItem => &["menuitem", "item"],
            ElementRole::Checkbox => &["checkbox", "check"],
            ElementRole::RadioButton => &["radio"],
            ElementRole::ComboBox => &["combobox", "dropdown"],
            ElementRole::List => &["list", "table", "tree"],
            ElementRole::ListItem => &["item", "row", "cell"],
            ElementRole::Tab => &["tab"],
            ElementRole::Label => &["label", "heading"],
            ElementRole::Image => &["image", "icon"],
            ElementRole::Other => &[],
        };
        keywords.contains(&word)
    }
}

impl std::fmt::Display for ElementRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw state flags as reported by the accessibility service for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStates {
    pub focused: bool,
    pub enabled: bool,
    pub editable: bool,
    pub checked: bool,
    pub visible: bool,
}

impl Default for RawStates {
    fn default() -> Self {
        Self {
            focused: false,
            enabled: true,
            editable: false,
            checked: false,
            visible: true,
        }
    }
}

/// Derived semantic state of an element.
///
/// A pure function of the raw flags plus the role: see [`ElementState::derive`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementState {
    pub focused: bool,
    pub enabled: bool,
    pub editable: bool,
    pub checked: bool,
    pub visible: bool,
    pub clickable: bool,
}

impl ElementState {
    /// Compute the derived state set. Click-target roles are clickable even
    /// when the service exposes no action flags, but disabled/invisible
    /// always override role-implied clickability.
    pub fn derive(raw: RawStates, role: ElementRole) -> Self {
        Self {
            focused: raw.focused,
            enabled: raw.enabled,
            editable: raw.editable,
            checked: raw.checked,
            visible: raw.visible,
            clickable: role.is_click_target() && raw.enabled && raw.visible,
        }
    }

    /// Display labels, in the order the summary output lists them.
    pub fn labels(&self) -> Vec<&'static str> {
        let mut labels = Vec::new();
        if self.focused {
            labels.push("focused");
        }
        if !self.enabled {
            labels.push("disabled");
        }
        if !self.visible {
            labels.push("hidden");
        }
        if self.editable {
            labels.push("editable");
        }
        if self.checked {
            labels.push("checked");
        }
        if self.clickable {
            labels.push("clickable");
        }
        labels
    }

    /// Whether a query word names one of this element's states.
    pub fn matches_keyword(&self, word: &str) -> bool {
        match word {
            "focused" => self.focused,
            "disabled" => !self.enabled,
            "enabled" => self.enabled,
            "hidden" => !self.visible,
            "visible" => self.visible,
            "editable" => self.editable,
            "checked" => self.checked,
            "clickable" => self.clickable,
            _ => false,
        }
    }
}

/// Bounding rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center point, the default click location for input backends.
    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// On-screen sanity check: positive size, non-negative origin, and no
    /// coordinate past the service's 16-bit limit.
    pub fn is_valid(&self) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.width > 0
            && self.height > 0
            && self.width <= MAX_COORDINATE
            && self.height <= MAX_COORDINATE
    }

    /// Point containment, half-open on the far edges.
    pub fn contains_point(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_center() {
        let bounds = Bounds::new(100, 200, 50, 30);
        assert_eq!(bounds.center(), (125, 215));
    }

    #[test]
    fn bounds_validity() {
        assert!(Bounds::new(0, 0, 100, 100).is_valid());
        assert!(!Bounds::new(0, 0, 0, 100).is_valid());
        assert!(!Bounds::new(0, 0, 100, 0).is_valid());
        assert!(!Bounds::new(-1, 0, 100, 100).is_valid());
        assert!(!Bounds::new(0, -1, 100, 100).is_valid());
        assert!(!Bounds::new(0, 0, 70_000, 100).is_valid());
    }

    #[test]
    fn bounds_contains_point_half_open() {
        let bounds = Bounds::new(100, 100, 50, 50);
        assert!(bounds.contains_point(125, 125));
        assert!(bounds.contains_point(100, 100));
        assert!(bounds.contains_point(149, 149));
        assert!(!bounds.contains_point(150, 150));
        assert!(!bounds.contains_point(50, 50));
    }

    #[test]
    fn role_normalization() {
        assert_eq!(ElementRole::from_raw("push button"), ElementRole::Button);
        assert_eq!(ElementRole::from_raw("Text"), ElementRole::Entry);
        assert_eq!(ElementRole::from_raw("check box"), ElementRole::Checkbox);
        assert_eq!(ElementRole::from_raw("weird role"), ElementRole::Other);
    }

    #[test]
    fn clickable_implied_by_role() {
        let state = ElementState::derive(RawStates::default(), ElementRole::Button);
        assert!(state.clickable);

        let state = ElementState::derive(RawStates::default(), ElementRole::Label);
        assert!(!state.clickable);
    }

    #[test]
    fn disabled_overrides_role_clickability() {
        let raw = RawStates {
            enabled: false,
            ..Default::default()
        };
        let state = ElementState::derive(raw, ElementRole::Button);
        assert!(!state.clickable);

        let raw = RawStates {
            visible: false,
            ..Default::default()
        };
        let state = ElementState::derive(raw, ElementRole::Link);
        assert!(!state.clickable);
    }

    #[test]
    fn state_labels() {
        let raw = RawStates {
            focused: true,
            editable: true,
            ..Default::default()
        };
        let state = ElementState::derive(raw, ElementRole::Entry);
        let labels = state.labels();
        assert!(labels.contains(&"focused"));
        assert!(labels.contains(&"editable"));
        assert!(!labels.contains(&"disabled"));

        let raw = RawStates {
            enabled: false,
            visible: false,
            ..Default::default()
        };
        let labels = ElementState::derive(raw, ElementRole::Button).labels();
        assert!(labels.contains(&"disabled"));
        assert!(labels.contains(&"hidden"));
    }
}
