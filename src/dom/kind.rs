//! Component kinds and their structural rules.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::layout::GridDefaults;

/// The kind of a component node.
///
/// Container kinds may own children; leaf kinds may not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    // Containers
    Window,
    Box,
    Grid,
    Frame,
    Scrolled,
    // Leaves
    Label,
    Button,
    Entry,
    TextView,
    CheckButton,
    Switch,
    Scale,
    SpinButton,
    ComboBox,
    ProgressBar,
    Image,
    Separator,
}

/// What a bound value means for a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Displayed or edited text.
    Text,
    /// A checked/active flag.
    Flag,
    /// A number inside a range.
    Number,
    /// The selected item of a list.
    Choice,
}

impl Kind {
    /// Every kind, containers first.
    pub const ALL: [Kind; 17] = [
        Kind::Window,
        Kind::Box,
        Kind::Grid,
        Kind::Frame,
        Kind::Scrolled,
        Kind::Label,
        Kind::Button,
        Kind::Entry,
        Kind::TextView,
        Kind::CheckButton,
        Kind::Switch,
        Kind::Scale,
        Kind::SpinButton,
        Kind::ComboBox,
        Kind::ProgressBar,
        Kind::Image,
        Kind::Separator,
    ];

    /// Type name, as used in diagnostics and tree dumps.
    pub fn name(self) -> &'static str {
        match self {
            Kind::Window => "Window",
            Kind::Box => "Box",
            Kind::Grid => "Grid",
            Kind::Frame => "Frame",
            Kind::Scrolled => "Scrolled",
            Kind::Label => "Label",
            Kind::Button => "Button",
            Kind::Entry => "Entry",
            Kind::TextView => "TextView",
            Kind::CheckButton => "CheckButton",
            Kind::Switch => "Switch",
            Kind::Scale => "Scale",
            Kind::SpinButton => "SpinButton",
            Kind::ComboBox => "ComboBox",
            Kind::ProgressBar => "ProgressBar",
            Kind::Image => "Image",
            Kind::Separator => "Separator",
        }
    }

    /// Whether nodes of this kind may own children.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            Kind::Window | Kind::Box | Kind::Grid | Kind::Frame | Kind::Scrolled
        )
    }

    /// Upper bound on children, `None` when unbounded. Leaves allow zero.
    pub fn max_children(self) -> Option<usize> {
        match self {
            Kind::Window | Kind::Frame | Kind::Scrolled => Some(1),
            Kind::Box | Kind::Grid => None,
            _ => Some(0),
        }
    }

    /// The meaning of a bound value, or `None` if the control has no value.
    pub fn value_kind(self) -> Option<ValueKind> {
        match self {
            Kind::Label | Kind::Entry | Kind::TextView => Some(ValueKind::Text),
            Kind::CheckButton | Kind::Switch => Some(ValueKind::Flag),
            Kind::Scale | Kind::SpinButton | Kind::ProgressBar => Some(ValueKind::Number),
            Kind::ComboBox => Some(ValueKind::Choice),
            _ => None,
        }
    }

    /// Whether the user can change this control's value (and thus emit
    /// value-carrying `change` events).
    pub fn is_editable(self) -> bool {
        !matches!(self, Kind::Label | Kind::ProgressBar) && self.value_kind().is_some()
    }

    /// Alignment and expansion a child of this kind gets when placed in a
    /// grid without explicit overrides.
    pub fn grid_defaults(self) -> GridDefaults {
        crate::layout::grid_defaults(self)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containers_and_leaves() {
        let containers: Vec<Kind> = Kind::ALL.into_iter().filter(|k| k.is_container()).collect();
        assert_eq!(
            containers,
            vec![Kind::Window, Kind::Box, Kind::Grid, Kind::Frame, Kind::Scrolled]
        );
        assert!(!Kind::Button.is_container());
    }

    #[test]
    fn leaves_allow_no_children() {
        for kind in Kind::ALL {
            if !kind.is_container() {
                assert_eq!(kind.max_children(), Some(0), "{kind}");
            }
        }
    }

    #[test]
    fn single_child_containers() {
        assert_eq!(Kind::Window.max_children(), Some(1));
        assert_eq!(Kind::Scrolled.max_children(), Some(1));
        assert_eq!(Kind::Grid.max_children(), None);
    }

    #[test]
    fn value_kinds() {
        assert_eq!(Kind::Entry.value_kind(), Some(ValueKind::Text));
        assert_eq!(Kind::Switch.value_kind(), Some(ValueKind::Flag));
        assert_eq!(Kind::Scale.value_kind(), Some(ValueKind::Number));
        assert_eq!(Kind::ComboBox.value_kind(), Some(ValueKind::Choice));
        assert_eq!(Kind::Button.value_kind(), None);
        assert_eq!(Kind::Grid.value_kind(), None);
    }

    #[test]
    fn display_only_controls_are_not_editable() {
        assert!(!Kind::Label.is_editable());
        assert!(!Kind::ProgressBar.is_editable());
        assert!(Kind::Entry.is_editable());
    }

    #[test]
    fn grid_defaults_come_from_the_table() {
        assert!(Kind::TextView.grid_defaults().v_expand);
        assert!(!Kind::Label.grid_defaults().h_expand);
    }

    #[test]
    fn serde_names_are_snake_case() {
        let kind: Kind = serde_json::from_value(serde_json::json!("check_button")).unwrap();
        assert_eq!(kind, Kind::CheckButton);
    }
}
