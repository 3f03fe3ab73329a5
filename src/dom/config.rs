//! Typed per-kind configuration with an escape-hatch option map.
//!
//! [`Config`] holds three layers: [`Common`] properties every control has,
//! a [`Props`] tagged union carrying one typed struct per [`Kind`], and a free
//! `options` map for custom properties the typed layer does not know.
//!
//! String-keyed access ([`Config::set`], [`Config::get`]) goes through serde:
//! a typed struct is serialized to a map, the key is replaced, and the map is
//! deserialized back, so a wrongly typed value is rejected rather than coerced.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::kind::Kind;
use crate::error::{Error, Result};
use crate::state::Map;

/// Layout direction for boxes, scales, and separators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    #[default]
    Vertical,
}

// ---------------------------------------------------------------------------
// Common
// ---------------------------------------------------------------------------

/// Properties shared by every kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Common {
    pub visible: bool,
    pub sensitive: bool,
    pub tooltip: Option<String>,
    pub width_request: Option<u32>,
    pub height_request: Option<u32>,
    pub css_classes: Vec<String>,
}

impl Default for Common {
    fn default() -> Self {
        Self {
            visible: true,
            sensitive: true,
            tooltip: None,
            width_request: None,
            height_request: None,
            css_classes: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Per-kind props
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowProps {
    pub title: String,
    pub default_width: Option<u32>,
    pub default_height: Option<u32>,
    pub resizable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxProps {
    pub orientation: Orientation,
    pub spacing: u32,
    pub homogeneous: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridProps {
    pub row_spacing: u32,
    pub column_spacing: u32,
    pub row_homogeneous: bool,
    pub column_homogeneous: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameProps {
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrolledProps {
    pub min_content_width: Option<u32>,
    pub min_content_height: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelProps {
    pub text: String,
    pub wrap: bool,
    pub selectable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ButtonProps {
    pub label: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryProps {
    pub text: String,
    pub placeholder: Option<String>,
    /// `false` masks the text (password entry).
    pub visibility: bool,
    pub max_length: Option<u32>,
    pub editable: bool,
}

impl Default for EntryProps {
    fn default() -> Self {
        Self {
            text: String::new(),
            placeholder: None,
            visibility: true,
            max_length: None,
            editable: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextViewProps {
    pub text: String,
    pub editable: bool,
    pub wrap: bool,
    pub monospace: bool,
}

impl Default for TextViewProps {
    fn default() -> Self {
        Self {
            text: String::new(),
            editable: true,
            wrap: true,
            monospace: false,
        }
    }
}

/// Props of check buttons and switches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToggleProps {
    pub label: Option<String>,
    pub active: bool,
}

/// Props of scales and spin buttons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeProps {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub value: f64,
    pub digits: u32,
    pub orientation: Orientation,
}

impl Default for RangeProps {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
            step: 1.0,
            value: 0.0,
            digits: 0,
            orientation: Orientation::Horizontal,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChoiceProps {
    pub items: Vec<String>,
    pub selected: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressProps {
    pub fraction: f64,
    pub text: Option<String>,
    pub show_text: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageProps {
    pub icon: Option<String>,
    pub file: Option<String>,
    pub pixel_size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeparatorProps {
    pub orientation: Orientation,
}

impl Default for SeparatorProps {
    fn default() -> Self {
        Self {
            orientation: Orientation::Horizontal,
        }
    }
}

/// Typed props, one variant per [`Kind`].
#[derive(Debug, Clone, PartialEq)]
pub enum Props {
    Window(WindowProps),
    Box(BoxProps),
    Grid(GridProps),
    Frame(FrameProps),
    Scrolled(ScrolledProps),
    Label(LabelProps),
    Button(ButtonProps),
    Entry(EntryProps),
    TextView(TextViewProps),
    CheckButton(ToggleProps),
    Switch(ToggleProps),
    Scale(RangeProps),
    SpinButton(RangeProps),
    ComboBox(ChoiceProps),
    ProgressBar(ProgressProps),
    Image(ImageProps),
    Separator(SeparatorProps),
}

/// Apply `$body` to the inner struct of whichever variant `$props` holds.
macro_rules! with_props {
    ($props:expr, $p:ident => $body:expr) => {
        match $props {
            Props::Window($p) => $body,
            Props::Box($p) => $body,
            Props::Grid($p) => $body,
            Props::Frame($p) => $body,
            Props::Scrolled($p) => $body,
            Props::Label($p) => $body,
            Props::Button($p) => $body,
            Props::Entry($p) => $body,
            Props::TextView($p) => $body,
            Props::CheckButton($p) => $body,
            Props::Switch($p) => $body,
            Props::Scale($p) => $body,
            Props::SpinButton($p) => $body,
            Props::ComboBox($p) => $body,
            Props::ProgressBar($p) => $body,
            Props::Image($p) => $body,
            Props::Separator($p) => $body,
        }
    };
}

impl Props {
    /// Default props for `kind`.
    pub fn defaults(kind: Kind) -> Self {
        match kind {
            Kind::Window => Props::Window(WindowProps {
                resizable: true,
                ..WindowProps::default()
            }),
            Kind::Box => Props::Box(BoxProps::default()),
            Kind::Grid => Props::Grid(GridProps::default()),
            Kind::Frame => Props::Frame(FrameProps::default()),
            Kind::Scrolled => Props::Scrolled(ScrolledProps::default()),
            Kind::Label => Props::Label(LabelProps::default()),
            Kind::Button => Props::Button(ButtonProps::default()),
            Kind::Entry => Props::Entry(EntryProps::default()),
            Kind::TextView => Props::TextView(TextViewProps::default()),
            Kind::CheckButton => Props::CheckButton(ToggleProps::default()),
            Kind::Switch => Props::Switch(ToggleProps::default()),
            Kind::Scale => Props::Scale(RangeProps::default()),
            Kind::SpinButton => Props::SpinButton(RangeProps::default()),
            Kind::ComboBox => Props::ComboBox(ChoiceProps::default()),
            Kind::ProgressBar => Props::ProgressBar(ProgressProps::default()),
            Kind::Image => Props::Image(ImageProps::default()),
            Kind::Separator => Props::Separator(SeparatorProps::default()),
        }
    }

    /// The kind these props belong to.
    pub fn kind(&self) -> Kind {
        match self {
            Props::Window(_) => Kind::Window,
            Props::Box(_) => Kind::Box,
            Props::Grid(_) => Kind::Grid,
            Props::Frame(_) => Kind::Frame,
            Props::Scrolled(_) => Kind::Scrolled,
            Props::Label(_) => Kind::Label,
            Props::Button(_) => Kind::Button,
            Props::Entry(_) => Kind::Entry,
            Props::TextView(_) => Kind::TextView,
            Props::CheckButton(_) => Kind::CheckButton,
            Props::Switch(_) => Kind::Switch,
            Props::Scale(_) => Kind::Scale,
            Props::SpinButton(_) => Kind::SpinButton,
            Props::ComboBox(_) => Kind::ComboBox,
            Props::ProgressBar(_) => Kind::ProgressBar,
            Props::Image(_) => Kind::Image,
            Props::Separator(_) => Kind::Separator,
        }
    }

    /// The props as a string-keyed map.
    pub fn to_map(&self) -> Map {
        with_props!(self, p => to_map(p))
    }

    fn apply(&mut self, key: &str, value: Value) -> Result<bool> {
        let kind = self.kind();
        with_props!(self, p => merge_key(p, kind, key, value))
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Full configuration of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub common: Common,
    pub props: Props,
    pub options: Map,
}

impl Config {
    /// Defaults for `kind`.
    pub fn defaults(kind: Kind) -> Self {
        Self {
            common: Common::default(),
            props: Props::defaults(kind),
            options: Map::new(),
        }
    }

    /// Defaults for `kind` with `overrides` applied through [`set`](Self::set).
    pub fn with_overrides(kind: Kind, overrides: Map) -> Result<Self> {
        let mut config = Self::defaults(kind);
        for (key, value) in overrides {
            config.set(&key, value)?;
        }
        Ok(config)
    }

    pub fn kind(&self) -> Kind {
        self.props.kind()
    }

    /// Set a property by name.
    ///
    /// Known keys are written to the typed layers (a type mismatch is a
    /// configuration error); unknown keys land in `options`.
    pub fn set(&mut self, key: &str, value: Value) -> Result<()> {
        if !self.apply_known(key, value.clone())? {
            self.options.insert(key.to_owned(), value);
        }
        Ok(())
    }

    /// Set a property that must be known to this kind.
    pub fn set_known(&mut self, key: &str, value: Value) -> Result<()> {
        if self.apply_known(key, value)? {
            Ok(())
        } else {
            Err(Error::configuration(
                self.kind(),
                format!("no property named {key:?}"),
            ))
        }
    }

    fn apply_known(&mut self, key: &str, value: Value) -> Result<bool> {
        let kind = self.kind();
        if merge_key(&mut self.common, kind, key, value.clone())? {
            return Ok(true);
        }
        self.props.apply(key, value)
    }

    /// Read a property by name from the typed layers or `options`.
    pub fn get(&self, key: &str) -> Option<Value> {
        to_map(&self.common)
            .remove(key)
            .or_else(|| self.props.to_map().remove(key))
            .or_else(|| self.options.get(key).cloned())
    }

    /// The property that carries the control's value, for bindable kinds.
    pub fn value_property(&self) -> Option<&'static str> {
        match self.props {
            Props::Label(_) | Props::Entry(_) | Props::TextView(_) => Some("text"),
            Props::CheckButton(_) | Props::Switch(_) => Some("active"),
            Props::Scale(_) | Props::SpinButton(_) => Some("value"),
            Props::ComboBox(_) => Some("selected"),
            Props::ProgressBar(_) => Some("fraction"),
            _ => None,
        }
    }

    /// The control's configured value, if the kind has one.
    pub fn value(&self) -> Option<Value> {
        self.value_property().and_then(|key| self.get(key))
    }

    /// Flatten all layers into one map (common, then props, then options).
    pub fn to_map(&self) -> Map {
        let mut map = to_map(&self.common);
        map.extend(self.props.to_map());
        for (key, value) in &self.options {
            map.insert(key.clone(), value.clone());
        }
        map
    }
}

fn to_map<T: Serialize>(value: &T) -> Map {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Replace `key` on a typed struct. Returns `false` when the struct has no
/// such field.
fn merge_key<T>(target: &mut T, kind: Kind, key: &str, value: Value) -> Result<bool>
where
    T: Serialize + DeserializeOwned,
{
    let mut map = to_map(&*target);
    if !map.contains_key(key) {
        return Ok(false);
    }
    map.insert(key.to_owned(), value);
    *target = serde_json::from_value(Value::Object(map))
        .map_err(|e| Error::configuration(kind, format!("invalid value for {key:?}: {e}")))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn defaults_match_kind() {
        for kind in Kind::ALL {
            assert_eq!(Config::defaults(kind).kind(), kind);
        }
    }

    #[test]
    fn entry_defaults() {
        let config = Config::defaults(Kind::Entry);
        assert_eq!(config.get("text"), Some(json!("")));
        assert_eq!(config.get("visibility"), Some(json!(true)));
        assert_eq!(config.get("visible"), Some(json!(true)));
    }

    #[test]
    fn set_known_key_is_typed() {
        let mut config = Config::defaults(Kind::Button);
        config.set("label", json!("Save")).unwrap();
        match &config.props {
            Props::Button(p) => assert_eq!(p.label, "Save"),
            other => panic!("unexpected props {other:?}"),
        }
        assert!(config.options.is_empty());
    }

    #[test]
    fn set_common_key() {
        let mut config = Config::defaults(Kind::Label);
        config.set("sensitive", json!(false)).unwrap();
        assert!(!config.common.sensitive);
    }

    #[test]
    fn wrong_type_is_rejected() {
        let mut config = Config::defaults(Kind::Grid);
        let err = config.set("row_spacing", json!("wide")).unwrap_err();
        assert!(matches!(err, Error::Configuration { kind: Kind::Grid, .. }));
        assert_eq!(config.get("row_spacing"), Some(json!(0)));
    }

    #[test]
    fn unknown_key_goes_to_options() {
        let mut config = Config::defaults(Kind::Button);
        config.set("data-test-id", json!("save-btn")).unwrap();
        assert_eq!(config.options.get("data-test-id"), Some(&json!("save-btn")));
        assert_eq!(config.get("data-test-id"), Some(json!("save-btn")));
    }

    #[test]
    fn set_known_rejects_foreign_key() {
        let mut config = Config::defaults(Kind::Button);
        let err = config.set_known("placeholder", json!("x")).unwrap_err();
        assert!(err.to_string().contains("placeholder"));
    }

    #[test]
    fn with_overrides_merges_onto_defaults() {
        let mut overrides = Map::new();
        overrides.insert("title".into(), json!("Settings"));
        overrides.insert("default_width".into(), json!(640));
        let config = Config::with_overrides(Kind::Window, overrides).unwrap();
        assert_eq!(config.get("title"), Some(json!("Settings")));
        assert_eq!(config.get("default_width"), Some(json!(640)));
        assert_eq!(config.get("resizable"), Some(json!(true)));
    }

    #[test]
    fn orientation_parses_from_string() {
        let mut config = Config::defaults(Kind::Box);
        config.set("orientation", json!("horizontal")).unwrap();
        assert_eq!(config.get("orientation"), Some(json!("horizontal")));
    }

    #[test]
    fn value_property_per_kind() {
        assert_eq!(Config::defaults(Kind::Entry).value_property(), Some("text"));
        assert_eq!(Config::defaults(Kind::Switch).value_property(), Some("active"));
        assert_eq!(Config::defaults(Kind::Scale).value(), Some(json!(0.0)));
        assert_eq!(Config::defaults(Kind::Button).value(), None);
    }

    #[test]
    fn to_map_flattens_layers() {
        let mut config = Config::defaults(Kind::Label);
        config.set("text", json!("Hi")).unwrap();
        config.set("custom", json!(1)).unwrap();
        let map = config.to_map();
        assert_eq!(map.get("text"), Some(&json!("Hi")));
        assert_eq!(map.get("visible"), Some(&json!(true)));
        assert_eq!(map.get("custom"), Some(&json!(1)));
    }
}
