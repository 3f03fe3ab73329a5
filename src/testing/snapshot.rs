//! Plain-text tree dumps for snapshot tests.
//!
//! One line per node, children indented by two spaces:
//!
//! ```text
//! Window#main "Settings" [realized]
//!   Grid
//!     Label "Name" @0,0
//!     Entry#name bind=form.name @0,1 span=1x2
//! ```
//!
//! A line holds the kind, `#id` when set, the quoted caption (title, label,
//! or text) when non-empty, the binding path (with `one-way` for one-way
//! bindings), the grid cell and span for grid children, and `[realized]` once
//! a handle exists.

use std::fmt::Write;

use crate::app::Ui;
use crate::dom::kind::Kind;
use crate::dom::node::{BindingMode, NodeData, NodeId};
use crate::layout::{GridResolution, LayoutDirective};

/// Dump the subtree under `root`. Unknown roots dump as an empty string.
pub fn tree_to_string(ui: &Ui, root: NodeId) -> String {
    let mut out = String::new();
    write_node(ui, root, 0, None, &mut out);
    // Drop the final newline.
    out.pop();
    out
}

fn write_node(
    ui: &Ui,
    node: NodeId,
    depth: usize,
    directive: Option<&LayoutDirective>,
    out: &mut String,
) {
    let Some(data) = ui.get(node) else {
        return;
    };
    out.push_str(&"  ".repeat(depth));
    out.push_str(&describe(data, directive));
    out.push('\n');

    let resolution: Option<GridResolution> = match data.kind {
        Kind::Grid => ui.resolve(node).ok(),
        _ => None,
    };
    for &child in ui.dom().children(node) {
        let directive = resolution.as_ref().and_then(|r| r.directive(child));
        write_node(ui, child, depth + 1, directive, out);
    }
}

fn describe(data: &NodeData, directive: Option<&LayoutDirective>) -> String {
    let mut line = data.kind.to_string();
    if let Some(id) = &data.id {
        let _ = write!(line, "#{id}");
    }
    let caption = ["title", "label", "text"]
        .into_iter()
        .filter_map(|key| data.config.get(key))
        .find_map(|value| value.as_str().filter(|s| !s.is_empty()).map(str::to_owned));
    if let Some(caption) = caption {
        let _ = write!(line, " {caption:?}");
    }
    if let Some(binding) = &data.binding {
        let _ = write!(line, " bind={}", binding.path);
        if binding.mode == BindingMode::OneWay {
            line.push_str(" one-way");
        }
    }
    if let Some(d) = directive {
        let _ = write!(line, " @{},{}", d.row, d.col);
        if (d.rowspan, d.colspan) != (1, 1) {
            let _ = write!(line, " span={}x{}", d.rowspan, d.colspan);
        }
    }
    if data.is_realized() {
        line.push_str(" [realized]");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::HeadlessToolkit;

    #[test]
    fn dumps_form() {
        let mut ui = Ui::new(HeadlessToolkit::shared());
        let label = ui.create(Kind::Label).text("Name").unwrap().node_id();
        let entry = ui
            .create(Kind::Entry)
            .id("name")
            .unwrap()
            .bind("form.name")
            .unwrap()
            .node_id();
        let grid = ui
            .create(Kind::Grid)
            .place(label, 0, 0)
            .unwrap()
            .place(entry, 0, 1)
            .unwrap()
            .span(1, 2)
            .unwrap()
            .container()
            .node_id();
        let window = ui
            .create(Kind::Window)
            .id("main")
            .unwrap()
            .title("Settings")
            .unwrap()
            .add_child(grid)
            .unwrap()
            .node_id();
        ui.realize(window).unwrap();

        insta::assert_snapshot!(tree_to_string(&ui, window), @r#"
        Window#main "Settings" [realized]
          Grid [realized]
            Label "Name" @0,0 [realized]
            Entry#name bind=form.name @0,1 span=1x2 [realized]
        "#);
    }

    #[test]
    fn unplaced_grid_children_show_auto_cells() {
        let mut ui = Ui::new(HeadlessToolkit::shared());
        let a = ui.create(Kind::Button).label("A").unwrap().node_id();
        let b = ui.create(Kind::Switch).node_id();
        let grid = ui.create(Kind::Grid).contains([a, b]).unwrap().node_id();
        ui.bind(b, "prefs.on", BindingMode::OneWay).unwrap();
        insta::assert_snapshot!(tree_to_string(&ui, grid), @r#"
        Grid
          Button "A" @0,0
          Switch bind=prefs.on one-way @1,0
        "#);
    }

    #[test]
    fn unknown_root_is_empty() {
        let mut ui = Ui::new(HeadlessToolkit::shared());
        let node = ui.create(Kind::Label).node_id();
        ui.reset();
        assert_eq!(tree_to_string(&ui, node), "");
    }
}
