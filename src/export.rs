use std::fmt::Write;

use crate::classify::{ClassKind, short_name};
use crate::engine::RelationMap;

/// Sanitize a string for use as a DOT node ID.
///
/// Replaces non-alphanumeric characters with `_`. Prepends `n` if the result
/// starts with a digit (DOT IDs must not start with a digit).
pub fn sanitize_dot_id(s: &str) -> String {
    let mut result: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, 'n');
    }
    if result.is_empty() {
        result = "node".to_string();
    }
    result
}

/// DOT fillcolor per classification.
fn kind_fillcolor(kind: ClassKind) -> &'static str {
    match kind {
        ClassKind::Controller => "#AED6F1",
        ClassKind::Model => "#A9DFBF",
        ClassKind::Interface | ClassKind::Trait => "#F9E79F",
        ClassKind::Service => "#D7BDE2",
        ClassKind::Middleware => "#FAD7A0",
        ClassKind::Event | ClassKind::Job | ClassKind::Notification => "#F1948A",
        _ => "#EAECEE",
    }
}

/// Render the relationship map as a DOT digraph.
///
/// Nodes carry the classification as color and label; structural edges keep
/// UML-ish arrowheads (extends solid, implements dashed, both onormal; trait
/// mixins dashed without arrowhead), and dependency edges are labeled with the parameter or
/// usage that created them. Edges pointing at symbols the exploration never
/// recorded (skipped or unresolved targets) are omitted.
pub fn render_dot(map: &RelationMap) -> String {
    let mut out = String::new();
    writeln!(out, "digraph route_graph {{").unwrap();
    writeln!(out, "    rankdir=TB;").unwrap();
    writeln!(out, "    node [style=filled fontname=monospace];").unwrap();

    for record in map.iter() {
        let id = sanitize_dot_id(&record.name);
        let label = format!("{} ({})", short_name(&record.name), record.kind.label());
        writeln!(
            out,
            "    {} [label=\"{}\" fillcolor=\"{}\"];",
            id,
            label,
            kind_fillcolor(record.kind)
        )
        .unwrap();
    }

    for record in map.iter() {
        let src = sanitize_dot_id(&record.name);

        if let Some(parent) = &record.extends
            && map.contains(parent)
        {
            writeln!(
                out,
                "    {} -> {} [style=solid arrowhead=onormal];",
                src,
                sanitize_dot_id(parent)
            )
            .unwrap();
        }
        for iface in record.implements.iter().filter(|i| map.contains(i)) {
            writeln!(
                out,
                "    {} -> {} [style=dashed arrowhead=onormal];",
                src,
                sanitize_dot_id(iface)
            )
            .unwrap();
        }
        for mixin in record.mixins.iter().filter(|m| map.contains(m)) {
            writeln!(
                out,
                "    {} -> {} [style=dashed];",
                src,
                sanitize_dot_id(mixin)
            )
            .unwrap();
        }
        for dep in record.dependencies.iter().filter(|d| map.contains(&d.target)) {
            writeln!(
                out,
                "    {} -> {} [label=\"{}\"];",
                src,
                sanitize_dot_id(&dep.target),
                dep.via
            )
            .unwrap();
        }
    }

    writeln!(out, "}}").unwrap();
    out
}
