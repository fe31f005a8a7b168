use crate::classify::short_name;
use crate::engine::RelationMap;
use crate::snapshot::RouteInfo;

/// Route info panel shown before exploration output.
pub fn route_panel(route: &RouteInfo) -> String {
    let mut out = String::new();
    out.push_str("=== Route ===\n");
    out.push_str(&format!("Method:     {}\n", route.methods.join("|")));
    out.push_str(&format!("URI:        /{}\n", route.uri.trim_start_matches('/')));
    out.push_str(&format!(
        "Name:       {}\n",
        route.name.as_deref().unwrap_or("-")
    ));
    out.push_str(&format!(
        "Action:     {}\n",
        route.action.as_deref().unwrap_or("Closure")
    ));
    out.push_str(&format!(
        "Middleware: {}\n",
        if route.middleware.is_empty() {
            "-".to_string()
        } else {
            route.middleware.join(", ")
        }
    ));
    out
}

/// Relationship table, one row per discovered symbol in insertion order.
/// Column widths are auto-sized to the data.
pub fn render_table(map: &RelationMap, use_color: bool) -> String {
    let rows: Vec<[String; 7]> = map
        .iter()
        .map(|r| {
            [
                r.name.clone(),
                r.kind.label().to_string(),
                r.context.clone(),
                r.extends.as_deref().map(short_name).unwrap_or("-").to_string(),
                r.implements.len().to_string(),
                r.mixins.len().to_string(),
                r.dependencies.len().to_string(),
            ]
        })
        .collect();

    const HEADERS: [&str; 7] = [
        "CLASS",
        "TYPE",
        "CONTEXT",
        "EXTENDS",
        "INTERFACES",
        "TRAITS",
        "DEPS",
    ];
    let mut widths: [usize; 7] = HEADERS.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }

    let mut out = String::new();
    let header_line = format_row(&HEADERS.map(str::to_string), &widths);
    if use_color {
        out.push_str(&format!("\x1b[1m{header_line}\x1b[0m\n"));
    } else {
        out.push_str(&header_line);
        out.push('\n');
    }
    out.push_str(&"-".repeat(widths.iter().sum::<usize>() + 2 * (widths.len() - 1)));
    out.push('\n');

    for row in &rows {
        out.push_str(&format_row(row, &widths));
        out.push('\n');
    }
    out.push_str(&format!("{} classes discovered\n", map.len()));
    out
}

fn format_row(cells: &[String; 7], widths: &[usize; 7]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:<w$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Depth-grouped tree: symbols at depth 0 first, then depth 1, and so on,
/// each group in insertion order, indented by depth with the kind glyph.
pub fn render_tree(map: &RelationMap) -> String {
    let mut out = String::new();
    let Some(max_depth) = map.max_depth() else {
        return out;
    };
    for depth in 0..=max_depth {
        for record in map.iter().filter(|r| r.depth == depth) {
            out.push_str(&format!(
                "{}{} {} [{}] ({})\n",
                "  ".repeat(depth),
                record.kind.glyph(),
                record.name,
                record.kind.label(),
                record.context,
            ));
        }
    }
    out
}

/// Machine-readable output: the route plus the full relationship map.
pub fn render_json(route: &RouteInfo, map: &RelationMap) -> String {
    let doc = serde_json::json!({
        "route": route,
        "relationships": map,
    });
    serde_json::to_string_pretty(&doc).unwrap_or_default()
}

/// Ambiguity report: the matching routes plus copy-pasteable
/// method-qualified identifiers for each.
pub fn render_ambiguous(identifier: &str, candidates: &[&RouteInfo]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "'{identifier}' matches {} routes; qualify it with an HTTP method:\n\n",
        candidates.len()
    ));
    for route in candidates {
        let method = route.methods.first().map(String::as_str).unwrap_or("GET");
        out.push_str(&format!(
            "  explore \"{method} {}\"    ({})\n",
            route.uri,
            route.name.as_deref().unwrap_or("unnamed"),
        ));
    }
    out
}

/// Not-found report with up to 10 nearby routes.
pub fn render_not_found(identifier: &str, suggestions: &[&RouteInfo]) -> String {
    let mut out = String::new();
    out.push_str(&format!("No route matches '{identifier}'.\n"));
    if suggestions.is_empty() {
        return out;
    }
    out.push_str("\nDid you mean:\n");
    for route in suggestions {
        out.push_str(&format!(
            "  {:<10} /{}{}\n",
            route.methods.join("|"),
            route.uri.trim_start_matches('/'),
            route
                .name
                .as_deref()
                .map(|n| format!("  ({n})"))
                .unwrap_or_default(),
        ));
    }
    out
}

/// Route listing for the `routes` subcommand, auto-sized like the
/// relationship table.
pub fn render_route_list(routes: &[RouteInfo], use_color: bool) -> String {
    let method_w = routes
        .iter()
        .map(|r| r.methods.join("|").len())
        .max()
        .unwrap_or(6)
        .max(6);
    let uri_w = routes
        .iter()
        .map(|r| r.uri.len() + 1)
        .max()
        .unwrap_or(3)
        .max(3);
    let name_w = routes
        .iter()
        .map(|r| r.name.as_deref().unwrap_or("-").len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut out = String::new();
    let header = format!(
        "{:<method_w$}  {:<uri_w$}  {:<name_w$}  {}",
        "METHOD", "URI", "NAME", "ACTION"
    );
    if use_color {
        out.push_str(&format!("\x1b[1m{header}\x1b[0m\n"));
    } else {
        out.push_str(&header);
        out.push('\n');
    }
    out.push_str(&"-".repeat(method_w + uri_w + name_w + 12));
    out.push('\n');

    for route in routes {
        out.push_str(&format!(
            "{:<method_w$}  {:<uri_w$}  {:<name_w$}  {}\n",
            route.methods.join("|"),
            format!("/{}", route.uri.trim_start_matches('/')),
            route.name.as_deref().unwrap_or("-"),
            route.action.as_deref().unwrap_or("Closure"),
        ));
    }
    out.push_str(&format!("{} routes\n", routes.len()));
    out
}
