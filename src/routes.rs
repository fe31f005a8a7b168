use crate::snapshot::RouteInfo;

/// Known HTTP verbs accepted as a leading method token.
const HTTP_VERBS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];

/// Outcome of locating a route by identifier.
#[derive(Debug)]
pub enum RouteMatch<'a> {
    /// Exactly one route matched.
    Found(&'a RouteInfo),
    /// The identifier was a bare URI registered under several HTTP methods;
    /// candidates are in route-table enumeration order so the caller can
    /// prompt for a method-qualified identifier.
    Ambiguous(Vec<&'a RouteInfo>),
    /// Nothing matched; carries up to 10 ranked suggestions (substring match
    /// on URI or name).
    NotFound(Vec<&'a RouteInfo>),
}

/// Resolves a user-supplied route identifier against the route table.
///
/// Identifiers may be a route name, a URI, a "METHOD URI" pair (methods may
/// be pipe-joined), or a line copy-pasted from a route-listing tool with
/// irregular internal whitespace. Read-only over the table.
pub struct RouteLocator<'a> {
    routes: &'a [RouteInfo],
}

impl<'a> RouteLocator<'a> {
    pub fn new(routes: &'a [RouteInfo]) -> Self {
        Self { routes }
    }

    /// Resolution order: exact name, then method+URI, then bare URI (unique
    /// or ambiguous), then first substring match on URI. First match wins.
    pub fn locate(&self, identifier: &str) -> RouteMatch<'a> {
        let cleaned = normalize(identifier);

        // 1. Exact route-name match.
        if let Some(route) = self
            .routes
            .iter()
            .find(|r| r.name.as_deref() == Some(cleaned.as_str()))
        {
            return RouteMatch::Found(route);
        }

        let (method, uri) = parse_method_and_uri(&cleaned);

        // 2. Method + URI: exact match on both.
        if let Some(method) = &method {
            if let Some(route) = self.routes.iter().find(|r| {
                r.uri == uri && r.methods.iter().any(|m| m.eq_ignore_ascii_case(method))
            }) {
                return RouteMatch::Found(route);
            }
        } else {
            // 3. Bare URI: unique match wins, several matches need a method.
            let uri_matches: Vec<&RouteInfo> =
                self.routes.iter().filter(|r| r.uri == uri).collect();
            match uri_matches.len() {
                0 => {}
                1 => return RouteMatch::Found(uri_matches[0]),
                _ => return RouteMatch::Ambiguous(uri_matches),
            }
        }

        // 4. Fuzzy fallback: first route whose URI contains the normalized
        // identifier. A method-qualified identifier therefore never fuzzy-
        // matches (no URI contains a verb token).
        if let Some(route) = self.routes.iter().find(|r| r.uri.contains(&cleaned)) {
            return RouteMatch::Found(route);
        }

        // Suggestions search on the URI part alone, so "POST notes" still
        // surfaces the notes routes.
        let search = if uri.is_empty() { cleaned.as_str() } else { &uri };
        RouteMatch::NotFound(self.suggestions(search))
    }

    /// Routes whose URI or name contains the search term, capped at 10,
    /// in route-table enumeration order.
    fn suggestions(&self, search: &str) -> Vec<&'a RouteInfo> {
        self.routes
            .iter()
            .filter(|r| {
                r.uri.contains(search)
                    || r.name.as_deref().is_some_and(|n| n.contains(search))
            })
            .take(10)
            .collect()
    }
}

/// Collapse whitespace runs to single spaces and trim; copy-pasted
/// route-listing lines arrive with column padding.
fn normalize(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a leading HTTP-verb token (case-insensitive, possibly pipe-joined
/// like "GET|HEAD", where the first verb is the most specific) from the URI.
/// A leading `/` on the URI is insignificant.
fn parse_method_and_uri(input: &str) -> (Option<String>, String) {
    if let Some((first, rest)) = input.split_once(' ') {
        let lead = first.split('|').next().unwrap_or(first);
        if HTTP_VERBS.iter().any(|v| v.eq_ignore_ascii_case(lead)) {
            let uri = rest.trim_start_matches('/').to_string();
            return (Some(lead.to_ascii_uppercase()), uri);
        }
    }
    (None, input.trim_start_matches('/').to_string())
}
