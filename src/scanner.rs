use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::ExplorerConfig;
use crate::resolver::SymbolResolver;
use crate::snapshot::AuthConfig;

/// One accepted detector hit in a method body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    /// Fully-qualified class the match resolved to.
    pub class: String,
    /// The literal idiom that matched, for diagnostics.
    pub pattern: String,
    /// Usage tag ("auth_user", "static_call", "instantiation", ...).
    pub usage: &'static str,
}

/// Scans method source text for framework-idiom dependency patterns.
///
/// This is regex scanning, not static analysis: false negatives are expected
/// and tolerated, and false positives are mitigated solely by requiring every
/// candidate class to resolve in the symbol table before it is accepted.
/// Keeping the detectors behind this one type lets a parse-tree-based scanner
/// replace them later without touching the engine.
pub struct PatternScanner<'a> {
    resolver: SymbolResolver<'a>,
    auth: &'a AuthConfig,
    config: &'a ExplorerConfig,
    /// Matches explicit entity-namespace static calls; built from the
    /// configured namespace, so compiled per scanner rather than statically.
    explicit_entity: Regex,
}

/// A detector inspects one method body and yields zero or more resolved
/// matches. New detectors slot into `DETECTORS` without engine changes.
type Detector = fn(&PatternScanner, &str) -> Vec<PatternMatch>;

const DETECTORS: &[Detector] = &[
    detect_auth_access,
    detect_static_entity_calls,
    detect_instantiations,
    detect_event_publish,
    detect_job_enqueue,
    detect_notification_send,
];

static AUTH_USER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bAuth\s*::\s*user\s*\(\s*\)").expect("valid regex"));
static AUTH_HELPER_USER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bauth\s*\(\s*\)\s*->\s*user\s*\(\s*\)").expect("valid regex")
});
static AUTH_GUARD_USER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bAuth\s*::\s*guard\s*\(\s*['"]([^'"]+)['"]\s*\)\s*->\s*user\s*\(\s*\)"#)
        .expect("valid regex")
});
static STATIC_ENTITY_VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z]\w*)\s*::\s*(?:find|create|where|first|all|get|factory)\s*\(")
        .expect("valid regex")
});
static NEW_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bnew\s+\\?(\w+(?:\\\w+)*)\s*\(").expect("valid regex"));
static EVENT_NEW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bevent\s*\(\s*new\s+(\w+)\s*\(").expect("valid regex"));
static STATIC_DISPATCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]\w*)\s*::\s*dispatch\s*\(").expect("valid regex"));
static DISPATCH_NEW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bdispatch\s*\(\s*new\s+(\w+)\s*\(").expect("valid regex"));
static NOTIFY_NEW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"->\s*notify\s*\(\s*new\s+(\w+)\s*\(").expect("valid regex"));
static NOTIFICATION_SEND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bNotification\s*::\s*send\s*\([^,]+,\s*new\s+(\w+)\s*\(").expect("valid regex")
});

impl<'a> PatternScanner<'a> {
    pub fn new(
        resolver: SymbolResolver<'a>,
        auth: &'a AuthConfig,
        config: &'a ExplorerConfig,
    ) -> Self {
        let explicit_entity = Regex::new(&format!(
            r"\\?{}(\w+)\s*::",
            regex::escape(&config.namespaces.models)
        ))
        .expect("valid regex");
        Self {
            resolver,
            auth,
            config,
            explicit_entity,
        }
    }

    /// Run every detector over `source`, merging results and removing
    /// duplicates keyed by `(class, pattern)`. Distinct patterns hitting the
    /// same class are all preserved; they are distinct usage sites.
    pub fn scan(&self, source: &str) -> Vec<PatternMatch> {
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut matches = Vec::new();

        for detector in DETECTORS {
            for m in detector(self, source) {
                let key = (m.class.clone(), m.pattern.clone());
                if seen.insert(key) {
                    matches.push(m);
                }
            }
        }

        matches
    }

    /// The authenticated-entity type for a guard, accepted only when it
    /// resolves in the symbol table. Never guesses on config gaps.
    fn auth_model(&self, guard: Option<&str>) -> Option<String> {
        self.auth
            .user_model(guard)
            .filter(|model| self.resolver.class_exists(model))
            .map(str::to_string)
    }
}

/// Authenticated-user access: the facade call, the helper-function form, and
/// guard-qualified calls. The concrete entity type comes from the auth
/// configuration, not from assumption.
fn detect_auth_access(scanner: &PatternScanner, source: &str) -> Vec<PatternMatch> {
    let mut matches = Vec::new();

    if AUTH_USER.is_match(source)
        && let Some(model) = scanner.auth_model(None)
    {
        matches.push(PatternMatch {
            class: model,
            pattern: "Auth::user()".to_string(),
            usage: "auth_user",
        });
    }

    if AUTH_HELPER_USER.is_match(source)
        && let Some(model) = scanner.auth_model(None)
    {
        matches.push(PatternMatch {
            class: model,
            pattern: "auth()->user()".to_string(),
            usage: "auth_user",
        });
    }

    for caps in AUTH_GUARD_USER.captures_iter(source) {
        let guard = &caps[1];
        if let Some(model) = scanner.auth_model(Some(guard)) {
            matches.push(PatternMatch {
                class: model,
                pattern: format!("Auth::guard('{guard}')->user()"),
                usage: "auth_guard_user",
            });
        }
    }

    matches
}

/// Repository-style static calls: explicit entity-namespace calls, plus bare
/// `Name::verb(` calls filtered through the facade denylist and accepted only
/// when the candidate resolves (entity namespace first, then bare).
fn detect_static_entity_calls(scanner: &PatternScanner, source: &str) -> Vec<PatternMatch> {
    let mut matches = Vec::new();
    let models_ns = &scanner.config.namespaces.models;

    for caps in scanner.explicit_entity.captures_iter(source) {
        let name = &caps[1];
        let full = format!("{models_ns}{name}");
        if scanner.resolver.class_exists(&full) {
            matches.push(PatternMatch {
                class: full,
                pattern: format!("{models_ns}{name}::"),
                usage: "static_call",
            });
        }
    }

    for caps in STATIC_ENTITY_VERB.captures_iter(source) {
        let name = &caps[1];
        if scanner.config.facades.iter().any(|f| f == name) {
            continue;
        }
        let namespaced = format!("{models_ns}{name}");
        let class = if scanner.resolver.class_exists(&namespaced) {
            namespaced
        } else if scanner.resolver.class_exists(name) {
            name.to_string()
        } else {
            continue;
        };
        matches.push(PatternMatch {
            class,
            pattern: format!("{name}::"),
            usage: "static_call",
        });
    }

    matches
}

/// Object construction: `new Name(`, tried under the application namespace
/// first, then as written.
fn detect_instantiations(scanner: &PatternScanner, source: &str) -> Vec<PatternMatch> {
    let mut matches = Vec::new();
    let app_ns = &scanner.config.namespaces.app;

    for caps in NEW_CLASS.captures_iter(source) {
        let raw = &caps[1];
        let mut candidates = Vec::new();
        if !raw.starts_with(app_ns.as_str()) {
            candidates.push(format!("{app_ns}{raw}"));
        }
        candidates.push(raw.to_string());

        if let Some(class) = candidates
            .into_iter()
            .find(|c| scanner.resolver.class_exists(c))
        {
            matches.push(PatternMatch {
                class,
                pattern: format!("new {raw}()"),
                usage: "instantiation",
            });
        }
    }

    matches
}

/// Event publication: `event(new X(` and `X::dispatch(`, resolved under the
/// events namespace. The bare facade name is not an event.
fn detect_event_publish(scanner: &PatternScanner, source: &str) -> Vec<PatternMatch> {
    let mut matches = Vec::new();
    let events_ns = &scanner.config.namespaces.events;

    for caps in EVENT_NEW.captures_iter(source) {
        let name = &caps[1];
        let full = format!("{events_ns}{name}");
        if scanner.resolver.class_exists(&full) {
            matches.push(PatternMatch {
                class: full,
                pattern: format!("event(new {name}())"),
                usage: "event_dispatch",
            });
        }
    }

    for caps in STATIC_DISPATCH.captures_iter(source) {
        let name = &caps[1];
        if name == "Event" {
            continue;
        }
        let full = format!("{events_ns}{name}");
        if scanner.resolver.class_exists(&full) {
            matches.push(PatternMatch {
                class: full,
                pattern: format!("{name}::dispatch()"),
                usage: "event_dispatch",
            });
        }
    }

    matches
}

/// Job enqueueing: `dispatch(new X(` and `X::dispatch(`, resolved under the
/// jobs namespace.
fn detect_job_enqueue(scanner: &PatternScanner, source: &str) -> Vec<PatternMatch> {
    let mut matches = Vec::new();
    let jobs_ns = &scanner.config.namespaces.jobs;

    for caps in DISPATCH_NEW.captures_iter(source) {
        let name = &caps[1];
        let full = format!("{jobs_ns}{name}");
        if scanner.resolver.class_exists(&full) {
            matches.push(PatternMatch {
                class: full,
                pattern: format!("dispatch(new {name}())"),
                usage: "job_dispatch",
            });
        }
    }

    for caps in STATIC_DISPATCH.captures_iter(source) {
        let name = &caps[1];
        let full = format!("{jobs_ns}{name}");
        if scanner.resolver.class_exists(&full) {
            matches.push(PatternMatch {
                class: full,
                pattern: format!("{name}::dispatch()"),
                usage: "job_dispatch",
            });
        }
    }

    matches
}

/// Notification delivery: `->notify(new X(` and the two-argument
/// `Notification::send(..., new X(` form, resolved under the notifications
/// namespace.
fn detect_notification_send(scanner: &PatternScanner, source: &str) -> Vec<PatternMatch> {
    let mut matches = Vec::new();
    let notifications_ns = &scanner.config.namespaces.notifications;

    for caps in NOTIFY_NEW.captures_iter(source) {
        let name = &caps[1];
        let full = format!("{notifications_ns}{name}");
        if scanner.resolver.class_exists(&full) {
            matches.push(PatternMatch {
                class: full,
                pattern: format!("->notify(new {name}())"),
                usage: "notification",
            });
        }
    }

    for caps in NOTIFICATION_SEND.captures_iter(source) {
        let name = &caps[1];
        let full = format!("{notifications_ns}{name}");
        if scanner.resolver.class_exists(&full) {
            matches.push(PatternMatch {
                class: full,
                pattern: format!("Notification::send(..., new {name}())"),
                usage: "notification",
            });
        }
    }

    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{AppSnapshot, ClassInfo};

    fn snapshot_with(classes: &[&str]) -> AppSnapshot {
        let mut snapshot = AppSnapshot::default();
        for name in classes {
            snapshot
                .classes
                .insert(name.to_string(), ClassInfo::default());
        }
        snapshot.auth = serde_json::from_str(
            r#"{
                "default_guard": "web",
                "guards": {
                    "web": {"provider": "users"},
                    "admin": {"provider": "admins"}
                },
                "providers": {
                    "users": {"model": "App\\Models\\User"},
                    "admins": {"model": "App\\Models\\Admin"}
                }
            }"#,
        )
        .unwrap();
        snapshot
    }

    fn scan(classes: &[&str], source: &str) -> Vec<PatternMatch> {
        let snapshot = snapshot_with(classes);
        let config = ExplorerConfig::default();
        let resolver = SymbolResolver::new(&snapshot, &config);
        let scanner = PatternScanner::new(resolver, &snapshot.auth, &config);
        scanner.scan(source)
    }

    #[test]
    fn test_auth_user_resolves_configured_model() {
        let matches = scan(&["App\\Models\\User"], "$user = Auth::user();");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].class, "App\\Models\\User");
        assert_eq!(matches[0].usage, "auth_user");
    }

    #[test]
    fn test_auth_helper_form_detected() {
        let matches = scan(&["App\\Models\\User"], "$user = auth()->user();");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].pattern, "auth()->user()");
    }

    #[test]
    fn test_auth_user_without_resolvable_model_yields_nothing() {
        // Auth config points at App\Models\User but the class is absent.
        let matches = scan(&[], "Auth::user();");
        assert!(matches.is_empty(), "must not guess when model is missing");
    }

    #[test]
    fn test_auth_guard_uses_guard_specific_model() {
        let matches = scan(
            &["App\\Models\\Admin"],
            "$admin = Auth::guard('admin')->user();",
        );
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].class, "App\\Models\\Admin");
        assert_eq!(matches[0].usage, "auth_guard_user");
    }

    #[test]
    fn test_static_entity_call_requires_resolution() {
        // Resolves in the fixture: dependency reported.
        let matches = scan(&["App\\Models\\Widget"], "Widget::find(1);");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].class, "App\\Models\\Widget");
        assert_eq!(matches[0].usage, "static_call");

        // Same source without the class in the symbol table: nothing.
        let matches = scan(&[], "Widget::find(1);");
        assert!(matches.is_empty());
    }

    #[test]
    fn test_static_call_facade_denylist() {
        let matches = scan(&["App\\Models\\Cache"], "Cache::get('key');");
        assert!(matches.is_empty(), "facade names are never entities");
    }

    #[test]
    fn test_explicit_namespaced_static_call() {
        let matches = scan(&["App\\Models\\Note"], "\\App\\Models\\Note::where('id', 1);");
        assert!(
            matches.iter().any(|m| m.class == "App\\Models\\Note"),
            "explicit entity-namespace call should be detected"
        );
    }

    #[test]
    fn test_instantiation_prefers_app_namespace() {
        let matches = scan(
            &["App\\Services\\ExportService"],
            "$svc = new Services\\ExportService($notes);",
        );
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].class, "App\\Services\\ExportService");
        assert_eq!(matches[0].usage, "instantiation");
    }

    #[test]
    fn test_event_and_job_dispatch() {
        let matches = scan(
            &["App\\Events\\NoteSaved", "App\\Jobs\\PruneNotes"],
            "event(new NoteSaved($note)); PruneNotes::dispatch($note);",
        );
        let classes: Vec<&str> = matches.iter().map(|m| m.class.as_str()).collect();
        assert!(classes.contains(&"App\\Events\\NoteSaved"));
        assert!(classes.contains(&"App\\Jobs\\PruneNotes"));
    }

    #[test]
    fn test_dispatch_resolving_as_both_event_and_job_keeps_both() {
        // "Saved::dispatch(" with both App\Events\Saved and App\Jobs\Saved
        // present is genuinely ambiguous; both interpretations are reported.
        let matches = scan(
            &["App\\Events\\Saved", "App\\Jobs\\Saved"],
            "Saved::dispatch($note);",
        );
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn test_notification_forms() {
        let matches = scan(
            &["App\\Notifications\\NoteShared"],
            "$user->notify(new NoteShared($note));\nNotification::send($users, new NoteShared($note));",
        );
        assert_eq!(matches.len(), 2, "both notification forms are distinct usage sites");
        assert!(matches.iter().all(|m| m.usage == "notification"));
    }

    #[test]
    fn test_duplicates_removed_by_class_and_pattern() {
        let matches = scan(
            &["App\\Models\\Widget"],
            "Widget::find(1); Widget::find(2); Widget::where('a', 1);",
        );
        // find/where collapse per (class, pattern): "Widget::" appears once.
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_flexible_whitespace() {
        let matches = scan(&["App\\Models\\User"], "Auth :: user ( )");
        assert_eq!(matches.len(), 1);
    }
}
