use crate::config::ExplorerConfig;
use crate::snapshot::{AppSnapshot, ClassInfo};

/// Wraps the snapshot's symbol table with the resolution policy the engine
/// needs: existence checks, skip-namespace filtering, and short-name
/// expansion over the configured application namespaces.
///
/// "Truly absent" and "present but unreadable" are deliberately the same
/// outcome (`None`); callers only care that a branch cannot be explored.
#[derive(Clone, Copy)]
pub struct SymbolResolver<'a> {
    snapshot: &'a AppSnapshot,
    config: &'a ExplorerConfig,
}

impl<'a> SymbolResolver<'a> {
    pub fn new(snapshot: &'a AppSnapshot, config: &'a ExplorerConfig) -> Self {
        Self { snapshot, config }
    }

    /// Whether the symbol table can resolve this fully-qualified name.
    pub fn class_exists(&self, name: &str) -> bool {
        self.snapshot.class(name).is_some()
    }

    /// Reflection facts for a class, or None when it cannot be resolved.
    pub fn class(&self, name: &str) -> Option<&'a ClassInfo> {
        self.snapshot.class(name)
    }

    /// Whether the symbol belongs to a configured framework/vendor namespace
    /// and should be excluded from exploration. Exact, case-sensitive prefix
    /// match against the configured list.
    pub fn should_skip(&self, name: &str) -> bool {
        self.config
            .skip_namespaces
            .iter()
            .any(|prefix| name.starts_with(prefix.as_str()))
    }

    /// Resolve a short or partial class name to a fully-qualified one: try
    /// it as-is, then under each configured namespace alias in declaration
    /// order. First hit wins.
    pub fn resolve_short_name(&self, partial: &str) -> Option<String> {
        if self.class_exists(partial) {
            return Some(partial.to_string());
        }

        for namespace in self.config.namespaces.iter() {
            let candidate = format!("{namespace}{partial}");
            if self.class_exists(&candidate) {
                return Some(candidate);
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ClassInfo;

    fn snapshot_with(classes: &[&str]) -> AppSnapshot {
        let mut snapshot = AppSnapshot::default();
        for name in classes {
            snapshot
                .classes
                .insert(name.to_string(), ClassInfo::default());
        }
        snapshot
    }

    #[test]
    fn test_class_exists() {
        let snapshot = snapshot_with(&["App\\Models\\Note"]);
        let config = ExplorerConfig::default();
        let resolver = SymbolResolver::new(&snapshot, &config);
        assert!(resolver.class_exists("App\\Models\\Note"));
        assert!(!resolver.class_exists("App\\Models\\Missing"));
    }

    #[test]
    fn test_should_skip_matches_configured_prefixes() {
        let snapshot = AppSnapshot::default();
        let config = ExplorerConfig::default();
        let resolver = SymbolResolver::new(&snapshot, &config);
        assert!(resolver.should_skip("Illuminate\\Routing\\Controller"));
        assert!(resolver.should_skip("Symfony\\Component\\HttpFoundation\\Response"));
        assert!(!resolver.should_skip("App\\Http\\Controllers\\NoteController"));
    }

    #[test]
    fn test_should_skip_is_prefix_not_substring() {
        let snapshot = AppSnapshot::default();
        let config = ExplorerConfig::default();
        let resolver = SymbolResolver::new(&snapshot, &config);
        // Contains "Illuminate\" but does not start with it.
        assert!(!resolver.should_skip("App\\Illuminate\\Thing"));
    }

    #[test]
    fn test_resolve_short_name_as_is_first() {
        let snapshot = snapshot_with(&["Note", "App\\Models\\Note"]);
        let config = ExplorerConfig::default();
        let resolver = SymbolResolver::new(&snapshot, &config);
        assert_eq!(resolver.resolve_short_name("Note").as_deref(), Some("Note"));
    }

    #[test]
    fn test_resolve_short_name_tries_namespaces_in_order() {
        // "Note" exists under both App\ and App\Models\; App\ is declared
        // first so it wins.
        let snapshot = snapshot_with(&["App\\Note", "App\\Models\\Note"]);
        let config = ExplorerConfig::default();
        let resolver = SymbolResolver::new(&snapshot, &config);
        assert_eq!(
            resolver.resolve_short_name("Note").as_deref(),
            Some("App\\Note")
        );
    }

    #[test]
    fn test_resolve_short_name_none_when_unresolvable() {
        let snapshot = snapshot_with(&[]);
        let config = ExplorerConfig::default();
        let resolver = SymbolResolver::new(&snapshot, &config);
        assert_eq!(resolver.resolve_short_name("Ghost"), None);
    }
}
