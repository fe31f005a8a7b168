use std::collections::HashSet;

use serde::Serialize;

use crate::resolver::SymbolResolver;
use crate::snapshot::ClassInfo;

/// Classification label for a discovered symbol.
///
/// Name-based rules ("contains Controller") are duck-typing heuristics
/// substituting for nominal typing in the host program; they are kept as an
/// explicit ordered rule list in `classify`, not scattered type checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClassKind {
    Interface,
    Trait,
    Model,
    Controller,
    Service,
    Middleware,
    Event,
    Job,
    Notification,
    #[serde(rename = "Abstract Class")]
    AbstractClass,
    #[serde(rename = "Final Class")]
    FinalClass,
    Class,
}

impl ClassKind {
    /// Human-readable label used in table output.
    pub fn label(&self) -> &'static str {
        match self {
            ClassKind::Interface => "Interface",
            ClassKind::Trait => "Trait",
            ClassKind::Model => "Model",
            ClassKind::Controller => "Controller",
            ClassKind::Service => "Service",
            ClassKind::Middleware => "Middleware",
            ClassKind::Event => "Event",
            ClassKind::Job => "Job",
            ClassKind::Notification => "Notification",
            ClassKind::AbstractClass => "Abstract Class",
            ClassKind::FinalClass => "Final Class",
            ClassKind::Class => "Class",
        }
    }

    /// Display glyph for tree output. Unmapped kinds fall through to the
    /// plain-class glyph.
    pub fn glyph(&self) -> &'static str {
        match self {
            ClassKind::Controller => "🎮",
            ClassKind::Model => "🗄️",
            ClassKind::Service => "⚙️",
            ClassKind::Interface => "🔌",
            ClassKind::Trait => "🧩",
            ClassKind::AbstractClass => "🔺",
            ClassKind::Middleware => "🛡️",
            ClassKind::Event => "📢",
            ClassKind::Job => "⚡",
            ClassKind::Notification => "📬",
            _ => "📦",
        }
    }
}

/// Classify a symbol. First matching rule wins; order matters because a
/// class can satisfy several heuristics (an abstract model is a Model).
pub fn classify(name: &str, class: &ClassInfo, resolver: &SymbolResolver, model_base: &str) -> ClassKind {
    if class.is_interface {
        return ClassKind::Interface;
    }
    if class.is_trait {
        return ClassKind::Trait;
    }
    if is_model(name, resolver, model_base) {
        return ClassKind::Model;
    }
    if name.contains("Controller") {
        return ClassKind::Controller;
    }
    if name.contains("Service") {
        return ClassKind::Service;
    }
    if name.contains("Middleware") {
        return ClassKind::Middleware;
    }
    if name.contains("Event") {
        return ClassKind::Event;
    }
    if name.contains("Job") {
        return ClassKind::Job;
    }
    if name.contains("Notification") {
        return ClassKind::Notification;
    }
    if class.is_abstract {
        return ClassKind::AbstractClass;
    }
    if class.is_final {
        return ClassKind::FinalClass;
    }
    ClassKind::Class
}

/// Whether `name` transitively extends the ORM base entity type.
///
/// The base type itself usually lives outside the snapshot's symbol table
/// (framework code is not exported), so each ancestor's name is compared
/// before resolving it. A seen-set guards against parent-chain cycles.
pub fn is_model(name: &str, resolver: &SymbolResolver, model_base: &str) -> bool {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut current = name;

    loop {
        if current == model_base {
            // The entry symbol is the base type itself, not a subtype of it.
            return current != name;
        }
        if !seen.insert(current) {
            return false;
        }
        match resolver.class(current).and_then(|c| c.parent.as_deref()) {
            Some(parent) => current = parent,
            None => return false,
        }
    }
}

/// If `return_type` is one of the configured relation-marker types, return
/// the relation kind: the type's short name ("BelongsTo", "HasMany", ...).
pub fn relation_kind<'a>(return_type: &'a str, relation_types: &[String]) -> Option<&'a str> {
    if relation_types.iter().any(|t| t == return_type) {
        Some(short_name(return_type))
    } else {
        None
    }
}

/// The segment after the last namespace separator.
pub fn short_name(name: &str) -> &str {
    name.rsplit('\\').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExplorerConfig;
    use crate::snapshot::AppSnapshot;

    const MODEL_BASE: &str = "Illuminate\\Database\\Eloquent\\Model";

    fn snapshot_with_model_chain() -> AppSnapshot {
        let mut snapshot = AppSnapshot::default();
        snapshot.classes.insert(
            "App\\Models\\Note".into(),
            ClassInfo {
                parent: Some(MODEL_BASE.into()),
                ..Default::default()
            },
        );
        // A model subtype two levels away from the base.
        snapshot.classes.insert(
            "App\\Models\\PinnedNote".into(),
            ClassInfo {
                parent: Some("App\\Models\\Note".into()),
                ..Default::default()
            },
        );
        snapshot
    }

    #[test]
    fn test_is_model_direct_and_transitive() {
        let snapshot = snapshot_with_model_chain();
        let config = ExplorerConfig::default();
        let resolver = SymbolResolver::new(&snapshot, &config);
        assert!(is_model("App\\Models\\Note", &resolver, MODEL_BASE));
        assert!(is_model("App\\Models\\PinnedNote", &resolver, MODEL_BASE));
        assert!(!is_model("App\\Services\\NoteService", &resolver, MODEL_BASE));
    }

    #[test]
    fn test_is_model_survives_parent_cycle() {
        let mut snapshot = AppSnapshot::default();
        snapshot.classes.insert(
            "App\\A".into(),
            ClassInfo {
                parent: Some("App\\B".into()),
                ..Default::default()
            },
        );
        snapshot.classes.insert(
            "App\\B".into(),
            ClassInfo {
                parent: Some("App\\A".into()),
                ..Default::default()
            },
        );
        let config = ExplorerConfig::default();
        let resolver = SymbolResolver::new(&snapshot, &config);
        assert!(!is_model("App\\A", &resolver, MODEL_BASE));
    }

    #[test]
    fn test_classify_precedence_abstract_model_is_model() {
        let snapshot = snapshot_with_model_chain();
        let config = ExplorerConfig::default();
        let resolver = SymbolResolver::new(&snapshot, &config);
        let abstract_model = ClassInfo {
            parent: Some(MODEL_BASE.into()),
            is_abstract: true,
            ..Default::default()
        };
        assert_eq!(
            classify("App\\Models\\Note", &abstract_model, &resolver, MODEL_BASE),
            ClassKind::Model
        );
    }

    #[test]
    fn test_classify_interface_beats_name_rules() {
        let snapshot = AppSnapshot::default();
        let config = ExplorerConfig::default();
        let resolver = SymbolResolver::new(&snapshot, &config);
        let iface = ClassInfo {
            is_interface: true,
            ..Default::default()
        };
        assert_eq!(
            classify("App\\Contracts\\ControllerContract", &iface, &resolver, MODEL_BASE),
            ClassKind::Interface
        );
    }

    #[test]
    fn test_classify_name_heuristics() {
        let snapshot = AppSnapshot::default();
        let config = ExplorerConfig::default();
        let resolver = SymbolResolver::new(&snapshot, &config);
        let plain = ClassInfo::default();
        assert_eq!(
            classify("App\\Http\\Controllers\\NoteController", &plain, &resolver, MODEL_BASE),
            ClassKind::Controller
        );
        assert_eq!(
            classify("App\\Services\\ExportService", &plain, &resolver, MODEL_BASE),
            ClassKind::Service
        );
        assert_eq!(
            classify("App\\Jobs\\PruneNotesJob", &plain, &resolver, MODEL_BASE),
            ClassKind::Job
        );
        assert_eq!(
            classify("App\\Support\\Clock", &plain, &resolver, MODEL_BASE),
            ClassKind::Class
        );
    }

    #[test]
    fn test_classify_abstract_and_final_fallbacks() {
        let snapshot = AppSnapshot::default();
        let config = ExplorerConfig::default();
        let resolver = SymbolResolver::new(&snapshot, &config);
        let abstract_class = ClassInfo {
            is_abstract: true,
            ..Default::default()
        };
        let final_class = ClassInfo {
            is_final: true,
            ..Default::default()
        };
        assert_eq!(
            classify("App\\Support\\Base", &abstract_class, &resolver, MODEL_BASE),
            ClassKind::AbstractClass
        );
        assert_eq!(
            classify("App\\Support\\Sealed", &final_class, &resolver, MODEL_BASE),
            ClassKind::FinalClass
        );
    }

    #[test]
    fn test_relation_kind() {
        let config = ExplorerConfig::default();
        assert_eq!(
            relation_kind(
                "Illuminate\\Database\\Eloquent\\Relations\\BelongsTo",
                &config.relation_types
            ),
            Some("BelongsTo")
        );
        assert_eq!(
            relation_kind("Illuminate\\Support\\Collection", &config.relation_types),
            None
        );
    }

    #[test]
    fn test_glyph_default_for_final_class() {
        assert_eq!(ClassKind::FinalClass.glyph(), "📦");
        assert_eq!(ClassKind::Controller.glyph(), "🎮");
    }
}
