use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Result, bail};
use serde::Serialize;
use serde::ser::SerializeMap;

use crate::classify::{ClassKind, classify, is_model, relation_kind};
use crate::config::ExplorerConfig;
use crate::inflect::guess_entity_name;
use crate::resolver::SymbolResolver;
use crate::scanner::PatternScanner;
use crate::snapshot::{AppSnapshot, ParamSig, RouteInfo};

/// One discovered usage of another symbol: a typed parameter or a pattern
/// hit in a method body. Multiple edges to the same target with different
/// `via`/`context` are distinct usage sites and all preserved.
#[derive(Debug, Clone, Serialize)]
pub struct DependencyEdge {
    #[serde(rename = "class")]
    pub target: String,
    /// Parameter name or detected usage tag.
    #[serde(rename = "parameter")]
    pub via: String,
    pub context: String,
}

/// Everything recorded about one explored symbol.
#[derive(Debug, Clone, Serialize)]
pub struct RelationshipRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ClassKind,
    /// Provenance: how exploration reached this symbol.
    pub context: String,
    /// Distance from the exploration root; first visit wins.
    pub depth: usize,
    pub extends: Option<String>,
    pub implements: Vec<String>,
    #[serde(rename = "traits")]
    pub mixins: Vec<String>,
    /// Declaring source file, for diagnostics only.
    pub file: Option<PathBuf>,
    pub dependencies: Vec<DependencyEdge>,
}

/// The accumulated relationship map, keyed by qualified name with insertion
/// order preserved (ordering affects presentation only, not correctness).
#[derive(Debug, Default)]
pub struct RelationMap {
    records: Vec<RelationshipRecord>,
    index: std::collections::HashMap<String, usize>,
}

impl RelationMap {
    pub fn insert(&mut self, record: RelationshipRecord) {
        self.index.insert(record.name.clone(), self.records.len());
        self.records.push(record);
    }

    pub fn get(&self, name: &str) -> Option<&RelationshipRecord> {
        self.index.get(name).map(|&i| &self.records[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut RelationshipRecord> {
        self.index.get(name).map(|&i| &mut self.records[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &RelationshipRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Largest recorded depth, or None when empty.
    pub fn max_depth(&self) -> Option<usize> {
        self.records.iter().map(|r| r.depth).max()
    }
}

impl Serialize for RelationMap {
    /// Serialized as an object keyed by qualified name, in insertion order.
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for record in &self.records {
            map.serialize_entry(&record.name, record)?;
        }
        map.end()
    }
}

/// Bounded-depth, cycle-safe exploration of a route handler's class graph.
///
/// One engine per explore call: the visited set and relation map are owned
/// by this value and returned when exploration finishes, never shared or
/// reused. Narration is written to `out` as exploration proceeds; every
/// skip, miss, or discovery produces a human-readable line.
pub struct AnalysisEngine<'a, W: Write> {
    snapshot: &'a AppSnapshot,
    config: &'a ExplorerConfig,
    resolver: SymbolResolver<'a>,
    scanner: PatternScanner<'a>,
    max_depth: usize,
    visited: HashSet<String>,
    relations: RelationMap,
    out: W,
}

impl<'a, W: Write> AnalysisEngine<'a, W> {
    pub fn new(
        snapshot: &'a AppSnapshot,
        config: &'a ExplorerConfig,
        max_depth: usize,
        out: W,
    ) -> Self {
        let resolver = SymbolResolver::new(snapshot, config);
        let scanner = PatternScanner::new(resolver, &snapshot.auth, config);
        Self {
            snapshot,
            config,
            resolver,
            scanner,
            max_depth,
            visited: HashSet::new(),
            relations: RelationMap::default(),
            out,
        }
    }

    /// Explore a route's middleware chain and handler, returning the
    /// accumulated relationship map.
    ///
    /// The security gate runs first and is the only fatal failure: this tool
    /// inspects live application internals and refuses to run outside the
    /// allowed environments. Everything else (unresolvable classes, missing
    /// methods, failed alias lookups) degrades to a narrated, skipped branch.
    pub fn explore_route(mut self, route: &RouteInfo) -> Result<RelationMap> {
        self.check_gate()?;

        self.line(0, "🔗 Exploring route chain...");
        self.explore_middleware(route);

        match route.action.as_deref() {
            Some(action) => match action.split_once('@') {
                Some((class, method)) => {
                    // Route tables may register handlers by short name.
                    let class = self
                        .resolver
                        .resolve_short_name(class)
                        .unwrap_or_else(|| class.to_string());
                    self.line(0, &format!("🎯 Starting from: {class}@{method}"));
                    self.explore_class(&class, 0, "Controller");
                    self.explore_method(&class, method, 1);
                }
                None => {
                    // Invokable handler: a class without a named method.
                    let class = self
                        .resolver
                        .resolve_short_name(action)
                        .unwrap_or_else(|| action.to_string());
                    self.line(0, &format!("🎯 Starting from: {class}"));
                    self.explore_class(&class, 0, "Controller");
                }
            },
            None => self.line(0, "⚠️  Could not determine route action (closure?)"),
        }

        Ok(self.relations)
    }

    /// Environment precondition. Checked before any exploration; a violation
    /// aborts the whole call with an error naming the offending setting.
    fn check_gate(&self) -> Result<()> {
        let env = &self.snapshot.environment;
        let allowed = &self.config.security.allowed_environments;
        if !allowed.iter().any(|e| e == env) {
            bail!(
                "route exploration is disabled in the '{env}' environment; allowed environments: {}",
                allowed.join(", ")
            );
        }
        if self.config.security.require_debug && !self.snapshot.debug {
            bail!("route exploration requires debug mode to be enabled");
        }
        Ok(())
    }

    /// Middleware chain: built-in groups pass through as labels; everything
    /// else is alias-resolved, then skip-checked (in that order), and
    /// explored at depth 2, one level below the handler, to visually
    /// subordinate it in the tree.
    fn explore_middleware(&mut self, route: &RouteInfo) {
        if route.middleware.is_empty() {
            return;
        }
        self.line(0, "🛡️  Middleware:");

        for mw in &route.middleware {
            if self.config.middleware_groups.iter().any(|g| g == mw) {
                self.line(1, &format!("├─ {mw} (group)"));
                continue;
            }

            // "throttle:60,1" carries parameters after the colon.
            let base = mw.split(':').next().unwrap_or(mw);

            let resolved = if self.resolver.class_exists(base) {
                Some(base.to_string())
            } else {
                self.snapshot.middleware_aliases.get(base).cloned()
            };

            match resolved {
                Some(class) => {
                    self.line(1, &format!("├─ {base} → {class}"));
                    if !self.resolver.should_skip(&class) {
                        self.explore_class(&class, 2, "Middleware");
                    }
                }
                None => self.line(1, &format!("├─ {base}")),
            }
        }
    }

    /// Recursive class exploration. A symbol is explored at most once;
    /// first-visit depth wins. Skipped symbols are narrated but never
    /// recorded and never marked visited, so later references skip again.
    fn explore_class(&mut self, name: &str, depth: usize, context: &str) {
        let resolver = self.resolver;

        if resolver.should_skip(name) {
            self.line(depth, &format!("⏭️  {name} (framework, skipped)"));
            return;
        }
        if depth > self.max_depth {
            self.line(depth, &format!("⚠️  Max depth reached for {name}"));
            return;
        }
        if self.visited.contains(name) {
            return;
        }
        self.visited.insert(name.to_string());

        let Some(class) = resolver.class(name) else {
            self.line(depth, &format!("❌ {name} not found"));
            return;
        };

        let kind = classify(name, class, &resolver, &self.config.model_base);
        self.line(depth, &format!("{} {name} ({context})", kind.glyph()));

        self.relations.insert(RelationshipRecord {
            name: name.to_string(),
            kind,
            context: context.to_string(),
            depth,
            extends: class.parent.clone(),
            implements: class.interfaces.clone(),
            mixins: class.traits.clone(),
            file: class.file.clone(),
            dependencies: Vec::new(),
        });

        // Structural recursion order is the determinism contract for
        // first-visit depths: parent, interfaces, mixins, constructor.
        if let Some(parent) = &class.parent {
            self.line(depth, &format!("  ↗️  Extends: {parent}"));
            self.explore_class(parent, depth + 1, "Parent Class");
        }
        for iface in &class.interfaces {
            self.line(depth, &format!("  🔌 Implements: {iface}"));
            self.explore_class(iface, depth + 1, "Interface");
        }
        for mixin in &class.traits {
            self.line(depth, &format!("  🧩 Uses Trait: {mixin}"));
            self.explore_class(mixin, depth + 1, "Trait");
        }
        if let Some(ctor) = &class.constructor {
            self.analyze_parameters(&ctor.params, name, depth + 1, "Constructor");
        }
    }

    /// Handler-method exploration: parameter analysis plus body scanning.
    fn explore_method(&mut self, class_name: &str, method_name: &str, depth: usize) {
        let resolver = self.resolver;
        let Some(class) = resolver.class(class_name) else {
            return;
        };
        let Some(method) = class.method(method_name) else {
            self.line(
                depth,
                &format!("❌ Method {method_name} not found in {class_name}"),
            );
            return;
        };

        self.line(depth, &format!("🔧 Method: {method_name}()"));
        self.analyze_parameters(
            &method.params,
            class_name,
            depth,
            &format!("Method: {method_name}"),
        );

        let Some(source) = self.snapshot.method_source(class, method) else {
            return;
        };
        let matches = self.scanner.scan(&source);
        for m in matches {
            if resolver.should_skip(&m.class) {
                self.line(depth, &format!("⏭️  {} (framework, skipped)", m.class));
                continue;
            }
            self.line(depth, &format!("🔍 Found: {} → {}", m.pattern, m.class));
            self.add_dependency(
                class_name,
                DependencyEdge {
                    target: m.class.clone(),
                    via: m.usage.to_string(),
                    context: format!("Method Body: {method_name}"),
                },
            );
            self.explore_class(&m.class, depth + 1, "Runtime Dependency");
            if is_model(&m.class, &resolver, &self.config.model_base) {
                self.explore_entity_relations(&m.class, depth + 1);
            }
        }
    }

    /// Typed, non-primitive parameters become dependency edges on the owner
    /// and are explored at the given depth. Framework-typed parameters are
    /// narrated but produce neither an edge nor a record.
    fn analyze_parameters(
        &mut self,
        params: &'a [ParamSig],
        owner: &str,
        depth: usize,
        context: &str,
    ) {
        let resolver = self.resolver;

        for param in params {
            let Some(type_name) = param.type_name.as_deref() else {
                continue;
            };
            if param.builtin {
                continue;
            }

            if resolver.should_skip(type_name) {
                self.line(depth, &format!("📋 {}: {type_name} (framework)", param.name));
                continue;
            }

            self.line(depth, &format!("💉 Injected: {}: {type_name}", param.name));
            self.add_dependency(
                owner,
                DependencyEdge {
                    target: type_name.to_string(),
                    via: param.name.clone(),
                    context: context.to_string(),
                },
            );

            self.explore_class(type_name, depth, "Dependency");
            if is_model(type_name, &resolver, &self.config.model_base) {
                self.explore_entity_relations(type_name, depth);
            }
        }
    }

    /// Relation accessors on an entity: public, zero-parameter, non-static,
    /// non-dunder methods whose return type is a relation marker. The
    /// related entity is guessed from the accessor name and only explored
    /// when the guess resolves; bad guesses are dropped silently.
    fn explore_entity_relations(&mut self, entity: &str, depth: usize) {
        let resolver = self.resolver;
        let Some(class) = resolver.class(entity) else {
            return;
        };

        self.line(depth, "🗄️  Exploring model relations...");
        for method in &class.methods {
            if !method.is_public
                || method.is_static
                || !method.params.is_empty()
                || method.name.starts_with("__")
            {
                continue;
            }
            let Some(return_type) = method.return_type.as_deref() else {
                continue;
            };
            let Some(kind) = relation_kind(return_type, &self.config.relation_types) else {
                continue;
            };

            self.line(depth, &format!("  🔗 {}(): {kind}", method.name));

            let guess = format!(
                "{}{}",
                self.config.namespaces.models,
                guess_entity_name(&method.name)
            );
            if resolver.class_exists(&guess) {
                self.explore_class(&guess, depth + 1, &format!("Related Model ({kind})"));
            }
        }
    }

    fn add_dependency(&mut self, owner: &str, edge: DependencyEdge) {
        if let Some(record) = self.relations.get_mut(owner) {
            record.dependencies.push(edge);
        }
    }

    fn line(&mut self, depth: usize, msg: &str) {
        let _ = writeln!(self.out, "{}{msg}", "  ".repeat(depth));
    }
}
