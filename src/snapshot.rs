use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A pre-built snapshot of the host application, exported by host-side
/// tooling and consumed here read-only. It stands in for the host runtime's
/// live reflection API: class records, the route table, the middleware alias
/// registry, the authentication configuration, and the environment flags the
/// security gate checks.
#[derive(Debug, Deserialize, Default)]
pub struct AppSnapshot {
    /// Current runtime environment name. Defaults to "production" when the
    /// exporter omitted it, so the security gate fails safe.
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Whether the application runs with debug mode enabled.
    #[serde(default)]
    pub debug: bool,

    /// All registered routes, in route-table enumeration order.
    #[serde(default)]
    pub routes: Vec<RouteInfo>,

    /// Class records keyed by fully-qualified name. Interfaces and traits
    /// appear here too, flagged accordingly.
    #[serde(default)]
    pub classes: HashMap<String, ClassInfo>,

    /// Middleware alias registry: short name -> fully-qualified class.
    #[serde(default)]
    pub middleware_aliases: HashMap<String, String>,

    /// Authentication configuration (guard -> provider -> entity type).
    #[serde(default)]
    pub auth: AuthConfig,

    /// Directory the snapshot was loaded from; class file paths are resolved
    /// against it. Not part of the serialized document.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

fn default_environment() -> String {
    "production".to_string()
}

/// One route as the host's route table enumerates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteInfo {
    pub uri: String,
    #[serde(default)]
    pub name: Option<String>,
    /// HTTP method set, order preserved (e.g. ["GET", "HEAD"]).
    pub methods: Vec<String>,
    /// Handler in "Fully\Qualified\Class@method" form, absent for closures.
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub middleware: Vec<String>,
}

/// Reflection facts for one class, interface, or trait.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ClassInfo {
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub is_interface: bool,
    #[serde(default)]
    pub is_trait: bool,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_final: bool,
    /// Source file declaring the class, relative to the snapshot file.
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub constructor: Option<MethodSig>,
    #[serde(default)]
    pub methods: Vec<MethodSig>,
}

impl ClassInfo {
    /// Look up a method by name.
    pub fn method(&self, name: &str) -> Option<&MethodSig> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Signature and source-span facts for one method.
#[derive(Debug, Clone, Deserialize)]
pub struct MethodSig {
    pub name: String,
    #[serde(default)]
    pub params: Vec<ParamSig>,
    #[serde(default)]
    pub return_type: Option<String>,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default)]
    pub is_static: bool,
    /// 1-based first line of the method in its declaring file.
    #[serde(default)]
    pub start_line: Option<usize>,
    /// 1-based last line, inclusive.
    #[serde(default)]
    pub end_line: Option<usize>,
}

fn default_true() -> bool {
    true
}

/// One declared method parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct ParamSig {
    pub name: String,
    /// Declared type, absent for untyped parameters.
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
    /// True for primitive/builtin types (int, string, array, ...), which
    /// parameter analysis ignores.
    #[serde(default)]
    pub builtin: bool,
}

/// Guard entry in the auth configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct GuardConfig {
    #[serde(default)]
    pub provider: Option<String>,
}

/// Provider entry in the auth configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProviderConfig {
    #[serde(default)]
    pub model: Option<String>,
}

/// Authentication configuration: guard name -> provider name -> entity type.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub default_guard: Option<String>,
    #[serde(default)]
    pub guards: HashMap<String, GuardConfig>,
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

impl AuthConfig {
    /// Resolve the authenticated-entity type for a guard (or the default
    /// guard when `guard` is None) by walking guard -> provider -> model.
    ///
    /// Returns None on any missing link; the auth detector never guesses.
    pub fn user_model(&self, guard: Option<&str>) -> Option<&str> {
        let guard_name = guard.or(self.default_guard.as_deref())?;
        let provider_name = self.guards.get(guard_name)?.provider.as_deref()?;
        self.providers.get(provider_name)?.model.as_deref()
    }
}

impl AppSnapshot {
    /// Load a snapshot from a JSON file, remembering its directory for
    /// relative source-file resolution.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot '{}'", path.display()))?;
        let mut snapshot: AppSnapshot = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse snapshot '{}'", path.display()))?;
        snapshot.base_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        Ok(snapshot)
    }

    /// Look up a class record by fully-qualified name.
    pub fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    /// Read a method's source text: the declaring file's lines between
    /// `start_line` and `end_line` (1-based, inclusive).
    ///
    /// Returns None when the class has no file, the method has no span, or
    /// the read fails; the caller degrades to "no body scan" for that
    /// method only.
    pub fn method_source(&self, class: &ClassInfo, method: &MethodSig) -> Option<String> {
        let file = class.file.as_ref()?;
        let (start, end) = (method.start_line?, method.end_line?);
        if start == 0 || end < start {
            return None;
        }

        let path = if file.is_absolute() {
            file.clone()
        } else {
            self.base_dir.join(file)
        };
        let contents = std::fs::read_to_string(&path).ok()?;

        let slice: Vec<&str> = contents
            .lines()
            .skip(start - 1)
            .take(end - start + 1)
            .collect();
        if slice.is_empty() {
            return None;
        }
        Some(slice.join("\n"))
    }
}
