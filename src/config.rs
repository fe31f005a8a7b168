use std::path::Path;

use serde::Deserialize;

/// Application-namespace aliases used to resolve short class names.
///
/// Kept as a fixed-field struct rather than a map so that short-name
/// resolution tries the aliases in a deterministic order (declaration
/// order below): the first namespace under which a candidate resolves wins.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Namespaces {
    pub app: String,
    pub models: String,
    pub controllers: String,
    pub middleware: String,
    pub jobs: String,
    pub events: String,
    pub notifications: String,
    pub listeners: String,
    pub policies: String,
    pub rules: String,
    pub providers: String,
}

impl Default for Namespaces {
    fn default() -> Self {
        Self {
            app: "App\\".into(),
            models: "App\\Models\\".into(),
            controllers: "App\\Http\\Controllers\\".into(),
            middleware: "App\\Http\\Middleware\\".into(),
            jobs: "App\\Jobs\\".into(),
            events: "App\\Events\\".into(),
            notifications: "App\\Notifications\\".into(),
            listeners: "App\\Listeners\\".into(),
            policies: "App\\Policies\\".into(),
            rules: "App\\Rules\\".into(),
            providers: "App\\Providers\\".into(),
        }
    }
}

impl Namespaces {
    /// All aliases in resolution order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        [
            self.app.as_str(),
            self.models.as_str(),
            self.controllers.as_str(),
            self.middleware.as_str(),
            self.jobs.as_str(),
            self.events.as_str(),
            self.notifications.as_str(),
            self.listeners.as_str(),
            self.policies.as_str(),
            self.rules.as_str(),
            self.providers.as_str(),
        ]
        .into_iter()
    }
}

/// Security gate settings: the explorer reflects over live application
/// internals and must not be reachable in production deployments.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Environments in which exploration is permitted.
    pub allowed_environments: Vec<String>,
    /// When true, the snapshot's debug flag must also be set.
    pub require_debug: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_environments: vec![
                "local".into(),
                "development".into(),
                "testing".into(),
            ],
            require_debug: true,
        }
    }
}

/// Configuration loaded from `route-explorer.toml` next to the snapshot file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Default maximum exploration depth (overridable with --depth).
    pub max_depth: usize,
    /// Application-namespace aliases for short-name resolution.
    pub namespaces: Namespaces,
    /// Framework/vendor namespace prefixes excluded from exploration.
    pub skip_namespaces: Vec<String>,
    /// ORM base entity class: anything transitively extending it is a Model.
    pub model_base: String,
    /// Return types marking a zero-argument method as a relation accessor.
    pub relation_types: Vec<String>,
    /// Known non-entity facade names excluded by the static-call detector.
    pub facades: Vec<String>,
    /// Built-in middleware group names passed through as labeled groups.
    pub middleware_groups: Vec<String>,
    pub security: SecurityConfig,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            namespaces: Namespaces::default(),
            skip_namespaces: vec![
                "Illuminate\\".into(),
                "Symfony\\".into(),
                "Psr\\".into(),
                "Carbon\\".into(),
                "Monolog\\".into(),
                "Laravel\\".into(),
            ],
            model_base: "Illuminate\\Database\\Eloquent\\Model".into(),
            relation_types: vec![
                "Illuminate\\Database\\Eloquent\\Relations\\HasOne".into(),
                "Illuminate\\Database\\Eloquent\\Relations\\HasMany".into(),
                "Illuminate\\Database\\Eloquent\\Relations\\BelongsTo".into(),
                "Illuminate\\Database\\Eloquent\\Relations\\BelongsToMany".into(),
                "Illuminate\\Database\\Eloquent\\Relations\\MorphOne".into(),
                "Illuminate\\Database\\Eloquent\\Relations\\MorphMany".into(),
                "Illuminate\\Database\\Eloquent\\Relations\\MorphTo".into(),
            ],
            facades: vec![
                "Auth".into(),
                "DB".into(),
                "Cache".into(),
                "Log".into(),
                "Mail".into(),
                "Queue".into(),
            ],
            middleware_groups: vec!["web".into(), "api".into()],
            security: SecurityConfig::default(),
        }
    }
}

impl ExplorerConfig {
    /// Load configuration from `route-explorer.toml` in the given directory.
    ///
    /// Returns the default configuration if the file does not exist or
    /// cannot be parsed.
    pub fn load(dir: &Path) -> Self {
        let config_path = dir.join("route-explorer.toml");

        if !config_path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(config) => config,
                Err(err) => {
                    eprintln!(
                        "warning: failed to parse route-explorer.toml: {err}. Using defaults."
                    );
                    Self::default()
                }
            },
            Err(err) => {
                eprintln!("warning: failed to read route-explorer.toml: {err}. Using defaults.");
                Self::default()
            }
        }
    }
}
