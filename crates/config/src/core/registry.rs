//! The configuration registry
//!
//! A [`Registry`] owns named sections, each produced by a loader callback.
//! Values are addressed with dot-separated paths whose first segment names
//! the section: `database.connections.mysql.host`.
//!
//! One registry per process is reachable through [`get_config_registry`];
//! [`RegistryBuilder`] builds standalone instances with an injected
//! environment.

use super::path::PathCache;
use super::tree::{set_at, traverse};
use super::{ConfigError, ConfigResult, ConfigTree, Unmarshal, Value, coerce};
use crate::loaders::section::{self, Loader, LoaderContext, SectionData};
use crate::loaders::{DotenvHook, DotenvLoader, EnvReader, EnvSource, Environment};
use crate::validators::ConfigSchema;
use arc_swap::ArcSwapOption;
use parking_lot::{Mutex, RwLock};
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

// ---------------------------------------------------------------------------
// Global instance: ArcSwap for lock-free reads, Mutex to serialize init
// ---------------------------------------------------------------------------

static GLOBAL_REGISTRY: LazyLock<ArcSwapOption<Registry>> = LazyLock::new(ArcSwapOption::empty);
static INIT_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Get the process-wide registry, creating it on first use
///
/// The first successful call parses `env`, loads the matching env file
/// (`.env`, or `.env.testing` for `testing`) and stores the registry. Later
/// calls return the same instance and ignore `env`. A failed first call
/// stores nothing, so the next call tries again.
pub fn get_config_registry(env: &str) -> ConfigResult<Arc<Registry>> {
    if let Some(registry) = GLOBAL_REGISTRY.load_full() {
        warn_on_label_mismatch(&registry, env);
        return Ok(registry);
    }

    let _guard = INIT_LOCK.lock();
    if let Some(registry) = GLOBAL_REGISTRY.load_full() {
        warn_on_label_mismatch(&registry, env);
        return Ok(registry);
    }

    let registry = Arc::new(RegistryBuilder::new().build(env)?);
    GLOBAL_REGISTRY.store(Some(Arc::clone(&registry)));
    tracing::info!(env = %registry.environment(), "config registry initialized");
    Ok(registry)
}

/// The process-wide registry, if it has been initialized
pub fn global_registry() -> Option<Arc<Registry>> {
    GLOBAL_REGISTRY.load_full()
}

/// Drop the process-wide registry so the next [`get_config_registry`] call
/// initializes a fresh one
///
/// Handles already returned keep working on the old instance.
pub fn reset_global() {
    let _guard = INIT_LOCK.lock();
    GLOBAL_REGISTRY.store(None);
}

fn warn_on_label_mismatch(registry: &Registry, env: &str) {
    if env != registry.environment().as_str() {
        tracing::warn!(
            requested = env,
            active = %registry.environment(),
            "config registry already initialized for a different env; ignoring requested env"
        );
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RegistryState {
    sections: HashMap<String, SectionData>,
    loaders: HashMap<String, Loader>,
}

/// Thread-safe store of configuration sections
///
/// Reads, including the environment accessors, take a shared lock;
/// [`register`](Self::register), [`refresh`](Self::refresh),
/// [`set`](Self::set) and [`validate_section`](Self::validate_section) take
/// the exclusive lock. Loaders reach the environment through their
/// [`LoaderContext`] without touching the lock.
pub struct Registry {
    environment: Environment,
    state: RwLock<RegistryState>,
    paths: PathCache,
    env: EnvReader,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("environment", &self.environment)
            .field("sections", &self.sections())
            .field("cached_paths", &self.paths.len())
            .finish()
    }
}

impl Registry {
    /// The process-wide registry; see [`get_config_registry`]
    pub fn global(env: &str) -> ConfigResult<Arc<Self>> {
        get_config_registry(env)
    }

    /// Start building a standalone registry
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    fn with_env(environment: Environment, env: EnvReader) -> Self {
        Self {
            environment,
            state: RwLock::new(RegistryState::default()),
            paths: PathCache::new(),
            env,
        }
    }

    /// Environment this registry was initialized for
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Environment accessors used by this registry and its loaders
    pub fn env(&self) -> &EnvReader {
        &self.env
    }

    // -- loader lifecycle --------------------------------------------------

    /// Register `loader` under `name` and populate the section immediately
    ///
    /// Re-registering a name replaces both its loader and its section. If the
    /// loader panics the section is stored as an empty tree.
    pub fn register<F, T>(&self, name: impl Into<String>, loader: F)
    where
        F: Fn(&LoaderContext<'_>) -> T + Send + Sync + 'static,
        T: Into<SectionData>,
    {
        self.register_loader(name, section::loader(loader));
    }

    /// Register an already boxed [`Loader`]
    pub fn register_loader(&self, name: impl Into<String>, loader: Loader) {
        let name = name.into();
        let mut state = self.state.write();

        let ctx = LoaderContext::new(&name, &self.env);
        let data = match section::invoke(&loader, &ctx) {
            Ok(data) => data,
            Err(panic) => {
                tracing::warn!(section = %name, %panic, "config loader panicked during registration");
                Some(ConfigTree::new())
            }
        };

        tracing::debug!(section = %name, nil = data.is_none(), "registered config section");
        state.loaders.insert(name.clone(), loader);
        state.sections.insert(name, data);
    }

    /// Re-run every registered loader
    ///
    /// Successful loaders overwrite their section. A panicking loader keeps
    /// its previous section (or gets an empty one if it had none) and does
    /// not stop the others.
    pub fn refresh(&self) {
        let mut guard = self.state.write();
        let state = &mut *guard;

        for (name, loader) in &state.loaders {
            let ctx = LoaderContext::new(name, &self.env);
            match section::invoke(loader, &ctx) {
                Ok(data) => {
                    state.sections.insert(name.clone(), data);
                }
                Err(panic) => {
                    tracing::warn!(section = %name, %panic, "config loader panicked during refresh");
                    state
                        .sections
                        .entry(name.clone())
                        .or_insert_with(|| Some(ConfigTree::new()));
                }
            }
        }

        tracing::debug!(loaders = state.loaders.len(), "refreshed config sections");
    }

    // -- path access -------------------------------------------------------

    fn read_with<T>(
        &self,
        path: &str,
        f: impl FnOnce(&Value, &str) -> ConfigResult<T>,
    ) -> ConfigResult<T> {
        let segments = self.paths.get(path);
        let state = self.state.read();
        let value = resolve(&state.sections, &segments, path)?;
        f(&*value, path)
    }

    fn read_or<T>(
        &self,
        path: &str,
        default: impl FnOnce() -> T,
        f: impl FnOnce(&Value, &str) -> ConfigResult<T>,
    ) -> ConfigResult<T> {
        let segments = self.paths.get(path);
        let state = self.state.read();
        match resolve(&state.sections, &segments, path) {
            Ok(value) => f(&*value, path),
            Err(_) => Ok(default()),
        }
    }

    /// Value at `path`
    ///
    /// A single-segment path returns the whole section as [`Value::Map`].
    pub fn get(&self, path: &str) -> ConfigResult<Value> {
        self.read_with(path, |value, _| Ok(value.clone()))
    }

    /// Whether `path` resolves to a value
    pub fn has(&self, path: &str) -> bool {
        self.read_with(path, |_, _| Ok(())).is_ok()
    }

    /// Assign `value` at `path`
    ///
    /// The path needs a section and at least one key, and the section must
    /// already be registered. Missing or scalar intermediate keys are
    /// replaced with maps.
    pub fn set(&self, path: &str, value: impl Into<Value>) -> ConfigResult<()> {
        let segments = self.paths.get(path);
        let [section, keys @ ..] = &segments[..] else {
            return Err(ConfigError::invalid_path(path));
        };
        if keys.is_empty() {
            return Err(ConfigError::invalid_path(path));
        }

        let mut state = self.state.write();
        let slot = state
            .sections
            .get_mut(section)
            .ok_or_else(|| ConfigError::unknown_section(section.as_str()))?;
        set_at(slot.get_or_insert_with(ConfigTree::new), keys, value.into());

        tracing::debug!(path, "config value set");
        Ok(())
    }

    /// Registered section names, sorted
    pub fn sections(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.read().sections.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Copy of a whole section
    pub fn snapshot(&self, section: &str) -> ConfigResult<ConfigTree> {
        let state = self.state.read();
        section_tree(&state.sections, section).cloned()
    }

    // -- typed getters -----------------------------------------------------

    /// String at `path`
    pub fn get_string(&self, path: &str) -> ConfigResult<String> {
        self.read_with(path, coerce::to_string)
    }

    /// String at `path`, or `default` if nothing is stored there
    ///
    /// Only lookup failures fall back; a stored value of the wrong type is
    /// still an error. The same holds for every `*_or` getter.
    pub fn get_string_or(&self, path: &str, default: impl Into<String>) -> ConfigResult<String> {
        self.read_or(path, || default.into(), coerce::to_string)
    }

    /// Integer at `path`
    pub fn get_int(&self, path: &str) -> ConfigResult<i64> {
        self.read_with(path, coerce::to_int)
    }

    /// Integer at `path`, or `default`
    pub fn get_int_or(&self, path: &str, default: i64) -> ConfigResult<i64> {
        self.read_or(path, || default, coerce::to_int)
    }

    /// Boolean at `path`
    pub fn get_bool(&self, path: &str) -> ConfigResult<bool> {
        self.read_with(path, coerce::to_bool)
    }

    /// Boolean at `path`, or `default`
    pub fn get_bool_or(&self, path: &str, default: bool) -> ConfigResult<bool> {
        self.read_or(path, || default, coerce::to_bool)
    }

    /// Float at `path`
    pub fn get_float(&self, path: &str) -> ConfigResult<f64> {
        self.read_with(path, coerce::to_float)
    }

    /// Float at `path`, or `default`
    pub fn get_float_or(&self, path: &str, default: f64) -> ConfigResult<f64> {
        self.read_or(path, || default, coerce::to_float)
    }

    /// String list at `path`
    pub fn get_string_array(&self, path: &str) -> ConfigResult<Vec<String>> {
        self.read_with(path, coerce::to_string_array)
    }

    /// String list at `path`, or `default`
    pub fn get_string_array_or(&self, path: &str, default: &[&str]) -> ConfigResult<Vec<String>> {
        self.read_or(
            path,
            || default.iter().map(|s| (*s).to_string()).collect(),
            coerce::to_string_array,
        )
    }

    // -- environment -------------------------------------------------------

    /// See [`EnvReader::string`]
    pub fn env_string(&self, key: &str, default: &str) -> String {
        let _state = self.state.read();
        self.env.string(key, default)
    }

    /// See [`EnvReader::int`]
    pub fn env_int(&self, key: &str, default: i64) -> i64 {
        let _state = self.state.read();
        self.env.int(key, default)
    }

    /// See [`EnvReader::bool`]
    pub fn env_bool(&self, key: &str, default: bool) -> bool {
        let _state = self.state.read();
        self.env.bool(key, default)
    }

    /// See [`EnvReader::string_array`]
    pub fn env_string_array(&self, key: &str, default: &[&str]) -> Vec<String> {
        let _state = self.state.read();
        self.env.string_array(key, default)
    }

    // -- records -----------------------------------------------------------

    /// Fill `target` from the section named `section`
    ///
    /// `section` is a name, not a path.
    pub fn unmarshal<T: Unmarshal + ?Sized>(&self, section: &str, target: &mut T) -> ConfigResult<()> {
        let state = self.state.read();
        let tree = section_tree(&state.sections, section)?;
        target.unmarshal_from(tree)
    }

    /// Fill `target` from the map stored at `path`
    pub fn unmarshal_key<T: Unmarshal + ?Sized>(&self, path: &str, target: &mut T) -> ConfigResult<()> {
        self.read_with(path, |value, path| match value {
            Value::Map(tree) => target.unmarshal_from(tree),
            _ => Err(ConfigError::NotATree {
                path: path.to_string(),
            }),
        })
    }

    /// Build a `T` from its default and the section named `section`
    pub fn unmarshal_as<T: Unmarshal + Default>(&self, section: &str) -> ConfigResult<T> {
        let mut target = T::default();
        self.unmarshal(section, &mut target)?;
        Ok(target)
    }

    /// Build a `T` from its default and the map stored at `path`
    pub fn unmarshal_key_as<T: Unmarshal + Default>(&self, path: &str) -> ConfigResult<T> {
        let mut target = T::default();
        self.unmarshal_key(path, &mut target)?;
        Ok(target)
    }

    // -- validation --------------------------------------------------------

    /// Validate a section against `schema`, writing defaults into it
    pub fn validate_section(&self, section: &str, schema: &ConfigSchema) -> ConfigResult<()> {
        let mut state = self.state.write();
        let tree = match state.sections.get_mut(section) {
            Some(Some(tree)) => tree,
            Some(None) => return Err(ConfigError::section_nil(section, section)),
            None => return Err(ConfigError::section_not_found(section, section)),
        };
        schema.validate(tree)?;
        tracing::debug!(section, fields = schema.len(), "config section validated");
        Ok(())
    }
}

fn section_tree<'a>(
    sections: &'a HashMap<String, SectionData>,
    section: &str,
) -> ConfigResult<&'a ConfigTree> {
    match sections.get(section) {
        Some(Some(tree)) => Ok(tree),
        Some(None) => Err(ConfigError::section_nil(section, section)),
        None => Err(ConfigError::section_not_found(section, section)),
    }
}

fn resolve<'a>(
    sections: &'a HashMap<String, SectionData>,
    segments: &[String],
    path: &str,
) -> ConfigResult<Cow<'a, Value>> {
    let Some((section, keys)) = segments.split_first() else {
        return Err(ConfigError::invalid_path(path));
    };

    let tree = match sections.get(section) {
        Some(Some(tree)) => tree,
        Some(None) => return Err(ConfigError::section_nil(section.as_str(), path)),
        None => return Err(ConfigError::section_not_found(section.as_str(), path)),
    };

    if keys.is_empty() {
        return Ok(Cow::Owned(Value::Map(tree.clone())));
    }
    traverse(tree, keys, path).map(Cow::Borrowed)
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for standalone registries
///
/// ```
/// use keystone_config::{ConfigTree, MapEnv, Registry, Value};
///
/// let registry = Registry::builder()
///     .with_env_source(MapEnv::new().with_var("APP_NAME", "demo"))
///     .skip_dotenv()
///     .build("testing")
///     .unwrap();
///
/// registry.register("app", |ctx| {
///     let mut tree = ConfigTree::new();
///     tree.insert("name".into(), Value::from(ctx.env_string("APP_NAME", "unknown")));
///     tree
/// });
/// assert_eq!(registry.get_string("app.name").unwrap(), "demo");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    env: Option<EnvReader>,
    dotenv: DotenvLoader,
}

impl RegistryBuilder {
    /// Builder reading the process environment and loading env files from
    /// the working directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Read environment variables from `source`
    pub fn with_env_source(mut self, source: impl EnvSource + 'static) -> Self {
        self.env = Some(EnvReader::new(Arc::new(source)));
        self
    }

    /// Read environment variables through an existing reader
    pub fn with_env_reader(mut self, env: EnvReader) -> Self {
        self.env = Some(env);
        self
    }

    /// Look for env files in `dir`
    pub fn dotenv_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dotenv = self.dotenv.in_dir(dir);
        self
    }

    /// Replace how env files are loaded
    pub fn dotenv_hook(mut self, hook: DotenvHook) -> Self {
        self.dotenv = self.dotenv.with_hook(hook);
        self
    }

    /// Do not load any env file
    pub fn skip_dotenv(self) -> Self {
        self.dotenv_hook(crate::loaders::skip_dotenv)
    }

    /// Parse the env label and build
    pub fn build(self, env: &str) -> ConfigResult<Registry> {
        self.build_for(env.parse()?)
    }

    /// Build for an already parsed environment
    pub fn build_for(self, environment: Environment) -> ConfigResult<Registry> {
        self.dotenv.load(environment)?;
        Ok(Registry::with_env(
            environment,
            self.env.unwrap_or_default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorKind;
    use crate::core::value::tree_from_json;
    use crate::loaders::MapEnv;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn registry() -> Registry {
        Registry::builder()
            .with_env_source(MapEnv::new().with_var("DB_HOST", "db.internal"))
            .skip_dotenv()
            .build("testing")
            .unwrap()
    }

    fn tree(json: serde_json::Value) -> ConfigTree {
        tree_from_json(json).unwrap()
    }

    #[test]
    fn builder_rejects_bad_labels() {
        let err = Registry::builder().skip_dotenv().build("").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InitEnvMissing);

        let err = Registry::builder().skip_dotenv().build("invalid_env").unwrap_err();
        assert_eq!(err.to_string(), "invalid env: invalid_env");
    }

    #[test]
    fn loaders_see_the_injected_env() {
        let registry = registry();
        registry.register("database", |ctx: &LoaderContext<'_>| {
            tree(json!({ "host": ctx.env_string("DB_HOST", "localhost") }))
        });
        assert_eq!(registry.get_string("database.host").unwrap(), "db.internal");
    }

    #[test]
    fn single_segment_returns_the_section() {
        let registry = registry();
        registry.register("app", |_: &LoaderContext<'_>| tree(json!({ "name": "keystone" })));
        let value = registry.get("app").unwrap();
        assert_eq!(value.as_tree().unwrap().len(), 1);
    }

    #[test]
    fn nil_sections_are_distinct_from_missing_ones() {
        let registry = registry();
        registry.register("empty", |_: &LoaderContext<'_>| None::<ConfigTree>);

        let err = registry.get("empty.key").unwrap_err();
        assert_eq!(err.to_string(), "config section is nil: 'empty' in path 'empty.key'");

        let err = registry.get("nope.key").unwrap_err();
        assert_eq!(err.to_string(), "config section not found: 'nope' in path 'nope.key'");

        // Writing into a nil section materializes it.
        registry.set("empty.key", "value").unwrap();
        assert_eq!(registry.get_string("empty.key").unwrap(), "value");
    }

    #[test]
    fn panicking_loader_leaves_an_empty_section() {
        let registry = registry();
        registry.register("broken", |_: &LoaderContext<'_>| -> ConfigTree { panic!("test panic") });
        assert_eq!(registry.sections(), vec!["broken"]);
        assert!(registry.snapshot("broken").unwrap().is_empty());
    }

    #[test]
    fn refresh_keeps_previous_data_when_a_loader_panics() {
        let registry = registry();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        registry.register("flaky", move |_: &LoaderContext<'_>| {
            if seen.fetch_add(1, Ordering::SeqCst) > 0 {
                panic!("second call fails");
            }
            tree(json!({ "v": 1 }))
        });
        registry.register("counter", |_: &LoaderContext<'_>| tree(json!({ "v": 2 })));

        registry.refresh();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(registry.get_int("flaky.v").unwrap(), 1);
        assert_eq!(registry.get_int("counter.v").unwrap(), 2);
    }

    #[test]
    fn refresh_overwrites_values_set_directly() {
        let registry = registry();
        registry.register("app", |_: &LoaderContext<'_>| tree(json!({ "port": 80 })));
        registry.set("app.port", 8080).unwrap();
        assert_eq!(registry.get_int("app.port").unwrap(), 8080);

        registry.refresh();
        assert_eq!(registry.get_int("app.port").unwrap(), 80);
    }

    #[test]
    fn set_needs_a_key_and_an_existing_section() {
        let registry = registry();
        let err = registry.set("app", 1).unwrap_err();
        assert_eq!(err.to_string(), "invalid config path: app");

        let err = registry.set("app.port", 1).unwrap_err();
        assert_eq!(err.to_string(), "config section not found: app");
        assert!(registry.sections().is_empty());
    }

    #[test]
    fn defaults_cover_lookup_failures_only() {
        let registry = registry();
        registry.register("app", |_: &LoaderContext<'_>| tree(json!({ "flag": "maybe" })));

        assert_eq!(registry.get_int_or("app.port", 5432).unwrap(), 5432);
        assert_eq!(registry.get_string_or("other.name", "x").unwrap(), "x");
        assert_eq!(
            registry.get_string_array_or("app.hosts", &["a"]).unwrap(),
            vec!["a"]
        );
        assert!(registry.get_bool_or("app.flag", false).is_err());
    }

    #[test]
    fn env_accessors_wait_for_writers() {
        use std::sync::mpsc;
        use std::time::Duration;

        let registry = registry();
        let (tx, rx) = mpsc::channel();

        std::thread::scope(|scope| {
            let writer = registry.state.write();
            scope.spawn(|| {
                tx.send(registry.env_string("DB_HOST", "unset")).unwrap();
            });

            assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
            drop(writer);
            assert_eq!(rx.recv().unwrap(), "db.internal");
        });
    }

    #[test]
    fn has_and_sections_reflect_state() {
        let registry = registry();
        registry.register("b", |_: &LoaderContext<'_>| tree(json!({ "k": 1 })));
        registry.register("a", |_: &LoaderContext<'_>| tree(json!({})));

        assert!(registry.has("b.k"));
        assert!(!registry.has("b.missing"));
        assert_eq!(registry.sections(), vec!["a", "b"]);
    }
}
