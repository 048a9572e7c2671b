//! Environment labels and `.env` file loading

use crate::core::{ConfigError, ConfigResult};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Deployment environment the registry is initialized for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    /// Local development
    Development,
    /// Pre-production
    Staging,
    /// Production
    Production,
    /// Test suites
    Testing,
}

impl Environment {
    /// Label as accepted by [`FromStr`]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
            Self::Testing => "testing",
        }
    }

    /// Name of the env file loaded for this environment
    pub const fn dotenv_file(self) -> &'static str {
        match self {
            Self::Development | Self::Staging | Self::Production => ".env",
            Self::Testing => ".env.testing",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Err(ConfigError::EnvRequired),
            "development" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" => Ok(Self::Production),
            "testing" => Ok(Self::Testing),
            other => Err(ConfigError::invalid_env(other)),
        }
    }
}

/// Hook that loads an env file into the process environment
pub type DotenvHook = fn(&Path) -> Result<(), String>;

/// Default hook backed by `dotenvy`
///
/// Variables already present in the process environment are not overridden.
pub fn load_with_dotenvy(path: &Path) -> Result<(), String> {
    dotenvy::from_path(path).map_err(|e| e.to_string())
}

/// Hook that loads nothing, for registries fed entirely by loaders
pub fn skip_dotenv(_path: &Path) -> Result<(), String> {
    Ok(())
}

/// Locates and loads the env file for an [`Environment`]
#[derive(Debug, Clone)]
pub struct DotenvLoader {
    dir: Option<PathBuf>,
    hook: DotenvHook,
}

impl Default for DotenvLoader {
    fn default() -> Self {
        Self {
            dir: None,
            hook: load_with_dotenvy,
        }
    }
}

impl DotenvLoader {
    /// Loader reading from the current working directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Look for env files in `dir` instead of the working directory
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Replace the load hook
    pub fn with_hook(mut self, hook: DotenvHook) -> Self {
        self.hook = hook;
        self
    }

    /// Path of the env file for `env`
    pub fn file_for(&self, env: Environment) -> PathBuf {
        let file = env.dotenv_file();
        match &self.dir {
            Some(dir) => dir.join(file),
            None => PathBuf::from(file),
        }
    }

    /// Load the env file for `env`
    pub fn load(&self, env: Environment) -> ConfigResult<()> {
        let path = self.file_for(env);
        tracing::debug!(path = %path.display(), %env, "loading env file");
        (self.hook)(&path).map_err(|message| ConfigError::dotenv_failed(env.dotenv_file(), message))
    }
}
