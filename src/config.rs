//! Project configuration: `.mockchain.json`, looked up from the target file upward.
//!
//! Read on every invocation and never cached, so edits to the file take effect on the
//! next run. CLI flags override whatever the file says.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ChainError;
use crate::convention::{Convention, ConventionPolicy};

pub const CONFIG_FILE_NAME: &str = ".mockchain.json";
pub const DEFAULT_IN_ORDER_VARIABLE: &str = "inOrder";

const JAVA_IDENTIFIER: &str = r"^[A-Za-z_$][A-Za-z0-9_$]*$";

const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long", "native",
    "new", "package", "private", "protected", "public", "return", "short", "static", "strictfp",
    "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try", "void",
    "volatile", "while", "true", "false", "null", "var",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Enforced dialect family; absent means none
    pub convention: Option<Convention>,
    /// Base name of introduced `InOrder` locals
    pub in_order_variable: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            convention: None,
            in_order_variable: DEFAULT_IN_ORDER_VARIABLE.to_string(),
        }
    }
}

impl Config {
    /// Parse and validate one config file.
    pub fn load(path: &Path) -> Result<Config, ChainError> {
        let (text, _) = crate::read_file_lossy(path)?;
        let config: Config = serde_json::from_str(&text).map_err(|e| ChainError::InvalidConfig {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate().map_err(|message| ChainError::InvalidConfig {
            path: path.display().to_string(),
            message,
        })?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_identifier(&self.in_order_variable)
    }

    /// Nearest `.mockchain.json` from `start` upward, else the per-user config.
    pub fn discover(start: &Path) -> Result<(Config, Option<PathBuf>), ChainError> {
        Self::discover_with(start, user_config_path().as_deref())
    }

    pub fn discover_with(start: &Path, user_config: Option<&Path>) -> Result<(Config, Option<PathBuf>), ChainError> {
        let dir = if start.is_dir() { start } else { start.parent().unwrap_or(start) };
        let project = dir
            .ancestors()
            .map(|ancestor| ancestor.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file());
        let found = project.or_else(|| user_config.filter(|p| p.is_file()).map(Path::to_path_buf));
        match found {
            Some(path) => {
                debug!(path = %path.display(), "Loading config");
                Ok((Config::load(&path)?, Some(path)))
            }
            None => Ok((Config::default(), None)),
        }
    }

    pub fn policy(&self) -> ConventionPolicy {
        ConventionPolicy { enforced: self.convention }
    }
}

/// `<config dir>/mockchain/config.json`.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("mockchain").join("config.json"))
}

/// Reject anything that cannot name a Java local variable.
pub fn validate_identifier(name: &str) -> Result<(), String> {
    let pattern = Regex::new(JAVA_IDENTIFIER).map_err(|e| e.to_string())?;
    if !pattern.is_match(name) {
        return Err(format!("'{name}' is not a valid Java identifier"));
    }
    if JAVA_KEYWORDS.contains(&name) {
        return Err(format!("'{name}' is a reserved Java keyword"));
    }
    Ok(())
}
