mod actions;
mod bindings;
mod keys;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

pub use actions::{load_action_table, ActionDescriptor, ActionTable};
pub use bindings::{load_key_bindings, BoundAction, KeyBindings};
pub(crate) use keys::key_code_from_name;

/// Startup-fatal problems with `bindings.json` or `actions.json`.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {path} at {location}: {message}")]
    Parse {
        path: PathBuf,
        location: String,
        message: String,
    },
    #[error("{path}: '{name}' is bound to unknown key '{key}'")]
    UnknownKey {
        path: PathBuf,
        name: String,
        key: String,
    },
    #[error("{path}: unknown control action '{name}'")]
    UnknownControl { path: PathBuf, name: String },
    #[error("{path}: no key is bound to 'quit'")]
    MissingQuitBinding { path: PathBuf },
}

fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_json(path, &raw)
}

fn parse_json<T: DeserializeOwned>(path: &Path, raw: &str) -> Result<T, ConfigLoadError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, T>(&mut deserializer).map_err(|error| {
        let location = match error.path().to_string() {
            location if location.is_empty() || location == "." => "<root>".to_string(),
            location => location,
        };
        ConfigLoadError::Parse {
            path: path.to_path_buf(),
            location,
            message: error.into_inner().to_string(),
        }
    })
}
