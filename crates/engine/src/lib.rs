use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod anim;
pub mod app;
pub mod config;
pub mod store;

pub use anim::{
    command_sync, Animation, AnimationLoader, AssetLoadError, CommandError, FrameView,
    SpriteAnimation, SpriteDirectoryLoader,
};
pub use app::{
    run_app, AppError, ControlAction, DispatchOutcome, Dispatcher, EntitySlot, EntitySlots,
    FrameInput, FrameOutcome, IgnoreReason, LoopConfig, PreviewContext, Previewer, Role, SlotId,
    SpeedFactor, Tint,
};
pub use config::{
    load_action_table, load_key_bindings, ActionDescriptor, ActionTable, BoundAction,
    ConfigLoadError, KeyBindings,
};
pub use store::{JsonFileStore, KeyValueStore, StoreError};

pub const ROOT_ENV_VAR: &str = "SPRITE_PREVIEW_ROOT";
pub const BINDINGS_FILE: &str = "bindings.json";
pub const ACTIONS_FILE: &str = "actions.json";
pub const STORE_FILE: &str = "store";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub bindings_file: PathBuf,
    pub actions_file: PathBuf,
    pub store_file: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error(
        "SPRITE_PREVIEW_ROOT is set but does not point to a valid data directory: {path}\n\
A valid data directory must contain bindings.json and actions.json."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not find a data directory by walking upward from executable directory: {start_dir}\n\
Expected a directory containing bindings.json and actions.json.\n\
Set {env_var} explicitly, for example:\n\
Bash/zsh: export {env_var}=\"/path/to/preview-data\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    Ok(app_paths_for_root(root))
}

pub fn app_paths_for_root(root: PathBuf) -> AppPaths {
    AppPaths {
        bindings_file: root.join(BINDINGS_FILE),
        actions_file: root.join(ACTIONS_FILE),
        store_file: root.join(STORE_FILE),
        root,
    }
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let normalized = normalize_path(&PathBuf::from(value));
            if is_data_dir(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            exe_dir
                .ancestors()
                .find(|candidate| is_data_dir(candidate))
                .map(normalize_path)
                .ok_or_else(|| StartupError::RootNotFound {
                    start_dir: normalize_path(&exe_dir),
                    env_var: ROOT_ENV_VAR,
                })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn is_data_dir(path: &Path) -> bool {
    path.join(BINDINGS_FILE).is_file() && path.join(ACTIONS_FILE).is_file()
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
