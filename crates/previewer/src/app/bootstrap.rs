use std::sync::Arc;

use preview_engine::{
    load_action_table, load_key_bindings, resolve_app_paths, ConfigLoadError, Dispatcher,
    JsonFileStore, KeyBindings, LoopConfig, PreviewContext, Previewer, SpriteDirectoryLoader,
    StartupError,
};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) previewer: Previewer,
    pub(crate) bindings: KeyBindings,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigLoadError),
}

/// Resolves the data directory and loads both configuration files. Any
/// failure here is fatal; nothing has been opened yet.
pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    info!("=== Sprite Preview Startup ===");

    let paths = resolve_app_paths()?;
    info!(
        root = %paths.root.display(),
        bindings = %paths.bindings_file.display(),
        actions = %paths.actions_file.display(),
        store = %paths.store_file.display(),
        "startup"
    );

    let actions = load_action_table(&paths.actions_file)?;
    let bindings = load_key_bindings(&paths.bindings_file, &actions)?;
    info!(action_count = actions.len(), "config_loaded");

    let previewer = Previewer::new(PreviewContext {
        dispatcher: Dispatcher::new(actions),
        store: Box::new(JsonFileStore::new(paths.store_file)),
        loader: Arc::new(SpriteDirectoryLoader),
    });

    Ok(AppWiring {
        config: LoopConfig::default(),
        previewer,
        bindings,
    })
}

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
