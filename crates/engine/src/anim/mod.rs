//! Seam to the animation subsystem being previewed.
//!
//! The previewer only needs an animation to advance in time, accept command
//! tokens, and expose its current frame. [`SpriteDirectoryLoader`] is the
//! bundled implementation; tests substitute their own.

mod frame_names;
mod sprite;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

pub use frame_names::FrameNameError;
pub use sprite::{SpriteAnimation, SpriteDirectoryLoader, MANIFEST_FILE};

#[derive(Debug, Error)]
pub enum AssetLoadError {
    #[error("animation directory does not exist: {path}")]
    MissingDirectory { path: PathBuf },
    #[error("animation directory has no {MANIFEST_FILE}: {path}")]
    MissingManifest { path: PathBuf },
    #[error("failed to read {path}: {source}")]
    ReadManifest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path} at {location}: {message}")]
    ParseManifest {
        path: PathBuf,
        location: String,
        message: String,
    },
    #[error("invalid animation manifest {path}: {message}")]
    InvalidManifest { path: PathBuf, message: String },
    #[error("invalid frame name '{name}' in {path}: {source}")]
    InvalidFrameName {
        path: PathBuf,
        name: String,
        #[source]
        source: FrameNameError,
    },
    #[error("failed to decode frame {path}: {message}")]
    DecodeFrame { path: PathBuf, message: String },
    #[error("failed to start background load: {0}")]
    WorkerSpawn(#[source] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown animation command '{command}'")]
    UnknownCommand { command: String },
}

/// Borrowed RGBA8 pixels of the frame an animation is currently showing.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub width: u32,
    pub height: u32,
    pub rgba: &'a [u8],
}

pub trait Animation: Send {
    /// Advances simulated time.
    fn think(&mut self, elapsed: Duration);

    fn check_commands(&self, commands: &[String]) -> Result<(), CommandError>;

    /// Queues commands for this animation alone. Returns once queued.
    fn command_n(&mut self, commands: &[String]) -> Result<(), CommandError>;

    fn until_next_boundary(&self) -> Duration;

    /// Queues commands whose first transition starts exactly `delay` of
    /// simulated time from now.
    fn command_at(
        &mut self,
        commands: &[String],
        delay: Duration,
        sync_mode: &str,
    ) -> Result<(), CommandError>;

    fn status_line(&self) -> String;

    fn frame(&self) -> Option<FrameView<'_>>;
}

pub trait AnimationLoader: Send + Sync + 'static {
    fn load(&self, directory: &Path) -> Result<Box<dyn Animation>, AssetLoadError>;
}

/// Issues one command list per participant so their first transitions land
/// on the same simulated instant.
///
/// Every participant is validated before any is commanded. The common delay
/// is the latest of the participants' next frame boundaries; since all
/// participants advance by the same scaled time each frame, they reach it in
/// the same `think` call.
pub fn command_sync(
    participants: &mut [(&mut dyn Animation, &[String])],
    sync_mode: &str,
) -> Result<Duration, CommandError> {
    for (animation, commands) in participants.iter() {
        animation.check_commands(commands)?;
    }
    let delay = participants
        .iter()
        .map(|(animation, _)| animation.until_next_boundary())
        .max()
        .unwrap_or(Duration::ZERO);
    for (animation, commands) in participants.iter_mut() {
        animation.command_at(commands, delay, sync_mode)?;
    }
    Ok(delay)
}
