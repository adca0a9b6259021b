use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use image::ImageReader;
use serde::Deserialize;

use super::frame_names::validate_frame_name;
use super::{Animation, AnimationLoader, AssetLoadError, CommandError, FrameView};

pub const MANIFEST_FILE: &str = "sprite.json";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SpriteManifest {
    frame_ms: u64,
    start: String,
    anims: BTreeMap<String, ClipManifest>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClipManifest {
    frames: Vec<String>,
    /// Animation that follows once this one finishes. Loops when absent.
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug)]
struct FrameImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

#[derive(Debug)]
struct Clip {
    name: String,
    frames: Vec<Arc<FrameImage>>,
    next: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Start {
    NextBoundary,
    AfterCurrent,
    At { clock: Duration, sync_mode: String },
}

#[derive(Debug)]
struct Pending {
    clip: usize,
    start: Start,
}

/// Frame-based sprite animation loaded from a directory holding a
/// [`MANIFEST_FILE`] and PNG frames.
///
/// Every animation advances on the same fixed frame clock. A command list
/// queues one animation per token: the first starts at the next frame
/// boundary (or at an exact synchronized instant), each later one starts when
/// its predecessor has shown its last frame.
#[derive(Debug)]
pub struct SpriteAnimation {
    frame_time: Duration,
    clips: Vec<Clip>,
    clip_index: HashMap<String, usize>,
    current: usize,
    frame: usize,
    frame_elapsed: Duration,
    clock: Duration,
    queue: VecDeque<Pending>,
}

impl SpriteAnimation {
    pub fn load(directory: &Path) -> Result<Self, AssetLoadError> {
        if !directory.is_dir() {
            return Err(AssetLoadError::MissingDirectory {
                path: directory.to_path_buf(),
            });
        }
        let manifest_path = directory.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return Err(AssetLoadError::MissingManifest {
                path: directory.to_path_buf(),
            });
        }
        let raw =
            fs::read_to_string(&manifest_path).map_err(|source| AssetLoadError::ReadManifest {
                path: manifest_path.clone(),
                source,
            })?;
        let manifest = parse_manifest(&manifest_path, &raw)?;
        build_animation(directory, &manifest_path, manifest)
    }

    fn new(frame_time: Duration, clips: Vec<Clip>, start: usize) -> Self {
        let clip_index = clips
            .iter()
            .enumerate()
            .map(|(index, clip)| (clip.name.clone(), index))
            .collect();
        Self {
            frame_time,
            clips,
            clip_index,
            current: start,
            frame: 0,
            frame_elapsed: Duration::ZERO,
            clock: Duration::ZERO,
            queue: VecDeque::new(),
        }
    }

    fn resolve_commands(&self, commands: &[String]) -> Result<Vec<usize>, CommandError> {
        commands
            .iter()
            .map(|command| {
                self.clip_index
                    .get(command)
                    .copied()
                    .ok_or_else(|| CommandError::UnknownCommand {
                        command: command.clone(),
                    })
            })
            .collect()
    }

    fn enqueue(&mut self, commands: &[String], first: Start) -> Result<(), CommandError> {
        let clips = self.resolve_commands(commands)?;
        let mut start = first;
        for clip in clips {
            self.queue.push_back(Pending { clip, start });
            start = Start::AfterCurrent;
        }
        Ok(())
    }

    fn until_release(&self) -> Option<Duration> {
        match self.queue.front() {
            Some(Pending {
                start: Start::At { clock, .. },
                ..
            }) => Some(clock.saturating_sub(self.clock)),
            _ => None,
        }
    }

    fn advance_clock(&mut self, step: Duration) {
        self.clock += step;
        self.frame_elapsed += step;
    }

    fn start_next(&mut self) {
        if let Some(pending) = self.queue.pop_front() {
            self.current = pending.clip;
            self.frame = 0;
            self.frame_elapsed = Duration::ZERO;
        }
    }

    fn on_boundary(&mut self) {
        self.frame_elapsed = Duration::ZERO;
        if matches!(
            self.queue.front(),
            Some(Pending {
                start: Start::NextBoundary,
                ..
            })
        ) {
            self.start_next();
            return;
        }

        let clip = &self.clips[self.current];
        let (frame_count, next) = (clip.frames.len(), clip.next);
        if self.frame + 1 < frame_count {
            self.frame += 1;
            return;
        }
        if matches!(
            self.queue.front(),
            Some(Pending {
                start: Start::AfterCurrent,
                ..
            })
        ) {
            self.start_next();
        } else {
            self.current = next;
            self.frame = 0;
        }
    }
}

impl Animation for SpriteAnimation {
    fn think(&mut self, elapsed: Duration) {
        let mut remaining = elapsed;
        loop {
            let to_boundary = self.frame_time.saturating_sub(self.frame_elapsed);
            let to_release = self.until_release();
            let step = to_release.map_or(to_boundary, |release| release.min(to_boundary));
            if step > remaining {
                self.advance_clock(remaining);
                return;
            }
            self.advance_clock(step);
            remaining -= step;
            if to_release == Some(step) {
                self.start_next();
            } else {
                self.on_boundary();
            }
        }
    }

    fn check_commands(&self, commands: &[String]) -> Result<(), CommandError> {
        self.resolve_commands(commands).map(|_| ())
    }

    fn command_n(&mut self, commands: &[String]) -> Result<(), CommandError> {
        self.enqueue(commands, Start::NextBoundary)
    }

    fn until_next_boundary(&self) -> Duration {
        self.frame_time.saturating_sub(self.frame_elapsed)
    }

    fn command_at(
        &mut self,
        commands: &[String],
        delay: Duration,
        sync_mode: &str,
    ) -> Result<(), CommandError> {
        self.check_commands(commands)?;
        // Anything still queued would hold the synchronized start back, so it
        // is dropped in favour of the scheduled list.
        self.queue.clear();
        let first = Start::At {
            clock: self.clock + delay,
            sync_mode: sync_mode.to_string(),
        };
        self.enqueue(commands, first)
    }

    fn status_line(&self) -> String {
        let clip = &self.clips[self.current];
        let mut line = format!(
            "{} : {}/{} : {} queued",
            clip.name,
            self.frame + 1,
            clip.frames.len(),
            self.queue.len()
        );
        if let Some(Pending {
            start: Start::At { sync_mode, .. },
            ..
        }) = self.queue.front()
        {
            if !sync_mode.is_empty() {
                line.push_str(&format!(" [{sync_mode}]"));
            }
        }
        line
    }

    fn frame(&self) -> Option<FrameView<'_>> {
        let image = self.clips.get(self.current)?.frames.get(self.frame)?;
        Some(FrameView {
            width: image.width,
            height: image.height,
            rgba: &image.rgba,
        })
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SpriteDirectoryLoader;

impl AnimationLoader for SpriteDirectoryLoader {
    fn load(&self, directory: &Path) -> Result<Box<dyn Animation>, AssetLoadError> {
        Ok(Box::new(SpriteAnimation::load(directory)?))
    }
}

fn parse_manifest(path: &Path, raw: &str) -> Result<SpriteManifest, AssetLoadError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
        let location = match error.path().to_string() {
            location if location.is_empty() || location == "." => "<root>".to_string(),
            location => location,
        };
        AssetLoadError::ParseManifest {
            path: path.to_path_buf(),
            location,
            message: error.into_inner().to_string(),
        }
    })
}

fn build_animation(
    directory: &Path,
    manifest_path: &Path,
    manifest: SpriteManifest,
) -> Result<SpriteAnimation, AssetLoadError> {
    let invalid = |message: String| AssetLoadError::InvalidManifest {
        path: manifest_path.to_path_buf(),
        message,
    };

    if manifest.frame_ms == 0 {
        return Err(invalid("frame_ms must be positive".to_string()));
    }
    if manifest.anims.is_empty() {
        return Err(invalid("no animations defined".to_string()));
    }

    let index: HashMap<&str, usize> = manifest
        .anims
        .keys()
        .enumerate()
        .map(|(position, name)| (name.as_str(), position))
        .collect();
    let start = *index
        .get(manifest.start.as_str())
        .ok_or_else(|| invalid(format!("start animation '{}' is not defined", manifest.start)))?;

    let mut decoded: HashMap<&str, Arc<FrameImage>> = HashMap::new();
    let mut clips = Vec::with_capacity(manifest.anims.len());
    for (position, (name, clip)) in manifest.anims.iter().enumerate() {
        if clip.frames.is_empty() {
            return Err(invalid(format!("animation '{name}' has no frames")));
        }
        let next = match &clip.next {
            None => position,
            Some(next) => *index.get(next.as_str()).ok_or_else(|| {
                invalid(format!("animation '{name}' continues into undefined '{next}'"))
            })?,
        };

        let mut frames = Vec::with_capacity(clip.frames.len());
        for frame_name in &clip.frames {
            if let Some(image) = decoded.get(frame_name.as_str()) {
                frames.push(Arc::clone(image));
                continue;
            }
            validate_frame_name(frame_name).map_err(|source| AssetLoadError::InvalidFrameName {
                path: manifest_path.to_path_buf(),
                name: frame_name.clone(),
                source,
            })?;
            let image = Arc::new(decode_frame(&directory.join(frame_name))?);
            decoded.insert(frame_name.as_str(), Arc::clone(&image));
            frames.push(image);
        }

        clips.push(Clip {
            name: name.clone(),
            frames,
            next,
        });
    }

    Ok(SpriteAnimation::new(
        Duration::from_millis(manifest.frame_ms),
        clips,
        start,
    ))
}

fn decode_frame(path: &Path) -> Result<FrameImage, AssetLoadError> {
    let decode_error = |message: String| AssetLoadError::DecodeFrame {
        path: path.to_path_buf(),
        message,
    };
    let reader = ImageReader::open(path).map_err(|error| decode_error(error.to_string()))?;
    let decoded = reader
        .decode()
        .map_err(|error| decode_error(error.to_string()))?;
    let image = decoded.to_rgba8();
    Ok(FrameImage {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}
