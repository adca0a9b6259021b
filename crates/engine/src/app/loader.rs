use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, info};

use crate::anim::{Animation, AnimationLoader, AssetLoadError};

use super::SlotId;

/// Outcome of one background load, posted exactly once per request.
pub(crate) struct LoadResult {
    pub(crate) slot: SlotId,
    pub(crate) seq: u64,
    pub(crate) directory: PathBuf,
    pub(crate) outcome: Result<Box<dyn Animation>, AssetLoadError>,
}

impl fmt::Debug for LoadResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadResult")
            .field("slot", &self.slot)
            .field("seq", &self.seq)
            .field("directory", &self.directory)
            .field("ok", &self.outcome.is_ok())
            .finish()
    }
}

/// Runs each load request on its own thread and hands results back through
/// an unbounded channel that the frame loop drains without blocking.
///
/// Requests are never cancelled. Sequence numbers increase across all slots,
/// so a later request for a slot always carries a higher number.
pub(crate) struct AsyncLoader {
    loader: Arc<dyn AnimationLoader>,
    sender: Sender<LoadResult>,
    receiver: Receiver<LoadResult>,
    next_seq: u64,
}

impl AsyncLoader {
    pub(crate) fn new(loader: Arc<dyn AnimationLoader>) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded::<LoadResult>();
        Self {
            loader,
            sender,
            receiver,
            next_seq: 0,
        }
    }

    /// Loads `path` into `slot` off the loop thread. A path naming a file
    /// loads the directory containing it.
    pub(crate) fn request_load(&mut self, slot: SlotId, path: PathBuf) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        info!(
            slot = slot.name(),
            seq,
            path = %path.display(),
            "load_requested"
        );

        let loader = Arc::clone(&self.loader);
        let sender = self.sender.clone();
        let worker_path = path.clone();
        let spawned = thread::Builder::new()
            .name(format!("load-{}", slot.name()))
            .spawn(move || {
                let worker_directory = containing_directory(worker_path);
                let outcome = loader.load(&worker_directory);
                debug!(slot = slot.name(), seq, ok = outcome.is_ok(), "load_finished");
                // The receiver only disappears once the loop has shut down.
                let _ = sender.send(LoadResult {
                    slot,
                    seq,
                    directory: worker_directory,
                    outcome,
                });
            });

        if let Err(error) = spawned {
            let _ = self.sender.send(LoadResult {
                slot,
                seq,
                directory: path,
                outcome: Err(AssetLoadError::WorkerSpawn(error)),
            });
        }
        seq
    }

    /// Every result posted so far, in completion order. Never blocks.
    pub(crate) fn drain(&self) -> Vec<LoadResult> {
        self.receiver.try_iter().collect()
    }

    #[cfg(test)]
    pub(crate) fn post(&self, result: LoadResult) {
        self.sender.send(result).expect("loader channel open");
    }

    #[cfg(test)]
    pub(crate) fn wait_for(&self, count: usize) -> Vec<LoadResult> {
        let timeout = std::time::Duration::from_secs(5);
        (0..count)
            .map(|_| self.receiver.recv_timeout(timeout).expect("load result"))
            .collect()
    }
}

fn containing_directory(path: PathBuf) -> PathBuf {
    match path.parent() {
        Some(parent) if path.is_file() => parent.to_path_buf(),
        _ => path,
    }
}
