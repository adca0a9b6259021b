use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::anim::AnimationLoader;
use crate::config::ActionTable;
use crate::store::KeyValueStore;

use super::loader::{AsyncLoader, LoadResult};
use super::{
    ControlAction, DispatchOutcome, Dispatcher, EntitySlots, FrameInput, SlotId, SpeedFactor,
};

const DEFAULT_MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

/// Collaborators built once at startup and owned by the [`Previewer`].
pub struct PreviewContext {
    pub dispatcher: Dispatcher,
    pub store: Box<dyn KeyValueStore>,
    pub loader: Arc<dyn AnimationLoader>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameOutcome {
    pub quit: bool,
    /// Set when the operator asked to pick a directory; carries the active
    /// slot's current source path as the suggested value.
    pub open_prompt: Option<String>,
}

/// Per-frame driver for the two preview slots.
///
/// Each [`Previewer::frame`] call advances loaded animations by the scaled
/// frame delta, applies finished loads, dispatches newly pressed actions and
/// finally applies control actions, in that order. Only this type mutates
/// slot state; background loads talk to it through [`AsyncLoader`].
pub struct Previewer {
    dispatcher: Dispatcher,
    store: Box<dyn KeyValueStore>,
    loader: AsyncLoader,
    slots: EntitySlots,
    speed: SpeedFactor,
    error_text: String,
    last_frame: Option<Instant>,
    max_frame_delta: Duration,
}

impl Previewer {
    pub fn new(context: PreviewContext) -> Self {
        Self {
            dispatcher: context.dispatcher,
            store: context.store,
            loader: AsyncLoader::new(context.loader),
            slots: EntitySlots::new(),
            speed: SpeedFactor::default(),
            error_text: String::new(),
            last_frame: None,
            max_frame_delta: DEFAULT_MAX_FRAME_DELTA,
        }
    }

    pub fn set_max_frame_delta(&mut self, max_frame_delta: Duration) {
        if !max_frame_delta.is_zero() {
            self.max_frame_delta = max_frame_delta;
        }
    }

    pub fn slots(&self) -> &EntitySlots {
        &self.slots
    }

    pub fn speed(&self) -> SpeedFactor {
        self.speed
    }

    /// Last load or command failure, empty after a successful load.
    pub fn error_text(&self) -> &str {
        &self.error_text
    }

    pub fn actions(&self) -> &ActionTable {
        self.dispatcher.actions()
    }

    /// Requests a load for every slot with a non-empty remembered path.
    pub fn load_remembered(&mut self) {
        for id in SlotId::ALL {
            let remembered = self.store.get(id.name());
            if remembered.is_empty() {
                continue;
            }
            self.loader.request_load(id, PathBuf::from(remembered));
        }
    }

    /// Loads `path` into the active slot. A path naming a file loads the
    /// directory containing it; that check runs on the load thread.
    pub fn request_load_into_active(&mut self, path: &Path) {
        let slot = self.slots.active().id();
        self.loader.request_load(slot, path.to_path_buf());
    }

    pub fn frame(&mut self, now: Instant, input: &FrameInput) -> FrameOutcome {
        let dt = self.frame_delta(now);
        self.advance(dt);

        for result in self.loader.drain() {
            self.apply_load_result(result);
        }

        for action in input.pressed_actions() {
            self.dispatch(action);
        }

        self.apply_controls(input)
    }

    fn frame_delta(&mut self, now: Instant) -> Duration {
        match self.last_frame.replace(now) {
            Some(previous) => clamp_frame_delta(
                now.saturating_duration_since(previous),
                self.max_frame_delta,
            ),
            None => Duration::ZERO,
        }
    }

    fn advance(&mut self, dt: Duration) {
        let simulated = self.speed.scale(dt);
        for slot in self.slots.iter_mut() {
            if let Some(animation) = slot.animation_mut() {
                animation.think(simulated);
            }
        }
    }

    fn apply_load_result(&mut self, result: LoadResult) {
        let LoadResult {
            slot: id,
            seq,
            directory,
            outcome,
        } = result;
        let slot = self.slots.get_mut(id);
        if seq < slot.resolved_seq {
            debug!(
                slot = id.name(),
                seq,
                newest = slot.resolved_seq,
                "load_result_stale"
            );
            return;
        }
        slot.resolved_seq = seq;

        match outcome {
            Ok(animation) => {
                let source_path = directory.to_string_lossy().into_owned();
                if let Err(error) = self.store.set(id.name(), &source_path) {
                    warn!(slot = id.name(), error = %error, "load_persist_failed");
                    self.error_text = error.to_string();
                    return;
                }
                slot.install(animation, source_path);
                self.error_text.clear();
                info!(slot = id.name(), seq, directory = %directory.display(), "load_applied");
            }
            Err(error) => {
                warn!(slot = id.name(), seq, error = %error, "load_failed");
                self.error_text = error.to_string();
            }
        }
    }

    fn dispatch(&mut self, action: &str) {
        let (active, peer) = self.slots.active_and_peer_mut();
        let acting = active.name();
        match self.dispatcher.on_action_triggered(action, active, peer) {
            DispatchOutcome::Solo => {
                info!(action, slot = acting, "action_dispatched");
            }
            DispatchOutcome::Synchronized { delay } => {
                info!(
                    action,
                    slot = acting,
                    delay_ms = delay.as_millis() as u64,
                    "action_dispatched"
                );
            }
            DispatchOutcome::Ignored(reason) => {
                debug!(action, reason = ?reason, "action_ignored");
            }
            DispatchOutcome::Rejected(error) => {
                warn!(action, slot = acting, error = %error, "action_rejected");
                self.error_text = error.to_string();
            }
        }
    }

    fn apply_controls(&mut self, input: &FrameInput) -> FrameOutcome {
        let mut outcome = FrameOutcome::default();

        if input.control_pressed(ControlAction::Reset) {
            self.reset();
        }
        if input.control_pressed(ControlAction::Load) {
            outcome.open_prompt = Some(self.slots.active().source_path().to_string());
        }
        for (control, id) in [
            (ControlAction::SelectFirst, SlotId::Box1),
            (ControlAction::SelectSecond, SlotId::Box2),
        ] {
            if input.control_pressed(control) && self.slots.select(id) {
                info!(active = id.name(), "roles_selected");
            }
        }

        let delta = input.press_amount(ControlAction::SpeedUp)
            - input.press_amount(ControlAction::SlowDown);
        let delta = delta.trunc() as i32;
        if delta != 0 {
            self.speed.adjust(delta);
            info!(speed = self.speed.percent(), "speed_changed");
        }

        if input.control_pressed(ControlAction::Quit) {
            info!(reason = "quit_action", "shutdown_requested");
            outcome.quit = true;
        }
        outcome
    }

    fn reset(&mut self) {
        let reloads: Vec<(SlotId, PathBuf)> = self
            .slots
            .iter()
            .filter(|slot| !slot.source_path().is_empty())
            .map(|slot| (slot.id(), PathBuf::from(slot.source_path())))
            .collect();
        for (id, directory) in reloads {
            self.loader.request_load(id, directory);
        }
    }

    #[cfg(test)]
    fn settle_loads(&mut self, count: usize) {
        for result in self.loader.wait_for(count) {
            self.apply_load_result(result);
        }
    }
}

pub(crate) fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::testing::{Issued, RecordingAnimation, StubLoader};
    use crate::anim::AssetLoadError;
    use crate::store::testing::MemoryStore;

    const ACTIONS: &str = r#"{
        "attack": { "key": "z", "me": ["swing"] },
        "grapple": { "key": "g", "me": ["grab"], "you": ["held"], "sync": "lock" }
    }"#;

    struct Harness {
        previewer: Previewer,
        store: MemoryStore,
        loader: Arc<StubLoader>,
    }

    fn harness_with(store: MemoryStore, loader: StubLoader) -> Harness {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("actions.json");
        std::fs::write(&path, ACTIONS).expect("write actions");
        let actions = crate::config::load_action_table(&path).expect("actions");
        let loader = Arc::new(loader);
        let previewer = Previewer::new(PreviewContext {
            dispatcher: Dispatcher::new(actions),
            store: Box::new(store.clone()),
            loader: loader.clone(),
        });
        Harness {
            previewer,
            store,
            loader,
        }
    }

    fn harness() -> Harness {
        harness_with(MemoryStore::default(), StubLoader::failing_for(&["/missing"]))
    }

    fn loaded(harness: &mut Harness, id: SlotId, directory: &str) {
        if harness.previewer.slots().active().id() != id {
            harness.previewer.slots.select(id);
        }
        harness
            .previewer
            .request_load_into_active(Path::new(directory));
        harness.previewer.settle_loads(1);
    }

    fn load_result(slot: SlotId, seq: u64, directory: &str, label: &str) -> LoadResult {
        let (animation, _) = RecordingAnimation::boxed(label);
        LoadResult {
            slot,
            seq,
            directory: PathBuf::from(directory),
            outcome: Ok(animation),
        }
    }

    #[test]
    fn successful_load_installs_persists_and_clears_error() {
        let mut h = harness();
        h.previewer.error_text = "old failure".to_string();

        loaded(&mut h, SlotId::Box1, "/anims/walk");

        let slot = h.previewer.slots().get(SlotId::Box1);
        assert!(slot.is_loaded());
        assert_eq!(slot.source_path(), "/anims/walk");
        assert_eq!(h.store.get("box1"), "/anims/walk");
        assert_eq!(h.previewer.error_text(), "");
    }

    #[test]
    fn failed_load_keeps_animation_and_remembered_path() {
        let mut h = harness_with(
            MemoryStore::default().with_value("box1", "/anims/walk"),
            StubLoader::failing_for(&["/missing"]),
        );
        loaded(&mut h, SlotId::Box1, "/anims/walk");

        h.previewer.request_load_into_active(Path::new("/missing"));
        h.previewer.settle_loads(1);

        let slot = h.previewer.slots().get(SlotId::Box1);
        assert!(slot.is_loaded());
        assert_eq!(slot.source_path(), "/anims/walk");
        assert_eq!(h.store.get("box1"), "/anims/walk");
        assert!(h.previewer.error_text().contains("/missing"));
    }

    #[test]
    fn failed_persist_does_not_install() {
        let mut h = harness_with(MemoryStore::failing(), StubLoader::default());

        loaded(&mut h, SlotId::Box1, "/anims/walk");

        assert!(!h.previewer.slots().get(SlotId::Box1).is_loaded());
        assert_eq!(h.store.get("box1"), "");
        assert!(!h.previewer.error_text().is_empty());
    }

    #[test]
    fn stale_results_are_discarded_in_favour_of_the_newest_request() {
        let mut h = harness();
        h.previewer
            .apply_load_result(load_result(SlotId::Box1, 2, "/anims/new", "new"));
        h.previewer
            .apply_load_result(load_result(SlotId::Box1, 1, "/anims/old", "old"));

        let slot = h.previewer.slots().get(SlotId::Box1);
        assert_eq!(slot.source_path(), "/anims/new");
        assert_eq!(h.store.get("box1"), "/anims/new");
    }

    #[test]
    fn newer_failure_still_outranks_an_older_success() {
        let mut h = harness();
        h.previewer.apply_load_result(LoadResult {
            slot: SlotId::Box1,
            seq: 2,
            directory: PathBuf::from("/missing"),
            outcome: Err(AssetLoadError::MissingDirectory {
                path: PathBuf::from("/missing"),
            }),
        });
        h.previewer
            .apply_load_result(load_result(SlotId::Box1, 1, "/anims/old", "old"));

        assert!(!h.previewer.slots().get(SlotId::Box1).is_loaded());
        assert_eq!(h.store.get("box1"), "");
    }

    #[test]
    fn results_for_different_slots_do_not_interfere() {
        let mut h = harness();
        h.previewer
            .apply_load_result(load_result(SlotId::Box2, 5, "/anims/run", "run"));
        h.previewer
            .apply_load_result(load_result(SlotId::Box1, 3, "/anims/walk", "walk"));

        assert_eq!(h.previewer.slots().get(SlotId::Box1).source_path(), "/anims/walk");
        assert_eq!(h.previewer.slots().get(SlotId::Box2).source_path(), "/anims/run");
    }

    #[test]
    fn startup_loads_only_remembered_slots() {
        let mut h = harness_with(
            MemoryStore::default().with_value("box2", "/anims/run"),
            StubLoader::default(),
        );
        h.previewer.load_remembered();
        h.previewer.settle_loads(1);

        assert!(!h.previewer.slots().get(SlotId::Box1).is_loaded());
        assert_eq!(h.previewer.slots().get(SlotId::Box2).source_path(), "/anims/run");
        assert!(h.previewer.loader.drain().is_empty());
    }

    #[test]
    fn frame_advances_loaded_slots_by_scaled_delta() {
        let mut h = harness();
        loaded(&mut h, SlotId::Box1, "/anims/walk");
        let recording = h.loader.recording_for("/anims/walk").expect("recording");
        h.previewer.speed.adjust(-50);

        let start = Instant::now();
        h.previewer.frame(start, &FrameInput::empty());
        h.previewer
            .frame(start + Duration::from_millis(40), &FrameInput::empty());

        assert_eq!(recording.elapsed(), Duration::from_millis(20));
    }

    #[test]
    fn long_stalls_are_clamped_and_time_never_runs_backwards() {
        let mut h = harness();
        loaded(&mut h, SlotId::Box1, "/anims/walk");
        let recording = h.loader.recording_for("/anims/walk").expect("recording");

        let start = Instant::now();
        h.previewer.frame(start + Duration::from_secs(1), &FrameInput::empty());
        h.previewer.frame(start, &FrameInput::empty());
        h.previewer
            .frame(start + Duration::from_secs(10), &FrameInput::empty());

        assert_eq!(recording.elapsed(), DEFAULT_MAX_FRAME_DELTA);
    }

    #[test]
    fn frame_dispatches_solo_action_to_the_active_slot_only() {
        let mut h = harness();
        loaded(&mut h, SlotId::Box1, "/anims/walk");
        let active = h.loader.recording_for("/anims/walk").expect("recording");

        h.previewer.frame(
            Instant::now(),
            &FrameInput::empty().with_action_pressed("attack"),
        );

        assert_eq!(active.issued(), vec![Issued::Solo(vec!["swing".to_string()])]);
    }

    #[test]
    fn synchronized_action_with_one_slot_loaded_is_a_no_op() {
        let mut h = harness();
        loaded(&mut h, SlotId::Box1, "/anims/walk");
        let active = h.loader.recording_for("/anims/walk").expect("recording");

        h.previewer.frame(
            Instant::now(),
            &FrameInput::empty().with_action_pressed("grapple"),
        );

        assert!(active.issued().is_empty());
        assert_eq!(h.previewer.error_text(), "");
    }

    #[test]
    fn synchronized_action_reaches_both_loaded_slots() {
        let mut h = harness();
        loaded(&mut h, SlotId::Box1, "/anims/walk");
        loaded(&mut h, SlotId::Box2, "/anims/run");
        h.previewer.slots.select(SlotId::Box1);
        let box1 = h.loader.recording_for("/anims/walk").expect("box1");
        let box2 = h.loader.recording_for("/anims/run").expect("box2");

        h.previewer.frame(
            Instant::now(),
            &FrameInput::empty().with_action_pressed("grapple"),
        );

        assert!(matches!(
            box1.issued().as_slice(),
            [Issued::Synced { commands, sync_mode, .. }]
                if commands == &vec!["grab".to_string()] && sync_mode == "lock"
        ));
        assert!(matches!(
            box2.issued().as_slice(),
            [Issued::Synced { commands, .. }] if commands == &vec!["held".to_string()]
        ));
    }

    #[test]
    fn select_controls_move_the_active_role() {
        let mut h = harness();
        h.previewer.frame(
            Instant::now(),
            &FrameInput::empty().with_control_pressed(ControlAction::SelectSecond),
        );
        assert_eq!(h.previewer.slots().active().id(), SlotId::Box2);

        h.previewer.frame(
            Instant::now(),
            &FrameInput::empty().with_control_pressed(ControlAction::SelectFirst),
        );
        assert_eq!(h.previewer.slots().active().id(), SlotId::Box1);
    }

    #[test]
    fn speed_controls_use_press_amount_and_clamp() {
        let mut h = harness();
        let slow = FrameInput::empty().with_press_amount(ControlAction::SlowDown, 1.0);
        for _ in 0..150 {
            h.previewer.frame(Instant::now(), &slow);
        }
        assert_eq!(h.previewer.speed().percent(), 1);

        let fast = FrameInput::empty().with_press_amount(ControlAction::SpeedUp, 3.7);
        h.previewer.frame(Instant::now(), &fast);
        assert_eq!(h.previewer.speed().percent(), 4);

        let both = FrameInput::empty()
            .with_press_amount(ControlAction::SpeedUp, 1.0)
            .with_press_amount(ControlAction::SlowDown, 1.0);
        h.previewer.frame(Instant::now(), &both);
        assert_eq!(h.previewer.speed().percent(), 4);
    }

    #[test]
    fn load_control_opens_prompt_with_active_source_path() {
        let mut h = harness();
        loaded(&mut h, SlotId::Box1, "/anims/walk");

        let outcome = h.previewer.frame(
            Instant::now(),
            &FrameInput::empty().with_control_pressed(ControlAction::Load),
        );

        assert_eq!(outcome.open_prompt.as_deref(), Some("/anims/walk"));
        assert!(!outcome.quit);
    }

    #[test]
    fn reset_reloads_every_slot_from_its_source_path() {
        let mut h = harness();
        loaded(&mut h, SlotId::Box1, "/anims/walk");

        h.previewer.frame(
            Instant::now(),
            &FrameInput::empty().with_control_pressed(ControlAction::Reset),
        );
        h.previewer.settle_loads(1);

        assert_eq!(
            h.previewer.slots().get(SlotId::Box1).source_path(),
            "/anims/walk"
        );
        assert!(!h.previewer.slots().get(SlotId::Box2).is_loaded());
        assert!(h.previewer.loader.drain().is_empty());
    }

    #[test]
    fn quit_control_ends_the_loop() {
        let mut h = harness();
        let outcome = h.previewer.frame(
            Instant::now(),
            &FrameInput::empty().with_control_pressed(ControlAction::Quit),
        );
        assert!(outcome.quit);
    }

    #[test]
    fn file_paths_load_their_parent_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manifest = dir.path().join("sprite.json");
        std::fs::write(&manifest, "{}").expect("write");
        let mut h = harness();

        h.previewer.request_load_into_active(&manifest);
        h.previewer.settle_loads(1);

        assert_eq!(
            h.previewer.slots().get(SlotId::Box1).source_path(),
            dir.path().to_string_lossy()
        );
    }

    #[test]
    fn loads_apply_after_the_advance_and_before_dispatch() {
        let mut h = harness();
        let start = Instant::now();
        h.previewer.frame(start, &FrameInput::empty());

        let (animation, recording) = RecordingAnimation::boxed("walk");
        h.previewer.loader.post(LoadResult {
            slot: SlotId::Box1,
            seq: 1,
            directory: PathBuf::from("/anims/walk"),
            outcome: Ok(animation),
        });
        h.previewer.frame(
            start + Duration::from_millis(40),
            &FrameInput::empty().with_action_pressed("attack"),
        );

        assert!(h.previewer.slots().get(SlotId::Box1).is_loaded());
        assert_eq!(recording.issued(), vec![Issued::Solo(vec!["swing".to_string()])]);
        assert_eq!(recording.elapsed(), Duration::ZERO);

        h.previewer
            .frame(start + Duration::from_millis(60), &FrameInput::empty());
        assert_eq!(recording.elapsed(), Duration::from_millis(20));
    }

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(250);
        assert_eq!(
            clamp_frame_delta(Duration::from_millis(600), max_frame_delta),
            max_frame_delta
        );
        assert_eq!(
            clamp_frame_delta(Duration::from_millis(16), max_frame_delta),
            Duration::from_millis(16)
        );
    }
}
