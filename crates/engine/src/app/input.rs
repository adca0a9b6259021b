use std::collections::HashSet;

use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::config::{BoundAction, KeyBindings};

/// Built-in previewer controls, bound by name in `bindings.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ControlAction {
    Quit,
    Reset,
    Load,
    SelectFirst,
    SelectSecond,
    SpeedUp,
    SlowDown,
}

const CONTROL_COUNT: usize = 7;

impl ControlAction {
    pub const ALL: [ControlAction; CONTROL_COUNT] = [
        ControlAction::Quit,
        ControlAction::Reset,
        ControlAction::Load,
        ControlAction::SelectFirst,
        ControlAction::SelectSecond,
        ControlAction::SpeedUp,
        ControlAction::SlowDown,
    ];

    pub const fn config_name(self) -> &'static str {
        match self {
            ControlAction::Quit => "quit",
            ControlAction::Reset => "reset",
            ControlAction::Load => "load",
            ControlAction::SelectFirst => "select1",
            ControlAction::SelectSecond => "select2",
            ControlAction::SpeedUp => "speed up",
            ControlAction::SlowDown => "slow down",
        }
    }

    pub fn from_config_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|control| control.config_name() == name)
    }

    const fn index(self) -> usize {
        match self {
            ControlAction::Quit => 0,
            ControlAction::Reset => 1,
            ControlAction::Load => 2,
            ControlAction::SelectFirst => 3,
            ControlAction::SelectSecond => 4,
            ControlAction::SpeedUp => 5,
            ControlAction::SlowDown => 6,
        }
    }
}

/// Everything the input layer observed since the previous frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    pressed_controls: [bool; CONTROL_COUNT],
    press_amounts: [f32; CONTROL_COUNT],
    pressed_actions: Vec<String>,
}

impl FrameInput {
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when a key bound to `control` went down this frame.
    pub fn control_pressed(&self, control: ControlAction) -> bool {
        self.pressed_controls[control.index()]
    }

    /// Continuous press magnitude for `control` this frame.
    pub fn press_amount(&self, control: ControlAction) -> f32 {
        self.press_amounts[control.index()]
    }

    /// Domain actions newly pressed this frame, in press order, each once.
    pub fn pressed_actions(&self) -> &[String] {
        &self.pressed_actions
    }

    pub fn with_control_pressed(mut self, control: ControlAction) -> Self {
        self.pressed_controls[control.index()] = true;
        self.press_amounts[control.index()] = self.press_amounts[control.index()].max(1.0);
        self
    }

    pub fn with_press_amount(mut self, control: ControlAction, amount: f32) -> Self {
        self.press_amounts[control.index()] = amount;
        self
    }

    pub fn with_action_pressed(mut self, action: &str) -> Self {
        if !self.pressed_actions.iter().any(|pressed| pressed == action) {
            self.pressed_actions.push(action.to_string());
        }
        self
    }
}

/// Turns raw key events into per-frame [`FrameInput`] through the binding
/// table. Press edges are reported once; auto-repeat is ignored.
#[derive(Debug)]
pub(crate) struct InputCollector {
    bindings: KeyBindings,
    keys_down: HashSet<KeyCode>,
    control_pressed_edge: [bool; CONTROL_COUNT],
    pressed_actions: Vec<String>,
}

impl InputCollector {
    pub(crate) fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            keys_down: HashSet::new(),
            control_pressed_edge: [false; CONTROL_COUNT],
            pressed_actions: Vec::new(),
        }
    }

    pub(crate) fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub(crate) fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        if let PhysicalKey::Code(key) = key_event.physical_key {
            self.handle_key(key, key_event.state);
        }
    }

    fn handle_key(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.keys_down.insert(key) {
                    return;
                }
                for action in self.bindings.actions_for(key) {
                    match action {
                        BoundAction::Control(control) => {
                            self.control_pressed_edge[control.index()] = true;
                        }
                        BoundAction::Domain(name) => {
                            if !self.pressed_actions.contains(name) {
                                self.pressed_actions.push(name.clone());
                            }
                        }
                    }
                }
            }
            ElementState::Released => {
                self.keys_down.remove(&key);
            }
        }
    }

    /// Forgets held keys, e.g. when the window loses focus and release
    /// events will not arrive.
    pub(crate) fn release_all(&mut self) {
        self.keys_down.clear();
    }

    pub(crate) fn snapshot_for_frame(&mut self) -> FrameInput {
        let mut press_amounts = [0.0; CONTROL_COUNT];
        for control in ControlAction::ALL {
            let held = self
                .bindings
                .keys_for_control(control)
                .iter()
                .any(|key| self.keys_down.contains(key));
            if held || self.control_pressed_edge[control.index()] {
                press_amounts[control.index()] = 1.0;
            }
        }
        let snapshot = FrameInput {
            pressed_controls: self.control_pressed_edge,
            press_amounts,
            pressed_actions: std::mem::take(&mut self.pressed_actions),
        };
        self.control_pressed_edge = [false; CONTROL_COUNT];
        snapshot
    }
}
