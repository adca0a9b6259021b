use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use winit::keyboard::KeyCode;

use crate::app::ControlAction;

use super::actions::ActionTable;
use super::{key_code_from_name, read_json_file, ConfigLoadError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundAction {
    Control(ControlAction),
    Domain(String),
}

/// Physical key to named actions. One key may trigger several actions.
#[derive(Debug, Clone, Default)]
pub struct KeyBindings {
    by_key: HashMap<KeyCode, Vec<BoundAction>>,
    control_keys: BTreeMap<ControlAction, Vec<KeyCode>>,
    control_key_names: BTreeMap<ControlAction, String>,
}

impl KeyBindings {
    pub fn actions_for(&self, key: KeyCode) -> &[BoundAction] {
        self.by_key.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn keys_for_control(&self, control: ControlAction) -> &[KeyCode] {
        self.control_keys
            .get(&control)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn control_key_name(&self, control: ControlAction) -> Option<&str> {
        self.control_key_names.get(&control).map(String::as_str)
    }

    fn bind(&mut self, key: KeyCode, action: BoundAction) {
        if let BoundAction::Control(control) = &action {
            self.control_keys.entry(*control).or_default().push(key);
        }
        let actions = self.by_key.entry(key).or_default();
        if !actions.contains(&action) {
            actions.push(action);
        }
    }
}

/// Builds the binding table from `bindings.json` (control actions) and the
/// keys named in the action table (domain actions).
pub fn load_key_bindings(
    bindings_path: &Path,
    actions: &ActionTable,
) -> Result<KeyBindings, ConfigLoadError> {
    let controls = read_json_file::<BTreeMap<String, String>>(bindings_path)?;
    build_key_bindings(bindings_path, &controls, actions)
}

fn build_key_bindings(
    bindings_path: &Path,
    controls: &BTreeMap<String, String>,
    actions: &ActionTable,
) -> Result<KeyBindings, ConfigLoadError> {
    let mut bindings = KeyBindings::default();

    for (name, key_name) in controls {
        let control = ControlAction::from_config_name(name).ok_or_else(|| {
            ConfigLoadError::UnknownControl {
                path: bindings_path.to_path_buf(),
                name: name.clone(),
            }
        })?;
        let key = key_code_from_name(key_name).ok_or_else(|| ConfigLoadError::UnknownKey {
            path: bindings_path.to_path_buf(),
            name: name.clone(),
            key: key_name.clone(),
        })?;
        bindings.bind(key, BoundAction::Control(control));
        bindings.control_key_names.insert(control, key_name.clone());
    }

    if bindings.keys_for_control(ControlAction::Quit).is_empty() {
        return Err(ConfigLoadError::MissingQuitBinding {
            path: bindings_path.to_path_buf(),
        });
    }

    for (action, key) in actions.key_codes() {
        bindings.bind(key, BoundAction::Domain(action.to_string()));
    }

    Ok(bindings)
}
