use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};
use winit::keyboard::KeyCode;

use super::{key_code_from_name, read_json_file, ConfigLoadError};

/// What an action does once triggered: commands for the acting entity, and
/// optionally commands for its peer plus the tag used to align both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub id: String,
    pub self_commands: Vec<String>,
    pub peer_commands: Vec<String>,
    pub sync_mode: String,
}

impl ActionDescriptor {
    pub fn requires_peer(&self) -> bool {
        !self.peer_commands.is_empty()
    }
}

/// Read-only action lookup, built once at startup.
///
/// When the source configuration names the same action more than once the
/// last entry wins; each replaced entry is reported with a warning.
#[derive(Debug, Clone, Default)]
pub struct ActionTable {
    descriptors: HashMap<String, ActionDescriptor>,
    keys: BTreeMap<String, ActionKey>,
}

#[derive(Debug, Clone)]
struct ActionKey {
    name: String,
    code: KeyCode,
}

impl ActionTable {
    pub fn resolve(&self, action_id: &str) -> Option<&ActionDescriptor> {
        self.descriptors.get(action_id)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Action names with the key name each is bound to, sorted by action name.
    pub fn key_names(&self) -> impl Iterator<Item = (&str, &str)> {
        self.keys
            .iter()
            .map(|(action, key)| (action.as_str(), key.name.as_str()))
    }

    pub(crate) fn key_codes(&self) -> impl Iterator<Item = (&str, KeyCode)> {
        self.keys
            .iter()
            .map(|(action, key)| (action.as_str(), key.code))
    }

    fn from_entries(path: &Path, entries: ActionEntries) -> Result<Self, ConfigLoadError> {
        let mut table = Self::default();
        for (id, entry) in entries.0 {
            if entry.me.is_empty() && entry.you.is_empty() {
                debug!(action = %id, path = %path.display(), "action_without_commands");
            }
            if table.descriptors.contains_key(&id) {
                warn!(action = %id, path = %path.display(), "duplicate_action_last_wins");
            }
            if entry.key.is_empty() {
                table.keys.remove(&id);
            } else {
                let code =
                    key_code_from_name(&entry.key).ok_or_else(|| ConfigLoadError::UnknownKey {
                        path: path.to_path_buf(),
                        name: id.clone(),
                        key: entry.key.clone(),
                    })?;
                table.keys.insert(
                    id.clone(),
                    ActionKey {
                        name: entry.key,
                        code,
                    },
                );
            }
            table.descriptors.insert(
                id.clone(),
                ActionDescriptor {
                    id,
                    self_commands: entry.me,
                    peer_commands: entry.you,
                    sync_mode: entry.sync,
                },
            );
        }
        Ok(table)
    }
}

pub fn load_action_table(path: &Path) -> Result<ActionTable, ConfigLoadError> {
    let entries = read_json_file::<ActionEntries>(path)?;
    ActionTable::from_entries(path, entries)
}

#[cfg(test)]
pub(super) fn parse_action_table(path: &Path, raw: &str) -> Result<ActionTable, ConfigLoadError> {
    let entries = super::parse_json::<ActionEntries>(path, raw)?;
    ActionTable::from_entries(path, entries)
}

#[derive(Debug, Deserialize)]
struct ActionEntry {
    #[serde(default, alias = "Cmd", alias = "cmd")]
    key: String,
    #[serde(default, alias = "Me")]
    me: Vec<String>,
    #[serde(default, alias = "You")]
    you: Vec<String>,
    #[serde(default, alias = "Sync")]
    sync: String,
}

/// Entries in source order, duplicates included.
struct ActionEntries(Vec<(String, ActionEntry)>);

impl<'de> Deserialize<'de> for ActionEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = ActionEntries;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an object mapping action names to action entries")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, entry)) = map.next_entry::<String, ActionEntry>()? {
                    entries.push((name, entry));
                }
                Ok(ActionEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}
