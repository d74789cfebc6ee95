//! Read-modify-write access to the launcher's `launcher_profiles.json`.
//!
//! Only the `profiles` object is touched; every other key in the file is
//! written back unchanged and in its original order.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::error::{ModpackError, Result};
use crate::game::installer::config::PROFILE_TYPE;

/// One entry of the `profiles` object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LauncherProfile {
    pub name: String,
    #[serde(rename = "type")]
    pub profile_type: String,
    pub icon: String,
    pub created: String,
    pub last_used: String,
    pub last_version_id: String,
    pub game_dir: String,
}

impl LauncherProfile {
    pub fn new(
        name: &str,
        icon: String,
        last_version_id: &str,
        game_dir: &Path,
        created_at: DateTime<Utc>,
    ) -> Self {
        let timestamp = format_timestamp(created_at);
        Self {
            name: name.to_string(),
            profile_type: PROFILE_TYPE.to_string(),
            icon,
            created: timestamp.clone(),
            last_used: timestamp,
            last_version_id: last_version_id.to_string(),
            game_dir: game_dir.to_string_lossy().into_owned(),
        }
    }
}

/// ISO-8601 UTC with millisecond precision and a `Z` suffix
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Fresh 32-character lowercase hex id
pub fn new_profile_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub struct ProfileRegistry {
    path: PathBuf,
}

impl ProfileRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the registry document. A missing file yields `{"profiles": {}}`.
    pub fn load(&self) -> Result<Value> {
        if !self.path.exists() {
            log::info!("[ProfileRegistry::load] {:?} not found, starting empty", self.path);
            return Ok(serde_json::json!({ "profiles": {} }));
        }

        let content = std::fs::read_to_string(&self.path)?;
        let mut doc: Value = serde_json::from_str(&content).map_err(|e| {
            ModpackError::Registry(format!("invalid {}: {}", self.path.display(), e))
        })?;
        profiles_mut(&mut doc)?;
        Ok(doc)
    }

    pub fn save(&self, doc: &Value) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(doc)?)?;
        Ok(())
    }

    /// Add `profile` under a fresh id and persist the file. Returns the id.
    pub fn insert_profile(&self, profile: &LauncherProfile) -> Result<String> {
        let mut doc = self.load()?;
        let profiles = profiles_mut(&mut doc)?;

        let mut id = new_profile_id();
        while profiles.contains_key(&id) {
            id = new_profile_id();
        }
        profiles.insert(id.clone(), serde_json::to_value(profile)?);

        self.save(&doc)?;
        log::info!(
            "[ProfileRegistry::insert_profile] Added profile {:?} ({}) to {:?}",
            profile.name,
            id,
            self.path
        );
        Ok(id)
    }
}

fn profiles_mut(doc: &mut Value) -> Result<&mut Map<String, Value>> {
    let root = doc
        .as_object_mut()
        .ok_or_else(|| ModpackError::Registry("expected the registry root to be an object".into()))?;
    root.entry("profiles")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| ModpackError::Registry("expected 'profiles' to be an object".into()))
}
