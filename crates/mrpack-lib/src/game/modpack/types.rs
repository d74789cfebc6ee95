use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index document at the root of every `.mrpack` archive
pub const INDEX_FILE_NAME: &str = "modrinth.index.json";

/// Optional modpack icon at the root of the archive
pub const ICON_FILE_NAME: &str = "icon.png";

pub const BASE_OVERRIDES_PREFIX: &str = "overrides/";
pub const CLIENT_OVERRIDES_PREFIX: &str = "client-overrides/";
pub const SERVER_OVERRIDES_PREFIX: &str = "server-overrides/";

/// Installation target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Client,
    Server,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Client => "client",
            Side::Server => "server",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requirement level of a file for one side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvRequirement {
    #[default]
    Required,
    Optional,
    Unsupported,
}

/// Per-side requirement map (`env` in the index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileEnv {
    #[serde(default)]
    pub client: EnvRequirement,
    #[serde(default)]
    pub server: EnvRequirement,
}

impl FileEnv {
    pub fn for_side(&self, side: Side) -> EnvRequirement {
        match side {
            Side::Client => self.client,
            Side::Server => self.server,
        }
    }
}

/// Declared digests of a file. Both SHA-1 and SHA-512 are mandatory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHashes {
    pub sha1: String,
    pub sha512: String,
    /// Any other algorithm listed in the index; kept but never checked
    #[serde(flatten)]
    pub other: BTreeMap<String, String>,
}

/// One downloadable file of the modpack
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// Destination relative to the instance root. Untrusted.
    pub path: String,
    pub hashes: FileHashes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<FileEnv>,
    pub downloads: Vec<String>,
    /// Advisory only, used for progress display
    #[serde(default)]
    pub file_size: u64,
}

impl FileEntry {
    /// Requirement level for `side`; a missing `env` map means required everywhere.
    pub fn requirement(&self, side: Side) -> EnvRequirement {
        self.env.unwrap_or_default().for_side(side)
    }

    pub fn should_download(&self, side: Side, include_optional: bool) -> bool {
        match self.requirement(side) {
            EnvRequirement::Required => true,
            EnvRequirement::Optional => include_optional,
            EnvRequirement::Unsupported => false,
        }
    }
}

/// Parsed `modrinth.index.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModpackManifest {
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    #[serde(default = "default_game")]
    pub game: String,
    pub version_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Dependency key → version, in document order
    #[serde(with = "ordered_string_map")]
    pub dependencies: Vec<(String, String)>,
    pub files: Vec<FileEntry>,
}

/// A JSON object of strings kept as a list of pairs in document order
mod ordered_string_map {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::{Map, Value};

    pub fn serialize<S: Serializer>(pairs: &[(String, String)], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(pairs.iter().map(|(k, v)| (k, v)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<(String, String)>, D::Error> {
        Map::<String, Value>::deserialize(deserializer)?
            .into_iter()
            .map(|(key, value)| match value {
                Value::String(version) => Ok((key, version)),
                other => Err(D::Error::custom(format!(
                    "dependency {:?} must be a string, got {}",
                    key, other
                ))),
            })
            .collect()
    }
}

fn default_format_version() -> u32 { 1 }
fn default_game() -> String { "minecraft".to_string() }

impl ModpackManifest {
    /// Human readable name for a dependency key such as `fabric-loader`.
    pub fn dependency_display_name(key: &str) -> &str {
        match key {
            "minecraft" => "Minecraft",
            "forge" => "Forge",
            "neoforge" => "NeoForge",
            "fabric-loader" => "Fabric",
            "quilt-loader" => "Quilt",
            other => other,
        }
    }

    /// Entries that would be fetched for `side`, in manifest order.
    pub fn files_for(&self, side: Side, include_optional: bool) -> impl Iterator<Item = &FileEntry> {
        self.files
            .iter()
            .filter(move |f| f.should_download(side, include_optional))
    }

    /// Sum of the advisory sizes of the entries that would be fetched.
    pub fn total_download_size(&self, side: Side, include_optional: bool) -> u64 {
        self.files_for(side, include_optional).map(|f| f.file_size).sum()
    }

    /// `"<name> - <versionId>"`, the unsanitized base for output and profile names.
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.name, self.version_id)
    }
}

/// Instance-relative path → content, ordered by path. Later inserts win.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMap {
    files: BTreeMap<String, Vec<u8>>,
}

impl FileMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `data` at `path`, returning the content it replaced.
    pub fn insert(&mut self, path: impl Into<String>, data: Vec<u8>) -> Option<Vec<u8>> {
        self.files.insert(path.into(), data)
    }

    /// Overlay every entry of `other`, replacing existing paths.
    pub fn overlay(&mut self, other: FileMap) {
        self.files.extend(other.files);
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(|v| v.as_slice())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Merged overrides for one side
pub type OverrideSet = FileMap;

/// Final output content: downloads first, then overrides
pub type ResolvedFileSet = FileMap;

/// A downloaded and verified file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    pub path: String,
    pub data: Vec<u8>,
}

impl ResolvedFileSet {
    /// Build the output set. Overrides are applied last, so they win on collision.
    pub fn from_parts(downloads: Vec<ResolvedFile>, overrides: OverrideSet) -> Self {
        let mut set = FileMap::new();
        for file in downloads {
            set.insert(file.path, file.data);
        }
        set.overlay(overrides);
        set
    }
}
