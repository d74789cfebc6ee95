use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

use crate::error::{ModpackError, Result};
use crate::game::modpack::overrides::collect_overrides;
use crate::game::modpack::types::{ModpackManifest, OverrideSet, Side, ICON_FILE_NAME, INDEX_FILE_NAME};

/// Decode the contents of `modrinth.index.json`
pub fn parse_index(bytes: &[u8]) -> Result<ModpackManifest> {
    serde_json::from_slice::<ModpackManifest>(bytes).map_err(|e| {
        log::warn!("[parse_index] Failed to parse {}: {}", INDEX_FILE_NAME, e);
        ModpackError::manifest(format!("{} is malformed: {}", INDEX_FILE_NAME, e))
    })
}

/// A file stored in the source archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub data: Vec<u8>,
}

/// A `.mrpack` read fully into memory in a single pass
#[derive(Debug, Clone)]
pub struct ModpackArchive {
    pub manifest: ModpackManifest,
    entries: Vec<ArchiveEntry>,
}

impl ModpackArchive {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        log::info!("[ModpackArchive::open] Opening ZIP: {:?}", path_ref);
        let file = File::open(path_ref)?;
        Self::from_reader(file)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader).map_err(|e| {
            ModpackError::manifest(format!("not a readable ZIP archive: {}", e))
        })?;
        log::debug!("[ModpackArchive] ZIP contains {} entries", archive.len());

        let mut entries = Vec::with_capacity(archive.len());
        let mut index: Option<Vec<u8>> = None;

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_owned();
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;

            if name == INDEX_FILE_NAME {
                index = Some(data.clone());
            }
            entries.push(ArchiveEntry { name, data });
        }

        let index = index.ok_or_else(|| {
            log::error!("[ModpackArchive] No {} at the archive root", INDEX_FILE_NAME);
            ModpackError::manifest(format!("{} not found", INDEX_FILE_NAME))
        })?;
        let manifest = parse_index(&index)?;
        log::info!(
            "[ModpackArchive] Parsed modpack {} v{} ({} files, {} entries)",
            manifest.name,
            manifest.version_id,
            manifest.files.len(),
            entries.len()
        );

        Ok(Self { manifest, entries })
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Root `icon.png`, if the modpack ships one
    pub fn icon(&self) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == ICON_FILE_NAME)
            .map(|e| e.data.as_slice())
    }

    /// Merged overrides for `side`
    pub fn overrides(&self, side: Side) -> Result<OverrideSet> {
        collect_overrides(&self.entries, side)
    }
}

/// Read just the manifest of a modpack file
pub fn get_modpack_manifest<P: AsRef<Path>>(path: P) -> Result<ModpackManifest> {
    let file = File::open(path.as_ref())?;
    let mut archive = ZipArchive::new(file).map_err(|e| {
        ModpackError::manifest(format!("not a readable ZIP archive: {}", e))
    })?;

    let mut content = Vec::new();
    match archive.by_name(INDEX_FILE_NAME) {
        Ok(mut index) => {
            index.read_to_end(&mut content)?;
        }
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(ModpackError::manifest(format!("{} not found", INDEX_FILE_NAME)));
        }
        Err(e) => return Err(e.into()),
    }
    parse_index(&content)
}
