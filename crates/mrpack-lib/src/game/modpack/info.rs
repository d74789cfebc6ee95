use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::error::Result;
use crate::game::modpack::parser::get_modpack_manifest;
use crate::game::modpack::types::{ModpackManifest, Side};

/// Summary of a modpack for display before extracting or installing
#[derive(Debug, Clone, Serialize)]
pub struct ModpackInfo {
    pub name: String,
    pub version: String,
    pub summary: Option<String>,
    /// (display name, version) in manifest order
    pub dependencies: Vec<(String, String)>,
    pub file_count: usize,
    pub client_file_count: usize,
    pub server_file_count: usize,
    /// Advisory size of everything the client would download, optional files included
    pub client_download_bytes: u64,
    pub server_download_bytes: u64,
}

impl ModpackInfo {
    pub fn from_manifest(manifest: &ModpackManifest) -> Self {
        Self {
            name: manifest.name.clone(),
            version: manifest.version_id.clone(),
            summary: manifest.summary.clone(),
            dependencies: manifest
                .dependencies
                .iter()
                .map(|(key, version)| {
                    (
                        ModpackManifest::dependency_display_name(key).to_string(),
                        version.clone(),
                    )
                })
                .collect(),
            file_count: manifest.files.len(),
            client_file_count: manifest.files_for(Side::Client, true).count(),
            server_file_count: manifest.files_for(Side::Server, true).count(),
            client_download_bytes: manifest.total_download_size(Side::Client, true),
            server_download_bytes: manifest.total_download_size(Side::Server, true),
        }
    }
}

/// Read the manifest of `path` and summarize it. No network access.
pub fn modpack_info<P: AsRef<Path>>(path: P) -> Result<ModpackInfo> {
    let manifest = get_modpack_manifest(path)?;
    Ok(ModpackInfo::from_manifest(&manifest))
}

fn mib(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

impl fmt::Display for ModpackInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Modpack name:    {}", self.name)?;
        writeln!(f, "Modpack version: {}", self.version)?;
        if let Some(summary) = &self.summary {
            writeln!(f, "Modpack summary: {}", summary.replace('\n', "\n                 "))?;
        }
        writeln!(f, "Dependencies:")?;
        for (name, version) in &self.dependencies {
            writeln!(f, "    {} {}", name, version)?;
        }
        writeln!(
            f,
            "Files:           {} ({} client / {} server)",
            self.file_count, self.client_file_count, self.server_file_count
        )?;
        write!(
            f,
            "Download size:   {:.2} MiB client / {:.2} MiB server",
            mib(self.client_download_bytes),
            mib(self.server_download_bytes)
        )
    }
}
