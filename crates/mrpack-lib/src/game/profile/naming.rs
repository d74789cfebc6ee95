use std::path::{Path, PathBuf};

use crate::error::{ModpackError, Result};
use crate::game::installer::core::traits::InstallPrompt;
use crate::game::modpack::types::ModpackManifest;
use crate::utils::sanitize::{escape_filename, escape_filename_strict};

/// Where a modpack gets installed and how its profile is labelled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLocation {
    pub display_name: String,
    pub directory: PathBuf,
}

/// Directory name derived from the manifest name and version
pub fn install_dir_name(manifest: &ModpackManifest, strict: bool) -> String {
    let base = manifest.display_name();
    if strict {
        escape_filename_strict(&base)
    } else {
        escape_filename(&base)
    }
}

/// First `<dir>_N` (N >= 2) under `root` that does not exist yet.
/// The same suffix is appended to `label`.
pub fn compute_unique_location(root: &Path, dir_name: &str, label: &str) -> InstallLocation {
    let mut idx = 2;
    loop {
        let candidate = root.join(format!("{}_{}", dir_name, idx));
        if !candidate.exists() {
            return InstallLocation {
                display_name: format!("{}_{}", label, idx),
                directory: candidate,
            };
        }
        idx += 1;
    }
}

/// Decide the install directory, asking before installing a second copy.
///
/// The returned directory is always absolute; a relative `instances_dir` is
/// resolved against the current working directory.
pub fn plan_install_location(
    instances_dir: &Path,
    manifest: &ModpackManifest,
    strict: bool,
    prompt: &dyn InstallPrompt,
) -> Result<InstallLocation> {
    let dir_name = install_dir_name(manifest, strict);
    let label = manifest.display_name();
    let root = std::path::absolute(instances_dir)?;
    let directory = root.join(&dir_name);

    if !directory.exists() {
        return Ok(InstallLocation {
            display_name: label,
            directory,
        });
    }

    log::info!("[plan_install_location] {:?} is already installed", directory);
    if !prompt.confirm_reinstall(&directory) {
        return Err(ModpackError::UserCancelled(format!(
            "{} is already installed",
            label
        )));
    }

    let location = compute_unique_location(&root, &dir_name, &label);
    log::info!("[plan_install_location] Installing again as {:?}", location.directory);
    Ok(location)
}
