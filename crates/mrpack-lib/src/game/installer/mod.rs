pub mod config;
pub mod core;
pub mod types;


use std::path::Path;

use crate::error::Result;
use crate::game::profile::InstallProfile;
use crate::game::installer::core::modpack_installer::{
    InstallOptions, ModpackInstaller, PackagedModpack,
};
use crate::game::installer::core::traits::InstallPrompt;
use crate::game::installer::types::{ExtractOptions, ProgressReporter};

/// Package a modpack for one side using the default HTTP transport
pub async fn extract_modpack(
    pack_path: &Path,
    options: &ExtractOptions,
    reporter: &dyn ProgressReporter,
) -> Result<PackagedModpack> {
    ModpackInstaller::http()?
        .extract(pack_path, options, reporter)
        .await
}

/// Main entry point for installing a modpack into the launcher
pub async fn install_modpack(
    pack_path: &Path,
    options: &InstallOptions,
    prompt: &dyn InstallPrompt,
    reporter: &dyn ProgressReporter,
) -> Result<InstallProfile> {
    ModpackInstaller::http()?
        .install(pack_path, options, prompt, reporter)
        .await
}
