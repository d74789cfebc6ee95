use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::Result;
use crate::game::installer::core::batch::resolve_files;
use crate::game::installer::core::downloader::HttpFetcher;
use crate::game::installer::core::packager::{package, PackageLayout};
use crate::game::installer::core::traits::{Fetcher, InstallPrompt};
use crate::game::installer::types::{
    ExistingOutput, ExtractOptions, InstallerConfig, ProgressReporter, ResolveOptions,
};
use crate::game::modpack::parser::ModpackArchive;
use crate::game::modpack::types::{ModpackManifest, ResolvedFileSet, Side};
use crate::game::profile::{install_profile, InstallProfile};
use crate::utils::sanitize::escape_filename;

/// Result of resolving and packaging a modpack
#[derive(Debug, Clone)]
pub struct PackagedModpack {
    pub manifest: ModpackManifest,
    pub layout: PackageLayout,
    pub file_count: usize,
}

/// Direct-install invocation
#[derive(Debug, Clone)]
pub struct InstallOptions {
    pub include_optional: bool,
    pub concurrency: usize,
    /// Where the packaged archive is staged before installing
    pub staging_dir: PathBuf,
    pub installer: InstallerConfig,
}

impl InstallOptions {
    pub fn new(installer: InstallerConfig, staging_dir: PathBuf) -> Self {
        let defaults = ResolveOptions::new(Side::Client);
        Self {
            include_optional: defaults.include_optional,
            concurrency: defaults.concurrency,
            staging_dir,
            installer,
        }
    }

    fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            side: Side::Client,
            include_optional: self.include_optional,
            concurrency: self.concurrency,
        }
    }
}

/// Runs the whole pipeline: parse, resolve, package and optionally install
pub struct ModpackInstaller {
    fetcher: Arc<dyn Fetcher>,
}

impl ModpackInstaller {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Installer backed by [`HttpFetcher`]
    pub fn http() -> Result<Self> {
        Ok(Self::new(Arc::new(HttpFetcher::new()?)))
    }

    /// Resolve downloads and overrides of an opened archive and package them
    /// under `destination`.
    pub async fn package_archive(
        &self,
        archive: &ModpackArchive,
        resolve: &ResolveOptions,
        destination: &Path,
        existing: ExistingOutput,
        reporter: &dyn ProgressReporter,
    ) -> Result<PackagedModpack> {
        let manifest = &archive.manifest;

        reporter.start_step("Collecting overrides", None);
        let overrides = archive.overrides(resolve.side)?;
        log::info!(
            "[ModpackInstaller] {} override files for {}",
            overrides.len(),
            resolve.side
        );

        reporter.start_step("Downloading files", None);
        let downloads = resolve_files(self.fetcher.as_ref(), manifest, resolve, reporter).await?;
        let files = ResolvedFileSet::from_parts(downloads, overrides);

        reporter.start_step("Packaging", None);
        let base_name = escape_filename(&manifest.display_name());
        let layout = package(&files, destination, &base_name, existing)?;

        Ok(PackagedModpack {
            manifest: manifest.clone(),
            layout,
            file_count: files.len(),
        })
    }

    /// Packaging-only mode: produce `<name> - <version> (Compressed).zip` and
    /// its unpacked tree for the requested side.
    pub async fn extract(
        &self,
        pack_path: &Path,
        options: &ExtractOptions,
        reporter: &dyn ProgressReporter,
    ) -> Result<PackagedModpack> {
        log::info!("[ModpackInstaller::extract] Extracting {:?} for {}", pack_path, options.resolve.side);
        reporter.start_step("Reading modpack", None);

        let result = async {
            let archive = ModpackArchive::open(pack_path)?;
            self.package_archive(
                &archive,
                &options.resolve,
                &options.destination,
                options.existing,
                reporter,
            )
            .await
        }
        .await;

        match &result {
            Ok(packaged) => {
                log::info!(
                    "[ModpackInstaller::extract] Wrote {} files to {:?}",
                    packaged.file_count,
                    packaged.layout.directory
                );
                reporter.done(true, Some("Extraction complete"));
            }
            Err(e) => {
                log::error!("[ModpackInstaller::extract] {}", e);
                reporter.done(false, Some("Extraction failed"));
            }
        }
        result
    }

    /// Direct-install mode: package the client side into the staging folder,
    /// then register a launcher profile and unpack into the instances folder.
    pub async fn install(
        &self,
        pack_path: &Path,
        options: &InstallOptions,
        prompt: &dyn InstallPrompt,
        reporter: &dyn ProgressReporter,
    ) -> Result<InstallProfile> {
        log::info!("[ModpackInstaller::install] Installing {:?}", pack_path);
        reporter.start_step("Reading modpack", None);

        let result = async {
            let archive = ModpackArchive::open(pack_path)?;
            let packaged = self
                .package_archive(
                    &archive,
                    &options.resolve_options(),
                    &options.staging_dir,
                    ExistingOutput::Disambiguate,
                    reporter,
                )
                .await?;

            install_profile(
                &options.installer,
                &packaged.manifest,
                &packaged.layout,
                archive.icon(),
                prompt,
                reporter,
            )
        }
        .await;

        match &result {
            Ok(profile) => {
                log::info!(
                    "[ModpackInstaller::install] Installed {:?} as profile {}",
                    profile.display_name,
                    profile.id
                );
                reporter.done(true, Some("Installation complete"));
            }
            Err(e) => {
                log::error!("[ModpackInstaller::install] {}", e);
                reporter.done(false, Some("Installation failed"));
            }
        }
        result
    }
}
