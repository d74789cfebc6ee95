use anyhow::Result;
use futures::future::BoxFuture;
use std::path::Path;

use crate::game::modpack::types::ModpackManifest;

/// Transport used by the download resolver.
/// Any error returned here is treated as a transport failure and the next
/// candidate URL is tried.
pub trait Fetcher: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>>>;
}

/// Decisions the installer needs from the user.
pub trait InstallPrompt: Send + Sync {
    /// `existing` is already installed; return true to install again under a suffixed name.
    fn confirm_reinstall(&self, existing: &Path) -> bool;

    /// Id of an installed runtime version (a folder name under `versions/`).
    /// An empty answer cancels the installation.
    fn runtime_version(&self, manifest: &ModpackManifest) -> String;
}
