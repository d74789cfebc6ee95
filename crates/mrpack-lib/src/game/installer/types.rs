use std::path::PathBuf;
use tokio::sync::watch;

use crate::game::installer::config::{self, DEFAULT_CONCURRENCY, INSTANCES_DIR_NAME};
use crate::game::modpack::types::Side;

/// Progress reporter trait for installer operations
/// Implementations forward updates to whatever front end is running the pipeline
pub trait ProgressReporter: Send + Sync {
    /// Start a new step with optional total steps
    fn start_step(&self, name: &str, total_steps: Option<u32>);

    /// Update bytes transferred for download progress
    fn update_bytes(&self, transferred: u64, total: Option<u64>);

    /// Set a short status message
    fn set_message(&self, message: &str);

    /// Set a numeric step count for the current step (e.g. "3/12").
    /// `total` may be None when unknown.
    fn set_step_count(&self, current: u32, total: Option<u32>);

    /// Mark operation as complete
    fn done(&self, success: bool, message: Option<&str>);

    /// Check if operation has been cancelled
    fn is_cancelled(&self) -> bool;
}

/// A progress reporter that does nothing (silent).
/// Useful for tests.
pub struct SilentProgressReporter;

impl ProgressReporter for SilentProgressReporter {
    fn start_step(&self, _name: &str, _total_steps: Option<u32>) {}
    fn update_bytes(&self, _transferred: u64, _total: Option<u64>) {}
    fn set_message(&self, _message: &str) {}
    fn set_step_count(&self, _current: u32, _total: Option<u32>) {}
    fn done(&self, _success: bool, _message: Option<&str>) {}
    fn is_cancelled(&self) -> bool { false }
}

/// Cancellation token wrapper
#[derive(Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn new(rx: watch::Receiver<bool>) -> Self {
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }
}

/// Which files to fetch and how
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    pub side: Side,
    /// Fetch files marked `optional` for `side`
    pub include_optional: bool,
    /// Number of files fetched at once
    pub concurrency: usize,
}

impl ResolveOptions {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            include_optional: true,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// What to do when the packaging target already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistingOutput {
    /// Fail with `DestinationExists`
    Fail,
    /// Pick the first free `_N` suffix (N >= 2)
    Disambiguate,
}

/// Packaging-only invocation
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub resolve: ResolveOptions,
    /// Folder receiving `<name> - <version> (Compressed).zip` and its unpacked tree
    pub destination: PathBuf,
    pub existing: ExistingOutput,
}

impl ExtractOptions {
    pub fn new(side: Side, destination: PathBuf) -> Self {
        Self {
            resolve: ResolveOptions::new(side),
            destination,
            existing: ExistingOutput::Fail,
        }
    }
}

/// Locations used by the profile installer
#[derive(Debug, Clone)]
pub struct InstallerConfig {
    /// Game directory holding `launcher_profiles.json` and `versions/`
    pub minecraft_dir: PathBuf,
    /// Parent of the per-modpack install directories
    pub instances_dir: PathBuf,
    /// Lower-case, `[a-z0-9_-]`-only directory names
    pub strict_names: bool,
}

impl InstallerConfig {
    pub fn new(minecraft_dir: PathBuf) -> Self {
        Self {
            instances_dir: minecraft_dir.join(INSTANCES_DIR_NAME),
            minecraft_dir,
            strict_names: false,
        }
    }

    /// Config rooted at the platform default game directory
    pub fn platform_default() -> Option<Self> {
        config::default_minecraft_dir().map(Self::new)
    }

    /// Get the path to the runtime versions directory
    pub fn versions_dir(&self) -> PathBuf {
        self.minecraft_dir.join(config::VERSIONS_DIR_NAME)
    }

    /// Get the path to the launcher profile registry
    pub fn launcher_profiles_path(&self) -> PathBuf {
        self.minecraft_dir.join(config::LAUNCHER_PROFILES_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installer_config_paths() {
        let config = InstallerConfig::new(PathBuf::from("/home/u/.minecraft"));
        assert_eq!(config.versions_dir(), PathBuf::from("/home/u/.minecraft/versions"));
        assert_eq!(
            config.launcher_profiles_path(),
            PathBuf::from("/home/u/.minecraft/launcher_profiles.json")
        );
        assert_eq!(config.instances_dir, PathBuf::from("/home/u/.minecraft/modpacks"));
        assert!(!config.strict_names);
    }

    #[test]
    fn cancel_token_follows_channel() {
        let (tx, rx) = watch::channel(false);
        let token = CancelToken::new(rx);
        assert!(!token.is_cancelled());
        tx.send(true).unwrap();
        assert!(token.is_cancelled());
    }

    #[test]
    fn resolve_options_default_to_sequential_with_optional_files() {
        let opts = ResolveOptions::new(Side::Server);
        assert_eq!(opts.concurrency, 1);
        assert!(opts.include_optional);
    }
}
