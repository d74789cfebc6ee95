pub mod installer;
pub mod modpack;
pub mod profile;

// Re-export commonly used types
pub use installer::core::modpack_installer::{InstallOptions, ModpackInstaller, PackagedModpack};
pub use installer::types::{ExtractOptions, InstallerConfig, ProgressReporter, ResolveOptions};
pub use modpack::{ModpackArchive, ModpackInfo, ModpackManifest, Side};
pub use profile::InstallProfile;
