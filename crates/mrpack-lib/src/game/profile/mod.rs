pub mod icon;
pub mod naming;
pub mod registry;
pub mod runtime;

pub use icon::icon_data_uri;
pub use naming::{install_dir_name, plan_install_location, InstallLocation};
pub use registry::{LauncherProfile, ProfileRegistry};
pub use runtime::validate_runtime_version;

use chrono::Utc;
use std::path::PathBuf;

use crate::error::Result;
use crate::game::installer::core::packager::{read_member, unpack_archive, PackageLayout};
use crate::game::installer::core::traits::InstallPrompt;
use crate::game::installer::types::{InstallerConfig, ProgressReporter};
use crate::game::modpack::types::{ModpackManifest, ICON_FILE_NAME};

/// A launcher profile created for an installed modpack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallProfile {
    pub id: String,
    pub display_name: String,
    pub install_directory: PathBuf,
    pub icon_data_uri: String,
    pub created_at: String,
    pub last_used_at: String,
    pub runtime_version_id: String,
}

/// Register a packaged modpack with the launcher and unpack it into its
/// install directory.
///
/// Steps, in order: pick the install directory (asking before a second copy),
/// build the icon, ask for the runtime version, add the profile to
/// `launcher_profiles.json`, then extract the packaged archive.
pub fn install_profile(
    config: &InstallerConfig,
    manifest: &ModpackManifest,
    layout: &PackageLayout,
    source_icon: Option<&[u8]>,
    prompt: &dyn InstallPrompt,
    reporter: &dyn ProgressReporter,
) -> Result<InstallProfile> {
    reporter.start_step("Creating launcher profile", Some(3));
    let location = plan_install_location(
        &config.instances_dir,
        manifest,
        config.strict_names,
        prompt,
    )?;
    log::info!(
        "[install_profile] Installing {:?} into {:?}",
        location.display_name,
        location.directory
    );

    let packaged_icon = read_member(&layout.archive_path, ICON_FILE_NAME)?;
    let icon = icon_data_uri(packaged_icon.as_deref().or(source_icon))?;
    reporter.set_step_count(1, Some(3));

    let runtime_version_id =
        validate_runtime_version(&config.versions_dir(), &prompt.runtime_version(manifest))?;
    log::info!("[install_profile] Using runtime version {}", runtime_version_id);
    reporter.set_step_count(2, Some(3));

    let profile = LauncherProfile::new(
        &location.display_name,
        icon,
        &runtime_version_id,
        &location.directory,
        Utc::now(),
    );
    let registry = ProfileRegistry::new(config.launcher_profiles_path());
    let id = registry.insert_profile(&profile)?;

    reporter.set_message(&format!("Extracting to {}", location.directory.display()));
    unpack_archive(&layout.archive_path, &location.directory)?;
    reporter.set_step_count(3, Some(3));

    Ok(InstallProfile {
        id,
        display_name: location.display_name,
        install_directory: location.directory,
        icon_data_uri: profile.icon,
        created_at: profile.created,
        last_used_at: profile.last_used,
        runtime_version_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModpackError;
    use crate::game::installer::core::packager::package;
    use crate::game::installer::tests::{MockPrompt, MockProgressReporter};
    use crate::game::installer::types::ExistingOutput;
    use crate::game::modpack::parser::parse_index;
    use crate::game::modpack::types::ResolvedFileSet;
    use tempfile::tempdir;

    struct Fixture {
        _tmp: tempfile::TempDir,
        config: InstallerConfig,
        layout: PackageLayout,
        manifest: ModpackManifest,
    }

    fn fixture() -> Fixture {
        let tmp = tempdir().unwrap();
        let config = InstallerConfig::new(tmp.path().join(".minecraft"));
        std::fs::create_dir_all(config.versions_dir().join("1.20.1")).unwrap();

        let mut files = ResolvedFileSet::new();
        files.insert("mods/a.jar", b"jar".to_vec());
        files.insert("config/a.txt", b"client".to_vec());
        let layout = package(&files, &tmp.path().join("staging"), "Pack - 1.0", ExistingOutput::Disambiguate).unwrap();

        let manifest = parse_index(
            serde_json::json!({"versionId": "1.0", "name": "Pack", "dependencies": {}, "files": []})
                .to_string()
                .as_bytes(),
        )
        .unwrap();

        Fixture { _tmp: tmp, config, layout, manifest }
    }

    #[test]
    fn installs_profile_and_files() {
        let f = fixture();
        let prompt = MockPrompt::new(true, "1.20.1");
        let reporter = MockProgressReporter::new();
        let installed =
            install_profile(&f.config, &f.manifest, &f.layout, None, &prompt, &reporter).unwrap();

        assert_eq!(installed.display_name, "Pack - 1.0");
        assert_eq!(installed.install_directory, f.config.instances_dir.join("Pack - 1.0"));
        assert_eq!(installed.runtime_version_id, "1.20.1");
        assert!(installed.icon_data_uri.starts_with("data:image/png;base64,"));
        assert_eq!(
            std::fs::read(installed.install_directory.join("config/a.txt")).unwrap(),
            b"client"
        );

        let doc: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(f.config.launcher_profiles_path()).unwrap(),
        )
        .unwrap();
        let entry = &doc["profiles"][&installed.id];
        assert_eq!(entry["name"], "Pack - 1.0");
        assert_eq!(entry["gameDir"], &*installed.install_directory.to_string_lossy());
        assert!(std::path::Path::new(entry["gameDir"].as_str().unwrap()).is_absolute());
        assert_eq!(entry["lastVersionId"], "1.20.1");
    }

    #[test]
    fn second_install_gets_suffix_and_new_profile() {
        let f = fixture();
        let prompt = MockPrompt::new(true, "1.20.1");
        let first = install_profile(&f.config, &f.manifest, &f.layout, None, &prompt, &MockProgressReporter::new()).unwrap();
        let second = install_profile(&f.config, &f.manifest, &f.layout, None, &prompt, &MockProgressReporter::new()).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(second.display_name, "Pack - 1.0_2");
        assert_eq!(second.install_directory, f.config.instances_dir.join("Pack - 1.0_2"));
    }

    #[test]
    fn unknown_runtime_version_leaves_registry_untouched() {
        let f = fixture();
        let prompt = MockPrompt::new(true, "1.7.10");
        let err = install_profile(&f.config, &f.manifest, &f.layout, None, &prompt, &MockProgressReporter::new()).unwrap_err();
        assert!(matches!(err, ModpackError::InvalidInput(_)));
        assert!(!f.config.launcher_profiles_path().exists());
        assert!(!f.config.instances_dir.join("Pack - 1.0").exists());
    }

    #[test]
    fn empty_runtime_version_cancels() {
        let f = fixture();
        let prompt = MockPrompt::new(true, "  ");
        let err = install_profile(&f.config, &f.manifest, &f.layout, None, &prompt, &MockProgressReporter::new()).unwrap_err();
        assert_eq!(err.kind(), "user_cancelled");
    }
}
