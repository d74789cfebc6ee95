//! Centralized installer settings.
//! Static constants used by the resolver, packager and profile installer.

use std::path::PathBuf;

use crate::game::modpack::types::Side;

/// Hosts that modpack files may be downloaded from
pub const ALLOWED_HOSTNAMES: &[&str] = &[
    "cdn.modrinth.com",
    "github.com",
    "raw.githubusercontent.com",
    "gitlab.com",
];

pub const REQUEST_TIMEOUT_SECS: u64 = 120;

pub const USER_AGENT: &str = concat!("mrpack-installer/", env!("CARGO_PKG_VERSION"));

/// Number of files fetched at once. 1 keeps downloads strictly sequential.
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Appended to the output base name for the packaged archive
pub const COMPRESSED_ARCHIVE_SUFFIX: &str = " (Compressed).zip";

pub const LAUNCHER_PROFILES_FILE: &str = "launcher_profiles.json";
pub const VERSIONS_DIR_NAME: &str = "versions";
pub const INSTANCES_DIR_NAME: &str = "modpacks";
pub const PROFILE_TYPE: &str = "custom";

/// Default output folders, relative to the working directory
pub const CLIENT_EXTRACT_DIR: &str = "extracted_modpacks";
pub const SERVER_EXTRACT_DIR: &str = "extracted_server_modpacks";

pub fn current_timeout() -> std::time::Duration {
    std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS)
}

pub fn is_allowed_host(host: &str) -> bool {
    ALLOWED_HOSTNAMES
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(host))
}

pub fn default_extract_dir(side: Side) -> PathBuf {
    match side {
        Side::Client => PathBuf::from(CLIENT_EXTRACT_DIR),
        Side::Server => PathBuf::from(SERVER_EXTRACT_DIR),
    }
}

/// Platform default game directory of the official launcher.
pub fn default_minecraft_dir() -> Option<PathBuf> {
    let dirs = directories::BaseDirs::new()?;
    #[cfg(target_os = "windows")]
    return Some(dirs.data_dir().join(".minecraft"));

    #[cfg(target_os = "macos")]
    return Some(dirs.data_dir().join("minecraft"));

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    return Some(dirs.home_dir().join(".minecraft"));
}
