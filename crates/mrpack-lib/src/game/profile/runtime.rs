use std::path::Path;

use crate::error::{ModpackError, Result};
use crate::utils::sanitize::escape_filename;

/// Check that `input` names an installed runtime version under `versions_dir`
/// and return the trimmed id.
pub fn validate_runtime_version(versions_dir: &Path, input: &str) -> Result<String> {
    let version_id = input.trim();
    if version_id.is_empty() {
        return Err(ModpackError::UserCancelled(
            "no runtime version was entered".to_string(),
        ));
    }

    if version_id == "." || version_id == ".." || escape_filename(version_id) != version_id {
        return Err(ModpackError::InvalidInput(format!(
            "{:?} is not a valid version id",
            version_id
        )));
    }

    let candidate = versions_dir.join(version_id);
    if !candidate.is_dir() {
        return Err(ModpackError::InvalidInput(format!(
            "version {:?} is not installed in {:?}",
            version_id, versions_dir
        )));
    }

    let root = dunce::canonicalize(versions_dir)?;
    let resolved = dunce::canonicalize(&candidate)?;
    if resolved.parent() != Some(root.as_path()) {
        log::warn!(
            "[validate_runtime_version] {:?} resolves to {:?}, outside {:?}",
            version_id,
            resolved,
            root
        );
        return Err(ModpackError::InvalidInput(format!(
            "version {:?} resolves outside the versions directory",
            version_id
        )));
    }

    Ok(version_id.to_string())
}
