use crate::error::{ModpackError, Result};

/// Characters that are rejected by at least one common filesystem.
pub const FILENAME_UNSAFE_CHARACTERS: &str = "\\/:*?\"<>|";

/// Replace filesystem-unsafe and control characters with `_`.
///
/// Everything else, including spaces and non-ASCII text, is kept as is.
pub fn escape_filename(name: &str) -> String {
    name.chars()
        .map(|ch| {
            if FILENAME_UNSAFE_CHARACTERS.contains(ch) || (ch as u32) < 32 {
                '_'
            } else {
                ch
            }
        })
        .collect()
}

/// Strict variant of [`escape_filename`]: lower-cases ASCII and maps every
/// character outside `[a-z0-9_-]` to `_`.
pub fn escape_filename_strict(name: &str) -> String {
    name.chars()
        .map(|ch| {
            let lower = ch.to_ascii_lowercase();
            if lower.is_ascii_lowercase() || lower.is_ascii_digit() || lower == '-' || lower == '_' {
                lower
            } else {
                '_'
            }
        })
        .collect()
}

/// Validate an instance-relative path taken from untrusted input and return
/// it in normalized `/`-separated form.
///
/// Backslashes are treated as separators and `.` segments are dropped.
/// Absolute paths, drive prefixes and `..` segments are rejected.
pub fn normalize_relative_path(path: &str) -> Result<String> {
    let unified = path.replace('\\', "/");
    if unified.starts_with('/') {
        return Err(ModpackError::manifest(format!(
            "absolute path {:?} is not allowed",
            path
        )));
    }

    let mut parts = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                return Err(ModpackError::manifest(format!(
                    "path {:?} escapes the instance directory",
                    path
                )))
            }
            s if s.contains(':') => {
                return Err(ModpackError::manifest(format!(
                    "path {:?} contains a drive or stream separator",
                    path
                )))
            }
            s => parts.push(s),
        }
    }

    if parts.is_empty() {
        return Err(ModpackError::manifest(format!("empty file path {:?}", path)));
    }
    Ok(parts.join("/"))
}
