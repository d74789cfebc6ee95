//! Error types shared by every stage of the modpack pipeline.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, ModpackError>;

/// Every failure the pipeline can surface to its caller.
///
/// The first seven variants are the domain errors a presentation layer is
/// expected to format individually. The remaining ones wrap infrastructure
/// failures and are never used for control flow.
#[derive(Debug, thiserror::Error)]
pub enum ModpackError {
    #[error("Invalid modpack file: {0}")]
    Manifest(String),

    #[error("Invalid modpack file: hostname {host:?} isn't on the whitelist ({url})")]
    Security { host: String, url: String },

    #[error("{algorithm} hashes don't match for {path}: expected {expected}, got {actual} ({url})")]
    Integrity {
        path: String,
        url: String,
        algorithm: &'static str,
        expected: String,
        actual: String,
    },

    #[error("All provided download URLs failed for {path}: {last_error}")]
    Download { path: String, last_error: String },

    #[error("The destination {0:?} already exists! Please remove it first.")]
    DestinationExists(PathBuf),

    #[error("Cancelled: {0}")]
    UserCancelled(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid launcher profiles document: {0}")]
    Registry(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ModpackError {
    /// Short stable tag identifying the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ModpackError::Manifest(_) => "manifest",
            ModpackError::Security { .. } => "security",
            ModpackError::Integrity { .. } => "integrity",
            ModpackError::Download { .. } => "download",
            ModpackError::DestinationExists(_) => "destination_exists",
            ModpackError::UserCancelled(_) => "user_cancelled",
            ModpackError::InvalidInput(_) => "invalid_input",
            ModpackError::Registry(_) => "registry",
            ModpackError::Io(_) => "io",
            ModpackError::Archive(_) => "archive",
            ModpackError::Json(_) => "json",
            ModpackError::Image(_) => "image",
            ModpackError::Other(_) => "other",
        }
    }

    pub(crate) fn manifest(message: impl Into<String>) -> Self {
        ModpackError::Manifest(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags_are_distinct_for_domain_errors() {
        let errors = [
            ModpackError::manifest("x"),
            ModpackError::Security {
                host: "evil.example".into(),
                url: "https://evil.example/a.jar".into(),
            },
            ModpackError::Integrity {
                path: "mods/a.jar".into(),
                url: "https://cdn.modrinth.com/a.jar".into(),
                algorithm: "SHA1",
                expected: "aa".into(),
                actual: "bb".into(),
            },
            ModpackError::Download {
                path: "mods/a.jar".into(),
                last_error: "timeout".into(),
            },
            ModpackError::DestinationExists(PathBuf::from("/tmp/x")),
            ModpackError::UserCancelled("no".into()),
            ModpackError::InvalidInput("../x".into()),
        ];
        let mut kinds: Vec<_> = errors.iter().map(|e| e.kind()).collect();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn security_message_names_host() {
        let err = ModpackError::Security {
            host: "evil.example".into(),
            url: "https://evil.example/a.jar".into(),
        };
        assert!(err.to_string().contains("evil.example"));
    }
}
