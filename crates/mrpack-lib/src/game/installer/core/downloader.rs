use anyhow::Context;
use futures::future::BoxFuture;
use reqwest::Client;
use std::time::Instant;
use url::Url;

use crate::error::{ModpackError, Result};
use crate::game::installer::config;
use crate::game::installer::core::traits::Fetcher;
use crate::game::installer::types::{ProgressReporter, ResolveOptions};
use crate::game::modpack::types::{FileEntry, ResolvedFile};
use crate::utils::hash::{hashes_match, sha1_and_sha512};
use crate::utils::sanitize::normalize_relative_path;

/// reqwest-backed [`Fetcher`]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(config::current_timeout())
            .user_agent(config::USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, anyhow::Result<Vec<u8>>> {
        Box::pin(async move {
            let start = Instant::now();
            let response = self.client.get(url).send().await?;

            if !response.status().is_success() {
                anyhow::bail!("HTTP error {}: {}", response.status(), url);
            }

            let bytes = response.bytes().await?;
            log::debug!(
                "Download stats: url={}, size={} bytes, time={:.2}s",
                url,
                bytes.len(),
                start.elapsed().as_secs_f64()
            );
            Ok(bytes.to_vec())
        })
    }
}

/// Fail with `Security` unless `url` points at an allowlisted host.
pub fn check_download_url(url: &str) -> Result<()> {
    let host = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_default();

    if !config::is_allowed_host(&host) {
        log::error!("[check_download_url] Hostname {:?} isn't on the whitelist: {}", host, url);
        return Err(ModpackError::Security {
            host,
            url: url.to_string(),
        });
    }
    Ok(())
}

/// Validate an entry before any request is made and return its normalized path.
/// Every candidate URL is host-checked.
pub(crate) fn prepare_entry(entry: &FileEntry) -> Result<String> {
    if entry.downloads.is_empty() {
        return Err(ModpackError::manifest(format!(
            "no download URLs were provided for {}",
            entry.path
        )));
    }
    for url in &entry.downloads {
        check_download_url(url)?;
    }
    normalize_relative_path(&entry.path)
}

fn verify_hashes(entry: &FileEntry, path: &str, url: &str, bytes: &[u8]) -> Result<()> {
    let (sha1, sha512) = sha1_and_sha512(bytes);
    for (algorithm, computed, expected) in [
        ("SHA1", sha1, &entry.hashes.sha1),
        ("SHA512", sha512, &entry.hashes.sha512),
    ] {
        if !hashes_match(&computed, expected) {
            log::error!(
                "[verify_hashes] {} mismatch for {} from {}: expected {}, got {}",
                algorithm,
                path,
                url,
                expected,
                computed
            );
            return Err(ModpackError::Integrity {
                path: path.to_string(),
                url: url.to_string(),
                algorithm,
                expected: expected.clone(),
                actual: computed,
            });
        }
    }
    Ok(())
}

/// Resolve one manifest entry.
///
/// Returns `Ok(None)` when the entry is not wanted for the requested side.
/// URLs are tried in order; a transport failure moves on to the next one,
/// while a hash mismatch fails immediately.
pub async fn resolve_file(
    fetcher: &dyn Fetcher,
    entry: &FileEntry,
    options: &ResolveOptions,
    reporter: &dyn ProgressReporter,
) -> Result<Option<ResolvedFile>> {
    if !entry.should_download(options.side, options.include_optional) {
        log::debug!(
            "[resolve_file] Skipping {} ({:?} on {})",
            entry.path,
            entry.requirement(options.side),
            options.side
        );
        return Ok(None);
    }

    let path = prepare_entry(entry)?;
    log::info!(
        "Downloading [{:.2} MiB] {}",
        entry.file_size as f64 / (1024.0 * 1024.0),
        path
    );
    reporter.set_message(&format!("Downloading {}", path));

    let mut last_error: Option<anyhow::Error> = None;
    for url in &entry.downloads {
        log::debug!("[resolve_file] Using {}", url);
        let bytes = match fetcher.fetch(url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Error during download of {} from {}: {}", path, url, e);
                last_error = Some(e);
                continue;
            }
        };

        verify_hashes(entry, &path, url, &bytes)?;
        reporter.update_bytes(bytes.len() as u64, Some(entry.file_size));
        return Ok(Some(ResolvedFile { path, data: bytes }));
    }

    log::error!("[resolve_file] All download URLs failed for {}", path);
    Err(ModpackError::Download {
        path,
        last_error: last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no attempt succeeded".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::installer::tests::{file_entry, MockFetcher};
    use crate::game::installer::types::SilentProgressReporter;
    use crate::game::modpack::types::{EnvRequirement, FileEnv, Side};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const A: &str = "https://cdn.modrinth.com/data/a.jar";
    const B: &str = "https://github.com/owner/repo/releases/download/v1/a.jar";

    fn client_opts() -> ResolveOptions {
        ResolveOptions::new(Side::Client)
    }

    #[tokio::test]
    async fn first_successful_url_wins() {
        let fetcher = MockFetcher::new().serve(A, b"jar").serve(B, b"other");
        let entry = file_entry("mods/a.jar", b"jar", &[A, B]);
        let resolved = resolve_file(&fetcher, &entry, &client_opts(), &SilentProgressReporter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.path, "mods/a.jar");
        assert_eq!(resolved.data, b"jar");
        assert_eq!(fetcher.calls(), vec![A.to_string()]);
    }

    #[tokio::test]
    async fn transport_failure_falls_through_to_next_url() {
        let fetcher = MockFetcher::new().fail(A, "connection reset").serve(B, b"jar");
        let entry = file_entry("mods/a.jar", b"jar", &[A, B]);
        let resolved = resolve_file(&fetcher, &entry, &client_opts(), &SilentProgressReporter)
            .await
            .unwrap();
        assert!(resolved.is_some());
        assert_eq!(fetcher.calls(), vec![A.to_string(), B.to_string()]);
    }

    #[tokio::test]
    async fn hash_mismatch_stops_without_trying_next_url() {
        let fetcher = MockFetcher::new().serve(A, b"tampered").serve(B, b"jar");
        let entry = file_entry("mods/a.jar", b"jar", &[A, B]);
        let err = resolve_file(&fetcher, &entry, &client_opts(), &SilentProgressReporter)
            .await
            .unwrap_err();
        assert!(matches!(err, ModpackError::Integrity { algorithm: "SHA1", .. }), "{err:?}");
        assert_eq!(fetcher.calls(), vec![A.to_string()]);
    }

    #[tokio::test]
    async fn sha512_mismatch_alone_is_detected() {
        let fetcher = MockFetcher::new().serve(A, b"jar");
        let mut entry = file_entry("mods/a.jar", b"jar", &[A]);
        entry.hashes.sha512 = "00".repeat(64);
        let err = resolve_file(&fetcher, &entry, &client_opts(), &SilentProgressReporter)
            .await
            .unwrap_err();
        assert!(matches!(err, ModpackError::Integrity { algorithm: "SHA512", .. }));
    }

    #[tokio::test]
    async fn declared_hashes_compare_case_insensitively() {
        let fetcher = MockFetcher::new().serve(A, b"jar");
        let mut entry = file_entry("mods/a.jar", b"jar", &[A]);
        entry.hashes.sha1 = entry.hashes.sha1.to_uppercase();
        entry.hashes.sha512 = entry.hashes.sha512.to_uppercase();
        let resolved = resolve_file(&fetcher, &entry, &client_opts(), &SilentProgressReporter)
            .await
            .unwrap();
        assert!(resolved.is_some());
    }

    #[tokio::test]
    async fn all_urls_failing_is_a_download_error() {
        let fetcher = MockFetcher::new().fail(A, "timeout").fail(B, "dns");
        let entry = file_entry("mods/a.jar", b"jar", &[A, B]);
        let err = resolve_file(&fetcher, &entry, &client_opts(), &SilentProgressReporter)
            .await
            .unwrap_err();
        match err {
            ModpackError::Download { path, last_error } => {
                assert_eq!(path, "mods/a.jar");
                assert!(last_error.contains("dns"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_url_list_is_a_manifest_error() {
        let fetcher = MockFetcher::new();
        let entry = file_entry("mods/a.jar", b"jar", &[]);
        let err = resolve_file(&fetcher, &entry, &client_opts(), &SilentProgressReporter)
            .await
            .unwrap_err();
        assert!(matches!(err, ModpackError::Manifest(_)), "{err:?}");
    }

    #[tokio::test]
    async fn untrusted_host_anywhere_fails_before_any_request() {
        let evil = "https://evil.example.com/a.jar";
        let fetcher = MockFetcher::new().serve(A, b"jar");
        let entry = file_entry("mods/a.jar", b"jar", &[A, evil]);
        let err = resolve_file(&fetcher, &entry, &client_opts(), &SilentProgressReporter)
            .await
            .unwrap_err();
        assert!(matches!(err, ModpackError::Security { ref host, .. } if host == "evil.example.com"));
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn unsupported_entries_are_skipped_without_validation() {
        let fetcher = MockFetcher::new();
        let mut entry = file_entry("mods/a.jar", b"jar", &[]);
        entry.env = Some(FileEnv {
            client: EnvRequirement::Unsupported,
            server: EnvRequirement::Required,
        });
        let mut opts = client_opts();
        opts.include_optional = true;
        let resolved = resolve_file(&fetcher, &entry, &opts, &SilentProgressReporter)
            .await
            .unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn traversal_path_is_rejected() {
        let fetcher = MockFetcher::new().serve(A, b"jar");
        let entry = file_entry("../../.bashrc", b"jar", &[A]);
        let err = resolve_file(&fetcher, &entry, &client_opts(), &SilentProgressReporter)
            .await
            .unwrap_err();
        assert!(matches!(err, ModpackError::Manifest(_)));
        assert!(fetcher.calls().is_empty());
    }

    #[test]
    fn url_checks() {
        assert!(check_download_url(A).is_ok());
        assert!(check_download_url("https://raw.githubusercontent.com/a/b/c").is_ok());
        assert!(matches!(
            check_download_url("not a url"),
            Err(ModpackError::Security { .. })
        ));
        assert!(matches!(
            check_download_url("http://127.0.0.1/a.jar"),
            Err(ModpackError::Security { .. })
        ));
    }

    #[tokio::test]
    async fn http_fetcher_returns_body_and_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok.jar"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jar".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/missing.jar"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let body = fetcher
            .fetch(&format!("{}/ok.jar", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, b"jar");

        let err = fetcher
            .fetch(&format!("{}/missing.jar", server.uri()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("404"));
    }
}
