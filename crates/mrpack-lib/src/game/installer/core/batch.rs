use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{ModpackError, Result};
use crate::game::installer::core::downloader::{prepare_entry, resolve_file};
use crate::game::installer::core::traits::Fetcher;
use crate::game::installer::types::{ProgressReporter, ResolveOptions};
use crate::game::modpack::types::{ModpackManifest, ResolvedFile};

/// Resolve every entry of `manifest` wanted for `options.side`.
///
/// All wanted entries are validated (URL list, hosts, path) before the first
/// request. Results keep manifest order regardless of concurrency, and the
/// first failing entry aborts the batch.
pub async fn resolve_files(
    fetcher: &dyn Fetcher,
    manifest: &ModpackManifest,
    options: &ResolveOptions,
    reporter: &dyn ProgressReporter,
) -> Result<Vec<ResolvedFile>> {
    let wanted: Vec<_> = manifest
        .files_for(options.side, options.include_optional)
        .collect();

    for entry in &wanted {
        prepare_entry(entry)?;
    }

    let total = wanted.len();
    log::info!(
        "[resolve_files] {} of {} files needed for {} (optional: {}, concurrency: {})",
        total,
        manifest.files.len(),
        options.side,
        options.include_optional,
        options.concurrency
    );
    if total == 0 {
        return Ok(Vec::new());
    }

    reporter.set_step_count(0, Some(total as u32));
    let completed = AtomicUsize::new(0);

    let resolved: Vec<Option<ResolvedFile>> = stream::iter(wanted)
        .map(|entry| {
            let completed = &completed;
            async move {
                if reporter.is_cancelled() {
                    return Err(ModpackError::UserCancelled(
                        "download cancelled by user".to_string(),
                    ));
                }

                let file = resolve_file(fetcher, entry, options, reporter).await?;

                let count = completed.fetch_add(1, Ordering::SeqCst) + 1;
                reporter.set_step_count(count as u32, Some(total as u32));
                if count % 10 == 0 || count == total {
                    log::info!("Batch download progress: {}/{}", count, total);
                }
                Ok(file)
            }
        })
        .buffered(options.concurrency.max(1))
        .try_collect()
        .await?;

    Ok(resolved.into_iter().flatten().collect())
}
