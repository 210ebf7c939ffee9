//! Rebuilds whenever source files change.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{
    Duration,
    SystemTime,
};

use crate::build::{
    BuildError,
    BuildOptions,
    BuildScheduler,
    run_build,
};
use crate::config::ConfigManager;
use crate::indexer::FileNuggetFinder;

/// Default polling period and minimum delay between builds.
pub const DEFAULT_WATCH_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    pub delay: Duration,
    pub build: BuildOptions,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self { delay: DEFAULT_WATCH_DELAY, build: BuildOptions::default() }
    }
}

/// Size and modification time of every source file.
type Fingerprint = BTreeMap<PathBuf, (u64, Option<SystemTime>)>;

/// Stats every source file the finder lists.
fn fingerprint(finder: &FileNuggetFinder) -> Fingerprint {
    finder
        .find_source_files()
        .into_iter()
        .map(|path| {
            let stamp = std::fs::metadata(&path)
                .map(|metadata| (metadata.len(), metadata.modified().ok()))
                .unwrap_or_default();
            (path, stamp)
        })
        .collect()
}

/// Builds once, then rebuilds on source changes until Ctrl-C.
pub async fn watch(config_manager: ConfigManager, options: WatchOptions) -> Result<(), BuildError> {
    watch_until(config_manager, options, async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "Failed to listen for Ctrl-C");
        }
    })
    .await
    .map(|_| ())
}

/// Builds once, then rebuilds on source changes until `shutdown` completes.
///
/// Returns the number of builds that ran.
pub async fn watch_until<S>(
    config_manager: ConfigManager,
    options: WatchOptions,
    shutdown: S,
) -> Result<usize, BuildError>
where
    S: Future<Output = ()>,
{
    let config_manager = Arc::new(config_manager);
    let finder = Arc::new(FileNuggetFinder::new(&config_manager)?);
    let scheduler = BuildScheduler::new(options.delay);

    let mut builds = 0;
    let mut known = snapshot(&finder).await;
    if run_scheduled(&scheduler, &config_manager, options.build).await {
        builds += 1;
    }

    tracing::info!(
        project_root = %config_manager.project_root().display(),
        delay_ms = options.delay.as_millis(),
        "Watching for changes"
    );

    tokio::pin!(shutdown);
    let mut interval = tokio::time::interval(options.delay);
    interval.tick().await;

    loop {
        tokio::select! {
            () = &mut shutdown => {
                tracing::info!("Stopping watch");
                break;
            }
            _ = interval.tick() => {
                let current = snapshot(&finder).await;
                if current == known {
                    continue;
                }
                tracing::info!("Source files changed");
                if run_scheduled(&scheduler, &config_manager, options.build).await {
                    builds += 1;
                    known = current;
                }
            }
        }
    }

    Ok(builds)
}

/// [`fingerprint`] on the blocking pool.
async fn snapshot(finder: &Arc<FileNuggetFinder>) -> Fingerprint {
    let finder = Arc::clone(finder);
    tokio::task::spawn_blocking(move || fingerprint(&finder)).await.unwrap_or_else(|error| {
        tracing::error!(%error, "Failed to list source files");
        Fingerprint::new()
    })
}

/// Runs a build through the scheduler; true when it ran.
async fn run_scheduled(
    scheduler: &BuildScheduler,
    config_manager: &Arc<ConfigManager>,
    options: BuildOptions,
) -> bool {
    let config_manager = Arc::clone(config_manager);
    match scheduler.try_run_blocking(move || run_build(&config_manager, options)).await {
        Some(Ok(report)) => {
            if !report.is_success() {
                tracing::warn!("Build finished with merge failures");
            }
            true
        }
        Some(Err(error)) => {
            tracing::error!(%error, "Build failed");
            true
        }
        None => false,
    }
}
