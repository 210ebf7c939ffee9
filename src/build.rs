//! Build pipeline: scan sources, write the template, merge languages.

use std::sync::{
    Arc,
    Mutex,
    PoisonError,
};
use std::time::{
    Duration,
    Instant,
};

use thiserror::Error;
use tokio::sync::Semaphore;

use crate::config::ConfigManager;
use crate::indexer::{
    FileNuggetFinder,
    IndexerError,
};
use crate::merge::{
    MergeReport,
    TranslationMerger,
};
use crate::store::{
    PoTranslationRepository,
    StoreError,
};

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Indexer(#[from] IndexerError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Merge the template into language files after it changed.
    pub merge: bool,
    /// Add the source line of every reference to the template as an
    /// extracted comment.
    pub show_source_context: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { merge: true, show_source_context: false }
    }
}

/// What a build did.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub files_scanned: usize,
    pub nuggets: usize,
    pub warnings: usize,
    pub template_changed: bool,
    /// `None` when no merge ran.
    pub merge: Option<MergeReport>,
}

impl BuildReport {
    /// False when any language failed to merge.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.merge.as_ref().is_none_or(MergeReport::is_success)
    }
}

/// Runs one build for the project described by `config_manager`.
///
/// Languages are merged when the template changed or a configured language
/// has no file yet.
pub fn run_build(
    config_manager: &ConfigManager,
    options: BuildOptions,
) -> Result<BuildReport, BuildError> {
    let started = Instant::now();
    let settings = config_manager.get_settings();

    let finder =
        FileNuggetFinder::new(config_manager)?.with_source_context(options.show_source_context);
    let scan = finder.parse_all();

    let repository = PoTranslationRepository::new(config_manager.locale_directory());
    let template_changed = repository.save_template(&scan.items)?;

    let missing_language = settings
        .languages
        .iter()
        .any(|culture| !repository.locations().language_path(culture).is_file());

    let merge = (options.merge && (template_changed || missing_language)).then(|| {
        TranslationMerger::new(repository.clone())
            .with_languages(settings.languages.iter().cloned())
            .merge_all_translation(&scan.items)
    });

    let report = BuildReport {
        files_scanned: scan.files_scanned,
        nuggets: scan.items.len(),
        warnings: scan.warnings.len(),
        template_changed,
        merge,
    };

    tracing::info!(
        files = report.files_scanned,
        nuggets = report.nuggets,
        template_changed = report.template_changed,
        elapsed_ms = started.elapsed().as_millis(),
        "Build finished"
    );

    Ok(report)
}

/// Runs builds one at a time.
///
/// A trigger is dropped while another build holds the slot, or when it
/// arrives within `min_delay` of the last completed build.
#[derive(Debug)]
pub struct BuildScheduler {
    /// Single permit held while a build runs.
    slot: Arc<Semaphore>,
    /// Quiet period after a completed build.
    min_delay: Duration,
    /// When the last build finished.
    last_completed: Mutex<Option<Instant>>,
}

impl BuildScheduler {
    #[must_use]
    pub fn new(min_delay: Duration) -> Self {
        Self { slot: Arc::new(Semaphore::new(1)), min_delay, last_completed: Mutex::new(None) }
    }

    /// True while the last build finished less than `min_delay` ago.
    fn within_delay(&self) -> bool {
        self.last_completed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some_and(|completed| completed.elapsed() < self.min_delay)
    }

    /// Records that a build just finished.
    fn mark_completed(&self) {
        *self.last_completed.lock().unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
    }

    /// Runs `job` on the current thread unless the trigger is dropped.
    pub fn try_run<T>(&self, job: impl FnOnce() -> T) -> Option<T> {
        let Ok(_permit) = self.slot.try_acquire() else {
            tracing::debug!("Build already running, trigger dropped");
            return None;
        };
        if self.within_delay() {
            tracing::debug!("Build completed recently, trigger dropped");
            return None;
        }

        let result = job();
        self.mark_completed();
        Some(result)
    }

    /// Runs `job` on the blocking thread pool unless the trigger is dropped.
    pub async fn try_run_blocking<T, F>(&self, job: F) -> Option<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let Ok(permit) = Arc::clone(&self.slot).try_acquire_owned() else {
            tracing::debug!("Build already running, trigger dropped");
            return None;
        };
        if self.within_delay() {
            tracing::debug!("Build completed recently, trigger dropped");
            return None;
        }

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        });
        match handle.await {
            Ok(result) => {
                self.mark_completed();
                Some(result)
            }
            Err(error) => {
                tracing::error!(%error, "Build task failed");
                None
            }
        }
    }
}
