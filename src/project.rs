//! Writes a translated copy of a source tree for every culture.

use std::fs;
use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

use ignore::WalkBuilder;
use thiserror::Error;

use crate::config::ConfigManager;
use crate::culture::{
    is_known_culture,
    normalize_culture,
};
use crate::dictionary::PoFilesTranslationsProvider;
use crate::manager::LocalizationManager;
use crate::store::{
    DirectoryLocationProvider,
    PoTranslationRepository,
    StoreError,
};

/// Output directory name used when none is given.
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "projected";

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("Default culture not specified. Use --project-default-lang")]
    MissingDefaultLanguage,
    #[error("Default culture not found: {0}")]
    UnknownCulture(String),
    #[error("Directory does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("File {} already exists. Use --project-force to overwrite.", .0.display())]
    OutputExists(PathBuf),
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ProjectError {
    /// Wraps an I/O error with the path it concerns.
    fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::Io { path: path.to_path_buf(), source }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjectOptions {
    pub source_directory: PathBuf,
    /// Culture the nuggets are written in.
    pub default_culture: Option<String>,
    /// Defaults to `<source_directory>/projected`.
    pub output_directory: Option<PathBuf>,
    /// Overwrite existing output files.
    pub force: bool,
}

/// Outcome of [`run_project`].
#[derive(Debug, Default)]
pub struct ProjectReport {
    pub output_directory: PathBuf,
    pub cultures: Vec<String>,
    pub files_written: usize,
    /// Files that could not be projected; the others were still written.
    pub failures: Vec<ProjectError>,
}

impl ProjectReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs every file under the source directory through the localization
/// manager and writes it to `<output>/<culture>/<relative path>`.
///
/// Files that are not UTF-8 are copied unchanged. Nothing is written when an
/// output file exists and `force` is off. A file that fails to project is
/// logged and recorded in the report, and the remaining files are still
/// written.
pub fn run_project(
    config_manager: &ConfigManager,
    options: &ProjectOptions,
) -> Result<ProjectReport, ProjectError> {
    let default_culture = options
        .default_culture
        .as_deref()
        .map(str::trim)
        .filter(|culture| !culture.is_empty())
        .ok_or(ProjectError::MissingDefaultLanguage)?;
    if !is_known_culture(default_culture) {
        return Err(ProjectError::UnknownCulture(default_culture.to_string()));
    }

    let source = std::path::absolute(&options.source_directory)
        .map_err(ProjectError::io(&options.source_directory))?;
    if !source.is_dir() {
        return Err(ProjectError::SourceNotFound(source));
    }
    let output = match &options.output_directory {
        Some(directory) => std::path::absolute(directory).map_err(ProjectError::io(directory))?,
        None => source.join(DEFAULT_OUTPUT_DIRECTORY),
    };

    let locale_directory = config_manager.locale_directory();
    let cultures = project_cultures(default_culture, &locale_directory)?;
    tracing::info!(
        default_culture = %default_culture,
        cultures = ?cultures,
        locale_directory = %locale_directory.display(),
        "Projecting languages"
    );

    let files = source_files(&source, &output);
    if !options.force {
        let output = &output;
        let files = &files;
        let existing = cultures
            .iter()
            .flat_map(|culture| files.iter().map(move |file| output.join(culture).join(file)))
            .find(|path| path.exists());
        if let Some(path) = existing {
            return Err(ProjectError::OutputExists(path));
        }
    }

    let locations =
        DirectoryLocationProvider::new(&locale_directory).with_default_culture(default_culture);
    let manager =
        LocalizationManager::new(Arc::new(PoFilesTranslationsProvider::new(Arc::new(locations))));

    let mut files_written = 0;
    let mut failures = Vec::new();
    for culture in &cultures {
        tracing::info!(culture = %culture, "Projecting language");
        for file in &files {
            let target = output.join(culture).join(file);
            match project_file(&manager, culture, &source.join(file), &target) {
                Ok(()) => files_written += 1,
                Err(error) => {
                    tracing::error!(culture = %culture, %error, "Failed to project file");
                    failures.push(error);
                }
            }
        }
    }

    tracing::info!(
        files = files_written,
        failed = failures.len(),
        output = %output.display(),
        "Projection finished"
    );
    Ok(ProjectReport { output_directory: output, cultures, files_written, failures })
}

/// Default culture followed by every language with a file in the locale
/// directory.
fn project_cultures(default_culture: &str, locale_directory: &Path) -> Result<Vec<String>, StoreError> {
    let mut cultures = vec![default_culture.to_string()];
    for language in PoTranslationRepository::new(locale_directory).list_available_languages()? {
        if !cultures.iter().any(|known| normalize_culture(known) == normalize_culture(&language)) {
            cultures.push(language);
        }
    }
    Ok(cultures)
}

/// Files under `source` relative to it, sorted, skipping `output`.
fn source_files(source: &Path, output: &Path) -> Vec<PathBuf> {
    let skip = output.to_path_buf();
    let mut files: Vec<PathBuf> = WalkBuilder::new(source)
        .standard_filters(false)
        .follow_links(false)
        .filter_entry(move |entry| entry.path() != skip)
        .build()
        .filter_map(|result| match result {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!(?err, "Failed to read directory entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .filter_map(|entry| entry.path().strip_prefix(source).ok().map(Path::to_path_buf))
        .collect();
    files.sort();
    files
}

/// Translates `input` for `culture` and writes it to `output`.
fn project_file(
    manager: &LocalizationManager,
    culture: &str,
    input: &Path,
    output: &Path,
) -> Result<(), ProjectError> {
    let bytes = fs::read(input).map_err(ProjectError::io(input))?;
    let contents = match String::from_utf8(bytes) {
        Ok(text) => manager.translate(culture, &text).into_bytes(),
        Err(error) => {
            tracing::debug!(path = %input.display(), "Copying non UTF-8 file unchanged");
            error.into_bytes()
        }
    };

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).map_err(ProjectError::io(parent))?;
    }
    fs::write(output, contents).map_err(ProjectError::io(output))?;
    tracing::debug!(path = %output.display(), "Wrote projected file");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;
    use tempfile::TempDir;

    use super::*;
    use crate::test_utils::{
        load_config,
        write_files,
    };

    const FRENCH: &str = r#"msgid ""
msgstr ""
"Language: fr\n"

msgid "Hello"
msgstr "Bonjour"
"#;

    #[fixture]
    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        write_files(
            dir.path(),
            &[
                ("site/index.html", "<h1>[[[Hello]]]</h1>"),
                ("site/pages/about.html", "<p>[[[About %0|||us]]]</p>"),
                ("locale/fr/messages.po", FRENCH),
            ],
        );
        dir
    }

    fn options(dir: &TempDir) -> ProjectOptions {
        ProjectOptions {
            source_directory: dir.path().join("site"),
            default_culture: Some("en".to_string()),
            output_directory: Some(dir.path().join("out")),
            force: false,
        }
    }

    fn config(dir: &TempDir) -> ConfigManager {
        load_config(dir.path())
    }

    #[rstest]
    fn test_project_writes_every_culture(site: TempDir) {
        let report = run_project(&config(&site), &options(&site)).unwrap();

        assert_that!(report.cultures, elements_are![eq("en"), eq("fr")]);
        assert_that!(report.files_written, eq(4));
        assert!(report.is_success());
        let out = site.path().join("out");
        assert_eq!(fs::read_to_string(out.join("fr/index.html")).unwrap(), "<h1>Bonjour</h1>");
        assert_eq!(fs::read_to_string(out.join("en/index.html")).unwrap(), "<h1>Hello</h1>");
        assert_eq!(fs::read_to_string(out.join("fr/pages/about.html")).unwrap(), "<p>About us</p>");
    }

    #[rstest]
    fn test_project_refuses_to_overwrite(site: TempDir) {
        run_project(&config(&site), &options(&site)).unwrap();

        let second = run_project(&config(&site), &options(&site));
        assert!(matches!(second, Err(ProjectError::OutputExists(_))));

        let forced = ProjectOptions { force: true, ..options(&site) };
        assert!(run_project(&config(&site), &forced).is_ok());
    }

    #[rstest]
    fn test_project_skips_output_inside_source(site: TempDir) {
        let inside = ProjectOptions { output_directory: None, ..options(&site) };

        let report = run_project(&config(&site), &inside).unwrap();

        assert_eq!(report.output_directory, site.path().join("site/projected"));
        assert_that!(report.files_written, eq(4));
        assert!(!site.path().join("site/projected/fr/projected").exists());
    }

    #[rstest]
    fn test_project_continues_after_file_error(site: TempDir) {
        fs::write(site.path().join("site/b.html"), "[[[Hello]]]").unwrap();
        fs::create_dir_all(site.path().join("out/en/index.html")).unwrap();
        let forced = ProjectOptions { force: true, ..options(&site) };

        let report = run_project(&config(&site), &forced).unwrap();

        assert!(!report.is_success());
        assert_that!(report.failures, len(eq(1)));
        assert!(matches!(
            &report.failures[0],
            ProjectError::Io { path, .. } if path.ends_with("en/index.html")
        ));
        assert_that!(report.files_written, eq(5));
        let out = site.path().join("out");
        assert_eq!(fs::read_to_string(out.join("en/b.html")).unwrap(), "Hello");
        assert_eq!(fs::read_to_string(out.join("fr/index.html")).unwrap(), "<h1>Bonjour</h1>");
    }

    #[rstest]
    fn test_project_copies_binary_files(site: TempDir) {
        let image = [0xff_u8, 0xfe, 0x00, 0x5b];
        fs::write(site.path().join("site/logo.bin"), image).unwrap();

        run_project(&config(&site), &options(&site)).unwrap();

        assert_eq!(fs::read(site.path().join("out/fr/logo.bin")).unwrap(), image);
    }

    #[rstest]
    #[case::missing(None)]
    #[case::blank(Some("  "))]
    fn test_project_requires_default_culture(site: TempDir, #[case] culture: Option<&str>) {
        let options =
            ProjectOptions { default_culture: culture.map(str::to_string), ..options(&site) };

        let result = run_project(&config(&site), &options);

        assert!(matches!(result, Err(ProjectError::MissingDefaultLanguage)));
    }

    #[rstest]
    fn test_project_rejects_unknown_culture(site: TempDir) {
        let options = ProjectOptions { default_culture: Some("xx-nope!".to_string()), ..options(&site) };

        let result = run_project(&config(&site), &options);

        assert!(matches!(result, Err(ProjectError::UnknownCulture(culture)) if culture == "xx-nope!"));
    }

    #[rstest]
    fn test_project_requires_source_directory(site: TempDir) {
        let options =
            ProjectOptions { source_directory: site.path().join("missing"), ..options(&site) };

        let result = run_project(&config(&site), &options);

        assert!(matches!(result, Err(ProjectError::SourceNotFound(_))));
    }
}
