//! Nugget scanner over the configured source directories.

use std::collections::{
    BTreeSet,
    btree_map::Entry,
};
use std::path::{
    Path,
    PathBuf,
};

use ignore::WalkBuilder;

use crate::config::{
    ConfigManager,
    FileMatcher,
};
use crate::indexer::types::{
    IndexerError,
    NuggetOccurrence,
    ScanResult,
    ScanWarning,
};
use crate::nugget::{
    NuggetParser,
    ParseContext,
};
use crate::store::{
    TranslationItem,
    TranslationItems,
};
use crate::types::Reference;

/// Finds nuggets in every source file of a project.
#[derive(Debug, Clone)]
pub struct FileNuggetFinder {
    /// Absolute directories walked for sources.
    directories: Vec<PathBuf>,
    /// Include and exclude patterns.
    matcher: FileMatcher,
    /// Source-mode parser with the configured tokens.
    parser: NuggetParser,
    /// Scanner threads.
    num_threads: usize,
    /// Add the source line of each reference as a comment.
    show_source_context: bool,
}

impl FileNuggetFinder {
    /// Creates a finder from the loaded project settings.
    pub fn new(config_manager: &ConfigManager) -> Result<Self, IndexerError> {
        let settings = config_manager.get_settings();
        let matcher = FileMatcher::new(config_manager.project_root().to_path_buf(), settings)?;
        let parser =
            NuggetParser::new(settings.nugget_tokens.clone(), ParseContext::SourceProcessing)?;

        Ok(Self {
            directories: config_manager.directories_to_scan(),
            matcher,
            parser,
            num_threads: settings.indexing.effective_threads(),
            show_source_context: false,
        })
    }

    /// Records `<path>:<line>: <source line>` as an extracted comment of
    /// every nugget.
    #[must_use]
    pub const fn with_source_context(mut self, enabled: bool) -> Self {
        self.show_source_context = enabled;
        self
    }

    #[must_use]
    pub const fn matcher(&self) -> &FileMatcher {
        &self.matcher
    }

    /// Source files under the scanned directories, sorted and deduplicated.
    #[must_use]
    pub fn find_source_files(&self) -> Vec<PathBuf> {
        let mut found_files = BTreeSet::new();

        for directory in &self.directories {
            for result in WalkBuilder::new(directory)
                .hidden(false)
                .git_ignore(true)
                .git_global(true)
                .git_exclude(true)
                .follow_links(false)
                .build()
            {
                let entry = match result {
                    Ok(entry) => entry,
                    Err(err) => {
                        tracing::debug!(?err, "Failed to read directory entry");
                        continue;
                    }
                };

                if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                    continue;
                }

                let path = entry.path();
                if self.matcher.is_source_file(path) {
                    found_files.insert(path.to_path_buf());
                }
            }
        }

        found_files.into_iter().collect()
    }

    /// Scans every source file and collects items keyed by message id.
    ///
    /// Unreadable files and malformed nuggets become warnings.
    #[must_use]
    pub fn parse_all(&self) -> ScanResult {
        let files = self.find_source_files();
        tracing::debug!(files = files.len(), threads = self.num_threads, "Scanning source files");

        let chunk_size = files.len().div_ceil(self.num_threads).max(1);
        let per_thread: Vec<(Vec<NuggetOccurrence>, Vec<ScanWarning>)> =
            std::thread::scope(|scope| {
                let handles: Vec<_> = files
                    .chunks(chunk_size)
                    .map(|chunk| scope.spawn(move || self.parse_files(chunk)))
                    .collect();

                handles
                    .into_iter()
                    .filter_map(|handle| match handle.join() {
                        Ok(result) => Some(result),
                        Err(_) => {
                            tracing::error!("Scanner thread panicked");
                            None
                        }
                    })
                    .collect()
            });

        let mut result = ScanResult { files_scanned: files.len(), ..ScanResult::default() };
        for (occurrences, warnings) in per_thread {
            for occurrence in occurrences {
                add_occurrence(&mut result.items, occurrence);
            }
            result.warnings.extend(warnings);
        }

        for warning in &result.warnings {
            tracing::warn!("{warning}");
        }
        tracing::info!(
            files = result.files_scanned,
            nuggets = result.items.len(),
            warnings = result.warnings.len(),
            "Scan finished"
        );

        result
    }

    /// Parses `files` in order, one thread's share of a scan.
    fn parse_files(&self, files: &[PathBuf]) -> (Vec<NuggetOccurrence>, Vec<ScanWarning>) {
        let mut occurrences = Vec::new();
        let mut warnings = Vec::new();

        for path in files {
            match std::fs::read_to_string(path) {
                Ok(content) => {
                    self.parse_content(path, &content, &mut occurrences, &mut warnings);
                }
                Err(source) => {
                    warnings.push(ScanWarning::Unreadable { path: path.clone(), source });
                }
            }
        }

        (occurrences, warnings)
    }

    /// Finds the nuggets of one file's content.
    pub(crate) fn parse_content(
        &self,
        path: &Path,
        content: &str,
        occurrences: &mut Vec<NuggetOccurrence>,
        warnings: &mut Vec<ScanWarning>,
    ) {
        let reference_path = self.matcher.reference_path(path);
        let mut lines = LineCounter::new(content);

        for result in self.parser.parse(content) {
            match result {
                Ok(found) => {
                    let reference =
                        Reference::new(reference_path.clone(), lines.line_at(found.span.start));
                    let context = self.show_source_context.then(|| {
                        format!("{reference}: {}", source_line(content, found.span.start))
                    });
                    occurrences.push(NuggetOccurrence {
                        message_id: found.nugget.message_id,
                        reference,
                        comment: found.nugget.comment,
                        context,
                    });
                }
                Err(error) => {
                    let start = error.span().map_or(0, |span| span.start);
                    warnings.push(ScanWarning::MalformedNugget {
                        reference: Reference::new(reference_path.clone(), lines.line_at(start)),
                        error,
                    });
                }
            }
        }
    }
}

/// Trimmed line of `text` containing byte `offset`.
fn source_line(text: &str, offset: usize) -> &str {
    let offset = offset.min(text.len());
    let (before, after) = text.as_bytes().split_at(offset);
    let start = before.iter().rposition(|&b| b == b'\n').map_or(0, |index| index + 1);
    let end = after.iter().position(|&b| b == b'\n').map_or(text.len(), |index| offset + index);
    text.get(start..end).unwrap_or_default().trim()
}

/// Adds one occurrence to its item, keeping extracted comments sorted and
/// unique.
fn add_occurrence(items: &mut TranslationItems, occurrence: NuggetOccurrence) {
    let NuggetOccurrence { message_id, reference, comment, context } = occurrence;
    let item = match items.entry(message_id) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(entry) => {
            let message_id = entry.key().clone();
            entry.insert(TranslationItem::new(message_id))
        }
    };

    item.references.insert(reference);
    for comment in comment.into_iter().chain(context) {
        if let Err(position) = item.extracted_comments.binary_search(&comment) {
            item.extracted_comments.insert(position, comment);
        }
    }
}

/// Converts increasing byte offsets to 1-based line numbers.
#[derive(Debug)]
struct LineCounter<'a> {
    /// Text being counted.
    text: &'a str,
    /// Byte offset counted up to.
    offset: usize,
    /// Line at `offset`.
    line: usize,
}

impl<'a> LineCounter<'a> {
    /// Counter positioned at the start of `text`.
    const fn new(text: &'a str) -> Self {
        Self { text, offset: 0, line: 1 }
    }

    /// Line of `offset`; rescans from the start for an earlier offset.
    fn line_at(&mut self, offset: usize) -> usize {
        if offset < self.offset {
            self.offset = 0;
            self.line = 1;
        }
        let end = offset.min(self.text.len());
        self.line += self
            .text
            .as_bytes()
            .get(self.offset..end)
            .map_or(0, |bytes| bytes.iter().filter(|&&b| b == b'\n').count());
        self.offset = end;
        self.line
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::fs;

    use googletest::prelude::*;
    use rstest::*;
    use tempfile::TempDir;

    use super::*;

    #[fixture]
    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("Views/Home")).unwrap();
        fs::create_dir_all(root.join("node_modules/lib")).unwrap();
        fs::write(
            root.join("Views/Home/Index.cshtml"),
            "<h1>[[[Welcome]]]</h1>\n<p>[[[Hello %0|||@Model.Name///greeting]]]</p>\n",
        )
        .unwrap();
        fs::write(root.join("index.html"), "\n\n<a>[[[Welcome///title]]]</a>\n").unwrap();
        fs::write(root.join("notes.md"), "[[[Not scanned]]]").unwrap();
        fs::write(root.join("node_modules/lib/index.js"), "'[[[Vendor]]]'").unwrap();
        dir
    }

    fn finder(root: &Path) -> FileNuggetFinder {
        let mut config_manager = ConfigManager::new(root);
        config_manager.load_settings(None).unwrap();
        FileNuggetFinder::new(&config_manager).unwrap()
    }

    #[rstest]
    fn test_find_source_files_applies_patterns(project: TempDir) {
        let files = finder(project.path()).find_source_files();

        assert_eq!(
            files,
            vec![project.path().join("Views/Home/Index.cshtml"), project.path().join("index.html")]
        );
    }

    #[rstest]
    fn test_parse_all_collects_items(project: TempDir) {
        let result = finder(project.path()).parse_all();

        assert_that!(result.files_scanned, eq(2));
        assert_that!(result.warnings, len(eq(0)));
        assert_eq!(result.items.keys().collect::<Vec<_>>(), vec!["Hello %0", "Welcome"]);

        let welcome = &result.items["Welcome"];
        assert_eq!(
            welcome.references.iter().collect::<Vec<_>>(),
            vec![
                &Reference::new("Views/Home/Index.cshtml", 1),
                &Reference::new("index.html", 3)
            ]
        );
        assert_that!(welcome.extracted_comments, elements_are![eq("title")]);
        assert_that!(welcome.translation, none());

        let hello = &result.items["Hello %0"];
        assert_eq!(
            hello.references.iter().collect::<Vec<_>>(),
            vec![&Reference::new("Views/Home/Index.cshtml", 2)]
        );
        assert_that!(hello.extracted_comments, elements_are![eq("greeting")]);
    }

    #[rstest]
    fn test_source_context_comments(project: TempDir) {
        let result = finder(project.path()).with_source_context(true).parse_all();

        assert_that!(
            result.items["Welcome"].extracted_comments,
            elements_are![
                eq("Views/Home/Index.cshtml:1: <h1>[[[Welcome]]]</h1>"),
                eq("index.html:3: <a>[[[Welcome///title]]]</a>"),
                eq("title")
            ]
        );
        assert_that!(
            result.items["Hello %0"].extracted_comments,
            elements_are![
                eq("Views/Home/Index.cshtml:2: <p>[[[Hello %0|||@Model.Name///greeting]]]</p>"),
                eq("greeting")
            ]
        );
    }

    #[rstest]
    #[case(0, "abc")]
    #[case(5, "def")]
    #[case(11, "ghi")]
    fn test_source_line(#[case] offset: usize, #[case] expected: &str) {
        assert_eq!(source_line("abc\n  def \nghi", offset), expected);
    }

    #[rstest]
    fn test_parse_all_is_deterministic(project: TempDir) {
        let mut config_manager = ConfigManager::new(project.path());
        config_manager.load_settings(None).unwrap();
        let first = FileNuggetFinder::new(&config_manager).unwrap().parse_all();

        fs::write(
            project.path().join(".i18n.json"),
            r#"{"indexing": {"numThreads": 1}}"#,
        )
        .unwrap();
        config_manager.load_settings(None).unwrap();
        let second = FileNuggetFinder::new(&config_manager).unwrap().parse_all();

        assert_eq!(first.items, second.items);
    }

    #[rstest]
    fn test_parse_all_reports_malformed_nugget(project: TempDir) {
        fs::write(project.path().join("broken.html"), "ok\n[[[]]] and [[[Fine]]]").unwrap();

        let result = finder(project.path()).parse_all();

        assert_that!(result.warnings, len(eq(1)));
        assert!(matches!(
            &result.warnings[0],
            ScanWarning::MalformedNugget { reference, .. } if reference.line == 2
        ));
        assert!(result.items.contains_key("Fine"));
    }

    #[rstest]
    fn test_parse_all_reports_unreadable_file(project: TempDir) {
        fs::write(project.path().join("binary.html"), [0xff, 0xfe, 0x00]).unwrap();

        let result = finder(project.path()).parse_all();

        assert_that!(result.warnings, len(eq(1)));
        assert!(matches!(&result.warnings[0], ScanWarning::Unreadable { .. }));
        assert_that!(result.items.len(), eq(2));
    }

    #[rstest]
    fn test_custom_tokens(project: TempDir) {
        fs::write(
            project.path().join(".i18n.json"),
            r###"{"nuggetTokens": {"begin": "<%", "end": "%>", "delimiter": "~", "comment": "##"}}"###,
        )
        .unwrap();
        fs::write(project.path().join("custom.html"), "<% Custom ~ x %>").unwrap();

        let result = finder(project.path()).parse_all();

        assert!(result.items.contains_key(" Custom "));
        assert!(!result.items.contains_key("Welcome"));
    }

    #[rstest]
    #[case(0, 1)]
    #[case(4, 2)]
    #[case(9, 3)]
    fn test_line_counter(#[case] offset: usize, #[case] expected: usize) {
        let mut counter = LineCounter::new("abc\ndef\nghi");
        assert_eq!(counter.line_at(offset), expected);
    }

    #[rstest]
    fn test_line_counter_restarts_for_earlier_offsets() {
        let mut counter = LineCounter::new("a\nb\nc");
        assert_eq!(counter.line_at(4), 3);
        assert_eq!(counter.line_at(0), 1);
    }
}
