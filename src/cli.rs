//! Command-line arguments of `pot`.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use nugget_i18n::build::BuildOptions;
use nugget_i18n::project::ProjectOptions;
use nugget_i18n::watch::WatchOptions;

/// Extracts nuggets into PO files, keeps translations in sync and projects
/// translated copies of static sites.
#[derive(Parser, Debug)]
#[command(name = "pot")]
#[command(version)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct Args {
    /// Project directory (default: current directory)
    #[arg(long)]
    pub(crate) project_dir: Option<PathBuf>,

    /// Settings file (default: <project-dir>/.i18n.json)
    #[arg(long)]
    pub(crate) config_path: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub(crate) verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub(crate) log_file: Option<PathBuf>,

    /// Rebuild whenever a source file changes
    #[arg(long)]
    pub(crate) watch: bool,

    /// Polling period and minimum delay between builds, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub(crate) watch_delay: u64,

    /// Do not merge the template into language files
    #[arg(long)]
    pub(crate) build_no_merge: bool,

    /// Write the source line of each reference into the template
    #[arg(long)]
    pub(crate) show_source_context: bool,

    /// Source directory to project
    #[arg(long)]
    pub(crate) project: Option<PathBuf>,

    /// Culture the nuggets are written in
    #[arg(long)]
    pub(crate) project_default_lang: Option<String>,

    /// Directory to write projected files to (default: <project>/projected)
    #[arg(long)]
    pub(crate) project_output: Option<PathBuf>,

    /// Overwrite existing projected files
    #[arg(long)]
    pub(crate) project_force: bool,
}

impl Args {
    /// Build settings from the flags.
    pub(crate) const fn build_options(&self) -> BuildOptions {
        BuildOptions {
            merge: !self.build_no_merge,
            show_source_context: self.show_source_context,
        }
    }

    /// Watch settings; the delay is both the polling period and the build
    /// throttle.
    pub(crate) const fn watch_options(&self) -> WatchOptions {
        WatchOptions { delay: Duration::from_millis(self.watch_delay), build: self.build_options() }
    }

    /// Projection settings when `--project` is given.
    pub(crate) fn project_options(&self) -> Option<ProjectOptions> {
        self.project.as_ref().map(|source| ProjectOptions {
            source_directory: source.clone(),
            default_culture: self.project_default_lang.clone(),
            output_directory: self.project_output.clone(),
            force: self.project_force,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["pot"]).unwrap();

        assert!(!args.watch);
        assert_eq!(args.watch_options().delay, Duration::from_millis(500));
        assert!(args.build_options().merge);
        assert!(!args.build_options().show_source_context);
        assert!(args.project_options().is_none());
    }

    #[test]
    fn test_project_flags() {
        let args = Args::try_parse_from([
            "pot",
            "--project",
            "site",
            "--project-default-lang",
            "en",
            "--project-output",
            "out",
            "--project-force",
        ])
        .unwrap();

        let options = args.project_options().unwrap();
        assert_eq!(options.source_directory, PathBuf::from("site"));
        assert_eq!(options.default_culture.as_deref(), Some("en"));
        assert_eq!(options.output_directory, Some(PathBuf::from("out")));
        assert!(options.force);
    }

    #[test]
    fn test_watch_flags() {
        let args =
            Args::try_parse_from(["pot", "--watch", "--watch-delay", "50", "--build-no-merge"])
                .unwrap();

        assert!(args.watch);
        assert_eq!(args.watch_options().delay, Duration::from_millis(50));
        assert!(!args.watch_options().build.merge);
    }

    #[test]
    fn test_show_source_context_flag() {
        let args = Args::try_parse_from(["pot", "--show-source-context"]).unwrap();

        assert!(args.build_options().show_source_context);
        assert!(args.watch_options().build.show_source_context);
    }
}
