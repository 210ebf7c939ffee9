//! Core types used throughout the project.

use std::fmt;
use std::str::FromStr;

/// A source location of a nugget: project-relative path and 1-based line.
///
/// Ordering is by path, then line, which is the order references are written
/// into translation files.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reference {
    pub path: String,
    pub line: usize,
}

impl Reference {
    #[must_use]
    pub fn new(path: impl Into<String>, line: usize) -> Self {
        Self { path: path.into(), line }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.line)
    }
}

/// Error returned when a `path:line` reference cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid reference '{0}'")]
pub struct ParseReferenceError(pub String);

impl FromStr for Reference {
    type Err = ParseReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, line) =
            s.rsplit_once(':').ok_or_else(|| ParseReferenceError(s.to_string()))?;
        if path.is_empty() {
            return Err(ParseReferenceError(s.to_string()));
        }
        let line = line.parse().map_err(|_| ParseReferenceError(s.to_string()))?;
        Ok(Self::new(path, line))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_reference_display() {
        let reference = Reference::new("Views/Home/Index.cshtml", 12);
        assert_eq!(reference.to_string(), "Views/Home/Index.cshtml:12");
    }

    #[rstest]
    #[case("Views/Index.cshtml:3", Some(Reference::new("Views/Index.cshtml", 3)))]
    #[case("C:/site/Index.cshtml:7", Some(Reference::new("C:/site/Index.cshtml", 7)))]
    #[case("Index.cshtml", None)]
    #[case(":4", None)]
    #[case("Index.cshtml:x", None)]
    fn test_reference_from_str(#[case] input: &str, #[case] expected: Option<Reference>) {
        assert_eq!(input.parse::<Reference>().ok(), expected);
    }

    #[rstest]
    fn test_reference_ordering() {
        let mut references = vec![
            Reference::new("b.html", 1),
            Reference::new("a.html", 10),
            Reference::new("a.html", 2),
        ];
        references.sort();

        assert_that!(
            references,
            elements_are![
                eq(&Reference::new("a.html", 2)),
                eq(&Reference::new("a.html", 10)),
                eq(&Reference::new("b.html", 1))
            ]
        );
    }
}
