//! Template discovery under a project root.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use log::warn;
use walkdir::WalkDir;

/// The naming convention identifying template files.
pub const TEMPLATE_PATTERN: &str = "*.mm_*";

/// File-name patterns excluded from discovery (editor backups).
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &["*.*~"];

/// Matches template file names and filters out ignored ones.
#[derive(Debug, Clone)]
pub struct TemplateFilter {
    templates: GlobSet,
    ignored: GlobSet,
}

impl TemplateFilter {
    /// Builds the filter with the default ignore patterns.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern does not compile, which cannot happen
    /// for the built-in patterns.
    pub fn new() -> Result<Self, globset::Error> {
        Self::with_ignore_patterns(DEFAULT_IGNORE_PATTERNS)
    }

    /// Builds the filter with caller-supplied ignore patterns.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern does not compile.
    pub fn with_ignore_patterns(patterns: &[&str]) -> Result<Self, globset::Error> {
        let mut templates = GlobSetBuilder::new();
        templates.add(Glob::new(TEMPLATE_PATTERN)?);

        let mut ignored = GlobSetBuilder::new();
        for pattern in patterns {
            ignored.add(Glob::new(pattern)?);
        }

        Ok(Self {
            templates: templates.build()?,
            ignored: ignored.build()?,
        })
    }

    /// Returns true if a file with this name is a template to track.
    pub fn matches(&self, file_name: &str) -> bool {
        self.templates.is_match(file_name) && !self.ignored.is_match(file_name)
    }
}

/// Walks `root` and returns the relative paths of every template file, in a
/// stable traversal order.
///
/// Unreadable directory entries are logged and skipped rather than aborting
/// the walk.
pub fn find_templates(root: &Path, filter: &TemplateFilter) -> Vec<PathBuf> {
    let mut found = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("skipping unreadable entry under {}: {err}", root.display());
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let Some(name) = entry.file_name().to_str() else {
            continue;
        };

        if filter.matches(name)
            && let Ok(relative) = entry.path().strip_prefix(root)
        {
            found.push(relative.to_path_buf());
        }
    }

    found
}
