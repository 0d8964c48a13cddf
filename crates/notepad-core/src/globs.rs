//! Filename glob compilation shared by the MIME database and the grammar repository.

use std::path::Path;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::warn;

/// A compiled set of filename patterns. `owners[i]` is the caller's index for
/// the i-th glob in `set`, so patterns that fail to compile can be skipped.
#[derive(Debug)]
pub(crate) struct PatternSet {
    set: GlobSet,
    owners: Vec<usize>,
}

impl PatternSet {
    /// Compiles `(owner, pattern)` pairs case-insensitively. Invalid patterns are
    /// logged and left out rather than failing the whole set.
    pub(crate) fn compile<'a>(patterns: impl IntoIterator<Item = (usize, &'a str)>) -> Self {
        let mut builder = GlobSetBuilder::new();
        let mut owners = Vec::new();
        for (owner, pattern) in patterns {
            match GlobBuilder::new(pattern)
                .case_insensitive(true)
                .literal_separator(true)
                .build()
            {
                Ok(glob) => {
                    builder.add(glob);
                    owners.push(owner);
                }
                Err(e) => warn!(pattern, error = %e, "skipping invalid filename pattern"),
            }
        }
        match builder.build() {
            Ok(set) => Self { set, owners },
            Err(e) => {
                warn!(error = %e, "failed to build filename pattern set");
                Self {
                    set: GlobSet::empty(),
                    owners: Vec::new(),
                }
            }
        }
    }

    /// Owners of every pattern matching the file name of `path`, in compile order.
    /// Only the final path component is matched.
    pub(crate) fn matches(&self, path: &Path) -> Vec<usize> {
        let Some(name) = path.file_name() else {
            return Vec::new();
        };
        self.set
            .matches(Path::new(name))
            .into_iter()
            .map(|i| self.owners[i])
            .collect()
    }
}

/// True when `pattern` names one exact file rather than a family of files.
pub(crate) fn is_literal(pattern: &str) -> bool {
    !pattern.contains(['*', '?', '[', '{'])
}
