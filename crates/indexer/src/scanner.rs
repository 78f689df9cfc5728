use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

const IGNORED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    ".semindex",
    "target",
    "node_modules",
    "dist",
    "build",
    "out",
];

/// Gitignore-aware file enumeration for one project root.
pub struct FileScanner {
    root: PathBuf,
}

impl FileScanner {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Enumerate files under the root in sorted order, honoring .gitignore
    /// and skipping well-known noise directories.
    #[must_use]
    pub fn scan(&self) -> Vec<PathBuf> {
        let walker = WalkBuilder::new(&self.root)
            .hidden(true)
            .git_ignore(true)
            .require_git(false)
            .git_global(false)
            .build();

        let mut files = Vec::new();
        for entry in walker.flatten() {
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            if !is_relevant_path(&self.root, entry.path()) {
                continue;
            }
            files.push(entry.path().to_path_buf());
        }
        files.sort();
        files
    }
}

/// Noise filter shared by the scanner and the fs watcher adapter.
pub(crate) fn is_relevant_path(root: &Path, path: &Path) -> bool {
    let Ok(relative) = path.strip_prefix(root) else {
        return false;
    };

    for component in relative.components() {
        let name = component.as_os_str().to_string_lossy();
        if IGNORED_DIRS.iter().any(|dir| name.eq_ignore_ascii_case(dir)) {
            return false;
        }
        if name.starts_with('.') {
            return false;
        }
    }

    true
}
