use gocompare_common::{FileSet, GoCompareError, RelativePath};
use jwalk::WalkDir;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// Walks a directory tree and collects the files beneath it
#[derive(Debug, Clone, Copy, Default)]
pub struct FileEnumerator;

impl FileEnumerator {
    pub fn new() -> Self {
        Self
    }

    /// Fail unless `root` exists and is a directory
    pub fn check_root(root: &Path) -> Result<(), GoCompareError> {
        if root.is_dir() {
            Ok(())
        } else {
            Err(GoCompareError::DirectoryNotFound(root.to_path_buf()))
        }
    }

    /// Collect every file under `root` as a path relative to it
    pub fn enumerate(&self, root: &Path) -> Result<FileSet, GoCompareError> {
        self.enumerate_with_cancel(root, None)
    }

    /// Collect every file under `root`, with cancellation.
    ///
    /// Directories contribute only their descendants. Symbolic links are
    /// followed, so a link to a file counts as a file and a link to a
    /// directory is descended into. A link whose target is missing is still
    /// listed; reading it later is what fails. Any other walk error below
    /// `root` fails the enumeration.
    pub fn enumerate_with_cancel(
        &self,
        root: &Path,
        cancel: Option<&AtomicBool>,
    ) -> Result<FileSet, GoCompareError> {
        Self::check_root(root)?;

        let mut files = FileSet::new();

        let walker = WalkDir::new(root)
            .follow_links(true)
            .skip_hidden(false)
            .sort(false);

        for entry in walker {
            if cancel.map_or(false, |flag| flag.load(Ordering::Relaxed)) {
                return Err(GoCompareError::Cancelled);
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => match broken_link(root, &e) {
                    Some(relative) => {
                        warn!("Listing broken link {} under {:?}", relative, root);
                        files.insert(relative);
                        continue;
                    }
                    None => {
                        return Err(GoCompareError::Enumeration {
                            root: root.to_path_buf(),
                            message: e.to_string(),
                        })
                    }
                },
            };

            if entry.file_type().is_dir() {
                continue;
            }

            let path = entry.path();
            let stripped = match path.strip_prefix(root) {
                Ok(stripped) => stripped,
                Err(e) => {
                    warn!("Entry {:?} is outside {:?}: {}", path, root, e);
                    continue;
                }
            };

            match RelativePath::from_path(stripped) {
                Ok(relative) => {
                    files.insert(relative);
                }
                Err(e) => warn!("Skipping {:?}: {}", path, e),
            }
        }

        debug!("Enumerated {} files under {:?}", files.len(), root);
        Ok(files)
    }
}

/// The entry behind a walk error, if it is a symbolic link whose target
/// cannot be resolved
fn broken_link(root: &Path, error: &jwalk::Error) -> Option<RelativePath> {
    let path = error.path()?;
    let is_link = fs::symlink_metadata(path)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false);
    if !is_link || fs::metadata(path).is_ok() {
        return None;
    }

    let stripped = path.strip_prefix(root).ok()?;
    RelativePath::from_path(stripped).ok()
}
