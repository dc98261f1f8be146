// Workspace Filesystem Port
// Read/write/rename access for local content spec files

use async_trait::async_trait;
use std::io;
use std::path::Path;

/// Filesystem operations used by commands
///
/// Destination files are only ever written through `publish_atomic`, so an
/// aborted command never leaves a partially written file behind.
#[async_trait]
pub trait WorkspaceFs: Send + Sync {
    async fn read_to_string(&self, path: &Path) -> io::Result<String>;

    async fn exists(&self, path: &Path) -> bool;

    async fn is_dir(&self, path: &Path) -> bool;

    async fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove a directory tree. Missing directories are not an error.
    async fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Write to a temp file beside `path`, then rename it over `path`
    async fn publish_atomic(&self, path: &Path, contents: &str) -> io::Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// In-memory filesystem for testing
    #[derive(Default)]
    pub struct InMemoryFs {
        files: Mutex<BTreeMap<PathBuf, String>>,
        dirs: Mutex<BTreeSet<PathBuf>>,
        fail_publish: Mutex<bool>,
    }

    impl InMemoryFs {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
            self.files
                .lock()
                .unwrap()
                .insert(path.into(), contents.into());
            self
        }

        pub fn with_dir(self, path: impl Into<PathBuf>) -> Self {
            self.dirs.lock().unwrap().insert(path.into());
            self
        }

        pub fn file(&self, path: impl AsRef<Path>) -> Option<String> {
            self.files.lock().unwrap().get(path.as_ref()).cloned()
        }

        pub fn has_dir(&self, path: impl AsRef<Path>) -> bool {
            self.dirs.lock().unwrap().contains(path.as_ref())
        }

        pub fn file_count(&self) -> usize {
            self.files.lock().unwrap().len()
        }

        pub fn set_fail_publish(&self, fail: bool) {
            *self.fail_publish.lock().unwrap() = fail;
        }
    }

    #[async_trait]
    impl WorkspaceFs for InMemoryFs {
        async fn read_to_string(&self, path: &Path) -> io::Result<String> {
            self.file(path).ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("{}", path.display()))
            })
        }

        async fn exists(&self, path: &Path) -> bool {
            self.files.lock().unwrap().contains_key(path) || self.has_dir(path)
        }

        async fn is_dir(&self, path: &Path) -> bool {
            self.has_dir(path)
        }

        async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
            let mut dirs = self.dirs.lock().unwrap();
            for ancestor in path.ancestors() {
                if !ancestor.as_os_str().is_empty() {
                    dirs.insert(ancestor.to_path_buf());
                }
            }
            Ok(())
        }

        async fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
            self.dirs.lock().unwrap().retain(|d| !d.starts_with(path));
            self.files.lock().unwrap().retain(|f, _| !f.starts_with(path));
            Ok(())
        }

        async fn publish_atomic(&self, path: &Path, contents: &str) -> io::Result<()> {
            if *self.fail_publish.lock().unwrap() {
                return Err(io::Error::new(io::ErrorKind::Other, "publish failed"));
            }
            self.files
                .lock()
                .unwrap()
                .insert(path.to_path_buf(), contents.to_string());
            Ok(())
        }
    }
}
