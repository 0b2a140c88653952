//! Per-run temporary resources
//!
//! Every temp path is named from a fresh UUID so concurrent runs sharing a
//! temp directory never collide. A `TempPath` owns its file or directory and
//! removes it when dropped, on success, error and unwind alike. A path that is
//! already gone counts as removed.

use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    File,
    Dir,
}

#[derive(Debug)]
pub struct TempPath {
    path: PathBuf,
    kind: Kind,
}

impl TempPath {
    /// Reserve `<dir>/<uuid><extension>`. Nothing is created on disk; whoever
    /// writes the file hands ownership of it to this guard.
    pub fn file(dir: &Path, extension: &str) -> Self {
        let name = format!("{}{}", Uuid::new_v4(), extension);
        Self {
            path: dir.join(name),
            kind: Kind::File,
        }
    }

    /// Take ownership of a file at a name chosen by someone else, such as an
    /// external tool that derives its output name from an argument.
    pub fn adopt_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: Kind::File,
        }
    }

    /// Create a fresh, empty directory `<parent>/<uuid>`.
    pub async fn dir(parent: &Path) -> io::Result<Self> {
        let path = parent.join(Uuid::new_v4().to_string());
        tokio::fs::create_dir_all(&path).await?;
        Ok(Self {
            path,
            kind: Kind::Dir,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn remove(&self) -> io::Result<()> {
        let result = match self.kind {
            Kind::File => std::fs::remove_file(&self.path),
            Kind::Dir => std::fs::remove_dir_all(&self.path),
        };
        match result {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

impl AsRef<Path> for TempPath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempPath {
    fn drop(&mut self) {
        if let Err(e) = self.remove() {
            tracing::error!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove temporary path"
            );
        }
    }
}
