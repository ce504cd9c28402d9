//! Working context - a disposable, exclusively owned directory for one run
//!
//! Creates:
//! - a uniquely named temporary directory per run
//! - one module file per staged artifact
//!
//! The directory is removed by [`WorkingContext::close`], or on drop when a run
//! bails out early. Nothing here touches the process-wide current directory; the
//! path is handed to the evaluator explicitly.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::synthesizer::TestArtifact;

/// Default prefix for working context directories.
pub const DEFAULT_PREFIX: &str = "smokegen-";

/// Disposable staging area for a single pipeline run
#[derive(Debug)]
pub struct WorkingContext {
    dir: TempDir,
}

impl WorkingContext {
    /// Create a fresh directory under the system temp root.
    pub fn create(prefix: &str) -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix(prefix).tempdir()?;
        tracing::debug!(path = %dir.path().display(), "created working context");
        Ok(Self { dir })
    }

    /// Create a fresh directory under `root` instead of the system temp root.
    pub fn create_in(root: impl AsRef<Path>, prefix: &str) -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix(prefix).tempdir_in(root)?;
        tracing::debug!(path = %dir.path().display(), "created working context");
        Ok(Self { dir })
    }

    /// Root of the working context
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write an artifact's module into the context and return its path.
    ///
    /// Artifacts whose body could not be synthesized are not staged (`Ok(None)`).
    pub fn stage(&self, artifact: &TestArtifact) -> io::Result<Option<PathBuf>> {
        let Ok(body) = &artifact.body else {
            return Ok(None);
        };
        let path = self.dir.path().join(artifact.module_file_name());
        fs::write(&path, body)?;
        Ok(Some(path))
    }

    /// Remove the directory, reporting any failure to do so.
    pub fn close(self) -> io::Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        tracing::debug!(path = %path.display(), "removed working context");
        Ok(())
    }
}
