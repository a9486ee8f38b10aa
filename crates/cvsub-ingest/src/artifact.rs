//! Artifact store abstraction.
//!
//! Every pipeline stage communicates through named artifacts (cleaned
//! tables, batch payloads, manifests, report documents, error records)
//! addressed by logical key instead of an assumed working-directory layout.
//! Keys use `/` separators; the filesystem implementation maps them to
//! paths under a root directory.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{IngestError, Result};

pub trait ArtifactStore {
    fn write(&self, key: &str, contents: &[u8]) -> Result<()>;
    fn read(&self, key: &str) -> Result<Vec<u8>>;
    fn exists(&self, key: &str) -> bool;
    /// Append one line to a text artifact, creating it when absent.
    fn append_line(&self, key: &str, line: &str) -> Result<()>;
    /// Atomically rename an artifact, e.g. a payload keyed by a placeholder
    /// submission id once the real id is known.
    fn rename(&self, from: &str, to: &str) -> Result<()>;
}

/// Filesystem-backed store rooted at a run directory.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> PathBuf {
        let mut path = self.root.clone();
        for part in key.split('/') {
            path.push(part);
        }
        path
    }

    fn ensure_parent(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl ArtifactStore for FsArtifactStore {
    fn write(&self, key: &str, contents: &[u8]) -> Result<()> {
        let path = self.resolve(key);
        self.ensure_parent(&path)?;
        std::fs::write(&path, contents)?;
        debug!(key, bytes = contents.len(), "wrote artifact");
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.resolve(key);
        std::fs::read(&path).map_err(|error| IngestError::Artifact {
            key: key.to_string(),
            message: error.to_string(),
        })
    }

    fn exists(&self, key: &str) -> bool {
        self.resolve(key).exists()
    }

    fn append_line(&self, key: &str, line: &str) -> Result<()> {
        let path = self.resolve(key);
        self.ensure_parent(&path)?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    fn rename(&self, from: &str, to: &str) -> Result<()> {
        let source = self.resolve(from);
        let target = self.resolve(to);
        self.ensure_parent(&target)?;
        std::fs::rename(&source, &target).map_err(|error| IngestError::Artifact {
            key: from.to_string(),
            message: format!("rename to {to:?}: {error}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_read_rename() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path());
        store.write("payloads/pending-1.json", b"{}").unwrap();
        assert!(store.exists("payloads/pending-1.json"));
        store
            .rename("payloads/pending-1.json", "payloads/SUB123.json")
            .unwrap();
        assert!(!store.exists("payloads/pending-1.json"));
        assert_eq!(store.read("payloads/SUB123.json").unwrap(), b"{}");
    }

    #[test]
    fn append_line_creates_and_extends() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path());
        store.append_line("manifests/novel.txt", "reports/a.json variants").unwrap();
        store.append_line("manifests/novel.txt", "reports/b.json variants").unwrap();
        let contents = String::from_utf8(store.read("manifests/novel.txt").unwrap()).unwrap();
        assert_eq!(
            contents,
            "reports/a.json variants\nreports/b.json variants\n"
        );
    }
}
