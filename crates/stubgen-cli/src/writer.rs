use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use stubgen_processor::{ArtifactKind, ArtifactWriter, GeneratedArtifact};

pub const MANIFEST_VERSION: u32 = 1;

/// Writes artifacts under a root directory, one file per artifact.
///
/// Files whose contents are already up to date are left untouched so that
/// downstream compilers see unchanged timestamps.
#[derive(Debug)]
pub struct DirectoryWriter {
    root: PathBuf,
    entries: Vec<ManifestEntry>,
    unchanged: usize,
}

impl DirectoryWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: Vec::new(),
            unchanged: 0,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn written(&self) -> usize {
        self.entries.len() - self.unchanged
    }

    pub fn unchanged(&self) -> usize {
        self.unchanged
    }

    /// Record every written artifact and the files it was derived from.
    pub fn write_manifest(&self, name: &str) -> io::Result<PathBuf> {
        let manifest = Manifest {
            version: MANIFEST_VERSION,
            artifacts: &self.entries,
        };
        let mut text = serde_json::to_string_pretty(&manifest).map_err(io::Error::other)?;
        text.push('\n');

        let path = self.root.join(name);
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(&path, text)?;
        Ok(path)
    }
}

impl ArtifactWriter for DirectoryWriter {
    fn write(&mut self, artifact: &GeneratedArtifact) -> io::Result<()> {
        let path = self.root.join(artifact.relative_path());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let up_to_date = std::fs::read_to_string(&path)
            .map(|existing| existing == artifact.contents)
            .unwrap_or(false);
        if up_to_date {
            self.unchanged += 1;
            tracing::debug!(target: "stubgen.cli", path = %path.display(), "artifact unchanged");
        } else {
            std::fs::write(&path, &artifact.contents)?;
            tracing::debug!(target: "stubgen.cli", path = %path.display(), "wrote artifact");
        }

        self.entries.push(ManifestEntry::new(artifact));
        Ok(())
    }
}

#[derive(Serialize)]
struct Manifest<'a> {
    version: u32,
    artifacts: &'a [ManifestEntry],
}

#[derive(Debug, Clone, Serialize)]
pub struct ManifestEntry {
    /// Path relative to the output root, always `/`-separated.
    pub path: String,
    pub kind: ArtifactKind,
    pub origins: Vec<String>,
    pub aggregating: bool,
}

impl ManifestEntry {
    pub fn new(artifact: &GeneratedArtifact) -> Self {
        Self {
            path: portable_path(&artifact.relative_path()),
            kind: artifact.kind,
            origins: artifact.origins.iter().cloned().collect(),
            aggregating: artifact.aggregating,
        }
    }
}

pub fn portable_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
