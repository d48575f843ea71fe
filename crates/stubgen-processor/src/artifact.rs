use std::io;
use std::path::PathBuf;

use indexmap::IndexSet;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Mock,
    Fake,
    Injector,
}

/// One generated source file plus the sources it was derived from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GeneratedArtifact {
    pub kind: ArtifactKind,
    pub package: String,
    pub name: String,
    pub extension: String,
    pub contents: String,
    /// Source files whose change must regenerate this artifact.
    pub origins: IndexSet<String>,
    /// Always `false`: an artifact depends only on its origins.
    pub aggregating: bool,
}

impl GeneratedArtifact {
    /// `com/example/MockRepo.kt`
    pub fn relative_path(&self) -> PathBuf {
        let mut path: PathBuf = self
            .package
            .split('.')
            .filter(|segment| !segment.is_empty())
            .collect();
        path.push(format!("{}.{}", self.name, self.extension));
        path
    }

    /// `com.example.MockRepo`
    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }
}

/// Where finished artifacts go; the host's code generator in a real build.
pub trait ArtifactWriter {
    fn write(&mut self, artifact: &GeneratedArtifact) -> io::Result<()>;
}

/// Keeps written artifacts in memory.
#[derive(Debug, Default)]
pub struct MemoryWriter {
    artifacts: Vec<GeneratedArtifact>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifacts(&self) -> &[GeneratedArtifact] {
        &self.artifacts
    }

    pub fn get(&self, qualified_name: &str) -> Option<&GeneratedArtifact> {
        self.artifacts
            .iter()
            .find(|artifact| artifact.qualified_name() == qualified_name)
    }

    pub fn into_artifacts(self) -> Vec<GeneratedArtifact> {
        self.artifacts
    }
}

impl ArtifactWriter for MemoryWriter {
    fn write(&mut self, artifact: &GeneratedArtifact) -> io::Result<()> {
        self.artifacts.push(artifact.clone());
        Ok(())
    }
}
