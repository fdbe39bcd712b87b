//! Artifact sources: where descriptor bytes come from.
//!
//! The generator publishes each schema module as a serialized
//! `FileDescriptorSet` file inside the distribution bundle. The loader never
//! reads the filesystem directly; it goes through [`ArtifactSource`] so the
//! bundle layout stays in one place and tests can substitute in-memory or
//! failing sources without touching disk.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use snafu::{Location, ResultExt, Snafu};

/// Failure to obtain an artifact's raw bytes.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SourceError {
    /// Reading the artifact file failed.
    #[snafu(display("failed to read descriptor artifact {}: {source}", path.display()))]
    Read {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
        /// Source location.
        #[snafu(implicit)]
        location: Location,
    },
}

/// A named provider of raw descriptor-artifact bytes.
///
/// The label returned by [`artifact`](ArtifactSource::artifact) identifies the
/// artifact in errors and diagnostics; the loader treats the bytes themselves
/// as opaque until decode.
pub trait ArtifactSource {
    /// Stable label for this artifact, e.g. `"messages"` or `"services"`.
    fn artifact(&self) -> &str;

    /// Obtains the artifact's bytes.
    fn fetch(&self) -> Result<Bytes, SourceError>;
}

/// Reads an artifact from a bundle file on disk.
#[derive(Debug, Clone)]
pub struct FsSource {
    artifact: String,
    path: PathBuf,
}

impl FsSource {
    /// Creates a source reading `path` for the artifact labelled `artifact`.
    pub fn new(artifact: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self { artifact: artifact.into(), path: path.into() }
    }

    /// The file this source reads.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ArtifactSource for FsSource {
    fn artifact(&self) -> &str {
        &self.artifact
    }

    fn fetch(&self) -> Result<Bytes, SourceError> {
        let bytes = std::fs::read(&self.path).context(ReadSnafu { path: self.path.as_path() })?;
        Ok(Bytes::from(bytes))
    }
}

/// Serves an artifact from bytes already in memory.
///
/// Used by tests and by tooling that has already read or rewritten a
/// descriptor set. Cloning the handed-out bytes is cheap.
#[derive(Debug, Clone)]
pub struct BytesSource {
    artifact: String,
    bytes: Bytes,
}

impl BytesSource {
    /// Creates a source serving `bytes` for the artifact labelled `artifact`.
    pub fn new(artifact: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self { artifact: artifact.into(), bytes: bytes.into() }
    }
}

impl ArtifactSource for BytesSource {
    fn artifact(&self) -> &str {
        &self.artifact
    }

    fn fetch(&self) -> Result<Bytes, SourceError> {
        Ok(self.bytes.clone())
    }
}
