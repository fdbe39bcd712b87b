//! Load-path error types for attestor-schemas using snafu.
//!
//! The crate keeps one error enum per concern, layered the way the artifacts
//! fail:
//!
//! - [`SourceError`](crate::artifact::SourceError): an artifact's bytes could
//!   not be obtained;
//! - [`ModuleError`](crate::descriptor::ModuleError): an artifact's bytes
//!   could not be decoded and indexed;
//! - [`ArtifactError`]: either of the above for one artifact, shared by the
//!   required and optional load steps;
//! - [`LoadError`]: the only failure a loader caller ever sees, meaning the
//!   required messages artifact did not load.
//!
//! The optional services artifact never surfaces an error. Its failure is
//! rendered into [`ServicesHandle::Unavailable`](crate::facade::ServicesHandle)
//! plus a single warning, and loading continues.

use snafu::{Location, Snafu};

use crate::{artifact::SourceError, descriptor::ModuleError};

/// Unified result type for schema-loading operations.
pub type Result<T, E = LoadError> = std::result::Result<T, E>;

/// Failure to turn one artifact into a loaded module.
///
/// Covers both halves of an artifact load: obtaining the bytes and decoding
/// them into a [`SchemaModule`](crate::descriptor::SchemaModule). For the
/// required messages artifact this is wrapped into [`LoadError::Required`];
/// for the optional services artifact it is rendered into the unavailable
/// sentinel's reason text.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ArtifactError {
    /// The artifact's bytes could not be obtained from its source.
    #[snafu(transparent)]
    Source {
        /// Underlying source failure.
        source: SourceError,
    },

    /// The artifact's bytes could not be decoded and indexed.
    #[snafu(transparent)]
    Module {
        /// Underlying descriptor failure.
        source: ModuleError,
    },
}

/// Fatal loader error.
///
/// Every re-exported symbol depends on the messages artifact, so there is no
/// fallback: the loader produces no facade and the caller must treat the
/// bundle as unusable.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum LoadError {
    /// The required messages artifact failed to load.
    #[snafu(display("required schema artifact {artifact:?} failed to load: {source}"))]
    Required {
        /// Label of the artifact that failed (always the messages artifact).
        artifact: String,
        /// The fetch or decode failure.
        source: ArtifactError,
        /// Source location.
        #[snafu(implicit)]
        location: Location,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use snafu::IntoError;

    use super::*;
    use crate::{artifact::ReadSnafu, descriptor::EmptyArtifactSnafu};

    #[test]
    fn test_artifact_error_is_transparent_over_source() {
        let source: SourceError = ReadSnafu { path: "dist/descriptor/messages.binpb" }
            .into_error(std::io::Error::other("permission denied"));
        let rendered = source.to_string();
        let err: ArtifactError = source.into();
        assert_eq!(err.to_string(), rendered);
    }

    #[test]
    fn test_artifact_error_is_transparent_over_module() {
        let source: ModuleError = EmptyArtifactSnafu { artifact: "services" }.build();
        let rendered = source.to_string();
        let err: ArtifactError = source.into();
        assert_eq!(err.to_string(), rendered);
    }

    #[test]
    fn test_load_error_display_names_the_artifact() {
        let module: ModuleError = EmptyArtifactSnafu { artifact: "messages" }.build();
        let err: LoadError = RequiredSnafu { artifact: "messages" }
            .into_error(ArtifactError::from(module));
        let rendered = err.to_string();
        assert!(rendered.contains("required schema artifact \"messages\""), "got: {rendered}");
        assert!(rendered.contains("contains no files"), "got: {rendered}");
    }
}
