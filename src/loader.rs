//! Artifact loading and one-shot shared initialization.
//!
//! Loading runs three steps in order:
//!
//! 1. fetch, decode, and index the required messages artifact; any failure
//!    aborts the load as [`LoadError::Required`];
//! 2. do the same for the optional services artifact; any failure is recorded
//!    as [`ServicesHandle::Unavailable`] with a single warning, and loading
//!    continues;
//! 3. assemble the immutable [`Schemas`] facade, resolving the curated
//!    message re-exports against the messages module.
//!
//! # Shared facade
//!
//! Most processes want exactly one facade. [`init_shared`] runs the loader at
//! most once per process and pins the outcome, success or failure, for the
//! process lifetime. There is no retry: a process that observed a failed
//! bundle keeps observing it, matching how a failed module load stays failed
//! until restart. Because the outcome is cached, the degraded-services
//! warning is also emitted at most once per process on this path.

use std::sync::OnceLock;

use snafu::ResultExt;
use tracing::{debug, warn};

use crate::{
    artifact::{ArtifactSource, FsSource},
    config::BundleConfig,
    descriptor::SchemaModule,
    error::{ArtifactError, LoadError, RequiredSnafu},
    facade::{Schemas, ServicesHandle},
};

/// Artifact label for the required messages descriptor set.
pub const MESSAGES_ARTIFACT: &str = "messages";

/// Artifact label for the optional services descriptor set.
pub const SERVICES_ARTIFACT: &str = "services";

/// Loads a schema bundle from a pair of artifact sources.
pub struct SchemaLoader {
    messages: Box<dyn ArtifactSource>,
    services: Box<dyn ArtifactSource>,
}

impl SchemaLoader {
    /// Creates a loader over explicit sources.
    ///
    /// The first source is the required messages artifact, the second the
    /// optional services artifact.
    #[must_use]
    pub fn new(
        messages: impl ArtifactSource + 'static,
        services: impl ArtifactSource + 'static,
    ) -> Self {
        Self { messages: Box::new(messages), services: Box::new(services) }
    }

    /// Creates a loader reading the bundle files named by `config`.
    #[must_use]
    pub fn from_config(config: &BundleConfig) -> Self {
        Self::new(
            FsSource::new(MESSAGES_ARTIFACT, config.messages_path()),
            FsSource::new(SERVICES_ARTIFACT, config.services_path()),
        )
    }

    /// Runs the load and assembles the facade.
    ///
    /// Consumes the loader: a load observes each source exactly once, and the
    /// only I/O it performs is the two source fetches.
    pub fn load(self) -> Result<Schemas, LoadError> {
        let messages = load_module(self.messages.as_ref())
            .context(RequiredSnafu { artifact: self.messages.artifact() })?;
        debug!(
            artifact = self.messages.artifact(),
            files = messages.files().len(),
            symbols = messages.len(),
            "loaded required schema artifact"
        );

        let services = match load_module(self.services.as_ref()) {
            Ok(module) => {
                debug!(
                    artifact = self.services.artifact(),
                    files = module.files().len(),
                    symbols = module.len(),
                    "loaded optional schema artifact"
                );
                ServicesHandle::Loaded(module)
            },
            Err(error) => {
                warn!(
                    artifact = self.services.artifact(),
                    error = %error,
                    "optional services artifact unavailable, continuing without service schemas"
                );
                ServicesHandle::Unavailable { reason: error.to_string() }
            },
        };

        Ok(Schemas::assemble(messages, services))
    }
}

fn load_module(source: &dyn ArtifactSource) -> Result<SchemaModule, ArtifactError> {
    let bytes = source.fetch()?;
    Ok(SchemaModule::from_bytes(source.artifact(), &bytes)?)
}

static SHARED: OnceLock<Result<Schemas, LoadError>> = OnceLock::new();

/// Lifecycle of the process-wide shared facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharedState {
    /// No load has been attempted yet.
    Uninitialized,
    /// The shared facade loaded and is pinned for the process lifetime.
    Ready,
    /// The shared load failed and stays failed for the process lifetime.
    Failed,
}

/// Initializes the process-wide shared facade, loading at most once.
///
/// The first call runs `loader` to completion and pins its outcome; every
/// later call returns the pinned outcome and drops its own `loader` without
/// fetching anything. Concurrent callers block until the first load finishes,
/// then observe the same outcome.
///
/// Must not be called re-entrantly from inside an [`ArtifactSource`]
/// implementation; the pinning cell is not re-entrant.
pub fn init_shared(loader: SchemaLoader) -> Result<&'static Schemas, &'static LoadError> {
    SHARED.get_or_init(|| loader.load()).as_ref()
}

/// The shared facade, if [`init_shared`] has already succeeded.
#[must_use]
pub fn shared() -> Option<&'static Schemas> {
    SHARED.get().and_then(|outcome| outcome.as_ref().ok())
}

/// Current lifecycle state of the shared facade.
#[must_use]
pub fn shared_state() -> SharedState {
    match SHARED.get() {
        None => SharedState::Uninitialized,
        Some(Ok(_)) => SharedState::Ready,
        Some(Err(_)) => SharedState::Failed,
    }
}
