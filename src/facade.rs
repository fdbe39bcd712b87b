//! The assembled schema facade.
//!
//! [`Schemas`] is what a successful load produces: the verified messages
//! module, the outcome of the optional services load, and a fixed set of
//! curated message re-exports that downstream code reaches for by name.
//!
//! The facade is immutable. Nothing mutates it after assembly; shared access
//! hands out `&'static` references (see [`crate::loader`]), so every reader
//! observes the same contents for the life of the process.

use snafu::{OptionExt, Snafu};

use crate::descriptor::{MessageSchema, SchemaModule};

/// Protobuf package the curated messages live under.
pub const SCHEMA_PACKAGE: &str = "cyberstorm.attestor.v1";

/// Curated message names re-exported at the top of the facade.
///
/// The list is fixed at build time rather than discovered from the artifact,
/// so the facade's surface stays identical across generator runs even when
/// the schema gains unrelated types.
pub const CURATED_MESSAGES: [&str; 5] =
    ["AttestationValue", "Identity", "Repository", "Contribution", "Domain"];

/// Fully-qualified name of a curated message.
#[must_use]
pub fn curated_full_name(name: &str) -> String {
    format!("{SCHEMA_PACKAGE}.{name}")
}

/// Failure to resolve a curated message strictly.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum LookupError {
    /// The requested name is not part of the curated surface.
    #[snafu(display("{name:?} is not one of the curated message names"))]
    NotCurated {
        /// The rejected name.
        name: String,
    },

    /// The curated slot exists but the messages artifact does not define it.
    #[snafu(display("curated message {full_name:?} is not defined by the messages artifact"))]
    Unresolved {
        /// Fully-qualified name that failed to resolve.
        full_name: String,
    },
}

/// Outcome of the optional services-artifact load.
///
/// A failed services load never fails the facade. It is recorded here as a
/// sentinel carrying the rendered failure, and clients branch on it instead
/// of catching an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServicesHandle {
    /// The services artifact decoded and indexed successfully.
    Loaded(SchemaModule),
    /// The services artifact could not be loaded; the facade carries on
    /// without service schemas.
    Unavailable {
        /// Rendered message of the failure that prevented the load.
        reason: String,
    },
}

impl ServicesHandle {
    /// The loaded services module, if available.
    #[must_use]
    pub fn module(&self) -> Option<&SchemaModule> {
        match self {
            Self::Loaded(module) => Some(module),
            Self::Unavailable { .. } => None,
        }
    }

    /// Whether the services artifact loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// The recorded failure, if the services artifact did not load.
    #[must_use]
    pub fn unavailable_reason(&self) -> Option<&str> {
        match self {
            Self::Loaded(_) => None,
            Self::Unavailable { reason } => Some(reason),
        }
    }
}

/// Immutable facade over one loaded schema bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schemas {
    messages: SchemaModule,
    services: ServicesHandle,
    curated: Curated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Curated {
    attestation_value: Option<MessageSchema>,
    identity: Option<MessageSchema>,
    repository: Option<MessageSchema>,
    contribution: Option<MessageSchema>,
    domain: Option<MessageSchema>,
}

impl Schemas {
    /// Assembles the facade from the load outcomes.
    ///
    /// Curated resolution is lenient: a curated name the messages artifact
    /// does not define resolves to `None` rather than failing the load, the
    /// same way the services artifact degrades instead of failing it. Callers
    /// that need a hard guarantee use [`Schemas::require`].
    pub(crate) fn assemble(messages: SchemaModule, services: ServicesHandle) -> Self {
        let resolve = |name: &str| messages.message(&curated_full_name(name)).cloned();
        let curated = Curated {
            attestation_value: resolve("AttestationValue"),
            identity: resolve("Identity"),
            repository: resolve("Repository"),
            contribution: resolve("Contribution"),
            domain: resolve("Domain"),
        };
        Self { messages, services, curated }
    }

    /// The verified messages module.
    #[must_use]
    pub fn messages(&self) -> &SchemaModule {
        &self.messages
    }

    /// Outcome of the optional services load.
    #[must_use]
    pub fn services(&self) -> &ServicesHandle {
        &self.services
    }

    /// Curated `AttestationValue` schema, if the artifact defines it.
    #[must_use]
    pub fn attestation_value(&self) -> Option<&MessageSchema> {
        self.curated.attestation_value.as_ref()
    }

    /// Curated `Identity` schema, if the artifact defines it.
    #[must_use]
    pub fn identity(&self) -> Option<&MessageSchema> {
        self.curated.identity.as_ref()
    }

    /// Curated `Repository` schema, if the artifact defines it.
    #[must_use]
    pub fn repository(&self) -> Option<&MessageSchema> {
        self.curated.repository.as_ref()
    }

    /// Curated `Contribution` schema, if the artifact defines it.
    #[must_use]
    pub fn contribution(&self) -> Option<&MessageSchema> {
        self.curated.contribution.as_ref()
    }

    /// Curated `Domain` schema, if the artifact defines it.
    #[must_use]
    pub fn domain(&self) -> Option<&MessageSchema> {
        self.curated.domain.as_ref()
    }

    /// All curated slots in declaration order, resolved or not.
    pub fn curated(&self) -> impl Iterator<Item = (&'static str, Option<&MessageSchema>)> {
        [
            ("AttestationValue", self.attestation_value()),
            ("Identity", self.identity()),
            ("Repository", self.repository()),
            ("Contribution", self.contribution()),
            ("Domain", self.domain()),
        ]
        .into_iter()
    }

    /// Strict curated lookup.
    ///
    /// Fails when `name` is outside the curated surface or when the slot did
    /// not resolve against the messages artifact.
    pub fn require(&self, name: &str) -> Result<&MessageSchema, LookupError> {
        let slot = match name {
            "AttestationValue" => &self.curated.attestation_value,
            "Identity" => &self.curated.identity,
            "Repository" => &self.curated.repository,
            "Contribution" => &self.curated.contribution,
            "Domain" => &self.curated.domain,
            _ => return NotCuratedSnafu { name }.fail(),
        };
        slot.as_ref().context(UnresolvedSnafu { full_name: curated_full_name(name) })
    }
}
