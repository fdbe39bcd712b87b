//! Schema bundle loading for the Cyberstorm Attestor protobuf schemas.
//!
//! The attestor's generated schemas ship as a distribution bundle: serialized
//! descriptor sets for the message types and, when the generator had the
//! Google API descriptors available, for the gRPC services, plus generated
//! OpenAPI exports of the REST surface. This crate loads that bundle and
//! presents it behind one immutable facade.
//!
//! # Loading model
//!
//! The messages artifact is required: without it nothing downstream works, so
//! any failure to fetch, decode, or verify it fails the load outright. The
//! services artifact is optional: generator environments without the Google
//! API descriptors produce a services set whose imports cannot resolve, so
//! its failure degrades to [`ServicesHandle::Unavailable`] with one warning
//! and the facade loads without service schemas.
//!
//! On top of the verified messages module the facade re-exports a fixed,
//! curated set of message schemas ([`CURATED_MESSAGES`]) that downstream code
//! reaches for directly.
//!
//! # Example
//!
//! ```no_run
//! use attestor_schemas::{BundleConfig, SchemaLoader};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BundleConfig::default();
//! let schemas = SchemaLoader::from_config(&config).load()?;
//!
//! if let Some(identity) = schemas.identity() {
//!     println!("Identity has {} fields", identity.fields.len());
//! }
//! if let Some(reason) = schemas.services().unavailable_reason() {
//!     println!("service schemas unavailable: {reason}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Processes that want a single facade for their whole lifetime use
//! [`init_shared`] instead of holding a [`Schemas`] value; the outcome of the
//! first initialization, success or failure, is pinned until exit.
//!
//! The crate also carries the distribution tooling that prepares a bundle
//! for publishing: vendor namespace relocation ([`relocate()`]) and OpenAPI
//! artifact checks ([`openapi`]).

#![deny(unsafe_code)]

pub mod artifact;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod facade;
pub mod loader;
pub mod openapi;
pub mod relocate;

// Re-export commonly used types at the crate root.
pub use artifact::{ArtifactSource, BytesSource, FsSource, SourceError};
pub use config::{BundleConfig, ConfigError};
pub use descriptor::{
    EnumSchema, EnumValueSchema, FieldSchema, MessageSchema, MethodSchema, ModuleError,
    SchemaModule, ServiceSchema, Symbol, SymbolKind,
};
pub use error::{ArtifactError, LoadError, Result};
pub use facade::{
    CURATED_MESSAGES, LookupError, SCHEMA_PACKAGE, Schemas, ServicesHandle, curated_full_name,
};
pub use loader::{
    MESSAGES_ARTIFACT, SERVICES_ARTIFACT, SchemaLoader, SharedState, init_shared, shared,
    shared_state,
};
pub use openapi::{CheckOutcome, OpenApiError, SpecCheck, SpecKind, SpecReport, check_dir};
pub use relocate::{RelocationReport, relocate};
