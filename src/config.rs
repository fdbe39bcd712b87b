//! Bundle configuration.
//!
//! Describes where the distribution bundle lives on disk and how its
//! artifacts are named. Values come from TOML files or from the builder;
//! every field has a default matching the generator's published layout, so an
//! empty config is a valid config.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use snafu::{Location, ResultExt, Snafu, ensure};

/// Configuration errors.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    /// Reading the config file failed.
    #[snafu(display("failed to read config file {}: {source}", path.display()))]
    Read {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
        /// Source location.
        #[snafu(implicit)]
        location: Location,
    },

    /// The config file is not valid TOML for this schema.
    #[snafu(display("failed to parse config file {}: {source}", path.display()))]
    Parse {
        /// Path that could not be parsed.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
        /// Source location.
        #[snafu(implicit)]
        location: Location,
    },

    /// The parsed values are not usable.
    #[snafu(display("invalid bundle config: {message}"))]
    Validation {
        /// What is wrong.
        message: String,
        /// Source location.
        #[snafu(implicit)]
        location: Location,
    },
}

/// Location and artifact names of a schema distribution bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
pub struct BundleConfig {
    /// Directory holding the descriptor artifacts.
    #[builder(into, default = default_bundle_dir())]
    #[serde(default = "default_bundle_dir")]
    pub bundle_dir: PathBuf,

    /// File name of the required messages artifact, relative to `bundle_dir`.
    #[builder(into, default = default_messages_file())]
    #[serde(default = "default_messages_file")]
    pub messages_file: String,

    /// File name of the optional services artifact, relative to `bundle_dir`.
    #[builder(into, default = default_services_file())]
    #[serde(default = "default_services_file")]
    pub services_file: String,

    /// Directory holding the generated OpenAPI artifacts.
    #[builder(into, default = default_openapi_dir())]
    #[serde(default = "default_openapi_dir")]
    pub openapi_dir: PathBuf,
}

fn default_bundle_dir() -> PathBuf {
    PathBuf::from("dist/descriptor")
}

fn default_messages_file() -> String {
    "messages.binpb".to_string()
}

fn default_services_file() -> String {
    "services.binpb".to_string()
}

fn default_openapi_dir() -> PathBuf {
    PathBuf::from("dist/openapi")
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            bundle_dir: default_bundle_dir(),
            messages_file: default_messages_file(),
            services_file: default_services_file(),
            openapi_dir: default_openapi_dir(),
        }
    }
}

impl BundleConfig {
    /// Loads and validates a config from a TOML file.
    pub fn from_toml_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).context(ReadSnafu { path })?;
        let config: Self = toml::from_str(&raw).context(ParseSnafu { path })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the config for values the loader cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_artifact_file("messages_file", &self.messages_file)?;
        validate_artifact_file("services_file", &self.services_file)?;
        ensure!(
            self.messages_file != self.services_file,
            ValidationSnafu {
                message: "messages_file and services_file must name distinct artifacts",
            }
        );
        Ok(())
    }

    /// Full path of the required messages artifact.
    #[must_use]
    pub fn messages_path(&self) -> PathBuf {
        self.bundle_dir.join(&self.messages_file)
    }

    /// Full path of the optional services artifact.
    #[must_use]
    pub fn services_path(&self) -> PathBuf {
        self.bundle_dir.join(&self.services_file)
    }
}

fn validate_artifact_file(field: &str, value: &str) -> Result<(), ConfigError> {
    ensure!(!value.is_empty(), ValidationSnafu { message: format!("{field} must not be empty") });
    ensure!(
        !value.contains(['/', '\\']),
        ValidationSnafu { message: format!("{field} must be a bare file name, got {value:?}") }
    );
    Ok(())
}
