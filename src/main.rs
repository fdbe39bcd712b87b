//! attestor-schemas CLI.
//!
//! Release tooling for schema distribution bundles: loads a bundle the way a
//! consumer would, inspects individual artifacts, relocates vendored
//! namespaces before publishing, and validates the generated OpenAPI exports.
//!
//! # Usage
//!
//! ```bash
//! # Load the bundle under dist/ and report the facade contents
//! attestor-schemas check
//!
//! # Same, against an explicit bundle directory
//! attestor-schemas --bundle out/descriptor check
//!
//! # List the symbols of one artifact
//! attestor-schemas inspect --artifact services
//!
//! # Rewrite vendored namespaces in a freshly generated descriptor set
//! attestor-schemas relocate raw.binpb --output dist/descriptor/messages.binpb
//!
//! # Validate the generated OpenAPI exports
//! attestor-schemas openapi --dir dist/openapi
//! ```

use std::{io::IsTerminal, path::PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use prost::Message as _;
use prost_types::FileDescriptorSet;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use attestor_schemas::{
    ArtifactError, ArtifactSource, BundleConfig, ConfigError, FsSource, LoadError,
    MESSAGES_ARTIFACT, OpenApiError, SERVICES_ARTIFACT, SchemaLoader, SchemaModule, Symbol,
    openapi, relocate::relocate,
};

#[derive(Parser, Debug)]
#[command(name = "attestor-schemas", version, about = "Attestor schema bundle tooling")]
struct Cli {
    /// Bundle configuration TOML file.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Bundle directory, overriding the config file.
    #[arg(long, global = true, value_name = "DIR")]
    bundle: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the bundle and report the facade contents.
    Check,

    /// List the symbols of one descriptor artifact.
    Inspect {
        /// Which artifact to inspect.
        #[arg(long, value_enum, default_value_t = ArtifactArg::Messages)]
        artifact: ArtifactArg,
    },

    /// Rewrite vendored namespaces in a descriptor set.
    Relocate {
        /// Input descriptor set file.
        input: PathBuf,

        /// Where to write the rewritten descriptor set.
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Validate generated OpenAPI artifacts.
    Openapi {
        /// Directory to scan, overriding the config file.
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ArtifactArg {
    Messages,
    Services,
}

/// Top-level error type for the CLI, wrapping library and I/O failures.
#[derive(Debug)]
enum CliError {
    Config(ConfigError),
    Load(LoadError),
    Artifact(ArtifactError),
    OpenApi(OpenApiError),
    Read { path: PathBuf, source: std::io::Error },
    Write { path: PathBuf, source: std::io::Error },
    Decode { path: PathBuf, source: prost::DecodeError },
    FailedChecks { count: usize },
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "config error: {}", e),
            CliError::Load(e) => write!(f, "load error: {}", e),
            CliError::Artifact(e) => write!(f, "artifact error: {}", e),
            CliError::OpenApi(e) => write!(f, "openapi error: {}", e),
            CliError::Read { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            },
            CliError::Write { path, source } => {
                write!(f, "failed to write {}: {}", path.display(), source)
            },
            CliError::Decode { path, source } => {
                write!(f, "{} is not a valid FileDescriptorSet: {}", path.display(), source)
            },
            CliError::FailedChecks { count } => {
                write!(f, "{} OpenAPI artifact(s) failed validation", count)
            },
        }
    }
}

impl std::error::Error for CliError {}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    init_logging();

    let config = resolve_config(cli.config.as_deref(), cli.bundle.clone())?;

    match cli.command {
        Command::Check => run_check(&config),
        Command::Inspect { artifact } => run_inspect(&config, artifact),
        Command::Relocate { input, output } => run_relocate(&input, &output),
        Command::Openapi { dir } => run_openapi(dir.unwrap_or_else(|| config.openapi_dir.clone())),
    }
}

/// Builds the effective config: file if given, defaults otherwise, with the
/// `--bundle` override applied last.
fn resolve_config(
    config_path: Option<&std::path::Path>,
    bundle_override: Option<PathBuf>,
) -> Result<BundleConfig, CliError> {
    let mut config = match config_path {
        Some(path) => BundleConfig::from_toml_path(path).map_err(CliError::Config)?,
        None => BundleConfig::default(),
    };
    if let Some(dir) = bundle_override {
        config.bundle_dir = dir;
    }
    Ok(config)
}

fn run_check(config: &BundleConfig) -> Result<(), CliError> {
    let schemas = SchemaLoader::from_config(config).load().map_err(CliError::Load)?;

    let messages = schemas.messages();
    println!("messages: {} file(s), {} symbol(s)", messages.files().len(), messages.len());
    for file in messages.files() {
        println!("  {file}");
    }

    match schemas.services().module() {
        Some(services) => {
            println!("services: {} file(s), {} symbol(s)", services.files().len(), services.len());
        },
        None => {
            let reason = schemas.services().unavailable_reason().unwrap_or("unknown");
            println!("services: unavailable ({reason})");
        },
    }

    println!("curated re-exports:");
    for (name, schema) in schemas.curated() {
        match schema {
            Some(schema) => println!("  {name} -> {}", schema.full_name),
            None => println!("  {name} -> missing from the messages artifact"),
        }
    }
    Ok(())
}

fn run_inspect(config: &BundleConfig, artifact: ArtifactArg) -> Result<(), CliError> {
    let source = match artifact {
        ArtifactArg::Messages => FsSource::new(MESSAGES_ARTIFACT, config.messages_path()),
        ArtifactArg::Services => FsSource::new(SERVICES_ARTIFACT, config.services_path()),
    };
    let bytes = source.fetch().map_err(|e| CliError::Artifact(e.into()))?;
    let module = SchemaModule::from_bytes(source.artifact(), &bytes)
        .map_err(|e| CliError::Artifact(e.into()))?;

    println!(
        "artifact {:?}: {} file(s), {} symbol(s)",
        module.artifact(),
        module.files().len(),
        module.len()
    );
    for symbol in module.symbols() {
        println!("{:<7} {}", symbol.kind().to_string(), symbol.full_name());
        if let Symbol::Service(service) = symbol {
            for method in &service.methods {
                println!(
                    "        rpc {}({}) returns ({})",
                    method.name, method.input, method.output
                );
            }
        }
    }
    Ok(())
}

fn run_relocate(input: &std::path::Path, output: &std::path::Path) -> Result<(), CliError> {
    let bytes = std::fs::read(input)
        .map_err(|source| CliError::Read { path: input.to_path_buf(), source })?;
    let set = FileDescriptorSet::decode(bytes.as_slice())
        .map_err(|source| CliError::Decode { path: input.to_path_buf(), source })?;

    let (relocated, report) = relocate(&set);
    std::fs::write(output, relocated.encode_to_vec())
        .map_err(|source| CliError::Write { path: output.to_path_buf(), source })?;

    println!("{report}");
    println!("wrote {}", output.display());
    Ok(())
}

fn run_openapi(dir: PathBuf) -> Result<(), CliError> {
    let report = openapi::check_dir(&dir).map_err(CliError::OpenApi)?;

    for check in &report.checks {
        match &check.outcome {
            openapi::CheckOutcome::Valid => {
                println!("ok    {} ({})", check.path.display(), check.kind);
            },
            openapi::CheckOutcome::Invalid { reason } => {
                println!("FAIL  {} ({}): {}", check.path.display(), check.kind, reason);
            },
        }
    }

    let failed = report.invalid().count();
    if failed > 0 {
        return Err(CliError::FailedChecks { count: failed });
    }
    println!("{} artifact(s) valid", report.checks.len());
    Ok(())
}

/// Initializes logging: JSON for non-TTY stderr, text otherwise, filtered by
/// `RUST_LOG` with an `info` default.
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if std::io::stderr().is_terminal() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    }
}
