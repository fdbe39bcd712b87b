//! Generated OpenAPI artifact validation.
//!
//! Alongside the descriptor artifacts, the distribution bundle carries the
//! gateway's REST surface as generated `*.openapi.json` (OpenAPI 3.x) and
//! `*.swagger.json` (Swagger 2.0) files. A broken generator run tends to
//! produce files that are present but empty, truncated, or of the wrong
//! flavor, so the release check validates each file's JSON shape and version
//! marker before the bundle ships.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use serde_json::Value;
use snafu::{Location, ResultExt, Snafu, ensure};

/// Failure to scan an OpenAPI artifact directory.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum OpenApiError {
    /// Listing the directory failed.
    #[snafu(display("failed to scan OpenAPI directory {}: {source}", dir.display()))]
    Scan {
        /// Directory that could not be listed.
        dir: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
        /// Source location.
        #[snafu(implicit)]
        location: Location,
    },

    /// The directory exists but holds no recognizable artifacts.
    ///
    /// An empty directory means the generator produced nothing, which is a
    /// failed run, not a clean one.
    #[snafu(display("no OpenAPI artifacts found under {}", dir.display()))]
    NoArtifacts {
        /// Directory that was scanned.
        dir: PathBuf,
        /// Source location.
        #[snafu(implicit)]
        location: Location,
    },
}

/// Flavor of a generated API description file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecKind {
    /// An `*.openapi.json` file carrying an OpenAPI 3.x document.
    OpenApi3,
    /// An `*.swagger.json` file carrying a Swagger 2.0 document.
    Swagger2,
}

impl SpecKind {
    /// Classifies a path by its artifact suffix, if it has one.
    #[must_use]
    pub fn of_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        if name.ends_with(".openapi.json") {
            Some(Self::OpenApi3)
        } else if name.ends_with(".swagger.json") {
            Some(Self::Swagger2)
        } else {
            None
        }
    }
}

impl fmt::Display for SpecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OpenApi3 => "OpenAPI 3.x",
            Self::Swagger2 => "Swagger 2.0",
        };
        f.write_str(name)
    }
}

/// Outcome of checking a single artifact file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The file parses and carries the expected version marker.
    Valid,
    /// The file is unreadable, unparsable, or mislabelled.
    Invalid {
        /// What is wrong with it.
        reason: String,
    },
}

/// One checked artifact file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCheck {
    /// The checked file.
    pub path: PathBuf,
    /// Flavor expected from the file's suffix.
    pub kind: SpecKind,
    /// What the check found.
    pub outcome: CheckOutcome,
}

/// Results for every artifact found in one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecReport {
    /// Per-file outcomes, in path order.
    pub checks: Vec<SpecCheck>,
}

impl SpecReport {
    /// Whether every artifact passed.
    #[must_use]
    pub fn all_valid(&self) -> bool {
        self.checks.iter().all(|check| check.outcome == CheckOutcome::Valid)
    }

    /// The artifacts that failed.
    pub fn invalid(&self) -> impl Iterator<Item = &SpecCheck> {
        self.checks.iter().filter(|check| check.outcome != CheckOutcome::Valid)
    }
}

/// Checks every OpenAPI artifact directly under `dir`.
///
/// The scan is non-recursive and ignores files without an artifact suffix.
/// Finding no artifacts at all is an error; individual bad files are reported
/// per file instead, so one truncated export does not hide the rest of the
/// report.
pub fn check_dir(dir: &Path) -> Result<SpecReport, OpenApiError> {
    let entries = fs::read_dir(dir).context(ScanSnafu { dir })?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.context(ScanSnafu { dir })?;
        let path = entry.path();
        let Some(kind) = SpecKind::of_path(&path) else {
            continue;
        };
        found.push((path, kind));
    }
    found.sort_by(|a, b| a.0.cmp(&b.0));
    ensure!(!found.is_empty(), NoArtifactsSnafu { dir });

    let checks = found.into_iter().map(|(path, kind)| check_file(path, kind)).collect();
    Ok(SpecReport { checks })
}

fn check_file(path: PathBuf, kind: SpecKind) -> SpecCheck {
    let outcome = match fs::read_to_string(&path) {
        Err(error) => CheckOutcome::Invalid { reason: format!("unreadable: {error}") },
        Ok(raw) => match serde_json::from_str::<Value>(&raw) {
            Err(error) => CheckOutcome::Invalid { reason: format!("invalid JSON: {error}") },
            Ok(document) => check_version(kind, &document),
        },
    };
    SpecCheck { path, kind, outcome }
}

fn check_version(kind: SpecKind, document: &Value) -> CheckOutcome {
    match kind {
        SpecKind::OpenApi3 => match document.get("openapi").and_then(Value::as_str) {
            Some(version) if version.starts_with("3.") => CheckOutcome::Valid,
            Some(version) => CheckOutcome::Invalid {
                reason: format!("expected an OpenAPI 3.x version, got {version:?}"),
            },
            None => CheckOutcome::Invalid {
                reason: "missing the \"openapi\" version field".to_string(),
            },
        },
        SpecKind::Swagger2 => match document.get("swagger").and_then(Value::as_str) {
            Some("2.0") => CheckOutcome::Valid,
            Some(version) => CheckOutcome::Invalid {
                reason: format!("expected swagger \"2.0\", got {version:?}"),
            },
            None => CheckOutcome::Invalid {
                reason: "missing the \"swagger\" version field".to_string(),
            },
        },
    }
}
