//! Vendor namespace relocation for descriptor sets.
//!
//! The generator vendors its validation support files under the shared
//! `buf.validate` package and, depending on plugin configuration, can also
//! bundle copies of the `google/protobuf` well-known files. Publishing either
//! verbatim breaks consumers: the vendored files collide with the canonical
//! `buf.validate` registration, and the bundled well-known files shadow the
//! runtime's own copies.
//!
//! [`relocate`] rewrites a descriptor set so it is safe to publish:
//!
//! - `buf/validate/*` files move under `cyberstorm/buf/validate/*`, and their
//!   package moves under `cyberstorm.buf.validate`;
//! - bundled `google/protobuf/*.proto` files are dropped outright, since the
//!   runtime provides them;
//! - every dependency entry and fully-qualified type reference that pointed
//!   at the old locations is rewritten to the new ones.
//!
//! The pass is pure and idempotent: relocating an already-relocated set
//! changes nothing and reports a no-op.

use std::fmt;

use prost_types::{
    DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet,
    ServiceDescriptorProto,
};

use crate::descriptor::is_runtime_provided;

/// File-path prefix of the vendored validation files.
const VENDORED_DIR: &str = "buf/validate/";

/// Package of the vendored validation files.
const VENDORED_PACKAGE: &str = "buf.validate";

/// Prefix prepended to relocated file names.
const RELOCATED_DIR_PREFIX: &str = "cyberstorm/";

/// Prefix prepended to relocated packages.
const RELOCATED_PACKAGE_PREFIX: &str = "cyberstorm.";

/// Leading-dot reference prefix rewritten inside type references.
const VENDORED_REF: &str = ".buf.validate.";

/// Replacement for [`VENDORED_REF`].
const RELOCATED_REF: &str = ".cyberstorm.buf.validate.";

/// Summary of one relocation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelocationReport {
    /// `(old, new)` file-name pairs for relocated files.
    pub moved: Vec<(String, String)>,
    /// Bundled runtime files that were dropped.
    pub dropped: Vec<String>,
    /// Number of rewritten dependency entries and type references.
    pub rewritten_references: usize,
}

impl RelocationReport {
    /// Whether the pass changed nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.moved.is_empty() && self.dropped.is_empty() && self.rewritten_references == 0
    }
}

impl fmt::Display for RelocationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_noop() {
            return write!(f, "nothing to relocate");
        }
        writeln!(f, "moved {} file(s):", self.moved.len())?;
        for (old, new) in &self.moved {
            writeln!(f, "  {old} -> {new}")?;
        }
        writeln!(f, "dropped {} runtime file(s):", self.dropped.len())?;
        for name in &self.dropped {
            writeln!(f, "  {name}")?;
        }
        write!(f, "rewrote {} reference(s)", self.rewritten_references)
    }
}

/// Rewrites `set` into a publishable descriptor set.
///
/// The input is untouched; the returned set carries the relocated files and
/// the report says what changed.
#[must_use]
pub fn relocate(set: &FileDescriptorSet) -> (FileDescriptorSet, RelocationReport) {
    let mut report = RelocationReport::default();

    let mut files: Vec<FileDescriptorProto> = Vec::with_capacity(set.file.len());
    for file in &set.file {
        if is_runtime_provided(file.name()) {
            report.dropped.push(file.name().to_string());
            continue;
        }
        files.push(file.clone());
    }

    for file in &mut files {
        let old_name = file.name().to_string();
        if !old_name.starts_with(VENDORED_DIR) {
            continue;
        }
        let new_name = format!("{RELOCATED_DIR_PREFIX}{old_name}");
        file.name = Some(new_name.clone());
        if is_vendored_package(file.package()) {
            file.package = Some(format!("{RELOCATED_PACKAGE_PREFIX}{}", file.package()));
        }
        report.moved.push((old_name, new_name));
    }

    for file in &mut files {
        for dependency in &mut file.dependency {
            if let Some(rest) = dependency.strip_prefix(VENDORED_DIR) {
                *dependency = format!("{RELOCATED_DIR_PREFIX}{VENDORED_DIR}{rest}");
                report.rewritten_references += 1;
            }
        }
        rewrite_file_references(file, &mut report.rewritten_references);
    }

    (FileDescriptorSet { file: files }, report)
}

fn is_vendored_package(package: &str) -> bool {
    package == VENDORED_PACKAGE
        || package
            .strip_prefix(VENDORED_PACKAGE)
            .is_some_and(|rest| rest.starts_with('.'))
}

fn rewrite_file_references(file: &mut FileDescriptorProto, rewritten: &mut usize) {
    for message in &mut file.message_type {
        rewrite_message(message, rewritten);
    }
    for extension in &mut file.extension {
        rewrite_field(extension, rewritten);
    }
    for service in &mut file.service {
        rewrite_service(service, rewritten);
    }
}

fn rewrite_message(message: &mut DescriptorProto, rewritten: &mut usize) {
    for field in &mut message.field {
        rewrite_field(field, rewritten);
    }
    for extension in &mut message.extension {
        rewrite_field(extension, rewritten);
    }
    for nested in &mut message.nested_type {
        rewrite_message(nested, rewritten);
    }
}

fn rewrite_field(field: &mut FieldDescriptorProto, rewritten: &mut usize) {
    rewrite_reference(&mut field.type_name, rewritten);
    rewrite_reference(&mut field.extendee, rewritten);
}

fn rewrite_service(service: &mut ServiceDescriptorProto, rewritten: &mut usize) {
    for method in &mut service.method {
        rewrite_reference(&mut method.input_type, rewritten);
        rewrite_reference(&mut method.output_type, rewritten);
    }
}

fn rewrite_reference(slot: &mut Option<String>, rewritten: &mut usize) {
    if let Some(reference) = slot {
        if let Some(rest) = reference.strip_prefix(VENDORED_REF) {
            *reference = format!("{RELOCATED_REF}{rest}");
            *rewritten += 1;
        }
    }
}
