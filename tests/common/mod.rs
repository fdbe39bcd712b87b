//! Shared fixtures for the integration tests.
//!
//! Descriptor sets are built programmatically instead of being checked in as
//! binaries, so each test states exactly the bundle shape it depends on.

#![allow(dead_code)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{
    fmt::Write as _,
    fs,
    path::Path,
    sync::{Arc, Mutex},
};

use prost::Message as _;
use prost_types::{
    DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet,
    MethodDescriptorProto, ServiceDescriptorProto, field_descriptor_proto,
};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    Layer,
    layer::{Context, SubscriberExt},
};

pub const SCHEMA_PACKAGE: &str = "cyberstorm.attestor.v1";
pub const MESSAGES_FILE: &str = "cyberstorm/attestor/v1/messages.proto";
pub const SERVICES_FILE: &str = "cyberstorm/attestor/v1/services.proto";
pub const ANNOTATIONS_FILE: &str = "google/api/annotations.proto";

pub fn string_field(name: &str, number: i32) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(field_descriptor_proto::Label::Optional as i32),
        r#type: Some(field_descriptor_proto::Type::String as i32),
        json_name: Some(name.to_string()),
        ..Default::default()
    }
}

pub fn message_field(name: &str, number: i32, target: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(field_descriptor_proto::Label::Optional as i32),
        r#type: Some(field_descriptor_proto::Type::Message as i32),
        type_name: Some(format!(".{target}")),
        json_name: Some(name.to_string()),
        ..Default::default()
    }
}

pub fn message(name: &str, fields: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto { name: Some(name.to_string()), field: fields, ..Default::default() }
}

/// The messages file as the generator publishes it: all five curated types
/// plus their support types.
pub fn curated_messages_file() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some(MESSAGES_FILE.to_string()),
        package: Some(SCHEMA_PACKAGE.to_string()),
        syntax: Some("proto3".to_string()),
        message_type: vec![
            message("AttestationValue", vec![
                string_field("attestor", 1),
                string_field("kind", 2),
                string_field("value", 3),
            ]),
            message("Identity", vec![
                string_field("id", 1),
                message_field("domain", 2, "cyberstorm.attestor.v1.Domain"),
                FieldDescriptorProto {
                    label: Some(field_descriptor_proto::Label::Repeated as i32),
                    ..string_field("aliases", 3)
                },
            ]),
            message("Repository", vec![
                string_field("name", 1),
                message_field("domain", 2, "cyberstorm.attestor.v1.Domain"),
            ]),
            message("Contribution", vec![
                message_field("repository", 1, "cyberstorm.attestor.v1.Repository"),
                message_field("identity", 2, "cyberstorm.attestor.v1.Identity"),
                string_field("kind", 3),
            ]),
            message("Domain", vec![string_field("name", 1)]),
        ],
        ..Default::default()
    }
}

pub fn messages_set() -> FileDescriptorSet {
    FileDescriptorSet { file: vec![curated_messages_file()] }
}

/// The gateway annotations file the generator bundles when it has the Google
/// API descriptors available.
pub fn annotations_file() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some(ANNOTATIONS_FILE.to_string()),
        package: Some("google.api".to_string()),
        dependency: vec!["google/protobuf/descriptor.proto".to_string()],
        syntax: Some("proto3".to_string()),
        ..Default::default()
    }
}

pub fn services_file() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some(SERVICES_FILE.to_string()),
        package: Some(SCHEMA_PACKAGE.to_string()),
        dependency: vec![MESSAGES_FILE.to_string(), ANNOTATIONS_FILE.to_string()],
        syntax: Some("proto3".to_string()),
        service: vec![ServiceDescriptorProto {
            name: Some("AttestorService".to_string()),
            method: vec![MethodDescriptorProto {
                name: Some("Attest".to_string()),
                input_type: Some(".cyberstorm.attestor.v1.Contribution".to_string()),
                output_type: Some(".cyberstorm.attestor.v1.AttestationValue".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        }],
        ..Default::default()
    }
}

/// A complete services artifact: generator ran with the Google API
/// descriptors, so the import closure is self-contained.
pub fn services_set() -> FileDescriptorSet {
    FileDescriptorSet { file: vec![curated_messages_file(), annotations_file(), services_file()] }
}

/// A services artifact from a generator run without the Google API
/// descriptors: the annotations file is missing, so the services file's
/// import cannot resolve.
pub fn services_set_without_google_api() -> FileDescriptorSet {
    FileDescriptorSet { file: vec![curated_messages_file(), services_file()] }
}

/// Writes a bundle directory the way the generator lays it out.
pub fn write_bundle(
    dir: &Path,
    messages: &FileDescriptorSet,
    services: Option<&FileDescriptorSet>,
) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("messages.binpb"), messages.encode_to_vec()).unwrap();
    if let Some(set) = services {
        fs::write(dir.join("services.binpb"), set.encode_to_vec()).unwrap();
    }
}

/// Collects rendered WARN events emitted while `f` runs on this thread.
#[derive(Clone, Default)]
pub struct WarnLog {
    lines: Arc<Mutex<Vec<String>>>,
}

impl WarnLog {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

struct Render<'a>(&'a mut String);

impl tracing::field::Visit for Render<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        let _ = write!(self.0, "{}={:?} ", field.name(), value);
    }
}

impl<S: Subscriber> Layer<S> for WarnLog {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::WARN {
            return;
        }
        let mut line = String::new();
        event.record(&mut Render(&mut line));
        self.lines.lock().unwrap().push(line);
    }
}

/// Runs `f` with a subscriber that records WARN events, returning the result
/// and the recorded lines.
pub fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
    let log = WarnLog::default();
    let subscriber = tracing_subscriber::registry().with(log.clone());
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, log.lines())
}
