//! Descriptor artifact decoding and symbol indexing.
//!
//! A schema artifact is a serialized `google.protobuf.FileDescriptorSet`. This
//! module turns those bytes into a [`SchemaModule`]: a verified, indexed view
//! of every message, enum, and service the artifact defines.
//!
//! Verification runs before any symbol becomes visible, so a module either
//! loads whole or not at all:
//!
//! 1. the bytes decode as a descriptor set with at least one file;
//! 2. no file name repeats within the artifact;
//! 3. every import resolves to a bundled file or a runtime-provided
//!    well-known file (`google/protobuf/*.proto`);
//! 4. no fully-qualified symbol name repeats within the artifact.
//!
//! Import verification is where the optional services artifact degrades in
//! practice: its files import `google/api/annotations.proto`, which is neither
//! a well-known file nor bundled when the generator ran without the Google API
//! descriptors.

use std::collections::{BTreeMap, BTreeSet, btree_map::Entry};

use prost::Message as _;
use prost_types::{
    DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
    FileDescriptorSet, MethodDescriptorProto, ServiceDescriptorProto, field_descriptor_proto,
};
use snafu::{Location, ResultExt, Snafu, ensure};

/// File-name prefix of the well-known types every protobuf runtime provides.
const RUNTIME_PREFIX: &str = "google/protobuf/";

/// Whether `file` is a well-known file provided by the protobuf runtime.
///
/// Such files satisfy imports without being bundled. Only the
/// `google/protobuf` well-known types qualify; `google/api` and other
/// googleapis files must ship inside the artifact that imports them.
#[must_use]
pub fn is_runtime_provided(file: &str) -> bool {
    file.starts_with(RUNTIME_PREFIX) && file.ends_with(".proto")
}

/// Failure to decode and index one descriptor artifact.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ModuleError {
    /// The bytes are not a valid serialized `FileDescriptorSet`.
    #[snafu(display("descriptor artifact {artifact:?} is not a valid FileDescriptorSet: {source}"))]
    Decode {
        /// Label of the artifact that failed.
        artifact: String,
        /// Underlying protobuf decode error.
        source: prost::DecodeError,
        /// Source location.
        #[snafu(implicit)]
        location: Location,
    },

    /// The descriptor set decoded but contains no files.
    #[snafu(display("descriptor artifact {artifact:?} contains no files"))]
    EmptyArtifact {
        /// Label of the artifact that failed.
        artifact: String,
        /// Source location.
        #[snafu(implicit)]
        location: Location,
    },

    /// A file name appears more than once in the artifact.
    #[snafu(display("descriptor artifact {artifact:?} lists file {file:?} more than once"))]
    DuplicateFile {
        /// Label of the artifact that failed.
        artifact: String,
        /// The repeated file name.
        file: String,
        /// Source location.
        #[snafu(implicit)]
        location: Location,
    },

    /// A file imports something neither bundled nor runtime-provided.
    #[snafu(display(
        "file {file:?} in descriptor artifact {artifact:?} imports {import:?}, \
         which is neither bundled nor runtime-provided"
    ))]
    UnresolvedImport {
        /// Label of the artifact that failed.
        artifact: String,
        /// The importing file.
        file: String,
        /// The import that did not resolve.
        import: String,
        /// Source location.
        #[snafu(implicit)]
        location: Location,
    },

    /// A fully-qualified symbol name is defined twice in the artifact.
    #[snafu(display(
        "symbol {symbol:?} in file {file:?} is already defined elsewhere in \
         descriptor artifact {artifact:?}"
    ))]
    DuplicateSymbol {
        /// Label of the artifact that failed.
        artifact: String,
        /// The repeated fully-qualified name.
        symbol: String,
        /// The file holding the second definition.
        file: String,
        /// Source location.
        #[snafu(implicit)]
        location: Location,
    },
}

/// Schema view of one message field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    /// Field name as declared.
    pub name: String,
    /// Field number on the wire.
    pub number: i32,
    /// Rendered type: a protobuf scalar name, or the fully-qualified name of
    /// the referenced message or enum without the leading dot.
    pub type_name: String,
    /// Whether the field is `repeated`.
    pub repeated: bool,
}

/// Schema view of one message type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSchema {
    /// Fully-qualified message name, e.g. `cyberstorm.attestor.v1.Identity`.
    pub full_name: String,
    /// Bundle file that defines the message.
    pub file: String,
    /// Declared fields in declaration order.
    pub fields: Vec<FieldSchema>,
}

/// Schema view of one enum value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValueSchema {
    /// Value name as declared.
    pub name: String,
    /// Numeric value.
    pub number: i32,
}

/// Schema view of one enum type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSchema {
    /// Fully-qualified enum name.
    pub full_name: String,
    /// Bundle file that defines the enum.
    pub file: String,
    /// Declared values in declaration order.
    pub values: Vec<EnumValueSchema>,
}

/// Schema view of one service method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSchema {
    /// Method name as declared.
    pub name: String,
    /// Fully-qualified request message name without the leading dot.
    pub input: String,
    /// Fully-qualified response message name without the leading dot.
    pub output: String,
    /// Whether the client streams requests.
    pub client_streaming: bool,
    /// Whether the server streams responses.
    pub server_streaming: bool,
}

/// Schema view of one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSchema {
    /// Fully-qualified service name.
    pub full_name: String,
    /// Bundle file that defines the service.
    pub file: String,
    /// Declared methods in declaration order.
    pub methods: Vec<MethodSchema>,
}

/// One indexed symbol from a descriptor artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    /// A message type.
    Message(MessageSchema),
    /// An enum type.
    Enum(EnumSchema),
    /// A service.
    Service(ServiceSchema),
}

impl Symbol {
    /// The symbol's fully-qualified name.
    #[must_use]
    pub fn full_name(&self) -> &str {
        match self {
            Self::Message(schema) => &schema.full_name,
            Self::Enum(schema) => &schema.full_name,
            Self::Service(schema) => &schema.full_name,
        }
    }

    /// The bundle file that defines the symbol.
    #[must_use]
    pub fn file(&self) -> &str {
        match self {
            Self::Message(schema) => &schema.file,
            Self::Enum(schema) => &schema.file,
            Self::Service(schema) => &schema.file,
        }
    }

    /// The symbol's kind, for display and filtering.
    #[must_use]
    pub fn kind(&self) -> SymbolKind {
        match self {
            Self::Message(_) => SymbolKind::Message,
            Self::Enum(_) => SymbolKind::Enum,
            Self::Service(_) => SymbolKind::Service,
        }
    }
}

/// Kind of an indexed symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// A message type.
    Message,
    /// An enum type.
    Enum,
    /// A service.
    Service,
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Message => "message",
            Self::Enum => "enum",
            Self::Service => "service",
        };
        f.write_str(name)
    }
}

/// A verified, indexed schema artifact.
///
/// Construction runs the full verification pass; once built, the module is
/// immutable and every lookup is by fully-qualified name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaModule {
    artifact: String,
    files: Vec<String>,
    symbols: BTreeMap<String, Symbol>,
}

impl SchemaModule {
    /// Decodes and indexes a serialized `FileDescriptorSet`.
    pub fn from_bytes(artifact: &str, bytes: &[u8]) -> Result<Self, ModuleError> {
        let set = FileDescriptorSet::decode(bytes).context(DecodeSnafu { artifact })?;
        Self::from_set(artifact, &set)
    }

    /// Verifies and indexes an already-decoded descriptor set.
    pub fn from_set(artifact: &str, set: &FileDescriptorSet) -> Result<Self, ModuleError> {
        ensure!(!set.file.is_empty(), EmptyArtifactSnafu { artifact });

        let mut bundled = BTreeSet::new();
        for file in &set.file {
            ensure!(
                bundled.insert(file.name().to_string()),
                DuplicateFileSnafu { artifact, file: file.name() }
            );
        }

        for file in &set.file {
            for import in &file.dependency {
                ensure!(
                    bundled.contains(import.as_str()) || is_runtime_provided(import),
                    UnresolvedImportSnafu { artifact, file: file.name(), import }
                );
            }
        }

        let mut symbols = BTreeMap::new();
        for file in &set.file {
            index_file(artifact, file, &mut symbols)?;
        }

        Ok(Self {
            artifact: artifact.to_string(),
            files: set.file.iter().map(|file| file.name().to_string()).collect(),
            symbols,
        })
    }

    /// Label of the artifact this module was loaded from.
    #[must_use]
    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    /// Bundled file names in artifact order.
    #[must_use]
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Number of indexed symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the artifact defines no symbols at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Looks up any symbol by fully-qualified name.
    #[must_use]
    pub fn get(&self, full_name: &str) -> Option<&Symbol> {
        self.symbols.get(full_name)
    }

    /// Looks up a message by fully-qualified name.
    #[must_use]
    pub fn message(&self, full_name: &str) -> Option<&MessageSchema> {
        match self.symbols.get(full_name) {
            Some(Symbol::Message(schema)) => Some(schema),
            _ => None,
        }
    }

    /// All indexed symbols in name order.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    /// All indexed services in name order.
    pub fn services(&self) -> impl Iterator<Item = &ServiceSchema> {
        self.symbols.values().filter_map(|symbol| match symbol {
            Symbol::Service(schema) => Some(schema),
            _ => None,
        })
    }
}

fn index_file(
    artifact: &str,
    file: &FileDescriptorProto,
    symbols: &mut BTreeMap<String, Symbol>,
) -> Result<(), ModuleError> {
    let package = file.package();
    for message in &file.message_type {
        index_message(artifact, file.name(), package, message, symbols)?;
    }
    for decl in &file.enum_type {
        insert(artifact, symbols, Symbol::Enum(enum_schema(file.name(), package, decl)))?;
    }
    for service in &file.service {
        insert(artifact, symbols, Symbol::Service(service_schema(file.name(), package, service)))?;
    }
    Ok(())
}

fn index_message(
    artifact: &str,
    file: &str,
    prefix: &str,
    message: &DescriptorProto,
    symbols: &mut BTreeMap<String, Symbol>,
) -> Result<(), ModuleError> {
    // Synthetic map-entry messages are wire detail, not part of the schema
    // surface.
    if is_map_entry(message) {
        return Ok(());
    }

    let full_name = join_name(prefix, message.name());
    insert(artifact, symbols, Symbol::Message(message_schema(file, &full_name, message)))?;

    for nested in &message.nested_type {
        index_message(artifact, file, &full_name, nested, symbols)?;
    }
    for decl in &message.enum_type {
        insert(artifact, symbols, Symbol::Enum(enum_schema(file, &full_name, decl)))?;
    }
    Ok(())
}

fn insert(
    artifact: &str,
    symbols: &mut BTreeMap<String, Symbol>,
    symbol: Symbol,
) -> Result<(), ModuleError> {
    let full_name = symbol.full_name().to_string();
    match symbols.entry(full_name) {
        Entry::Occupied(existing) => DuplicateSymbolSnafu {
            artifact,
            symbol: existing.key().as_str(),
            file: symbol.file(),
        }
        .fail(),
        Entry::Vacant(slot) => {
            slot.insert(symbol);
            Ok(())
        },
    }
}

fn join_name(prefix: &str, name: &str) -> String {
    if prefix.is_empty() { name.to_string() } else { format!("{prefix}.{name}") }
}

fn is_map_entry(message: &DescriptorProto) -> bool {
    message.options.as_ref().and_then(|options| options.map_entry).unwrap_or(false)
}

fn message_schema(file: &str, full_name: &str, message: &DescriptorProto) -> MessageSchema {
    MessageSchema {
        full_name: full_name.to_string(),
        file: file.to_string(),
        fields: message.field.iter().map(field_schema).collect(),
    }
}

fn enum_schema(file: &str, prefix: &str, decl: &EnumDescriptorProto) -> EnumSchema {
    EnumSchema {
        full_name: join_name(prefix, decl.name()),
        file: file.to_string(),
        values: decl
            .value
            .iter()
            .map(|value| EnumValueSchema { name: value.name().to_string(), number: value.number() })
            .collect(),
    }
}

fn service_schema(file: &str, package: &str, service: &ServiceDescriptorProto) -> ServiceSchema {
    ServiceSchema {
        full_name: join_name(package, service.name()),
        file: file.to_string(),
        methods: service.method.iter().map(method_schema).collect(),
    }
}

fn method_schema(method: &MethodDescriptorProto) -> MethodSchema {
    MethodSchema {
        name: method.name().to_string(),
        input: method.input_type().trim_start_matches('.').to_string(),
        output: method.output_type().trim_start_matches('.').to_string(),
        client_streaming: method.client_streaming(),
        server_streaming: method.server_streaming(),
    }
}

fn field_schema(field: &FieldDescriptorProto) -> FieldSchema {
    FieldSchema {
        name: field.name().to_string(),
        number: field.number(),
        type_name: render_field_type(field),
        repeated: field.label() == field_descriptor_proto::Label::Repeated,
    }
}

fn render_field_type(field: &FieldDescriptorProto) -> String {
    let named = field.type_name();
    if named.is_empty() {
        scalar_name(field.r#type()).to_string()
    } else {
        named.trim_start_matches('.').to_string()
    }
}

fn scalar_name(ty: field_descriptor_proto::Type) -> &'static str {
    use field_descriptor_proto::Type;
    match ty {
        Type::Double => "double",
        Type::Float => "float",
        Type::Int64 => "int64",
        Type::Uint64 => "uint64",
        Type::Int32 => "int32",
        Type::Fixed64 => "fixed64",
        Type::Fixed32 => "fixed32",
        Type::Bool => "bool",
        Type::String => "string",
        Type::Group => "group",
        Type::Message => "message",
        Type::Bytes => "bytes",
        Type::Uint32 => "uint32",
        Type::Enum => "enum",
        Type::Sfixed32 => "sfixed32",
        Type::Sfixed64 => "sfixed64",
        Type::Sint32 => "sint32",
        Type::Sint64 => "sint64",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use prost_types::{EnumValueDescriptorProto, MessageOptions};

    use super::*;

    fn file(name: &str, package: &str) -> FileDescriptorProto {
        FileDescriptorProto {
            name: Some(name.to_string()),
            package: Some(package.to_string()),
            syntax: Some("proto3".to_string()),
            ..Default::default()
        }
    }

    fn message(name: &str) -> DescriptorProto {
        DescriptorProto { name: Some(name.to_string()), ..Default::default() }
    }

    fn string_field(name: &str, number: i32) -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: Some(name.to_string()),
            number: Some(number),
            label: Some(field_descriptor_proto::Label::Optional as i32),
            r#type: Some(field_descriptor_proto::Type::String as i32),
            ..Default::default()
        }
    }

    fn message_field(name: &str, number: i32, target: &str) -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: Some(name.to_string()),
            number: Some(number),
            label: Some(field_descriptor_proto::Label::Optional as i32),
            r#type: Some(field_descriptor_proto::Type::Message as i32),
            type_name: Some(format!(".{target}")),
            ..Default::default()
        }
    }

    fn sample_set() -> FileDescriptorSet {
        let mut identity = message("Identity");
        identity.field = vec![
            string_field("id", 1),
            message_field("domain", 2, "attestor.v1.Domain"),
            FieldDescriptorProto {
                label: Some(field_descriptor_proto::Label::Repeated as i32),
                ..string_field("aliases", 3)
            },
        ];

        let status = EnumDescriptorProto {
            name: Some("Status".to_string()),
            value: vec![
                EnumValueDescriptorProto {
                    name: Some("STATUS_UNSPECIFIED".to_string()),
                    number: Some(0),
                    ..Default::default()
                },
                EnumValueDescriptorProto {
                    name: Some("STATUS_ACTIVE".to_string()),
                    number: Some(1),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let service = ServiceDescriptorProto {
            name: Some("AttestorService".to_string()),
            method: vec![MethodDescriptorProto {
                name: Some("Attest".to_string()),
                input_type: Some(".attestor.v1.Identity".to_string()),
                output_type: Some(".attestor.v1.Domain".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };

        let mut main = file("attestor/v1/schema.proto", "attestor.v1");
        main.message_type = vec![identity, message("Domain")];
        main.enum_type = vec![status];
        main.service = vec![service];
        FileDescriptorSet { file: vec![main] }
    }

    #[test]
    fn test_from_set_indexes_messages_enums_and_services() {
        let module = SchemaModule::from_set("messages", &sample_set()).unwrap();

        assert_eq!(module.artifact(), "messages");
        assert_eq!(module.files(), ["attestor/v1/schema.proto"]);
        assert_eq!(module.len(), 4);
        assert!(!module.is_empty());

        let identity = module.message("attestor.v1.Identity").unwrap();
        assert_eq!(identity.file, "attestor/v1/schema.proto");
        assert_eq!(identity.fields.len(), 3);
        assert_eq!(identity.fields[0].name, "id");
        assert_eq!(identity.fields[0].type_name, "string");
        assert!(!identity.fields[0].repeated);
        assert_eq!(identity.fields[1].type_name, "attestor.v1.Domain");
        assert!(identity.fields[2].repeated);

        let status = module.get("attestor.v1.Status").unwrap();
        assert_eq!(status.kind(), SymbolKind::Enum);
        assert!(matches!(status, Symbol::Enum(decl) if decl.values.len() == 2));

        let services: Vec<_> = module.services().collect();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].full_name, "attestor.v1.AttestorService");
        assert_eq!(services[0].methods[0].input, "attestor.v1.Identity");
        assert_eq!(services[0].methods[0].output, "attestor.v1.Domain");
        assert!(!services[0].methods[0].client_streaming);
    }

    #[test]
    fn test_nested_declarations_use_dotted_names() {
        let mut outer = message("Outer");
        outer.nested_type = vec![message("Inner")];
        outer.enum_type = vec![EnumDescriptorProto {
            name: Some("Kind".to_string()),
            ..Default::default()
        }];
        let mut root = file("a.proto", "pkg");
        root.message_type = vec![outer];
        let set = FileDescriptorSet { file: vec![root] };

        let module = SchemaModule::from_set("messages", &set).unwrap();
        assert!(module.message("pkg.Outer").is_some());
        assert!(module.message("pkg.Outer.Inner").is_some());
        assert!(matches!(module.get("pkg.Outer.Kind"), Some(Symbol::Enum(_))));
    }

    #[test]
    fn test_packageless_file_indexes_bare_names() {
        let mut root = file("a.proto", "");
        root.package = None;
        root.message_type = vec![message("Loose")];
        let set = FileDescriptorSet { file: vec![root] };

        let module = SchemaModule::from_set("messages", &set).unwrap();
        assert!(module.message("Loose").is_some());
    }

    #[test]
    fn test_map_entry_messages_are_skipped() {
        let mut outer = message("Labelled");
        outer.nested_type = vec![DescriptorProto {
            options: Some(MessageOptions { map_entry: Some(true), ..Default::default() }),
            ..message("LabelsEntry")
        }];
        let mut root = file("a.proto", "pkg");
        root.message_type = vec![outer];
        let set = FileDescriptorSet { file: vec![root] };

        let module = SchemaModule::from_set("messages", &set).unwrap();
        assert!(module.message("pkg.Labelled").is_some());
        assert!(module.get("pkg.Labelled.LabelsEntry").is_none());
        assert_eq!(module.len(), 1);
    }

    #[test]
    fn test_empty_set_is_rejected() {
        let err = SchemaModule::from_set("messages", &FileDescriptorSet::default()).unwrap_err();
        assert!(matches!(err, ModuleError::EmptyArtifact { .. }));
        assert!(err.to_string().contains("contains no files"));
    }

    #[test]
    fn test_duplicate_file_names_are_rejected() {
        let set = FileDescriptorSet { file: vec![file("a.proto", "pkg"), file("a.proto", "pkg")] };
        let err = SchemaModule::from_set("messages", &set).unwrap_err();
        assert!(matches!(err, ModuleError::DuplicateFile { ref file, .. } if file == "a.proto"));
    }

    #[test]
    fn test_runtime_imports_resolve_without_being_bundled() {
        let mut root = file("a.proto", "pkg");
        root.dependency = vec!["google/protobuf/timestamp.proto".to_string()];
        let set = FileDescriptorSet { file: vec![root] };

        assert!(SchemaModule::from_set("messages", &set).is_ok());
    }

    #[test]
    fn test_bundled_imports_resolve() {
        let mut dependent = file("b.proto", "pkg.b");
        dependent.dependency = vec!["a.proto".to_string()];
        let set = FileDescriptorSet { file: vec![file("a.proto", "pkg.a"), dependent] };

        assert!(SchemaModule::from_set("messages", &set).is_ok());
    }

    #[test]
    fn test_google_api_import_is_unresolved_when_not_bundled() {
        let mut root = file("attestor/v1/services.proto", "attestor.v1");
        root.dependency = vec!["google/api/annotations.proto".to_string()];
        let set = FileDescriptorSet { file: vec![root] };

        let err = SchemaModule::from_set("services", &set).unwrap_err();
        assert!(matches!(
            err,
            ModuleError::UnresolvedImport { ref import, .. }
                if import == "google/api/annotations.proto"
        ));
        let rendered = err.to_string();
        assert!(rendered.contains("google/api/annotations.proto"), "got: {rendered}");
        assert!(rendered.contains("neither bundled nor runtime-provided"), "got: {rendered}");
    }

    #[test]
    fn test_duplicate_symbols_across_files_are_rejected() {
        let mut first = file("a.proto", "pkg");
        first.message_type = vec![message("Clash")];
        let mut second = file("b.proto", "pkg");
        second.message_type = vec![message("Clash")];
        let set = FileDescriptorSet { file: vec![first, second] };

        let err = SchemaModule::from_set("messages", &set).unwrap_err();
        assert!(matches!(
            err,
            ModuleError::DuplicateSymbol { ref symbol, ref file, .. }
                if symbol == "pkg.Clash" && file == "b.proto"
        ));
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        let err = SchemaModule::from_bytes("messages", b"not a descriptor set").unwrap_err();
        assert!(matches!(err, ModuleError::Decode { .. }));
        assert!(err.to_string().contains("not a valid FileDescriptorSet"));
    }

    #[test]
    fn test_from_bytes_matches_from_set() {
        let set = sample_set();
        let from_bytes = SchemaModule::from_bytes("messages", &set.encode_to_vec()).unwrap();
        let from_set = SchemaModule::from_set("messages", &set).unwrap();
        assert_eq!(from_bytes, from_set);
    }

    #[test]
    fn test_is_runtime_provided() {
        assert!(is_runtime_provided("google/protobuf/timestamp.proto"));
        assert!(is_runtime_provided("google/protobuf/descriptor.proto"));
        assert!(!is_runtime_provided("google/api/annotations.proto"));
        assert!(!is_runtime_provided("google/protobuf/unfinished"));
        assert!(!is_runtime_provided("attestor/v1/schema.proto"));
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        fn arb_ident() -> impl Strategy<Value = String> {
            "[a-z][a-z0-9]{0,7}"
        }

        fn arb_module_layout() -> impl Strategy<Value = Vec<(String, Vec<String>)>> {
            prop::collection::vec((arb_ident(), prop::collection::vec(arb_ident(), 1..5)), 1..6)
                .prop_map(|files| {
                    files
                        .into_iter()
                        .enumerate()
                        .map(|(i, (package, types))| {
                            let package = format!("{package}{i}");
                            let types = types
                                .into_iter()
                                .enumerate()
                                .map(|(j, name)| format!("{name}{j}"))
                                .collect();
                            (package, types)
                        })
                        .collect()
                })
        }

        fn build(layout: &[(String, Vec<String>)]) -> FileDescriptorSet {
            let file = layout
                .iter()
                .map(|(package, types)| FileDescriptorProto {
                    name: Some(format!("{}.proto", package.replace('.', "/"))),
                    package: Some(package.clone()),
                    message_type: types.iter().map(|name| message(name)).collect(),
                    ..Default::default()
                })
                .collect();
            FileDescriptorSet { file }
        }

        proptest! {
            #[test]
            fn prop_every_declared_message_is_indexed(layout in arb_module_layout()) {
                let module = SchemaModule::from_set("messages", &build(&layout)).unwrap();

                let declared: usize = layout.iter().map(|(_, types)| types.len()).sum();
                prop_assert_eq!(module.len(), declared);
                for (package, types) in &layout {
                    for name in types {
                        let full_name = format!("{package}.{name}");
                        prop_assert!(module.message(&full_name).is_some());
                        prop_assert_eq!(module.get(&full_name).unwrap().kind(), SymbolKind::Message);
                    }
                }
            }

            #[test]
            fn prop_symbols_iterate_in_name_order(layout in arb_module_layout()) {
                let module = SchemaModule::from_set("messages", &build(&layout)).unwrap();
                let names: Vec<_> = module.symbols().map(|s| s.full_name().to_string()).collect();
                let mut sorted = names.clone();
                sorted.sort();
                prop_assert_eq!(names, sorted);
            }
        }
    }
}
