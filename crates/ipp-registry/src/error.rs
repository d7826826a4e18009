use miette::{Diagnostic, SourceSpan};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a registry run before or after resolution
#[derive(Debug, Error, Diagnostic)]
pub enum RegistryError {
    /// IO error when reading record files or writing the model
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The configured input does not exist
    #[error("Registry input not found: {}", path.display())]
    #[diagnostic(
        code(registry::missing_input),
        help("Extract the IANA registrations into a JSON record file and pass it with --input")
    )]
    MissingInput {
        /// Path that was expected to hold records
        path: PathBuf,
    },

    /// Failed to parse a record file
    #[error("Failed to parse registry records in {}", path.display())]
    #[diagnostic(
        code(registry::parse_error),
        help("Check that the record file is valid JSON with enums, keywords, attributes and status_codes arrays")
    )]
    ParseError {
        #[source]
        source: serde_json::Error,
        /// Path to the file that failed to parse
        path: PathBuf,
        /// Source text that failed to parse
        #[source_code]
        src: Option<String>,
        /// Location of the error in the source
        #[label("parse error here")]
        span: Option<SourceSpan>,
    },

    /// Invalid configuration file
    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(registry::config))]
    Config { message: String },

    /// Generic error with context
    #[error("{message}")]
    #[diagnostic(code(registry::error))]
    Other {
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl RegistryError {
    /// Create a parse error with source text
    pub fn parse_error_with_source(
        source: serde_json::Error,
        path: impl Into<PathBuf>,
        src: String,
    ) -> Self {
        let span = offset_of(&src, source.line(), source.column()).map(|offset| (offset, 1).into());

        Self::ParseError {
            source,
            path: path.into(),
            src: Some(src),
            span,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Byte offset of a 1-based line/column pair reported by serde_json
fn offset_of(src: &str, line: usize, column: usize) -> Option<usize> {
    let line = line.checked_sub(1)?;
    let line_start: usize = src.split_inclusive('\n').take(line).map(str::len).sum();
    let offset = line_start + column.saturating_sub(1);
    (offset <= src.len()).then_some(offset)
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Discriminant of a [`Warning`], used for counting and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    UnparseableGrammar,
    UnresolvedReference,
    CollectionConflict,
    MissingCollectionMembers,
    NoTypeMapping,
    EmptyDefinition,
}

/// A recoverable problem found while resolving the registry.
///
/// Warnings never stop a run; the offending entity is excluded or the
/// first-seen definition is kept, and the warning is reported at the end.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic, serde::Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Warning {
    /// Value or reference prose that no pattern recognizes
    #[error("{message}")]
    #[diagnostic(code(registry::unparseable_grammar), severity(Warning))]
    UnparseableGrammar {
        message: String,
        #[help]
        subject: Option<String>,
    },

    /// A by-name or by-family reference that does not resolve
    #[error("{message}")]
    #[diagnostic(code(registry::unresolved_reference), severity(Warning))]
    UnresolvedReference {
        message: String,
        #[help]
        subject: Option<String>,
    },

    /// Two definitions of one collection or attribute disagree
    #[error("{message}")]
    #[diagnostic(
        code(registry::collection_conflict),
        severity(Warning),
        url("https://www.iana.org/assignments/ipp-registrations/")
    )]
    CollectionConflict {
        message: String,
        #[help]
        subject: Option<String>,
    },

    /// A collection-typed attribute with neither members nor an alias
    #[error("{message}")]
    #[diagnostic(code(registry::missing_collection_members), severity(Warning))]
    MissingCollectionMembers {
        message: String,
        #[help]
        subject: Option<String>,
    },

    /// No inference rule matched a grammar
    #[error("{message}")]
    #[diagnostic(code(registry::no_type_mapping), severity(Warning))]
    NoTypeMapping {
        message: String,
        #[help]
        subject: Option<String>,
    },

    /// An enumeration without values or a member without a grammar
    #[error("{message}")]
    #[diagnostic(code(registry::empty_definition), severity(Warning))]
    EmptyDefinition {
        message: String,
        #[help]
        subject: Option<String>,
    },
}

impl Warning {
    pub fn new(kind: WarningKind, message: impl Into<String>, subject: Option<String>) -> Self {
        let message = message.into();
        match kind {
            WarningKind::UnparseableGrammar => Self::UnparseableGrammar { message, subject },
            WarningKind::UnresolvedReference => Self::UnresolvedReference { message, subject },
            WarningKind::CollectionConflict => Self::CollectionConflict { message, subject },
            WarningKind::MissingCollectionMembers => {
                Self::MissingCollectionMembers { message, subject }
            }
            WarningKind::NoTypeMapping => Self::NoTypeMapping { message, subject },
            WarningKind::EmptyDefinition => Self::EmptyDefinition { message, subject },
        }
    }

    pub fn kind(&self) -> WarningKind {
        match self {
            Self::UnparseableGrammar { .. } => WarningKind::UnparseableGrammar,
            Self::UnresolvedReference { .. } => WarningKind::UnresolvedReference,
            Self::CollectionConflict { .. } => WarningKind::CollectionConflict,
            Self::MissingCollectionMembers { .. } => WarningKind::MissingCollectionMembers,
            Self::NoTypeMapping { .. } => WarningKind::NoTypeMapping,
            Self::EmptyDefinition { .. } => WarningKind::EmptyDefinition,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::UnparseableGrammar { message, .. }
            | Self::UnresolvedReference { message, .. }
            | Self::CollectionConflict { message, .. }
            | Self::MissingCollectionMembers { message, .. }
            | Self::NoTypeMapping { message, .. }
            | Self::EmptyDefinition { message, .. } => message,
        }
    }

    /// Pretty-printed offending record, if one was attached
    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::UnparseableGrammar { subject, .. }
            | Self::UnresolvedReference { subject, .. }
            | Self::CollectionConflict { subject, .. }
            | Self::MissingCollectionMembers { subject, .. }
            | Self::NoTypeMapping { subject, .. }
            | Self::EmptyDefinition { subject, .. } => subject.as_deref(),
        }
    }
}
