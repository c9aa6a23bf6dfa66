//! Unified error types for chain analysis and rewriting.

use thiserror::Error;

/// All errors that can occur while loading, analyzing, or rewriting sources.
#[derive(Error, Debug)]
pub enum ChainError {
    /// I/O error (file read/write, directory access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error (config file, reports)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The Java grammar could not be loaded into the parser
    #[error("Failed to load Java grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    /// tree-sitter returned no tree for the given source
    #[error("Failed to parse Java source: {0}")]
    Parse(String),

    /// Invalid regex pattern
    #[error("Invalid regex pattern '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// No call chain at the requested location
    #[error("No method call chain found at {0}")]
    NoChain(String),

    /// The requested conversion is not available for the selection
    #[error("Conversion unavailable: {0}")]
    Unavailable(#[from] Rejection),

    /// The document changed between planning and applying a rewrite
    #[error("Document changed since the rewrite was planned (expected revision {expected:016x}, found {found:016x})")]
    StaleDocument { expected: u64, found: u64 },

    /// Two planned edits touch the same bytes
    #[error("Overlapping edits at byte {first} and byte {second}")]
    OverlappingEdits { first: usize, second: usize },

    /// A planned edit does not fit the document
    #[error("Edit {start}..{end} is outside the document (length {len})")]
    EditOutOfBounds { start: usize, end: usize, len: usize },

    /// A conversion pipeline stopped before rewriting
    #[error("Conversion {state}: {reason}")]
    ConversionStopped { state: String, reason: String },

    /// The convention check found calls in the forbidden dialect
    #[error("{0} convention violation(s) found")]
    ConventionViolations(usize),

    /// A mock settings call or attribute with no counterpart on the other side
    #[error("Mock setting '{0}' cannot be translated")]
    UnsupportedSetting(String),

    /// Invalid configuration file content
    #[error("Invalid configuration in {path}: {message}")]
    InvalidConfig { path: String, message: String },

    /// Mutually exclusive flags or other argument validation error
    #[error("{0}")]
    InvalidArgs(String),
}

/// Why a classification, validation or eligibility check turned a request down.
///
/// Produced only in the read-only phase; never leaves a document half-edited.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("the selection does not contain a recognized stubbing or verification chain")]
    NotClassified,

    #[error("the selection is empty")]
    EmptySelection,

    #[error("{approach} chain is not well-formed: {reason}")]
    Invalid { approach: String, reason: String },

    #[error("selected chains use different approaches ({first} and {other})")]
    MixedApproaches { first: String, other: String },

    #[error("'{method}' has no counterpart in {target}")]
    UnsupportedSetter { method: String, target: String },

    #[error("{target} is not allowed by the enforced convention")]
    TargetNotAllowed { target: String },

    #[error("{target} is not a conversion target of {source_approach}")]
    NotATarget { source_approach: String, target: String },

    #[error("selected chains use different InOrder objects")]
    MixedInOrder,

    #[error("cannot resolve the mocked class of '{0}'")]
    UnresolvedMockedStatic(String),

    #[error("throw arguments of '{0}' cannot be converted")]
    ArgumentsNotConvertible(String),

    #[error("no consecutive calls to merge")]
    NothingToMerge,

    #[error("the selection is not a convertible Mockito.mock() or Mockito.spy() call")]
    NoMockCreation,

    #[error("the selection is not a field annotated with exactly one of @Mock and @Spy")]
    NoMockField,

    #[error("no method '{0}' in the class declaring the field")]
    NoTargetMethod(String),

    #[error("the class already declares a field named '{0}'")]
    FieldNameTaken(String),
}
