use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = DsvError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
/// Errors raised while configuring, reading or writing delimiter-separated values.
pub enum DsvError {
    #[error("field delimiter must not be zero length")]
    EmptyDelimiter,

    #[error("record separator must not be zero length")]
    EmptySeparator,

    #[error("record `{record}` declares the external name `{name}` more than once")]
    DuplicateExternalName {
        record: &'static str,
        name: &'static str,
    },

    #[error("record {row} has {found} fields, expected {expected}")]
    FieldCountMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unable to bind field `{field}` ({ident}) of `{record}`")]
    Deserialize {
        record: &'static str,
        field: &'static str,
        ident: &'static str,
        #[source]
        source: BindFailure,
    },

    #[error("record {row}: unable to decode {value:?} as {type_name} for field `{field}`")]
    DecodeFailed {
        row: usize,
        field: &'static str,
        type_name: &'static str,
        value: String,
    },

    #[error("no serializer produced a value of type {type_name} for field `{field}`")]
    SerializerMissing {
        type_name: &'static str,
        field: &'static str,
    },

    #[error("row {row}: field {column} cannot be escaped so that it reads back unchanged")]
    Unescapable { row: usize, column: usize },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Why a single field could not be assigned during deserialization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindFailure {
    #[error("the record does not expose slot {0}")]
    MissingSlot(usize),

    #[error("the converter for {expected} does not match the field type")]
    TypeMismatch { expected: &'static str },

    #[error("no converter is registered for {type_name} and the field is not byte or string typed")]
    NoConverter { type_name: &'static str },
}
