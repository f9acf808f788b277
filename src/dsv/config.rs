use serde::{Deserialize, Serialize};

use crate::{
    binding::binder::DecodeErrorPolicy,
    core::writer::Escaping,
    error::Result,
};

/// Serializable options bundle for [`Dsv`](super::Dsv).
///
/// Byte options are carried as UTF-8 strings. Missing keys take their default
/// value and unknown keys are rejected.
///
/// # Examples
///
/// ```
/// use dsv_rs::{DecodeErrorPolicy, DsvBuilder, DsvConfig};
///
/// let config = DsvConfig::from_json(r#"{
///     "field_delimiter": "<|>",
///     "parse_header": false,
///     "on_decode_error": "skip_row"
/// }"#).unwrap();
///
/// assert_eq!(config.record_separator, "\n");
/// assert_eq!(config.on_decode_error, DecodeErrorPolicy::SkipRow);
///
/// let dsv = DsvBuilder::from_config(config).build().unwrap();
/// assert_eq!(dsv.delimiters().field_delimiter(), b"<|>");
///
/// assert!(DsvConfig::from_json(r#"{ "delimiter": ";" }"#).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DsvConfig {
    pub field_delimiter: String,
    pub record_separator: String,
    pub quote_marker: String,
    pub escape_marker: String,
    pub parse_header: bool,
    pub strict_shape: bool,
    pub skip_empty_rows: bool,
    pub strip_boundary_chars: String,
    pub on_decode_error: DecodeErrorPolicy,
    pub escaping: Escaping,
}

impl Default for DsvConfig {
    fn default() -> Self {
        Self {
            field_delimiter: ",".to_string(),
            record_separator: "\n".to_string(),
            quote_marker: "\"".to_string(),
            escape_marker: "\\".to_string(),
            parse_header: true,
            strict_shape: false,
            skip_empty_rows: true,
            strip_boundary_chars: " \r\n\t".to_string(),
            on_decode_error: DecodeErrorPolicy::Zero,
            escaping: Escaping::None,
        }
    }
}

impl DsvConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
