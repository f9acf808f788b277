use std::fmt;

use crate::error::{DsvError, Result};

/// The four structural token sequences of a DSV document.
///
/// Every token is an arbitrary byte sequence compared by exact match. The field
/// delimiter and the record separator must be non-empty; the quote marker and
/// the escape marker may be empty, in which case quoting (respectively escape
/// processing) is disabled.
///
/// The escaped variants (escape marker followed by delimiter, separator or
/// quote) are computed once at construction so the scanner never allocates.
///
/// # Examples
///
/// ```
/// use dsv_rs::core::delimiter::DelimiterSet;
///
/// let set = DelimiterSet::new("ABC", "&&", "___", "|||").unwrap();
/// assert_eq!(set.escaped_delimiter(), b"|||ABC");
/// assert_eq!(set.escaped_quote(), b"|||___");
///
/// assert!(DelimiterSet::new("", "\n", "\"", "\\").is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct DelimiterSet {
    field_delimiter: Vec<u8>,
    record_separator: Vec<u8>,
    quote_marker: Vec<u8>,
    escape_marker: Vec<u8>,
    escaped_delimiter: Vec<u8>,
    escaped_separator: Vec<u8>,
    escaped_quote: Vec<u8>,
    /// `lead[b]` is true when some token starts with byte `b`.
    lead: [bool; 256],
}

impl DelimiterSet {
    /// Builds a delimiter set, failing with [`DsvError::EmptyDelimiter`] or
    /// [`DsvError::EmptySeparator`] when a mandatory token is empty.
    pub fn new(
        field_delimiter: impl AsRef<[u8]>,
        record_separator: impl AsRef<[u8]>,
        quote_marker: impl AsRef<[u8]>,
        escape_marker: impl AsRef<[u8]>,
    ) -> Result<Self> {
        let field_delimiter = field_delimiter.as_ref().to_vec();
        let record_separator = record_separator.as_ref().to_vec();
        let quote_marker = quote_marker.as_ref().to_vec();
        let escape_marker = escape_marker.as_ref().to_vec();

        if field_delimiter.is_empty() {
            return Err(DsvError::EmptyDelimiter);
        }
        if record_separator.is_empty() {
            return Err(DsvError::EmptySeparator);
        }

        Ok(Self::assemble(
            field_delimiter,
            record_separator,
            quote_marker,
            escape_marker,
        ))
    }

    fn assemble(
        field_delimiter: Vec<u8>,
        record_separator: Vec<u8>,
        quote_marker: Vec<u8>,
        escape_marker: Vec<u8>,
    ) -> Self {
        let escaped = |token: &[u8]| -> Vec<u8> {
            if escape_marker.is_empty() || token.is_empty() {
                Vec::new()
            } else {
                [escape_marker.as_slice(), token].concat()
            }
        };
        let escaped_delimiter = escaped(&field_delimiter);
        let escaped_separator = escaped(&record_separator);
        let escaped_quote = escaped(&quote_marker);

        let mut lead = [false; 256];
        for token in [
            &field_delimiter,
            &record_separator,
            &quote_marker,
            &escape_marker,
        ] {
            if let Some(&first) = token.first() {
                lead[first as usize] = true;
            }
        }

        Self {
            field_delimiter,
            record_separator,
            quote_marker,
            escape_marker,
            escaped_delimiter,
            escaped_separator,
            escaped_quote,
            lead,
        }
    }

    pub fn field_delimiter(&self) -> &[u8] {
        &self.field_delimiter
    }

    pub fn record_separator(&self) -> &[u8] {
        &self.record_separator
    }

    pub fn quote_marker(&self) -> &[u8] {
        &self.quote_marker
    }

    pub fn escape_marker(&self) -> &[u8] {
        &self.escape_marker
    }

    /// Escape marker followed by the field delimiter, empty when escaping is disabled.
    pub fn escaped_delimiter(&self) -> &[u8] {
        &self.escaped_delimiter
    }

    /// Escape marker followed by the record separator, empty when escaping is disabled.
    pub fn escaped_separator(&self) -> &[u8] {
        &self.escaped_separator
    }

    /// Escape marker followed by the quote marker, empty when escaping or quoting is disabled.
    pub fn escaped_quote(&self) -> &[u8] {
        &self.escaped_quote
    }

    pub fn quoting_enabled(&self) -> bool {
        !self.quote_marker.is_empty()
    }

    pub fn escaping_enabled(&self) -> bool {
        !self.escape_marker.is_empty()
    }

    /// Whether `byte` can start any structural token.
    #[inline]
    pub fn is_lead_byte(&self, byte: u8) -> bool {
        self.lead[byte as usize]
    }
}

impl Default for DelimiterSet {
    /// `,` delimiter, `\n` separator, `"` quote and `\` escape.
    fn default() -> Self {
        Self::assemble(b",".to_vec(), b"\n".to_vec(), b"\"".to_vec(), b"\\".to_vec())
    }
}

impl fmt::Debug for DelimiterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelimiterSet")
            .field("field_delimiter", &self.field_delimiter.escape_ascii().to_string())
            .field("record_separator", &self.record_separator.escape_ascii().to_string())
            .field("quote_marker", &self.quote_marker.escape_ascii().to_string())
            .field("escape_marker", &self.escape_marker.escape_ascii().to_string())
            .finish()
    }
}
