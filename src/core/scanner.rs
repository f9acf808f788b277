use std::fmt;

use log::trace;

use super::delimiter::DelimiterSet;

/// A set of bytes, used for the characters trimmed from field edges.
#[derive(Clone, PartialEq, Eq)]
pub struct ByteSet([bool; 256]);

impl ByteSet {
    pub fn new(bytes: impl AsRef<[u8]>) -> Self {
        let mut set = [false; 256];
        for &byte in bytes.as_ref() {
            set[byte as usize] = true;
        }
        Self(set)
    }

    pub fn empty() -> Self {
        Self([false; 256])
    }

    #[inline]
    pub fn contains(&self, byte: u8) -> bool {
        self.0[byte as usize]
    }

    pub fn is_empty(&self) -> bool {
        !self.0.iter().any(|&member| member)
    }

    /// Removes members of the set from both ends of `field`.
    pub fn trim<'a>(&self, field: &'a [u8]) -> &'a [u8] {
        let start = field
            .iter()
            .position(|&byte| !self.contains(byte))
            .unwrap_or(field.len());
        let end = field
            .iter()
            .rposition(|&byte| !self.contains(byte))
            .map_or(start, |last| last + 1);
        &field[start..end]
    }

    pub fn bytes(&self) -> Vec<u8> {
        (0..=u8::MAX).filter(|&byte| self.contains(byte)).collect()
    }
}

impl Default for ByteSet {
    /// Space, carriage return, line feed and tab.
    fn default() -> Self {
        Self::new(" \r\n\t")
    }
}

impl fmt::Debug for ByteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ByteSet")
            .field(&self.bytes().escape_ascii().to_string())
            .finish()
    }
}

/// Behavioural flags shared by the scanner, the normalizer and the binder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Bytes trimmed from both edges of every field.
    pub strip_boundary_chars: ByteSet,
    /// Drop records whose fields are all empty once trimmed.
    pub skip_empty_rows: bool,
    /// Require every record to have as many fields as the first one.
    pub strict_shape: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            strip_boundary_chars: ByteSet::default(),
            skip_empty_rows: true,
            strict_shape: false,
        }
    }
}

/// One record's raw field spans, borrowed from the scanned buffer.
///
/// Fields still carry their quote markers, escape markers and boundary
/// characters; see [`Normalizer`](super::normalizer::Normalizer).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRecord<'a> {
    fields: Vec<&'a [u8]>,
}

impl<'a> RawRecord<'a> {
    pub fn fields(&self) -> &[&'a [u8]] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a [u8]> {
        self.fields.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        self.fields.iter().copied()
    }
}

/// The records of a fully scanned buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document<'a> {
    records: Vec<RawRecord<'a>>,
    /// Whether the buffer ended inside an unterminated quote.
    unterminated_quote: bool,
}

impl<'a> Document<'a> {
    pub fn records(&self) -> &[RawRecord<'a>] {
        &self.records
    }

    pub fn into_records(self) -> Vec<RawRecord<'a>> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn unterminated_quote(&self) -> bool {
        self.unterminated_quote
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    EscapedDelimiter,
    EscapedSeparator,
    EscapedQuote,
    Quote,
    Delimiter,
    Separator,
}

/// Single pass, quote and escape aware tokenizer.
///
/// At every position the scanner tests, in priority order, the escaped
/// delimiter, the escaped separator, the escaped quote, the bare quote marker
/// and, outside quotes only, the field delimiter and the record separator.
/// Escaped sequences are skipped as literal content; quote markers toggle the
/// quote state; delimiters and separators close fields and records.
///
/// Unterminated quotes are accepted: the remaining bytes form the last field.
///
/// # Examples
///
/// ```
/// use dsv_rs::core::delimiter::DelimiterSet;
/// use dsv_rs::core::scanner::{ScanOptions, Scanner};
///
/// let delimiters = DelimiterSet::default();
/// let options = ScanOptions::default();
/// let document = Scanner::new(&delimiters, &options).scan(b"a,\"b,c\"\n\n1,2");
///
/// assert_eq!(document.len(), 2);
/// assert_eq!(document.records()[0].fields(), &[&b"a"[..], &b"\"b,c\""[..]]);
/// assert_eq!(document.records()[1].fields(), &[&b"1"[..], &b"2"[..]]);
/// ```
pub struct Scanner<'d> {
    delimiters: &'d DelimiterSet,
    options: &'d ScanOptions,
}

impl<'d> Scanner<'d> {
    pub fn new(delimiters: &'d DelimiterSet, options: &'d ScanOptions) -> Self {
        Self {
            delimiters,
            options,
        }
    }

    pub fn scan<'a>(&self, input: &'a [u8]) -> Document<'a> {
        let mut records = Vec::new();
        let mut current = RawRecord::default();
        let mut field_start = 0;
        let mut in_quote = false;
        let mut i = 0;

        while i < input.len() {
            if !self.delimiters.is_lead_byte(input[i]) {
                i += 1;
                continue;
            }

            match self.token_at(&input[i..], in_quote) {
                Some((Token::EscapedDelimiter | Token::EscapedSeparator | Token::EscapedQuote, len)) => {
                    i += len;
                }
                Some((Token::Quote, len)) => {
                    in_quote = !in_quote;
                    i += len;
                }
                Some((Token::Delimiter, len)) => {
                    current.fields.push(&input[field_start..i]);
                    i += len;
                    field_start = i;
                }
                Some((Token::Separator, len)) => {
                    current.fields.push(&input[field_start..i]);
                    self.complete(&mut records, std::mem::take(&mut current));
                    i += len;
                    field_start = i;
                }
                None => i += 1,
            }
        }

        if field_start < input.len() || !current.is_empty() {
            current.fields.push(&input[field_start..]);
            self.complete(&mut records, current);
        }

        Document {
            records,
            unterminated_quote: in_quote,
        }
    }

    fn token_at(&self, rest: &[u8], in_quote: bool) -> Option<(Token, usize)> {
        let delimiters = self.delimiters;

        if delimiters.escaping_enabled() {
            let escaped = [
                (Token::EscapedDelimiter, delimiters.escaped_delimiter()),
                (Token::EscapedSeparator, delimiters.escaped_separator()),
                (Token::EscapedQuote, delimiters.escaped_quote()),
            ];
            for (token, sequence) in escaped {
                if !sequence.is_empty() && rest.starts_with(sequence) {
                    return Some((token, sequence.len()));
                }
            }
        }

        let quote = delimiters.quote_marker();
        if !quote.is_empty() && rest.starts_with(quote) {
            return Some((Token::Quote, quote.len()));
        }

        if in_quote {
            return None;
        }

        if rest.starts_with(delimiters.field_delimiter()) {
            return Some((Token::Delimiter, delimiters.field_delimiter().len()));
        }
        if rest.starts_with(delimiters.record_separator()) {
            return Some((Token::Separator, delimiters.record_separator().len()));
        }

        None
    }

    fn complete<'a>(&self, records: &mut Vec<RawRecord<'a>>, record: RawRecord<'a>) {
        if self.options.skip_empty_rows && self.is_blank(&record) {
            trace!("Skipping empty record after record {}", records.len());
            return;
        }
        records.push(record);
    }

    fn is_blank(&self, record: &RawRecord<'_>) -> bool {
        record
            .iter()
            .all(|field| self.options.strip_boundary_chars.trim(field).is_empty())
    }
}
