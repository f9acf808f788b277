use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::{delimiter::DelimiterSet, normalizer::contains, scanner::ByteSet};
use crate::error::{DsvError, Result};

/// How encoded fields are protected before being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Escaping {
    /// Encoded bytes are written verbatim.
    #[default]
    None,
    /// Fields containing a delimiter, a separator or a quote marker, or
    /// starting or ending with a stripped character, are wrapped in quote
    /// markers with inner quote markers escaped. Without a quote marker,
    /// delimiters and separators are escaped instead. A literal escape marker
    /// in front of a structural token gets that token escaped as well.
    ///
    /// A field ending with the escape marker can never be read back, nor can
    /// a field needing protection when the escape marker is empty (one holding
    /// the quote marker, or any structural token once quoting is disabled).
    /// Such fields fail with [`DsvError::Unescapable`].
    ///
    /// Two losses depend on the reading side instead: rows made only of empty
    /// fields are written as quoted empty fields, which survive a read only
    /// when a quote marker is set (otherwise they need `skip_empty_rows`
    /// turned off), and padded fields keep their padding only when quoted.
    Structural,
}

/// Joins fields with the field delimiter and rows with the record separator.
///
/// No separator follows the last row.
///
/// # Examples
///
/// ```
/// use dsv_rs::core::delimiter::DelimiterSet;
/// use dsv_rs::core::scanner::ByteSet;
/// use dsv_rs::core::writer::{Escaping, RowWriter};
///
/// let delimiters = DelimiterSet::default();
/// let strip = ByteSet::default();
/// let mut writer = RowWriter::new(&delimiters, &strip, Escaping::Structural);
/// writer.write_row(&["name", "quote"]).unwrap();
/// writer.write_row(&["Ada", "say \"hi\", then leave"]).unwrap();
///
/// assert_eq!(
///     writer.into_inner(),
///     b"name,quote\nAda,\"say \\\"hi\\\", then leave\"".to_vec()
/// );
/// ```
pub struct RowWriter<'d> {
    delimiters: &'d DelimiterSet,
    strip: &'d ByteSet,
    escaping: Escaping,
    out: Vec<u8>,
    rows: usize,
}

impl<'d> RowWriter<'d> {
    pub fn new(delimiters: &'d DelimiterSet, strip: &'d ByteSet, escaping: Escaping) -> Self {
        Self {
            delimiters,
            strip,
            escaping,
            out: Vec::new(),
            rows: 0,
        }
    }

    /// Appends one row.
    ///
    /// Fails with [`DsvError::Unescapable`] when a field cannot be protected,
    /// in which case nothing of the row is written. `row` in the error counts
    /// the rows written before it, header included.
    pub fn write_row<F: AsRef<[u8]>>(&mut self, fields: &[F]) -> Result<()> {
        let start = self.out.len();
        if self.rows > 0 {
            self.out
                .extend_from_slice(self.delimiters.record_separator());
        }

        if let Err(error) = self.push_fields(fields) {
            self.out.truncate(start);
            return Err(error);
        }

        self.rows += 1;
        Ok(())
    }

    /// Number of rows written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.out
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.out
    }

    /// Protects a single field so that scanning and normalizing it yields
    /// `field` again, or returns `None` when no such form exists.
    ///
    /// Padding is only protected when a quote marker is set.
    pub fn escape<'a>(&self, field: &'a [u8]) -> Option<Cow<'a, [u8]>> {
        let delimiters = self.delimiters;
        let escape = delimiters.escape_marker();
        // The marker would escape whatever follows the field.
        if !escape.is_empty() && field.ends_with(escape) {
            return None;
        }

        let structural = [
            delimiters.field_delimiter(),
            delimiters.record_separator(),
            delimiters.quote_marker(),
        ]
        .iter()
        .any(|token| !token.is_empty() && contains(field, token));
        let padded = field.first().is_some_and(|&byte| self.strip.contains(byte))
            || field.last().is_some_and(|&byte| self.strip.contains(byte));

        if !structural && !padded {
            return Some(Cow::Borrowed(field));
        }

        let mut out = Vec::with_capacity(field.len() + 8);
        if delimiters.quoting_enabled() {
            let quote = delimiters.quote_marker();
            if escape.is_empty() && contains(field, quote) {
                return None;
            }
            out.extend_from_slice(quote);
            self.protect(field, &[quote], &mut out);
            out.extend_from_slice(quote);
        } else {
            if escape.is_empty() && structural {
                return None;
            }
            self.protect(
                field,
                &[delimiters.field_delimiter(), delimiters.record_separator()],
                &mut out,
            );
        }
        Some(Cow::Owned(out))
    }

    fn push_fields<F: AsRef<[u8]>>(&mut self, fields: &[F]) -> Result<()> {
        let blank = self.escaping == Escaping::Structural
            && self.delimiters.quoting_enabled()
            && fields.iter().all(|field| field.as_ref().is_empty());

        for (column, field) in fields.iter().enumerate() {
            if column > 0 {
                self.out.extend_from_slice(self.delimiters.field_delimiter());
            }
            if blank {
                let quote = self.delimiters.quote_marker();
                self.out.extend_from_slice(quote);
                self.out.extend_from_slice(quote);
                continue;
            }
            match self.escaping {
                Escaping::None => self.out.extend_from_slice(field.as_ref()),
                Escaping::Structural => {
                    let escaped = self.escape(field.as_ref()).ok_or(DsvError::Unescapable {
                        row: self.rows,
                        column,
                    })?;
                    self.out.extend_from_slice(&escaped);
                }
            }
        }
        Ok(())
    }

    fn protect(&self, field: &[u8], tokens: &[&[u8]], out: &mut Vec<u8>) {
        let escape = self.delimiters.escape_marker();
        if escape.is_empty() {
            out.extend_from_slice(field);
            return;
        }

        let mut i = 0;
        while i < field.len() {
            let rest = &field[i..];
            // A literal marker stays literal only if the token after it is escaped too.
            if let Some(token) = rest
                .strip_prefix(escape)
                .and_then(|after| self.structural_prefix(after))
            {
                out.extend_from_slice(escape);
                out.extend_from_slice(escape);
                out.extend_from_slice(token);
                i += escape.len() + token.len();
                continue;
            }
            if let Some(token) = tokens
                .iter()
                .find(|token| !token.is_empty() && rest.starts_with(token))
            {
                out.extend_from_slice(escape);
                out.extend_from_slice(token);
                i += token.len();
                continue;
            }
            out.push(field[i]);
            i += 1;
        }
    }

    /// The structural token `bytes` starts with, in the order the normalizer
    /// tests them.
    fn structural_prefix(&self, bytes: &[u8]) -> Option<&'d [u8]> {
        let delimiters = self.delimiters;
        [
            delimiters.quote_marker(),
            delimiters.field_delimiter(),
            delimiters.record_separator(),
        ]
        .into_iter()
        .find(|token| !token.is_empty() && bytes.starts_with(token))
    }
}
