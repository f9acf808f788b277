use std::borrow::Cow;

use super::{delimiter::DelimiterSet, scanner::ByteSet};

/// Per-field post-processing applied between scanning and binding.
///
/// 1. boundary characters are trimmed from both ends,
/// 2. one layer of surrounding quote markers is removed,
/// 3. escape markers directly preceding a quote marker, a field delimiter or a
///    record separator are dropped, leaving the token as literal content.
///
/// The field count of a record is never changed. A field that needs no
/// rewrite beyond trimming is returned borrowed.
///
/// # Examples
///
/// ```
/// use dsv_rs::core::delimiter::DelimiterSet;
/// use dsv_rs::core::normalizer::Normalizer;
/// use dsv_rs::core::scanner::ByteSet;
///
/// let delimiters = DelimiterSet::default();
/// let strip = ByteSet::default();
/// let normalizer = Normalizer::new(&delimiters, &strip);
///
/// assert_eq!(&*normalizer.normalize(b"  \"a, \\\"b\\\"\" "), b"a, \"b\"");
/// assert_eq!(&*normalizer.normalize(b" plain "), b"plain");
/// ```
pub struct Normalizer<'d> {
    delimiters: &'d DelimiterSet,
    strip: &'d ByteSet,
}

impl<'d> Normalizer<'d> {
    pub fn new(delimiters: &'d DelimiterSet, strip: &'d ByteSet) -> Self {
        Self { delimiters, strip }
    }

    pub fn normalize<'a>(&self, field: &'a [u8]) -> Cow<'a, [u8]> {
        let field = self.unquote(self.strip.trim(field));
        self.unescape(field)
    }

    fn unquote<'a>(&self, field: &'a [u8]) -> &'a [u8] {
        let quote = self.delimiters.quote_marker();
        if quote.is_empty() || field.len() < quote.len() * 2 {
            return field;
        }
        if field.starts_with(quote) && field.ends_with(quote) {
            &field[quote.len()..field.len() - quote.len()]
        } else {
            field
        }
    }

    fn unescape<'a>(&self, field: &'a [u8]) -> Cow<'a, [u8]> {
        let escape = self.delimiters.escape_marker();
        if escape.is_empty() || !contains(field, escape) {
            return Cow::Borrowed(field);
        }

        let tokens = [
            self.delimiters.quote_marker(),
            self.delimiters.field_delimiter(),
            self.delimiters.record_separator(),
        ];

        let mut out = Vec::with_capacity(field.len());
        let mut i = 0;
        while i < field.len() {
            let rest = &field[i..];
            if rest.starts_with(escape) {
                let after = &rest[escape.len()..];
                if let Some(token) = tokens
                    .iter()
                    .find(|token| !token.is_empty() && after.starts_with(token))
                {
                    out.extend_from_slice(token);
                    i += escape.len() + token.len();
                    continue;
                }
            }
            out.push(field[i]);
            i += 1;
        }
        Cow::Owned(out)
    }
}

pub(super) fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::Normalizer;
    use crate::core::{delimiter::DelimiterSet, scanner::ByteSet};

    fn normalize(delimiters: &DelimiterSet, field: &str) -> String {
        let strip = ByteSet::default();
        let normalizer = Normalizer::new(delimiters, &strip);
        String::from_utf8(normalizer.normalize(field.as_bytes()).into_owned()).unwrap()
    }

    #[test]
    fn boundary_chars_should_be_trimmed() {
        assert_eq!(normalize(&DelimiterSet::default(), " \t name1 \r\n"), "name1");
    }

    #[test]
    fn one_quote_layer_should_be_stripped() {
        let delimiters = DelimiterSet::default();

        assert_eq!(normalize(&delimiters, "\"a,b\""), "a,b");
        assert_eq!(normalize(&delimiters, "\"\"a\"\""), "\"a\"");
        assert_eq!(normalize(&delimiters, "\"\""), "");
    }

    #[test]
    fn lone_quote_should_be_kept() {
        let delimiters = DelimiterSet::default();

        assert_eq!(normalize(&delimiters, "\""), "\"");
        assert_eq!(normalize(&delimiters, "\"abc"), "\"abc");
    }

    #[test]
    fn overlapping_multi_byte_quotes_should_be_kept() {
        let delimiters = DelimiterSet::new(",", "\n", "___", "|||").unwrap();

        assert_eq!(normalize(&delimiters, "_____"), "_____");
        assert_eq!(normalize(&delimiters, "______"), "");
        assert_eq!(
            normalize(&delimiters, "___with ABC and |||___ in the middle___"),
            "with ABC and ___ in the middle"
        );
    }

    #[test]
    fn escapes_before_structural_tokens_should_be_removed() {
        let delimiters = DelimiterSet::default();

        assert_eq!(normalize(&delimiters, "a\\,b"), "a,b");
        assert_eq!(normalize(&delimiters, "a\\\nb"), "a\nb");
        assert_eq!(normalize(&delimiters, "\"say \\\"hi\\\"\""), "say \"hi\"");
    }

    #[test]
    fn other_escapes_should_be_kept() {
        let delimiters = DelimiterSet::default();

        assert_eq!(normalize(&delimiters, "c:\\temp"), "c:\\temp");
        assert_eq!(normalize(&delimiters, "trailing\\"), "trailing\\");
        assert_eq!(normalize(&delimiters, "\\\\"), "\\\\");
    }

    #[test]
    fn zero_length_escape_should_leave_field_untouched() {
        let delimiters = DelimiterSet::new(",", "\n", "\"", "").unwrap();

        assert_eq!(normalize(&delimiters, "\\hello"), "\\hello");
    }

    #[test]
    fn unescaped_fields_should_be_borrowed() {
        let delimiters = DelimiterSet::default();
        let strip = ByteSet::default();
        let normalizer = Normalizer::new(&delimiters, &strip);

        assert!(matches!(normalizer.normalize(b" \"abc\" "), Cow::Borrowed(b"abc")));
        assert!(matches!(normalizer.normalize(b"a\\,c"), Cow::Owned(_)));
    }

    #[test]
    fn normalizing_twice_should_be_a_no_op_for_plain_values() {
        let delimiters = DelimiterSet::default();

        for field in ["  plain ", "\"quoted, with comma\"", "esc\\,aped", "c:\\temp"] {
            let once = normalize(&delimiters, field);
            assert_eq!(normalize(&delimiters, &once), once);
        }
    }
}
