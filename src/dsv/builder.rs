use log::debug;

use crate::{
    binding::{
        binder::DecodeErrorPolicy,
        converter::{ConverterRegistry, FieldCodec},
    },
    core::{
        delimiter::DelimiterSet,
        scanner::{ByteSet, ScanOptions},
        writer::Escaping,
    },
    error::Result,
};

use super::{config::DsvConfig, engine::Dsv};

/// A builder for configuring a [`Dsv`] engine.
///
/// Every option starts at its default value:
///
/// - Field delimiter: `,`
/// - Record separator: `\n`
/// - Quote marker: `"`
/// - Escape marker: `\`
/// - Header row: enabled
/// - Strict shape: disabled
/// - Empty rows: skipped
/// - Boundary characters: space, `\r`, `\n` and `\t`
/// - Decode failures: field left at its default value
/// - Escaping on write: none
///
/// Converters given to the builder are merged over the default converter set.
///
/// # Examples
///
/// ```
/// use dsv_rs::{dsv_record, DsvBuilder};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Row {
///     id: u32,
///     label: String,
/// }
///
/// dsv_record!(Row {
///     id: u32 => "id",
///     label: String => "label",
/// });
///
/// let dsv = DsvBuilder::new()
///     .field_delimiter("ABC")
///     .record_separator("&&")
///     .parse_header(false)
///     .build()
///     .unwrap();
///
/// let rows: Vec<Row> = dsv.from_slice(b"1ABCone&&2ABCtwo").unwrap();
/// assert_eq!(rows[1], Row { id: 2, label: "two".to_string() });
/// ```
#[derive(Debug, Clone)]
pub struct DsvBuilder {
    field_delimiter: Vec<u8>,
    record_separator: Vec<u8>,
    quote_marker: Vec<u8>,
    escape_marker: Vec<u8>,
    parse_header: bool,
    strict_shape: bool,
    skip_empty_rows: bool,
    strip_boundary_chars: Vec<u8>,
    on_decode_error: DecodeErrorPolicy,
    escaping: Escaping,
    converters: ConverterRegistry,
}

impl Default for DsvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DsvBuilder {
    pub fn new() -> Self {
        Self::from_config(DsvConfig::default())
    }

    /// Starts from an options bundle, typically loaded with
    /// [`DsvConfig::from_json`].
    pub fn from_config(config: DsvConfig) -> Self {
        Self {
            field_delimiter: config.field_delimiter.into_bytes(),
            record_separator: config.record_separator.into_bytes(),
            quote_marker: config.quote_marker.into_bytes(),
            escape_marker: config.escape_marker.into_bytes(),
            parse_header: config.parse_header,
            strict_shape: config.strict_shape,
            skip_empty_rows: config.skip_empty_rows,
            strip_boundary_chars: config.strip_boundary_chars.into_bytes(),
            on_decode_error: config.on_decode_error,
            escaping: config.escaping,
            converters: ConverterRegistry::empty(),
        }
    }

    pub fn field_delimiter(mut self, field_delimiter: impl AsRef<[u8]>) -> Self {
        self.field_delimiter = field_delimiter.as_ref().to_vec();
        self
    }

    pub fn record_separator(mut self, record_separator: impl AsRef<[u8]>) -> Self {
        self.record_separator = record_separator.as_ref().to_vec();
        self
    }

    /// An empty quote marker disables quoting.
    pub fn quote_marker(mut self, quote_marker: impl AsRef<[u8]>) -> Self {
        self.quote_marker = quote_marker.as_ref().to_vec();
        self
    }

    /// An empty escape marker disables escape processing.
    pub fn escape_marker(mut self, escape_marker: impl AsRef<[u8]>) -> Self {
        self.escape_marker = escape_marker.as_ref().to_vec();
        self
    }

    /// Whether the first record names the columns, on read and on write.
    pub fn parse_header(mut self, parse_header: bool) -> Self {
        self.parse_header = parse_header;
        self
    }

    pub fn strict_shape(mut self, strict_shape: bool) -> Self {
        self.strict_shape = strict_shape;
        self
    }

    pub fn skip_empty_rows(mut self, skip_empty_rows: bool) -> Self {
        self.skip_empty_rows = skip_empty_rows;
        self
    }

    /// Bytes trimmed from both edges of every field.
    pub fn strip_boundary_chars(mut self, strip_boundary_chars: impl AsRef<[u8]>) -> Self {
        self.strip_boundary_chars = strip_boundary_chars.as_ref().to_vec();
        self
    }

    pub fn on_decode_error(mut self, on_decode_error: DecodeErrorPolicy) -> Self {
        self.on_decode_error = on_decode_error;
        self
    }

    pub fn escaping(mut self, escaping: Escaping) -> Self {
        self.escaping = escaping;
        self
    }

    /// Registers a converter, replacing the default one for the same type.
    pub fn converter<C: FieldCodec>(mut self, codec: C) -> Self {
        self.converters.register(codec);
        self
    }

    /// Merges a set of converters over the defaults.
    pub fn converters(mut self, overrides: &ConverterRegistry) -> Self {
        self.converters.merge(overrides);
        self
    }

    /// Builds the engine, failing with [`DsvError::EmptyDelimiter`] or
    /// [`DsvError::EmptySeparator`] when a mandatory token is empty.
    ///
    /// [`DsvError::EmptyDelimiter`]: crate::DsvError::EmptyDelimiter
    /// [`DsvError::EmptySeparator`]: crate::DsvError::EmptySeparator
    pub fn build(self) -> Result<Dsv> {
        let delimiters = DelimiterSet::new(
            &self.field_delimiter,
            &self.record_separator,
            &self.quote_marker,
            &self.escape_marker,
        )?;

        let options = ScanOptions {
            strip_boundary_chars: ByteSet::new(&self.strip_boundary_chars),
            skip_empty_rows: self.skip_empty_rows,
            strict_shape: self.strict_shape,
        };

        let mut registry = ConverterRegistry::new();
        registry.merge(&self.converters);

        debug!(
            "Built DSV engine with {:?}, {} converters, header: {}",
            delimiters,
            registry.len(),
            self.parse_header
        );

        Ok(Dsv::from_parts(
            delimiters,
            options,
            self.parse_header,
            self.on_decode_error,
            self.escaping,
            registry,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::DsvBuilder;
    use crate::{error::DsvError, ConverterRegistry, DsvConfig, FnCodec};

    #[test]
    fn empty_tokens_should_fail_build() {
        assert!(matches!(
            DsvBuilder::new().field_delimiter("").build(),
            Err(DsvError::EmptyDelimiter)
        ));
        assert!(matches!(
            DsvBuilder::new().record_separator(b"").build(),
            Err(DsvError::EmptySeparator)
        ));
        assert!(DsvBuilder::new().quote_marker("").escape_marker("").build().is_ok());
    }

    #[test]
    fn defaults_should_match_config_defaults() {
        let dsv = DsvBuilder::new().build().unwrap();

        // Boundary characters come back in ascending byte order.
        assert_eq!(
            dsv.config(),
            DsvConfig {
                strip_boundary_chars: "\t\n\r ".to_string(),
                ..DsvConfig::default()
            }
        );
    }

    #[test]
    fn converters_should_override_defaults() {
        let mut overrides = ConverterRegistry::empty();
        overrides.register_fn(
            |bytes: &[u8]| Some(bytes.len() as u64),
            |value: &u64| Some(value.to_string().into_bytes()),
        );

        let dsv = DsvBuilder::new()
            .converters(&overrides)
            .converter(FnCodec::new(
                |_: &[u8]| Some(true),
                |_: &bool| Some(b"yes".to_vec()),
            ))
            .build()
            .unwrap();

        assert_eq!(dsv.registry().decode::<u64>(b"abcd"), Some(4));
        assert_eq!(dsv.registry().decode::<bool>(b"0"), Some(true));
        assert_eq!(dsv.registry().decode::<i32>(b"12"), Some(12));
    }
}
