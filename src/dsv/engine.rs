use std::borrow::Cow;

use log::debug;

use crate::{
    binding::{
        binder::{BindSettings, DecodeErrorPolicy, TypeBinder},
        converter::ConverterRegistry,
        record::Record,
        shape::RecordShape,
    },
    core::{
        delimiter::DelimiterSet,
        normalizer::Normalizer,
        scanner::{ScanOptions, Scanner},
        writer::{Escaping, RowWriter},
    },
    error::Result,
};

use super::{builder::DsvBuilder, config::DsvConfig};

/// A configured DSV engine.
///
/// Holds the delimiter set, the scanning and binding options and the
/// converter registry. Every call works on a fully materialized buffer and
/// keeps no state between calls, so one engine can be shared across threads.
///
/// # Examples
///
/// ```
/// use dsv_rs::{dsv_record, Dsv};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Client {
///     id: u32,
///     name: String,
///     age: u8,
///     internal: String,
/// }
///
/// dsv_record!(Client {
///     id: u32 => "client_id",
///     name: String => "client_name",
///     age: u8 => "client_age",
///     internal: String => "-",
/// });
///
/// let dsv = Dsv::default();
/// let mut clients: Vec<Client> = Vec::new();
/// dsv.deserialize(b"client_name,client_id\n\"Doe, Jane\",7\n", &mut clients).unwrap();
///
/// assert_eq!(clients, vec![Client { id: 7, name: "Doe, Jane".into(), ..Client::default() }]);
///
/// let written = dsv.serialize(&[Client { id: 1, name: "Ann".into(), age: 30, ..Client::default() }]).unwrap();
/// assert_eq!(written, b"client_id,client_name,client_age\n1,Ann,30");
/// ```
#[derive(Debug, Clone)]
pub struct Dsv {
    delimiters: DelimiterSet,
    options: ScanOptions,
    parse_header: bool,
    on_decode_error: DecodeErrorPolicy,
    escaping: Escaping,
    registry: ConverterRegistry,
}

impl Default for Dsv {
    fn default() -> Self {
        Self::from_parts(
            DelimiterSet::default(),
            ScanOptions::default(),
            true,
            DecodeErrorPolicy::default(),
            Escaping::default(),
            ConverterRegistry::new(),
        )
    }
}

impl Dsv {
    pub fn builder() -> DsvBuilder {
        DsvBuilder::new()
    }

    pub(crate) fn from_parts(
        delimiters: DelimiterSet,
        options: ScanOptions,
        parse_header: bool,
        on_decode_error: DecodeErrorPolicy,
        escaping: Escaping,
        registry: ConverterRegistry,
    ) -> Self {
        Self {
            delimiters,
            options,
            parse_header,
            on_decode_error,
            escaping,
            registry,
        }
    }

    pub fn delimiters(&self) -> &DelimiterSet {
        &self.delimiters
    }

    pub fn scan_options(&self) -> &ScanOptions {
        &self.options
    }

    pub fn parse_header(&self) -> bool {
        self.parse_header
    }

    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    /// The options of this engine as a serializable bundle.
    ///
    /// Tokens that are not valid UTF-8 are converted lossily.
    pub fn config(&self) -> DsvConfig {
        let text = |bytes: &[u8]| String::from_utf8_lossy(bytes).into_owned();
        DsvConfig {
            field_delimiter: text(self.delimiters.field_delimiter()),
            record_separator: text(self.delimiters.record_separator()),
            quote_marker: text(self.delimiters.quote_marker()),
            escape_marker: text(self.delimiters.escape_marker()),
            parse_header: self.parse_header,
            strict_shape: self.options.strict_shape,
            skip_empty_rows: self.options.skip_empty_rows,
            strip_boundary_chars: text(self.options.strip_boundary_chars.bytes().as_slice()),
            on_decode_error: self.on_decode_error,
            escaping: self.escaping,
        }
    }

    /// Deserializes `input` into `target`.
    ///
    /// The record shape of `T` is validated before any byte is scanned. On
    /// success the contents of `target` are replaced; on failure `target` is
    /// left untouched.
    pub fn deserialize<T: Record>(&self, input: &[u8], target: &mut Vec<T>) -> Result<()> {
        let shape = RecordShape::of::<T>()?;
        let rows = self.normalized(input);
        *target = self.binder().bind(&shape, &rows)?;
        Ok(())
    }

    pub fn deserialize_str<T: Record>(&self, input: &str, target: &mut Vec<T>) -> Result<()> {
        self.deserialize(input.as_bytes(), target)
    }

    pub fn from_slice<T: Record>(&self, input: &[u8]) -> Result<Vec<T>> {
        let mut records = Vec::new();
        self.deserialize(input, &mut records)?;
        Ok(records)
    }

    /// Scanned and normalized records, header row included, without binding.
    pub fn records(&self, input: &[u8]) -> Vec<Vec<Vec<u8>>> {
        self.normalized(input)
            .into_iter()
            .map(|record| record.into_iter().map(Cow::into_owned).collect())
            .collect()
    }

    /// Same as [`records`](Self::records), decoding fields as lossy UTF-8.
    pub fn string_records(&self, input: &[u8]) -> Vec<Vec<String>> {
        self.normalized(input)
            .iter()
            .map(|record| {
                record
                    .iter()
                    .map(|field| String::from_utf8_lossy(field).into_owned())
                    .collect()
            })
            .collect()
    }

    /// Serializes `records`, preceded by a header row when header mode is on.
    ///
    /// No separator follows the last row. Fails with
    /// [`DsvError::SerializerMissing`](crate::DsvError::SerializerMissing)
    /// when a field cannot be encoded, or with
    /// [`DsvError::Unescapable`](crate::DsvError::Unescapable) when structural
    /// escaping cannot protect it. Nothing is returned on failure.
    pub fn serialize<T: Record>(&self, records: &[T]) -> Result<Vec<u8>> {
        let shape = RecordShape::of::<T>()?;
        let mut writer = RowWriter::new(
            &self.delimiters,
            &self.options.strip_boundary_chars,
            self.escaping,
        );
        self.binder().write(&shape, records, &mut writer)?;

        let written = writer.into_inner();
        debug!("Serialized {} records into {} bytes", records.len(), written.len());
        Ok(written)
    }

    pub fn serialize_one<T: Record>(&self, record: &T) -> Result<Vec<u8>> {
        self.serialize(std::slice::from_ref(record))
    }

    /// External names of the bound fields of `T`, in serialization order.
    pub fn headers<T: Record>(&self) -> Result<Vec<&'static str>> {
        Ok(RecordShape::of::<T>()?.headers())
    }

    fn binder(&self) -> TypeBinder<'_> {
        TypeBinder::new(
            &self.registry,
            BindSettings {
                parse_header: self.parse_header,
                strict_shape: self.options.strict_shape,
                on_decode_error: self.on_decode_error,
            },
        )
    }

    fn normalized<'a>(&self, input: &'a [u8]) -> Vec<Vec<Cow<'a, [u8]>>> {
        let document = Scanner::new(&self.delimiters, &self.options).scan(input);
        if document.unterminated_quote() {
            debug!("Input ends inside a quoted field");
        }
        debug!(
            "Scanned {} records from {} bytes",
            document.len(),
            input.len()
        );

        let normalizer = Normalizer::new(&self.delimiters, &self.options.strip_boundary_chars);
        document
            .records()
            .iter()
            .map(|record| record.iter().map(|field| normalizer.normalize(field)).collect())
            .collect()
    }
}
