use std::any::Any;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::{
    core::writer::RowWriter,
    error::{BindFailure, DsvError, Result},
};

use super::{
    converter::{ConverterRegistry, Decoded},
    record::{FieldDescriptor, Record},
    shape::RecordShape,
};

/// What to do with a field whose converter rejects its bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeErrorPolicy {
    /// Leave the field at its default value and keep the row.
    #[default]
    Zero,
    /// Fail the whole call with [`DsvError::DecodeFailed`].
    Error,
    /// Drop the row.
    SkipRow,
}

/// Binding flags taken from the facade configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindSettings {
    pub parse_header: bool,
    pub strict_shape: bool,
    pub on_decode_error: DecodeErrorPolicy,
}

impl Default for BindSettings {
    fn default() -> Self {
        Self {
            parse_header: true,
            strict_shape: false,
            on_decode_error: DecodeErrorPolicy::Zero,
        }
    }
}

/// Maps normalized rows to records and records back to rows.
pub struct TypeBinder<'a> {
    registry: &'a ConverterRegistry,
    settings: BindSettings,
}

enum Bound {
    Assigned,
    Rejected,
}

impl<'a> TypeBinder<'a> {
    pub fn new(registry: &'a ConverterRegistry, settings: BindSettings) -> Self {
        Self { registry, settings }
    }

    /// Binds normalized rows to records of type `T`.
    ///
    /// With `parse_header`, the first row names the columns and column `j` of
    /// every other row binds to the field whose external name is header `j`;
    /// unknown columns are ignored. Without it, column `j` binds to the `j`-th
    /// bound field. Missing columns leave fields at their default value.
    pub fn bind<T: Record, F: AsRef<[u8]>>(
        &self,
        shape: &RecordShape,
        rows: &[Vec<F>],
    ) -> Result<Vec<T>> {
        let Some(first) = rows.first() else {
            return Ok(Vec::new());
        };

        if self.settings.strict_shape {
            let expected = first.len();
            if let Some((row, record)) = rows
                .iter()
                .enumerate()
                .find(|(_, record)| record.len() != expected)
            {
                return Err(DsvError::FieldCountMismatch {
                    row,
                    expected,
                    found: record.len(),
                });
            }
        }

        let (columns, first_row) = if self.settings.parse_header {
            let columns: Vec<Option<usize>> = first
                .iter()
                .map(|name| shape.position(name.as_ref()))
                .collect();
            (Some(columns), 1)
        } else {
            (None, 0)
        };

        let column = |index: usize| match &columns {
            Some(columns) => columns.get(index).copied().flatten(),
            None => (index < shape.len()).then_some(index),
        };

        let mut records = Vec::with_capacity(rows.len() - first_row);
        'rows: for (row, fields) in rows.iter().enumerate().skip(first_row) {
            let mut record = T::default();

            for (index, bytes) in fields.iter().enumerate() {
                let Some(position) = column(index) else {
                    continue;
                };
                let descriptor = &shape.descriptors()[position];
                let bytes = bytes.as_ref();

                if let Bound::Rejected = self.bind_field(&mut record, descriptor, bytes)? {
                    match self.settings.on_decode_error {
                        DecodeErrorPolicy::Zero => {
                            trace!(
                                "Record {}: {:?} is not a valid {}, keeping the default value of `{}`",
                                row,
                                String::from_utf8_lossy(bytes),
                                descriptor.type_name,
                                descriptor.external_name
                            );
                        }
                        DecodeErrorPolicy::Error => {
                            return Err(DsvError::DecodeFailed {
                                row,
                                field: descriptor.external_name,
                                type_name: descriptor.type_name,
                                value: String::from_utf8_lossy(bytes).into_owned(),
                            });
                        }
                        DecodeErrorPolicy::SkipRow => {
                            trace!(
                                "Record {}: skipped, field `{}` could not be decoded",
                                row,
                                descriptor.external_name
                            );
                            continue 'rows;
                        }
                    }
                }
            }

            records.push(record);
        }

        debug!(
            "Bound {} records of {} from {} rows",
            records.len(),
            shape.record_name(),
            rows.len()
        );

        Ok(records)
    }

    fn bind_field<T: Record>(
        &self,
        record: &mut T,
        descriptor: &FieldDescriptor,
        bytes: &[u8],
    ) -> Result<Bound> {
        let failure = |source| DsvError::Deserialize {
            record: T::record_name(),
            field: descriptor.external_name,
            ident: descriptor.ident,
            source,
        };

        let slot = record
            .field_mut(descriptor.slot)
            .ok_or_else(|| failure(BindFailure::MissingSlot(descriptor.slot)))?;

        let Some(codec) = self.registry.lookup(descriptor.type_id) else {
            return if descriptor.is_byte_like() && assign_raw(slot, bytes) {
                Ok(Bound::Assigned)
            } else {
                Err(failure(BindFailure::NoConverter {
                    type_name: descriptor.type_name,
                }))
            };
        };

        match codec.decode_into(bytes, slot) {
            Decoded::Assigned => Ok(Bound::Assigned),
            Decoded::Rejected => Ok(Bound::Rejected),
            Decoded::TypeMismatch => Err(failure(BindFailure::TypeMismatch {
                expected: codec.type_name(),
            })),
        }
    }

    /// Encodes the bound fields of `record`, in shape order.
    pub fn encode<T: Record>(&self, shape: &RecordShape, record: &T) -> Result<Vec<Vec<u8>>> {
        shape
            .descriptors()
            .iter()
            .map(|descriptor| {
                let missing = || DsvError::SerializerMissing {
                    type_name: descriptor.type_name,
                    field: descriptor.external_name,
                };
                let value = record.field(descriptor.slot).ok_or_else(missing)?;
                self.registry
                    .lookup(descriptor.type_id)
                    .and_then(|codec| codec.encode_from(value))
                    .ok_or_else(missing)
            })
            .collect()
    }

    /// Writes an optional header row followed by one row per record.
    ///
    /// Every row is encoded before anything is written, so a failing
    /// converter leaves `writer` untouched. A field the writer cannot escape
    /// stops the write at its row with [`DsvError::Unescapable`].
    pub fn write<T: Record>(
        &self,
        shape: &RecordShape,
        records: &[T],
        writer: &mut RowWriter<'_>,
    ) -> Result<()> {
        let rows = records
            .iter()
            .map(|record| self.encode(shape, record))
            .collect::<Result<Vec<_>>>()?;

        if self.settings.parse_header {
            writer.write_row(&shape.headers())?;
        }
        for row in &rows {
            writer.write_row(row)?;
        }

        debug!(
            "Encoded {} records of {} into {} rows",
            records.len(),
            shape.record_name(),
            writer.rows()
        );
        Ok(())
    }
}

/// Stores raw bytes into byte or string typed slots.
fn assign_raw(slot: &mut dyn Any, bytes: &[u8]) -> bool {
    if let Some(slot) = slot.downcast_mut::<Vec<u8>>() {
        *slot = bytes.to_vec();
        true
    } else if let Some(slot) = slot.downcast_mut::<String>() {
        *slot = String::from_utf8_lossy(bytes).into_owned();
        true
    } else {
        false
    }
}
