//! Mapping between normalized fields and typed records.
//!
//! A [`Record`](record::Record) lists its fields, [`RecordShape`](shape::RecordShape)
//! memoizes which of them are bound and under which external name, the
//! [`ConverterRegistry`](converter::ConverterRegistry) turns bytes into values
//! and back, and the [`TypeBinder`](binder::TypeBinder) ties them together.

pub mod binder;

pub mod converter;

pub mod defaults;

pub mod record;

pub mod shape;
