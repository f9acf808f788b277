//! The engine facade: configuration, construction and the
//! deserialize/serialize entry points.

/// Builder for [`Dsv`](engine::Dsv).
pub mod builder;

/// Serializable options bundle.
pub mod config;

pub mod engine;

pub use crate::{binding::binder::DecodeErrorPolicy, core::writer::Escaping};
pub use builder::DsvBuilder;
pub use config::DsvConfig;
pub use engine::Dsv;
