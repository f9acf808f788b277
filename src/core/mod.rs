//! Byte level machinery: token configuration, the single pass scanner, the
//! per-field normalizer and the row writer.

pub mod delimiter;

pub mod normalizer;

pub mod scanner;

pub mod writer;
