#![cfg_attr(docsrs, feature(doc_cfg))]
//#![warn(missing_docs)]

/*!
 <div align="center">
   <h1>dsv-rs</h1>
   <h3>Delimiter-separated values with arbitrary tokens, bound to typed records</h3>

   ![license](https://shields.io/badge/license-MIT%2FApache--2.0-blue)

  </div>

 # dsv-rs

 A generalization of CSV and TSV where every structural token (field delimiter,
 record separator, quote marker and escape marker) is an arbitrary, possibly
 multi-byte, byte sequence. Input is split in a single pass, each field is
 normalized, then bound to the fields of a record type by external name or by
 position through a registry of converters keyed by type.

 ## Core Concepts

- **DelimiterSet:** the four tokens, validated once. The delimiter and the separator must not be empty; an empty quote marker disables quoting and an empty escape marker disables escaping.
- **Scanner:** splits a buffer into records of raw field spans, tracking quote state.
- **Normalizer:** trims boundary characters, removes one layer of quotes and drops escape markers in front of structural tokens.
- **Record:** a struct exposing its fields by slot, usually implemented with [`dsv_record!`]. Fields are matched to header columns by their external name.
- **ConverterRegistry:** decodes bytes into values and encodes them back, keyed by the type of the field. Callers may add or replace converters.
- **Dsv:** the engine tying it together, built with [`DsvBuilder`] or from a [`DsvConfig`].

 ## Features

| **Feature**   | **Description**                                                         |
|---------------|-------------------------------------------------------------------------|
| chrono        | Enables converters for `NaiveDate`, `NaiveDateTime` and `DateTime<Utc>` |
| full          | Enables all available features                                          |

 ## Getting Started

```toml
[dependencies]
dsv-rs = { version = "<version>" }
```

Then, on your main.rs:

```rust
use dsv_rs::{dsv_record, DsvBuilder, DsvError, Escaping};

#[derive(Debug, Default, PartialEq)]
struct Car {
    year: u16,
    make: String,
    model: String,
    description: String,
}

dsv_record!(Car {
    year: u16 => "year",
    make: String => "make",
    model: String => "model",
    description: String => "description",
});

fn main() -> Result<(), DsvError> {
    let input = "year;make;model;description
1948;Porsche;356;Luxury sports car
1967;Ford;Mustang fastback 1967;\"American car; fast\"";

    let dsv = DsvBuilder::new()
        .field_delimiter(";")
        .escaping(Escaping::Structural)
        .build()?;

    let cars: Vec<Car> = dsv.from_slice(input.as_bytes())?;
    assert_eq!(cars[1].description, "American car; fast");

    let written = dsv.serialize(&cars)?;
    assert_eq!(dsv.from_slice::<Car>(&written)?, cars);

    Ok(())
}
```

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.

 ## Contribution
 Unless you explicitly state otherwise, any contribution intentionally submitted
 for inclusion in the work by you, as defined in the Apache-2.0 license, shall be
 dual licensed as above, without any additional terms or conditions

 */

/// Byte level scanning, normalization and writing
pub mod core;

/// Record types, their shapes and the converters binding them to fields
pub mod binding;

/// The engine facade
pub mod dsv;

/// Error types
pub mod error;

#[doc(inline)]
pub use error::*;

pub use binding::{
    binder::{BindSettings, DecodeErrorPolicy, TypeBinder},
    converter::{ConverterRegistry, FieldCodec, FnCodec},
    record::{FieldDescriptor, Record},
    shape::RecordShape,
};
pub use crate::core::{delimiter::DelimiterSet, writer::Escaping};
pub use dsv::{Dsv, DsvBuilder, DsvConfig};
