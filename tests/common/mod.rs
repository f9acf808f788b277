#![allow(dead_code)]

mod mocks;

pub use mocks::MockCodec;

use dsv_rs::dsv_record;

/// Installs the test logger once per test binary.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// An amount without a default converter.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Cents(pub i64);

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Car {
    pub year: u16,
    pub make: String,
    pub model: String,
    pub description: String,
}

dsv_record!(Car {
    year: u16 => "year",
    make: String => "make",
    model: String => "model",
    description: String => "description",
});

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Person {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub score: f64,
    pub active: bool,
    pub nickname: Option<String>,
}

dsv_record!(Person {
    id: u32 => "id",
    name: String => "name",
    email: String => "email",
    score: f64 => "score",
    active: bool => "active",
    nickname: Option<String> => "nickname",
});

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TagTest {
    pub id: i64,
    pub name: String,
    pub email: String,
}

dsv_record!(TagTest {
    id: i64 => "-",
    name: String => "name",
    email: String => "email address",
});

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Generic {
    pub field1: String,
    pub field2: String,
    pub field3: String,
    pub field4: String,
    pub field5: String,
}

dsv_record!(Generic {
    field1: String => "i",
    field2: String => "has",
    field3: String => "headers",
    field4: String => "with",
    field5: String => "a line\nbreak",
});

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Invoice {
    pub number: u32,
    pub total: Cents,
}

dsv_record!(Invoice {
    number: u32 => "number",
    total: Cents => "total",
});

pub fn cars() -> Vec<Car> {
    vec![
        Car {
            year: 1948,
            make: "Porsche".to_string(),
            model: "356".to_string(),
            description: "Luxury sports car".to_string(),
        },
        Car {
            year: 2011,
            make: "Peugeot".to_string(),
            model: "206+".to_string(),
            description: "City car".to_string(),
        },
        Car {
            year: 1967,
            make: "Ford".to_string(),
            model: "Mustang fastback 1967".to_string(),
            description: "American car".to_string(),
        },
    ]
}
