mod common;

use common::{cars, init_logger, Car, Cents, Invoice, MockCodec, Person};

use dsv_rs::{dsv_record, Dsv, DsvBuilder, DsvError, Escaping};
use proptest::prelude::*;
use rand::distr::{Alphanumeric, SampleString};

#[test]
fn cars_should_be_serialized_with_header() {
    init_logger();

    let written = Dsv::default().serialize(&cars()).unwrap();

    assert_eq!(
        String::from_utf8(written).unwrap(),
        "year,make,model,description
1948,Porsche,356,Luxury sports car
2011,Peugeot,206+,City car
1967,Ford,Mustang fastback 1967,American car"
    );
}

#[test]
fn cars_should_be_serialized_without_header() {
    let dsv = DsvBuilder::new()
        .field_delimiter("<|>")
        .record_separator("\r\n")
        .parse_header(false)
        .build()
        .unwrap();

    let written = dsv.serialize(&cars()[..2]).unwrap();

    assert_eq!(
        written,
        b"1948<|>Porsche<|>356<|>Luxury sports car\r\n2011<|>Peugeot<|>206+<|>City car"
    );
}

#[test]
fn default_escaping_should_write_fields_verbatim() {
    let car = Car {
        description: "fast, red".to_string(),
        ..cars()[0].clone()
    };
    let dsv = DsvBuilder::new().parse_header(false).build().unwrap();

    assert_eq!(
        dsv.serialize_one(&car).unwrap(),
        b"1948,Porsche,356,fast, red"
    );
    assert_eq!(dsv.string_records(b"1948,Porsche,356,fast, red")[0].len(), 5);
}

#[test]
fn structural_escaping_should_protect_headers_and_fields() {
    let car = Car {
        description: "say \"hi\", then\nleave".to_string(),
        ..cars()[2].clone()
    };
    let dsv = DsvBuilder::new()
        .escaping(Escaping::Structural)
        .build()
        .unwrap();

    let written = dsv.serialize_one(&car).unwrap();

    assert_eq!(
        String::from_utf8(written.clone()).unwrap(),
        "year,make,model,description\n1967,Ford,Mustang fastback 1967,\"say \\\"hi\\\", then\nleave\""
    );
    assert_eq!(dsv.from_slice::<Car>(&written).unwrap(), vec![car]);
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Location {
    path: String,
    note: String,
}

dsv_record!(Location {
    path: String => "path",
    note: String => "note",
});

fn location(path: &str, note: &str) -> Location {
    Location {
        path: path.to_string(),
        note: note.to_string(),
    }
}

#[test]
fn trailing_escape_marker_should_fail_structural_serialize() {
    let dsv = DsvBuilder::new()
        .escaping(Escaping::Structural)
        .build()
        .unwrap();

    let result = dsv.serialize(&[location("C:\\dir, with comma\\", "n1"), location("ok", "n2")]);

    match result {
        Err(error @ DsvError::Unescapable { row: 1, column: 0 }) => {
            assert_eq!(
                error.to_string(),
                "row 1: field 0 cannot be escaped so that it reads back unchanged"
            );
        }
        other => panic!("expected an unescapable field, got {:?}", other),
    }
    assert!(Dsv::default()
        .serialize(&[location("C:\\dir\\", "n1")])
        .is_ok());
}

#[test]
fn escape_markers_inside_fields_should_round_trip() {
    let dsv = DsvBuilder::new()
        .escaping(Escaping::Structural)
        .build()
        .unwrap();
    let locations = vec![
        location("C:\\dir\\, with comma", "n1"),
        location("C:\\dir, with comma", "say \\\"hi\\\""),
        location("line\\\nbreak", "n3"),
        location("ok", "n4"),
    ];

    let written = dsv.serialize(&locations).unwrap();

    assert_eq!(dsv.from_slice::<Location>(&written).unwrap(), locations);
}

#[test]
fn blank_records_should_survive_with_quote_marker() {
    let records = vec![Location::default(), location("x", "y")];

    let quoted = DsvBuilder::new()
        .escaping(Escaping::Structural)
        .build()
        .unwrap();
    let written = quoted.serialize(&records).unwrap();
    assert_eq!(written, b"path,note\n\"\",\"\"\nx,y");
    assert_eq!(quoted.from_slice::<Location>(&written).unwrap(), records);

    let unquoted = DsvBuilder::new()
        .quote_marker("")
        .escaping(Escaping::Structural)
        .build()
        .unwrap();
    let written = unquoted.serialize(&records).unwrap();
    assert_eq!(written, b"path,note\n,\nx,y");
    assert_eq!(
        unquoted.from_slice::<Location>(&written).unwrap(),
        vec![location("x", "y")]
    );

    let keep_blank = DsvBuilder::new()
        .quote_marker("")
        .skip_empty_rows(false)
        .build()
        .unwrap();
    assert_eq!(keep_blank.from_slice::<Location>(&written).unwrap(), records);
}

#[test]
fn mocked_converter_should_encode_custom_type() {
    let mut codec = MockCodec::new();
    codec
        .expect_encode()
        .withf(|value: &Cents| *value == Cents(507))
        .times(1)
        .returning(|_| Some(b"5.07".to_vec()));

    let dsv = DsvBuilder::new().converter(codec).build().unwrap();
    let written = dsv
        .serialize(&[Invoice { number: 9, total: Cents(507) }])
        .unwrap();

    assert_eq!(written, b"number,total\n9,5.07");
}

#[test]
fn random_records_should_keep_their_order() {
    let dsv = Dsv::default();
    let people: Vec<Person> = (0..200)
        .map(|id| Person {
            id,
            name: Alphanumeric.sample_string(&mut rand::rng(), 12),
            email: format!("{}@xyz.com", Alphanumeric.sample_string(&mut rand::rng(), 8)),
            score: f64::from(id) / 8.0,
            active: id % 3 == 0,
            nickname: (id % 2 == 0).then(|| Alphanumeric.sample_string(&mut rand::rng(), 4)),
        })
        .collect();

    let written = dsv.serialize(&people).unwrap();
    let mut read: Vec<Person> = Vec::new();
    dsv.deserialize(&written, &mut read).unwrap();

    assert_eq!(read, people);
}

fn person() -> impl Strategy<Value = Person> {
    (
        any::<u32>(),
        "[a-zA-Z0-9]{0,10}",
        "[a-z]{1,5}@[a-z]{1,5}\\.org",
        -1.0e6f64..1.0e6,
        any::<bool>(),
        proptest::option::of("[a-z]{1,8}"),
    )
        .prop_map(|(id, name, email, score, active, nickname)| Person {
            id,
            name,
            email,
            score,
            active,
            nickname,
        })
}

proptest! {
    #[test]
    fn plain_records_should_round_trip(people in prop::collection::vec(person(), 0..30)) {
        let dsv = Dsv::default();

        let written = dsv.serialize(&people).unwrap();

        prop_assert_eq!(dsv.from_slice::<Person>(&written).unwrap(), people);
    }

    #[test]
    fn escaped_records_should_round_trip(
        people in prop::collection::vec(person(), 1..10),
        names in prop::collection::vec("[a-z ,\"\n\t\\\\]{0,10}", 10),
    ) {
        let dsv = DsvBuilder::new()
            .escaping(Escaping::Structural)
            .build()
            .unwrap();
        let people: Vec<Person> = people
            .into_iter()
            .zip(names)
            .map(|(person, name)| Person { name, ..person })
            .collect();

        let written = dsv.serialize(&people);

        if people.iter().any(|person| person.name.ends_with('\\')) {
            let is_unescapable = matches!(written, Err(DsvError::Unescapable { .. }));
            prop_assert!(is_unescapable);
        } else {
            prop_assert_eq!(dsv.from_slice::<Person>(&written.unwrap()).unwrap(), people);
        }
    }
}
