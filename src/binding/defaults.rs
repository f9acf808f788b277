//! The default converter set.
//!
//! Scalars use their `FromStr`/`Display` text form, `bool` accepts `1`, `t`
//! and `true` (anything else is `false`), `String` requires valid UTF-8 and
//! `Vec<u8>` is taken verbatim. `Option<T>` maps an empty field to `None`.
//! Lists of numbers or booleans are written as `[1 2 3]`.

use std::{any::Any, fmt::Display, marker::PhantomData, str::FromStr};

use super::converter::{ConverterRegistry, FieldCodec};

/// Text codec for any `FromStr + Display` type.
pub struct TextCodec<T>(PhantomData<fn() -> T>);

impl<T> TextCodec<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for TextCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FieldCodec for TextCodec<T>
where
    T: FromStr + Display + Any,
{
    type Value = T;

    fn decode(&self, bytes: &[u8]) -> Option<T> {
        std::str::from_utf8(bytes).ok()?.parse().ok()
    }

    fn encode(&self, value: &T) -> Option<Vec<u8>> {
        Some(value.to_string().into_bytes())
    }
}

pub struct BoolCodec;

impl FieldCodec for BoolCodec {
    type Value = bool;

    fn decode(&self, bytes: &[u8]) -> Option<bool> {
        Some(matches!(bytes, b"1" | b"t" | b"true"))
    }

    fn encode(&self, value: &bool) -> Option<Vec<u8>> {
        Some(if *value { b"true".to_vec() } else { b"false".to_vec() })
    }
}

pub struct StringCodec;

impl FieldCodec for StringCodec {
    type Value = String;

    fn decode(&self, bytes: &[u8]) -> Option<String> {
        String::from_utf8(bytes.to_vec()).ok()
    }

    fn encode(&self, value: &String) -> Option<Vec<u8>> {
        Some(value.as_bytes().to_vec())
    }
}

pub struct BytesCodec;

impl FieldCodec for BytesCodec {
    type Value = Vec<u8>;

    fn decode(&self, bytes: &[u8]) -> Option<Vec<u8>> {
        Some(bytes.to_vec())
    }

    fn encode(&self, value: &Vec<u8>) -> Option<Vec<u8>> {
        Some(value.clone())
    }
}

/// Wraps a codec so an empty field decodes to `None`.
pub struct OptionCodec<C>(pub C);

impl<C: FieldCodec> FieldCodec for OptionCodec<C> {
    type Value = Option<C::Value>;

    fn decode(&self, bytes: &[u8]) -> Option<Option<C::Value>> {
        if bytes.is_empty() {
            return Some(None);
        }
        self.0.decode(bytes).map(Some)
    }

    fn encode(&self, value: &Option<C::Value>) -> Option<Vec<u8>> {
        match value {
            Some(value) => self.0.encode(value),
            None => Some(Vec::new()),
        }
    }
}

/// Space separated list between brackets, such as `[1 2 3]`.
pub struct ListCodec<C>(pub C);

impl<C: FieldCodec> FieldCodec for ListCodec<C> {
    type Value = Vec<C::Value>;

    fn decode(&self, bytes: &[u8]) -> Option<Vec<C::Value>> {
        let bytes = bytes.strip_prefix(b"[").unwrap_or(bytes);
        let bytes = bytes.strip_suffix(b"]").unwrap_or(bytes);
        bytes
            .split(|byte| *byte == b' ')
            .filter(|item| !item.is_empty())
            .map(|item| self.0.decode(item))
            .collect()
    }

    fn encode(&self, value: &Vec<C::Value>) -> Option<Vec<u8>> {
        let mut out = vec![b'['];
        for (index, item) in value.iter().enumerate() {
            if index > 0 {
                out.push(b' ');
            }
            out.extend(self.0.encode(item)?);
        }
        out.push(b']');
        Some(out)
    }
}

macro_rules! register_text {
    ($registry:expr, $($ty:ty),+ $(,)?) => {
        $(
            $registry.register(TextCodec::<$ty>::new());
            $registry.register(OptionCodec(TextCodec::<$ty>::new()));
        )+
    };
}

macro_rules! register_lists {
    ($registry:expr, $($ty:ty),+ $(,)?) => {
        $(
            $registry.register(ListCodec(TextCodec::<$ty>::new()));
        )+
    };
}

pub(crate) fn register_defaults(registry: &mut ConverterRegistry) {
    register_text!(
        registry, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, char,
    );
    register_lists!(registry, i8, i16, i32, i64, isize, u16, u32, u64, usize, f32, f64);

    registry.register(BoolCodec);
    registry.register(OptionCodec(BoolCodec));
    registry.register(ListCodec(BoolCodec));
    registry.register(StringCodec);
    registry.register(OptionCodec(StringCodec));
    registry.register(BytesCodec);

    #[cfg(feature = "chrono")]
    chrono_codecs::register(registry);
}

#[cfg(feature = "chrono")]
mod chrono_codecs {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

    use super::{ConverterRegistry, FieldCodec, OptionCodec};

    const DATE_FORMAT: &str = "%Y-%m-%d";
    const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

    pub struct NaiveDateCodec;

    impl FieldCodec for NaiveDateCodec {
        type Value = NaiveDate;

        fn decode(&self, bytes: &[u8]) -> Option<NaiveDate> {
            NaiveDate::parse_from_str(std::str::from_utf8(bytes).ok()?, DATE_FORMAT).ok()
        }

        fn encode(&self, value: &NaiveDate) -> Option<Vec<u8>> {
            Some(value.format(DATE_FORMAT).to_string().into_bytes())
        }
    }

    pub struct NaiveDateTimeCodec;

    impl FieldCodec for NaiveDateTimeCodec {
        type Value = NaiveDateTime;

        fn decode(&self, bytes: &[u8]) -> Option<NaiveDateTime> {
            let text = std::str::from_utf8(bytes).ok()?;
            NaiveDateTime::parse_from_str(text, DATE_TIME_FORMAT)
                .or_else(|_| text.parse())
                .ok()
        }

        fn encode(&self, value: &NaiveDateTime) -> Option<Vec<u8>> {
            Some(value.format(DATE_TIME_FORMAT).to_string().into_bytes())
        }
    }

    pub struct UtcDateTimeCodec;

    impl FieldCodec for UtcDateTimeCodec {
        type Value = DateTime<Utc>;

        fn decode(&self, bytes: &[u8]) -> Option<DateTime<Utc>> {
            DateTime::parse_from_rfc3339(std::str::from_utf8(bytes).ok()?)
                .ok()
                .map(|value| value.with_timezone(&Utc))
        }

        fn encode(&self, value: &DateTime<Utc>) -> Option<Vec<u8>> {
            Some(value.to_rfc3339().into_bytes())
        }
    }

    pub(super) fn register(registry: &mut ConverterRegistry) {
        registry.register(NaiveDateCodec);
        registry.register(OptionCodec(NaiveDateCodec));
        registry.register(NaiveDateTimeCodec);
        registry.register(OptionCodec(NaiveDateTimeCodec));
        registry.register(UtcDateTimeCodec);
        registry.register(OptionCodec(UtcDateTimeCodec));
    }

    #[cfg(test)]
    mod tests {
        use chrono::{NaiveDate, TimeZone, Utc};

        use crate::ConverterRegistry;

        #[test]
        fn dates_should_round_trip() {
            let registry = ConverterRegistry::new();
            let date = NaiveDate::from_ymd_opt(1948, 6, 8).unwrap();
            let time = date.and_hms_opt(12, 30, 5).unwrap();
            let instant = Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap();

            assert_eq!(registry.encode(&date), Some(b"1948-06-08".to_vec()));
            assert_eq!(registry.decode::<NaiveDate>(b"1948-06-08"), Some(date));
            assert_eq!(registry.encode(&time), Some(b"1948-06-08 12:30:05".to_vec()));
            assert_eq!(registry.decode(b"1948-06-08 12:30:05"), Some(time));
            assert_eq!(registry.decode(b"1948-06-08T12:30:05"), Some(time));
            assert_eq!(
                registry.decode(&registry.encode(&instant).unwrap()),
                Some(instant)
            );
            assert_eq!(registry.decode::<Option<NaiveDate>>(b""), Some(None));
        }
    }
}
