use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
    marker::PhantomData,
    sync::Arc,
};

use super::defaults;

/// Decode/encode capability for one value type.
///
/// `decode` returns `None` when the bytes do not represent a value; `encode`
/// returns `None` when the value cannot be written. Encoded bytes are emitted
/// as is: escaping delimiters, separators or quotes that may appear in them is
/// the converter's responsibility unless the writer is configured with
/// [`Escaping::Structural`](crate::Escaping::Structural).
///
/// # Examples
///
/// ```
/// use dsv_rs::FieldCodec;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Cents(i64);
///
/// struct CentsCodec;
///
/// impl FieldCodec for CentsCodec {
///     type Value = Cents;
///
///     fn decode(&self, bytes: &[u8]) -> Option<Cents> {
///         let text = std::str::from_utf8(bytes).ok()?;
///         let (units, cents) = text.split_once('.')?;
///         Some(Cents(units.parse::<i64>().ok()? * 100 + cents.parse::<i64>().ok()?))
///     }
///
///     fn encode(&self, value: &Cents) -> Option<Vec<u8>> {
///         Some(format!("{}.{:02}", value.0 / 100, value.0 % 100).into_bytes())
///     }
/// }
///
/// assert_eq!(CentsCodec.decode(b"12.34"), Some(Cents(1234)));
/// assert_eq!(CentsCodec.encode(&Cents(507)), Some(b"5.07".to_vec()));
/// ```
pub trait FieldCodec: Send + Sync + 'static {
    type Value: Any;

    fn decode(&self, bytes: &[u8]) -> Option<Self::Value>;

    fn encode(&self, value: &Self::Value) -> Option<Vec<u8>>;
}

/// A [`FieldCodec`] made of two closures.
pub struct FnCodec<T, D, E> {
    decode: D,
    encode: E,
    marker: PhantomData<fn() -> T>,
}

impl<T, D, E> FnCodec<T, D, E>
where
    T: Any,
    D: Fn(&[u8]) -> Option<T> + Send + Sync + 'static,
    E: Fn(&T) -> Option<Vec<u8>> + Send + Sync + 'static,
{
    pub fn new(decode: D, encode: E) -> Self {
        Self {
            decode,
            encode,
            marker: PhantomData,
        }
    }
}

impl<T, D, E> FieldCodec for FnCodec<T, D, E>
where
    T: Any,
    D: Fn(&[u8]) -> Option<T> + Send + Sync + 'static,
    E: Fn(&T) -> Option<Vec<u8>> + Send + Sync + 'static,
{
    type Value = T;

    fn decode(&self, bytes: &[u8]) -> Option<T> {
        (self.decode)(bytes)
    }

    fn encode(&self, value: &T) -> Option<Vec<u8>> {
        (self.encode)(value)
    }
}

/// Outcome of decoding bytes into a field slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decoded {
    Assigned,
    Rejected,
    TypeMismatch,
}

/// Type erased view of a [`FieldCodec`], stored in the registry.
pub(crate) trait ErasedCodec: Send + Sync {
    fn decode_into(&self, bytes: &[u8], slot: &mut dyn Any) -> Decoded;

    fn decode_boxed(&self, bytes: &[u8]) -> Option<Box<dyn Any>>;

    fn encode_from(&self, value: &dyn Any) -> Option<Vec<u8>>;

    fn type_name(&self) -> &'static str;
}

impl<C: FieldCodec> ErasedCodec for C {
    fn decode_into(&self, bytes: &[u8], slot: &mut dyn Any) -> Decoded {
        let Some(slot) = slot.downcast_mut::<C::Value>() else {
            return Decoded::TypeMismatch;
        };
        match self.decode(bytes) {
            Some(value) => {
                *slot = value;
                Decoded::Assigned
            }
            None => Decoded::Rejected,
        }
    }

    fn decode_boxed(&self, bytes: &[u8]) -> Option<Box<dyn Any>> {
        self.decode(bytes)
            .map(|value| Box::new(value) as Box<dyn Any>)
    }

    fn encode_from(&self, value: &dyn Any) -> Option<Vec<u8>> {
        value
            .downcast_ref::<C::Value>()
            .and_then(|value| self.encode(value))
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<C::Value>()
    }
}

/// Converters keyed by the identity of the type they produce.
///
/// [`ConverterRegistry::new`] starts from the default set (see
/// [`defaults`](super::defaults)); [`ConverterRegistry::empty`] starts from
/// nothing. Registering a converter for a type replaces the previous one.
///
/// # Examples
///
/// ```
/// use dsv_rs::{ConverterRegistry, FnCodec};
///
/// let mut registry = ConverterRegistry::new();
/// registry.register(FnCodec::new(
///     |bytes: &[u8]| std::str::from_utf8(bytes).ok()?.parse::<i32>().ok().map(|v| v * 2),
///     |value: &i32| Some(value.to_string().into_bytes()),
/// ));
///
/// assert!(registry.contains::<i32>());
/// assert!(registry.contains::<String>());
/// assert!(!ConverterRegistry::empty().contains::<String>());
/// ```
#[derive(Clone)]
pub struct ConverterRegistry {
    codecs: HashMap<TypeId, Arc<dyn ErasedCodec>>,
}

impl ConverterRegistry {
    /// A registry holding the default converters.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        defaults::register_defaults(&mut registry);
        registry
    }

    pub fn empty() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    pub fn register<C: FieldCodec>(&mut self, codec: C) -> &mut Self {
        self.codecs
            .insert(TypeId::of::<C::Value>(), Arc::new(codec));
        self
    }

    pub fn register_fn<T, D, E>(&mut self, decode: D, encode: E) -> &mut Self
    where
        T: Any,
        D: Fn(&[u8]) -> Option<T> + Send + Sync + 'static,
        E: Fn(&T) -> Option<Vec<u8>> + Send + Sync + 'static,
    {
        self.register(FnCodec::new(decode, encode))
    }

    /// Copies every entry of `overrides` into this registry, replacing
    /// existing entries for the same types.
    pub fn merge(&mut self, overrides: &ConverterRegistry) -> &mut Self {
        for (type_id, codec) in &overrides.codecs {
            self.codecs.insert(*type_id, Arc::clone(codec));
        }
        self
    }

    pub fn remove<T: Any>(&mut self) -> bool {
        self.codecs.remove(&TypeId::of::<T>()).is_some()
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.codecs.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    /// Decodes `bytes` with the converter registered for `T`.
    pub fn decode<T: Any>(&self, bytes: &[u8]) -> Option<T> {
        let value = self.lookup(TypeId::of::<T>())?.decode_boxed(bytes)?;
        value.downcast::<T>().ok().map(|value| *value)
    }

    /// Encodes `value` with the converter registered for `T`.
    pub fn encode<T: Any>(&self, value: &T) -> Option<Vec<u8>> {
        self.lookup(TypeId::of::<T>())?.encode_from(value)
    }

    pub(crate) fn lookup(&self, type_id: TypeId) -> Option<&dyn ErasedCodec> {
        self.codecs.get(&type_id).map(|codec| codec.as_ref())
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.codecs.values().map(|codec| codec.type_name()).collect();
        names.sort_unstable();
        f.debug_struct("ConverterRegistry")
            .field("types", &names)
            .finish()
    }
}
