use std::any::{Any, TypeId};

/// External name that excludes a declared field from binding.
pub const IGNORED: &str = "-";

/// One bound field of a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Key matched against header names and written as header.
    pub external_name: &'static str,
    /// Rust identifier of the field.
    pub ident: &'static str,
    /// Position of the field in [`Record::fields`], used to reach its storage.
    pub slot: usize,
    pub type_id: TypeId,
    pub type_name: &'static str,
}

impl FieldDescriptor {
    pub fn of<T: Any>(external_name: &'static str, ident: &'static str, slot: usize) -> Self {
        Self {
            external_name,
            ident,
            slot,
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn is_ignored(&self) -> bool {
        self.external_name.is_empty() || self.external_name == IGNORED
    }

    /// Whether the field can take raw field bytes without a converter.
    pub fn is_byte_like(&self) -> bool {
        self.type_id == TypeId::of::<Vec<u8>>() || self.type_id == TypeId::of::<String>()
    }
}

/// A struct whose fields can be bound to delimiter-separated columns.
///
/// Implementations are usually generated with [`dsv_record!`](crate::dsv_record).
/// `fields` lists every declared field in a fixed order; `field` and
/// `field_mut` expose the storage of the field at a given slot. Fields whose
/// external name is `"-"` stay declared but are never bound.
pub trait Record: Default + 'static {
    fn fields() -> Vec<FieldDescriptor>;

    fn field(&self, slot: usize) -> Option<&dyn Any>;

    fn field_mut(&mut self, slot: usize) -> Option<&mut dyn Any>;

    fn record_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Implements [`Record`] for a struct from a list of `field: Type => "external name"`.
///
/// Fields left out of the list are not bound; an external name of `"-"`
/// declares the field but excludes it. Each `Type` must be the declared type
/// of the field, which is checked at compile time.
///
/// # Examples
///
/// ```
/// use dsv_rs::{dsv_record, Record};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Client {
///     id: String,
///     name: String,
///     age: u8,
///     not_used: String,
/// }
///
/// dsv_record!(Client {
///     id: String => "client_id",
///     name: String => "client_name",
///     age: u8 => "client_age",
///     not_used: String => "-",
/// });
///
/// let names: Vec<_> = Client::fields().iter().map(|f| f.external_name).collect();
/// assert_eq!(names, ["client_id", "client_name", "client_age", "-"]);
/// ```
#[macro_export]
macro_rules! dsv_record {
    ($record:ty { $($field:ident : $ty:ty => $name:expr),* $(,)? }) => {
        impl $crate::Record for $record {
            #[allow(unused_mut, unused_assignments)]
            fn fields() -> ::std::vec::Vec<$crate::FieldDescriptor> {
                let mut fields = ::std::vec::Vec::new();
                let mut slot = 0usize;
                $(
                    fields.push($crate::FieldDescriptor::of::<$ty>($name, stringify!($field), slot));
                    slot += 1;
                )*
                fields
            }

            #[allow(unused_mut, unused_assignments, unused_variables)]
            fn field(&self, slot: usize) -> ::std::option::Option<&dyn ::std::any::Any> {
                let mut index = 0usize;
                $(
                    if slot == index {
                        let value: &$ty = &self.$field;
                        return ::std::option::Option::Some(value);
                    }
                    index += 1;
                )*
                ::std::option::Option::None
            }

            #[allow(unused_mut, unused_assignments, unused_variables)]
            fn field_mut(&mut self, slot: usize) -> ::std::option::Option<&mut dyn ::std::any::Any> {
                let mut index = 0usize;
                $(
                    if slot == index {
                        let value: &mut $ty = &mut self.$field;
                        return ::std::option::Option::Some(value);
                    }
                    index += 1;
                )*
                ::std::option::Option::None
            }
        }
    };
}
