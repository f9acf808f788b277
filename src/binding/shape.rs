use std::{
    any::TypeId,
    collections::HashMap,
    sync::{Arc, LazyLock, OnceLock},
};

use log::debug;
use parking_lot::RwLock;

use crate::error::{DsvError, Result};

use super::record::{FieldDescriptor, Record};

type CachedShape = Result<Arc<RecordShape>, &'static str>;

/// Derived shapes, one cell per record type.
///
/// The map lock is only held to fetch or insert a cell; `OnceLock` makes sure
/// a single caller derives a given shape while concurrent callers wait for it.
static SHAPES: LazyLock<RwLock<HashMap<TypeId, Arc<OnceLock<CachedShape>>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// The bound fields of a record type, in declaration order, with a lookup
/// table from external name to descriptor.
#[derive(Debug, Clone)]
pub struct RecordShape {
    record_name: &'static str,
    descriptors: Vec<FieldDescriptor>,
    by_name: HashMap<&'static str, usize>,
}

impl RecordShape {
    /// Returns the memoized shape of `T`, deriving it on first use.
    ///
    /// Fails with [`DsvError::DuplicateExternalName`] when two bound fields
    /// share an external name. The failure is memoized as well.
    pub fn of<T: Record>() -> Result<Arc<RecordShape>> {
        let key = TypeId::of::<T>();

        let existing = SHAPES.read().get(&key).cloned();
        let cell = match existing {
            Some(cell) => cell,
            None => SHAPES.write().entry(key).or_default().clone(),
        };

        cell.get_or_init(|| Self::derive::<T>().map(Arc::new))
            .clone()
            .map_err(|name| DsvError::DuplicateExternalName {
                record: T::record_name(),
                name,
            })
    }

    fn derive<T: Record>() -> Result<RecordShape, &'static str> {
        let descriptors: Vec<FieldDescriptor> = T::fields()
            .into_iter()
            .filter(|descriptor| !descriptor.is_ignored())
            .collect();

        let mut by_name = HashMap::with_capacity(descriptors.len());
        for (index, descriptor) in descriptors.iter().enumerate() {
            if by_name.insert(descriptor.external_name, index).is_some() {
                return Err(descriptor.external_name);
            }
        }

        debug!(
            "Derived record shape of {} with {} bound fields",
            T::record_name(),
            descriptors.len()
        );

        Ok(RecordShape {
            record_name: T::record_name(),
            descriptors,
            by_name,
        })
    }

    pub fn record_name(&self) -> &'static str {
        self.record_name
    }

    pub fn descriptors(&self) -> &[FieldDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Index into [`descriptors`](Self::descriptors) of the field bound to `name`.
    pub fn position(&self, name: &[u8]) -> Option<usize> {
        std::str::from_utf8(name)
            .ok()
            .and_then(|name| self.by_name.get(name).copied())
    }

    /// External names in serialization order.
    pub fn headers(&self) -> Vec<&'static str> {
        self.descriptors
            .iter()
            .map(|descriptor| descriptor.external_name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        thread,
    };

    use super::RecordShape;
    use crate::{error::DsvError, FieldDescriptor, Record};

    #[derive(Debug, Default)]
    struct Client {
        id: String,
        name: String,
        age: i32,
        not_used: String,
    }

    crate::dsv_record!(Client {
        id: String => "client_id",
        name: String => "client_name",
        age: i32 => "client_age",
        not_used: String => "-",
    });

    #[derive(Debug, Default)]
    struct BadTagTest {
        id: i32,
        name: String,
        email: String,
    }

    crate::dsv_record!(BadTagTest {
        id: i32 => "-",
        name: String => "name",
        email: String => "name",
    });

    static DERIVATIONS: AtomicUsize = AtomicUsize::new(0);

    #[derive(Debug, Default)]
    struct Counted {
        value: u64,
    }

    impl Record for Counted {
        fn fields() -> Vec<FieldDescriptor> {
            DERIVATIONS.fetch_add(1, Ordering::SeqCst);
            vec![FieldDescriptor::of::<u64>("value", "value", 0)]
        }

        fn field(&self, slot: usize) -> Option<&dyn std::any::Any> {
            (slot == 0).then_some(&self.value as &dyn std::any::Any)
        }

        fn field_mut(&mut self, slot: usize) -> Option<&mut dyn std::any::Any> {
            (slot == 0).then_some(&mut self.value as &mut dyn std::any::Any)
        }
    }

    #[test]
    fn ignored_fields_should_be_excluded() {
        let shape = RecordShape::of::<Client>().unwrap();

        assert_eq!(shape.headers(), vec!["client_id", "client_name", "client_age"]);
        assert_eq!(shape.position(b"client_age"), Some(2));
        assert_eq!(shape.descriptors()[2].slot, 2);
        assert_eq!(shape.position(b"-"), None);
        assert_eq!(shape.position(b"whatever"), None);
    }

    #[test]
    fn duplicate_external_names_should_fail() {
        let first = RecordShape::of::<BadTagTest>();
        let second = RecordShape::of::<BadTagTest>();

        for result in [first, second] {
            match result {
                Err(DsvError::DuplicateExternalName { name, record }) => {
                    assert_eq!(name, "name");
                    assert!(record.ends_with("BadTagTest"));
                }
                other => panic!("expected a duplicate name error, got {:?}", other),
            }
        }
    }

    #[test]
    fn shapes_should_be_derived_once_across_threads() {
        let handles: Vec<_> = (0..8)
            .map(|_| thread::spawn(|| RecordShape::of::<Counted>().unwrap()))
            .collect();

        let shapes: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();

        assert_eq!(DERIVATIONS.load(Ordering::SeqCst), 1);
        for shape in &shapes {
            assert!(Arc::ptr_eq(shape, &shapes[0]));
        }
    }
}
