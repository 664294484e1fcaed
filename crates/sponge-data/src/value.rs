//! Values stored in a data tree.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::view::DataView;

/// Shared, mutable array storage.
///
/// Cloning a `DataArray` aliases the same storage, the way an array
/// reference would. [`DataArray::deep_clone`] allocates a copy. Whether a
/// data tree aliases or copies arrays is decided by its
/// [`SafetyMode`](crate::SafetyMode).
pub struct DataArray<T> {
    inner: Rc<RefCell<Vec<T>>>,
}

impl<T> DataArray<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(items)),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    pub fn borrow(&self) -> Ref<'_, Vec<T>> {
        self.inner.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Vec<T>> {
        self.inner.borrow_mut()
    }

    /// Whether both handles point at the same storage.
    pub fn shares_storage_with(&self, other: &DataArray<T>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone> DataArray<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.borrow().clone()
    }

    pub fn deep_clone(&self) -> Self {
        Self::new(self.to_vec())
    }
}

impl<T> Clone for DataArray<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: PartialEq> PartialEq for DataArray<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner) || *self.inner.borrow() == *other.inner.borrow()
    }
}

impl<T: fmt::Debug> fmt::Debug for DataArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.borrow().iter()).finish()
    }
}

impl<T> From<Vec<T>> for DataArray<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

/// A node of a data tree.
///
/// Everything except [`DataValue::View`] is a leaf. `Map` never appears
/// directly under a view key (mappings written through `set` expand into
/// child views) but may appear inside lists and in read results.
#[derive(Debug, Clone)]
pub enum DataValue {
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    String(String),
    ByteArray(DataArray<i8>),
    ShortArray(DataArray<i16>),
    IntArray(DataArray<i32>),
    LongArray(DataArray<i64>),
    FloatArray(DataArray<f32>),
    DoubleArray(DataArray<f64>),
    BooleanArray(DataArray<bool>),
    /// Immutable ordered sequence.
    List(Vec<DataValue>),
    Map(IndexMap<String, DataValue>),
    View(DataView),
}

impl DataValue {
    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            DataValue::Bool(_) => "bool",
            DataValue::Byte(_) => "byte",
            DataValue::Short(_) => "short",
            DataValue::Int(_) => "int",
            DataValue::Long(_) => "long",
            DataValue::Float(_) => "float",
            DataValue::Double(_) => "double",
            DataValue::Char(_) => "char",
            DataValue::String(_) => "string",
            DataValue::ByteArray(_) => "byte[]",
            DataValue::ShortArray(_) => "short[]",
            DataValue::IntArray(_) => "int[]",
            DataValue::LongArray(_) => "long[]",
            DataValue::FloatArray(_) => "float[]",
            DataValue::DoubleArray(_) => "double[]",
            DataValue::BooleanArray(_) => "boolean[]",
            DataValue::List(_) => "list",
            DataValue::Map(_) => "map",
            DataValue::View(_) => "view",
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(
            self,
            DataValue::ByteArray(_)
                | DataValue::ShortArray(_)
                | DataValue::IntArray(_)
                | DataValue::LongArray(_)
                | DataValue::FloatArray(_)
                | DataValue::DoubleArray(_)
                | DataValue::BooleanArray(_)
        )
    }

    pub fn as_view(&self) -> Option<&DataView> {
        match self {
            DataValue::View(view) => Some(view),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a list or a typed array, one value per element.
    ///
    /// Returns `None` for anything that is not a sequence.
    pub fn list_items(&self) -> Option<Vec<DataValue>> {
        fn expand<T: Clone>(array: &DataArray<T>, f: fn(T) -> DataValue) -> Vec<DataValue> {
            array.borrow().iter().cloned().map(f).collect()
        }
        Some(match self {
            DataValue::List(items) => items.clone(),
            DataValue::ByteArray(a) => expand(a, DataValue::Byte),
            DataValue::ShortArray(a) => expand(a, DataValue::Short),
            DataValue::IntArray(a) => expand(a, DataValue::Int),
            DataValue::LongArray(a) => expand(a, DataValue::Long),
            DataValue::FloatArray(a) => expand(a, DataValue::Float),
            DataValue::DoubleArray(a) => expand(a, DataValue::Double),
            DataValue::BooleanArray(a) => expand(a, DataValue::Bool),
            _ => return None,
        })
    }

    /// This value with every array, including arrays nested in lists and
    /// maps, copied into fresh storage. Views are not copied.
    pub fn deep_clone_arrays(&self) -> DataValue {
        match self {
            DataValue::ByteArray(a) => DataValue::ByteArray(a.deep_clone()),
            DataValue::ShortArray(a) => DataValue::ShortArray(a.deep_clone()),
            DataValue::IntArray(a) => DataValue::IntArray(a.deep_clone()),
            DataValue::LongArray(a) => DataValue::LongArray(a.deep_clone()),
            DataValue::FloatArray(a) => DataValue::FloatArray(a.deep_clone()),
            DataValue::DoubleArray(a) => DataValue::DoubleArray(a.deep_clone()),
            DataValue::BooleanArray(a) => DataValue::BooleanArray(a.deep_clone()),
            DataValue::List(items) => {
                DataValue::List(items.iter().map(DataValue::deep_clone_arrays).collect())
            }
            DataValue::Map(map) => DataValue::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.deep_clone_arrays()))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// Whether `target` is this value or reachable from it through views,
    /// lists and maps.
    pub(crate) fn reaches(&self, target: &DataView) -> bool {
        match self {
            DataValue::View(view) => view.reaches(target),
            DataValue::List(items) => items.iter().any(|item| item.reaches(target)),
            DataValue::Map(map) => map.values().any(|v| v.reaches(target)),
            _ => false,
        }
    }
}

fn bits_eq_f32(a: &DataArray<f32>, b: &DataArray<f32>) -> bool {
    let (a, b) = (a.borrow(), b.borrow());
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.to_bits() == y.to_bits())
}

fn bits_eq_f64(a: &DataArray<f64>, b: &DataArray<f64>) -> bool {
    let (a, b) = (a.borrow(), b.borrow());
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.to_bits() == y.to_bits())
}

// Floats compare by bit pattern so that equality stays reflexive.
impl PartialEq for DataValue {
    fn eq(&self, other: &Self) -> bool {
        use DataValue::*;
        match (self, other) {
            (Bool(a), Bool(b)) => a == b,
            (Byte(a), Byte(b)) => a == b,
            (Short(a), Short(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Long(a), Long(b)) => a == b,
            (Float(a), Float(b)) => a.to_bits() == b.to_bits(),
            (Double(a), Double(b)) => a.to_bits() == b.to_bits(),
            (Char(a), Char(b)) => a == b,
            (String(a), String(b)) => a == b,
            (ByteArray(a), ByteArray(b)) => a == b,
            (ShortArray(a), ShortArray(b)) => a == b,
            (IntArray(a), IntArray(b)) => a == b,
            (LongArray(a), LongArray(b)) => a == b,
            (FloatArray(a), FloatArray(b)) => bits_eq_f32(a, b),
            (DoubleArray(a), DoubleArray(b)) => bits_eq_f64(a, b),
            (BooleanArray(a), BooleanArray(b)) => a == b,
            (List(a), List(b)) => a == b,
            (Map(a), Map(b)) => a == b,
            (View(a), View(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for DataValue {}

impl Hash for DataValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            DataValue::Bool(v) => v.hash(state),
            DataValue::Byte(v) => v.hash(state),
            DataValue::Short(v) => v.hash(state),
            DataValue::Int(v) => v.hash(state),
            DataValue::Long(v) => v.hash(state),
            DataValue::Float(v) => v.to_bits().hash(state),
            DataValue::Double(v) => v.to_bits().hash(state),
            DataValue::Char(v) => v.hash(state),
            DataValue::String(v) => v.hash(state),
            DataValue::ByteArray(a) => a.borrow().hash(state),
            DataValue::ShortArray(a) => a.borrow().hash(state),
            DataValue::IntArray(a) => a.borrow().hash(state),
            DataValue::LongArray(a) => a.borrow().hash(state),
            DataValue::FloatArray(a) => {
                let items = a.borrow();
                items.len().hash(state);
                for v in items.iter() {
                    v.to_bits().hash(state);
                }
            }
            DataValue::DoubleArray(a) => {
                let items = a.borrow();
                items.len().hash(state);
                for v in items.iter() {
                    v.to_bits().hash(state);
                }
            }
            DataValue::BooleanArray(a) => a.borrow().hash(state),
            DataValue::List(items) => items.hash(state),
            DataValue::Map(map) => hash_unordered(map.iter(), state),
            DataValue::View(view) => view.hash(state),
        }
    }
}

/// Hashes map entries independently of their order, matching the
/// order-insensitive equality of [`IndexMap`].
pub(crate) fn hash_unordered<'a, K, V, I, H>(entries: I, state: &mut H)
where
    K: Hash + 'a,
    V: Hash + 'a,
    I: Iterator<Item = (&'a K, &'a V)>,
    H: Hasher,
{
    let mut len = 0usize;
    let mut sum = 0u64;
    for (key, value) in entries {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        value.hash(&mut hasher);
        sum = sum.wrapping_add(hasher.finish());
        len += 1;
    }
    len.hash(state);
    sum.hash(state);
}

impl Serialize for DataValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DataValue::Bool(v) => serializer.serialize_bool(*v),
            DataValue::Byte(v) => serializer.serialize_i8(*v),
            DataValue::Short(v) => serializer.serialize_i16(*v),
            DataValue::Int(v) => serializer.serialize_i32(*v),
            DataValue::Long(v) => serializer.serialize_i64(*v),
            DataValue::Float(v) => serializer.serialize_f32(*v),
            DataValue::Double(v) => serializer.serialize_f64(*v),
            DataValue::Char(v) => serializer.serialize_char(*v),
            DataValue::String(v) => serializer.serialize_str(v),
            DataValue::ByteArray(a) => serializer.collect_seq(a.borrow().iter()),
            DataValue::ShortArray(a) => serializer.collect_seq(a.borrow().iter()),
            DataValue::IntArray(a) => serializer.collect_seq(a.borrow().iter()),
            DataValue::LongArray(a) => serializer.collect_seq(a.borrow().iter()),
            DataValue::FloatArray(a) => serializer.collect_seq(a.borrow().iter()),
            DataValue::DoubleArray(a) => serializer.collect_seq(a.borrow().iter()),
            DataValue::BooleanArray(a) => serializer.collect_seq(a.borrow().iter()),
            DataValue::List(items) => serializer.collect_seq(items),
            DataValue::Map(map) => serializer.collect_map(map),
            DataValue::View(view) => view.serialize(serializer),
        }
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for DataValue {
                fn from(v: $ty) -> Self {
                    DataValue::$variant(v)
                }
            }
        )*
    };
}

impl_from_scalar! {
    bool => Bool,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    char => Char,
    String => String,
}

macro_rules! impl_from_array {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Vec<$ty>> for DataValue {
                fn from(v: Vec<$ty>) -> Self {
                    DataValue::$variant(DataArray::new(v))
                }
            }

            impl From<DataArray<$ty>> for DataValue {
                fn from(v: DataArray<$ty>) -> Self {
                    DataValue::$variant(v)
                }
            }
        )*
    };
}

impl_from_array! {
    i8 => ByteArray,
    i16 => ShortArray,
    i32 => IntArray,
    i64 => LongArray,
    f32 => FloatArray,
    f64 => DoubleArray,
    bool => BooleanArray,
}

impl From<&str> for DataValue {
    fn from(v: &str) -> Self {
        DataValue::String(v.to_owned())
    }
}

impl From<Vec<DataValue>> for DataValue {
    fn from(items: Vec<DataValue>) -> Self {
        DataValue::List(items)
    }
}

impl From<IndexMap<String, DataValue>> for DataValue {
    fn from(map: IndexMap<String, DataValue>) -> Self {
        DataValue::Map(map)
    }
}

impl From<DataView> for DataValue {
    fn from(view: DataView) -> Self {
        DataValue::View(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_array_clone_aliases() {
        let a = DataArray::new(vec![1, 2, 3]);
        let b = a.clone();
        b.borrow_mut()[0] = 9;
        assert_eq!(a.to_vec(), vec![9, 2, 3]);
        assert!(a.shares_storage_with(&b));
    }

    #[test]
    fn test_array_deep_clone_is_independent() {
        let a = DataArray::new(vec![1, 2, 3]);
        let b = a.deep_clone();
        b.borrow_mut()[0] = 9;
        assert_eq!(a.to_vec(), vec![1, 2, 3]);
        assert!(!a.shares_storage_with(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_float_equality_is_reflexive() {
        let nan = DataValue::Double(f64::NAN);
        assert_eq!(nan, nan.clone());
        assert_ne!(DataValue::Double(0.0), DataValue::Double(-0.0));
    }

    #[test]
    fn test_different_widths_are_unequal() {
        assert_ne!(DataValue::Int(1), DataValue::Long(1));
        assert_ne!(DataValue::Float(1.0), DataValue::Double(1.0));
    }

    #[test]
    fn test_map_equality_and_hash_ignore_order() {
        let mut a = IndexMap::new();
        a.insert("x".to_string(), DataValue::Int(1));
        a.insert("y".to_string(), DataValue::Int(2));
        let mut b = IndexMap::new();
        b.insert("y".to_string(), DataValue::Int(2));
        b.insert("x".to_string(), DataValue::Int(1));

        let (a, b) = (DataValue::Map(a), DataValue::Map(b));
        assert_eq!(a, b);
        let set: HashSet<DataValue> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_list_items_expands_arrays() {
        let value = DataValue::from(vec![1i32, 2]);
        assert_eq!(
            value.list_items(),
            Some(vec![DataValue::Int(1), DataValue::Int(2)])
        );
        assert_eq!(DataValue::Int(1).list_items(), None);
    }

    #[test]
    fn test_deep_clone_arrays_reaches_into_lists() {
        let array = DataArray::new(vec![1i64]);
        let list = DataValue::List(vec![DataValue::LongArray(array.clone())]);
        let copy = list.deep_clone_arrays();
        match &copy {
            DataValue::List(items) => match &items[0] {
                DataValue::LongArray(copied) => assert!(!copied.shares_storage_with(&array)),
                other => panic!("unexpected {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(copy, list);
    }

    #[test]
    fn test_serialize_leaves() {
        let value = DataValue::List(vec![
            DataValue::Char('x'),
            DataValue::from(vec![true, false]),
            DataValue::from("s"),
        ]);
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            serde_json::json!(["x", [true, false], "s"])
        );
    }
}
